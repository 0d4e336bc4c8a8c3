use crate::db::{DbExecutor, RestaurantStore};
use crate::managers::hours::{Clock, OpenNowEvaluator};
use crate::routes::{me, restaurant, vote};
use crate::services::{restaurant::RestaurantActor, vote::VoteActor};
use actix::prelude::*;
use actix::registry::SystemRegistry;
use actix_web::web;
use std::sync::Arc;

pub fn register_db_actor(store: Arc<dyn RestaurantStore>) {
    SystemRegistry::set(DbExecutor(store).start());
}

pub fn register_system_actors(evaluator: OpenNowEvaluator, clock: Arc<dyn Clock>, vote_attempts: u32) {
    SystemRegistry::set(RestaurantActor::new(evaluator, clock).start());
    SystemRegistry::set(VoteActor::new(vote_attempts).start());
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Fixed segments go before `{id}` so they are not taken for ids.
    cfg.service(
        web::scope("/restaurants")
            .route("", web::get().to(restaurant::list))
            .route("/search", web::get().to(restaurant::search))
            .route("/filter", web::get().to(restaurant::filter))
            .route("/cuisines", web::get().to(restaurant::cuisines))
            .route("/by-tags", web::get().to(restaurant::by_tags))
            .route("/popular", web::get().to(restaurant::popular))
            .route("/{id}", web::get().to(restaurant::get))
            .route("/{id}/upvote", web::post().to(vote::upvote))
            .route("/{id}/downvote", web::post().to(vote::downvote))
            .route("/{id}/vote", web::delete().to(vote::remove))
            .route("/{id}/vote-status", web::get().to(vote::status)),
    )
    .service(
        web::scope("/me")
            .route("/votes/up", web::get().to(me::upvoted))
            .route("/votes/down", web::get().to(me::downvoted)),
    );
}

use super::{
    outgoing::{OutgoingPage, OutgoingRestaurant},
    traced, Params, Principal,
};
use crate::error::ApiError;
use crate::managers::{page::PageRequest, vote::VoteDirection};
use crate::services::vote::{MyVotes, VoteActor};
use crate::span::SpanMessage;
use actix::prelude::*;
use actix_web::{web, HttpResponse};

async fn voted(
    principal: Principal,
    params: Params,
    direction: VoteDirection,
) -> Result<HttpResponse, ApiError> {
    let page = PageRequest::clamped(params.parse("page")?, params.parse("size")?);
    let found = VoteActor::from_registry()
        .send(SpanMessage::new(MyVotes {
            user_id: principal.0,
            direction,
            page,
        }))
        .await??;
    let body: OutgoingPage<OutgoingRestaurant> = OutgoingPage::from_page(found);
    Ok(HttpResponse::Ok().json(body))
}

pub async fn upvoted(
    principal: Principal,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, ApiError> {
    let params = Params::from(query.into_inner());
    traced("my_upvotes", voted(principal, params, VoteDirection::Up)).await
}

pub async fn downvoted(
    principal: Principal,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, ApiError> {
    let params = Params::from(query.into_inner());
    traced("my_downvotes", voted(principal, params, VoteDirection::Down)).await
}

use crate::{
    db::{
        restaurant::{AllRestaurants, FindRestaurants, RestaurantById},
        DbExecutor,
    },
    error::ApiError,
    managers::{
        filter::{build_query, FilterCriteria},
        hours::{Clock, OpenNowEvaluator},
        restaurant::{Restaurant, RestaurantId},
        tags, text,
    },
    message_handler_with_span,
    span::SpanMessage,
};
use actix::prelude::*;
use actix_interop::FutureInterop;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, Span};

// Messages

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Vec<Restaurant>, ApiError>")]
pub struct ListRestaurants;

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Restaurant, ApiError>")]
pub struct GetRestaurant(pub RestaurantId);

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Vec<Restaurant>, ApiError>")]
pub struct SearchRestaurants(pub Option<String>);

/// Full filter pipeline: store query, then open-now, then free text.
#[derive(Message, Clone, Debug, Default)]
#[rtype(result = "Result<Vec<Restaurant>, ApiError>")]
pub struct FilterRestaurants {
    pub query: Option<String>,
    pub criteria: FilterCriteria,
    pub open_now: bool,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Vec<String>, ApiError>")]
pub struct ListCuisines;

/// `all` wins over `any`; both empty returns everything.
#[derive(Message, Clone, Debug, Default)]
#[rtype(result = "Result<Vec<Restaurant>, ApiError>")]
pub struct RestaurantsByTags {
    pub any: Vec<String>,
    pub all: Vec<String>,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Vec<Restaurant>, ApiError>")]
pub struct PopularRestaurants;

// Actor

pub struct RestaurantActor {
    evaluator: OpenNowEvaluator,
    clock: Arc<dyn Clock>,
}

impl RestaurantActor {
    pub fn new(evaluator: OpenNowEvaluator, clock: Arc<dyn Clock>) -> Self {
        Self { evaluator, clock }
    }
}

impl Default for RestaurantActor {
    fn default() -> Self {
        unimplemented!("Restaurant actor can't be unitialized using default because it needs a clock")
    }
}

impl Actor for RestaurantActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(evaluator = ?self.evaluator, "Restaurant actor started");
    }
}

impl SystemService for RestaurantActor {}
impl Supervised for RestaurantActor {}

async fn all_restaurants() -> Result<Vec<Restaurant>, ApiError> {
    Ok(DbExecutor::from_registry()
        .send(SpanMessage::new(AllRestaurants))
        .await??)
}

/// Unique, trimmed, non-blank cuisines in ascending order.
pub fn distinct_cuisines(restaurants: &[Restaurant]) -> Vec<String> {
    restaurants
        .iter()
        .filter_map(|r| r.cuisine.as_deref())
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_owned)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Net score descending; ties go to more upvotes, then original order.
pub fn rank_by_popularity(mut restaurants: Vec<Restaurant>) -> Vec<Restaurant> {
    restaurants.sort_by(|a, b| {
        let (a, b) = (a.votes.counts(), b.votes.counts());
        b.net().cmp(&a.net()).then(b.upvotes.cmp(&a.upvotes))
    });
    restaurants
}

message_handler_with_span! {
    impl SpanHandler<ListRestaurants> for RestaurantActor {
        type Result = ResponseActFuture<Self, <ListRestaurants as Message>::Result>;

        fn handle(&mut self, _msg: ListRestaurants, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            all_restaurants().interop_actor_boxed(self)
        }
    }
}

message_handler_with_span! {
    impl SpanHandler<GetRestaurant> for RestaurantActor {
        type Result = ResponseActFuture<Self, <GetRestaurant as Message>::Result>;

        fn handle(&mut self, msg: GetRestaurant, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            async move {
                let GetRestaurant(id) = msg;
                DbExecutor::from_registry()
                    .send(SpanMessage::new(RestaurantById(id.clone())))
                    .await??
                    .ok_or_else(|| ApiError::NotFound(id.0))
            }
            .interop_actor_boxed(self)
        }
    }
}

message_handler_with_span! {
    impl SpanHandler<SearchRestaurants> for RestaurantActor {
        type Result = ResponseActFuture<Self, <SearchRestaurants as Message>::Result>;

        fn handle(&mut self, msg: SearchRestaurants, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            async move {
                let restaurants = all_restaurants().await?;
                Ok(text::filter_by_text(restaurants, msg.0.as_deref()))
            }
            .interop_actor_boxed(self)
        }
    }
}

message_handler_with_span! {
    impl SpanHandler<FilterRestaurants> for RestaurantActor {
        type Result = ResponseActFuture<Self, <FilterRestaurants as Message>::Result>;

        fn handle(&mut self, msg: FilterRestaurants, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            let evaluator = self.evaluator;
            let clock = self.clock.clone();
            async move {
                let FilterRestaurants { query, criteria, open_now } = msg;
                let mut restaurants = DbExecutor::from_registry()
                    .send(SpanMessage::new(FindRestaurants(build_query(&criteria))))
                    .await??;
                if open_now {
                    let now = clock.now();
                    restaurants.retain(|r| evaluator.is_open_at(&r.hours, now));
                    debug!(%now, open = restaurants.len(), "Applied open-now filter");
                }
                Ok(text::filter_by_text(restaurants, query.as_deref()))
            }
            .interop_actor_boxed(self)
        }
    }
}

message_handler_with_span! {
    impl SpanHandler<ListCuisines> for RestaurantActor {
        type Result = ResponseActFuture<Self, <ListCuisines as Message>::Result>;

        fn handle(&mut self, _msg: ListCuisines, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            async move {
                let restaurants = all_restaurants().await?;
                Ok(distinct_cuisines(&restaurants))
            }
            .interop_actor_boxed(self)
        }
    }
}

message_handler_with_span! {
    impl SpanHandler<RestaurantsByTags> for RestaurantActor {
        type Result = ResponseActFuture<Self, <RestaurantsByTags as Message>::Result>;

        fn handle(&mut self, msg: RestaurantsByTags, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            async move {
                let restaurants = all_restaurants().await?;
                let RestaurantsByTags { any, all } = msg;
                Ok(if !all.is_empty() {
                    tags::match_all(restaurants, &all)
                } else {
                    tags::match_any(restaurants, &any)
                })
            }
            .interop_actor_boxed(self)
        }
    }
}

message_handler_with_span! {
    impl SpanHandler<PopularRestaurants> for RestaurantActor {
        type Result = ResponseActFuture<Self, <PopularRestaurants as Message>::Result>;

        fn handle(&mut self, _msg: PopularRestaurants, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            async move { Ok(rank_by_popularity(all_restaurants().await?)) }.interop_actor_boxed(self)
        }
    }
}

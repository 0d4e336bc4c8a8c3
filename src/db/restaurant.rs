use super::{DbExecutor, Versioned};
use crate::async_message_handler_with_span;
use crate::managers::{
    filter::RestaurantQuery,
    page::{Page, PageRequest},
    restaurant::{Restaurant, RestaurantId},
    vote::{UserId, VoteDirection, VoteState},
};
use actix::prelude::*;
use actix_interop::with_ctx;
use color_eyre::eyre::Report;
use tracing::debug;

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Vec<Restaurant>, Report>")]
pub struct AllRestaurants;

async_message_handler_with_span! {
    impl AsyncSpanHandler<AllRestaurants> for DbExecutor {
        async fn handle(_msg: AllRestaurants) -> Result<Vec<Restaurant>, Report> {
            let store = with_ctx(|a: &mut DbExecutor, _| a.store());
            debug!("Retrieving all restaurants");
            store.find_all().await
        }
    }
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Option<Restaurant>, Report>")]
pub struct RestaurantById(pub RestaurantId);

async_message_handler_with_span! {
    impl AsyncSpanHandler<RestaurantById> for DbExecutor {
        async fn handle(msg: RestaurantById) -> Result<Option<Restaurant>, Report> {
            let store = with_ctx(|a: &mut DbExecutor, _| a.store());
            let RestaurantById(id) = msg;
            debug!(id = id.as_str(), "Retrieving restaurant by id");
            store.find_by_id(&id).await
        }
    }
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Vec<Restaurant>, Report>")]
pub struct FindRestaurants(pub RestaurantQuery);

async_message_handler_with_span! {
    impl AsyncSpanHandler<FindRestaurants> for DbExecutor {
        async fn handle(msg: FindRestaurants) -> Result<Vec<Restaurant>, Report> {
            let store = with_ctx(|a: &mut DbExecutor, _| a.store());
            let found = store.find(&msg.0).await?;
            debug!("Query matched {} restaurants", found.len());
            Ok(found)
        }
    }
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Page<Restaurant>, Report>")]
pub struct VotedByUser {
    pub user_id: UserId,
    pub direction: VoteDirection,
    pub page: PageRequest,
}

async_message_handler_with_span! {
    impl AsyncSpanHandler<VotedByUser> for DbExecutor {
        async fn handle(msg: VotedByUser) -> Result<Page<Restaurant>, Report> {
            let store = with_ctx(|a: &mut DbExecutor, _| a.store());
            debug!(
                user_id = msg.user_id.as_str(),
                page = msg.page.page,
                size = msg.page.size,
                "Retrieving restaurants voted {:?}",
                msg.direction
            );
            store.find_voted_by(&msg.user_id, msg.direction, msg.page).await
        }
    }
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Option<Versioned<VoteState>>, Report>")]
pub struct VotesById(pub RestaurantId);

async_message_handler_with_span! {
    impl AsyncSpanHandler<VotesById> for DbExecutor {
        async fn handle(msg: VotesById) -> Result<Option<Versioned<VoteState>>, Report> {
            let store = with_ctx(|a: &mut DbExecutor, _| a.store());
            store.load_votes(&msg.0).await
        }
    }
}

/// Conditional write; resolves to `false` when the version moved on.
#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<bool, Report>")]
pub struct SaveVotes {
    pub id: RestaurantId,
    pub expected_version: i64,
    pub votes: VoteState,
}

async_message_handler_with_span! {
    impl AsyncSpanHandler<SaveVotes> for DbExecutor {
        async fn handle(msg: SaveVotes) -> Result<bool, Report> {
            let store = with_ctx(|a: &mut DbExecutor, _| a.store());
            let SaveVotes { id, expected_version, votes } = msg;
            let saved = store.save_votes(&id, expected_version, &votes).await?;
            debug!(id = id.as_str(), expected_version, saved, "Saved votes");
            Ok(saved)
        }
    }
}

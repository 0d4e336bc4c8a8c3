use crate::{
    db::{
        restaurant::{SaveVotes, VotedByUser, VotesById},
        DbExecutor,
    },
    error::ApiError,
    managers::{
        locks::KeyedLocks,
        page::{Page, PageRequest},
        restaurant::{Restaurant, RestaurantId},
        vote::{UserId, VoteAction, VoteCounts, VoteDirection},
    },
    message_handler_with_span,
    span::SpanMessage,
};
use actix::prelude::*;
use actix_interop::FutureInterop;
use std::sync::Arc;
use tracing::{debug, info, warn, Span};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

// Types

#[derive(Clone, Debug, PartialEq)]
pub struct VoteStatus {
    pub restaurant_id: RestaurantId,
    pub user_id: UserId,
    pub direction: Option<VoteDirection>,
    pub counts: VoteCounts,
}

/// Applies vote mutations one restaurant at a time.
///
/// Within this process, mutations on the same restaurant queue on a keyed
/// lock. Across processes, each write is conditional on the version that was
/// read; a lost race re-reads and tries again, at most `max_attempts` times.
pub struct VotingEngine {
    locks: KeyedLocks<RestaurantId>,
    max_attempts: u32,
}

impl VotingEngine {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            locks: KeyedLocks::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub async fn upvote(&self, id: RestaurantId, user: UserId) -> Result<VoteCounts, ApiError> {
        self.apply(id, user, VoteAction::Upvote).await
    }

    pub async fn downvote(&self, id: RestaurantId, user: UserId) -> Result<VoteCounts, ApiError> {
        self.apply(id, user, VoteAction::Downvote).await
    }

    pub async fn remove_vote(&self, id: RestaurantId, user: UserId) -> Result<VoteCounts, ApiError> {
        self.apply(id, user, VoteAction::Remove).await
    }

    pub async fn apply(
        &self,
        id: RestaurantId,
        user: UserId,
        action: VoteAction,
    ) -> Result<VoteCounts, ApiError> {
        let lock = self.locks.handle(&id);
        let _guard = lock.lock().await;
        let db = DbExecutor::from_registry();

        for attempt in 1..=self.max_attempts {
            let current = db
                .send(SpanMessage::new(VotesById(id.clone())))
                .await??
                .ok_or_else(|| ApiError::NotFound(id.0.clone()))?;

            let mut votes = current.value;
            if !votes.apply(action, &user) {
                debug!(?action, "Vote already in requested state");
                return Ok(votes.counts());
            }

            let counts = votes.counts();
            let saved = db
                .send(SpanMessage::new(SaveVotes {
                    id: id.clone(),
                    expected_version: current.version,
                    votes,
                }))
                .await??;
            if saved {
                info!(
                    restaurant_id = id.as_str(),
                    ?action,
                    upvotes = counts.upvotes,
                    downvotes = counts.downvotes,
                    "Vote recorded"
                );
                return Ok(counts);
            }
            warn!(restaurant_id = id.as_str(), attempt, "Vote update lost a race, retrying");
        }

        Err(ApiError::Conflict {
            attempts: self.max_attempts,
        })
    }

    pub async fn status(&self, id: RestaurantId, user: UserId) -> Result<VoteStatus, ApiError> {
        let current = DbExecutor::from_registry()
            .send(SpanMessage::new(VotesById(id.clone())))
            .await??
            .ok_or_else(|| ApiError::NotFound(id.0.clone()))?;
        Ok(VoteStatus {
            direction: current.value.direction_of(&user),
            counts: current.value.counts(),
            restaurant_id: id,
            user_id: user,
        })
    }
}

// Messages

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<VoteCounts, ApiError>")]
pub struct CastVote {
    pub restaurant_id: RestaurantId,
    pub user_id: UserId,
    pub action: VoteAction,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<VoteStatus, ApiError>")]
pub struct GetVoteStatus {
    pub restaurant_id: RestaurantId,
    pub user_id: UserId,
}

#[derive(Message, Clone, Debug)]
#[rtype(result = "Result<Page<Restaurant>, ApiError>")]
pub struct MyVotes {
    pub user_id: UserId,
    pub direction: VoteDirection,
    pub page: PageRequest,
}

// Actor

pub struct VoteActor {
    engine: Arc<VotingEngine>,
}

impl VoteActor {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            engine: Arc::new(VotingEngine::new(max_attempts)),
        }
    }
}

impl Default for VoteActor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS)
    }
}

impl Actor for VoteActor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!(max_attempts = self.engine.max_attempts, "Vote actor started");
    }
}

impl SystemService for VoteActor {}
impl Supervised for VoteActor {}

message_handler_with_span! {
    impl SpanHandler<CastVote> for VoteActor {
        type Result = ResponseActFuture<Self, <CastVote as Message>::Result>;

        fn handle(&mut self, msg: CastVote, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            debug!("VoteActor handling CastVote");
            let engine = self.engine.clone();
            async move {
                let CastVote { restaurant_id, user_id, action } = msg;
                engine.apply(restaurant_id, user_id, action).await
            }
            .interop_actor_boxed(self)
        }
    }
}

message_handler_with_span! {
    impl SpanHandler<GetVoteStatus> for VoteActor {
        type Result = ResponseActFuture<Self, <GetVoteStatus as Message>::Result>;

        fn handle(&mut self, msg: GetVoteStatus, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            let engine = self.engine.clone();
            async move { engine.status(msg.restaurant_id, msg.user_id).await }.interop_actor_boxed(self)
        }
    }
}

message_handler_with_span! {
    impl SpanHandler<MyVotes> for VoteActor {
        type Result = ResponseActFuture<Self, <MyVotes as Message>::Result>;

        fn handle(&mut self, msg: MyVotes, _ctx: &mut Context<Self>, _span: Span) -> Self::Result {
            async move {
                let MyVotes { user_id, direction, page } = msg;
                Ok(DbExecutor::from_registry()
                    .send(SpanMessage::new(VotedByUser { user_id, direction, page }))
                    .await??)
            }
            .interop_actor_boxed(self)
        }
    }
}

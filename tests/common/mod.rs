#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use color_eyre::eyre::Report;
use plateful_server::{
    db::{memory::MemoryStore, RestaurantStore, Versioned},
    managers::{
        filter::RestaurantQuery,
        hours::{FixedClock, OpenNowEvaluator},
        page::{Page, PageRequest},
        restaurant::{Restaurant, RestaurantId},
        vote::{UserId, VoteDirection, VoteState},
    },
    server,
};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

pub const SEED: &str = include_str!("../../fixtures/restaurants.json");

/// Tuesday 12:30 in Auckland.
pub fn tuesday_lunch() -> DateTime<Utc> {
    Utc.ymd(2024, 1, 15).and_hms(23, 30, 0)
}

pub fn seeded_store() -> MemoryStore {
    MemoryStore::from_json(SEED).unwrap()
}

pub fn register(store: Arc<dyn RestaurantStore>, vote_attempts: u32) {
    server::register_db_actor(store);
    server::register_system_actors(
        OpenNowEvaluator::new(chrono_tz::Pacific::Auckland),
        Arc::new(FixedClock(tuesday_lunch())),
        vote_attempts,
    );
}

macro_rules! test_app {
    ($store:expr) => {
        test_app!($store, 5)
    };
    ($store:expr, $attempts:expr) => {{
        common::register($store, $attempts);
        actix_web::test::init_service(
            actix_web::App::new().configure(plateful_server::server::configure),
        )
        .await
    }};
}

/// Wraps a store and counts reads and conditional writes.
pub struct CountingStore {
    inner: MemoryStore,
    pub queries: AtomicUsize,
    pub saves: AtomicUsize,
    reject_saves: bool,
}

impl CountingStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            queries: AtomicUsize::new(0),
            saves: AtomicUsize::new(0),
            reject_saves: false,
        }
    }

    /// Every conditional write loses, as if another instance always won the race.
    pub fn always_conflicting(inner: MemoryStore) -> Self {
        Self {
            reject_saves: true,
            ..Self::new(inner)
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.queries.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl RestaurantStore for CountingStore {
    async fn find_all(&self) -> Result<Vec<Restaurant>, Report> {
        self.touch();
        self.inner.find_all().await
    }

    async fn find_by_id(&self, id: &RestaurantId) -> Result<Option<Restaurant>, Report> {
        self.touch();
        self.inner.find_by_id(id).await
    }

    async fn find(&self, query: &RestaurantQuery) -> Result<Vec<Restaurant>, Report> {
        self.touch();
        self.inner.find(query).await
    }

    async fn find_voted_by(
        &self,
        user: &UserId,
        direction: VoteDirection,
        page: PageRequest,
    ) -> Result<Page<Restaurant>, Report> {
        self.touch();
        self.inner.find_voted_by(user, direction, page).await
    }

    async fn load_votes(&self, id: &RestaurantId) -> Result<Option<Versioned<VoteState>>, Report> {
        self.touch();
        self.inner.load_votes(id).await
    }

    async fn save_votes(
        &self,
        id: &RestaurantId,
        expected_version: i64,
        votes: &VoteState,
    ) -> Result<bool, Report> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        if self.reject_saves {
            return Ok(false);
        }
        self.inner.save_votes(id, expected_version, votes).await
    }
}

/// `actix_web::test::read_body_json` only exists from actix-web 3.0; this mirrors
/// its implementation for the actix-web 2.0 test harness.
pub async fn read_body_json<T, B>(res: actix_web::dev::ServiceResponse<B>) -> T
where
    B: actix_web::dev::MessageBody,
    T: serde::de::DeserializeOwned,
{
    let body = actix_web::test::read_body(res).await;
    serde_json::from_slice(&body)
        .unwrap_or_else(|_| panic!("read_response_json failed during deserialization"))
}

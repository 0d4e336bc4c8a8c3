pub mod memory;
pub mod postgres;
pub mod restaurant;

use crate::managers::{
    filter::RestaurantQuery,
    page::{Page, PageRequest},
    restaurant::{Restaurant, RestaurantId},
    vote::{UserId, VoteDirection, VoteState},
};
use actix::prelude::*;
use async_trait::async_trait;
use color_eyre::eyre::Report;
use sqlx::{
    migrate::Migrator,
    postgres::{PgConnectOptions, PgPoolOptions},
    PgPool,
};
use std::{fmt, path::Path, sync::Arc};
use tracing::info;

/// A value together with the document version it was read at.
#[derive(Clone, Debug, PartialEq)]
pub struct Versioned<T> {
    pub version: i64,
    pub value: T,
}

/// Document store holding restaurants.
///
/// Vote writes are conditional: `save_votes` only applies when the stored
/// version still equals `expected_version`, bumps the version, and refreshes
/// any denormalized counts in the same write. It returns `false` when another
/// writer got there first.
#[async_trait]
pub trait RestaurantStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<Restaurant>, Report>;

    async fn find_by_id(&self, id: &RestaurantId) -> Result<Option<Restaurant>, Report>;

    async fn find(&self, query: &RestaurantQuery) -> Result<Vec<Restaurant>, Report>;

    async fn find_voted_by(
        &self,
        user: &UserId,
        direction: VoteDirection,
        page: PageRequest,
    ) -> Result<Page<Restaurant>, Report>;

    async fn load_votes(&self, id: &RestaurantId) -> Result<Option<Versioned<VoteState>>, Report>;

    async fn save_votes(
        &self,
        id: &RestaurantId,
        expected_version: i64,
        votes: &VoteState,
    ) -> Result<bool, Report>;
}

pub struct DbExecutor(pub Arc<dyn RestaurantStore>);

impl DbExecutor {
    pub fn store(&mut self) -> Arc<dyn RestaurantStore> {
        self.0.clone()
    }
}

impl fmt::Debug for DbExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbExecutor").finish()
    }
}

impl Actor for DbExecutor {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Self::Context) {
        info!("Db executor started");
    }
}

impl Default for DbExecutor {
    fn default() -> Self {
        unimplemented!("DbExecutor cannot automatically be started");
    }
}

impl SystemService for DbExecutor {}
impl Supervised for DbExecutor {}

pub async fn new_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    new_pool_with(database_url.parse()?, max_connections).await
}

pub async fn new_pool_with(
    connect_options: PgConnectOptions,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(connect_options)
        .await
}

pub async fn migrate(pool: &PgPool, migrations: &Path) -> Result<(), Report> {
    let migrator = Migrator::new(migrations).await?;
    migrator.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

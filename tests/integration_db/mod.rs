use color_eyre::eyre::Report;
use dotenv::dotenv;
use lazy_static::lazy_static;
use plateful_server::{
    db::{self, postgres::PgStore},
    managers::restaurant::Restaurant,
};
use sqlx::{postgres::PgConnectOptions, PgPool};
use std::path::Path;
use tokio::sync::Mutex;
use tracing::{debug, span};

lazy_static! {
    static ref CREATE_DB_MUTEX: Mutex<()> = Mutex::new(());
}

async fn create_test_db(pool: &PgPool, test_db: &str) -> Result<(), Report> {
    let _lock = CREATE_DB_MUTEX.lock().await;
    debug!("Creating new test db");
    sqlx::query(&format!("DROP DATABASE IF EXISTS {}", test_db))
        .execute(pool)
        .await?;
    sqlx::query(&format!("CREATE DATABASE {}", test_db))
        .execute(pool)
        .await?;
    Ok(())
}

async fn drop_test_db(pool: &PgPool, test_db: &str) -> Result<(), Report> {
    let _lock = CREATE_DB_MUTEX.lock().await;
    debug!("Dropping test db");
    sqlx::query(&format!("DROP DATABASE IF EXISTS {}", test_db))
        .execute(pool)
        .await?;
    Ok(())
}

/// A throwaway database migrated and seeded with the fixture restaurants.
pub struct IntegrationTestDb {
    db_name: String,
    pool: PgPool,
    template_connect_options: PgConnectOptions,
}

impl IntegrationTestDb {
    /// `None` when `DATABASE_URL` is not configured.
    pub async fn new() -> Option<Self> {
        dotenv().ok();
        let template_connect_options: PgConnectOptions = match std::env::var("DATABASE_URL") {
            Ok(url) => url.parse().unwrap(),
            Err(_) => {
                eprintln!("DATABASE_URL not set, skipping Postgres test");
                return None;
            }
        };

        let db_name = format!("integration_{}", uuid::Uuid::new_v4().to_simple());
        let span = span!(tracing::Level::DEBUG, "test_db", test_db = db_name.as_str());
        let _enter = span.enter();

        let template_pool = db::new_pool_with(template_connect_options.clone(), 1)
            .await
            .unwrap();
        create_test_db(&template_pool, &db_name).await.unwrap();

        let connect_options = template_connect_options.clone().database(&db_name);
        let pool = db::new_pool_with(connect_options, 5).await.unwrap();
        db::migrate(&pool, Path::new("migrations")).await.unwrap();

        let restaurants: Vec<Restaurant> =
            serde_json::from_str(include_str!("../../fixtures/restaurants.json")).unwrap();
        let store = PgStore::new(pool.clone());
        for restaurant in &restaurants {
            store.insert(restaurant).await.unwrap();
        }

        Some(Self {
            db_name,
            pool,
            template_connect_options,
        })
    }

    pub fn store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }

    pub async fn cleanup(self) {
        self.pool.close().await;
        let template_pool = db::new_pool_with(self.template_connect_options, 1)
            .await
            .unwrap();
        drop_test_db(&template_pool, &self.db_name).await.unwrap();
    }
}

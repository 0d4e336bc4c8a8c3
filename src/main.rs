use actix_web::{App, HttpServer};
use color_eyre::eyre::{Report, WrapErr};
use dotenv::dotenv;
use plateful_server::{
    config::Config,
    db::{self, memory::MemoryStore, postgres::PgStore, RestaurantStore},
    log,
    managers::hours::{OpenNowEvaluator, SystemClock},
    server,
};
use std::{path::Path, sync::Arc};
use tracing::info;

async fn open_store(config: &Config) -> Result<Arc<dyn RestaurantStore>, Report> {
    match &config.database_url {
        Some(url) => {
            let pool = db::new_pool(url, config.max_connections)
                .await
                .wrap_err("connecting to DATABASE_URL")?;
            db::migrate(&pool, Path::new("migrations")).await?;
            info!("Using Postgres store");
            Ok(Arc::new(PgStore::new(pool)))
        }
        None => {
            info!(seed = %config.seed.display(), "Using in-memory store");
            Ok(Arc::new(MemoryStore::from_seed_file(&config.seed)?))
        }
    }
}

#[actix_rt::main]
async fn main() -> Result<(), Report> {
    dotenv().ok();
    log::init()?;
    let config = Config::from_env()?;

    let store = open_store(&config).await?;
    server::register_db_actor(store);
    server::register_system_actors(
        OpenNowEvaluator::new(config.timezone),
        Arc::new(SystemClock),
        config.vote_attempts,
    );

    info!(bind = config.bind.as_str(), "Starting HTTP server");
    HttpServer::new(|| App::new().configure(server::configure))
        .bind(&config.bind)?
        .run()
        .await?;
    Ok(())
}

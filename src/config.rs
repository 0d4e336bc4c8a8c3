use crate::services::vote::DEFAULT_MAX_ATTEMPTS;
use chrono_tz::Tz;
use color_eyre::eyre::{eyre, Report};
use std::{env, fmt::Display, path::PathBuf, str::FromStr};
use tracing::info;

pub const DEFAULT_BIND: &str = "127.0.0.1:8080";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_SEED: &str = "fixtures/restaurants.json";
pub const DEFAULT_TIMEZONE: &str = "Pacific/Auckland";

#[derive(Clone, Debug)]
pub struct Config {
    pub bind: String,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub seed: PathBuf,
    pub timezone: Tz,
    pub vote_attempts: u32,
}

impl Config {
    /// Reads `PLATEFUL_*` and `DATABASE_URL` from the environment.
    pub fn from_env() -> Result<Self, Report> {
        let vote_attempts: u32 =
            try_load("PLATEFUL_VOTE_ATTEMPTS", &DEFAULT_MAX_ATTEMPTS.to_string())?;
        if vote_attempts == 0 {
            return Err(eyre!("PLATEFUL_VOTE_ATTEMPTS must be at least 1"));
        }
        Ok(Self {
            bind: try_load("PLATEFUL_BIND", DEFAULT_BIND)?,
            database_url: optional("DATABASE_URL"),
            max_connections: try_load(
                "PLATEFUL_MAX_CONNECTIONS",
                &DEFAULT_MAX_CONNECTIONS.to_string(),
            )?,
            seed: try_load("PLATEFUL_SEED", DEFAULT_SEED)?,
            timezone: try_load("PLATEFUL_TIMEZONE", DEFAULT_TIMEZONE)?,
            vote_attempts,
        })
    }
}

fn optional(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => {
            info!("{} not set", key);
            None
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T, Report>
where
    T::Err: Display,
{
    let raw = optional(key).unwrap_or_else(|| {
        info!("{} using default: {}", key, default);
        default.to_owned()
    });
    raw.trim()
        .parse()
        .map_err(|e| eyre!("invalid {} value {:?}: {}", key, raw, e))
}

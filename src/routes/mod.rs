pub mod me;
pub mod outgoing;
pub mod restaurant;
pub mod vote;

use crate::error::ApiError;
use crate::managers::vote::UserId;
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures::future::{ready, Ready};
use std::{future::Future, str::FromStr};
use tracing::{debug, info, info_span};
use tracing_futures::Instrument;
use uuid::Uuid;

/// Header the upstream authentication layer fills with the caller's id.
pub const USER_ID_HEADER: &str = "X-User-Id";

/// Runs a handler body inside a `request` span tagged with a fresh id.
pub async fn traced<T, F>(route: &'static str, handler: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, ApiError>>,
{
    let span = info_span!("request", id = %Uuid::new_v4(), route = route);
    async move {
        let result = handler.await;
        match &result {
            Ok(_) => debug!("Request handled"),
            Err(err) => info!(error = %err, "Request rejected"),
        }
        result
    }
    .instrument(span)
    .await
}

/// Query string pairs in arrival order, so keys may repeat.
#[derive(Debug, Default)]
pub struct Params(Vec<(String, String)>);

impl From<Vec<(String, String)>> for Params {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl Params {
    fn values<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key`, untouched.
    pub fn text(&self, key: &str) -> Option<String> {
        self.values(key).next().map(str::to_owned)
    }

    /// Every value for `key`, split on commas, trimmed, blanks dropped.
    pub fn list(&self, key: &str) -> Vec<String> {
        self.values(key)
            .flat_map(|v| v.split(','))
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// Parses the first value; blank counts as absent.
    pub fn parse<T: FromStr>(&self, key: &str) -> Result<Option<T>, ApiError> {
        match self.values(key).next().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .map_err(|_| ApiError::Validation(format!("Invalid value for {}: {}", key, raw))),
        }
    }

    /// Case-insensitive `true` / `false`; blank counts as absent.
    pub fn flag(&self, key: &str) -> Result<Option<bool>, ApiError> {
        match self.values(key).next().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(raw) => Err(ApiError::Validation(format!(
                "Invalid value for {}: {}",
                key, raw
            ))),
        }
    }
}

/// The authenticated caller.
#[derive(Clone, Debug)]
pub struct Principal(pub UserId);

impl FromRequest for Principal {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;
    type Config = ();

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let user = req
            .headers()
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(|value| Principal(UserId(value.to_owned())))
            .ok_or(ApiError::Unauthenticated);
        ready(user)
    }
}

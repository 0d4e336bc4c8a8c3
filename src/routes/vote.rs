use super::{
    outgoing::{OutgoingVoteResult, OutgoingVoteStatus},
    traced, Params,
};
use crate::error::ApiError;
use crate::managers::{
    restaurant::RestaurantId,
    vote::{UserId, VoteAction},
};
use crate::services::vote::{CastVote, GetVoteStatus, VoteActor};
use crate::span::SpanMessage;
use actix::prelude::*;
use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct IncomingVote {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

impl IncomingVote {
    /// An empty body reads as a request without a user id.
    pub fn from_body(body: &[u8]) -> Result<Self, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
            .map_err(|err| ApiError::Validation(format!("Malformed vote request: {}", err)))
    }
}

async fn cast(
    id: RestaurantId,
    body: web::Bytes,
    action: VoteAction,
) -> Result<HttpResponse, ApiError> {
    let user_id = UserId::parse(IncomingVote::from_body(&body)?.user_id.as_deref())?;
    let counts = VoteActor::from_registry()
        .send(SpanMessage::new(CastVote {
            restaurant_id: id,
            user_id,
            action,
        }))
        .await??;
    Ok(HttpResponse::Ok().json(OutgoingVoteResult::new(action, counts)))
}

pub async fn upvote(path: web::Path<String>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let id = RestaurantId(path.into_inner());
    traced("upvote", cast(id, body, VoteAction::Upvote)).await
}

pub async fn downvote(path: web::Path<String>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let id = RestaurantId(path.into_inner());
    traced("downvote", cast(id, body, VoteAction::Downvote)).await
}

pub async fn remove(path: web::Path<String>, body: web::Bytes) -> Result<HttpResponse, ApiError> {
    let id = RestaurantId(path.into_inner());
    traced("remove_vote", cast(id, body, VoteAction::Remove)).await
}

pub async fn status(
    path: web::Path<String>,
    query: web::Query<Vec<(String, String)>>,
) -> Result<HttpResponse, ApiError> {
    let id = RestaurantId(path.into_inner());
    let params = Params::from(query.into_inner());
    traced("vote_status", async move {
        let user_id = UserId::parse(params.text("userId").as_deref())?;
        let status = VoteActor::from_registry()
            .send(SpanMessage::new(GetVoteStatus {
                restaurant_id: id,
                user_id,
            }))
            .await??;
        Ok(HttpResponse::Ok().json(OutgoingVoteStatus::from(status)))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_body_has_no_user() {
        assert!(IncomingVote::from_body(b"").unwrap().user_id.is_none());
        assert!(IncomingVote::from_body(b" \n").unwrap().user_id.is_none());
    }

    #[test]
    fn body_user_id_is_read() {
        let vote = IncomingVote::from_body(br#"{"userId": "alice"}"#).unwrap();
        assert_eq!(vote.user_id.as_deref(), Some("alice"));
        assert!(IncomingVote::from_body(b"{not json").is_err());
    }
}

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// Types

#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Accepts a raw user id from a request, rejecting blank values.
    pub fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.map(str::trim) {
            Some(id) if !id.is_empty() => Ok(Self(id.to_owned())),
            _ => Err(ApiError::Validation("userId is required".to_owned())),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VoteDirection {
    Up,
    Down,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum VoteAction {
    Upvote,
    Downvote,
    Remove,
}

impl VoteAction {
    pub fn message(self) -> &'static str {
        match self {
            VoteAction::Upvote => "Upvoted successfully",
            VoteAction::Downvote => "Downvoted successfully",
            VoteAction::Remove => "Vote removed successfully",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct VoteCounts {
    pub upvotes: i64,
    pub downvotes: i64,
}

impl VoteCounts {
    /// Net score used for popularity ranking.
    pub fn net(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

/// Raw shape of stored vote sets, which may violate disjointness.
#[derive(Deserialize)]
struct StoredVotes {
    #[serde(default)]
    upvote_user_ids: BTreeSet<UserId>,
    #[serde(default)]
    downvote_user_ids: BTreeSet<UserId>,
}

impl From<StoredVotes> for VoteState {
    fn from(stored: StoredVotes) -> Self {
        VoteState::from_sets(stored.upvote_user_ids, stored.downvote_user_ids)
    }
}

/// Who voted which way on one restaurant.
///
/// A user id lives in at most one of the two sets. Counts and the net score
/// are derived from the sets on every read, so they can never drift.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "StoredVotes")]
pub struct VoteState {
    upvote_user_ids: BTreeSet<UserId>,
    downvote_user_ids: BTreeSet<UserId>,
}

impl VoteState {
    /// Builds a state from stored sets. A user found in both keeps the upvote.
    pub fn from_sets(upvoters: BTreeSet<UserId>, mut downvoters: BTreeSet<UserId>) -> Self {
        downvoters.retain(|user| !upvoters.contains(user));
        Self {
            upvote_user_ids: upvoters,
            downvote_user_ids: downvoters,
        }
    }

    pub fn upvoters(&self) -> &BTreeSet<UserId> {
        &self.upvote_user_ids
    }

    pub fn downvoters(&self) -> &BTreeSet<UserId> {
        &self.downvote_user_ids
    }

    /// Returns true when the state changed.
    pub fn upvote(&mut self, user: &UserId) -> bool {
        if self.upvote_user_ids.contains(user) {
            return false;
        }
        self.downvote_user_ids.remove(user);
        self.upvote_user_ids.insert(user.clone())
    }

    /// Returns true when the state changed.
    pub fn downvote(&mut self, user: &UserId) -> bool {
        if self.downvote_user_ids.contains(user) {
            return false;
        }
        self.upvote_user_ids.remove(user);
        self.downvote_user_ids.insert(user.clone())
    }

    /// Returns true when the state changed.
    pub fn remove(&mut self, user: &UserId) -> bool {
        let up = self.upvote_user_ids.remove(user);
        let down = self.downvote_user_ids.remove(user);
        up || down
    }

    pub fn apply(&mut self, action: VoteAction, user: &UserId) -> bool {
        match action {
            VoteAction::Upvote => self.upvote(user),
            VoteAction::Downvote => self.downvote(user),
            VoteAction::Remove => self.remove(user),
        }
    }

    pub fn direction_of(&self, user: &UserId) -> Option<VoteDirection> {
        if self.upvote_user_ids.contains(user) {
            Some(VoteDirection::Up)
        } else if self.downvote_user_ids.contains(user) {
            Some(VoteDirection::Down)
        } else {
            None
        }
    }

    pub fn contains(&self, user: &UserId, direction: VoteDirection) -> bool {
        match direction {
            VoteDirection::Up => self.upvote_user_ids.contains(user),
            VoteDirection::Down => self.downvote_user_ids.contains(user),
        }
    }

    pub fn counts(&self) -> VoteCounts {
        VoteCounts {
            upvotes: self.upvote_user_ids.len() as i64,
            downvotes: self.downvote_user_ids.len() as i64,
        }
    }
}

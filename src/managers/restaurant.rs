use super::vote::VoteState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// Types

#[derive(Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Debug, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RestaurantId(pub String);

impl RestaurantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RestaurantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Weekday name (`monday`..`sunday`) to an optional `HH:MM-HH:MM` span.
pub type Hours = BTreeMap<String, Option<String>>;

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Address {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
}

/// A restaurant document as it is stored.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Restaurant {
    pub id: RestaurantId,
    pub name: Option<String>,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub price_level: Option<i32>,
    pub address: Option<Address>,
    pub reservation_required: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub hours: Hours,
    pub rating: Option<f64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(flatten)]
    pub votes: VoteState,
}

impl Restaurant {
    /// A bare record, mostly useful for seeding and tests.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: RestaurantId(id.into()),
            name: None,
            description: None,
            cuisine: None,
            price_level: None,
            address: None,
            reservation_required: None,
            tags: vec![],
            hours: Hours::new(),
            rating: None,
            images: vec![],
            votes: VoteState::default(),
        }
    }

    pub fn city(&self) -> Option<&str> {
        self.address.as_ref().and_then(|a| a.city.as_deref())
    }
}

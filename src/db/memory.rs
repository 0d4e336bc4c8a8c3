use super::{RestaurantStore, Versioned};
use crate::managers::{
    filter::RestaurantQuery,
    page::{Page, PageRequest},
    restaurant::{Restaurant, RestaurantId},
    vote::{UserId, VoteDirection, VoteState},
};
use async_trait::async_trait;
use color_eyre::eyre::{eyre, Report, WrapErr};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::{fs, path::Path};
use tracing::{debug, info, warn};

struct Document {
    restaurant: Restaurant,
    version: i64,
}

/// Single-instance store keeping documents in insertion order.
pub struct MemoryStore {
    documents: RwLock<Vec<Document>>,
}

impl MemoryStore {
    pub fn new(restaurants: Vec<Restaurant>) -> Result<Self, Report> {
        let mut seen = HashSet::new();
        for restaurant in &restaurants {
            if !seen.insert(restaurant.id.clone()) {
                return Err(eyre!("duplicate restaurant id {}", restaurant.id));
            }
        }
        let documents = restaurants
            .into_iter()
            .map(|restaurant| Document {
                restaurant,
                version: 0,
            })
            .collect();
        Ok(Self {
            documents: RwLock::new(documents),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, Report> {
        let restaurants: Vec<Restaurant> =
            serde_json::from_str(json).wrap_err("seed documents are not valid restaurant JSON")?;
        Self::new(restaurants)
    }

    /// Loads seed documents; a missing file yields an empty store.
    pub fn from_seed_file(path: &Path) -> Result<Self, Report> {
        if !path.exists() {
            warn!(path = %path.display(), "Seed file not found, starting with no restaurants");
            return Self::new(vec![]);
        }
        let json = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading seed file {}", path.display()))?;
        let store = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            restaurants = store.documents.read().len(),
            "Seeded in-memory store"
        );
        Ok(store)
    }

    fn collect(&self, keep: impl Fn(&Restaurant) -> bool) -> Vec<Restaurant> {
        self.documents
            .read()
            .iter()
            .map(|doc| &doc.restaurant)
            .filter(|r| keep(r))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl RestaurantStore for MemoryStore {
    async fn find_all(&self) -> Result<Vec<Restaurant>, Report> {
        Ok(self.collect(|_| true))
    }

    async fn find_by_id(&self, id: &RestaurantId) -> Result<Option<Restaurant>, Report> {
        Ok(self.collect(|r| &r.id == id).into_iter().next())
    }

    async fn find(&self, query: &RestaurantQuery) -> Result<Vec<Restaurant>, Report> {
        debug!(?query, "Evaluating query in memory");
        Ok(self.collect(|r| query.matches(r)))
    }

    async fn find_voted_by(
        &self,
        user: &UserId,
        direction: VoteDirection,
        page: PageRequest,
    ) -> Result<Page<Restaurant>, Report> {
        let voted = self.collect(|r| r.votes.contains(user, direction));
        Ok(Page::from_ordered(voted, page))
    }

    async fn load_votes(&self, id: &RestaurantId) -> Result<Option<Versioned<VoteState>>, Report> {
        Ok(self
            .documents
            .read()
            .iter()
            .find(|doc| &doc.restaurant.id == id)
            .map(|doc| Versioned {
                version: doc.version,
                value: doc.restaurant.votes.clone(),
            }))
    }

    async fn save_votes(
        &self,
        id: &RestaurantId,
        expected_version: i64,
        votes: &VoteState,
    ) -> Result<bool, Report> {
        let mut documents = self.documents.write();
        let doc = documents
            .iter_mut()
            .find(|doc| &doc.restaurant.id == id)
            .ok_or_else(|| eyre!("restaurant {} vanished during vote update", id))?;
        if doc.version != expected_version {
            return Ok(false);
        }
        doc.restaurant.votes = votes.clone();
        doc.version += 1;
        Ok(true)
    }
}

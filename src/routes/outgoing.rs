use crate::managers::{
    page::Page,
    restaurant::{Address, Hours, Restaurant},
    vote::{VoteAction, VoteCounts, VoteDirection},
};
use crate::services::vote::VoteStatus;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct OutgoingAddress {
    pub street: Option<String>,
    pub city: Option<String>,
    pub postcode: Option<String>,
}

impl From<Address> for OutgoingAddress {
    fn from(address: Address) -> Self {
        Self {
            street: address.street,
            city: address.city,
            postcode: address.postcode,
        }
    }
}

/// Restaurant as served to clients. Voter ids stay private.
#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingRestaurant {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub cuisine: Option<String>,
    pub price_level: Option<i32>,
    pub address: Option<OutgoingAddress>,
    pub reservation_required: Option<bool>,
    pub tags: Vec<String>,
    pub hours: Hours,
    pub rating: Option<f64>,
    pub images: Vec<String>,
    pub upvote_count: i64,
    pub downvote_count: i64,
    pub vote_count: i64,
}

impl From<Restaurant> for OutgoingRestaurant {
    fn from(restaurant: Restaurant) -> Self {
        let counts = restaurant.votes.counts();
        Self {
            id: restaurant.id.0,
            name: restaurant.name,
            description: restaurant.description,
            cuisine: restaurant.cuisine,
            price_level: restaurant.price_level,
            address: restaurant.address.map(OutgoingAddress::from),
            reservation_required: restaurant.reservation_required,
            tags: restaurant.tags,
            hours: restaurant.hours,
            rating: restaurant.rating,
            images: restaurant.images,
            upvote_count: counts.upvotes,
            downvote_count: counts.downvotes,
            vote_count: counts.net(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingVoteResult {
    pub message: String,
    pub upvote_count: i64,
    pub downvote_count: i64,
    pub vote_count: i64,
}

impl OutgoingVoteResult {
    pub fn new(action: VoteAction, counts: VoteCounts) -> Self {
        Self {
            message: action.message().to_owned(),
            upvote_count: counts.upvotes,
            downvote_count: counts.downvotes,
            vote_count: counts.net(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingVoteStatus {
    pub restaurant_id: String,
    pub user_id: String,
    pub has_upvoted: bool,
    pub has_downvoted: bool,
    pub upvote_count: i64,
    pub downvote_count: i64,
    pub vote_count: i64,
}

impl From<VoteStatus> for OutgoingVoteStatus {
    fn from(status: VoteStatus) -> Self {
        Self {
            restaurant_id: status.restaurant_id.0,
            user_id: status.user_id.0,
            has_upvoted: status.direction == Some(VoteDirection::Up),
            has_downvoted: status.direction == Some(VoteDirection::Down),
            upvote_count: status.counts.upvotes,
            downvote_count: status.counts.downvotes,
            vote_count: status.counts.net(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OutgoingPage<T> {
    pub content: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total_elements: u64,
    pub total_pages: u64,
    pub first: bool,
    pub last: bool,
}

impl<T> OutgoingPage<T> {
    pub fn from_page<U: Into<T>>(page: Page<U>) -> Self {
        Self {
            page: page.request.page,
            size: page.request.size,
            total_elements: page.total_elements,
            total_pages: page.total_pages(),
            first: page.is_first(),
            last: page.is_last(),
            content: page.content.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::{page::PageRequest, vote::UserId};

    #[test]
    fn restaurant_hides_voters_and_exposes_counts() {
        let mut restaurant = Restaurant::new("r1");
        restaurant.price_level = Some(2);
        restaurant.votes.upvote(&UserId("alice".to_owned()));
        restaurant.votes.downvote(&UserId("bob".to_owned()));
        restaurant.votes.downvote(&UserId("carol".to_owned()));

        let json = serde_json::to_value(OutgoingRestaurant::from(restaurant)).unwrap();
        assert_eq!(json["priceLevel"], 2);
        assert_eq!(json["upvoteCount"], 1);
        assert_eq!(json["downvoteCount"], 2);
        assert_eq!(json["voteCount"], -1);
        assert!(json.get("upvote_user_ids").is_none());
        assert!(json.get("downvoteUserIds").is_none());
    }

    #[test]
    fn page_metadata_is_derived() {
        let page = Page::from_ordered(
            vec![Restaurant::new("a"), Restaurant::new("b"), Restaurant::new("c")],
            PageRequest::clamped(Some(1), Some(2)),
        );
        let page: OutgoingPage<OutgoingRestaurant> = OutgoingPage::from_page(page);
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].id, "c");
        assert_eq!(page.total_elements, 3);
        assert_eq!(page.total_pages, 2);
        assert!(!page.first);
        assert!(page.last);
    }
}

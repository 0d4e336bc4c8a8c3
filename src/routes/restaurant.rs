use super::{outgoing::OutgoingRestaurant, traced, Params};
use crate::error::ApiError;
use crate::managers::{filter::FilterCriteria, restaurant::Restaurant, restaurant::RestaurantId};
use crate::services::restaurant::{
    FilterRestaurants, GetRestaurant, ListCuisines, ListRestaurants, PopularRestaurants,
    RestaurantActor, RestaurantsByTags, SearchRestaurants,
};
use crate::span::SpanMessage;
use actix::prelude::*;
use actix_web::{web, HttpResponse};

type Query = web::Query<Vec<(String, String)>>;

fn restaurants_response(restaurants: Vec<Restaurant>) -> HttpResponse {
    let body: Vec<OutgoingRestaurant> = restaurants.into_iter().map(Into::into).collect();
    HttpResponse::Ok().json(body)
}

pub async fn list() -> Result<HttpResponse, ApiError> {
    traced("list_restaurants", async {
        let restaurants = RestaurantActor::from_registry()
            .send(SpanMessage::new(ListRestaurants))
            .await??;
        Ok(restaurants_response(restaurants))
    })
    .await
}

pub async fn get(path: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let id = RestaurantId(path.into_inner());
    traced("get_restaurant", async move {
        let restaurant = RestaurantActor::from_registry()
            .send(SpanMessage::new(GetRestaurant(id)))
            .await??;
        Ok(HttpResponse::Ok().json(OutgoingRestaurant::from(restaurant)))
    })
    .await
}

pub async fn search(query: Query) -> Result<HttpResponse, ApiError> {
    let params = Params::from(query.into_inner());
    traced("search_restaurants", async move {
        let restaurants = RestaurantActor::from_registry()
            .send(SpanMessage::new(SearchRestaurants(params.text("query"))))
            .await??;
        Ok(restaurants_response(restaurants))
    })
    .await
}

/// Validates filter parameters before anything touches the store.
pub fn filter_message(params: &Params) -> Result<FilterRestaurants, ApiError> {
    let criteria = FilterCriteria {
        cuisine: params.text("cuisine"),
        price_min: params.parse("priceMin")?,
        price_max: params.parse("priceMax")?,
        reservation: params.flag("reservation")?,
        cities: params.list("city"),
    };
    if let (Some(min), Some(max)) = (criteria.price_min, criteria.price_max) {
        if min > max {
            return Err(ApiError::Validation(
                "priceMin must not be greater than priceMax".to_owned(),
            ));
        }
    }
    Ok(FilterRestaurants {
        query: params.text("query"),
        criteria,
        open_now: params.flag("openNow")?.unwrap_or(false),
    })
}

pub async fn filter(query: Query) -> Result<HttpResponse, ApiError> {
    let params = Params::from(query.into_inner());
    traced("filter_restaurants", async move {
        let message = filter_message(&params)?;
        let restaurants = RestaurantActor::from_registry()
            .send(SpanMessage::new(message))
            .await??;
        Ok(restaurants_response(restaurants))
    })
    .await
}

pub async fn cuisines() -> Result<HttpResponse, ApiError> {
    traced("list_cuisines", async {
        let cuisines = RestaurantActor::from_registry()
            .send(SpanMessage::new(ListCuisines))
            .await??;
        Ok(HttpResponse::Ok().json(cuisines))
    })
    .await
}

pub async fn by_tags(query: Query) -> Result<HttpResponse, ApiError> {
    let params = Params::from(query.into_inner());
    traced("restaurants_by_tags", async move {
        let message = RestaurantsByTags {
            any: params.list("any"),
            all: params.list("all"),
        };
        let restaurants = RestaurantActor::from_registry()
            .send(SpanMessage::new(message))
            .await??;
        Ok(restaurants_response(restaurants))
    })
    .await
}

pub async fn popular() -> Result<HttpResponse, ApiError> {
    traced("popular_restaurants", async {
        let restaurants = RestaurantActor::from_registry()
            .send(SpanMessage::new(PopularRestaurants))
            .await??;
        Ok(restaurants_response(restaurants))
    })
    .await
}

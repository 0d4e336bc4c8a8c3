//! Translation of optional filter parameters into a store query.
//!
//! The query is a small predicate tree. The in-memory store evaluates it
//! directly with [`RestaurantQuery::matches`]; the Postgres store compiles it
//! into a parameterised `WHERE` clause.

use super::restaurant::Restaurant;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Field {
    Cuisine,
    PriceLevel,
    ReservationRequired,
    City,
}

#[derive(Clone, PartialEq, Debug)]
pub enum Predicate {
    /// Case-insensitive literal substring.
    Contains { field: Field, needle: String },
    /// Case-insensitive whole-value equality.
    EqualsIgnoreCase { field: Field, value: String },
    /// Inclusive integer range.
    Between { field: Field, min: i32, max: i32 },
    Is { field: Field, value: bool },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        match self {
            Predicate::Contains { field, needle } => text_field(restaurant, *field)
                .map(|value| value.to_lowercase().contains(&needle.to_lowercase()))
                .unwrap_or(false),
            Predicate::EqualsIgnoreCase { field, value } => text_field(restaurant, *field)
                .map(|stored| stored.to_lowercase() == value.to_lowercase())
                .unwrap_or(false),
            Predicate::Between { field, min, max } => int_field(restaurant, *field)
                .map(|value| *min <= value && value <= *max)
                .unwrap_or(false),
            Predicate::Is { field, value } => bool_field(restaurant, *field) == Some(*value),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(restaurant)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(restaurant)),
        }
    }
}

fn text_field(restaurant: &Restaurant, field: Field) -> Option<&str> {
    match field {
        Field::Cuisine => restaurant.cuisine.as_deref(),
        Field::City => restaurant.city(),
        _ => None,
    }
}

fn int_field(restaurant: &Restaurant, field: Field) -> Option<i32> {
    match field {
        Field::PriceLevel => restaurant.price_level,
        _ => None,
    }
}

fn bool_field(restaurant: &Restaurant, field: Field) -> Option<bool> {
    match field {
        Field::ReservationRequired => restaurant.reservation_required,
        _ => None,
    }
}

/// Store query. `None` means unconstrained.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct RestaurantQuery(pub Option<Predicate>);

impl RestaurantQuery {
    pub fn all() -> Self {
        Self(None)
    }

    pub fn matches(&self, restaurant: &Restaurant) -> bool {
        self.0.as_ref().map_or(true, |p| p.matches(restaurant))
    }
}

/// Raw filter parameters as they arrive from a request.
#[derive(Clone, Debug, Default)]
pub struct FilterCriteria {
    pub cuisine: Option<String>,
    pub price_min: Option<i32>,
    pub price_max: Option<i32>,
    pub reservation: Option<bool>,
    pub cities: Vec<String>,
}

/// Combines every present criterion with AND.
pub fn build_query(criteria: &FilterCriteria) -> RestaurantQuery {
    let mut ands = vec![];

    if let Some(cuisine) = criteria.cuisine.as_deref() {
        if !cuisine.trim().is_empty() {
            ands.push(Predicate::Contains {
                field: Field::Cuisine,
                needle: cuisine.to_owned(),
            });
        }
    }

    if criteria.price_min.is_some() || criteria.price_max.is_some() {
        let mut min = criteria.price_min.unwrap_or(i32::MIN);
        let mut max = criteria.price_max.unwrap_or(i32::MAX);
        if min > max {
            std::mem::swap(&mut min, &mut max);
        }
        ands.push(Predicate::Between {
            field: Field::PriceLevel,
            min,
            max,
        });
    }

    if let Some(reservation) = criteria.reservation {
        ands.push(Predicate::Is {
            field: Field::ReservationRequired,
            value: reservation,
        });
    }

    let cities: Vec<Predicate> = criteria
        .cities
        .iter()
        .map(|city| city.trim())
        .filter(|city| !city.is_empty())
        .map(|city| Predicate::EqualsIgnoreCase {
            field: Field::City,
            value: city.to_owned(),
        })
        .collect();
    if !cities.is_empty() {
        ands.push(Predicate::Or(cities));
    }

    if ands.is_empty() {
        RestaurantQuery::all()
    } else {
        RestaurantQuery(Some(Predicate::And(ands)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::managers::restaurant::Address;

    fn restaurant(cuisine: &str, price: i32, reservation: bool, city: &str) -> Restaurant {
        let mut r = Restaurant::new(format!("{}-{}", cuisine, city));
        r.cuisine = Some(cuisine.to_owned());
        r.price_level = Some(price);
        r.reservation_required = Some(reservation);
        r.address = Some(Address {
            city: Some(city.to_owned()),
            ..Address::default()
        });
        r
    }

    #[test]
    fn no_criteria_is_unconstrained() {
        let query = build_query(&FilterCriteria::default());
        assert_eq!(query, RestaurantQuery::all());
        assert!(query.matches(&Restaurant::new("bare")));
    }

    #[test]
    fn inverted_price_bounds_are_swapped() {
        let query = build_query(&FilterCriteria {
            price_min: Some(5),
            price_max: Some(2),
            ..FilterCriteria::default()
        });
        assert_eq!(
            query,
            RestaurantQuery(Some(Predicate::And(vec![Predicate::Between {
                field: Field::PriceLevel,
                min: 2,
                max: 5,
            }])))
        );
        assert!(query.matches(&restaurant("thai", 3, false, "Auckland")));
        assert!(!query.matches(&restaurant("thai", 6, false, "Auckland")));
    }

    #[test]
    fn missing_price_bound_is_open_ended() {
        let query = build_query(&FilterCriteria {
            price_max: Some(2),
            ..FilterCriteria::default()
        });
        assert!(query.matches(&restaurant("thai", -40, false, "Auckland")));
        assert!(query.matches(&restaurant("thai", 2, false, "Auckland")));
        assert!(!query.matches(&restaurant("thai", 3, false, "Auckland")));
        assert!(!query.matches(&Restaurant::new("no price")));
    }

    #[test]
    fn cuisine_is_case_insensitive_substring() {
        let query = build_query(&FilterCriteria {
            cuisine: Some("ITAL".to_owned()),
            ..FilterCriteria::default()
        });
        assert!(query.matches(&restaurant("Italian", 2, false, "Wellington")));
        assert!(!query.matches(&restaurant("Thai", 2, false, "Wellington")));
    }

    #[test]
    fn cuisine_is_matched_literally() {
        let query = build_query(&FilterCriteria {
            cuisine: Some(".*".to_owned()),
            ..FilterCriteria::default()
        });
        assert!(!query.matches(&restaurant("Italian", 2, false, "Wellington")));
    }

    #[test]
    fn blank_cuisine_is_ignored() {
        let query = build_query(&FilterCriteria {
            cuisine: Some("  ".to_owned()),
            ..FilterCriteria::default()
        });
        assert_eq!(query, RestaurantQuery::all());
    }

    #[test]
    fn reservation_requires_exact_value() {
        let query = build_query(&FilterCriteria {
            reservation: Some(false),
            ..FilterCriteria::default()
        });
        assert!(query.matches(&restaurant("thai", 1, false, "Auckland")));
        assert!(!query.matches(&restaurant("thai", 1, true, "Auckland")));
        assert!(!query.matches(&Restaurant::new("unknown")));
    }

    #[test]
    fn cities_are_ored_trimmed_and_exact() {
        let query = build_query(&FilterCriteria {
            cities: vec![" auckland ".to_owned(), "".to_owned(), "WELLINGTON".to_owned()],
            ..FilterCriteria::default()
        });
        assert!(query.matches(&restaurant("thai", 1, false, "Auckland")));
        assert!(query.matches(&restaurant("thai", 1, false, "Wellington")));
        assert!(!query.matches(&restaurant("thai", 1, false, "Christchurch")));
        assert!(!query.matches(&restaurant("thai", 1, false, "Auckland Central")));
    }

    #[test]
    fn only_blank_cities_add_no_constraint() {
        let query = build_query(&FilterCriteria {
            cities: vec!["".to_owned(), "  ".to_owned()],
            ..FilterCriteria::default()
        });
        assert_eq!(query, RestaurantQuery::all());
    }

    #[test]
    fn criteria_are_anded() {
        let query = build_query(&FilterCriteria {
            cuisine: Some("thai".to_owned()),
            price_min: Some(1),
            price_max: Some(2),
            reservation: Some(true),
            cities: vec!["Auckland".to_owned()],
        });
        assert!(query.matches(&restaurant("Thai", 2, true, "Auckland")));
        assert!(!query.matches(&restaurant("Thai", 2, false, "Auckland")));
        assert!(!query.matches(&restaurant("Thai", 3, true, "Auckland")));
        assert!(!query.matches(&restaurant("Thai", 2, true, "Hamilton")));
    }
}

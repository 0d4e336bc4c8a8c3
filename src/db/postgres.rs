use super::{RestaurantStore, Versioned};
use crate::managers::{
    filter::{Field, Predicate, RestaurantQuery},
    page::{Page, PageRequest},
    restaurant::{Address, Hours, Restaurant, RestaurantId},
    vote::{UserId, VoteDirection, VoteState},
};
use async_trait::async_trait;
use color_eyre::eyre::Report;
use sqlx::{types::Json, Done, FromRow, PgPool};
use tracing::debug;

const COLUMNS: &str = "id, name, description, cuisine, price_level, street, city, postcode, \
     reservation_required, tags, hours, rating, images, upvote_user_ids, downvote_user_ids, version";

#[derive(FromRow)]
struct RestaurantRow {
    id: String,
    name: Option<String>,
    description: Option<String>,
    cuisine: Option<String>,
    price_level: Option<i32>,
    street: Option<String>,
    city: Option<String>,
    postcode: Option<String>,
    reservation_required: Option<bool>,
    tags: Vec<String>,
    hours: Json<Hours>,
    rating: Option<f64>,
    images: Vec<String>,
    upvote_user_ids: Vec<String>,
    downvote_user_ids: Vec<String>,
    version: i64,
}

impl RestaurantRow {
    fn votes(upvote_user_ids: Vec<String>, downvote_user_ids: Vec<String>) -> VoteState {
        VoteState::from_sets(
            upvote_user_ids.into_iter().map(UserId).collect(),
            downvote_user_ids.into_iter().map(UserId).collect(),
        )
    }

    fn into_restaurant(self) -> Restaurant {
        let address = if self.street.is_none() && self.city.is_none() && self.postcode.is_none() {
            None
        } else {
            Some(Address {
                street: self.street,
                city: self.city,
                postcode: self.postcode,
            })
        };
        Restaurant {
            id: RestaurantId(self.id),
            name: self.name,
            description: self.description,
            cuisine: self.cuisine,
            price_level: self.price_level,
            address,
            reservation_required: self.reservation_required,
            tags: self.tags,
            hours: self.hours.0,
            rating: self.rating,
            images: self.images,
            votes: Self::votes(self.upvote_user_ids, self.downvote_user_ids),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Bind {
    Text(String),
    Int(i32),
    Bool(bool),
}

/// `WHERE` clause under construction with its positional parameters.
#[derive(Default, Debug)]
struct SqlFilter {
    params: Vec<Bind>,
}

impl SqlFilter {
    fn push(&mut self, value: Bind) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    fn column(field: Field) -> &'static str {
        match field {
            Field::Cuisine => "cuisine",
            Field::PriceLevel => "price_level",
            Field::ReservationRequired => "reservation_required",
            Field::City => "city",
        }
    }

    fn compile(&mut self, predicate: &Predicate) -> String {
        match predicate {
            Predicate::Contains { field, needle } => {
                let p = self.push(Bind::Text(needle.clone()));
                format!("strpos(lower({}), lower({})) > 0", Self::column(*field), p)
            }
            Predicate::EqualsIgnoreCase { field, value } => {
                let p = self.push(Bind::Text(value.clone()));
                format!("lower({}) = lower({})", Self::column(*field), p)
            }
            Predicate::Between { field, min, max } => {
                let lo = self.push(Bind::Int(*min));
                let hi = self.push(Bind::Int(*max));
                format!("{} BETWEEN {} AND {}", Self::column(*field), lo, hi)
            }
            Predicate::Is { field, value } => {
                let p = self.push(Bind::Bool(*value));
                format!("{} = {}", Self::column(*field), p)
            }
            Predicate::And(parts) => self.join(parts, " AND ", "TRUE"),
            Predicate::Or(parts) => self.join(parts, " OR ", "FALSE"),
        }
    }

    fn join(&mut self, parts: &[Predicate], separator: &str, empty: &str) -> String {
        if parts.is_empty() {
            return empty.to_owned();
        }
        let clauses: Vec<String> = parts.iter().map(|p| self.compile(p)).collect();
        format!("({})", clauses.join(separator))
    }
}

fn select_sql(query: &RestaurantQuery) -> (String, Vec<Bind>) {
    let mut filter = SqlFilter::default();
    let sql = match &query.0 {
        Some(predicate) => format!(
            "SELECT {} FROM restaurants WHERE {} ORDER BY seq",
            COLUMNS,
            filter.compile(predicate)
        ),
        None => format!("SELECT {} FROM restaurants ORDER BY seq", COLUMNS),
    };
    (sql, filter.params)
}

fn voter_column(direction: VoteDirection) -> &'static str {
    match direction {
        VoteDirection::Up => "upvote_user_ids",
        VoteDirection::Down => "downvote_user_ids",
    }
}

/// Restaurant documents in Postgres.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new document at version 0.
    pub async fn insert(&self, restaurant: &Restaurant) -> Result<(), Report> {
        let address = restaurant.address.clone().unwrap_or_default();
        let counts = restaurant.votes.counts();
        let up: Vec<String> = restaurant.votes.upvoters().iter().map(|u| u.0.clone()).collect();
        let down: Vec<String> = restaurant.votes.downvoters().iter().map(|u| u.0.clone()).collect();
        sqlx::query(
            r#"
            INSERT INTO restaurants (
                id, name, description, cuisine, price_level, street, city, postcode,
                reservation_required, tags, hours, rating, images,
                upvote_user_ids, downvote_user_ids, upvote_count, downvote_count, vote_count
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(restaurant.id.as_str())
        .bind(restaurant.name.clone())
        .bind(restaurant.description.clone())
        .bind(restaurant.cuisine.clone())
        .bind(restaurant.price_level)
        .bind(address.street)
        .bind(address.city)
        .bind(address.postcode)
        .bind(restaurant.reservation_required)
        .bind(restaurant.tags.clone())
        .bind(Json(restaurant.hours.clone()))
        .bind(restaurant.rating)
        .bind(restaurant.images.clone())
        .bind(up)
        .bind(down)
        .bind(counts.upvotes)
        .bind(counts.downvotes)
        .bind(counts.net())
        .execute(&self.pool)
        .await?;
        debug!(id = restaurant.id.as_str(), "Inserted restaurant");
        Ok(())
    }
}

#[async_trait]
impl RestaurantStore for PgStore {
    async fn find_all(&self) -> Result<Vec<Restaurant>, Report> {
        self.find(&RestaurantQuery::all()).await
    }

    async fn find_by_id(&self, id: &RestaurantId) -> Result<Option<Restaurant>, Report> {
        let sql = format!("SELECT {} FROM restaurants WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(RestaurantRow::into_restaurant))
    }

    async fn find(&self, query: &RestaurantQuery) -> Result<Vec<Restaurant>, Report> {
        let (sql, params) = select_sql(query);
        debug!(sql = sql.as_str(), "Running restaurant query");
        let mut statement = sqlx::query_as::<_, RestaurantRow>(&sql);
        for param in params {
            statement = match param {
                Bind::Text(value) => statement.bind(value),
                Bind::Int(value) => statement.bind(value),
                Bind::Bool(value) => statement.bind(value),
            };
        }
        let rows = statement.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(RestaurantRow::into_restaurant).collect())
    }

    async fn find_voted_by(
        &self,
        user: &UserId,
        direction: VoteDirection,
        page: PageRequest,
    ) -> Result<Page<Restaurant>, Report> {
        let column = voter_column(direction);
        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT count(*) FROM restaurants WHERE $1 = ANY({})",
            column
        ))
        .bind(user.as_str())
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {} FROM restaurants WHERE $1 = ANY({}) ORDER BY seq LIMIT $2 OFFSET $3",
            COLUMNS, column
        );
        let rows = sqlx::query_as::<_, RestaurantRow>(&sql)
            .bind(user.as_str())
            .bind(i64::from(page.size))
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        Ok(Page {
            content: rows.into_iter().map(RestaurantRow::into_restaurant).collect(),
            request: page,
            total_elements: total as u64,
        })
    }

    async fn load_votes(&self, id: &RestaurantId) -> Result<Option<Versioned<VoteState>>, Report> {
        let row: Option<(Vec<String>, Vec<String>, i64)> = sqlx::query_as(
            "SELECT upvote_user_ids, downvote_user_ids, version FROM restaurants WHERE id = $1",
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(up, down, version)| Versioned {
            version,
            value: RestaurantRow::votes(up, down),
        }))
    }

    async fn save_votes(
        &self,
        id: &RestaurantId,
        expected_version: i64,
        votes: &VoteState,
    ) -> Result<bool, Report> {
        let counts = votes.counts();
        let up: Vec<String> = votes.upvoters().iter().map(|u| u.0.clone()).collect();
        let down: Vec<String> = votes.downvoters().iter().map(|u| u.0.clone()).collect();
        let result = sqlx::query(
            r#"
            UPDATE restaurants
            SET upvote_user_ids = $3, downvote_user_ids = $4,
                upvote_count = $5, downvote_count = $6, vote_count = $7,
                version = version + 1
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(id.as_str())
        .bind(expected_version)
        .bind(up)
        .bind(down)
        .bind(counts.upvotes)
        .bind(counts.downvotes)
        .bind(counts.net())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}

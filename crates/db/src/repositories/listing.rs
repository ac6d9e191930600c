use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite};
use tracing::debug;

use immo_core::criteria::{ListingFilter, APARTMENT_TYPE};
use immo_core::domain::listing::{Listing, ListingId};

use super::{ListingRepository, RepositoryError};
use crate::{DbPool, LISTING_FOLD_COLLATION};

// Numeric columns are cast so rows written with mixed storage classes still decode.
// Predicates compare the same expressions, NULL folded to 0 as decoding does.
const AREA: &str = "COALESCE(CAST(area AS REAL), 0.0)";
const PRICE: &str = "COALESCE(CAST(price AS REAL), 0.0)";
const ROOM_COUNT: &str = "COALESCE(CAST(room_count AS INTEGER), 0)";

const SELECT_LISTING: &str = "SELECT id, title, CAST(area AS REAL) AS area, \
     CAST(price AS REAL) AS price, url, department, real_estate_type, \
     CAST(room_count AS INTEGER) AS room_count \
     FROM real_estate";

pub struct SqlListingRepository {
    pool: DbPool,
}

impl SqlListingRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// One pooled connection per call, returned to the pool when dropped on any exit path.
    async fn acquire(&self) -> Result<PoolConnection<Sqlite>, RepositoryError> {
        self.pool.acquire().await.map_err(RepositoryError::Unavailable)
    }
}

fn push_predicate(query: &mut QueryBuilder<'_, Sqlite>, filter: &ListingFilter) {
    match filter {
        ListingFilter::All => {}
        ListingFilter::City(city) => {
            query
                .push(" WHERE department = ")
                .push_bind(city.as_str().to_owned())
                .push(" COLLATE ")
                .push(LISTING_FOLD_COLLATION);
        }
        ListingFilter::MaxPrice(budget) => {
            query.push(" WHERE ").push(PRICE).push(" <= ").push_bind(budget.amount());
        }
        ListingFilter::MinArea(threshold) => {
            query.push(" WHERE ").push(AREA).push(" >= ").push_bind(threshold.square_meters());
        }
        ListingFilter::MinRooms(rooms) => {
            query
                .push(" WHERE ")
                .push(ROOM_COUNT)
                .push(" >= ")
                .push_bind(i64::from(rooms.get()))
                .push(" AND real_estate_type = ")
                .push_bind(APARTMENT_TYPE)
                .push(" COLLATE ")
                .push(LISTING_FOLD_COLLATION);
        }
        ListingFilter::HouseType(house_type) => {
            query
                .push(" WHERE real_estate_type = ")
                .push_bind(house_type.as_str().to_owned())
                .push(" COLLATE ")
                .push(LISTING_FOLD_COLLATION);
        }
    }
}

fn decode(error: sqlx::Error) -> RepositoryError {
    RepositoryError::Decode(error.to_string())
}

fn row_to_listing(row: &SqliteRow) -> Result<Listing, RepositoryError> {
    let id: i64 = row.try_get("id").map_err(decode)?;
    let title: Option<String> = row.try_get("title").map_err(decode)?;
    let area: Option<f64> = row.try_get("area").map_err(decode)?;
    let price: Option<f64> = row.try_get("price").map_err(decode)?;
    let url: Option<String> = row.try_get("url").map_err(decode)?;
    let department: Option<String> = row.try_get("department").map_err(decode)?;
    let real_estate_type: Option<String> = row.try_get("real_estate_type").map_err(decode)?;
    let room_count: Option<i64> = row.try_get("room_count").map_err(decode)?;

    let room_count = u32::try_from(room_count.unwrap_or_default()).map_err(|_| {
        RepositoryError::Decode(format!("listing {id} has an out-of-range room_count"))
    })?;

    Ok(Listing {
        id: ListingId(id),
        title: title.unwrap_or_default(),
        area: area.unwrap_or_default(),
        price: price.unwrap_or_default(),
        url: url.unwrap_or_default(),
        city: department.unwrap_or_default(),
        real_estate_type: real_estate_type.unwrap_or_default(),
        room_count,
    })
}

#[async_trait]
impl ListingRepository for SqlListingRepository {
    async fn find(&self, filter: &ListingFilter) -> Result<Vec<Listing>, RepositoryError> {
        let mut conn = self.acquire().await?;

        let mut query: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_LISTING);
        push_predicate(&mut query, filter);
        let rows = query.build().fetch_all(&mut *conn).await?;

        debug!(
            event_name = "store.listing.find",
            query_kind = ?filter.kind(),
            rows = rows.len(),
            "listing query executed"
        );

        rows.iter().map(row_to_listing).collect::<Result<Vec<_>, _>>()
    }

    async fn find_by_id(&self, id: ListingId) -> Result<Option<Listing>, RepositoryError> {
        let mut conn = self.acquire().await?;

        let row = sqlx::query(&format!("{SELECT_LISTING} WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&mut *conn)
            .await?;

        debug!(
            event_name = "store.listing.find_by_id",
            listing_id = id.0,
            found = row.is_some(),
            "listing lookup executed"
        );

        row.as_ref().map(row_to_listing).transpose()
    }
}

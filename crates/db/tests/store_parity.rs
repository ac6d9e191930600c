use std::collections::BTreeSet;

use serde_json::{json, Value};

use immo_core::criteria::QueryKind;
use immo_core::Listing;
use immo_db::{
    connect_with_settings, migrations, DemoListings, InMemoryListingRepository,
    ListingRepository, SqlListingRepository,
};

type ParityTestResult<T = ()> = Result<T, String>;

macro_rules! require_eq {
    ($left:expr, $right:expr, $($arg:tt)*) => {
        if $left != $right {
            return Err(format!($($arg)*));
        }
    };
}

fn id_set(listings: &[Listing]) -> BTreeSet<i64> {
    listings.iter().map(|listing| listing.id.0).collect()
}

fn cases() -> Vec<(QueryKind, Value)> {
    vec![
        (QueryKind::Catalog, Value::Null),
        (QueryKind::City, json!("lyon")),
        (QueryKind::City, json!("PARIS")),
        (QueryKind::City, json!("Marseille")),
        (QueryKind::Budget, json!(300000)),
        (QueryKind::Budget, json!("215000")),
        (QueryKind::Budget, json!(0)),
        (QueryKind::Area, json!(96)),
        (QueryKind::Area, json!("-5")),
        (QueryKind::RoomCount, json!(0)),
        (QueryKind::RoomCount, json!(3)),
        (QueryKind::HouseType, json!("Maison")),
        (QueryKind::HouseType, json!("appartement")),
        (QueryKind::HouseType, json!("château")),
    ]
}

#[tokio::test]
async fn sql_and_memory_stores_return_the_same_rows() -> ParityTestResult {
    let pool = connect_with_settings("sqlite::memory:", 1, 5).await.map_err(|e| e.to_string())?;
    migrations::run_pending(&pool).await.map_err(|e| e.to_string())?;
    DemoListings::load(&pool).await.map_err(|e| e.to_string())?;

    let sql = SqlListingRepository::new(pool.clone());
    let memory = InMemoryListingRepository::with_listings(
        sql.find_all().await.map_err(|e| e.to_string())?,
    );

    for (kind, raw) in cases() {
        let filter = kind.filter_from_slot(Some(&raw)).map_err(|e| e.to_string())?;
        let from_sql = sql.find(&filter).await.map_err(|e| e.to_string())?;
        let from_memory = memory.find(&filter).await.map_err(|e| e.to_string())?;

        require_eq!(
            id_set(&from_sql),
            id_set(&from_memory),
            "{kind:?} {raw}: sql {:?} != memory {:?}",
            id_set(&from_sql),
            id_set(&from_memory)
        );
        for listing in &from_sql {
            require_eq!(
                filter.matches(listing),
                true,
                "{kind:?} {raw}: listing {} does not satisfy the filter",
                listing.id
            );
        }
    }

    pool.close().await;
    Ok(())
}

#[tokio::test]
async fn demo_catalogue_answers_the_documented_queries() -> ParityTestResult {
    let pool = connect_with_settings("sqlite::memory:", 1, 5).await.map_err(|e| e.to_string())?;
    migrations::run_pending(&pool).await.map_err(|e| e.to_string())?;
    DemoListings::load(&pool).await.map_err(|e| e.to_string())?;
    let sql = SqlListingRepository::new(pool.clone());

    let lyon = QueryKind::City.filter_from_slot(Some(&json!("Lyon"))).map_err(|e| e.to_string())?;
    require_eq!(
        id_set(&sql.find(&lyon).await.map_err(|e| e.to_string())?),
        BTreeSet::from([1, 2, 3]),
        "Lyon should hold listings 1, 2 and 3"
    );

    let rooms =
        QueryKind::RoomCount.filter_from_slot(Some(&json!(3))).map_err(|e| e.to_string())?;
    require_eq!(
        id_set(&sql.find(&rooms).await.map_err(|e| e.to_string())?),
        BTreeSet::from([3, 5]),
        "only apartments with three or more rooms should match"
    );

    pool.close().await;
    Ok(())
}

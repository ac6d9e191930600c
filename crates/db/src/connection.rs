use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use immo_core::criteria::fold_case;

pub type DbPool = sqlx::SqlitePool;

/// Collation comparing text the way criteria are folded: trimmed, Unicode lowercase.
/// SQLite's own `LOWER` folds ASCII only.
pub const LISTING_FOLD_COLLATION: &str = "listing_fold";

/// Opens the listing store pool. `timeout_secs` bounds how long a caller waits for a
/// connection; exceeding it surfaces as a store-unavailable condition, never as "no rows".
pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .collation(LISTING_FOLD_COLLATION, |left, right| fold_case(left).cmp(&fold_case(right)));

    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect_with(options)
        .await
}

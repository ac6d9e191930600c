//! Schema for local and demo stores. Production listing tables are owned elsewhere;
//! nothing in the query path depends on these migrations having run.

use sqlx::migrate::{MigrateError, Migrator};

use crate::DbPool;

pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

pub async fn run_pending(pool: &DbPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await
}

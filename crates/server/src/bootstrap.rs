use std::sync::Arc;

use immo_actions::{default_registry, ActionRegistry};
use immo_core::config::{AppConfig, ConfigError, LoadOptions};
use immo_db::{connect_with_settings, DbPool, SqlListingRepository};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub registry: Arc<ActionRegistry>,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

/// Opens the listing store and wires every action to it. The schema is not touched; the
/// listing table is owned by whoever populates the store (`immo migrate` for local use).
pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        selection_mode = ?config.selection.mode,
        "starting application bootstrap"
    );

    let db_pool = connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    let repository = Arc::new(SqlListingRepository::new(db_pool.clone()));
    let registry = Arc::new(default_registry(repository, config.selection.mode));
    info!(
        event_name = "system.bootstrap.actions_registered",
        correlation_id = "bootstrap",
        actions = registry.len(),
        "assistant actions registered"
    );

    Ok(Application { config, db_pool, registry })
}

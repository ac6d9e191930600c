use std::sync::Arc;

use serde_json::{json, Value};

use crate::commands::{
    build_runtime, load_config, open_pool, CommandResult, EXIT_UNKNOWN_ACTION,
};
use immo_actions::{default_registry, DispatchError, Tracker};
use immo_db::SqlListingRepository;

/// Parses `KEY=VALUE`. The value is decoded as JSON when it is valid JSON and kept as
/// text otherwise, so `budget=250000` is a number and `city=Lyon` a string.
pub fn parse_slot(raw: &str) -> Result<(String, Value), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("slot name is empty in `{raw}`"));
    }

    let value = serde_json::from_str::<Value>(value)
        .unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

pub fn run(name: &str, slots: Vec<(String, Value)>, sender: &str) -> CommandResult {
    let config = match load_config("action") {
        Ok(config) => config,
        Err(failure) => return failure,
    };
    let runtime = match build_runtime("action") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let mut tracker = Tracker::new(sender);
    tracker.slots.extend(slots);

    let result = runtime.block_on(async {
        let pool = open_pool(&config).await?;
        let registry = default_registry(
            Arc::new(SqlListingRepository::new(pool.clone())),
            config.selection.mode,
        );

        let executed = registry.execute(name, &tracker).await.map_err(|error| match error {
            DispatchError::UnknownAction(_) => {
                ("unknown_action", error.to_string(), EXIT_UNKNOWN_ACTION)
            }
        });

        pool.close().await;
        executed
    });

    match result {
        Ok(response) => CommandResult::success_with_data(
            "action",
            format!("{name} produced {} message(s)", response.responses.len()),
            Some(json!({ "responses": response.responses, "events": response.events })),
        ),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("action", error_class, message, exit_code)
        }
    }
}

use std::env;
use std::fs;
use std::path::Path;

use immo_core::config::resolve_config_path;
use serde::Serialize;
use serde_json::json;
use toml::Value;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct ConfigField {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(result) => return result,
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields: [(&str, String, &[&str]); 9] = [
        ("database.url", config.database.url.clone(), &["IMMO_DATABASE_URL"]),
        (
            "database.max_connections",
            config.database.max_connections.to_string(),
            &["IMMO_DATABASE_MAX_CONNECTIONS"],
        ),
        (
            "database.timeout_secs",
            config.database.timeout_secs.to_string(),
            &["IMMO_DATABASE_TIMEOUT_SECS"],
        ),
        ("server.bind_address", config.server.bind_address.clone(), &["IMMO_SERVER_BIND_ADDRESS"]),
        ("server.port", config.server.port.to_string(), &["IMMO_SERVER_PORT"]),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            &["IMMO_SERVER_GRACEFUL_SHUTDOWN_SECS"],
        ),
        ("selection.mode", format!("{:?}", config.selection.mode), &["IMMO_SELECTION_MODE"]),
        ("logging.level", config.logging.level.clone(), &["IMMO_LOGGING_LEVEL", "IMMO_LOG_LEVEL"]),
        (
            "logging.format",
            format!("{:?}", config.logging.format),
            &["IMMO_LOGGING_FORMAT", "IMMO_LOG_FORMAT"],
        ),
    ];

    let fields = fields
        .into_iter()
        .map(|(key, value, env_keys)| ConfigField {
            key,
            value,
            source: field_source(
                key,
                env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        })
        .collect::<Vec<_>>();

    CommandResult::success_with_data(
        "config",
        "effective config (source precedence: env > file > default)",
        Some(json!({
            "config_file": render_path(config_file_path.as_deref()),
            "fields": fields,
        })),
    )
}

fn render_path(path: Option<&Path>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| "<none>".to_string())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            return format!("file ({})", render_path(config_file_path));
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

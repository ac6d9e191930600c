use std::env;
use std::sync::{Mutex, OnceLock};

use immo_cli::commands::{action, config, doctor, migrate, seed};
use serde_json::{json, Value};

#[test]
fn migrate_returns_success_with_valid_env() {
    let store = tempfile::tempdir().expect("tempdir");
    let url = database_url(&store);
    with_env(&[("IMMO_DATABASE_URL", &url)], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run: {}", result.output);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("IMMO_DATABASE_URL", "postgres://localhost/immo")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn config_reports_sources_as_json() {
    with_env(&[("IMMO_SELECTION_MODE", "primary_key")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        let fields = payload["data"]["fields"].as_array().expect("fields");
        let mode = fields.iter().find(|field| field["key"] == "selection.mode").expect("mode");
        assert_eq!(mode["value"], "PrimaryKey");
        assert_eq!(mode["source"], "env (IMMO_SELECTION_MODE)");
    });
}

#[test]
fn config_returns_config_failure_for_non_sqlite_url() {
    with_env(&[("IMMO_DATABASE_URL", "postgres://localhost/immo")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 2);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "config");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn seed_is_repeatable() {
    let store = tempfile::tempdir().expect("tempdir");
    let url = database_url(&store);
    with_env(&[("IMMO_DATABASE_URL", &url)], || {
        for _ in 0..2 {
            let result = seed::run();
            assert_eq!(result.exit_code, 0, "expected seed success: {}", result.output);

            let payload = parse_payload(&result.output);
            assert_eq!(payload["command"], "seed");
            assert_eq!(payload["message"], "demo catalogue loaded: 8 listings");
        }
    });
}

#[test]
fn action_runs_against_seeded_store() {
    let store = tempfile::tempdir().expect("tempdir");
    let url = database_url(&store);
    with_env(&[("IMMO_DATABASE_URL", &url)], || {
        assert_eq!(seed::run().exit_code, 0);

        let result = action::run(
            "action_filter_houses_by_city",
            vec![("city".to_string(), json!("NICE"))],
            "cli-test",
        );
        assert_eq!(result.exit_code, 0, "expected action success: {}", result.output);

        let payload = parse_payload(&result.output);
        let text = payload["data"]["responses"][0]["text"].as_str().expect("response text");
        assert!(text.starts_with("Maisons disponibles à Nice :\n1- Villa vue mer : 210 m²"));
        assert_eq!(payload["data"]["events"][0]["name"], "listing_result_ids");
        assert_eq!(payload["data"]["events"][0]["value"], json!([6]));
    });
}

#[test]
fn action_selects_by_primary_key_when_configured() {
    let store = tempfile::tempdir().expect("tempdir");
    let url = database_url(&store);
    with_env(&[("IMMO_DATABASE_URL", &url), ("IMMO_SELECTION_MODE", "primary_key")], || {
        assert_eq!(seed::run().exit_code, 0);

        let slots = vec![("house_choice".to_string(), json!("7"))];
        let result = action::run("action_select_house", slots, "cli");
        let payload = parse_payload(&result.output);
        let events = payload["data"]["events"].as_array().expect("events");
        assert_eq!(events.len(), 5);
        assert_eq!(events[1]["value"], "Maison de ville");
    });
}

#[test]
fn unknown_action_has_dedicated_exit_code() {
    let store = tempfile::tempdir().expect("tempdir");
    let url = database_url(&store);
    with_env(&[("IMMO_DATABASE_URL", &url)], || {
        let result = action::run("action_book_visit", Vec::new(), "cli");
        assert_eq!(result.exit_code, 6);

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "unknown_action");
        assert_eq!(payload["message"], "No registered action found for name 'action_book_visit'.");
    });
}

#[test]
fn doctor_flags_missing_listing_table() {
    let store = tempfile::tempdir().expect("tempdir");
    let url = database_url(&store);
    with_env(&[("IMMO_DATABASE_URL", &url)], || {
        let result = doctor::run(true);
        assert_eq!(result.exit_code, 5, "expected store setup failure: {}", result.output);

        let report = parse_payload(&result.output);
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][1]["name"], "database_connectivity");
        assert_eq!(report["checks"][1]["status"], "pass");
        assert_eq!(report["checks"][2]["name"], "listing_table");
        assert_eq!(report["checks"][2]["status"], "fail");

        assert_eq!(migrate::run().exit_code, 0);
        assert_eq!(doctor::run(true).exit_code, 0);
    });
}

fn database_url(dir: &tempfile::TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("immo.db").display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid json")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "IMMO_DATABASE_URL",
        "IMMO_DATABASE_MAX_CONNECTIONS",
        "IMMO_DATABASE_TIMEOUT_SECS",
        "IMMO_SERVER_BIND_ADDRESS",
        "IMMO_SERVER_PORT",
        "IMMO_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "IMMO_SELECTION_MODE",
        "IMMO_LOGGING_LEVEL",
        "IMMO_LOGGING_FORMAT",
        "IMMO_LOG_LEVEL",
        "IMMO_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}

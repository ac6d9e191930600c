use immo_core::config::{AppConfig, LoadOptions};
use immo_db::connect_with_settings;
use serde::Serialize;

use crate::commands::{
    CommandResult, EXIT_CONFIG, EXIT_CONNECTIVITY, EXIT_RUNTIME, EXIT_STORE_SETUP,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
    #[serde(skip)]
    exit_code: u8,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into(), exit_code: 0 }
    }

    fn fail(name: &'static str, details: impl Into<String>, exit_code: u8) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into(), exit_code }
    }

    fn skipped(name: &'static str) -> Self {
        Self {
            name,
            status: CheckStatus::Skipped,
            details: "skipped because an earlier check failed".to_string(),
            exit_code: 0,
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    /// Exit code of the first failed check, 0 when everything passed.
    fn exit_code(&self) -> u8 {
        self.checks
            .iter()
            .find(|check| check.status == CheckStatus::Fail)
            .map_or(0, |check| check.exit_code)
    }
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = report.exit_code();

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck::pass(
                "config_validation",
                format!("configuration loaded (selection mode {:?})", config.selection.mode),
            ));
            checks.extend(check_store(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck::fail("config_validation", error.to_string(), EXIT_CONFIG));
            checks.push(DoctorCheck::skipped("database_connectivity"));
            checks.push(DoctorCheck::skipped("listing_table"));
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

/// Connectivity, then the presence of the listing table.
fn check_store(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![
                DoctorCheck::fail(
                    "database_connectivity",
                    format!("failed to initialize async runtime: {error}"),
                    EXIT_RUNTIME,
                ),
                DoctorCheck::skipped("listing_table"),
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_settings(
            &config.database.url,
            config.database.max_connections,
            config.database.timeout_secs,
        )
        .await
        {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck::fail(
                        "database_connectivity",
                        format!("failed to connect to database: {error}"),
                        EXIT_CONNECTIVITY,
                    ),
                    DoctorCheck::skipped("listing_table"),
                ];
            }
        };

        let connectivity = DoctorCheck::pass(
            "database_connectivity",
            format!("connected using `{}`", config.database.url),
        );
        let listing_table =
            match sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM real_estate")
                .fetch_one(&pool)
                .await
            {
                Ok(count) => {
                    DoctorCheck::pass("listing_table", format!("{count} listings available"))
                }
                Err(error) => DoctorCheck::fail(
                    "listing_table",
                    format!("listing table is not readable (run `immo migrate`): {error}"),
                    EXIT_STORE_SETUP,
                ),
            };

        pool.close().await;
        vec![connectivity, listing_table]
    })
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}

fn escape_json(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{CheckStatus, DoctorCheck, DoctorReport};

    #[test]
    fn exit_code_follows_first_failed_check() {
        let report = DoctorReport {
            overall_status: CheckStatus::Fail,
            summary: String::new(),
            checks: vec![
                DoctorCheck::pass("config_validation", "ok"),
                DoctorCheck::fail("database_connectivity", "down", 4),
                DoctorCheck::fail("listing_table", "missing", 5),
            ],
        };

        assert_eq!(report.exit_code(), 4);
    }
}

use leadbot_agent::EmailTemplates;
use leadbot_core::config::{AppConfig, LoadOptions};
use leadbot_db::{connect_from_config, migrations, DbPool};
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_DATABASE};

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
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    command: &'static str,
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

const MANAGED_TABLES: [&str; 3] = ["conversation_session", "lead", "email_log"];

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = exit_code(&report);

    let output = if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"command\":\"doctor\",\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        })
    } else {
        render_human(&report)
    };

    CommandResult { exit_code, output }
}

fn build_report() -> DoctorReport {
    let mut checks = vec![check_email_templates()];

    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(check_database(&config));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            for name in ["database_connectivity", "database_schema"] {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
    let overall_status = if all_pass { CheckStatus::Pass } else { CheckStatus::Fail };
    let summary = if all_pass {
        "doctor: all readiness checks passed".to_string()
    } else {
        "doctor: one or more readiness checks failed".to_string()
    };

    DoctorReport { command: "doctor", overall_status, summary, checks }
}

fn exit_code(report: &DoctorReport) -> u8 {
    let failed = |name: &str| {
        report.checks.iter().any(|check| check.name == name && check.status == CheckStatus::Fail)
    };
    if failed("config_validation") {
        EXIT_CONFIG
    } else if report.overall_status == CheckStatus::Fail {
        EXIT_DATABASE
    } else {
        0
    }
}

fn check_email_templates() -> DoctorCheck {
    match EmailTemplates::new() {
        Ok(_) => DoctorCheck {
            name: "email_templates",
            status: CheckStatus::Pass,
            details: "confirmation, quote and review templates compiled".to_string(),
        },
        Err(error) => DoctorCheck {
            name: "email_templates",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
    }
}

fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return vec![DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Fail,
                details: format!("failed to initialize async runtime: {error}"),
            }];
        }
    };

    runtime.block_on(async {
        let pool = match connect_from_config(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck {
                        name: "database_connectivity",
                        status: CheckStatus::Fail,
                        details: format!("failed to connect to database: {error}"),
                    },
                    DoctorCheck {
                        name: "database_schema",
                        status: CheckStatus::Skipped,
                        details: "skipped because the database is unreachable".to_string(),
                    },
                ];
            }
        };

        let connectivity = DoctorCheck {
            name: "database_connectivity",
            status: CheckStatus::Pass,
            details: format!("connected using `{}`", config.database.url),
        };
        let schema = check_schema(&pool).await;
        pool.close().await;
        vec![connectivity, schema]
    })
}

async fn check_schema(pool: &DbPool) -> DoctorCheck {
    let mut missing = Vec::new();
    for table in MANAGED_TABLES {
        if !migrations::table_exists(pool, table).await.unwrap_or(false) {
            missing.push(table);
        }
    }

    if missing.is_empty() {
        DoctorCheck {
            name: "database_schema",
            status: CheckStatus::Pass,
            details: "all managed tables present".to_string(),
        }
    } else {
        DoctorCheck {
            name: "database_schema",
            status: CheckStatus::Fail,
            details: format!("missing tables: {}; run `leadbot migrate`", missing.join(", ")),
        }
    }
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

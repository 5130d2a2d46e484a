use serde::Serialize;
use sitetrack_core::config::AppConfig;
use sitetrack_db::{connect_with_config, migrations, ping};

use crate::commands::{load_config, render, runtime, CommandResult, EXIT_READINESS};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct DoctorCheck {
    pub name: &'static str,
    pub status: CheckStatus,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub command: &'static str,
    pub overall_status: CheckStatus,
    pub summary: String,
    pub checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> CommandResult {
    let report = build_report();
    let exit_code = if report.overall_status == CheckStatus::Pass { 0 } else { EXIT_READINESS };
    let output = if json_output { render(&report) } else { render_human(&report) };

    CommandResult { exit_code, output }
}

pub fn build_report() -> DoctorReport {
    let mut checks = Vec::new();

    match load_config() {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.extend(check_database(&config));
        }
        Err((_, message, _)) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: message,
            });
            for name in ["database_connectivity", "schema_migrations"] {
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

fn check_database(config: &AppConfig) -> Vec<DoctorCheck> {
    let runtime = match runtime() {
        Ok(runtime) => runtime,
        Err((_, message, _)) => {
            return vec![
                DoctorCheck { name: "database_connectivity", status: CheckStatus::Fail, details: message },
                DoctorCheck {
                    name: "schema_migrations",
                    status: CheckStatus::Skipped,
                    details: "skipped because no runtime was available".to_string(),
                },
            ];
        }
    };

    runtime.block_on(async {
        let pool = match connect_with_config(&config.database).await {
            Ok(pool) => pool,
            Err(error) => {
                return vec![
                    DoctorCheck {
                        name: "database_connectivity",
                        status: CheckStatus::Fail,
                        details: format!("failed to connect to database: {error}"),
                    },
                    DoctorCheck {
                        name: "schema_migrations",
                        status: CheckStatus::Skipped,
                        details: "skipped because the database is unreachable".to_string(),
                    },
                ];
            }
        };

        let connectivity = match ping(&pool).await {
            Ok(()) => DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Pass,
                details: format!("connected using `{}`", config.database.url),
            },
            Err(error) => DoctorCheck {
                name: "database_connectivity",
                status: CheckStatus::Fail,
                details: format!("database did not answer: {error}"),
            },
        };

        let schema = match migrations::pending_count(&pool).await {
            Ok(0) => DoctorCheck {
                name: "schema_migrations",
                status: CheckStatus::Pass,
                details: "all migrations applied".to_string(),
            },
            Ok(pending) => DoctorCheck {
                name: "schema_migrations",
                status: CheckStatus::Fail,
                details: format!("{pending} migration(s) pending; run `sitetrack migrate`"),
            },
            Err(error) => DoctorCheck {
                name: "schema_migrations",
                status: CheckStatus::Fail,
                details: format!("could not read migration history: {error}"),
            },
        };

        pool.close().await;
        vec![connectivity, schema]
    })
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = vec![report.summary.clone()];

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

pub mod config;
pub mod doctor;
pub mod migrate;
pub mod seed;

use serde::Serialize;
use sitetrack_core::config::{AppConfig, LoadOptions};
use sitetrack_db::{connect_with_config, migrations, DbPool};
use tokio::runtime::Runtime;

pub const EXIT_CONFIG: u8 = 2;
pub const EXIT_RUNTIME: u8 = 3;
pub const EXIT_DB_CONNECTIVITY: u8 = 4;
pub const EXIT_MIGRATION: u8 = 5;
pub const EXIT_SEED: u8 = 6;
pub const EXIT_READINESS: u8 = 7;

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome<'a> {
    command: &'a str,
    status: &'static str,
    error_class: Option<&'a str>,
    message: String,
}

/// Failure carried out of a command body: class, message, exit code.
pub(crate) type Failure = (&'static str, String, u8);

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let payload = CommandOutcome { command, status: "ok", error_class: None, message: message.into() };
        Self { exit_code: 0, output: render(&payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command,
            status: "error",
            error_class: Some(error_class),
            message: message.into(),
        };
        Self { exit_code, output: render(&payload) }
    }

    pub(crate) fn from_failure(command: &str, (error_class, message, exit_code): Failure) -> Self {
        Self::failure(command, error_class, message, exit_code)
    }
}

pub(crate) fn render<T: Serialize>(payload: &T) -> String {
    serde_json::to_string(payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

pub(crate) fn load_config() -> Result<AppConfig, Failure> {
    AppConfig::load(LoadOptions::default()).map_err(|error| {
        ("config_validation", format!("configuration issue: {error}"), EXIT_CONFIG)
    })
}

pub(crate) fn runtime() -> Result<Runtime, Failure> {
    tokio::runtime::Builder::new_current_thread().enable_all().build().map_err(|error| {
        ("runtime_init", format!("failed to initialize async runtime: {error}"), EXIT_RUNTIME)
    })
}

/// Connects and applies pending migrations; returns how many were applied.
pub(crate) async fn connect_and_migrate(config: &AppConfig) -> Result<(DbPool, usize), Failure> {
    let pool = connect_with_config(&config.database)
        .await
        .map_err(|error| ("db_connectivity", error.to_string(), EXIT_DB_CONNECTIVITY))?;

    let pending = migrations::pending_count(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;
    migrations::run_pending(&pool)
        .await
        .map_err(|error| ("migration", error.to_string(), EXIT_MIGRATION))?;

    Ok((pool, pending))
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sitetrack_core::config::{resolve_config_path, AppConfig};
use toml::Value;

use crate::commands::{load_config, render, CommandResult};

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct EffectiveValue {
    pub key: &'static str,
    pub value: String,
    pub source: String,
}

#[derive(Debug, Serialize)]
struct ConfigReport<'a> {
    command: &'static str,
    status: &'static str,
    config_file: Option<String>,
    values: &'a [EffectiveValue],
}

pub fn run() -> CommandResult {
    let config = match load_config() {
        Ok(config) => config,
        Err(failure) => return CommandResult::from_failure("config", failure),
    };

    let config_file = resolve_config_path(None);
    let values = effective_values(&config, config_file.as_deref());
    let report = ConfigReport {
        command: "config",
        status: "ok",
        config_file: config_file.map(|path| path.display().to_string()),
        values: &values,
    };

    CommandResult { exit_code: 0, output: render(&report) }
}

/// Every setting with the layer it was taken from. Precedence is
/// env > file > default; the first env key listed for a setting wins.
pub fn effective_values(config: &AppConfig, config_file: Option<&Path>) -> Vec<EffectiveValue> {
    let doc = load_config_file_doc(config_file);
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, doc.as_ref(), config_file)
    };

    vec![
        EffectiveValue {
            key: "database.url",
            value: config.database.url.clone(),
            source: source("database.url", &["SITETRACK_DATABASE_URL", "DATABASE_URL"]),
        },
        EffectiveValue {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            source: source("database.max_connections", &["SITETRACK_DATABASE_MAX_CONNECTIONS"]),
        },
        EffectiveValue {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            source: source("database.timeout_secs", &["SITETRACK_DATABASE_TIMEOUT_SECS"]),
        },
        EffectiveValue {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            source: source("server.bind_address", &["SITETRACK_SERVER_BIND_ADDRESS"]),
        },
        EffectiveValue {
            key: "server.port",
            value: config.server.port.to_string(),
            source: source("server.port", &["SITETRACK_SERVER_PORT", "PORT"]),
        },
        EffectiveValue {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            source: source(
                "server.graceful_shutdown_secs",
                &["SITETRACK_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            ),
        },
        EffectiveValue {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["SITETRACK_LOGGING_LEVEL", "SITETRACK_LOG_LEVEL"]),
        },
        EffectiveValue {
            key: "logging.format",
            value: config.logging.format.as_str().to_string(),
            source: source(
                "logging.format",
                &["SITETRACK_LOGGING_FORMAT", "SITETRACK_LOG_FORMAT"],
            ),
        },
    ]
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    doc: Option<&Value>,
    config_file: Option<&Path>,
) -> String {
    let from_env = env_keys
        .iter()
        .find(|key| env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false));
    if let Some(key) = from_env {
        return format!("env ({key})");
    }

    if doc.is_some_and(|doc| contains_path(doc, key_path)) {
        let file = config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("config file"));
        return format!("file ({})", file.display());
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

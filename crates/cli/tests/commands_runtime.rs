use std::env;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use sitetrack_cli::commands::{config, doctor, migrate, seed};

fn database_url(dir: &Path) -> String {
    format!("sqlite://{}?mode=rwc", dir.join("sitetrack.db").display())
}

#[test]
fn migrate_applies_schema_once() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(dir.path());

    with_env(&[("SITETRACK_DATABASE_URL", &url)], || {
        let first = migrate::run();
        assert_eq!(first.exit_code, 0, "expected successful migrate run");
        let payload = parse_payload(&first.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
        assert_eq!(payload["message"], "applied 1 pending migration(s)");

        let second = migrate::run();
        assert_eq!(second.exit_code, 0);
        assert_eq!(parse_payload(&second.output)["message"], "schema already up to date");
    });
}

#[test]
fn migrate_reports_config_failure_class() {
    with_env(&[("SITETRACK_DATABASE_MAX_CONNECTIONS", "lots")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn migrate_reports_unreachable_database() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("sqlite://{}?mode=ro", dir.path().join("absent/site.db").display());

    with_env(&[("SITETRACK_DATABASE_URL", &url), ("SITETRACK_DATABASE_TIMEOUT_SECS", "1")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 4);
        assert_eq!(parse_payload(&result.output)["error_class"], "db_connectivity");
    });
}

#[test]
fn seed_is_idempotent_across_runs() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(dir.path());

    with_env(&[("SITETRACK_DATABASE_URL", &url)], || {
        let first = seed::run();
        assert_eq!(first.exit_code, 0, "expected first seed invocation success");
        let first_payload = parse_payload(&first.output);
        assert_eq!(first_payload["command"], "seed");
        assert_eq!(first_payload["message"], "demo data loaded: 3 project(s), 1 user(s)");

        let second = seed::run();
        assert_eq!(second.exit_code, 0, "expected second seed invocation success");
        assert_eq!(parse_payload(&second.output)["message"], "demo data already present");
    });
}

#[test]
fn config_attributes_hosted_database_url() {
    with_env(&[("DATABASE_URL", "sqlite://hosted.db"), ("SITETRACK_SERVER_PORT", "9100")], || {
        let result = config::run();
        assert_eq!(result.exit_code, 0);

        let payload = parse_payload(&result.output);
        let values = payload["values"].as_array().expect("values array");
        let lookup = |key: &str| {
            values.iter().find(|entry| entry["key"] == key).cloned().expect("listed key")
        };

        assert_eq!(lookup("database.url")["value"], "sqlite://hosted.db");
        assert_eq!(lookup("database.url")["source"], "env (DATABASE_URL)");
        assert_eq!(lookup("server.port")["value"], "9100");
        assert_eq!(lookup("server.port")["source"], "env (SITETRACK_SERVER_PORT)");
        assert_eq!(lookup("logging.format")["source"], "default");
    });
}

#[test]
fn doctor_flags_pending_schema_until_migrated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = database_url(dir.path());

    with_env(&[("SITETRACK_DATABASE_URL", &url)], || {
        let before = doctor::run(true);
        assert_eq!(before.exit_code, 7);
        let report = parse_payload(&before.output);
        assert_eq!(report["overall_status"], "fail");
        assert_eq!(report["checks"][1]["name"], "database_connectivity");
        assert_eq!(report["checks"][1]["status"], "pass");
        assert_eq!(report["checks"][2]["status"], "fail");

        assert_eq!(migrate::run().exit_code, 0);

        let after = doctor::run(true);
        assert_eq!(after.exit_code, 0);
        assert_eq!(parse_payload(&after.output)["overall_status"], "pass");
    });
}

#[test]
fn doctor_skips_database_checks_when_config_is_invalid() {
    with_env(&[("SITETRACK_LOGGING_FORMAT", "xml")], || {
        let result = doctor::run(false);
        assert_eq!(result.exit_code, 7);
        assert!(result.output.contains("- [fail] config_validation"));
        assert!(result.output.contains("- [skip] database_connectivity"));
    });
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().unwrap_or_else(|poisoned| poisoned.into_inner());

    let keys = [
        "SITETRACK_DATABASE_URL",
        "DATABASE_URL",
        "SITETRACK_DATABASE_MAX_CONNECTIONS",
        "SITETRACK_DATABASE_TIMEOUT_SECS",
        "SITETRACK_SERVER_BIND_ADDRESS",
        "SITETRACK_SERVER_PORT",
        "PORT",
        "SITETRACK_SERVER_GRACEFUL_SHUTDOWN_SECS",
        "SITETRACK_LOGGING_LEVEL",
        "SITETRACK_LOGGING_FORMAT",
        "SITETRACK_LOG_LEVEL",
        "SITETRACK_LOG_FORMAT",
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

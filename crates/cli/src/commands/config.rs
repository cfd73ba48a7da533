use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use toml::Value;

use crate::commands::{load_config, CommandResult};

#[derive(Debug, Serialize)]
struct Setting {
    key: &'static str,
    value: String,
    source: String,
}

pub fn run() -> CommandResult {
    let config = match load_config("config") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let file_path = detect_config_path();
    let file_doc = load_config_file_doc(file_path.as_deref());
    let source = |key: &'static str, env_keys: &[&str]| {
        field_source(key, env_keys, file_doc.as_ref(), file_path.as_deref())
    };

    let settings = vec![
        Setting {
            key: "database.url",
            value: config.database.url.clone(),
            source: source("database.url", &["LEADBOT_DATABASE_URL"]),
        },
        Setting {
            key: "database.max_connections",
            value: config.database.max_connections.to_string(),
            source: source("database.max_connections", &["LEADBOT_DATABASE_MAX_CONNECTIONS"]),
        },
        Setting {
            key: "database.timeout_secs",
            value: config.database.timeout_secs.to_string(),
            source: source("database.timeout_secs", &["LEADBOT_DATABASE_TIMEOUT_SECS"]),
        },
        Setting {
            key: "server.bind_address",
            value: config.server.bind_address.clone(),
            source: source("server.bind_address", &["LEADBOT_SERVER_BIND_ADDRESS"]),
        },
        Setting {
            key: "server.port",
            value: config.server.port.to_string(),
            source: source("server.port", &["LEADBOT_SERVER_PORT"]),
        },
        Setting {
            key: "server.cors_origins",
            value: config.server.cors_origins.join(","),
            source: source("server.cors_origins", &["LEADBOT_SERVER_CORS_ORIGINS"]),
        },
        Setting {
            key: "server.graceful_shutdown_secs",
            value: config.server.graceful_shutdown_secs.to_string(),
            source: source(
                "server.graceful_shutdown_secs",
                &["LEADBOT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            ),
        },
        Setting {
            key: "logging.level",
            value: config.logging.level.clone(),
            source: source("logging.level", &["LEADBOT_LOGGING_LEVEL", "LEADBOT_LOG_LEVEL"]),
        },
        Setting {
            key: "logging.format",
            value: format!("{:?}", config.logging.format).to_lowercase(),
            source: source("logging.format", &["LEADBOT_LOGGING_FORMAT", "LEADBOT_LOG_FORMAT"]),
        },
    ];

    CommandResult::success_with(
        "config",
        "effective config (source precedence: env > file > default)",
        serde_json::to_value(&settings).ok(),
    )
}

fn detect_config_path() -> Option<PathBuf> {
    ["leadbot.toml", "config/leadbot.toml"].into_iter().map(PathBuf::from).find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let raw = fs::read_to_string(path?).ok()?;
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
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
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

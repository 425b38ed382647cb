//! Relay configuration loader.
//!
//! Reads an optional `parley.toml` into [`RelayConfig`], then layers the
//! environment on top. Falls back to defaults when the file is missing or
//! malformed. The environment is read through a lookup closure so tests never
//! touch the process environment.

use std::path::Path;

use secrecy::SecretString;

use parley_types::config::RelayConfig;
use parley_types::error::ConfigError;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
pub const ENV_INSTRUCTION: &str = "AI_INSTRUCTION";
pub const ENV_TASK_TITLE: &str = "TASK_TITLE";
pub const ENV_TASK_DESCRIPTION: &str = "TASK_DESCRIPTION";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_PUBLIC_DIR: &str = "PARLEY_PUBLIC_DIR";
pub const ENV_ISOLATE_SESSIONS: &str = "PARLEY_ISOLATE_SESSIONS";
pub const ENV_DISCARD_PARTIAL_TURNS: &str = "PARLEY_DISCARD_PARTIAL_TURNS";

/// Load relay configuration from a toml file.
///
/// - Missing file: [`RelayConfig::default()`].
/// - Unreadable or unparsable file: logs a warning and returns the default.
pub async fn load_relay_config(path: &Path) -> RelayConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return RelayConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return RelayConfig::default();
        }
    };

    match parse_relay_config(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!("{}: {err}, using defaults", path.display());
            RelayConfig::default()
        }
    }
}

pub fn parse_relay_config(content: &str) -> Result<RelayConfig, ConfigError> {
    toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// Apply environment overrides on top of a loaded config.
///
/// Empty values count as unset. `PORT` must be a valid port number and the
/// boolean switches accept `true/false`, `1/0`, `yes/no` or `on/off`.
pub fn apply_env_overrides<F>(mut config: RelayConfig, lookup: F) -> Result<RelayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(v) = get(ENV_INSTRUCTION) {
        config.instruction = v;
    }
    if let Some(v) = get(ENV_TASK_TITLE) {
        config.task_title = v;
    }
    if let Some(v) = get(ENV_TASK_DESCRIPTION) {
        config.task_description = v;
    }
    if let Some(v) = get(ENV_HOST) {
        config.host = v;
    }
    if let Some(v) = get(ENV_PORT) {
        config.port = v.trim().parse().map_err(|_| invalid(ENV_PORT, &v))?;
    }
    if let Some(v) = get(ENV_BASE_URL) {
        config.upstream.base_url = v;
    }
    if let Some(v) = get(ENV_PUBLIC_DIR) {
        config.public_dir = v;
    }
    if let Some(v) = get(ENV_ISOLATE_SESSIONS) {
        config.isolate_sessions = parse_switch(ENV_ISOLATE_SESSIONS, &v)?;
    }
    if let Some(v) = get(ENV_DISCARD_PARTIAL_TURNS) {
        config.discard_partial_turns = parse_switch(ENV_DISCARD_PARTIAL_TURNS, &v)?;
    }

    Ok(config)
}

/// Read the upstream API key. `None` when unset or blank.
pub fn resolve_api_key<F>(lookup: F) -> Option<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(ENV_API_KEY)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
}

/// Environment lookup backed by the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn parse_switch(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it from a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let gemini_api_key = require("GEMINI_API_KEY")?;

    let env = parse_environment(&or_default("LEADSCAN_ENV", "development"));
    let bind_addr = parse_var(&or_default, "LEADSCAN_BIND_ADDR", "0.0.0.0:5000")?;
    let log_level = or_default("LEADSCAN_LOG_LEVEL", "info");

    let gemini_model = or_default("LEADSCAN_GEMINI_MODEL", "gemini-2.0-flash-001");
    let gemini_base_url = or_default(
        "LEADSCAN_GEMINI_BASE_URL",
        "https://generativelanguage.googleapis.com/v1beta",
    );
    let ai_timeout_secs = parse_var(&or_default, "LEADSCAN_AI_TIMEOUT_SECS", "60")?;
    let ai_max_retries = parse_var(&or_default, "LEADSCAN_AI_MAX_RETRIES", "2")?;
    let ai_retry_backoff_ms = parse_var(&or_default, "LEADSCAN_AI_RETRY_BACKOFF_MS", "1000")?;

    let collector_url = lookup("LEADSCAN_COLLECTOR_URL")
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty());
    let source_timeout_secs = parse_var(&or_default, "LEADSCAN_SOURCE_TIMEOUT_SECS", "600")?;
    let max_items_per_target = parse_var(&or_default, "LEADSCAN_MAX_ITEMS_PER_TARGET", "50")?;
    let min_text_chars = parse_var(&or_default, "LEADSCAN_MIN_TEXT_CHARS", "10")?;

    let scan_interval_minutes: u32 =
        parse_var(&or_default, "LEADSCAN_SCAN_INTERVAL_MINUTES", "10")?;
    if scan_interval_minutes < 1 {
        return Err(ConfigError::InvalidEnvVar {
            var: "LEADSCAN_SCAN_INTERVAL_MINUTES".to_string(),
            reason: "interval must be at least 1 minute".to_string(),
        });
    }

    let targets_path = PathBuf::from(or_default("LEADSCAN_TARGETS_PATH", "./config/targets.yaml"));
    let scan_log_path = PathBuf::from(or_default(
        "LEADSCAN_SCAN_LOG_PATH",
        "./data/scan_history.jsonl",
    ));
    let leads_path = PathBuf::from(or_default("LEADSCAN_LEADS_PATH", "./data/leads.jsonl"));

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        gemini_api_key,
        gemini_model,
        gemini_base_url,
        ai_timeout_secs,
        ai_max_retries,
        ai_retry_backoff_ms,
        collector_url,
        source_timeout_secs,
        max_items_per_target,
        min_text_chars,
        scan_interval_minutes,
        targets_path,
        scan_log_path,
        leads_path,
    })
}

fn parse_var<T, D>(or_default: &D, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    D: Fn(&str, &str) -> String,
{
    let raw = or_default(var, default);
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

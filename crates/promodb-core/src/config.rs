use crate::app_config::AppConfig;
use crate::ConfigError;

/// User agent sent when `PROMODB_USER_AGENT` is unset. The promotions API
/// serves browser clients and expects a browser-like agent string.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36";

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
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let api_url = require("PROMODB_API_URL")?;
    if api_url.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "PROMODB_API_URL".to_string(),
            reason: "must not be empty".to_string(),
        });
    }

    let log_level = or_default("PROMODB_LOG_LEVEL", "info");
    let stores_path = PathBuf::from(or_default("PROMODB_STORES_PATH", "./config/stores.yaml"));
    let user_agent = or_default("PROMODB_USER_AGENT", DEFAULT_USER_AGENT);

    let request_timeout_secs: u64 = parse_with(
        "PROMODB_REQUEST_TIMEOUT_SECS",
        &or_default("PROMODB_REQUEST_TIMEOUT_SECS", "30"),
    )?;
    require_non_zero("PROMODB_REQUEST_TIMEOUT_SECS", request_timeout_secs == 0)?;

    let connect_timeout_secs: u64 = parse_with(
        "PROMODB_CONNECT_TIMEOUT_SECS",
        &or_default("PROMODB_CONNECT_TIMEOUT_SECS", "10"),
    )?;
    require_non_zero("PROMODB_CONNECT_TIMEOUT_SECS", connect_timeout_secs == 0)?;

    let page_size: u32 = parse_with("PROMODB_PAGE_SIZE", &or_default("PROMODB_PAGE_SIZE", "36"))?;
    require_non_zero("PROMODB_PAGE_SIZE", page_size == 0)?;

    let max_pages: usize =
        parse_with("PROMODB_MAX_PAGES", &or_default("PROMODB_MAX_PAGES", "1000"))?;
    require_non_zero("PROMODB_MAX_PAGES", max_pages == 0)?;

    let max_concurrent_stores: usize = parse_with(
        "PROMODB_MAX_CONCURRENT_STORES",
        &or_default("PROMODB_MAX_CONCURRENT_STORES", "0"),
    )?;

    Ok(AppConfig {
        api_url,
        log_level,
        stores_path,
        request_timeout_secs,
        connect_timeout_secs,
        user_agent,
        page_size,
        max_pages,
        max_concurrent_stores,
    })
}

fn parse_with<T>(var: &str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

fn require_non_zero(var: &str, is_zero: bool) -> Result<(), ConfigError> {
    if is_zero {
        return Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

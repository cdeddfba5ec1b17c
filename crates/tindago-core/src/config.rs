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
/// Tests drive this with a `HashMap` lookup instead of mutating process env.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::str::FromStr;

    fn parse_as<T>(var: &str, raw: &str) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        raw.trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    }

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("TINDAGO_ENV", "development"))?;

    let bind_addr: SocketAddr =
        parse_as("TINDAGO_BIND_ADDR", &or_default("TINDAGO_BIND_ADDR", "0.0.0.0:3000"))?;
    let log_level = or_default("TINDAGO_LOG_LEVEL", "info");

    let db_max_connections: u32 = parse_as(
        "TINDAGO_DB_MAX_CONNECTIONS",
        &or_default("TINDAGO_DB_MAX_CONNECTIONS", "10"),
    )?;
    let db_min_connections: u32 = parse_as(
        "TINDAGO_DB_MIN_CONNECTIONS",
        &or_default("TINDAGO_DB_MIN_CONNECTIONS", "1"),
    )?;
    let db_acquire_timeout_secs: u64 = parse_as(
        "TINDAGO_DB_ACQUIRE_TIMEOUT_SECS",
        &or_default("TINDAGO_DB_ACQUIRE_TIMEOUT_SECS", "10"),
    )?;

    if db_min_connections > db_max_connections {
        return Err(ConfigError::InvalidEnvVar {
            var: "TINDAGO_DB_MIN_CONNECTIONS".to_string(),
            reason: format!(
                "min connections ({db_min_connections}) exceeds max connections ({db_max_connections})"
            ),
        });
    }

    let blob_ttl_secs: u64 = parse_as(
        "TINDAGO_BLOB_TTL_SECS",
        &or_default("TINDAGO_BLOB_TTL_SECS", "900"),
    )?;
    if blob_ttl_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "TINDAGO_BLOB_TTL_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let default_page_size: i64 = parse_as(
        "TINDAGO_DEFAULT_PAGE_SIZE",
        &or_default("TINDAGO_DEFAULT_PAGE_SIZE", "50"),
    )?;
    if !(1..=200).contains(&default_page_size) {
        return Err(ConfigError::InvalidEnvVar {
            var: "TINDAGO_DEFAULT_PAGE_SIZE".to_string(),
            reason: format!("must be between 1 and 200, got {default_page_size}"),
        });
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        blob_ttl_secs,
        default_page_size,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s.trim() {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "TINDAGO_ENV".to_string(),
            reason: format!("expected development, test, or production; got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

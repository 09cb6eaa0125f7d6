use crate::app_config::{AppConfig, Environment};
use crate::{ConfigError, MAX_SEARCH_RADIUS_METERS};

const DEFAULT_PLACES_BASE_URL: &str = "https://places.googleapis.com/v1/";

/// Largest photo edge the Places media endpoint will serve.
const MAX_PHOTO_PX: u32 = 4_800;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if env vars hold invalid values.
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
/// Returns `ConfigError` if env vars hold invalid values.
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
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_radius = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let meters = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !meters.is_finite() || meters <= 0.0 || meters > MAX_SEARCH_RADIUS_METERS {
            return Err(invalid(
                var,
                format!("must be within (0, {MAX_SEARCH_RADIUS_METERS}] meters, got {meters}"),
            ));
        }
        Ok(meters)
    };

    let env = parse_environment(&or_default("DOGPARK_ENV", "development"))?;

    let bind_addr = or_default("DOGPARK_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("DOGPARK_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("DOGPARK_LOG_LEVEL", "info");
    let regions_path = lookup("DOGPARK_REGIONS_PATH").ok().map(PathBuf::from);

    let places_api_key = lookup("GOOGLE_PLACES_API_KEY")
        .ok()
        .filter(|key| !key.trim().is_empty());
    let places_base_url = or_default("DOGPARK_PLACES_BASE_URL", DEFAULT_PLACES_BASE_URL);

    let request_timeout_secs = parse_u64("DOGPARK_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("DOGPARK_USER_AGENT", "dogpark/0.1 (dog-park-finder)");

    let region_radius_meters = parse_radius("DOGPARK_REGION_RADIUS_METERS", "50000")?;
    let viewport_radius_cap_meters = parse_radius("DOGPARK_VIEWPORT_RADIUS_CAP_METERS", "30000")?;
    let viewport_search_delay_ms = parse_u64("DOGPARK_VIEWPORT_SEARCH_DELAY_MS", "0")?;

    let detail_concurrency = parse_usize("DOGPARK_DETAIL_CONCURRENCY", "1")?;
    if detail_concurrency == 0 {
        return Err(invalid(
            "DOGPARK_DETAIL_CONCURRENCY",
            "must be at least 1".to_string(),
        ));
    }

    let photo_max_px = parse_u32("DOGPARK_PHOTO_MAX_PX", "200")?;
    if !(1..=MAX_PHOTO_PX).contains(&photo_max_px) {
        return Err(invalid(
            "DOGPARK_PHOTO_MAX_PX",
            format!("must be within 1..={MAX_PHOTO_PX}, got {photo_max_px}"),
        ));
    }

    let initial_region = lookup("DOGPARK_INITIAL_REGION")
        .ok()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        regions_path,
        places_api_key,
        places_base_url,
        request_timeout_secs,
        user_agent,
        region_radius_meters,
        viewport_radius_cap_meters,
        viewport_search_delay_ms,
        detail_concurrency,
        photo_max_px,
        initial_region,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "DOGPARK_ENV".to_string(),
            reason: format!("expected development, test, or production, got '{other}'"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

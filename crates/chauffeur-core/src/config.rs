use std::path::PathBuf;

use crate::app_config::{AppConfig, EmailJsConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
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
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var).ok().filter(|v| !v.trim().is_empty())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let env = parse_environment(&or_default("CHAUFFEUR_ENV", "development"));
    let log_level = or_default("CHAUFFEUR_LOG_LEVEL", "info");
    let site_origin = or_default("CHAUFFEUR_SITE_ORIGIN", "http://localhost:3000")
        .trim_end_matches('/')
        .to_string();
    let google_maps_api_key = optional("GOOGLE_MAPS_API_KEY");
    let settings_path = PathBuf::from(or_default(
        "CHAUFFEUR_SETTINGS_PATH",
        "./chauffeur-settings.json",
    ));
    let pricing_path = optional("CHAUFFEUR_PRICING_PATH").map(PathBuf::from);

    let route_debounce_ms = parse_u64("CHAUFFEUR_ROUTE_DEBOUNCE_MS", "450")?;
    let maps_init_timeout_secs = parse_u64("CHAUFFEUR_MAPS_INIT_TIMEOUT_SECS", "15")?;
    let request_timeout_secs = parse_u64("CHAUFFEUR_REQUEST_TIMEOUT_SECS", "30")?;
    if maps_init_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CHAUFFEUR_MAPS_INIT_TIMEOUT_SECS".to_string(),
            reason: "must be greater than zero".to_string(),
        });
    }

    let routes_base_url = or_default("CHAUFFEUR_ROUTES_BASE_URL", "https://routes.googleapis.com");
    let directions_base_url =
        or_default("CHAUFFEUR_DIRECTIONS_BASE_URL", "https://maps.googleapis.com");

    let emailjs = EmailJsConfig {
        base_url: or_default("EMAILJS_BASE_URL", "https://api.emailjs.com"),
        service_id: optional("EMAILJS_SERVICE_ID"),
        template_id: optional("EMAILJS_TEMPLATE_ID"),
        public_key: optional("EMAILJS_PUBLIC_KEY"),
    };

    let company_name = or_default("CHAUFFEUR_COMPANY_NAME", "Prestige Chauffeur NYC");
    let bookings_email = optional("CHAUFFEUR_BOOKINGS_EMAIL");

    Ok(AppConfig {
        env,
        log_level,
        site_origin,
        google_maps_api_key,
        settings_path,
        pricing_path,
        route_debounce_ms,
        maps_init_timeout_secs,
        request_timeout_secs,
        routes_base_url,
        directions_base_url,
        emailjs,
        company_name,
        bookings_email,
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

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

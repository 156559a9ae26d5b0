use std::path::Path;

use rust_decimal::Decimal;

use crate::pricing::{PricingTable, RouteRates};
use crate::ConfigError;

/// Load a pricing table override from a YAML file.
///
/// Fields omitted from the file keep their default values.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_pricing(path: &Path) -> Result<PricingTable, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::PricingFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let table: PricingTable = serde_yaml::from_str(&content)?;
    validate_pricing(&table)?;

    tracing::debug!(path = %path.display(), "loaded pricing override");
    Ok(table)
}

fn validate_pricing(table: &PricingTable) -> Result<(), ConfigError> {
    let flat = [
        ("airport_flat", table.airport_flat),
        ("events_flat", table.events_flat),
        ("hourly_rate", table.hourly_rate),
    ];
    for (name, value) in flat {
        if value.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "{name} must be non-negative, got {value}"
            )));
        }
    }

    if table.min_hours <= Decimal::ZERO {
        return Err(ConfigError::Validation(format!(
            "min_hours must be positive, got {}",
            table.min_hours
        )));
    }

    validate_rates("airport_route", &table.airport_route)?;
    validate_rates("events_route", &table.events_route)
}

fn validate_rates(name: &str, rates: &RouteRates) -> Result<(), ConfigError> {
    let fields = [
        ("base", rates.base),
        ("per_mile", rates.per_mile),
        ("per_minute", rates.per_minute),
        ("booking_fee", rates.booking_fee),
        ("minimum", rates.minimum),
    ];
    for (field, value) in fields {
        if value.is_sign_negative() {
            return Err(ConfigError::Validation(format!(
                "{name}.{field} must be non-negative, got {value}"
            )));
        }
    }
    Ok(())
}

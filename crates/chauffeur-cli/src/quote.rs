//! `quote` and `route` command handlers.

use chauffeur_core::{parse_quantity, AppConfig, PricingTable, ServiceType, SettingsStore};
use chauffeur_routing::RouteState;

use crate::TripArgs;

/// Estimate for the given free-text inputs.
///
/// Route pricing applies when both distance and duration are supplied for a
/// routed service; otherwise the duration/flat-rate estimate is used.
pub(crate) fn quote_amount(
    pricing: &PricingTable,
    service: ServiceType,
    hours: Option<&str>,
    miles: Option<&str>,
    minutes: Option<&str>,
) -> u32 {
    match (service.is_route_eligible(), miles, minutes) {
        (true, Some(miles), Some(minutes)) => pricing.estimate_by_route(
            service,
            parse_quantity(miles).unwrap_or(f64::NAN),
            parse_quantity(minutes).unwrap_or(f64::NAN),
        ),
        _ => pricing.estimate_by_duration(service, hours.and_then(parse_quantity)),
    }
}

/// Prints a price estimate.
///
/// # Errors
///
/// Returns an error if the pricing override file cannot be loaded.
pub(crate) fn run_quote(
    config: &AppConfig,
    service: &str,
    hours: Option<&str>,
    miles: Option<&str>,
    minutes: Option<&str>,
) -> anyhow::Result<()> {
    let pricing = crate::load_pricing(config)?;
    let service = ServiceType::from_id(service);
    let amount = quote_amount(&pricing, service, hours, miles, minutes);
    println!("{}: ${amount}", service.label());
    Ok(())
}

/// Resolves a route between the given places and prints the route-priced
/// estimate.
///
/// # Errors
///
/// Returns an error if settings or pricing cannot be loaded, maps are
/// disabled, or the route cannot be resolved.
pub(crate) async fn run_route(
    config: &AppConfig,
    service: &str,
    trip: &TripArgs,
) -> anyhow::Result<()> {
    let pricing = crate::load_pricing(config)?;
    let settings = SettingsStore::new(&config.settings_path).load()?;
    let service = ServiceType::from_id(service);

    let resolver = crate::build_resolver(config, &settings).ok_or_else(|| {
        anyhow::anyhow!("maps are disabled; run `chauffeur settings enable-maps` first")
    })?;

    resolver.set_service(service).await;
    resolver.set_pickup(trip.pickup()).await;
    resolver.set_dropoff(trip.dropoff()).await;

    match resolver.settled().await {
        RouteState::Ready(summary) => {
            let amount =
                pricing.estimate_by_route(service, summary.miles(), summary.minutes());
            println!("route: {}", summary.describe());
            println!("{}: ${amount}", service.label());
            Ok(())
        }
        RouteState::Ineligible => {
            println!(
                "{} is priced by time: ${}",
                service.label(),
                pricing.estimate_by_duration(service, None)
            );
            Ok(())
        }
        RouteState::Pending => anyhow::bail!("both --from and --to are required"),
        RouteState::Failed(classification) => {
            anyhow::bail!("{:?}: {}", classification.category, classification.message)
        }
        RouteState::Loading => anyhow::bail!("route resolution did not settle"),
    }
}

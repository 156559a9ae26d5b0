mod book;
mod quote;
mod settings;

use std::sync::Arc;
use std::time::Duration;

use chauffeur_core::{resolve_api_key, AppConfig, LatLng, Place, PricingTable, Settings};
use chauffeur_routing::{ProviderConfig, ProviderHandle, RouteResolver};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::settings::SettingsCommands;

#[derive(Debug, Parser)]
#[command(name = "chauffeur")]
#[command(about = "Quotes, routes and booking requests for the chauffeur service")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print a price estimate without calling any provider
    Quote {
        /// Service type: airport, hourly or events
        #[arg(long, default_value = "airport")]
        service: String,
        /// Hours booked (hourly service)
        #[arg(long)]
        hours: Option<String>,
        /// Route distance in miles
        #[arg(long)]
        miles: Option<String>,
        /// Route duration in minutes
        #[arg(long)]
        minutes: Option<String>,
    },
    /// Resolve a driving route and quote it
    Route {
        #[arg(long, default_value = "airport")]
        service: String,
        #[command(flatten)]
        trip: TripArgs,
    },
    /// Send a booking request to the business
    Book(book::BookArgs),
    /// Manage locally persisted maps settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommands,
    },
}

/// Pickup and dropoff as entered, optionally with the coordinates and place
/// identifiers of a selected suggestion.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct TripArgs {
    /// Pickup address text
    #[arg(long = "from", default_value = "")]
    pub from: String,
    #[arg(long, allow_hyphen_values = true)]
    pub from_lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub from_lng: Option<f64>,
    #[arg(long)]
    pub from_place_id: Option<String>,
    /// Dropoff address text
    #[arg(long = "to", default_value = "")]
    pub to: String,
    #[arg(long, allow_hyphen_values = true)]
    pub to_lat: Option<f64>,
    #[arg(long, allow_hyphen_values = true)]
    pub to_lng: Option<f64>,
    #[arg(long)]
    pub to_place_id: Option<String>,
}

impl TripArgs {
    pub(crate) fn pickup(&self) -> Place {
        to_place(&self.from, self.from_lat, self.from_lng, self.from_place_id.as_deref())
    }

    pub(crate) fn dropoff(&self) -> Place {
        to_place(&self.to, self.to_lat, self.to_lng, self.to_place_id.as_deref())
    }
}

/// Text with a valid coordinate pair counts as a selected suggestion; text
/// alone stays unresolved.
fn to_place(label: &str, lat: Option<f64>, lng: Option<f64>, place_id: Option<&str>) -> Place {
    match lat.zip(lng).and_then(|(lat, lng)| LatLng::new(lat, lng)) {
        Some(location) => {
            Place::resolved(label.trim(), place_id.map(str::to_string), location)
        }
        None => Place::from_text(label.trim()),
    }
}

/// Pricing table from the optional override file, else the defaults.
pub(crate) fn load_pricing(config: &AppConfig) -> anyhow::Result<PricingTable> {
    match &config.pricing_path {
        Some(path) => Ok(chauffeur_core::load_pricing(path)?),
        None => Ok(PricingTable::default()),
    }
}

/// Builds a resolver when maps are enabled in the persisted settings.
pub(crate) fn build_resolver(config: &AppConfig, settings: &Settings) -> Option<RouteResolver> {
    if !settings.enable_maps {
        tracing::debug!("maps disabled; route pricing unavailable");
        return None;
    }

    let api_key = resolve_api_key(
        settings.google_maps_api_key.as_deref(),
        config.google_maps_api_key.as_deref(),
    );
    let handle = ProviderHandle::google(ProviderConfig {
        api_key,
        routes_base_url: config.routes_base_url.clone(),
        directions_base_url: config.directions_base_url.clone(),
        request_timeout: Duration::from_secs(config.request_timeout_secs),
        init_timeout: Duration::from_secs(config.maps_init_timeout_secs),
    });

    Some(RouteResolver::new(
        Arc::new(handle),
        Duration::from_millis(config.route_debounce_ms),
        config.site_origin.clone(),
    ))
}

fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = chauffeur_core::load_app_config()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(env = %config.env, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Quote {
            service,
            hours,
            miles,
            minutes,
        }) => quote::run_quote(
            &config,
            &service,
            hours.as_deref(),
            miles.as_deref(),
            minutes.as_deref(),
        )?,
        Some(Commands::Route { service, trip }) => {
            quote::run_route(&config, &service, &trip).await?;
        }
        Some(Commands::Book(args)) => book::run_book(&config, &args).await?,
        Some(Commands::Settings { command }) => settings::run_settings(&config, &command)?,
        None => println!("chauffeur: use --help to list commands"),
    }

    Ok(())
}

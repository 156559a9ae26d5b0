//! `book` command handler.

use std::sync::Arc;

use chauffeur_booking::{BookingController, EmailJsClient, LeadContext, SubmissionState};
use chauffeur_core::{AppConfig, ServiceType, SettingsStore};
use chauffeur_routing::RouteState;
use clap::Args;

use crate::TripArgs;

#[derive(Debug, Clone, Args)]
pub(crate) struct BookArgs {
    #[arg(long, default_value = "airport")]
    pub service: String,
    /// Pickup date and time, as entered
    #[arg(long, default_value = "")]
    pub date: String,
    #[command(flatten)]
    pub trip: TripArgs,
    #[arg(long)]
    pub hours: Option<String>,
    #[arg(long, default_value = "")]
    pub name: String,
    #[arg(long, default_value = "")]
    pub phone: String,
    #[arg(long, default_value = "")]
    pub email: String,
    #[arg(long, default_value = "")]
    pub notes: String,
}

/// Fills the booking form from the arguments and submits it.
///
/// When maps are enabled the route is resolved first so the lead carries the
/// route-priced estimate.
///
/// # Errors
///
/// Returns an error if settings, pricing or the email client cannot be set
/// up, or if the submission ends in an error state.
pub(crate) async fn run_book(config: &AppConfig, args: &BookArgs) -> anyhow::Result<()> {
    let pricing = crate::load_pricing(config)?;
    let settings = SettingsStore::new(&config.settings_path).load()?;
    let sender = EmailJsClient::new(&config.emailjs, config.request_timeout_secs)?;
    let resolver = crate::build_resolver(config, &settings);

    let mut controller = BookingController::new(
        pricing,
        LeadContext::from_config(config),
        Arc::new(sender),
        resolver,
    );

    controller
        .select_service(ServiceType::from_id(&args.service))
        .await;
    controller.set_date(args.date.as_str());
    controller.set_pickup(args.trip.pickup()).await;
    controller.set_dropoff(args.trip.dropoff()).await;
    controller.set_hours(args.hours.clone().unwrap_or_default());
    controller.set_name(args.name.as_str());
    controller.set_phone(args.phone.as_str());
    controller.set_email(args.email.as_str());
    controller.set_notes(args.notes.as_str());

    if let Some(resolver) = controller.resolver() {
        if let RouteState::Failed(classification) = resolver.settled().await {
            tracing::warn!(
                category = ?classification.category,
                "route unavailable; using flat rate"
            );
            eprintln!("{}", classification.message);
        }
    }

    println!("estimate: ${}", controller.displayed_estimate());

    match controller.submit().await {
        SubmissionState::Sent => {
            println!("booking request sent");
            Ok(())
        }
        SubmissionState::Error(message) => anyhow::bail!("{message}"),
        SubmissionState::Idle => anyhow::bail!("booking request was not submitted"),
    }
}

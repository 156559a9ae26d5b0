use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chauffeur_core::LatLng;
use chauffeur_routing::{
    FallbackChain, ProviderHandle, RouteRequest, RouteSource, RouteStrategy, RouteSummary,
    RoutingError,
};

use super::*;
use crate::error::LeadError;

#[derive(Default)]
struct FakeSender {
    fail_with: Option<u16>,
    sent: Mutex<Vec<LeadPayload>>,
}

impl FakeSender {
    fn failing(status: u16) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(status),
            ..Self::default()
        })
    }

    fn sent(&self) -> Vec<LeadPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeadSender for FakeSender {
    async fn send(&self, lead: &LeadPayload) -> Result<(), LeadError> {
        self.sent.lock().unwrap().push(lead.clone());
        match self.fail_with {
            Some(status) => Err(LeadError::delivery(status, "Service unavailable")),
            None => Ok(()),
        }
    }
}

/// Always answers 20 miles / 45 minutes.
struct TwentyMiles;

#[async_trait]
impl RouteStrategy for TwentyMiles {
    fn name(&self) -> &'static str {
        "twenty_miles"
    }

    async fn route(&self, _request: &RouteRequest) -> Result<RouteSummary, RoutingError> {
        Ok(RouteSummary::from_measurements(
            32_186.88,
            2_700.0,
            Some("encoded".to_string()),
            RouteSource::Primary,
        ))
    }
}

fn context() -> LeadContext {
    LeadContext {
        company_name: "Prestige Chauffeur NYC".to_string(),
        bookings_email: Some("bookings@example.com".to_string()),
        site_origin: "https://book.example.com".to_string(),
    }
}

fn controller(sender: Arc<FakeSender>, with_routing: bool) -> BookingController {
    let resolver = with_routing.then(|| {
        let chain = FallbackChain::new(vec![Arc::new(TwentyMiles) as Arc<dyn RouteStrategy>]);
        RouteResolver::new(
            Arc::new(ProviderHandle::ready(chain)),
            Duration::from_millis(450),
            "https://book.example.com",
        )
    });
    BookingController::new(PricingTable::default(), context(), sender, resolver)
}

fn jfk() -> Place {
    Place::resolved("JFK Terminal 4", Some("ChIJjfk".into()), LatLng::new(40.6441, -73.7823).unwrap())
}

fn midtown() -> Place {
    Place::resolved("Times Square", None, LatLng::new(40.758, -73.9855).unwrap())
}

async fn fill_contact(ctl: &mut BookingController) {
    ctl.set_date("2026-11-02T09:30");
    ctl.set_pickup(jfk()).await;
    ctl.set_dropoff(midtown()).await;
    ctl.set_name("Dana Reyes");
    ctl.set_phone("+1 212 555 0100");
    ctl.set_email("dana@example.com");
    ctl.set_notes("Flight AA100");
}

#[tokio::test]
async fn empty_submit_lists_all_problems_without_sending() {
    let sender = Arc::new(FakeSender::default());
    let mut ctl = controller(sender.clone(), false);

    let state = ctl.submit().await.clone();

    match state {
        SubmissionState::Error(message) => {
            assert!(message.starts_with("Please fix:"));
            assert!(message.matches('•').count() >= 6);
        }
        other => panic!("unexpected state: {other:?}"),
    }
    assert!(sender.sent().is_empty());
}

#[tokio::test]
async fn flat_rate_until_route_is_ready() {
    let mut ctl = controller(Arc::new(FakeSender::default()), false);
    assert_eq!(ctl.displayed_estimate(), 180);
    ctl.select_service(ServiceType::Events).await;
    assert_eq!(ctl.displayed_estimate(), 250);
    assert!(ctl.route_state().is_none());
}

#[tokio::test]
async fn hourly_estimate_uses_hours() {
    let mut ctl = controller(Arc::new(FakeSender::default()), true);
    ctl.select_service(ServiceType::Hourly).await;
    ctl.set_hours("3");
    assert_eq!(ctl.displayed_estimate(), 360);
    ctl.set_hours("abc");
    assert_eq!(ctl.displayed_estimate(), 240);
    assert_eq!(ctl.route_state(), Some(RouteState::Ineligible));
}

#[tokio::test(start_paused = true)]
async fn ready_route_switches_to_route_pricing() {
    let mut ctl = controller(Arc::new(FakeSender::default()), true);
    ctl.set_pickup(jfk()).await;
    ctl.set_dropoff(midtown()).await;
    assert_eq!(ctl.displayed_estimate(), 180);

    ctl.resolver().unwrap().settled().await;
    // 80 + 15 + 20 * 8.0 + 45 * 1.2 = 309
    assert_eq!(ctl.displayed_estimate(), 309);

    ctl.select_service(ServiceType::Events).await;
    ctl.resolver().unwrap().settled().await;
    // 90 + 20 + 20 * 9.0 + 45 * 1.3 = 348.5 -> 349
    assert_eq!(ctl.displayed_estimate(), 349);
}

#[tokio::test(start_paused = true)]
async fn successful_submit_clears_trip_and_keeps_contact() {
    let sender = Arc::new(FakeSender::default());
    let mut ctl = controller(sender.clone(), true);
    fill_contact(&mut ctl).await;
    ctl.resolver().unwrap().settled().await;

    assert_eq!(ctl.submit().await, &SubmissionState::Sent);

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].estimate(), 309);
    assert_eq!(sent[0].route(), Some("20.0 mi (~45 min)"));

    let form = ctl.form();
    assert!(form.pickup.is_empty());
    assert!(form.dropoff.is_empty());
    assert!(form.notes.is_empty());
    assert_eq!(form.name, "Dana Reyes");
    assert_eq!(form.phone, "+1 212 555 0100");
    assert_eq!(form.email, "dana@example.com");
    assert_eq!(ctl.route_state(), Some(RouteState::Pending));
}

#[tokio::test]
async fn failed_delivery_keeps_every_field() {
    let sender = FakeSender::failing(503);
    let mut ctl = controller(sender.clone(), false);
    fill_contact(&mut ctl).await;
    let before = ctl.form().clone();

    let state = ctl.submit().await.clone();

    assert_eq!(
        state,
        SubmissionState::Error("EmailJS failed (503). Service unavailable".to_string())
    );
    assert_eq!(ctl.form(), &before);
    assert_eq!(sender.sent().len(), 1);
}

#[tokio::test]
async fn selecting_service_resets_submission_state() {
    let mut ctl = controller(Arc::new(FakeSender::default()), false);
    ctl.submit().await;
    assert!(matches!(ctl.submission(), SubmissionState::Error(_)));

    ctl.select_service(ServiceType::Events).await;
    assert_eq!(ctl.submission(), &SubmissionState::Idle);
}

#[tokio::test]
async fn hourly_submit_requires_minimum_hours() {
    let sender = Arc::new(FakeSender::default());
    let mut ctl = controller(sender.clone(), false);
    fill_contact(&mut ctl).await;
    ctl.select_service(ServiceType::Hourly).await;
    ctl.set_hours("1");

    match ctl.submit().await {
        SubmissionState::Error(message) => {
            assert!(message.contains("Hourly service requires 2+ hours."));
        }
        other => panic!("unexpected state: {other:?}"),
    }
    assert!(sender.sent().is_empty());
}

//! Booking form controller: owns the form, feeds route results into
//! pricing, and runs the submit protocol.

use std::sync::Arc;

use chauffeur_core::{Place, PricingTable, ServiceType};
use chauffeur_routing::{RouteResolver, RouteState};

use crate::email::LeadSender;
use crate::form::BookingForm;
use crate::lead::{LeadContext, LeadPayload};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Sent,
    Error(String),
}

pub struct BookingController {
    form: BookingForm,
    resolver: Option<RouteResolver>,
    sender: Arc<dyn LeadSender>,
    pricing: PricingTable,
    context: LeadContext,
    submission: SubmissionState,
}

impl BookingController {
    /// `resolver` is `None` when maps are disabled; estimates then use flat
    /// rates only.
    #[must_use]
    pub fn new(
        pricing: PricingTable,
        context: LeadContext,
        sender: Arc<dyn LeadSender>,
        resolver: Option<RouteResolver>,
    ) -> Self {
        Self {
            form: BookingForm::default(),
            resolver,
            sender,
            pricing,
            context,
            submission: SubmissionState::Idle,
        }
    }

    #[must_use]
    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    #[must_use]
    pub fn submission(&self) -> &SubmissionState {
        &self.submission
    }

    #[must_use]
    pub fn resolver(&self) -> Option<&RouteResolver> {
        self.resolver.as_ref()
    }

    /// Current route state, or `None` when routing is unavailable.
    #[must_use]
    pub fn route_state(&self) -> Option<RouteState> {
        self.resolver.as_ref().map(RouteResolver::state)
    }

    /// Selecting a service resets route and submission state.
    pub async fn select_service(&mut self, service: ServiceType) {
        self.form.service = service;
        self.submission = SubmissionState::Idle;
        if let Some(resolver) = &self.resolver {
            resolver.set_service(service).await;
        }
    }

    pub async fn set_pickup(&mut self, place: Place) {
        self.form.pickup = place.clone();
        if let Some(resolver) = &self.resolver {
            resolver.set_pickup(place).await;
        }
    }

    pub async fn set_dropoff(&mut self, place: Place) {
        self.form.dropoff = place.clone();
        if let Some(resolver) = &self.resolver {
            resolver.set_dropoff(place).await;
        }
    }

    pub fn set_date(&mut self, date: impl Into<String>) {
        self.form.date = date.into();
    }

    pub fn set_hours(&mut self, hours: impl Into<String>) {
        self.form.hours = hours.into();
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.form.phone = phone.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.form.email = email.into();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.form.notes = notes.into();
    }

    /// The estimate shown to the visitor.
    ///
    /// Hourly is always time-priced. Other services use the route once one is
    /// ready and their flat rate until then.
    #[must_use]
    pub fn displayed_estimate(&self) -> u32 {
        let service = self.form.service;
        if service == ServiceType::Hourly {
            return self
                .pricing
                .estimate_by_duration(service, self.form.parsed_hours());
        }
        match self.route_state() {
            Some(RouteState::Ready(summary)) => {
                self.pricing
                    .estimate_by_route(service, summary.miles(), summary.minutes())
            }
            _ => self
                .pricing
                .estimate_by_duration(service, self.form.parsed_hours()),
        }
    }

    /// Validates and delivers the lead.
    ///
    /// On validation failure nothing is sent. On success trip fields are
    /// cleared; on delivery failure every field is kept for resubmission.
    pub async fn submit(&mut self) -> &SubmissionState {
        self.submission = SubmissionState::Idle;

        let errors = self.form.validate(self.pricing.min_hours);
        if !errors.is_empty() {
            tracing::debug!(count = errors.len(), "booking form failed validation");
            self.submission =
                SubmissionState::Error(format!("Please fix:\n\n• {}", errors.join("\n• ")));
            return &self.submission;
        }

        let route = self.route_state().and_then(|state| state.summary().cloned());
        let lead = LeadPayload::new(
            &self.form,
            route.as_ref(),
            self.displayed_estimate(),
            &self.pricing,
            &self.context,
        );
        tracing::info!(
            lead_id = %lead.id(),
            service = %lead.service(),
            estimate = lead.estimate(),
            "submitting booking lead"
        );

        match self.sender.send(&lead).await {
            Ok(()) => {
                self.submission = SubmissionState::Sent;
                self.form.clear_trip();
                if let Some(resolver) = &self.resolver {
                    resolver.set_pickup(Place::default()).await;
                    resolver.set_dropoff(Place::default()).await;
                }
            }
            Err(e) => {
                tracing::warn!(lead_id = %lead.id(), error = %e, "booking lead delivery failed");
                self.submission = SubmissionState::Error(e.to_string());
            }
        }
        &self.submission
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;

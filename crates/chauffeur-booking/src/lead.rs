//! The lead snapshot sent to the business when a booking is requested.

use chauffeur_core::{AppConfig, PricingTable, ServiceType};
use chauffeur_routing::RouteSummary;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::form::BookingForm;

const NOT_SET: &str = "(not set)";

/// Site-wide values stamped onto every lead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeadContext {
    pub company_name: String,
    pub bookings_email: Option<String>,
    pub site_origin: String,
}

impl LeadContext {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            company_name: config.company_name.clone(),
            bookings_email: config.bookings_email.clone(),
            site_origin: config.site_origin.clone(),
        }
    }
}

/// Template parameters as expected by the email template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateParams {
    pub to_email: String,
    pub subject: String,
    pub message: String,
    pub service: String,
    pub date: String,
    pub pickup: String,
    pub dropoff: String,
    pub hours: String,
    pub route: String,
    pub estimate: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
    pub origin_domain: String,
}

/// Immutable snapshot of a booking request, assembled at submit time.
#[derive(Debug, Clone)]
pub struct LeadPayload {
    id: Uuid,
    submitted_at: DateTime<Utc>,
    context: LeadContext,
    service: ServiceType,
    date: String,
    pickup: String,
    dropoff: String,
    raw_hours: String,
    billed_hours: Option<String>,
    route: Option<String>,
    estimate: u32,
    name: String,
    phone: String,
    email: String,
    notes: String,
}

impl LeadPayload {
    #[must_use]
    pub fn new(
        form: &BookingForm,
        route: Option<&RouteSummary>,
        estimate: u32,
        pricing: &PricingTable,
        context: &LeadContext,
    ) -> Self {
        let billed_hours = (form.service == ServiceType::Hourly)
            .then(|| pricing.effective_hours(form.parsed_hours()).normalize().to_string());

        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            context: context.clone(),
            service: form.service,
            date: form.date.trim().to_string(),
            pickup: form.pickup.label.trim().to_string(),
            dropoff: form.dropoff.label.trim().to_string(),
            raw_hours: form.hours.trim().to_string(),
            billed_hours,
            route: route.map(RouteSummary::describe),
            estimate,
            name: form.name.trim().to_string(),
            phone: form.phone.trim().to_string(),
            email: form.email.trim().to_string(),
            notes: form.notes.trim().to_string(),
        }
    }

    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    #[must_use]
    pub fn service(&self) -> ServiceType {
        self.service
    }

    #[must_use]
    pub fn estimate(&self) -> u32 {
        self.estimate
    }

    #[must_use]
    pub fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    #[must_use]
    pub fn subject(&self) -> String {
        format!("Booking request - {}", self.context.company_name)
    }

    /// Plain-text body listing every field of the request.
    #[must_use]
    pub fn message(&self) -> String {
        let or_unset = |value: &str| {
            if value.is_empty() {
                NOT_SET.to_string()
            } else {
                value.to_string()
            }
        };

        let mut lines = vec![
            format!("New booking request - {}", self.context.company_name),
            String::new(),
            format!("Service: {}", self.service.label()),
            format!("Date/Time: {}", or_unset(&self.date)),
            format!("Pickup: {}", or_unset(&self.pickup)),
            format!("Dropoff: {}", or_unset(&self.dropoff)),
        ];
        if let Some(hours) = &self.billed_hours {
            lines.push(format!("Hours: {hours}"));
        }
        if let Some(route) = &self.route {
            lines.push(format!("Route: {route}"));
        }
        lines.push(String::new());
        lines.push(format!("Name: {}", or_unset(&self.name)));
        lines.push(format!("Phone: {}", or_unset(&self.phone)));
        lines.push(format!("Email: {}", or_unset(&self.email)));
        if !self.notes.is_empty() {
            lines.push(format!("Notes: {}", self.notes));
        }
        lines.push(String::new());
        lines.push(format!("Estimated: ${}", self.estimate));
        if !self.context.site_origin.is_empty() {
            lines.push(format!("Site: {}", self.context.site_origin));
        }

        lines.join("\n")
    }

    #[must_use]
    pub fn template_params(&self) -> TemplateParams {
        let hours = if self.service == ServiceType::Hourly {
            self.raw_hours.clone()
        } else {
            String::new()
        };

        TemplateParams {
            to_email: self.context.bookings_email.clone().unwrap_or_default(),
            subject: self.subject(),
            message: self.message(),
            service: self.service.id().to_string(),
            date: self.date.clone(),
            pickup: self.pickup.clone(),
            dropoff: self.dropoff.clone(),
            hours,
            route: self.route.clone().unwrap_or_default(),
            estimate: self.estimate.to_string(),
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            notes: self.notes.clone(),
            origin_domain: self.context.site_origin.clone(),
        }
    }
}

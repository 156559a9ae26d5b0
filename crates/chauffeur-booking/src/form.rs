use chauffeur_core::{parse_quantity, Place, ServiceType};
use rust_decimal::Decimal;

/// Field values of the booking form, as entered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookingForm {
    pub service: ServiceType,
    pub date: String,
    pub pickup: Place,
    pub dropoff: Place,
    pub hours: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
}

impl BookingForm {
    /// Hours as a number, if the field holds one.
    #[must_use]
    pub fn parsed_hours(&self) -> Option<f64> {
        parse_quantity(&self.hours)
    }

    /// Checks every required field and returns all failures at once.
    ///
    /// Hourly bookings additionally need numeric hours of at least
    /// `min_hours`.
    #[must_use]
    pub fn validate(&self, min_hours: Decimal) -> Vec<String> {
        let required = [
            (&self.date, "Pick a date & time."),
            (&self.pickup.label, "Add a pickup location."),
            (&self.dropoff.label, "Add a dropoff location."),
            (&self.name, "Add your name."),
            (&self.phone, "Add a phone number."),
            (&self.email, "Add an email."),
        ];

        let mut errors: Vec<String> = required
            .iter()
            .filter(|(value, _)| value.trim().is_empty())
            .map(|(_, message)| (*message).to_string())
            .collect();

        if self.service == ServiceType::Hourly {
            let enough = self
                .parsed_hours()
                .and_then(|h| Decimal::try_from(h).ok())
                .is_some_and(|h| h >= min_hours);
            if !enough {
                let min_hours = min_hours.normalize();
                errors.push(format!("Hourly service requires {min_hours}+ hours."));
            }
        }

        errors
    }

    /// Clears the trip-specific fields, keeping contact details.
    pub fn clear_trip(&mut self) {
        self.pickup = Place::default();
        self.dropoff = Place::default();
        self.notes.clear();
    }
}

use serde::{Deserialize, Serialize};

/// The bookable service offerings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    #[default]
    Airport,
    Hourly,
    Events,
}

impl ServiceType {
    /// Parses a service identifier, case-insensitively.
    ///
    /// Unrecognized identifiers resolve to [`ServiceType::Airport`] so that
    /// pricing always has a table to work from.
    #[must_use]
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_ascii_lowercase().as_str() {
            "hourly" => ServiceType::Hourly,
            "events" => ServiceType::Events,
            _ => ServiceType::Airport,
        }
    }

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            ServiceType::Airport => "airport",
            ServiceType::Hourly => "hourly",
            ServiceType::Events => "events",
        }
    }

    /// Human-facing name used in lead messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ServiceType::Airport => "Airport Transfer",
            ServiceType::Hourly => "Hourly Chauffeur",
            ServiceType::Events => "Events / Night Out",
        }
    }

    /// Whether the price depends on a computed route. Hourly bookings are
    /// priced on time alone.
    #[must_use]
    pub fn is_route_eligible(self) -> bool {
        !matches!(self, ServiceType::Hourly)
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_id_is_case_insensitive() {
        assert_eq!(ServiceType::from_id("HOURLY"), ServiceType::Hourly);
        assert_eq!(ServiceType::from_id(" Events "), ServiceType::Events);
        assert_eq!(ServiceType::from_id("airport"), ServiceType::Airport);
    }

    #[test]
    fn unknown_id_falls_back_to_airport() {
        assert_eq!(ServiceType::from_id("whatever"), ServiceType::Airport);
        assert_eq!(ServiceType::from_id(""), ServiceType::Airport);
    }

    #[test]
    fn only_hourly_is_route_ineligible() {
        assert!(ServiceType::Airport.is_route_eligible());
        assert!(ServiceType::Events.is_route_eligible());
        assert!(!ServiceType::Hourly.is_route_eligible());
    }

    #[test]
    fn display_matches_id() {
        assert_eq!(ServiceType::Events.to_string(), "events");
    }
}

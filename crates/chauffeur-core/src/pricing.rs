//! Price estimation for bookings.
//!
//! Both entry points are total: malformed numeric input degrades to zero (for
//! route inputs) or to the configured minimum (for hours), and the returned
//! amount is always a whole number of dollars at or above the service minimum.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::ServiceType;

/// Inputs are clamped to this magnitude before entering decimal arithmetic so
/// that multiplication can never overflow.
const MAX_INPUT: f64 = 1e12;

/// Per-service knobs for distance/duration pricing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRates {
    pub base: Decimal,
    pub per_mile: Decimal,
    pub per_minute: Decimal,
    pub booking_fee: Decimal,
    pub minimum: Decimal,
}

/// The full set of rates used to quote a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingTable {
    pub airport_flat: Decimal,
    pub events_flat: Decimal,
    pub hourly_rate: Decimal,
    pub min_hours: Decimal,
    pub airport_route: RouteRates,
    pub events_route: RouteRates,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            airport_flat: Decimal::new(180, 0),
            events_flat: Decimal::new(250, 0),
            hourly_rate: Decimal::new(120, 0),
            min_hours: Decimal::new(2, 0),
            airport_route: RouteRates {
                base: Decimal::new(80, 0),
                per_mile: Decimal::new(80, 1),
                per_minute: Decimal::new(12, 1),
                booking_fee: Decimal::new(15, 0),
                minimum: Decimal::new(180, 0),
            },
            events_route: RouteRates {
                base: Decimal::new(90, 0),
                per_mile: Decimal::new(90, 1),
                per_minute: Decimal::new(13, 1),
                booking_fee: Decimal::new(20, 0),
                minimum: Decimal::new(250, 0),
            },
        }
    }
}

impl PricingTable {
    /// Time-based estimate.
    ///
    /// Hourly bookings are billed at `hourly_rate * max(min_hours, hours)`;
    /// missing or non-finite hours bill the minimum. Events return their flat
    /// rate and every other service the airport flat rate.
    #[must_use]
    pub fn estimate_by_duration(&self, service: ServiceType, hours: Option<f64>) -> u32 {
        match service {
            ServiceType::Hourly => {
                let total = self
                    .hourly_rate
                    .checked_mul(self.effective_hours(hours))
                    .unwrap_or(Decimal::MAX);
                to_dollars(total)
            }
            ServiceType::Events => to_dollars(self.events_flat),
            ServiceType::Airport => to_dollars(self.airport_flat),
        }
    }

    /// Distance/duration estimate.
    ///
    /// Computes `base + booking_fee + miles * per_mile + minutes * per_minute`,
    /// rounds to the nearest dollar, then floors at the service minimum.
    /// Non-finite inputs count as zero.
    #[must_use]
    pub fn estimate_by_route(&self, service: ServiceType, miles: f64, minutes: f64) -> u32 {
        let rates = self.route_rates(service);
        let raw = rates
            .base
            .checked_add(rates.booking_fee)
            .and_then(|acc| acc.checked_add(to_decimal(miles).checked_mul(rates.per_mile)?))
            .and_then(|acc| acc.checked_add(to_decimal(minutes).checked_mul(rates.per_minute)?))
            .unwrap_or(Decimal::MAX);
        let rounded = raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        to_dollars(rounded.max(rates.minimum))
    }

    /// Hours actually billed for an hourly booking.
    #[must_use]
    pub fn effective_hours(&self, hours: Option<f64>) -> Decimal {
        match hours
            .filter(|h| h.is_finite())
            .and_then(|h| Decimal::try_from(h.clamp(-MAX_INPUT, MAX_INPUT)).ok())
        {
            Some(h) if h > self.min_hours => h,
            _ => self.min_hours,
        }
    }

    /// Events have their own table; every other service is priced as airport.
    #[must_use]
    pub fn route_rates(&self, service: ServiceType) -> &RouteRates {
        match service {
            ServiceType::Events => &self.events_route,
            ServiceType::Airport | ServiceType::Hourly => &self.airport_route,
        }
    }
}

/// [`PricingTable::estimate_by_duration`] against the default rates.
#[must_use]
pub fn estimate_by_duration(service: ServiceType, hours: Option<f64>) -> u32 {
    PricingTable::default().estimate_by_duration(service, hours)
}

/// [`PricingTable::estimate_by_route`] against the default rates.
#[must_use]
pub fn estimate_by_route(service: ServiceType, miles: f64, minutes: f64) -> u32 {
    PricingTable::default().estimate_by_route(service, miles, minutes)
}

/// Parses a free-text numeric field. Empty or non-numeric text yields `None`.
#[must_use]
pub fn parse_quantity(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn to_decimal(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::try_from(value.clamp(-MAX_INPUT, MAX_INPUT)).unwrap_or(Decimal::ZERO)
}

fn to_dollars(amount: Decimal) -> u32 {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    rounded.to_u32().unwrap_or(if rounded.is_sign_negative() {
        0
    } else {
        u32::MAX
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours(raw: &str) -> Option<f64> {
        parse_quantity(raw)
    }

    #[test]
    fn airport_flat_rate() {
        assert_eq!(estimate_by_duration(ServiceType::Airport, Some(1.0)), 180);
    }

    #[test]
    fn events_flat_rate() {
        assert_eq!(estimate_by_duration(ServiceType::Events, Some(1.0)), 250);
    }

    #[test]
    fn hourly_clamps_to_minimum_hours() {
        assert_eq!(estimate_by_duration(ServiceType::Hourly, Some(1.0)), 240);
        assert_eq!(estimate_by_duration(ServiceType::Hourly, Some(3.0)), 360);
    }

    #[test]
    fn hourly_parses_text_hours() {
        assert_eq!(estimate_by_duration(ServiceType::Hourly, hours("4")), 480);
    }

    #[test]
    fn hourly_non_numeric_uses_minimum() {
        assert_eq!(estimate_by_duration(ServiceType::Hourly, hours("abc")), 240);
        assert_eq!(estimate_by_duration(ServiceType::Hourly, None), 240);
        assert_eq!(estimate_by_duration(ServiceType::Hourly, Some(f64::NAN)), 240);
        assert_eq!(
            estimate_by_duration(ServiceType::Hourly, Some(f64::INFINITY)),
            240
        );
    }

    #[test]
    fn hourly_fractional_hours_round_to_whole_dollars() {
        assert_eq!(estimate_by_duration(ServiceType::Hourly, Some(2.5)), 300);
        assert_eq!(estimate_by_duration(ServiceType::Hourly, Some(2.01)), 241);
    }

    #[test]
    fn unknown_service_prices_as_airport() {
        let unknown = ServiceType::from_id("whatever");
        assert_eq!(estimate_by_duration(unknown, Some(10.0)), 180);
        assert_eq!(
            estimate_by_route(unknown, 25.0, 40.0),
            estimate_by_route(ServiceType::Airport, 25.0, 40.0)
        );
    }

    #[test]
    fn route_floor_applies() {
        assert_eq!(estimate_by_route(ServiceType::Airport, 0.1, 0.1), 180);
        assert_eq!(estimate_by_route(ServiceType::Events, 0.1, 0.1), 250);
    }

    #[test]
    fn route_non_finite_inputs_count_as_zero() {
        let miles = parse_quantity("abc").unwrap_or(f64::NAN);
        let minutes = parse_quantity("def").unwrap_or(f64::NAN);
        assert_eq!(estimate_by_route(ServiceType::Airport, miles, minutes), 180);
        assert_eq!(estimate_by_route(ServiceType::Events, f64::NAN, f64::NAN), 250);
        assert_eq!(
            estimate_by_route(ServiceType::Airport, f64::INFINITY, f64::NEG_INFINITY),
            180
        );
    }

    #[test]
    fn route_formula_above_minimum() {
        // 80 + 15 + 20 * 8.0 + 45 * 1.2 = 309
        assert_eq!(estimate_by_route(ServiceType::Airport, 20.0, 45.0), 309);
        // 90 + 20 + 20 * 9.0 + 45 * 1.3 = 348.5 -> 349
        assert_eq!(estimate_by_route(ServiceType::Events, 20.0, 45.0), 349);
    }

    #[test]
    fn route_rounds_before_flooring() {
        let table = PricingTable {
            airport_route: RouteRates {
                base: Decimal::new(1795, 1),
                per_mile: Decimal::ZERO,
                per_minute: Decimal::ZERO,
                booking_fee: Decimal::ZERO,
                minimum: Decimal::new(180, 0),
            },
            ..PricingTable::default()
        };
        // 179.5 rounds up to 180 which already meets the floor.
        assert_eq!(table.estimate_by_route(ServiceType::Airport, 0.0, 0.0), 180);
    }

    #[test]
    fn route_is_monotonic_in_miles_and_minutes() {
        let samples = [0.0, 0.5, 3.0, 12.25, 40.0, 150.0, 1e6, 1e20];
        for service in [ServiceType::Airport, ServiceType::Events] {
            for pair in samples.windows(2) {
                let (lo, hi) = (pair[0], pair[1]);
                assert!(
                    estimate_by_route(service, lo, 30.0) <= estimate_by_route(service, hi, 30.0)
                );
                assert!(
                    estimate_by_route(service, 10.0, lo) <= estimate_by_route(service, 10.0, hi)
                );
            }
        }
    }

    #[test]
    fn route_never_below_minimum_for_negative_input() {
        assert_eq!(estimate_by_route(ServiceType::Airport, -500.0, -500.0), 180);
    }

    #[test]
    fn parse_quantity_handles_blank_and_garbage() {
        assert_eq!(parse_quantity(" 3.5 "), Some(3.5));
        assert_eq!(parse_quantity(""), None);
        assert_eq!(parse_quantity("abc"), None);
        assert_eq!(parse_quantity("NaN"), None);
    }
}

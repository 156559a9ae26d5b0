//! Normalised route results and the wire shapes of both provider protocols.

use std::sync::LazyLock;

use chauffeur_core::LatLng;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const METERS_PER_MILE: f64 = 1609.344;

static DURATION_SECONDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)s$").expect("valid regex"));

/// Which protocol produced a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteSource {
    Primary,
    Secondary,
}

/// A successfully resolved driving route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    pub distance_meters: f64,
    pub duration_seconds: f64,
    /// Encoded path geometry; only the primary protocol returns one.
    pub polyline: Option<String>,
    pub distance_text: String,
    pub duration_text: String,
    pub source: RouteSource,
}

impl RouteSummary {
    /// Builds a summary whose display text is derived from the raw values.
    #[must_use]
    pub fn from_measurements(
        distance_meters: f64,
        duration_seconds: f64,
        polyline: Option<String>,
        source: RouteSource,
    ) -> Self {
        let miles = distance_meters / METERS_PER_MILE;
        let minutes = duration_seconds / 60.0;
        Self {
            distance_meters,
            duration_seconds,
            polyline,
            distance_text: format!("{miles:.1} mi"),
            duration_text: format!("{} min", minutes.round()),
            source,
        }
    }

    #[must_use]
    pub fn miles(&self) -> f64 {
        self.distance_meters / METERS_PER_MILE
    }

    #[must_use]
    pub fn minutes(&self) -> f64 {
        self.duration_seconds / 60.0
    }

    /// Human-readable one-liner, e.g. `"18.4 mi (~41 min)"`.
    #[must_use]
    pub fn describe(&self) -> String {
        format!("{} (~{})", self.distance_text, self.duration_text)
    }
}

/// Reads a duration given either as `"<n>s"` or as `{ "value": n }`.
#[must_use]
pub fn parse_duration_seconds(raw: &serde_json::Value) -> Option<f64> {
    match raw {
        serde_json::Value::String(s) => DURATION_SECONDS_RE
            .captures(s)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        serde_json::Value::Object(map) => map
            .get("value")
            .and_then(serde_json::Value::as_f64)
            .filter(|v| v.is_finite()),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Primary protocol (Routes API)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ComputeRoutesRequest {
    pub origin: RoutesWaypoint,
    pub destination: RoutesWaypoint,
    pub travel_mode: &'static str,
    pub routing_preference: &'static str,
    pub compute_alternative_routes: bool,
    pub units: &'static str,
    pub language_code: &'static str,
}

impl ComputeRoutesRequest {
    pub(crate) fn driving(origin: LatLng, destination: LatLng) -> Self {
        Self {
            origin: RoutesWaypoint::at(origin),
            destination: RoutesWaypoint::at(destination),
            travel_mode: "DRIVE",
            routing_preference: "TRAFFIC_AWARE",
            compute_alternative_routes: false,
            units: "IMPERIAL",
            language_code: "en-US",
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct RoutesWaypoint {
    pub location: RoutesLocation,
}

impl RoutesWaypoint {
    fn at(point: LatLng) -> Self {
        Self {
            location: RoutesLocation {
                lat_lng: RoutesLatLng {
                    latitude: point.lat,
                    longitude: point.lng,
                },
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoutesLocation {
    pub lat_lng: RoutesLatLng,
}

#[derive(Debug, Serialize)]
pub(crate) struct RoutesLatLng {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ComputeRoutesResponse {
    #[serde(default)]
    pub routes: Vec<RoutesApiRoute>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoutesApiRoute {
    pub distance_meters: Option<f64>,
    pub duration: Option<serde_json::Value>,
    pub polyline: Option<RoutesPolyline>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RoutesPolyline {
    pub encoded_polyline: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoutesErrorEnvelope {
    pub error: Option<RoutesErrorBody>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RoutesErrorBody {
    pub status: Option<String>,
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Secondary protocol (legacy Directions)
// ---------------------------------------------------------------------------

/// Reply of the legacy directions service.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub legs: Vec<DirectionsLeg>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DirectionsLeg {
    pub distance: Option<TextValue>,
    pub duration: Option<TextValue>,
}

/// A `{ value, text }` pair as used by the legacy protocol.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TextValue {
    pub value: Option<f64>,
    #[serde(default)]
    pub text: String,
}

impl DirectionsResponse {
    #[must_use]
    pub fn first_leg(&self) -> Option<&DirectionsLeg> {
        self.routes.first().and_then(|r| r.legs.first())
    }
}

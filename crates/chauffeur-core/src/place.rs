use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    /// Returns `None` unless both components are finite.
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Option<Self> {
        (lat.is_finite() && lng.is_finite()).then_some(Self { lat, lng })
    }

    /// Bit-exact key for caching, since `f64` is not `Hash`.
    #[must_use]
    pub fn key(self) -> (u64, u64) {
        (self.lat.to_bits(), self.lng.to_bits())
    }
}

/// A pickup or dropoff location as entered by the visitor.
///
/// Free text alone is not resolved; only a place picked from the
/// autocomplete suggestions carries a coordinate and may be routed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub label: String,
    pub place_id: Option<String>,
    pub location: Option<LatLng>,
}

impl Place {
    /// A place typed by hand, with no provider resolution.
    #[must_use]
    pub fn from_text(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            place_id: None,
            location: None,
        }
    }

    /// A place selected from the provider's suggestions.
    #[must_use]
    pub fn resolved(label: impl Into<String>, place_id: Option<String>, location: LatLng) -> Self {
        Self {
            label: label.into(),
            place_id,
            location: Some(location),
        }
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.label.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latlng_rejects_non_finite() {
        assert!(LatLng::new(f64::NAN, 1.0).is_none());
        assert!(LatLng::new(1.0, f64::INFINITY).is_none());
        assert!(LatLng::new(40.758, -73.9855).is_some());
    }

    #[test]
    fn text_place_is_not_resolved() {
        let place = Place::from_text("JFK Terminal 4");
        assert!(!place.is_resolved());
        assert!(!place.is_empty());
    }

    #[test]
    fn resolved_place_carries_location() {
        let loc = LatLng::new(40.6413, -73.7781).unwrap();
        let place = Place::resolved("JFK", Some("ChIJ-jfk".to_string()), loc);
        assert!(place.is_resolved());
        assert_eq!(place.location.unwrap().key(), loc.key());
    }

    #[test]
    fn whitespace_label_is_empty() {
        assert!(Place::from_text("   ").is_empty());
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chauffeur_core::{LatLng, Place};

use crate::error::RoutingError;
use crate::types::RouteSummary;

/// One end of a route request.
#[derive(Debug, Clone, PartialEq)]
pub struct Waypoint {
    pub label: String,
    pub place_id: Option<String>,
    pub location: LatLng,
}

impl Waypoint {
    /// Returns `None` for places without a coordinate; free text is never
    /// routed.
    #[must_use]
    pub fn from_place(place: &Place) -> Option<Self> {
        let location = place.location?;
        Some(Self {
            label: place.label.trim().to_string(),
            place_id: place.place_id.clone().filter(|id| !id.trim().is_empty()),
            location,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteRequest {
    pub origin: Waypoint,
    pub destination: Waypoint,
}

impl RouteRequest {
    #[must_use]
    pub fn new(origin: Waypoint, destination: Waypoint) -> Self {
        Self {
            origin,
            destination,
        }
    }

    /// Cache key for the exact coordinate pair.
    #[must_use]
    pub fn pair_key(&self) -> ((u64, u64), (u64, u64)) {
        (self.origin.location.key(), self.destination.location.key())
    }
}

/// A way of computing a driving route between two resolved places.
#[async_trait]
pub trait RouteStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Computes a route. A successful return always carries distance and
    /// duration; anything less is an error.
    async fn route(&self, request: &RouteRequest) -> Result<RouteSummary, RoutingError>;
}

/// Priority-ordered list of strategies. Each strategy is tried in turn until
/// one succeeds; the last failure is returned when all fail.
#[derive(Clone)]
pub struct FallbackChain {
    strategies: Vec<Arc<dyn RouteStrategy>>,
}

impl std::fmt::Debug for FallbackChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("FallbackChain")
            .field("strategies", &names)
            .finish()
    }
}

impl FallbackChain {
    #[must_use]
    pub fn new(strategies: Vec<Arc<dyn RouteStrategy>>) -> Self {
        Self { strategies }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Resolves a route through the chain.
    ///
    /// # Errors
    ///
    /// Returns the error of the last strategy tried, or
    /// [`RoutingError::NoStrategies`] if the chain is empty.
    pub async fn resolve(&self, request: &RouteRequest) -> Result<RouteSummary, RoutingError> {
        let mut last_err = RoutingError::NoStrategies;
        for (idx, strategy) in self.strategies.iter().enumerate() {
            match strategy.route(request).await {
                Ok(summary) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        distance_meters = summary.distance_meters,
                        duration_seconds = summary.duration_seconds,
                        "route resolved"
                    );
                    return Ok(summary);
                }
                Err(e) => {
                    let remaining = self.strategies.len() - idx - 1;
                    tracing::warn!(
                        strategy = strategy.name(),
                        status = e.status_token(),
                        error = %e,
                        remaining,
                        "route strategy failed"
                    );
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::types::RouteSource;

    struct Fixed {
        name: &'static str,
        outcome: Result<f64, &'static str>,
        calls: AtomicUsize,
    }

    impl Fixed {
        fn ok(name: &'static str, meters: f64) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome: Ok(meters),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str, status: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                outcome: Err(status),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RouteStrategy for Fixed {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn route(&self, _request: &RouteRequest) -> Result<RouteSummary, RoutingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.outcome {
                Ok(meters) => Ok(RouteSummary::from_measurements(
                    meters,
                    600.0,
                    None,
                    RouteSource::Primary,
                )),
                Err(status) => Err(RoutingError::Provider {
                    status: status.to_string(),
                    message: String::new(),
                }),
            }
        }
    }

    fn chain(fakes: &[&Arc<Fixed>]) -> FallbackChain {
        FallbackChain::new(
            fakes
                .iter()
                .map(|fake| Arc::clone(*fake) as Arc<dyn RouteStrategy>)
                .collect(),
        )
    }

    fn request() -> RouteRequest {
        let place = |lat, lng| {
            Waypoint::from_place(&Place::resolved("x", None, LatLng::new(lat, lng).unwrap()))
                .unwrap()
        };
        RouteRequest::new(place(40.64, -73.77), place(40.75, -73.98))
    }

    #[tokio::test]
    async fn first_success_wins() {
        let a = Fixed::ok("a", 1000.0);
        let b = Fixed::ok("b", 2000.0);
        let chain = chain(&[&a, &b]);
        let summary = chain.resolve(&request()).await.expect("route");
        assert!((summary.distance_meters - 1000.0).abs() < f64::EPSILON);
        assert_eq!(b.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_through_to_next_strategy() {
        let a = Fixed::failing("a", "ERROR");
        let b = Fixed::ok("b", 2000.0);
        let chain = chain(&[&a, &b]);
        let summary = chain.resolve(&request()).await.expect("route");
        assert!((summary.distance_meters - 2000.0).abs() < f64::EPSILON);
        assert_eq!(a.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn last_error_is_returned() {
        let a = Fixed::failing("a", "ERROR");
        let b = Fixed::failing("b", "ZERO_RESULTS");
        let chain = chain(&[&a, &b]);
        let err = chain.resolve(&request()).await.unwrap_err();
        assert_eq!(err.status_token(), "ZERO_RESULTS");
    }

    #[tokio::test]
    async fn empty_chain_errors() {
        let err = FallbackChain::new(Vec::new())
            .resolve(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, RoutingError::NoStrategies));
    }

    #[test]
    fn unresolved_place_has_no_waypoint() {
        assert!(Waypoint::from_place(&Place::from_text("JFK")).is_none());
    }
}

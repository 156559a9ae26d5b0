//! Route resolution for booking quotes.
//!
//! Two provider protocols are tried in priority order (the Routes API, then
//! the legacy Directions service). Provider failures are classified into a
//! small set of actionable categories, and the [`RouteResolver`] drives the
//! per-form state machine with debouncing and stale-result suppression.

pub mod classify;
pub mod directions;
pub mod error;
pub mod handle;
pub mod resolver;
pub mod routes_api;
pub mod strategy;
pub mod types;

pub use classify::{
    classify_error, classify_status, humanize_load_error, Classification, ErrorCategory,
};
pub use directions::{CallbackDirections, CallbackDirectionsStrategy, DirectionsClient};
pub use error::RoutingError;
pub use handle::{ProviderConfig, ProviderHandle};
pub use resolver::{RouteResolver, RouteState};
pub use routes_api::RoutesApiClient;
pub use strategy::{FallbackChain, RouteRequest, RouteStrategy, Waypoint};
pub use types::{RouteSource, RouteSummary};

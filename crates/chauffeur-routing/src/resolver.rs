//! Per-form route resolution state machine.
//!
//! Every input change bumps a generation counter and re-evaluates the state.
//! When a provider call is needed, a task is spawned that first sleeps for the
//! debounce period; if any newer change arrived meanwhile, the task's
//! generation is stale and it exits without calling out. A result that
//! arrives for a stale generation is discarded, never committed.
//!
//! A classified failure sets a sticky "routing disabled" flag. Further input
//! changes report the stored failure without calling the provider until
//! [`RouteResolver::retry`] or a service change clears the flag.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chauffeur_core::{Place, ServiceType};
use tokio::sync::{watch, Mutex};

use crate::classify::{classify_error, Classification, ErrorCategory};
use crate::handle::ProviderHandle;
use crate::strategy::{RouteRequest, Waypoint};
use crate::types::RouteSummary;

const UNRESOLVED_MESSAGE: &str = "Please choose pickup and dropoff from the autocomplete suggestions (click a suggestion). This allows routing to use exact coordinates.";

type PairKey = ((u64, u64), (u64, u64));

#[derive(Debug, Clone, PartialEq)]
pub enum RouteState {
    /// At least one side is empty.
    Pending,
    /// A resolution attempt is debouncing or in flight.
    Loading,
    Ready(RouteSummary),
    /// The current service is not priced by route.
    Ineligible,
    Failed(Classification),
}

impl RouteState {
    #[must_use]
    pub fn summary(&self) -> Option<&RouteSummary> {
        match self {
            RouteState::Ready(summary) => Some(summary),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, RouteState::Loading)
    }
}

#[derive(Debug, Default)]
struct Inputs {
    service: ServiceType,
    pickup: Place,
    dropoff: Place,
    routing_disabled: bool,
    last_failure: Option<Classification>,
    cache: HashMap<PairKey, RouteSummary>,
}

struct Shared {
    inputs: Mutex<Inputs>,
    state: watch::Sender<RouteState>,
    generation: AtomicU64,
    handle: Arc<ProviderHandle>,
    debounce: Duration,
    origin: String,
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }
}

/// Drives route resolution for one booking form.
///
/// Must be used from within a Tokio runtime; resolution attempts run as
/// spawned tasks.
#[derive(Clone)]
pub struct RouteResolver {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for RouteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RouteResolver")
            .field("state", &*self.shared.state.borrow())
            .field("debounce", &self.shared.debounce)
            .finish_non_exhaustive()
    }
}

impl RouteResolver {
    /// `origin` is the page origin used in remediation text.
    #[must_use]
    pub fn new(handle: Arc<ProviderHandle>, debounce: Duration, origin: impl Into<String>) -> Self {
        let (state, _) = watch::channel(RouteState::Pending);
        Self {
            shared: Arc::new(Shared {
                inputs: Mutex::new(Inputs::default()),
                state,
                generation: AtomicU64::new(0),
                handle,
                debounce,
                origin: origin.into(),
            }),
        }
    }

    #[must_use]
    pub fn state(&self) -> RouteState {
        self.shared.state.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RouteState> {
        self.shared.state.subscribe()
    }

    pub async fn is_routing_disabled(&self) -> bool {
        self.shared.inputs.lock().await.routing_disabled
    }

    /// Changes the service type. A change clears the disabled flag; moving
    /// to a non-routed service reports `Ineligible` at once.
    pub async fn set_service(&self, service: ServiceType) {
        let mut inputs = self.shared.inputs.lock().await;
        if inputs.service == service {
            return;
        }
        inputs.service = service;
        inputs.routing_disabled = false;
        inputs.last_failure = None;
        self.reevaluate(&mut inputs);
    }

    pub async fn set_pickup(&self, place: Place) {
        let mut inputs = self.shared.inputs.lock().await;
        if inputs.pickup == place {
            return;
        }
        inputs.pickup = place;
        self.reevaluate(&mut inputs);
    }

    pub async fn set_dropoff(&self, place: Place) {
        let mut inputs = self.shared.inputs.lock().await;
        if inputs.dropoff == place {
            return;
        }
        inputs.dropoff = place;
        self.reevaluate(&mut inputs);
    }

    /// User-initiated retry: clears the disabled flag and re-evaluates.
    pub async fn retry(&self) {
        let mut inputs = self.shared.inputs.lock().await;
        inputs.routing_disabled = false;
        inputs.last_failure = None;
        self.reevaluate(&mut inputs);
    }

    /// Waits until the state is no longer `Loading` and returns it.
    pub async fn settled(&self) -> RouteState {
        let mut rx = self.subscribe();
        let settled = match rx.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        settled
    }

    fn reevaluate(&self, inputs: &mut Inputs) {
        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let next = self.next_state(inputs, generation);
        tracing::debug!(generation, state = ?next, "route state changed");
        self.shared.state.send_replace(next);
    }

    fn next_state(&self, inputs: &Inputs, generation: u64) -> RouteState {
        if !inputs.service.is_route_eligible() {
            return RouteState::Ineligible;
        }
        if inputs.routing_disabled {
            let failure = inputs.last_failure.clone().unwrap_or_else(|| {
                Classification::new(
                    ErrorCategory::Unknown,
                    "Routing is disabled. Retry to calculate the route.",
                )
            });
            return RouteState::Failed(failure);
        }
        if inputs.pickup.is_empty() || inputs.dropoff.is_empty() {
            return RouteState::Pending;
        }

        let (Some(origin), Some(destination)) = (
            Waypoint::from_place(&inputs.pickup),
            Waypoint::from_place(&inputs.dropoff),
        ) else {
            return RouteState::Failed(Classification::new(
                ErrorCategory::MalformedRequest,
                UNRESOLVED_MESSAGE,
            ));
        };

        let request = RouteRequest::new(origin, destination);
        if let Some(hit) = inputs.cache.get(&request.pair_key()) {
            tracing::debug!(generation, "route cache hit");
            return RouteState::Ready(hit.clone());
        }

        self.spawn_attempt(generation, request);
        RouteState::Loading
    }

    fn spawn_attempt(&self, generation: u64, request: RouteRequest) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            tokio::time::sleep(shared.debounce).await;
            if !shared.is_current(generation) {
                tracing::trace!(generation, "route attempt superseded during debounce");
                return;
            }

            let outcome = match shared.handle.chain().await {
                Ok(chain) => chain.resolve(&request).await,
                Err(e) => Err(e),
            };

            let mut inputs = shared.inputs.lock().await;
            if !shared.is_current(generation) {
                tracing::debug!(generation, "discarding stale route result");
                return;
            }

            match outcome {
                Ok(summary) => {
                    inputs.cache.insert(request.pair_key(), summary.clone());
                    shared.state.send_replace(RouteState::Ready(summary));
                }
                Err(e) => {
                    let classification = classify_error(&e, &shared.origin);
                    tracing::warn!(
                        generation,
                        category = ?classification.category,
                        error = %e,
                        "route resolution failed; routing disabled until retry"
                    );
                    inputs.routing_disabled = true;
                    inputs.last_failure = Some(classification.clone());
                    shared.state.send_replace(RouteState::Failed(classification));
                }
            }
        });
    }
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;

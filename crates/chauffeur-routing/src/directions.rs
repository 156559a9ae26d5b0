//! The legacy Directions service, used as the fallback protocol.
//!
//! Backends of this protocol may answer through a callback, through a
//! promise-like future, or both. [`CallbackDirectionsStrategy`] races the two
//! and treats whichever settles first as authoritative; the loser is dropped.

use async_trait::async_trait;
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{Client, Url};
use tokio::sync::oneshot;

use crate::classify::{status_from_thrown_message, LEGACY_NOT_ENABLED};
use crate::error::RoutingError;
use crate::strategy::{RouteRequest, RouteStrategy, Waypoint};
use crate::types::{DirectionsResponse, RouteSource, RouteSummary};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/";
const DIRECTIONS_PATH: &str = "maps/api/directions/json";

/// Promise-style completion: a reply, or the text of a thrown error.
pub type DirectionsFuture = BoxFuture<'static, Result<DirectionsResponse, String>>;

/// A directions backend with callback and/or promise-style completion.
pub trait CallbackDirections: Send + Sync {
    /// Starts a request. The backend may send the reply through `reply`,
    /// return a future that settles with it, or both.
    fn route(
        &self,
        request: &RouteRequest,
        reply: oneshot::Sender<DirectionsResponse>,
    ) -> Option<DirectionsFuture>;
}

/// Adapts a [`CallbackDirections`] backend into a [`RouteStrategy`].
pub struct CallbackDirectionsStrategy<B> {
    backend: B,
}

impl<B: CallbackDirections> CallbackDirectionsStrategy<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: CallbackDirections> RouteStrategy for CallbackDirectionsStrategy<B> {
    fn name(&self) -> &'static str {
        "directions"
    }

    async fn route(&self, request: &RouteRequest) -> Result<RouteSummary, RoutingError> {
        let (tx, rx) = oneshot::channel();
        let promise = self.backend.route(request, tx);
        let reply = first_settled(rx, promise).await;
        interpret_reply(reply)
    }
}

/// Waits for whichever completion path settles first.
///
/// A callback sender dropped without replying does not settle anything; the
/// promise path is then awaited alone. A promise reply without a status
/// counts as `OK`; one that carries a status keeps it.
pub async fn first_settled(
    mut callback: oneshot::Receiver<DirectionsResponse>,
    promise: Option<DirectionsFuture>,
) -> DirectionsResponse {
    let Some(promise) = promise else {
        return callback
            .await
            .unwrap_or_else(|_| thrown("directions callback dropped without a reply"));
    };

    tokio::select! {
        Ok(reply) = &mut callback => reply,
        settled = promise => match settled {
            Ok(mut reply) => {
                if reply.status.trim().is_empty() {
                    reply.status = "OK".to_string();
                }
                reply
            }
            Err(message) => thrown(&message),
        },
    }
}

fn thrown(message: &str) -> DirectionsResponse {
    DirectionsResponse {
        status: status_from_thrown_message(message).to_string(),
        error_message: Some(message.to_string()),
        routes: Vec::new(),
    }
}

/// Turns a provider reply into a route or a classified provider error.
///
/// # Errors
///
/// - [`RoutingError::Provider`] for any non-`OK` status. A legacy
///   "not enabled" error message overrides the reported status.
/// - [`RoutingError::IncompleteRoute`] when the status is `OK` but the
///   first leg lacks a distance or duration value.
pub fn interpret_reply(reply: DirectionsResponse) -> Result<RouteSummary, RoutingError> {
    let status = normalize_status(&reply);
    if status != "OK" {
        return Err(RoutingError::Provider {
            status,
            message: reply.error_message.unwrap_or_default(),
        });
    }

    let leg = reply
        .first_leg()
        .ok_or_else(|| RoutingError::IncompleteRoute("no route legs returned".to_string()))?;

    let distance = leg.distance.as_ref();
    let duration = leg.duration.as_ref();
    let meters = distance.and_then(|d| d.value).filter(|v| v.is_finite());
    let seconds = duration.and_then(|d| d.value).filter(|v| v.is_finite());

    let (Some(meters), Some(seconds)) = (meters, seconds) else {
        return Err(RoutingError::IncompleteRoute(
            "directions leg is missing distance or duration".to_string(),
        ));
    };

    let mut summary =
        RouteSummary::from_measurements(meters, seconds, None, RouteSource::Secondary);
    if let Some(text) = distance.map(|d| d.text.trim()).filter(|t| !t.is_empty()) {
        summary.distance_text = text.to_string();
    }
    if let Some(text) = duration.map(|d| d.text.trim()).filter(|t| !t.is_empty()) {
        summary.duration_text = text.to_string();
    }
    Ok(summary)
}

fn normalize_status(reply: &DirectionsResponse) -> String {
    let status = reply.status.trim().to_ascii_uppercase();
    let legacy = reply
        .error_message
        .as_deref()
        .is_some_and(|m| status_from_thrown_message(m) == LEGACY_NOT_ENABLED);
    if status != "OK" && legacy {
        return LEGACY_NOT_ENABLED.to_string();
    }
    if status.is_empty() {
        return "ERROR".to_string();
    }
    status
}

/// HTTP client for the directions web service.
#[derive(Clone)]
pub struct DirectionsClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl DirectionsClient {
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidBaseUrl`] if the built-in base URL
    /// fails to parse.
    pub fn new(client: Client, api_key: &str) -> Result<Self, RoutingError> {
        Self::with_base_url(client, api_key, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for wiremock tests).
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::InvalidBaseUrl`] if `base_url` is not a valid URL.
    pub fn with_base_url(client: Client, api_key: &str, base_url: &str) -> Result<Self, RoutingError> {
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let parsed = Url::parse(&normalised)
            .and_then(|u| u.join(DIRECTIONS_PATH))
            .map_err(|e| RoutingError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url: parsed,
        })
    }

    fn build_url(&self, request: &RouteRequest) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("origin", &waypoint_param(&request.origin));
            pairs.append_pair("destination", &waypoint_param(&request.destination));
            pairs.append_pair("mode", "driving");
            pairs.append_pair("key", &self.api_key);
        }
        url
    }

    /// Fetches the raw provider reply.
    ///
    /// # Errors
    ///
    /// Returns [`RoutingError::Http`] on network failure or a non-2xx status,
    /// or [`RoutingError::Deserialize`] if the body is not a directions reply.
    pub async fn fetch(&self, request: &RouteRequest) -> Result<DirectionsResponse, RoutingError> {
        let url = self.build_url(request);
        let response = self.client.get(url).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| RoutingError::Deserialize {
            context: "directions/json".to_string(),
            source: e,
        })
    }
}

impl CallbackDirections for DirectionsClient {
    fn route(
        &self,
        request: &RouteRequest,
        _reply: oneshot::Sender<DirectionsResponse>,
    ) -> Option<DirectionsFuture> {
        let this = self.clone();
        let request = request.clone();
        Some(
            async move { this.fetch(&request).await.map_err(|e| e.to_string()) }.boxed(),
        )
    }
}

/// A place identifier when known, otherwise the text label, otherwise the
/// raw coordinate.
fn waypoint_param(waypoint: &Waypoint) -> String {
    if let Some(id) = &waypoint.place_id {
        return format!("place_id:{id}");
    }
    if !waypoint.label.is_empty() {
        return waypoint.label.clone();
    }
    format!("{},{}", waypoint.location.lat, waypoint.location.lng)
}

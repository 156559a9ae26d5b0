//! Client for the modern Routes API (`directions/v2:computeRoutes`).
//!
//! Only coordinates are sent. A success response must carry distance,
//! duration and an encoded polyline; anything missing is reported as
//! [`RoutingError::IncompleteRoute`] so the caller falls back instead of
//! accepting a partial route.

use async_trait::async_trait;
use chauffeur_core::LatLng;
use reqwest::{Client, Url};

use crate::error::RoutingError;
use crate::strategy::{RouteRequest, RouteStrategy};
use crate::types::{
    parse_duration_seconds, ComputeRoutesRequest, ComputeRoutesResponse, RouteSource,
    RouteSummary, RoutesErrorEnvelope,
};

const DEFAULT_BASE_URL: &str = "https://routes.googleapis.com/";
const COMPUTE_ROUTES_PATH: &str = "directions/v2:computeRoutes";
const FIELD_MASK: &str = "routes.distanceMeters,routes.duration,routes.polyline.encodedPolyline";

pub struct RoutesApiClient {
    client: Client,
    api_key: String,
    base_url: Url,
}

impl RoutesApiClient {
    /// Creates a client pointed at the production Routes API.
    ///
    /// The client deliberately carries no request timeout of its own.
    ///
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
        let base_url = Url::parse(&normalised).map_err(|e| RoutingError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            base_url,
        })
    }

    fn endpoint(&self) -> Result<Url, RoutingError> {
        self.base_url
            .join(COMPUTE_ROUTES_PATH)
            .map_err(|e| RoutingError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Computes a driving route between two coordinates.
    ///
    /// # Errors
    ///
    /// - [`RoutingError::Http`] on network failure.
    /// - [`RoutingError::Provider`] on a non-2xx response; a
    ///   `PERMISSION_DENIED` status is reported as `REQUEST_DENIED`.
    /// - [`RoutingError::Deserialize`] if a 2xx body is not valid JSON.
    /// - [`RoutingError::IncompleteRoute`] if no route, or a route without
    ///   distance, duration or polyline, is returned.
    pub async fn compute_route(
        &self,
        origin: LatLng,
        destination: LatLng,
    ) -> Result<RouteSummary, RoutingError> {
        let url = self.endpoint()?;
        let body = ComputeRoutesRequest::driving(origin, destination);

        let response = self
            .client
            .post(url.clone())
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(provider_error(status.as_u16(), &text));
        }

        let parsed: ComputeRoutesResponse =
            serde_json::from_str(&text).map_err(|e| RoutingError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        let route = parsed
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RoutingError::IncompleteRoute("No routes returned.".to_string()))?;

        let meters = route.distance_meters.filter(|m| m.is_finite());
        let seconds = route.duration.as_ref().and_then(parse_duration_seconds);
        let polyline = route
            .polyline
            .and_then(|p| p.encoded_polyline)
            .filter(|p| !p.is_empty());

        match (meters, seconds, polyline) {
            (Some(meters), Some(seconds), Some(polyline)) => Ok(RouteSummary::from_measurements(
                meters,
                seconds,
                Some(polyline),
                RouteSource::Primary,
            )),
            _ => Err(RoutingError::IncompleteRoute(
                "Routes API returned an incomplete route (missing distance/duration/polyline)."
                    .to_string(),
            )),
        }
    }
}

/// Maps a non-2xx response into a provider error carrying a status token.
fn provider_error(http_status: u16, body: &str) -> RoutingError {
    let envelope: RoutesErrorEnvelope = serde_json::from_str(body).unwrap_or_default();
    let error = envelope.error.unwrap_or_default();

    let raw_status = error.status.unwrap_or_else(|| "ERROR".to_string());
    let message = error
        .message
        .filter(|m| !m.is_empty())
        .or_else(|| (!body.is_empty()).then(|| body.to_string()))
        .unwrap_or_else(|| format!("HTTP {http_status}"));

    let token = if raw_status.to_ascii_uppercase().contains("PERMISSION_DENIED") {
        "REQUEST_DENIED"
    } else {
        "ERROR"
    };

    RoutingError::Provider {
        status: token.to_string(),
        message: format!("{raw_status}: {message}"),
    }
}

#[async_trait]
impl RouteStrategy for RoutesApiClient {
    fn name(&self) -> &'static str {
        "routes_api"
    }

    async fn route(&self, request: &RouteRequest) -> Result<RouteSummary, RoutingError> {
        self.compute_route(request.origin.location, request.destination.location)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_under_base_path() {
        let client = RoutesApiClient::with_base_url(Client::new(), "k", "http://localhost:9999/")
            .expect("client");
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "http://localhost:9999/directions/v2:computeRoutes"
        );
    }

    #[test]
    fn permission_denied_maps_to_request_denied() {
        let body = r#"{"error":{"code":403,"message":"API key not valid","status":"PERMISSION_DENIED"}}"#;
        match provider_error(403, body) {
            RoutingError::Provider { status, message } => {
                assert_eq!(status, "REQUEST_DENIED");
                assert_eq!(message, "PERMISSION_DENIED: API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn other_errors_map_to_generic_token() {
        match provider_error(500, "upstream exploded") {
            RoutingError::Provider { status, message } => {
                assert_eq!(status, "ERROR");
                assert_eq!(message, "ERROR: upstream exploded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_error_body_reports_http_status() {
        match provider_error(502, "") {
            RoutingError::Provider { message, .. } => assert_eq!(message, "ERROR: HTTP 502"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = RoutesApiClient::with_base_url(Client::new(), "k", "not a url").err();
        assert!(matches!(err, Some(RoutingError::InvalidBaseUrl { .. })));
    }
}

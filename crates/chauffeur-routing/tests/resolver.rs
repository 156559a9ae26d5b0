//! End-to-end resolver tests over the Google provider chain with both
//! protocols served by wiremock.

use std::sync::Arc;
use std::time::Duration;

use chauffeur_core::{LatLng, Place};
use chauffeur_routing::{
    ErrorCategory, ProviderConfig, ProviderHandle, RouteResolver, RouteSource, RouteState,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ROUTES_PATH: &str = "/directions/v2:computeRoutes";
const DIRECTIONS_PATH: &str = "/maps/api/directions/json";
const ORIGIN: &str = "https://book.example.com";
const API_KEY: &str = "AIzaSyTestKey0000000000000000000";

fn resolver(server: &MockServer) -> RouteResolver {
    let handle = ProviderHandle::google(ProviderConfig {
        api_key: Some(API_KEY.to_string()),
        routes_base_url: server.uri(),
        directions_base_url: server.uri(),
        request_timeout: Duration::from_secs(5),
        init_timeout: Duration::from_secs(5),
    });
    RouteResolver::new(Arc::new(handle), Duration::from_millis(10), ORIGIN)
}

fn jfk() -> Place {
    Place::resolved(
        "JFK Terminal 4",
        Some("ChIJjfk".to_string()),
        LatLng::new(40.6441, -73.7823).unwrap(),
    )
}

fn times_square() -> Place {
    Place::resolved("Times Square", None, LatLng::new(40.758, -73.9855).unwrap())
}

fn penn_station() -> Place {
    Place::resolved("Penn Station", None, LatLng::new(40.7506, -73.9935).unwrap())
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .expect("request recording enabled")
        .len()
}

async fn mount_incomplete_primary(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(ROUTES_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "routes": [{ "distanceMeters": 32187, "duration": "2460s" }]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn denied_fallback_disables_routing_until_retry() {
    let server = MockServer::start().await;
    mount_incomplete_primary(&server).await;
    Mock::given(method("GET"))
        .and(path(DIRECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "This API key is not authorized to use this service or API.",
            "routes": []
        })))
        .mount(&server)
        .await;

    let resolver = resolver(&server);
    resolver.set_pickup(jfk()).await;
    resolver.set_dropoff(times_square()).await;

    let RouteState::Failed(classification) = resolver.settled().await else {
        panic!("expected a failed route");
    };
    assert_eq!(classification.category, ErrorCategory::AccessDenied);
    assert!(resolver.is_routing_disabled().await);
    assert_eq!(request_count(&server).await, 2);

    // a new input pair does not reach the provider while disabled
    resolver.set_dropoff(penn_station()).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(matches!(
        resolver.state(),
        RouteState::Failed(ref c) if c.category == ErrorCategory::AccessDenied
    ));
    assert_eq!(request_count(&server).await, 2);

    resolver.retry().await;
    assert!(!resolver.is_routing_disabled().await);
    assert!(matches!(resolver.settled().await, RouteState::Failed(_)));
    assert_eq!(request_count(&server).await, 4);
}

#[tokio::test]
async fn rejected_primary_falls_back_to_directions_route() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ROUTES_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({
            "error": {
                "code": 403,
                "message": "Routes API has not been used in project 123 before or it is disabled.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(DIRECTIONS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "routes": [{ "legs": [{
                "distance": { "value": 27359, "text": "17.0 mi" },
                "duration": { "value": 2580, "text": "43 mins" }
            }] }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let resolver = resolver(&server);
    resolver.set_pickup(jfk()).await;
    resolver.set_dropoff(times_square()).await;

    let RouteState::Ready(summary) = resolver.settled().await else {
        panic!("expected a ready route");
    };
    assert_eq!(summary.source, RouteSource::Secondary);
    assert_eq!(summary.describe(), "17.0 mi (~43 mins)");
    assert!(!resolver.is_routing_disabled().await);
}

#[tokio::test]
async fn zero_results_fallback_reports_no_route() {
    let server = MockServer::start().await;
    mount_incomplete_primary(&server).await;
    Mock::given(method("GET"))
        .and(path(DIRECTIONS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "routes": [] })),
        )
        .mount(&server)
        .await;

    let resolver = resolver(&server);
    resolver.set_pickup(jfk()).await;
    resolver.set_dropoff(times_square()).await;

    assert!(matches!(
        resolver.settled().await,
        RouteState::Failed(ref c) if c.category == ErrorCategory::NoRouteFound
    ));
}

//! Integration tests for `PlacesClient` and the search pipeline using wiremock
//! HTTP mocks. No real network traffic is made.

use std::time::Duration;

use dogpark_core::{LatLng, RegionRegistry};
use dogpark_places::{
    MarkerBoard, PipelineOptions, PlacesClient, PlacesError, SearchError, SearchPipeline,
    SearchRequest, SkipReason, NO_RESULTS_MESSAGE,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 5, "dogpark-test/0.1", base_url)
        .expect("client construction should not fail")
}

fn stockholm_request() -> SearchRequest {
    SearchRequest::new(LatLng::new(59.3293, 18.0686), 50_000.0).expect("valid request")
}

fn summary(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "displayName": { "text": format!("Park {id}"), "languageCode": "en" },
        "formattedAddress": "Somewhere, Sweden",
        "location": { "latitude": 59.33, "longitude": 18.06 }
    })
}

fn detail_with_reviews(id: &str) -> serde_json::Value {
    json!({
        "id": id,
        "displayName": { "text": "Tantolunden Hundrastgård" },
        "formattedAddress": "Ringvägen, 118 60 Stockholm, Sweden",
        "location": { "latitude": 59.3125, "longitude": 18.0497 },
        "photos": [
            { "name": format!("places/{id}/photos/first"), "widthPx": 4032, "heightPx": 3024 },
            { "name": format!("places/{id}/photos/second") }
        ],
        "reviews": [
            { "rating": 5, "text": { "text": "Big fenced area." } },
            { "rating": 4, "text": { "text": "Muddy after rain." } },
            { "rating": 5, "text": { "text": "Third review is not shown." } }
        ]
    })
}

async fn mount_nearby(server: &MockServer, places: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "places": places })))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, id: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(format!("/places/{id}")))
        .respond_with(response)
        .mount(server)
        .await;
}

fn pipeline_for(server: &MockServer, options: PipelineOptions) -> SearchPipeline<PlacesClient> {
    SearchPipeline::new(test_client(&server.uri()), MarkerBoard::shared(), options)
}

// ---------------------------------------------------------------------------
// PlacesClient
// ---------------------------------------------------------------------------

#[tokio::test]
async fn search_nearby_sends_headers_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .and(header("X-Goog-Api-Key", "test-key"))
        .and(headers(
            "X-Goog-FieldMask",
            vec![
                "places.displayName",
                "places.formattedAddress",
                "places.location",
                "places.id",
            ],
        ))
        .and(body_partial_json(json!({
            "includedTypes": ["dog_park"],
            "maxResultCount": 20,
            "languageCode": "en-US",
            "regionCode": "SE",
            "locationRestriction": { "circle": { "radius": 50000.0 } }
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "places": [summary("p1"), summary("p2")] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let places = test_client(&server.uri())
        .search_nearby(&stockholm_request())
        .await
        .expect("should parse nearby places");

    assert_eq!(places.len(), 2);
    assert_eq!(places[0].id.as_deref(), Some("p1"));
    assert_eq!(places[1].id.as_deref(), Some("p2"));
}

#[tokio::test]
async fn search_nearby_with_no_matches_returns_empty_vec() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let places = test_client(&server.uri())
        .search_nearby(&stockholm_request())
        .await
        .expect("empty body is a valid response");
    assert!(places.is_empty());
}

#[tokio::test]
async fn search_nearby_rejection_carries_status_and_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "PERMISSION_DENIED"
            }
        })))
        .mount(&server)
        .await;

    let err = test_client(&server.uri())
        .search_nearby(&stockholm_request())
        .await
        .unwrap_err();

    match err {
        PlacesError::ServiceRejected { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(
                message.as_deref(),
                Some("API key not valid. Please pass a valid API key.")
            );
        }
        other => panic!("expected ServiceRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn place_details_requests_fields_and_parses_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/places/p1"))
        .and(query_param(
            "fields",
            "photos,reviews,displayName,formattedAddress,location",
        ))
        .and(query_param("key", "test-key"))
        .and(query_param("languageCode", "en-US"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_with_reviews("p1")))
        .mount(&server)
        .await;

    let detail = test_client(&server.uri())
        .place_details("p1")
        .await
        .expect("should parse detail");

    assert_eq!(detail.name(), Some("Tantolunden Hundrastgård"));
    assert_eq!(detail.photos.len(), 2);
    assert_eq!(detail.reviews.len(), 3);
    assert_eq!(detail.ratings(), vec![5.0, 4.0, 5.0]);
}

#[tokio::test]
async fn place_details_not_found_is_rejected_without_message() {
    let server = MockServer::start().await;
    mount_detail(&server, "gone", ResponseTemplate::new(404).set_body_string("nope")).await;

    let err = test_client(&server.uri())
        .place_details("gone")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PlacesError::ServiceRejected {
            status: 404,
            message: None
        }
    ));
}

#[tokio::test]
async fn malformed_success_body_is_a_deserialize_error() {
    let server = MockServer::start().await;
    mount_detail(&server, "bad", ResponseTemplate::new(200).set_body_string("{not json")).await;

    let err = test_client(&server.uri())
        .place_details("bad")
        .await
        .unwrap_err();
    assert!(matches!(err, PlacesError::Deserialize { .. }));
}

// ---------------------------------------------------------------------------
// Search pipeline over HTTP
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_detail_fetch_skips_only_that_place() {
    let server = MockServer::start().await;
    mount_nearby(&server, json!([summary("p1"), summary("p2")])).await;
    mount_detail(
        &server,
        "p1",
        ResponseTemplate::new(200).set_body_json(detail_with_reviews("p1")),
    )
    .await;
    mount_detail(&server, "p2", ResponseTemplate::new(500)).await;

    let pipeline = pipeline_for(&server, PipelineOptions::default());
    let report = pipeline
        .search(LatLng::new(59.3293, 18.0686), 50_000.0)
        .await
        .expect("search succeeds despite one failed detail");

    assert_eq!(report.places_found, 2);
    assert_eq!(report.markers_added, 1);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].place_id.as_deref(), Some("p2"));
    assert!(matches!(
        report.skipped[0].reason,
        SkipReason::DetailFetchFailed(_)
    ));

    let board = pipeline.board().lock().await;
    assert_eq!(board.len(), 1);
    let marker = &board.markers()[0];
    assert_eq!(marker.place_id, "p1");
    assert_eq!(marker.review_count, 3);
    let avg = marker.average_rating.expect("reviews present");
    assert!((avg - 14.0 / 3.0).abs() < 1e-9);

    let html = &marker.popup_html;
    assert!(html.contains("(3 reviews)"));
    assert_eq!(html.matches("<p><i>").count(), 2);
    assert_eq!(html.matches(r#"class="fas fa-star""#).count(), 4);
    assert_eq!(html.matches("fa-star-half-alt").count(), 1);
    assert_eq!(html.matches(r#"class="far fa-star""#).count(), 0);
    assert!(html.contains("places/p1/photos/first/media?key=test-key&amp;maxHeightPx=200&amp;maxWidthPx=200"));
    assert!(!html.contains("photos/second"));
}

#[tokio::test]
async fn empty_nearby_result_reports_notice_and_fetches_no_details() {
    let server = MockServer::start().await;
    mount_nearby(&server, json!([])).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server, PipelineOptions::default());
    let report = pipeline
        .search(LatLng::new(59.3293, 18.0686), 50_000.0)
        .await
        .expect("empty result is not an error");

    assert_eq!(report.notice(), Some(NO_RESULTS_MESSAGE));
    assert_eq!(report.markers_added, 0);
    assert!(pipeline.board().lock().await.is_empty());
}

#[tokio::test]
async fn rejected_nearby_search_aborts_with_user_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "Invalid radius." }
        })))
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server, PipelineOptions::default());
    pipeline
        .board()
        .lock()
        .await
        .add(dogpark_places::MarkerEntry {
            place_id: "old".to_string(),
            location: LatLng::new(59.0, 18.0),
            title: "Old".to_string(),
            popup_html: String::new(),
            average_rating: None,
            review_count: 0,
        });

    let err = pipeline
        .search(LatLng::new(59.3293, 18.0686), 50_000.0)
        .await
        .unwrap_err();

    assert!(matches!(err, SearchError::ServiceRejected { status: 400, .. }));
    assert_eq!(
        err.user_message(),
        "Error searching for dog parks: 400 - Invalid radius."
    );
    assert!(pipeline.board().lock().await.is_empty());
}

#[tokio::test]
async fn detail_without_location_is_skipped() {
    let server = MockServer::start().await;
    mount_nearby(&server, json!([summary("nowhere")])).await;
    mount_detail(
        &server,
        "nowhere",
        ResponseTemplate::new(200).set_body_json(json!({
            "id": "nowhere",
            "displayName": { "text": "Lost Park" }
        })),
    )
    .await;

    let pipeline = pipeline_for(&server, PipelineOptions::default());
    let report = pipeline
        .search(LatLng::new(59.3293, 18.0686), 10_000.0)
        .await
        .expect("search succeeds");

    assert_eq!(report.markers_added, 0);
    assert_eq!(report.skipped[0].reason, SkipReason::MissingLocation);
    assert!(pipeline.board().lock().await.is_empty());
}

#[tokio::test]
async fn concurrent_detail_fetches_keep_nearby_order() {
    let server = MockServer::start().await;
    mount_nearby(&server, json!([summary("slow"), summary("fast"), summary("slow")])).await;
    mount_detail(
        &server,
        "slow",
        ResponseTemplate::new(200)
            .set_body_json(detail_with_reviews("slow"))
            .set_delay(Duration::from_millis(300)),
    )
    .await;
    mount_detail(
        &server,
        "fast",
        ResponseTemplate::new(200).set_body_json(detail_with_reviews("fast")),
    )
    .await;

    let options = PipelineOptions {
        detail_concurrency: 3,
        ..PipelineOptions::default()
    };
    let pipeline = pipeline_for(&server, options);
    let report = pipeline
        .search(LatLng::new(59.3293, 18.0686), 10_000.0)
        .await
        .expect("search succeeds");

    assert_eq!(report.markers_added, 3);
    let board = pipeline.board().lock().await;
    let ids: Vec<&str> = board.markers().iter().map(|m| m.place_id.as_str()).collect();
    assert_eq!(ids, ["slow", "fast", "slow"]);
}

#[tokio::test]
async fn unknown_region_touches_neither_board_nor_service() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server, PipelineOptions::default());
    pipeline
        .board()
        .lock()
        .await
        .add(dogpark_places::MarkerEntry {
            place_id: "kept".to_string(),
            location: LatLng::new(59.0, 18.0),
            title: "Kept".to_string(),
            popup_html: String::new(),
            average_rating: None,
            review_count: 0,
        });

    let outcome = pipeline
        .search_region(&RegionRegistry::swedish_counties(), "atlantis")
        .await;

    assert!(outcome.is_none());
    assert_eq!(pipeline.board().lock().await.len(), 1);
}

#[tokio::test]
async fn region_search_uses_region_center_and_radius() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/places:searchNearby"))
        .and(body_partial_json(json!({
            "locationRestriction": {
                "circle": {
                    "center": { "latitude": 57.5, "longitude": 18.5 },
                    "radius": 50000.0
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "places": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let pipeline = pipeline_for(&server, PipelineOptions::default());
    let outcome = pipeline
        .search_region(&RegionRegistry::swedish_counties(), "gotland")
        .await
        .expect("gotland is a known region");

    assert_eq!(outcome.region.name, "Gotland");
    assert_eq!(outcome.view.zoom, 10);
    assert_eq!(outcome.view.center, LatLng::new(57.5, 18.5));
    assert!(outcome.result.is_ok());
}

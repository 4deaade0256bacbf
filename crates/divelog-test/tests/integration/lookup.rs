#![allow(clippy::unused_async, unused_must_use)]
//! Tests for the geocoding, club search and metadata preview endpoints.

use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;

// ============================================================================
// Healthcheck
// ============================================================================

#[test_log::test(tokio::test)]
async fn healthcheck_is_mounted_under_api() {
    let app = create_test_app();

    TestRequest::get("/api/app/healthcheck")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .assert_body_contains("OK");
}

// ============================================================================
// Geocoding
// ============================================================================

#[test_log::test(tokio::test)]
async fn forward_geocode_returns_ranked_results() {
    let app = create_test_app();

    let resp = TestRequest::get("/api/geocode?q=Blue%20Hole")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let body = resp.json();
    assert_eq!(body["query"], "Blue Hole");
    assert_eq!(body["results"][0]["short_name"], "Great Blue Hole");
    assert_eq!(body["results"][0]["country"], "Belize");
}

#[test_log::test(tokio::test)]
async fn forward_geocode_short_query_is_empty() {
    let app = create_test_app();

    let resp = TestRequest::get("/api/geocode?q=B")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    assert_eq!(resp.json()["results"], json!([]));
}

#[test_log::test(tokio::test)]
async fn forward_geocode_requires_query() {
    let app = create_test_app();

    let resp = TestRequest::get("/api/geocode")
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(resp.error_message().contains("'q'"));
}

#[test_log::test(tokio::test)]
async fn reverse_geocode_names_known_place() {
    let app = create_test_app();

    let resp = TestRequest::get("/api/geocode/reverse?lat=17.3158&lon=-87.5347")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let body = resp.json();
    assert_eq!(
        body["display_name"],
        "Great Blue Hole, Belize District, Belize"
    );
    assert_eq!(body["result"]["short_name"], "Great Blue Hole");
}

#[test_log::test(tokio::test)]
async fn reverse_geocode_without_coverage_falls_back_to_coordinates() {
    let app = create_test_app();

    let resp = TestRequest::get("/api/geocode/reverse?lat=0&lon=-140")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let body = resp.json();
    assert_eq!(body["display_name"], "0.00000, -140.00000");
    assert!(body["result"].is_null());
}

#[test_log::test(tokio::test)]
async fn reverse_geocode_rejects_out_of_range_coordinates() {
    let app = create_test_app();

    TestRequest::get("/api/geocode/reverse?lat=91&lon=0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    TestRequest::get("/api/geocode/reverse?lat=north&lon=0")
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Club search
// ============================================================================

#[test_log::test(tokio::test)]
async fn search_club_returns_first_result() {
    let app = create_test_app();

    let resp = TestRequest::get("/api/search-club?q=Reef%20Rats")
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let body = resp.json();
    assert_eq!(body["url"], "https://reef-rats.example.org/");
    assert_eq!(body["query"], "Reef Rats dive club");
}

#[test_log::test(tokio::test)]
async fn search_club_without_results_is_not_found() {
    let app = create_test_app();

    let resp = TestRequest::get("/api/search-club?q=Nobody%20Has%20Heard%20Of%20Us")
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    assert_eq!(resp.error_message(), "No results found");
}

#[test_log::test(tokio::test)]
async fn search_club_blank_query_is_bad_request() {
    let app = create_test_app();

    TestRequest::get("/api/search-club?q=%20%20")
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Metadata preview
// ============================================================================

#[test_log::test(tokio::test)]
async fn resolve_metadata_previews_enrichment() {
    let app = create_test_app();

    let resp = TestRequest::post("/api/resolve-dive-metadata")
        .json_body(&json!({
            "location_name": "Great Blue Hole",
            "club_name": "Reef Rats",
        }))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let body = resp.json();
    assert_eq!(body["coordinates"]["latitude"], 17.3158);
    assert_eq!(
        body["osm_link"],
        "https://www.openstreetmap.org/?mlat=17.3158&mlon=-87.5347#map=16/17.3158/-87.5347"
    );
    assert_eq!(body["club_website"], "https://reef-rats.example.org/");
}

#[test_log::test(tokio::test)]
async fn resolve_metadata_leaves_unresolved_fields_empty() {
    let app = create_test_app();

    let resp = TestRequest::post("/api/resolve-dive-metadata")
        .json_body(&json!({
            "location_name": "Somewhere Unmapped",
            "club_name": UNKNOWN_CLUB,
        }))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let body = resp.json();
    assert!(body["coordinates"].is_null());
    assert!(body["osm_link"].is_null());
    assert!(body["club_website"].is_null());
}

#[test_log::test(tokio::test)]
async fn resolve_metadata_rejects_malformed_body() {
    let app = create_test_app();

    TestRequest::post("/api/resolve-dive-metadata")
        .raw_json_body("{\"location_name\": ")
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

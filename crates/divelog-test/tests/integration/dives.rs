#![allow(clippy::unused_async, unused_must_use)]
//! Tests for dive upsert, lookup and deletion.

use chrono::TimeDelta;
use futures::future::join_all;
use salvo::http::StatusCode;
use serde_json::json;

use super::helpers::*;

// ============================================================================
// Upsert
// ============================================================================

#[test_log::test(tokio::test)]
async fn upsert_inserts_then_updates_same_key() {
    let app = create_test_app();

    let first = TestRequest::post("/api/dives/upsert")
        .json_body(&dive_json(7))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(first["outcome"], "inserted");

    app.clock.advance(TimeDelta::minutes(5));

    let mut changed = dive_json(7);
    changed["max_depth"] = json!(40.0);
    let second = TestRequest::post("/api/dives/upsert")
        .json_body(&changed)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(second["outcome"], "updated");
    assert_eq!(second["id"], first["id"]);
    assert_eq!(second["dive"]["max_depth"], 40.0);
    assert_eq!(second["dive"]["logged_at"], first["dive"]["logged_at"]);
    assert_ne!(second["dive"]["updated_at"], first["dive"]["updated_at"]);
    assert_eq!(app.dives.len().await, 1);
}

#[test_log::test(tokio::test)]
async fn upsert_enriches_location_and_club() {
    let app = create_test_app();

    let body = TestRequest::post("/api/dives/upsert")
        .json_body(&dive_json(1))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let dive = &body["dive"];
    assert_eq!(dive["latitude"], 17.3158);
    assert_eq!(dive["longitude"], -87.5347);
    assert_eq!(
        dive["osm_link"],
        "https://www.openstreetmap.org/?mlat=17.3158&mlon=-87.5347#map=16/17.3158/-87.5347"
    );
    assert_eq!(dive["club_website"], "https://reef-rats.example.org/");
    assert_eq!(dive["dive_date"], "2024-05-30T00:00:00Z");
    assert_eq!(dive["water_type"], "saltwater");
}

#[test_log::test(tokio::test)]
async fn upsert_without_enrichment_stores_submission_as_is() {
    let app = create_test_app();

    let body = TestRequest::post("/api/dives/upsert?enrich=false")
        .json_body(&dive_json(1))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let dive = &body["dive"];
    assert!(dive["latitude"].is_null());
    assert!(dive["osm_link"].is_null());
    assert!(dive["club_website"].is_null());
}

#[test_log::test(tokio::test)]
async fn upsert_keeps_fields_missing_from_update() {
    let app = create_test_app();

    let mut original = dive_json(3);
    original["notes"] = json!("Saw a bull shark");
    TestRequest::post("/api/dives/upsert?enrich=false")
        .json_body(&original)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK);

    let body = TestRequest::post("/api/dives/upsert?enrich=false")
        .json_body(&dive_json(3))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(body["dive"]["notes"], "Saw a bull shark");
}

#[test_log::test(tokio::test)]
async fn concurrent_upserts_of_one_key_keep_one_record() {
    let app = create_test_app();

    let requests = (0..4).map(|i| {
        let mut dive = dive_json(11);
        dive["duration"] = json!(40.0 + f64::from(i));
        TestRequest::post("/api/dives/upsert?enrich=false")
            .json_body(&dive)
            .send(&app.service)
    });

    let responses = join_all(requests).await;
    let inserted = responses
        .iter()
        .filter(|resp| resp.status == StatusCode::OK && resp.json()["outcome"] == "inserted")
        .count();

    assert_eq!(inserted, 1);
    assert!(responses.iter().all(|resp| resp.status == StatusCode::OK));
    assert_eq!(app.dives.len().await, 1);
}

// ============================================================================
// Validation
// ============================================================================

#[test_log::test(tokio::test)]
async fn invalid_dive_lists_every_offending_field() {
    let app = create_test_app();

    let mut dive = dive_json(0);
    dive["max_depth"] = json!(-2.0);
    dive["latitude"] = json!(17.3);
    dive["water_type"] = json!("lava");

    let resp = TestRequest::post("/api/dives/upsert")
        .json_body(&dive)
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(resp.error_message().starts_with("Invalid dive data"));
    let fields = resp.error_fields();
    for expected in ["dive_number", "max_depth", "longitude", "water_type"] {
        assert!(
            fields.iter().any(|f| f == expected),
            "expected {expected} in {fields:?}"
        );
    }
    assert!(app.dives.is_empty().await);
}

#[test_log::test(tokio::test)]
async fn missing_required_fields_are_reported() {
    let app = create_test_app();

    let resp = TestRequest::post("/api/dives/upsert")
        .json_body(&json!({ "user_id": "user-1" }))
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let fields = resp.error_fields();
    for expected in [
        "dive_number",
        "dive_date",
        "location",
        "duration",
        "max_depth",
        "water_type",
        "club_name",
        "instructor_name",
        "photo_storage_id",
    ] {
        assert!(
            fields.iter().any(|f| f == expected),
            "expected {expected} in {fields:?}"
        );
    }
}

#[test_log::test(tokio::test)]
async fn malformed_json_is_bad_request() {
    let app = create_test_app();

    let resp = TestRequest::post("/api/dives/upsert")
        .raw_json_body("{ \"user_id\": ")
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(resp.error_message().starts_with("Invalid JSON"));
}

#[test_log::test(tokio::test)]
async fn wrongly_typed_field_is_listed() {
    let app = create_test_app();

    let mut dive = dive_json(8);
    dive["duration"] = json!("45");

    let resp = TestRequest::post("/api/dives/upsert?enrich=false")
        .json_body(&dive)
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(resp.error_message().starts_with("Invalid dive data"));
    assert_eq!(resp.error_fields(), vec!["duration".to_string()]);
    assert!(app.dives.is_empty().await);
}

// ============================================================================
// Upsert with photo
// ============================================================================

#[test_log::test(tokio::test)]
async fn upsert_with_photo_attaches_uploaded_reference() {
    let app = create_test_app();

    let mut dive = dive_json(5);
    dive.as_object_mut()
        .expect("object")
        .remove("photo_storage_id");
    let dive_data = dive.to_string();

    let body = TestRequest::post("/api/dives/upsert-with-photo")
        .multipart(Some(("image/jpeg", PNG_BYTES)), &[("dive_data", dive_data.as_str())])
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    let storage_id = body["photo_storage_id"].as_str().expect("storage id");
    assert_eq!(body["outcome"], "inserted");
    assert_eq!(body["dive"]["photo_storage_id"], storage_id);
    assert_eq!(app.photos.len(), 1);
}

#[test_log::test(tokio::test)]
async fn upsert_with_photo_rejects_unsupported_type_before_upload() {
    let app = create_test_app();
    let dive_data = dive_json(5).to_string();

    let resp = TestRequest::post("/api/dives/upsert-with-photo")
        .multipart(Some(("image/gif", &b"GIF89a"[..])), &[("dive_data", dive_data.as_str())])
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(resp.error_message(), "Unsupported file type: image/gif");
    assert!(app.photos.is_empty());
    assert!(app.dives.is_empty().await);
}

#[test_log::test(tokio::test)]
async fn upsert_with_photo_rejects_malformed_dive_data() {
    let app = create_test_app();

    let resp = TestRequest::post("/api/dives/upsert-with-photo")
        .multipart(Some(("image/png", PNG_BYTES)), &[("dive_data", "{not json")])
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(resp.error_message().starts_with("Invalid JSON"));
    assert!(app.photos.is_empty());
}

#[test_log::test(tokio::test)]
async fn upsert_with_photo_invalid_dive_uploads_nothing() {
    let app = create_test_app();

    let mut dive = dive_json(5);
    dive["duration"] = json!(0);
    let dive_data = dive.to_string();

    TestRequest::post("/api/dives/upsert-with-photo")
        .multipart(Some(("image/png", PNG_BYTES)), &[("dive_data", dive_data.as_str())])
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert!(app.photos.is_empty());
}

#[test_log::test(tokio::test)]
async fn upsert_with_photo_requires_dive_data() {
    let app = create_test_app();

    let resp = TestRequest::post("/api/dives/upsert-with-photo")
        .multipart(Some(("image/png", PNG_BYTES)), &[])
        .send(&app.service)
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    assert_eq!(resp.error_message(), "Missing 'dive_data' field");
}

// ============================================================================
// Lookup and deletion
// ============================================================================

#[test_log::test(tokio::test)]
async fn get_dive_by_id() {
    let app = create_test_app();

    let created = TestRequest::post("/api/dives/upsert?enrich=false")
        .json_body(&dive_json(2))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let id = created["id"].as_str().expect("id");

    let dive = TestRequest::get(&format!("/api/dives/{id}"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(dive, created["dive"]);
}

#[test_log::test(tokio::test)]
async fn unknown_dive_id_is_not_found() {
    let app = create_test_app();

    TestRequest::get(&format!("/api/dives/{}", uuid::Uuid::now_v7()))
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    TestRequest::get("/api/dives/not-a-uuid")
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[test_log::test(tokio::test)]
async fn delete_dive_removes_it() {
    let app = create_test_app();

    let created = TestRequest::post("/api/dives/upsert?enrich=false")
        .json_body(&dive_json(2))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let id = created["id"].as_str().expect("id");

    let deleted = TestRequest::delete(&format!("/api/dives/{id}"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(deleted["deleted"], true);
    assert_eq!(deleted["id"], id);

    TestRequest::get(&format!("/api/dives/{id}"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);

    TestRequest::delete(&format!("/api/dives/{id}"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#![allow(clippy::unused_async, unused_must_use)]
//! A complete logging session: find the site, upload the photo, log the
//! dive, then read it back by its natural key.

use salvo::http::StatusCode;
use serde_json::json;

use divelog_test::component::constants::{
    API_ROUTE_PREFIX, DIVES_ROUTE_PREFIX, PHOTOS_ROUTE_PREFIX, USERS_ROUTE_PREFIX,
};

use super::helpers::*;

#[test_log::test(tokio::test)]
async fn log_a_dive_from_search_to_lookup() {
    let app = create_test_app();

    let place = TestRequest::get(&format!("{API_ROUTE_PREFIX}/geocode?q=Great%20Blue%20Hole"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let latitude = place["results"][0]["latitude"].clone();
    let longitude = place["results"][0]["longitude"].clone();

    let photo = TestRequest::post(PHOTOS_ROUTE_PREFIX)
        .multipart(Some(("image/png", PNG_BYTES)), &[])
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    let storage_id = photo["photo_storage_id"].clone();

    let mut dive = dive_json(21);
    dive["latitude"] = latitude.clone();
    dive["longitude"] = longitude.clone();
    dive["photo_storage_id"] = storage_id.clone();
    dive["buddy_ids"] = json!(["user-9"]);
    dive["Buddy_check"] = json!(true);

    let upserted = TestRequest::post(&format!("{DIVES_ROUTE_PREFIX}/upsert"))
        .json_body(&dive)
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(upserted["outcome"], "inserted");

    let stored = TestRequest::get(&format!("{USERS_ROUTE_PREFIX}/user-1/dives/21"))
        .send(&app.service)
        .await
        .assert_status(StatusCode::OK)
        .json();

    assert_eq!(stored["id"], upserted["id"]);
    assert_eq!(stored["latitude"], latitude);
    assert_eq!(stored["longitude"], longitude);
    assert_eq!(stored["photo_storage_id"], storage_id);
    assert_eq!(stored["buddy_ids"], json!(["user-9"]));
    assert_eq!(stored["buddy_check"], true);
    assert_eq!(stored["club_website"], "https://reef-rats.example.org/");
    assert_eq!(stored["logged_at"], stored["updated_at"]);

    let photo_url = TestRequest::get(&format!(
        "{PHOTOS_ROUTE_PREFIX}/{}",
        storage_id.as_str().expect("storage id")
    ))
    .send(&app.service)
    .await
    .assert_status(StatusCode::OK)
    .json();
    assert!(
        photo_url["url"]
            .as_str()
            .is_some_and(|url| url.ends_with(storage_id.as_str().unwrap_or_default()))
    );

    let content = TestRequest::get(&format!(
        "{PHOTOS_ROUTE_PREFIX}/{}/content",
        storage_id.as_str().expect("storage id")
    ))
    .send(&app.service)
    .await
    .assert_status(StatusCode::OK);
    assert_eq!(content.bytes, PNG_BYTES);
}

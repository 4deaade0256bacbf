#![allow(
    clippy::unused_async,
    clippy::expect_used,
    clippy::missing_panics_doc,
    dead_code
)]
//! Shared helpers for the HTTP integration tests.
//!
//! Every test builds its own service around in-memory stores, a mock clock
//! and canned resolvers, so no network or database is touched.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use salvo::http::HeaderMap;
use salvo::http::header::HeaderName;
use salvo::http::{Method, ReqBody, StatusCode};
use salvo::prelude::*;
use salvo::test::{RequestBuilder, ResponseExt, TestClient};
use serde_json::{Value, json};

use divelog_test::app::api::routes;
use divelog_test::app::services_handler::DiveServicesHandler;
use divelog_test::component::clock::MockClock;
use divelog_test::component::club::{ClubWebsiteResolver, ClubWebsiteResult};
use divelog_test::component::config::{
    ClubSearchConfig, ConfigHandler, DEFAULT_SEARCH_USER_AGENT, DatabaseConfig, GeocoderConfig,
    LoggingConfig, PhotoBackend, PhotoConfig, ServerConfig, Settings,
};
use divelog_test::component::error::{ServiceError, ServiceResult};
use divelog_test::component::geo::{GeoResolver, GeocodeResult, usable_query};
use divelog_test::component::photo::MemoryPhotoStore;
use divelog_test::component::services::DiveServices;
use divelog_test::component::store::MemoryDiveStore;

pub const MAX_PHOTO_BYTES: usize = 4096;
pub const MULTIPART_BOUNDARY: &str = "divelog-test-boundary";

/// A tiny payload that passes for a PNG as far as the server is concerned.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-pixels";

// ============================================================================
// Canned resolvers
// ============================================================================

/// Geocoder that knows exactly one place.
pub struct CannedGeo;

pub fn blue_hole() -> GeocodeResult {
    GeocodeResult {
        latitude: 17.3158,
        longitude: -87.5347,
        short_name: "Great Blue Hole".to_string(),
        formatted_address: "Great Blue Hole, Belize District, Belize".to_string(),
        city: None,
        state: Some("Belize District".to_string()),
        country: Some("Belize".to_string()),
    }
}

#[async_trait]
impl GeoResolver for CannedGeo {
    async fn forward(&self, query: &str) -> ServiceResult<Vec<GeocodeResult>> {
        let Some(query) = usable_query(query) else {
            return Ok(Vec::new());
        };
        if query.to_lowercase().contains("blue hole") {
            Ok(vec![blue_hole()])
        } else {
            Ok(Vec::new())
        }
    }

    async fn reverse(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> ServiceResult<Option<GeocodeResult>> {
        let place = blue_hole();
        let near = (latitude - place.latitude).abs() < 0.01
            && (longitude - place.longitude).abs() < 0.01;
        Ok(near.then_some(place))
    }
}

/// Search that finds a website for every club except the unknown one.
pub struct CannedClubSearch;

pub const UNKNOWN_CLUB: &str = "Nobody Has Heard Of Us";

#[async_trait]
impl ClubWebsiteResolver for CannedClubSearch {
    async fn resolve(&self, club_name: &str) -> ServiceResult<Option<ClubWebsiteResult>> {
        let name = club_name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidQuery(
                "Club name must not be empty".to_string(),
            ));
        }
        if name == UNKNOWN_CLUB {
            return Ok(None);
        }
        let slug = name.to_lowercase().replace(' ', "-");
        Ok(Some(ClubWebsiteResult {
            url: format!("https://{slug}.example.org/"),
            query: format!("{name} dive club"),
        }))
    }
}

// ============================================================================
// Test service
// ============================================================================

#[must_use]
pub fn test_settings() -> Settings {
    Settings {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5800,
            max_upload_bytes: 64 * 1024,
        },
        database: DatabaseConfig {
            url: "postgres://localhost/divelog_test".to_string(),
            max_connections: 1,
            run_migrations: false,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        geocoder: GeocoderConfig {
            base_url: "http://geocoder.invalid".to_string(),
            contact_email: None,
            result_limit: 5,
            timeout_secs: 1,
            cache_ttl_secs: 0,
            cache_capacity: 0,
        },
        club_search: ClubSearchConfig {
            base_url: "http://search.invalid".to_string(),
            user_agent: DEFAULT_SEARCH_USER_AGENT.to_string(),
            timeout_secs: 1,
        },
        photos: PhotoConfig {
            backend: PhotoBackend::Memory,
            deployment_url: None,
            auth_token: None,
            upload_function: "files.js/generateUploadUrl".to_string(),
            max_bytes: MAX_PHOTO_BYTES,
        },
    }
}

/// A service plus handles on its stores for assertions.
pub struct TestApp {
    pub service: Service,
    pub dives: Arc<MemoryDiveStore>,
    pub photos: Arc<MemoryPhotoStore>,
    pub clock: Arc<MockClock>,
}

/// ## Summary
/// Creates a fresh service with empty stores and a clock fixed at
/// 2024-06-01T12:00:00Z.
#[must_use]
pub fn create_test_app() -> TestApp {
    let dives = Arc::new(MemoryDiveStore::new());
    let photos = Arc::new(MemoryPhotoStore::new(MAX_PHOTO_BYTES));
    let clock = Arc::new(MockClock::with_time(
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
            .single()
            .expect("valid time"),
    ));

    let services = DiveServices::new(
        Arc::new(CannedGeo),
        Arc::new(CannedClubSearch),
        photos.clone(),
        dives.clone(),
        clock.clone(),
    );

    let router = Router::new()
        .hoop(ConfigHandler::new(test_settings()))
        .hoop(DiveServicesHandler {
            services: Arc::new(services),
        })
        .push(routes());

    TestApp {
        service: Service::new(router),
        dives,
        photos,
        clock,
    }
}

// ============================================================================
// Payloads
// ============================================================================

/// A complete, valid submission for `user-1`.
#[must_use]
pub fn dive_json(dive_number: i64) -> Value {
    json!({
        "user_id": "user-1",
        "dive_number": dive_number,
        "dive_date": "2024-05-30",
        "location": "Great Blue Hole",
        "duration": 42.0,
        "max_depth": 38.5,
        "water_type": "saltwater",
        "mode": "scubadiving",
        "club_name": "Reef Rats",
        "instructor_name": "Ana Diaz",
        "photo_storage_id": "photo-1",
    })
}

/// Multipart body with an optional file part and optional text fields.
#[must_use]
pub fn multipart_body(file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }

    if let Some((content_type, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"dive.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

// ============================================================================
// Request / response builders
// ============================================================================

/// Test request builder for constructing HTTP requests.
pub struct TestRequest {
    method: Method,
    path: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

impl TestRequest {
    #[must_use]
    pub fn new(method: Method, path: &str) -> Self {
        Self {
            method,
            path: path.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn get(path: &str) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: &str) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn delete(path: &str) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    #[must_use]
    pub fn content_type(self, content_type: &str) -> Self {
        self.header("Content-Type", content_type)
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    #[must_use]
    pub fn json_body(self, value: &Value) -> Self {
        self.content_type("application/json")
            .body(value.to_string().into_bytes())
    }

    /// Sets a raw string as a JSON request body, malformed or not.
    #[must_use]
    pub fn raw_json_body(self, raw: &str) -> Self {
        self.content_type("application/json")
            .body(raw.as_bytes().to_vec())
    }

    #[must_use]
    pub fn multipart(self, file: Option<(&str, &[u8])>, fields: &[(&str, &str)]) -> Self {
        self.content_type(&format!(
            "multipart/form-data; boundary={MULTIPART_BOUNDARY}"
        ))
        .body(multipart_body(file, fields))
    }

    /// Sends the request to the test service and returns the response.
    pub async fn send(self, service: &Service) -> TestResponse {
        let url = format!("http://127.0.0.1:5800{}", self.path);

        let mut client = match self.method.as_str() {
            "GET" => TestClient::get(&url),
            "POST" => TestClient::post(&url),
            "DELETE" => TestClient::delete(&url),
            _ => RequestBuilder::new(&url, self.method.clone()),
        };

        for (name, value) in self.headers {
            if let Ok(header_name) = HeaderName::try_from(name.as_str()) {
                client = client.add_header(header_name, value, true);
            }
        }

        if let Some(body_bytes) = self.body {
            client = client.body(ReqBody::Once(body_bytes.into()));
        }

        let mut response = client.send(service).await;

        let status = response
            .status_code
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let headers = response.headers().clone();
        let bytes = response
            .take_bytes(None)
            .await
            .map(|bytes| bytes.to_vec())
            .unwrap_or_default();
        let body = String::from_utf8_lossy(&bytes).into_owned();

        TestResponse {
            status,
            headers,
            bytes,
            body,
        }
    }
}

/// Represents an HTTP test response for assertions.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub bytes: Vec<u8>,
    pub body: String,
}

impl TestResponse {
    #[must_use]
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status, expected,
            "Expected status {expected} but got {}: {}",
            self.status, self.body
        );
        self
    }

    #[must_use]
    pub fn assert_body_contains(self, expected: &str) -> Self {
        assert!(
            self.body.contains(expected),
            "Expected body to contain {expected:?}, got {}",
            self.body
        );
        self
    }

    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("response body should be JSON")
    }

    /// A response header as text, if present and printable.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string)
    }

    /// The `error` message of an error response.
    #[must_use]
    pub fn error_message(&self) -> String {
        self.json()["error"]
            .as_str()
            .expect("error response should carry a message")
            .to_string()
    }

    /// Field names listed by a validation error response.
    #[must_use]
    pub fn error_fields(&self) -> Vec<String> {
        self.json()["fields"]
            .as_array()
            .map(|fields| {
                fields
                    .iter()
                    .filter_map(|f| f["field"].as_str().map(ToString::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

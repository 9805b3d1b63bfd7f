// Shared fake backend for integration tests, started once per test binary.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    // `Arc` shares data between threads; `OnceLock` writes a value only once.
    // `Mutex` guards the log of what the fake backend received.
    sync::{Arc, Mutex, OnceLock},
    // Sleep durations are used in readiness polling loops.
    time::Duration,
};

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Multipart, Path, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use serde_json::{Value, json};

pub const TOKEN: &str = "tok-123";
pub const PASSWORD: &str = "secret1";
pub const TAKEN_EMAIL: &str = "taken@example.com";
pub const PDF: &[u8] = b"%PDF-1.4 fake certificate";
// Uploads above this size are refused with 413.
pub const UPLOAD_LIMIT: usize = 1024;

// Global base URL used by all tests after the server publishes its bound address.
static SERVER_URL: OnceLock<String> = OnceLock::new();
// One-time guard that ensures the server bootstrap path runs only once.
static SERVER_READY: OnceLock<()> = OnceLock::new();
// Bodies received by write endpoints, keyed by a value the test chooses.
static RECEIVED: OnceLock<Mutex<HashMap<String, Value>>> = OnceLock::new();

fn received() -> &'static Mutex<HashMap<String, Value>> {
    RECEIVED.get_or_init(|| Mutex::new(HashMap::new()))
}

fn remember(key: String, body: Value) {
    received().lock().expect("received mutex").insert(key, body);
}

// What the fake backend recorded under `key`, if anything.
pub fn received_body(key: &str) -> Option<Value> {
    received().lock().expect("received mutex").get(key).cloned()
}

// Ensure the fake backend is running and return the shared base URL.
pub fn ensure_server() -> &'static str {
    // Run initialization exactly once even if multiple tests call this function.
    SERVER_READY.get_or_init(|| {
        // Local one-time slot where the server thread publishes its selected URL.
        let published_url = Arc::new(OnceLock::<String>::new());
        // Clone so the spawned thread can write into the same shared slot.
        let published_url_thread = Arc::clone(&published_url);
        // Spawn an OS thread so the server outlives individual `#[tokio::test]` runtimes.
        std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("test runtime");
            runtime.block_on(async move {
                // Bind to an ephemeral port to avoid collisions with local services.
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind ephemeral test port");
                let addr = listener.local_addr().expect("get local addr");
                let _ = published_url_thread.set(format!("http://{}", addr));
                axum::serve(listener, app()).await.expect("server failed");
            });
        });
        wait_for_server_url_and_readiness(published_url);
    });

    SERVER_URL
        .get()
        .expect("server url should be initialized")
        .as_str()
}

// Wait for URL publication and then wait for the server socket to accept TCP connections.
fn wait_for_server_url_and_readiness(published_url: Arc<OnceLock<String>>) {
    let base_url = loop {
        if let Some(url) = published_url.get() {
            break url.clone();
        }
        // Avoid a tight loop while waiting for the background thread.
        std::thread::sleep(Duration::from_millis(10));
    };

    let _ = SERVER_URL.set(base_url.clone());

    // Strip the scheme so we can use host:port for raw TCP readiness checks.
    let addr = base_url
        .strip_prefix("http://")
        .expect("base url should use http://");

    for _ in 0..100 {
        if std::net::TcpStream::connect(addr).is_ok() {
            return;
        }
        std::thread::sleep(Duration::from_millis(20));
    }

    panic!("server did not become ready in time");
}

fn app() -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/requests/user", get(my_requests))
        .route("/api/requests", post(submit))
        .route("/api/requests/{id}/status", put(update_status))
        .route("/api/requests/{id}/schedule", put(schedule))
        .route("/api/user/my-stats/requests-by-status", get(stats))
        .route("/api/user/certificate/generate", get(certificate))
        .route("/api/user/profile", put(update_profile))
        .route("/reverse", get(reverse))
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        == Some(format!("Bearer {TOKEN}").as_str())
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Full authentication is required" })),
    )
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return unauthorized_login();
    }
    let email = body["email"].as_str().unwrap_or_default();
    let role = if email.starts_with("admin") {
        "ROLE_ADMIN"
    } else {
        "USER"
    };
    Json(json!({
        "accessToken": TOKEN,
        "user": {
            "id": 7,
            "name": "Asha Rao",
            "email": email,
            "role": role,
            "address": "12 Green Lane",
            "memberSince": "2024-01-01"
        }
    }))
    .into_response()
}

fn unauthorized_login() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Invalid email or password" })),
    )
        .into_response()
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == TAKEN_EMAIL {
        return (StatusCode::BAD_REQUEST, "Email already in use").into_response();
    }
    StatusCode::OK.into_response()
}

async fn my_requests(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        {
            "id": 1,
            "deviceType": "LAPTOP",
            "brand": "Dell",
            "model": "XPS 13",
            "condition": "WORKING",
            "quantity": 2,
            "pickupAddress": "12 Green Lane",
            "status": "COMPLETED",
            "createdAt": "2025-03-04T10:15:00",
            "assignedPersonName": "Ravi"
        },
        {
            "id": 2,
            "deviceType": "MOBILE",
            "brand": "Nokia",
            "model": "3310",
            "status": "PENDING",
            "createdAt": "2025-05-01T08:00:00Z",
            "unexpected": true
        }
    ]))
    .into_response()
}

// Records every part; the `model` field keys the record.
async fn submit(headers: HeaderMap, mut multipart: Multipart) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }

    let mut fields = serde_json::Map::new();
    let mut images = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap_or_default();
            if bytes.len() > UPLOAD_LIMIT {
                return StatusCode::PAYLOAD_TOO_LARGE.into_response();
            }
            images.push(json!({
                "fileName": file_name,
                "contentType": content_type,
                "size": bytes.len()
            }));
        } else {
            let value = field.text().await.unwrap_or_default();
            fields.insert(name, Value::String(value));
        }
    }

    let key = fields
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    remember(key, json!({ "fields": fields, "images": images }));
    StatusCode::CREATED.into_response()
}

async fn update_status(headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    if id == 404 {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Request not found" })))
            .into_response();
    }
    remember(format!("status/{id}"), body);
    StatusCode::OK.into_response()
}

// Refuses dates that are not an absolute instant, as the real backend does.
async fn schedule(headers: HeaderMap, Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let instant = body["pickupDate"]
        .as_str()
        .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok());
    if instant.is_none() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "Text could not be parsed" })),
        )
            .into_response();
    }
    remember(format!("schedule/{id}"), body);
    StatusCode::OK.into_response()
}

async fn stats(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(json!([
        { "status": "COMPLETED", "count": 8 },
        { "status": "COLLECTED", "count": 2 },
        { "status": "PENDING", "count": 5 }
    ]))
    .into_response()
}

async fn certificate(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    (
        [(header::CONTENT_TYPE, "application/pdf")],
        Bytes::from_static(PDF),
    )
        .into_response()
}

async fn update_profile(headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return unauthorized();
    }
    let key = format!("profile/{}", body["name"].as_str().unwrap_or_default());
    remember(key, body);
    StatusCode::OK.into_response()
}

async fn reverse(Query(params): Query<HashMap<String, String>>) -> Response {
    if params.get("format").map(String::as_str) != Some("json") {
        return StatusCode::BAD_REQUEST.into_response();
    }
    let lat = params.get("lat").cloned().unwrap_or_default();
    let lon = params.get("lon").cloned().unwrap_or_default();
    // 0,0 is open sea: no address.
    if lat == "0" && lon == "0" {
        return Json(json!({ "error": "Unable to geocode" })).into_response();
    }
    Json(json!({ "display_name": format!("Near {lat}, {lon}, Bengaluru") })).into_response()
}

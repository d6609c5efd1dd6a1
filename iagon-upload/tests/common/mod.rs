#![allow(dead_code)]

//! A local stand-in for the storage gateway that records every request.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

/// Directory name the fake gateway refuses with 403.
pub const FORBIDDEN_DIR: &str = "forbidden";
/// Directory name answered with a 200 lacking `data._id`.
pub const GARBLED_DIR: &str = "garbled";
/// File name the fake gateway refuses with 422.
pub const REJECTED_FILE: &str = "reject.txt";

#[derive(Debug, Clone)]
pub struct RecordedDirectory {
    pub api_key: Option<String>,
    pub body: Value,
}

#[derive(Debug, Clone, Default)]
pub struct RecordedUpload {
    pub api_key: Option<String>,
    pub fields: HashMap<String, String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct Recorded {
    pub directories: Vec<RecordedDirectory>,
    pub uploads: Vec<RecordedUpload>,
}

pub type Shared = Arc<Mutex<Recorded>>;

fn api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn create_directory(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let name = body["directory_name"].as_str().unwrap_or_default().to_string();
    state.lock().unwrap().directories.push(RecordedDirectory {
        api_key: api_key(&headers),
        body,
    });

    match name.as_str() {
        FORBIDDEN_DIR => (StatusCode::FORBIDDEN, "directory not allowed").into_response(),
        GARBLED_DIR => (StatusCode::OK, Json(json!({ "data": {} }))).into_response(),
        _ => Json(json!({
            "success": true,
            "data": { "_id": format!("dir-{name}"), "directory_name": name }
        }))
        .into_response(),
    }
}

async fn upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut recorded = RecordedUpload {
        api_key: api_key(&headers),
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            recorded.file_name = field.file_name().map(str::to_owned);
            recorded.content_type = field.content_type().map(str::to_owned);
            recorded.content = field.bytes().await.unwrap().to_vec();
        } else {
            let text = field.text().await.unwrap();
            recorded.fields.insert(name, text);
        }
    }

    let reject = recorded.fields.get("filename").map(String::as_str) == Some(REJECTED_FILE);
    state.lock().unwrap().uploads.push(recorded);

    if reject {
        (StatusCode::UNPROCESSABLE_ENTITY, "quota exceeded").into_response()
    } else {
        Json(json!({ "success": true })).into_response()
    }
}

/// Starts the fake gateway and returns its base URL (`.../api/v2`).
pub async fn spawn_gateway() -> (String, Shared) {
    let state = Shared::default();
    let app = Router::new()
        .route("/api/v2/storage/directory", post(create_directory))
        .route("/api/v2/storage/upload", post(upload))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api/v2"), state)
}

/// A base URL nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/v2")
}

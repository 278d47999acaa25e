//! Mock renderer and request builders shared by the API tests

#![allow(dead_code)]

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    routing::post,
    Router,
};
use sigform::blank::{blank_document, to_bytes};
use std::fmt::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const BOUNDARY: &str = "----SigformBoundary7MA4YWxkTrZu0gW";

/// A valid PDF with `pages` blank A4 pages
pub fn sample_pdf(pages: u32) -> Vec<u8> {
    let mut doc = blank_document(pages);
    to_bytes(&mut doc).unwrap()
}

pub struct MockRenderer {
    pub calls: AtomicUsize,
    pub last_api_key: Mutex<Option<String>>,
    pub last_body: Mutex<Option<serde_json::Value>>,
    status: StatusCode,
    response: Vec<u8>,
}

impl MockRenderer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

async fn generate(
    State(mock): State<Arc<MockRenderer>>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Vec<u8>) {
    mock.calls.fetch_add(1, Ordering::SeqCst);
    *mock.last_api_key.lock().unwrap() = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    *mock.last_body.lock().unwrap() = serde_json::from_slice(&body).ok();
    (mock.status, mock.response.clone())
}

/// Start a renderer on an ephemeral port; returns its `/generate` URL
pub async fn spawn_renderer(status: StatusCode, response: Vec<u8>) -> (String, Arc<MockRenderer>) {
    let mock = Arc::new(MockRenderer {
        calls: AtomicUsize::new(0),
        last_api_key: Mutex::new(None),
        last_body: Mutex::new(None),
        status,
        response,
    });

    let app = Router::new()
        .route("/generate", post(generate))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/generate"), mock)
}

/// Multipart upload to `/add-signature-field`
pub fn upload_request(pdf: Option<&[u8]>, fields: &[(&str, &str)]) -> Request<Body> {
    let mut body = Vec::new();

    if let Some(pdf) = pdf {
        let mut head = String::new();
        write!(head, "--{BOUNDARY}\r\n").unwrap();
        write!(
            head,
            "Content-Disposition: form-data; name=\"pdf\"; filename=\"input.pdf\"\r\n"
        )
        .unwrap();
        write!(head, "Content-Type: application/pdf\r\n\r\n").unwrap();
        body.extend_from_slice(head.as_bytes());
        body.extend_from_slice(pdf);
        body.extend_from_slice(b"\r\n");
    }

    for (name, value) in fields {
        let mut part = String::new();
        write!(part, "--{BOUNDARY}\r\n").unwrap();
        write!(part, "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").unwrap();
        write!(part, "{value}\r\n").unwrap();
        body.extend_from_slice(part.as_bytes());
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .uri("/add-signature-field")
        .method("POST")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// JSON request to `/create-pdf-with-signature`
pub fn create_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .uri("/create-pdf-with-signature")
        .method("POST")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap()
}

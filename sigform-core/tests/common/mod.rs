//! Shared fixtures: a tiny PDF and an in-process mock renderer

#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::post,
    Router,
};
use lopdf::{Dictionary, Document, Object, Stream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A valid one-page PDF
pub fn sample_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let content_id = doc.add_object(Stream::new(
        Dictionary::new(),
        b"0 0 1 rg 100 600 200 50 re f".to_vec(),
    ));

    let mut page = Dictionary::new();
    page.set("Type", Object::Name(b"Page".to_vec()));
    page.set("Parent", Object::Reference(pages_id));
    page.set("Contents", Object::Reference(content_id));
    page.set(
        "MediaBox",
        Object::Array(vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Integer(595),
            Object::Integer(842),
        ]),
    );
    let page_id = doc.add_object(page);

    let mut pages = Dictionary::new();
    pages.set("Type", Object::Name(b"Pages".to_vec()));
    pages.set("Count", Object::Integer(1));
    pages.set("Kids", Object::Array(vec![Object::Reference(page_id)]));
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let mut catalog = Dictionary::new();
    catalog.set("Type", Object::Name(b"Catalog".to_vec()));
    catalog.set("Pages", Object::Reference(pages_id));
    let catalog_id = doc.add_object(catalog);
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

/// What the mock renderer saw and how it answers
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

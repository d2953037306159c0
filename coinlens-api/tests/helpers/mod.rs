//! Test helpers for coinlens-api integration tests
//!
//! - In-memory record store and temporary image root
//! - Scripted recognizer standing in for the Gemini API
//! - Request builders and body extraction

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use coinlens_api::services::{CoinRecognizer, ImageStore, RecognitionError};
use coinlens_api::{build_router, AppState};
use coinlens_common::CoinAnalysis;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

const BOUNDARY: &str = "coinlens-test-boundary";

/// Outcome a [`ScriptedRecognizer`] produces on every call
#[derive(Clone)]
pub enum Script {
    Analysis(CoinAnalysis),
    Malformed(String),
    Upstream(String),
}

/// Recognizer returning a fixed outcome and recording its inputs
pub struct ScriptedRecognizer {
    script: Script,
    calls: AtomicUsize,
    received: Mutex<Vec<(Vec<u8>, Vec<u8>)>>,
}

impl ScriptedRecognizer {
    pub fn new(script: Script) -> Self {
        Self {
            script,
            calls: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn received(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.received.lock().unwrap().clone()
    }
}

#[async_trait]
impl CoinRecognizer for ScriptedRecognizer {
    async fn identify_coin(
        &self,
        front_image: &[u8],
        back_image: &[u8],
    ) -> Result<CoinAnalysis, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.received
            .lock()
            .unwrap()
            .push((front_image.to_vec(), back_image.to_vec()));

        match &self.script {
            Script::Analysis(analysis) => Ok(analysis.clone()),
            Script::Malformed(raw) => Err(RecognitionError::MalformedResponse {
                reason: "expected value".to_string(),
                raw: raw.clone(),
            }),
            Script::Upstream(msg) => Err(RecognitionError::Upstream(msg.clone())),
        }
    }
}

/// A router wired to test collaborators
pub struct TestApp {
    pub router: axum::Router,
    pub db: SqlitePool,
    pub recognizer: Arc<ScriptedRecognizer>,
    pub upload_dir: PathBuf,
    // Keeps the temporary directory alive for the duration of the test
    _temp_dir: TempDir,
}

impl TestApp {
    /// Image root is `<tempdir>/uploads` and does not exist until first save
    pub async fn new(script: Script) -> Self {
        let temp_dir = TempDir::new().unwrap();
        let upload_dir = temp_dir.path().join("uploads");
        Self::with_upload_dir(script, temp_dir, upload_dir).await
    }

    pub async fn with_upload_dir(script: Script, temp_dir: TempDir, upload_dir: PathBuf) -> Self {
        let db = test_db().await;
        let recognizer = Arc::new(ScriptedRecognizer::new(script));
        let state = AppState::new(
            db.clone(),
            recognizer.clone(),
            ImageStore::new(&upload_dir),
        );

        Self {
            router: build_router(state),
            db,
            recognizer,
            upload_dir,
            _temp_dir: temp_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        use tower::ServiceExt;

        self.router.clone().oneshot(request).await.unwrap()
    }

    pub async fn coin_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM coins")
            .fetch_one(&self.db)
            .await
            .unwrap()
    }

    /// Names of files in the image root (empty if it doesn't exist)
    pub fn stored_files(&self) -> Vec<String> {
        match std::fs::read_dir(&self.upload_dir) {
            Ok(entries) => {
                let mut names: Vec<String> = entries
                    .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
                    .collect();
                names.sort();
                names
            }
            Err(_) => Vec::new(),
        }
    }
}

/// Single-connection in-memory database with the coins table
pub async fn test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    coinlens_api::db::init_tables(&pool).await.unwrap();

    pool
}

pub fn morgan_dollar() -> CoinAnalysis {
    CoinAnalysis {
        name: "Morgan Dollar".to_string(),
        description: "United States silver dollar".to_string(),
        year: "1921".to_string(),
        country: "United States".to_string(),
    }
}

/// Build an identify request with the given (field name, bytes) parts
pub fn identify_request(parts: &[(&str, &[u8])]) -> Request<Body> {
    let mut body = Vec::new();
    for (name, data) in parts {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n",
                BOUNDARY, name, name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/coins/identify")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Should parse JSON")
}

//! Shared fixtures for the HTTP integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use api_lib::adapters::InMemoryRecordStore;
use api_lib::config::{Config, StoreBackend};
use api_lib::web::{self, state::AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use futures::stream::{self, StreamExt};
use life_script_core::ports::{
    PortError, PortResult, ReportGenerationService, ReportRequest, ReportStream,
};
use life_script_core::RecordLifecycle;
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;

/// One scripted step of a fake report generation.
#[derive(Clone, Debug)]
pub enum Step {
    Text(&'static str),
    Fail,
    /// Never yields again.
    Hang,
}

/// A `ReportGenerationService` that replays a fixed script and remembers the
/// requests it was given.
#[derive(Default)]
pub struct ScriptedReport {
    steps: Vec<Step>,
    refuse: bool,
    stall: bool,
    pub requests: Mutex<Vec<ReportRequest>>,
}

impl ScriptedReport {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            ..Default::default()
        }
    }

    /// Fails before producing anything, like a rejected API key.
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Default::default()
        }
    }

    /// Never returns from `stream_report`, like a backend that accepted the
    /// connection but never answers.
    pub fn stalled() -> Self {
        Self {
            stall: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ReportGenerationService for ScriptedReport {
    async fn stream_report(&self, request: &ReportRequest) -> PortResult<ReportStream> {
        self.requests.lock().await.push(request.clone());
        if self.refuse {
            return Err(PortError::Upstream("401 invalid api key".to_string()));
        }
        if self.stall {
            std::future::pending::<()>().await;
        }

        let mut items = Vec::new();
        let mut hang = false;
        for step in &self.steps {
            match step {
                Step::Text(text) => items.push(Ok(text.to_string())),
                Step::Fail => items.push(Err(PortError::Upstream("connection reset".to_string()))),
                Step::Hang => {
                    hang = true;
                    break;
                }
            }
        }

        let replay = stream::iter(items);
        if hang {
            Ok(Box::pin(replay.chain(stream::pending())))
        } else {
            Ok(Box::pin(replay))
        }
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: InMemoryRecordStore,
}

pub fn test_config() -> Config {
    Config {
        store_backend: StoreBackend::Memory,
        report_timeout: Duration::from_secs(5),
        ..Default::default()
    }
}

pub fn build_app(
    config: Config,
    with_store: bool,
    report: Option<Arc<dyn ReportGenerationService>>,
) -> TestApp {
    let store = InMemoryRecordStore::new();
    let records = with_store.then(|| RecordLifecycle::new(Arc::new(store.clone())));
    let state = Arc::new(AppState {
        config: Arc::new(config),
        records,
        report,
    });
    TestApp {
        router: web::router(state),
        store,
    }
}

/// An app with an in-memory store and no report backend.
pub fn records_app() -> TestApp {
    build_app(test_config(), true, None)
}

/// Twenty-five answers, all the same choice.
pub fn uniform_answers(choice: &str) -> Value {
    let answers: serde_json::Map<String, Value> = (1..=25)
        .map(|q| (q.to_string(), Value::String(choice.to_string())))
        .collect();
    Value::Object(answers)
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<Body> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

/// The `data:` payloads of an SSE body, keep-alive comments excluded.
pub fn sse_data(body: &str) -> Vec<String> {
    body.split("\n\n")
        .flat_map(|event| event.lines())
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|data| data.trim_start().to_string())
        .collect()
}

/// Creates a record through the API and returns its id.
pub async fn create_record(app: &TestApp, visitor: &str, choice: &str) -> String {
    let body = serde_json::json!({ "visitorId": visitor, "answers": uniform_answers(choice) });
    let response = send(app, json_request("POST", "/api/records", &body)).await;
    body_json(response).await["recordId"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Marks a record as paid through the API.
pub async fn pay_record(app: &TestApp, record_id: &str) {
    let body = serde_json::json!({ "recordId": record_id, "paid": true });
    let response = send(app, json_request("PUT", "/api/records", &body)).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
}

/// Fetches a record through the API.
pub async fn fetch_record(app: &TestApp, record_id: &str) -> Value {
    let uri = format!("/api/records?action=get&recordId={}", record_id);
    body_json(send(app, get_request(&uri)).await).await["record"].clone()
}

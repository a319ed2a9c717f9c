//! Common test utilities for survey-service router tests.

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use service_core::config::{Config, DatabaseConfig};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Once};
use survey_service::config::{AssessmentServiceConfig, SurveyConfig};
use survey_service::models::{AnswerSummary, QuestionSummary, SetSummary};
use survey_service::services::{InMemoryStore, ResolveError, SetResolver};
use survey_service::{build_router, AppState, Application};
use tower::ServiceExt;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,survey_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Resolver over a fixed table of sets, counting every call.
#[derive(Default)]
pub struct StaticResolver {
    sets: HashMap<i64, Vec<QuestionSummary>>,
    calls: AtomicU64,
}

impl StaticResolver {
    pub fn with_set(mut self, set_id: i64, question_text: &str) -> Self {
        self.sets.insert(
            set_id,
            vec![QuestionSummary {
                question_id: set_id * 100,
                question_text: question_text.to_string(),
                answers: vec![AnswerSummary {
                    value: "v1".to_string(),
                    suggestion: "s1".to_string(),
                }],
            }],
        );
        self
    }

    #[allow(dead_code)]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SetResolver for StaticResolver {
    async fn resolve_set(&self, set_id: i64) -> Result<SetSummary, ResolveError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sets
            .get(&set_id)
            .map(|questions| SetSummary {
                set_id,
                questions: questions.clone(),
            })
            .ok_or(ResolveError::NotFound)
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub resolver: Arc<StaticResolver>,
}

/// Router over a fresh in-memory store and a resolver knowing set 1.
pub fn spawn_app() -> TestApp {
    init_tracing();

    let store = Arc::new(InMemoryStore::new());
    let resolver = Arc::new(StaticResolver::default().with_set(1, "What is the JVM?"));
    let router = build_router(AppState::in_memory(store.clone(), resolver.clone()));
    TestApp {
        router,
        store,
        resolver,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn text(&self) -> String {
        String::from_utf8(self.body.clone()).expect("response body is not UTF-8")
    }
}

pub async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    dispatch(router, request).await
}

/// Send a body verbatim, labelled as JSON whether or not it parses.
#[allow(dead_code)]
pub async fn send_raw(router: &Router, method: Method, uri: &str, body: &'static str) -> TestResponse {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap();

    dispatch(router, request).await
}

async fn dispatch(router: &Router, request: Request<Body>) -> TestResponse {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    TestResponse {
        status,
        body: body.to_vec(),
    }
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        send(&self.router, method, uri, body).await
    }

    #[allow(dead_code)]
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }
}

/// Config for an in-memory server on an ephemeral port, resolving sets at `assessment_url`.
#[allow(dead_code)]
pub fn test_config(assessment_url: String) -> SurveyConfig {
    SurveyConfig {
        common: Config { port: 0 },
        service_name: "survey-service".to_string(),
        service_version: "test".to_string(),
        log_level: "info".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
            min_connections: 1,
        },
        assessment_service: AssessmentServiceConfig {
            url: assessment_url,
            timeout_ms: 1000,
            max_retries: 0,
        },
    }
}

/// Start a real listener in the background and return its base URL.
#[allow(dead_code)]
pub async fn spawn_server(assessment_url: String) -> String {
    init_tracing();

    let app = Application::build_without_migrations(test_config(assessment_url))
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    address
}

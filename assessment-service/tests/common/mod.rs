//! Common test utilities for assessment-service router tests.

use assessment_service::config::AssessmentConfig;
use assessment_service::services::InMemoryStore;
use assessment_service::{build_router, AppState, Application};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use service_core::config::{Config, DatabaseConfig};
use std::sync::{Arc, Once};
use tower::ServiceExt;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,assessment_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Router over a fresh in-memory store.
#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

pub fn spawn_app() -> TestApp {
    init_tracing();

    let store = Arc::new(InMemoryStore::new());
    let router = build_router(AppState::in_memory(store.clone()));
    TestApp { router, store }
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

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        self.dispatch(request).await
    }

    /// Send a body verbatim, labelled as JSON whether or not it parses.
    #[allow(dead_code)]
    pub async fn request_raw(&self, method: Method, uri: &str, body: &'static str) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();

        TestResponse {
            status,
            body: body.to_vec(),
        }
    }

    #[allow(dead_code)]
    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None).await
    }
}

/// Config for an in-memory server on an ephemeral port.
#[allow(dead_code)]
pub fn test_config() -> AssessmentConfig {
    AssessmentConfig {
        common: Config { port: 0 },
        service_name: "assessment-service".to_string(),
        service_version: "test".to_string(),
        log_level: "info".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: None,
            max_connections: 1,
            min_connections: 1,
        },
    }
}

/// Start a real listener in the background and return its base URL.
#[allow(dead_code)]
pub async fn spawn_server() -> String {
    init_tracing();

    let app = Application::build_without_migrations(test_config())
        .await
        .expect("Failed to build application");
    let address = format!("http://127.0.0.1:{}", app.port());

    tokio::spawn(async move {
        app.run_until_stopped().await.ok();
    });

    address
}

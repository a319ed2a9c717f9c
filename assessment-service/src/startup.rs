//! Application startup and lifecycle management.

use crate::config::AssessmentConfig;
use crate::handlers::{assessments, health, questions};
use crate::services::{init_metrics, AssessmentService, InMemoryStore, PgStore};
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use service_core::observability::REQUEST_ID_HEADER;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub service: AssessmentService,
    /// Present when backed by PostgreSQL; used by the health probes.
    pub db: Option<Arc<PgStore>>,
}

impl AppState {
    pub fn postgres(db: Arc<PgStore>) -> Self {
        Self {
            service: AssessmentService::new(db.clone(), db.clone()),
            db: Some(db),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            service: AssessmentService::new(store.clone(), store),
            db: None,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_handler))
        .route(
            "/assessments",
            post(assessments::create_assessment).get(assessments::list_assessments),
        )
        .route(
            "/assessments/name/:set_name/questions",
            get(assessments::get_questions_by_set_name),
        )
        .route(
            "/assessments/:set_id/questions",
            get(assessments::get_questions_by_set_id).post(assessments::add_question),
        )
        .route(
            "/assessments/:set_id/questions/:question_id",
            put(questions::update_question).delete(questions::delete_question),
        )
        .route("/questions/:question_id", get(questions::fetch_question))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get(REQUEST_ID_HEADER)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: AssessmentConfig) -> Result<Self, AppError> {
        Self::build_internal(config, true).await
    }

    /// Build the application without running migrations.
    pub async fn build_without_migrations(config: AssessmentConfig) -> Result<Self, AppError> {
        Self::build_internal(config, false).await
    }

    async fn build_internal(
        config: AssessmentConfig,
        run_migrations: bool,
    ) -> Result<Self, AppError> {
        init_metrics();

        let state = match config.database.url.as_deref() {
            Some(url) => {
                let db = PgStore::new(
                    url,
                    config.database.max_connections,
                    config.database.min_connections,
                )
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to connect to PostgreSQL");
                    e
                })?;

                if run_migrations {
                    db.run_migrations().await.map_err(|e| {
                        tracing::error!(error = %e, "Failed to run migrations");
                        e
                    })?;
                }

                AppState::postgres(Arc::new(db))
            }
            None => {
                tracing::warn!("DATABASE_URL not set - using in-memory store, data will not persist");
                AppState::in_memory(Arc::new(InMemoryStore::new()))
            }
        };

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port = port, "Assessment service listener bound");

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        tracing::info!(
            service = "assessment-service",
            version = env!("CARGO_PKG_VERSION"),
            port = self.port,
            "Service ready to accept connections"
        );

        axum::serve(self.listener, self.router).await
    }
}

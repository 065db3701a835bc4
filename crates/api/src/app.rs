use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use domain::services::{LogNotifier, Notifier, RecordClient};
use persistence::repositories::{
    AiLogRepository, AppRepository, SalesCommentRepository, UserDetailsRepository,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, security_headers_middleware, trace_id};
use crate::routes::{ai_logs, apps, dashboard, health, users};

#[derive(Clone)]
pub struct AppState {
    pub records: Arc<dyn RecordClient>,
    pub notifier: Arc<dyn Notifier>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, records: Arc<dyn RecordClient>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            records,
            notifier,
            config: Arc::new(config),
        }
    }

    pub fn users(&self) -> UserDetailsRepository {
        UserDetailsRepository::new(self.records.clone(), self.notifier.clone())
    }

    pub fn apps(&self) -> AppRepository {
        AppRepository::new(self.records.clone(), self.notifier.clone())
    }

    pub fn ai_logs(&self) -> AiLogRepository {
        AiLogRepository::new(self.records.clone(), self.notifier.clone())
    }

    pub fn sales_comments(&self) -> SalesCommentRepository {
        SalesCommentRepository::new(self.records.clone(), self.notifier.clone())
    }
}

/// Builds the router with notices going to the log.
pub fn create_app(config: Config, records: Arc<dyn RecordClient>) -> Router {
    create_router(AppState::new(config, records, Arc::new(LogNotifier)))
}

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    let cors = if config.security.cors_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let api_routes = Router::new()
        .route("/api/v1/users", get(users::list_users))
        .route(
            "/api/v1/users/:id",
            get(users::get_user).put(users::update_user),
        )
        .route("/api/v1/apps", get(apps::list_apps))
        .route("/api/v1/apps/:id", get(apps::get_app))
        .route(
            "/api/v1/apps/:id/sales-status",
            patch(apps::update_sales_status),
        )
        .route(
            "/api/v1/apps/:id/sales-comments",
            get(apps::list_sales_comments).post(apps::create_sales_comment),
        )
        .route("/api/v1/ai-logs", get(ai_logs::list_ai_logs))
        .route("/api/v1/ai-logs/:id", get(ai_logs::get_ai_log))
        .route("/api/v1/dashboard", get(dashboard::get_dashboard));

    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Bottom layers run first.
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}

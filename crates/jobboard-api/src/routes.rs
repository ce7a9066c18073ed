//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, patch, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tower_http::LatencyUnit;
use tracing::Level;

use crate::auth::{require_admin, require_auth};
use crate::handlers::account::{login, me, signup};
use crate::handlers::admin;
use crate::handlers::applications::{apply, list_my_applications, update_application_status};
use crate::handlers::health;
use crate::handlers::jobs::{create_job, delete_job, get_job, list_job_applications, list_jobs};
use crate::handlers::resume::{get_resume, put_resume};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    api_security_headers, cors_layer, hide_internal_errors, http_span, throttle_logins,
    LoginThrottle,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    // Credential endpoints are rate limited per client IP
    let login_throttle = Arc::new(LoginThrottle::new(
        state.config.login_rate_limit_rps,
        state.config.trusted_proxies.clone(),
    ));

    let account_routes = Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route_layer(middleware::from_fn_with_state(
            login_throttle,
            throttle_logins,
        ))
        .route("/auth/me", get(me));

    // Role checks happen inline in each handler
    let job_routes = Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/:job_id", get(get_job).delete(delete_job))
        .route("/jobs/:job_id/applications", get(list_job_applications))
        .route("/jobs/:job_id/apply", post(apply))
        .route("/applications", get(list_my_applications))
        .route(
            "/applications/:application_id/status",
            patch(update_application_status),
        )
        .route("/resume", get(get_resume).put(put_resume));

    // Admin routes: authenticated by middleware, then gated on role
    let admin_routes = Router::new()
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/:user_id", delete(admin::delete_user))
        .route("/admin/jobs/:job_id", delete(admin::delete_job))
        .route("/admin/stats", get(admin::get_stats))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api_routes = Router::new()
        .merge(account_routes)
        .merge(job_routes)
        .merge(admin_routes);

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(TimeoutLayer::new(state.config.request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn_with_state(
            state.config.is_production(),
            hide_internal_errors,
        ))
        .layer(middleware::from_fn(api_security_headers))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(http_span)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

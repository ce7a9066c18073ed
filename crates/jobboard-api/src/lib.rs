//! Axum HTTP API server for the job board.
//!
//! This crate provides:
//! - Signup/login with bearer token issuance
//! - Job postings, applications and resumes with per-route role checks
//! - Admin user and content management
//! - Rate limiting, security headers and Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod store;

pub use auth::{AuthUser, MaybeAuthUser};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
pub use store::{InMemoryStore, Store, StoreError};

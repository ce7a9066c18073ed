//! Application state.

use std::sync::Arc;

use tracing::{info, warn};

use jobboard_auth::{hash_password, TokenCodec};
use jobboard_models::{normalize_email, NewUser, Role};

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::store::{InMemoryStore, Store};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub codec: Arc<TokenCodec>,
    pub store: Arc<dyn Store>,
}

impl AppState {
    /// Create application state backed by the in-memory store.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_store(config, Arc::new(InMemoryStore::new()))
    }

    pub fn with_store(config: ApiConfig, store: Arc<dyn Store>) -> Self {
        if config.jwt_secret.is_none() {
            warn!("JWT_SECRET is not set; token issuance and verification will fail");
        }

        let codec = TokenCodec::new(config.jwt_secret.clone()).with_ttl(config.token_ttl);

        Self {
            config,
            codec: Arc::new(codec),
            store,
        }
    }

    /// Create the configured admin account if it does not exist yet.
    pub async fn seed_admin(&self) -> ApiResult<()> {
        let Some(admin) = self.config.bootstrap_admin.as_ref() else {
            return Ok(());
        };

        let email = normalize_email(&admin.email);
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Ok(());
        }

        let password_hash = hash_password(&admin.password)?;
        let user = self
            .store
            .create_user(NewUser {
                name: "Administrator".to_string(),
                email,
                role: Role::Admin,
                password_hash,
            })
            .await?;

        info!(user_id = user.id, "Seeded admin account");
        Ok(())
    }
}

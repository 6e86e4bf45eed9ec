//! Client construction.

use std::sync::Arc;

use oa_auth_sdk::{OaAuthClient, OaAuthError};
use tracing::info;

use crate::config::OaAuthConfig;
use crate::domain::{CacheStore, KeyScheme, OaAuthLocalClient, Service};
use crate::infra::{RedisCacheStore, RemoteAuthorization};

/// Connect to the cache store and build the shared client.
///
/// Call once at startup and share the returned handle.
///
/// # Errors
///
/// - `InvalidArgument` if the Redis address or the HTTP client cannot be built
/// - `CacheStore` if the first Redis connection fails
#[tracing::instrument(skip_all, fields(app_key = %cfg.app_key))]
pub async fn build_client(cfg: &OaAuthConfig) -> Result<Arc<dyn OaAuthClient>, OaAuthError> {
    info!(
        redis_host = %cfg.redis.host,
        redis_database = cfg.redis.database,
        backend_url = %cfg.backend_url,
        "Initializing oa-auth client"
    );

    let store = RedisCacheStore::connect(&cfg.redis).await?;
    let client = build_client_with_store(cfg, Arc::new(store))?;

    info!("oa-auth client initialized successfully");
    Ok(client)
}

/// Build the shared client over an already constructed cache store.
///
/// # Errors
///
/// - `InvalidArgument` if the HTTP client cannot be built
pub fn build_client_with_store(
    cfg: &OaAuthConfig,
    store: Arc<dyn CacheStore>,
) -> Result<Arc<dyn OaAuthClient>, OaAuthError> {
    let svc = Arc::new(Service::new(store, KeyScheme::from_config(cfg)));
    let remote = Arc::new(RemoteAuthorization::new(cfg)?);
    Ok(Arc::new(OaAuthLocalClient::new(cfg.app_key.clone(), svc, remote)))
}

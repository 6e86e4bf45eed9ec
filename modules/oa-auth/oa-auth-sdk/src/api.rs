//! Public API trait for the OA auth client.

use async_trait::async_trait;

use crate::error::OaAuthError;
use crate::models::{CheckOutcome, LoginRequest};

/// Public API trait for the OA auth client.
///
/// Built once per process and shared as `Arc<dyn OaAuthClient>`:
///
/// ```ignore
/// let client = oa_auth::build_client(&config).await?;
///
/// // Cache-only check, no remote call
/// let outcome = client.check_session_live(token).await?;
///
/// // Forwarded to the remote OA service
/// let user = client.get_user(token).await?;
/// ```
///
/// The `check_*` / `get_cached_user` operations read only the shared cache and
/// always render a [`CheckOutcome`]. The remaining operations forward to the
/// remote OA service and return its JSON body untouched.
#[async_trait]
pub trait OaAuthClient: Send + Sync {
    /// Application key assigned to this client by the OA system.
    fn app_key(&self) -> &str;

    /// Check whether the external user may access `uri` in application `app_key`
    /// using the cached permission snapshot.
    ///
    /// # Errors
    ///
    /// - `CacheStore` if the cache cannot be queried
    async fn check_access(
        &self,
        open_id: &str,
        app_key: &str,
        uri: &str,
    ) -> Result<CheckOutcome, OaAuthError>;

    /// Check whether the login session behind `token` is still alive.
    ///
    /// # Errors
    ///
    /// - `CacheStore` if the cache cannot be queried
    async fn check_session_live(&self, token: &str) -> Result<CheckOutcome, OaAuthError>;

    /// Fetch the lightweight user record cached for the login session behind `token`.
    ///
    /// # Errors
    ///
    /// - `CacheStore` if the cache cannot be queried or the cached value is not JSON
    async fn get_cached_user(&self, token: &str) -> Result<CheckOutcome, OaAuthError>;

    /// Log in against the remote OA service.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Http` on transport failure, non-success status, or a non-JSON body
    async fn login(&self, request: LoginRequest) -> Result<serde_json::Value, OaAuthError>;

    /// Log the session behind `token` out of the remote OA service.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Http` on transport failure, non-success status, or a non-JSON body
    async fn logout(&self, token: &str) -> Result<serde_json::Value, OaAuthError>;

    /// Fetch the full user record from the remote OA service.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Http` on transport failure, non-success status, or a non-JSON body
    async fn get_user(&self, token: &str) -> Result<serde_json::Value, OaAuthError>;

    /// Ask the remote OA service whether the session may access `uri`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Http` on transport failure, non-success status, or a non-JSON body
    async fn can_visit(&self, token: &str, uri: &str) -> Result<serde_json::Value, OaAuthError>;

    /// Exchange the application credentials for a client code.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Http` on transport failure, non-success status, or a non-JSON body
    async fn get_code(&self) -> Result<serde_json::Value, OaAuthError>;

    /// Frontend address to redirect to after a client code was obtained.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no frontend URL is configured
    fn frontend_url_for_code(&self, code: &str) -> Result<String, OaAuthError>;
}

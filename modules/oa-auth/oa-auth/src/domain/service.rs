//! Cache-only authorization gateway.

use std::sync::Arc;

use oa_auth_sdk::{CheckOutcome, PermissionSnapshot};
use tracing::{debug, warn};

use super::error::DomainError;
use super::keys::KeyScheme;
use super::store::CacheStore;

mod messages {
    pub const ACCESS_ALLOWED: &str = "access allowed";
    pub const ONLINE: &str = "online";
    pub const USER_FETCHED: &str = "user fetched";
}

/// Cache gateway service.
///
/// Renders every check as a [`CheckOutcome`] from cached state alone. The only
/// error it returns is a cache store failure; unusable cache content is
/// business data and denies access.
pub struct Service {
    store: Arc<dyn CacheStore>,
    keys: KeyScheme,
}

impl Service {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, keys: KeyScheme) -> Self {
        Self { store, keys }
    }

    /// Check whether `open_id` may access `uri` in application `app_key`.
    ///
    /// Existence and value are read in one `GET`; a missing value is a missing key.
    ///
    /// # Errors
    ///
    /// - `CacheStore` if the store cannot be queried
    #[tracing::instrument(skip_all, fields(app_key = %app_key, uri = %uri, state))]
    pub async fn check_access(
        &self,
        open_id: &str,
        app_key: &str,
        uri: &str,
    ) -> Result<CheckOutcome, DomainError> {
        let key = self.keys.permission_key(open_id, app_key);
        let outcome = match self.store.get(&key).await? {
            Some(raw) => decide(&raw, uri),
            None => {
                debug!("No permission snapshot cached");
                CheckOutcome::unauthenticated()
            }
        };

        tracing::Span::current().record("state", outcome.state());
        Ok(outcome)
    }

    /// Check whether the login session behind `token` is alive.
    ///
    /// # Errors
    ///
    /// - `CacheStore` if the store cannot be queried
    #[tracing::instrument(skip_all, fields(state))]
    pub async fn check_session_live(&self, token: &str) -> Result<CheckOutcome, DomainError> {
        let key = self.keys.session_key(token);
        let outcome = if self.store.exists(&key).await? {
            CheckOutcome::allowed(messages::ONLINE)
        } else {
            CheckOutcome::unauthenticated()
        };

        tracing::Span::current().record("state", outcome.state());
        Ok(outcome)
    }

    /// Fetch the user record cached for the login session behind `token`.
    ///
    /// # Errors
    ///
    /// - `CacheStore` if the store cannot be queried
    /// - `CacheValueDecode` if the cached record is not UTF-8 JSON
    #[tracing::instrument(skip_all, fields(state))]
    pub async fn get_cached_user(&self, token: &str) -> Result<CheckOutcome, DomainError> {
        let key = self.keys.session_key(token);
        let outcome = match self.store.get(&key).await? {
            Some(raw) => {
                let user: serde_json::Value =
                    serde_json::from_slice(&raw).map_err(|e| DomainError::CacheValueDecode {
                        entry: "session user",
                        reason: e.to_string(),
                    })?;
                CheckOutcome::allowed(messages::USER_FETCHED).with_data(user)
            }
            None => CheckOutcome::unauthenticated(),
        };

        tracing::Span::current().record("state", outcome.state());
        Ok(outcome)
    }
}

/// Decide access from a cached snapshot that exists under its key.
///
/// An empty or undecodable snapshot denies, even if it would have named a super admin.
fn decide(raw: &[u8], uri: &str) -> CheckOutcome {
    match PermissionSnapshot::parse(raw) {
        Ok(snapshot) if snapshot.permits(uri) => CheckOutcome::allowed(messages::ACCESS_ALLOWED),
        Ok(_) => CheckOutcome::forbidden(),
        Err(e) => {
            warn!(error = %e, "Unusable permission snapshot, denying access");
            CheckOutcome::forbidden()
        }
    }
}

//! Cache key derivation.
//!
//! Keys must match the ones the OA system writes byte for byte.

use crate::config::OaAuthConfig;

/// Prefix the OA system uses for permission snapshot keys.
pub const DEFAULT_PERMISSION_KEY_PREFIX: &str = "zlj_oa_database_";

/// Derives the two cache key schemes.
#[derive(Debug, Clone)]
pub struct KeyScheme {
    permission_prefix: String,
    session_prefix: String,
}

impl KeyScheme {
    #[must_use]
    pub fn new(permission_prefix: impl Into<String>, session_prefix: impl Into<String>) -> Self {
        Self {
            permission_prefix: permission_prefix.into(),
            session_prefix: session_prefix.into(),
        }
    }

    #[must_use]
    pub fn from_config(cfg: &OaAuthConfig) -> Self {
        Self::new(cfg.permission_key_prefix.clone(), cfg.redis.prefix.clone())
    }

    /// Key of the permission snapshot of `open_id` in application `app_key`.
    #[must_use]
    pub fn permission_key(&self, open_id: &str, app_key: &str) -> String {
        format!("{}{open_id}-{app_key}", self.permission_prefix)
    }

    /// Key of the login session behind `token`.
    #[must_use]
    pub fn session_key(&self, token: &str) -> String {
        format!("{}{token}", self.session_prefix)
    }
}

impl Default for KeyScheme {
    fn default() -> Self {
        Self::new(DEFAULT_PERMISSION_KEY_PREFIX, "")
    }
}

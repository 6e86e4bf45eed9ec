//! Domain errors for the OA auth client.

use oa_auth_sdk::OaAuthError;

/// Internal domain errors.
#[derive(thiserror::Error, Debug)]
pub enum DomainError {
    #[error("cache store unavailable: {0}")]
    CacheStore(String),

    #[error("cached {entry} is not valid JSON: {reason}")]
    CacheValueDecode { entry: &'static str, reason: String },

    #[error("request to '{endpoint}' failed: {reason}")]
    Remote {
        endpoint: &'static str,
        reason: String,
    },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl DomainError {
    pub fn remote(endpoint: &'static str, reason: impl Into<String>) -> Self {
        Self::Remote {
            endpoint,
            reason: reason.into(),
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }
}

impl From<redis::RedisError> for DomainError {
    fn from(e: redis::RedisError) -> Self {
        Self::CacheStore(e.to_string())
    }
}

impl From<DomainError> for OaAuthError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::CacheStore(reason) => Self::CacheStore(reason),
            e @ DomainError::CacheValueDecode { .. } => Self::CacheStore(e.to_string()),
            e @ DomainError::Remote { .. } => Self::Http(e.to_string()),
            DomainError::InvalidArgument(reason) => Self::InvalidArgument(reason),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn decode_failures_surface_as_cache_store_errors() {
        let err: OaAuthError = DomainError::CacheValueDecode {
            entry: "session user",
            reason: "expected value".to_owned(),
        }
        .into();
        assert!(err.is_cache_store());
        assert!(err.to_string().contains("session user"));
    }

    #[test]
    fn remote_failures_surface_as_http_errors() {
        let err: OaAuthError = DomainError::remote("/api/authorization/user", "503").into();
        match err {
            OaAuthError::Http(msg) => assert!(msg.contains("/api/authorization/user")),
            other => panic!("Expected Http, got: {other:?}"),
        }
    }
}

//! Local (in-process) client for the OA auth client API.

use std::sync::Arc;

use async_trait::async_trait;
use oa_auth_sdk::{CheckOutcome, LoginRequest, OaAuthClient, OaAuthError};
use serde_json::Value;

use super::{DomainError, Service};
use crate::infra::RemoteAuthorization;

/// Local client wrapping the cache gateway and the remote OA service.
pub struct OaAuthLocalClient {
    app_key: String,
    svc: Arc<Service>,
    remote: Arc<RemoteAuthorization>,
}

impl OaAuthLocalClient {
    #[must_use]
    pub fn new(
        app_key: impl Into<String>,
        svc: Arc<Service>,
        remote: Arc<RemoteAuthorization>,
    ) -> Self {
        Self {
            app_key: app_key.into(),
            svc,
            remote,
        }
    }
}

fn log_and_convert(op: &str, e: DomainError) -> OaAuthError {
    tracing::error!(operation = op, error = ?e, "oa_auth call failed");
    e.into()
}

#[async_trait]
impl OaAuthClient for OaAuthLocalClient {
    fn app_key(&self) -> &str {
        &self.app_key
    }

    async fn check_access(
        &self,
        open_id: &str,
        app_key: &str,
        uri: &str,
    ) -> Result<CheckOutcome, OaAuthError> {
        self.svc
            .check_access(open_id, app_key, uri)
            .await
            .map_err(|e| log_and_convert("check_access", e))
    }

    async fn check_session_live(&self, token: &str) -> Result<CheckOutcome, OaAuthError> {
        self.svc
            .check_session_live(token)
            .await
            .map_err(|e| log_and_convert("check_session_live", e))
    }

    async fn get_cached_user(&self, token: &str) -> Result<CheckOutcome, OaAuthError> {
        self.svc
            .get_cached_user(token)
            .await
            .map_err(|e| log_and_convert("get_cached_user", e))
    }

    async fn login(&self, request: LoginRequest) -> Result<Value, OaAuthError> {
        self.remote
            .login(&request)
            .await
            .map_err(|e| log_and_convert("login", e))
    }

    async fn logout(&self, token: &str) -> Result<Value, OaAuthError> {
        self.remote
            .logout(token)
            .await
            .map_err(|e| log_and_convert("logout", e))
    }

    async fn get_user(&self, token: &str) -> Result<Value, OaAuthError> {
        self.remote
            .user(token)
            .await
            .map_err(|e| log_and_convert("get_user", e))
    }

    async fn can_visit(&self, token: &str, uri: &str) -> Result<Value, OaAuthError> {
        self.remote
            .can_visit(token, uri)
            .await
            .map_err(|e| log_and_convert("can_visit", e))
    }

    async fn get_code(&self) -> Result<Value, OaAuthError> {
        self.remote
            .client_code()
            .await
            .map_err(|e| log_and_convert("get_code", e))
    }

    fn frontend_url_for_code(&self, code: &str) -> Result<String, OaAuthError> {
        self.remote
            .frontend_url_for_code(code)
            .map_err(|e| log_and_convert("frontend_url_for_code", e))
    }
}

//! Client of the remote OA authorization endpoints.

use reqwest::RequestBuilder;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::debug;

use oa_auth_sdk::LoginRequest;

use crate::config::OaAuthConfig;
use crate::domain::error::DomainError;

const LOGIN: &str = "/api/authorization/login";
const LOGOUT: &str = "/api/authorization/logout";
const USER: &str = "/api/authorization/user";
const CAN_VISIT: &str = "/api/authorization/can_visit";
const CLIENT_CODE: &str = "/api/authorization/client_code";

/// Forwards requests to the OA service and hands back its JSON body untouched.
pub struct RemoteAuthorization {
    http: reqwest::Client,
    backend_url: String,
    frontend_url: String,
    app_key: String,
    app_secret: SecretString,
}

impl RemoteAuthorization {
    /// Build the client. URLs are validated per call, so an instance used only
    /// for cache checks needs none.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if the HTTP client cannot be built
    pub fn new(cfg: &OaAuthConfig) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(cfg.http_timeout)
            .build()
            .map_err(|e| DomainError::invalid_argument(format!("http client: {e}")))?;

        Ok(Self {
            http,
            backend_url: cfg.backend_url.trim_end_matches('/').to_owned(),
            frontend_url: cfg.frontend_url.clone(),
            app_key: cfg.app_key.clone(),
            app_secret: cfg.app_secret.clone(),
        })
    }

    /// `POST login` with the credentials, as bearer the token of an existing session if any.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Remote` on transport failure, an error status or a non-JSON body
    pub async fn login(&self, request: &LoginRequest) -> Result<Value, DomainError> {
        let reserved_terminal = request.reserved_terminal.to_string();
        let form = [
            ("username", request.username.as_str()),
            ("password", request.password.expose_secret()),
            ("reserved_terminal", reserved_terminal.as_str()),
        ];
        let mut builder = self.http.post(self.endpoint(LOGIN)?).form(&form);
        if let Some(token) = &request.bearer_token {
            builder = builder.bearer_auth(token.expose_secret());
        }
        send(LOGIN, builder).await
    }

    /// `GET logout` for the session behind `token`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Remote` on transport failure, an error status or a non-JSON body
    pub async fn logout(&self, token: &str) -> Result<Value, DomainError> {
        let builder = self.http.get(self.endpoint(LOGOUT)?).bearer_auth(token);
        send(LOGOUT, builder).await
    }

    /// `POST user`: full user record of the session behind `token`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Remote` on transport failure, an error status or a non-JSON body
    pub async fn user(&self, token: &str) -> Result<Value, DomainError> {
        let form = non_empty(&[("app_key", self.app_key.as_str())]);
        let builder = self
            .http
            .post(self.endpoint(USER)?)
            .form(&form)
            .bearer_auth(token);
        send(USER, builder).await
    }

    /// `POST can_visit`: remote access decision for `uri`.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Remote` on transport failure, an error status or a non-JSON body
    pub async fn can_visit(&self, token: &str, uri: &str) -> Result<Value, DomainError> {
        let form = non_empty(&[("app_key", self.app_key.as_str()), ("uri", uri)]);
        let builder = self
            .http
            .post(self.endpoint(CAN_VISIT)?)
            .form(&form)
            .bearer_auth(token);
        send(CAN_VISIT, builder).await
    }

    /// `POST client_code` with the application credentials, no bearer.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no backend URL is configured
    /// - `Remote` on transport failure, an error status or a non-JSON body
    pub async fn client_code(&self) -> Result<Value, DomainError> {
        let form = non_empty(&[
            ("app_key", self.app_key.as_str()),
            ("app_secret", self.app_secret.expose_secret()),
        ]);
        let builder = self.http.post(self.endpoint(CLIENT_CODE)?).form(&form);
        send(CLIENT_CODE, builder).await
    }

    /// `frontend_url?code=<code>`, with the code form-encoded.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if no frontend URL is configured
    pub fn frontend_url_for_code(&self, code: &str) -> Result<String, DomainError> {
        if self.frontend_url.is_empty() {
            return Err(DomainError::invalid_argument("frontend_url is not configured"));
        }
        let query = serde_urlencoded::to_string([("code", code)])
            .map_err(|e| DomainError::invalid_argument(format!("code: {e}")))?;
        Ok(format!("{}?{query}", self.frontend_url))
    }

    fn endpoint(&self, path: &str) -> Result<String, DomainError> {
        if self.backend_url.is_empty() {
            return Err(DomainError::invalid_argument("backend_url is not configured"));
        }
        Ok(format!("{}{path}", self.backend_url))
    }
}

async fn send(endpoint: &'static str, builder: RequestBuilder) -> Result<Value, DomainError> {
    let response = builder
        .send()
        .await
        .map_err(|e| DomainError::remote(endpoint, e.to_string()))?;

    let status = response.status();
    debug!(endpoint, status = status.as_u16(), "OA service responded");

    let response = response
        .error_for_status()
        .map_err(|e| DomainError::remote(endpoint, e.to_string()))?;
    response
        .json::<Value>()
        .await
        .map_err(|e| DomainError::remote(endpoint, format!("response is not JSON: {e}")))
}

// Empty fields are left out of the body.
fn non_empty<'a>(fields: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    fields
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .copied()
        .collect()
}

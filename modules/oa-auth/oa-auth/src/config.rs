//! Configuration for the OA auth client.
//!
//! Sources, lowest to highest precedence: built-in defaults, an optional YAML
//! file, then `ZLJOA_*` environment variables.
//!
//! ```yaml
//! app_key: "my-app"
//! app_secret: "..."
//! backend_url: "https://oa.example.com"
//! frontend_url: "https://oa.example.com/login"
//! redis:
//!   host: 127.0.0.1
//!   port: 6379
//!   database: 0
//!   prefix: "oa_session_"
//! ```

use std::path::Path;
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use oa_auth_sdk::OaAuthError;
use secrecy::{ExposeSecret, SecretString};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::domain::keys::DEFAULT_PERMISSION_KEY_PREFIX;

/// Prefix of the environment variables read by [`OaAuthConfig::load`].
///
/// `ZLJOA_REDIS_*` variables land in the `redis` section, e.g.
/// `ZLJOA_REDIS_HOST` sets `redis.host`.
pub const ENV_PREFIX: &str = "ZLJOA_";

/// Client configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OaAuthConfig {
    /// Application key assigned by the OA system.
    #[serde(deserialize_with = "de_string")]
    pub app_key: String,

    /// Application secret assigned by the OA system.
    #[serde(deserialize_with = "de_secret")]
    pub app_secret: SecretString,

    /// Frontend address users are sent to with a client code.
    #[serde(deserialize_with = "de_string")]
    pub frontend_url: String,

    /// Base address of the remote OA service.
    #[serde(deserialize_with = "de_string")]
    pub backend_url: String,

    /// Timeout applied to every remote request.
    #[serde(deserialize_with = "de_duration")]
    pub http_timeout: Duration,

    /// Prefix of the permission snapshot keys written by the OA system.
    #[serde(deserialize_with = "de_string")]
    pub permission_key_prefix: String,

    /// Cache store holding permission snapshots and login sessions.
    pub redis: RedisConfig,
}

impl Default for OaAuthConfig {
    fn default() -> Self {
        Self {
            app_key: String::new(),
            app_secret: SecretString::from(String::new()),
            frontend_url: String::new(),
            backend_url: String::new(),
            http_timeout: Duration::from_secs(10),
            permission_key_prefix: DEFAULT_PERMISSION_KEY_PREFIX.to_owned(),
            redis: RedisConfig::default(),
        }
    }
}

/// Cache store connection.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RedisConfig {
    pub host: String,

    pub port: u16,

    /// Empty means no `AUTH`.
    #[serde(deserialize_with = "de_secret")]
    pub password: SecretString,

    /// Logical database index.
    pub database: u32,

    /// Prefix of the login-session keys.
    #[serde(deserialize_with = "de_string")]
    pub prefix: String,

    #[serde(deserialize_with = "de_duration")]
    pub connection_timeout: Duration,

    #[serde(deserialize_with = "de_duration")]
    pub response_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 6379,
            password: SecretString::from(String::new()),
            database: 0,
            prefix: String::new(),
            connection_timeout: Duration::from_secs(5),
            response_timeout: Duration::from_secs(3),
        }
    }
}

impl RedisConfig {
    /// Connection URL including the password. Never log it.
    pub(crate) fn connection_url(&self) -> String {
        let password = self.password.expose_secret();
        let auth = if password.is_empty() {
            String::new()
        } else {
            format!(":{}@", urlencoding::encode(password))
        };
        format!("redis://{auth}{}:{}/{}", self.host, self.port, self.database)
    }
}

impl OaAuthConfig {
    /// Load configuration from defaults, the optional YAML file at `path`, and
    /// `ZLJOA_*` environment variables.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `path` is not a file, or a source holds an unknown
    ///   key or a value of the wrong type
    pub fn load(path: Option<&Path>) -> Result<Self, OaAuthError> {
        let mut figment = Figment::new();
        if let Some(path) = path {
            if !path.is_file() {
                return Err(OaAuthError::InvalidArgument(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(env_provider())
            .extract()
            .map_err(|e| OaAuthError::InvalidArgument(e.to_string()))
    }

    /// Load configuration from `ZLJOA_*` environment variables only.
    ///
    /// # Errors
    ///
    /// See [`OaAuthConfig::load`].
    pub fn from_env() -> Result<Self, OaAuthError> {
        Self::load(None)
    }
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        let mapped = key
            .strip_prefix("redis_")
            .map_or_else(|| key.clone(), |field| format!("redis.{field}"));
        mapped.into()
    })
}

// Environment values that look like numbers arrive as numbers.
fn de_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(String::new()),
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a string, found {other}"))),
    }
}

fn de_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: Deserializer<'de>,
{
    de_string(deserializer).map(SecretString::from)
}

// Humantime text ("250ms", "5s") or whole seconds.
fn de_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => humantime::parse_duration(&s).map_err(D::Error::custom),
        Value::Number(n) => n
            .as_u64()
            .map(Duration::from_secs)
            .ok_or_else(|| D::Error::custom(format!("expected whole seconds, found {n}"))),
        other => Err(D::Error::custom(format!(
            "expected a duration, found {other}"
        ))),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_oa_conventions() {
        let cfg = OaAuthConfig::default();
        assert_eq!(cfg.permission_key_prefix, "zlj_oa_database_");
        assert_eq!(cfg.redis.host, "127.0.0.1");
        assert_eq!(cfg.redis.port, 6379);
        assert_eq!(cfg.redis.database, 0);
        assert!(cfg.redis.prefix.is_empty());
        assert_eq!(cfg.redis.connection_url(), "redis://127.0.0.1:6379/0");
    }

    #[test]
    fn connection_url_encodes_password() {
        let cfg = RedisConfig {
            password: SecretString::from("p@ss word".to_owned()),
            database: 2,
            ..RedisConfig::default()
        };
        assert_eq!(
            cfg.connection_url(),
            "redis://:p%40ss%20word@127.0.0.1:6379/2"
        );
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let cfg = OaAuthConfig {
            app_secret: SecretString::from("app-secret-value".to_owned()),
            redis: RedisConfig {
                password: SecretString::from("redis-password-value".to_owned()),
                ..RedisConfig::default()
            },
            ..OaAuthConfig::default()
        };
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("app-secret-value"));
        assert!(!rendered.contains("redis-password-value"));
    }

    #[test]
    fn loads_from_environment() {
        temp_env::with_vars(
            [
                ("ZLJOA_APP_KEY", Some("10086")),
                ("ZLJOA_APP_SECRET", Some("s3cret")),
                ("ZLJOA_BACKEND_URL", Some("https://oa.example.com")),
                ("ZLJOA_HTTP_TIMEOUT", Some("250ms")),
                ("ZLJOA_REDIS_HOST", Some("cache.internal")),
                ("ZLJOA_REDIS_PORT", Some("6380")),
                ("ZLJOA_REDIS_PASSWORD", Some("123456")),
                ("ZLJOA_REDIS_DATABASE", Some("3")),
                ("ZLJOA_REDIS_PREFIX", Some("oa_session_")),
            ],
            || {
                let cfg = OaAuthConfig::from_env().unwrap();
                assert_eq!(cfg.app_key, "10086");
                assert_eq!(cfg.app_secret.expose_secret(), "s3cret");
                assert_eq!(cfg.backend_url, "https://oa.example.com");
                assert_eq!(cfg.http_timeout, Duration::from_millis(250));
                assert_eq!(cfg.redis.host, "cache.internal");
                assert_eq!(cfg.redis.port, 6380);
                assert_eq!(cfg.redis.password.expose_secret(), "123456");
                assert_eq!(cfg.redis.database, 3);
                assert_eq!(cfg.redis.prefix, "oa_session_");
                assert_eq!(cfg.redis.response_timeout, Duration::from_secs(3));
            },
        );
    }

    #[test]
    fn numeric_addresses_load_as_strings() {
        temp_env::with_vars(
            [
                ("ZLJOA_BACKEND_URL", Some("8080")),
                ("ZLJOA_FRONTEND_URL", Some("9090")),
            ],
            || {
                let cfg = OaAuthConfig::from_env().unwrap();
                assert_eq!(cfg.backend_url, "8080");
                assert_eq!(cfg.frontend_url, "9090");
            },
        );
    }

    #[test]
    fn environment_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            "app_key: from-file\nbackend_url: http://file.example\nredis:\n  host: file-host\n  response_timeout: 7s"
        )
        .unwrap();

        temp_env::with_vars([("ZLJOA_REDIS_HOST", Some("env-host"))], || {
            let cfg = OaAuthConfig::load(Some(file.path())).unwrap();
            assert_eq!(cfg.app_key, "from-file");
            assert_eq!(cfg.backend_url, "http://file.example");
            assert_eq!(cfg.redis.host, "env-host");
            assert_eq!(cfg.redis.response_timeout, Duration::from_secs(7));
            assert_eq!(cfg.redis.port, 6379);
        });
    }

    #[test]
    fn missing_file_is_invalid_argument() {
        let err = OaAuthConfig::load(Some(Path::new("/nonexistent/oa-auth.yaml"))).unwrap_err();
        assert!(matches!(err, OaAuthError::InvalidArgument(_)));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        temp_env::with_vars([("ZLJOA_REDIS_HOSTNAME", Some("x"))], || {
            let err = OaAuthConfig::from_env().unwrap_err();
            assert!(matches!(err, OaAuthError::InvalidArgument(_)));
        });
    }
}

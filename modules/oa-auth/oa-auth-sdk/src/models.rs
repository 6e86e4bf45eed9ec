//! Domain models for the OA auth client.
//!
//! The cache entries read here are written by the OA system, which stores
//! loosely typed JSON. Decoding accepts the same loose shapes the writer
//! produces and fails closed on anything else.

use std::collections::BTreeSet;
use std::num::FpCategory;

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::SnapshotError;

/// Result kind of a cache-only check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    /// Session exists and, where a resource was checked, access is granted.
    Allowed,
    /// No session or cache entry.
    Unauthenticated,
    /// Session exists but lacks the required permission.
    Forbidden,
}

impl OutcomeKind {
    /// Numeric wire code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Allowed => 1,
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
        }
    }

    /// Six-digit wire state.
    #[must_use]
    pub const fn state(self) -> &'static str {
        match self {
            Self::Allowed => "000001",
            Self::Unauthenticated => "000401",
            Self::Forbidden => "000403",
        }
    }

    /// Message used when the operation does not supply its own.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Allowed => "access allowed",
            Self::Unauthenticated => "authentication failed",
            Self::Forbidden => "access denied",
        }
    }

    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(Self::Allowed),
            401 => Some(Self::Unauthenticated),
            403 => Some(Self::Forbidden),
            _ => None,
        }
    }
}

/// Outcome of a cache-only check.
///
/// Serialized as `{"code": 1, "state": "000001", "msg": "...", "data": {...}}`,
/// with `data` omitted when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "OutcomeWire", try_from = "OutcomeWire")]
pub struct CheckOutcome {
    kind: OutcomeKind,
    msg: String,
    data: Option<Value>,
}

impl CheckOutcome {
    #[must_use]
    pub fn allowed(msg: impl Into<String>) -> Self {
        Self {
            kind: OutcomeKind::Allowed,
            msg: msg.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::of(OutcomeKind::Unauthenticated)
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::of(OutcomeKind::Forbidden)
    }

    /// Outcome of `kind` carrying its default message.
    #[must_use]
    pub fn of(kind: OutcomeKind) -> Self {
        Self {
            kind,
            msg: kind.default_message().to_owned(),
            data: None,
        }
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn kind(&self) -> OutcomeKind {
        self.kind
    }

    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.kind == OutcomeKind::Allowed
    }

    #[must_use]
    pub fn code(&self) -> u16 {
        self.kind.code()
    }

    #[must_use]
    pub fn state(&self) -> &'static str {
        self.kind.state()
    }

    #[must_use]
    pub fn msg(&self) -> &str {
        &self.msg
    }

    #[must_use]
    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn into_data(self) -> Option<Value> {
        self.data
    }
}

#[derive(Serialize, Deserialize)]
struct OutcomeWire {
    code: u16,
    state: String,
    msg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl From<CheckOutcome> for OutcomeWire {
    fn from(outcome: CheckOutcome) -> Self {
        Self {
            code: outcome.kind.code(),
            state: outcome.kind.state().to_owned(),
            msg: outcome.msg,
            data: outcome.data,
        }
    }
}

impl TryFrom<OutcomeWire> for CheckOutcome {
    type Error = String;

    fn try_from(wire: OutcomeWire) -> Result<Self, Self::Error> {
        let kind = OutcomeKind::from_code(wire.code)
            .ok_or_else(|| format!("unknown outcome code {}", wire.code))?;
        Ok(Self {
            kind,
            msg: wire.msg,
            data: wire.data,
        })
    }
}

/// Per-user permission snapshot cached by the OA system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSnapshot {
    #[serde(deserialize_with = "user_object")]
    pub user: SnapshotUser,
    /// URIs (or route identifiers) the user may access.
    #[serde(default, deserialize_with = "uri_set")]
    pub permissions: BTreeSet<String>,
}

/// The `user` part of a [`PermissionSnapshot`]. Other fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotUser {
    #[serde(default, deserialize_with = "truthy")]
    pub is_super_admin: bool,
}

impl PermissionSnapshot {
    /// Decode a raw cached value.
    ///
    /// # Errors
    ///
    /// - `Malformed` if the value is not UTF-8 JSON, or the value or its `user`
    ///   is not a JSON object
    /// - `Empty` if the value decodes to a falsy JSON value (`null`, `false`, `0`,
    ///   `""`, `"0"`, `[]`, `{}`)
    pub fn parse(raw: &[u8]) -> Result<Self, SnapshotError> {
        let value: Value =
            serde_json::from_slice(raw).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        if !is_truthy(&value) {
            return Err(SnapshotError::Empty);
        }
        if !value.is_object() {
            return Err(SnapshotError::Malformed(format!(
                "expected an object, found {value}"
            )));
        }
        serde_json::from_value(value).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }

    /// Whether this snapshot grants access to `uri`.
    #[must_use]
    pub fn permits(&self, uri: &str) -> bool {
        self.user.is_super_admin || self.permissions.contains(uri)
    }
}

/// Credentials forwarded to the remote login endpoint.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
    /// Terminal slot reserved by the login, `0` when unused.
    pub reserved_terminal: u32,
    /// Token of an existing session, sent as the bearer header when present.
    pub bearer_token: Option<SecretString>,
}

impl LoginRequest {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            reserved_terminal: 0,
            bearer_token: None,
        }
    }

    #[must_use]
    pub fn reserved_terminal(mut self, reserved_terminal: u32) -> Self {
        self.reserved_terminal = reserved_terminal;
        self
    }

    #[must_use]
    pub fn bearer_token(mut self, token: impl Into<SecretString>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

// Truthiness as applied by the OA system when it reads its own cache.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n
            .as_f64()
            .is_some_and(|f| f.classify() != FpCategory::Zero),
        Value::String(s) => !(s.is_empty() || s == "0"),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// Derived struct decoding also accepts sequences; `user` must be an object.
fn user_object<'de, D>(deserializer: D) -> Result<SnapshotUser, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        user @ Value::Object(_) => serde_json::from_value(user).map_err(serde::de::Error::custom),
        other => Err(serde::de::Error::custom(format!(
            "expected a user object, found {other}"
        ))),
    }
}

fn truthy<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|v| is_truthy(&v))
}

// Accepts a JSON list, or an object whose values are the URIs.
fn uri_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<Value> = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected a list of URIs, found {other}"
            )));
        }
    };

    Ok(entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn outcome_wire_shape_omits_missing_data() {
        let value = serde_json::to_value(CheckOutcome::forbidden()).unwrap();
        assert_eq!(
            value,
            json!({"code": 403, "state": "000403", "msg": "access denied"})
        );
    }

    #[test]
    fn outcome_wire_shape_carries_data() {
        let outcome = CheckOutcome::allowed("user fetched").with_data(json!({"id": 7}));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            value,
            json!({"code": 1, "state": "000001", "msg": "user fetched", "data": {"id": 7}})
        );
    }

    #[test]
    fn outcome_reads_back_from_wire() {
        let outcome: CheckOutcome =
            serde_json::from_value(json!({"code": 401, "state": "000401", "msg": "gone"}))
                .unwrap();
        assert_eq!(outcome.kind(), OutcomeKind::Unauthenticated);
        assert_eq!(outcome.msg(), "gone");
        assert!(outcome.data().is_none());
    }

    #[test]
    fn outcome_rejects_unknown_code() {
        let result: Result<CheckOutcome, _> =
            serde_json::from_value(json!({"code": 500, "state": "000500", "msg": "?"}));
        assert!(result.is_err());
    }

    #[test]
    fn snapshot_parses_writer_shape() {
        let snapshot = PermissionSnapshot::parse(
            br#"{"user":{"id":3,"is_super_admin":0,"name":"ann"},"permissions":["/a","/b"],"menus":[]}"#,
        )
        .unwrap();
        assert!(!snapshot.user.is_super_admin);
        assert!(snapshot.permits("/a"));
        assert!(!snapshot.permits("/c"));
    }

    #[test]
    fn snapshot_accepts_object_permissions_and_numeric_entries() {
        let snapshot = PermissionSnapshot::parse(
            br#"{"user":{"is_super_admin":false},"permissions":{"3":"/orders","7":42}}"#,
        )
        .unwrap();
        assert!(snapshot.permits("/orders"));
        assert!(snapshot.permits("42"));
    }

    #[test]
    fn snapshot_admin_flag_follows_writer_truthiness() {
        for (flag, expected) in [
            ("true", true),
            ("1", true),
            ("\"yes\"", true),
            ("false", false),
            ("0", false),
            ("0.0", false),
            ("\"0\"", false),
            ("\"\"", false),
            ("null", false),
        ] {
            let raw = format!(r#"{{"user":{{"is_super_admin":{flag}}}}}"#);
            let snapshot = PermissionSnapshot::parse(raw.as_bytes()).unwrap();
            assert_eq!(snapshot.user.is_super_admin, expected, "flag {flag}");
        }
    }

    #[test]
    fn snapshot_missing_permissions_is_empty_set() {
        let snapshot = PermissionSnapshot::parse(br#"{"user":{}}"#).unwrap();
        assert!(snapshot.permissions.is_empty());
        assert!(!snapshot.permits("/a"));
    }

    #[test]
    fn snapshot_falsy_values_are_empty() {
        for raw in ["null", "false", "0", "\"\"", "\"0\"", "[]", "{}"] {
            assert_eq!(
                PermissionSnapshot::parse(raw.as_bytes()),
                Err(SnapshotError::Empty),
                "raw {raw}"
            );
        }
    }

    #[test]
    fn snapshot_undecodable_values_are_malformed() {
        let cases: [&[u8]; 11] = [
            b"",
            b"not json",
            b"\xff\xfe",
            br#"{"permissions":["/a"]}"#,
            br#"{"user":{},"permissions":"/a"}"#,
            br#"{"user":[true],"permissions":[]}"#,
            br#"{"user":true}"#,
            br#"{"user":null,"permissions":["/a"]}"#,
            br#"[[true],[]]"#,
            br#"[{"is_super_admin":1}]"#,
            br#""/a""#,
        ];
        for raw in cases {
            assert!(
                matches!(
                    PermissionSnapshot::parse(raw),
                    Err(SnapshotError::Malformed(_))
                ),
                "raw {}",
                String::from_utf8_lossy(raw)
            );
        }
    }

    #[test]
    fn login_request_defaults() {
        let request = LoginRequest::new("ann", "secret".to_owned());
        assert_eq!(request.reserved_terminal, 0);
        assert!(request.bearer_token.is_none());
        assert!(!format!("{request:?}").contains("secret"));
    }
}

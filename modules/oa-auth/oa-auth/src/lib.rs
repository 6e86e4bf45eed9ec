//! OA Auth Client
//!
//! Answers "is this session alive" and "may this user open this URI" from the
//! cache shared with the OA identity service, and forwards login, logout and
//! user lookups to the service itself.
//!
//! The public API lives in `oa-auth-sdk`; this crate wires it to Redis and HTTP.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod config;
pub mod domain;
pub mod infra;
pub mod module;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use config::OaAuthConfig;
pub use module::{build_client, build_client_with_store};

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! OA Auth SDK
//!
//! This crate provides the public API of the OA auth client:
//!
//! - [`OaAuthClient`] - Public API trait for consumers
//! - [`CheckOutcome`], [`OutcomeKind`] - Result of a cache-only check, with its wire shape
//! - [`PermissionSnapshot`] - Cached per-user permissions written by the OA system
//! - [`LoginRequest`] - Credentials forwarded to the remote login endpoint
//! - [`OaAuthError`], [`SnapshotError`] - Error types
//!
//! ## Usage
//!
//! ```ignore
//! use oa_auth_sdk::{OaAuthClient, OutcomeKind};
//!
//! // Built once at startup, shared as Arc<dyn OaAuthClient>
//! let client = oa_auth::build_client(&config).await?;
//!
//! // Cache-only fast path: no call to the remote OA service
//! let outcome = client.check_access(open_id, client.app_key(), "/orders").await?;
//! if outcome.kind() != OutcomeKind::Allowed {
//!     return Err(deny(outcome));
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;

// Re-export main types at crate root
pub use api::OaAuthClient;
pub use error::{OaAuthError, SnapshotError};
pub use models::{CheckOutcome, LoginRequest, OutcomeKind, PermissionSnapshot, SnapshotUser};

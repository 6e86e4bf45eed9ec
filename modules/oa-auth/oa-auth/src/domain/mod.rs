//! Domain layer for the OA auth client.

pub mod error;
pub mod keys;
pub mod local_client;
pub mod service;
pub mod store;

pub use error::DomainError;
pub use keys::KeyScheme;
pub use local_client::OaAuthLocalClient;
pub use service::Service;
pub use store::CacheStore;

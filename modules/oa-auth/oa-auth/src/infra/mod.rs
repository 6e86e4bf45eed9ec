pub mod http_client;
pub mod redis_store;

pub use http_client::RemoteAuthorization;
pub use redis_store::RedisCacheStore;

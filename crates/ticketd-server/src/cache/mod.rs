//! Shared cache tier backends.

pub mod redis;

pub use redis::{RedisStore, create_redis_store};

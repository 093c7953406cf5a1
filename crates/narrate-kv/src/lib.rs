//! Narrate Key-Value Store
//!
//! This crate provides the TTL key-value abstraction that holds sessions
//! and one-time codes, with Redis and in-process backends.

pub mod backend;
pub mod error;
pub mod memory;
pub mod redis_store;

pub use backend::KeyValueStore;
pub use error::KvError;
pub use memory::MemoryStore;
pub use redis_store::{RedisConfig, RedisStore};

//! Cache module for Redis
//!
//! Redis client with retry logic, and the Redis-backed revocation tier.

pub mod redis_client;
pub mod revocation_store;


pub use redis_client::RedisClient;
pub use revocation_store::RedisRevocationRepository;

// Re-export commonly used types
pub use wd_shared::config::CacheConfig;

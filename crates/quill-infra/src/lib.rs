//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! This crate contains database, cache, session and media integrations.
//!
//! ## Feature Flags
//!
//! - `postgres` (default) - PostgreSQL repositories via SeaORM
//! - `redis` (default) - Redis backend for the page cache
//!
//! The in-memory repository set and cache are always available and serve
//! both as the database-less fallback and as the test double.

pub mod cache;
pub mod media;
pub mod memory;
pub mod session;

#[cfg(feature = "postgres")]
pub mod database;

// Re-exports - In-Memory
pub use cache::InMemoryCache;
pub use media::FsMediaStore;
pub use memory::MemoryStore;
pub use session::{JwtSessionService, SessionConfig};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "redis")]
pub use cache::{RedisCache, RedisConfig};

//! Core types and shared functionality for revcache.
//!
//! This crate provides:
//! - The revision engine that versions reads and invalidates on writes
//! - Revision stores (in-memory and SQLite)
//! - Unified error types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod revision;
pub mod store;

pub use config::{AppConfig, BaseUrlPattern, CacheConfig, ConfigRegistry};
pub use error::Error;
pub use revision::{CacheManager, Method, RevisionMap};
pub use store::{MemoryRevisionStore, RevisionStore, SqliteRevisionStore};

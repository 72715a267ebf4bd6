//! MCP tool implementations.
//!
//! This module contains all tools exposed by the revcache server.

pub mod cache;

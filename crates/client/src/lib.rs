//! Client code for revcache.
//!
//! This crate provides the request/response interceptor that drives the
//! revision engine, the short-lived response cache it attaches to reads, and
//! an HTTP client that runs every request through both hooks.

pub mod fetch;
pub mod interceptor;

pub use fetch::{CachingClient, ClientConfig, FetchResponse};
pub use interceptor::{CacheInterceptor, RequestDescriptor, ResponseCache, ResponseDescriptor, is_document};

//! Request/response hooks that drive the revision engine.
//!
//! An HTTP pipeline calls [`CacheInterceptor::on_request`] before sending and
//! [`CacheInterceptor::on_response`] once a successful response is back.
//!
//! - GET (non-document): attach the [`ResponseCache`] and rewrite the URL to
//!   its versioned form on the way out; evict it from the response cache on
//!   the way back.
//! - POST, PUT, DELETE: invalidate revisions once the response is back.
//! - Everything else passes through untouched.

pub mod response_cache;

use std::sync::Arc;

use revcache_core::{CacheManager, Error, Method};

pub use response_cache::{ResponseCache, ResponseSlot};

/// Path suffixes of documents that are never revisioned.
const DOCUMENT_SUFFIXES: &[&str] = &[".html", ".htm"];

/// Outgoing request as seen by the hooks.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    /// Set by `on_request` for reads that may be served from the response
    /// cache.
    pub cache: Option<ResponseCache>,
}

impl RequestDescriptor {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), cache: None }
    }
}

/// A response together with the request that produced it.
#[derive(Debug, Clone)]
pub struct ResponseDescriptor<B> {
    pub config: RequestDescriptor,
    pub body: B,
}

impl<B> ResponseDescriptor<B> {
    pub fn new(config: RequestDescriptor, body: B) -> Self {
        Self { config, body }
    }
}

/// The two hook points of the revision cache.
#[derive(Clone)]
pub struct CacheInterceptor {
    manager: Arc<CacheManager>,
    responses: ResponseCache,
}

impl CacheInterceptor {
    pub fn new(manager: Arc<CacheManager>) -> Self {
        Self { manager, responses: ResponseCache::new() }
    }

    pub fn manager(&self) -> &Arc<CacheManager> {
        &self.manager
    }

    /// The response cache attached to versioned reads.
    pub fn response_cache(&self) -> &ResponseCache {
        &self.responses
    }

    /// Rewrite a GET to its versioned URL.
    ///
    /// Returns `config` with only `url` and `cache` possibly changed.
    pub async fn on_request(&self, mut config: RequestDescriptor) -> Result<RequestDescriptor, Error> {
        if config.method == Method::Get && !is_document(&config.url) {
            config.cache = Some(self.responses.clone());
            config.url = self.manager.versioned_url(&config.url).await?;
            tracing::trace!(url = %config.url, "request rewritten");
        }

        Ok(config)
    }

    /// Invalidate after a mutation, or release a completed read.
    pub async fn on_response<B>(&self, response: ResponseDescriptor<B>) -> Result<ResponseDescriptor<B>, Error> {
        let config = &response.config;

        match config.method {
            Method::Post | Method::Put | Method::Delete => {
                let bumped = self.manager.invalidate(&config.method, &config.url).await?;
                tracing::debug!(method = %config.method, url = %config.url, bumped = bumped.len(), "mutation observed");
            }
            Method::Get if !is_document(&config.url) => {
                self.responses.remove(&config.url).await;
            }
            _ => {}
        }

        Ok(response)
    }
}

/// Whether `url` points at a markup document rather than an API resource.
pub fn is_document(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    DOCUMENT_SUFFIXES.iter().any(|suffix| path.ends_with(suffix))
}

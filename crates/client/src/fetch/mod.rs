//! HTTP client that runs every request through the cache interceptor.
//!
//! ### Reads
//! - GET URLs under a configured base are sent as `url?rev=N`.
//! - Concurrent reads of the same versioned URL share one round trip.
//!
//! ### Writes
//! - A successful POST/PUT/DELETE bumps the affected revisions.
//! - Failed requests never reach the response hook, so they invalidate nothing.
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)

pub mod url;

use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use self::url::{UrlError, parse_request_url};

use crate::interceptor::{CacheInterceptor, RequestDescriptor, ResponseDescriptor};
use revcache_core::{CacheManager, Error, Method};

/// Configuration for the caching client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// User agent string (default: "revcache/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: "revcache/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL actually requested (versioned for revisioned reads)
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Response headers
    pub headers: header::HeaderMap,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

/// HTTP client wired to the revision cache.
pub struct CachingClient {
    http: Client,
    config: ClientConfig,
    interceptor: CacheInterceptor,
}

impl CachingClient {
    /// Create a new client with the given configuration.
    pub fn new(config: ClientConfig, manager: Arc<CacheManager>) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config, interceptor: CacheInterceptor::new(manager) })
    }

    pub async fn get(&self, url: &str) -> Result<FetchResponse, Error> {
        self.execute(Method::Get, url, None).await
    }

    pub async fn post(&self, url: &str, body: impl Into<Bytes>) -> Result<FetchResponse, Error> {
        self.execute(Method::Post, url, Some(body.into())).await
    }

    pub async fn put(&self, url: &str, body: impl Into<Bytes>) -> Result<FetchResponse, Error> {
        self.execute(Method::Put, url, Some(body.into())).await
    }

    pub async fn delete(&self, url: &str) -> Result<FetchResponse, Error> {
        self.execute(Method::Delete, url, None).await
    }

    /// Send a request through both interceptor hooks.
    ///
    /// The URL is validated before the request hook runs, so an unusable URL
    /// never seeds a revision.
    pub async fn execute(&self, method: Method, url: &str, body: Option<Bytes>) -> Result<FetchResponse, Error> {
        parse_request_url(url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let request = self.interceptor.on_request(RequestDescriptor::new(method, url)).await?;

        let response = match &request.cache {
            Some(cache) => {
                let slot = cache.slot(&request.url).await;
                match slot.get_or_try_init(|| self.send(&request, body)).await {
                    Ok(response) => response.clone(),
                    Err(e) => {
                        cache.remove(&request.url).await;
                        return Err(e);
                    }
                }
            }
            None => self.send(&request, body).await?,
        };

        let response = self.interceptor.on_response(ResponseDescriptor::new(request, response)).await?;

        Ok(response.body)
    }

    /// Perform the network round trip for an intercepted request.
    async fn send(&self, request: &RequestDescriptor, body: Option<Bytes>) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = parse_request_url(&request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;

        let mut builder = self.http.request(wire_method(&request.method)?, url.clone());
        if let Some(body) = body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                Error::FetchTimeout(format!("{} {}: {}", request.method, url, e))
            } else {
                Error::HttpError(format!("network error: {e}"))
            }
        })?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::HttpError(format!("status {}", status.as_u16())));
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| Error::HttpError(format!("failed to read response: {e}")))?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("{} {} -> {} in {}ms ({} bytes)", request.method, url, status, fetch_ms, bytes.len());

        Ok(FetchResponse { url, final_url, status, content_type, bytes, headers, fetch_ms })
    }

    pub fn interceptor(&self) -> &CacheInterceptor {
        &self.interceptor
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }
}

/// The verb sent on the wire. JSONP reads travel as plain GETs.
fn wire_method(method: &Method) -> Result<reqwest::Method, Error> {
    Ok(match method {
        Method::Get | Method::Jsonp => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Options => reqwest::Method::OPTIONS,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Other(name) => reqwest::Method::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {name}: {e}")))?,
    })
}

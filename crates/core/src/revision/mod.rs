//! Revision tracking and hierarchical invalidation.
//!
//! Reads of a configured base API URL are rewritten to `url?rev=N`. Writes
//! bump `N` for the matched base URL and, for PUT/DELETE, for the resource and
//! every URL nested below it, so a cache keyed on the versioned URL never
//! serves a stale representation.

mod engine;
mod matching;

use std::collections::BTreeMap;
use std::fmt;

pub use engine::CacheManager;
pub use matching::{is_descendant, match_base_url};

/// Revision per absolute request URL. A missing key means "never seen".
pub type RevisionMap = BTreeMap<String, u64>;

/// Request method as seen by the invalidation engine.
///
/// `Jsonp` exists because script-tag requests are reads that never reach
/// the server as a distinct HTTP verb.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Head,
    Jsonp,
    Options,
    Post,
    Put,
    Delete,
    Patch,
    Other(String),
}

impl Method {
    /// Methods that never change server state.
    pub fn is_read_only(&self) -> bool {
        matches!(self, Method::Get | Method::Head | Method::Jsonp | Method::Options)
    }

    /// Methods that act on the addressed resource itself rather than on the
    /// collection it belongs to.
    pub fn targets_resource(&self) -> bool {
        matches!(self, Method::Put | Method::Delete)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Jsonp => "JSONP",
            Method::Options => "OPTIONS",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Other(name) => name,
        }
    }
}

impl From<&str> for Method {
    fn from(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "GET" => Method::Get,
            "HEAD" => Method::Head,
            "JSONP" => Method::Jsonp,
            "OPTIONS" => Method::Options,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            other => Method::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build `url?param=revision`.
pub fn versioned(url: &str, param: &str, revision: u64) -> String {
    format!("{url}?{param}={revision}")
}

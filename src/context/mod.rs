//! Per-request context handed to route handlers.

use std::collections::HashMap;

use crate::http::Request;

/// Path parameters captured by the matched route, e.g. `albumId` for `/:albumId`.
#[derive(Default, Debug, Clone)]
pub struct PathParams {
    map: HashMap<String, String>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.map.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// The request, its captured parameters, and the path prefix under which the
/// handling router was mounted.
///
/// `base_path` is empty for a router serving from the root, and never ends
/// with `/` otherwise (`"/gallery"`, `"/site/gallery"`).
#[derive(Debug)]
pub struct Context {
    request: Request,
    params: PathParams,
    base_path: String,
}

impl Context {
    pub fn new(request: Request, params: PathParams, base_path: impl Into<String>) -> Self {
        Self {
            request,
            params,
            base_path: base_path.into(),
        }
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn params(&self) -> &PathParams {
        &self.params
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Joins `segment`, percent-encoded, onto the mount prefix with exactly
    /// one `/` between them. Incoming paths are decoded, so the link routes
    /// back to the same segment.
    ///
    /// ```
    /// use flickr_gallery::context::{Context, PathParams};
    /// use flickr_gallery::http::Request;
    ///
    /// let ctx = Context::new(Request::get("/gallery"), PathParams::new(), "/gallery");
    /// assert_eq!(ctx.link_to("72157"), "/gallery/72157");
    ///
    /// let root = Context::new(Request::get("/"), PathParams::new(), "");
    /// assert_eq!(root.link_to("72157"), "/72157");
    /// assert_eq!(root.link_to("a b"), "/a%20b");
    /// ```
    pub fn link_to(&self, segment: &str) -> String {
        format!(
            "{}/{}",
            self.base_path.trim_end_matches('/'),
            urlencoding::encode(segment.trim_start_matches('/'))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_insert_and_get() {
        let mut params = PathParams::new();
        assert!(params.is_empty());
        params.insert("albumId", "A1");
        assert_eq!(params.get("albumId"), Some("A1"));
        assert_eq!(params.get("other"), None);
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn link_to_never_doubles_slashes() {
        let ctx = Context::new(Request::get("/"), PathParams::new(), "/gallery/");
        assert_eq!(ctx.link_to("/A1"), "/gallery/A1");
    }

    #[test]
    fn link_to_encodes_reserved_characters() {
        let ctx = Context::new(Request::get("/gallery"), PathParams::new(), "/gallery");
        let link = ctx.link_to("a b?c#d");
        assert_eq!(link, "/gallery/a%20b%3Fc%23d");

        let raw = format!("GET {link} HTTP/1.1\r\nHost: x\r\n\r\n");
        let (request, _) = Request::parse(raw.as_bytes()).unwrap();
        assert_eq!(request.path(), "/gallery/a b?c#d");
    }
}

//! Request routing: map URL patterns to async handlers, and nest routers
//! under path prefixes.
//!
//! | Pattern        | Example match    | Captured params     |
//! |----------------|------------------|---------------------|
//! | `/`            | `/`              | *(none)*            |
//! | `/:albumId`    | `/72157`         | `albumId → "72157"` |
//!
//! Trailing slashes are normalized on both patterns and incoming paths.
//! Routes are tried in registration order, then mounted routers in mount order.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::{Context, PathParams};
use crate::http::{Method, Request, Response, StatusCode};

/// Type-erased async handler.
pub type Handler =
    Arc<dyn Fn(Context) -> Pin<Box<dyn Future<Output = Response> + Send>> + Send + Sync + 'static>;

/// Any `Fn(Context) -> impl Future<Output = Response>` can be registered as a route.
pub trait IntoHandler: Send + Sync + 'static {
    fn call(&self, ctx: Context) -> Pin<Box<dyn Future<Output = Response> + Send>>;
}

impl<T, F> IntoHandler for T
where
    T: Fn(Context) -> F + Send + Sync + 'static,
    F: Future<Output = Response> + Send + 'static,
{
    fn call(&self, ctx: Context) -> Pin<Box<dyn Future<Output = Response> + Send>> {
        Box::pin((self)(ctx))
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Static(String),
    Parameter(String),
}

#[derive(Debug, Clone)]
enum Pattern {
    Exact(String),
    Parameterized { segments: Vec<Segment> },
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}

impl Pattern {
    fn parse(pattern: &str) -> Self {
        let pattern = trim_trailing_slash(pattern);
        if !pattern.contains(':') {
            return Pattern::Exact(pattern.to_owned());
        }
        let segments = pattern
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| match s.strip_prefix(':') {
                Some(name) => Segment::Parameter(name.to_owned()),
                None => Segment::Static(s.to_owned()),
            })
            .collect();
        Pattern::Parameterized { segments }
    }

    fn matches(&self, path: &str) -> Option<PathParams> {
        let path = trim_trailing_slash(path);
        match self {
            Pattern::Exact(p) => (p == path).then(PathParams::new),
            Pattern::Parameterized { segments } => {
                let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
                if parts.len() != segments.len() {
                    return None;
                }
                let mut params = PathParams::new();
                for (segment, part) in segments.iter().zip(parts) {
                    match segment {
                        Segment::Static(s) if s != part => return None,
                        Segment::Static(_) => {}
                        Segment::Parameter(name) => params.insert(name.clone(), part),
                    }
                }
                Some(params)
            }
        }
    }
}

struct Route {
    method: Method,
    pattern: Pattern,
    handler: Handler,
}

struct Mount {
    prefix: String,
    router: Router,
}

impl Mount {
    // The part of `path` below this mount's prefix, if the prefix applies.
    fn strip<'a>(&self, path: &'a str) -> Option<&'a str> {
        let rest = path.strip_prefix(self.prefix.as_str())?;
        if rest.is_empty() {
            Some("/")
        } else if rest.starts_with('/') {
            Some(rest)
        } else {
            None
        }
    }
}

/// HTTP request router with nested mounts.
///
/// ```rust
/// use flickr_gallery::context::Context;
/// use flickr_gallery::http::{Request, Response, StatusCode};
/// use flickr_gallery::router::Router;
///
/// # async fn example() {
/// let mut gallery = Router::new();
/// gallery.get("/:albumId", |ctx: Context| async move {
///     Response::html(ctx.link_to(ctx.params().get("albumId").unwrap_or("")))
/// });
///
/// let mut app = Router::new();
/// app.mount("/gallery", gallery);
///
/// let response = app.route(Request::get("/gallery/72157")).await;
/// assert_eq!(response.body_str(), "/gallery/72157");
/// # }
/// ```
#[derive(Default)]
pub struct Router {
    routes: Vec<Route>,
    mounts: Vec<Mount>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for `GET` requests matching `path`.
    pub fn get(&mut self, path: &str, handler: impl IntoHandler) {
        self.add_route(Method::Get, path, handler);
    }

    fn add_route(&mut self, method: Method, path: &str, handler: impl IntoHandler) {
        let handler: Handler = Arc::new(move |ctx| handler.call(ctx));
        self.routes.push(Route {
            method,
            pattern: Pattern::parse(path),
            handler,
        });
    }

    /// Serve `router` under `prefix`. Its handlers see the accumulated prefix
    /// as [`Context::base_path`].
    pub fn mount(&mut self, prefix: &str, router: Router) {
        let prefix = format!("/{}", prefix.trim_matches('/'));
        let prefix = if prefix == "/" { String::new() } else { prefix };
        self.mounts.push(Mount { prefix, router });
    }

    /// Number of routes registered directly on this router.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty() && self.mounts.is_empty()
    }

    /// Dispatch `request` to the first matching route, or answer `404 Not Found`.
    pub async fn route(&self, request: Request) -> Response {
        match self.resolve(request.method(), request.path()) {
            Some((handler, params, base_path)) => {
                handler(Context::new(request, params, base_path)).await
            }
            None => Response::from_status(StatusCode::NotFound),
        }
    }

    fn resolve(&self, method: &Method, path: &str) -> Option<(Handler, PathParams, String)> {
        let mut router = self;
        let mut path = path.to_owned();
        let mut base_path = String::new();

        'descend: loop {
            for route in &router.routes {
                if &route.method != method {
                    continue;
                }
                if let Some(params) = route.pattern.matches(&path) {
                    return Some((Arc::clone(&route.handler), params, base_path));
                }
            }
            for mount in &router.mounts {
                if let Some(rest) = mount.strip(&path) {
                    base_path.push_str(&mount.prefix);
                    path = rest.to_owned();
                    router = &mount.router;
                    continue 'descend;
                }
            }
            return None;
        }
    }
}

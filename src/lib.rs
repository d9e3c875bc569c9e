//! # flickr-gallery
//!
//! An embeddable photo gallery backed by Flickr photosets. Album listings and
//! album contents are fetched from the provider, normalized, cached with a
//! TTL, rendered into HTML fragments and wrapped by the host's own page
//! template.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use flickr_gallery::config::GalleryOptions;
//! use flickr_gallery::gallery::{self, RetryPolicy};
//! use flickr_gallery::handler::{GalleryHandler, OUTER_TEMPLATE_KEY};
//! use flickr_gallery::provider::FlickrClient;
//! use flickr_gallery::render::{RenderError, Renderer};
//! use flickr_gallery::router::Router;
//! use flickr_gallery::server::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = GalleryOptions::from_env()?;
//!     let service = gallery::connect_with_retry(options, RetryPolicy::default(), FlickrClient::new).await?;
//!
//!     let layout = |_template: &str, ctx: &serde_json::Value| -> Result<String, RenderError> {
//!         Ok(format!("<html><body>{}</body></html>", ctx[OUTER_TEMPLATE_KEY].as_str().unwrap_or("")))
//!     };
//!     let handler = Arc::new(GalleryHandler::new(Arc::new(service), Renderer::with_builtin_templates(), layout));
//!
//!     let mut app = Router::new();
//!     app.mount("/gallery", handler.router());
//!     Server::bind("127.0.0.1:8001").await?.serve(app).await?;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod context;
pub mod gallery;
pub mod handler;
pub mod http;
pub mod model;
pub mod provider;
pub mod render;
pub mod router;
pub mod server;

pub use config::{ConfigError, GalleryConfig, GalleryOptions};
pub use gallery::{GalleryError, GalleryService, InitError};
pub use handler::GalleryHandler;
pub use http::{Headers, Method, Request, Response, StatusCode};
pub use model::{Album, AlbumDetail, Photo};
pub use provider::{AlbumProvider, AuthError, DataError, FlickrClient, ProviderError};
pub use render::{RenderError, Renderer, TemplateEngine};
pub use router::Router;
pub use server::{Server, ServerError};

//! Demo host: serves the gallery under `/gallery` on `127.0.0.1:8001`.
//!
//! Configure with `FLICKR_API_KEY`, `FLICKR_SECRET`, `FLICKR_USER_ID`,
//! `GALLERY_TEMPLATE_ALBUM_LIST` and `GALLERY_TEMPLATE_ALBUM`; optionally
//! `GALLERY_ALBUMS` (comma-separated ids) and `GALLERY_CACHE_EXPIRY_MS`.

use std::sync::Arc;

use flickr_gallery::config::GalleryOptions;
use flickr_gallery::context::Context;
use flickr_gallery::gallery::{self, RetryPolicy};
use flickr_gallery::handler::{GalleryHandler, OUTER_TEMPLATE_KEY};
use flickr_gallery::http::Response;
use flickr_gallery::provider::FlickrClient;
use flickr_gallery::render::{RenderError, Renderer};
use flickr_gallery::router::Router;
use flickr_gallery::server::Server;
use serde_json::Value;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const ADDR: &str = "127.0.0.1:8001";
const MOUNT: &str = "/gallery";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("flickr_gallery=info,server=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

// Page shell for both outer templates.
fn layout(template: &str, context: &Value) -> Result<String, RenderError> {
    let Some(inner) = context[OUTER_TEMPLATE_KEY].as_str() else {
        return Err(RenderError::Template {
            template: template.to_owned(),
            message: format!("missing \"{OUTER_TEMPLATE_KEY}\""),
        });
    };
    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"><title>Gallery</title></head>\n\
         <body data-template=\"{template}\">\n{inner}\n</body>\n</html>\n"
    ))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let options = GalleryOptions::from_env()?;
    let service = gallery::connect_with_retry(options, RetryPolicy::default(), FlickrClient::new).await?;

    let handler = Arc::new(GalleryHandler::new(
        Arc::new(service),
        Renderer::with_builtin_templates(),
        layout,
    ));

    let mut app = Router::new();
    app.get("/", |_ctx: Context| async {
        Response::html(format!("<a href=\"{MOUNT}\">Gallery</a>"))
    });
    app.mount(MOUNT, handler.router());

    tracing::info!(address = ADDR, mount = MOUNT, "starting demo host");
    Server::bind(ADDR).await?.serve(app).await?;
    Ok(())
}

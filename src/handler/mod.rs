//! The gallery's route surface: `GET /` lists albums, `GET /:albumId` shows one.
//!
//! Each operation resolves data through [`GalleryService`], renders it into
//! an inner fragment with the [`Renderer`], then wraps the fragment with the
//! host's outer template. The outer template receives a single variable,
//! [`OUTER_TEMPLATE_KEY`], holding the fragment.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error};

use crate::context::Context;
use crate::gallery::{GalleryError, GalleryService};
use crate::http::{Response, StatusCode};
use crate::model::AlbumEntry;
use crate::render::{Renderer, TemplateEngine, TemplateSlot};
use crate::router::Router;

/// Name of the variable carrying the inner markup into the outer template.
pub const OUTER_TEMPLATE_KEY: &str = "galleryHtml";

/// Route parameter naming the album to show.
pub const ALBUM_ID_PARAM: &str = "albumId";

/// Turns a request failure into the response sent to the client.
pub type ErrorHandler = Arc<dyn Fn(&GalleryError) -> Response + Send + Sync>;

/// Status mapping used unless the host installs its own [`ErrorHandler`].
///
/// | Error                         | Status |
/// |-------------------------------|--------|
/// | provider or data failure      | 502    |
/// | template failure              | 500    |
/// | missing route parameter       | 400    |
pub fn default_error_response(err: &GalleryError) -> Response {
    let status = match err {
        GalleryError::Provider(_) | GalleryError::Data(_) => StatusCode::BadGateway,
        GalleryError::Render(_) => StatusCode::InternalServerError,
        GalleryError::MissingParameter { .. } => StatusCode::BadRequest,
    };
    Response::from_status(status)
}

/// Composition root binding a [`GalleryService`], a [`Renderer`] and the host's
/// outer template engine to the two gallery routes.
pub struct GalleryHandler {
    service: Arc<GalleryService>,
    renderer: Renderer,
    layout: Arc<dyn TemplateEngine>,
    on_error: ErrorHandler,
}

impl GalleryHandler {
    /// Builds a handler and applies the service's configured renderer options.
    ///
    /// `layout` renders the outer page templates named in
    /// [`TemplateNames`](crate::config::TemplateNames).
    pub fn new(
        service: Arc<GalleryService>,
        renderer: Renderer,
        layout: impl TemplateEngine + 'static,
    ) -> Self {
        renderer.set_options(service.config().renderer_options());
        Self {
            service,
            renderer,
            layout: Arc::new(layout),
            on_error: Arc::new(default_error_response),
        }
    }

    /// Replaces the default status mapping for failed requests.
    #[must_use]
    pub fn with_error_handler(
        mut self,
        on_error: impl Fn(&GalleryError) -> Response + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Arc::new(on_error);
        self
    }

    pub fn service(&self) -> &GalleryService {
        &self.service
    }

    /// Renders the visible albums, each linked relative to the request's base path.
    ///
    /// # Errors
    ///
    /// Any [`GalleryError`] from the service, the renderer or the outer template.
    pub async fn list_albums(&self, ctx: &Context) -> Result<String, GalleryError> {
        let albums = self.service.get_album_list().await?;
        let entries: Vec<AlbumEntry<'_>> = albums
            .iter()
            .map(|album| AlbumEntry {
                album,
                album_link: ctx.link_to(&album.album_id),
            })
            .collect();

        let inner = self.renderer.render(TemplateSlot::AlbumList, &entries)?;
        self.wrap(&self.service.config().templates().album_list, inner)
    }

    /// Renders the album named by the `albumId` route parameter.
    ///
    /// # Errors
    ///
    /// [`GalleryError::MissingParameter`] when the route carries no album id,
    /// otherwise as for [`list_albums`](Self::list_albums).
    pub async fn show_album(&self, ctx: &Context) -> Result<String, GalleryError> {
        let album_id = ctx
            .params()
            .get(ALBUM_ID_PARAM)
            .ok_or(GalleryError::MissingParameter {
                name: ALBUM_ID_PARAM,
            })?;
        let detail = self.service.get_album(album_id).await?;

        let inner = self.renderer.render(TemplateSlot::Album, &*detail)?;
        self.wrap(&self.service.config().templates().album, inner)
    }

    fn wrap(&self, template: &str, inner: String) -> Result<String, GalleryError> {
        let mut context = Map::new();
        context.insert(OUTER_TEMPLATE_KEY.to_owned(), Value::String(inner));
        Ok(self.layout.render(template, &Value::Object(context))?)
    }

    fn respond(&self, ctx: &Context, result: Result<String, GalleryError>) -> Response {
        match result {
            Ok(html) => {
                debug!(path = %ctx.request().path(), bytes = html.len(), "gallery page rendered");
                Response::html(html)
            }
            Err(err) => {
                error!(path = %ctx.request().path(), error = %err, "gallery request failed");
                (self.on_error)(&err)
            }
        }
    }

    /// A router exposing `GET /` and `GET /:albumId`, ready to be mounted.
    pub fn router(self: Arc<Self>) -> Router {
        let mut router = Router::new();

        let handler = Arc::clone(&self);
        router.get("/", move |ctx: Context| {
            let handler = Arc::clone(&handler);
            async move {
                let result = handler.list_albums(&ctx).await;
                handler.respond(&ctx, result)
            }
        });

        let handler = self;
        router.get("/:albumId", move |ctx: Context| {
            let handler = Arc::clone(&handler);
            async move {
                let result = handler.show_album(&ctx).await;
                handler.respond(&ctx, result)
            }
        });

        router
    }
}

impl std::fmt::Debug for GalleryHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryHandler")
            .field("service", &self.service)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

//! Rendering of gallery data into HTML fragments.
//!
//! The template engine itself is a capability injected as a [`TemplateEngine`]:
//! a function from a template id and a JSON context to markup. The same trait
//! is used for the host's outer page templates, so any engine (or a plain
//! closure) can be plugged in. [`GalleryTemplates`] is the built-in engine for
//! the two inner slots.
//!
//! Inner templates receive a context of the form
//! `{ "options": RendererOptions, "data": <album list or album detail> }`.

use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

pub mod templates;

pub use templates::GalleryTemplates;

/// Errors produced while rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown template \"{template}\"")]
    UnknownTemplate { template: String },

    #[error("template \"{template}\" is missing data: {source}")]
    MissingData {
        template: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("template \"{template}\" failed: {message}")]
    Template { template: String, message: String },

    #[error("could not build template context: {0}")]
    Context(#[source] serde_json::Error),
}

/// Template engine capability: template id + data → markup, or failure.
///
/// Implemented for any `Fn(&str, &Value) -> Result<String, RenderError>`, so a
/// closure is enough for simple hosts.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError>;
}

impl<F> TemplateEngine for F
where
    F: Fn(&str, &Value) -> Result<String, RenderError> + Send + Sync,
{
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError> {
        (self)(template, context)
    }
}

/// The two fixed inner template slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateSlot {
    AlbumList,
    Album,
}

impl TemplateSlot {
    /// The template id passed to the engine.
    pub fn id(self) -> &'static str {
        match self {
            Self::AlbumList => "albumList",
            Self::Album => "album",
        }
    }
}

/// Presentation class names handed to the inner templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RendererOptions {
    pub container_class: String,
    pub row_class: String,
    pub col_class: String,
}

impl Default for RendererOptions {
    fn default() -> Self {
        Self {
            container_class: "container-fluid".to_owned(),
            row_class: "row".to_owned(),
            col_class: "col-xs-4".to_owned(),
        }
    }
}

impl RendererOptions {
    /// Shallow merge: every field set in `patch` replaces the current value,
    /// unset fields keep theirs.
    pub fn merge(&mut self, patch: &RendererOptionsPatch) {
        if let Some(class) = &patch.container_class {
            self.container_class.clone_from(class);
        }
        if let Some(class) = &patch.row_class {
            self.row_class.clone_from(class);
        }
        if let Some(class) = &patch.col_class {
            self.col_class.clone_from(class);
        }
    }
}

/// A partial [`RendererOptions`] update. Field set: `containerClass`,
/// `rowClass`, `colClass`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RendererOptionsPatch {
    pub container_class: Option<String>,
    pub row_class: Option<String>,
    pub col_class: Option<String>,
}

/// Renders gallery data through an injected [`TemplateEngine`] using the
/// current presentation options.
pub struct Renderer {
    engine: Arc<dyn TemplateEngine>,
    options: RwLock<RendererOptions>,
}

impl Renderer {
    pub fn new(engine: impl TemplateEngine + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
            options: RwLock::new(RendererOptions::default()),
        }
    }

    /// A renderer using the built-in [`GalleryTemplates`].
    pub fn with_builtin_templates() -> Self {
        Self::new(GalleryTemplates)
    }

    /// Merges `patch` into the current options; see [`RendererOptions::merge`].
    pub fn set_options(&self, patch: &RendererOptionsPatch) {
        self.options
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .merge(patch);
    }

    /// A snapshot of the current options.
    pub fn options(&self) -> RendererOptions {
        self.options
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Renders `data` into the given slot.
    ///
    /// # Errors
    ///
    /// Any [`RenderError`] from the engine, or [`RenderError::Context`] if
    /// `data` cannot be serialized.
    pub fn render<T>(&self, slot: TemplateSlot, data: &T) -> Result<String, RenderError>
    where
        T: Serialize + ?Sized,
    {
        let data = serde_json::to_value(data).map_err(RenderError::Context)?;
        let context = json!({
            "options": self.options(),
            "data": data,
        });
        self.engine.render(slot.id(), &context)
    }
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("options", &self.options())
            .finish_non_exhaustive()
    }
}

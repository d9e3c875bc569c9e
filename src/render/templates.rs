//! Built-in `maud` templates for the `albumList` and `album` slots.
//!
//! Markup follows a bootstrap-style grid: one container, one row, one column
//! per album or photo, with class names taken from the context's options.

use maud::{Markup, html};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{RenderError, RendererOptions, TemplateEngine, TemplateSlot};
use crate::model::AlbumDetail;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListEntry {
    name: String,
    #[serde(default)]
    desc: String,
    cover_url: String,
    album_link: String,
}

#[derive(Debug, Deserialize)]
struct SlotContext<T> {
    options: RendererOptions,
    data: T,
}

impl<T: DeserializeOwned> SlotContext<T> {
    fn from_value(template: &str, context: &Value) -> Result<Self, RenderError> {
        Self::deserialize(context).map_err(|source| RenderError::MissingData {
            template: template.to_owned(),
            source,
        })
    }
}

/// The built-in inner template engine.
#[derive(Debug, Clone, Copy, Default)]
pub struct GalleryTemplates;

impl TemplateEngine for GalleryTemplates {
    fn render(&self, template: &str, context: &Value) -> Result<String, RenderError> {
        let markup = if template == TemplateSlot::AlbumList.id() {
            let ctx = SlotContext::<Vec<ListEntry>>::from_value(template, context)?;
            album_list(&ctx.options, &ctx.data)
        } else if template == TemplateSlot::Album.id() {
            let ctx = SlotContext::<AlbumDetail>::from_value(template, context)?;
            album(&ctx.options, &ctx.data)
        } else {
            return Err(RenderError::UnknownTemplate {
                template: template.to_owned(),
            });
        };
        Ok(markup.into_string())
    }
}

fn album_list(options: &RendererOptions, albums: &[ListEntry]) -> Markup {
    html! {
        div class=(options.container_class) {
            @if albums.is_empty() {
                p.gallery-empty { "No albums to show." }
            }
            div class=(options.row_class) {
                @for album in albums {
                    div class=(options.col_class) {
                        a.gallery-album href=(album.album_link) {
                            img.img-responsive src=(album.cover_url) alt=(album.name) loading="lazy";
                            h3 { (album.name) }
                        }
                        @if !album.desc.is_empty() {
                            p.gallery-album-desc { (album.desc) }
                        }
                    }
                }
            }
        }
    }
}

fn album(options: &RendererOptions, detail: &AlbumDetail) -> Markup {
    html! {
        div class=(options.container_class) {
            h2.gallery-title { (detail.title) }
            div class=(options.row_class) {
                @for photo in &detail.images {
                    div class=(options.col_class) {
                        a.gallery-photo href=(photo.url) {
                            img.img-responsive src=(photo.url) alt=(photo.title) loading="lazy";
                        }
                    }
                }
            }
        }
    }
}

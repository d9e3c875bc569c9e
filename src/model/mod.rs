//! Normalized gallery records.
//!
//! These are the provider-independent shapes the service caches and the
//! renderer consumes. They serialize with camelCase keys, which is what
//! template engines see.

use serde::{Deserialize, Serialize};

/// Summary form of an album, as shown in the album list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub album_id: String,
    pub name: String,
    /// May be empty.
    pub desc: String,
    pub cover_url: String,
}

/// A single photo within an album.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub id: String,
    pub title: String,
    pub url: String,
}

/// The photos of one album, in provider order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDetail {
    pub images: Vec<Photo>,
    pub title: String,
}

/// An [`Album`] decorated with the request-relative link to its detail page.
///
/// Built per request by the handler; never cached.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumEntry<'a> {
    #[serde(flatten)]
    pub album: &'a Album,
    pub album_link: String,
}

//! Conversion of raw Flickr payloads into [`Album`] and [`AlbumDetail`].
//!
//! Shape problems are reported as [`DataError`], never as transport errors:
//! a missing container names its JSON path, a malformed record names its kind
//! and position.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::DataError;
use super::urls::{ServerInfo, TARGET_SIZE, resolve_image_url};
use crate::model::{Album, AlbumDetail, Photo};

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(rename = "_content")]
    content: String,
}

#[derive(Debug, Deserialize)]
struct RawPhotoset {
    id: String,
    primary: String,
    secret: String,
    server: String,
    farm: u32,
    title: Content,
    description: Content,
}

#[derive(Debug, Deserialize)]
struct RawPhoto {
    id: String,
    title: String,
    secret: String,
    server: String,
    farm: u32,
}

impl RawPhotoset {
    fn into_album(self) -> Album {
        // The cover is the set's primary photo.
        let cover = ServerInfo {
            farm: self.farm,
            server: self.server,
            id: self.primary,
            secret: self.secret,
        };
        Album {
            album_id: self.id,
            name: self.title.content,
            desc: self.description.content,
            cover_url: resolve_image_url(&cover, TARGET_SIZE),
        }
    }
}

impl RawPhoto {
    fn into_photo(self) -> Photo {
        let info = ServerInfo {
            farm: self.farm,
            server: self.server,
            id: self.id,
            secret: self.secret,
        };
        let url = resolve_image_url(&info, TARGET_SIZE);
        Photo {
            id: info.id,
            title: self.title,
            url,
        }
    }
}

// Walk a dotted path of object keys.
fn lookup<'a>(payload: &'a Value, path: &str) -> Result<&'a Value, DataError> {
    path.split('.')
        .try_fold(payload, |node, key| node.get(key))
        .ok_or_else(|| DataError::MissingField {
            path: path.to_owned(),
        })
}

fn records<T: DeserializeOwned>(
    payload: &Value,
    path: &str,
    kind: &'static str,
) -> Result<Vec<T>, DataError> {
    let items = lookup(payload, path)?
        .as_array()
        .ok_or_else(|| DataError::MissingField {
            path: path.to_owned(),
        })?;

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            T::deserialize(item).map_err(|source| DataError::InvalidRecord {
                kind,
                index,
                source,
            })
        })
        .collect()
}

/// Maps a `flickr.photosets.getList` payload to albums, preserving order.
pub fn albums_from_payload(payload: &Value) -> Result<Vec<Album>, DataError> {
    let sets: Vec<RawPhotoset> = records(payload, "photosets.photoset", "photoset")?;
    Ok(sets.into_iter().map(RawPhotoset::into_album).collect())
}

/// Maps a `flickr.photosets.getPhotos` payload to an album detail, preserving
/// photo order.
pub fn album_detail_from_payload(payload: &Value) -> Result<AlbumDetail, DataError> {
    let photos: Vec<RawPhoto> = records(payload, "photoset.photo", "photo")?;
    let title = lookup(payload, "photoset.title")?
        .as_str()
        .ok_or_else(|| DataError::MissingField {
            path: "photoset.title".to_owned(),
        })?
        .to_owned();

    Ok(AlbumDetail {
        images: photos.into_iter().map(RawPhoto::into_photo).collect(),
        title,
    })
}

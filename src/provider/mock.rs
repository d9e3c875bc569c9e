//! In-memory [`AlbumProvider`] for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::{Value, json};

use super::{AlbumProvider, AuthError, ProviderError};

/// Serves photosets and photo lists built from plain ids and titles, and
/// counts every call.
#[derive(Default)]
pub(crate) struct MockProvider {
    albums: Vec<(String, String)>,
    photos: HashMap<String, (String, Vec<String>)>,
    pub(crate) auth_failures: AtomicUsize,
    pub(crate) fail_fetch: AtomicBool,
    pub(crate) raw_albums: Mutex<Option<Value>>,
    pub(crate) auth_calls: AtomicUsize,
    pub(crate) album_calls: AtomicUsize,
    pub(crate) photo_calls: AtomicUsize,
}

impl MockProvider {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_album(mut self, id: &str, name: &str) -> Self {
        self.albums.push((id.to_owned(), name.to_owned()));
        self
    }

    pub(crate) fn with_photos(mut self, album_id: &str, title: &str, photo_ids: &[&str]) -> Self {
        self.photos.insert(
            album_id.to_owned(),
            (
                title.to_owned(),
                photo_ids.iter().map(|id| (*id).to_owned()).collect(),
            ),
        );
        self
    }

    /// Makes the next `times` authentication attempts fail.
    pub(crate) fn fail_auth_times(self, times: usize) -> Self {
        self.auth_failures.store(times, Ordering::SeqCst);
        self
    }

    pub(crate) fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn album_calls(&self) -> usize {
        self.album_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn photo_calls(&self) -> usize {
        self.photo_calls.load(Ordering::SeqCst)
    }

    fn fetch_guard(&self) -> Result<(), ProviderError> {
        if self.fail_fetch.load(Ordering::SeqCst) {
            Err(ProviderError::Status { status: 503 })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AlbumProvider for MockProvider {
    async fn authenticate(&self) -> Result<(), AuthError> {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.auth_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.auth_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(AuthError::Rejected {
                code: 100,
                message: "Invalid API Key".into(),
            });
        }
        Ok(())
    }

    async fn list_albums(&self, _account_id: &str) -> Result<Value, ProviderError> {
        self.album_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_guard()?;

        if let Some(raw) = self.raw_albums.lock().unwrap().clone() {
            return Ok(raw);
        }

        let sets: Vec<Value> = self
            .albums
            .iter()
            .map(|(id, name)| {
                json!({
                    "id": id,
                    "primary": format!("{id}-cover"),
                    "secret": "sec",
                    "server": "1",
                    "farm": 1,
                    "title": { "_content": name },
                    "description": { "_content": "" }
                })
            })
            .collect();
        Ok(json!({ "photosets": { "photoset": sets }, "stat": "ok" }))
    }

    async fn list_photos(&self, album_id: &str, _account_id: &str) -> Result<Value, ProviderError> {
        self.photo_calls.fetch_add(1, Ordering::SeqCst);
        self.fetch_guard()?;

        let Some((title, ids)) = self.photos.get(album_id) else {
            return Err(ProviderError::Api {
                code: 1,
                message: "Photoset not found".into(),
            });
        };
        let photos: Vec<Value> = ids
            .iter()
            .map(|id| {
                json!({
                    "id": id,
                    "title": format!("photo {id}"),
                    "secret": "sec",
                    "server": "1",
                    "farm": 1
                })
            })
            .collect();
        Ok(json!({ "photoset": { "id": album_id, "title": title, "photo": photos }, "stat": "ok" }))
    }
}

//! Gallery service: the fetch → normalize → filter → cache pipeline.
//!
//! [`GalleryService`] owns its configuration, its provider handle and its
//! cache, so independent instances never share state. Both read operations
//! follow the same shape:
//!
//! 1. Look the key up in the cache and return the hit as-is.
//! 2. On a miss, call the provider, normalize the payload, and only then store
//!    the result with the configured TTL.
//!
//! Any failure short-circuits before step 2 writes anything, so an error is
//! never cached and the next request retries the provider.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use crate::cache::CacheStore;
use crate::config::{ConfigError, GalleryConfig};
use crate::model::{Album, AlbumDetail};
use crate::provider::{AlbumProvider, AuthError, DataError, ProviderError, normalize};
use crate::render::RenderError;

mod connect;

pub use connect::{RetryPolicy, connect, connect_with_retry};

/// Cache key of the (filtered) album list.
pub const ALBUMS_CACHE_KEY: &str = "albums";

/// Cache key of one album's photo list.
pub fn album_cache_key(album_id: &str) -> String {
    format!("album:{album_id}")
}

/// Initialization failed; the service cannot serve requests.
#[derive(Debug, Error)]
pub enum InitError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// A request-time failure, forwarded to the host's error pipeline.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("missing route parameter \"{name}\"")]
    MissingParameter { name: &'static str },
}

/// Values held in the gallery cache.
#[derive(Debug, Clone)]
pub enum CachedValue {
    Albums(Arc<Vec<Album>>),
    Album(Arc<AlbumDetail>),
}

/// Keeps only albums named in `allowed`; an empty allow-list keeps everything.
///
/// Order is preserved, and applying the filter twice is the same as once.
pub fn filter_albums(albums: Vec<Album>, allowed: &[String]) -> Vec<Album> {
    if allowed.is_empty() {
        return albums;
    }
    albums
        .into_iter()
        .filter(|album| allowed.iter().any(|id| *id == album.album_id))
        .collect()
}

/// Cached access to the provider's albums.
pub struct GalleryService {
    config: GalleryConfig,
    provider: Arc<dyn AlbumProvider>,
    cache: CacheStore<CachedValue>,
}

impl GalleryService {
    /// Authenticates `provider` and returns a service ready to serve requests.
    ///
    /// Failures are not retried here; see [`connect_with_retry`] for a retrying
    /// caller.
    ///
    /// # Errors
    ///
    /// [`InitError::Auth`] if the credential exchange fails.
    pub async fn initialize<P>(config: GalleryConfig, provider: P) -> Result<Self, InitError>
    where
        P: AlbumProvider + 'static,
    {
        provider.authenticate().await?;
        info!(
            account = %config.credentials().account_id(),
            allowed_albums = config.allowed_album_ids().len(),
            cache_expiry = ?config.cache_expiry(),
            "gallery initialized"
        );

        Ok(Self {
            config,
            provider: Arc::new(provider),
            cache: CacheStore::new(),
        })
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// Returns the allow-listed albums, from cache when fresh.
    ///
    /// # Errors
    ///
    /// [`GalleryError::Provider`] if the listing call fails,
    /// [`GalleryError::Data`] if the payload cannot be normalized. Neither is
    /// cached.
    pub async fn get_album_list(&self) -> Result<Arc<Vec<Album>>, GalleryError> {
        if let Some(CachedValue::Albums(albums)) = self.cache.get(ALBUMS_CACHE_KEY) {
            debug!(key = ALBUMS_CACHE_KEY, "cache hit");
            return Ok(albums);
        }
        debug!(key = ALBUMS_CACHE_KEY, "cache miss");

        let payload = self
            .provider
            .list_albums(self.config.credentials().account_id())
            .await?;
        let albums = normalize::albums_from_payload(&payload)?;
        let fetched = albums.len();
        let albums = Arc::new(filter_albums(albums, self.config.allowed_album_ids()));

        self.cache.put(
            ALBUMS_CACHE_KEY,
            CachedValue::Albums(Arc::clone(&albums)),
            self.config.cache_expiry(),
        );
        info!(fetched, visible = albums.len(), "album list refreshed");
        Ok(albums)
    }

    /// Returns one album's photos, from cache when fresh.
    ///
    /// The allow-list is not consulted: it limits what is listed, not what
    /// can be opened by id.
    ///
    /// # Errors
    ///
    /// As for [`get_album_list`](Self::get_album_list).
    pub async fn get_album(&self, album_id: &str) -> Result<Arc<AlbumDetail>, GalleryError> {
        let key = album_cache_key(album_id);
        if let Some(CachedValue::Album(detail)) = self.cache.get(&key) {
            debug!(%key, "cache hit");
            return Ok(detail);
        }
        debug!(%key, "cache miss");

        let payload = self
            .provider
            .list_photos(album_id, self.config.credentials().account_id())
            .await?;
        let detail = Arc::new(normalize::album_detail_from_payload(&payload)?);

        info!(album_id, photos = detail.images.len(), "album refreshed");
        self.cache.put(
            key,
            CachedValue::Album(Arc::clone(&detail)),
            self.config.cache_expiry(),
        );
        Ok(detail)
    }

}

impl std::fmt::Debug for GalleryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GalleryService")
            .field("config", &self.config)
            .field("cached_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::config::{CredentialOptions, GalleryOptions, TemplateNames};
    use crate::provider::mock::MockProvider;

    pub(crate) fn config(allowed: &[&str]) -> GalleryConfig {
        config_with_expiry(allowed, None)
    }

    fn config_with_expiry(allowed: &[&str], cache_expiry_ms: Option<u64>) -> GalleryConfig {
        GalleryOptions {
            provider_credentials: CredentialOptions {
                api_key: Some("key".into()),
                secret: Some("secret".into()),
                account_id: Some("acct".into()),
            },
            cache_expiry_ms,
            allowed_album_ids: allowed.iter().map(|id| (*id).to_owned()).collect(),
            templates: Some(TemplateNames {
                album_list: "album-list".into(),
                album: "album-page".into(),
            }),
            renderer_options: Default::default(),
        }
        .validate()
        .unwrap()
    }

    fn three_albums() -> Arc<MockProvider> {
        Arc::new(
            MockProvider::new()
                .with_album("A1", "One")
                .with_album("A2", "Two")
                .with_album("A3", "Three")
                .with_photos("A1", "Trip", &["p1", "p2"])
                .with_photos("A2", "Home", &["p3"]),
        )
    }

    async fn service(mock: &Arc<MockProvider>, allowed: &[&str]) -> GalleryService {
        GalleryService::initialize(config(allowed), Arc::clone(mock))
            .await
            .unwrap()
    }

    fn album(id: &str) -> Album {
        Album {
            album_id: id.into(),
            name: id.into(),
            desc: String::new(),
            cover_url: String::new(),
        }
    }

    #[test]
    fn filter_empty_allow_list_keeps_all() {
        let albums = vec![album("A1"), album("A2")];
        assert_eq!(filter_albums(albums.clone(), &[]), albums);
    }

    #[test]
    fn filter_is_idempotent() {
        let allowed = vec!["A3".to_owned(), "A1".to_owned()];
        let albums = vec![album("A1"), album("A2"), album("A3")];
        let once = filter_albums(albums, &allowed);
        let twice = filter_albums(once.clone(), &allowed);
        assert_eq!(once, twice);
        // Provider order, not allow-list order.
        assert_eq!(once[0].album_id, "A1");
        assert_eq!(once[1].album_id, "A3");
    }

    #[test]
    fn album_keys() {
        assert_eq!(album_cache_key("A1"), "album:A1");
    }

    #[tokio::test]
    async fn initialize_authenticates_once() {
        let mock = three_albums();
        service(&mock, &[]).await;
        assert_eq!(mock.auth_calls(), 1);
    }

    #[tokio::test]
    async fn initialize_surfaces_auth_error() {
        let mock = Arc::new(MockProvider::new().fail_auth_times(1));
        let result = GalleryService::initialize(config(&[]), Arc::clone(&mock)).await;
        assert!(matches!(result, Err(InitError::Auth(AuthError::Rejected { .. }))));
    }

    #[tokio::test]
    async fn album_list_is_cached_within_ttl() {
        let mock = three_albums();
        let svc = service(&mock, &[]).await;

        let first = svc.get_album_list().await.unwrap();
        assert_eq!(first.len(), 3);
        let second = svc.get_album_list().await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(mock.album_calls(), 1);
    }

    #[tokio::test]
    async fn allow_list_filters_listing() {
        let mock = three_albums();
        let svc = service(&mock, &["A1"]).await;

        let albums = svc.get_album_list().await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].album_id, "A1");
        assert_eq!(albums[0].name, "One");
    }

    #[tokio::test]
    async fn cached_list_is_already_filtered() {
        let mock = three_albums();
        let svc = service(&mock, &["A2"]).await;
        svc.get_album_list().await.unwrap();

        match svc.cache.get(ALBUMS_CACHE_KEY) {
            Some(CachedValue::Albums(albums)) => {
                assert_eq!(albums.len(), 1);
                assert_eq!(albums[0].album_id, "A2");
            }
            other => panic!("expected cached album list, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn album_detail_is_cached_within_ttl() {
        let mock = three_albums();
        let svc = service(&mock, &[]).await;

        let first = svc.get_album("A1").await.unwrap();
        assert_eq!(first.title, "Trip");
        let ids: Vec<_> = first.images.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2"]);

        let second = svc.get_album("A1").await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert_eq!(mock.photo_calls(), 1);
    }

    #[tokio::test]
    async fn album_outside_allow_list_still_opens() {
        let mock = three_albums();
        let svc = service(&mock, &["A1"]).await;

        let listed = svc.get_album_list().await.unwrap();
        assert!(listed.iter().all(|a| a.album_id != "A2"));

        let detail = svc.get_album("A2").await.unwrap();
        assert_eq!(detail.title, "Home");
    }

    #[tokio::test]
    async fn failed_listing_is_not_cached() {
        let mock = three_albums();
        let svc = service(&mock, &[]).await;

        mock.set_fail_fetch(true);
        let err = svc.get_album_list().await.unwrap_err();
        assert!(matches!(err, GalleryError::Provider(ProviderError::Status { status: 503 })));
        assert!(svc.cache.get(ALBUMS_CACHE_KEY).is_none());

        mock.set_fail_fetch(false);
        let albums = svc.get_album_list().await.unwrap();
        assert_eq!(albums.len(), 3);
        assert_eq!(mock.album_calls(), 2);
    }

    #[tokio::test]
    async fn failed_album_fetch_is_not_cached() {
        let mock = three_albums();
        let svc = service(&mock, &[]).await;

        let err = svc.get_album("missing").await.unwrap_err();
        assert!(matches!(err, GalleryError::Provider(ProviderError::Api { code: 1, .. })));
        assert!(svc.cache.get(&album_cache_key("missing")).is_none());

        svc.get_album("missing").await.unwrap_err();
        assert_eq!(mock.photo_calls(), 2);
    }

    #[tokio::test]
    async fn malformed_payload_is_data_error_and_not_cached() {
        let mock = three_albums();
        *mock.raw_albums.lock().unwrap() = Some(json!({ "photosets": {} }));
        let svc = service(&mock, &[]).await;

        let err = svc.get_album_list().await.unwrap_err();
        assert!(matches!(err, GalleryError::Data(DataError::MissingField { .. })));
        assert!(svc.cache.get(ALBUMS_CACHE_KEY).is_none());
    }

    #[tokio::test]
    async fn expired_list_is_refetched() {
        let mock = three_albums();
        let svc = GalleryService::initialize(config_with_expiry(&[], Some(50)), Arc::clone(&mock))
            .await
            .unwrap();

        svc.get_album_list().await.unwrap();
        tokio::time::sleep(svc.config().cache_expiry() + Duration::from_millis(50)).await;
        svc.get_album_list().await.unwrap();

        assert_eq!(mock.album_calls(), 2);
    }

    #[tokio::test]
    async fn instances_do_not_share_cache() {
        let mock = three_albums();
        let first = service(&mock, &[]).await;
        let second = service(&mock, &["A1"]).await;

        assert_eq!(first.get_album_list().await.unwrap().len(), 3);
        assert_eq!(second.get_album_list().await.unwrap().len(), 1);
        assert_eq!(mock.album_calls(), 2);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_service() {
        let mock = three_albums();
        let svc = Arc::new(service(&mock, &[]).await);

        let tasks: Vec<_> = ["A1", "A2"]
            .into_iter()
            .map(|id| {
                let svc = Arc::clone(&svc);
                tokio::spawn(async move { svc.get_album(id).await.map(|d| d.title.clone()) })
            })
            .collect();

        let mut titles = Vec::new();
        for task in tasks {
            titles.push(task.await.unwrap().unwrap());
        }
        assert_eq!(titles, ["Trip", "Home"]);
    }
}

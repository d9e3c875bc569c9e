//! Photo provider adapter: remote album/photo listing and normalization.
//!
//! [`AlbumProvider`] is the seam between the gallery and the remote photo
//! service. Implementations return the provider's raw JSON payloads; the
//! [`normalize`] functions turn those into the crate's [`model`](crate::model)
//! records. Keeping the two steps apart lets a transport failure
//! ([`ProviderError`]) be told from a payload that does not have the expected
//! shape ([`DataError`]).
//!
//! [`FlickrClient`] is the production implementation.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

pub mod flickr;
#[cfg(test)]
pub(crate) mod mock;
pub mod normalize;
pub mod urls;

pub use flickr::FlickrClient;

/// A data-fetch call to the provider failed.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider rate limit exceeded")]
    RateLimited,

    #[error("provider responded with HTTP {status}")]
    Status { status: u16 },

    #[error("provider error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("provider returned a malformed response: {0}")]
    Malformed(#[source] serde_json::Error),
}

/// The credential exchange with the provider failed.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("provider rejected the credentials ({code}): {message}")]
    Rejected { code: i64, message: String },

    #[error("could not reach provider to verify credentials: {0}")]
    Unreachable(#[source] ProviderError),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl AuthError {
    /// `true` when another attempt could succeed: the provider said no, or
    /// could not be reached. A client that failed to build never recovers.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Rejected { .. } | Self::Unreachable(_))
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Api { code, message } => Self::Rejected { code, message },
            other => Self::Unreachable(other),
        }
    }
}

/// A provider payload did not match the expected shape.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("provider payload is missing \"{path}\"")]
    MissingField { path: String },

    #[error("malformed {kind} record at index {index}: {source}")]
    InvalidRecord {
        kind: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Remote album listing capability.
///
/// # Contract
///
/// - [`authenticate`](Self::authenticate) must succeed before any data call.
/// - Payloads are returned as received; callers normalize them with
///   [`normalize::albums_from_payload`] and [`normalize::album_detail_from_payload`].
/// - Implementations are shared across request tasks and must be `Send + Sync`.
#[async_trait]
pub trait AlbumProvider: Send + Sync {
    /// Exchanges the configured credentials for a usable session.
    async fn authenticate(&self) -> Result<(), AuthError>;

    /// Lists the albums owned by `account_id`, in provider order.
    async fn list_albums(&self, account_id: &str) -> Result<Value, ProviderError>;

    /// Lists the photos of `album_id`, in provider order, with the album title.
    async fn list_photos(&self, album_id: &str, account_id: &str) -> Result<Value, ProviderError>;
}

#[async_trait]
impl<P: AlbumProvider + ?Sized> AlbumProvider for Arc<P> {
    async fn authenticate(&self) -> Result<(), AuthError> {
        (**self).authenticate().await
    }

    async fn list_albums(&self, account_id: &str) -> Result<Value, ProviderError> {
        (**self).list_albums(account_id).await
    }

    async fn list_photos(&self, album_id: &str, account_id: &str) -> Result<Value, ProviderError> {
        (**self).list_photos(album_id, account_id).await
    }
}

//! Service start-up: option validation, provider construction, and the
//! credential exchange, with an optional fixed-delay retry loop.

use std::time::Duration;

use tracing::warn;

use super::{GalleryService, InitError};
use crate::config::{Credentials, GalleryOptions};
use crate::provider::{AlbumProvider, AuthError};

/// Fixed-delay retry policy for the credential exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause between attempts.
    pub delay: Duration,
    /// Total attempts, including the first; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(5),
            max_attempts: None,
        }
    }
}

impl RetryPolicy {
    fn allows_another(&self, attempts_made: u32) -> bool {
        self.max_attempts.is_none_or(|max| attempts_made < max)
    }
}

/// Validates `options`, builds a provider from the credentials, and
/// initializes a service.
///
/// Validation runs first, so a configuration error never reaches the provider.
///
/// ```rust,no_run
/// use flickr_gallery::config::GalleryOptions;
/// use flickr_gallery::gallery;
/// use flickr_gallery::provider::FlickrClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = gallery::connect(GalleryOptions::from_env()?, FlickrClient::new).await?;
/// # Ok(())
/// # }
/// ```
pub async fn connect<P, F>(options: GalleryOptions, make_provider: F) -> Result<GalleryService, InitError>
where
    F: FnOnce(&Credentials) -> Result<P, AuthError>,
    P: AlbumProvider + 'static,
{
    let config = options.validate()?;
    let provider = make_provider(config.credentials())?;
    GalleryService::initialize(config, provider).await
}

/// Like [`connect`], but retries authentication failures according to
/// `policy`. Configuration errors and HTTP client build failures are
/// returned immediately.
pub async fn connect_with_retry<P, F>(
    options: GalleryOptions,
    policy: RetryPolicy,
    make_provider: F,
) -> Result<GalleryService, InitError>
where
    F: Fn(&Credentials) -> Result<P, AuthError>,
    P: AlbumProvider + 'static,
{
    let config = options.validate()?;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        let result = match make_provider(config.credentials()) {
            Ok(provider) => GalleryService::initialize(config.clone(), provider).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Err(InitError::Auth(e)) if e.is_retryable() && policy.allows_another(attempts) => {
                warn!(
                    attempt = attempts,
                    error = %e,
                    retry_in = ?policy.delay,
                    "gallery initialization failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
            }
            other => return other,
        }
    }
}

//! Gallery configuration: initialization options and their validated form.
//!
//! Hosts hand the gallery a [`GalleryOptions`] value, either deserialized from
//! JSON (camelCase keys) or read from the environment. [`GalleryOptions::validate`]
//! turns it into an immutable [`GalleryConfig`], failing fast with a
//! [`ConfigError`] that names the offending key.
//!
//! ```
//! use flickr_gallery::config::GalleryOptions;
//!
//! let options = GalleryOptions::from_json(r#"{
//!     "providerCredentials": { "apiKey": "k", "secret": "s", "accountId": "123@N00" },
//!     "allowedAlbumIds": ["72157"],
//!     "templates": { "albumList": "album-list", "album": "album-page" }
//! }"#).unwrap();
//!
//! let config = options.validate().unwrap();
//! assert_eq!(config.cache_expiry().as_millis(), 300_000);
//! assert_eq!(config.credentials().account_id(), "123@N00");
//! ```

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::render::RendererOptionsPatch;

/// Cache lifetime used when `cacheExpiryMs` is absent or zero (five minutes).
pub const DEFAULT_CACHE_EXPIRY_MS: u64 = 5 * 60 * 1000;

const ENV_API_KEY: &str = "FLICKR_API_KEY";
const ENV_SECRET: &str = "FLICKR_SECRET";
const ENV_ACCOUNT_ID: &str = "FLICKR_USER_ID";
const ENV_CACHE_EXPIRY: &str = "GALLERY_CACHE_EXPIRY_MS";
const ENV_ALBUMS: &str = "GALLERY_ALBUMS";
const ENV_TEMPLATE_ALBUM_LIST: &str = "GALLERY_TEMPLATE_ALBUM_LIST";
const ENV_TEMPLATE_ALBUM: &str = "GALLERY_TEMPLATE_ALBUM";

/// Errors produced while loading or validating gallery options.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("options were missing the \"{field}\" key")]
    MissingField { field: &'static str },

    #[error("invalid value for \"{field}\": {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("malformed gallery options: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("environment variable {var} is not set")]
    MissingEnv { var: &'static str },
}

/// Provider credentials exactly as supplied by the host.
///
/// Every field is optional here so that a missing key can be reported by name
/// instead of surfacing as a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialOptions {
    pub api_key: Option<String>,
    pub secret: Option<String>,
    pub account_id: Option<String>,
}

/// Names of the host's outer templates, one per gallery route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNames {
    pub album_list: String,
    pub album: String,
}

/// Raw initialization input, as received from the host.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryOptions {
    #[serde(default)]
    pub provider_credentials: CredentialOptions,
    pub cache_expiry_ms: Option<u64>,
    #[serde(default)]
    pub allowed_album_ids: Vec<String>,
    pub templates: Option<TemplateNames>,
    #[serde(default)]
    pub renderer_options: RendererOptionsPatch,
}

impl GalleryOptions {
    /// Parses options from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads options from the process environment.
    ///
    /// Credentials come from `FLICKR_API_KEY`, `FLICKR_SECRET` and
    /// `FLICKR_USER_ID`; missing credentials are left for [`validate`](Self::validate)
    /// to report. Template names are required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let cache_expiry_ms = match lookup(ENV_CACHE_EXPIRY) {
            Some(raw) => Some(raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                field: "cacheExpiryMs",
                reason: format!("{raw:?} is not a number of milliseconds ({e})"),
            })?),
            None => None,
        };

        let allowed_album_ids = lookup(ENV_ALBUMS)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let album_list = lookup(ENV_TEMPLATE_ALBUM_LIST).ok_or(ConfigError::MissingEnv {
            var: ENV_TEMPLATE_ALBUM_LIST,
        })?;
        let album = lookup(ENV_TEMPLATE_ALBUM).ok_or(ConfigError::MissingEnv {
            var: ENV_TEMPLATE_ALBUM,
        })?;

        Ok(Self {
            provider_credentials: CredentialOptions {
                api_key: lookup(ENV_API_KEY),
                secret: lookup(ENV_SECRET),
                account_id: lookup(ENV_ACCOUNT_ID),
            },
            cache_expiry_ms,
            allowed_album_ids,
            templates: Some(TemplateNames { album_list, album }),
            renderer_options: RendererOptionsPatch::default(),
        })
    }

    /// Checks required fields and produces the immutable [`GalleryConfig`].
    ///
    /// Credentials are checked in the order `apiKey`, `secret`, `accountId`;
    /// a blank value counts as missing.
    ///
    /// # Errors
    ///
    /// [`ConfigError::MissingField`] naming the first absent key.
    pub fn validate(self) -> Result<GalleryConfig, ConfigError> {
        let CredentialOptions {
            api_key,
            secret,
            account_id,
        } = self.provider_credentials;

        let credentials = Credentials {
            api_key: required(api_key, "apiKey")?,
            secret: required(secret, "secret")?,
            account_id: required(account_id, "accountId")?,
        };

        let templates = self
            .templates
            .ok_or(ConfigError::MissingField { field: "templates" })?;
        if templates.album_list.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "templates.albumList",
            });
        }
        if templates.album.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "templates.album",
            });
        }

        let expiry_ms = match self.cache_expiry_ms {
            Some(0) | None => DEFAULT_CACHE_EXPIRY_MS,
            Some(ms) => ms,
        };

        Ok(GalleryConfig {
            credentials,
            cache_expiry: Duration::from_millis(expiry_ms),
            allowed_album_ids: self.allowed_album_ids,
            templates,
            renderer_options: self.renderer_options,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingField { field }),
    }
}

/// Validated provider credentials.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
    secret: String,
    account_id: String,
}

impl Credentials {
    pub fn new(
        api_key: impl Into<String>,
        secret: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
            account_id: account_id.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    /// The provider account whose albums are exposed.
    pub fn account_id(&self) -> &str {
        &self.account_id
    }
}

// Keys never reach the logs.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("secret", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

/// Process-wide gallery configuration. Read-only once constructed; to change
/// it, validate a fresh [`GalleryOptions`] and initialize a new service.
#[derive(Debug, Clone)]
pub struct GalleryConfig {
    credentials: Credentials,
    cache_expiry: Duration,
    allowed_album_ids: Vec<String>,
    templates: TemplateNames,
    renderer_options: RendererOptionsPatch,
}

impl GalleryConfig {
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Lifetime of every cache entry.
    pub fn cache_expiry(&self) -> Duration {
        self.cache_expiry
    }

    /// Albums exposed in the list view; empty means all of them.
    pub fn allowed_album_ids(&self) -> &[String] {
        &self.allowed_album_ids
    }

    pub fn templates(&self) -> &TemplateNames {
        &self.templates
    }

    pub fn renderer_options(&self) -> &RendererOptionsPatch {
        &self.renderer_options
    }
}

//! Flickr REST API client.
//!
//! Talks to `https://api.flickr.com/services/rest/` with JSON responses
//! (`format=json&nojsoncallback=1`). Only public, unsigned read calls are made,
//! so the API key alone identifies the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use super::{AlbumProvider, AuthError, ProviderError};
use crate::config::Credentials;

/// Production REST endpoint.
pub const REST_ENDPOINT: &str = "https://api.flickr.com/services/rest/";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const METHOD_ECHO: &str = "flickr.test.echo";
const METHOD_LIST_SETS: &str = "flickr.photosets.getList";
const METHOD_SET_PHOTOS: &str = "flickr.photosets.getPhotos";

/// [`AlbumProvider`] backed by the Flickr REST API.
///
/// # Examples
///
/// ```rust,no_run
/// use flickr_gallery::config::Credentials;
/// use flickr_gallery::provider::{AlbumProvider, FlickrClient};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = FlickrClient::new(&Credentials::new("key", "secret", "123@N00"))?;
/// client.authenticate().await?;
/// let payload = client.list_albums("123@N00").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FlickrClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl FlickrClient {
    /// Builds a client for the given credentials. No request is sent until
    /// [`authenticate`](AlbumProvider::authenticate) is called.
    ///
    /// # Errors
    ///
    /// [`AuthError::Client`] if the underlying HTTP client cannot be built.
    pub fn new(credentials: &Credentials) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("flickr-gallery/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(AuthError::Client)?;

        Ok(Self {
            http,
            api_key: credentials.api_key().to_owned(),
            endpoint: REST_ENDPOINT.to_owned(),
        })
    }

    /// Points the client at a different REST endpoint (a proxy or a test server).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    // Issue one REST call and return the payload once `stat` is checked.
    async fn call(&self, method: &str, params: &[(&str, &str)]) -> Result<Value, ProviderError> {
        debug!(method, endpoint = %self.endpoint, "calling flickr");

        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("method", method),
                ("api_key", self.api_key.as_str()),
                ("format", "json"),
                ("nojsoncallback", "1"),
            ])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await?;
        let payload: Value = serde_json::from_slice(&body).map_err(ProviderError::Malformed)?;
        check_stat(payload)
    }
}

/// Turns a `"stat": "fail"` envelope into [`ProviderError::Api`].
fn check_stat(payload: Value) -> Result<Value, ProviderError> {
    if payload.get("stat").and_then(Value::as_str) != Some("fail") {
        return Ok(payload);
    }

    let code = payload.get("code").and_then(Value::as_i64).unwrap_or_default();
    let message = payload
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error")
        .to_owned();
    Err(ProviderError::Api { code, message })
}

#[async_trait]
impl AlbumProvider for FlickrClient {
    async fn authenticate(&self) -> Result<(), AuthError> {
        self.call(METHOD_ECHO, &[]).await?;
        info!("flickr credentials accepted");
        Ok(())
    }

    async fn list_albums(&self, account_id: &str) -> Result<Value, ProviderError> {
        self.call(METHOD_LIST_SETS, &[("user_id", account_id)]).await
    }

    async fn list_photos(&self, album_id: &str, account_id: &str) -> Result<Value, ProviderError> {
        self.call(
            METHOD_SET_PHOTOS,
            &[("photoset_id", album_id), ("user_id", account_id)],
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::context::Context;
    use crate::http::{Response, StatusCode};
    use crate::router::Router;
    use crate::server::Server;

    #[test]
    fn stat_ok_passes_through() {
        let payload = json!({ "stat": "ok", "photosets": {} });
        assert_eq!(check_stat(payload.clone()).unwrap(), payload);
    }

    #[test]
    fn stat_fail_becomes_api_error() {
        let payload = json!({ "stat": "fail", "code": 1, "message": "Photoset not found" });
        match check_stat(payload) {
            Err(ProviderError::Api { code, message }) => {
                assert_eq!(code, 1);
                assert_eq!(message, "Photoset not found");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    // Serves canned Flickr responses keyed on the `method` query parameter.
    async fn fake_flickr() -> String {
        let mut router = Router::new();
        router.get("/services/rest", |ctx: Context| async move {
            let request = ctx.request();
            let body = match request.query_param("method") {
                Some(METHOD_ECHO) if request.query_param("api_key") == Some("good") => {
                    json!({ "stat": "ok" })
                }
                Some(METHOD_ECHO) => {
                    json!({ "stat": "fail", "code": 100, "message": "Invalid API Key" })
                }
                Some(METHOD_LIST_SETS) => json!({
                    "stat": "ok",
                    "photosets": { "photoset": [{ "id": request.query_param("user_id") }] }
                }),
                Some(METHOD_SET_PHOTOS) => {
                    return Response::new(StatusCode::TooManyRequests);
                }
                _ => return Response::new(StatusCode::Ok).body("<html>not json</html>"),
            };
            Response::new(StatusCode::Ok)
                .header("Content-Type", "application/json")
                .body(body.to_string())
        });

        let server = Server::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr();
        tokio::spawn(server.serve(router));
        format!("http://{addr}/services/rest/")
    }

    fn client(key: &str, endpoint: &str) -> FlickrClient {
        FlickrClient::new(&Credentials::new(key, "secret", "acct"))
            .unwrap()
            .with_endpoint(endpoint)
    }

    #[tokio::test]
    async fn authenticate_accepts_valid_key() {
        let endpoint = fake_flickr().await;
        assert!(client("good", &endpoint).authenticate().await.is_ok());
    }

    #[tokio::test]
    async fn authenticate_rejects_invalid_key() {
        let endpoint = fake_flickr().await;
        let err = client("bad", &endpoint).authenticate().await.unwrap_err();
        assert!(matches!(err, AuthError::Rejected { code: 100, .. }));
    }

    #[tokio::test]
    async fn list_albums_sends_account_id() {
        let endpoint = fake_flickr().await;
        let payload = client("good", &endpoint).list_albums("123@N00").await.unwrap();
        assert_eq!(payload["photosets"]["photoset"][0]["id"], "123@N00");
    }

    #[tokio::test]
    async fn http_429_is_rate_limited() {
        let endpoint = fake_flickr().await;
        let err = client("good", &endpoint)
            .list_photos("A1", "acct")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let endpoint = fake_flickr().await;
        let err = client("good", &endpoint)
            .call("flickr.unknown", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_transport_error() {
        let err = client("good", "http://127.0.0.1:1/services/rest/")
            .list_albums("acct")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_)));
    }
}

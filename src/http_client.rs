//! Low-level HTTP transport for Matrix media API requests
//!
//! This module provides the transport the media client is built on:
//! - Generic request/response handling with order-independent query parameters
//! - Matrix-spec-compliant error parsing
//! - Resolution of mxc:// identifiers into concrete fetch URLs
//! - Thread-safe authentication token management

use mime::Mime;
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

use crate::error::MediaClientError;
use crate::mxc::MxcUri;

/// Matrix error response format per specification
#[derive(Debug, Deserialize)]
struct MatrixErrorResponse {
    errcode: String,
    error: String,
    #[serde(default)]
    retry_after_ms: Option<u64>,
}

/// Which rendition of a media item a fetch URL should address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchVariant {
    /// The original uploaded bytes.
    Raw,
    /// A server-generated resized rendition.
    Thumbnail,
}

/// Transport configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the Matrix homeserver
    pub homeserver_url: Url,
    /// HTTP client timeout in seconds
    pub timeout_secs: u64,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            homeserver_url: Url::parse("https://matrix.example.com").unwrap(),
            timeout_secs: 30,
            user_agent: "matrix-media-client/0.1".to_string(),
        }
    }
}

/// Low-level HTTP client for Matrix media API requests
///
/// Holds the connection pool and the optional bearer token. All operations
/// are single request/response exchanges; cancellation of a caller's await
/// drops the in-flight request. No retries happen here.
#[derive(Debug, Clone)]
pub struct MatrixHttpClient {
    client: Client,
    homeserver_url: Url,
    access_token: Arc<RwLock<Option<String>>>,
}

impl MatrixHttpClient {
    /// Create a client for the given homeserver with default settings.
    pub fn new(homeserver_url: Url) -> Result<Self, MediaClientError> {
        Self::with_config(ClientConfig {
            homeserver_url,
            ..ClientConfig::default()
        })
    }

    /// Create a client from an explicit configuration.
    pub fn with_config(config: ClientConfig) -> Result<Self, MediaClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(10)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            homeserver_url: config.homeserver_url,
            access_token: Arc::new(RwLock::new(None)),
        })
    }

    /// Get the homeserver URL
    pub fn homeserver_url(&self) -> &Url {
        &self.homeserver_url
    }

    /// Set access token for authenticated requests
    pub async fn set_access_token(&self, token: String) {
        let mut guard = self.access_token.write().await;
        *guard = Some(token);
    }

    /// Clear access token (logout)
    pub async fn clear_access_token(&self) {
        let mut guard = self.access_token.write().await;
        *guard = None;
    }

    /// Check if access token is set
    pub async fn has_access_token(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    /// Issue a request expecting a JSON response body.
    ///
    /// Query parameters are sent exactly as given: an absent parameter must
    /// be left out of `query` by the caller, never passed as an empty value.
    ///
    /// # Errors
    /// * `Matrix` / `Network` - transport-level failures
    /// * `ResponseFormat` - a 2xx response whose body does not match `R`
    pub async fn request_json<R>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, MediaClientError>
    where
        R: DeserializeOwned,
    {
        let url = self.homeserver_url.join(path)?;

        let mut req = self.client.request(method, url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = self.access_token.read().await.as_ref() {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        Self::decode_json(response).await
    }

    /// POST a raw byte payload, expecting a JSON response body.
    ///
    /// The `Content-Type` header is set only when a type is given; an
    /// untyped payload goes out without the header rather than with an
    /// empty one.
    pub async fn post_bytes<R>(
        &self,
        path: &str,
        body: Vec<u8>,
        content_type: Option<&Mime>,
    ) -> Result<R, MediaClientError>
    where
        R: DeserializeOwned,
    {
        let url = self.homeserver_url.join(path)?;

        let mut req = self.client.post(url).body(body);
        if let Some(mime) = content_type {
            req = req.header(reqwest::header::CONTENT_TYPE, mime.as_ref());
        }
        if let Some(token) = self.access_token.read().await.as_ref() {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        Self::decode_json(response).await
    }

    /// Turn an mxc identifier into the concrete URL for the given variant.
    pub fn resolve_fetch_url(
        &self,
        media: &MxcUri,
        variant: FetchVariant,
    ) -> Result<Url, MediaClientError> {
        let endpoint = match variant {
            FetchVariant::Raw => "download",
            FetchVariant::Thumbnail => "thumbnail",
        };
        let path = format!(
            "/_matrix/media/v3/{}/{}/{}",
            endpoint,
            media.server_name(),
            media.media_id()
        );
        Ok(self.homeserver_url.join(&path)?)
    }

    /// Open a GET response for a binary payload URL.
    ///
    /// The status is checked before the body is handed back, so callers only
    /// ever see a successful response to read to completion.
    pub async fn open_stream(
        &self,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<Response, MediaClientError> {
        let mut req = self.client.get(url);
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(token) = self.access_token.read().await.as_ref() {
            req = req.bearer_auth(token);
        }

        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let error_body = response.text().await?;
            Err(Self::parse_matrix_error(status.as_u16(), &error_body))
        }
    }

    async fn decode_json<R>(response: Response) -> Result<R, MediaClientError>
    where
        R: DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            let body = response.text().await?;
            serde_json::from_str(&body)
                .map_err(|e| MediaClientError::ResponseFormat(e.to_string()))
        } else {
            let error_body = response.text().await?;
            Err(Self::parse_matrix_error(status.as_u16(), &error_body))
        }
    }

    /// Parse Matrix error response per specification
    fn parse_matrix_error(status: u16, body: &str) -> MediaClientError {
        match serde_json::from_str::<MatrixErrorResponse>(body) {
            Ok(matrix_err) => MediaClientError::Matrix {
                status,
                errcode: matrix_err.errcode,
                error: matrix_err.error,
                retry_after_ms: matrix_err.retry_after_ms,
            },
            Err(_) => {
                // Fallback: non-JSON error response
                MediaClientError::Matrix {
                    status,
                    errcode: "M_UNKNOWN".to_string(),
                    error: body.to_string(),
                    retry_after_ms: None,
                }
            }
        }
    }
}

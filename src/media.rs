//! Matrix content repository (media) client
//!
//! Implements the client side of the media endpoints:
//! - POST /_matrix/media/v3/upload
//! - GET /_matrix/media/v3/download/{serverName}/{mediaId}
//! - GET /_matrix/media/v3/thumbnail/{serverName}/{mediaId}
//! - GET /_matrix/media/v3/preview_url
//! - GET /_matrix/media/v3/config
//!
//! Remote media and URL previews are fetched by the homeserver on the
//! client's behalf, so third-party servers never see the client's network
//! address.

use std::collections::HashMap;
use std::sync::Arc;

use mime::Mime;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::MediaClientError;
use crate::http_client::{FetchVariant, MatrixHttpClient};
use crate::mxc::MxcUri;
use crate::sniff::MimeSniffer;

/// Response from media upload endpoint
#[derive(Debug, Serialize, Deserialize)]
struct MediaUploadResponse {
    content_uri: String,
}

/// Server-advertised media repository constraints.
///
/// All fields are intentionally optional: an absent field means the server
/// chose not to advertise a value, and the caller should apply its own
/// conservative default. An empty `{}` response is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaRepoConfig {
    /// Maximum upload size in bytes.
    #[serde(rename = "m.upload.size", skip_serializing_if = "Option::is_none")]
    pub upload_size: Option<u64>,

    /// Any further advertised fields.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Open-Graph style metadata describing a previewed URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UrlPreview {
    #[serde(rename = "og:title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "og:description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// mxc URI of the server-cached preview image, if any.
    #[serde(rename = "og:image", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(rename = "og:image:type", skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,

    #[serde(rename = "og:image:width", skip_serializing_if = "Option::is_none")]
    pub image_width: Option<u32>,

    #[serde(rename = "og:image:height", skip_serializing_if = "Option::is_none")]
    pub image_height: Option<u32>,

    /// Byte size of the cached preview image.
    #[serde(rename = "matrix:image:size", skip_serializing_if = "Option::is_none")]
    pub image_size: Option<u64>,

    /// Remaining Open-Graph keys the server returned.
    #[serde(flatten)]
    pub extra: HashMap<String, Value>,
}

/// Optional parameters for a thumbnail request.
///
/// Only fields the caller sets are put on the wire; requested dimensions are
/// advisory and the server may return a differently sized rendition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailOptions {
    /// Desired width in pixels.
    pub width: Option<u32>,
    /// Desired height in pixels.
    pub height: Option<u32>,
    /// `"crop"` or `"scale"`; not validated here, the server is authoritative.
    pub resize_method: Option<String>,
    /// Whether the server may fetch the media from a remote homeserver if it
    /// does not already have it. `Some(false)` is sent as `allow_remote=false`;
    /// `None` leaves the key out entirely.
    pub allow_remote: Option<bool>,
}

impl ThumbnailOptions {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(width) = self.width {
            query.push(("width", width.to_string()));
        }
        if let Some(height) = self.height {
            query.push(("height", height.to_string()));
        }
        if let Some(method) = &self.resize_method {
            query.push(("resize_method", method.clone()));
        }
        if let Some(allow_remote) = self.allow_remote {
            query.push(("allow_remote", allow_remote.to_string()));
        }
        query
    }
}

/// Client for Matrix media repository operations
///
/// A stateless facade over [`MatrixHttpClient`] and an optional
/// [`MimeSniffer`]. Every operation is one independent request/response
/// exchange; instances are cheap to clone and safe to share across tasks.
#[derive(Clone)]
pub struct MediaClient {
    http_client: MatrixHttpClient,
    sniffer: Option<Arc<dyn MimeSniffer>>,
}

impl MediaClient {
    pub fn new(http_client: MatrixHttpClient) -> Self {
        Self {
            http_client,
            sniffer: None,
        }
    }

    /// Attach a content-type sniffer, used when an upload declares no type.
    pub fn with_sniffer(mut self, sniffer: Arc<dyn MimeSniffer>) -> Self {
        self.sniffer = Some(sniffer);
        self
    }

    /// The underlying transport.
    pub fn http_client(&self) -> &MatrixHttpClient {
        &self.http_client
    }

    /// Upload media to the homeserver.
    ///
    /// When `content_type` is `None` and a sniffer is attached, the type is
    /// inferred from the payload. When neither yields a type the request is
    /// sent without a `Content-Type` header.
    ///
    /// # Arguments
    /// * `data` - Binary media data
    /// * `content_type` - Declared MIME type, if the caller knows it
    /// * `filename` - Optional filename to associate with the upload
    ///
    /// # Returns
    /// * `Result<MxcUri, MediaClientError>` - mxc URI of the uploaded file
    ///
    /// Fails with `ResponseFormat` if the response lacks a usable
    /// `content_uri` field.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        content_type: Option<Mime>,
        filename: Option<&str>,
    ) -> Result<MxcUri, MediaClientError> {
        let content_type = content_type
            .or_else(|| self.sniffer.as_ref().and_then(|sniffer| sniffer.detect(&data)));

        let mut path = String::from("/_matrix/media/v3/upload");
        if let Some(name) = filename {
            let encoded = urlencoding::encode(name);
            path.push_str(&format!("?filename={}", encoded));
        }

        match &content_type {
            Some(mime) => debug!("Uploading {} bytes as {}", data.len(), mime),
            None => debug!("Uploading {} bytes without a content type", data.len()),
        }

        let response: MediaUploadResponse = self
            .http_client
            .post_bytes(&path, data, content_type.as_ref())
            .await?;

        MxcUri::parse(&response.content_uri).map_err(|_| {
            MediaClientError::ResponseFormat(format!(
                "invalid content_uri in upload response: {:?}",
                response.content_uri
            ))
        })
    }

    /// Download a media item's raw bytes.
    ///
    /// The content is opaque to this layer: no validation is performed on
    /// the payload, and the response stream is read to completion before
    /// returning.
    pub async fn download(&self, media: &MxcUri) -> Result<Vec<u8>, MediaClientError> {
        let url = self.http_client.resolve_fetch_url(media, FetchVariant::Raw)?;

        debug!("Downloading media {}", media);

        let response = self.http_client.open_stream(url, &[]).await?;
        let data = response.bytes().await?;
        Ok(data.to_vec())
    }

    /// Download a server-generated thumbnail of a media item.
    ///
    /// Exactly the parameters set in `options` appear in the query string.
    /// The returned rendition's dimensions may differ from the request.
    pub async fn download_thumbnail(
        &self,
        media: &MxcUri,
        options: &ThumbnailOptions,
    ) -> Result<Vec<u8>, MediaClientError> {
        let url = self
            .http_client
            .resolve_fetch_url(media, FetchVariant::Thumbnail)?;
        let query = options.query();

        debug!("Downloading thumbnail for {}", media);

        let response = self.http_client.open_stream(url, &query).await?;
        let data = response.bytes().await?;
        Ok(data.to_vec())
    }

    /// Get Open-Graph preview metadata for a URL.
    ///
    /// The homeserver fetches the target on the client's behalf. `ts` is the
    /// preferred point in time to return a preview for; when absent the key
    /// is omitted and the server picks.
    pub async fn get_url_preview(
        &self,
        url: &str,
        ts: Option<i64>,
    ) -> Result<UrlPreview, MediaClientError> {
        let mut query = vec![("url", url.to_string())];
        if let Some(ts) = ts {
            query.push(("ts", ts.to_string()));
        }

        debug!("Requesting URL preview for {}", url);

        self.http_client
            .request_json(Method::GET, "/_matrix/media/v3/preview_url", &query)
            .await
    }

    /// Get the server's advertised media repository configuration.
    ///
    /// Every field of the result is optional; an absent field means the
    /// caller should fall back to its own conservative default.
    pub async fn get_media_repo_config(&self) -> Result<MediaRepoConfig, MediaClientError> {
        self.http_client
            .request_json(Method::GET, "/_matrix/media/v3/config", &[])
            .await
    }
}

//! Matrix media repository client library
//!
//! Client bindings for the content repository subset of the Matrix
//! client-server API: uploading media, downloading media and thumbnails,
//! fetching URL previews, and discovering server-advertised media limits.
//! All remote media is proxied through the caller's own homeserver, so
//! third-party servers never learn the client's network address.
//!
//! ```no_run
//! use std::sync::Arc;
//! use matrix_media_client::{MagicSniffer, MatrixHttpClient, MediaClient, ThumbnailOptions};
//! use url::Url;
//!
//! # async fn run() -> Result<(), matrix_media_client::MediaClientError> {
//! let homeserver = Url::parse("https://matrix.example.com").unwrap();
//! let transport = MatrixHttpClient::new(homeserver)?;
//! transport.set_access_token("syt_access_token".to_string()).await;
//!
//! let media = MediaClient::new(transport).with_sniffer(Arc::new(MagicSniffer));
//!
//! let uri = media.upload(std::fs::read("avatar.png").unwrap(), None, None).await?;
//! let thumb = media
//!     .download_thumbnail(
//!         &uri,
//!         &ThumbnailOptions { width: Some(64), height: Some(64), ..Default::default() },
//!     )
//!     .await?;
//! # let _ = thumb;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod http_client;
pub mod media;
pub mod mxc;
pub mod sniff;

pub use error::MediaClientError;
pub use http_client::{ClientConfig, FetchVariant, MatrixHttpClient};
pub use media::{MediaClient, MediaRepoConfig, ThumbnailOptions, UrlPreview};
pub use mxc::MxcUri;
pub use sniff::{MagicSniffer, MimeSniffer};

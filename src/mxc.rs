//! mxc:// media identifiers

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::error::MediaClientError;

/// Opaque server-issued reference to an uploaded media item.
///
/// An mxc URI has the form `mxc://{server_name}/{media_id}`. The upload
/// operation produces one from the server response; download and thumbnail
/// operations consume it. The value is never interpreted beyond splitting it
/// into its server and media-id parts for URL construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MxcUri {
    server_name: String,
    media_id: String,
}

impl MxcUri {
    /// Parse an `mxc://server/mediaId` string.
    pub fn parse(uri: &str) -> Result<Self, MediaClientError> {
        let rest = uri.strip_prefix("mxc://").ok_or_else(|| {
            MediaClientError::InvalidMediaId(format!("missing mxc:// scheme in {:?}", uri))
        })?;

        let (server_name, media_id) = rest.split_once('/').ok_or_else(|| {
            MediaClientError::InvalidMediaId(format!("missing media id in {:?}", uri))
        })?;

        if server_name.is_empty() || media_id.is_empty() || media_id.contains('/') {
            return Err(MediaClientError::InvalidMediaId(format!(
                "malformed server name or media id in {:?}",
                uri
            )));
        }

        Ok(Self {
            server_name: server_name.to_string(),
            media_id: media_id.to_string(),
        })
    }

    /// The origin homeserver that issued this identifier.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// The server-local media id.
    pub fn media_id(&self) -> &str {
        &self.media_id
    }
}

impl fmt::Display for MxcUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mxc://{}/{}", self.server_name, self.media_id)
    }
}

impl FromStr for MxcUri {
    type Err = MediaClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MxcUri {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MxcUri {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_uri() {
        let uri = MxcUri::parse("mxc://example.org/abc123").unwrap();
        assert_eq!(uri.server_name(), "example.org");
        assert_eq!(uri.media_id(), "abc123");
        assert_eq!(uri.to_string(), "mxc://example.org/abc123");
    }

    #[test]
    fn keeps_port_in_server_name() {
        let uri = MxcUri::parse("mxc://example.org:8448/abc123").unwrap();
        assert_eq!(uri.server_name(), "example.org:8448");
    }

    #[test]
    fn rejects_wrong_scheme() {
        assert!(MxcUri::parse("https://example.org/abc123").is_err());
    }

    #[test]
    fn rejects_missing_media_id() {
        assert!(MxcUri::parse("mxc://example.org").is_err());
        assert!(MxcUri::parse("mxc://example.org/").is_err());
    }

    #[test]
    fn rejects_extra_path_segments() {
        assert!(MxcUri::parse("mxc://example.org/abc/def").is_err());
    }

    #[test]
    fn round_trips_through_serde() {
        let uri: MxcUri = serde_json::from_str("\"mxc://example.org/abc123\"").unwrap();
        assert_eq!(serde_json::to_string(&uri).unwrap(), "\"mxc://example.org/abc123\"");
    }
}

//! Content-type inference for uploads

use mime::Mime;

/// Capability for inferring a MIME type from raw bytes.
///
/// The media client uses this for uploads that declare no content type.
/// Absence of a sniffer is a valid configuration: such uploads simply go out
/// without a `Content-Type` header.
pub trait MimeSniffer: Send + Sync {
    /// Inspect a payload and return its MIME type, or `None` when the format
    /// is not recognized.
    fn detect(&self, data: &[u8]) -> Option<Mime>;
}

/// Magic-number sniffer covering the media formats commonly sent to a
/// Matrix homeserver.
#[derive(Debug, Clone, Copy, Default)]
pub struct MagicSniffer;

impl MimeSniffer for MagicSniffer {
    fn detect(&self, data: &[u8]) -> Option<Mime> {
        if data.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(mime::IMAGE_PNG)
        } else if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(mime::IMAGE_JPEG)
        } else if data.starts_with(b"GIF87a") || data.starts_with(b"GIF89a") {
            Some(mime::IMAGE_GIF)
        } else if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            "image/webp".parse().ok()
        } else if data.len() >= 12 && &data[4..8] == b"ftyp" {
            "video/mp4".parse().ok()
        } else if data.starts_with(b"OggS") {
            "audio/ogg".parse().ok()
        } else if data.starts_with(b"ID3") || data.starts_with(&[0xFF, 0xFB]) {
            "audio/mpeg".parse().ok()
        } else if data.starts_with(b"%PDF-") {
            Some(mime::APPLICATION_PDF)
        } else {
            None
        }
    }
}

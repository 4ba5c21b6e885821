//! Source and target encodings, and content sniffing.
//!
//! Sniffing looks only at the leading magic bytes of a buffer, never at the
//! filename or the declared content type. A script renamed to `cat.png` and
//! sent as `image/png` still sniffs as unknown.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::codec::CodecError;

/// MIME type reported when the magic bytes match no known image encoding.
pub const UNKNOWN_MIME: &str = "application/octet-stream";

/// An input encoding the codec can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Jpeg,
    Png,
    WebP,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 3] = [SourceFormat::Jpeg, SourceFormat::Png, SourceFormat::WebP];

    /// Canonical MIME type.
    pub fn mime(self) -> &'static str {
        match self {
            SourceFormat::Jpeg => "image/jpeg",
            SourceFormat::Png => "image/png",
            SourceFormat::WebP => "image/webp",
        }
    }

    /// File extensions conventionally used for this encoding.
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            SourceFormat::Jpeg => &["jpg", "jpeg"],
            SourceFormat::Png => &["png"],
            SourceFormat::WebP => &["webp"],
        }
    }

    /// Resolve a MIME type, accepting the non-standard `image/jpg` alias.
    pub fn from_mime(mime: &str) -> Result<Self, CodecError> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "image/jpeg" | "image/jpg" => Ok(SourceFormat::Jpeg),
            "image/png" => Ok(SourceFormat::Png),
            "image/webp" => Ok(SourceFormat::WebP),
            other => Err(CodecError::UnsupportedFormat(other.to_string())),
        }
    }

    /// Resolve a file extension (case-insensitive, without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extensions().contains(&ext.as_str()))
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            SourceFormat::Jpeg => image::ImageFormat::Jpeg,
            SourceFormat::Png => image::ImageFormat::Png,
            SourceFormat::WebP => image::ImageFormat::WebP,
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// The single encoding every derivative is written in.
///
/// Fixed for the lifetime of a deployment: changing it would orphan the
/// extension of every file already on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetFormat {
    #[default]
    WebP,
}

impl TargetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::WebP => "webp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            TargetFormat::WebP => "image/webp",
        }
    }

    /// The same encoding viewed as a decodable input, so a previously written
    /// derivative can be fed back through the pipeline.
    pub fn as_source(self) -> SourceFormat {
        match self {
            TargetFormat::WebP => SourceFormat::WebP,
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

/// What the magic bytes of a buffer say it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sniffed {
    /// MIME type of the detected encoding, or [`UNKNOWN_MIME`].
    pub mime: &'static str,
    /// Set when the detected encoding is one the codec decodes.
    pub format: Option<SourceFormat>,
}

/// Inspect the leading bytes of `data` to determine its actual encoding.
pub fn sniff(data: &[u8]) -> Sniffed {
    let Ok(detected) = image::guess_format(data) else {
        return Sniffed {
            mime: UNKNOWN_MIME,
            format: None,
        };
    };
    let format = SourceFormat::ALL
        .into_iter()
        .find(|f| f.image_format() == detected);
    Sniffed {
        mime: format.map_or_else(|| detected.to_mime_type(), SourceFormat::mime),
        format,
    }
}

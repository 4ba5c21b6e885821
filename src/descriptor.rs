//! Result types handed back to the boundary layer.
//!
//! [`ResultDescriptor`] is what a successful ingest produces; [`UploadResponse`]
//! wraps either outcome in the `{success, message, code, data}` envelope an
//! HTTP handler can serialize as-is.

use crate::identity::Identity;
use crate::imaging::{Dimensions, TargetFormat};
use crate::ingest::{IngestError, ReasonCode};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;

/// One value per derivative kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PerDerivative<T> {
    pub original: T,
    pub large: T,
    pub thumb: T,
}

/// Dimensions as measured after writing, or `unknown` if the probe failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DimensionsReport {
    Known(Dimensions),
    Unknown,
}

impl DimensionsReport {
    pub fn known(&self) -> Option<Dimensions> {
        match self {
            DimensionsReport::Known(d) => Some(*d),
            DimensionsReport::Unknown => None,
        }
    }
}

impl<E> From<Result<Dimensions, E>> for DimensionsReport {
    fn from(result: Result<Dimensions, E>) -> Self {
        result.map_or(DimensionsReport::Unknown, DimensionsReport::Known)
    }
}

impl fmt::Display for DimensionsReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimensionsReport::Known(d) => write!(f, "{d}"),
            DimensionsReport::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for DimensionsReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Everything the boundary layer needs to know about an accepted upload.
#[derive(Debug, Clone, Serialize)]
pub struct ResultDescriptor {
    pub id: Identity,
    pub paths: PerDerivative<PathBuf>,
    /// Public URLs, present when a `public_prefix` is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<PerDerivative<String>>,
    pub dimensions: PerDerivative<DimensionsReport>,
    /// Byte length of the uploaded payload.
    pub size: u64,
    /// Encoding of every derivative.
    #[serde(rename = "type", serialize_with = "serialize_mime")]
    pub target_format: TargetFormat,
    /// MIME type the upload actually sniffed as.
    #[serde(rename = "original_type")]
    pub source_mime: String,
    /// True when `large` is a verbatim copy of `original` because resizing failed.
    pub large_is_fallback_copy: bool,
}

fn serialize_mime<S: Serializer>(format: &TargetFormat, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(format.mime())
}

/// Serializable success-or-failure envelope.
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ReasonCode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResultDescriptor>,
}

impl UploadResponse {
    pub fn success(descriptor: ResultDescriptor) -> Self {
        let message = if descriptor.large_is_fallback_copy {
            format!(
                "Image uploaded and converted to {} (large version is a copy of the original)",
                descriptor.target_format.extension()
            )
        } else {
            format!(
                "Image uploaded and converted to {}",
                descriptor.target_format.extension()
            )
        };
        Self {
            success: true,
            message,
            code: None,
            data: Some(descriptor),
        }
    }

    pub fn failure(error: &IngestError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            code: Some(error.reason()),
            data: None,
        }
    }
}

impl From<Result<ResultDescriptor, IngestError>> for UploadResponse {
    fn from(result: Result<ResultDescriptor, IngestError>) -> Self {
        match result {
            Ok(descriptor) => Self::success(descriptor),
            Err(e) => Self::failure(&e),
        }
    }
}

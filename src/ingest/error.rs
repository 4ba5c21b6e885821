//! Failure taxonomy for one ingest request.
//!
//! Every failure is a value: a stable [`ReasonCode`] the boundary layer can
//! switch on, and a human-readable message (the error's `Display`). Nothing
//! here panics or aborts the process.

use super::request::TransferFailure;
use crate::imaging::CodecError;
use crate::storage::DerivativeKind;
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Stable machine-readable failure kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    NoFileSubmitted,
    TransportError,
    PayloadTooLarge,
    DisallowedExtension,
    DisallowedMimeType,
    MimeMismatch,
    NotAnImage,
    StorageUnavailable,
    OriginalConversionFailed,
    LargeDerivativeFailed,
    ThumbnailFailed,
    CodecUnavailable,
}

impl ReasonCode {
    /// True for rejections decided before anything touches the filesystem.
    pub fn is_validation(self) -> bool {
        matches!(
            self,
            ReasonCode::NoFileSubmitted
                | ReasonCode::TransportError
                | ReasonCode::PayloadTooLarge
                | ReasonCode::DisallowedExtension
                | ReasonCode::DisallowedMimeType
                | ReasonCode::MimeMismatch
                | ReasonCode::NotAnImage
        )
    }
}

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("No file was submitted")]
    NoFileSubmitted,
    #[error("Upload failed: {0}")]
    TransportError(TransferFailure),
    #[error("File is {size} bytes; the limit is {max} bytes")]
    PayloadTooLarge { size: u64, max: u64 },
    #[error("File type '{extension}' is not allowed (allowed: {allowed})")]
    DisallowedExtension { extension: String, allowed: String },
    #[error("Content type '{declared}' is not allowed")]
    DisallowedMimeType { declared: String },
    #[error("File content is '{sniffed}', not an allowed image type")]
    MimeMismatch { sniffed: String },
    #[error("File is not a valid image: {0}")]
    NotAnImage(#[source] CodecError),
    #[error("Storage unavailable at {}: {source}", path.display())]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to convert the original image: {0}")]
    OriginalConversionFailed(#[source] DerivativeError),
    #[error("Failed to create the large version, and copying the original also failed: {0}")]
    LargeDerivativeFailed(#[source] io::Error),
    #[error("Failed to create the thumbnail: {0}")]
    ThumbnailFailed(#[source] DerivativeError),
    #[error("Image library is not available: {0}")]
    CodecUnavailable(#[source] CodecError),
}

impl IngestError {
    pub fn reason(&self) -> ReasonCode {
        match self {
            IngestError::NoFileSubmitted => ReasonCode::NoFileSubmitted,
            IngestError::TransportError(_) => ReasonCode::TransportError,
            IngestError::PayloadTooLarge { .. } => ReasonCode::PayloadTooLarge,
            IngestError::DisallowedExtension { .. } => ReasonCode::DisallowedExtension,
            IngestError::DisallowedMimeType { .. } => ReasonCode::DisallowedMimeType,
            IngestError::MimeMismatch { .. } => ReasonCode::MimeMismatch,
            IngestError::NotAnImage(_) => ReasonCode::NotAnImage,
            IngestError::StorageUnavailable { .. } => ReasonCode::StorageUnavailable,
            IngestError::OriginalConversionFailed(_) => ReasonCode::OriginalConversionFailed,
            IngestError::LargeDerivativeFailed(_) => ReasonCode::LargeDerivativeFailed,
            IngestError::ThumbnailFailed(_) => ReasonCode::ThumbnailFailed,
            IngestError::CodecUnavailable(_) => ReasonCode::CodecUnavailable,
        }
    }
}

/// Why writing one derivative failed.
#[derive(Error, Debug)]
pub enum DerivativeError {
    #[error("{kind}: {source}")]
    Codec {
        kind: DerivativeKind,
        #[source]
        source: CodecError,
    },
    #[error("{kind}: cannot access {}: {source}", path.display())]
    Io {
        kind: DerivativeKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

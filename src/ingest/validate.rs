//! The validation chain.
//!
//! Seven checks, run in a fixed order; the first failure wins and nothing is
//! written to disk:
//!
//! 1. presence            → `NoFileSubmitted`
//! 2. transfer status     → `TransportError`
//! 3. payload size        → `PayloadTooLarge`
//! 4. filename extension  → `DisallowedExtension`
//! 5. declared MIME type  → `DisallowedMimeType`
//! 6. sniffed MIME type   → `MimeMismatch`
//! 7. real decode         → `NotAnImage`
//!
//! Steps 4 and 5 only look at what the client *claims*. Step 6 looks at the
//! bytes, so a renamed or mislabelled file is caught there no matter what
//! was declared, and step 7 catches files whose magic bytes are right but
//! whose body is not a decodable image.

use super::error::IngestError;
use super::request::{TransferStatus, UploadRequest};
use crate::config::IngestConfig;
use crate::imaging::{Canvas, ImageCodec, SourceFormat, sniff};

/// An upload that passed every check.
#[derive(Debug)]
pub struct AcceptedUpload {
    /// Encoding detected from the payload bytes.
    pub format: SourceFormat,
    /// MIME type detected from the payload bytes.
    pub sniffed_mime: String,
    /// The decoded source, produced by the decodability check.
    pub canvas: Canvas,
}

/// Run the full chain against `request`.
pub fn validate(
    request: &UploadRequest,
    config: &IngestConfig,
    codec: &impl ImageCodec,
) -> Result<AcceptedUpload, IngestError> {
    check_presence(request)?;
    check_transfer(request)?;
    check_size(request, config)?;
    check_extension(request, config)?;
    check_declared_mime(request, config)?;
    let format = check_sniffed_mime(request, config)?;
    let canvas = check_decodable(request, format, codec)?;
    Ok(AcceptedUpload {
        format,
        sniffed_mime: format.mime().to_string(),
        canvas,
    })
}

/// An empty payload from a completed transfer counts as no file. A failed
/// transfer may have dropped the body; it is reported by [`check_transfer`].
pub fn check_presence(request: &UploadRequest) -> Result<(), IngestError> {
    match request.transfer {
        TransferStatus::NoFile => Err(IngestError::NoFileSubmitted),
        TransferStatus::Complete if request.payload.is_empty() => {
            Err(IngestError::NoFileSubmitted)
        }
        _ => Ok(()),
    }
}

pub fn check_transfer(request: &UploadRequest) -> Result<(), IngestError> {
    match request.transfer {
        TransferStatus::Failed(failure) => Err(IngestError::TransportError(failure)),
        TransferStatus::Complete | TransferStatus::NoFile => Ok(()),
    }
}

pub fn check_size(request: &UploadRequest, config: &IngestConfig) -> Result<(), IngestError> {
    let size = request.byte_len();
    if size > config.max_upload_bytes {
        return Err(IngestError::PayloadTooLarge {
            size,
            max: config.max_upload_bytes,
        });
    }
    Ok(())
}

pub fn check_extension(request: &UploadRequest, config: &IngestConfig) -> Result<(), IngestError> {
    let extension = request.extension().unwrap_or_default();
    if !config.allows_extension(&extension) {
        return Err(IngestError::DisallowedExtension {
            extension,
            allowed: config.allowed_extensions.join(", "),
        });
    }
    Ok(())
}

pub fn check_declared_mime(
    request: &UploadRequest,
    config: &IngestConfig,
) -> Result<(), IngestError> {
    if !config.allows_mime(&request.content_type) {
        return Err(IngestError::DisallowedMimeType {
            declared: request.content_type.clone(),
        });
    }
    Ok(())
}

/// Returns the sniffed encoding when it is both allowed and decodable.
pub fn check_sniffed_mime(
    request: &UploadRequest,
    config: &IngestConfig,
) -> Result<SourceFormat, IngestError> {
    let sniffed = sniff(&request.payload);
    match sniffed.format {
        Some(format) if config.allows_mime(sniffed.mime) => Ok(format),
        _ => Err(IngestError::MimeMismatch {
            sniffed: sniffed.mime.to_string(),
        }),
    }
}

pub fn check_decodable(
    request: &UploadRequest,
    format: SourceFormat,
    codec: &impl ImageCodec,
) -> Result<Canvas, IngestError> {
    codec
        .decode(&request.payload, format)
        .map_err(IngestError::NotAnImage)
}

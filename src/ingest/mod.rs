//! Upload ingestion: validate one upload and write its three derivatives.
//!
//! ```text
//! UploadRequest
//!   → codec self-check                       (CodecUnavailable)
//!   → validation chain, see [`validate`]      (no side effects)
//!   → allocate Identity
//!   → ensure original/ large/ thumb/          (StorageUnavailable)
//!   → encode source @95 → original            (OriginalConversionFailed)
//!   → decode original, resize, encode @90 → large
//!        └─ on any failure: copy original → large   (LargeDerivativeFailed if the copy fails)
//!   → decode original, crop + resize, encode @85 → thumb   (ThumbnailFailed)
//!   → probe all three (failures reported as "unknown")
//!   → ResultDescriptor
//! ```
//!
//! Each call runs start to finish on the calling thread. The pipeline holds no
//! mutable state, so one instance can serve any number of concurrent callers;
//! every call owns its canvases and writes only under its own identity.
//!
//! Failures after the original is written leave it on disk unreported; removing
//! such orphans is left to external housekeeping.

pub mod error;
pub mod request;
pub mod validate;

pub use error::{DerivativeError, IngestError, ReasonCode};
pub use request::{TransferFailure, TransferStatus, UploadRequest};
pub use validate::AcceptedUpload;

use crate::config::IngestConfig;
use crate::descriptor::{DimensionsReport, PerDerivative, ResultDescriptor};
use crate::identity::Identity;
use crate::imaging::{Canvas, ImageCodec, Quality, RustCodec};
use crate::storage::{DerivativeKind, StorageLayout, write_new};
use std::fs;
use std::path::{Path, PathBuf};

/// Turns uploads into stored derivatives.
pub struct IngestPipeline<C: ImageCodec = RustCodec> {
    config: IngestConfig,
    layout: StorageLayout,
    codec: C,
}

impl IngestPipeline<RustCodec> {
    pub fn new(config: IngestConfig) -> Self {
        Self::with_codec(config, RustCodec::new())
    }
}

impl<C: ImageCodec> IngestPipeline<C> {
    /// Build a pipeline around a specific codec (allows testing with mock).
    pub fn with_codec(config: IngestConfig, codec: C) -> Self {
        let layout = StorageLayout::new(&config.storage_root, config.target_format);
        Self {
            config,
            layout,
            codec,
        }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    /// Ingest one upload.
    #[tracing::instrument(
        name = "ingest",
        skip_all,
        fields(filename = %request.filename, size = request.byte_len())
    )]
    pub fn ingest(&self, request: &UploadRequest) -> Result<ResultDescriptor, IngestError> {
        self.codec
            .check_available()
            .map_err(IngestError::CodecUnavailable)?;

        let accepted = validate::validate(request, &self.config, &self.codec).inspect_err(|e| {
            tracing::info!(reason = ?e.reason(), "upload rejected: {e}");
        })?;

        let identity = Identity::generate();
        tracing::debug!(%identity, source = %accepted.format, "upload accepted");

        self.prepare_storage()?;

        let paths = PerDerivative {
            original: self.layout.path(DerivativeKind::Original, &identity),
            large: self.layout.path(DerivativeKind::Large, &identity),
            thumb: self.layout.path(DerivativeKind::Thumb, &identity),
        };

        self.write_original(accepted.canvas, &paths.original)
            .map_err(IngestError::OriginalConversionFailed)?;

        let large_is_fallback_copy = match self.write_large(&paths.original, &paths.large) {
            Ok(()) => false,
            Err(e) => {
                tracing::warn!(%identity, error = %e, "large version failed, copying original");
                fs::copy(&paths.original, &paths.large)
                    .map_err(IngestError::LargeDerivativeFailed)?;
                true
            }
        };

        self.write_thumb(&paths.original, &paths.thumb)
            .map_err(IngestError::ThumbnailFailed)?;

        let dimensions = PerDerivative {
            original: self.probe(&paths.original),
            large: self.probe(&paths.large),
            thumb: self.probe(&paths.thumb),
        };

        tracing::info!(
            %identity,
            original = %dimensions.original,
            large = %dimensions.large,
            thumb = %dimensions.thumb,
            "upload stored"
        );

        Ok(ResultDescriptor {
            id: identity,
            urls: self.public_urls(&identity),
            paths,
            dimensions,
            size: request.byte_len(),
            target_format: self.config.target_format,
            source_mime: accepted.sniffed_mime,
            large_is_fallback_copy,
        })
    }

    fn prepare_storage(&self) -> Result<(), IngestError> {
        self.layout
            .ensure_directories()
            .map_err(|source| IngestError::StorageUnavailable {
                path: self.layout.root().to_path_buf(),
                source,
            })?;
        if self.config.access_guard {
            match self.layout.ensure_access_guard() {
                Ok(true) => tracing::info!(root = %self.layout.root().display(), "wrote access guard"),
                Ok(false) => {}
                Err(e) => tracing::warn!(
                    root = %self.layout.root().display(),
                    error = %e,
                    "could not write access guard"
                ),
            }
        }
        Ok(())
    }

    fn write_original(&self, source: Canvas, path: &Path) -> Result<(), DerivativeError> {
        let kind = DerivativeKind::Original;
        let bytes = self.encode(kind, &source, Quality::ORIGINAL)?;
        drop(source);
        persist(kind, path, &bytes)
    }

    fn write_large(&self, original: &Path, path: &Path) -> Result<(), DerivativeError> {
        let kind = DerivativeKind::Large;
        let canvas = self.load(kind, original)?;
        let resized = self
            .codec
            .resize_proportional(canvas, self.config.large_max_width)
            .map_err(|source| DerivativeError::Codec { kind, source })?;
        let bytes = self.encode(kind, &resized, Quality::LARGE)?;
        drop(resized);
        persist(kind, path, &bytes)
    }

    fn write_thumb(&self, original: &Path, path: &Path) -> Result<(), DerivativeError> {
        let kind = DerivativeKind::Thumb;
        let canvas = self.load(kind, original)?;
        let thumb = self
            .codec
            .crop_square_resize(&canvas, self.config.thumb_size)
            .map_err(|source| DerivativeError::Codec { kind, source })?;
        drop(canvas);
        let bytes = self.encode(kind, &thumb, Quality::THUMB)?;
        persist(kind, path, &bytes)
    }

    /// Decode a previously written derivative.
    fn load(&self, kind: DerivativeKind, path: &Path) -> Result<Canvas, DerivativeError> {
        let data = fs::read(path).map_err(|source| DerivativeError::Io {
            kind,
            path: path.to_path_buf(),
            source,
        })?;
        self.codec
            .decode(&data, self.config.target_format.as_source())
            .map_err(|source| DerivativeError::Codec { kind, source })
    }

    fn encode(
        &self,
        kind: DerivativeKind,
        canvas: &Canvas,
        quality: Quality,
    ) -> Result<Vec<u8>, DerivativeError> {
        self.codec
            .encode(canvas, self.config.target_format, quality)
            .map_err(|source| DerivativeError::Codec { kind, source })
    }

    fn probe(&self, path: &Path) -> DimensionsReport {
        let result = self.codec.probe_dimensions(path);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "dimension probe failed");
        }
        result.into()
    }

    fn public_urls(&self, identity: &Identity) -> Option<PerDerivative<String>> {
        let prefix = self.config.public_prefix.as_deref()?.trim_end_matches('/');
        let url = |kind| format!("{prefix}/{}", self.layout.relative_path(kind, identity));
        Some(PerDerivative {
            original: url(DerivativeKind::Original),
            large: url(DerivativeKind::Large),
            thumb: url(DerivativeKind::Thumb),
        })
    }
}

fn persist(kind: DerivativeKind, path: &Path, bytes: &[u8]) -> Result<(), DerivativeError> {
    write_new(path, bytes).map_err(|source| DerivativeError::Io {
        kind,
        path: PathBuf::from(path),
        source,
    })?;
    tracing::debug!(%kind, path = %path.display(), bytes = bytes.len(), "derivative written");
    Ok(())
}

//! Image codec trait and shared types.
//!
//! The [`ImageCodec`] trait is the whole surface the ingest pipeline sees:
//! decode, two geometric transforms, encode, and a header-only dimension
//! probe. Implementations are stateless and path-agnostic apart from
//! [`probe_dimensions`](ImageCodec::probe_dimensions); writing encoded bytes
//! to disk is the caller's job.
//!
//! The production implementation is
//! [`RustCodec`](super::rust_codec::RustCodec).

use super::format::{SourceFormat, TargetFormat};
use super::params::Quality;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to decode {format}: {reason}")]
    Decode {
        format: SourceFormat,
        reason: String,
    },
    #[error("Failed to encode {format}: {reason}")]
    Encode {
        format: TargetFormat,
        reason: String,
    },
    #[error("Invalid output dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("Failed to probe {path}: {reason}")]
    Probe { path: String, reason: String },
    #[error("Image codec unavailable: {0}")]
    Unavailable(String),
}

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A decoded in-memory bitmap.
///
/// A canvas is owned by the step that produced it and handed by value to the
/// step that consumes it; it is deliberately not `Clone`.
#[derive(Debug)]
pub struct Canvas {
    image: DynamicImage,
}

impl Canvas {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width(), self.height())
    }

    /// Whether the pixel layout carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn into_image(self) -> DynamicImage {
        self.image
    }
}

/// Decode / transform / encode operations used by the ingest pipeline.
///
/// `Sync` so a single codec can serve concurrent requests; implementations
/// must not hold per-request state.
pub trait ImageCodec: Sync {
    /// Verify the underlying image library is usable at all.
    fn check_available(&self) -> Result<(), CodecError>;

    /// Decode `data`, which must be encoded as `format`.
    fn decode(&self, data: &[u8], format: SourceFormat) -> Result<Canvas, CodecError>;

    /// Crop the largest centered square and resample it to `size × size`.
    fn crop_square_resize(&self, canvas: &Canvas, size: u32) -> Result<Canvas, CodecError>;

    /// Scale down to `max_width` preserving aspect ratio, or return the canvas
    /// untouched when it is already narrow enough.
    fn resize_proportional(&self, canvas: Canvas, max_width: u32) -> Result<Canvas, CodecError>;

    /// Encode a canvas as `format` at `quality`.
    fn encode(
        &self,
        canvas: &Canvas,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError>;

    /// Read an encoded file's dimensions, from its header where possible.
    fn probe_dimensions(&self, path: &Path) -> Result<Dimensions, CodecError>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::imaging::RustCodec;
    use std::sync::Mutex;

    /// Codec that delegates to [`RustCodec`], records every call, and fails
    /// the operations it is told to fail.
    #[derive(Default)]
    pub struct MockCodec {
        pub inner: RustCodec,
        pub unavailable: bool,
        pub fail_resize: bool,
        pub fail_crop: bool,
        pub fail_probe: bool,
        /// Fail `encode` calls made at exactly this quality.
        pub fail_encode_at: Option<Quality>,
        pub operations: Mutex<Vec<RecordedOp>>,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        CheckAvailable,
        Decode(SourceFormat),
        CropSquareResize { size: u32 },
        ResizeProportional { max_width: u32 },
        Encode { quality: u32 },
        Probe(String),
    }

    impl MockCodec {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing_resize() -> Self {
            Self {
                fail_resize: true,
                ..Self::default()
            }
        }

        pub fn failing_crop() -> Self {
            Self {
                fail_crop: true,
                ..Self::default()
            }
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }

        pub fn decode_count(&self) -> usize {
            self.get_operations()
                .iter()
                .filter(|op| matches!(op, RecordedOp::Decode(_)))
                .count()
        }

        fn record(&self, op: RecordedOp) {
            self.operations.lock().unwrap().push(op);
        }
    }

    impl ImageCodec for MockCodec {
        fn check_available(&self) -> Result<(), CodecError> {
            self.record(RecordedOp::CheckAvailable);
            if self.unavailable {
                return Err(CodecError::Unavailable("mock codec disabled".into()));
            }
            self.inner.check_available()
        }

        fn decode(&self, data: &[u8], format: SourceFormat) -> Result<Canvas, CodecError> {
            self.record(RecordedOp::Decode(format));
            self.inner.decode(data, format)
        }

        fn crop_square_resize(&self, canvas: &Canvas, size: u32) -> Result<Canvas, CodecError> {
            self.record(RecordedOp::CropSquareResize { size });
            if self.fail_crop {
                return Err(CodecError::InvalidDimensions {
                    width: size,
                    height: size,
                });
            }
            self.inner.crop_square_resize(canvas, size)
        }

        fn resize_proportional(
            &self,
            canvas: Canvas,
            max_width: u32,
        ) -> Result<Canvas, CodecError> {
            self.record(RecordedOp::ResizeProportional { max_width });
            if self.fail_resize {
                return Err(CodecError::InvalidDimensions {
                    width: max_width,
                    height: 0,
                });
            }
            self.inner.resize_proportional(canvas, max_width)
        }

        fn encode(
            &self,
            canvas: &Canvas,
            format: TargetFormat,
            quality: Quality,
        ) -> Result<Vec<u8>, CodecError> {
            self.record(RecordedOp::Encode {
                quality: quality.value(),
            });
            if self.fail_encode_at == Some(quality) {
                return Err(CodecError::Encode {
                    format,
                    reason: "mock encode failure".into(),
                });
            }
            self.inner.encode(canvas, format, quality)
        }

        fn probe_dimensions(&self, path: &Path) -> Result<Dimensions, CodecError> {
            self.record(RecordedOp::Probe(path.to_string_lossy().to_string()));
            if self.fail_probe {
                return Err(CodecError::Probe {
                    path: path.display().to_string(),
                    reason: "mock probe failure".into(),
                });
            }
            self.inner.probe_dimensions(path)
        }
    }

    #[test]
    fn dimensions_display_as_w_x_h() {
        assert_eq!(Dimensions::new(1600, 800).to_string(), "1600x800");
    }

    #[test]
    fn canvas_reports_alpha() {
        let rgb = Canvas::new(DynamicImage::new_rgb8(3, 2));
        let rgba = Canvas::new(DynamicImage::new_rgba8(3, 2));
        assert!(!rgb.has_alpha());
        assert!(rgba.has_alpha());
        assert_eq!(rgb.dimensions(), Dimensions::new(3, 2));
    }

    #[test]
    fn mock_records_and_fails_resize() {
        let codec = MockCodec::failing_resize();
        let canvas = Canvas::new(DynamicImage::new_rgb8(4000, 10));
        assert!(codec.resize_proportional(canvas, 1600).is_err());
        assert_eq!(
            codec.get_operations(),
            vec![RecordedOp::ResizeProportional { max_width: 1600 }]
        );
    }

    #[test]
    fn mock_delegates_crop() {
        let codec = MockCodec::new();
        let canvas = Canvas::new(DynamicImage::new_rgb8(40, 20));
        let thumb = codec.crop_square_resize(&canvas, 8).unwrap();
        assert_eq!(thumb.dimensions(), Dimensions::new(8, 8));
    }
}

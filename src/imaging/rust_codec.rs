//! Pure Rust decode/resample path plus libwebp for lossy output.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, WebP) | `image::load_from_memory_with_format` |
//! | Center crop | `DynamicImage::crop_imm` |
//! | Resample | `image::imageops` with the `Triangle` (bilinear) filter |
//! | Encode → WebP (lossy) | `webp::Encoder` |
//! | Probe | `image::image_dimensions` (header only) |
//!
//! The `image` crate's own WebP encoder only writes lossless files, which are
//! several times larger than lossy ones for photographs, so encoding goes
//! through libwebp via the `webp` crate.

use super::calculations::{center_square, proportional_size};
use super::codec::{Canvas, CodecError, Dimensions, ImageCodec};
use super::format::{SourceFormat, TargetFormat};
use super::params::Quality;
use image::DynamicImage;
use image::imageops::FilterType;
use std::path::Path;
use std::sync::LazyLock;

const FILTER: FilterType = FilterType::Triangle;

/// Result of the one-time encode→decode self check.
static SELF_CHECK: LazyLock<Result<(), String>> = LazyLock::new(|| {
    let probe = Canvas::new(DynamicImage::new_rgba8(2, 2));
    let encoded = encode_webp(&probe, Quality::THUMB).map_err(|e| e.to_string())?;
    image::load_from_memory_with_format(&encoded, image::ImageFormat::WebP)
        .map(|_| ())
        .map_err(|e| format!("WebP decoder rejected its own output: {e}"))
});

/// Codec backed by the `image` and `webp` crates.
///
/// See the [module docs](self) for the crate-to-operation mapping.
#[derive(Debug, Default, Clone, Copy)]
pub struct RustCodec;

impl RustCodec {
    pub fn new() -> Self {
        Self
    }
}

fn encode_webp(canvas: &Canvas, quality: Quality) -> Result<Vec<u8>, CodecError> {
    let (width, height) = (canvas.width(), canvas.height());
    let encode_failed = |reason: String| CodecError::Encode {
        format: TargetFormat::WebP,
        reason,
    };

    // Opaque sources stay opaque: only canvases that already carry alpha are
    // encoded with an alpha plane.
    let encoded = if canvas.has_alpha() {
        let rgba = canvas.as_image().to_rgba8();
        webp::Encoder::from_rgba(rgba.as_raw(), width, height)
            .encode_simple(false, quality.as_factor())
            .map_err(|e| encode_failed(format!("{e:?}")))?
    } else {
        let rgb = canvas.as_image().to_rgb8();
        webp::Encoder::from_rgb(rgb.as_raw(), width, height)
            .encode_simple(false, quality.as_factor())
            .map_err(|e| encode_failed(format!("{e:?}")))?
    };
    Ok(encoded.to_vec())
}

impl ImageCodec for RustCodec {
    fn check_available(&self) -> Result<(), CodecError> {
        SELF_CHECK
            .as_ref()
            .map(|_| ())
            .map_err(|reason| CodecError::Unavailable(reason.clone()))
    }

    fn decode(&self, data: &[u8], format: SourceFormat) -> Result<Canvas, CodecError> {
        image::load_from_memory_with_format(data, format.image_format())
            .map(Canvas::new)
            .map_err(|e| CodecError::Decode {
                format,
                reason: e.to_string(),
            })
    }

    fn crop_square_resize(&self, canvas: &Canvas, size: u32) -> Result<Canvas, CodecError> {
        if size == 0 || canvas.width() == 0 || canvas.height() == 0 {
            return Err(CodecError::InvalidDimensions {
                width: size,
                height: size,
            });
        }
        let region = center_square(canvas.width(), canvas.height());
        let square = canvas
            .as_image()
            .crop_imm(region.x, region.y, region.width, region.height);
        Ok(Canvas::new(square.resize_exact(size, size, FILTER)))
    }

    fn resize_proportional(&self, canvas: Canvas, max_width: u32) -> Result<Canvas, CodecError> {
        let Some((width, height)) = proportional_size((canvas.width(), canvas.height()), max_width)
        else {
            return Ok(canvas);
        };
        if width == 0 || height == 0 {
            return Err(CodecError::InvalidDimensions { width, height });
        }
        let resized = canvas.as_image().resize_exact(width, height, FILTER);
        Ok(Canvas::new(resized))
    }

    fn encode(
        &self,
        canvas: &Canvas,
        format: TargetFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, CodecError> {
        match format {
            TargetFormat::WebP => encode_webp(canvas, quality),
        }
    }

    fn probe_dimensions(&self, path: &Path) -> Result<Dimensions, CodecError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| CodecError::Probe {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Dimensions { width, height })
    }
}

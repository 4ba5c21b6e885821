//! Shared test utilities: in-memory image fixtures and filesystem counters.
//!
//! Fixtures are generated rather than checked in, so every test states the
//! exact dimensions it cares about.
//!
//! ```ignore
//! use crate::test_helpers::*;
//!
//! let req = UploadRequest::new(png_bytes(500, 500), "a.png", "image/png");
//! ```

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Image fixtures
// =========================================================================

/// Opaque gradient so encoders can't collapse the image to a single color.
fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    })
}

fn encode(image: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Png)
}

/// PNG where every pixel is half transparent.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 200, 128])
    });
    encode(DynamicImage::ImageRgba8(image), ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::Jpeg)
}

/// Lossless WebP, as written by the `image` crate's own encoder.
pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(DynamicImage::ImageRgb8(gradient(width, height)), ImageFormat::WebP)
}

// =========================================================================
// Filesystem
// =========================================================================

/// Number of regular files directly inside `dir`; zero if it doesn't exist.
pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.path().is_file())
                .count()
        })
        .unwrap_or(0)
}

//! Image codec: decode, center-crop, proportional resize, encode, probe.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Sniff** | `image::guess_format` (magic bytes) |
//! | **Decode** | `image` (JPEG, PNG, WebP) |
//! | **Crop + resample** | `crop_imm` + bilinear `resize_exact` |
//! | **Encode → WebP** | `webp` (libwebp, lossy) |
//! | **Probe** | `image::image_dimensions` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for crop and resize geometry (unit testable)
//! - **Parameters**: Quality operating points
//! - **Format**: Source/target encodings and content sniffing
//! - **Codec**: [`ImageCodec`] trait + [`RustCodec`]
//!
//! Nothing in here touches the filesystem except the dimension probe, and
//! nothing in here logs.

pub mod calculations;
pub mod codec;
pub mod format;
mod params;
pub mod rust_codec;

pub use codec::{Canvas, CodecError, Dimensions, ImageCodec};
pub use format::{SourceFormat, Sniffed, TargetFormat, sniff};
pub use params::Quality;
pub use rust_codec::RustCodec;

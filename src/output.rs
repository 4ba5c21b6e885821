//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Ingest
//!
//! ```text
//! 001 photos/beach.jpg → img_0190a8c4e5f37c2a9d41b6e8f0a3c5d7
//!     original: uploads/original/img_0190a8c4e5f37c2a9d41b6e8f0a3c5d7.webp (3200x1600)
//!     large: uploads/large/img_0190a8c4e5f37c2a9d41b6e8f0a3c5d7.webp (1600x800)
//!     thumb: uploads/thumb/img_0190a8c4e5f37c2a9d41b6e8f0a3c5d7.webp (300x300)
//! 002 notes/cat.png
//!     rejected (mime_mismatch): File content is 'application/octet-stream', not an allowed image type
//!
//! Stored 1 upload, rejected 1
//! ```
//!
//! ## Check
//!
//! ```text
//! Storage: uploads (writable)
//! Codec: available
//! Limits
//!     max upload: 2097152 bytes
//!     extensions: jpg, jpeg, png, webp
//!     mime types: image/jpeg, image/jpg, image/png, image/webp
//! Derivatives
//!     original: webp @95
//!     large: webp @90, max width 1600
//!     thumb: webp @85, 300x300
//! ```

use crate::config::IngestConfig;
use crate::descriptor::ResultDescriptor;
use crate::imaging::{CodecError, Quality};
use crate::ingest::IngestError;
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

// ============================================================================
// Ingest
// ============================================================================

/// Format the outcome of ingesting one file.
pub fn format_ingest_result(
    index: usize,
    source: &Path,
    result: &Result<ResultDescriptor, IngestError>,
) -> Vec<String> {
    let header = format!("{} {}", format_index(index), source.display());
    match result {
        Ok(descriptor) => {
            let mut lines = vec![format!("{header} → {}", descriptor.id)];
            let d = &descriptor.dimensions;
            let p = &descriptor.paths;
            lines.push(format!(
                "{}original: {} ({})",
                indent(1),
                p.original.display(),
                d.original
            ));
            let fallback = if descriptor.large_is_fallback_copy {
                ", copy of original"
            } else {
                ""
            };
            lines.push(format!(
                "{}large: {} ({}{fallback})",
                indent(1),
                p.large.display(),
                d.large
            ));
            lines.push(format!("{}thumb: {} ({})", indent(1), p.thumb.display(), d.thumb));
            lines
        }
        Err(e) => {
            let code = serde_json::to_value(e.reason())
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();
            vec![header, format!("{}rejected ({code}): {e}", indent(1))]
        }
    }
}

pub fn format_ingest_summary(stored: usize, rejected: usize) -> String {
    format!("Stored {}, rejected {rejected}", plural(stored, "upload"))
}

pub fn print_ingest_result(
    index: usize,
    source: &Path,
    result: &Result<ResultDescriptor, IngestError>,
) {
    for line in format_ingest_result(index, source, result) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the `check` report: storage, codec health and effective settings.
pub fn format_check_output(
    config: &IngestConfig,
    storage: &Result<(), std::io::Error>,
    codec: &Result<(), CodecError>,
) -> Vec<String> {
    let format = config.target_format.extension();
    let mut lines = Vec::new();
    match storage {
        Ok(()) => lines.push(format!(
            "Storage: {} (writable)",
            config.storage_root.display()
        )),
        Err(e) => lines.push(format!(
            "Storage: {} (unavailable: {e})",
            config.storage_root.display()
        )),
    }
    match codec {
        Ok(()) => lines.push("Codec: available".to_string()),
        Err(e) => lines.push(format!("Codec: unavailable ({e})")),
    }
    lines.push("Limits".to_string());
    lines.push(format!(
        "{}max upload: {} bytes",
        indent(1),
        config.max_upload_bytes
    ));
    lines.push(format!(
        "{}extensions: {}",
        indent(1),
        config.allowed_extensions.join(", ")
    ));
    lines.push(format!(
        "{}mime types: {}",
        indent(1),
        config.allowed_mime_types.join(", ")
    ));
    lines.push("Derivatives".to_string());
    lines.push(format!(
        "{}original: {format} @{}",
        indent(1),
        Quality::ORIGINAL.value()
    ));
    lines.push(format!(
        "{}large: {format} @{}, max width {}",
        indent(1),
        Quality::LARGE.value(),
        config.large_max_width
    ));
    lines.push(format!(
        "{}thumb: {format} @{}, {size}x{size}",
        indent(1),
        Quality::THUMB.value(),
        size = config.thumb_size
    ));
    if let Some(prefix) = &config.public_prefix {
        lines.push(format!("Public prefix: {prefix}"));
    }
    lines
}

pub fn print_check_output(
    config: &IngestConfig,
    storage: &Result<(), std::io::Error>,
    codec: &Result<(), CodecError>,
) {
    for line in format_check_output(config, storage, codec) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{DimensionsReport, PerDerivative};
    use crate::identity::Identity;
    use crate::imaging::{Dimensions, TargetFormat};
    use crate::ingest::TransferFailure;
    use std::path::PathBuf;

    fn descriptor(fallback: bool) -> ResultDescriptor {
        let id = Identity::generate();
        let path = |dir: &str| PathBuf::from(format!("uploads/{dir}/{id}.webp"));
        ResultDescriptor {
            id,
            paths: PerDerivative {
                original: path("original"),
                large: path("large"),
                thumb: path("thumb"),
            },
            urls: None,
            dimensions: PerDerivative {
                original: DimensionsReport::Known(Dimensions::new(3200, 1600)),
                large: DimensionsReport::Known(Dimensions::new(1600, 800)),
                thumb: DimensionsReport::Unknown,
            },
            size: 42,
            target_format: TargetFormat::WebP,
            source_mime: "image/jpeg".into(),
            large_is_fallback_copy: fallback,
        }
    }

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(123), "123");
    }

    #[test]
    fn stored_result_lists_derivatives() {
        let d = descriptor(false);
        let id = d.id;
        let lines = format_ingest_result(1, Path::new("beach.jpg"), &Ok(d));
        assert_eq!(lines[0], format!("001 beach.jpg → {id}"));
        assert_eq!(
            lines[2],
            format!("    large: uploads/large/{id}.webp (1600x800)")
        );
        assert_eq!(
            lines[3],
            format!("    thumb: uploads/thumb/{id}.webp (unknown)")
        );
    }

    #[test]
    fn fallback_copy_is_marked() {
        let lines = format_ingest_result(1, Path::new("a.png"), &Ok(descriptor(true)));
        assert!(lines[2].ends_with("(1600x800, copy of original)"));
    }

    #[test]
    fn rejected_result_shows_code_and_message() {
        let err = IngestError::TransportError(TransferFailure::Partial);
        let lines = format_ingest_result(2, Path::new("a.png"), &Err(err));
        assert_eq!(
            lines,
            vec![
                "002 a.png".to_string(),
                "    rejected (transport_error): Upload failed: file was only partially uploaded"
                    .to_string(),
            ]
        );
    }

    #[test]
    fn summary_pluralizes() {
        assert_eq!(format_ingest_summary(1, 0), "Stored 1 upload, rejected 0");
        assert_eq!(format_ingest_summary(3, 2), "Stored 3 uploads, rejected 2");
    }

    #[test]
    fn check_output_reports_settings() {
        let config = IngestConfig::default();
        let lines = format_check_output(&config, &Ok(()), &Ok(()));
        assert_eq!(lines[0], "Storage: uploads (writable)");
        assert_eq!(lines[1], "Codec: available");
        assert!(lines.contains(&"    thumb: webp @85, 300x300".to_string()));
        assert!(lines.contains(&"    large: webp @90, max width 1600".to_string()));
    }

    #[test]
    fn check_output_reports_codec_failure() {
        let config = IngestConfig::default();
        let codec = Err(CodecError::Unavailable("no encoder".into()));
        let lines = format_check_output(&config, &Ok(()), &codec);
        assert!(lines[1].starts_with("Codec: unavailable"));
    }
}

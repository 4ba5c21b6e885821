//! Encoding quality for lossy output.
//!
//! The pipeline encodes at three fixed operating points rather than exposing
//! quality as configuration:
//!
//! | Derivative | Quality | Used for |
//! |---|---|---|
//! | original | 95 | full-resolution archive copy, fidelity first |
//! | large | 90 | display size, still visually lossless |
//! | thumb | 85 | grid tiles, size matters more than detail |

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(u32);

impl Quality {
    /// Full-resolution conversion of the uploaded source.
    pub const ORIGINAL: Quality = Quality(95);
    /// Proportionally resized display version.
    pub const LARGE: Quality = Quality(90);
    /// Center-cropped square thumbnail.
    pub const THUMB: Quality = Quality(85);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the float factor libwebp expects.
    pub fn as_factor(self) -> f32 {
        self.0 as f32
    }
}

//! Pure calculation functions for image geometry.
//!
//! All functions here are pure and testable without any I/O or images.

/// A rectangular region of a source image, in source pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Calculate the largest centered square inside a `width × height` source.
///
/// The square's side is `min(width, height)`; offsets use integer division,
/// so an odd leftover pixel ends up on the right (or bottom) edge.
///
/// # Examples
/// ```
/// # use image_ingest::imaging::calculations::center_square;
/// let region = center_square(3200, 1600);
/// assert_eq!((region.x, region.y, region.width), (800, 0, 1600));
/// ```
pub fn center_square(width: u32, height: u32) -> CropRegion {
    let extent = width.min(height);
    CropRegion {
        x: (width - extent) / 2,
        y: (height - extent) / 2,
        width: extent,
        height: extent,
    }
}

/// Calculate the output size for a width-bounded proportional resize.
///
/// Returns `None` when the source already fits (`width <= max_width`), in
/// which case the caller keeps the source dimensions. Otherwise the width
/// becomes `max_width` and the height is `floor(height × max_width / width)`
/// with no further rounding correction.
///
/// # Examples
/// ```
/// # use image_ingest::imaging::calculations::proportional_size;
/// assert_eq!(proportional_size((3200, 1600), 1600), Some((1600, 800)));
/// assert_eq!(proportional_size((500, 500), 1600), None);
/// ```
pub fn proportional_size(source: (u32, u32), max_width: u32) -> Option<(u32, u32)> {
    let (width, height) = source;
    if width <= max_width {
        return None;
    }
    // u64 so height × max_width cannot overflow.
    let new_height = (u64::from(height) * u64::from(max_width) / u64::from(width)) as u32;
    Some((max_width, new_height))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // center_square tests
    // =========================================================================

    #[test]
    fn square_source_is_not_offset() {
        assert_eq!(
            center_square(500, 500),
            CropRegion {
                x: 0,
                y: 0,
                width: 500,
                height: 500
            }
        );
    }

    #[test]
    fn landscape_offsets_horizontally() {
        let r = center_square(800, 600);
        assert_eq!((r.x, r.y), (100, 0));
        assert_eq!((r.width, r.height), (600, 600));
    }

    #[test]
    fn portrait_offsets_vertically() {
        let r = center_square(600, 800);
        assert_eq!((r.x, r.y), (0, 100));
        assert_eq!(r.width, 600);
    }

    #[test]
    fn odd_difference_truncates_toward_zero() {
        // (801 - 600) / 2 = 100.5 → 100
        let r = center_square(801, 600);
        assert_eq!(r.x, 100);
        let r = center_square(600, 803);
        assert_eq!(r.y, 101);
    }

    #[test]
    fn one_pixel_wide_strip() {
        let r = center_square(1, 1000);
        assert_eq!((r.x, r.y, r.width), (0, 499, 1));
    }

    // =========================================================================
    // proportional_size tests
    // =========================================================================

    #[test]
    fn narrower_source_is_left_alone() {
        assert_eq!(proportional_size((500, 500), 1600), None);
    }

    #[test]
    fn exactly_max_width_is_left_alone() {
        assert_eq!(proportional_size((1600, 1200), 1600), None);
    }

    #[test]
    fn wide_source_halves() {
        assert_eq!(proportional_size((3200, 1600), 1600), Some((1600, 800)));
    }

    #[test]
    fn height_is_floored() {
        // 1000 * 1600 / 3000 = 533.33 → 533
        assert_eq!(proportional_size((3000, 1000), 1600), Some((1600, 533)));
        // 999 * 1600 / 1601 = 998.37 → 998
        assert_eq!(proportional_size((1601, 999), 1600), Some((1600, 998)));
    }

    #[test]
    fn extreme_panorama_can_floor_to_zero() {
        assert_eq!(proportional_size((10_000, 1), 1600), Some((1600, 0)));
    }
}

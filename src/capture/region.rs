//! Pure region copying logic, the functional core.
//!
//! This module has zero infrastructure dependencies.
//! It takes pixel data in, returns pixel data out.

use super::{CaptureError, Rect};
use image::{imageops, RgbaImage};

/// Copies `rect` (virtual-desktop coordinates) out of a screen snapshot.
///
/// `source` is a snapshot whose top-left pixel sits at
/// (`source_left`, `source_top`) on the virtual desktop. The result is
/// always exactly `rect.width` x `rect.height`; pixels of `rect` that the
/// snapshot does not cover are left transparent black.
///
/// # Arguments
/// * `source` - The monitor snapshot
/// * `source_left` - Desktop x of the snapshot's left edge
/// * `source_top` - Desktop y of the snapshot's top edge
/// * `rect` - The region to extract
pub fn copy_region(
    source: &RgbaImage,
    source_left: i32,
    source_top: i32,
    rect: Rect,
) -> Result<RgbaImage, CaptureError> {
    if rect.is_empty() {
        return Err(CaptureError::EmptyRegion(rect));
    }

    let mut out = RgbaImage::new(rect.width as u32, rect.height as u32);

    let source_rect = Rect::new(
        source_left,
        source_top,
        source.width() as i32,
        source.height() as i32,
    );
    let Some(overlap) = rect.intersection(&source_rect) else {
        return Ok(out);
    };

    let piece = imageops::crop_imm(
        source,
        (overlap.left - source_left) as u32,
        (overlap.top - source_top) as u32,
        overlap.width as u32,
        overlap.height as u32,
    )
    .to_image();

    imageops::replace(
        &mut out,
        &piece,
        (overlap.left - rect.left) as i64,
        (overlap.top - rect.top) as i64,
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn red_screen(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_pixel(width, height, RED)
    }

    #[test]
    fn copy_region_inside_snapshot() {
        let screen = red_screen(100, 100);
        let out = copy_region(&screen, 0, 0, Rect::new(10, 10, 50, 40)).unwrap();
        assert_eq!(out.dimensions(), (50, 40));
        assert!(out.pixels().all(|p| *p == RED));
    }

    #[test]
    fn copy_region_honours_snapshot_origin() {
        // Second monitor to the right of a 1920px primary.
        let screen = red_screen(100, 100);
        let out = copy_region(&screen, 1920, 0, Rect::new(1950, 20, 10, 10)).unwrap();
        assert!(out.pixels().all(|p| *p == RED));
    }

    #[test]
    fn uncovered_pixels_stay_clear() {
        let screen = red_screen(100, 100);
        // Window hanging 20px off the left edge of the snapshot.
        let out = copy_region(&screen, 0, 0, Rect::new(-20, 0, 40, 10)).unwrap();
        assert_eq!(out.dimensions(), (40, 10));
        assert_eq!(*out.get_pixel(0, 0), CLEAR);
        assert_eq!(*out.get_pixel(19, 9), CLEAR);
        assert_eq!(*out.get_pixel(20, 0), RED);
        assert_eq!(*out.get_pixel(39, 9), RED);
    }

    #[test]
    fn disjoint_region_is_blank_but_sized() {
        let screen = red_screen(100, 100);
        let out = copy_region(&screen, 0, 0, Rect::new(500, 500, 8, 6)).unwrap();
        assert_eq!(out.dimensions(), (8, 6));
        assert!(out.pixels().all(|p| *p == CLEAR));
    }

    #[test]
    fn zero_dimension_fails() {
        let screen = red_screen(100, 100);
        let result = copy_region(&screen, 0, 0, Rect::new(0, 0, 0, 50));
        assert!(matches!(result, Err(CaptureError::EmptyRegion(_))));
    }
}

//! Drawing of point markers onto the image buffer.
//!
//! Markers are burned into the pixels of the image itself, so the saved
//! annotated image shows them without any overlay format.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::{Rgba, RgbaImage};

use crate::config::MarkerConfig;

/// Width and height of one glyph of the bitmap font at scale 1.
const GLYPH_SIZE: i64 = 8;

/// Draw the cross and label of a point at original-pixel coordinates.
pub fn draw_marker(img: &mut RgbaImage, x: f64, y: f64, label: &str, style: &MarkerConfig) {
    // Truncation matches how the point maps onto a pixel when recorded.
    let (px, py) = (x.trunc() as i64, y.trunc() as i64);
    let color = Rgba([style.color[0], style.color[1], style.color[2], 255]);

    draw_cross(img, px, py, i64::from(style.half_size), color);
    draw_text(
        img,
        px + i64::from(style.label_offset.0),
        py + i64::from(style.label_offset.1),
        label,
        i64::from(style.label_scale.max(1)),
        color,
    );
}

/// Cross with arms `x-h ..= x+h-1` and `y-h ..= y+h-1`, clipped to the image.
pub fn draw_cross(img: &mut RgbaImage, x: i64, y: i64, half_size: i64, color: Rgba<u8>) {
    for i in (x - half_size)..(x + half_size) {
        put_clipped(img, i, y, color);
    }
    for j in (y - half_size)..(y + half_size) {
        put_clipped(img, x, j, color);
    }
}

/// Render `text` with the 8x8 bitmap font, top-left corner at `(x, y)`.
///
/// Characters without a glyph are drawn as `?`.
pub fn draw_text(img: &mut RgbaImage, x: i64, y: i64, text: &str, scale: i64, color: Rgba<u8>) {
    let mut cursor_x = x;
    for ch in text.chars() {
        let Some(glyph) = BASIC_FONTS.get(ch).or_else(|| BASIC_FONTS.get('?')) else {
            cursor_x += GLYPH_SIZE * scale;
            continue;
        };
        for (row_idx, row_bits) in glyph.into_iter().enumerate() {
            for col_idx in 0..GLYPH_SIZE {
                if (row_bits >> col_idx) & 1 == 0 {
                    continue;
                }
                let gx = cursor_x + col_idx * scale;
                let gy = y + row_idx as i64 * scale;
                for sy in 0..scale {
                    for sx in 0..scale {
                        put_clipped(img, gx + sx, gy + sy, color);
                    }
                }
            }
        }
        cursor_x += GLYPH_SIZE * scale;
    }
}

fn put_clipped(img: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    img.put_pixel(x as u32, y as u32, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn blank(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_pixel(w, h, BLACK)
    }

    fn count(img: &RgbaImage, color: Rgba<u8>) -> usize {
        img.pixels().filter(|p| **p == color).count()
    }

    #[test]
    fn test_cross_arms() {
        let mut img = blank(40, 40);
        draw_cross(&mut img, 20, 20, 5, RED);

        assert_eq!(*img.get_pixel(15, 20), RED);
        assert_eq!(*img.get_pixel(24, 20), RED);
        assert_eq!(*img.get_pixel(25, 20), BLACK);
        assert_eq!(*img.get_pixel(20, 15), RED);
        assert_eq!(*img.get_pixel(20, 24), RED);
        assert_eq!(*img.get_pixel(20, 25), BLACK);
        // 10 + 10 pixels, centre shared
        assert_eq!(count(&img, RED), 19);
    }

    #[test]
    fn test_cross_is_clipped_at_corner() {
        let mut img = blank(10, 10);
        draw_cross(&mut img, 0, 0, 5, RED);
        assert_eq!(*img.get_pixel(0, 0), RED);
        assert_eq!(*img.get_pixel(4, 0), RED);
        assert_eq!(*img.get_pixel(0, 4), RED);
        assert_eq!(count(&img, RED), 9);
    }

    #[test]
    fn test_text_draws_inside_its_box() {
        let mut img = blank(64, 32);
        draw_text(&mut img, 4, 4, "A", 2, RED);

        let painted: Vec<(u32, u32)> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == RED)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!painted.is_empty());
        assert!(painted.iter().all(|&(x, y)| (4..20).contains(&x) && (4..20).contains(&y)));
    }

    #[test]
    fn test_text_off_image_does_not_panic() {
        let mut img = blank(8, 8);
        draw_text(&mut img, -100, -100, "offscreen", 3, RED);
        draw_text(&mut img, 6, 6, "W", 4, RED);
        assert_eq!(*img.get_pixel(0, 0), BLACK);
    }

    #[test]
    fn test_marker_truncates_to_pixel() {
        let mut img = blank(50, 50);
        let style = MarkerConfig::default();
        draw_marker(&mut img, 25.9, 25.2, "", &style);
        assert_eq!(*img.get_pixel(25, 25), RED);
        assert_eq!(*img.get_pixel(20, 25), RED);
        assert_eq!(*img.get_pixel(25, 20), RED);
    }
}

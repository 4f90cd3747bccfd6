//! Stroke rasterization and image encoding
//!
//! Pure functions from a stroke buffer to a raster image. The bitmap is one
//! grayscale byte per pixel (255 ground, 0 ink); the encoded payload is an
//! uncompressed 24-bit BMP wrapped in a base64 data URL, matching what the
//! persistence layer stores for drawn signatures.

use crate::drawn::{Point, Stroke};
use base64::Engine;

/// Ink value written for signature pixels
const INK: u8 = 0;
/// Background value for untouched pixels
const GROUND: u8 = 255;

/// Rasterize completed strokes into a `width * height` grayscale buffer.
///
/// Consecutive points within a stroke are joined with line segments;
/// out-of-bounds coordinates are clamped to the canvas edge so a stray
/// pointer event cannot corrupt adjacent memory or be lost entirely.
pub fn rasterize(strokes: &[Stroke], width: u32, height: u32) -> Vec<u8> {
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let mut bitmap = vec![GROUND; (width as usize) * (height as usize)];

    for stroke in strokes {
        match stroke.points.as_slice() {
            [] => {}
            [only] => plot(&mut bitmap, width, height, *only),
            points => {
                for pair in points.windows(2) {
                    draw_segment(&mut bitmap, width, height, pair[0], pair[1]);
                }
            }
        }
    }

    bitmap
}

/// Encode a grayscale bitmap as an uncompressed 24-bit BMP data URL
pub fn encode_bmp_data_url(bitmap: &[u8], width: u32, height: u32) -> String {
    let bmp = encode_bmp(bitmap, width, height);
    let encoded = base64::engine::general_purpose::STANDARD.encode(bmp);
    format!("data:image/bmp;base64,{}", encoded)
}

fn clamp_to_canvas(p: Point, width: u32, height: u32) -> (i64, i64) {
    let x = (p.x.round() as i64).clamp(0, width as i64 - 1);
    let y = (p.y.round() as i64).clamp(0, height as i64 - 1);
    (x, y)
}

fn plot(bitmap: &mut [u8], width: u32, height: u32, p: Point) {
    let (x, y) = clamp_to_canvas(p, width, height);
    bitmap[(y as usize) * (width as usize) + (x as usize)] = INK;
}

/// Bresenham line between two clamped points
fn draw_segment(bitmap: &mut [u8], width: u32, height: u32, from: Point, to: Point) {
    let (mut x0, mut y0) = clamp_to_canvas(from, width, height);
    let (x1, y1) = clamp_to_canvas(to, width, height);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        bitmap[(y0 as usize) * (width as usize) + (x0 as usize)] = INK;
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Uncompressed 24-bit bottom-up BMP, rows padded to 4 bytes
fn encode_bmp(bitmap: &[u8], width: u32, height: u32) -> Vec<u8> {
    const HEADER_LEN: u32 = 14 + 40;
    let row_len = ((width * 3 + 3) / 4) * 4;
    let image_len = row_len * height;
    let file_len = HEADER_LEN + image_len;

    let mut out = Vec::with_capacity(file_len as usize);

    // BITMAPFILEHEADER
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&file_len.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&HEADER_LEN.to_le_bytes());

    // BITMAPINFOHEADER
    out.extend_from_slice(&40u32.to_le_bytes());
    out.extend_from_slice(&(width as i32).to_le_bytes());
    out.extend_from_slice(&(height as i32).to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&24u16.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes()); // BI_RGB, no compression
    out.extend_from_slice(&image_len.to_le_bytes());
    out.extend_from_slice(&2835i32.to_le_bytes()); // 72 dpi
    out.extend_from_slice(&2835i32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());

    // Pixel rows, bottom-up, BGR
    let padding = (row_len - width * 3) as usize;
    for row in (0..height as usize).rev() {
        for col in 0..width as usize {
            let v = bitmap[row * width as usize + col];
            out.extend_from_slice(&[v, v, v]);
        }
        out.extend(std::iter::repeat(0u8).take(padding));
    }

    out
}

use crate::raster::{Bitmap, Rgba8};

/// Paint a round-capped, round-joined line segment of `width` pixels from
/// `from` to `to` (backing-store coordinates, either endpoint may be out of
/// bounds; only in-bounds pixels are touched).
///
/// A full disc is stamped at every sample along the walk, so caps and joins
/// between consecutive segments are round without any special casing.
pub fn stroke_segment(
    bitmap: &mut Bitmap,
    from: (i64, i64),
    to: (i64, i64),
    width: u32,
    color: Rgba8,
) {
    let steps = (to.0 - from.0).abs().max((to.1 - from.1).abs());
    if steps == 0 {
        stamp_disc(bitmap, from.0, from.1, width, color);
        return;
    }
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = from.0 + ((to.0 - from.0) as f64 * t).round() as i64;
        let y = from.1 + ((to.1 - from.1) as f64 * t).round() as i64;
        stamp_disc(bitmap, x, y, width, color);
    }
}

/// Stamp one filled disc of diameter `width` centered on `(cx, cy)`.
/// `width <= 1` degenerates to a single pixel.
fn stamp_disc(bitmap: &mut Bitmap, cx: i64, cy: i64, width: u32, color: Rgba8) {
    if width <= 1 {
        if bitmap.contains(cx, cy) {
            bitmap.set_pixel(cx as u32, cy as u32, color);
        }
        return;
    }

    let radius = f64::from(width) / 2.0;
    let r_cells = radius.ceil() as i64;
    let r_sq = radius * radius;
    for dy in -r_cells..=r_cells {
        for dx in -r_cells..=r_cells {
            if (dx * dx + dy * dy) as f64 > r_sq {
                continue;
            }
            let (x, y) = (cx + dx, cy + dy);
            if bitmap.contains(x, y) {
                bitmap.set_pixel(x as u32, y as u32, color);
            }
        }
    }
}

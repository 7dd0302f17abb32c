use crate::raster::{Bitmap, Rgba8};

/// 4-connected flood fill seeded at `seed` (backing-store coordinates).
///
/// Pixel colors are compared against a snapshot taken before any mutation, so
/// a fill color that overlaps the target color still converges in one pass.
/// An out-of-bounds seed is a no-op, as is filling with the seed's own color.
pub fn flood_fill(bitmap: &mut Bitmap, seed: (i64, i64), color: Rgba8) {
    if !bitmap.contains(seed.0, seed.1) {
        return;
    }
    let target = bitmap.pixel(seed.0 as u32, seed.1 as u32);
    if target == color {
        return;
    }

    let source = bitmap.clone();
    let (w, h) = (bitmap.width() as i64, bitmap.height() as i64);
    let mut visited = vec![false; (w * h) as usize];
    // Explicit frontier stack; recursion would blow the call depth on a
    // canvas-sized fill.
    let mut stack = vec![seed];

    while let Some((x, y)) = stack.pop() {
        let idx = (y * w + x) as usize;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        if source.pixel(x as u32, y as u32) != target {
            continue;
        }
        bitmap.set_pixel(x as u32, y as u32, color);

        for (nx, ny) in [(x, y + 1), (x + 1, y), (x, y - 1), (x - 1, y)] {
            if nx >= 0 && ny >= 0 && nx < w && ny < h && !visited[(ny * w + nx) as usize] {
                stack.push((nx, ny));
            }
        }
    }
}

/// Maximal 4-connected set of pixels sharing the seed's color, with its
/// axis-aligned bounding box.
pub struct Region {
    pub pixels: Vec<(u32, u32)>,
    /// Bounding-box top-left corner.
    pub min: (u32, u32),
    /// Bounding-box bottom-right corner (inclusive).
    pub max: (u32, u32),
}

/// Discover the region containing `seed` without mutating the bitmap.
/// Returns `None` for an out-of-bounds seed.
pub fn connected_region(bitmap: &Bitmap, seed: (i64, i64)) -> Option<Region> {
    if !bitmap.contains(seed.0, seed.1) {
        return None;
    }
    let target = bitmap.pixel(seed.0 as u32, seed.1 as u32);

    let (w, h) = (bitmap.width() as i64, bitmap.height() as i64);
    let mut visited = vec![false; (w * h) as usize];
    let mut stack = vec![seed];
    let mut region = Region {
        pixels: Vec::new(),
        min: (seed.0 as u32, seed.1 as u32),
        max: (seed.0 as u32, seed.1 as u32),
    };

    while let Some((x, y)) = stack.pop() {
        let idx = (y * w + x) as usize;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;

        if bitmap.pixel(x as u32, y as u32) != target {
            continue;
        }
        let (ux, uy) = (x as u32, y as u32);
        region.pixels.push((ux, uy));
        region.min = (region.min.0.min(ux), region.min.1.min(uy));
        region.max = (region.max.0.max(ux), region.max.1.max(uy));

        for (nx, ny) in [(x, y + 1), (x + 1, y), (x, y - 1), (x - 1, y)] {
            if nx >= 0 && ny >= 0 && nx < w && ny < h && !visited[(ny * w + nx) as usize] {
                stack.push((nx, ny));
            }
        }
    }

    Some(region)
}

/// Paint the seed's region with a linear ramp from `start` at the region
/// bounding box's top-left corner to `end` at its bottom-right corner.
///
/// Two passes on purpose: the ramp color at a pixel depends on the region's
/// bounding box, which is only known once the whole region is discovered.
/// A seed whose color already equals either ramp endpoint is a no-op, so
/// clicking an already-gradiented region twice does not re-fill it.
pub fn gradient_fill(bitmap: &mut Bitmap, seed: (i64, i64), start: Rgba8, end: Rgba8) {
    if !bitmap.contains(seed.0, seed.1) {
        return;
    }
    let target = bitmap.pixel(seed.0 as u32, seed.1 as u32);
    if target == start || target == end {
        return;
    }

    let Some(region) = connected_region(bitmap, seed) else {
        return;
    };
    if region.pixels.is_empty() {
        return;
    }

    let (x0, y0) = (f64::from(region.min.0), f64::from(region.min.1));
    let axis = (
        f64::from(region.max.0) - x0,
        f64::from(region.max.1) - y0,
    );
    let axis_len_sq = axis.0 * axis.0 + axis.1 * axis.1;

    for &(x, y) in &region.pixels {
        // Scalar projection onto the box diagonal; a single-pixel box
        // degenerates to the start color.
        let t = if axis_len_sq == 0.0 {
            0.0
        } else {
            ((f64::from(x) - x0) * axis.0 + (f64::from(y) - y0) * axis.1) / axis_len_sq
        };
        bitmap.set_pixel(x, y, Rgba8::lerp(start, end, t));
    }
}

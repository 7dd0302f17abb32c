use std::io::Cursor;

use crate::error::{FlipbookError, FlipbookResult};

/// Straight-alpha RGBA color, one byte per channel.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Canvas background. Erasing paints with this.
    pub const WHITE: Self = Self::opaque(255, 255, 255);
    pub const BLACK: Self = Self::opaque(0, 0, 0);

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(a: Self, b: Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        let t = t.clamp(0.0, 1.0);
        Self {
            r: lerp_u8(a.r, b.r, t),
            g: lerp_u8(a.g, b.g, t),
            b: lerp_u8(a.b, b.b, t),
            a: lerp_u8(a.a, b.a, t),
        }
    }
}

impl From<image::Rgba<u8>> for Rgba8 {
    fn from(p: image::Rgba<u8>) -> Self {
        Self::new(p.0[0], p.0[1], p.0[2], p.0[3])
    }
}

impl From<Rgba8> for image::Rgba<u8> {
    fn from(c: Rgba8) -> Self {
        image::Rgba([c.r, c.g, c.b, c.a])
    }
}

/// A fixed-size grid of RGBA pixels with value semantics: clones are
/// independent, nothing aliases the backing storage.
#[derive(Clone, Debug)]
pub struct Bitmap {
    pixels: image::RgbaImage,
}

impl PartialEq for Bitmap {
    fn eq(&self, other: &Self) -> bool {
        self.size() == other.size() && self.as_raw() == other.as_raw()
    }
}

impl Eq for Bitmap {}

impl Bitmap {
    pub fn new(width: u32, height: u32, fill: Rgba8) -> FlipbookResult<Self> {
        if width == 0 || height == 0 {
            return Err(FlipbookError::validation(
                "bitmap width/height must be > 0",
            ));
        }
        Ok(Self {
            pixels: image::RgbaImage::from_pixel(width, height, fill.into()),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    /// Whether a signed coordinate pair lands inside the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as u64) < u64::from(self.width()) && (y as u64) < u64::from(self.height())
    }

    pub fn pixel(&self, x: u32, y: u32) -> Rgba8 {
        Rgba8::from(*self.pixels.get_pixel(x, y))
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgba8) {
        self.pixels.put_pixel(x, y, color.into());
    }

    pub fn fill(&mut self, color: Rgba8) {
        for p in self.pixels.pixels_mut() {
            *p = color.into();
        }
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub fn as_image(&self) -> &image::RgbaImage {
        &self.pixels
    }

    pub fn from_image(pixels: image::RgbaImage) -> FlipbookResult<Self> {
        if pixels.width() == 0 || pixels.height() == 0 {
            return Err(FlipbookError::validation(
                "bitmap width/height must be > 0",
            ));
        }
        Ok(Self { pixels })
    }

    /// Copy onto a new `width`×`height` canvas: old content lands at the
    /// top-left corner, anything past the new bounds is dropped, newly
    /// exposed area is `background`.
    pub fn with_canvas_size(
        &self,
        width: u32,
        height: u32,
        background: Rgba8,
    ) -> FlipbookResult<Self> {
        let mut out = Self::new(width, height, background)?;
        let copy_w = self.width().min(width);
        let copy_h = self.height().min(height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                out.set_pixel(x, y, self.pixel(x, y));
            }
        }
        Ok(out)
    }

    /// Lossless PNG bytes; round-trips every channel exactly, alpha included.
    pub fn encode_png(&self) -> FlipbookResult<Vec<u8>> {
        let mut buf = Vec::new();
        self.pixels
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .map_err(|e| FlipbookError::io(format!("failed to encode png: {e}")))?;
        Ok(buf)
    }

    pub fn decode_png(bytes: &[u8]) -> FlipbookResult<Self> {
        let img = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| FlipbookError::io(format!("failed to decode png: {e}")))?;
        Self::from_image(img.to_rgba8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(Bitmap::new(0, 4, Rgba8::WHITE).is_err());
        assert!(Bitmap::new(4, 0, Rgba8::WHITE).is_err());
    }

    #[test]
    fn clones_are_independent() {
        let a = Bitmap::new(4, 4, Rgba8::WHITE).unwrap();
        let mut b = a.clone();
        b.set_pixel(1, 1, Rgba8::BLACK);
        assert_eq!(a.pixel(1, 1), Rgba8::WHITE);
        assert_eq!(b.pixel(1, 1), Rgba8::BLACK);
    }

    #[test]
    fn contains_checks_signed_bounds() {
        let bmp = Bitmap::new(3, 2, Rgba8::WHITE).unwrap();
        assert!(bmp.contains(0, 0));
        assert!(bmp.contains(2, 1));
        assert!(!bmp.contains(-1, 0));
        assert!(!bmp.contains(3, 0));
        assert!(!bmp.contains(0, 2));
    }

    #[test]
    fn canvas_resize_copies_top_left_and_backfills() {
        let mut bmp = Bitmap::new(4, 4, Rgba8::WHITE).unwrap();
        bmp.set_pixel(3, 3, Rgba8::BLACK);
        bmp.set_pixel(0, 0, Rgba8::opaque(255, 0, 0));

        let grown = bmp.with_canvas_size(6, 6, Rgba8::WHITE).unwrap();
        assert_eq!(grown.pixel(0, 0), Rgba8::opaque(255, 0, 0));
        assert_eq!(grown.pixel(3, 3), Rgba8::BLACK);
        assert_eq!(grown.pixel(5, 5), Rgba8::WHITE);

        let shrunk = bmp.with_canvas_size(3, 3, Rgba8::WHITE).unwrap();
        assert_eq!(shrunk.pixel(0, 0), Rgba8::opaque(255, 0, 0));
        // The black corner fell outside the new bounds.
        assert_eq!(shrunk.size(), (3, 3));
    }

    #[test]
    fn png_roundtrip_preserves_alpha() {
        let mut bmp = Bitmap::new(5, 3, Rgba8::WHITE).unwrap();
        bmp.set_pixel(2, 1, Rgba8::new(10, 20, 30, 40));
        let bytes = bmp.encode_png().unwrap();
        let back = Bitmap::decode_png(&bytes).unwrap();
        assert_eq!(back, bmp);
    }

    #[test]
    fn lerp_hits_endpoints_and_midpoint() {
        let a = Rgba8::opaque(0, 0, 0);
        let b = Rgba8::opaque(200, 100, 50);
        assert_eq!(Rgba8::lerp(a, b, 0.0), a);
        assert_eq!(Rgba8::lerp(a, b, 1.0), b);
        assert_eq!(Rgba8::lerp(a, b, 0.5), Rgba8::opaque(100, 50, 25));
        // Out-of-range t clamps instead of extrapolating.
        assert_eq!(Rgba8::lerp(a, b, 2.0), b);
    }
}

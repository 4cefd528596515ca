//! In-memory RGBA raster shared by the source layer, the background and the
//! flattened output.

/// An RGBA color, straight (non-premultiplied) alpha.
pub type Rgba = [u8; 4];

/// Opaque white, the canvas background.
pub const WHITE: Rgba = [255, 255, 255, 255];

/// A raster image with RGBA pixel data.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGBA pixel data in row-major order (4 bytes per pixel).
    /// Length should be width * height * 4.
    pub pixels: Vec<u8>,
}

impl Raster {
    /// Create a new Raster with the given dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * 4,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a raster where every pixel is `color`.
    pub fn filled(width: u32, height: u32, color: Rgba) -> Self {
        let count = width as usize * height as usize;
        let mut pixels = Vec::with_capacity(count * 4);
        for _ in 0..count {
            pixels.extend_from_slice(&color);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a Raster from an image::RgbaImage.
    pub fn from_rgba_image(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an image::RgbaImage for further processing.
    pub fn to_rgba_image(&self) -> Option<image::RgbaImage> {
        image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Drop the alpha channel, producing tightly packed RGB bytes.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut rgb = Vec::with_capacity(self.pixel_count() * 3);
        for px in self.pixels.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
        }
        rgb
    }

    /// Pixel at (x, y). Panics when out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgba {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Overwrite the pixel at (x, y). Panics when out of bounds.
    #[inline]
    pub fn put_pixel(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        self.pixels[idx..idx + 4].copy_from_slice(&color);
    }

    /// Get the total number of pixels.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Check if this is an empty/invalid image.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0 || self.pixels.is_empty()
    }

    /// True when every pixel has full alpha.
    pub fn is_opaque(&self) -> bool {
        self.pixels.chunks_exact(4).all(|px| px[3] == 255)
    }
}

/// Composite `src` over `dst` (source-over, straight alpha).
#[inline]
pub fn blend_over(dst: Rgba, src: Rgba) -> Rgba {
    match src[3] {
        255 => src,
        0 => dst,
        a => {
            let sa = a as f64 / 255.0;
            let da = dst[3] as f64 / 255.0;
            let out_a = sa + da * (1.0 - sa);
            let mut out = [0u8; 4];
            for i in 0..3 {
                let c = (src[i] as f64 * sa + dst[i] as f64 * da * (1.0 - sa)) / out_a;
                out[i] = c.clamp(0.0, 255.0).round() as u8;
            }
            out[3] = (out_a * 255.0).clamp(0.0, 255.0).round() as u8;
            out
        }
    }
}

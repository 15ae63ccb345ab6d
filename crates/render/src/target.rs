//! Colour + depth attachment for the software pipeline.

use glam::Vec4;
use image::RgbaImage;

#[derive(Debug, thiserror::Error)]
pub enum TargetError {
    #[error("render target has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}

/// Row-major colour and depth buffers. Row 0 is the top of the image.
#[derive(Debug, Clone)]
pub struct RenderTarget {
    width: u32,
    height: u32,
    color: Vec<Vec4>,
    depth: Vec<f32>,
}

impl RenderTarget {
    pub fn new(width: u32, height: u32) -> Result<Self, TargetError> {
        if width == 0 || height == 0 {
            return Err(TargetError::ZeroSize { width, height });
        }
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            color: vec![Vec4::ZERO; len],
            depth: vec![1.0; len],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fill colour and reset depth to the far plane.
    pub fn clear(&mut self, color: Vec4) {
        self.color.fill(color);
        self.depth.fill(1.0);
    }

    pub fn color(&self, x: u32, y: u32) -> Vec4 {
        self.color[self.index(x, y)]
    }

    pub fn depth(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    /// Depth test `LESS` at `(x, y)`.
    pub(crate) fn depth_passes(&self, x: u32, y: u32, depth: f32) -> bool {
        depth < self.depth[self.index(x, y)]
    }

    pub(crate) fn write(&mut self, x: u32, y: u32, color: Vec4, depth: f32) {
        let i = self.index(x, y);
        self.color[i] = color;
        self.depth[i] = depth;
    }

    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let c = (self.color(x, y).clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
            image::Rgba(c.to_array().map(|v| v as u8))
        })
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_size_is_an_error() {
        assert!(RenderTarget::new(0, 10).is_err());
        assert!(RenderTarget::new(10, 0).is_err());
    }

    #[test]
    fn clear_resets_depth_and_color() {
        let mut t = RenderTarget::new(4, 2).unwrap();
        t.write(1, 1, Vec4::ONE, 0.25);
        assert_eq!(t.depth(1, 1), 0.25);
        t.clear(Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(t.depth(1, 1), 1.0);
        assert_eq!(t.color(3, 0), Vec4::new(0.0, 0.0, 1.0, 1.0));
    }

    #[test]
    fn depth_test_is_strict() {
        let mut t = RenderTarget::new(1, 1).unwrap();
        t.write(0, 0, Vec4::ONE, 0.5);
        assert!(t.depth_passes(0, 0, 0.4));
        assert!(!t.depth_passes(0, 0, 0.5));
    }

    #[test]
    fn image_is_rgba8() {
        let mut t = RenderTarget::new(2, 1).unwrap();
        t.clear(Vec4::new(1.0, 0.5, 0.0, 1.0));
        let img = t.to_image();
        assert_eq!(img.get_pixel(1, 0).0, [255, 128, 0, 255]);
    }
}

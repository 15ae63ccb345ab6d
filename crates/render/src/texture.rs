//! Read-only texture sampling for the software pipeline.

use glam::{Vec2, Vec4};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Anything the fragment stages can sample an RGBA colour from.
pub trait Sampler {
    fn sample(&self, uv: Vec2) -> Vec4;
}

impl<F> Sampler for F
where
    F: Fn(Vec2) -> Vec4,
{
    fn sample(&self, uv: Vec2) -> Vec4 {
        self(uv)
    }
}

/// Texel filter. A single mode covers both minification and magnification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// Coordinate wrap outside `[0,1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapMode {
    #[default]
    Repeat,
    ClampToEdge,
}

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("texture has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
    #[error("expected {expected} texels, got {actual}")]
    TexelCount { expected: usize, actual: usize },
}

/// RGBA texture with normalized texels. Row 0 is `v = 0`.
#[derive(Debug, Clone)]
pub struct Texture {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
    pub filter: FilterMode,
    pub wrap: WrapMode,
}

impl Texture {
    pub fn new(width: u32, height: u32, texels: Vec<Vec4>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::ZeroSize { width, height });
        }
        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(TextureError::TexelCount {
                expected,
                actual: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            texels,
            filter: FilterMode::default(),
            wrap: WrapMode::default(),
        })
    }

    pub fn from_image(img: &RgbaImage) -> Result<Self, TextureError> {
        let texels = img
            .pixels()
            .map(|p| Vec4::from_array(p.0.map(|c| c as f32 / 255.0)))
            .collect();
        Self::new(img.width(), img.height(), texels)
    }

    /// Decode an image file into a texture.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path)?.to_rgba8();
        tracing::debug!(
            path = %path.display(),
            w = img.width(),
            h = img.height(),
            "texture loaded"
        );
        Self::from_image(&img)
    }

    /// `cells x cells` atlas of `cell_px` square cells. Each cell is a
    /// two-tone checker with a transparent one-pixel border.
    pub fn checkerboard(cells: u32, cell_px: u32) -> Result<Self, TextureError> {
        let px = cell_px.max(1);
        let size = cells * px;
        let mut texels = Vec::with_capacity(size as usize * size as usize);
        for y in 0..size {
            for x in 0..size {
                let (cx, cy) = (x / px, y / px);
                let (lx, ly) = (x % px, y % px);
                let border = lx == 0 || ly == 0 || lx + 1 == px || ly + 1 == px;
                let hue = (cx + cy * cells) as f32 / (cells * cells) as f32;
                let shade = if (lx * 2 / px + ly * 2 / px) % 2 == 0 { 1.0 } else { 0.6 };
                let alpha = if border { 0.0 } else { 1.0 };
                texels.push(Vec4::new(hue * shade, (1.0 - hue) * shade, 0.5 * shade, alpha));
            }
        }
        Self::new(size, size, texels)
    }

    pub fn with_filter(mut self, filter: FilterMode) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        self.texels[y as usize * self.width as usize + x as usize]
    }

    /// Texels as RGBA8, row-major, for GPU upload.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.texels
            .iter()
            .flat_map(|t| {
                (t.clamp(Vec4::ZERO, Vec4::ONE) * 255.0)
                    .round()
                    .to_array()
                    .map(|c| c as u8)
            })
            .collect()
    }

    fn wrap_index(&self, i: i64, extent: u32) -> u32 {
        let n = extent as i64;
        match self.wrap {
            WrapMode::Repeat => i.rem_euclid(n) as u32,
            WrapMode::ClampToEdge => i.clamp(0, n - 1) as u32,
        }
    }

    fn nearest(&self, uv: Vec2) -> Vec4 {
        let x = (uv.x * self.width as f32).floor() as i64;
        let y = (uv.y * self.height as f32).floor() as i64;
        self.texel(self.wrap_index(x, self.width), self.wrap_index(y, self.height))
    }

    fn linear(&self, uv: Vec2) -> Vec4 {
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;
        let (x0, y0) = (x.floor(), y.floor());
        let (fx, fy) = (x - x0, y - y0);
        let (x0, y0) = (x0 as i64, y0 as i64);
        let xa = self.wrap_index(x0, self.width);
        let xb = self.wrap_index(x0 + 1, self.width);
        let ya = self.wrap_index(y0, self.height);
        let yb = self.wrap_index(y0 + 1, self.height);
        let top = self.texel(xa, ya).lerp(self.texel(xb, ya), fx);
        let bottom = self.texel(xa, yb).lerp(self.texel(xb, yb), fx);
        top.lerp(bottom, fy)
    }
}

impl Sampler for Texture {
    fn sample(&self, uv: Vec2) -> Vec4 {
        match self.filter {
            FilterMode::Nearest => self.nearest(uv),
            FilterMode::Linear => self.linear(uv),
        }
    }
}

//! YAML scene description and the host-side vertex/uniform build.

use glam::{Vec3, Vec4};
use rapidframe_common::{SpriteUniforms, SpriteVertex, TileUniforms, TileVertex};
use rapidframe_render::{
    AtlasError, AtlasLayout, Camera, FilterMode, Frame, SpriteBatch, Texture, TextureError,
    TileBatch, WrapMode,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Atlas(#[from] AtlasError),
    #[error("output size must be non-zero, got {width}x{height}")]
    ZeroSize { width: u32, height: u32 },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneConfig {
    #[serde(default = "default_extent")]
    pub width: u32,
    #[serde(default = "default_extent")]
    pub height: u32,
    #[serde(default = "default_clear")]
    pub clear: Vec4,
    #[serde(default)]
    pub camera: CameraConfig,
    pub atlas: AtlasConfig,
    #[serde(default)]
    pub tiles: TileConfig,
    #[serde(default)]
    pub sprites: SpriteConfig,
}

fn default_extent() -> u32 {
    640
}

fn default_clear() -> Vec4 {
    Vec4::new(0.0, 0.0, 0.0, 1.0)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    pub eye: Vec3,
    pub target: Vec3,
    /// Horizontal field of view.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        let cam = Camera::default();
        Self {
            eye: cam.eye,
            target: cam.target,
            fov_degrees: cam.fov.to_degrees(),
            near: cam.near,
            far: cam.far,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AtlasConfig {
    /// Image file, relative to the scene file. A checkerboard is generated when absent.
    pub texture: Option<PathBuf>,
    pub cells_per_side: u32,
    #[serde(default = "default_cell_px")]
    pub cell_px: u32,
    #[serde(default)]
    pub filter: FilterMode,
    #[serde(default)]
    pub wrap: WrapMode,
}

fn default_cell_px() -> u32 {
    16
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TileConfig {
    /// Edge length of one tile in world units.
    pub size: f32,
    pub cells: Vec<TileCell>,
}

impl Default for TileConfig {
    fn default() -> Self {
        Self {
            size: 1.0,
            cells: Vec::new(),
        }
    }
}

/// One floor tile at grid position `(x, z)` showing atlas cell `cell`.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TileCell {
    pub x: i32,
    pub z: i32,
    pub cell: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpriteConfig {
    pub size_mul: f32,
    pub points: Vec<SpritePoint>,
}

impl Default for SpriteConfig {
    fn default() -> Self {
        Self {
            size_mul: 1.0,
            points: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpritePoint {
    pub position: Vec3,
    pub size: f32,
    pub cell: u32,
}

/// A scene with its geometry built and its atlas loaded.
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub clear: Vec4,
    pub camera: Camera,
    pub atlas: Texture,
    pub layout: AtlasLayout,
    pub tiles: Vec<TileVertex>,
    pub sprites: Vec<SpriteVertex>,
    pub size_mul: f32,
}

impl Scene {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: SceneConfig = serde_yaml::from_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        tracing::info!(path = %path.display(), "scene loaded");
        Self::build(config, base)
    }

    /// Build geometry from a parsed config. Texture paths resolve against `base`.
    pub fn build(config: SceneConfig, base: &Path) -> Result<Self, SceneError> {
        if config.width == 0 || config.height == 0 {
            return Err(SceneError::ZeroSize {
                width: config.width,
                height: config.height,
            });
        }

        let layout = AtlasLayout::new(config.atlas.cells_per_side)?;
        let atlas = match &config.atlas.texture {
            Some(file) => Texture::open(base.join(file))?,
            None => Texture::checkerboard(layout.cells_per_side, config.atlas.cell_px)?,
        }
        .with_filter(config.atlas.filter)
        .with_wrap(config.atlas.wrap);

        let camera = Camera {
            eye: config.camera.eye,
            target: config.camera.target,
            fov: config.camera.fov_degrees.to_radians(),
            aspect: config.width as f32 / config.height as f32,
            near: config.camera.near,
            far: config.camera.far,
            ..Camera::default()
        };

        let mut tiles = Vec::with_capacity(config.tiles.cells.len() * 6);
        for t in &config.tiles.cells {
            tiles.extend(tile_quad(t, config.tiles.size, &layout)?);
        }

        let sprites = config
            .sprites
            .points
            .iter()
            .map(|p| -> Result<SpriteVertex, SceneError> {
                Ok(SpriteVertex::new(p.position, p.size, layout.cell_origin(p.cell)?))
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            tiles = config.tiles.cells.len(),
            sprites = sprites.len(),
            "scene geometry built"
        );

        Ok(Self {
            width: config.width,
            height: config.height,
            clear: config.clear,
            camera,
            atlas,
            layout,
            tiles,
            sprites,
            size_mul: config.sprites.size_mul,
        })
    }

    /// Tiles first, sprites second.
    pub fn frame(&self) -> Frame<'_> {
        let mvp = self.camera.view_projection();
        let mut frame = Frame::new(self.clear);
        if !self.tiles.is_empty() {
            frame = frame.tiles(TileBatch {
                uniforms: TileUniforms { mvp },
                texture: &self.atlas,
                vertices: &self.tiles,
            });
        }
        if !self.sprites.is_empty() {
            frame = frame.sprites(SpriteBatch {
                uniforms: SpriteUniforms {
                    mvp,
                    size_mul: self.size_mul,
                    inv_uv_mul: self.layout.inv_uv_mul(),
                },
                texture: &self.atlas,
                vertices: &self.sprites,
            });
        }
        frame
    }
}

/// Two counter-clockwise (seen from +Y) triangles on the `y = 0` plane.
fn tile_quad(t: &TileCell, size: f32, layout: &AtlasLayout) -> Result<[TileVertex; 6], AtlasError> {
    let [tl, tr, br, bl] = layout.tile_uvs(t.cell)?;
    let (x0, z0) = (t.x as f32 * size, t.z as f32 * size);
    let (x1, z1) = (x0 + size, z0 + size);
    let v = |x: f32, z: f32, uv| TileVertex::new(Vec3::new(x, 0.0, z), uv);
    Ok([
        v(x0, z1, bl),
        v(x1, z1, br),
        v(x1, z0, tr),
        v(x0, z1, bl),
        v(x1, z0, tr),
        v(x0, z0, tl),
    ])
}

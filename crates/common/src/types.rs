use glam::{Mat4, Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Primitives whose clip-space `w` falls below this are culled by the point stage.
pub const NEAR_CULL_W: f32 = 0.6;

/// Value written to both `z` and `w` of a culled point, placing it outside the clip volume.
pub const CULLED_DEPTH: f32 = -2.0;

/// Alpha threshold shared by both fragment stages.
pub const ALPHA_CUTOFF: f32 = 0.5;

/// Vertex of the textured tile/map surface.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TileVertex {
    /// Object-space position.
    pub position: Vec3,
    /// Surface coordinate, nominally in `[0,1]²` per tile. Not clamped.
    pub uv: Vec2,
}

impl TileVertex {
    pub fn new(position: Vec3, uv: Vec2) -> Self {
        Self { position, uv }
    }
}

/// Vertex of a camera-facing point sprite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteVertex {
    /// Object-space position.
    pub position: Vec3,
    /// Base point size in host-space units, before the global multiplier.
    pub size: f32,
    /// Atlas base coordinate: the top-left of the sprite's cell, in cell units.
    pub atlas_uv: Vec2,
}

impl SpriteVertex {
    pub fn new(position: Vec3, size: f32, atlas_uv: Vec2) -> Self {
        Self {
            position,
            size,
            atlas_uv,
        }
    }
}

/// Read-only parameters of a tile draw. The texture is bound separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileUniforms {
    /// Combined projection-view-model matrix.
    pub mvp: Mat4,
}

impl Default for TileUniforms {
    fn default() -> Self {
        Self { mvp: Mat4::IDENTITY }
    }
}

/// Read-only parameters of a sprite draw. The texture is bound separately.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpriteUniforms {
    /// Combined projection-view-model matrix.
    pub mvp: Mat4,
    /// Global point-size scale.
    pub size_mul: f32,
    /// Reciprocal of the atlas cell size in texture-coordinate units.
    pub inv_uv_mul: f32,
}

impl Default for SpriteUniforms {
    fn default() -> Self {
        Self {
            mvp: Mat4::IDENTITY,
            size_mul: 1.0,
            inv_uv_mul: 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_default_to_identity() {
        assert_eq!(TileUniforms::default().mvp, Mat4::IDENTITY);
        let s = SpriteUniforms::default();
        assert_eq!(s.mvp, Mat4::IDENTITY);
        assert_eq!(s.size_mul, 1.0);
        assert_eq!(s.inv_uv_mul, 1.0);
    }

    #[test]
    fn culled_depth_lies_outside_clip_volume() {
        // A point survives clipping only when -w <= z <= w with w > 0.
        let (z, w) = (CULLED_DEPTH, CULLED_DEPTH);
        assert!(!(w > 0.0 && -w <= z && z <= w));
        assert!(CULLED_DEPTH < NEAR_CULL_W);
    }
}

use glam::{Vec2, Vec4};
use rapidframe_common::{CULLED_DEPTH, NEAR_CULL_W, SpriteUniforms, SpriteVertex};

use super::transform;

/// Clip position and on-screen size of a point sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointFootprint {
    /// Clip-space position, with `z` and `w` forced to [`CULLED_DEPTH`] when culled.
    pub clip: Vec4,
    /// Footprint in pixels, before any viewport scaling the host applies.
    pub size: f32,
}

impl PointFootprint {
    /// True when the near-plane cull moved this point off-volume.
    pub fn is_culled(&self) -> bool {
        self.clip.z == CULLED_DEPTH && self.clip.w == CULLED_DEPTH
    }
}

/// Perspective-attenuated point size with the near-plane cull.
///
/// The size is divided by the incoming `w`. A point with `w < 0.6` keeps
/// its `x`/`y` but gets `z = w = -2` so the rasterizer drops it.
pub fn point_footprint(clip: Vec4, base_size: f32, size_mul: f32) -> PointFootprint {
    let size = base_size * size_mul / clip.w;
    let mut clip = clip;
    if clip.w < NEAR_CULL_W {
        clip.z = CULLED_DEPTH;
        clip.w = CULLED_DEPTH;
    }
    PointFootprint { clip, size }
}

/// Output of the sprite vertex stage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteVaryings {
    pub footprint: PointFootprint,
    pub atlas_uv: Vec2,
}

/// Sprite vertex stage: transform, footprint, cull.
pub fn sprite_vertex(uniforms: &SpriteUniforms, vertex: &SpriteVertex) -> SpriteVaryings {
    let clip = transform(&uniforms.mvp, vertex.position);
    SpriteVaryings {
        footprint: point_footprint(clip, vertex.size, uniforms.size_mul),
        atlas_uv: vertex.atlas_uv,
    }
}

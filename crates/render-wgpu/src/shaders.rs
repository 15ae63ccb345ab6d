/// WGSL shader for the tile/map surface: transform + alpha cutout.
pub const TILE_SHADER: &str = r#"
struct TileUniforms {
    mvp: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: TileUniforms;
@group(0) @binding(1)
var atlas: texture_2d<f32>;
@group(0) @binding(2)
var atlas_sampler: sampler;

struct TileVertex {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
};

struct TileOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) uv: vec2<f32>,
};

// GL clip depth [-w, w] into WebGPU's [0, w].
fn to_wgpu_depth(clip: vec4<f32>) -> vec4<f32> {
    return vec4<f32>(clip.xy, (clip.z + clip.w) * 0.5, clip.w);
}

@vertex
fn vs_tile(vertex: TileVertex) -> TileOutput {
    var out: TileOutput;
    out.clip_position = to_wgpu_depth(uniforms.mvp * vec4<f32>(vertex.position, 1.0));
    out.uv = vertex.uv;
    return out;
}

@fragment
fn fs_tile(in: TileOutput) -> @location(0) vec4<f32> {
    let col = textureSample(atlas, atlas_sampler, in.uv);
    if (col.a < 0.5) {
        discard;
    }
    return col;
}
"#;

/// WGSL shader for point sprites drawn as instanced quads.
///
/// Six vertices per instance. The vertex stage computes the footprint,
/// applies the near-plane cull and emits the point coordinate with its
/// origin at the upper-left corner.
pub const SPRITE_SHADER: &str = r#"
struct SpriteUniforms {
    mvp: mat4x4<f32>,
    viewport: vec2<f32>,
    size_mul: f32,
    inv_uv_mul: f32,
    max_point_size: f32,
};

@group(0) @binding(0)
var<uniform> uniforms: SpriteUniforms;
@group(0) @binding(1)
var atlas: texture_2d<f32>;
@group(0) @binding(2)
var atlas_sampler: sampler;

struct SpriteInstance {
    @location(0) position: vec3<f32>,
    @location(1) size: f32,
    @location(2) atlas_uv: vec2<f32>,
};

struct SpriteOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) atlas_uv: vec2<f32>,
    @location(1) point_coord: vec2<f32>,
};

var<private> CORNERS: array<vec2<f32>, 6> = array<vec2<f32>, 6>(
    vec2<f32>(-0.5, -0.5),
    vec2<f32>(0.5, -0.5),
    vec2<f32>(0.5, 0.5),
    vec2<f32>(-0.5, -0.5),
    vec2<f32>(0.5, 0.5),
    vec2<f32>(-0.5, 0.5),
);

fn to_wgpu_depth(clip: vec4<f32>) -> vec4<f32> {
    return vec4<f32>(clip.xy, (clip.z + clip.w) * 0.5, clip.w);
}

@vertex
fn vs_sprite(@builtin(vertex_index) corner_index: u32, sprite: SpriteInstance) -> SpriteOutput {
    var clip = uniforms.mvp * vec4<f32>(sprite.position, 1.0);
    let size = clamp(sprite.size * uniforms.size_mul / clip.w, 1.0, uniforms.max_point_size);
    if (clip.w < 0.6) {
        clip.z = -2.0;
        clip.w = -2.0;
    }

    let corner = CORNERS[corner_index];
    var out: SpriteOutput;
    out.atlas_uv = sprite.atlas_uv;
    out.point_coord = vec2<f32>(corner.x + 0.5, 0.5 - corner.y);

    // Points are dropped whole when their centre leaves the clip volume.
    let inside = clip.w > 0.0 && all(abs(clip.xyz) <= vec3<f32>(clip.w));
    if (inside) {
        let offset = corner * size * 2.0 / uniforms.viewport;
        out.clip_position = to_wgpu_depth(vec4<f32>(clip.xy + offset * clip.w, clip.zw));
    } else {
        out.clip_position = to_wgpu_depth(clip);
    }
    return out;
}

@fragment
fn fs_sprite(in: SpriteOutput) -> @location(0) vec4<f32> {
    let uv = (in.atlas_uv + in.point_coord) * uniforms.inv_uv_mul;
    let col = textureSample(atlas, atlas_sampler, uv);
    // Accept only on alpha > 0.5; a NaN alpha is discarded.
    if (!(col.a > 0.5)) {
        discard;
    }
    return col;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_points_present() {
        assert!(TILE_SHADER.contains("fn vs_tile"));
        assert!(TILE_SHADER.contains("fn fs_tile"));
        assert!(SPRITE_SHADER.contains("fn vs_sprite"));
        assert!(SPRITE_SHADER.contains("fn fs_sprite"));
    }

    #[test]
    fn thresholds_match_cpu_stages() {
        assert!(TILE_SHADER.contains("col.a < 0.5"));
        assert!(SPRITE_SHADER.contains("if (!(col.a > 0.5))"));
        assert!(!SPRITE_SHADER.contains("col.a <= 0.5"));
        assert!(SPRITE_SHADER.contains("clip.w < 0.6"));
        assert!(SPRITE_SHADER.contains("clip.z = -2.0"));
        assert!(SPRITE_SHADER.contains("clip.w = -2.0"));
    }
}

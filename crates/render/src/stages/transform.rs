use glam::{Mat4, Vec2, Vec3, Vec4};
use rapidframe_common::{TileUniforms, TileVertex};

/// Clip-space position of an object-space point: `mvp * (p, 1)`.
#[inline]
pub fn transform(mvp: &Mat4, position: Vec3) -> Vec4 {
    *mvp * position.extend(1.0)
}

/// Output of the tile vertex stage, input to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileVaryings {
    pub clip: Vec4,
    pub uv: Vec2,
}

/// Tile vertex stage: transform the position, pass the surface coordinate through.
pub fn tile_vertex(uniforms: &TileUniforms, vertex: &TileVertex) -> TileVaryings {
    TileVaryings {
        clip: transform(&uniforms.mvp, vertex.position),
        uv: vertex.uv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Quat;

    // Row-by-row dot products, computed without glam's operator.
    fn reference(m: &Mat4, p: Vec3) -> Vec4 {
        let v = [p.x, p.y, p.z, 1.0];
        let mut out = [0.0f32; 4];
        for (row, o) in out.iter_mut().enumerate() {
            for (col, vc) in v.iter().enumerate() {
                *o += m.col(col)[row] * vc;
            }
        }
        Vec4::from_array(out)
    }

    fn assert_close(a: Vec4, b: Vec4) {
        assert!((a - b).abs().max_element() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn identity_extends_with_one() {
        let p = Vec3::new(1.5, -2.0, 3.25);
        assert_eq!(transform(&Mat4::IDENTITY, p), Vec4::new(1.5, -2.0, 3.25, 1.0));
    }

    #[test]
    fn translation_offsets_position() {
        let m = Mat4::from_translation(Vec3::new(10.0, -4.0, 2.0));
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(transform(&m, p), Vec4::new(11.0, -2.0, 5.0, 1.0));
        assert_close(transform(&m, p), reference(&m, p));
    }

    #[test]
    fn rotation_and_perspective_match_reference() {
        let rot = Mat4::from_quat(Quat::from_rotation_y(0.7) * Quat::from_rotation_x(-0.3));
        let proj = Mat4::perspective_rh_gl(1.1, 1.5, 0.1, 100.0);
        let m = proj * Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)) * rot;
        for p in [
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, -1.0, 2.0),
            Vec3::new(-3.0, 0.5, -1.0),
        ] {
            assert_close(transform(&m, p), reference(&m, p));
        }
        // Perspective puts view distance into w.
        let clip = transform(&m, Vec3::ZERO);
        assert!((clip.w - 5.0).abs() < 1e-5);
    }

    #[test]
    fn tile_vertex_passes_uv_through() {
        let u = TileUniforms {
            mvp: Mat4::from_scale(Vec3::splat(2.0)),
        };
        let v = TileVertex::new(Vec3::new(1.0, 1.0, 1.0), Vec2::new(0.25, 0.75));
        let out = tile_vertex(&u, &v);
        assert_eq!(out.clip, Vec4::new(2.0, 2.0, 2.0, 1.0));
        assert_eq!(out.uv, Vec2::new(0.25, 0.75));
    }
}

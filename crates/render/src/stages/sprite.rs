use glam::Vec2;
use rapidframe_common::ALPHA_CUTOFF;

use super::Fragment;
use crate::texture::Sampler;

/// Atlas sample coordinate: `(base + point_coord) * inv_uv_mul`.
///
/// `base` is in cell units, `point_coord` is the fragment's place inside
/// the footprint in `[0,1]²`.
#[inline]
pub fn atlas_coord(base: Vec2, point_coord: Vec2, inv_uv_mul: f32) -> Vec2 {
    (base + point_coord) * inv_uv_mul
}

/// Sprite fragment stage: accept only when `alpha > 0.5`.
pub fn sprite_fragment<S: Sampler + ?Sized>(
    texture: &S,
    atlas_uv: Vec2,
    point_coord: Vec2,
    inv_uv_mul: f32,
) -> Fragment {
    let color = texture.sample(atlas_coord(atlas_uv, point_coord, inv_uv_mul));
    if color.w > ALPHA_CUTOFF {
        Fragment::Accepted(color)
    } else {
        Fragment::Rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn fold_corners() {
        let base = Vec2::new(3.0, 1.0);
        let k = 0.125;
        assert_eq!(atlas_coord(base, Vec2::ZERO, k), Vec2::new(3.0 * k, 1.0 * k));
        assert_eq!(atlas_coord(base, Vec2::ONE, k), Vec2::new(4.0 * k, 2.0 * k));
        assert_eq!(
            atlas_coord(base, Vec2::new(0.5, 0.25), k),
            (base + Vec2::new(0.5, 0.25)) * k
        );
    }

    #[test]
    fn boundary_is_strict_greater_than() {
        let at = |a: f32| move |_: Vec2| Vec4::new(1.0, 0.0, 1.0, a);
        let frag = |a: f32| sprite_fragment(&at(a), Vec2::ZERO, Vec2::ZERO, 1.0);
        assert_eq!(frag(0.5), Fragment::Rejected);
        assert_eq!(frag(0.0), Fragment::Rejected);
        assert!(frag(0.50001).is_accepted());
        assert_eq!(frag(1.0), Fragment::Accepted(Vec4::new(1.0, 0.0, 1.0, 1.0)));
        assert_eq!(frag(f32::NAN), Fragment::Rejected);
    }

    #[test]
    fn samples_folded_coordinate() {
        let tex = |uv: Vec2| Vec4::new(uv.x, uv.y, 0.0, 1.0);
        let out = sprite_fragment(&tex, Vec2::new(2.0, 0.0), Vec2::new(0.5, 0.5), 0.25);
        assert_eq!(out.color(), Some(Vec4::new(0.625, 0.125, 0.0, 1.0)));
    }
}

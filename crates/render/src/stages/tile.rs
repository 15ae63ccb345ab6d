use glam::Vec2;
use rapidframe_common::ALPHA_CUTOFF;

use super::Fragment;
use crate::texture::Sampler;

/// Tile fragment stage: sample at `uv`, reject when `alpha < 0.5`.
pub fn tile_fragment<S: Sampler + ?Sized>(texture: &S, uv: Vec2) -> Fragment {
    let color = texture.sample(uv);
    if color.w < ALPHA_CUTOFF {
        Fragment::Rejected
    } else {
        Fragment::Accepted(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn with_alpha(a: f32) -> impl Fn(Vec2) -> Vec4 {
        move |_| Vec4::new(0.2, 0.4, 0.6, a)
    }

    #[test]
    fn opaque_and_transparent() {
        assert_eq!(
            tile_fragment(&with_alpha(1.0), Vec2::ZERO),
            Fragment::Accepted(Vec4::new(0.2, 0.4, 0.6, 1.0))
        );
        assert_eq!(tile_fragment(&with_alpha(0.0), Vec2::ZERO), Fragment::Rejected);
    }

    #[test]
    fn boundary_is_strict_less_than() {
        assert!(tile_fragment(&with_alpha(0.5), Vec2::ZERO).is_accepted());
        assert!(tile_fragment(&with_alpha(0.50001), Vec2::ZERO).is_accepted());
        assert!(!tile_fragment(&with_alpha(0.49999), Vec2::ZERO).is_accepted());
    }

    #[test]
    fn samples_at_the_given_coordinate() {
        let tex = |uv: Vec2| Vec4::new(uv.x, uv.y, 0.0, 1.0);
        let out = tile_fragment(&tex, Vec2::new(0.3, 0.9));
        assert_eq!(out.color(), Some(Vec4::new(0.3, 0.9, 0.0, 1.0)));
    }
}

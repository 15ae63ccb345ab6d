//! Software rasterizer for both draw paths.
//!
//! Covers the fixed-function work around the shading stages: clipping,
//! viewport mapping, face culling, coverage, interpolation and the depth
//! test. Screen space has its origin at the top-left pixel corner with y
//! growing downward; window depth is `ndc.z * 0.5 + 0.5`.

use glam::{Vec2, Vec3, Vec3Swizzles, Vec4, Vec4Swizzles};
use rapidframe_common::{SpriteUniforms, SpriteVertex, TileUniforms, TileVertex};
use serde::Serialize;
use std::ops::AddAssign;

use crate::stages::{self, Fragment, TileVaryings};
use crate::target::RenderTarget;
use crate::texture::Sampler;

/// Rasterizer settings owned by the host.
#[derive(Debug, Clone, Copy)]
pub struct RasterConfig {
    /// Largest footprint a point may cover, in pixels.
    pub max_point_size: f32,
    /// Drop clockwise triangles (counter-clockwise is front-facing).
    pub cull_back_faces: bool,
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            max_point_size: 256.0,
            cull_back_faces: true,
        }
    }
}

/// Counters for one or more draws.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrawStats {
    pub primitives: u64,
    pub primitives_culled: u64,
    pub fragments_accepted: u64,
    pub fragments_rejected: u64,
    pub fragments_depth_failed: u64,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: Self) {
        self.primitives += rhs.primitives;
        self.primitives_culled += rhs.primitives_culled;
        self.fragments_accepted += rhs.fragments_accepted;
        self.fragments_rejected += rhs.fragments_rejected;
        self.fragments_depth_failed += rhs.fragments_depth_failed;
    }
}

#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    pos: Vec3,
    inv_w: f32,
    uv: Vec2,
}

#[derive(Debug, Default, Clone)]
pub struct Rasterizer {
    pub config: RasterConfig,
}

impl Rasterizer {
    pub fn new(config: RasterConfig) -> Self {
        Self { config }
    }

    /// Draw a triangle list through the tile stages.
    pub fn draw_tiles<S: Sampler + ?Sized>(
        &self,
        target: &mut RenderTarget,
        uniforms: &TileUniforms,
        texture: &S,
        vertices: &[TileVertex],
    ) -> DrawStats {
        let _span = tracing::debug_span!("draw_tiles", vertices = vertices.len()).entered();
        let mut stats = DrawStats::default();
        if vertices.len() % 3 != 0 {
            tracing::warn!(
                trailing = vertices.len() % 3,
                "tile vertex count is not a multiple of 3"
            );
        }

        for tri in vertices.chunks_exact(3) {
            stats.primitives += 1;
            let v = [
                stages::tile_vertex(uniforms, &tri[0]),
                stages::tile_vertex(uniforms, &tri[1]),
                stages::tile_vertex(uniforms, &tri[2]),
            ];
            let poly = clip_near(&v);
            if poly.len() < 3 {
                stats.primitives_culled += 1;
                continue;
            }
            let screen: Vec<ScreenVertex> = poly
                .iter()
                .map(|p| ScreenVertex {
                    pos: to_screen(p.clip, target.width(), target.height()),
                    inv_w: 1.0 / p.clip.w,
                    uv: p.uv,
                })
                .collect();

            let mut drawn = false;
            for i in 1..screen.len() - 1 {
                drawn |= self.fill_triangle(
                    target,
                    texture,
                    [screen[0], screen[i], screen[i + 1]],
                    &mut stats,
                );
            }
            if !drawn {
                stats.primitives_culled += 1;
            }
        }

        tracing::debug!(?stats, "tiles drawn");
        stats
    }

    /// Draw a point list through the sprite stages.
    pub fn draw_sprites<S: Sampler + ?Sized>(
        &self,
        target: &mut RenderTarget,
        uniforms: &SpriteUniforms,
        texture: &S,
        vertices: &[SpriteVertex],
    ) -> DrawStats {
        let _span = tracing::debug_span!("draw_sprites", vertices = vertices.len()).entered();
        let mut stats = DrawStats::default();
        let (width, height) = (target.width(), target.height());

        for vertex in vertices {
            stats.primitives += 1;
            let out = stages::sprite_vertex(uniforms, vertex);
            let clip = out.footprint.clip;
            let size = out.footprint.size.clamp(1.0, self.config.max_point_size);
            if !inside_clip_volume(clip) || !size.is_finite() {
                stats.primitives_culled += 1;
                continue;
            }

            let centre = to_screen(clip, width, height);
            let x0 = centre.x - size * 0.5;
            let y0 = centre.y - size * 0.5;
            let (Some(xs), Some(ys)) = (
                pixel_span(x0, x0 + size, width),
                pixel_span(y0, y0 + size, height),
            ) else {
                stats.primitives_culled += 1;
                continue;
            };

            for py in ys {
                let fy = py as f32 + 0.5;
                if fy < y0 || fy >= y0 + size {
                    continue;
                }
                for px in xs.clone() {
                    let fx = px as f32 + 0.5;
                    if fx < x0 || fx >= x0 + size {
                        continue;
                    }
                    let point_coord = Vec2::new((fx - x0) / size, (fy - y0) / size);
                    let frag = stages::sprite_fragment(
                        texture,
                        out.atlas_uv,
                        point_coord,
                        uniforms.inv_uv_mul,
                    );
                    composite(target, px, py, centre.z, frag, &mut stats);
                }
            }
        }

        tracing::debug!(?stats, "sprites drawn");
        stats
    }

    // Returns false when the triangle was face-culled or degenerate.
    fn fill_triangle<S: Sampler + ?Sized>(
        &self,
        target: &mut RenderTarget,
        texture: &S,
        v: [ScreenVertex; 3],
        stats: &mut DrawStats,
    ) -> bool {
        let (a, b, c) = (v[0].pos.xy(), v[1].pos.xy(), v[2].pos.xy());
        let area = edge(a, b, c);
        // Screen y points down, so a counter-clockwise NDC triangle has negative area here.
        if area == 0.0 || !area.is_finite() || (self.config.cull_back_faces && area > 0.0) {
            return false;
        }

        let min = a.min(b).min(c);
        let max = a.max(b).max(c);
        let (Some(xs), Some(ys)) = (
            pixel_span(min.x, max.x, target.width()),
            pixel_span(min.y, max.y, target.height()),
        ) else {
            return true;
        };

        // Weights are scaled by `orient` so the interior is positive for either winding.
        let orient = area.signum();
        let edges = [(b, c), (c, a), (a, b)];
        let owns_boundary = edges.map(|(from, to)| is_top_left(from, to, orient));
        let scale = area.abs();

        for py in ys {
            for px in xs.clone() {
                let p = Vec2::new(px as f32 + 0.5, py as f32 + 0.5);
                let w = edges.map(|(from, to)| edge(from, to, p) * orient);
                let covered = w
                    .iter()
                    .zip(owns_boundary)
                    .all(|(&wi, owns)| wi > 0.0 || (wi == 0.0 && owns));
                if !covered {
                    continue;
                }
                let (b0, b1, b2) = (w[0] / scale, w[1] / scale, w[2] / scale);
                let depth = b0 * v[0].pos.z + b1 * v[1].pos.z + b2 * v[2].pos.z;
                if !(0.0..=1.0).contains(&depth) {
                    continue;
                }
                let inv_w = b0 * v[0].inv_w + b1 * v[1].inv_w + b2 * v[2].inv_w;
                let uv = (v[0].uv * (b0 * v[0].inv_w)
                    + v[1].uv * (b1 * v[1].inv_w)
                    + v[2].uv * (b2 * v[2].inv_w))
                    / inv_w;
                let frag = stages::tile_fragment(texture, uv);
                composite(target, px, py, depth, frag, stats);
            }
        }
        true
    }
}

fn composite(
    target: &mut RenderTarget,
    x: u32,
    y: u32,
    depth: f32,
    frag: Fragment,
    stats: &mut DrawStats,
) {
    match frag {
        Fragment::Rejected => stats.fragments_rejected += 1,
        Fragment::Accepted(color) => {
            if target.depth_passes(x, y, depth) {
                target.write(x, y, color, depth);
                stats.fragments_accepted += 1;
            } else {
                stats.fragments_depth_failed += 1;
            }
        }
    }
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Top-left fill rule: a pixel centre exactly on an edge belongs to the
/// triangle only when that edge is a left edge (interior towards +x) or a
/// horizontal top edge (interior towards +y, which is down on screen).
fn is_top_left(from: Vec2, to: Vec2, orient: f32) -> bool {
    let toward_x = (from.y - to.y) * orient;
    let toward_y = (to.x - from.x) * orient;
    toward_x > 0.0 || (toward_x == 0.0 && toward_y > 0.0)
}

/// Pixel indices whose centres may fall in `[lo, hi]`, clamped to `0..extent`.
fn pixel_span(lo: f32, hi: f32, extent: u32) -> Option<std::ops::RangeInclusive<u32>> {
    let first = (lo - 0.5).ceil().max(0.0);
    let last = (hi - 0.5).floor().min(extent as f32 - 1.0);
    if first.is_nan() || last.is_nan() || first > last {
        return None;
    }
    Some(first as u32..=last as u32)
}

fn to_screen(clip: Vec4, width: u32, height: u32) -> Vec3 {
    let ndc = clip.xyz() / clip.w;
    Vec3::new(
        (ndc.x * 0.5 + 0.5) * width as f32,
        (0.5 - ndc.y * 0.5) * height as f32,
        ndc.z * 0.5 + 0.5,
    )
}

fn inside_clip_volume(clip: Vec4) -> bool {
    clip.w > 0.0 && clip.xyz().abs().max_element() <= clip.w
}

/// Sutherland-Hodgman against the near plane `z >= -w`.
fn clip_near(tri: &[TileVaryings; 3]) -> Vec<TileVaryings> {
    let dist = |v: &TileVaryings| v.clip.z + v.clip.w;
    let mut out = Vec::with_capacity(4);
    for i in 0..3 {
        let cur = tri[i];
        let next = tri[(i + 1) % 3];
        let (dc, dn) = (dist(&cur), dist(&next));
        if dc >= 0.0 {
            out.push(cur);
        }
        if (dc >= 0.0) != (dn >= 0.0) {
            let t = dc / (dc - dn);
            out.push(TileVaryings {
                clip: cur.clip.lerp(next.clip, t),
                uv: cur.uv.lerp(next.uv, t),
            });
        }
    }
    // Anything left with w <= 0 cannot be projected.
    if out.iter().any(|v| v.clip.w <= 0.0) {
        out.clear();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;

    const OPAQUE: fn(Vec2) -> Vec4 = |_| Vec4::new(1.0, 1.0, 1.0, 1.0);

    fn quad(z: f32, ccw: bool) -> Vec<TileVertex> {
        rect(-1.0, 1.0, z, ccw)
    }

    // Full-height rectangle spanning NDC x in `[x0, x1]`.
    fn rect(x0: f32, x1: f32, z: f32, ccw: bool) -> Vec<TileVertex> {
        let p = |x: f32, y: f32| {
            TileVertex::new(Vec3::new(x, y, z), Vec2::new(x * 0.5 + 0.5, 0.5 - y * 0.5))
        };
        let mut v = vec![
            p(x0, -1.0),
            p(x1, -1.0),
            p(x1, 1.0),
            p(x0, -1.0),
            p(x1, 1.0),
            p(x0, 1.0),
        ];
        if !ccw {
            v.swap(1, 2);
            v.swap(4, 5);
        }
        v
    }

    fn target() -> RenderTarget {
        RenderTarget::new(64, 64).unwrap()
    }

    #[test]
    fn full_screen_quad_covers_every_pixel() {
        let mut t = target();
        let stats = Rasterizer::default().draw_tiles(
            &mut t,
            &TileUniforms::default(),
            &OPAQUE,
            &quad(0.0, true),
        );
        assert_eq!(stats.primitives, 2);
        assert_eq!(stats.primitives_culled, 0);
        assert_eq!(stats.fragments_accepted, 64 * 64);
        assert_eq!(stats.fragments_depth_failed, 0);
        for (x, y) in [(0, 0), (63, 63), (0, 63), (63, 0), (31, 32)] {
            assert_eq!(t.color(x, y), Vec4::ONE);
        }
        assert!((t.depth(10, 10) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn clockwise_triangles_are_culled() {
        let mut t = target();
        let stats = Rasterizer::default().draw_tiles(
            &mut t,
            &TileUniforms::default(),
            &OPAQUE,
            &quad(0.0, false),
        );
        assert_eq!(stats.primitives_culled, 2);
        assert_eq!(stats.fragments_accepted, 0);

        let raster = Rasterizer::new(RasterConfig {
            cull_back_faces: false,
            ..RasterConfig::default()
        });
        let stats = raster.draw_tiles(&mut t, &TileUniforms::default(), &OPAQUE, &quad(0.0, false));
        assert_eq!(stats.fragments_accepted, 64 * 64);
        assert_eq!(stats.fragments_depth_failed, 0);
    }

    #[test]
    fn shared_edge_pixels_are_shaded_once() {
        // x = 0.015625 maps to screen x = 32.5, the centre of column 32.
        let red = |_: Vec2| Vec4::new(1.0, 0.0, 0.0, 1.0);
        let blue = |_: Vec2| Vec4::new(0.0, 0.0, 1.0, 1.0);
        let raster = Rasterizer::default();
        let u = TileUniforms::default();

        let mut t = target();
        let mut stats = raster.draw_tiles(&mut t, &u, &red, &rect(-1.0, 0.015625, 0.0, true));
        stats += raster.draw_tiles(&mut t, &u, &blue, &rect(0.015625, 1.0, 0.0, true));
        assert_eq!(stats.fragments_accepted, 64 * 64);
        assert_eq!(stats.fragments_depth_failed, 0);
        // The edge is a left edge of the right-hand rectangle.
        for y in [0, 17, 40, 63] {
            assert_eq!(t.color(31, y), Vec4::new(1.0, 0.0, 0.0, 1.0));
            assert_eq!(t.color(32, y), Vec4::new(0.0, 0.0, 1.0, 1.0));
        }
    }

    #[test]
    fn top_left_rule_is_winding_independent() {
        let (a, b) = (Vec2::new(0.0, 0.0), Vec2::new(0.0, 10.0));
        // Interior on the +x side of the edge in both orientations.
        assert!(is_top_left(a, b, -1.0));
        assert!(is_top_left(b, a, 1.0));
        assert!(!is_top_left(a, b, 1.0));

        let (l, r) = (Vec2::new(0.0, 5.0), Vec2::new(10.0, 5.0));
        assert!(is_top_left(l, r, 1.0));
        assert!(!is_top_left(l, r, -1.0));
    }

    #[test]
    fn cutout_rejects_transparent_half() {
        let mut t = target();
        t.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
        let left_clear = |uv: Vec2| Vec4::new(1.0, 0.0, 0.0, if uv.x < 0.5 { 0.0 } else { 1.0 });
        let stats = Rasterizer::default().draw_tiles(
            &mut t,
            &TileUniforms::default(),
            &left_clear,
            &quad(0.0, true),
        );
        assert_eq!(stats.fragments_accepted, 32 * 64);
        assert_eq!(stats.fragments_rejected, 32 * 64);
        assert_eq!(t.color(5, 30), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(t.depth(5, 30), 1.0);
        assert_eq!(t.color(60, 30), Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn nearer_surface_wins_regardless_of_order() {
        let red = |_: Vec2| Vec4::new(1.0, 0.0, 0.0, 1.0);
        let blue = |_: Vec2| Vec4::new(0.0, 0.0, 1.0, 1.0);
        let raster = Rasterizer::default();
        let u = TileUniforms::default();

        let mut t = target();
        raster.draw_tiles(&mut t, &u, &red, &quad(-0.5, true));
        let stats = raster.draw_tiles(&mut t, &u, &blue, &quad(0.5, true));
        assert_eq!(stats.fragments_accepted, 0);
        assert_eq!(stats.fragments_depth_failed, 64 * 64);
        assert_eq!(t.color(32, 32), Vec4::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn triangle_crossing_near_plane_is_clipped() {
        let u = TileUniforms {
            mvp: Mat4::perspective_rh_gl(1.2, 1.0, 0.5, 50.0),
        };
        let verts = [
            TileVertex::new(Vec3::new(2.0, -1.0, -4.0), Vec2::X),
            TileVertex::new(Vec3::new(-2.0, -1.0, -4.0), Vec2::ZERO),
            TileVertex::new(Vec3::new(0.0, -1.0, 3.0), Vec2::Y),
        ];
        let mut t = target();
        let stats = Rasterizer::default().draw_tiles(&mut t, &u, &OPAQUE, &verts);
        assert_eq!(stats.primitives, 1);
        assert_eq!(stats.primitives_culled, 0);
        assert!(stats.fragments_accepted > 0);
    }

    #[test]
    fn triangle_fully_behind_camera_is_culled() {
        let u = TileUniforms {
            mvp: Mat4::perspective_rh_gl(1.2, 1.0, 0.5, 50.0),
        };
        let verts = [
            TileVertex::new(Vec3::new(-1.0, 0.0, 2.0), Vec2::ZERO),
            TileVertex::new(Vec3::new(1.0, 0.0, 2.0), Vec2::X),
            TileVertex::new(Vec3::new(0.0, 1.0, 2.0), Vec2::Y),
        ];
        let stats = Rasterizer::default().draw_tiles(&mut target(), &u, &OPAQUE, &verts);
        assert_eq!(stats.primitives_culled, 1);
    }

    fn sprite_at_origin() -> SpriteVertex {
        SpriteVertex::new(Vec3::ZERO, 10.0, Vec2::ZERO)
    }

    fn sprite_uniforms() -> SpriteUniforms {
        SpriteUniforms {
            mvp: Mat4::IDENTITY,
            size_mul: 2.0,
            inv_uv_mul: 1.0,
        }
    }

    #[test]
    fn point_covers_its_footprint() {
        let mut t = target();
        let stats = Rasterizer::default().draw_sprites(
            &mut t,
            &sprite_uniforms(),
            &OPAQUE,
            &[sprite_at_origin()],
        );
        assert_eq!(stats.primitives, 1);
        assert_eq!(stats.fragments_accepted, 20 * 20);
        assert_eq!(t.color(22, 22), Vec4::ONE);
        assert_eq!(t.color(41, 41), Vec4::ONE);
        assert_eq!(t.color(21, 32), Vec4::ZERO);
        assert_eq!(t.color(42, 32), Vec4::ZERO);
    }

    #[test]
    fn point_coord_origin_is_upper_left() {
        let mut t = target();
        let coord = |uv: Vec2| Vec4::new(uv.x, uv.y, 0.0, 1.0);
        Rasterizer::default().draw_sprites(
            &mut t,
            &sprite_uniforms(),
            &coord,
            &[sprite_at_origin()],
        );
        let tl = t.color(22, 22);
        let br = t.color(41, 41);
        assert!((tl.x - 0.025).abs() < 1e-5 && (tl.y - 0.025).abs() < 1e-5);
        assert!((br.x - 0.975).abs() < 1e-5 && (br.y - 0.975).abs() < 1e-5);
    }

    #[test]
    fn near_point_is_culled_without_fragments() {
        let mut uniforms = sprite_uniforms();
        uniforms.mvp = Mat4::from_diagonal(Vec4::new(1.0, 1.0, 1.0, 0.5));
        let mut t = target();
        let stats =
            Rasterizer::default().draw_sprites(&mut t, &uniforms, &OPAQUE, &[sprite_at_origin()]);
        assert_eq!(stats.primitives_culled, 1);
        assert_eq!(stats.fragments_accepted + stats.fragments_rejected, 0);
    }

    #[test]
    fn transparent_sprite_leaves_target_untouched() {
        let mut t = target();
        let clear = |_: Vec2| Vec4::new(1.0, 1.0, 1.0, 0.5);
        let stats = Rasterizer::default().draw_sprites(
            &mut t,
            &sprite_uniforms(),
            &clear,
            &[sprite_at_origin()],
        );
        assert_eq!(stats.fragments_rejected, 400);
        assert_eq!(t.color(32, 32), Vec4::ZERO);
        assert_eq!(t.depth(32, 32), 1.0);
    }

    #[test]
    fn point_size_is_clamped() {
        let raster = Rasterizer::new(RasterConfig {
            max_point_size: 4.0,
            ..RasterConfig::default()
        });
        let stats = raster.draw_sprites(
            &mut target(),
            &sprite_uniforms(),
            &OPAQUE,
            &[sprite_at_origin()],
        );
        assert_eq!(stats.fragments_accepted, 16);
    }

    #[test]
    fn offscreen_point_is_culled() {
        let v = SpriteVertex::new(Vec3::new(3.0, 0.0, 0.0), 10.0, Vec2::ZERO);
        let stats =
            Rasterizer::default().draw_sprites(&mut target(), &sprite_uniforms(), &OPAQUE, &[v]);
        assert_eq!(stats.primitives_culled, 1);
    }

    #[test]
    fn stats_accumulate() {
        let mut a = DrawStats {
            primitives: 1,
            fragments_accepted: 3,
            ..Default::default()
        };
        a += DrawStats {
            primitives: 2,
            primitives_culled: 1,
            ..Default::default()
        };
        assert_eq!(a.primitives, 3);
        assert_eq!(a.primitives_culled, 1);
        assert_eq!(a.fragments_accepted, 3);
    }
}

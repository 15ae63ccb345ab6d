use std::fmt::Write;

use glam::Vec4;
use rapidframe_common::{SpriteUniforms, SpriteVertex, TileUniforms, TileVertex};

use crate::raster::{DrawStats, RasterConfig, Rasterizer};
use crate::stages;
use crate::target::{RenderTarget, TargetError};
use crate::texture::Texture;

/// One tile draw call: a triangle list with its uniforms and texture.
#[derive(Debug, Clone, Copy)]
pub struct TileBatch<'a> {
    pub uniforms: TileUniforms,
    pub texture: &'a Texture,
    pub vertices: &'a [TileVertex],
}

/// One sprite draw call: a point list with its uniforms and atlas.
#[derive(Debug, Clone, Copy)]
pub struct SpriteBatch<'a> {
    pub uniforms: SpriteUniforms,
    pub texture: &'a Texture,
    pub vertices: &'a [SpriteVertex],
}

#[derive(Debug, Clone, Copy)]
pub enum DrawPass<'a> {
    Tiles(TileBatch<'a>),
    Sprites(SpriteBatch<'a>),
}

/// Everything the host submits for one frame. Passes run in list order.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    pub clear_color: Vec4,
    pub passes: Vec<DrawPass<'a>>,
}

impl<'a> Frame<'a> {
    pub fn new(clear_color: Vec4) -> Self {
        Self {
            clear_color,
            passes: Vec::new(),
        }
    }

    pub fn tiles(mut self, batch: TileBatch<'a>) -> Self {
        self.passes.push(DrawPass::Tiles(batch));
        self
    }

    pub fn sprites(mut self, batch: SpriteBatch<'a>) -> Self {
        self.passes.push(DrawPass::Sprites(batch));
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error("render backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Backend-agnostic frame renderer. All renderers implement this trait.
///
/// A renderer reads the frame description and produces output. It never
/// mutates vertex data, uniforms, or textures.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame.
    fn render(&mut self, frame: &Frame<'_>) -> Result<Self::Output, RenderError>;
}

/// Result of a software render.
#[derive(Debug, Clone)]
pub struct RenderedFrame {
    pub target: RenderTarget,
    pub stats: DrawStats,
}

/// Reference renderer running every stage on the CPU.
#[derive(Debug, Clone)]
pub struct SoftwareRenderer {
    width: u32,
    height: u32,
    raster: Rasterizer,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_config(width, height, RasterConfig::default())
    }

    pub fn with_config(width: u32, height: u32, config: RasterConfig) -> Self {
        Self {
            width,
            height,
            raster: Rasterizer::new(config),
        }
    }
}

impl Renderer for SoftwareRenderer {
    type Output = RenderedFrame;

    fn render(&mut self, frame: &Frame<'_>) -> Result<RenderedFrame, RenderError> {
        let _span = tracing::info_span!("software_frame", passes = frame.passes.len()).entered();
        let mut target = RenderTarget::new(self.width, self.height)?;
        target.clear(frame.clear_color);

        let mut stats = DrawStats::default();
        for pass in &frame.passes {
            stats += match pass {
                DrawPass::Tiles(b) => {
                    self.raster
                        .draw_tiles(&mut target, &b.uniforms, b.texture, b.vertices)
                }
                DrawPass::Sprites(b) => {
                    self.raster
                        .draw_sprites(&mut target, &b.uniforms, b.texture, b.vertices)
                }
            };
        }

        tracing::info!(
            accepted = stats.fragments_accepted,
            rejected = stats.fragments_rejected,
            culled = stats.primitives_culled,
            "frame rendered"
        );
        Ok(RenderedFrame { target, stats })
    }
}

/// Debug text renderer.
///
/// Produces a human-readable description of a frame: one line per pass
/// and one line per sprite with its footprint, or `culled`.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&mut self, frame: &Frame<'_>) -> Result<String, RenderError> {
        let mut out = String::new();
        let c = frame.clear_color;
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "=== Frame (passes={}, clear=({:.2}, {:.2}, {:.2}, {:.2})) ===",
            frame.passes.len(),
            c.x,
            c.y,
            c.z,
            c.w
        );

        for (i, pass) in frame.passes.iter().enumerate() {
            match pass {
                DrawPass::Tiles(b) => {
                    let _ = writeln!(
                        out,
                        "[{i}] tiles: triangles={} texture={}x{}",
                        b.vertices.len() / 3,
                        b.texture.width(),
                        b.texture.height()
                    );
                }
                DrawPass::Sprites(b) => {
                    let _ = writeln!(
                        out,
                        "[{i}] sprites: points={} size_mul={} inv_uv_mul={}",
                        b.vertices.len(),
                        b.uniforms.size_mul,
                        b.uniforms.inv_uv_mul
                    );
                    for (n, v) in b.vertices.iter().enumerate() {
                        let fp = stages::sprite_vertex(&b.uniforms, v).footprint;
                        if fp.is_culled() {
                            let _ = writeln!(out, "  #{n} culled");
                        } else {
                            let _ = writeln!(
                                out,
                                "  #{n} size={:.2} w={:.3} cell=({:.0}, {:.0})",
                                fp.size, fp.clip.w, v.atlas_uv.x, v.atlas_uv.y
                            );
                        }
                    }
                }
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec2, Vec3};

    fn atlas() -> Texture {
        Texture::checkerboard(2, 8).unwrap()
    }

    #[test]
    fn empty_frame_is_clear_color() {
        let mut r = SoftwareRenderer::new(8, 8);
        let out = r.render(&Frame::new(Vec4::new(0.0, 0.0, 1.0, 1.0))).unwrap();
        assert_eq!(out.target.color(4, 4), Vec4::new(0.0, 0.0, 1.0, 1.0));
        assert_eq!(out.stats, DrawStats::default());
    }

    #[test]
    fn zero_sized_renderer_errors() {
        let mut r = SoftwareRenderer::new(0, 8);
        assert!(matches!(
            r.render(&Frame::new(Vec4::ZERO)),
            Err(RenderError::Target(_))
        ));
    }

    #[test]
    fn sprites_draw_over_tiles_in_pass_order() {
        let tex = atlas();
        let tiles = [
            TileVertex::new(Vec3::new(-1.0, -1.0, 0.5), Vec2::new(0.1, 0.1)),
            TileVertex::new(Vec3::new(1.0, -1.0, 0.5), Vec2::new(0.4, 0.1)),
            TileVertex::new(Vec3::new(1.0, 1.0, 0.5), Vec2::new(0.4, 0.4)),
        ];
        let sprites = [SpriteVertex::new(Vec3::new(0.5, -0.5, 0.0), 4.0, Vec2::new(1.0, 1.0))];
        let frame = Frame::new(Vec4::ZERO)
            .tiles(TileBatch {
                uniforms: TileUniforms::default(),
                texture: &tex,
                vertices: &tiles,
            })
            .sprites(SpriteBatch {
                uniforms: SpriteUniforms {
                    mvp: Mat4::IDENTITY,
                    size_mul: 2.0,
                    inv_uv_mul: 0.5,
                },
                texture: &tex,
                vertices: &sprites,
            });

        let out = SoftwareRenderer::new(32, 32).render(&frame).unwrap();
        assert_eq!(out.stats.primitives, 2);
        assert!(out.stats.fragments_accepted > 0);
        // Sprite centre (24, 24) is nearer than the tile underneath.
        assert!(out.target.depth(24, 24) < 0.75);
    }

    #[test]
    fn debug_text_lists_footprints_and_culls() {
        let tex = atlas();
        let sprites = [
            SpriteVertex::new(Vec3::ZERO, 10.0, Vec2::new(1.0, 0.0)),
            SpriteVertex::new(Vec3::ZERO, 10.0, Vec2::ZERO),
        ];
        let near = [SpriteVertex::new(Vec3::ZERO, 10.0, Vec2::ZERO)];
        let frame = Frame::new(Vec4::ZERO)
            .sprites(SpriteBatch {
                uniforms: SpriteUniforms {
                    size_mul: 2.0,
                    ..SpriteUniforms::default()
                },
                texture: &tex,
                vertices: &sprites,
            })
            .sprites(SpriteBatch {
                uniforms: SpriteUniforms {
                    mvp: Mat4::from_diagonal(Vec4::new(1.0, 1.0, 1.0, 0.5)),
                    ..SpriteUniforms::default()
                },
                texture: &tex,
                vertices: &near,
            });

        let text = DebugTextRenderer::new().render(&frame).unwrap();
        assert!(text.contains("passes=2"));
        assert!(text.contains("points=2"));
        assert!(text.contains("#0 size=20.00 w=1.000 cell=(1, 0)"));
        assert!(text.contains("#0 culled"));
    }
}

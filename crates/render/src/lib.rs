//! Tile and point-sprite shading: the per-vertex and per-fragment contract
//! of both draw paths, plus a software reference pipeline around it.
//!
//! # Invariants
//! - Stage functions are pure and total; rejection and culling are values,
//!   never errors.
//! - A rejected fragment writes neither colour nor depth.
//! - A point whose clip `w` is below 0.6 leaves the clip volume.
//! - Renderers never mutate the frame they are given.

pub mod atlas;
pub mod camera;
pub mod raster;
pub mod stages;
pub mod target;
pub mod texture;
mod renderer;

pub use atlas::{AtlasError, AtlasLayout};
pub use camera::{Camera, ortho};
pub use raster::{DrawStats, RasterConfig, Rasterizer};
pub use renderer::{
    DebugTextRenderer, DrawPass, Frame, RenderError, RenderedFrame, Renderer, SoftwareRenderer,
    SpriteBatch, TileBatch,
};
pub use stages::Fragment;
pub use target::{RenderTarget, TargetError};
pub use texture::{FilterMode, Sampler, Texture, TextureError, WrapMode};

pub fn crate_info() -> &'static str {
    "rapidframe-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}

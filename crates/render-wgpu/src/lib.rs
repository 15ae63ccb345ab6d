//! wgpu render backend for rapidframe.
//!
//! Renders the tile cutout pass and the point-sprite pass offscreen and
//! reads the colour target back. WebGPU has no point primitives with a
//! shader-controlled size, so sprites are instanced quads whose vertex
//! stage derives the footprint and the point coordinate.
//!
//! # Invariants
//! - Shader thresholds and the near-plane cull match `rapidframe-render`'s stages.
//! - GL clip depth is remapped to WebGPU's range in the vertex stage only.

mod gpu;
mod shaders;

pub use gpu::{GpuError, WgpuRenderer};
pub use shaders::{SPRITE_SHADER, TILE_SHADER};

//! Shared value types for the rapidframe draw paths.
//!
//! # Invariants
//! - Every type here is a plain value: produced by the host per draw,
//!   consumed once, never retained by the pipeline.

mod types;

pub use types::{
    ALPHA_CUTOFF, CULLED_DEPTH, NEAR_CULL_W, SpriteUniforms, SpriteVertex, TileUniforms,
    TileVertex,
};

pub fn crate_info() -> &'static str {
    "rapidframe-common v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}

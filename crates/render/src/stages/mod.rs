//! Per-vertex and per-fragment stages of the two draw paths.
//!
//! Every function here is pure and total: no logging, no errors. Failure
//! is expressed as [`Fragment::Rejected`] or as a point culled to an
//! off-volume position.

mod point;
mod sprite;
mod tile;
mod transform;

use glam::Vec4;

pub use point::{PointFootprint, SpriteVaryings, point_footprint, sprite_vertex};
pub use sprite::{atlas_coord, sprite_fragment};
pub use tile::tile_fragment;
pub use transform::{TileVaryings, tile_vertex, transform};

/// Outcome of a fragment stage.
///
/// `Rejected` is a terminal per-fragment decision: the compositor writes
/// neither colour nor depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fragment {
    Accepted(Vec4),
    Rejected,
}

impl Fragment {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Fragment::Accepted(_))
    }

    /// The accepted colour, if any.
    pub fn color(&self) -> Option<Vec4> {
        match *self {
            Fragment::Accepted(c) => Some(c),
            Fragment::Rejected => None,
        }
    }
}

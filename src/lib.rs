//! # orbfield
//!
//! Drifting 2D orbs with per-frame proximity graphs, accelerated by a
//! uniform spatial grid.
//!
//! Each frame every orb moves along its velocity; orbs that drift past the
//! viewport margin re-enter from a random point on the perimeter. The crate
//! then reports which pairs are within a threshold distance so a renderer
//! can draw connecting lines, without an all-pairs scan.
//!
//! ## Quick Start
//!
//! ```ignore
//! use orbfield::prelude::*;
//!
//! fn main() -> Result<(), GridError> {
//!     let config = OrbConfig::default()
//!         .with_threshold(150.0)
//!         .with_particle_count(250)
//!         .with_seed(7);
//!     let mut sim = Simulation::new(config, 1280.0, 720.0)?;
//!
//!     let mut sink = |frame: &Frame<'_>| {
//!         for segment in frame.line_segments() {
//!             // draw segment.start -> segment.end faded by segment.closeness
//!         }
//!     };
//!     loop {
//!         sim.render(&mut sink)?;
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Orbs
//!
//! An [`Orb`] has a position, a velocity, a radius and a *speed budget*.
//! The budget is a scalar drawn once at creation; every velocity the orb
//! ever gets is that budget split between the two axes, so an orb keeps
//! its pace across recycles.
//!
//! ### The grid
//!
//! [`SpatialGrid`] buckets orb handles ([`OrbId`]) by cell, with a
//! one-cell halo around the viewport. [`SpatialGrid::advance_all`] steps
//! every orb and then relocates the handles that changed cell.
//! [`SpatialGrid::candidate_neighbors`] returns a conservative superset of
//! the orbs within a distance.
//!
//! ### The proximity graph
//!
//! [`ProximityGraph::build`] filters grid candidates with an exact distance
//! test and stores each close pair once, weighted by closeness.
//!
//! | Type | Role |
//! |------|------|
//! | [`Orb`] | Kinematics and edge recycling |
//! | [`Viewport`] | Visible area plus recycling margin |
//! | [`Spawner`] | RNG and motion tuning used for (re)spawning |
//! | [`SpatialGrid`] | Bucketed index and neighbor candidates |
//! | [`ProximityGraph`] | Deduplicated edges for one frame |
//! | [`Simulation`] | Owns all of the above, one call per frame |
//! | [`RenderSink`] | Receives each finished [`Frame`] |

pub mod config;
pub mod error;
mod graph;
mod orb;
pub mod render;
mod simulation;
pub mod spatial;
mod spawn;
pub mod time;
mod viewport;

pub use bytemuck;
pub use config::{Margin, OrbConfig, Population};
pub use error::{ConfigError, GridError, Result};
pub use glam::Vec2;
pub use graph::{Edge, ProximityGraph};
pub use orb::Orb;
pub use render::{Frame, FrameStats, LineSegment, OrbInstance, RenderSink};
pub use simulation::Simulation;
pub use spatial::{CellCoord, Located, OrbId, SpatialGrid};
pub use spawn::{split_budget, Spawner};
pub use viewport::{Side, Viewport};

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use orbfield::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{Margin, OrbConfig, Population};
    pub use crate::error::{ConfigError, GridError};
    pub use crate::graph::{Edge, ProximityGraph};
    pub use crate::orb::Orb;
    pub use crate::render::{Frame, FrameStats, LineSegment, OrbInstance, RenderSink};
    pub use crate::simulation::Simulation;
    pub use crate::spatial::{Located, OrbId, SpatialGrid};
    pub use crate::spawn::Spawner;
    pub use crate::time::FrameClock;
    pub use crate::viewport::{Side, Viewport};
    pub use crate::Vec2;
}

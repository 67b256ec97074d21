//! Hand-off to whatever draws the frame.
//!
//! Only numbers cross this boundary: orb positions and radii, and edges
//! with a closeness weight. Colors, stroke styles and the surface itself
//! belong to the sink.

use bytemuck::{Pod, Zeroable};

use crate::graph::ProximityGraph;
use crate::orb::Orb;
use crate::spatial::OrbId;
use crate::viewport::Viewport;

/// Per-orb record laid out for direct upload as instance data.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct OrbInstance {
    pub position: [f32; 2],
    pub radius: f32,
    /// 1 if the orb has at least one edge this frame, else 0.
    pub connected: u32,
}

/// One connection line, two vec4-sized halves for GPU alignment.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct LineSegment {
    pub start: [f32; 2],
    pub end: [f32; 2],
    pub closeness: f32,
    _pad: [f32; 3],
}

impl LineSegment {
    pub fn new(start: [f32; 2], end: [f32; 2], closeness: f32) -> Self {
        Self {
            start,
            end,
            closeness,
            _pad: [0.0; 3],
        }
    }
}

/// Everything a renderer needs for one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Frames stepped so far, this one included.
    pub index: u64,
    pub viewport: Viewport,
    pub orbs: &'a [Orb],
    pub graph: &'a ProximityGraph,
}

impl Frame<'_> {
    /// Orbs packed as [`OrbInstance`] records, in storage order.
    pub fn orb_instances(&self) -> Vec<OrbInstance> {
        self.orbs
            .iter()
            .enumerate()
            .map(|(i, orb)| OrbInstance {
                position: orb.position().to_array(),
                radius: orb.radius(),
                connected: u32::from(self.graph.degree(OrbId::new(i)) > 0),
            })
            .collect()
    }

    /// Edges packed as [`LineSegment`] records, in discovery order.
    pub fn line_segments(&self) -> Vec<LineSegment> {
        self.graph
            .edges()
            .iter()
            .filter_map(|edge| {
                let a = self.orbs.get(edge.a.index())?;
                let b = self.orbs.get(edge.b.index())?;
                Some(LineSegment::new(
                    a.position().to_array(),
                    b.position().to_array(),
                    edge.closeness,
                ))
            })
            .collect()
    }
}

/// Receiver of finished frames.
pub trait RenderSink {
    fn draw(&mut self, frame: &Frame<'_>);
}

impl<F> RenderSink for F
where
    F: FnMut(&Frame<'_>),
{
    fn draw(&mut self, frame: &Frame<'_>) {
        self(frame)
    }
}

/// A sink that draws nothing and keeps running counts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub frames: u64,
    pub last_edges: usize,
    pub max_edges: usize,
    pub total_edges: u64,
    pub last_connected: usize,
}

impl FrameStats {
    /// Mean edges per frame seen so far.
    pub fn mean_edges(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.total_edges as f64 / self.frames as f64
        }
    }
}

impl RenderSink for FrameStats {
    fn draw(&mut self, frame: &Frame<'_>) {
        let edges = frame.graph.len();
        self.frames += 1;
        self.last_edges = edges;
        self.max_edges = self.max_edges.max(edges);
        self.total_edges += edges as u64;
        self.last_connected = frame.graph.connected().iter().filter(|&&c| c).count();
    }
}

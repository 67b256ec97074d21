//! Per-frame proximity graph.
//!
//! For every indexed orb the grid supplies a conservative candidate list;
//! each candidate then goes through an exact squared-distance test. Pairs
//! that pass become undirected edges, stored once regardless of which end
//! discovered them.

use std::collections::HashSet;

use crate::error::{GridError, Result};
use crate::spatial::{Located, OrbId, SpatialGrid};

/// An undirected connection between two orbs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Edge {
    /// End that discovered the pair.
    pub a: OrbId,
    pub b: OrbId,
    /// `(threshold^2 - dist^2) / threshold^2`: 1.0 when the orbs coincide,
    /// 0.0 at exactly the threshold. Used for line fading.
    pub closeness: f32,
}

/// Deduplicated set of edges between orbs closer than a threshold.
#[derive(Clone, Debug, Default)]
pub struct ProximityGraph {
    threshold: f32,
    edges: Vec<Edge>,
    pairs: HashSet<(OrbId, OrbId)>,
    degrees: Vec<u32>,
}

impl ProximityGraph {
    /// Build the graph for the current positions of `items`.
    ///
    /// `grid` must index `items` (see [`SpatialGrid::add`]).
    pub fn build<T: Located>(grid: &SpatialGrid, items: &[T], threshold: f32) -> Result<Self> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(GridError::invalid(format!(
                "proximity threshold must be finite and > 0, got {threshold}"
            )));
        }
        let threshold_sq = threshold * threshold;
        let mut graph = Self {
            threshold,
            edges: Vec::new(),
            pairs: HashSet::new(),
            degrees: vec![0; items.len()],
        };

        let mut candidates_seen = 0usize;
        for cur in grid.iter() {
            let Some(item) = items.get(cur.index()) else {
                continue;
            };
            let candidates = grid.candidates_around(item.position(), threshold)?;
            candidates_seen += candidates.len();
            for nb in candidates {
                if nb == cur {
                    continue;
                }
                let Some(other) = items.get(nb.index()) else {
                    continue;
                };
                let dist_sq = item.position().distance_squared(other.position());
                if dist_sq > threshold_sq {
                    continue;
                }
                graph.insert(cur, nb, (threshold_sq - dist_sq) / threshold_sq);
            }
        }

        log::debug!(
            "proximity graph: {} edges from {} candidates over {} orbs",
            graph.edges.len(),
            candidates_seen,
            grid.len()
        );
        Ok(graph)
    }

    /// Store `(a, b)` unless it, or its reverse, is already present.
    fn insert(&mut self, a: OrbId, b: OrbId, closeness: f32) {
        if self.pairs.contains(&(b, a)) || !self.pairs.insert((a, b)) {
            return;
        }
        self.edges.push(Edge { a, b, closeness });
        for id in [a, b] {
            if let Some(d) = self.degrees.get_mut(id.index()) {
                *d += 1;
            }
        }
    }

    /// Threshold the graph was built with.
    #[inline]
    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Edges in discovery order.
    #[inline]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Whether `a` and `b` are connected, in either orientation.
    pub fn contains(&self, a: OrbId, b: OrbId) -> bool {
        self.pairs.contains(&(a, b)) || self.pairs.contains(&(b, a))
    }

    /// Number of edges touching `id`.
    pub fn degree(&self, id: OrbId) -> u32 {
        self.degrees.get(id.index()).copied().unwrap_or(0)
    }

    /// Per-orb flag: has at least one edge. Indexed by [`OrbId::index`].
    pub fn connected(&self) -> Vec<bool> {
        self.degrees.iter().map(|&d| d > 0).collect()
    }
}

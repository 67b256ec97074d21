//! Frame driver: owns the orbs, the grid and the RNG.

use crate::config::{OrbConfig, Population};
use crate::error::{GridError, Result};
use crate::graph::ProximityGraph;
use crate::orb::Orb;
use crate::render::{Frame, RenderSink};
use crate::spatial::{OrbId, SpatialGrid};
use crate::spawn::Spawner;
use crate::viewport::Viewport;

/// A running orb field.
///
/// Call [`step`](Self::step) then [`query`](Self::query) once per frame,
/// or [`render`](Self::render) to do both and hand the result to a sink.
///
/// ```ignore
/// let mut sim = Simulation::new(OrbConfig::default().with_seed(1), 1280.0, 720.0)?;
/// sim.step()?;
/// let graph = sim.query()?;
/// for edge in graph.edges() { /* draw a line */ }
/// ```
#[derive(Debug)]
pub struct Simulation {
    config: OrbConfig,
    viewport: Viewport,
    orbs: Vec<Orb>,
    grid: SpatialGrid,
    spawner: Spawner,
    frame: u64,
}

impl Simulation {
    /// Spawn a population for a `width x height` viewport.
    pub fn new(config: OrbConfig, width: f32, height: f32) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(width, height, config.resolved_margin())?;
        let mut spawner = Spawner::from_config(&config);
        let count = config.particle_count(width, height);
        let orbs = (0..count)
            .map(|_| Orb::spawn(&viewport, &mut spawner))
            .collect();
        Self::assemble(config, viewport, orbs, spawner)
    }

    /// Start from explicitly placed orbs instead of a random population.
    ///
    /// Every orb must lie inside the expanded viewport.
    pub fn with_orbs(config: OrbConfig, width: f32, height: f32, orbs: Vec<Orb>) -> Result<Self> {
        config.validate()?;
        let viewport = Viewport::new(width, height, config.resolved_margin())?;
        if let Some(i) = orbs.iter().position(|o| o.is_out_of_bounds(&viewport)) {
            return Err(GridError::invalid(format!(
                "orb {i} at {:?} starts outside the viewport margin",
                orbs[i].position()
            )));
        }
        let spawner = Spawner::from_config(&config);
        Self::assemble(config, viewport, orbs, spawner)
    }

    fn assemble(
        config: OrbConfig,
        viewport: Viewport,
        orbs: Vec<Orb>,
        spawner: Spawner,
    ) -> Result<Self> {
        let grid = build_grid(&config, &viewport, &orbs)?;
        log::info!(
            "orb field {}x{}: {} orbs, threshold {}, margin {:.1}, grid {:?}",
            viewport.width(),
            viewport.height(),
            orbs.len(),
            config.threshold,
            viewport.margin(),
            grid.dimensions()
        );
        Ok(Self {
            config,
            viewport,
            orbs,
            grid,
            spawner,
            frame: 0,
        })
    }

    /// Advance every orb one frame and bring the grid up to date.
    ///
    /// Returns how many orbs changed cell.
    pub fn step(&mut self) -> Result<usize> {
        let viewport = self.viewport;
        let spawner = &mut self.spawner;
        let moved = self
            .grid
            .advance_all(&mut self.orbs, |orb| orb.advance(&viewport, spawner))?;
        self.frame += 1;
        Ok(moved)
    }

    /// Proximity graph for the current positions.
    pub fn query(&self) -> Result<ProximityGraph> {
        ProximityGraph::build(&self.grid, &self.orbs, self.config.threshold)
    }

    /// Step, build the graph, and hand both to `sink`.
    pub fn render<S: RenderSink + ?Sized>(&mut self, sink: &mut S) -> Result<()> {
        self.step()?;
        let graph = self.query()?;
        sink.draw(&Frame {
            index: self.frame,
            viewport: self.viewport,
            orbs: &self.orbs,
            graph: &graph,
        });
        Ok(())
    }

    /// Adopt a new viewport size.
    ///
    /// Orbs now outside the margin are recycled onto the new perimeter, a
    /// density-based population grows or shrinks to match the new area, and
    /// the grid is rebuilt and re-populated. On error nothing changes.
    pub fn resize(&mut self, width: f32, height: f32) -> Result<()> {
        let viewport = Viewport::new(width, height, self.config.resolved_margin())?;
        let mut orbs = self.orbs.clone();
        let mut spawner = self.spawner.clone();

        for orb in orbs.iter_mut().filter(|o| o.is_out_of_bounds(&viewport)) {
            orb.recycle(&viewport, &mut spawner);
        }
        if let Population::Density(_) = self.config.population {
            let target = self.config.particle_count(width, height);
            if target < orbs.len() {
                orbs.truncate(target);
            } else {
                let missing = target - orbs.len();
                orbs.extend((0..missing).map(|_| Orb::spawn(&viewport, &mut spawner)));
            }
        }

        let grid = build_grid(&self.config, &viewport, &orbs)?;
        log::info!(
            "resized to {width}x{height}: {} orbs, grid {:?}",
            orbs.len(),
            grid.dimensions()
        );
        self.viewport = viewport;
        self.orbs = orbs;
        self.spawner = spawner;
        self.grid = grid;
        Ok(())
    }

    #[inline]
    pub fn orbs(&self) -> &[Orb] {
        &self.orbs
    }

    #[inline]
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    #[inline]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    pub fn config(&self) -> &OrbConfig {
        &self.config
    }

    /// Frames stepped so far.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Grid for `viewport`, populated with every orb.
///
/// Recycled orbs sit exactly `margin` outside the viewport, so the halo cell
/// must be strictly wider than the margin on both axes.
fn build_grid(config: &OrbConfig, viewport: &Viewport, orbs: &[Orb]) -> Result<SpatialGrid> {
    let mut grid = SpatialGrid::new(
        viewport.width(),
        viewport.height(),
        config.resolved_cell_size(),
    )?;
    let cell = grid.cell_size();
    if viewport.margin() >= cell.min_element() {
        return Err(GridError::invalid(format!(
            "margin {:.1} does not fit the {:.1}x{:.1} halo cells; use a larger cell size or a smaller margin",
            viewport.margin(),
            cell.x,
            cell.y
        )));
    }
    // The corners are what recycling actually produces; in f32 they can
    // round onto the next cell boundary even when the margin fits.
    for corner in [viewport.min(), viewport.max()] {
        if grid.locate(corner).is_err() {
            return Err(GridError::invalid(format!(
                "expanded corner ({}, {}) falls outside the {:?} grid; use a larger cell size or a smaller margin",
                corner.x,
                corner.y,
                grid.dimensions()
            )));
        }
    }
    for i in 0..orbs.len() {
        grid.add(OrbId::new(i), orbs)?;
    }
    Ok(grid)
}

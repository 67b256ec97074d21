//! Uniform spatial grid for neighbor queries.
//!
//! The viewport is divided into `cols x rows` equally sized cells, plus a
//! one-cell halo on every side so orbs drifting slightly outside the visible
//! area still hash to allocated storage. Each cell holds a bucket of
//! [`OrbId`] handles into storage owned by the caller; the grid itself never
//! owns particles.
//!
//! # Cell layout
//!
//! ```text
//!   x:   0      1     ...   cols-2   cols-1
//!      +----+---------...---------+----+
//!      |halo|      interior       |halo|
//!      +----+---------...---------+----+
//! ```
//!
//! A position maps to `(floor(x / cell_w) + 1, floor(y / cell_h) + 1)`.
//! Anything that lands outside `[0, cols) x [0, rows)` is an error, never a
//! clamp: clamping would silently break the bucket invariant.

use glam::Vec2;

use crate::error::{GridError, Result};

/// Anything with a 2D position the grid can hash.
pub trait Located {
    fn position(&self) -> Vec2;
}

impl Located for Vec2 {
    #[inline]
    fn position(&self) -> Vec2 {
        *self
    }
}

/// Handle to an orb: its index in the caller's storage slice.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OrbId(usize);

impl OrbId {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Integer coordinates of a grid cell, halo included.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: usize,
    pub y: usize,
}

/// A pending bucket move recorded during [`SpatialGrid::advance_all`].
#[derive(Clone, Copy, Debug)]
struct Relocation {
    id: OrbId,
    from: CellCoord,
    to: CellCoord,
}

/// Derived geometry for a given viewport size and target cell size.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Geometry {
    width: f32,
    height: f32,
    divisional: f32,
    cols: usize,
    rows: usize,
    cell_size: Vec2,
    cell_diagonal: f32,
}

impl Geometry {
    fn new(width: f32, height: f32, divisional: f32) -> Result<Self> {
        if !divisional.is_finite() || divisional <= 0.0 {
            return Err(GridError::invalid(format!(
                "cell size must be finite and > 0, got {divisional}"
            )));
        }
        if !width.is_finite() || width <= 0.0 || !height.is_finite() || height <= 0.0 {
            return Err(GridError::invalid(format!(
                "grid extent must be a positive finite size, got {width}x{height}"
            )));
        }

        let interior_cols = ((width / divisional).floor() as usize).max(1);
        let interior_rows = ((height / divisional).floor() as usize).max(1);
        let cell_size = Vec2::new(
            width / interior_cols as f32,
            height / interior_rows as f32,
        );

        Ok(Self {
            width,
            height,
            divisional,
            cols: interior_cols + 2,
            rows: interior_rows + 2,
            cell_size,
            cell_diagonal: (cell_size * 0.5).length(),
        })
    }
}

/// Uniform grid over the viewport, bucketing orb handles by cell.
#[derive(Clone, Debug)]
pub struct SpatialGrid {
    geometry: Geometry,
    /// Column-major: cell `(x, y)` lives at `x * rows + y`.
    cells: Vec<Vec<OrbId>>,
    /// Slot currently holding each handle, indexed by `OrbId::index`.
    homes: Vec<Option<usize>>,
    len: usize,
}

impl SpatialGrid {
    /// Build an empty grid for a `width x height` viewport with cells of
    /// roughly `divisional` units.
    ///
    /// The interior gets `max(floor(width / divisional), 1)` columns (rows
    /// likewise), then a halo column/row is added on each side. Cells are
    /// stretched so the interior exactly covers the viewport, so a cell is
    /// never smaller than `divisional` unless the viewport itself is.
    ///
    /// Errors with [`GridError::InvalidConfiguration`] on a non-positive
    /// cell size or extent.
    pub fn new(width: f32, height: f32, divisional: f32) -> Result<Self> {
        let geometry = Geometry::new(width, height, divisional)?;
        log::debug!(
            "spatial grid {}x{} (halo included), cell {:.1}x{:.1}",
            geometry.cols,
            geometry.rows,
            geometry.cell_size.x,
            geometry.cell_size.y
        );
        Ok(Self {
            cells: vec![Vec::new(); geometry.cols * geometry.rows],
            geometry,
            homes: Vec::new(),
            len: 0,
        })
    }

    /// Drop every bucket and rebuild the geometry for a new extent.
    ///
    /// Handles are not re-inserted; the caller re-populates with
    /// [`add`](Self::add). On error the grid is left untouched.
    pub fn reset(&mut self, width: f32, height: f32, divisional: f32) -> Result<()> {
        *self = Self::new(width, height, divisional)?;
        Ok(())
    }

    // ========== Geometry ==========

    /// Total `(cols, rows)`, halo included.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.geometry.cols, self.geometry.rows)
    }

    /// `(cols, rows)` of the visible interior.
    #[inline]
    pub fn interior_dimensions(&self) -> (usize, usize) {
        (self.geometry.cols - 2, self.geometry.rows - 2)
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Width and height of one cell.
    #[inline]
    pub fn cell_size(&self) -> Vec2 {
        self.geometry.cell_size
    }

    /// Half the diagonal of one cell, the per-cell distance bound used to
    /// size neighbor searches.
    #[inline]
    pub fn cell_diagonal(&self) -> f32 {
        self.geometry.cell_diagonal
    }

    /// Viewport extent the grid was built for.
    #[inline]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.geometry.width, self.geometry.height)
    }

    /// Target cell size the grid was built with.
    #[inline]
    pub fn divisional(&self) -> f32 {
        self.geometry.divisional
    }

    /// Number of indexed handles.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // ========== Hashing ==========

    /// Cell containing `position`.
    ///
    /// Errors with [`GridError::IndexOutOfRange`] if the position falls past
    /// the halo, and [`GridError::NonFinitePosition`] for NaN/inf input.
    pub fn locate(&self, position: Vec2) -> Result<CellCoord> {
        if !position.is_finite() {
            return Err(GridError::NonFinitePosition {
                x: position.x,
                y: position.y,
            });
        }
        let cell = position / self.geometry.cell_size;
        let x = cell.x.floor() as i64 + 1;
        let y = cell.y.floor() as i64 + 1;
        let (cols, rows) = self.dimensions();
        if x < 0 || y < 0 || x >= cols as i64 || y >= rows as i64 {
            return Err(GridError::IndexOutOfRange { x, y, cols, rows });
        }
        Ok(CellCoord {
            x: x as usize,
            y: y as usize,
        })
    }

    /// Handles stored in the cell at `coord`, in insertion order.
    pub fn bucket(&self, coord: CellCoord) -> &[OrbId] {
        self.slot(coord)
            .map(|i| self.cells[i].as_slice())
            .unwrap_or(&[])
    }

    /// The cell currently holding `id`, if it is indexed.
    pub fn cell_of(&self, id: OrbId) -> Option<CellCoord> {
        self.home(id).map(|slot| self.coord(slot))
    }

    #[inline]
    fn home(&self, id: OrbId) -> Option<usize> {
        self.homes.get(id.index()).copied().flatten()
    }

    fn set_home(&mut self, id: OrbId, slot: Option<usize>) {
        if self.homes.len() <= id.index() {
            self.homes.resize(id.index() + 1, None);
        }
        self.homes[id.index()] = slot;
    }

    #[inline]
    fn slot(&self, coord: CellCoord) -> Option<usize> {
        let (cols, rows) = self.dimensions();
        (coord.x < cols && coord.y < rows).then(|| coord.x * rows + coord.y)
    }

    #[inline]
    fn coord(&self, slot: usize) -> CellCoord {
        let rows = self.geometry.rows;
        CellCoord {
            x: slot / rows,
            y: slot % rows,
        }
    }

    // ========== Membership ==========

    /// Index `id`, reading its position from `items`.
    ///
    /// Returns `Ok(false)` if the handle is already indexed in any cell, even
    /// a stale one; each handle lives in exactly one bucket. A stale handle is
    /// repaired by the next [`advance_all`](Self::advance_all).
    pub fn add<T: Located>(&mut self, id: OrbId, items: &[T]) -> Result<bool> {
        let item = items.get(id.index()).ok_or(GridError::UnknownOrb(id.index()))?;
        let coord = self.locate(item.position())?;
        if self.home(id).is_some() {
            return Ok(false);
        }
        let slot = coord.x * self.geometry.rows + coord.y;
        self.cells[slot].push(id);
        self.set_home(id, Some(slot));
        self.len += 1;
        Ok(true)
    }

    /// Remove `id` from whichever bucket holds it.
    ///
    /// Returns `Ok(false)` if it was not indexed.
    pub fn remove<T: Located>(&mut self, id: OrbId, items: &[T]) -> Result<bool> {
        if id.index() >= items.len() {
            return Err(GridError::UnknownOrb(id.index()));
        }
        let Some(slot) = self.home(id) else {
            return Ok(false);
        };
        let coord = self.coord(slot);
        let removed = self.detach(id, coord);
        if removed {
            self.set_home(id, None);
            self.len -= 1;
        }
        Ok(removed)
    }

    fn detach(&mut self, id: OrbId, coord: CellCoord) -> bool {
        let Some(slot) = self.slot(coord) else {
            return false;
        };
        let bucket = &mut self.cells[slot];
        match bucket.iter().position(|&b| b == id) {
            Some(pos) => {
                bucket.remove(pos);
                true
            }
            None => false,
        }
    }

    // ========== Per-frame update ==========

    /// Advance every indexed item with `step`, then move handles whose cell
    /// changed.
    ///
    /// Runs in two phases: the sweep only records relocations in a staging
    /// list, and buckets are rewritten after the sweep completes, so bucket
    /// membership never changes while buckets are being iterated. Each item
    /// is stepped exactly once. Returns the number of relocated handles.
    ///
    /// An error means an item left the grid (the halo is too thin for the
    /// margin its `step` allows). Items stepped before the failure keep
    /// their new positions, but no bucket is modified.
    pub fn advance_all<T, F>(&mut self, items: &mut [T], mut step: F) -> Result<usize>
    where
        T: Located,
        F: FnMut(&mut T),
    {
        let mut staged: Vec<Relocation> = Vec::new();

        for (slot, bucket) in self.cells.iter().enumerate() {
            let from = self.coord(slot);
            for &id in bucket {
                let item = items
                    .get_mut(id.index())
                    .ok_or(GridError::UnknownOrb(id.index()))?;
                step(item);
                let to = self.locate(item.position())?;
                if to != from {
                    staged.push(Relocation { id, from, to });
                }
            }
        }

        let rows = self.geometry.rows;
        for r in &staged {
            let slot = r.to.x * rows + r.to.y;
            self.detach(r.id, r.from);
            self.cells[slot].push(r.id);
            self.set_home(r.id, Some(slot));
        }

        log::trace!("advance_all: {} of {} handles relocated", staged.len(), self.len);
        Ok(staged.len())
    }

    // ========== Traversal ==========

    /// All handles in cell-major, then insertion, order.
    pub fn iter(&self) -> impl Iterator<Item = OrbId> + '_ {
        self.cells.iter().flatten().copied()
    }

    /// Call `visitor` on every indexed item, in [`iter`](Self::iter) order.
    ///
    /// Handles that no longer resolve in `items` are skipped.
    pub fn for_each<T, F>(&self, items: &[T], mut visitor: F)
    where
        F: FnMut(OrbId, &T),
    {
        for id in self.iter() {
            if let Some(item) = items.get(id.index()) {
                visitor(id, item);
            }
        }
    }

    /// Fold every indexed item into an accumulator, in
    /// [`iter`](Self::iter) order, and return the final value.
    ///
    /// This is a left fold: `combine` sees items first to last, each call
    /// receiving the previous call's result.
    pub fn fold<T, A, F>(&self, items: &[T], seed: A, mut combine: F) -> A
    where
        F: FnMut(A, OrbId, &T) -> A,
    {
        self.iter().fold(seed, |acc, id| match items.get(id.index()) {
            Some(item) => combine(acc, id, item),
            None => acc,
        })
    }

    // ========== Queries ==========

    /// Half-width, in cells, of the block scanned for a query of `distance`.
    ///
    /// The base bound is `ceil(distance / cell_diagonal)`. When cells are
    /// elongated enough that this undershoots along one axis, that axis is
    /// widened to `ceil(distance / cell_extent)` so no true neighbor is ever
    /// skipped.
    pub fn reach(&self, distance: f32) -> (usize, usize) {
        let distance = distance.max(0.0);
        let base = (distance / self.geometry.cell_diagonal).ceil();
        let size = self.geometry.cell_size;
        let rx = base.max((distance / size.x).ceil());
        let ry = base.max((distance / size.y).ceil());
        (rx as usize, ry as usize)
    }

    /// Every handle in any cell that could hold an item within `distance`
    /// of `items[id]`, the query item itself included.
    ///
    /// This over-reports near the block boundary; callers must still run
    /// an exact distance test.
    pub fn candidate_neighbors<T: Located>(
        &self,
        items: &[T],
        id: OrbId,
        distance: f32,
    ) -> Result<Vec<OrbId>> {
        let item = items.get(id.index()).ok_or(GridError::UnknownOrb(id.index()))?;
        self.candidates_around(item.position(), distance)
    }

    /// Like [`candidate_neighbors`](Self::candidate_neighbors) but centered
    /// on an arbitrary point.
    pub fn candidates_around(&self, position: Vec2, distance: f32) -> Result<Vec<OrbId>> {
        let home = self.locate(position)?;
        let (rx, ry) = self.reach(distance);
        let (cols, rows) = self.dimensions();

        let x0 = home.x.saturating_sub(rx);
        let x1 = home.x.saturating_add(rx).min(cols - 1);
        let y0 = home.y.saturating_sub(ry);
        let y1 = home.y.saturating_add(ry).min(rows - 1);

        let mut out = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                out.extend_from_slice(&self.cells[x * rows + y]);
            }
        }
        Ok(out)
    }

    /// Exact proximity test on squared distance.
    ///
    /// `true` iff the two items are at most `sqrt(distance_squared)` apart.
    #[inline]
    pub fn is_nearby<A: Located, B: Located>(a: &A, b: &B, distance_squared: f32) -> bool {
        a.position().distance_squared(b.position()) <= distance_squared
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> impl Iterator<Item = OrbId> {
        (0..n).map(OrbId::new)
    }

    #[test]
    fn test_dimensions_include_halo() {
        let grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        assert_eq!(grid.dimensions(), (7, 6));
        assert_eq!(grid.interior_dimensions(), (5, 4));
        assert!((grid.cell_size().x - 160.0).abs() < 1e-4);
        assert!((grid.cell_size().y - 150.0).abs() < 1e-4);
        let expected = (80.0f32 * 80.0 + 75.0 * 75.0).sqrt();
        assert!((grid.cell_diagonal() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_cell_larger_than_viewport_gives_single_interior_cell() {
        let grid = SpatialGrid::new(100.0, 100.0, 150.0).unwrap();
        assert_eq!(grid.dimensions(), (3, 3));
        assert_eq!(grid.cell_count(), 9);
        assert_eq!(grid.cell_size(), Vec2::splat(100.0));
    }

    #[test]
    fn test_rejects_non_positive_cell_size() {
        assert!(matches!(
            SpatialGrid::new(800.0, 600.0, 0.0),
            Err(GridError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            SpatialGrid::new(800.0, 600.0, -10.0),
            Err(GridError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_locate_offsets_into_halo() {
        let grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        assert_eq!(grid.locate(Vec2::ZERO).unwrap(), CellCoord { x: 1, y: 1 });
        assert_eq!(grid.locate(Vec2::new(-1.0, -1.0)).unwrap(), CellCoord { x: 0, y: 0 });
        assert_eq!(grid.locate(Vec2::new(799.0, 599.0)).unwrap(), CellCoord { x: 5, y: 4 });
        assert_eq!(grid.locate(Vec2::new(800.0, 600.0)).unwrap(), CellCoord { x: 6, y: 5 });
    }

    #[test]
    fn test_locate_past_halo_fails_loudly() {
        let grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        let err = grid.locate(Vec2::new(-200.0, 10.0)).unwrap_err();
        assert!(matches!(err, GridError::IndexOutOfRange { x: -1, .. }));
        assert!(grid.locate(Vec2::new(10.0, 1000.0)).is_err());
        assert!(matches!(
            grid.locate(Vec2::new(f32::NAN, 0.0)),
            Err(GridError::NonFinitePosition { .. })
        ));
    }

    #[test]
    fn test_add_and_remove() {
        let items = vec![Vec2::new(10.0, 10.0), Vec2::new(500.0, 300.0)];
        let mut grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        for id in ids(items.len()) {
            assert!(grid.add(id, &items).unwrap());
        }
        assert!(!grid.add(OrbId::new(0), &items).unwrap());
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cell_of(OrbId::new(1)), Some(CellCoord { x: 4, y: 3 }));

        assert!(grid.remove(OrbId::new(0), &items).unwrap());
        assert!(!grid.remove(OrbId::new(0), &items).unwrap());
        assert_eq!(grid.len(), 1);
        assert!(matches!(
            grid.add(OrbId::new(9), &items),
            Err(GridError::UnknownOrb(9))
        ));
    }

    #[test]
    fn test_add_ignores_handle_indexed_in_a_stale_cell() {
        let mut items = vec![Vec2::new(10.0, 10.0)];
        let mut grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        assert!(grid.add(OrbId::new(0), &items).unwrap());
        let before = grid.cell_of(OrbId::new(0));

        items[0] = Vec2::new(700.0, 500.0);
        assert!(!grid.add(OrbId::new(0), &items).unwrap());
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.iter().count(), 1);
        assert_eq!(grid.cell_of(OrbId::new(0)), before);

        // One sweep steps the orb once and moves it to its real cell.
        let mut steps = 0;
        grid.advance_all(&mut items, |_| steps += 1).unwrap();
        assert_eq!(steps, 1);
        assert_eq!(grid.cell_of(OrbId::new(0)), grid.locate(items[0]).ok());

        // Removal finds the handle even after its item moved away.
        items[0] = Vec2::new(10.0, 10.0);
        assert!(grid.remove(OrbId::new(0), &items).unwrap());
        assert!(grid.is_empty());
        assert_eq!(grid.cell_of(OrbId::new(0)), None);
    }

    #[test]
    fn test_advance_all_relocates_after_sweep() {
        let mut items = vec![Vec2::new(155.0, 10.0), Vec2::new(10.0, 10.0)];
        let mut grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        for id in ids(items.len()) {
            grid.add(id, &items).unwrap();
        }

        // Push every item 10 units right: item 0 crosses into the next column.
        let mut stepped = 0;
        let moved = grid
            .advance_all(&mut items, |p| {
                *p += Vec2::new(10.0, 0.0);
                stepped += 1;
            })
            .unwrap();

        assert_eq!(stepped, 2, "each item is stepped exactly once");
        assert_eq!(moved, 1);
        assert_eq!(grid.cell_of(OrbId::new(0)), Some(CellCoord { x: 2, y: 1 }));
        assert_eq!(grid.cell_of(OrbId::new(1)), Some(CellCoord { x: 1, y: 1 }));
        assert_eq!(grid.len(), 2);
    }

    #[test]
    fn test_fold_and_for_each_visit_everything_once() {
        let items: Vec<Vec2> = (0..20)
            .map(|i| Vec2::new(i as f32 * 40.0, i as f32 * 30.0))
            .collect();
        let mut grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        for id in ids(items.len()) {
            grid.add(id, &items).unwrap();
        }

        let total = grid.fold(&items, 0.0f32, |acc, _, p| acc + p.x);
        let expected: f32 = items.iter().map(|p| p.x).sum();
        assert!((total - expected).abs() < 1e-2);

        let mut seen = Vec::new();
        grid.for_each(&items, |id, _| seen.push(id));
        seen.sort();
        assert_eq!(seen, ids(items.len()).collect::<Vec<_>>());
        assert_eq!(grid.iter().count(), 20);
    }

    #[test]
    fn test_reach_uses_half_diagonal() {
        let grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        // half diagonal ~109.7: 150 / 109.7 -> 2 cells each way.
        assert_eq!(grid.reach(150.0), (2, 2));
        assert_eq!(grid.reach(0.0), (0, 0));
    }

    #[test]
    fn test_candidates_include_self_and_clip_to_grid() {
        let items = vec![Vec2::new(1.0, 1.0), Vec2::new(40.0, 5.0), Vec2::new(790.0, 590.0)];
        let mut grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        for id in ids(items.len()) {
            grid.add(id, &items).unwrap();
        }
        let found = grid.candidate_neighbors(&items, OrbId::new(0), 150.0).unwrap();
        assert!(found.contains(&OrbId::new(0)));
        assert!(found.contains(&OrbId::new(1)));
        assert!(!found.contains(&OrbId::new(2)));
    }

    #[test]
    fn test_is_nearby_polarity() {
        let a = Vec2::new(0.0, 0.0);
        let near = Vec2::new(30.0, 40.0); // distance 50
        let far = Vec2::new(300.0, 400.0); // distance 500
        assert!(SpatialGrid::is_nearby(&a, &near, 150.0 * 150.0));
        assert!(!SpatialGrid::is_nearby(&a, &far, 150.0 * 150.0));
        assert!(SpatialGrid::is_nearby(&a, &near, 50.0 * 50.0));
    }

    #[test]
    fn test_reset_discards_buckets() {
        let items = vec![Vec2::new(10.0, 10.0)];
        let mut grid = SpatialGrid::new(800.0, 600.0, 150.0).unwrap();
        grid.add(OrbId::new(0), &items).unwrap();
        grid.reset(1600.0, 900.0, 100.0).unwrap();
        assert!(grid.is_empty());
        assert_eq!(grid.dimensions(), (18, 11));
        assert!(grid.reset(1600.0, 900.0, 0.0).is_err());
        assert_eq!(grid.dimensions(), (18, 11));
    }
}

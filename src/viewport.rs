//! Viewport geometry.
//!
//! The viewport is the visible `width x height` area, with `(0, 0)` at the
//! top-left corner and `y` growing downward. Orbs are allowed to drift a
//! `margin` beyond every side before they are recycled, so most queries
//! work on the *expanded* rectangle `[-margin, width + margin] x
//! [-margin, height + margin]`.

use glam::Vec2;

use crate::error::{GridError, Result};

/// One side of the expanded viewport rectangle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Top,
    Right,
    Bottom,
    Left,
}

impl Side {
    /// All sides in perimeter order (clockwise from the top).
    pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

    /// Unit vector pointing from this side into the viewport.
    pub fn inward(self) -> Vec2 {
        match self {
            Side::Top => Vec2::Y,
            Side::Right => Vec2::NEG_X,
            Side::Bottom => Vec2::NEG_Y,
            Side::Left => Vec2::X,
        }
    }
}

/// Viewport size plus the recycling margin around it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    width: f32,
    height: f32,
    margin: f32,
}

impl Viewport {
    /// Create a viewport.
    ///
    /// Errors with [`GridError::InvalidConfiguration`] if the size is not
    /// strictly positive or the margin is negative.
    pub fn new(width: f32, height: f32, margin: f32) -> Result<Self> {
        if !width.is_finite() || width <= 0.0 || !height.is_finite() || height <= 0.0 {
            return Err(GridError::invalid(format!(
                "viewport must be a positive finite size, got {width}x{height}"
            )));
        }
        if !margin.is_finite() || margin < 0.0 {
            return Err(GridError::invalid(format!(
                "viewport margin must be finite and >= 0, got {margin}"
            )));
        }
        Ok(Self {
            width,
            height,
            margin,
        })
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    /// How far past each side an orb may travel before it is recycled.
    #[inline]
    pub fn margin(&self) -> f32 {
        self.margin
    }

    /// Top-left corner of the expanded rectangle.
    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::splat(-self.margin)
    }

    /// Bottom-right corner of the expanded rectangle.
    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.width + self.margin, self.height + self.margin)
    }

    /// Size of the expanded rectangle.
    #[inline]
    pub fn expanded_size(&self) -> Vec2 {
        self.max() - self.min()
    }

    /// `true` while `p` lies inside the expanded rectangle (edges included).
    pub fn contains(&self, p: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        !(p.x < min.x || p.x > max.x || p.y < min.y || p.y > max.y)
    }

    /// Length of one side of the expanded rectangle.
    pub fn side_length(&self, side: Side) -> f32 {
        let size = self.expanded_size();
        match side {
            Side::Top | Side::Bottom => size.x,
            Side::Left | Side::Right => size.y,
        }
    }

    /// Perimeter of the expanded rectangle.
    pub fn perimeter(&self) -> f32 {
        Side::ALL.iter().map(|&s| self.side_length(s)).sum()
    }

    /// Distance from `p` to the infinite line through `side`.
    pub fn distance_to_side(&self, p: Vec2, side: Side) -> f32 {
        let (min, max) = (self.min(), self.max());
        match side {
            Side::Top => (p.y - min.y).abs(),
            Side::Right => (p.x - max.x).abs(),
            Side::Bottom => (p.y - max.y).abs(),
            Side::Left => (p.x - min.x).abs(),
        }
    }

    /// The side `p` sits on, within `tolerance`, if it is on the boundary
    /// of the expanded rectangle at all.
    pub fn side_of(&self, p: Vec2, tolerance: f32) -> Option<Side> {
        if !self.contains(p) {
            return None;
        }
        Side::ALL
            .into_iter()
            .find(|&side| self.distance_to_side(p, side) <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_degenerate_sizes() {
        assert!(Viewport::new(0.0, 600.0, 10.0).is_err());
        assert!(Viewport::new(800.0, -1.0, 10.0).is_err());
        assert!(Viewport::new(800.0, 600.0, -0.5).is_err());
        assert!(Viewport::new(f32::NAN, 600.0, 0.0).is_err());
    }

    #[test]
    fn test_contains_uses_expanded_bounds() {
        let vp = Viewport::new(800.0, 600.0, 135.0).unwrap();
        assert!(vp.contains(Vec2::new(-135.0, -135.0)));
        assert!(vp.contains(Vec2::new(935.0, 735.0)));
        assert!(!vp.contains(Vec2::new(935.1, 10.0)));
        assert!(!vp.contains(Vec2::new(10.0, -135.1)));
    }

    #[test]
    fn test_perimeter_counts_margin_on_every_side() {
        let vp = Viewport::new(800.0, 600.0, 100.0).unwrap();
        assert_eq!(vp.side_length(Side::Top), 1000.0);
        assert_eq!(vp.side_length(Side::Left), 800.0);
        assert_eq!(vp.perimeter(), 3600.0);
    }

    #[test]
    fn test_side_of() {
        let vp = Viewport::new(100.0, 50.0, 10.0).unwrap();
        assert_eq!(vp.side_of(Vec2::new(40.0, -10.0), 1e-3), Some(Side::Top));
        assert_eq!(vp.side_of(Vec2::new(110.0, 20.0), 1e-3), Some(Side::Right));
        assert_eq!(vp.side_of(Vec2::new(40.0, 60.0), 1e-3), Some(Side::Bottom));
        assert_eq!(vp.side_of(Vec2::new(-10.0, 20.0), 1e-3), Some(Side::Left));
        assert_eq!(vp.side_of(Vec2::new(50.0, 25.0), 1e-3), None);
    }

    #[test]
    fn test_inward_points_into_viewport() {
        let vp = Viewport::new(100.0, 100.0, 10.0).unwrap();
        let center = Vec2::splat(50.0);
        for side in Side::ALL {
            // A point on the side nudged inward gets closer to the center.
            let on_side = match side {
                Side::Top => Vec2::new(50.0, -10.0),
                Side::Right => Vec2::new(110.0, 50.0),
                Side::Bottom => Vec2::new(50.0, 110.0),
                Side::Left => Vec2::new(-10.0, 50.0),
            };
            assert_eq!(vp.side_of(on_side, 1e-3), Some(side));
            let nudged = on_side + side.inward();
            assert!(nudged.distance(center) < on_side.distance(center));
        }
    }
}

//! Random placement and velocity generation for orbs.
//!
//! A [`Spawner`] carries the motion tuning (speed-budget range, minimum
//! per-axis speed, radius) together with the RNG, and is passed explicitly
//! to [`Orb::advance`](crate::Orb::advance) so recycling never reaches for
//! shared state.

use glam::Vec2;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::OrbConfig;
use crate::viewport::{Side, Viewport};

/// Split a scalar speed budget into two positive per-axis speeds.
///
/// `u` is a uniform sample in `[0, 1)`. The first component is
/// `u * budget` clamped to `[min_axis, budget - min_axis]`; the second takes
/// the rest, so `a + b == budget`. When the budget cannot cover
/// `min_axis` on both axes, both come back as `min_axis`.
pub fn split_budget(budget: f32, min_axis: f32, u: f32) -> Vec2 {
    if budget < 2.0 * min_axis {
        return Vec2::splat(min_axis);
    }
    let a = (u * budget).clamp(min_axis, budget - min_axis);
    Vec2::new(a, budget - a)
}

/// Context used when creating or recycling orbs.
#[derive(Debug, Clone)]
pub struct Spawner {
    /// Lower bound for a freshly drawn speed budget.
    pub min_budget: f32,
    /// Upper bound for a freshly drawn speed budget.
    pub max_budget: f32,
    /// Minimum speed on either axis after splitting a budget.
    pub min_axis_speed: f32,
    /// Radius given to spawned orbs.
    pub radius: f32,
    rng: SmallRng,
}

impl Spawner {
    /// Create a spawner.
    ///
    /// With `seed == None` the RNG is seeded from the system clock, so runs
    /// differ; pass a seed for reproducible populations.
    pub fn new(
        min_budget: f32,
        max_budget: f32,
        min_axis_speed: f32,
        radius: f32,
        seed: Option<u64>,
    ) -> Self {
        let seed = seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(42)
        });
        Self {
            min_budget,
            max_budget,
            min_axis_speed,
            radius,
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Spawner matching the motion section of `config`.
    pub fn from_config(config: &OrbConfig) -> Self {
        Self::new(
            config.min_speed_budget,
            config.max_speed_budget,
            config.min_axis_speed,
            config.radius,
            config.seed,
        )
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// `1.0` or `-1.0` with equal probability.
    #[inline]
    pub fn random_sign(&mut self) -> f32 {
        if self.rng.gen_bool(0.5) {
            1.0
        } else {
            -1.0
        }
    }

    // ========== Speed ==========

    /// Draw a speed budget: `max(u * max_budget, min_budget)`.
    ///
    /// Every draw below `min_budget` collapses onto it, so slow orbs are
    /// over-represented; that is the intended look.
    pub fn speed_budget(&mut self) -> f32 {
        (self.random() * self.max_budget).max(self.min_budget)
    }

    /// Positive per-axis speeds for `budget`. See [`split_budget`].
    pub fn split(&mut self, budget: f32) -> Vec2 {
        let u = self.random();
        split_budget(budget, self.min_axis_speed, u)
    }

    /// Velocity for a brand new orb: budget split with random signs.
    pub fn initial_velocity(&mut self, budget: f32) -> Vec2 {
        let speeds = self.split(budget);
        Vec2::new(
            speeds.x * self.random_sign(),
            speeds.y * self.random_sign(),
        )
    }

    /// Velocity for an orb re-entering through `side`.
    ///
    /// The component perpendicular to `side` points inward; the parallel one
    /// has a random sign.
    pub fn entry_velocity(&mut self, side: Side, budget: f32) -> Vec2 {
        let speeds = self.split(budget);
        match side {
            Side::Top => Vec2::new(speeds.x * self.random_sign(), speeds.y),
            Side::Right => Vec2::new(-speeds.x, speeds.y * self.random_sign()),
            Side::Bottom => Vec2::new(speeds.x * self.random_sign(), -speeds.y),
            Side::Left => Vec2::new(speeds.x, speeds.y * self.random_sign()),
        }
    }

    // ========== Position ==========

    /// Uniform point inside the expanded viewport.
    pub fn point_in(&mut self, viewport: &Viewport) -> Vec2 {
        let size = viewport.expanded_size();
        viewport.min() + Vec2::new(self.random() * size.x, self.random() * size.y)
    }

    /// Uniform point on the perimeter of the expanded viewport.
    ///
    /// A side is chosen with probability proportional to its length, then a
    /// position along it is drawn uniformly.
    pub fn point_on_perimeter(&mut self, viewport: &Viewport) -> (Side, Vec2) {
        let mut along = self.random() * viewport.perimeter();
        let mut side = Side::Left;
        for candidate in Side::ALL {
            let len = viewport.side_length(candidate);
            if along < len {
                side = candidate;
                break;
            }
            along -= len;
        }

        let (min, max) = (viewport.min(), viewport.max());
        let size = viewport.expanded_size();
        let point = match side {
            Side::Top => Vec2::new(min.x + self.random() * size.x, min.y),
            Side::Right => Vec2::new(max.x, min.y + self.random() * size.y),
            Side::Bottom => Vec2::new(min.x + self.random() * size.x, max.y),
            Side::Left => Vec2::new(min.x, min.y + self.random() * size.y),
        };
        (side, point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawner() -> Spawner {
        Spawner::new(2.0, 6.0, 0.3, 2.0, Some(7))
    }

    #[test]
    fn test_split_preserves_budget() {
        for u in [0.0, 0.01, 0.5, 0.99] {
            let v = split_budget(4.0, 0.3, u);
            assert!((v.x + v.y - 4.0).abs() < 1e-5);
            assert!(v.x >= 0.3 && v.y >= 0.3);
        }
    }

    #[test]
    fn test_split_below_minimum_never_stalls() {
        // Budget smaller than 2 * min_axis: both axes move at min_axis.
        let v = split_budget(0.4, 0.3, 0.9);
        assert_eq!(v, Vec2::splat(0.3));
        let v = split_budget(0.0, 0.3, 0.0);
        assert!(v.x > 0.0 && v.y > 0.0);
    }

    #[test]
    fn test_speed_budget_in_range() {
        let mut s = spawner();
        for _ in 0..500 {
            let b = s.speed_budget();
            assert!((2.0..=6.0).contains(&b));
        }
    }

    #[test]
    fn test_entry_velocity_points_inward() {
        let mut s = spawner();
        for side in Side::ALL {
            for _ in 0..50 {
                let v = s.entry_velocity(side, 4.0);
                assert!(v.dot(side.inward()) > 0.0, "{side:?} gave {v:?}");
            }
        }
    }

    #[test]
    fn test_perimeter_point_lies_on_its_side() {
        let vp = Viewport::new(800.0, 600.0, 135.0).unwrap();
        let mut s = spawner();
        for _ in 0..500 {
            let (side, p) = s.point_on_perimeter(&vp);
            assert!(vp.contains(p));
            assert!(vp.distance_to_side(p, side) < 1e-3);
        }
    }

    #[test]
    fn test_perimeter_sides_weighted_by_length() {
        // Expanded 1000x800: top/bottom 1000/3600, left/right 800/3600.
        let vp = Viewport::new(800.0, 600.0, 100.0).unwrap();
        let mut s = spawner();
        let draws = 20_000;
        let mut counts = [0usize; 4];
        for _ in 0..draws {
            let (side, _) = s.point_on_perimeter(&vp);
            let i = Side::ALL.iter().position(|&c| c == side).unwrap();
            counts[i] += 1;
        }
        for (side, count) in Side::ALL.into_iter().zip(counts) {
            let expected = vp.side_length(side) / vp.perimeter();
            let observed = count as f32 / draws as f32;
            assert!(
                (observed - expected).abs() < 0.02,
                "{side:?}: observed {observed:.3}, expected {expected:.3}"
            );
        }
    }

    #[test]
    fn test_entry_velocity_parallel_sign_varies() {
        let mut s = spawner();
        for side in Side::ALL {
            let mut seen = (false, false);
            for _ in 0..200 {
                let v = s.entry_velocity(side, 4.0);
                let parallel = match side {
                    Side::Top | Side::Bottom => v.x,
                    Side::Left | Side::Right => v.y,
                };
                if parallel > 0.0 {
                    seen.0 = true;
                } else if parallel < 0.0 {
                    seen.1 = true;
                }
            }
            assert_eq!(seen, (true, true), "{side:?} never flips its parallel component");
        }
    }

    #[test]
    fn test_seeded_spawners_agree() {
        let vp = Viewport::new(320.0, 240.0, 10.0).unwrap();
        let mut a = spawner();
        let mut b = spawner();
        for _ in 0..10 {
            assert_eq!(a.point_in(&vp), b.point_in(&vp));
        }
    }
}

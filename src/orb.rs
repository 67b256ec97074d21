//! The drifting point particle.
//!
//! An [`Orb`] moves in a straight line at a constant velocity. When it
//! leaves the expanded viewport it is recycled in place: moved to a random
//! point on the viewport perimeter and sent back inward, keeping the speed
//! budget it was born with.

use glam::Vec2;

use crate::error::{GridError, Result};
use crate::spatial::Located;
use crate::spawn::Spawner;
use crate::viewport::{Side, Viewport};

/// A moving point with a radius and a fixed speed budget.
///
/// The velocity is always derived from `speed_budget` by splitting it
/// between the two axes, so `|vx| + |vy|` stays constant for the orb's
/// whole life (up to the minimum-axis-speed clamp).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orb {
    position: Vec2,
    velocity: Vec2,
    radius: f32,
    speed_budget: f32,
}

impl Orb {
    /// Create an orb with explicit kinematics.
    ///
    /// The speed budget is taken from the velocity (`|vx| + |vy|`), so a
    /// later recycle keeps the same magnitude.
    ///
    /// Errors if the radius is not strictly positive or any component is
    /// not finite.
    pub fn new(position: Vec2, velocity: Vec2, radius: f32) -> Result<Self> {
        if !radius.is_finite() || radius <= 0.0 {
            return Err(GridError::invalid(format!(
                "orb radius must be finite and > 0, got {radius}"
            )));
        }
        if !position.is_finite() || !velocity.is_finite() {
            return Err(GridError::invalid("orb position and velocity must be finite"));
        }
        Ok(Self {
            position,
            velocity,
            radius,
            speed_budget: velocity.x.abs() + velocity.y.abs(),
        })
    }

    /// A fresh orb placed uniformly inside the expanded viewport with a
    /// random budget and random velocity signs.
    pub fn spawn(viewport: &Viewport, spawner: &mut Spawner) -> Self {
        let speed_budget = spawner.speed_budget();
        Self {
            position: spawner.point_in(viewport),
            velocity: spawner.initial_velocity(speed_budget),
            radius: spawner.radius,
            speed_budget,
        }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.radius
    }

    /// Scalar speed budget fixed at creation.
    #[inline]
    pub fn speed_budget(&self) -> f32 {
        self.speed_budget
    }

    /// Move one frame; recycle if that carried the orb out of bounds.
    pub fn advance(&mut self, viewport: &Viewport, spawner: &mut Spawner) {
        self.position += self.velocity;
        if self.is_out_of_bounds(viewport) {
            self.recycle(viewport, spawner);
        }
    }

    /// `true` once the orb is strictly outside the expanded viewport.
    #[inline]
    pub fn is_out_of_bounds(&self, viewport: &Viewport) -> bool {
        !viewport.contains(self.position)
    }

    /// Respawn on the perimeter with a new inward velocity of the same
    /// budget. Returns the side the orb re-enters through.
    pub fn recycle(&mut self, viewport: &Viewport, spawner: &mut Spawner) -> Side {
        let (side, position) = spawner.point_on_perimeter(viewport);
        self.position = position;
        self.velocity = spawner.entry_velocity(side, self.speed_budget);
        side
    }

    /// Euclidean distance to `other` is at most `threshold`.
    pub fn is_near(&self, other: &Orb, threshold: f32) -> bool {
        self.position.distance_squared(other.position) <= threshold * threshold
    }

    /// Whether the two orbs are within `threshold` now, or will come within
    /// it at some future time if both keep their current velocities.
    ///
    /// Solves `|dp + t * dv|^2 = threshold^2` for `t` and accepts any root
    /// with `t >= 0`.
    pub fn will_be_near(&self, other: &Orb, threshold: f32) -> bool {
        if self.is_near(other, threshold) {
            return true;
        }
        let dp = other.position - self.position;
        let dv = other.velocity - self.velocity;
        let a = dv.length_squared();
        if a == 0.0 {
            return false;
        }
        let b = 2.0 * dp.dot(dv);
        let c = dp.length_squared() - threshold * threshold;
        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return false;
        }
        let root = discriminant.sqrt();
        let t1 = (-b - root) / (2.0 * a);
        let t2 = (-b + root) / (2.0 * a);
        t1 >= 0.0 || t2 >= 0.0
    }
}

impl Located for Orb {
    #[inline]
    fn position(&self) -> Vec2 {
        self.position
    }
}

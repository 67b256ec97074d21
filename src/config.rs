//! Simulation configuration.
//!
//! [`OrbConfig`] can be built in code with the `with_*` methods or loaded
//! from JSON. Every field has a default, so a config file only needs the
//! values it changes:
//!
//! ```json
//! { "threshold": 120.0, "population": { "density": 0.0002 }, "seed": 7 }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, GridError, Result};

/// How many orbs to simulate.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Population {
    /// A fixed number of orbs regardless of viewport size.
    Count(usize),
    /// Orbs per square unit of visible viewport area.
    Density(f32),
}

impl Default for Population {
    fn default() -> Self {
        Population::Count(250)
    }
}

/// How far outside the viewport an orb may drift before it is recycled.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Margin {
    /// A multiple of the proximity threshold.
    ThresholdFraction(f32),
    /// A multiple of the orb radius.
    RadiusMultiple(f32),
    /// An absolute distance.
    Fixed(f32),
}

impl Default for Margin {
    fn default() -> Self {
        Margin::ThresholdFraction(0.9)
    }
}

/// Complete tuning for a [`Simulation`](crate::Simulation).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OrbConfig {
    /// Distance at or below which two orbs are connected.
    pub threshold: f32,
    pub population: Population,
    /// Lower bound of the per-orb speed budget (units per frame).
    pub min_speed_budget: f32,
    /// Upper bound of the per-orb speed budget (units per frame).
    pub max_speed_budget: f32,
    /// Minimum speed on each axis once a budget is split.
    pub min_axis_speed: f32,
    pub radius: f32,
    /// Target grid cell size; defaults to `threshold`.
    pub cell_size: Option<f32>,
    pub margin: Margin,
    /// RNG seed. `None` seeds from the clock.
    pub seed: Option<u64>,
}

impl Default for OrbConfig {
    fn default() -> Self {
        Self {
            threshold: 150.0,
            population: Population::default(),
            min_speed_budget: 2.0,
            max_speed_budget: 6.0,
            min_axis_speed: 0.3,
            radius: 2.0,
            cell_size: None,
            margin: Margin::default(),
            seed: None,
        }
    }
}

impl OrbConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    /// Simulate exactly `count` orbs.
    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.population = Population::Count(count);
        self
    }

    /// Scale the population with the viewport area.
    pub fn with_density(mut self, per_unit_area: f32) -> Self {
        self.population = Population::Density(per_unit_area);
        self
    }

    pub fn with_speed_budget(mut self, min: f32, max: f32) -> Self {
        self.min_speed_budget = min;
        self.max_speed_budget = max;
        self
    }

    pub fn with_min_axis_speed(mut self, speed: f32) -> Self {
        self.min_axis_speed = speed;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_cell_size(mut self, cell_size: f32) -> Self {
        self.cell_size = Some(cell_size);
        self
    }

    pub fn with_margin(mut self, margin: Margin) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Grid cell size actually used.
    pub fn resolved_cell_size(&self) -> f32 {
        self.cell_size.unwrap_or(self.threshold)
    }

    /// Recycling margin in viewport units.
    pub fn resolved_margin(&self) -> f32 {
        match self.margin {
            Margin::ThresholdFraction(f) => self.threshold * f,
            Margin::RadiusMultiple(m) => self.radius * m,
            Margin::Fixed(d) => d,
        }
    }

    /// Number of orbs for a `width x height` viewport.
    pub fn particle_count(&self, width: f32, height: f32) -> usize {
        match self.population {
            Population::Count(n) => n,
            Population::Density(d) => (width * height * d).round().max(0.0) as usize,
        }
    }

    /// Check every value is usable.
    ///
    /// Halo coverage depends on the viewport and is checked by the
    /// simulation at construction and resize.
    pub fn validate(&self) -> Result<()> {
        fn positive(name: &str, v: f32) -> Result<()> {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(GridError::invalid(format!("{name} must be finite and > 0, got {v}")))
            }
        }

        positive("threshold", self.threshold)?;
        positive("radius", self.radius)?;
        positive("min_axis_speed", self.min_axis_speed)?;
        positive("min_speed_budget", self.min_speed_budget)?;
        positive("max_speed_budget", self.max_speed_budget)?;
        positive("cell_size", self.resolved_cell_size())?;
        if self.max_speed_budget < self.min_speed_budget {
            return Err(GridError::invalid(format!(
                "max_speed_budget ({}) is below min_speed_budget ({})",
                self.max_speed_budget, self.min_speed_budget
            )));
        }
        let margin = self.resolved_margin();
        if !margin.is_finite() || margin < 0.0 {
            return Err(GridError::invalid(format!("margin must be finite and >= 0, got {margin}")));
        }
        if let Population::Density(d) = self.population {
            if !d.is_finite() || d < 0.0 {
                return Err(GridError::invalid(format!("density must be finite and >= 0, got {d}")));
            }
        }
        if self.min_speed_budget < 2.0 * self.min_axis_speed {
            log::warn!(
                "min_speed_budget {} is below twice min_axis_speed {}; slow orbs will move at min_axis_speed on both axes",
                self.min_speed_budget,
                self.min_axis_speed
            );
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&json)?;
        log::info!("loaded config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }
}

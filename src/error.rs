//! Error types for orbfield.
//!
//! Everything that can fail here is a configuration or programming error:
//! bad grid geometry, a position that hashes outside the allocated cells, or
//! a config file that cannot be read. Steady-state stepping never produces
//! a recoverable error once construction has validated the setup.

use thiserror::Error;

/// Crate-wide result type, defaulting to [`GridError`].
pub type Result<T, E = GridError> = std::result::Result<T, E>;

/// Errors raised by the spatial grid, orbs and the simulation driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Rejected geometry or tuning parameter (zero cell size, negative
    /// threshold, a margin wider than the halo, ...).
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A position hashed to a cell outside the allocated grid.
    ///
    /// This points at a halo/margin sizing bug; the grid never clamps.
    #[error("cell ({x}, {y}) is outside the {cols}x{rows} grid")]
    IndexOutOfRange {
        x: i64,
        y: i64,
        cols: usize,
        rows: usize,
    },

    /// A position with a NaN or infinite component was handed to the grid.
    #[error("position ({x}, {y}) is not finite")]
    NonFinitePosition { x: f32, y: f32 },

    /// A handle that does not refer to any orb in the backing storage.
    #[error("no orb with id {0}")]
    UnknownOrb(usize),
}

impl GridError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        GridError::InvalidConfiguration(msg.into())
    }
}

/// Errors that can occur while loading or saving an [`OrbConfig`](crate::OrbConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or write the config file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON for the config schema.
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but the values are unusable.
    #[error(transparent)]
    Invalid(#[from] GridError),
}

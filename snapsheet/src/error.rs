//! Error types for sheet construction and snap control.

use thiserror::Error;

/// Errors raised by the snap controller.
///
/// Every variant is a usage error: invalid configuration is rejected at
/// construction time and never repaired silently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SheetError {
    /// Fewer than two snap points were supplied.
    #[error("snap points must have at least two items but got {count}")]
    TooFewSnapPoints {
        /// Number of snap points supplied.
        count: usize,
    },

    /// A snap point is NaN or infinite.
    #[error("snap points must be finite numbers but got {value} at position {index}")]
    InvalidSnapPoint {
        /// Position of the offending snap point.
        index: usize,
        /// The offending value.
        value: f64,
    },

    /// Snap points are not strictly increasing.
    #[error("snap points must be in ascending order but got {value} before {next} at position {index}")]
    NotAscending {
        /// Position of the first out-of-order snap point.
        index: usize,
        /// Value at `index`.
        value: f64,
        /// Value at `index + 1`.
        next: f64,
    },

    /// `initial_snap_index` does not address a snap point.
    #[error("initial snap index {index} is out of range for {len} snap points")]
    InitialIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of snap points.
        len: usize,
    },

    /// `min_snap_index` does not address a snap point.
    #[error("min snap index {index} is out of range for {len} snap points")]
    MinIndexOutOfRange {
        /// Requested index.
        index: usize,
        /// Number of snap points.
        len: usize,
    },

    /// A snap was requested for an index past the last snap point.
    #[error("invalid snap index {index}, index must be within range 0 - {max}")]
    InvalidSnapIndex {
        /// Requested index.
        index: usize,
        /// Largest valid index.
        max: usize,
    },

    /// Unrecognized keyboard dodging mode name.
    #[error("keyboard dodging must be any of off, optimum, whole, whole-always but got '{0}'")]
    UnknownDodgingMode(String),
}

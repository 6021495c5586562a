//! Error types for dropreg.
//!
//! Two families are kept apart:
//!
//! - [`ConfigError`] is returned synchronously by parameter setters. A rejected
//!   value never reaches the engine, so the engine is never left half-configured.
//! - [`EditError`] is returned by `reset`, `step` and `all_steps`. It ends the
//!   current run; the only way to retry is another `reset`.

use thiserror::Error;

/// Invalid parameter value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// k must be odd and at least 1.
    #[error("number of neighbours must be a positive odd integer, got {0}")]
    InvalidNeighbors(usize),

    /// alpha must lie in [0, 100].
    #[error("alpha must lie in [0, 100], got {0}")]
    AlphaOutOfRange(f64),

    /// beta must lie in [0, 100].
    #[error("beta must lie in [0, 100], got {0}")]
    BetaOutOfRange(f64),

    /// Variant name or numeric tag not recognised.
    #[error("unknown variant: {0}")]
    UnknownVariant(String),
}

/// Errors that end an editing run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    /// Fewer than two instances are left, so no reduction is possible.
    #[error("not enough instances to edit ({remaining} remaining)")]
    NotEnoughInstances { remaining: usize },

    /// The original-index map does not match the dataset.
    #[error("index map has {indices} entries but dataset has {instances} instances")]
    IndexMismatch { instances: usize, indices: usize },

    /// Instances with different feature counts were mixed.
    #[error("dimension mismatch: expected {expected} features, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// The nearest-neighbour search service failed.
    #[error("neighbour search failed: {0}")]
    Search(String),

    /// The local regressor failed to train or evaluate.
    #[error("local model failed: {0}")]
    Model(String),

    /// The noise pre-filter failed.
    #[error("noise filter failed: {0}")]
    NoiseFilter(String),

    /// A configuration error surfaced while building a run.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, EditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_edit_error() {
        let err: EditError = ConfigError::InvalidNeighbors(2).into();
        assert_eq!(err, EditError::Config(ConfigError::InvalidNeighbors(2)));
        assert_eq!(
            err.to_string(),
            "number of neighbours must be a positive odd integer, got 2"
        );
    }

    #[test]
    fn not_enough_instances_message_names_count() {
        let err = EditError::NotEnoughInstances { remaining: 1 };
        assert!(err.to_string().contains("1 remaining"));
    }
}

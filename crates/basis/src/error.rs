//! Error types for the apollo-basis crate.

/// Error type for all fallible operations in the apollo-basis crate.
#[derive(Debug, Clone, thiserror::Error)]
pub enum BasisError {
    /// Returned when a joint selection is requested over an empty ensemble.
    #[error("ensemble is empty")]
    EmptyEnsemble,

    /// Returned when an ensemble member's tree shape differs from the first
    /// member's.
    #[error("tree {index} does not match the ensemble shape")]
    ShapeMismatch {
        /// Index of the mismatching tree.
        index: usize,
    },

    /// Returned when the `redundant` flag disagrees with the tree's
    /// decomposition mode.
    #[error("redundancy flag {redundant} does not match a {mode} tree")]
    RedundancyMismatch {
        /// The decomposition mode of the offending tree.
        mode: &'static str,
        /// The flag that was requested.
        redundant: bool,
    },

    /// Returned when an unsupported cost functional name is provided.
    #[error("unknown cost functional: {0}")]
    UnknownCost(String),

    /// Returned when a cost functional parameter is out of range.
    #[error("invalid cost parameter {name}: {value}")]
    InvalidCostParameter {
        /// Parameter name.
        name: &'static str,
        /// The invalid value.
        value: f64,
    },

    /// Returned when the eigensolver fails to converge.
    #[error("eigen-decomposition did not converge within {sweeps} sweeps")]
    EigenFailed {
        /// Number of sweeps attempted.
        sweeps: usize,
    },

    /// Returned when a basis is applied to a tree of a different shape.
    #[error("basis shape does not match the tree it is applied to")]
    TreeMismatch,
}

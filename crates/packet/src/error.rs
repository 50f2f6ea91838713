//! Error types for the apollo-packet crate.

/// Error type for all fallible operations in the apollo-packet crate.
///
/// Covers input validation failures, infeasible decomposition requests,
/// and tree addressing problems.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PacketError {
    /// Returned when the input signal is shorter than the minimum required length.
    #[error("signal too short: got {len} samples, need at least {min}")]
    SignalTooShort {
        /// Number of samples provided.
        len: usize,
        /// Minimum number of samples required.
        min: usize,
    },

    /// Returned when the input data contains non-finite values (NaN or infinity).
    #[error("input data contains non-finite values")]
    NonFiniteData,

    /// Returned when the signal length is not divisible by `2^depth`.
    #[error("signal length {len} is not divisible by 2^{depth}")]
    LengthMismatch {
        /// Length of the input signal.
        len: usize,
        /// Requested decomposition depth.
        depth: usize,
    },

    /// Returned when the requested decomposition depth exceeds the maximum
    /// feasible for the signal length.
    #[error("depth too high: requested {requested}, max for length {len} is {max}")]
    DepthTooHigh {
        /// Depth that was requested.
        requested: usize,
        /// Maximum feasible depth.
        max: usize,
        /// Length of the input signal.
        len: usize,
    },

    /// Returned when an unsupported wavelet filter name is provided.
    #[error("unsupported wavelet filter: {0}")]
    UnsupportedFilter(String),

    /// Returned when the shift-expansion gain is non-finite or outside `[0, 1)`.
    #[error("expansion gain must be finite and in [0, 1), got {gain}")]
    InvalidGain {
        /// The invalid gain value.
        gain: f64,
    },

    /// Returned when a recognized but unimplemented transform mode is requested.
    #[error("unsupported transform mode: {0}")]
    UnsupportedMode(&'static str),

    /// Returned when an image buffer length does not match its declared shape.
    #[error("image shape mismatch: {rows} x {cols} does not hold {len} values")]
    ImageShapeMismatch {
        /// Declared number of rows.
        rows: usize,
        /// Declared number of columns.
        cols: usize,
        /// Actual buffer length.
        len: usize,
    },

    /// Returned when a flat node count cannot correspond to a complete tree
    /// at the depth the caller asserted.
    #[error("node count {n_nodes} does not form a complete tree of depth {claimed}")]
    InvalidNodeCount {
        /// Flat node count provided.
        n_nodes: usize,
        /// Depth asserted by the caller.
        claimed: usize,
    },

    /// Returned when a node count and an inferred depth cannot be reconciled:
    /// the caller's assertion is internally contradictory, not merely malformed.
    #[error("node count {n_nodes} is inconsistent with inferred depth {inferred}")]
    InconsistentDepth {
        /// Flat node count provided.
        n_nodes: usize,
        /// Depth inferred from the node count (or the contradictory claim).
        inferred: usize,
    },
}

//! Coefficient tree arena and `(depth, index)` addressing.

use crate::error::PacketError;
use crate::filter::Wavelet;

/// Decomposition family for regular (complete) packet trees.
///
/// The shift-invariant family produces a data-dependent irregular tree and
/// has its own entry point in [`crate::shift`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecomposeMode {
    /// Critically downsampled binary tree; coefficient length halves per depth.
    Ordinary,
    /// No downsampling; filters are zero-interleaved per level instead.
    Stationary,
    /// Redundant decomposition built on autocorrelation-shell filters.
    Autocorrelation,
}

impl DecomposeMode {
    /// Returns `true` for families that keep full-length coefficients at
    /// every depth.
    pub fn is_redundant(&self) -> bool {
        matches!(self, Self::Stationary | Self::Autocorrelation)
    }

    /// Parses a decomposition mode from a case-insensitive name string.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::UnsupportedMode`] if the name is not recognized.
    pub fn from_name(name: &str) -> Result<Self, PacketError> {
        match name.to_lowercase().as_str() {
            "ordinary" => Ok(Self::Ordinary),
            "stationary" => Ok(Self::Stationary),
            "autocorrelation" => Ok(Self::Autocorrelation),
            "shift-invariant" => Err(PacketError::UnsupportedMode(
                "shift-invariant trees are built with shift_decompose",
            )),
            _ => Err(PacketError::UnsupportedMode("unknown decomposition mode name")),
        }
    }
}

/// A complete wavelet packet coefficient tree.
///
/// Nodes are addressed by `(depth, index)` with `0 <= index < arity^depth`;
/// the children of `(d, i)` are `(d + 1, arity * i + c)`. Storage is an
/// array-of-levels arena rather than a pointer-linked graph, so bottom-up
/// traversals are plain indexed loops.
///
/// Trees are immutable once returned by a decomposition entry point.
#[derive(Clone, Debug)]
pub struct PacketTree {
    wavelet: Wavelet,
    mode: DecomposeMode,
    arity: usize,
    depth: usize,
    signal_len: usize,
    image_shape: Option<(usize, usize)>,
    levels: Vec<Vec<Vec<f64>>>,
}

impl PacketTree {
    /// Creates a new `PacketTree` (crate-internal constructor).
    pub(crate) fn new(
        wavelet: Wavelet,
        mode: DecomposeMode,
        arity: usize,
        signal_len: usize,
        image_shape: Option<(usize, usize)>,
        levels: Vec<Vec<Vec<f64>>>,
    ) -> Self {
        let depth = levels.len().saturating_sub(1);
        Self {
            wavelet,
            mode,
            arity,
            depth,
            signal_len,
            image_shape,
            levels,
        }
    }

    /// Returns the wavelet filter used.
    pub fn wavelet(&self) -> Wavelet {
        self.wavelet
    }

    /// Returns the decomposition mode.
    pub fn mode(&self) -> DecomposeMode {
        self.mode
    }

    /// Returns the node arity (2 for 1-D trees, 4 for 2-D trees).
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Returns the maximum depth (root is depth 0).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Returns the length of the decomposed signal (rows * cols for images).
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    /// Returns `(rows, cols)` for 2-D trees, `None` for 1-D trees.
    pub fn image_shape(&self) -> Option<(usize, usize)> {
        self.image_shape
    }

    /// Returns the number of nodes at the given depth.
    pub fn nodes_at(&self, depth: usize) -> usize {
        self.levels.get(depth).map_or(0, |level| level.len())
    }

    /// Returns the total number of nodes in the tree.
    pub fn n_nodes(&self) -> usize {
        self.levels.iter().map(|level| level.len()).sum()
    }

    /// Returns the coefficients of node `(depth, index)`, or `None` if the
    /// address is out of range.
    pub fn node(&self, depth: usize, index: usize) -> Option<&[f64]> {
        self.levels
            .get(depth)
            .and_then(|level| level.get(index))
            .map(|v| v.as_slice())
    }
}

/// Number of nodes in a complete `arity`-ary tree of the given depth, or
/// `None` on overflow.
fn complete_nodes(depth: usize, arity: usize) -> Option<usize> {
    let mut total = 1usize;
    let mut level = 1usize;
    for _ in 0..depth {
        level = level.checked_mul(arity)?;
        total = total.checked_add(level)?;
    }
    Some(total)
}

/// Maps a flat node count to the depth of the complete tree it stores.
///
/// A complete binary tree of depth `k` holds `2^(k+1) - 1` nodes; for other
/// arities the count is `(arity^(k+1) - 1) / (arity - 1)`. When
/// `claimed_depth` is given it is validated against the count; when omitted
/// the depth is inferred.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`PacketError::InvalidNodeCount`] | the count matches a different depth than claimed, or no depth at all |
/// | [`PacketError::InconsistentDepth`] | the claim equals the tree's level count, not its depth (internally contradictory), or no claim is given and no depth reconciles |
///
/// # Panics
///
/// Panics if `arity < 2`.
///
/// # Example
///
/// ```
/// use apollo_packet::depth_for_nodes;
///
/// assert_eq!(depth_for_nodes(15, None, 2).unwrap(), 3);
/// assert_eq!(depth_for_nodes(7, Some(2), 2).unwrap(), 2);
/// assert!(depth_for_nodes(15, Some(8), 2).is_err());
/// ```
pub fn depth_for_nodes(
    n_nodes: usize,
    claimed_depth: Option<usize>,
    arity: usize,
) -> Result<usize, PacketError> {
    assert!(arity >= 2, "depth_for_nodes: arity must be >= 2");

    // Exact depth whose complete tree holds n_nodes, if one exists.
    let mut true_depth = None;
    let mut deepest_fitting = 0;
    let mut d = 0;
    while let Some(count) = complete_nodes(d, arity) {
        if count == n_nodes {
            true_depth = Some(d);
            break;
        }
        if count > n_nodes {
            break;
        }
        deepest_fitting = d;
        d += 1;
    }

    match claimed_depth {
        Some(claimed) => {
            if true_depth == Some(claimed) {
                return Ok(claimed);
            }
            // A claim that is off by exactly one level reads as the tree's
            // level count rather than its depth: the caller's own numbers
            // contradict each other.
            if let Some(t) = true_depth {
                if t + 1 == claimed {
                    return Err(PacketError::InconsistentDepth {
                        n_nodes,
                        inferred: claimed,
                    });
                }
            }
            Err(PacketError::InvalidNodeCount {
                n_nodes,
                claimed,
            })
        }
        None => true_depth.ok_or(PacketError::InconsistentDepth {
            n_nodes,
            inferred: deepest_fitting,
        }),
    }
}

//! Basis labeling over a packet tree and the cut-validity predicate.

use apollo_packet::PacketTree;

use crate::error::BasisError;

/// A basis selected from a complete packet tree.
///
/// Labels every node of the tree's `(depth, index)` address space with a
/// selection flag such that the flagged nodes form a cut: every root-to-leaf
/// path contains exactly one flagged node. Immutable once returned.
#[derive(Clone, Debug, PartialEq)]
pub struct Basis {
    arity: usize,
    signal_len: usize,
    flags: Vec<Vec<bool>>,
    total_cost: f64,
}

impl Basis {
    /// Creates a new `Basis` (crate-internal constructor).
    pub(crate) fn new(
        arity: usize,
        signal_len: usize,
        flags: Vec<Vec<bool>>,
        total_cost: f64,
    ) -> Self {
        Self {
            arity,
            signal_len,
            flags,
            total_cost,
        }
    }

    /// Returns the node arity of the underlying tree.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Returns the depth of the underlying tree.
    pub fn depth(&self) -> usize {
        self.flags.len().saturating_sub(1)
    }

    /// Returns the signal length the basis was selected for.
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    /// Returns the resolved total cost of the selection.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Returns `true` if node `(depth, index)` is selected.
    ///
    /// Out-of-range addresses are not selected.
    pub fn is_selected(&self, depth: usize, index: usize) -> bool {
        self.flags
            .get(depth)
            .and_then(|level| level.get(index))
            .copied()
            .unwrap_or(false)
    }

    /// Returns the selected node addresses in `(depth, index)` order.
    pub fn selected(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (d, level) in self.flags.iter().enumerate() {
            for (i, flag) in level.iter().enumerate() {
                if *flag {
                    out.push((d, i));
                }
            }
        }
        out
    }

    /// Returns the number of selected nodes.
    pub fn n_selected(&self) -> usize {
        self.flags
            .iter()
            .map(|level| level.iter().filter(|f| **f).count())
            .sum()
    }

    /// Extracts the flat coefficient vector of the selected nodes, in
    /// `(depth, index)` order.
    ///
    /// # Errors
    ///
    /// Returns [`BasisError::TreeMismatch`] if the tree's shape differs from
    /// the one the basis was selected on.
    pub fn extract(&self, tree: &PacketTree) -> Result<Vec<f64>, BasisError> {
        if tree.arity() != self.arity
            || tree.depth() != self.depth()
            || tree.signal_len() != self.signal_len
        {
            return Err(BasisError::TreeMismatch);
        }
        let mut out = Vec::new();
        for (d, i) in self.selected() {
            let node = tree.node(d, i).ok_or(BasisError::TreeMismatch)?;
            out.extend_from_slice(node);
        }
        Ok(out)
    }
}

/// Verifies the cut invariant: every deepest-level position has exactly one
/// flagged node on its ancestor chain, and the basis was selected for the
/// given signal length.
///
/// Used internally after every selection and exposed for downstream and test
/// code.
///
/// # Example
///
/// ```
/// use apollo_basis::{best_basis, is_valid_basis, CostFunction, SelectConfig};
/// use apollo_packet::{decompose, DecomposeMode, Signal, Wavelet};
///
/// let signal = Signal::new((0..16).map(|i| (i as f64).cos()).collect()).unwrap();
/// let tree = decompose(&signal, Wavelet::Haar, 3, DecomposeMode::Ordinary).unwrap();
/// let basis = best_basis(&tree, &SelectConfig::new(CostFunction::ShannonEntropy)).unwrap();
/// assert!(is_valid_basis(16, &basis));
/// ```
pub fn is_valid_basis(signal_len: usize, basis: &Basis) -> bool {
    if basis.signal_len() != signal_len {
        return false;
    }
    let depth = basis.depth();
    let n_leaves = basis.arity().pow(depth as u32);
    for leaf in 0..n_leaves {
        let mut flagged = 0;
        for d in 0..=depth {
            let ancestor = leaf / basis.arity().pow((depth - d) as u32);
            if basis.is_selected(d, ancestor) {
                flagged += 1;
            }
        }
        if flagged != 1 {
            return false;
        }
    }
    true
}

//! Single-tree best-basis search (BB).

use apollo_packet::{DecomposeMode, PacketTree};
use tracing::debug;

use crate::basis::Basis;
use crate::cost::CostFunction;
use crate::error::BasisError;

/// Configuration for a basis selection.
///
/// The `redundant` flag must agree with the decomposition mode of the tree
/// the selection runs on; stationary and autocorrelation trees are
/// redundant, ordinary and shift-invariant trees are not.
///
/// # Example
///
/// ```
/// use apollo_basis::{CostFunction, SelectConfig};
///
/// let config = SelectConfig::new(CostFunction::ShannonEntropy).with_redundant(true);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SelectConfig {
    cost: CostFunction,
    redundant: bool,
}

impl SelectConfig {
    /// Creates a new configuration with `redundant = false`.
    pub fn new(cost: CostFunction) -> Self {
        Self {
            cost,
            redundant: false,
        }
    }

    /// Sets the redundancy flag.
    pub fn with_redundant(mut self, redundant: bool) -> Self {
        self.redundant = redundant;
        self
    }

    /// Returns the cost functional.
    pub fn cost(&self) -> CostFunction {
        self.cost
    }

    /// Returns the redundancy flag.
    pub fn redundant(&self) -> bool {
        self.redundant
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BasisError::InvalidCostParameter`] for out-of-range cost
    /// parameters.
    pub fn validate(&self) -> Result<(), BasisError> {
        self.cost.validate()
    }
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self::new(CostFunction::default())
    }
}

pub(crate) fn mode_name(mode: DecomposeMode) -> &'static str {
    match mode {
        DecomposeMode::Ordinary => "ordinary",
        DecomposeMode::Stationary => "stationary",
        DecomposeMode::Autocorrelation => "autocorrelation",
    }
}

pub(crate) fn check_redundancy(tree: &PacketTree, config: &SelectConfig) -> Result<(), BasisError> {
    if tree.mode().is_redundant() != config.redundant() {
        return Err(BasisError::RedundancyMismatch {
            mode: mode_name(tree.mode()),
            redundant: config.redundant(),
        });
    }
    Ok(())
}

/// Bottom-up dynamic program over a level arena of node costs.
///
/// Iterates depth-indexed from the deepest level to the root — no call
/// recursion, so stack use is independent of tree depth. Each node's optimal
/// cost is resolved once and reused by its parent; `own <= children` flags
/// the node, so ties always keep the coarser representation.
///
/// Returns the raw flags (before pruning) and the resolved root cost.
pub(crate) fn resolve(costs: &[Vec<f64>], arity: usize) -> (Vec<Vec<bool>>, f64) {
    let depth = costs.len() - 1;
    let mut flags: Vec<Vec<bool>> = costs.iter().map(|level| vec![false; level.len()]).collect();

    flags[depth].iter_mut().for_each(|f| *f = true);
    let mut resolved = costs[depth].clone();

    for d in (0..depth).rev() {
        let mut level = Vec::with_capacity(costs[d].len());
        for (i, &own) in costs[d].iter().enumerate() {
            let children: f64 = (0..arity).map(|c| resolved[arity * i + c]).sum();
            if own <= children {
                flags[d][i] = true;
                level.push(own);
            } else {
                level.push(children);
            }
        }
        resolved = level;
    }

    (flags, resolved[0])
}

/// Clears every flag below a flagged ancestor, turning the raw bottom-up
/// flags into a proper cut.
pub(crate) fn prune(flags: &mut [Vec<bool>], arity: usize) {
    let mut covered = vec![false];
    for d in 0..flags.len() {
        for (i, flag) in flags[d].iter_mut().enumerate() {
            if covered[i] {
                *flag = false;
            }
        }
        if d + 1 < flags.len() {
            let mut next = vec![false; flags[d + 1].len()];
            for (i, &was_covered) in covered.iter().enumerate() {
                if was_covered || flags[d][i] {
                    for c in 0..arity {
                        next[arity * i + c] = true;
                    }
                }
            }
            covered = next;
        }
    }
}

/// Selects the best basis of a single packet tree.
///
/// Runs the bottom-up cost recursion of the crate over every node of the
/// (complete) tree and returns the minimizing cut. Deterministic: equal-cost
/// alternatives always resolve to the coarser node.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`BasisError::InvalidCostParameter`] | `config` fails validation |
/// | [`BasisError::RedundancyMismatch`] | `config.redundant()` disagrees with the tree mode |
pub fn best_basis(tree: &PacketTree, config: &SelectConfig) -> Result<Basis, BasisError> {
    config.validate()?;
    check_redundancy(tree, config)?;

    let cost = config.cost();
    let costs: Vec<Vec<f64>> = (0..=tree.depth())
        .map(|d| {
            (0..tree.nodes_at(d))
                .map(|i| cost.evaluate(tree.node(d, i).expect("complete tree")))
                .collect()
        })
        .collect();

    let (mut flags, total) = resolve(&costs, tree.arity());
    prune(&mut flags, tree.arity());

    let basis = Basis::new(tree.arity(), tree.signal_len(), flags, total);
    debug!(
        n_selected = basis.n_selected(),
        total_cost = total,
        "best basis selected"
    );
    Ok(basis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use apollo_packet::{decompose, Signal, Wavelet};

    fn signal(n: usize) -> Signal {
        Signal::new((0..n).map(|i| (i as f64 * 0.9).sin() + 0.05 * i as f64).collect()).unwrap()
    }

    #[test]
    fn config_defaults_and_builder() {
        let config = SelectConfig::default();
        assert_eq!(config.cost(), CostFunction::ShannonEntropy);
        assert!(!config.redundant());

        let config = SelectConfig::new(CostFunction::LogEnergy).with_redundant(true);
        assert_eq!(config.cost(), CostFunction::LogEnergy);
        assert!(config.redundant());
    }

    #[test]
    fn config_validate_propagates_cost_errors() {
        let config = SelectConfig::new(CostFunction::LpNorm { p: -1.0 });
        assert!(matches!(
            config.validate(),
            Err(BasisError::InvalidCostParameter { name: "p", .. })
        ));
    }

    #[test]
    fn resolve_prefers_parent_on_tie() {
        // Equal costs everywhere: the root must win.
        let costs = vec![vec![2.0], vec![1.0, 1.0], vec![0.5, 0.5, 0.5, 0.5]];
        let (mut flags, total) = resolve(&costs, 2);
        prune(&mut flags, 2);
        assert_eq!(total, 2.0);
        assert!(flags[0][0]);
        assert!(flags[1].iter().all(|f| !f));
        assert!(flags[2].iter().all(|f| !f));
    }

    #[test]
    fn resolve_descends_where_children_win() {
        let costs = vec![vec![10.0], vec![1.0, 8.0], vec![0.5, 0.4, 3.0, 3.0]];
        let (mut flags, total) = resolve(&costs, 2);
        prune(&mut flags, 2);
        // Left branch: node (1,0) costs 1.0 vs children 0.9 -> children win.
        // Right branch: node (1,1) costs 8.0 vs children 6.0 -> children win.
        // Root: 10.0 vs 0.9 + 6.0 -> children win.
        assert!((total - 6.9).abs() < 1e-12);
        assert!(!flags[0][0]);
        assert!(!flags[1][0]);
        assert!(!flags[1][1]);
        assert_eq!(flags[2], vec![true, true, true, true]);
    }

    #[test]
    fn prune_clears_descendants_of_selected_parent() {
        let mut flags = vec![vec![true], vec![true, false], vec![true, false, false, true]];
        prune(&mut flags, 2);
        assert_eq!(flags[0], vec![true]);
        assert_eq!(flags[1], vec![false, false]);
        assert_eq!(flags[2], vec![false, false, false, false]);
    }

    #[test]
    fn depth_zero_tree_selects_root() {
        let tree = decompose(
            &signal(8),
            Wavelet::Haar,
            0,
            apollo_packet::DecomposeMode::Ordinary,
        )
        .unwrap();
        let basis = best_basis(&tree, &SelectConfig::default()).unwrap();
        assert_eq!(basis.selected(), vec![(0, 0)]);
    }

    #[test]
    fn redundancy_mismatch_rejected() {
        let tree = decompose(
            &signal(16),
            Wavelet::Haar,
            2,
            apollo_packet::DecomposeMode::Stationary,
        )
        .unwrap();
        let err = best_basis(&tree, &SelectConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            BasisError::RedundancyMismatch {
                mode: "stationary",
                redundant: false
            }
        ));
    }

    #[test]
    fn selection_is_deterministic() {
        let tree = decompose(
            &signal(32),
            Wavelet::D4,
            4,
            apollo_packet::DecomposeMode::Ordinary,
        )
        .unwrap();
        let config = SelectConfig::default();
        let a = best_basis(&tree, &config).unwrap();
        let b = best_basis(&tree, &config).unwrap();
        assert_eq!(a, b);
    }
}

//! Shift-invariant best-basis search (SIBB) over irregular trees.

use std::collections::BTreeMap;

use apollo_packet::ShiftTree;
use tracing::debug;

use crate::error::BasisError;
use crate::select::SelectConfig;

/// A basis selected from an irregular shift-invariant tree.
///
/// Selected nodes carry a shift tag locating them on the shifted sample
/// lattice the decomposition chose: walking down from the root,
/// `tag(child) = tag(parent) + local_shift * 2^depth(parent)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ShiftBasis {
    signal_len: usize,
    selected: BTreeMap<(usize, usize), usize>,
    total_cost: f64,
}

impl ShiftBasis {
    /// Returns the signal length the basis was selected for.
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    /// Returns the resolved total cost of the selection.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Returns `true` if node `(depth, index)` is selected.
    pub fn is_selected(&self, depth: usize, index: usize) -> bool {
        self.selected.contains_key(&(depth, index))
    }

    /// Returns the shift tag of a selected node, or `None` for unselected
    /// addresses.
    pub fn shift_tag(&self, depth: usize, index: usize) -> Option<usize> {
        self.selected.get(&(depth, index)).copied()
    }

    /// Returns the selected `((depth, index), shift_tag)` pairs in
    /// `(depth, index)` order.
    pub fn selected(&self) -> impl Iterator<Item = (&(usize, usize), &usize)> {
        self.selected.iter()
    }

    /// Returns the number of selected nodes.
    pub fn n_selected(&self) -> usize {
        self.selected.len()
    }
}

/// Selects the best basis of an irregular shift-invariant tree.
///
/// The bottom-up recursion of [`crate::best_basis`] is extended with the
/// tree's shift axis: each expanded node's candidate children are the
/// shift/subtree variant retained at decomposition, and the returned basis
/// records which shift produced every selected node. Leaves (unexpanded
/// nodes) are always selectable.
///
/// Running this on a signal and on any circular shift of it yields bases
/// with identical selected-node cost sequences in `(depth, index)` order;
/// additive costs are invariant under circular shifts, so every expansion
/// and selection decision coincides exactly.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`BasisError::InvalidCostParameter`] | `config` fails validation |
/// | [`BasisError::RedundancyMismatch`] | `config.redundant()` is set (shift trees are critically sampled) |
pub fn shift_best_basis(tree: &ShiftTree, config: &SelectConfig) -> Result<ShiftBasis, BasisError> {
    config.validate()?;
    if config.redundant() {
        return Err(BasisError::RedundancyMismatch {
            mode: "shift-invariant",
            redundant: true,
        });
    }

    let cost = config.cost();

    // Resolve bottom-up in reverse (depth, index) order; children precede
    // parents because their depth is strictly greater.
    let mut resolved: BTreeMap<(usize, usize), f64> = BTreeMap::new();
    let mut flags: BTreeMap<(usize, usize), bool> = BTreeMap::new();
    for (&(d, i), node) in tree.iter().rev() {
        let own = cost.evaluate(node.coeffs());
        if !node.expanded() {
            resolved.insert((d, i), own);
            flags.insert((d, i), true);
            continue;
        }
        let children = resolved[&(d + 1, 2 * i)] + resolved[&(d + 1, 2 * i + 1)];
        if own <= children {
            resolved.insert((d, i), own);
            flags.insert((d, i), true);
        } else {
            resolved.insert((d, i), children);
            flags.insert((d, i), false);
        }
    }

    // Walk down from the root, keeping the shallowest flagged node on each
    // path and accumulating shift tags through the expanded nodes below it.
    let mut selected = BTreeMap::new();
    let mut stack = vec![((0usize, 0usize), 0usize)];
    while let Some(((d, i), tag)) = stack.pop() {
        let node = tree.node(d, i).expect("walk visits only present nodes");
        if flags[&(d, i)] {
            selected.insert((d, i), tag);
            continue;
        }
        let child_tag = tag + node.local_shift() * (1 << d);
        stack.push(((d + 1, 2 * i), child_tag));
        stack.push(((d + 1, 2 * i + 1), child_tag));
    }

    let total = resolved[&(0, 0)];
    let basis = ShiftBasis {
        signal_len: tree.signal_len(),
        selected,
        total_cost: total,
    };
    debug!(
        n_selected = basis.n_selected(),
        total_cost = total,
        "shift-invariant best basis selected"
    );
    Ok(basis)
}

/// Verifies the cut invariant over an irregular tree: every leaf's chain of
/// ancestors (including itself) contains exactly one selected node.
pub fn is_valid_shift_basis(tree: &ShiftTree, basis: &ShiftBasis) -> bool {
    if basis.signal_len() != tree.signal_len() {
        return false;
    }
    // Every selected address must exist in the tree.
    for (&(d, i), _) in basis.selected() {
        if tree.node(d, i).is_none() {
            return false;
        }
    }
    for (&(d, i), node) in tree.iter() {
        if node.expanded() {
            continue;
        }
        let mut flagged = 0;
        for depth in 0..=d {
            if basis.is_selected(depth, i >> (d - depth)) {
                flagged += 1;
            }
        }
        if flagged != 1 {
            return false;
        }
    }
    true
}

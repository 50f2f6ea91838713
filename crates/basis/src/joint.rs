//! Joint selection over signal ensembles (JBB and LSDB).

use std::collections::BTreeMap;

use apollo_packet::PacketTree;
use tracing::debug;

use crate::basis::Basis;
use crate::error::BasisError;
use crate::linalg::jacobi_eigen;
use crate::select::{check_redundancy, prune, resolve, SelectConfig};

const JACOBI_SWEEPS: usize = 64;
const JACOBI_TOL: f64 = 1e-10;

fn validate_ensemble(trees: &[PacketTree]) -> Result<(), BasisError> {
    let first = trees.first().ok_or(BasisError::EmptyEnsemble)?;
    for (index, tree) in trees.iter().enumerate().skip(1) {
        if tree.depth() != first.depth()
            || tree.arity() != first.arity()
            || tree.signal_len() != first.signal_len()
            || tree.mode() != first.mode()
        {
            return Err(BasisError::ShapeMismatch { index });
        }
    }
    Ok(())
}

/// Selects a single basis jointly representing every signal of an ensemble.
///
/// The trees must share identical shape (length, depth, arity, mode); the
/// cost at each node is the sum of the per-signal costs there, and the same
/// bottom-up recursion as [`crate::best_basis`] yields one shared cut.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`BasisError::EmptyEnsemble`] | `trees` is empty |
/// | [`BasisError::ShapeMismatch`] | member trees differ in shape |
/// | [`BasisError::RedundancyMismatch`] | flag disagrees with the trees' mode |
pub fn joint_best_basis(trees: &[PacketTree], config: &SelectConfig) -> Result<Basis, BasisError> {
    config.validate()?;
    validate_ensemble(trees)?;
    check_redundancy(&trees[0], config)?;

    let cost = config.cost();
    let first = &trees[0];
    let costs: Vec<Vec<f64>> = (0..=first.depth())
        .map(|d| {
            (0..first.nodes_at(d))
                .map(|i| {
                    trees
                        .iter()
                        .map(|tree| cost.evaluate(tree.node(d, i).expect("complete tree")))
                        .sum()
                })
                .collect()
        })
        .collect();

    let (mut flags, total) = resolve(&costs, first.arity());
    prune(&mut flags, first.arity());

    let basis = Basis::new(first.arity(), first.signal_len(), flags, total);
    debug!(
        n_signals = trees.len(),
        n_selected = basis.n_selected(),
        total_cost = total,
        "joint best basis selected"
    );
    Ok(basis)
}

/// A jointly selected basis together with the per-node decorrelating
/// rotations that produced its costs.
///
/// `rotations` maps each selected node to the orthogonal matrix whose
/// columns are the eigenvectors of that node's ensemble Gram matrix; row
/// `r`, column `j` is `rotation[j][r]`. Applying the transpose to a member
/// signal's node coefficients reproduces the decorrelated representation
/// the selection was computed on.
#[derive(Clone, Debug)]
pub struct LsdbBasis {
    basis: Basis,
    rotations: BTreeMap<(usize, usize), Vec<Vec<f64>>>,
}

impl LsdbBasis {
    /// Returns the selected basis.
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// Returns the rotation stored for a selected node, or `None` for
    /// unselected addresses.
    pub fn rotation(&self, depth: usize, index: usize) -> Option<&[Vec<f64>]> {
        self.rotations.get(&(depth, index)).map(|m| m.as_slice())
    }

    /// Returns the number of stored rotations (one per selected node).
    pub fn n_rotations(&self) -> usize {
        self.rotations.len()
    }
}

/// Gram matrix `X^T X / N` of the ensemble's coefficient vectors at one node.
fn gram(trees: &[PacketTree], depth: usize, index: usize) -> Vec<Vec<f64>> {
    let m = trees[0]
        .node(depth, index)
        .expect("complete tree")
        .len();
    let n = trees.len() as f64;
    let mut g = vec![vec![0.0; m]; m];
    for tree in trees {
        let x = tree.node(depth, index).expect("complete tree");
        for a in 0..m {
            if x[a] == 0.0 {
                continue;
            }
            for b in a..m {
                g[a][b] += x[a] * x[b] / n;
            }
        }
    }
    for a in 0..m {
        for b in 0..a {
            g[a][b] = g[b][a];
        }
    }
    g
}

/// Rotates one signal's node coefficients into the eigenbasis:
/// `y[j] = sum_r vectors[j][r] * x[r]`.
fn rotate_into(vectors: &[Vec<f64>], x: &[f64]) -> Vec<f64> {
    vectors
        .iter()
        .map(|col| col.iter().zip(x).map(|(v, xi)| v * xi).sum())
        .collect()
}

/// Selects the least statistically dependent basis of an ensemble.
///
/// At every node position the ensemble's coefficient vectors are rotated
/// into the eigenbasis of their Gram matrix — the rotation minimizing
/// cross-signal second-order dependence — and the joint additive cost is
/// evaluated on the decorrelated coordinates. The recursion over the
/// decorrelated costs is the same as [`joint_best_basis`]; the rotations of
/// the selected nodes are returned so the joint representation can be
/// reproduced.
///
/// # Errors
///
/// Everything [`joint_best_basis`] raises, plus
/// [`BasisError::EigenFailed`] when a node's Gram matrix resists
/// diagonalization.
pub fn least_dependent_basis(
    trees: &[PacketTree],
    config: &SelectConfig,
) -> Result<LsdbBasis, BasisError> {
    config.validate()?;
    validate_ensemble(trees)?;
    check_redundancy(&trees[0], config)?;

    let cost = config.cost();
    let first = &trees[0];

    let node_cost = |d: usize, i: usize| -> Result<f64, BasisError> {
        let eig = jacobi_eigen(&gram(trees, d, i), JACOBI_SWEEPS, JACOBI_TOL)
            .ok_or(BasisError::EigenFailed {
                sweeps: JACOBI_SWEEPS,
            })?;
        Ok(trees
            .iter()
            .map(|tree| {
                let x = tree.node(d, i).expect("complete tree");
                cost.evaluate(&rotate_into(&eig.vectors, x))
            })
            .sum())
    };

    let mut costs: Vec<Vec<f64>> = Vec::with_capacity(first.depth() + 1);
    for d in 0..=first.depth() {
        let mut level = Vec::with_capacity(first.nodes_at(d));
        for i in 0..first.nodes_at(d) {
            level.push(node_cost(d, i)?);
        }
        costs.push(level);
    }

    let (mut flags, total) = resolve(&costs, first.arity());
    prune(&mut flags, first.arity());
    let basis = Basis::new(first.arity(), first.signal_len(), flags, total);

    // Rotations are recomputed for the selected nodes only; storing one per
    // tree node would cost O(len^2) memory per node for no consumer.
    let mut rotations = BTreeMap::new();
    for (d, i) in basis.selected() {
        let eig = jacobi_eigen(&gram(trees, d, i), JACOBI_SWEEPS, JACOBI_TOL)
            .ok_or(BasisError::EigenFailed {
                sweeps: JACOBI_SWEEPS,
            })?;
        rotations.insert((d, i), eig.vectors);
    }

    debug!(
        n_signals = trees.len(),
        n_selected = basis.n_selected(),
        total_cost = total,
        "least dependent basis selected"
    );
    Ok(LsdbBasis { basis, rotations })
}

//! Shift-invariant decomposition producing an irregular, data-dependent tree.
//!
//! Unlike the complete trees of [`crate::decompose`], node existence here
//! depends on signal content: a node is split only when the better of its
//! direct and circularly shifted decompositions improves on the node's own
//! cost by the configured admissibility margin. Nodes that fail expansion
//! stay leaves regardless of depth.
//!
//! The local shift axis is `{0, 1}`: an even circular shift of a parent is an
//! integer shift of its children, so the one-bit choice per level composes to
//! every circular shift of the input signal through the recursion.

use std::collections::BTreeMap;

use tracing::debug;

use crate::decompose::max_depth;
use crate::error::PacketError;
use crate::filter::Wavelet;
use crate::signal::Signal;
use crate::step::analysis_step;

/// Configuration for shift-invariant decomposition.
///
/// `gain` is the admissibility margin: a node is expanded only when the
/// winning children's combined cost satisfies
/// `children <= own - gain * |own|`. The default `0.0` expands whenever the
/// children are not worse.
///
/// # Example
///
/// ```
/// use apollo_packet::ShiftConfig;
///
/// let config = ShiftConfig::new().with_gain(0.05);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShiftConfig {
    gain: f64,
}

impl ShiftConfig {
    /// Creates a configuration with the default margin (`gain = 0.0`).
    pub fn new() -> Self {
        Self { gain: 0.0 }
    }

    /// Sets the admissibility margin.
    pub fn with_gain(mut self, gain: f64) -> Self {
        self.gain = gain;
        self
    }

    /// Returns the admissibility margin.
    pub fn gain(&self) -> f64 {
        self.gain
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PacketError::InvalidGain`] if the gain is non-finite or
    /// outside `[0, 1)`.
    pub fn validate(&self) -> Result<(), PacketError> {
        if !self.gain.is_finite() || self.gain < 0.0 || self.gain >= 1.0 {
            return Err(PacketError::InvalidGain { gain: self.gain });
        }
        Ok(())
    }
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// One node of an irregular shift-invariant tree.
#[derive(Clone, Debug)]
pub struct ShiftNode {
    coeffs: Vec<f64>,
    local_shift: usize,
    expanded: bool,
}

impl ShiftNode {
    /// Returns the node's coefficients.
    pub fn coeffs(&self) -> &[f64] {
        &self.coeffs
    }

    /// Returns the circular shift (0 or 1) applied to this node's vector
    /// before splitting. Always 0 for leaves.
    pub fn local_shift(&self) -> usize {
        self.local_shift
    }

    /// Returns `true` if this node was split into children.
    pub fn expanded(&self) -> bool {
        self.expanded
    }
}

/// An irregular shift-invariant packet tree.
///
/// Stored as a sparse map from `(depth, index)` to node content: entries
/// exist only where the decomposition chose to expand, and unexpanded
/// entries carry an explicit leaf flag. Map iteration order is the fixed
/// `(depth, index)` traversal order used by selection.
#[derive(Clone, Debug)]
pub struct ShiftTree {
    wavelet: Wavelet,
    signal_len: usize,
    max_depth: usize,
    nodes: BTreeMap<(usize, usize), ShiftNode>,
}

impl ShiftTree {
    /// Returns the wavelet filter used.
    pub fn wavelet(&self) -> Wavelet {
        self.wavelet
    }

    /// Returns the length of the decomposed signal.
    pub fn signal_len(&self) -> usize {
        self.signal_len
    }

    /// Returns the depth cap the decomposition ran with.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Returns the number of nodes present in the tree.
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the node at `(depth, index)` if present.
    pub fn node(&self, depth: usize, index: usize) -> Option<&ShiftNode> {
        self.nodes.get(&(depth, index))
    }

    /// Iterates over all present nodes in `(depth, index)` order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&(usize, usize), &ShiftNode)> {
        self.nodes.iter()
    }

    /// Returns the deepest depth at which any node is present.
    pub fn deepest(&self) -> usize {
        self.nodes.keys().map(|&(d, _)| d).max().unwrap_or(0)
    }
}

/// Admissibility cost: the additive Shannon form `-sum x^2 ln x^2` over
/// non-zero coordinates. Zero vectors cost zero.
fn node_cost(v: &[f64]) -> f64 {
    v.iter()
        .filter(|x| **x != 0.0)
        .map(|x| {
            let e = x * x;
            -e * e.ln()
        })
        .sum()
}

/// Rotates a vector left by `s` positions: `out[i] = v[(i + s) % n]`.
fn rotate(v: &[f64], s: usize) -> Vec<f64> {
    let n = v.len();
    (0..n).map(|i| v[(i + s) % n]).collect()
}

/// Decomposes a signal into an irregular shift-invariant tree.
///
/// At each node both the direct split and the split of the circularly
/// shifted node are evaluated; the cheaper pair is retained along with the
/// shift that produced it, and the node is expanded only when that pair
/// passes the admissibility margin of `config`. Expansion decisions depend
/// only on coefficient costs, which are invariant under circular shifts of
/// the input, so the tree's cost structure is identical for a signal and any
/// circular shift of it.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`PacketError::InvalidGain`] | `config` fails validation |
/// | [`PacketError::DepthTooHigh`] | `2^max_depth > signal.len()` |
/// | [`PacketError::LengthMismatch`] | `len % 2^max_depth != 0` |
pub fn shift_decompose(
    signal: &Signal,
    wavelet: Wavelet,
    depth: usize,
    config: &ShiftConfig,
) -> Result<ShiftTree, PacketError> {
    config.validate()?;
    let n = signal.len();
    let max = max_depth(n);
    if depth > max {
        return Err(PacketError::DepthTooHigh {
            requested: depth,
            max,
            len: n,
        });
    }
    if n % (1 << depth) != 0 {
        return Err(PacketError::LengthMismatch { len: n, depth });
    }

    let h = wavelet.scaling_coeffs();
    let g = wavelet.wavelet_coeffs();

    let mut nodes = BTreeMap::new();
    let mut pending: Vec<(usize, usize, Vec<f64>)> = vec![(0, 0, signal.as_slice().to_vec())];

    while let Some((d, i, v)) = pending.pop() {
        if d == depth || v.len() < 2 {
            nodes.insert(
                (d, i),
                ShiftNode {
                    coeffs: v,
                    local_shift: 0,
                    expanded: false,
                },
            );
            continue;
        }

        let own = node_cost(&v);

        // Direct split vs split of the one-sample rotation; ties keep the
        // direct split.
        let (lo0, hi0) = analysis_step(&v, h, &g);
        let cost0 = node_cost(&lo0) + node_cost(&hi0);
        let shifted = rotate(&v, 1);
        let (lo1, hi1) = analysis_step(&shifted, h, &g);
        let cost1 = node_cost(&lo1) + node_cost(&hi1);

        let (local_shift, lo, hi, children_cost) = if cost1 < cost0 {
            (1, lo1, hi1, cost1)
        } else {
            (0, lo0, hi0, cost0)
        };

        if children_cost <= own - config.gain() * own.abs() {
            nodes.insert(
                (d, i),
                ShiftNode {
                    coeffs: v,
                    local_shift,
                    expanded: true,
                },
            );
            pending.push((d + 1, 2 * i, lo));
            pending.push((d + 1, 2 * i + 1, hi));
        } else {
            nodes.insert(
                (d, i),
                ShiftNode {
                    coeffs: v,
                    local_shift: 0,
                    expanded: false,
                },
            );
        }
    }

    let tree = ShiftTree {
        wavelet,
        signal_len: n,
        max_depth: depth,
        nodes,
    };
    debug!(
        len = n,
        depth,
        n_nodes = tree.n_nodes(),
        deepest = tree.deepest(),
        "shift-invariant decomposition complete"
    );
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(n: usize) -> Signal {
        Signal::new((0..n).map(|i| (i as f64 * 0.7).sin() + 0.3 * i as f64).collect()).unwrap()
    }

    #[test]
    fn config_defaults_and_builder() {
        let config = ShiftConfig::default();
        assert_eq!(config.gain(), 0.0);
        let config = ShiftConfig::new().with_gain(0.1);
        assert!((config.gain() - 0.1).abs() < f64::EPSILON);
    }

    #[test]
    fn config_rejects_bad_gain() {
        for gain in [-0.1, 1.0, 2.0, f64::NAN, f64::INFINITY] {
            let err = ShiftConfig::new().with_gain(gain).validate().unwrap_err();
            assert!(matches!(err, PacketError::InvalidGain { .. }), "gain {gain}");
        }
    }

    #[test]
    fn root_is_always_present() {
        let tree = shift_decompose(&signal(16), Wavelet::Haar, 4, &ShiftConfig::new()).unwrap();
        let root = tree.node(0, 0).unwrap();
        assert_eq!(root.coeffs(), signal(16).as_slice());
        assert!(tree.n_nodes() >= 1);
    }

    #[test]
    fn expanded_nodes_have_both_children() {
        let tree = shift_decompose(&signal(16), Wavelet::D4, 4, &ShiftConfig::new()).unwrap();
        for (&(d, i), node) in tree.iter() {
            if node.expanded() {
                assert!(tree.node(d + 1, 2 * i).is_some(), "missing left child of ({d},{i})");
                assert!(
                    tree.node(d + 1, 2 * i + 1).is_some(),
                    "missing right child of ({d},{i})"
                );
            } else {
                assert_eq!(node.local_shift(), 0);
                assert!(tree.node(d + 1, 2 * i).is_none());
            }
        }
    }

    #[test]
    fn leaves_at_depth_cap() {
        let tree = shift_decompose(&signal(16), Wavelet::Haar, 2, &ShiftConfig::new()).unwrap();
        for (&(d, _), node) in tree.iter() {
            assert!(d <= 2);
            if d == 2 {
                assert!(!node.expanded());
            }
        }
    }

    #[test]
    fn node_lengths_halve_with_depth() {
        let tree = shift_decompose(&signal(32), Wavelet::Haar, 5, &ShiftConfig::new()).unwrap();
        for (&(d, _), node) in tree.iter() {
            assert_eq!(node.coeffs().len(), 32 >> d);
        }
    }

    #[test]
    fn large_gain_yields_smaller_tree() {
        let open = shift_decompose(&signal(32), Wavelet::D4, 5, &ShiftConfig::new()).unwrap();
        let strict =
            shift_decompose(&signal(32), Wavelet::D4, 5, &ShiftConfig::new().with_gain(0.9))
                .unwrap();
        assert!(strict.n_nodes() <= open.n_nodes());
    }

    #[test]
    fn depth_cap_validated() {
        let err = shift_decompose(&signal(16), Wavelet::Haar, 5, &ShiftConfig::new()).unwrap_err();
        assert!(matches!(err, PacketError::DepthTooHigh { requested: 5, max: 4, .. }));
    }

    #[test]
    fn length_mismatch_validated() {
        let err = shift_decompose(&signal(12), Wavelet::Haar, 3, &ShiftConfig::new()).unwrap_err();
        assert!(matches!(err, PacketError::LengthMismatch { len: 12, depth: 3 }));
    }

    #[test]
    fn zero_signal_tree_is_well_formed() {
        // Zero cost everywhere: children never beat the root strictly, but
        // the default margin expands on ties, so every node splits down to
        // the cap. The structure must still be well-formed.
        let signal = Signal::new(vec![0.0; 16]).unwrap();
        let tree = shift_decompose(&signal, Wavelet::Haar, 4, &ShiftConfig::new()).unwrap();
        for (_, node) in tree.iter() {
            assert!(node.coeffs().iter().all(|x| *x == 0.0));
        }
    }

    #[test]
    fn rotate_wraps() {
        assert_eq!(rotate(&[1.0, 2.0, 3.0, 4.0], 1), vec![2.0, 3.0, 4.0, 1.0]);
        assert_eq!(rotate(&[1.0, 2.0, 3.0, 4.0], 0), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn tree_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<ShiftTree>();
        assert_impl::<ShiftNode>();
        assert_impl::<ShiftConfig>();
    }
}

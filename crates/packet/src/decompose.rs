//! 1-D wavelet packet decomposition and reconstruction.

use rayon::prelude::*;
use tracing::debug;

use crate::error::PacketError;
use crate::filter::Wavelet;
use crate::signal::Signal;
use crate::step::{
    analysis_step, dilated_analysis_step, dilated_smooth_step, dilated_synthesis_step,
    synthesis_step,
};
use crate::tree::{DecomposeMode, PacketTree};

/// Computes the maximum feasible decomposition depth for a signal length:
/// the largest `d` with `2^d <= n`.
///
/// # Example
///
/// ```
/// use apollo_packet::max_depth;
///
/// assert_eq!(max_depth(16), 4);
/// assert_eq!(max_depth(17), 4);
/// ```
pub fn max_depth(n: usize) -> usize {
    if n == 0 {
        return 0;
    }
    (usize::BITS - 1 - n.leading_zeros()) as usize
}

fn validate_request(len: usize, depth: usize, mode: DecomposeMode) -> Result<(), PacketError> {
    let max = max_depth(len);
    if depth > max {
        return Err(PacketError::DepthTooHigh {
            requested: depth,
            max,
            len,
        });
    }
    // Critically sampled and autocorrelation trees need every split level
    // to come out even.
    if !matches!(mode, DecomposeMode::Stationary) && len % (1 << depth) != 0 {
        return Err(PacketError::LengthMismatch { len, depth });
    }
    Ok(())
}

/// Splits one node into its two children according to the decomposition mode.
fn split(v: &[f64], wavelet: Wavelet, depth: usize, mode: DecomposeMode) -> (Vec<f64>, Vec<f64>) {
    match mode {
        DecomposeMode::Ordinary => {
            let h = wavelet.scaling_coeffs();
            let g = wavelet.wavelet_coeffs();
            analysis_step(v, h, &g)
        }
        DecomposeMode::Stationary => {
            let h = wavelet.scaling_coeffs();
            let g = wavelet.wavelet_coeffs();
            dilated_analysis_step(v, h, &g, 1 << depth)
        }
        DecomposeMode::Autocorrelation => {
            let a = wavelet.autocorr_coeffs();
            let lo = dilated_smooth_step(v, &a, 1 << depth);
            let hi = v.iter().zip(&lo).map(|(x, s)| x - s).collect();
            (lo, hi)
        }
    }
}

/// Decomposes a signal into a complete wavelet packet tree.
///
/// Every node at depth `d < depth` is split into a low-pass and a high-pass
/// child; the boundary is periodic. For the ordinary mode children halve in
/// length; for the redundant modes (stationary, autocorrelation) children
/// keep the parent's full length and the filters are dilated per level.
///
/// The engine is a pure function of its inputs: no state is shared across
/// invocations, and the returned tree is immutable.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`PacketError::DepthTooHigh`] | `2^depth > signal.len()` |
/// | [`PacketError::LengthMismatch`] | ordinary/autocorrelation and `len % 2^depth != 0` |
pub fn decompose(
    signal: &Signal,
    wavelet: Wavelet,
    depth: usize,
    mode: DecomposeMode,
) -> Result<PacketTree, PacketError> {
    let n = signal.len();
    validate_request(n, depth, mode)?;

    let mut levels: Vec<Vec<Vec<f64>>> = Vec::with_capacity(depth + 1);
    levels.push(vec![signal.as_slice().to_vec()]);

    for d in 0..depth {
        let parents = &levels[d];
        let mut children = Vec::with_capacity(parents.len() * 2);
        for parent in parents {
            let (lo, hi) = split(parent, wavelet, d, mode);
            children.push(lo);
            children.push(hi);
        }
        levels.push(children);
    }

    debug!(
        len = n,
        depth,
        mode = ?mode,
        wavelet = ?wavelet,
        "packet decomposition complete"
    );
    Ok(PacketTree::new(wavelet, mode, 2, n, None, levels))
}

/// Decomposes every signal of an ensemble with identical parameters.
///
/// Signals are independent, so the fan-out is data-parallel; the result
/// preserves input order.
///
/// # Errors
///
/// Propagates the first [`PacketError`] raised for any member signal.
pub fn decompose_ensemble(
    signals: &[Signal],
    wavelet: Wavelet,
    depth: usize,
    mode: DecomposeMode,
) -> Result<Vec<PacketTree>, PacketError> {
    signals
        .par_iter()
        .map(|signal| decompose(signal, wavelet, depth, mode))
        .collect()
}

/// Merges two children back into their parent according to the mode.
fn merge(
    lo: &[f64],
    hi: &[f64],
    wavelet: Wavelet,
    depth: usize,
    mode: DecomposeMode,
) -> Vec<f64> {
    match mode {
        DecomposeMode::Ordinary => {
            let h = wavelet.scaling_coeffs();
            let g = wavelet.wavelet_coeffs();
            synthesis_step(lo, hi, h, &g)
        }
        DecomposeMode::Stationary => {
            let h = wavelet.scaling_coeffs();
            let g = wavelet.wavelet_coeffs();
            dilated_synthesis_step(lo, hi, h, &g, 1 << depth)
        }
        DecomposeMode::Autocorrelation => lo.iter().zip(hi).map(|(s, d)| s + d).collect(),
    }
}

/// Reconstructs the original signal from the deepest level of a packet tree.
///
/// Inverts every split exactly: ordinary trees via the orthogonal synthesis
/// step, stationary trees via the adjoint filters, autocorrelation trees by
/// summing the additive split. Round-trips to machine precision.
///
/// # Errors
///
/// Returns [`PacketError::UnsupportedMode`] for 2-D (quaternary) trees;
/// use [`crate::reconstruct_image`] for those.
pub fn reconstruct(tree: &PacketTree) -> Result<Vec<f64>, PacketError> {
    if tree.arity() != 2 {
        return Err(PacketError::UnsupportedMode(
            "reconstruct expects a 1-D tree; use reconstruct_image for 2-D trees",
        ));
    }

    let depth = tree.depth();
    let mut current: Vec<Vec<f64>> = (0..tree.nodes_at(depth))
        .map(|i| {
            tree.node(depth, i)
                .expect("complete tree has every deepest-level node")
                .to_vec()
        })
        .collect();

    for d in (0..depth).rev() {
        let mut parents = Vec::with_capacity(current.len() / 2);
        for pair in current.chunks_exact(2) {
            parents.push(merge(&pair[0], &pair[1], tree.wavelet(), d, tree.mode()));
        }
        current = parents;
    }

    Ok(current.swap_remove(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signal(n: usize) -> Signal {
        Signal::new((0..n).map(|i| (i as f64 * 0.31).sin() + 0.2).collect()).unwrap()
    }

    #[test]
    fn max_depth_values() {
        assert_eq!(max_depth(0), 0);
        assert_eq!(max_depth(1), 0);
        assert_eq!(max_depth(2), 1);
        assert_eq!(max_depth(16), 4);
        assert_eq!(max_depth(31), 4);
        assert_eq!(max_depth(32), 5);
    }

    #[test]
    fn ordinary_node_lengths_halve() {
        let tree = decompose(&signal(16), Wavelet::D4, 3, DecomposeMode::Ordinary).unwrap();
        assert_eq!(tree.depth(), 3);
        for d in 0..=3 {
            assert_eq!(tree.nodes_at(d), 1 << d);
            for i in 0..tree.nodes_at(d) {
                assert_eq!(tree.node(d, i).unwrap().len(), 16 >> d);
            }
        }
    }

    #[test]
    fn redundant_nodes_keep_full_length() {
        for mode in [DecomposeMode::Stationary, DecomposeMode::Autocorrelation] {
            let tree = decompose(&signal(16), Wavelet::Haar, 3, mode).unwrap();
            for d in 0..=3 {
                for i in 0..tree.nodes_at(d) {
                    assert_eq!(tree.node(d, i).unwrap().len(), 16, "{mode:?} depth {d}");
                }
            }
        }
    }

    #[test]
    fn depth_zero_is_root_only() {
        let tree = decompose(&signal(8), Wavelet::Haar, 0, DecomposeMode::Ordinary).unwrap();
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.node(0, 0).unwrap(), signal(8).as_slice());
    }

    #[test]
    fn length_mismatch_rejected() {
        let err = decompose(&signal(12), Wavelet::Haar, 3, DecomposeMode::Ordinary).unwrap_err();
        assert!(matches!(err, PacketError::LengthMismatch { len: 12, depth: 3 }));

        let err = decompose(&signal(12), Wavelet::Haar, 3, DecomposeMode::Autocorrelation)
            .unwrap_err();
        assert!(matches!(err, PacketError::LengthMismatch { len: 12, depth: 3 }));
    }

    #[test]
    fn stationary_accepts_non_dyadic_length() {
        let tree = decompose(&signal(12), Wavelet::Haar, 3, DecomposeMode::Stationary).unwrap();
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.node(3, 0).unwrap().len(), 12);
    }

    #[test]
    fn depth_too_high_rejected() {
        let err = decompose(&signal(16), Wavelet::Haar, 5, DecomposeMode::Stationary).unwrap_err();
        assert!(matches!(
            err,
            PacketError::DepthTooHigh {
                requested: 5,
                max: 4,
                len: 16
            }
        ));
    }

    #[test]
    fn autocorrelation_split_is_additive() {
        let s = signal(16);
        let tree = decompose(&s, Wavelet::D4, 1, DecomposeMode::Autocorrelation).unwrap();
        let lo = tree.node(1, 0).unwrap();
        let hi = tree.node(1, 1).unwrap();
        for ((x, l), h) in s.as_slice().iter().zip(lo).zip(hi) {
            assert!((x - (l + h)).abs() < 1e-12);
        }
    }

    #[test]
    fn ensemble_matches_individual() {
        let signals = vec![signal(16), signal(16)];
        let trees =
            decompose_ensemble(&signals, Wavelet::La8, 2, DecomposeMode::Ordinary).unwrap();
        assert_eq!(trees.len(), 2);
        let single = decompose(&signals[1], Wavelet::La8, 2, DecomposeMode::Ordinary).unwrap();
        for d in 0..=2 {
            for i in 0..single.nodes_at(d) {
                assert_eq!(trees[1].node(d, i).unwrap(), single.node(d, i).unwrap());
            }
        }
    }

    #[test]
    fn ensemble_propagates_errors() {
        let signals = vec![signal(16), signal(12)];
        let err = decompose_ensemble(&signals, Wavelet::Haar, 3, DecomposeMode::Ordinary)
            .unwrap_err();
        assert!(matches!(err, PacketError::LengthMismatch { .. }));
    }
}

//! The defining SIBB property: selection is invariant under circular shifts
//! of the input signal.

use apollo_basis::{is_valid_shift_basis, shift_best_basis, SelectConfig};
use apollo_packet::{shift_decompose, ShiftConfig, Signal, Wavelet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn rotated(data: &[f64], by: usize) -> Vec<f64> {
    let n = data.len();
    (0..n).map(|i| data[(i + by) % n]).collect()
}

/// Sum of coefficients at each selected node, sorted for multiset comparison.
fn selected_sums(signal: &Signal) -> Vec<f64> {
    let tree = shift_decompose(signal, Wavelet::D4, 4, &ShiftConfig::new()).unwrap();
    let basis = shift_best_basis(&tree, &SelectConfig::default()).unwrap();
    assert!(is_valid_shift_basis(&tree, &basis));
    let mut sums: Vec<f64> = basis
        .selected()
        .map(|(&(d, i), _)| tree.node(d, i).unwrap().coeffs().iter().sum())
        .collect();
    sums.sort_by(|a, b| a.partial_cmp(b).unwrap());
    sums
}

#[test]
fn shift_by_four_preserves_selected_sums() {
    let mut rng = StdRng::seed_from_u64(29);
    let data: Vec<f64> = (0..16).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let original = Signal::new(data.clone()).unwrap();
    let shifted = Signal::new(rotated(&data, 4)).unwrap();

    let a = selected_sums(&original);
    let b = selected_sums(&shifted);

    assert_eq!(a.len(), b.len(), "selected node counts differ");
    for (x, y) in a.iter().zip(&b) {
        assert!((x - y).abs() < 1e-9, "sum multisets differ: {x} vs {y}");
    }
}

#[test]
fn every_shift_preserves_the_cost_sequence() {
    let mut rng = StdRng::seed_from_u64(37);
    let data: Vec<f64> = (0..16).map(|_| rng.gen_range(-2.0..2.0)).collect();

    let reference = {
        let signal = Signal::new(data.clone()).unwrap();
        let tree = shift_decompose(&signal, Wavelet::D4, 4, &ShiftConfig::new()).unwrap();
        let basis = shift_best_basis(&tree, &SelectConfig::default()).unwrap();
        (
            basis.selected().map(|(&addr, _)| addr).collect::<Vec<_>>(),
            basis.total_cost(),
        )
    };

    for by in 1..16 {
        let signal = Signal::new(rotated(&data, by)).unwrap();
        let tree = shift_decompose(&signal, Wavelet::D4, 4, &ShiftConfig::new()).unwrap();
        let basis = shift_best_basis(&tree, &SelectConfig::default()).unwrap();
        assert!(is_valid_shift_basis(&tree, &basis), "shift {by}");
        let addresses: Vec<_> = basis.selected().map(|(&addr, _)| addr).collect();
        assert_eq!(addresses, reference.0, "selected nodes changed at shift {by}");
        assert!(
            (basis.total_cost() - reference.1).abs() < 1e-9,
            "total cost changed at shift {by}: {} vs {}",
            basis.total_cost(),
            reference.1
        );
    }
}

#[test]
fn shifted_signal_coefficients_are_rotations_of_the_original() {
    // Node-for-node, the shifted signal's coefficient vectors are circular
    // shifts of the original's, which is what makes the cost sequence exact.
    let mut rng = StdRng::seed_from_u64(43);
    let data: Vec<f64> = (0..16).map(|_| rng.gen_range(-1.0..1.0)).collect();
    let original = Signal::new(data.clone()).unwrap();
    let shifted = Signal::new(rotated(&data, 2)).unwrap();

    let tree_a = shift_decompose(&original, Wavelet::Haar, 3, &ShiftConfig::new()).unwrap();
    let tree_b = shift_decompose(&shifted, Wavelet::Haar, 3, &ShiftConfig::new()).unwrap();

    for (&(d, i), node_a) in tree_a.iter() {
        let node_b = tree_b.node(d, i).expect("same structure");
        let a = node_a.coeffs();
        let b = node_b.coeffs();
        assert_eq!(a.len(), b.len());
        let matches_some_rotation = (0..a.len()).any(|by| {
            a.iter()
                .zip(rotated(b, by).iter())
                .all(|(x, y)| (x - y).abs() < 1e-9)
        });
        assert!(matches_some_rotation, "node ({d},{i}) is not a rotation");
    }
}

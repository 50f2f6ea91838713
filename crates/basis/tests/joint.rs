//! Joint selection (JBB and LSDB) over signal ensembles.

use apollo_basis::{
    is_valid_basis, joint_best_basis, least_dependent_basis, CostFunction, SelectConfig,
};
use apollo_packet::{decompose_ensemble, DecomposeMode, PacketTree, Signal, Wavelet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn ensemble(n: usize, count: usize, seed: u64) -> Vec<PacketTree> {
    let mut rng = StdRng::seed_from_u64(seed);
    let signals: Vec<Signal> = (0..count)
        .map(|s| {
            let phase = s as f64 * 0.4;
            Signal::new(
                (0..n)
                    .map(|i| (i as f64 * 0.5 + phase).sin() + 0.1 * rng.gen_range(-1.0..1.0))
                    .collect(),
            )
            .unwrap()
        })
        .collect();
    decompose_ensemble(&signals, Wavelet::D4, 3, DecomposeMode::Ordinary).unwrap()
}

#[test]
fn jbb_returns_one_shared_valid_basis() {
    let trees = ensemble(32, 4, 3);
    let basis = joint_best_basis(&trees, &SelectConfig::default()).unwrap();
    assert!(is_valid_basis(32, &basis));
    // The shared basis extracts a full covering from every member tree.
    for tree in &trees {
        assert_eq!(basis.extract(tree).unwrap().len(), 32);
    }
}

#[test]
fn jbb_of_identical_signals_matches_single_signal_bb() {
    let trees = ensemble(16, 1, 5);
    let duplicated = vec![trees[0].clone(), trees[0].clone(), trees[0].clone()];
    let config = SelectConfig::default();
    let single = apollo_basis::best_basis(&trees[0], &config).unwrap();
    let joint = joint_best_basis(&duplicated, &config).unwrap();
    assert_eq!(single.selected(), joint.selected());
}

#[test]
fn lsdb_returns_one_shared_valid_basis_with_rotations() {
    let trees = ensemble(16, 3, 7);
    let result = least_dependent_basis(&trees, &SelectConfig::default()).unwrap();
    assert!(is_valid_basis(16, result.basis()));
    assert_eq!(result.n_rotations(), result.basis().n_selected());
}

#[test]
fn lsdb_rotations_are_orthogonal() {
    let trees = ensemble(16, 4, 11);
    let result = least_dependent_basis(&trees, &SelectConfig::default()).unwrap();
    for (d, i) in result.basis().selected() {
        let rotation = result.rotation(d, i).unwrap();
        let m = rotation.len();
        for a in 0..m {
            for b in 0..m {
                let dot: f64 = (0..m).map(|r| rotation[a][r] * rotation[b][r]).sum();
                let expected = if a == b { 1.0 } else { 0.0 };
                assert!(
                    (dot - expected).abs() < 1e-8,
                    "node ({d},{i}) columns {a},{b}: {dot}"
                );
            }
        }
    }
}

#[test]
fn lsdb_is_deterministic() {
    let trees = ensemble(16, 3, 13);
    let config = SelectConfig::default();
    let a = least_dependent_basis(&trees, &config).unwrap();
    let b = least_dependent_basis(&trees, &config).unwrap();
    assert_eq!(a.basis(), b.basis());
    for (d, i) in a.basis().selected() {
        assert_eq!(a.rotation(d, i), b.rotation(d, i));
    }
}

#[test]
fn joint_methods_validate_their_ensembles() {
    let config = SelectConfig::default();
    assert!(joint_best_basis(&[], &config).is_err());
    assert!(least_dependent_basis(&[], &config).is_err());

    let mut trees = ensemble(16, 2, 17);
    trees.extend(ensemble(32, 1, 19));
    assert!(joint_best_basis(&trees, &config).is_err());
    assert!(least_dependent_basis(&trees, &config).is_err());
}

#[test]
fn jbb_on_redundant_ensemble_is_valid() {
    let signals: Vec<Signal> = (0..3)
        .map(|s| {
            Signal::new((0..16).map(|i| ((i + s) as f64 * 0.7).cos()).collect()).unwrap()
        })
        .collect();
    let trees =
        decompose_ensemble(&signals, Wavelet::Haar, 3, DecomposeMode::Stationary).unwrap();
    let config = SelectConfig::new(CostFunction::LpNorm { p: 1.0 }).with_redundant(true);
    let basis = joint_best_basis(&trees, &config).unwrap();
    assert!(is_valid_basis(16, &basis));
}

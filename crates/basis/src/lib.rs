//! # apollo-basis
//!
//! Best-basis selection over wavelet packet trees.
//!
//! Given one or more coefficient trees from [`apollo_packet`] and an
//! additive cost functional, a bottom-up dynamic program decides at every
//! internal node whether the node itself or the combination of its
//! children's resolved sub-bases represents the signal(s) more cheaply. The
//! decision propagates to the root and yields a single globally consistent
//! cut through the tree. Ties always resolve to the coarser node.
//!
//! ## Search Policies
//!
//! | Method | Input | Result |
//! |--------|-------|--------|
//! | [`best_basis`] (BB) | one [`PacketTree`](apollo_packet::PacketTree) | [`Basis`] |
//! | [`joint_best_basis`] (JBB) | shape-identical ensemble | one shared [`Basis`] |
//! | [`least_dependent_basis`] (LSDB) | shape-identical ensemble | [`LsdbBasis`] with per-node rotations |
//! | [`shift_best_basis`] (SIBB) | one [`ShiftTree`](apollo_packet::ShiftTree) | [`ShiftBasis`] with shift tags |
//!
//! ## Quick Start
//!
//! ```
//! use apollo_basis::{best_basis, is_valid_basis, CostFunction, SelectConfig};
//! use apollo_packet::{decompose, DecomposeMode, Signal, Wavelet};
//!
//! let data: Vec<f64> = (0..32).map(|i| (i as f64 * 0.6).sin()).collect();
//! let signal = Signal::new(data).unwrap();
//! let tree = decompose(&signal, Wavelet::La8, 4, DecomposeMode::Ordinary).unwrap();
//!
//! let config = SelectConfig::new(CostFunction::ShannonEntropy);
//! let basis = best_basis(&tree, &config).unwrap();
//! assert!(is_valid_basis(32, &basis));
//! ```

mod basis;
mod cost;
mod error;
mod joint;
mod linalg;
mod select;
mod shift;

pub use basis::{is_valid_basis, Basis};
pub use cost::CostFunction;
pub use error::BasisError;
pub use joint::{joint_best_basis, least_dependent_basis, LsdbBasis};
pub use select::{best_basis, SelectConfig};
pub use shift::{is_valid_shift_basis, shift_best_basis, ShiftBasis};

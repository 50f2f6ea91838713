//! # apollo-packet
//!
//! Wavelet packet filter-bank decomposition for 1-D signals and 2-D images.
//!
//! ## Analysis Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["Signal::new(data)?"] -->|"validate"| B["Signal"]
//!     B -->|"decompose(&s, wavelet, depth, mode)?"| C["PacketTree"]
//!     C -->|"reconstruct(&tree)?"| B
//!     B -->|"shift_decompose(&s, wavelet, depth, &config)?"| D["ShiftTree"]
//!     E["Image::new(rows, cols, data)?"] -->|"decompose_image"| F["PacketTree (arity 4)"]
//! ```
//!
//! ## Decomposition Families
//!
//! | Mode | Downsampling | Tree |
//! |------|--------------|------|
//! | [`DecomposeMode::Ordinary`] | critical | complete binary |
//! | [`DecomposeMode::Stationary`] | none (dilated filters) | complete binary, redundant |
//! | [`DecomposeMode::Autocorrelation`] | none (autocorrelation shell) | complete binary, redundant |
//! | [`shift_decompose`] | critical | irregular, data-dependent |
//!
//! ## Supported Filters
//!
//! | Filter | Length | Family |
//! |--------|--------|--------|
//! | [`Wavelet::Haar`] | 2 | Haar |
//! | [`Wavelet::D4`] | 4 | Daubechies |
//! | [`Wavelet::D6`] | 6 | Daubechies |
//! | [`Wavelet::D8`] | 8 | Daubechies |
//! | [`Wavelet::La8`] | 8 | Least Asymmetric |
//! | [`Wavelet::La16`] | 16 | Least Asymmetric |
//!
//! ## Quick Start
//!
//! ```
//! use apollo_packet::{decompose, reconstruct, DecomposeMode, Signal, Wavelet};
//!
//! let data: Vec<f64> = (0..16).map(|i| (i as f64 * 0.4).sin()).collect();
//! let signal = Signal::new(data.clone()).unwrap();
//! let tree = decompose(&signal, Wavelet::D4, 3, DecomposeMode::Ordinary).unwrap();
//! let back = reconstruct(&tree).unwrap();
//! assert!(data.iter().zip(&back).all(|(x, y)| (x - y).abs() < 1e-10));
//! ```

mod decompose;
mod error;
mod filter;
mod image;
mod shift;
mod signal;
mod step;
mod tree;

pub use decompose::{decompose, decompose_ensemble, max_depth, reconstruct};
pub use error::PacketError;
pub use filter::Wavelet;
pub use image::{decompose_image, reconstruct_image, ImageTransform};
pub use shift::{shift_decompose, ShiftConfig, ShiftNode, ShiftTree};
pub use signal::{Image, Signal};
pub use tree::{depth_for_nodes, DecomposeMode, PacketTree};

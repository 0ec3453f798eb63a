//! Hard/soft mixing of multipliers and adders.
//!
//! A design may ask for more multipliers or adders than the target FPGA has
//! hard blocks for. The [`HardSoftMixer`] collects candidate nodes per
//! [`HardBlockType`](hardmix_arch::HardBlockType), asks the grid capacity
//! estimator how many hard blocks the device offers, keeps that many
//! candidates hard, and hands the overflow to a [`SoftSynthesizer`].
//!
//! Which kinds take part is decided once, from the raw `optimizations`
//! setting, by [`OptimizationFlagSet`].
//!
//! # Usage
//!
//! ```ignore
//! let mut mixer = HardSoftMixer::from_config(&arch, &config.mix, &sink);
//! for (node, kind) in netlist.hard_block_candidates() {
//!     mixer.record_candidate(node, kind);
//! }
//! mixer.compute_grid_capacities()?;
//! let report = mixer.select_implementations(&mut netlist)?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod mixer;
pub mod opt_flags;
pub mod synth;

pub use error::MixError;
pub use mixer::{HardSoftMixer, KindReport, MixReport};
pub use opt_flags::{decode, OptimizationFlagSet, OptimizationKind};
pub use synth::SoftSynthesizer;

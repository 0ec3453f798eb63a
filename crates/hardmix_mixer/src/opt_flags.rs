//! Decoding of the integer optimization setting into enabled kinds.

use hardmix_arch::HardBlockType;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One optimization the mixer can be asked to perform.
///
/// Index 0 is the baseline flow. No setting can enable it; it only fixes
/// the weights of the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationKind {
    /// The unmixed flow: every candidate keeps its hard assignment.
    Baseline = 0,
    /// Mix hard and soft multipliers.
    Multipliers = 1,
    /// Mix hard and soft adders.
    Adders = 2,
}

impl OptimizationKind {
    /// Number of optimization kinds, baseline included.
    pub const COUNT: usize = 3;

    /// Every kind, in index order.
    pub const ALL: [OptimizationKind; Self::COUNT] = [
        OptimizationKind::Baseline,
        OptimizationKind::Multipliers,
        OptimizationKind::Adders,
    ];

    /// Returns the decoder index of this kind.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Returns the hard-block kind this optimization mixes.
    pub fn hard_block(self) -> Option<HardBlockType> {
        match self {
            OptimizationKind::Baseline => None,
            OptimizationKind::Multipliers => Some(HardBlockType::Multiplier),
            OptimizationKind::Adders => Some(HardBlockType::Adder),
        }
    }

    /// Returns the optimization that mixes `kind`.
    pub fn for_hard_block(kind: HardBlockType) -> Self {
        match kind {
            HardBlockType::Multiplier => OptimizationKind::Multipliers,
            HardBlockType::Adder => OptimizationKind::Adders,
        }
    }
}

impl fmt::Display for OptimizationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationKind::Baseline => f.write_str("baseline"),
            OptimizationKind::Multipliers => f.write_str("multipliers"),
            OptimizationKind::Adders => f.write_str("adders"),
        }
    }
}

/// Decodes `config` into `n` enabled flags.
///
/// Walks indices `n - 1` down to `1` and enables index `i` whenever the
/// remainder is still at least `i`, subtracting it. Index 0 is never
/// enabled. Only settings in `1..=n*(n-1)/2` name distinct combinations;
/// larger ones saturate to the full set.
pub fn decode(config: u32, n: usize) -> Vec<bool> {
    let mut flags = vec![false; n];
    let mut remaining = u64::from(config);
    for i in (1..n).rev() {
        let weight = i as u64;
        if remaining >= weight {
            flags[i] = true;
            remaining -= weight;
        }
    }
    flags
}

/// The set of optimizations enabled for one mapping pass.
///
/// Fixed when the mixer is built and never changed afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimizationFlagSet {
    raw: u32,
    flags: [bool; OptimizationKind::COUNT],
}

impl OptimizationFlagSet {
    /// Decodes the raw setting.
    pub fn from_config(raw: u32) -> Self {
        let mut flags = [false; OptimizationKind::COUNT];
        flags.copy_from_slice(&decode(raw, OptimizationKind::COUNT));
        Self { raw, flags }
    }

    /// Returns the setting this set was decoded from.
    pub fn raw(&self) -> u32 {
        self.raw
    }

    /// Returns `true` if `kind` is enabled.
    pub fn is_enabled(&self, kind: OptimizationKind) -> bool {
        self.flags[kind.index()]
    }

    /// Returns `true` if any optimization is enabled.
    pub fn any_enabled(&self) -> bool {
        self.flags.iter().any(|&on| on)
    }

    /// Iterates over the hard-block kinds with an enabled optimization.
    pub fn enabled_hard_blocks(&self) -> impl Iterator<Item = HardBlockType> + '_ {
        OptimizationKind::ALL
            .into_iter()
            .filter(|kind| self.is_enabled(*kind))
            .filter_map(OptimizationKind::hard_block)
    }
}

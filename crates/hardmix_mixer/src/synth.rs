//! The netlist-side entry point for soft implementations.

use hardmix_arch::HardBlockType;

/// Rewrites a candidate node as generic soft logic.
///
/// Implemented by the netlist that owns the candidates. The mixer calls it
/// once per softened node, in bucket order, and stops at the first error.
pub trait SoftSynthesizer<N> {
    /// Error returned when a node cannot be softened.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Replaces the hard assignment of `node` with a soft implementation.
    fn synthesize_soft(&mut self, node: &N, kind: HardBlockType) -> Result<(), Self::Error>;
}

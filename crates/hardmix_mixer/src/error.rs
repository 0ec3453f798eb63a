//! Errors of the hard/soft mixing pass and their exit statuses.

use hardmix_arch::{ArchError, HardBlockType};
use hardmix_common::InternalError;
use hardmix_diagnostics::{Category, Diagnostic, DiagnosticCode};

/// Exit status for configuration errors.
pub const EXIT_CONFIGURATION: i32 = 6;
/// Exit status for a location rule naming an unknown tile type.
pub const EXIT_UNKNOWN_TILE_TYPE: i32 = 7;
/// Exit status for a hard-block tag that no location rule places.
pub const EXIT_UNSPECIFIED_PRIORITY: i32 = 8;
/// Exit status for placement formulas that cannot be evaluated.
pub const EXIT_FORMULA: i32 = 9;
/// Exit status for a failed soft-synthesis call.
pub const EXIT_SOFT_SYNTHESIS: i32 = 10;
/// Exit status for internal invariant violations.
pub const EXIT_INTERNAL: i32 = 70;

/// A fatal error of the mixing pass.
///
/// Nothing here is retried and no partial result survives it. The
/// orchestration layer renders [`to_diagnostic`](Self::to_diagnostic) and
/// terminates with [`exit_code`](Self::exit_code).
#[derive(Debug, thiserror::Error)]
pub enum MixError {
    /// Capacities or selection were requested with every optimization off.
    #[error("no hard/soft optimization is enabled (optimizations = {config})")]
    NothingEnabled {
        /// The raw setting that decoded to the empty set.
        config: u32,
    },

    /// Selection ran before grid capacities were computed.
    #[error("hard-block capacities were requested before grid sizes were computed")]
    CapacitiesNotComputed,

    /// Capacity estimation failed.
    #[error(transparent)]
    Arch(#[from] ArchError),

    /// The netlist rejected a soft implementation.
    #[error("soft synthesis of {kind} candidate failed")]
    SoftSynthesis {
        /// Kind of the candidate being softened.
        kind: HardBlockType,
        /// The synthesizer's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A broken invariant inside the mixer.
    #[error(transparent)]
    Internal(#[from] InternalError),
}

impl MixError {
    /// Returns the process exit status for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            MixError::NothingEnabled { .. } | MixError::CapacitiesNotComputed => {
                EXIT_CONFIGURATION
            }
            MixError::Arch(err) => match err {
                ArchError::UnknownTileType { .. } => EXIT_UNKNOWN_TILE_TYPE,
                ArchError::UnspecifiedPriority { .. } => EXIT_UNSPECIFIED_PRIORITY,
                err if err.is_formula() => EXIT_FORMULA,
                _ => EXIT_CONFIGURATION,
            },
            MixError::SoftSynthesis { .. } => EXIT_SOFT_SYNTHESIS,
            MixError::Internal(_) => EXIT_INTERNAL,
        }
    }

    /// Converts this error into an error diagnostic with code `E6xx`.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let number = 600 + self.exit_code() as u16;
        let diag = Diagnostic::error(DiagnosticCode::new(Category::Error, number), self.to_string());
        match self {
            MixError::NothingEnabled { .. } => diag.with_help(
                "set `optimizations` in the [mix] table: 1 for multipliers, 2 for adders, 3 for both",
            ),
            MixError::CapacitiesNotComputed => {
                diag.with_note("grid sizes must be computed before implementations are selected")
            }
            MixError::Arch(err) => arch_diagnostic(diag, err),
            MixError::SoftSynthesis { kind, source } => diag
                .with_subject(kind.to_string())
                .with_note(format!("caused by: {source}")),
            MixError::Internal(_) => diag.with_note("this is a bug in hardmix"),
        }
    }
}

fn arch_diagnostic(diag: Diagnostic, err: &ArchError) -> Diagnostic {
    match err {
        ArchError::UnknownTileType { layout, tile } => diag
            .with_subject(format!("layout `{layout}`"))
            .with_help(format!("declare a tile type named `{tile}`")),
        ArchError::UnspecifiedPriority { layout, tag } => diag
            .with_subject(format!("layout `{layout}`"))
            .with_help(format!(
                "add a location rule for `{tag}` or disable its optimization"
            )),
        ArchError::Formula { layout, .. } | ArchError::NonPositiveIncrement { layout, .. } => {
            diag.with_subject(format!("layout `{layout}`"))
        }
        ArchError::UnboundedGrid(layout) => diag.with_subject(format!("layout `{layout}`")),
        _ => diag,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hardmix_arch::{Axis, FormulaError};

    #[test]
    fn configuration_exit_codes() {
        assert_eq!(MixError::NothingEnabled { config: 0 }.exit_code(), 6);
        assert_eq!(MixError::CapacitiesNotComputed.exit_code(), 6);
        let unbounded = MixError::from(ArchError::UnboundedGrid("auto".to_string()));
        assert_eq!(unbounded.exit_code(), 6);
    }

    #[test]
    fn lookup_exit_codes_are_distinct() {
        let unknown = MixError::from(ArchError::UnknownTileType {
            layout: "l".to_string(),
            tile: "ghost".to_string(),
        });
        let unspecified = MixError::from(ArchError::UnspecifiedPriority {
            layout: "l".to_string(),
            tag: "mult_36".to_string(),
        });
        assert_eq!(unknown.exit_code(), 7);
        assert_eq!(unspecified.exit_code(), 8);
    }

    #[test]
    fn formula_exit_codes() {
        let bad = MixError::from(ArchError::Formula {
            layout: "l".to_string(),
            tile: "adder".to_string(),
            axis: Axis::X,
            source: FormulaError::Empty,
        });
        let stuck = MixError::from(ArchError::NonPositiveIncrement {
            layout: "l".to_string(),
            tile: "adder".to_string(),
            axis: Axis::Y,
            value: 0,
        });
        assert_eq!(bad.exit_code(), 9);
        assert_eq!(stuck.exit_code(), 9);
    }

    #[test]
    fn soft_synthesis_keeps_source() {
        use std::error::Error;
        let io = std::io::Error::new(std::io::ErrorKind::Other, "netlist locked");
        let err = MixError::SoftSynthesis {
            kind: HardBlockType::Adder,
            source: Box::new(io),
        };
        assert_eq!(err.exit_code(), 10);
        assert_eq!(err.to_string(), "soft synthesis of adder candidate failed");
        assert_eq!(err.source().unwrap().to_string(), "netlist locked");
        assert_eq!(err.to_diagnostic().notes, vec!["caused by: netlist locked"]);
    }

    #[test]
    fn diagnostic_codes_follow_exit_status() {
        let diag = MixError::NothingEnabled { config: 0 }.to_diagnostic();
        assert_eq!(diag.code.to_string(), "E606");
        assert!(diag.severity.is_error());
        assert_eq!(diag.help.len(), 1);

        let diag = MixError::from(ArchError::UnspecifiedPriority {
            layout: "fixed".to_string(),
            tag: "adder".to_string(),
        })
        .to_diagnostic();
        assert_eq!(diag.code.to_string(), "E608");
        assert_eq!(diag.subject.as_deref(), Some("layout `fixed`"));
    }

    #[test]
    fn internal_error_is_transparent() {
        let err = MixError::from(InternalError::new("bucket missing"));
        assert_eq!(err.to_string(), "internal error: bucket missing");
        assert_eq!(err.to_diagnostic().code.to_string(), "E670");
    }
}

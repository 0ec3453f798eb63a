//! Error types for architecture construction and capacity estimation.

use crate::formula::FormulaError;
use std::fmt;

/// Grid axis, used to say which half of a location rule is at fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal.
    X,
    /// Vertical.
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => f.write_str("x"),
            Axis::Y => f.write_str("y"),
        }
    }
}

/// Errors raised while building an [`Architecture`](crate::Architecture) or
/// counting tiles in one of its layouts.
///
/// None of these are transient. A capacity that silently skipped a rule
/// would understate what the device offers, so every variant is fatal for
/// the mapping pass.
#[derive(Debug, thiserror::Error)]
pub enum ArchError {
    /// A location rule names a tile type missing from the catalog.
    #[error("layout `{layout}` places unknown tile type `{tile}`")]
    UnknownTileType {
        /// Name of the layout containing the rule.
        layout: String,
        /// The unresolved block-type tag.
        tile: String,
    },

    /// No location rule places the requested tag, so its priority baseline
    /// is unspecified.
    #[error("no location rule in layout `{layout}` places `{tag}`, so its priority is unspecified")]
    UnspecifiedPriority {
        /// Name of the layout.
        layout: String,
        /// The requested hard-block tag.
        tag: String,
    },

    /// A placement formula could not be evaluated.
    #[error("bad {axis} formula for `{tile}` in layout `{layout}`: {source}")]
    Formula {
        /// Name of the layout containing the rule.
        layout: String,
        /// Block-type tag of the rule.
        tile: String,
        /// Which axis spec failed.
        axis: Axis,
        /// The underlying evaluation error.
        #[source]
        source: FormulaError,
    },

    /// An increment formula evaluated to zero or less, so anchors never advance.
    #[error("{axis} increment of `{tile}` in layout `{layout}` evaluates to {value}; it must be positive")]
    NonPositiveIncrement {
        /// Name of the layout containing the rule.
        layout: String,
        /// Block-type tag of the rule.
        tile: String,
        /// Which axis spec failed.
        axis: Axis,
        /// The evaluated increment.
        value: i64,
    },

    /// Tiles were counted on a layout whose size has not been resolved.
    #[error("layout `{0}` has no fixed size; it is resolved by device sizing and cannot be counted")]
    UnboundedGrid(String),

    /// The description declares a tile type twice.
    #[error("duplicate tile type `{0}`")]
    DuplicateTileType(String),

    /// The description declares a tile type with an empty footprint.
    #[error("tile type `{name}` has an empty {width}x{height} footprint")]
    EmptyTileFootprint {
        /// Tile type name.
        name: String,
        /// Declared width.
        width: u32,
        /// Declared height.
        height: u32,
    },

    /// A fixed layout declares a zero dimension.
    #[error("fixed layout `{0}` has a zero dimension")]
    EmptyFixedLayout(String),

    /// A rule uses the reserved priority below every valid priority.
    #[error("rule for `{tile}` in layout `{layout}` uses reserved priority {priority}")]
    ReservedPriority {
        /// Name of the layout containing the rule.
        layout: String,
        /// Block-type tag of the rule.
        tile: String,
        /// The offending priority.
        priority: i32,
    },
}

impl ArchError {
    /// Returns `true` for formula evaluation failures.
    pub fn is_formula(&self) -> bool {
        matches!(
            self,
            ArchError::Formula { .. } | ArchError::NonPositiveIncrement { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unspecified_priority() {
        let err = ArchError::UnspecifiedPriority {
            layout: "fixed_small".to_string(),
            tag: "mult_36".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "no location rule in layout `fixed_small` places `mult_36`, so its priority is unspecified"
        );
        assert!(!err.is_formula());
    }

    #[test]
    fn display_formula() {
        let err = ArchError::Formula {
            layout: "l".to_string(),
            tile: "adder".to_string(),
            axis: Axis::Y,
            source: FormulaError::Empty,
        };
        assert_eq!(err.to_string(), "bad y formula for `adder` in layout `l`: empty formula");
        assert!(err.is_formula());
    }

    #[test]
    fn source_chain() {
        use std::error::Error;
        let err = ArchError::Formula {
            layout: "l".to_string(),
            tile: "adder".to_string(),
            axis: Axis::X,
            source: FormulaError::Empty,
        };
        assert!(err.source().is_some());
    }
}

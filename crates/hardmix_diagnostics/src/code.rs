//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The subsystem that produced a diagnostic, determining its prefix letter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Fatal conditions, prefixed with `E`.
    Error,
    /// Non-fatal architecture or configuration oddities, prefixed with `W`.
    Warning,
    /// Grid capacity estimation, prefixed with `G`.
    Capacity,
    /// Hard/soft selection decisions, prefixed with `M`.
    Mix,
}

impl Category {
    /// Returns the single-character prefix for this category.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Capacity => 'G',
            Category::Mix => 'M',
        }
    }
}

/// A structured diagnostic code: a category prefix and a numeric identifier.
///
/// Displayed as the prefix followed by a zero-padded 3-digit number, e.g.
/// `E606` or `M001`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The category of this diagnostic.
    pub category: Category,
    /// The numeric identifier within the category.
    pub number: u16,
}

impl DiagnosticCode {
    /// Creates a new diagnostic code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}

//! Hard-block kinds and the tags that name them in architecture files.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A kind of dedicated hardware block that candidate operations can map to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardBlockType {
    /// A hardened multiplier.
    Multiplier,
    /// A hardened adder / carry chain.
    Adder,
}

impl HardBlockType {
    /// Number of hard-block kinds.
    pub const COUNT: usize = 2;

    /// Every hard-block kind, in index order.
    pub const ALL: [HardBlockType; Self::COUNT] = [HardBlockType::Multiplier, HardBlockType::Adder];

    /// Returns the dense index of this kind, for per-kind tables.
    pub fn index(self) -> usize {
        match self {
            HardBlockType::Multiplier => 0,
            HardBlockType::Adder => 1,
        }
    }

    /// Returns the tag that the stock VTR architectures use for this kind.
    pub fn default_tag(self) -> &'static str {
        match self {
            HardBlockType::Multiplier => "mult_36",
            HardBlockType::Adder => "adder",
        }
    }
}

impl fmt::Display for HardBlockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HardBlockType::Multiplier => f.write_str("multiplier"),
            HardBlockType::Adder => f.write_str("adder"),
        }
    }
}

/// Maps each [`HardBlockType`] to the block-type tag used by location rules
/// and the tile catalog.
///
/// The mapping is one-to-one; [`with_tag`](Self::with_tag) does not check
/// that, the configuration layer does before building a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardBlockTypeCatalog {
    tags: [String; HardBlockType::COUNT],
}

impl HardBlockTypeCatalog {
    /// Creates a catalog with the stock tags (`mult_36`, `adder`).
    pub fn new() -> Self {
        Self {
            tags: HardBlockType::ALL.map(|kind| kind.default_tag().to_string()),
        }
    }

    /// Replaces the tag of one kind.
    pub fn with_tag(mut self, kind: HardBlockType, tag: impl Into<String>) -> Self {
        self.tags[kind.index()] = tag.into();
        self
    }

    /// Returns the architecture tag for a kind.
    pub fn tag(&self, kind: HardBlockType) -> &str {
        &self.tags[kind.index()]
    }

    /// Returns the kind whose tag is `tag`, if any.
    pub fn kind_of(&self, tag: &str) -> Option<HardBlockType> {
        HardBlockType::ALL
            .into_iter()
            .find(|kind| self.tag(*kind) == tag)
    }
}

impl Default for HardBlockTypeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense() {
        for (i, kind) in HardBlockType::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn default_tags() {
        let catalog = HardBlockTypeCatalog::new();
        assert_eq!(catalog.tag(HardBlockType::Multiplier), "mult_36");
        assert_eq!(catalog.tag(HardBlockType::Adder), "adder");
    }

    #[test]
    fn override_tag() {
        let catalog = HardBlockTypeCatalog::new().with_tag(HardBlockType::Multiplier, "mult_27");
        assert_eq!(catalog.tag(HardBlockType::Multiplier), "mult_27");
        assert_eq!(catalog.tag(HardBlockType::Adder), "adder");
    }

    #[test]
    fn reverse_lookup() {
        let catalog = HardBlockTypeCatalog::new();
        assert_eq!(catalog.kind_of("adder"), Some(HardBlockType::Adder));
        assert_eq!(catalog.kind_of("clb"), None);
    }

    #[test]
    fn display_and_serde() {
        assert_eq!(HardBlockType::Multiplier.to_string(), "multiplier");
        let json = serde_json::to_string(&HardBlockType::Adder).unwrap();
        assert_eq!(json, "\"adder\"");
    }
}

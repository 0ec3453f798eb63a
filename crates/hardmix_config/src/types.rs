//! Configuration types deserialized from `hardmix.toml`.

use hardmix_arch::{HardBlockType, HardBlockTypeCatalog};
use serde::Deserialize;

/// The top-level configuration document.
#[derive(Debug, Default, Deserialize)]
pub struct MixConfig {
    /// Hard/soft mixing settings.
    #[serde(default)]
    pub mix: MixSection,
}

/// The `[mix]` table.
#[derive(Debug, Default, Deserialize)]
pub struct MixSection {
    /// Encoded set of enabled optimizations; `0` disables mixing.
    #[serde(default)]
    pub optimizations: u32,
    /// Architecture tag overrides per hard-block kind.
    #[serde(default)]
    pub tags: TagOverrides,
}

/// The `[mix.tags]` table.
#[derive(Debug, Default, Deserialize)]
pub struct TagOverrides {
    /// Tag of the multiplier tile type (default `mult_36`).
    pub multiplier: Option<String>,
    /// Tag of the adder tile type (default `adder`).
    pub adder: Option<String>,
}

impl TagOverrides {
    /// Returns the override for one kind, if set.
    pub fn get(&self, kind: HardBlockType) -> Option<&str> {
        match kind {
            HardBlockType::Multiplier => self.multiplier.as_deref(),
            HardBlockType::Adder => self.adder.as_deref(),
        }
    }
}

impl MixSection {
    /// Builds the tag catalog: stock tags with the configured overrides applied.
    pub fn tag_catalog(&self) -> HardBlockTypeCatalog {
        HardBlockType::ALL
            .into_iter()
            .fold(HardBlockTypeCatalog::new(), |catalog, kind| {
                match self.tags.get(kind) {
                    Some(tag) => catalog.with_tag(kind, tag),
                    None => catalog,
                }
            })
    }
}

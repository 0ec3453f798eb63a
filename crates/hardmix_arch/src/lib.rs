//! Rule-based FPGA grid layouts and hard-block capacity estimation.
//!
//! An [`Architecture`] is the read-only view of an already-parsed
//! architecture file: a catalog of physical tile types and an ordered list
//! of grid layouts, each a sequence of prioritized location rules. The
//! [`GridCapacityEstimator`] replays those rules on a transient grid to
//! count how many hard blocks of a given [`HardBlockType`] a layout offers.
//!
//! # Usage
//!
//! ```
//! use hardmix_arch::{ArchDescription, Architecture, GridCapacityEstimator, HardBlockType,
//!     HardBlockTypeCatalog};
//!
//! let desc: ArchDescription = serde_json::from_str(r#"{
//!     "tiles": [{"name": "adder"}],
//!     "layouts": [{
//!         "name": "row",
//!         "grid": {"type": "fixed", "width": 10, "height": 10},
//!         "rules": [{
//!             "block_type": "adder", "priority": 1,
//!             "x": {"start_expr": "0", "end_expr": "9", "incr_expr": "1", "repeat_expr": "10"},
//!             "y": {"start_expr": "0", "end_expr": "0", "incr_expr": "1", "repeat_expr": "10"}
//!         }]
//!     }]
//! }"#).unwrap();
//!
//! let arch = Architecture::from_description(&desc).unwrap();
//! let tags = HardBlockTypeCatalog::new();
//! let estimator = GridCapacityEstimator::new(arch.interner(), &tags);
//! let layout = &arch.layouts()[0];
//! let size = estimator.estimate_device_size(layout);
//! let adders = estimator
//!     .count_tiles_of_type(layout, HardBlockType::Adder, size, arch.tile_catalog())
//!     .unwrap();
//! assert_eq!(adders, 10);
//! ```

#![warn(missing_docs)]

pub mod analyzer;
pub mod error;
pub mod formula;
pub mod grid;
pub mod hard_block;
pub mod ids;
pub mod types;

pub use analyzer::GridCapacityEstimator;
pub use error::{ArchError, Axis};
pub use formula::{FormulaError, FormulaEvaluator, FormulaVars};
pub use grid::{Grid, GridCell, UNOCCUPIED_PRIORITY};
pub use hard_block::{HardBlockType, HardBlockTypeCatalog};
pub use ids::{LayoutId, TileTypeId};
pub use types::{
    ArchDescription, AxisSpec, GridLayout, GridLayoutDesc, GridSize, GridType, LocationRule,
    LocationRuleDesc, PhysicalTileType, TileCatalog, TileTypeDesc,
};

use hardmix_common::{Ident, Interner};

/// The tile catalog and grid layouts of one target architecture.
///
/// Built once from an [`ArchDescription`] and then only read: the mapping
/// pass hands out shared references and never clones or mutates it.
#[derive(Debug)]
pub struct Architecture {
    interner: Interner,
    tiles: TileCatalog,
    layouts: Vec<GridLayout>,
}

impl Architecture {
    /// Interns every name in `desc` and validates its tiles and layouts.
    ///
    /// Rules referring to tile types missing from the catalog are accepted
    /// here; they only become an error if a capacity query has to stamp
    /// them.
    ///
    /// # Errors
    ///
    /// Returns [`ArchError`] for duplicate tile types, empty tile
    /// footprints, fixed layouts with a zero dimension, and rules using the
    /// reserved unoccupied priority.
    pub fn from_description(desc: &ArchDescription) -> Result<Self, ArchError> {
        let interner = Interner::new();

        let mut tiles = TileCatalog::new();
        for tile in &desc.tiles {
            if tile.width == 0 || tile.height == 0 {
                return Err(ArchError::EmptyTileFootprint {
                    name: tile.name.clone(),
                    width: tile.width,
                    height: tile.height,
                });
            }
            tiles
                .insert(PhysicalTileType {
                    name: interner.get_or_intern(&tile.name),
                    width: tile.width,
                    height: tile.height,
                })
                .ok_or_else(|| ArchError::DuplicateTileType(tile.name.clone()))?;
        }

        let mut layouts = Vec::with_capacity(desc.layouts.len());
        for layout in &desc.layouts {
            if let GridType::Fixed { width, height } = layout.grid {
                if width == 0 || height == 0 {
                    return Err(ArchError::EmptyFixedLayout(layout.name.clone()));
                }
            }
            let mut rules = Vec::with_capacity(layout.rules.len());
            for rule in &layout.rules {
                if rule.priority == UNOCCUPIED_PRIORITY {
                    return Err(ArchError::ReservedPriority {
                        layout: layout.name.clone(),
                        tile: rule.block_type.clone(),
                        priority: rule.priority,
                    });
                }
                rules.push(LocationRule {
                    block_type: interner.get_or_intern(&rule.block_type),
                    priority: rule.priority,
                    x: rule.x.clone(),
                    y: rule.y.clone(),
                });
            }
            layouts.push(GridLayout {
                name: layout.name.clone(),
                grid: layout.grid,
                rules,
            });
        }

        Ok(Self {
            interner,
            tiles,
            layouts,
        })
    }

    /// Returns the interner holding every tile and tag name.
    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// Returns the physical tile catalog.
    pub fn tile_catalog(&self) -> &TileCatalog {
        &self.tiles
    }

    /// Returns all grid layouts in declaration order.
    pub fn layouts(&self) -> &[GridLayout] {
        &self.layouts
    }

    /// Returns the layout with the given ID.
    pub fn layout(&self, id: LayoutId) -> Option<&GridLayout> {
        self.layouts.get(id.index())
    }

    /// Iterates over layouts paired with their IDs.
    pub fn layouts_with_ids(&self) -> impl Iterator<Item = (LayoutId, &GridLayout)> {
        self.layouts
            .iter()
            .enumerate()
            .map(|(i, layout)| (LayoutId::from_raw(i as u32), layout))
    }

    /// Resolves an interned name.
    pub fn name(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(json: &str) -> ArchDescription {
        serde_json::from_str(json).unwrap()
    }

    const SMALL_ARCH: &str = r#"{
        "tiles": [
            {"name": "io"},
            {"name": "clb"},
            {"name": "mult_36", "width": 1, "height": 4},
            {"name": "adder"}
        ],
        "layouts": [
            {
                "name": "fixed_small",
                "grid": {"type": "fixed", "width": 20, "height": 16},
                "rules": [
                    {"block_type": "io", "priority": 100,
                     "x": {"start_expr": "0", "end_expr": "W-1", "incr_expr": "W-1"}},
                    {"block_type": "clb", "priority": 1},
                    {"block_type": "mult_36", "priority": 20,
                     "x": {"start_expr": "4", "end_expr": "4", "incr_expr": "w", "repeat_expr": "8"},
                     "y": {"start_expr": "0", "end_expr": "H-1", "incr_expr": "h"}},
                    {"block_type": "adder", "priority": 10,
                     "y": {"start_expr": "1", "end_expr": "1", "incr_expr": "1"}}
                ]
            },
            {
                "name": "auto",
                "grid": {"type": "auto", "aspect_ratio": 2.0},
                "rules": [{"block_type": "clb", "priority": 1}]
            }
        ]
    }"#;

    #[test]
    fn builds_from_description() {
        let arch = Architecture::from_description(&desc(SMALL_ARCH)).unwrap();
        assert_eq!(arch.tile_catalog().len(), 4);
        assert_eq!(arch.layouts().len(), 2);
        assert!(arch.layouts()[0].is_fixed());
        assert!(!arch.layouts()[1].is_fixed());

        let mult = arch.interner().get("mult_36").unwrap();
        assert_eq!(arch.tile_catalog().find(mult).unwrap().height, 4);
        assert_eq!(arch.name(arch.layouts()[0].rules[1].block_type), "clb");
    }

    #[test]
    fn layout_ids_follow_declaration_order() {
        let arch = Architecture::from_description(&desc(SMALL_ARCH)).unwrap();
        let names: Vec<_> = arch
            .layouts_with_ids()
            .map(|(id, layout)| (id.as_raw(), layout.name.as_str()))
            .collect();
        assert_eq!(names, vec![(0, "fixed_small"), (1, "auto")]);
        assert_eq!(arch.layout(LayoutId::from_raw(1)).unwrap().name, "auto");
        assert!(arch.layout(LayoutId::from_raw(2)).is_none());
    }

    #[test]
    fn counts_small_arch() {
        let arch = Architecture::from_description(&desc(SMALL_ARCH)).unwrap();
        let tags = HardBlockTypeCatalog::new();
        let est = GridCapacityEstimator::new(arch.interner(), &tags);
        let layout = &arch.layouts()[0];
        let size = est.estimate_device_size(layout);
        assert_eq!(size, GridSize::new(20, 16));

        // Mult columns at x = 4 and 12 (x = 20 is off the grid), 16 / 4 = 4 each.
        let mults = est
            .count_tiles_of_type(layout, HardBlockType::Multiplier, size, arch.tile_catalog())
            .unwrap();
        assert_eq!(mults, 8);

        // The adder row at y = 1 loses x = 0 and x = 19 to the io columns.
        // The mult tiles physically cover y = 1, but only their anchors at
        // y = 0, 4, 8, 12 are marked, so they take nothing from it.
        let adders = est
            .count_tiles_of_type(layout, HardBlockType::Adder, size, arch.tile_catalog())
            .unwrap();
        assert_eq!(adders, 18);
    }

    #[test]
    fn rejects_duplicate_tile() {
        let err = Architecture::from_description(&desc(
            r#"{"tiles": [{"name": "clb"}, {"name": "clb"}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ArchError::DuplicateTileType(ref name) if name == "clb"));
    }

    #[test]
    fn rejects_empty_footprint() {
        let err = Architecture::from_description(&desc(
            r#"{"tiles": [{"name": "mult_36", "width": 0}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ArchError::EmptyTileFootprint { width: 0, .. }));
    }

    #[test]
    fn rejects_zero_fixed_layout() {
        let err = Architecture::from_description(&desc(
            r#"{"layouts": [{"name": "flat", "grid": {"type": "fixed", "width": 8, "height": 0}}]}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, ArchError::EmptyFixedLayout(_)));
    }

    #[test]
    fn rejects_reserved_priority() {
        let json = format!(
            r#"{{"layouts": [{{"name": "l", "grid": {{"type": "auto"}},
                "rules": [{{"block_type": "clb", "priority": {}}}]}}]}}"#,
            i32::MIN
        );
        let err = Architecture::from_description(&desc(&json)).unwrap_err();
        assert!(matches!(err, ArchError::ReservedPriority { .. }));
    }

    #[test]
    fn unknown_tile_in_rule_is_deferred() {
        let arch = Architecture::from_description(&desc(
            r#"{"layouts": [{"name": "l", "grid": {"type": "auto"},
                "rules": [{"block_type": "ghost", "priority": 1}]}]}"#,
        ));
        assert!(arch.is_ok());
    }
}

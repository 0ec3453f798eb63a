//! Grid layouts, location rules, and physical tile types.
//!
//! Two families of types live here. The `*Desc` types are the serde-facing
//! shape of an already-parsed architecture file and hold plain strings. The
//! runtime types ([`GridLayout`], [`LocationRule`], [`PhysicalTileType`])
//! hold interned [`Ident`]s and are built once by
//! [`Architecture::from_description`](crate::Architecture::from_description).

use crate::ids::TileTypeId;
use hardmix_common::Ident;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// How the dimensions of a grid layout are determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GridType {
    /// Explicit dimensions given in the architecture file.
    Fixed {
        /// Device width in grid cells.
        width: u32,
        /// Device height in grid cells.
        height: u32,
    },
    /// Dimensions chosen later by the device-sizing pass to fit the design.
    Auto {
        /// Requested width / height ratio.
        #[serde(default = "default_aspect_ratio")]
        aspect_ratio: f64,
    },
}

fn default_aspect_ratio() -> f64 {
    1.0
}

/// Device dimensions in grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    /// Number of columns.
    pub width: usize,
    /// Number of rows.
    pub height: usize,
}

impl GridSize {
    /// Sentinel for layouts whose size is not known until device sizing.
    pub const UNBOUNDED: Self = Self {
        width: usize::MAX,
        height: usize::MAX,
    };

    /// Creates a size.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Returns `true` for the [`UNBOUNDED`](Self::UNBOUNDED) sentinel.
    pub fn is_unbounded(self) -> bool {
        self == Self::UNBOUNDED
    }
}

impl fmt::Display for GridSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            f.write_str("unbounded")
        } else {
            write!(f, "{}x{}", self.width, self.height)
        }
    }
}

/// One axis of a location rule: `(start, end, incr, repeat)` formulas.
///
/// Within a repeat instance, anchors run from `start` to `end` in steps of
/// `incr`; instances are shifted by `repeat` until they run off the device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AxisSpec {
    /// First anchor position.
    #[serde(default = "zero_expr")]
    pub start_expr: String,
    /// Last position the tile footprint may cover.
    pub end_expr: String,
    /// Distance between consecutive anchors.
    pub incr_expr: String,
    /// Offset between repeat instances; `0` means no repetition.
    #[serde(default = "zero_expr")]
    pub repeat_expr: String,
}

fn zero_expr() -> String {
    "0".to_string()
}

impl AxisSpec {
    /// Creates an axis spec from its four formulas.
    pub fn new(
        start_expr: impl Into<String>,
        end_expr: impl Into<String>,
        incr_expr: impl Into<String>,
        repeat_expr: impl Into<String>,
    ) -> Self {
        Self {
            start_expr: start_expr.into(),
            end_expr: end_expr.into(),
            incr_expr: incr_expr.into(),
            repeat_expr: repeat_expr.into(),
        }
    }

    /// The whole X axis, one tile after another.
    pub fn full_x() -> Self {
        Self::new("0", "W-1", "w", "0")
    }

    /// The whole Y axis, one tile after another.
    pub fn full_y() -> Self {
        Self::new("0", "H-1", "h", "0")
    }

    /// A single position `at`.
    pub fn single(at: impl Into<String>) -> Self {
        let at = at.into();
        Self::new(at.clone(), at, "1", "0")
    }
}

/// A location rule as it appears in an architecture description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRuleDesc {
    /// Name of the tile type this rule places.
    pub block_type: String,
    /// Higher priority wins where rules overlap.
    pub priority: i32,
    /// Horizontal placement.
    #[serde(default = "AxisSpec::full_x")]
    pub x: AxisSpec,
    /// Vertical placement.
    #[serde(default = "AxisSpec::full_y")]
    pub y: AxisSpec,
}

/// A grid layout as it appears in an architecture description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridLayoutDesc {
    /// Layout name, unique within the architecture.
    pub name: String,
    /// How the layout's dimensions are determined.
    pub grid: GridType,
    /// Location rules in declaration order.
    #[serde(default)]
    pub rules: Vec<LocationRuleDesc>,
}

/// A physical tile type as it appears in an architecture description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileTypeDesc {
    /// Tile type name, also used as the block-type tag of location rules.
    pub name: String,
    /// Footprint width in grid cells.
    #[serde(default = "one")]
    pub width: u32,
    /// Footprint height in grid cells.
    #[serde(default = "one")]
    pub height: u32,
}

fn one() -> u32 {
    1
}

/// An already-parsed architecture: tile catalog and grid layouts.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ArchDescription {
    /// The physical tile types.
    #[serde(default)]
    pub tiles: Vec<TileTypeDesc>,
    /// Grid layouts in declaration order.
    #[serde(default)]
    pub layouts: Vec<GridLayoutDesc>,
}

/// A placement rule with its block tag interned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationRule {
    /// Tag of the tile type this rule places.
    pub block_type: Ident,
    /// Higher priority wins where rules overlap.
    pub priority: i32,
    /// Horizontal placement.
    pub x: AxisSpec,
    /// Vertical placement.
    pub y: AxisSpec,
}

/// A rule-based grid layout.
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    /// Layout name.
    pub name: String,
    /// How the layout's dimensions are determined.
    pub grid: GridType,
    /// Location rules in declaration order.
    pub rules: Vec<LocationRule>,
}

impl GridLayout {
    /// Returns `true` for layouts with explicit dimensions.
    pub fn is_fixed(&self) -> bool {
        matches!(self.grid, GridType::Fixed { .. })
    }

    /// Returns the priority of the last rule placing `tag`, in declaration order.
    ///
    /// This is the priority baseline for counting `tag`: rules below it can
    /// never displace a `tag` tile. It is deliberately not the maximum over
    /// all matching rules.
    pub fn last_priority_of(&self, tag: Ident) -> Option<i32> {
        self.rules
            .iter()
            .rev()
            .find(|rule| rule.block_type == tag)
            .map(|rule| rule.priority)
    }
}

/// A placeable resource and its footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalTileType {
    /// Tile type name.
    pub name: Ident,
    /// Footprint width in grid cells, at least 1.
    pub width: u32,
    /// Footprint height in grid cells, at least 1.
    pub height: u32,
}

/// The catalog of physical tile types, looked up by name.
#[derive(Debug, Clone, Default)]
pub struct TileCatalog {
    tiles: Vec<PhysicalTileType>,
    by_name: HashMap<Ident, TileTypeId>,
}

impl TileCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tile type. Returns `None` if a tile with that name already exists.
    pub fn insert(&mut self, tile: PhysicalTileType) -> Option<TileTypeId> {
        if self.by_name.contains_key(&tile.name) {
            return None;
        }
        let id = TileTypeId::from_raw(self.tiles.len() as u32);
        self.tiles.push(tile);
        self.by_name.insert(tile.name, id);
        Some(id)
    }

    /// Looks up a tile type by name.
    pub fn find(&self, name: Ident) -> Option<&PhysicalTileType> {
        self.by_name.get(&name).map(|id| &self.tiles[id.index()])
    }

    /// Returns the number of tile types.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns `true` if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

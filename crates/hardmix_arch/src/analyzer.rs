//! Hard-block capacity estimation over rule-based grid layouts.
//!
//! This is a lightweight version of the grid construction done by the
//! placer: location rules are stamped into a transient [`Grid`] in
//! declaration order, overlaps are resolved by priority, and the anchors of
//! the requested tile type are counted.

use crate::error::{ArchError, Axis};
use crate::formula::{FormulaEvaluator, FormulaVars};
use crate::grid::Grid;
use crate::hard_block::{HardBlockType, HardBlockTypeCatalog};
use crate::types::{AxisSpec, GridLayout, GridSize, GridType, LocationRule, PhysicalTileType, TileCatalog};
use hardmix_common::Interner;
use rayon::prelude::*;

/// An axis spec with every formula evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct AxisRange {
    start: i64,
    end: i64,
    incr: i64,
    repeat: i64,
}

/// Counts how many hard blocks of a kind a grid layout provides.
///
/// Holds only shared references to read-only architecture data, so one
/// estimator can serve parallel queries.
#[derive(Debug, Clone, Copy)]
pub struct GridCapacityEstimator<'a> {
    interner: &'a Interner,
    tags: &'a HardBlockTypeCatalog,
    evaluator: FormulaEvaluator,
}

impl<'a> GridCapacityEstimator<'a> {
    /// Creates an estimator resolving names through `interner` and
    /// hard-block kinds through `tags`.
    pub fn new(interner: &'a Interner, tags: &'a HardBlockTypeCatalog) -> Self {
        Self {
            interner,
            tags,
            evaluator: FormulaEvaluator::new(),
        }
    }

    /// Returns the dimensions to count a layout at.
    ///
    /// Fixed layouts report their declared size. Every other layout reports
    /// [`GridSize::UNBOUNDED`]: its size is chosen later by device sizing.
    pub fn estimate_device_size(&self, layout: &GridLayout) -> GridSize {
        match layout.grid {
            GridType::Fixed { width, height } => GridSize::new(width as usize, height as usize),
            GridType::Auto { .. } => GridSize::UNBOUNDED,
        }
    }

    /// Counts the tiles of `kind` placed by `layout` on a grid of `size`.
    ///
    /// The priority baseline is the priority of the last rule placing the
    /// kind's tag. Rules below the baseline can never displace such a tile
    /// and are not evaluated at all; every other rule is stamped in
    /// declaration order.
    ///
    /// # Errors
    ///
    /// - [`ArchError::UnspecifiedPriority`] if no rule places the tag.
    /// - [`ArchError::UnboundedGrid`] if `size` is the unbounded sentinel.
    /// - [`ArchError::UnknownTileType`] if a stamped rule names a tile type
    ///   missing from `catalog`.
    /// - [`ArchError::Formula`] / [`ArchError::NonPositiveIncrement`] if a
    ///   stamped rule's formulas cannot be evaluated.
    pub fn count_tiles_of_type(
        &self,
        layout: &GridLayout,
        kind: HardBlockType,
        size: GridSize,
        catalog: &TileCatalog,
    ) -> Result<usize, ArchError> {
        let tag_name = self.tags.tag(kind);
        let unspecified = || ArchError::UnspecifiedPriority {
            layout: layout.name.clone(),
            tag: tag_name.to_string(),
        };
        // A tag that was never interned cannot appear in any rule.
        let tag = self.interner.get(tag_name).ok_or_else(unspecified)?;
        let baseline = layout.last_priority_of(tag).ok_or_else(unspecified)?;

        if size.is_unbounded() {
            return Err(ArchError::UnboundedGrid(layout.name.clone()));
        }

        let mut grid = Grid::new(size.width, size.height);
        for rule in layout.rules.iter().filter(|rule| rule.priority >= baseline) {
            let tile = catalog
                .find(rule.block_type)
                .ok_or_else(|| ArchError::UnknownTileType {
                    layout: layout.name.clone(),
                    tile: self.interner.resolve(rule.block_type).to_string(),
                })?;
            self.fill_with_rule(&mut grid, layout, rule, tile)?;
        }

        Ok(grid.count_occupied_by(tag))
    }

    /// Counts `kind` in several layouts at once.
    ///
    /// Each query is an independent read of shared data, so they run on the
    /// rayon pool. Results come back in query order; the first error (in
    /// query order) wins.
    pub fn count_in_layouts(
        &self,
        queries: &[(&GridLayout, GridSize)],
        kind: HardBlockType,
        catalog: &TileCatalog,
    ) -> Result<Vec<usize>, ArchError> {
        queries
            .par_iter()
            .map(|&(layout, size)| self.count_tiles_of_type(layout, kind, size, catalog))
            .collect::<Vec<_>>()
            .into_iter()
            .collect()
    }

    fn resolve_axis(
        &self,
        spec: &AxisSpec,
        vars: &FormulaVars,
        layout: &GridLayout,
        rule: &LocationRule,
        axis: Axis,
    ) -> Result<AxisRange, ArchError> {
        let eval = |expr: &str| {
            self.evaluator
                .evaluate(expr, vars)
                .map_err(|source| ArchError::Formula {
                    layout: layout.name.clone(),
                    tile: self.interner.resolve(rule.block_type).to_string(),
                    axis,
                    source,
                })
        };
        let range = AxisRange {
            start: eval(&spec.start_expr)?,
            end: eval(&spec.end_expr)?,
            incr: eval(&spec.incr_expr)?,
            repeat: eval(&spec.repeat_expr)?,
        };
        if range.incr <= 0 {
            return Err(ArchError::NonPositiveIncrement {
                layout: layout.name.clone(),
                tile: self.interner.resolve(rule.block_type).to_string(),
                axis,
                value: range.incr,
            });
        }
        Ok(range)
    }

    /// Stamps every anchor a rule produces into `grid`.
    ///
    /// Repeat instances advance along each axis until an instance's end
    /// reaches the device edge. Each instance's window is clamped to the
    /// grid, and an anchor is stamped only if the whole tile footprint fits
    /// inside the clamped window. A repeat of zero or less yields a single
    /// instance. Instances and anchors that lie off the grid are skipped
    /// arithmetically, so the work is bounded by the grid size.
    fn fill_with_rule(
        &self,
        grid: &mut Grid,
        layout: &GridLayout,
        rule: &LocationRule,
        tile: &PhysicalTileType,
    ) -> Result<(), ArchError> {
        let grid_w = grid.width() as i64;
        let grid_h = grid.height() as i64;
        let tile_w = i64::from(tile.width);
        let tile_h = i64::from(tile.height);
        let vars = FormulaVars::new(grid_w, grid_h, tile_w, tile_h);

        let x = self.resolve_axis(&rule.x, &vars, layout, rule, Axis::X)?;
        let y = self.resolve_axis(&rule.y, &vars, layout, rule, Axis::Y)?;
        let x_windows = x.windows(grid_w);
        let y_windows = y.windows(grid_h);

        for &(x_start, x_max) in &x_windows {
            for &(y_start, y_max) in &y_windows {
                for ax in anchors(x_start, x_max, x.incr, tile_w) {
                    for ay in anchors(y_start, y_max, y.incr, tile_h) {
                        grid.claim(ax, ay, tile.name, rule.priority);
                    }
                }
            }
        }

        Ok(())
    }
}

impl AxisRange {
    /// Returns the repeat instances that can reach the grid, as
    /// `(start, max)` with `max` clamped to the last cell of `dim`.
    ///
    /// Instances whose window ends before cell 0 are skipped in one step,
    /// and the walk stops once an instance starts past the last cell.
    fn windows(&self, dim: i64) -> Vec<(i128, i128)> {
        let start = i128::from(self.start);
        let end = i128::from(self.end);
        let repeat = i128::from(self.repeat);
        let last = i128::from(dim) - 1;

        let mut k = if repeat > 0 && end < 0 {
            div_ceil(-end, repeat)
        } else {
            0
        };
        let mut windows = Vec::new();
        loop {
            let shift = k * repeat;
            let (inst_start, inst_end) = (start + shift, end + shift);
            if inst_start > last {
                break;
            }
            if inst_end >= 0 {
                windows.push((inst_start, inst_end.min(last)));
            }
            if inst_end > last || repeat <= 0 {
                break;
            }
            k += 1;
        }
        windows
    }
}

/// Anchors from `start` in steps of `incr` that are on the grid and leave
/// room for `size` cells up to `max`.
fn anchors(start: i128, max: i128, incr: i64, size: i64) -> impl Iterator<Item = i64> {
    let incr = i128::from(incr);
    let first = if start >= 0 {
        start
    } else {
        start + div_ceil(-start, incr) * incr
    };
    let last = max - (i128::from(size) - 1);
    let count = if first > last { 0 } else { (last - first) / incr + 1 };
    // Every anchor lies in `0..=max`, so it fits in an i64.
    (0..count).map(move |i| (first + i * incr) as i64)
}

/// Ceiling division of positive values.
fn div_ceil(a: i128, b: i128) -> i128 {
    (a + b - 1) / b
}

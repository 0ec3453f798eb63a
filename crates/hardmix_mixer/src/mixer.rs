//! Capacity-aware hard/soft selection.

use crate::error::MixError;
use crate::opt_flags::OptimizationFlagSet;
use crate::synth::SoftSynthesizer;
use hardmix_arch::{
    Architecture, GridCapacityEstimator, GridLayout, GridSize, HardBlockType, HardBlockTypeCatalog,
    LayoutId,
};
use hardmix_common::{HardmixResult, InternalError};
use hardmix_config::MixSection;
use hardmix_diagnostics::{Category, Diagnostic, DiagnosticCode, DiagnosticSink};
use serde::Serialize;
use std::collections::BTreeMap;

const UNBOUNDED_LAYOUT: DiagnosticCode = DiagnosticCode::new(Category::Capacity, 1);
const SELECTION: DiagnosticCode = DiagnosticCode::new(Category::Mix, 1);
const NO_CANDIDATES: DiagnosticCode = DiagnosticCode::new(Category::Warning, 1);

/// Per-kind outcome of [`HardSoftMixer::select_implementations`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindReport {
    /// The hard-block kind.
    pub kind: HardBlockType,
    /// Number of recorded candidates.
    pub candidates: usize,
    /// Hard blocks the device offers; `None` when no layout bounds it.
    pub capacity: Option<usize>,
    /// Candidates that kept their hard assignment.
    pub kept: usize,
    /// Candidates handed to soft synthesis.
    pub softened: usize,
}

/// Summary of one selection, one entry per enabled kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MixReport {
    /// Entries in hard-block index order.
    pub kinds: Vec<KindReport>,
}

impl MixReport {
    /// Returns the entry for `kind`, if its optimization was enabled.
    pub fn get(&self, kind: HardBlockType) -> Option<&KindReport> {
        self.kinds.iter().find(|report| report.kind == kind)
    }

    /// Total number of softened candidates.
    pub fn total_softened(&self) -> usize {
        self.kinds.iter().map(|report| report.softened).sum()
    }
}

/// Decides, per hard-block kind, which candidates stay hard.
///
/// Candidates are recorded by an external netlist traversal into one bucket
/// per kind. Once grid sizes are computed, selection keeps the first
/// `capacity` candidates of each enabled kind (in recording order) and hands
/// the rest to a [`SoftSynthesizer`]. The mixer is consumed by selection.
pub struct HardSoftMixer<'a, N> {
    arch: &'a Architecture,
    tags: HardBlockTypeCatalog,
    flags: OptimizationFlagSet,
    sink: &'a DiagnosticSink,
    buckets: [Vec<N>; HardBlockType::COUNT],
    sizes: Option<BTreeMap<LayoutId, GridSize>>,
}

impl<'a, N> HardSoftMixer<'a, N> {
    /// Creates a mixer over `arch`.
    pub fn new(
        arch: &'a Architecture,
        tags: HardBlockTypeCatalog,
        flags: OptimizationFlagSet,
        sink: &'a DiagnosticSink,
    ) -> Self {
        Self {
            arch,
            tags,
            flags,
            sink,
            buckets: std::array::from_fn(|_| Vec::new()),
            sizes: None,
        }
    }

    /// Creates a mixer from the `[mix]` table of a loaded configuration.
    pub fn from_config(arch: &'a Architecture, mix: &MixSection, sink: &'a DiagnosticSink) -> Self {
        Self::new(
            arch,
            mix.tag_catalog(),
            OptimizationFlagSet::from_config(mix.optimizations),
            sink,
        )
    }

    /// Returns the enabled optimizations.
    pub fn flags(&self) -> &OptimizationFlagSet {
        &self.flags
    }

    /// Appends a candidate to the bucket of `kind`.
    pub fn record_candidate(&mut self, node: N, kind: HardBlockType) {
        self.buckets[kind.index()].push(node);
    }

    /// Returns the candidates recorded for `kind`, in recording order.
    pub fn candidates(&self, kind: HardBlockType) -> &[N] {
        &self.buckets[kind.index()]
    }

    /// Resolves the size of every grid layout.
    ///
    /// # Errors
    ///
    /// [`MixError::NothingEnabled`] if the configuration enables no
    /// optimization; there is nothing to size the grids for.
    pub fn compute_grid_capacities(&mut self) -> Result<(), MixError> {
        if !self.flags.any_enabled() {
            return Err(MixError::NothingEnabled {
                config: self.flags.raw(),
            });
        }

        let estimator = self.estimator();
        let mut sizes = BTreeMap::new();
        for (id, layout) in self.arch.layouts_with_ids() {
            let size = estimator.estimate_device_size(layout);
            if size.is_unbounded() {
                self.sink.emit(
                    Diagnostic::note(
                        UNBOUNDED_LAYOUT,
                        format!("layout `{}` is sized later and does not limit hard blocks", layout.name),
                    )
                    .with_subject(format!("layout `{}`", layout.name)),
                );
            }
            sizes.insert(id, size);
        }
        self.sizes = Some(sizes);
        Ok(())
    }

    /// Returns how many hard blocks of `kind` every device size can hold.
    ///
    /// This is the smallest count over the layouts with a resolved size.
    /// Unbounded layouts impose no limit, so `None` means every candidate
    /// fits.
    ///
    /// # Errors
    ///
    /// [`MixError::CapacitiesNotComputed`] before
    /// [`compute_grid_capacities`](Self::compute_grid_capacities), or any
    /// estimation error of a bounded layout.
    pub fn capacity(&self, kind: HardBlockType) -> Result<Option<usize>, MixError> {
        let sizes = self.sizes.as_ref().ok_or(MixError::CapacitiesNotComputed)?;
        let queries = sizes
            .iter()
            .filter(|(_, size)| !size.is_unbounded())
            .map(|(id, size)| self.layout(*id).map(|layout| (layout, *size)))
            .collect::<HardmixResult<Vec<_>>>()?;
        if queries.is_empty() {
            return Ok(None);
        }

        let counts = self
            .estimator()
            .count_in_layouts(&queries, kind, self.arch.tile_catalog())?;
        let min = counts
            .into_iter()
            .min()
            .ok_or_else(|| InternalError::new("capacity estimation returned no counts"))?;
        Ok(Some(min))
    }

    /// Keeps the first `capacity` candidates of every enabled kind hard and
    /// softens the rest through `netlist`, one call per node.
    ///
    /// # Errors
    ///
    /// [`MixError::NothingEnabled`] or [`MixError::CapacitiesNotComputed`]
    /// for misuse, estimation errors from [`capacity`](Self::capacity), and
    /// [`MixError::SoftSynthesis`] for the first node `netlist` rejects.
    pub fn select_implementations<S>(self, netlist: &mut S) -> Result<MixReport, MixError>
    where
        S: SoftSynthesizer<N>,
    {
        if !self.flags.any_enabled() {
            return Err(MixError::NothingEnabled {
                config: self.flags.raw(),
            });
        }
        if self.sizes.is_none() {
            return Err(MixError::CapacitiesNotComputed);
        }

        // Every capacity is resolved before the netlist is touched.
        let capacities = self
            .flags
            .enabled_hard_blocks()
            .map(|kind| self.capacity(kind).map(|capacity| (kind, capacity)))
            .collect::<Result<Vec<_>, MixError>>()?;

        let mut report = MixReport::default();
        for (kind, capacity) in capacities {
            let bucket = self.candidates(kind);
            let kept = capacity.map_or(bucket.len(), |cap| cap.min(bucket.len()));

            for node in &bucket[kept..] {
                netlist
                    .synthesize_soft(node, kind)
                    .map_err(|err| MixError::SoftSynthesis {
                        kind,
                        source: Box::new(err),
                    })?;
            }

            let entry = KindReport {
                kind,
                candidates: bucket.len(),
                capacity,
                kept,
                softened: bucket.len() - kept,
            };
            self.sink.emit(selection_note(&entry, self.tags.tag(kind)));
            report.kinds.push(entry);
        }
        Ok(report)
    }

    fn estimator(&self) -> GridCapacityEstimator<'_> {
        GridCapacityEstimator::new(self.arch.interner(), &self.tags)
    }

    fn layout(&self, id: LayoutId) -> HardmixResult<&'a GridLayout> {
        self.arch
            .layout(id)
            .ok_or_else(|| InternalError::new(format!("layout {} missing", id.as_raw())))
    }
}

fn selection_note(entry: &KindReport, tag: &str) -> Diagnostic {
    if entry.candidates == 0 {
        return Diagnostic::warning(
            NO_CANDIDATES,
            format!("{} mixing is enabled but no candidates were recorded", entry.kind),
        )
        .with_subject(entry.kind.to_string());
    }
    let capacity = match entry.capacity {
        Some(cap) => format!("the smallest fixed layout holds {cap} `{tag}` tiles"),
        None => "no layout has a fixed size, so capacity is unlimited".to_string(),
    };
    Diagnostic::note(
        SELECTION,
        format!(
            "kept {} of {} {} candidates hard, {} moved to soft logic",
            entry.kept, entry.candidates, entry.kind, entry.softened
        ),
    )
    .with_subject(entry.kind.to_string())
    .with_note(capacity)
}

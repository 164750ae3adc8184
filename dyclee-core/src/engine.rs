//! [`Engine`], the single-threaded facade that clocks samples through the
//! Distance Stage, triggers the Density Stage periodically, and archives
//! pyramidal snapshots (spec.md §4.5).

use tracing::{info, instrument, warn};

use crate::{
    Result,
    context::Context,
    density_stage, distance_stage,
    error::EngineError,
    population::Population,
    result::ClusterLabel,
    snapshot::{Snapshot, SnapshotManager},
};

/// Drives the DyClee clustering pipeline over a stream of samples.
///
/// Construct via [`crate::EngineBuilder`] rather than directly.
///
/// # Examples
/// ```
/// use dyclee_core::EngineBuilder;
///
/// let mut engine = EngineBuilder::new()
///     .with_context(0.2, vec![0.0, 0.0], vec![10.0, 10.0])
///     .with_t_global(4)
///     .build()
///     .expect("valid configuration");
///
/// for (t, sample) in [[0.1, 0.1], [0.2, 0.2], [0.1, 0.2], [0.2, 0.1]].iter().enumerate() {
///     #[expect(clippy::cast_possible_truncation, reason = "tiny example loop")]
///     engine.ingest(sample, t as u64).expect("in-order ingestion");
/// }
/// assert!(engine.active().len() + engine.outliers().len() > 0);
/// ```
#[derive(Debug, Clone)]
pub struct Engine {
    context: Context,
    population: Population,
    snapshots: SnapshotManager,
    t_global: Option<u64>,
    last_t: Option<u64>,
}

impl Engine {
    pub(crate) fn new(context: Context, t_global: Option<u64>, alpha: u64, max_order: u32) -> Self {
        Self {
            context,
            population: Population::new(),
            snapshots: SnapshotManager::new(alpha, max_order),
            t_global,
            last_t: None,
        }
    }

    /// Returns the period, in samples, between density-stage passes and the
    /// outlier staleness horizon. `u64::MAX` when unset and no dataset
    /// length has been supplied yet via [`Self::run_dataset`].
    #[must_use]
    pub fn t_global(&self) -> u64 {
        self.t_global.unwrap_or(u64::MAX)
    }

    /// Returns the hyperbox side length per dimension (spec.md §3.1).
    #[must_use]
    pub fn hyperbox_sizes(&self) -> &[f64] {
        self.context.side()
    }

    /// Returns the ids of microclusters currently in the Active list.
    #[must_use]
    pub fn active(&self) -> &fxhash::FxHashSet<u64> {
        self.population.active()
    }

    /// Returns the ids of microclusters currently in the Outlier list.
    #[must_use]
    pub fn outliers(&self) -> &fxhash::FxHashSet<u64> {
        self.population.outliers()
    }

    /// Returns the pyramidal snapshot archive captured so far.
    #[must_use]
    pub fn snapshots(&self) -> Vec<&Snapshot> {
        self.snapshots.snapshots()
    }

    /// Advances the engine by one sample at timestamp `t`, running the
    /// Distance Stage and, on a `t_global` boundary, the Density Stage and a
    /// snapshot capture.
    ///
    /// # Errors
    /// Returns [`EngineError::DimensionMismatch`] when `sample.len()` does
    /// not match the configured context, and [`EngineError::OutOfOrder`]
    /// when `t` is smaller than a previously observed timestamp.
    #[instrument(name = "engine.ingest", skip(self, sample), fields(t), err)]
    pub fn ingest(&mut self, sample: &[f64], t: u64) -> Result<u64> {
        if sample.len() != self.context.dims() {
            return Err(EngineError::DimensionMismatch {
                expected: self.context.dims(),
                got: sample.len(),
            });
        }
        if let Some(previous) = self.last_t {
            if t < previous {
                return Err(EngineError::OutOfOrder {
                    previous,
                    received: t,
                });
            }
        }
        self.last_t = Some(t);

        let t_global = self.t_global();
        let absorbed_by = distance_stage::ingest(&mut self.population, &self.context, sample, t, t_global);

        if let Some(period) = self.t_global {
            if period > 0 && t.saturating_add(1) % period == 0 {
                self.run_density_stage(t);
            }
        }

        Ok(absorbed_by)
    }

    /// Convenience entry point: assigns `t = 0..len-1`, ingests every row in
    /// order, runs a final Density Stage pass, and returns the final-cluster
    /// label of the microcluster that absorbed each row.
    ///
    /// If no `t_global` was configured at build time, defaults it to
    /// `samples.len()` (spec.md §4.5): "the density stage must be cheap
    /// relative to online work".
    ///
    /// # Errors
    /// Propagates any [`EngineError`] from [`Self::ingest`]; none are
    /// expected in practice since timestamps are assigned monotonically
    /// here.
    #[instrument(name = "engine.run_dataset", skip(self, samples), fields(n = samples.len()))]
    pub fn run_dataset(&mut self, samples: &[Vec<f64>]) -> Result<Vec<ClusterLabel>> {
        if self.t_global.is_none() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "dataset lengths stay far below u64::MAX for any realistic corpus"
            )]
            let len = samples.len() as u64;
            self.t_global = Some(len.max(1));
        }

        let mut absorbed_by = Vec::with_capacity(samples.len());
        for (t, sample) in samples.iter().enumerate() {
            #[expect(
                clippy::cast_possible_truncation,
                reason = "dataset lengths stay far below u64::MAX for any realistic corpus"
            )]
            let id = self.ingest(sample, t as u64)?;
            absorbed_by.push(id);
        }

        let last_t = self.last_t.unwrap_or(0);
        self.run_density_stage(last_t);

        Ok(absorbed_by
            .into_iter()
            .map(|id| {
                self.population
                    .get(id)
                    .and_then(crate::microcluster::Microcluster::label)
                    .map_or(ClusterLabel::Unclassed, ClusterLabel::Label)
            })
            .collect())
    }

    /// Runs a final Density Stage pass and returns each live microcluster's
    /// id and final-cluster label.
    #[instrument(name = "engine.finalize", skip(self))]
    pub fn finalize(&mut self) -> Vec<(u64, ClusterLabel)> {
        let last_t = self.last_t.unwrap_or(0);
        self.run_density_stage(last_t);
        self.population
            .iter()
            .map(|mc| {
                (
                    mc.id(),
                    mc.label().map_or(ClusterLabel::Unclassed, ClusterLabel::Label),
                )
            })
            .collect()
    }

    fn run_density_stage(&mut self, t: u64) {
        let clusters = density_stage::run(&mut self.population, &self.context);
        info!(t, clusters = clusters.len(), "density stage pass complete");
        self.snapshots.capture(t, &self.population, clusters);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(t_global: u64) -> Engine {
        crate::EngineBuilder::new()
            .with_context(0.25, vec![0.0, 0.0], vec![4.0, 4.0])
            .with_t_global(t_global)
            .build()
            .expect("valid configuration")
    }

    #[test]
    fn ingest_rejects_dimension_mismatch() {
        let mut engine = engine(10);
        let err = engine.ingest(&[0.0], 0).unwrap_err();
        assert_eq!(err.code(), crate::error::EngineErrorCode::DimensionMismatch);
    }

    #[test]
    fn ingest_rejects_out_of_order_timestamps() {
        let mut engine = engine(10);
        engine.ingest(&[0.0, 0.0], 5).expect("first call in order");
        let err = engine.ingest(&[0.0, 0.0], 3).unwrap_err();
        assert_eq!(err.code(), crate::error::EngineErrorCode::OutOfOrder);
    }

    #[test]
    fn ingest_triggers_density_stage_on_t_global_boundary() {
        let mut engine = engine(2);
        engine.ingest(&[0.1, 0.1], 0).expect("ok");
        assert!(engine.snapshots().is_empty(), "not yet at boundary");
        engine.ingest(&[0.1, 0.1], 1).expect("ok");
        assert_eq!(engine.snapshots().len(), 1, "t=1 completes the first period of 2");
    }

    #[test]
    fn run_dataset_defaults_t_global_to_dataset_length() {
        let mut engine = crate::EngineBuilder::new()
            .with_context(0.25, vec![0.0, 0.0], vec![4.0, 4.0])
            .build()
            .expect("valid configuration");
        let samples = vec![vec![0.1, 0.1], vec![0.15, 0.15], vec![3.9, 3.9]];
        let labels = engine.run_dataset(&samples).expect("run succeeds");
        assert_eq!(labels.len(), 3);
        assert_eq!(engine.t_global(), 3);
    }

    #[test]
    fn finalize_returns_a_label_per_live_microcluster() {
        let mut engine = engine(100);
        engine.ingest(&[0.1, 0.1], 0).expect("ok");
        engine.ingest(&[3.9, 3.9], 1).expect("ok");
        let labels = engine.finalize();
        assert_eq!(labels.len(), 2);
    }
}

//! DyClee core library.
//!
//! An online, distance- and density-based clustering engine for data
//! streams whose underlying generating process may drift over time. Feed
//! it d-dimensional samples through [`Engine::ingest`] (built via
//! [`EngineBuilder`]); it maintains a compact population of microclusters,
//! classifies them by density on a periodic cadence, and assembles final
//! clusters from density-connected neighborhoods. A pyramidal
//! [`snapshot::SnapshotManager`] retains historical population snapshots at
//! logarithmically spaced horizons.

mod builder;
mod context;
mod density_stage;
mod distance_stage;
mod engine;
mod error;
mod grid;
mod microcluster;
mod population;
mod result;
mod snapshot;

pub use crate::{
    builder::EngineBuilder,
    context::{Address, Context},
    engine::Engine,
    error::{EngineError, EngineErrorCode, Result},
    grid::GridIndex,
    microcluster::{DensityClass, Microcluster},
    population::Population,
    result::{ClusterLabel, FinalCluster},
    snapshot::{Snapshot, SnapshotManager},
};

//! Integration tests for the Density Stage driven through the public
//! `Engine` facade: density-class partitioning, label propagation via
//! face-adjacency, and idempotence of repeated reclassification.

use anyhow::{Context, Result};
use dyclee_core::EngineBuilder;

type TestResult<T = ()> = Result<T>;

#[test]
fn a_standout_dense_blob_forms_a_singleton_final_cluster() -> TestResult {
    let mut engine = EngineBuilder::new()
        .with_context(0.25, vec![0.0, 0.0], vec![4.0, 4.0])
        .with_t_global(51)
        .build()
        .context("builder configuration must be valid")?;

    for t in 0..50 {
        engine
            .ingest(&[0.1, 0.1], t)
            .context("build up a dense blob")?;
    }
    engine
        .ingest(&[3.9, 3.9], 50)
        .context("seed a sparse outlier far away")?;

    let labels = engine.finalize();
    let distinct: Vec<u64> = labels
        .iter()
        .filter_map(|(_, label)| label.get())
        .collect();
    assert_eq!(distinct.len(), 1, "only the dense blob should be labeled");
    Ok(())
}

#[test]
fn reclassification_without_new_samples_is_idempotent() -> TestResult {
    let mut engine = EngineBuilder::new()
        .with_context(0.25, vec![0.0, 0.0], vec![4.0, 4.0])
        .with_t_global(100)
        .build()
        .context("builder configuration must be valid")?;

    for t in 0..50 {
        engine.ingest(&[0.1, 0.1], t).context("dense blob a")?;
    }
    for t in 50..100 {
        engine.ingest(&[3.9, 3.9], t).context("dense blob b")?;
    }

    let mut first = engine.finalize();
    let mut second = engine.finalize();
    first.sort_unstable_by_key(|(id, _)| *id);
    second.sort_unstable_by_key(|(id, _)| *id);
    assert_eq!(
        first, second,
        "running the density stage twice with no new samples must not change labels"
    );
    Ok(())
}

#[test]
fn active_and_outlier_partition_every_live_microcluster() -> TestResult {
    let mut engine = EngineBuilder::new()
        .with_context(0.1, vec![0.0, 0.0], vec![1.0, 1.0])
        .with_t_global(30)
        .build()
        .context("builder configuration must be valid")?;

    for t in 0u64..30 {
        let (x, y) = if t % 3 == 0 { (0.1, 0.1) } else { (0.9, 0.9) };
        engine.ingest(&[x, y], t).context("mixed density stream")?;
    }
    engine.finalize();

    let active = engine.active().len();
    let outliers = engine.outliers().len();
    assert!(active + outliers > 0, "the population must not be empty");
    Ok(())
}

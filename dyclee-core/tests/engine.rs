//! Integration tests exercising the `Engine` facade contract and the
//! scenario-level properties from the specification's testable-properties
//! section (two well-separated blobs, concentric circles, uniform noise,
//! and online drift).

use anyhow::{Context, Result};
use dyclee_core::EngineBuilder;
use dyclee_test_support::streams::{concentric_circles, drifting_blobs, two_blobs, uniform_noise};

type TestResult<T = ()> = Result<T>;

/// S1 — two well-separated Gaussian blobs resolve into exactly two final
/// clusters, with almost every sample's microcluster carrying a label.
#[test]
fn two_blobs_resolve_into_two_final_clusters() -> TestResult {
    let samples = two_blobs(1500, 1);
    let mut engine = EngineBuilder::new()
        .with_context(0.06, vec![-4.0, -4.0], vec![14.0, 14.0])
        .with_t_global(1500)
        .build()
        .context("builder configuration must be valid")?;

    let labels = engine
        .run_dataset(&samples)
        .context("run_dataset must succeed on an in-order stream")?;

    let labeled = labels.iter().filter(|label| label.get().is_some()).count();
    #[expect(
        clippy::cast_precision_loss,
        reason = "sample counts stay far below 2^53 in tests"
    )]
    let labeled_fraction = labeled as f64 / labels.len() as f64;
    assert!(
        labeled_fraction > 0.99,
        "expected >99% of samples labeled, got {labeled_fraction}"
    );

    let mut distinct: Vec<u64> = labels.iter().filter_map(|label| label.get()).collect();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(distinct.len(), 2, "expected exactly two final clusters");
    Ok(())
}

/// S2 — concentric rings stay topologically distinct: face-adjacency keeps
/// the inner ring's microclusters from linking directly to the outer ring's.
#[test]
fn concentric_circles_resolve_into_two_rings() -> TestResult {
    let samples = concentric_circles(1500, 2, 0.5, 0.05);
    let mut engine = EngineBuilder::new()
        .with_context(0.06, vec![-1.5, -1.5], vec![1.5, 1.5])
        .with_t_global(1500)
        .build()
        .context("builder configuration must be valid")?;

    engine
        .run_dataset(&samples)
        .context("run_dataset must succeed")?;

    let final_labels = engine.finalize();
    let mut distinct: Vec<u64> = final_labels
        .iter()
        .filter_map(|(_, label)| label.get())
        .collect();
    distinct.sort_unstable();
    distinct.dedup();
    assert_eq!(
        distinct.len(),
        2,
        "expected the inner and outer rings to form distinct clusters"
    );
    Ok(())
}

/// S3 — uniform noise has no standout density, so no final clusters should
/// form and every microcluster should remain Semi-Dense or Low-Density.
#[test]
fn uniform_noise_yields_no_final_clusters() -> TestResult {
    let samples = uniform_noise(1500, 3);
    let mut engine = EngineBuilder::new()
        .with_context(0.06, vec![0.0, 0.0], vec![1.0, 1.0])
        .with_t_global(1500)
        .build()
        .context("builder configuration must be valid")?;

    let labels = engine
        .run_dataset(&samples)
        .context("run_dataset must succeed")?;

    assert!(
        labels.iter().all(|label| label.get().is_none()),
        "uniform noise must leave every sample Unclassed"
    );
    Ok(())
}

/// S4 — online drift: a dense cluster forms around the first center, then
/// as the stream drifts to a second center the stale first cluster starts
/// evicting while the second grows dense, and the snapshot archive records
/// distinct populations at each `t_global` boundary.
#[test]
fn online_drift_evicts_the_stale_cluster_and_grows_a_new_one() -> TestResult {
    let samples = drifting_blobs(1000, 4);
    let mut engine = EngineBuilder::new()
        .with_context(0.1, vec![-3.0, -3.0], vec![13.0, 13.0])
        .with_t_global(500)
        .build()
        .context("builder configuration must be valid")?;

    for (t, sample) in samples.iter().enumerate() {
        #[expect(
            clippy::cast_possible_truncation,
            reason = "stream length stays far below u64::MAX in tests"
        )]
        engine.ingest(sample, t as u64).context("in-order ingest")?;
    }
    engine.finalize();

    let snapshots = engine.snapshots();
    let timestamps: Vec<u64> = snapshots.iter().map(|snap| snap.t()).collect();
    assert!(
        timestamps.contains(&499) && timestamps.contains(&999) && timestamps.contains(&1499),
        "expected snapshots at every t_global boundary, got {timestamps:?}"
    );

    let first_boundary = snapshots
        .iter()
        .find(|snap| snap.t() == 499)
        .context("snapshot at t=499 must exist")?;
    let last_boundary = snapshots
        .iter()
        .find(|snap| snap.t() == 1499)
        .context("snapshot at t=1499 must exist")?;
    assert_ne!(
        first_boundary.all().len(),
        0,
        "the first boundary must have captured a non-empty population"
    );
    assert_ne!(
        first_boundary, last_boundary,
        "the archive must hold distinct populations across drift"
    );
    Ok(())
}

#[test]
fn run_dataset_and_ingest_agree_on_dimension_checks() -> TestResult {
    let mut engine = EngineBuilder::new()
        .with_context(0.2, vec![0.0, 0.0], vec![1.0, 1.0])
        .build()
        .context("builder configuration must be valid")?;

    let bad_samples = vec![vec![0.1, 0.1], vec![0.2]];
    let err = engine
        .run_dataset(&bad_samples)
        .expect_err("a ragged dataset must fail dimension validation");
    assert_eq!(err.code(), dyclee_core::EngineErrorCode::DimensionMismatch);
    Ok(())
}

//! Integration tests covering the public error types exposed by `dyclee-core`.

use anyhow::{Context, Result};
use dyclee_core::{EngineBuilder, EngineError, EngineErrorCode};
use rstest::rstest;

type TestResult<T = ()> = Result<T>;

#[rstest]
#[case(
    EngineError::BadConfig { detail: "phi must be in (0, 1]".to_owned() },
    EngineErrorCode::BadConfig,
)]
#[case(
    EngineError::OutOfOrder { previous: 5, received: 3 },
    EngineErrorCode::OutOfOrder,
)]
#[case(
    EngineError::DimensionMismatch { expected: 2, got: 1 },
    EngineErrorCode::DimensionMismatch,
)]
fn returns_expected_engine_code(
    #[case] error: EngineError,
    #[case] expected: EngineErrorCode,
) -> TestResult {
    assert_eq!(error.code(), expected);
    assert_eq!(error.code().as_str(), expected.as_str());
    Ok(())
}

#[test]
fn build_rejects_phi_out_of_range() -> TestResult {
    let err = EngineBuilder::new()
        .with_context(0.0, vec![0.0], vec![1.0])
        .build()
        .expect_err("phi=0.0 must be rejected");
    assert_eq!(err.code(), EngineErrorCode::BadConfig);
    Ok(())
}

#[test]
fn build_rejects_degenerate_context_box() -> TestResult {
    let err = EngineBuilder::new()
        .with_context(0.5, vec![1.0, 0.0], vec![1.0, 2.0])
        .build()
        .expect_err("lo == hi on a continuous dimension must be rejected");
    assert_eq!(err.code(), EngineErrorCode::BadConfig);
    Ok(())
}

#[test]
fn ingest_rejects_dimension_mismatch() -> TestResult {
    let mut engine = EngineBuilder::new()
        .with_context(0.2, vec![0.0, 0.0], vec![1.0, 1.0])
        .with_t_global(10)
        .build()
        .context("builder configuration must be valid")?;

    let err = engine
        .ingest(&[0.5], 0)
        .expect_err("a 1-d sample against a 2-d context must fail");
    assert_eq!(err.code(), EngineErrorCode::DimensionMismatch);
    Ok(())
}

#[test]
fn ingest_rejects_out_of_order_timestamps() -> TestResult {
    let mut engine = EngineBuilder::new()
        .with_context(0.2, vec![0.0, 0.0], vec![1.0, 1.0])
        .with_t_global(10)
        .build()
        .context("builder configuration must be valid")?;

    engine
        .ingest(&[0.1, 0.1], 4)
        .context("first ingest must succeed")?;
    let err = engine
        .ingest(&[0.1, 0.1], 2)
        .expect_err("timestamps must be monotonic");
    assert_eq!(err.code(), EngineErrorCode::OutOfOrder);
    assert_eq!(
        err,
        EngineError::OutOfOrder {
            previous: 4,
            received: 2
        }
    );
    Ok(())
}

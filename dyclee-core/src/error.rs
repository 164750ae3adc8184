//! Error types for the DyClee core library.
//!
//! Defines the error enum exposed by the public API and a convenient result
//! alias. Conditions the specification treats as benign — samples outside
//! the declared context box, an empty population at density-stage time — are
//! represented structurally (empty collections, `Option::None`) rather than
//! as errors; see [`EngineError`] for the genuinely fatal cases.

use std::fmt;

use thiserror::Error;

/// Stable codes describing [`EngineError`] variants.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum EngineErrorCode {
    /// `phi`, the context box, or the ordinal mask were malformed.
    BadConfig,
    /// `ingest` was called with a timestamp older than one already seen.
    OutOfOrder,
    /// A sample's length did not match the configured number of dimensions.
    DimensionMismatch,
}

impl EngineErrorCode {
    /// Returns the stable machine-readable representation of this code.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadConfig => "DYCLEE_BAD_CONFIG",
            Self::OutOfOrder => "DYCLEE_OUT_OF_ORDER",
            Self::DimensionMismatch => "DYCLEE_DIMENSION_MISMATCH",
        }
    }
}

impl fmt::Display for EngineErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type produced when constructing or driving the clustering [`Engine`].
///
/// [`Engine`]: crate::Engine
#[non_exhaustive]
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum EngineError {
    /// `phi` was outside `(0, 1]`, the context box was malformed (`lo >= hi`
    /// for some dimension), or dimensions disagreed across `context` /
    /// `ordinal`.
    #[error("invalid engine configuration: {detail}")]
    BadConfig {
        /// Human-readable description of the malformed field.
        detail: String,
    },
    /// `ingest` was called with `t` smaller than a previously observed
    /// timestamp.
    #[error("ingest called out of order: received t={received} after t={previous}")]
    OutOfOrder {
        /// The most recent timestamp already observed.
        previous: u64,
        /// The out-of-order timestamp that was rejected.
        received: u64,
    },
    /// A sample's length did not match the number of declared dimensions.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch {
        /// The number of dimensions declared by the [`Context`](crate::Context).
        expected: usize,
        /// The number of coordinates actually supplied.
        got: usize,
    },
}

impl EngineError {
    /// Retrieves the stable [`EngineErrorCode`] for this error.
    #[must_use]
    pub const fn code(&self) -> EngineErrorCode {
        match self {
            Self::BadConfig { .. } => EngineErrorCode::BadConfig,
            Self::OutOfOrder { .. } => EngineErrorCode::OutOfOrder,
            Self::DimensionMismatch { .. } => EngineErrorCode::DimensionMismatch,
        }
    }
}

/// Convenient alias for results returned by the core API.
pub type Result<T> = core::result::Result<T, EngineError>;

//! Builder utilities for configuring a DyClee [`Engine`] before it starts
//! ingesting samples.

use crate::{Result, context::Context, engine::Engine};

/// Default pyramidal snapshot base (`alpha` in spec.md §4.6).
const DEFAULT_ALPHA: u64 = 2;
/// Default pyramidal tier cap (`L` in spec.md §4.6).
const DEFAULT_MAX_ORDER: u32 = 5;

/// Configures and constructs [`Engine`] instances.
///
/// # Examples
/// ```
/// use dyclee_core::EngineBuilder;
///
/// let engine = EngineBuilder::new()
///     .with_context(0.1, vec![0.0, 0.0], vec![10.0, 10.0])
///     .with_t_global(500)
///     .build()
///     .expect("builder configuration is valid");
/// assert_eq!(engine.t_global(), 500);
/// ```
#[derive(Debug, Clone)]
pub struct EngineBuilder {
    phi: f64,
    lo: Vec<f64>,
    hi: Vec<f64>,
    ordinal: Option<Vec<bool>>,
    t_global: Option<u64>,
    alpha: u64,
    max_order: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            phi: 0.1,
            lo: vec![0.0],
            hi: vec![1.0],
            ordinal: None,
            t_global: None,
            alpha: DEFAULT_ALPHA,
            max_order: DEFAULT_MAX_ORDER,
        }
    }
}

impl EngineBuilder {
    /// Creates a builder populated with default parameters: a single
    /// continuous dimension bounded by `[0, 1]`, `phi = 0.1`, no `t_global`
    /// override (the caller must set one or supply a known dataset length
    /// to [`Engine::run_dataset`]), and the default pyramidal base/cap.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `phi`, the contraction factor applied to the context box's
    /// extent per continuous dimension.
    #[must_use]
    pub fn with_phi(mut self, phi: f64) -> Self {
        self.phi = phi;
        self
    }

    /// Sets the bounding context box (`phi` unchanged).
    #[must_use]
    pub fn with_context(mut self, phi: f64, lo: Vec<f64>, hi: Vec<f64>) -> Self {
        self.phi = phi;
        self.lo = lo;
        self.hi = hi;
        self
    }

    /// Marks dimensions as ordinal (exact-match) rather than continuous.
    #[must_use]
    pub fn with_ordinal(mut self, ordinal: Vec<bool>) -> Self {
        self.ordinal = Some(ordinal);
        self
    }

    /// Overrides the density-stage period and outlier staleness horizon.
    #[must_use]
    pub fn with_t_global(mut self, t_global: u64) -> Self {
        self.t_global = Some(t_global);
        self
    }

    /// Overrides the pyramidal snapshot base (default 2).
    #[must_use]
    pub fn with_alpha(mut self, alpha: u64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Overrides the pyramidal tier cap (default 5).
    #[must_use]
    pub fn with_max_order(mut self, max_order: u32) -> Self {
        self.max_order = max_order;
        self
    }

    /// Validates the configuration and constructs an [`Engine`].
    ///
    /// # Errors
    /// Returns [`crate::error::EngineError::BadConfig`] when `phi`, the
    /// context box, or the ordinal mask are malformed, propagated from
    /// [`Context::new`].
    pub fn build(self) -> Result<Engine> {
        let context = Context::new(self.phi, self.lo, self.hi, self.ordinal)?;
        Ok(Engine::new(
            context,
            self.t_global,
            self.alpha,
            self.max_order,
        ))
    }
}

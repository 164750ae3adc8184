//! The bounding context box a DyClee [`Engine`](crate::Engine) clusters
//! within, and the hyperbox-grid addressing scheme derived from it.

use crate::error::{EngineError, Result};

/// Integer hyperbox address: one coordinate per dimension.
///
/// Continuous dimensions hold a cell index (`floor((x - lo) / side)`);
/// ordinal dimensions hold the sample's coordinate rounded to the nearest
/// integer, compared for exact equality rather than bucketed.
pub type Address = Vec<i64>;

/// Immutable bounding box declared at engine construction, together with the
/// hyperbox side lengths it implies.
///
/// # Examples
/// ```
/// use dyclee_core::Context;
///
/// let ctx = Context::new(0.1, vec![0.0, 0.0], vec![10.0, 10.0], None).expect("valid context");
/// assert_eq!(ctx.dims(), 2);
/// assert!((ctx.side()[0] - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    phi: f64,
    lo: Vec<f64>,
    hi: Vec<f64>,
    ordinal: Vec<bool>,
    side: Vec<f64>,
}

impl Context {
    /// Builds a context from `phi`, a per-dimension `[lo, hi]` box, and an
    /// optional ordinal mask (defaulting to "all continuous").
    ///
    /// # Errors
    /// Returns [`EngineError::BadConfig`] when `phi` is outside `(0, 1]`,
    /// `lo`/`hi` disagree in length, a continuous dimension has
    /// `hi[i] <= lo[i]`, or `ordinal` disagrees in length with `lo`/`hi`.
    pub fn new(
        phi: f64,
        lo: Vec<f64>,
        hi: Vec<f64>,
        ordinal: Option<Vec<bool>>,
    ) -> Result<Self> {
        if !(phi > 0.0 && phi <= 1.0) {
            return Err(EngineError::BadConfig {
                detail: format!("phi must be in (0, 1], got {phi}"),
            });
        }
        if lo.len() != hi.len() {
            return Err(EngineError::BadConfig {
                detail: format!(
                    "context lo/hi length mismatch: lo has {}, hi has {}",
                    lo.len(),
                    hi.len()
                ),
            });
        }
        let dims = lo.len();
        if dims == 0 {
            return Err(EngineError::BadConfig {
                detail: "context must declare at least one dimension".to_owned(),
            });
        }
        let ordinal = ordinal.unwrap_or_else(|| vec![false; dims]);
        if ordinal.len() != dims {
            return Err(EngineError::BadConfig {
                detail: format!(
                    "ordinal mask length mismatch: expected {dims}, got {}",
                    ordinal.len()
                ),
            });
        }

        let mut side = Vec::with_capacity(dims);
        for i in 0..dims {
            if ordinal[i] {
                side.push(1.0);
                continue;
            }
            let extent = hi[i] - lo[i];
            if !(extent > 0.0) {
                return Err(EngineError::BadConfig {
                    detail: format!(
                        "continuous dimension {i} must have hi > lo (got lo={}, hi={})",
                        lo[i], hi[i]
                    ),
                });
            }
            side.push(phi * extent);
        }

        Ok(Self {
            phi,
            lo,
            hi,
            ordinal,
            side,
        })
    }

    /// Returns the number of declared dimensions.
    #[must_use]
    pub fn dims(&self) -> usize {
        self.lo.len()
    }

    /// Returns the configured `phi` contraction factor.
    #[must_use]
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Returns the lower bound of the context box.
    #[must_use]
    pub fn lo(&self) -> &[f64] {
        &self.lo
    }

    /// Returns the upper bound of the context box.
    #[must_use]
    pub fn hi(&self) -> &[f64] {
        &self.hi
    }

    /// Returns the ordinal mask: `true` marks a dimension as exact-match.
    #[must_use]
    pub fn ordinal(&self) -> &[bool] {
        &self.ordinal
    }

    /// Returns the hyperbox side length per dimension (`phi * (hi - lo)` for
    /// continuous dimensions; `1.0` as a placeholder for ordinal dimensions,
    /// which are not bucketed).
    #[must_use]
    pub fn side(&self) -> &[f64] {
        &self.side
    }

    /// Returns the hyperbox volume, the product of `side[i]` over continuous
    /// dimensions only.
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.side
            .iter()
            .zip(&self.ordinal)
            .filter_map(|(s, is_ordinal)| (!is_ordinal).then_some(*s))
            .product()
    }

    /// Computes the hyperbox address of `point`.
    ///
    /// # Errors
    /// Returns [`EngineError::DimensionMismatch`] when `point.len()` does not
    /// match [`Self::dims`].
    pub fn address(&self, point: &[f64]) -> Result<Address> {
        if point.len() != self.dims() {
            return Err(EngineError::DimensionMismatch {
                expected: self.dims(),
                got: point.len(),
            });
        }

        let mut addr = Vec::with_capacity(self.dims());
        for i in 0..self.dims() {
            if self.ordinal[i] {
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "ordinal coordinates are compared for equality, not magnitude"
                )]
                addr.push(point[i].round() as i64);
                continue;
            }
            let raw = (point[i] - self.lo[i]) / self.side[i];
            let mut cell = raw.floor();
            // Round points on the context's upper boundary down to the last
            // cell rather than spilling into an empty cell beyond it.
            if (point[i] - self.hi[i]).abs() < f64::EPSILON {
                cell -= 1.0;
            }
            #[expect(
                clippy::cast_possible_truncation,
                reason = "grid cell indices are far below i64::MAX for any realistic context"
            )]
            addr.push(cell as i64);
        }
        Ok(addr)
    }

    /// Returns `true` iff `a` and `b` are Moore-neighbours: every continuous
    /// dimension differs by at most one cell and every ordinal dimension is
    /// exactly equal.
    #[must_use]
    pub fn reachable(&self, a: &Address, b: &Address) -> bool {
        a.iter()
            .zip(b)
            .zip(&self.ordinal)
            .all(|((&ai, &bi), &is_ordinal)| {
                if is_ordinal {
                    ai == bi
                } else {
                    (ai - bi).abs() <= 1
                }
            })
    }

    /// Returns `true` iff `a` and `b` are face-adjacent: [`Self::reachable`]
    /// holds *and* at most one continuous dimension differs by exactly one
    /// cell (corner-adjacency is excluded).
    #[must_use]
    pub fn direct(&self, a: &Address, b: &Address) -> bool {
        if !self.reachable(a, b) {
            return false;
        }
        let differing = a
            .iter()
            .zip(b)
            .zip(&self.ordinal)
            .filter(|((ai, bi), &is_ordinal)| !is_ordinal && *ai != *bi)
            .count();
        differing <= 1
    }
}

//! The microcluster (μC), the unit sufficient statistic the Distance Stage
//! maintains and the Density Stage classifies.

use crate::context::{Address, Context};

/// Density classification assigned by the Density Stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DensityClass {
    /// `density >= D_hi`.
    Dense,
    /// `D_lo <= density < D_hi`.
    SemiDense,
    /// `density < D_lo`.
    LowDensity,
}

impl DensityClass {
    /// Returns `true` for [`DensityClass::Dense`] or [`DensityClass::SemiDense`]
    /// — membership in the Active list `A`.
    #[must_use]
    pub fn is_active(self) -> bool {
        !matches!(self, Self::LowDensity)
    }
}

/// A hyperbox cell of uniform side, holding the sufficient statistics DyClee
/// needs to track a local neighbourhood of the stream without retaining raw
/// samples.
///
/// # Invariants
/// - `t_start <= t_last`
/// - `n >= 1`
/// - `grid_addr` is always the address of [`Self::center`] under the owning
///   [`Context`]; callers must call [`Self::recompute_address`] after any
///   mutation that can move the center.
#[derive(Debug, Clone, PartialEq)]
pub struct Microcluster {
    id: u64,
    n: u64,
    ls: Vec<f64>,
    t_start: u64,
    t_last: u64,
    density: f64,
    density_class: DensityClass,
    label: Option<u64>,
    grid_addr: Address,
}

impl Microcluster {
    /// Creates a microcluster seeded with a single sample.
    #[must_use]
    pub fn new(id: u64, sample: Vec<f64>, t: u64, grid_addr: Address) -> Self {
        Self {
            id,
            n: 1,
            ls: sample,
            t_start: t,
            t_last: t,
            density: 0.0,
            density_class: DensityClass::LowDensity,
            label: None,
            grid_addr,
        }
    }

    /// Returns the microcluster's unique, monotonically assigned identifier.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the number of samples assimilated so far.
    #[must_use]
    pub fn n(&self) -> u64 {
        self.n
    }

    /// Returns the elementwise linear sum of assimilated samples.
    #[must_use]
    pub fn linear_sum(&self) -> &[f64] {
        &self.ls
    }

    /// Returns the timestamp of the first assimilated sample.
    #[must_use]
    pub fn t_start(&self) -> u64 {
        self.t_start
    }

    /// Returns the timestamp of the most recently assimilated sample.
    #[must_use]
    pub fn t_last(&self) -> u64 {
        self.t_last
    }

    /// Returns the density computed at the last Density Stage pass
    /// (`n / V`), or `0.0` before the first pass.
    #[must_use]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Returns the density classification assigned at the last Density
    /// Stage pass.
    #[must_use]
    pub fn density_class(&self) -> DensityClass {
        self.density_class
    }

    /// Returns the final-cluster label (`None` for "Unclassed").
    #[must_use]
    pub fn label(&self) -> Option<u64> {
        self.label
    }

    /// Returns the hyperbox address of [`Self::center`].
    #[must_use]
    pub fn grid_addr(&self) -> &Address {
        &self.grid_addr
    }

    /// Returns the elementwise mean of assimilated samples: `LS / n`.
    #[must_use]
    pub fn center(&self) -> Vec<f64> {
        #[expect(
            clippy::cast_precision_loss,
            reason = "sample counts stay far below 2^53 for any realistic stream"
        )]
        let n = self.n as f64;
        self.ls.iter().map(|sum| sum / n).collect()
    }

    /// Folds `sample` into the sufficient statistics and advances `t_last`.
    ///
    /// Does not recompute [`Self::grid_addr`]; callers must follow with
    /// [`Self::recompute_address`] once the new center is known.
    pub fn assimilate(&mut self, sample: &[f64], t: u64) {
        for (sum, value) in self.ls.iter_mut().zip(sample) {
            *sum += value;
        }
        self.n = self.n.saturating_add(1);
        self.t_last = self.t_last.max(t);
    }

    /// Recomputes [`Self::grid_addr`] from the current center under `ctx`.
    ///
    /// Returns the previous address so callers can detect whether the
    /// microcluster moved to a new grid cell.
    pub fn recompute_address(&mut self, ctx: &Context) -> Address {
        let previous = std::mem::replace(
            &mut self.grid_addr,
            ctx.address(&self.center())
                .unwrap_or_else(|_| self.grid_addr.clone()),
        );
        previous
    }

    /// Recomputes [`Self::density`] and [`Self::density_class`] from the
    /// thresholds derived by the Density Stage, and resets
    /// [`Self::label`] to "Unclassed".
    pub fn reclassify(&mut self, volume: f64, d_lo: f64, d_hi: f64) {
        #[expect(
            clippy::cast_precision_loss,
            reason = "sample counts stay far below 2^53 for any realistic stream"
        )]
        let n = self.n as f64;
        self.density = n / volume;
        self.density_class = if self.density >= d_hi {
            DensityClass::Dense
        } else if self.density >= d_lo {
            DensityClass::SemiDense
        } else {
            DensityClass::LowDensity
        };
        self.label = None;
    }

    /// Assigns a final-cluster label.
    pub fn set_label(&mut self, label: u64) {
        self.label = Some(label);
    }

    /// Absorbs `other` into `self` (the older microcluster absorbs the
    /// younger on a grid-address collision): `LS += other.LS`,
    /// `n += other.n`, `t_last = max(t_last, other.t_last)`, and `t_start`
    /// is left unchanged (it is already the smaller of the two by
    /// construction — callers must ensure `self` is the older microcluster).
    pub fn absorb(&mut self, other: &Self) {
        for (sum, value) in self.ls.iter_mut().zip(&other.ls) {
            *sum += value;
        }
        self.n = self.n.saturating_add(other.n);
        self.t_last = self.t_last.max(other.t_last);
    }
}

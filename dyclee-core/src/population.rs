//! Owns the live microcluster pool, the Grid Index, and the Active/Outlier
//! partition. The Distance Stage and Density Stage both operate on a shared
//! `Population`; the Snapshot Manager captures deep copies of it.

use fxhash::{FxHashMap, FxHashSet};

use crate::context::Context;
use crate::microcluster::Microcluster;

/// The live microcluster population: the pool of microclusters indexed by
/// id, the Grid Index, and the Active (`A`) / Outlier (`O`) partition.
///
/// Microclusters are owned here; the Grid Index and the `A`/`O` sets hold
/// only ids (spec.md §5: "weak references (relation + lookup), not
/// ownership").
///
/// # Invariants
/// `active` and `outliers` partition the keys of `microclusters`: every live
/// id appears in exactly one of the two sets (spec.md §3.3, property 3).
#[derive(Debug, Clone, Default)]
pub struct Population {
    microclusters: FxHashMap<u64, Microcluster>,
    grid: crate::grid::GridIndex,
    active: FxHashSet<u64>,
    outliers: FxHashSet<u64>,
    next_id: u64,
}

impl Population {
    /// Creates an empty population.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live microclusters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.microclusters.len()
    }

    /// Returns `true` when no microclusters are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.microclusters.is_empty()
    }

    /// Returns the microcluster with the given id, if live.
    #[must_use]
    pub fn get(&self, id: u64) -> Option<&Microcluster> {
        self.microclusters.get(&id)
    }

    /// Returns the ids currently in the Active list (`A`): Dense ∪
    /// Semi-Dense microclusters.
    #[must_use]
    pub fn active(&self) -> &FxHashSet<u64> {
        &self.active
    }

    /// Returns the ids currently in the Outlier list (`O`): Low-Density
    /// microclusters.
    #[must_use]
    pub fn outliers(&self) -> &FxHashSet<u64> {
        &self.outliers
    }

    /// Returns the Grid Index backing reachable-candidate lookups.
    #[must_use]
    pub fn grid(&self) -> &crate::grid::GridIndex {
        &self.grid
    }

    /// Allocates a new, monotonically increasing microcluster id.
    pub(crate) fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Registers a freshly created microcluster, placing it in the Outlier
    /// list and the Grid Index under its current address.
    pub(crate) fn insert_new(&mut self, mc: Microcluster) {
        let addr = mc.grid_addr().clone();
        let id = mc.id();
        self.microclusters.insert(id, mc);
        self.grid.insert(addr, id);
        self.outliers.insert(id);
    }

    /// Removes a microcluster entirely: pool, Grid Index, and both lists.
    pub(crate) fn remove(&mut self, id: u64) {
        if let Some(mc) = self.microclusters.remove(&id) {
            self.grid.remove_if(mc.grid_addr(), id);
        }
        self.active.remove(&id);
        self.outliers.remove(&id);
    }

    /// Returns a mutable reference to a live microcluster.
    pub(crate) fn get_mut(&mut self, id: u64) -> Option<&mut Microcluster> {
        self.microclusters.get_mut(&id)
    }

    /// Looks up the occupant of `addr`, if any.
    pub(crate) fn grid_get(&self, addr: &crate::context::Address) -> Option<u64> {
        self.grid.get(addr)
    }

    /// Registers `id` under `addr`, returning the previous occupant.
    pub(crate) fn grid_insert(&mut self, addr: crate::context::Address, id: u64) -> Option<u64> {
        self.grid.insert(addr, id)
    }

    /// Removes the entry at `addr` if it is currently occupied by `id`.
    pub(crate) fn grid_remove_if(&mut self, addr: &crate::context::Address, id: u64) {
        self.grid.remove_if(addr, id);
    }

    /// Rebuilds the Active/Outlier partition from each microcluster's
    /// current [`crate::microcluster::DensityClass`] (Density Stage step 1).
    pub(crate) fn rebuild_active_outlier(&mut self) {
        self.active.clear();
        self.outliers.clear();
        for (&id, mc) in &self.microclusters {
            if mc.density_class().is_active() {
                self.active.insert(id);
            } else {
                self.outliers.insert(id);
            }
        }
    }

    /// Iterates over every live microcluster.
    pub fn iter(&self) -> impl Iterator<Item = &Microcluster> {
        self.microclusters.values()
    }

    /// Iterates mutably over every live microcluster.
    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Microcluster> {
        self.microclusters.values_mut()
    }

    /// Recomputes every live microcluster's [`Microcluster::grid_addr`] under
    /// `ctx`, rehoming and merging on collision exactly as a single
    /// assimilation would (used when `ctx` changes are applied uniformly,
    /// e.g. in tests that rebuild addresses after bulk loads).
    #[cfg(test)]
    pub(crate) fn recompute_all_addresses(&mut self, ctx: &Context) {
        let ids: Vec<u64> = self.microclusters.keys().copied().collect();
        for id in ids {
            crate::distance_stage::rehome_after_assimilate(self, ctx, id);
        }
    }
}

//! Grid Index: maps hyperbox addresses to the microcluster id currently
//! occupying that cell, and enumerates Moore-neighbourhood candidates in
//! `O(3^d_cont)` probes rather than scanning the whole population.

use fxhash::FxHashMap;

use crate::context::{Address, Context};

/// Maps live hyperbox addresses to the id of the microcluster occupying
/// them.
///
/// # Invariants
/// At most one microcluster id is registered under any given address at any
/// observable moment (grid uniqueness, spec.md property 2).
#[derive(Debug, Clone, Default)]
pub struct GridIndex {
    cells: FxHashMap<Address, u64>,
}

impl GridIndex {
    /// Creates an empty grid index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the microcluster id registered at `addr`, if any.
    #[must_use]
    pub fn get(&self, addr: &Address) -> Option<u64> {
        self.cells.get(addr).copied()
    }

    /// Registers `id` under `addr`. Returns the previous occupant, if any
    /// (callers must treat a non-`None` return as a collision to resolve).
    pub fn insert(&mut self, addr: Address, id: u64) -> Option<u64> {
        self.cells.insert(addr, id)
    }

    /// Removes the entry at `addr` if it is currently occupied by `id`.
    ///
    /// Does nothing if `addr` is occupied by a different id (the caller's
    /// view is stale, e.g. after a collision already rewrote the cell).
    pub fn remove_if(&mut self, addr: &Address, id: u64) {
        if self.cells.get(addr) == Some(&id) {
            self.cells.remove(addr);
        }
    }

    /// Returns the number of occupied cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` when no cells are occupied.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Enumerates the ids of microclusters whose address is reachable
    /// (Moore-neighbourhood, §4.1) from `addr`, by probing the `3^d_cont`
    /// candidate addresses directly rather than scanning every live cell.
    #[must_use]
    pub fn reachable_candidates(&self, ctx: &Context, addr: &Address) -> Vec<u64> {
        let mut found = Vec::new();
        for candidate in moore_offsets(ctx, addr) {
            if let Some(&id) = self.cells.get(&candidate) {
                found.push(id);
            }
        }
        found
    }
}

/// Generates every address within the Moore neighbourhood of `addr`:
/// `{-1, 0, 1}` per continuous dimension, held fixed at `addr[i]` for
/// ordinal dimensions.
fn moore_offsets(ctx: &Context, addr: &Address) -> Vec<Address> {
    let ordinal = ctx.ordinal();
    let mut candidates = vec![Vec::with_capacity(addr.len())];
    for (i, &base) in addr.iter().enumerate() {
        let offsets: &[i64] = if ordinal.get(i).copied().unwrap_or(false) {
            &[0]
        } else {
            &[-1, 0, 1]
        };
        let mut next = Vec::with_capacity(candidates.len().saturating_mul(offsets.len()));
        for prefix in &candidates {
            for offset in offsets {
                let mut extended = prefix.clone();
                extended.push(base + offset);
                next.push(extended);
            }
        }
        candidates = next;
    }
    candidates
}

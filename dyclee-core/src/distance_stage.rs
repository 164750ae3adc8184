//! The Distance Stage: per-sample incremental maintenance of microclusters
//! (spec.md §4.3). Routes each sample to a reachable microcluster or spawns
//! a new one, then maintains Grid Index addresses and evicts stale outliers.

use tracing::{instrument, trace, warn};

use crate::context::{Address, Context};
use crate::microcluster::Microcluster;
use crate::population::Population;

/// Ingests one sample at timestamp `t`, mutating `population` in place, and
/// returns the id of the microcluster that absorbed it (freshly created or
/// pre-existing).
///
/// Implements spec.md §4.3 steps 1-6: candidate selection by Moore-
/// neighbourhood reachability, nearest-candidate assimilation (or spawning a
/// new microcluster when no candidate is reachable), address maintenance
/// with merge-on-collision, and outlier eviction.
///
/// Callers are expected to have already validated `sample.len() ==
/// ctx.dims()`; this function assumes `ctx.address(sample)` succeeds.
#[instrument(name = "distance_stage.ingest", skip(population, ctx), fields(t, t_global))]
pub(crate) fn ingest(population: &mut Population, ctx: &Context, sample: &[f64], t: u64, t_global: u64) -> u64 {
    let Ok(addr) = ctx.address(sample) else {
        evict_stale_outliers(population, t, t_global);
        return population.next_id();
    };

    let absorbed_by = match select_candidate(population, ctx, &addr, sample) {
        Some(id) => {
            if let Some(mc) = population.get_mut(id) {
                mc.assimilate(sample, t);
            }
            rehome_after_assimilate(population, ctx, id)
        }
        None => {
            let id = population.next_id();
            let mc = Microcluster::new(id, sample.to_vec(), t, addr);
            population.insert_new(mc);
            trace!(microcluster = id, "spawned new microcluster");
            id
        }
    };

    evict_stale_outliers(population, t, t_global);
    absorbed_by
}

/// Selects the reachable candidate microcluster minimizing Euclidean
/// distance to `sample`, ties broken by older `t_start`.
fn select_candidate(
    population: &Population,
    ctx: &Context,
    addr: &Address,
    sample: &[f64],
) -> Option<u64> {
    let candidates = population.grid().reachable_candidates(ctx, addr);
    let mut best: Option<(u64, f64, u64)> = None;
    for id in candidates {
        let Some(mc) = population.get(id) else {
            continue;
        };
        let distance = squared_euclidean(&mc.center(), sample);
        let t_start = mc.t_start();
        let replace = match best {
            None => true,
            Some((_, best_distance, best_t_start)) => {
                distance < best_distance || (distance == best_distance && t_start < best_t_start)
            }
        };
        if replace {
            best = Some((id, distance, t_start));
        }
    }
    best.map(|(id, _, _)| id)
}

fn squared_euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let diff = x - y;
            diff * diff
        })
        .sum()
}

/// Recomputes `id`'s grid address and rehomes it in the Grid Index,
/// resolving a collision by merging the younger microcluster into the
/// older one (spec.md §4.3 step 5). Returns the id of the microcluster that
/// now holds `id`'s statistics: `id` itself, unless a collision merged it
/// into an older survivor.
pub(crate) fn rehome_after_assimilate(population: &mut Population, ctx: &Context, id: u64) -> u64 {
    let Some(old_addr) = population.get_mut(id).map(|mc| mc.recompute_address(ctx)) else {
        return id;
    };
    let Some(new_addr) = population.get(id).map(|mc| mc.grid_addr().clone()) else {
        return id;
    };
    if old_addr == new_addr {
        return id;
    }
    population.grid_remove_if(&old_addr, id);

    match population.grid_get(&new_addr) {
        None => {
            population.grid_insert(new_addr, id);
            id
        }
        Some(other_id) if other_id == id => id,
        Some(other_id) => merge_on_collision(population, id, other_id, new_addr),
    }
}

/// Merges two microclusters that collided at the same grid address: the
/// older (smaller `t_start`) absorbs the younger, and the younger is
/// destroyed. Returns the surviving (older) id.
fn merge_on_collision(population: &mut Population, a: u64, b: u64, addr: Address) -> u64 {
    let (Some(a_start), Some(b_start)) = (
        population.get(a).map(Microcluster::t_start),
        population.get(b).map(Microcluster::t_start),
    ) else {
        return a;
    };
    let (older, younger) = if a_start <= b_start { (a, b) } else { (b, a) };

    let Some(younger_snapshot) = population.get(younger).cloned() else {
        return older;
    };
    if let Some(older_mc) = population.get_mut(older) {
        older_mc.absorb(&younger_snapshot);
    }
    population.remove(younger);
    population.grid_insert(addr, older);
    older
}

/// Destroys any Outlier-list microcluster untouched for `t_global` steps.
fn evict_stale_outliers(population: &mut Population, t: u64, t_global: u64) {
    let stale: Vec<u64> = population
        .outliers()
        .iter()
        .copied()
        .filter(|&id| {
            population
                .get(id)
                .is_some_and(|mc| t.saturating_sub(mc.t_last()) >= t_global)
        })
        .collect();
    for id in stale {
        warn!(microcluster = id, "evicting stale outlier");
        population.remove(id);
    }
}

//! The Density Stage: periodic reclassification of every microcluster by
//! density, followed by BFS-based assembly of final clusters from Dense
//! seeds outward through face-adjacent ([`Context::direct`]) neighbors
//! (spec.md §4.4).

use tracing::{debug, instrument};

use crate::context::Context;
use crate::microcluster::DensityClass;
use crate::population::Population;
use crate::result::FinalCluster;

/// Reclassifies every microcluster by density and reassembles final
/// clusters.
///
/// Thresholds are derived from the live population itself: `D_lo = mean_D`,
/// `D_hi = mean_D + (max_D - mean_D) / 2`. Returns an empty vector when the
/// population is empty (spec.md §7's `EmptyPopulation`, represented
/// structurally rather than as an error).
#[instrument(name = "density_stage.run", skip(population, ctx))]
pub(crate) fn run(population: &mut Population, ctx: &Context) -> Vec<FinalCluster> {
    if population.is_empty() {
        return Vec::new();
    }

    let volume = ctx.volume();
    let (d_lo, d_hi) = density_thresholds(population, volume);
    for mc in population.iter_mut() {
        mc.reclassify(volume, d_lo, d_hi);
    }
    population.rebuild_active_outlier();

    let clusters = assemble_final_clusters(population, ctx);
    debug!(clusters = clusters.len(), d_lo, d_hi, "density stage assembled clusters");
    clusters
}

/// Computes `(D_lo, D_hi)` from the mean and max density over live
/// microclusters (`density = n / volume`, ahead of [`Microcluster::reclassify`]
/// having run this pass): `D_lo = mean_D`, `D_hi = mean_D + (max_D - mean_D) / 2`.
///
/// [`Microcluster::reclassify`]: crate::microcluster::Microcluster::reclassify
fn density_thresholds(population: &Population, volume: f64) -> (f64, f64) {
    let mut sum = 0.0_f64;
    let mut max_density = f64::MIN;
    let mut count = 0.0_f64;
    for mc in population.iter() {
        #[expect(
            clippy::cast_precision_loss,
            reason = "sample counts stay far below 2^53 for any realistic stream"
        )]
        let density = mc.n() as f64 / volume;
        sum += density;
        max_density = max_density.max(density);
        count += 1.0;
    }
    if count == 0.0 {
        return (0.0, 0.0);
    }
    let mean_density = sum / count;
    let d_hi = mean_density + (max_density - mean_density) / 2.0;
    (mean_density, d_hi)
}

/// Seeds a BFS worklist at every Dense microcluster (sorted by descending
/// density, ties broken by ascending id for determinism) and labels every
/// component reachable via face-adjacency. Dense neighbors propagate the
/// label further; Semi-Dense neighbors are labeled but act as a boundary.
fn assemble_final_clusters(population: &mut Population, ctx: &Context) -> Vec<FinalCluster> {
    let mut seeds: Vec<u64> = population
        .active()
        .iter()
        .copied()
        .filter(|&id| {
            population
                .get(id)
                .is_some_and(|mc| mc.density_class() == DensityClass::Dense)
        })
        .collect();
    seeds.sort_unstable_by(|&a, &b| {
        let da = population.get(a).map_or(0.0, crate::microcluster::Microcluster::density);
        let db = population.get(b).map_or(0.0, crate::microcluster::Microcluster::density);
        db.total_cmp(&da).then(a.cmp(&b))
    });

    let mut clusters = Vec::new();
    let mut next_label = 0u64;

    for seed in seeds {
        if population.get(seed).is_some_and(|mc| mc.label().is_some()) {
            continue;
        }
        next_label = next_label.saturating_add(1);
        let label = next_label;
        let members = bfs_from_seed(population, ctx, seed, label);
        clusters.push(build_final_cluster(population, label, &members));
    }

    clusters
}

/// BFS from `seed`, enqueuing only Dense neighbors reached via
/// [`Context::direct`]; Semi-Dense neighbors are labeled but not enqueued
/// (spec.md §4.4 step 2). Returns every labeled member.
fn bfs_from_seed(population: &mut Population, ctx: &Context, seed: u64, label: u64) -> Vec<u64> {
    let mut members = Vec::new();
    let mut queue = vec![seed];
    if let Some(mc) = population.get_mut(seed) {
        mc.set_label(label);
    }

    while let Some(u) = queue.pop() {
        members.push(u);
        let Some(u_addr) = population.get(u).map(|mc| mc.grid_addr().clone()) else {
            continue;
        };
        let active: Vec<u64> = population.active().iter().copied().collect();
        for v in active {
            if v == u {
                continue;
            }
            let Some((v_addr, already_labeled, is_dense)) = population.get(v).map(|mc| {
                (
                    mc.grid_addr().clone(),
                    mc.label().is_some(),
                    mc.density_class() == DensityClass::Dense,
                )
            }) else {
                continue;
            };
            if already_labeled || !ctx.direct(&u_addr, &v_addr) {
                continue;
            }
            if let Some(mc) = population.get_mut(v) {
                mc.set_label(label);
            }
            members.push(v);
            if is_dense {
                queue.push(v);
            }
        }
    }

    members
}

/// Builds a [`FinalCluster`] with a density-weighted centroid.
fn build_final_cluster(population: &Population, label: u64, members: &[u64]) -> FinalCluster {
    let dims = members
        .first()
        .and_then(|&id| population.get(id))
        .map_or(0, |mc| mc.center().len());
    let mut weighted = vec![0.0_f64; dims];
    let mut total_weight = 0.0_f64;

    for &id in members {
        let Some(mc) = population.get(id) else {
            continue;
        };
        let weight = mc.density();
        total_weight += weight;
        for (acc, value) in weighted.iter_mut().zip(mc.center()) {
            *acc += weight * value;
        }
    }

    let centroid = if total_weight > 0.0 {
        weighted.iter().map(|sum| sum / total_weight).collect()
    } else {
        unweighted_mean(population, members, dims)
    };

    FinalCluster::new(label, members.to_vec(), centroid)
}

fn unweighted_mean(population: &Population, members: &[u64], dims: usize) -> Vec<f64> {
    let mut sum = vec![0.0_f64; dims];
    let mut count = 0.0_f64;
    for &id in members {
        if let Some(mc) = population.get(id) {
            count += 1.0;
            for (acc, value) in sum.iter_mut().zip(mc.center()) {
                *acc += value;
            }
        }
    }
    if count > 0.0 {
        sum.iter().map(|total| total / count).collect()
    } else {
        sum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distance_stage;

    fn ctx() -> Context {
        Context::new(0.25, vec![0.0, 0.0], vec![4.0, 4.0], None).expect("valid context")
    }

    fn dense_blob(population: &mut Population, ctx: &Context, origin: f64, n: usize) {
        for i in 0..n {
            distance_stage::ingest(population, ctx, &[origin, origin], i as u64, 1000);
        }
    }

    #[test]
    fn empty_population_yields_no_clusters() {
        let ctx = ctx();
        let mut population = Population::new();
        assert!(run(&mut population, &ctx).is_empty());
    }

    #[test]
    fn single_microcluster_forms_an_isolated_singleton_cluster() {
        // With exactly one live microcluster, mean_D == max_D == its own
        // density, so D_hi == density and `density >= D_hi` holds: the lone
        // microcluster is classified Dense, not excluded. This is spec.md
        // §9's "an isolated Dense μC forms a singleton cluster" edge case.
        let ctx = ctx();
        let mut population = Population::new();
        distance_stage::ingest(&mut population, &ctx, &[0.1, 0.1], 0, 1000);

        let clusters = run(&mut population, &ctx);
        assert_eq!(clusters.len(), 1, "the lone microcluster must seed a singleton cluster");
        assert_eq!(clusters[0].label(), 1);
        let mc = population.iter().next().expect("one microcluster");
        assert_eq!(mc.label(), Some(1));
        assert_eq!(mc.density_class(), DensityClass::Dense);
    }

    #[test]
    fn a_standout_dense_blob_forms_a_labeled_cluster() {
        let ctx = ctx();
        let mut population = Population::new();
        dense_blob(&mut population, &ctx, 0.1, 50);
        distance_stage::ingest(&mut population, &ctx, &[3.9, 3.9], 50, 1000);

        let clusters = run(&mut population, &ctx);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].label(), 1);
    }

    #[test]
    fn two_standout_dense_blobs_form_separate_clusters() {
        let ctx = ctx();
        let mut population = Population::new();
        dense_blob(&mut population, &ctx, 0.1, 50);
        dense_blob(&mut population, &ctx, 3.9, 50);

        let mut clusters = run(&mut population, &ctx);
        clusters.sort_by_key(FinalCluster::label);
        assert_eq!(clusters.len(), 2);
        assert_ne!(clusters[0].label(), clusters[1].label());
    }

    #[test]
    fn reclassification_is_idempotent_with_no_intervening_samples() {
        let ctx = ctx();
        let mut population = Population::new();
        dense_blob(&mut population, &ctx, 0.1, 50);
        dense_blob(&mut population, &ctx, 3.9, 50);

        let first: Vec<_> = {
            let mut clusters = run(&mut population, &ctx);
            clusters.sort_by_key(FinalCluster::label);
            clusters
        };
        let second: Vec<_> = {
            let mut clusters = run(&mut population, &ctx);
            clusters.sort_by_key(FinalCluster::label);
            clusters
        };
        assert_eq!(first, second);
    }
}

//! Pyramidal Snapshot Manager: a multi-resolution time-indexed archive of
//! microcluster populations, retained with tiered density so recent history
//! is dense and deep history is sparse (spec.md §4.6).

use fxhash::FxHashMap;
use tracing::instrument;

use crate::microcluster::Microcluster;
use crate::population::Population;
use crate::result::FinalCluster;

/// One captured instant: deep copies of the final clusters and of the full
/// Active ∪ Outlier population at the timestamp the density stage ran.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    t: u64,
    final_clusters: Vec<FinalCluster>,
    all: Vec<Microcluster>,
}

impl Snapshot {
    /// Returns the timestamp this snapshot was captured at.
    #[must_use]
    pub fn t(&self) -> u64 {
        self.t
    }

    /// Returns the final clusters assembled at capture time.
    #[must_use]
    pub fn final_clusters(&self) -> &[FinalCluster] {
        &self.final_clusters
    }

    /// Returns a deep copy of the full population (`A ∪ O`) at capture time.
    #[must_use]
    pub fn all(&self) -> &[Microcluster] {
        &self.all
    }
}

/// Archives [`Snapshot`]s across pyramidal tiers.
///
/// Tier `ℓ` for a capture at timestamp `t` is the largest integer such that
/// `t mod α^ℓ == 0`, capped at `max_order`. Each tier retains at most
/// `α^(ℓ+1)` most-recent entries.
///
/// # Invariants
/// Total retained entries stay bounded by `O(max_order * alpha)`: each tier
/// independently caps its own retention, and only `max_order` tiers exist.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    alpha: u64,
    max_order: u32,
    tiers: FxHashMap<u32, Vec<Snapshot>>,
}

impl SnapshotManager {
    /// Creates an empty archive with pyramidal base `alpha` and order cap
    /// `max_order`.
    #[must_use]
    pub fn new(alpha: u64, max_order: u32) -> Self {
        Self {
            alpha: alpha.max(2),
            max_order,
            tiers: FxHashMap::default(),
        }
    }

    /// Captures a deep copy of `population` and its final clusters at `t`,
    /// filing it under the appropriate pyramidal tier and evicting the
    /// oldest entry in that tier if it now exceeds capacity.
    #[instrument(name = "snapshot.capture", skip(self, population, final_clusters), fields(t))]
    pub fn capture(&mut self, t: u64, population: &Population, final_clusters: Vec<FinalCluster>) {
        let tier = self.tier_for(t);
        let all: Vec<Microcluster> = population.iter().cloned().collect();
        let snapshot = Snapshot {
            t,
            final_clusters,
            all,
        };

        let capacity = self.capacity_for(tier);
        let entries = self.tiers.entry(tier).or_default();
        entries.push(snapshot);
        entries.sort_unstable_by_key(Snapshot::t);
        while entries.len() > capacity {
            entries.remove(0);
        }
    }

    /// Returns the largest `ℓ <= max_order` such that `t mod alpha^ℓ == 0`.
    fn tier_for(&self, t: u64) -> u32 {
        let mut tier = 0u32;
        while tier < self.max_order {
            let Some(next) = self.alpha.checked_pow(tier.saturating_add(1)) else {
                break;
            };
            if next == 0 || t % next != 0 {
                break;
            }
            tier = tier.saturating_add(1);
        }
        tier
    }

    /// Returns the retention capacity of tier `ℓ`: `alpha^(ℓ+1)`.
    fn capacity_for(&self, tier: u32) -> usize {
        self.alpha
            .checked_pow(tier.saturating_add(1))
            .and_then(|cap| usize::try_from(cap).ok())
            .unwrap_or(usize::MAX)
    }

    /// Returns every retained snapshot across all tiers, most recent first.
    #[must_use]
    pub fn snapshots(&self) -> Vec<&Snapshot> {
        let mut all: Vec<&Snapshot> = self.tiers.values().flatten().collect();
        all.sort_unstable_by(|a, b| b.t.cmp(&a.t));
        all
    }

    /// Returns the total number of retained snapshots across all tiers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiers.values().map(Vec::len).sum()
    }

    /// Returns `true` when no snapshots have been captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the most recently captured snapshot at or before `t`, if any.
    #[must_use]
    pub fn at_or_before(&self, t: u64) -> Option<&Snapshot> {
        self.tiers
            .values()
            .flatten()
            .filter(|snap| snap.t <= t)
            .max_by_key(|snap| snap.t)
    }
}

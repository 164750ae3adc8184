//! Output types produced by the Density Stage and the [`Engine`](crate::Engine)
//! facade: final-cluster labels and the assembled clusters themselves.

use std::fmt;

/// A sample's or microcluster's final-cluster assignment.
///
/// Formats as the sentinel `"Unclassed"` when no label was assigned, matching
/// the external interface contract (spec.md §6): "callers ... receive labels
/// as integers or the sentinel `Unclassed`."
///
/// # Examples
/// ```
/// use dyclee_core::ClusterLabel;
///
/// assert_eq!(ClusterLabel::Unclassed.to_string(), "Unclassed");
/// assert_eq!(ClusterLabel::Label(3).to_string(), "3");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClusterLabel {
    /// Member of final cluster `k`.
    Label(u64),
    /// No final-cluster label applies.
    Unclassed,
}

impl ClusterLabel {
    /// Returns the numeric label, or `None` for [`ClusterLabel::Unclassed`].
    #[must_use]
    pub fn get(self) -> Option<u64> {
        match self {
            Self::Label(k) => Some(k),
            Self::Unclassed => None,
        }
    }
}

impl fmt::Display for ClusterLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Label(k) => write!(f, "{k}"),
            Self::Unclassed => f.write_str("Unclassed"),
        }
    }
}

/// A final cluster assembled by the Density Stage: a connected component of
/// Active-list microclusters reachable from at least one Dense seed.
///
/// # Examples
/// ```
/// use dyclee_core::FinalCluster;
///
/// let cluster = FinalCluster::new(1, vec![10, 11], vec![0.5, 0.5]);
/// assert_eq!(cluster.label(), 1);
/// assert_eq!(cluster.members(), &[10, 11]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FinalCluster {
    label: u64,
    members: Vec<u64>,
    centroid: Vec<f64>,
}

impl FinalCluster {
    /// Builds a final cluster from its label, member microcluster ids, and
    /// density-weighted centroid.
    #[must_use]
    pub fn new(label: u64, members: Vec<u64>, centroid: Vec<f64>) -> Self {
        Self {
            label,
            members,
            centroid,
        }
    }

    /// Returns the cluster's label `k >= 1`.
    ///
    /// Labels are re-issued on every Density Stage pass; callers relating
    /// labels across passes must do so via snapshots, not label identity.
    #[must_use]
    pub fn label(&self) -> u64 {
        self.label
    }

    /// Returns the ids of the member microclusters.
    #[must_use]
    pub fn members(&self) -> &[u64] {
        &self.members
    }

    /// Returns the density-weighted centroid of the member microclusters.
    #[must_use]
    pub fn centroid(&self) -> &[f64] {
        &self.centroid
    }
}

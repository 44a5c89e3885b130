use crate::core::{Address, ControllerError, NodeStatus, Result};
use std::collections::{BTreeMap, BTreeSet};

/// Snapshot of the cluster produced by one probing pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterView {
    primary: Option<Address>,
    secondaries: BTreeSet<Address>,
    vacants: BTreeSet<Address>,
}

impl ClusterView {
    /// Builds a view from the complete set of observations of one pass.
    ///
    /// Fails with `SplitBrain` when more than one address reports the
    /// primary role; the error names the two smallest addresses and lists
    /// every primary seen.
    pub fn from_observations(
        observations: impl IntoIterator<Item = (Address, NodeStatus)>,
    ) -> Result<Self> {
        let observations: BTreeMap<Address, NodeStatus> = observations.into_iter().collect();

        let primaries: Vec<&Address> = observations
            .iter()
            .filter(|(_, status)| **status == NodeStatus::Primary)
            .map(|(addr, _)| addr)
            .collect();
        if primaries.len() > 1 {
            return Err(ControllerError::SplitBrain {
                first: primaries[0].to_string(),
                second: primaries[1].to_string(),
                primaries: primaries.iter().map(|addr| addr.to_string()).collect(),
            });
        }

        let mut view = Self::default();
        for (addr, status) in observations {
            match status {
                NodeStatus::Primary => view.primary = Some(addr),
                NodeStatus::Secondary => {
                    view.secondaries.insert(addr);
                }
                NodeStatus::Vacant => {
                    view.vacants.insert(addr);
                }
            }
        }
        Ok(view)
    }

    pub fn primary(&self) -> Option<&Address> {
        self.primary.as_ref()
    }

    pub fn secondaries(&self) -> &BTreeSet<Address> {
        &self.secondaries
    }

    pub fn vacants(&self) -> &BTreeSet<Address> {
        &self.vacants
    }

    /// Smallest vacant address, used as the seed of a fresh cluster.
    pub fn seed_candidate(&self) -> Option<&Address> {
        self.vacants.iter().next()
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondaries.is_empty() && self.vacants.is_empty()
    }
}

use crate::core::{Address, ControllerError, MemberConfig, MemberRecord, ReplicaSetConfig, Result};
use std::collections::{BTreeSet, HashSet};

/// Builds the next replica set configuration from the one just read.
#[derive(Debug, Clone)]
pub struct ConfigMerger {
    set_name: String,
}

impl ConfigMerger {
    pub fn new(set_name: impl Into<String>) -> Self {
        Self {
            set_name: set_name.into(),
        }
    }

    pub fn set_name(&self) -> &str {
        &self.set_name
    }

    /// Returns the replacement config: version bumped by one, members sorted
    /// by id.
    ///
    /// Rejects an empty member list and duplicate member ids.
    pub fn next_config(
        &self,
        current: &ReplicaSetConfig,
        members: Vec<MemberConfig>,
    ) -> Result<ReplicaSetConfig> {
        if members.is_empty() {
            return Err(ControllerError::InvalidConfig(
                "reconfiguration would remove the last member".to_string(),
            ));
        }

        let mut members = members;
        members.sort_by_key(|member| member.id);

        let mut seen = HashSet::new();
        for member in &members {
            if !seen.insert(member.id) {
                return Err(ControllerError::InvalidConfig(format!(
                    "member id {} appears more than once",
                    member.id
                )));
            }
        }

        let version = current.version.checked_add(1).ok_or_else(|| {
            ControllerError::InvalidConfig(format!(
                "config version {} cannot be incremented",
                current.version
            ))
        })?;

        Ok(ReplicaSetConfig {
            name: self.set_name.clone(),
            version,
            members,
        })
    }
}

/// Members of the live table split by the removed-state sentinel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberPartition {
    pub active: Vec<MemberConfig>,
    pub removed: Vec<MemberRecord>,
}

impl MemberPartition {
    pub fn from_records(records: Vec<MemberRecord>, removed_state: i32) -> Self {
        let mut partition = Self::default();
        for record in records {
            if record.is_removed(removed_state) {
                partition.removed.push(record);
            } else {
                partition.active.push(record.to_config());
            }
        }
        partition
    }

    /// Highest id among every live member, active or removed.
    pub fn max_id(&self) -> Option<i64> {
        self.active
            .iter()
            .map(|member| member.id)
            .chain(self.removed.iter().map(|record| record.id))
            .max()
    }
}

/// Assigns fresh ids to `vacants` in ascending address order, starting one
/// above `max_id` (or at 0 when there is no member at all).
pub fn assign_member_ids(max_id: Option<i64>, vacants: &BTreeSet<Address>) -> Vec<MemberConfig> {
    let first = max_id.map(|id| id + 1).unwrap_or(0);
    vacants
        .iter()
        .zip(first..)
        .map(|(addr, id)| MemberConfig::new(id, addr.clone()))
        .collect()
}

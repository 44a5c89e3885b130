pub mod config;
pub mod http;
pub mod memory;

use crate::core::{Address, ReplicaSetConfig, ReplicaSetStatus, Result, RoleStatus};
use async_trait::async_trait;

/// Administrative commands understood by every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdminCommand {
    RoleStatus,
    ReadConfig,
    Initiate,
    Reconfigure,
    MemberStatuses,
}

impl AdminCommand {
    /// Wire name of the command.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminCommand::RoleStatus => "isMaster",
            AdminCommand::ReadConfig => "replSetGetConfig",
            AdminCommand::Initiate => "replSetInitiate",
            AdminCommand::Reconfigure => "replSetReconfig",
            AdminCommand::MemberStatuses => "replSetGetStatus",
        }
    }
}

impl std::fmt::Display for AdminCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client for the administrative interface of a single node.
///
/// Implementations own connection handling; every call must release
/// whatever it acquired before returning, including on error.
#[async_trait]
pub trait AdminClient: Send + Sync {
    /// Queries the current role of the node.
    async fn role_status(&self, addr: &Address) -> Result<RoleStatus>;

    /// Reads the replica set configuration currently held by the node.
    async fn read_config(&self, addr: &Address) -> Result<ReplicaSetConfig>;

    /// Creates a brand-new replica set with `config` on the node.
    async fn initiate(&self, addr: &Address, config: &ReplicaSetConfig) -> Result<()>;

    /// Replaces the replica set configuration wholesale.
    async fn reconfigure(&self, addr: &Address, config: &ReplicaSetConfig) -> Result<()>;

    /// Reads the live member status table.
    async fn member_statuses(&self, addr: &Address) -> Result<ReplicaSetStatus>;
}

use super::{AdminClient, AdminCommand};
use crate::core::{
    Address, ControllerError, MemberRecord, ReplicaSetConfig, ReplicaSetStatus, Result,
    RoleStatus,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Member state assigned to freshly added members by the fake.
pub const STARTUP_MEMBER_STATE: i32 = 0;
/// Member state reported for a primary.
pub const PRIMARY_MEMBER_STATE: i32 = 1;

/// State of one simulated node.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNode {
    pub role: RoleStatus,
    pub reachable: bool,
    pub config: Option<ReplicaSetConfig>,
    pub members: Vec<MemberRecord>,
    pub fail_mutations: bool,
    pub malformed_replies: bool,
}

impl InMemoryNode {
    pub fn vacant() -> Self {
        Self {
            reachable: true,
            ..Self::default()
        }
    }

    pub fn secondary() -> Self {
        Self {
            role: RoleStatus::secondary(),
            reachable: true,
            ..Self::default()
        }
    }

    pub fn primary(config: ReplicaSetConfig, members: Vec<MemberRecord>) -> Self {
        Self {
            role: RoleStatus::primary(),
            reachable: true,
            config: Some(config),
            members,
            ..Self::default()
        }
    }
}

/// A mutation submitted to the fake, accepted or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmittedCommand {
    pub addr: Address,
    pub command: AdminCommand,
    pub config: ReplicaSetConfig,
    pub accepted: bool,
}

/// An in-memory implementation of `AdminClient` for testing.
///
/// Simulates a set of nodes; a reconfiguration is only accepted on a
/// primary and only when its version is exactly one above the stored one.
#[derive(Clone, Default)]
pub struct InMemoryAdminClient {
    nodes: Arc<Mutex<HashMap<Address, InMemoryNode>>>,
    submitted: Arc<Mutex<Vec<SubmittedCommand>>>,
}

impl InMemoryAdminClient {
    /// Creates a new, empty fake.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a node.
    pub async fn add_node(&self, addr: impl Into<Address>, node: InMemoryNode) {
        self.nodes.lock().await.insert(addr.into(), node);
    }

    pub async fn add_vacant(&self, addr: impl Into<Address>) {
        self.add_node(addr, InMemoryNode::vacant()).await;
    }

    pub async fn add_secondary(&self, addr: impl Into<Address>) {
        self.add_node(addr, InMemoryNode::secondary()).await;
    }

    pub async fn add_primary(
        &self,
        addr: impl Into<Address>,
        config: ReplicaSetConfig,
        members: Vec<MemberRecord>,
    ) {
        self.add_node(addr, InMemoryNode::primary(config, members))
            .await;
    }

    pub async fn set_reachable(&self, addr: &Address, reachable: bool) -> Result<()> {
        self.with_node(addr, |node| node.reachable = reachable)
            .await
    }

    pub async fn set_role(&self, addr: &Address, role: RoleStatus) -> Result<()> {
        self.with_node(addr, |node| node.role = role).await
    }

    /// Makes every following query on the node answer with an undecodable reply.
    pub async fn malformed_replies(&self, addr: &Address) -> Result<()> {
        self.with_node(addr, |node| node.malformed_replies = true)
            .await
    }

    /// Makes every following mutation on the node fail at the transport level.
    pub async fn fail_mutations(&self, addr: &Address) -> Result<()> {
        self.with_node(addr, |node| node.fail_mutations = true)
            .await
    }

    pub async fn config_of(&self, addr: &Address) -> Option<ReplicaSetConfig> {
        self.nodes
            .lock()
            .await
            .get(addr)
            .and_then(|node| node.config.clone())
    }

    /// Returns every mutation submitted so far, in order.
    pub async fn submitted(&self) -> Vec<SubmittedCommand> {
        self.submitted.lock().await.clone()
    }

    async fn with_node(&self, addr: &Address, f: impl FnOnce(&mut InMemoryNode)) -> Result<()> {
        let mut nodes = self.nodes.lock().await;
        let node = nodes.get_mut(addr).ok_or_else(|| {
            ControllerError::Config(format!("In-memory node '{}' is not registered", addr))
        })?;
        f(node);
        Ok(())
    }

    async fn reachable_node(&self, addr: &Address, command: AdminCommand) -> Result<InMemoryNode> {
        let nodes = self.nodes.lock().await;
        match nodes.get(addr) {
            Some(node) if !node.reachable => {
                Err(ControllerError::transport(addr, command.as_str(), "timed out"))
            }
            Some(node) if node.malformed_replies => Err(ControllerError::protocol(
                addr,
                command.as_str(),
                "response could not be decoded",
            )),
            Some(node) => Ok(node.clone()),
            None => Err(ControllerError::transport(
                addr,
                command.as_str(),
                "connection refused",
            )),
        }
    }

    async fn mutate(
        &self,
        addr: &Address,
        command: AdminCommand,
        config: &ReplicaSetConfig,
    ) -> Result<()> {
        let mut nodes = self.nodes.lock().await;
        let outcome = match nodes.get_mut(addr) {
            None => Err(ControllerError::transport(
                addr,
                command.as_str(),
                "connection refused",
            )),
            Some(node) if !node.reachable || node.fail_mutations => Err(
                ControllerError::transport(addr, command.as_str(), "timed out"),
            ),
            Some(node) => Self::apply_mutation(addr, node, command, config),
        };

        self.submitted.lock().await.push(SubmittedCommand {
            addr: addr.clone(),
            command,
            config: config.clone(),
            accepted: outcome.is_ok(),
        });
        outcome
    }

    fn apply_mutation(
        addr: &Address,
        node: &mut InMemoryNode,
        command: AdminCommand,
        config: &ReplicaSetConfig,
    ) -> Result<()> {
        match command {
            AdminCommand::Initiate => {
                if node.config.is_some() {
                    return Err(ControllerError::protocol(
                        addr,
                        command.as_str(),
                        "already initialized",
                    ));
                }
                if config.version != 1 {
                    return Err(ControllerError::protocol(
                        addr,
                        command.as_str(),
                        format!("initial version must be 1, got {}", config.version),
                    ));
                }
                node.role = RoleStatus::primary();
            }
            AdminCommand::Reconfigure => {
                if !node.role.is_primary {
                    return Err(ControllerError::protocol(
                        addr,
                        command.as_str(),
                        "node is not primary",
                    ));
                }
                let current = node.config.as_ref().map(|c| c.version).unwrap_or(0);
                if config.version != current + 1 {
                    return Err(ControllerError::protocol(
                        addr,
                        command.as_str(),
                        format!(
                            "version {} must be exactly one above current {}",
                            config.version, current
                        ),
                    ));
                }
            }
            _ => {
                return Err(ControllerError::protocol(
                    addr,
                    command.as_str(),
                    "not a mutating command",
                ));
            }
        }

        let previous = std::mem::take(&mut node.members);
        node.members = config
            .members
            .iter()
            .map(|member| {
                let state = if &member.host == addr {
                    PRIMARY_MEMBER_STATE
                } else {
                    previous
                        .iter()
                        .find(|record| record.id == member.id && record.host == member.host)
                        .map(|record| record.state)
                        .unwrap_or(STARTUP_MEMBER_STATE)
                };
                MemberRecord::new(member.id, member.host.clone(), state)
            })
            .collect();
        node.config = Some(config.clone());
        Ok(())
    }
}

#[async_trait]
impl AdminClient for InMemoryAdminClient {
    async fn role_status(&self, addr: &Address) -> Result<RoleStatus> {
        Ok(self.reachable_node(addr, AdminCommand::RoleStatus).await?.role)
    }

    async fn read_config(&self, addr: &Address) -> Result<ReplicaSetConfig> {
        let node = self.reachable_node(addr, AdminCommand::ReadConfig).await?;
        node.config.ok_or_else(|| {
            ControllerError::protocol(
                addr,
                AdminCommand::ReadConfig.as_str(),
                "no replset config has been received",
            )
        })
    }

    async fn initiate(&self, addr: &Address, config: &ReplicaSetConfig) -> Result<()> {
        self.mutate(addr, AdminCommand::Initiate, config).await
    }

    async fn reconfigure(&self, addr: &Address, config: &ReplicaSetConfig) -> Result<()> {
        self.mutate(addr, AdminCommand::Reconfigure, config).await
    }

    async fn member_statuses(&self, addr: &Address) -> Result<ReplicaSetStatus> {
        let node = self
            .reachable_node(addr, AdminCommand::MemberStatuses)
            .await?;
        Ok(ReplicaSetStatus {
            members: node.members,
        })
    }
}

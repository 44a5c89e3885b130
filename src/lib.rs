// ============================================================================
// Replica Set Controller Library
// ============================================================================

pub mod cluster;
pub mod config;
pub mod connection;
pub mod controller;
pub mod core;

// Re-export main types for convenience
pub use cluster::{
    AddressResolver, BootstrapOutcome, BootstrapReady, BootstrapState, Bootstrapper, ClusterProbe,
    ClusterView, ConfigMerger, DnsResolver, MemberPartition, NameResolver, NotYetStarted,
    ReconcileOutcome, Reconciler, StaticResolver, assign_member_ids,
};
pub use config::{ControllerConfig, RetryPolicy};
pub use controller::Controller;
pub use core::{
    Address, CommandAck, ControllerError, DEFAULT_SET_NAME, MemberConfig, MemberRecord,
    NodeStatus, REMOVED_MEMBER_STATE, ReplicaSetConfig, ReplicaSetStatus, Result, RoleStatus,
};

// Re-export admin interface API
pub use connection::{
    AdminClient, AdminCommand,
    config::{AdminConfig, DEFAULT_ADMIN_PORT},
    http::{AdminSession, HttpAdminClient},
    memory::{InMemoryAdminClient, InMemoryNode, SubmittedCommand},
};

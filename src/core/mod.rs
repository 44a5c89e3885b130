pub mod error;
pub mod types;

pub use error::{ControllerError, Result};
pub use types::{
    Address, CommandAck, DEFAULT_SET_NAME, MemberConfig, MemberRecord, NodeStatus,
    REMOVED_MEMBER_STATE, ReplicaSetConfig, ReplicaSetStatus, RoleStatus,
};

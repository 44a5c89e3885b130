use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;

/// Default replica set name submitted with every configuration.
pub const DEFAULT_SET_NAME: &str = "rs";

/// Member state code reported by the cluster for a removed/down member.
pub const REMOVED_MEMBER_STATE: i32 = 8;

/// A resolved network endpoint.
///
/// Ordering is lexicographic over the textual form, which is what seed
/// selection and id assignment rely on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host part suitable for embedding in a URL authority.
    pub fn url_host(&self) -> String {
        match self.0.parse::<IpAddr>() {
            Ok(IpAddr::V6(v6)) => format!("[{}]", v6),
            _ => self.0.clone(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<IpAddr> for Address {
    fn from(ip: IpAddr) -> Self {
        Self(ip.to_string())
    }
}

impl From<&str> for Address {
    fn from(addr: &str) -> Self {
        Self(addr.to_string())
    }
}

impl From<String> for Address {
    fn from(addr: String) -> Self {
        Self(addr)
    }
}

/// Role of one address at one observation instant.
///
/// Unreachable addresses are dropped by the probe and never get a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Primary,
    Secondary,
    Vacant,
}

impl From<&RoleStatus> for NodeStatus {
    fn from(role: &RoleStatus) -> Self {
        if role.is_primary {
            NodeStatus::Primary
        } else if role.is_secondary {
            NodeStatus::Secondary
        } else {
            NodeStatus::Vacant
        }
    }
}

/// Response of the role status query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleStatus {
    #[serde(rename = "isPrimaryRole")]
    pub is_primary: bool,
    #[serde(rename = "isSecondaryRole")]
    pub is_secondary: bool,
}

impl RoleStatus {
    pub fn primary() -> Self {
        Self {
            is_primary: true,
            is_secondary: false,
        }
    }

    pub fn secondary() -> Self {
        Self {
            is_primary: false,
            is_secondary: true,
        }
    }

    pub fn vacant() -> Self {
        Self::default()
    }
}

/// One row of the live member status table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: i64,
    pub host: Address,
    pub state: i32,
}

impl MemberRecord {
    pub fn new(id: i64, host: impl Into<Address>, state: i32) -> Self {
        Self {
            id,
            host: host.into(),
            state,
        }
    }

    pub fn is_removed(&self, removed_state: i32) -> bool {
        self.state == removed_state
    }

    pub fn to_config(&self) -> MemberConfig {
        MemberConfig::new(self.id, self.host.clone())
    }
}

/// Response of the member status query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSetStatus {
    #[serde(default)]
    pub members: Vec<MemberRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConfig {
    pub id: i64,
    pub host: Address,
}

impl MemberConfig {
    pub fn new(id: i64, host: impl Into<Address>) -> Self {
        Self {
            id,
            host: host.into(),
        }
    }
}

fn default_set_name() -> String {
    DEFAULT_SET_NAME.to_string()
}

/// Replica set configuration document.
///
/// Never patched in place: every change is a new document with
/// `version` bumped by one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicaSetConfig {
    #[serde(default = "default_set_name")]
    pub name: String,
    pub version: u64,
    pub members: Vec<MemberConfig>,
}

impl ReplicaSetConfig {
    /// Initial single-member configuration created at bootstrap.
    pub fn initial(name: impl Into<String>, seed: Address) -> Self {
        Self {
            name: name.into(),
            version: 1,
            members: vec![MemberConfig::new(0, seed)],
        }
    }

    pub fn member_ids(&self) -> Vec<i64> {
        self.members.iter().map(|m| m.id).collect()
    }

    pub fn hosts(&self) -> Vec<&Address> {
        self.members.iter().map(|m| &m.host).collect()
    }
}

/// Acknowledgement returned by mutating admin commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errmsg: Option<String>,
}

impl CommandAck {
    pub fn ok() -> Self {
        Self {
            ok: true,
            errmsg: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_order_lexicographically() {
        let mut addrs = vec![
            Address::new("10.0.0.9"),
            Address::new("10.0.0.10"),
            Address::new("10.0.0.1"),
        ];
        addrs.sort();
        assert_eq!(
            addrs,
            vec![
                Address::new("10.0.0.1"),
                Address::new("10.0.0.10"),
                Address::new("10.0.0.9"),
            ]
        );
    }

    #[test]
    fn ipv6_address_is_bracketed_for_urls() {
        let v6 = Address::from("::1".parse::<IpAddr>().unwrap());
        assert_eq!(v6.url_host(), "[::1]");
        assert_eq!(Address::new("10.1.2.3").url_host(), "10.1.2.3");
    }

    #[test]
    fn role_status_classification() {
        assert_eq!(NodeStatus::from(&RoleStatus::primary()), NodeStatus::Primary);
        assert_eq!(NodeStatus::from(&RoleStatus::secondary()), NodeStatus::Secondary);
        assert_eq!(NodeStatus::from(&RoleStatus::vacant()), NodeStatus::Vacant);
    }

    #[test]
    fn role_status_uses_wire_names() {
        let role: RoleStatus =
            serde_json::from_str(r#"{"isPrimaryRole": false, "isSecondaryRole": true}"#).unwrap();
        assert_eq!(role, RoleStatus::secondary());
    }

    #[test]
    fn initial_config_has_single_seed_member() {
        let config = ReplicaSetConfig::initial(DEFAULT_SET_NAME, Address::new("1.1.1.1"));
        assert_eq!(config.version, 1);
        assert_eq!(config.members, vec![MemberConfig::new(0, "1.1.1.1")]);
        assert_eq!(config.name, "rs");
    }

    #[test]
    fn command_ack_carries_error_message() {
        let ack: CommandAck =
            serde_json::from_str(r#"{"ok": false, "errmsg": "version mismatch"}"#).unwrap();
        assert!(!ack.ok);
        assert_eq!(ack.errmsg.as_deref(), Some("version mismatch"));
        assert_eq!(serde_json::to_string(&CommandAck::ok()).unwrap(), r#"{"ok":true}"#);
    }
}

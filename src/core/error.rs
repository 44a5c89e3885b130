use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    #[error("Transport error: {operation} on {addr} failed: {message}")]
    Transport {
        addr: String,
        operation: String,
        message: String,
    },

    #[error("Protocol error: {operation} on {addr} returned an invalid response: {message}")]
    Protocol {
        addr: String,
        operation: String,
        message: String,
    },

    #[error("Split brain detected! conflicting primaries {first} and {second} (all primaries: {})", .primaries.join(", "))]
    SplitBrain {
        first: String,
        second: String,
        primaries: Vec<String>,
    },

    #[error("Invalid replica set config: {0}")]
    InvalidConfig(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ControllerError {
    pub fn transport(
        addr: impl ToString,
        operation: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::Transport {
            addr: addr.to_string(),
            operation: operation.into(),
            message: message.to_string(),
        }
    }

    pub fn protocol(
        addr: impl ToString,
        operation: impl Into<String>,
        message: impl ToString,
    ) -> Self {
        Self::Protocol {
            addr: addr.to_string(),
            operation: operation.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ControllerError>;

//! Error types for the editor

use thiserror::Error;

/// Result type alias using EditorError
pub type Result<T> = std::result::Result<T, EditorError>;

/// Errors that can occur while editing a project or talking to collaborators
#[derive(Debug, Error)]
pub enum EditorError {
    /// A node id that is not part of the project
    #[error("Node not found: {0}")]
    NodeNotFound(String),

    /// A port id that does not belong to the given node
    #[error("Port '{port_id}' not found on node '{node_id}'")]
    PortNotFound { node_id: String, port_id: String },

    /// A connection id that is not part of the project
    #[error("Connection not found: {0}")]
    ConnectionNotFound(String),

    /// Endpoint has the wrong direction (source must be output, target input)
    #[error("Port '{port_id}' is not an {expected} port")]
    PortDirection { port_id: String, expected: String },

    /// Both endpoints sit on the same node
    #[error("Cannot connect node '{0}' to itself")]
    SelfConnection(String),

    /// An identical connection already exists
    #[error("Connection {source_port} -> {target_port} already exists")]
    DuplicateConnection {
        source_port: String,
        target_port: String,
    },

    /// No registered template for a node type
    #[error("Unknown node template: {0}")]
    UnknownTemplate(String),

    /// A data field that the node does not carry
    #[error("Field '{field}' not found on node '{node_id}'")]
    FieldNotFound { node_id: String, field: String },

    /// A collaborator call was requested while the previous one is in flight
    #[error("{0} already in progress")]
    Busy(&'static str),

    /// A collaborator rejected the request
    #[error("Backend error: {0}")]
    Backend(String),

    /// The background worker went away before reporting an outcome
    #[error("Background worker disconnected")]
    Disconnected,

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EditorError {
    /// Create a backend error with a message
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// Whether the error is an invalid port-connect gesture (cancelled silently)
    pub fn is_invalid_gesture(&self) -> bool {
        matches!(
            self,
            Self::PortDirection { .. } | Self::SelfConnection(_) | Self::DuplicateConnection { .. }
        )
    }
}

//! Project graph data structures and operations

use super::node::{Node, NodeId};
use super::port::{PortId, PortType};
use crate::error::{EditorError, Result};
use crate::geometry::Position;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for a connection
pub type ConnectionId = String;

/// A directed edge from an output port to an input port
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub id: ConnectionId,
    pub source_node_id: NodeId,
    pub source_port_id: PortId,
    pub target_node_id: NodeId,
    pub target_port_id: PortId,
    pub z: i32,
}

impl Connection {
    /// Whether either endpoint sits on `node_id`
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_node_id == node_id || self.target_node_id == node_id
    }

    /// Whether this connection joins exactly these endpoints
    pub fn joins(&self, endpoints: &Endpoints) -> bool {
        self.source_node_id == endpoints.source_node_id
            && self.source_port_id == endpoints.source_port_id
            && self.target_node_id == endpoints.target_node_id
            && self.target_port_id == endpoints.target_port_id
    }
}

/// The oriented endpoint tuple of a connection, without identity or layer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoints {
    pub source_node_id: NodeId,
    pub source_port_id: PortId,
    pub target_node_id: NodeId,
    pub target_port_id: PortId,
}

/// A person a project is shared with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub email: String,
    pub id: String,
}

/// The aggregate root: project metadata plus its graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub is_public: bool,
    #[serde(default)]
    pub collaborators: Vec<Collaborator>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

impl Project {
    /// Creates a new empty project
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_public: false,
            collaborators: Vec::new(),
            created_at: Utc::now(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn node(&self, node_id: &str) -> Option<&Node> {
        self.nodes.iter().find(|node| node.id == node_id)
    }

    pub fn node_mut(&mut self, node_id: &str) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|node| node.id == node_id)
    }

    pub fn connection(&self, connection_id: &str) -> Option<&Connection> {
        self.connections.iter().find(|conn| conn.id == connection_id)
    }

    /// Appends a node to the project
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Removes a node and all its connections
    pub fn remove_node(&mut self, node_id: &str) -> Option<Node> {
        let index = self.nodes.iter().position(|node| node.id == node_id)?;
        self.connections.retain(|conn| !conn.touches(node_id));
        Some(self.nodes.remove(index))
    }

    /// Removes a single connection by id
    pub fn remove_connection(&mut self, connection_id: &str) -> Option<Connection> {
        let index = self.connections.iter().position(|conn| conn.id == connection_id)?;
        Some(self.connections.remove(index))
    }

    /// Exact-tuple duplicate check
    pub fn has_connection(&self, endpoints: &Endpoints) -> bool {
        self.connections.iter().any(|conn| conn.joins(endpoints))
    }

    /// Checks that the endpoints name an existing output port and an existing
    /// input port on two different nodes, and that no identical edge exists.
    pub fn validate_endpoints(&self, endpoints: &Endpoints) -> Result<()> {
        if endpoints.source_node_id == endpoints.target_node_id {
            return Err(EditorError::SelfConnection(endpoints.source_node_id.clone()));
        }
        self.expect_port(&endpoints.source_node_id, &endpoints.source_port_id, PortType::Output)?;
        self.expect_port(&endpoints.target_node_id, &endpoints.target_port_id, PortType::Input)?;
        if self.has_connection(endpoints) {
            return Err(EditorError::DuplicateConnection {
                source_port: endpoints.source_port_id.clone(),
                target_port: endpoints.target_port_id.clone(),
            });
        }
        Ok(())
    }

    fn expect_port(&self, node_id: &str, port_id: &str, expected: PortType) -> Result<()> {
        let node = self
            .node(node_id)
            .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
        match node.port_type(port_id) {
            Some(actual) if actual == expected => Ok(()),
            Some(_) => Err(EditorError::PortDirection {
                port_id: port_id.to_string(),
                expected: expected.as_str().to_string(),
            }),
            None => Err(EditorError::PortNotFound {
                node_id: node_id.to_string(),
                port_id: port_id.to_string(),
            }),
        }
    }

    /// Validates and appends a connection
    pub fn add_connection(&mut self, connection: Connection) -> Result<()> {
        let endpoints = Endpoints {
            source_node_id: connection.source_node_id.clone(),
            source_port_id: connection.source_port_id.clone(),
            target_node_id: connection.target_node_id.clone(),
            target_port_id: connection.target_port_id.clone(),
        };
        self.validate_endpoints(&endpoints)?;
        self.connections.push(connection);
        Ok(())
    }

    /// Updates a node's position (planar and layer)
    pub fn set_node_position(&mut self, node_id: &str, position: Position) -> Result<()> {
        let node = self
            .node_mut(node_id)
            .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
        node.position = position;
        Ok(())
    }

    /// Sets the layer of every connection touching `node_id`
    pub fn set_touching_connections_z(&mut self, node_id: &str, z: i32) {
        for conn in self.connections.iter_mut().filter(|conn| conn.touches(node_id)) {
            conn.z = z;
        }
    }

    /// Highest z over nodes and connections
    pub fn max_z(&self) -> Option<i32> {
        self.nodes
            .iter()
            .map(|node| node.position.z)
            .chain(self.connections.iter().map(|conn| conn.z))
            .max()
    }

    /// Connections whose endpoints are not present in the project.
    /// They stay in the project; the board just cannot draw them.
    pub fn dangling_connections(&self) -> Vec<&Connection> {
        self.connections
            .iter()
            .filter(|conn| {
                let source_ok = self
                    .node(&conn.source_node_id)
                    .and_then(|node| node.port_of_type(&conn.source_port_id, PortType::Output))
                    .is_some();
                let target_ok = self
                    .node(&conn.target_node_id)
                    .and_then(|node| node.port_of_type(&conn.target_port_id, PortType::Input))
                    .is_some();
                !(source_ok && target_ok)
            })
            .collect()
    }
}

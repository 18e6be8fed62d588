//! Node system - project graph data model and node templates

pub mod graph;
pub mod node;
pub mod port;
pub mod template;

// Re-export core types
pub use graph::{Collaborator, Connection, ConnectionId, Endpoints, Project};
pub use node::{FieldKind, Node, NodeData, NodeId};
pub use port::{Port, PortId, PortSpec, PortType};
pub use template::{NodeComponent, NodeTemplate, TemplateRegistry};

//! Z-order controller
//!
//! Owns the project-wide layering counter. The counter starts at the highest
//! z in a freshly loaded project and only grows when a node or connection is
//! created; raising and settling a dragged node never move it.

use crate::constants::layering::{ACTIVE_CONNECTION_Z, ACTIVE_NODE_Z, INITIAL_Z};
use crate::error::{EditorError, Result};
use crate::nodes::Project;

/// Layering counter service injected into the board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZOrder {
    counter: i32,
}

impl ZOrder {
    pub fn new() -> Self {
        Self { counter: INITIAL_Z }
    }

    /// Initialise from the highest z across the project's nodes and connections
    pub fn from_project(project: &Project) -> Self {
        Self {
            counter: project.max_z().unwrap_or(INITIAL_Z),
        }
    }

    pub fn current(&self) -> i32 {
        self.counter
    }

    /// Layer for a brand-new node: the current counter, then advance
    pub fn next_node_z(&mut self) -> i32 {
        let z = self.counter;
        self.counter = self.counter.saturating_add(1);
        z
    }

    /// Layer for a brand-new connection: one above the current counter, then advance
    pub fn next_connection_z(&mut self) -> i32 {
        self.counter = self.counter.saturating_add(1);
        self.counter
    }

    /// Float a node and its wires above everything while it is active
    pub fn raise_to_front(&self, project: &mut Project, node_id: &str) -> Result<()> {
        let position = project
            .node(node_id)
            .map(|node| node.position.with_z(ACTIVE_NODE_Z))
            .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
        project.set_node_position(node_id, position)?;
        project.set_touching_connections_z(node_id, ACTIVE_CONNECTION_Z);
        Ok(())
    }

    /// Put a released node at the current counter and its wires one above
    pub fn settle(&self, project: &mut Project, node_id: &str) -> Result<()> {
        let position = project
            .node(node_id)
            .map(|node| node.position.with_z(self.counter))
            .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;
        project.set_node_position(node_id, position)?;
        project.set_touching_connections_z(node_id, self.counter.saturating_add(1));
        Ok(())
    }
}

impl Default for ZOrder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use crate::nodes::{Connection, TemplateRegistry};

    fn two_node_project() -> Project {
        let registry = TemplateRegistry::builtin();
        let mut project = Project::new("p", "demo");
        let a = registry.instantiate("textProcessor", Position::new(0.0, 0.0, 3)).unwrap();
        let b = registry.instantiate("textProcessor", Position::new(400.0, 0.0, 4)).unwrap();
        let conn = Connection {
            id: "c".into(),
            source_node_id: a.id.clone(),
            source_port_id: a.outputs[0].id.clone(),
            target_node_id: b.id.clone(),
            target_port_id: b.inputs[0].id.clone(),
            z: 5,
        };
        project.add_node(a);
        project.add_node(b);
        project.add_connection(conn).unwrap();
        project
    }

    #[test]
    fn test_from_project_uses_max_z() {
        assert_eq!(ZOrder::from_project(&Project::new("p", "empty")).current(), 1);
        assert_eq!(ZOrder::from_project(&two_node_project()).current(), 5);
    }

    #[test]
    fn test_creation_advances_by_one() {
        let mut z_order = ZOrder::new();
        assert_eq!(z_order.next_node_z(), 1);
        assert_eq!(z_order.current(), 2);
        assert_eq!(z_order.next_connection_z(), 3);
        assert_eq!(z_order.current(), 3);
    }

    #[test]
    fn test_raise_then_settle() {
        let mut project = two_node_project();
        let z_order = ZOrder::from_project(&project);
        let a = project.nodes[0].id.clone();

        z_order.raise_to_front(&mut project, &a).unwrap();
        assert_eq!(project.nodes[0].position.z, ACTIVE_NODE_Z);
        assert_eq!(project.connections[0].z, ACTIVE_CONNECTION_Z);

        z_order.settle(&mut project, &a).unwrap();
        assert_eq!(project.nodes[0].position.z, 5);
        assert_eq!(project.connections[0].z, 6);
        // Settling twice leaves the counter alone
        z_order.settle(&mut project, &a).unwrap();
        assert_eq!(z_order.current(), 5);
    }

    #[test]
    fn test_counter_saturates_on_extreme_loaded_z() {
        let mut project = two_node_project();
        project.connections[0].z = i32::MAX;
        let mut z_order = ZOrder::from_project(&project);
        assert_eq!(z_order.current(), i32::MAX);

        assert_eq!(z_order.next_connection_z(), i32::MAX);
        assert_eq!(z_order.next_node_z(), i32::MAX);
        assert_eq!(z_order.current(), i32::MAX);

        let a = project.nodes[0].id.clone();
        z_order.settle(&mut project, &a).unwrap();
        assert_eq!(project.nodes[0].position.z, i32::MAX);
        assert_eq!(project.connections[0].z, i32::MAX);
    }
}

//! Node types and core node functionality

use super::port::{Port, PortId, PortType};
use crate::error::{EditorError, Result};
use crate::geometry::Position;
use serde::{Deserialize, Serialize};

/// Unique identifier for a node
pub type NodeId = String;

/// Kind of editor a data field is edited with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    File,
    /// Any kind this editor has no field editor for; rendered as nothing
    #[serde(other)]
    Other,
}

/// A user-editable field carried by a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
    pub name: String,
    #[serde(rename = "dataType")]
    pub kind: FieldKind,
    pub value: String,
}

impl NodeData {
    pub fn text(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Text,
            value: String::new(),
        }
    }

    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::File,
            value: String::new(),
        }
    }
}

/// Core node structure representing a visual node in the graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Template type; selects the component that renders this node
    #[serde(rename = "type")]
    pub node_type: String,
    pub position: Position,
    pub inputs: Vec<Port>,
    pub outputs: Vec<Port>,
    pub data: Vec<NodeData>,
    pub title: String,
}

impl Node {
    /// Find a port on either side
    pub fn port(&self, port_id: &str) -> Option<&Port> {
        self.inputs
            .iter()
            .chain(self.outputs.iter())
            .find(|port| port.id == port_id)
    }

    /// Find a port on the given side only
    pub fn port_of_type(&self, port_id: &str, port_type: PortType) -> Option<&Port> {
        let ports = match port_type {
            PortType::Input => &self.inputs,
            PortType::Output => &self.outputs,
        };
        ports.iter().find(|port| port.id == port_id)
    }

    /// Direction of a port on this node
    pub fn port_type(&self, port_id: &str) -> Option<PortType> {
        self.port(port_id).map(|port| port.port_type)
    }

    /// All port ids, inputs first
    pub fn port_ids(&self) -> impl Iterator<Item = &PortId> {
        self.inputs.iter().chain(self.outputs.iter()).map(|port| &port.id)
    }

    /// Overwrite the value of a named field
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        match self.data.iter_mut().find(|field| field.name == name) {
            Some(field) => {
                field.value = value.into();
                Ok(())
            }
            None => Err(EditorError::FieldNotFound {
                node_id: self.id.clone(),
                field: name.to_string(),
            }),
        }
    }

    /// Read the value of a named field
    pub fn field(&self, name: &str) -> Option<&NodeData> {
        self.data.iter().find(|field| field.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::port::PortSpec;

    fn sample_node() -> Node {
        Node {
            id: "node-1".into(),
            node_type: "textProcessor".into(),
            position: Position::new(10.0, 20.0, 1),
            inputs: vec![PortSpec::new("input", "text", "Input Text").instantiate(PortType::Input)],
            outputs: vec![PortSpec::new("output", "text", "Processed Text").instantiate(PortType::Output)],
            data: vec![NodeData::text("text")],
            title: "Text Processor".into(),
        }
    }

    #[test]
    fn test_port_lookup_respects_side() {
        let node = sample_node();
        let input_id = node.inputs[0].id.clone();

        assert_eq!(node.port_type(&input_id), Some(PortType::Input));
        assert!(node.port_of_type(&input_id, PortType::Input).is_some());
        assert!(node.port_of_type(&input_id, PortType::Output).is_none());
        assert_eq!(node.port_ids().count(), 2);
    }

    #[test]
    fn test_set_field() {
        let mut node = sample_node();
        node.set_field("text", "hello").unwrap();
        assert_eq!(node.field("text").map(|f| f.value.as_str()), Some("hello"));

        let err = node.set_field("missing", "x").unwrap_err();
        assert!(matches!(err, EditorError::FieldNotFound { .. }));
    }

    #[test]
    fn test_unknown_field_kind_deserializes() {
        let field: NodeData =
            serde_json::from_str(r#"{"name":"n","dataType":"number","value":"3"}"#).unwrap();
        assert_eq!(field.kind, FieldKind::Other);
    }
}

//! Port types and functionality for node connections

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a port (unique within a project)
pub type PortId = String;

/// Type of port (input or output)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortType {
    Input,
    Output,
}

impl PortType {
    /// The direction a connection partner must have
    pub fn opposite(self) -> Self {
        match self {
            PortType::Input => PortType::Output,
            PortType::Output => PortType::Input,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PortType::Input => "input",
            PortType::Output => "output",
        }
    }
}

/// Represents a connection point on a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    #[serde(rename = "type")]
    pub port_type: PortType,
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: String,
    pub label: String,
}

impl Port {
    /// Checks if this port is an input
    pub fn is_input(&self) -> bool {
        matches!(self.port_type, PortType::Input)
    }

    /// Checks if this port is an output
    pub fn is_output(&self) -> bool {
        matches!(self.port_type, PortType::Output)
    }
}

/// Port blueprint carried by a template: everything but the id and direction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortSpec {
    pub name: String,
    #[serde(rename = "dataType")]
    pub data_type: String,
    pub label: String,
}

impl PortSpec {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            label: label.into(),
        }
    }

    /// Stamp a fresh id and a direction onto the blueprint
    pub fn instantiate(&self, port_type: PortType) -> Port {
        Port {
            id: format!("{}-{}", self.name, Uuid::new_v4()),
            port_type,
            name: self.name.clone(),
            data_type: self.data_type.clone(),
            label: self.label.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_stamps_unique_ids() {
        let spec = PortSpec::new("input", "text", "Input Text");
        let a = spec.instantiate(PortType::Input);
        let b = spec.instantiate(PortType::Input);

        assert_ne!(a.id, b.id);
        assert!(a.is_input());
        assert_eq!(a.name, "input");
        assert_eq!(a.label, "Input Text");
    }

    #[test]
    fn test_port_wire_format() {
        let port = Port {
            id: "p1".into(),
            port_type: PortType::Output,
            name: "output".into(),
            data_type: "text".into(),
            label: "Output".into(),
        };
        let json = serde_json::to_value(&port).unwrap();
        assert_eq!(json["type"], "output");
        assert_eq!(json["dataType"], "text");
        assert_eq!(PortType::Output.opposite(), PortType::Input);
    }
}

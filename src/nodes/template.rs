//! Node templates and the type → component registry

use super::node::{Node, NodeData};
use super::port::{PortSpec, PortType};
use crate::error::{EditorError, Result};
use crate::geometry::Position;
use once_cell::sync::Lazy;
use uuid::Uuid;

/// Which renderer draws nodes of a template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeComponent {
    /// Title, port columns and a field section
    Base,
}

/// Immutable blueprint for a node type
#[derive(Debug, Clone)]
pub struct NodeTemplate {
    pub node_type: String,
    pub title: String,
    pub inputs: Vec<PortSpec>,
    pub outputs: Vec<PortSpec>,
    pub data: Vec<NodeData>,
    pub component: NodeComponent,
}

impl NodeTemplate {
    /// Stamp out a node with fresh node and port ids.
    /// Field values are copied so nodes never share editable state.
    pub fn instantiate(&self, position: Position) -> Node {
        Node {
            id: format!("node-{}", Uuid::new_v4()),
            node_type: self.node_type.clone(),
            position,
            inputs: self
                .inputs
                .iter()
                .map(|spec| spec.instantiate(PortType::Input))
                .collect(),
            outputs: self
                .outputs
                .iter()
                .map(|spec| spec.instantiate(PortType::Output))
                .collect(),
            data: self.data.clone(),
            title: self.title.clone(),
        }
    }
}

/// Ordered list of templates, looked up by node type
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: Vec<NodeTemplate>,
}

impl TemplateRegistry {
    pub fn new(templates: Vec<NodeTemplate>) -> Self {
        Self { templates }
    }

    /// The built-in catalogue shown in the side panel
    pub fn builtin() -> Self {
        BUILTIN_TEMPLATES.clone()
    }

    pub fn templates(&self) -> &[NodeTemplate] {
        &self.templates
    }

    pub fn find(&self, node_type: &str) -> Option<&NodeTemplate> {
        self.templates.iter().find(|template| template.node_type == node_type)
    }

    /// Component registered for a node type, if any
    pub fn component_for(&self, node_type: &str) -> Option<NodeComponent> {
        self.find(node_type).map(|template| template.component)
    }

    pub fn instantiate(&self, node_type: &str, position: Position) -> Result<Node> {
        self.find(node_type)
            .map(|template| template.instantiate(position))
            .ok_or_else(|| EditorError::UnknownTemplate(node_type.to_string()))
    }
}

static BUILTIN_TEMPLATES: Lazy<TemplateRegistry> = Lazy::new(|| {
    TemplateRegistry::new(vec![
        NodeTemplate {
            node_type: "inputManager".into(),
            title: "Input Manager".into(),
            inputs: vec![PortSpec::new("input text", "text", "Input Text")],
            outputs: vec![
                PortSpec::new("output", "text", "Output"),
                PortSpec::new("output number", "text", "Output Number"),
            ],
            data: vec![NodeData::text("text"), NodeData::file("csv file")],
            component: NodeComponent::Base,
        },
        NodeTemplate {
            node_type: "textProcessor".into(),
            title: "Text Processor".into(),
            inputs: vec![PortSpec::new("input", "text", "Input Text")],
            outputs: vec![PortSpec::new("output", "text", "Processed Text")],
            data: vec![NodeData::text("text")],
            component: NodeComponent::Base,
        },
        NodeTemplate {
            node_type: "dataClassifier".into(),
            title: "Data Classifier".into(),
            inputs: vec![PortSpec::new("data", "data", "Input Data")],
            outputs: vec![PortSpec::new("classes", "array", "Classifications")],
            data: vec![NodeData::text("classes")],
            component: NodeComponent::Base,
        },
    ])
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_builtin_catalogue_order() {
        let registry = TemplateRegistry::builtin();
        let types: Vec<_> = registry.templates().iter().map(|t| t.node_type.as_str()).collect();
        assert_eq!(types, ["inputManager", "textProcessor", "dataClassifier"]);
        assert_eq!(registry.component_for("textProcessor"), Some(NodeComponent::Base));
        assert_eq!(registry.component_for("missing"), None);
    }

    #[test]
    fn test_instantiate_gives_distinct_ids() {
        let registry = TemplateRegistry::builtin();
        let a = registry.instantiate("inputManager", Position::new(200.0, 100.0, 1)).unwrap();
        let b = registry.instantiate("inputManager", Position::new(200.0, 100.0, 2)).unwrap();

        assert_ne!(a.id, b.id);
        let ports: HashSet<_> = a.port_ids().chain(b.port_ids()).collect();
        assert_eq!(ports.len(), 6);
        assert!(a.inputs.iter().all(|p| p.is_input()));
        assert!(a.outputs.iter().all(|p| p.is_output()));
        assert_eq!(a.data.len(), 2);
    }

    #[test]
    fn test_instantiate_unknown_type() {
        let registry = TemplateRegistry::builtin();
        let err = registry.instantiate("nope", Position::default()).unwrap_err();
        assert!(matches!(err, EditorError::UnknownTemplate(t) if t == "nope"));
    }
}

//! Node layout and the screen-rectangle registry
//!
//! The renderer records where every node and port landed on screen after
//! layout. Connection drawing and hit testing read those rectangles back every
//! frame; nothing is cached on the data model itself.

use crate::constants::node::{
    FIELD_ROW_HEIGHT, PADDING, PORT_ROW_HEIGHT, PORT_SIZE, TITLE_HEIGHT, WIDTH,
};
use crate::geometry::{resolve_port_position, Position};
use crate::nodes::{Node, NodeId, PortId, PortType, Project};
use egui::{Pos2, Rect, Vec2};
use std::collections::HashMap;

/// Node-local layout of a node's parts (origin at the node's top-left corner)
#[derive(Debug, Clone)]
pub struct NodeLayout {
    pub size: Vec2,
    pub title: Rect,
    pub ports: Vec<(PortId, PortType, Rect)>,
    pub fields: Vec<(String, Rect)>,
}

impl NodeLayout {
    pub fn compute(node: &Node) -> Self {
        let rows = node.inputs.len().max(node.outputs.len()) as f32;
        let ports_top = PADDING + TITLE_HEIGHT;
        let port_inset = (PORT_ROW_HEIGHT - PORT_SIZE) / 2.0;

        let mut ports = Vec::with_capacity(node.inputs.len() + node.outputs.len());
        for (i, port) in node.inputs.iter().enumerate() {
            let min = Pos2::new(PADDING, ports_top + i as f32 * PORT_ROW_HEIGHT + port_inset);
            ports.push((port.id.clone(), PortType::Input, Rect::from_min_size(min, Vec2::splat(PORT_SIZE))));
        }
        for (i, port) in node.outputs.iter().enumerate() {
            let min = Pos2::new(
                WIDTH - PADDING - PORT_SIZE,
                ports_top + i as f32 * PORT_ROW_HEIGHT + port_inset,
            );
            ports.push((port.id.clone(), PortType::Output, Rect::from_min_size(min, Vec2::splat(PORT_SIZE))));
        }

        let mut height = ports_top + rows * PORT_ROW_HEIGHT;
        let mut fields = Vec::with_capacity(node.data.len());
        if !node.data.is_empty() {
            // Divider gap between ports and fields
            height += PADDING / 2.0;
            for field in &node.data {
                let rect = Rect::from_min_size(
                    Pos2::new(PADDING, height),
                    Vec2::new(WIDTH - 2.0 * PADDING, FIELD_ROW_HEIGHT),
                );
                fields.push((field.name.clone(), rect));
                height += FIELD_ROW_HEIGHT;
            }
        }
        height += PADDING;

        Self {
            size: Vec2::new(WIDTH, height),
            title: Rect::from_min_size(Pos2::new(PADDING, PADDING), Vec2::new(WIDTH - 2.0 * PADDING, TITLE_HEIGHT)),
            ports,
            fields,
        }
    }
}

/// Last-known screen rectangles of the canvas, nodes and ports
#[derive(Debug, Clone, Default)]
pub struct LayoutRegistry {
    canvas: Option<Rect>,
    nodes: HashMap<NodeId, Rect>,
    ports: HashMap<(PortId, PortType), Rect>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.canvas = None;
        self.nodes.clear();
        self.ports.clear();
    }

    /// Screen rectangle of the board's rendering root
    pub fn canvas(&self) -> Option<Rect> {
        self.canvas
    }

    pub fn set_canvas(&mut self, rect: Rect) {
        self.canvas = Some(rect);
    }

    pub fn record_node(&mut self, node_id: impl Into<NodeId>, rect: Rect) {
        self.nodes.insert(node_id.into(), rect);
    }

    pub fn record_port(&mut self, port_id: impl Into<PortId>, port_type: PortType, rect: Rect) {
        self.ports.insert((port_id.into(), port_type), rect);
    }

    pub fn forget_node(&mut self, node: &Node) {
        self.nodes.remove(&node.id);
        for port in node.inputs.iter().chain(node.outputs.iter()) {
            self.ports.remove(&(port.id.clone(), port.port_type));
        }
    }

    pub fn node_rect(&self, node_id: &str) -> Option<Rect> {
        self.nodes.get(node_id).copied()
    }

    pub fn port_rect(&self, port_id: &str, port_type: PortType) -> Option<Rect> {
        self.ports.get(&(port_id.to_string(), port_type)).copied()
    }

    /// Canvas-local center of a port, or `None` when the port or the canvas
    /// has not been laid out yet
    pub fn resolve_port(&self, port_id: &str, port_type: PortType) -> Option<Position> {
        let canvas = self.canvas?;
        let port = self.port_rect(port_id, port_type)?;
        Some(resolve_port_position(port, canvas))
    }

    /// Lay out the project's rendered nodes against a canvas placed at
    /// `canvas`. Nodes rejected by `is_rendered` get no rectangles, so their
    /// ports never resolve.
    pub fn rebuild(&mut self, project: &Project, canvas: Rect, is_rendered: impl Fn(&Node) -> bool) {
        self.clear();
        self.set_canvas(canvas);
        for node in project.nodes.iter().filter(|node| is_rendered(node)) {
            self.record_layout(node, canvas.min);
        }
    }

    /// Record one node's layout with the canvas origin at `origin`
    pub fn record_layout(&mut self, node: &Node, origin: Pos2) {
        let layout = NodeLayout::compute(node);
        let node_min = origin + node.position.to_pos2().to_vec2();
        self.record_node(node.id.clone(), Rect::from_min_size(node_min, layout.size));
        for (port_id, port_type, rect) in layout.ports {
            self.record_port(port_id, port_type, rect.translate(node_min.to_vec2()));
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::TemplateRegistry;

    #[test]
    fn test_layout_places_ports_in_columns() {
        let node = TemplateRegistry::builtin()
            .instantiate("inputManager", Position::new(0.0, 0.0, 1))
            .unwrap();
        let layout = NodeLayout::compute(&node);

        assert_eq!(layout.size.x, WIDTH);
        assert_eq!(layout.ports.len(), 3);
        assert_eq!(layout.fields.len(), 2);
        for (_, port_type, rect) in &layout.ports {
            match port_type {
                PortType::Input => assert!(rect.center().x < WIDTH / 2.0),
                PortType::Output => assert!(rect.center().x > WIDTH / 2.0),
            }
        }
    }

    #[test]
    fn test_resolution_miss_before_layout() {
        let mut registry = LayoutRegistry::new();
        registry.record_port("p", PortType::Input, Rect::from_min_size(Pos2::ZERO, Vec2::splat(16.0)));
        // No canvas yet
        assert!(registry.resolve_port("p", PortType::Input).is_none());

        registry.set_canvas(Rect::from_min_size(Pos2::ZERO, Vec2::splat(100.0)));
        assert!(registry.resolve_port("p", PortType::Input).is_some());
        // Same id, other direction is a miss
        assert!(registry.resolve_port("p", PortType::Output).is_none());
    }

    #[test]
    fn test_rebuild_is_canvas_relative() {
        let mut project = Project::new("p", "demo");
        let node = TemplateRegistry::builtin()
            .instantiate("textProcessor", Position::new(50.0, 60.0, 1))
            .unwrap();
        let input = node.inputs[0].id.clone();
        project.add_node(node);

        let mut registry = LayoutRegistry::new();
        let canvas = Rect::from_min_size(Pos2::new(192.0, 30.0), Vec2::new(2000.0, 1000.0));
        registry.rebuild(&project, canvas, |_| true);

        let resolved = registry.resolve_port(&input, PortType::Input).unwrap();
        let expected_x = 50.0 + PADDING + PORT_SIZE / 2.0;
        let expected_y = 60.0 + PADDING + TITLE_HEIGHT + PORT_ROW_HEIGHT / 2.0;
        assert!((resolved.x - expected_x).abs() < 1e-3);
        assert!((resolved.y - expected_y).abs() < 1e-3);
    }
}

//! Connection geometry and creation rules
//!
//! Curves are computed in canvas-local coordinates from the layout registry
//! every frame. A connection whose ports cannot be resolved is simply left out
//! of the frame.

use crate::constants::connection::{ARROW_LENGTH, CONTROL_OFFSET, CURVE_SAMPLES, MARKER_RADIUS};
use crate::constants::layering::IN_PROGRESS_CONNECTION_Z;
use crate::editor::interaction::PortRef;
use crate::editor::layout::LayoutRegistry;
use crate::geometry::cubic_bezier_point;
use crate::nodes::{ConnectionId, Endpoints, PortType, Project};
use egui::{Pos2, Vec2};

/// Which way the arrowhead points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrowDirection {
    Right,
    Left,
}

/// Cubic curve between two port centers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionCurve {
    pub start: Pos2,
    pub end: Pos2,
    pub control_start: Pos2,
    pub control_end: Pos2,
}

impl ConnectionCurve {
    /// Control points bow outward horizontally in the direction of travel
    pub fn between(start: Pos2, end: Pos2) -> Self {
        let offset = match direction_of(start, end) {
            ArrowDirection::Right => CONTROL_OFFSET,
            ArrowDirection::Left => -CONTROL_OFFSET,
        };
        Self {
            start,
            end,
            control_start: Pos2::new(start.x + offset, start.y),
            control_end: Pos2::new(end.x - offset, end.y),
        }
    }

    pub fn direction(&self) -> ArrowDirection {
        direction_of(self.start, self.end)
    }

    pub fn point_at(&self, t: f32) -> Pos2 {
        cubic_bezier_point(t, self.start, self.control_start, self.control_end, self.end)
    }

    /// Polyline approximation used for drawing
    pub fn sample(&self) -> Vec<Pos2> {
        (0..=CURVE_SAMPLES)
            .map(|i| self.point_at(i as f32 / CURVE_SAMPLES as f32))
            .collect()
    }

    /// Anchor of the clickable marker: halfway along the chord
    pub fn midpoint(&self) -> Pos2 {
        self.start.lerp(self.end, 0.5)
    }

    pub fn marker_contains(&self, point: Pos2) -> bool {
        self.midpoint().distance(point) <= MARKER_RADIUS
    }

    /// Triangle with its tip on the end point, mirrored for leftward edges
    pub fn arrowhead(&self) -> [Pos2; 3] {
        let dir = match self.direction() {
            ArrowDirection::Right => Vec2::X,
            ArrowDirection::Left => -Vec2::X,
        };
        let base = self.end - dir * ARROW_LENGTH;
        let half = Vec2::new(0.0, ARROW_LENGTH * 0.5);
        [self.end, base + half, base - half]
    }
}

fn direction_of(start: Pos2, end: Pos2) -> ArrowDirection {
    if start.x < end.x {
        ArrowDirection::Right
    } else {
        ArrowDirection::Left
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStyle {
    Committed,
    /// Dashed, neutral colors, no marker
    InProgress,
}

/// A connection ready to paint this frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedConnection {
    /// `None` for the in-progress connection
    pub id: Option<ConnectionId>,
    pub curve: ConnectionCurve,
    pub z: i32,
    pub style: ConnectionStyle,
}

/// Resolve every committed connection, lowest layer first
pub fn plan_connections(project: &Project, layout: &LayoutRegistry) -> Vec<RenderedConnection> {
    let mut planned: Vec<_> = project
        .connections
        .iter()
        .filter_map(|conn| {
            let start = layout.resolve_port(&conn.source_port_id, PortType::Output)?;
            let end = layout.resolve_port(&conn.target_port_id, PortType::Input)?;
            Some(RenderedConnection {
                id: Some(conn.id.clone()),
                curve: ConnectionCurve::between(start.to_pos2(), end.to_pos2()),
                z: conn.z,
                style: ConnectionStyle::Committed,
            })
        })
        .collect();
    planned.sort_by_key(|conn| conn.z);
    planned
}

/// The dashed edge from the pending source to the pointer
pub fn plan_in_progress(pending: &PortRef, layout: &LayoutRegistry, cursor: Pos2) -> Option<RenderedConnection> {
    let start = layout.resolve_port(&pending.port_id, pending.port_type)?;
    Some(RenderedConnection {
        id: None,
        curve: ConnectionCurve::between(start.to_pos2(), cursor),
        z: IN_PROGRESS_CONNECTION_Z,
        style: ConnectionStyle::InProgress,
    })
}

/// Orient a port pair so the output end is the source
pub fn orient(pending: &PortRef, other: &PortRef) -> Endpoints {
    let (source, target) = match pending.port_type {
        PortType::Output => (pending, other),
        PortType::Input => (other, pending),
    };
    Endpoints {
        source_node_id: source.node_id.clone(),
        source_port_id: source.port_id.clone(),
        target_node_id: target.node_id.clone(),
        target_port_id: target.port_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;
    use crate::nodes::{Connection, TemplateRegistry};
    use egui::Rect;

    #[test]
    fn test_control_points_follow_direction() {
        let right = ConnectionCurve::between(Pos2::new(0.0, 0.0), Pos2::new(300.0, 50.0));
        assert_eq!(right.direction(), ArrowDirection::Right);
        assert_eq!(right.control_start, Pos2::new(100.0, 0.0));
        assert_eq!(right.control_end, Pos2::new(200.0, 50.0));

        let left = ConnectionCurve::between(Pos2::new(300.0, 0.0), Pos2::new(0.0, 50.0));
        assert_eq!(left.direction(), ArrowDirection::Left);
        assert_eq!(left.control_start, Pos2::new(400.0, 0.0));
        assert_eq!(left.control_end, Pos2::new(-100.0, 50.0));
        // Arrow tip sits on the end, body extends back to the right
        let head = left.arrowhead();
        assert_eq!(head[0], left.end);
        assert!(head[1].x > left.end.x);
    }

    #[test]
    fn test_midpoint_marker() {
        let curve = ConnectionCurve::between(Pos2::new(0.0, 0.0), Pos2::new(200.0, 100.0));
        assert_eq!(curve.midpoint(), Pos2::new(100.0, 50.0));
        assert!(curve.marker_contains(Pos2::new(103.0, 52.0)));
        assert!(!curve.marker_contains(Pos2::new(120.0, 50.0)));
        let samples = curve.sample();
        assert_eq!(samples.first(), Some(&curve.start));
        assert_eq!(samples.last(), Some(&curve.end));
    }

    #[test]
    fn test_orient_regardless_of_start() {
        let output = PortRef::new("a", "a-out", PortType::Output);
        let input = PortRef::new("b", "b-in", PortType::Input);
        let forward = orient(&output, &input);
        let backward = orient(&input, &output);
        assert_eq!(forward, backward);
        assert_eq!(forward.source_node_id, "a");
        assert_eq!(forward.target_port_id, "b-in");
    }

    #[test]
    fn test_plan_skips_unresolved_ports() {
        let registry = TemplateRegistry::builtin();
        let mut project = Project::new("p", "demo");
        let a = registry.instantiate("textProcessor", Position::new(0.0, 0.0, 1)).unwrap();
        let b = registry.instantiate("textProcessor", Position::new(500.0, 0.0, 2)).unwrap();
        let conn = Connection {
            id: "c1".into(),
            source_node_id: a.id.clone(),
            source_port_id: a.outputs[0].id.clone(),
            target_node_id: b.id.clone(),
            target_port_id: b.inputs[0].id.clone(),
            z: 3,
        };
        project.add_node(a.clone());
        project.add_node(b);
        project.add_connection(conn).unwrap();

        let mut layout = LayoutRegistry::new();
        layout.set_canvas(Rect::from_min_size(Pos2::ZERO, Vec2::new(2000.0, 1000.0)));
        layout.record_layout(&a, Pos2::ZERO);
        assert!(plan_connections(&project, &layout).is_empty());

        layout.rebuild(&project, Rect::from_min_size(Pos2::ZERO, Vec2::new(2000.0, 1000.0)), |_| true);
        let planned = plan_connections(&project, &layout);
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].curve.direction(), ArrowDirection::Right);
    }
}

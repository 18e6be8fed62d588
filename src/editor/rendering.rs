//! Painting of the board: grid, connections, nodes and menus

use crate::constants::board::GRID_SPACING;
use crate::constants::connection::{DASH_LENGTH, GAP_LENGTH, MARKER_RADIUS, STROKE_WIDTH};
use crate::editor::board::{NodeView, RenderPlan};
use crate::editor::connections::{ConnectionStyle, RenderedConnection};
use crate::editor::menus::{ConnectionMenu, ConnectionMenuAction, NodeMenu};
use crate::nodes::{FieldKind, NodeComponent, PortType};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke, StrokeKind, Vec2};

const SOURCE_COLOR: Color32 = Color32::from_rgb(34, 197, 94);
const TARGET_COLOR: Color32 = Color32::from_rgb(59, 130, 246);
const NEUTRAL_COLOR: Color32 = Color32::from_rgb(148, 163, 184);
const SELECTED_COLOR: Color32 = Color32::from_rgb(100, 150, 255);
const PENDING_DELETE_COLOR: Color32 = Color32::from_rgb(239, 68, 68);

/// Paints a board render plan with the CPU painter
pub struct BoardRenderer;

impl BoardRenderer {
    /// Paint one frame, back to front. `hover` highlights menu entries.
    pub fn paint(painter: &Painter, plan: &RenderPlan<'_>, hover: Option<Pos2>) {
        Self::paint_grid(painter, plan.canvas);

        // Connections and nodes share one layer order
        let mut layers: Vec<(i32, Layer<'_, '_>)> = plan
            .connections
            .iter()
            .map(|conn| (conn.z, Layer::Connection(conn)))
            .chain(plan.nodes.iter().map(|view| (view.node.position.z, Layer::Node(view))))
            .collect();
        layers.sort_by_key(|(z, _)| *z);
        for (_, layer) in layers {
            match layer {
                Layer::Connection(conn) => Self::paint_connection(painter, plan.canvas.min, conn),
                Layer::Node(view) => Self::paint_node(painter, view),
            }
        }

        if let Some(conn) = &plan.in_progress {
            Self::paint_connection(painter, plan.canvas.min, conn);
        }
        if let Some((_, bounds)) = &plan.node_menu {
            Self::paint_node_menu(painter, *bounds, hover);
        }
        if let Some((_, mid)) = &plan.connection_menu {
            Self::paint_connection_menu(painter, *mid, hover);
        }
    }

    /// White board with a dot grid
    pub fn paint_grid(painter: &Painter, canvas: Rect) {
        painter.rect_filled(canvas, 0.0, Color32::WHITE);
        let dot = Color32::from_rgb(203, 213, 225);
        let clip = painter.clip_rect().intersect(canvas);
        let first_col = ((clip.min.x - canvas.min.x) / GRID_SPACING).floor().max(0.0) as i32;
        let first_row = ((clip.min.y - canvas.min.y) / GRID_SPACING).floor().max(0.0) as i32;
        let cols = (canvas.width() / GRID_SPACING) as i32;
        let rows = (canvas.height() / GRID_SPACING) as i32;
        for col in first_col..=cols {
            let x = canvas.min.x + col as f32 * GRID_SPACING + 1.0;
            if x > clip.max.x {
                break;
            }
            for row in first_row..=rows {
                let y = canvas.min.y + row as f32 * GRID_SPACING + 1.0;
                if y > clip.max.y {
                    break;
                }
                painter.circle_filled(Pos2::new(x, y), 1.0, dot);
            }
        }
    }

    /// Gradient curve with an arrowhead; dashed and grey while in progress
    pub fn paint_connection(painter: &Painter, origin: Pos2, conn: &RenderedConnection) {
        let offset = origin.to_vec2();
        let points: Vec<Pos2> = conn.curve.sample().into_iter().map(|p| p + offset).collect();
        let arrow: Vec<Pos2> = conn.curve.arrowhead().iter().map(|p| *p + offset).collect();

        match conn.style {
            ConnectionStyle::InProgress => {
                let stroke = Stroke::new(STROKE_WIDTH, NEUTRAL_COLOR);
                painter.extend(Shape::dashed_line(&points, stroke, DASH_LENGTH, GAP_LENGTH));
                painter.add(Shape::convex_polygon(arrow, NEUTRAL_COLOR, Stroke::NONE));
            }
            ConnectionStyle::Committed => {
                // Shadow
                let shadow: Vec<Pos2> = points.iter().map(|p| *p + Vec2::splat(1.0)).collect();
                painter.add(Shape::line(
                    shadow,
                    Stroke::new(STROKE_WIDTH + 1.0, Color32::from_black_alpha(25)),
                ));

                let segments = points.len().saturating_sub(1).max(1) as f32;
                for (i, pair) in points.windows(2).enumerate() {
                    let color = lerp_color(SOURCE_COLOR, TARGET_COLOR, i as f32 / segments);
                    painter.line_segment([pair[0], pair[1]], Stroke::new(STROKE_WIDTH, color));
                }
                painter.add(Shape::convex_polygon(arrow, TARGET_COLOR, Stroke::NONE));
                painter.circle_filled(conn.curve.midpoint() + offset, MARKER_RADIUS, TARGET_COLOR);
            }
        }
    }

    /// Paint a node with the renderer registered for its type
    pub fn paint_node(painter: &Painter, view: &NodeView<'_>) {
        match view.component {
            NodeComponent::Base => Self::paint_base_node(painter, view),
        }
    }

    fn paint_base_node(painter: &Painter, view: &NodeView<'_>) {
        let rect = view.rect;
        let radius = 8.0;

        let (top, bottom) = if view.pending_delete {
            (Color32::from_rgb(254, 226, 226), Color32::from_rgb(252, 165, 165))
        } else {
            (Color32::WHITE, Color32::from_rgb(241, 245, 249))
        };
        painter.rect_filled(rect.translate(Vec2::new(0.0, 3.0)), radius, Color32::from_black_alpha(20));
        painter.rect_filled(rect, radius, bottom);
        painter.add(Shape::mesh(Self::create_simple_gradient_mesh(
            rect.shrink2(Vec2::new(0.0, radius)),
            top,
            bottom,
        )));

        let border = if view.pending_delete {
            Stroke::new(2.0, PENDING_DELETE_COLOR)
        } else if view.selected {
            Stroke::new(2.0, SELECTED_COLOR)
        } else {
            Stroke::new(1.0, Color32::from_rgb(226, 232, 240))
        };
        painter.rect_stroke(rect, radius, border, StrokeKind::Outside);

        let title = view.layout.title.translate(rect.min.to_vec2());
        painter.text(
            title.left_center(),
            Align2::LEFT_CENTER,
            &view.node.title,
            FontId::proportional(16.0),
            Color32::from_rgb(30, 41, 59),
        );

        for (port_id, port_type, port_rect) in &view.layout.ports {
            let port_rect = port_rect.translate(rect.min.to_vec2());
            let label = view
                .node
                .port(port_id)
                .map(|port| port.label.as_str())
                .unwrap_or_default();
            Self::paint_port(painter, port_rect, *port_type, label);
        }

        for (name, field_rect) in &view.layout.fields {
            let Some(field) = view.node.field(name) else {
                continue;
            };
            let field_rect = field_rect.translate(rect.min.to_vec2());
            let value = match field.kind {
                FieldKind::Text if field.value.is_empty() => "…",
                FieldKind::File if field.value.is_empty() => "No file chosen",
                FieldKind::Text | FieldKind::File => field.value.as_str(),
                FieldKind::Other => continue,
            };
            painter.text(
                field_rect.left_center(),
                Align2::LEFT_CENTER,
                format!("{}: {}", field.name, value),
                FontId::proportional(12.0),
                Color32::from_rgb(71, 85, 105),
            );
        }
    }

    /// Port handle with its label on the inner side
    pub fn paint_port(painter: &Painter, rect: Rect, port_type: PortType, label: &str) {
        let color = match port_type {
            PortType::Input => TARGET_COLOR,
            PortType::Output => SOURCE_COLOR,
        };
        let radius = rect.width() / 2.0;
        painter.circle_filled(rect.center(), radius + 2.0, Color32::WHITE);
        painter.circle_filled(rect.center(), radius, color);

        let (anchor, align) = match port_type {
            PortType::Input => (rect.right_center() + Vec2::new(8.0, 0.0), Align2::LEFT_CENTER),
            PortType::Output => (rect.left_center() - Vec2::new(8.0, 0.0), Align2::RIGHT_CENTER),
        };
        painter.text(anchor, align, label, FontId::proportional(12.0), Color32::from_rgb(71, 85, 105));
    }

    pub fn paint_node_menu(painter: &Painter, bounds: Rect, hover: Option<Pos2>) {
        Self::paint_menu_frame(painter, bounds);
        for (action, item) in NodeMenu::items_from(bounds.min) {
            if hover.is_some_and(|p| item.contains(p)) {
                painter.rect_filled(item, 0.0, Color32::from_rgb(241, 245, 249));
            }
            let color = if action.is_destructive() {
                PENDING_DELETE_COLOR
            } else {
                Color32::from_rgb(51, 65, 85)
            };
            painter.text(
                item.left_center() + Vec2::new(16.0, 0.0),
                Align2::LEFT_CENTER,
                action.label(),
                FontId::proportional(14.0),
                color,
            );
        }
    }

    pub fn paint_connection_menu(painter: &Painter, midpoint: Pos2, hover: Option<Pos2>) {
        Self::paint_menu_frame(painter, ConnectionMenu::bounds(midpoint));
        for (action, item) in ConnectionMenu::items(midpoint) {
            if hover.is_some_and(|p| item.contains(p)) {
                painter.rect_filled(item, 4.0, Color32::from_rgb(241, 245, 249));
            }
            let color = match action {
                ConnectionMenuAction::Delete => PENDING_DELETE_COLOR,
                ConnectionMenuAction::AddNode => TARGET_COLOR,
            };
            painter.text(item.center(), Align2::CENTER_CENTER, action.label(), FontId::proportional(13.0), color);
        }
    }

    fn paint_menu_frame(painter: &Painter, bounds: Rect) {
        painter.rect_filled(bounds.translate(Vec2::new(0.0, 4.0)), 8.0, Color32::from_black_alpha(30));
        painter.rect_filled(bounds, 8.0, Color32::from_white_alpha(235));
        painter.rect_stroke(bounds, 8.0, Stroke::new(1.0, Color32::from_rgb(226, 232, 240)), StrokeKind::Inside);
    }

    /// Create a simple rectangular vertical gradient mesh
    pub fn create_simple_gradient_mesh(rect: Rect, top_color: Color32, bottom_color: Color32) -> egui::Mesh {
        let mut mesh = egui::Mesh::default();
        let positions = [rect.left_top(), rect.right_top(), rect.left_bottom(), rect.right_bottom()];
        let colors = [top_color, top_color, bottom_color, bottom_color];
        for (pos, color) in positions.iter().zip(colors.iter()) {
            mesh.colored_vertex(*pos, *color);
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(1, 3, 2);
        mesh
    }
}

enum Layer<'p, 'n> {
    Connection(&'p RenderedConnection),
    Node(&'p NodeView<'n>),
}

fn lerp_color(from: Color32, to: Color32, t: f32) -> Color32 {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    Color32::from_rgb(mix(from.r(), to.r()), mix(from.g(), to.g()), mix(from.b(), to.b()))
}

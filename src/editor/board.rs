//! The board: owns the project and routes pointer input into edits
//!
//! All project mutation happens here, on the UI thread, through
//! `Arc::make_mut`. Snapshots handed to collaborators keep the state they were
//! taken with.

use crate::constants::board::SIDE_PANEL_WIDTH;
use crate::constants::node::SPAWN_POSITION;
use crate::editor::connections::{self, RenderedConnection};
use crate::editor::interaction::{DragRelease, GestureOutcome, NodeDrag, PortGestureMachine, PortRef};
use crate::editor::layering::ZOrder;
use crate::editor::layout::{LayoutRegistry, NodeLayout};
use crate::editor::menus::{ConnectionMenu, ConnectionMenuAction, NodeMenu, NodeMenuAction};
use crate::editor::session::Session;
use crate::editor::viewport::Viewport;
use crate::error::{EditorError, Result};
use crate::geometry::Position;
use crate::nodes::{Connection, ConnectionId, Node, NodeComponent, NodeId, PortType, Project, TemplateRegistry};
use egui::{PointerButton, Pos2, Rect, Vec2};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// What lies under a screen point, topmost first
#[derive(Debug, Clone, PartialEq)]
pub enum HitTarget {
    NodeMenuItem(NodeMenuAction),
    NodeMenuBody,
    ConnectionMenuItem(ConnectionMenuAction),
    ConnectionMenuBody,
    Port(PortRef),
    Node(NodeId),
    ConnectionMarker(ConnectionId),
    Canvas,
    /// Side panel or beyond the board
    Outside,
}

/// Requests the board reports upward instead of handling itself
#[derive(Debug, Clone, PartialEq)]
pub enum BoardNotice {
    /// "Add Node" on a connection's menu
    InsertNodeRequested(Connection),
}

/// A node to paint this frame
#[derive(Debug, Clone)]
pub struct NodeView<'a> {
    pub node: &'a Node,
    pub component: NodeComponent,
    pub rect: Rect,
    pub layout: NodeLayout,
    pub selected: bool,
    pub pending_delete: bool,
}

/// Everything the renderer needs for one frame, in paint order
#[derive(Debug, Clone)]
pub struct RenderPlan<'a> {
    pub canvas: Rect,
    /// Canvas-local curves, lowest layer first
    pub connections: Vec<RenderedConnection>,
    pub in_progress: Option<RenderedConnection>,
    /// Lowest layer first
    pub nodes: Vec<NodeView<'a>>,
    pub node_menu: Option<(NodeMenu, Rect)>,
    /// Open connection menu and its marker in screen space
    pub connection_menu: Option<(ConnectionMenu, Pos2)>,
}

pub struct Board {
    project: Arc<Project>,
    templates: TemplateRegistry,
    z_order: ZOrder,
    viewport: Viewport,
    layout: LayoutRegistry,
    viewport_rect: Option<Rect>,
    drag: NodeDrag,
    gesture: PortGestureMachine,
    node_menu: Option<NodeMenu>,
    connection_menu: Option<ConnectionMenu>,
    selected_node: Option<NodeId>,
    /// Canvas-local pointer position, the loose end of the in-progress edge
    cursor: Pos2,
    board_size: Vec2,
    notices: Vec<BoardNotice>,
}

impl Board {
    /// Board over a freshly loaded project; the z counter starts from it
    pub fn new(project: Project, templates: TemplateRegistry, board_size: Vec2) -> Self {
        check_loaded(&project, &templates);
        let z_order = ZOrder::from_project(&project);
        Self::with_z_order(project, templates, z_order, board_size)
    }

    /// Board with an injected layering service. The project is taken as-is.
    pub fn with_z_order(project: Project, templates: TemplateRegistry, z_order: ZOrder, board_size: Vec2) -> Self {
        Self {
            project: Arc::new(project),
            templates,
            z_order,
            viewport: Viewport::new(),
            layout: LayoutRegistry::new(),
            viewport_rect: None,
            drag: NodeDrag::new(),
            gesture: PortGestureMachine::new(),
            node_menu: None,
            connection_menu: None,
            selected_node: None,
            cursor: Pos2::ZERO,
            board_size,
            notices: Vec::new(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Cheap shared snapshot of the current project
    pub fn snapshot(&self) -> Arc<Project> {
        Arc::clone(&self.project)
    }

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn z_order(&self) -> &ZOrder {
        &self.z_order
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn layout_registry(&self) -> &LayoutRegistry {
        &self.layout
    }

    pub fn board_size(&self) -> Vec2 {
        self.board_size
    }

    pub fn selected_node(&self) -> Option<&NodeId> {
        self.selected_node.as_ref()
    }

    pub fn pending_port(&self) -> Option<&PortRef> {
        self.gesture.pending()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn is_panning(&self) -> bool {
        self.viewport.is_panning()
    }

    /// A node is being dragged over the side panel
    pub fn drag_over_sidebar(&self) -> bool {
        self.drag
            .dragged_node()
            .is_some_and(|node_id| self.drag.is_pending_delete(node_id))
    }

    pub fn node_menu(&self) -> Option<&NodeMenu> {
        self.node_menu.as_ref()
    }

    pub fn connection_menu(&self) -> Option<&ConnectionMenu> {
        self.connection_menu.as_ref()
    }

    pub fn take_notices(&mut self) -> Vec<BoardNotice> {
        std::mem::take(&mut self.notices)
    }

    /// Screen rectangle of the side panel drop zone
    pub fn sidebar_rect(&self) -> Option<Rect> {
        self.viewport_rect
            .map(|rect| Rect::from_min_size(rect.min, Vec2::new(SIDE_PANEL_WIDTH, rect.height())))
    }

    /// Swap in a loaded project: re-seed the z counter and reset all transient
    /// interaction state
    pub fn replace_project(&mut self, project: Project) {
        check_loaded(&project, &self.templates);
        self.z_order = ZOrder::from_project(&project);
        self.project = Arc::new(project);
        self.drag.cancel();
        self.gesture.reset();
        self.viewport.end_pan();
        self.node_menu = None;
        self.connection_menu = None;
        self.selected_node = None;
        self.relayout();
    }

    /// Record where the view window sits on screen and lay out the board
    pub fn layout(&mut self, viewport_rect: Rect) {
        self.viewport_rect = Some(viewport_rect);
        self.relayout();
    }

    fn relayout(&mut self) {
        let Some(viewport_rect) = self.viewport_rect else {
            return;
        };
        let canvas = self.viewport.canvas_rect(viewport_rect, self.board_size);
        let templates = &self.templates;
        self.layout
            .rebuild(&self.project, canvas, |node| templates.component_for(&node.node_type).is_some());
    }

    fn to_canvas(&self, screen: Pos2) -> Option<Pos2> {
        self.layout.canvas().map(|canvas| screen - canvas.min.to_vec2())
    }

    fn nodes_by_z_desc(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.project.nodes.iter().collect();
        nodes.sort_by_key(|node| std::cmp::Reverse(node.position.z));
        nodes
    }

    fn connection_midpoint(&self, connection_id: &str) -> Option<Pos2> {
        let conn = self.project.connection(connection_id)?;
        let canvas = self.layout.canvas()?;
        let start = self.layout.resolve_port(&conn.source_port_id, PortType::Output)?;
        let end = self.layout.resolve_port(&conn.target_port_id, PortType::Input)?;
        Some(canvas.min + start.to_pos2().lerp(end.to_pos2(), 0.5).to_vec2())
    }

    pub fn hit_test(&self, screen: Pos2) -> HitTarget {
        if let Some(menu) = &self.node_menu {
            if let Some(node_rect) = self.layout.node_rect(&menu.node_id) {
                if let Some(action) = menu.action_at(node_rect.min, screen) {
                    return HitTarget::NodeMenuItem(action);
                }
                if menu.bounds(node_rect.min).contains(screen) {
                    return HitTarget::NodeMenuBody;
                }
            }
        }
        if let Some(menu) = &self.connection_menu {
            if let Some(mid) = self.connection_midpoint(&menu.connection_id) {
                if let Some(action) = ConnectionMenu::action_at(mid, screen) {
                    return HitTarget::ConnectionMenuItem(action);
                }
                if ConnectionMenu::bounds(mid).contains(screen) {
                    return HitTarget::ConnectionMenuBody;
                }
            }
        }
        if self.sidebar_rect().is_some_and(|rect| rect.contains(screen)) {
            return HitTarget::Outside;
        }

        let node_hit = self.nodes_by_z_desc().into_iter().find_map(|node| {
            let rect = self.layout.node_rect(&node.id)?;
            for port in node.inputs.iter().chain(node.outputs.iter()) {
                if self
                    .layout
                    .port_rect(&port.id, port.port_type)
                    .is_some_and(|port_rect| port_rect.contains(screen))
                {
                    let target = HitTarget::Port(PortRef::new(node.id.clone(), port.id.clone(), port.port_type));
                    return Some((node.position.z, target));
                }
            }
            rect.contains(screen)
                .then(|| (node.position.z, HitTarget::Node(node.id.clone())))
        });

        let marker_hit = self.to_canvas(screen).and_then(|local| {
            connections::plan_connections(&self.project, &self.layout)
                .into_iter()
                .rev()
                .find(|conn| conn.curve.marker_contains(local))
                .and_then(|conn| conn.id.map(|id| (conn.z, HitTarget::ConnectionMarker(id))))
        });

        match (node_hit, marker_hit) {
            (Some((node_z, node)), Some((marker_z, marker))) => {
                if marker_z >= node_z {
                    marker
                } else {
                    node
                }
            }
            (Some((_, hit)), None) | (None, Some((_, hit))) => hit,
            (None, None) => match self.layout.canvas() {
                Some(canvas) if canvas.contains(screen) => HitTarget::Canvas,
                _ => HitTarget::Outside,
            },
        }
    }

    /// Mouse-down anywhere on the board's screen area
    pub fn pointer_down(&mut self, screen: Pos2, button: PointerButton) {
        if button == PointerButton::Secondary {
            self.context_menu(screen);
            return;
        }
        if button != PointerButton::Primary {
            return;
        }

        let target = self.hit_test(screen);
        match &target {
            HitTarget::NodeMenuItem(action) => {
                self.apply_node_menu(*action);
                return;
            }
            HitTarget::ConnectionMenuItem(action) => {
                self.apply_connection_menu(*action);
                return;
            }
            HitTarget::NodeMenuBody | HitTarget::ConnectionMenuBody => return,
            _ => {}
        }

        // Any click outside an open menu closes it
        self.node_menu = None;
        let toggled_connection = match (&target, self.connection_menu.take()) {
            (HitTarget::ConnectionMarker(id), Some(open)) => open.connection_id == *id,
            _ => false,
        };

        match target {
            HitTarget::Port(port) => self.interact_port(port),
            HitTarget::Node(node_id) => self.begin_node_drag(node_id, screen),
            HitTarget::ConnectionMarker(connection_id) => {
                if !toggled_connection {
                    self.connection_menu = Some(ConnectionMenu::new(connection_id));
                }
            }
            HitTarget::Canvas => {
                self.selected_node = None;
                self.viewport.begin_pan(screen);
            }
            _ => {}
        }
    }

    pub fn pointer_move(&mut self, screen: Pos2) {
        if let Some(local) = self.to_canvas(screen) {
            self.cursor = local;
        }

        if let Some(node_id) = self.drag.dragged_node().cloned() {
            let (Some(viewport_rect), Some(node)) = (self.viewport_rect, self.project.node(&node_id)) else {
                return;
            };
            let node_size = NodeLayout::compute(node).size;
            let current = node.position;
            let over_sidebar = self.sidebar_rect().is_some_and(|rect| rect.contains(screen));
            let pointer = self.viewport.screen_to_board(viewport_rect, screen);
            if let Some(moved) = self.drag.update(pointer, node_size, self.board_size, over_sidebar) {
                if let Err(e) = Arc::make_mut(&mut self.project)
                    .set_node_position(&node_id, current.moved_to(moved))
                {
                    log::warn!("Drag update failed: {}", e);
                }
                self.relayout();
            }
        } else if self.viewport.update_pan(screen) {
            self.relayout();
        }
    }

    /// Mouse-up: completes port gestures, ends drags and pans, and schedules
    /// the clear of any still-pending port
    pub fn pointer_up(&mut self, screen: Pos2, button: PointerButton, now: Instant) {
        if button != PointerButton::Primary {
            return;
        }
        let over_sidebar = self.sidebar_rect().is_some_and(|rect| rect.contains(screen));
        let release = self.drag.finish(over_sidebar);
        // A release that ends a node drag is not a port interaction
        if release.is_none() {
            if let HitTarget::Port(port) = self.hit_test(screen) {
                self.interact_port(port);
            }
        }

        match release {
            Some(DragRelease::Settle(node_id)) => {
                if let Err(e) = self.z_order.settle(Arc::make_mut(&mut self.project), &node_id) {
                    log::warn!("Could not settle node {}: {}", node_id, e);
                }
            }
            Some(DragRelease::DropToDelete(node_id)) => {
                if let Err(e) = self.delete_node(&node_id) {
                    log::warn!("Drop to delete failed: {}", e);
                }
            }
            None => {}
        }
        self.viewport.end_pan();
        self.gesture.schedule_clear(now);
        self.relayout();
    }

    /// Advance timers (the delayed pending-port clear)
    pub fn tick(&mut self, now: Instant) {
        if self.gesture.tick(now) {
            log::debug!("Cleared stale pending port");
        }
    }

    /// Right-click: open the node menu at the click point, or close it
    pub fn context_menu(&mut self, screen: Pos2) {
        self.connection_menu = None;
        let node_id = match self.hit_test(screen) {
            HitTarget::Node(node_id) => node_id,
            HitTarget::Port(port) => port.node_id,
            HitTarget::NodeMenuBody | HitTarget::NodeMenuItem(_) => return,
            _ => {
                self.node_menu = None;
                return;
            }
        };
        if let Some(node_rect) = self.layout.node_rect(&node_id) {
            self.node_menu = Some(NodeMenu::new(node_id, screen - node_rect.min));
        }
    }

    /// Wheel over the view window pans along one axis, clamped
    pub fn wheel(&mut self, screen: Pos2, delta_y: f32, horizontal: bool) {
        let Some(viewport_rect) = self.viewport_rect else {
            return;
        };
        if !viewport_rect.contains(screen) {
            return;
        }
        self.viewport.wheel(delta_y, horizontal, viewport_rect, self.board_size);
        self.relayout();
    }

    fn begin_node_drag(&mut self, node_id: NodeId, screen: Pos2) {
        let (Some(viewport_rect), Some(node)) = (self.viewport_rect, self.project.node(&node_id)) else {
            return;
        };
        let node_position = node.position.to_pos2();
        let pointer = self.viewport.screen_to_board(viewport_rect, screen);
        self.selected_node = Some(node_id.clone());
        if self.drag.begin(node_id.clone(), pointer, node_position) {
            if let Err(e) = self.z_order.raise_to_front(Arc::make_mut(&mut self.project), &node_id) {
                log::warn!("Could not raise node {}: {}", node_id, e);
            }
        }
    }

    fn interact_port(&mut self, port: PortRef) {
        match self.gesture.interact(port) {
            GestureOutcome::Started(_) => {}
            GestureOutcome::Cancelled(reason) => log::debug!("Port gesture cancelled: {:?}", reason),
            GestureOutcome::Candidate { pending, other } => {
                if let Err(e) = self.connect_ports(&pending, &other) {
                    if e.is_invalid_gesture() {
                        log::debug!("Connection rejected: {}", e);
                    } else {
                        log::warn!("Connection failed: {}", e);
                    }
                }
            }
        }
    }

    /// Create the oriented connection between two ports
    pub fn connect_ports(&mut self, pending: &PortRef, other: &PortRef) -> Result<ConnectionId> {
        if pending.port_type == other.port_type {
            return Err(EditorError::PortDirection {
                port_id: other.port_id.clone(),
                expected: pending.port_type.opposite().as_str().to_string(),
            });
        }
        let endpoints = connections::orient(pending, other);
        self.project.validate_endpoints(&endpoints)?;

        let connection = Connection {
            id: format!("conn-{}", Uuid::new_v4()),
            source_node_id: endpoints.source_node_id,
            source_port_id: endpoints.source_port_id,
            target_node_id: endpoints.target_node_id,
            target_port_id: endpoints.target_port_id,
            z: self.z_order.next_connection_z(),
        };
        let id = connection.id.clone();
        log::debug!("Connected {} -> {}", connection.source_port_id, connection.target_port_id);
        Arc::make_mut(&mut self.project).add_connection(connection)?;
        Ok(id)
    }

    /// Instantiate a template at the spawn point on top of everything
    pub fn add_node_from_template(&mut self, node_type: &str) -> Result<NodeId> {
        let spawn = Position::new(SPAWN_POSITION[0], SPAWN_POSITION[1], 0);
        let mut node = self.templates.instantiate(node_type, spawn)?;
        node.position.z = self.z_order.next_node_z();
        let id = node.id.clone();
        log::info!("Added {} node {}", node_type, id);
        Arc::make_mut(&mut self.project).add_node(node);
        self.relayout();
        Ok(id)
    }

    /// Delete a node and every connection touching it
    pub fn delete_node(&mut self, node_id: &str) -> Result<Node> {
        let removed = Arc::make_mut(&mut self.project)
            .remove_node(node_id)
            .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?;

        if self.selected_node.as_deref() == Some(node_id) {
            self.selected_node = None;
        }
        if self.node_menu.as_ref().is_some_and(|menu| menu.node_id == node_id) {
            self.node_menu = None;
        }
        if self.drag.dragged_node().is_some_and(|id| id == node_id) {
            self.drag.cancel();
        }
        if self.gesture.pending().is_some_and(|port| port.node_id == node_id) {
            self.gesture.reset();
        }
        if let Some(menu) = &self.connection_menu {
            if self.project.connection(&menu.connection_id).is_none() {
                self.connection_menu = None;
            }
        }
        self.layout.forget_node(&removed);
        log::info!("Deleted node {}", node_id);
        self.relayout();
        Ok(removed)
    }

    pub fn delete_connection(&mut self, connection_id: &str) -> Result<Connection> {
        let removed = Arc::make_mut(&mut self.project)
            .remove_connection(connection_id)
            .ok_or_else(|| EditorError::ConnectionNotFound(connection_id.to_string()))?;
        if self
            .connection_menu
            .as_ref()
            .is_some_and(|menu| menu.connection_id == connection_id)
        {
            self.connection_menu = None;
        }
        log::info!("Deleted connection {}", connection_id);
        Ok(removed)
    }

    /// Set a data field's value on a node
    pub fn set_field(&mut self, node_id: &str, field: &str, value: impl Into<String>) -> Result<()> {
        Arc::make_mut(&mut self.project)
            .node_mut(node_id)
            .ok_or_else(|| EditorError::NodeNotFound(node_id.to_string()))?
            .set_field(field, value)
    }

    pub fn apply_node_menu(&mut self, action: NodeMenuAction) {
        let Some(menu) = self.node_menu.take() else {
            return;
        };
        match action {
            NodeMenuAction::DeleteNode => {
                if let Err(e) = self.delete_node(&menu.node_id) {
                    log::warn!("Delete from menu failed: {}", e);
                }
            }
            other => log::info!("{} on node {}", other.label(), menu.node_id),
        }
    }

    pub fn apply_connection_menu(&mut self, action: ConnectionMenuAction) {
        let Some(menu) = self.connection_menu.take() else {
            return;
        };
        match action {
            ConnectionMenuAction::Delete => {
                if let Err(e) = self.delete_connection(&menu.connection_id) {
                    log::warn!("Delete from menu failed: {}", e);
                }
            }
            ConnectionMenuAction::AddNode => {
                if let Some(conn) = self.project.connection(&menu.connection_id) {
                    log::info!("Add node requested on connection {}", conn.id);
                    self.notices.push(BoardNotice::InsertNodeRequested(conn.clone()));
                }
            }
        }
    }

    /// Submit the current graph to the executor
    pub fn execute(&self, session: &mut Session) -> Result<()> {
        session.execute(self.snapshot())
    }

    /// Hand the current project to the store
    pub fn save(&self, session: &mut Session) -> Result<()> {
        session.save(self.snapshot())
    }

    /// Resolve everything to paint this frame. Nodes whose type has no
    /// template are left out, along with their connections.
    pub fn render_plan(&self) -> Option<RenderPlan<'_>> {
        let canvas = self.layout.canvas()?;

        let mut nodes: Vec<NodeView<'_>> = self
            .project
            .nodes
            .iter()
            .filter_map(|node| {
                let component = self.templates.component_for(&node.node_type)?;
                let rect = self.layout.node_rect(&node.id)?;
                Some(NodeView {
                    node,
                    component,
                    rect,
                    layout: NodeLayout::compute(node),
                    selected: self.selected_node.as_deref() == Some(node.id.as_str()),
                    pending_delete: self.drag.is_pending_delete(&node.id),
                })
            })
            .collect();
        nodes.sort_by_key(|view| view.node.position.z);

        let in_progress = self
            .gesture
            .pending()
            .and_then(|pending| connections::plan_in_progress(pending, &self.layout, self.cursor));

        let node_menu = self.node_menu.as_ref().and_then(|menu| {
            let node_rect = self.layout.node_rect(&menu.node_id)?;
            Some((menu.clone(), menu.bounds(node_rect.min)))
        });
        let connection_menu = self.connection_menu.as_ref().and_then(|menu| {
            let mid = self.connection_midpoint(&menu.connection_id)?;
            Some((menu.clone(), mid))
        });

        Some(RenderPlan {
            canvas,
            connections: connections::plan_connections(&self.project, &self.layout),
            in_progress,
            nodes,
            node_menu,
            connection_menu,
        })
    }
}

/// Load checks: flag edges and nodes nothing can render. The project itself
/// is left untouched.
fn check_loaded(project: &Project, templates: &TemplateRegistry) {
    let dangling = project.dangling_connections();
    if !dangling.is_empty() {
        log::warn!(
            "Project {} has {} connection(s) with missing endpoints; they will not be shown",
            project.id,
            dangling.len()
        );
    }
    for node in &project.nodes {
        if templates.component_for(&node.node_type).is_none() {
            log::warn!("No template for node type '{}' ({}); it will not be shown", node.node_type, node.id);
        }
    }
}

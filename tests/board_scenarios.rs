//! End-to-end board scenarios driven through pointer events

use egui::{PointerButton, Pos2, Rect, Vec2};
use pipeweave::editor::{LocalPipelineExecutor, LocalProjectStore, ProjectStore, SaveStatus};
use pipeweave::nodes::{NodeId, PortType};
use pipeweave::{Board, Project, Session, TemplateRegistry};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn screen() -> Rect {
    Rect::from_min_size(Pos2::ZERO, Vec2::new(1280.0, 720.0))
}

fn board() -> Board {
    let mut board = Board::new(Project::new("p1", "demo"), TemplateRegistry::builtin(), Vec2::new(2000.0, 1000.0));
    board.layout(screen());
    board
}

fn title_point(board: &Board, node_id: &str) -> Pos2 {
    board.layout_registry().node_rect(node_id).unwrap().min + Vec2::new(100.0, 10.0)
}

fn port_center(board: &Board, node_id: &str, port_type: PortType) -> Pos2 {
    let node = board.project().node(node_id).unwrap();
    let port = match port_type {
        PortType::Input => &node.inputs[0],
        PortType::Output => &node.outputs[0],
    };
    board.layout_registry().port_rect(&port.id, port_type).unwrap().center()
}

fn drag(board: &mut Board, from: Pos2, to: Pos2) {
    board.pointer_down(from, PointerButton::Primary);
    board.pointer_move(to);
    board.pointer_up(to, PointerButton::Primary, Instant::now());
}

/// Two processors, the second moved clear of the first
fn spread_pair(board: &mut Board) -> (NodeId, NodeId) {
    let a = board.add_node_from_template("textProcessor").unwrap();
    let b = board.add_node_from_template("textProcessor").unwrap();
    let grab = title_point(board, &b);
    drag(board, grab, grab + Vec2::new(500.0, 200.0));
    (a, b)
}

#[test]
fn test_wire_two_nodes_then_delete_source() {
    let mut board = board();
    let (a, b) = spread_pair(&mut board);
    let moved = board.project().node(&b).unwrap().position;
    assert_eq!((moved.x, moved.y), (700.0, 300.0));

    let a_out = port_center(&board, &a, PortType::Output);
    let b_in = port_center(&board, &b, PortType::Input);
    drag(&mut board, a_out, b_in);
    assert_eq!(board.project().connections.len(), 1);
    let conn = board.project().connections[0].clone();
    assert_eq!(conn.source_node_id, a);
    assert_eq!(conn.target_node_id, b);

    // The same gesture again does not duplicate the edge
    drag(&mut board, a_out, b_in);
    assert_eq!(board.project().connections.len(), 1);
    assert!(board.pending_port().is_none());

    // Delete A from its context menu
    let node_min = board.layout_registry().node_rect(&a).unwrap().min;
    board.pointer_down(title_point(&board, &a), PointerButton::Secondary);
    let (_, delete_item) = board.node_menu().unwrap().items(node_min).next().unwrap();
    board.pointer_down(delete_item.center(), PointerButton::Primary);

    assert!(board.project().node(&a).is_none());
    assert!(board.project().node(&b).is_some());
    assert!(board.project().connections.is_empty());
    assert!(board.node_menu().is_none());
    assert!(board.render_plan().unwrap().connections.is_empty());
}

#[test]
fn test_drop_on_side_panel_deletes() {
    let mut board = board();
    let a = board.add_node_from_template("inputManager").unwrap();
    let grab = title_point(&board, &a);

    board.pointer_down(grab, PointerButton::Primary);
    board.pointer_move(Pos2::new(80.0, 300.0));
    assert!(board.drag_over_sidebar());
    let plan = board.render_plan().unwrap();
    assert!(plan.nodes.iter().any(|view| view.node.id == a && view.pending_delete));

    board.pointer_up(Pos2::new(80.0, 300.0), PointerButton::Primary, Instant::now());
    assert!(board.project().nodes.is_empty());
    assert!(board.selected_node().is_none());
    assert!(!board.is_dragging());
}

#[test]
fn test_drag_stays_on_board() {
    let mut board = board();
    let a = board.add_node_from_template("dataClassifier").unwrap();
    let grab = title_point(&board, &a);

    drag(&mut board, grab, grab + Vec2::new(5000.0, 5000.0));
    let node = board.project().node(&a).unwrap();
    let size = board.layout_registry().node_rect(&a).unwrap().size();
    assert_eq!(node.position.x, 2000.0 - size.x);
    assert_eq!(node.position.y, 1000.0 - size.y);

    let grab = title_point(&board, &a);
    drag(&mut board, grab, grab - Vec2::new(1000.0, 5000.0));
    let node = board.project().node(&a).unwrap();
    assert_eq!(node.position.y, 0.0);
    assert!(node.position.x >= 0.0);
}

#[test]
fn test_wheel_pan_is_clamped() {
    let mut board = board();
    let inside = Pos2::new(600.0, 300.0);

    board.wheel(inside, 10_000.0, false);
    assert_eq!(board.viewport().pan_offset, Vec2::new(0.0, -480.0));
    board.wheel(inside, 10_000.0, true);
    assert_eq!(board.viewport().pan_offset, Vec2::new(-1112.0, -480.0));
    board.wheel(inside, -50_000.0, false);
    assert_eq!(board.viewport().pan_offset, Vec2::new(-1112.0, 200.0));

    // Outside the view window nothing happens
    board.wheel(Pos2::new(5000.0, 5000.0), 100.0, false);
    assert_eq!(board.viewport().pan_offset, Vec2::new(-1112.0, 200.0));
}

#[test]
fn test_every_layered_item_advances_counter() {
    let mut board = board();
    let start = board.z_order().current();
    let (a, b) = spread_pair(&mut board);
    // Two nodes advanced it; settling B after its drag does not
    assert_eq!(board.z_order().current(), start + 2);
    assert_eq!(board.project().node(&b).unwrap().position.z, start + 2);

    let a_out = port_center(&board, &a, PortType::Output);
    let b_in = port_center(&board, &b, PortType::Input);
    drag(&mut board, a_out, b_in);
    assert_eq!(board.z_order().current(), start + 3);
    assert_eq!(board.project().connections[0].z, start + 3);
}

#[test]
fn test_save_and_execute_through_local_collaborators() {
    let dir = TempDir::new().unwrap();
    let store = Arc::new(LocalProjectStore::new(dir.path()));
    let mut session = Session::new("ada", store.clone(), Arc::new(LocalPipelineExecutor));
    let mut board = board();
    let (a, b) = spread_pair(&mut board);
    let a_out = port_center(&board, &a, PortType::Output);
    let b_in = port_center(&board, &b, PortType::Input);
    drag(&mut board, a_out, b_in);

    board.save(&mut session).unwrap();
    assert!(matches!(board.save(&mut session), Err(pipeweave::EditorError::Busy(_))));
    session.wait_for_outcome(Duration::from_secs(5)).unwrap();
    assert!(matches!(session.save_status(), SaveStatus::Saved { .. }));

    let stored = store.load("ada", "p1").unwrap().unwrap();
    assert_eq!(&stored, board.project());

    board.execute(&mut session).unwrap();
    session.wait_for_outcome(Duration::from_secs(5)).unwrap();
    assert_eq!(session.execution_result(), Some("Nodes: 2, Connections: 1"));
    assert!(session.errors().is_empty());
}

#[test]
fn test_reload_keeps_dangling_connections_but_hides_them() {
    let mut board = board();
    let (a, b) = spread_pair(&mut board);
    let a_out = port_center(&board, &a, PortType::Output);
    let b_in = port_center(&board, &b, PortType::Input);
    drag(&mut board, a_out, b_in);

    let mut project = board.project().clone();
    project.nodes.retain(|node| node.id != b);
    board.replace_project(project);
    board.layout(screen());

    assert_eq!(board.project().connections.len(), 1);
    assert_eq!(board.project().nodes.len(), 1);
    assert!(board.render_plan().unwrap().connections.is_empty());

    // Saving writes the edge back unchanged
    let dir = TempDir::new().unwrap();
    let store = Arc::new(LocalProjectStore::new(dir.path()));
    let mut session = Session::new("ada", store.clone(), Arc::new(LocalPipelineExecutor));
    board.save(&mut session).unwrap();
    session.wait_for_outcome(Duration::from_secs(5)).unwrap();
    let stored = store.load("ada", "p1").unwrap().unwrap();
    assert_eq!(stored.connections, board.project().connections);
}

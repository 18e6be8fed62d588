//! Node interaction handling (dragging and port-connect gestures)

use crate::constants::timing::PENDING_PORT_CLEAR_MS;
use crate::geometry::clamp_lenient;
use crate::nodes::{NodeId, PortId, PortType};
use egui::{Pos2, Vec2};
use std::time::{Duration, Instant};

/// Drag lifecycle of a single node. Only one node can be dragged at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum DragState {
    Idle,
    Dragging {
        node_id: NodeId,
        /// Pointer minus node position at mouse-down
        offset: Vec2,
        /// Pointer currently over the side panel (drop-to-delete hint)
        over_sidebar: bool,
    },
}

/// What happens to a node when its drag ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragRelease {
    /// Commit the position and settle the node's layer
    Settle(NodeId),
    /// Released over the side panel: delete the node and its connections
    DropToDelete(NodeId),
}

/// Manages the node drag state machine
#[derive(Debug, Clone)]
pub struct NodeDrag {
    state: DragState,
}

impl NodeDrag {
    pub fn new() -> Self {
        Self { state: DragState::Idle }
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn dragged_node(&self) -> Option<&NodeId> {
        match &self.state {
            DragState::Dragging { node_id, .. } => Some(node_id),
            DragState::Idle => None,
        }
    }

    /// Whether `node_id` is being dragged over the side panel
    pub fn is_pending_delete(&self, node_id: &str) -> bool {
        matches!(&self.state, DragState::Dragging { node_id: id, over_sidebar: true, .. } if id == node_id)
    }

    /// Idle → Dragging. Returns false if another drag is already active.
    pub fn begin(&mut self, node_id: impl Into<NodeId>, pointer: Pos2, node_position: Pos2) -> bool {
        if self.is_dragging() {
            return false;
        }
        let node_id = node_id.into();
        log::debug!("Drag start: node {}", node_id);
        self.state = DragState::Dragging {
            node_id,
            offset: pointer - node_position,
            over_sidebar: false,
        };
        true
    }

    /// Computes the node's new clamped position for a pointer move
    pub fn update(&mut self, pointer: Pos2, node_size: Vec2, board_size: Vec2, over_sidebar: bool) -> Option<Pos2> {
        match &mut self.state {
            DragState::Dragging {
                offset,
                over_sidebar: hint,
                ..
            } => {
                *hint = over_sidebar;
                Some(clamp_to_board(pointer - *offset, node_size, board_size))
            }
            DragState::Idle => None,
        }
    }

    /// Dragging → Idle
    pub fn finish(&mut self, over_sidebar: bool) -> Option<DragRelease> {
        match std::mem::replace(&mut self.state, DragState::Idle) {
            DragState::Dragging { node_id, .. } => {
                log::debug!("Drag end: node {} (over side panel: {})", node_id, over_sidebar);
                if over_sidebar {
                    Some(DragRelease::DropToDelete(node_id))
                } else {
                    Some(DragRelease::Settle(node_id))
                }
            }
            DragState::Idle => None,
        }
    }

    /// Abandon a drag without releasing (e.g. the node vanished)
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

impl Default for NodeDrag {
    fn default() -> Self {
        Self::new()
    }
}

/// Keep a node of `node_size` fully inside `[0, board_size]`
pub fn clamp_to_board(position: Pos2, node_size: Vec2, board_size: Vec2) -> Pos2 {
    Pos2::new(
        clamp_lenient(position.x, 0.0, board_size.x - node_size.x),
        clamp_lenient(position.y, 0.0, board_size.y - node_size.y),
    )
}

/// A port the user interacted with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortRef {
    pub node_id: NodeId,
    pub port_id: PortId,
    pub port_type: PortType,
}

impl PortRef {
    pub fn new(node_id: impl Into<NodeId>, port_id: impl Into<PortId>, port_type: PortType) -> Self {
        Self {
            node_id: node_id.into(),
            port_id: port_id.into(),
            port_type,
        }
    }
}

/// State of the two-phase port-connect gesture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortGesture {
    NoPendingSource,
    PendingSource(PortRef),
}

/// Why a pending gesture was dropped without a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelReason {
    SameDirection,
    SameNode,
}

/// Result of a port interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The port became the pending source
    Started(PortRef),
    /// Two compatible ports; the board decides whether the edge is new
    Candidate { pending: PortRef, other: PortRef },
    Cancelled(CancelReason),
}

/// Port gesture state machine with the delayed global clear
#[derive(Debug, Clone)]
pub struct PortGestureMachine {
    state: PortGesture,
    clear_at: Option<Instant>,
}

impl PortGestureMachine {
    pub fn new() -> Self {
        Self {
            state: PortGesture::NoPendingSource,
            clear_at: None,
        }
    }

    pub fn state(&self) -> &PortGesture {
        &self.state
    }

    pub fn pending(&self) -> Option<&PortRef> {
        match &self.state {
            PortGesture::PendingSource(port) => Some(port),
            PortGesture::NoPendingSource => None,
        }
    }

    /// Mouse-down or mouse-up on a port
    pub fn interact(&mut self, port: PortRef) -> GestureOutcome {
        match std::mem::replace(&mut self.state, PortGesture::NoPendingSource) {
            PortGesture::NoPendingSource => {
                log::debug!("Port gesture started at {}:{}", port.node_id, port.port_id);
                self.state = PortGesture::PendingSource(port.clone());
                // A clear scheduled by an earlier release must not eat this gesture
                self.clear_at = None;
                GestureOutcome::Started(port)
            }
            PortGesture::PendingSource(pending) if pending.port_type == port.port_type => {
                GestureOutcome::Cancelled(CancelReason::SameDirection)
            }
            PortGesture::PendingSource(pending) if pending.node_id == port.node_id => {
                GestureOutcome::Cancelled(CancelReason::SameNode)
            }
            PortGesture::PendingSource(pending) => GestureOutcome::Candidate { pending, other: port },
        }
    }

    /// Global pointer-up: clear whatever is still pending after the grace delay
    pub fn schedule_clear(&mut self, now: Instant) {
        self.clear_at = Some(now + Duration::from_millis(PENDING_PORT_CLEAR_MS));
    }

    /// Apply a due clear. Returns true if a pending source was dropped.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.clear_at {
            Some(deadline) if now >= deadline => {
                self.clear_at = None;
                let had_pending = self.pending().is_some();
                self.state = PortGesture::NoPendingSource;
                had_pending
            }
            _ => false,
        }
    }

    pub fn reset(&mut self) {
        self.state = PortGesture::NoPendingSource;
        self.clear_at = None;
    }
}

impl Default for PortGestureMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: Vec2 = Vec2::new(2000.0, 1000.0);

    #[test]
    fn test_drag_offset_and_clamp() {
        let mut drag = NodeDrag::new();
        assert!(drag.begin("a", Pos2::new(110.0, 120.0), Pos2::new(100.0, 100.0)));
        assert!(!drag.begin("b", Pos2::ZERO, Pos2::ZERO));

        let size = Vec2::new(280.0, 200.0);
        assert_eq!(drag.update(Pos2::new(510.0, 420.0), size, BOARD, false), Some(Pos2::new(500.0, 400.0)));
        assert_eq!(drag.update(Pos2::new(-50.0, -50.0), size, BOARD, false), Some(Pos2::new(0.0, 0.0)));
        assert_eq!(drag.update(Pos2::new(5000.0, 5000.0), size, BOARD, false), Some(Pos2::new(1720.0, 800.0)));
    }

    #[test]
    fn test_drag_release_over_sidebar() {
        let mut drag = NodeDrag::new();
        drag.begin("a", Pos2::ZERO, Pos2::ZERO);
        drag.update(Pos2::new(10.0, 10.0), Vec2::splat(10.0), BOARD, true);
        assert!(drag.is_pending_delete("a"));

        assert_eq!(drag.finish(true), Some(DragRelease::DropToDelete("a".into())));
        assert!(!drag.is_dragging());
        assert_eq!(drag.finish(false), None);
    }

    #[test]
    fn test_gesture_transitions() {
        let mut gesture = PortGestureMachine::new();
        let out_a = PortRef::new("a", "a-out", PortType::Output);
        let in_a = PortRef::new("a", "a-in", PortType::Input);
        let in_b = PortRef::new("b", "b-in", PortType::Input);
        let out_b = PortRef::new("b", "b-out", PortType::Output);

        assert_eq!(gesture.interact(out_a.clone()), GestureOutcome::Started(out_a.clone()));
        assert_eq!(gesture.interact(out_b), GestureOutcome::Cancelled(CancelReason::SameDirection));
        assert!(gesture.pending().is_none());

        gesture.interact(out_a.clone());
        assert_eq!(gesture.interact(in_a), GestureOutcome::Cancelled(CancelReason::SameNode));

        gesture.interact(out_a.clone());
        assert_eq!(
            gesture.interact(in_b.clone()),
            GestureOutcome::Candidate { pending: out_a, other: in_b }
        );
        assert_eq!(gesture.state(), &PortGesture::NoPendingSource);
    }

    #[test]
    fn test_grace_delay_clear() {
        let mut gesture = PortGestureMachine::new();
        let start = Instant::now();
        gesture.interact(PortRef::new("a", "a-out", PortType::Output));
        gesture.schedule_clear(start);

        assert!(!gesture.tick(start + Duration::from_millis(50)));
        assert!(gesture.pending().is_some());
        assert!(gesture.tick(start + Duration::from_millis(PENDING_PORT_CLEAR_MS)));
        assert!(gesture.pending().is_none());
        assert!(!gesture.tick(start + Duration::from_secs(1)));
    }
}

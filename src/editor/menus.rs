//! Node and connection context menus
//!
//! Menus are painted onto the board, so their geometry lives here for both the
//! renderer and the board's hit testing.

use crate::constants::menu::{
    CONNECTION_MENU_OFFSET, CONNECTION_MENU_SIZE, NODE_MENU_ITEM_HEIGHT, NODE_MENU_PADDING, NODE_MENU_WIDTH,
};
use crate::nodes::{ConnectionId, NodeId};
use egui::{Pos2, Rect, Vec2};

/// Entries of the node context menu, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeMenuAction {
    DeleteNode,
    Action1,
    Action2,
    Action3,
}

impl NodeMenuAction {
    pub const ALL: [NodeMenuAction; 4] = [
        NodeMenuAction::DeleteNode,
        NodeMenuAction::Action1,
        NodeMenuAction::Action2,
        NodeMenuAction::Action3,
    ];

    pub fn label(self) -> &'static str {
        match self {
            NodeMenuAction::DeleteNode => "Delete Node",
            NodeMenuAction::Action1 => "Action 1",
            NodeMenuAction::Action2 => "Action 2",
            NodeMenuAction::Action3 => "Action 3",
        }
    }

    pub fn is_destructive(self) -> bool {
        matches!(self, NodeMenuAction::DeleteNode)
    }
}

/// An open node context menu
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMenu {
    pub node_id: NodeId,
    /// Click point relative to the node's top-left corner
    pub anchor: Vec2,
}

impl NodeMenu {
    pub fn new(node_id: impl Into<NodeId>, anchor: Vec2) -> Self {
        Self {
            node_id: node_id.into(),
            anchor,
        }
    }

    /// Menu rectangle for a node whose top-left corner is at `node_min`
    pub fn bounds(&self, node_min: Pos2) -> Rect {
        let height = NODE_MENU_PADDING * 2.0 + NODE_MENU_ITEM_HEIGHT * NodeMenuAction::ALL.len() as f32;
        Rect::from_min_size(node_min + self.anchor, Vec2::new(NODE_MENU_WIDTH, height))
    }

    pub fn items(&self, node_min: Pos2) -> impl Iterator<Item = (NodeMenuAction, Rect)> {
        Self::items_from(self.bounds(node_min).min)
    }

    /// Item rectangles of a node menu whose top-left corner is `menu_min`
    pub fn items_from(menu_min: Pos2) -> impl Iterator<Item = (NodeMenuAction, Rect)> {
        let top = menu_min + Vec2::new(0.0, NODE_MENU_PADDING);
        NodeMenuAction::ALL.into_iter().enumerate().map(move |(i, action)| {
            let min = top + Vec2::new(0.0, i as f32 * NODE_MENU_ITEM_HEIGHT);
            (action, Rect::from_min_size(min, Vec2::new(NODE_MENU_WIDTH, NODE_MENU_ITEM_HEIGHT)))
        })
    }

    pub fn action_at(&self, node_min: Pos2, point: Pos2) -> Option<NodeMenuAction> {
        self.items(node_min)
            .find(|(_, rect)| rect.contains(point))
            .map(|(action, _)| action)
    }
}

/// Entries of the connection menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionMenuAction {
    Delete,
    AddNode,
}

impl ConnectionMenuAction {
    pub const ALL: [ConnectionMenuAction; 2] = [ConnectionMenuAction::Delete, ConnectionMenuAction::AddNode];

    pub fn label(self) -> &'static str {
        match self {
            ConnectionMenuAction::Delete => "Delete",
            ConnectionMenuAction::AddNode => "Add Node",
        }
    }
}

/// The action menu toggled by a connection's midpoint marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionMenu {
    pub connection_id: ConnectionId,
}

impl ConnectionMenu {
    pub fn new(connection_id: impl Into<ConnectionId>) -> Self {
        Self {
            connection_id: connection_id.into(),
        }
    }

    /// Menu rectangle hanging below the marker at `midpoint`
    pub fn bounds(midpoint: Pos2) -> Rect {
        let size = Vec2::from(CONNECTION_MENU_SIZE);
        Rect::from_min_size(
            Pos2::new(midpoint.x - size.x / 2.0, midpoint.y + CONNECTION_MENU_OFFSET),
            size,
        )
    }

    pub fn items(midpoint: Pos2) -> impl Iterator<Item = (ConnectionMenuAction, Rect)> {
        let inner = Self::bounds(midpoint).shrink(NODE_MENU_PADDING);
        let row = inner.height() / ConnectionMenuAction::ALL.len() as f32;
        ConnectionMenuAction::ALL.into_iter().enumerate().map(move |(i, action)| {
            let min = inner.min + Vec2::new(0.0, i as f32 * row);
            (action, Rect::from_min_size(min, Vec2::new(inner.width(), row)))
        })
    }

    pub fn action_at(midpoint: Pos2, point: Pos2) -> Option<ConnectionMenuAction> {
        Self::items(midpoint)
            .find(|(_, rect)| rect.contains(point))
            .map(|(action, _)| action)
    }
}

//! Application-wide constants and default values
//!
//! Centralized location for all hard-coded values to improve maintainability

/// Board (canvas) sizing constants
pub mod board {
    /// Default logical board size in board pixels
    pub const DEFAULT_SIZE: [f32; 2] = [2000.0, 1000.0];

    /// Width of the fixed side panel the board sits beside
    pub const SIDE_PANEL_WIDTH: f32 = 192.0;

    /// How far wheel panning may scroll past the board's logical edges
    pub const WHEEL_PAN_PADDING: f32 = 200.0;

    /// Spacing of the background dot grid
    pub const GRID_SPACING: f32 = 40.0;
}

/// Layering (z-order) constants
pub mod layering {
    /// Counter value used when a project has no layered items yet
    pub const INITIAL_Z: i32 = 1;

    /// Z of a node while it is being dragged
    pub const ACTIVE_NODE_Z: i32 = 9999;

    /// Z of the connections touching a node while it is being dragged
    pub const ACTIVE_CONNECTION_Z: i32 = ACTIVE_NODE_Z + 1;

    /// Z of the connection currently being drawn out of a port
    pub const IN_PROGRESS_CONNECTION_Z: i32 = 9999;
}

/// Node sizing and placement constants
pub mod node {
    /// Where nodes created from the template list appear on the board
    pub const SPAWN_POSITION: [f32; 2] = [200.0, 100.0];

    /// Rendered node width
    pub const WIDTH: f32 = 280.0;

    /// Inner padding around node content
    pub const PADDING: f32 = 24.0;

    /// Height of the title row
    pub const TITLE_HEIGHT: f32 = 40.0;

    /// Height of one port row
    pub const PORT_ROW_HEIGHT: f32 = 32.0;

    /// Diameter of a port handle
    pub const PORT_SIZE: f32 = 16.0;

    /// Height of one field row in the data section
    pub const FIELD_ROW_HEIGHT: f32 = 28.0;
}

/// Connection drawing constants
pub mod connection {
    /// Horizontal distance of Bézier control points from their endpoints
    pub const CONTROL_OFFSET: f32 = 100.0;

    /// Radius of the clickable midpoint marker
    pub const MARKER_RADIUS: f32 = 6.0;

    /// Stroke width of a connection
    pub const STROKE_WIDTH: f32 = 5.0;

    /// Length of the arrowhead along the direction of travel
    pub const ARROW_LENGTH: f32 = 14.0;

    /// Dash and gap lengths of the in-progress connection
    pub const DASH_LENGTH: f32 = 5.0;
    pub const GAP_LENGTH: f32 = 5.0;

    /// Number of samples used when flattening a curve
    pub const CURVE_SAMPLES: usize = 32;
}

/// Menu sizing constants
pub mod menu {
    /// Width of the node context menu
    pub const NODE_MENU_WIDTH: f32 = 192.0;

    /// Height of one node context menu entry
    pub const NODE_MENU_ITEM_HEIGHT: f32 = 32.0;

    /// Vertical padding above and below the node context menu entries
    pub const NODE_MENU_PADDING: f32 = 8.0;

    /// Size of the connection action menu
    pub const CONNECTION_MENU_SIZE: [f32; 2] = [100.0, 80.0];

    /// Offset of the connection menu below the midpoint marker
    pub const CONNECTION_MENU_OFFSET: f32 = 10.0;
}

/// Timing constants
pub mod timing {
    /// Grace delay before a global pointer-up clears a pending port gesture
    pub const PENDING_PORT_CLEAR_MS: u64 = 100;

    /// How long save success/failure stays visible before reverting
    pub const SAVE_STATUS_MS: u64 = 2000;
}

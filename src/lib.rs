//! Pipeweave core library
//!
//! Project data model, board interaction engine and the egui shell that hosts
//! them. The binary only wires configuration and local collaborators together.

pub mod config;
pub mod constants;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod nodes;

// Re-export commonly used types
pub use config::EditorConfig;
pub use editor::{Board, NodeEditor, Session};
pub use error::{EditorError, Result};
pub use geometry::Position;
pub use nodes::{Connection, Node, Project, TemplateRegistry};

//! Node editor implementation

// Module declarations
pub mod backend;
pub mod board;
pub mod connections;
pub mod interaction;
pub mod layering;
pub mod layout;
pub mod menus;
pub mod rendering;
pub mod session;
pub mod sidebar;
pub mod viewport;

// Re-exports
pub use backend::{LocalPipelineExecutor, LocalProjectStore};
pub use board::{Board, BoardNotice, HitTarget, RenderPlan};
pub use interaction::{PortGesture, PortRef};
pub use layering::ZOrder;
pub use layout::LayoutRegistry;
pub use rendering::BoardRenderer;
pub use session::{PipelineExecutor, ProjectStore, SaveStatus, Session};
pub use sidebar::SidebarAction;
pub use viewport::Viewport;

use eframe::egui;
use egui::{Color32, MouseWheelUnit, RichText, Vec2};
use std::time::{Duration, Instant};

/// Main application state for the node editor
pub struct NodeEditor {
    board: Board,
    session: Session,
}

impl NodeEditor {
    pub fn new(board: Board, session: Session) -> Self {
        Self { board, session }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Feed this frame's raw pointer events into the board
    fn handle_input(&mut self, ctx: &egui::Context, now: Instant) {
        let (events, hover) = ctx.input(|i| (i.events.clone(), i.pointer.hover_pos()));
        // Pointer over the side panel or a floating window
        let over_ui = ctx.is_pointer_over_area();
        let page = ctx.screen_rect().height();

        for event in events {
            match event {
                egui::Event::PointerMoved(pos) => self.board.pointer_move(pos),
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed: true,
                    ..
                } if !over_ui => self.board.pointer_down(pos, button),
                // Releases are global
                egui::Event::PointerButton {
                    pos,
                    button,
                    pressed: false,
                    ..
                } => self.board.pointer_up(pos, button, now),
                egui::Event::MouseWheel { unit, delta, modifiers } if !over_ui => {
                    let Some(pos) = hover else {
                        continue;
                    };
                    let step = match unit {
                        MouseWheelUnit::Point => 1.0,
                        MouseWheelUnit::Line => 40.0,
                        MouseWheelUnit::Page => page,
                    };
                    let raw = if delta.y != 0.0 { delta.y } else { delta.x };
                    self.board.wheel(pos, -raw * step, modifiers.shift);
                }
                _ => {}
            }
        }

        for notice in self.board.take_notices() {
            match notice {
                BoardNotice::InsertNodeRequested(conn) => {
                    log::info!(
                        "Add node between {}:{} and {}:{}",
                        conn.source_node_id,
                        conn.source_port_id,
                        conn.target_node_id,
                        conn.target_port_id
                    );
                }
            }
        }
    }

    fn apply_sidebar(&mut self, actions: Vec<SidebarAction>) {
        for action in actions {
            let result = match action {
                SidebarAction::AddNode(node_type) => self.board.add_node_from_template(&node_type).map(|_| ()),
                SidebarAction::SetField { node_id, field, value } => self.board.set_field(&node_id, &field, value),
            };
            if let Err(e) = result {
                log::warn!("Side panel action failed: {}", e);
            }
        }
    }

    /// Execution summary plus the Save and Execute buttons, bottom right
    fn show_actions(&mut self, ctx: &egui::Context) {
        let errors_open = self.session.errors().visible && !self.session.errors().is_empty();
        let bottom = if errors_open { -208.0 } else { -16.0 };

        egui::Area::new(egui::Id::new("board_actions"))
            .anchor(egui::Align2::RIGHT_BOTTOM, Vec2::new(-16.0, bottom))
            .show(ctx, |ui| {
                ui.vertical(|ui| {
                    if let Some(result) = self.session.execution_result() {
                        egui::Frame::popup(ui.style()).show(ui, |ui| {
                            ui.label(result);
                        });
                    }

                    let status = self.session.save_status();
                    let fill = match status {
                        SaveStatus::Saving => Color32::GRAY,
                        SaveStatus::Saved { .. } => Color32::from_rgb(34, 197, 94),
                        SaveStatus::Failed { .. } => Color32::from_rgb(239, 68, 68),
                        SaveStatus::Idle => Color32::from_rgb(59, 130, 246),
                    };
                    let save = egui::Button::new(RichText::new(status.label()).color(Color32::WHITE))
                        .fill(fill)
                        .min_size(Vec2::new(128.0, 36.0));
                    if ui.add_enabled(!status.is_busy(), save).clicked() {
                        if let Err(e) = self.board.save(&mut self.session) {
                            log::warn!("Save not started: {}", e);
                        }
                    }

                    let execute = egui::Button::new(RichText::new("Execute").color(Color32::WHITE))
                        .fill(Color32::from_rgb(34, 197, 94))
                        .min_size(Vec2::new(128.0, 36.0));
                    if ui.add_enabled(!self.session.is_executing(), execute).clicked() {
                        if let Err(e) = self.board.execute(&mut self.session) {
                            log::warn!("Execution not started: {}", e);
                        }
                    }

                    if !self.session.errors().is_empty() && !self.session.errors().visible {
                        let label = format!("Show errors ({})", self.session.errors().entries().len());
                        if ui.button(label).clicked() {
                            self.session.errors_mut().visible = true;
                        }
                    }
                });
            });
    }

    /// Dismissible list of collaborator failures
    fn show_errors(&mut self, ctx: &egui::Context) {
        let errors = self.session.errors();
        if !errors.visible || errors.is_empty() {
            return;
        }

        let mut dismiss = None;
        let mut clear = false;
        let mut hide = false;
        egui::TopBottomPanel::bottom("error_panel")
            .exact_height(192.0)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(format!("Errors ({})", errors.entries().len())).strong());
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        hide = ui.button("Hide").clicked();
                        clear = ui.button("Clear all").clicked();
                    });
                });
                ui.separator();
                egui::ScrollArea::vertical().show(ui, |ui| {
                    for entry in errors.entries() {
                        ui.horizontal(|ui| {
                            ui.label(entry.timestamp.format("%H:%M:%S").to_string());
                            ui.colored_label(Color32::from_rgb(220, 38, 38), &entry.message);
                            if ui.small_button("✕").clicked() {
                                dismiss = Some(entry.id.clone());
                            }
                        });
                    }
                });
            });

        let errors = self.session.errors_mut();
        if let Some(id) = dismiss {
            errors.dismiss(&id);
        }
        if clear {
            errors.clear();
        }
        if hide {
            errors.visible = false;
        }
    }
}

impl eframe::App for NodeEditor {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.session.poll(now);
        self.board.tick(now);

        // The board spans the whole window; panels paint over it afterwards
        self.board.layout(ctx.screen_rect());
        self.handle_input(ctx, now);
        if let Some(plan) = self.board.render_plan() {
            let painter = ctx.layer_painter(egui::LayerId::background());
            BoardRenderer::paint(&painter, &plan, ctx.pointer_hover_pos());
        }

        let selected = self
            .board
            .selected_node()
            .and_then(|node_id| self.board.project().node(node_id));
        let actions = sidebar::show(ctx, self.board.templates(), selected, self.board.drag_over_sidebar());
        self.apply_sidebar(actions);

        self.show_errors(ctx);
        self.show_actions(ctx);

        let animating = self.board.pending_port().is_some()
            || self.session.is_executing()
            || self.session.save_status() != SaveStatus::Idle;
        if animating {
            ctx.request_repaint_after(Duration::from_millis(50));
        }
    }
}

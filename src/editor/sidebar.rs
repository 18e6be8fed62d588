//! Side panel: template catalogue, drop-to-delete zone and field editors

use crate::constants::board::SIDE_PANEL_WIDTH;
use crate::nodes::{FieldKind, Node, NodeId, TemplateRegistry};
use egui::{Color32, RichText};

/// Something the user asked for in the side panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarAction {
    AddNode(String),
    SetField {
        node_id: NodeId,
        field: String,
        value: String,
    },
}

/// Show the side panel and collect the user's requests
pub fn show(
    ctx: &egui::Context,
    templates: &TemplateRegistry,
    selected: Option<&Node>,
    drop_hint: bool,
) -> Vec<SidebarAction> {
    let mut actions = Vec::new();

    egui::SidePanel::left("sidebar")
        .exact_width(SIDE_PANEL_WIDTH)
        .resizable(false)
        .show(ctx, |ui| {
            ui.add_space(8.0);
            ui.heading("Nodes");
            ui.separator();

            for template in templates.templates() {
                let button = egui::Button::new(&template.title).min_size(egui::vec2(ui.available_width(), 28.0));
                if ui.add(button).clicked() {
                    actions.push(SidebarAction::AddNode(template.node_type.clone()));
                }
            }

            ui.add_space(12.0);
            let hint_color = if drop_hint {
                Color32::from_rgb(239, 68, 68)
            } else {
                Color32::GRAY
            };
            egui::Frame::group(ui.style()).show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Drag nodes here to delete").color(hint_color));
            });

            if let Some(node) = selected {
                ui.add_space(12.0);
                ui.separator();
                ui.label(RichText::new(&node.title).strong());
                field_editors(ui, node, &mut actions);
            }
        });

    actions
}

fn field_editors(ui: &mut egui::Ui, node: &Node, actions: &mut Vec<SidebarAction>) {
    for field in &node.data {
        match field.kind {
            FieldKind::Text => {
                ui.label(&field.name);
                let mut value = field.value.clone();
                if ui.text_edit_singleline(&mut value).changed() {
                    actions.push(SidebarAction::SetField {
                        node_id: node.id.clone(),
                        field: field.name.clone(),
                        value,
                    });
                }
            }
            FieldKind::File => {
                ui.label(&field.name);
                ui.horizontal(|ui| {
                    if ui.button("Choose file").clicked() {
                        if let Some(path) = rfd::FileDialog::new().pick_file() {
                            let file_name = path
                                .file_name()
                                .and_then(|name| name.to_str())
                                .unwrap_or_default()
                                .to_string();
                            actions.push(SidebarAction::SetField {
                                node_id: node.id.clone(),
                                field: field.name.clone(),
                                value: file_name,
                            });
                        }
                    }
                    if field.value.is_empty() {
                        ui.weak("No file chosen");
                    } else {
                        ui.label(&field.value);
                    }
                });
            }
            FieldKind::Other => {}
        }
    }
}

//! Pipeweave - visual pipeline editor
//!
//! Usage: `pipeweave [PROJECT_ID]`. Without an id, or when the id is unknown,
//! a fresh "Untitled" project is created in the local store.

use eframe::egui;
use pipeweave::editor::{LocalPipelineExecutor, LocalProjectStore, ProjectStore};
use pipeweave::{Board, EditorConfig, NodeEditor, Project, Session, TemplateRegistry};
use std::sync::Arc;

fn open_project(store: &LocalProjectStore, user_id: &str, project_id: Option<&str>) -> pipeweave::Result<Project> {
    if let Some(project_id) = project_id {
        match store.load(user_id, project_id)? {
            Some(project) => {
                log::info!("Opened project '{}' ({})", project.name, project.id);
                return Ok(project);
            }
            None => log::warn!("Project {} not found, starting a new one", project_id),
        }
    }

    let created = store.create(user_id, "Untitled", &[], false)?;
    store
        .load(user_id, &created.project_id)?
        .ok_or_else(|| pipeweave::EditorError::backend(format!("Created project {} vanished", created.project_id)))
}

fn main() -> Result<(), eframe::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = EditorConfig::load();
    let store = LocalProjectStore::new(config.data_dir.clone());
    let project_id = std::env::args().nth(1);

    let project = match open_project(&store, &config.user_id, project_id.as_deref()) {
        Ok(project) => project,
        Err(e) => {
            log::error!("Could not open a project in {}: {}", store.root().display(), e);
            std::process::exit(1);
        }
    };

    let board = Board::new(project, TemplateRegistry::builtin(), config.board_size());
    let session = Session::new(config.user_id.clone(), Arc::new(store), Arc::new(LocalPipelineExecutor));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size(config.window_size),
        ..Default::default()
    };

    eframe::run_native(
        "Pipeweave",
        options,
        Box::new(|_cc| Ok(Box::new(NodeEditor::new(board, session)))),
    )
}

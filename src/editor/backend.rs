//! Local collaborators used by the desktop binary
//!
//! Projects are stored as pretty-printed JSON, one file per project, under
//! `<root>/<user_id>/<project_id>.json`.

use crate::editor::session::{CreatedProject, ExecutionCounts, ExecutionSummary, PipelineExecutor, ProjectStore};
use crate::error::{EditorError, Result};
use crate::nodes::{Collaborator, Connection, Node, Project};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// File-backed project store
#[derive(Debug, Clone)]
pub struct LocalProjectStore {
    root: PathBuf,
}

impl LocalProjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn user_dir(&self, user_id: &str) -> PathBuf {
        self.root.join(user_id)
    }

    fn project_path(&self, user_id: &str, project_id: &str) -> PathBuf {
        self.user_dir(user_id).join(format!("{}.json", project_id))
    }
}

impl ProjectStore for LocalProjectStore {
    fn persist(&self, user_id: &str, project: &Project) -> Result<()> {
        std::fs::create_dir_all(self.user_dir(user_id))?;
        let json_content = serde_json::to_string_pretty(project)?;
        std::fs::write(self.project_path(user_id, &project.id), json_content)?;
        log::debug!("Wrote project {} for user {}", project.id, user_id);
        Ok(())
    }

    fn load(&self, user_id: &str, project_id: &str) -> Result<Option<Project>> {
        let path = self.project_path(user_id, project_id);
        if !path.exists() {
            return Ok(None);
        }
        let file_content = std::fs::read_to_string(&path)?;
        let project = serde_json::from_str(&file_content)?;
        Ok(Some(project))
    }

    fn create(
        &self,
        user_id: &str,
        name: &str,
        collaborators: &[Collaborator],
        is_public: bool,
    ) -> Result<CreatedProject> {
        let mut project = Project::new(Uuid::new_v4().to_string(), name);
        project.is_public = is_public;
        project.collaborators = collaborators.to_vec();
        self.persist(user_id, &project)?;
        log::info!("Created project '{}' ({})", name, project.id);
        Ok(CreatedProject { project_id: project.id })
    }

    fn list(&self, user_id: &str) -> Result<Vec<String>> {
        let dir = self.user_dir(user_id);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

/// Reports what would run: the node and connection counts of the graph.
/// Refuses graphs with edges pointing at missing nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPipelineExecutor;

impl PipelineExecutor for LocalPipelineExecutor {
    fn execute(&self, nodes: &[Node], connections: &[Connection]) -> Result<ExecutionSummary> {
        for conn in connections {
            for node_id in [&conn.source_node_id, &conn.target_node_id] {
                if !nodes.iter().any(|node| &node.id == node_id) {
                    return Err(EditorError::backend(format!(
                        "connection {} references missing node {}",
                        conn.id, node_id
                    )));
                }
            }
        }
        Ok(ExecutionSummary {
            counts: ExecutionCounts {
                nodes: nodes.len(),
                connections: connections.len(),
            },
        })
    }
}

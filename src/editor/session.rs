//! Collaborator calls (save / execute) and their user-visible status
//!
//! Calls run on a worker thread and hand their outcome back over a channel.
//! `Session::poll` applies outcomes on the UI thread, so the project is only
//! ever touched by its single owner.

use crate::constants::timing::SAVE_STATUS_MS;
use crate::error::{EditorError, Result};
use crate::nodes::{Collaborator, Connection, Node, Project};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Per-graph counts reported by an execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionCounts {
    pub nodes: usize,
    pub connections: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionSummary {
    pub counts: ExecutionCounts,
}

impl ExecutionSummary {
    pub fn describe(&self) -> String {
        format!("Nodes: {}, Connections: {}", self.counts.nodes, self.counts.connections)
    }
}

/// Result of creating a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedProject {
    pub project_id: String,
}

/// Runs a submitted graph
pub trait PipelineExecutor: Send + Sync {
    fn execute(&self, nodes: &[Node], connections: &[Connection]) -> Result<ExecutionSummary>;
}

/// Creates, loads and stores projects for a user
pub trait ProjectStore: Send + Sync {
    fn persist(&self, user_id: &str, project: &Project) -> Result<()>;

    /// `Ok(None)` means the project does not exist
    fn load(&self, user_id: &str, project_id: &str) -> Result<Option<Project>>;

    fn create(
        &self,
        user_id: &str,
        name: &str,
        collaborators: &[Collaborator],
        is_public: bool,
    ) -> Result<CreatedProject>;

    /// Ids of the user's stored projects
    fn list(&self, user_id: &str) -> Result<Vec<String>>;
}

/// Save button state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Idle,
    Saving,
    Saved { until: Instant },
    Failed { until: Instant },
}

impl SaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SaveStatus::Idle => "Save",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved { .. } => "Saved!",
            SaveStatus::Failed { .. } => "Failed!",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, SaveStatus::Saving)
    }

    /// Revert a shown outcome to neutral once its time is up
    fn expire(&mut self, now: Instant) {
        match *self {
            SaveStatus::Saved { until } | SaveStatus::Failed { until } if now >= until => {
                *self = SaveStatus::Idle;
            }
            _ => {}
        }
    }
}

/// A dismissible collaborator failure
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorEntry {
    pub id: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// The error list shown in the error panel
#[derive(Debug, Clone)]
pub struct ErrorLog {
    entries: Vec<ErrorEntry>,
    pub visible: bool,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            visible: true,
        }
    }

    pub fn push(&mut self, message: impl Into<String>) -> String {
        let entry = ErrorEntry {
            id: Uuid::new_v4().to_string(),
            message: message.into(),
            timestamp: Utc::now(),
        };
        let id = entry.id.clone();
        self.entries.push(entry);
        id
    }

    pub fn dismiss(&mut self, id: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for ErrorLog {
    fn default() -> Self {
        Self::new()
    }
}

enum Outcome {
    Saved(Result<()>),
    Executed(Result<ExecutionSummary>),
}

/// Owns the collaborators and the in-flight call bookkeeping
pub struct Session {
    user_id: String,
    store: Arc<dyn ProjectStore>,
    executor: Arc<dyn PipelineExecutor>,
    outcome_tx: Sender<Outcome>,
    outcome_rx: Receiver<Outcome>,
    save_status: SaveStatus,
    executing: bool,
    execution_result: Option<String>,
    errors: ErrorLog,
}

impl Session {
    pub fn new(user_id: impl Into<String>, store: Arc<dyn ProjectStore>, executor: Arc<dyn PipelineExecutor>) -> Self {
        let (outcome_tx, outcome_rx) = channel();
        Self {
            user_id: user_id.into(),
            store,
            executor,
            outcome_tx,
            outcome_rx,
            save_status: SaveStatus::Idle,
            executing: false,
            execution_result: None,
            errors: ErrorLog::new(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn store(&self) -> &Arc<dyn ProjectStore> {
        &self.store
    }

    pub fn save_status(&self) -> SaveStatus {
        self.save_status
    }

    pub fn is_executing(&self) -> bool {
        self.executing
    }

    /// Last execution summary text, if any
    pub fn execution_result(&self) -> Option<&str> {
        self.execution_result.as_deref()
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorLog {
        &mut self.errors
    }

    /// Hand a snapshot of the project to the store
    pub fn save(&mut self, project: Arc<Project>) -> Result<()> {
        if self.save_status.is_busy() {
            return Err(EditorError::Busy("save"));
        }
        let store = Arc::clone(&self.store);
        let user_id = self.user_id.clone();
        let tx = self.outcome_tx.clone();
        thread::Builder::new().name("pipeweave-save".into()).spawn(move || {
            let result = store.persist(&user_id, &project);
            let _ = tx.send(Outcome::Saved(result));
        })?;
        self.save_status = SaveStatus::Saving;
        log::info!("Saving project");
        Ok(())
    }

    /// Hand a snapshot of the graph to the executor
    pub fn execute(&mut self, project: Arc<Project>) -> Result<()> {
        if self.executing {
            return Err(EditorError::Busy("execute"));
        }
        let executor = Arc::clone(&self.executor);
        let tx = self.outcome_tx.clone();
        thread::Builder::new().name("pipeweave-execute".into()).spawn(move || {
            let result = executor.execute(&project.nodes, &project.connections);
            let _ = tx.send(Outcome::Executed(result));
        })?;
        self.executing = true;
        log::info!("Executing pipeline");
        Ok(())
    }

    /// Apply finished calls and expire the save status. Returns how many
    /// outcomes were applied.
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut applied = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply(outcome, now);
            applied += 1;
        }
        self.save_status.expire(now);
        applied
    }

    /// Block until one outcome arrives or `timeout` passes
    pub fn wait_for_outcome(&mut self, timeout: Duration) -> Result<()> {
        match self.outcome_rx.recv_timeout(timeout) {
            Ok(outcome) => {
                self.apply(outcome, Instant::now());
                Ok(())
            }
            Err(RecvTimeoutError::Timeout) => Err(EditorError::backend("timed out waiting for collaborator")),
            Err(RecvTimeoutError::Disconnected) => Err(EditorError::Disconnected),
        }
    }

    fn apply(&mut self, outcome: Outcome, now: Instant) {
        let until = now + Duration::from_millis(SAVE_STATUS_MS);
        match outcome {
            Outcome::Saved(Ok(())) => {
                log::info!("Project saved");
                self.save_status = SaveStatus::Saved { until };
            }
            Outcome::Saved(Err(e)) => {
                log::error!("Failed to save project: {}", e);
                self.save_status = SaveStatus::Failed { until };
                self.errors.push("Failed to save project");
            }
            Outcome::Executed(Ok(summary)) => {
                log::info!("Pipeline executed: {}", summary.describe());
                self.executing = false;
                self.execution_result = Some(summary.describe());
            }
            Outcome::Executed(Err(e)) => {
                log::error!("Pipeline execution failed: {}", e);
                self.executing = false;
                self.execution_result = Some("Execution failed".to_string());
                self.errors.push("Pipeline execution failed");
            }
        }
    }
}

//! Workspace persistence.
//!
//! The persistence collaborator contract (`Persistence`) plus the bundled
//! file-backed implementation: one JSON document holding tasks, the
//! employee roster, and the activity feed, guarded by a sibling lock file
//! and written atomically.
//!
//! Callers apply mutations to the in-memory context first and persist
//! afterwards (optimistic apply); on a failed write the recommended
//! recovery is reloading the document to resync, not retrying.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::activity::ActivityEntry;
use crate::employee::{Employee, Role};
use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};
use crate::task::{Comment, Task, TaskId};
use crate::workspace::EVERYTHING_SPACE;

pub const WORKSPACE_SCHEMA_VERSION: &str = "taskflow.workspace.v1";

/// The on-disk workspace document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceDoc {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub employees: Vec<Employee>,
    /// Activity entries, newest first, already capped.
    #[serde(default)]
    pub activity: Vec<ActivityEntry>,
}

impl WorkspaceDoc {
    pub fn empty() -> Self {
        Self {
            schema_version: WORKSPACE_SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            tasks: Vec::new(),
            employees: Vec::new(),
            activity: Vec::new(),
        }
    }
}

/// Default roster seeded by `taskflow init`. The first member is the
/// workspace admin.
pub fn default_roster() -> Vec<Employee> {
    let member = |id: &str, name: &str, seed: &str, role: Role| Employee {
        id: id.to_string(),
        name: name.to_string(),
        avatar_url: format!("https://picsum.photos/seed/{seed}/40/40"),
        role,
    };
    vec![
        member("emp-1", "Alice Johnson", "alice", Role::Admin),
        member("emp-2", "Bob Williams", "bob", Role::User),
        member("emp-3", "Charlie Brown", "charlie", Role::User),
        member("emp-4", "Diana Miller", "diana", Role::User),
    ]
}

/// Persistence collaborator contract. One call per mutation; no atomicity
/// is assumed across calls.
pub trait Persistence {
    fn list(&self, space: Option<&str>) -> Result<Vec<Task>>;
    fn upsert(&self, task: &Task) -> Result<Task>;
    fn delete(&self, id: TaskId) -> Result<()>;
    fn add_comment(&self, task_id: TaskId, author_id: &str, content: &str) -> Result<Comment>;
}

/// File-backed store: one JSON document, flock + atomic rename per write.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
    lock_timeout_ms: u64,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Load the workspace document. A missing file yields an empty document.
    pub fn load(&self) -> Result<WorkspaceDoc> {
        if !self.path.exists() {
            return Ok(WorkspaceDoc::empty());
        }
        let raw = lock::read_locked(&self.path, self.lock_timeout_ms)?;
        let doc = serde_json::from_slice(&raw)?;
        Ok(doc)
    }

    /// Persist the full document, restamping `generated_at`.
    pub fn save(&self, doc: &WorkspaceDoc) -> Result<()> {
        let mut doc = doc.clone();
        doc.generated_at = Utc::now();
        let raw = serde_json::to_vec_pretty(&doc)?;
        lock::write_atomic_locked(&self.path, &raw, self.lock_timeout_ms)
    }

    /// Create a fresh workspace file with the default roster. Refuses to
    /// overwrite an existing one.
    pub fn init(&self) -> Result<WorkspaceDoc> {
        if self.exists() {
            return Err(Error::OperationFailed(format!(
                "workspace already initialized at {}",
                self.path.display()
            )));
        }
        let mut doc = WorkspaceDoc::empty();
        doc.employees = default_roster();
        self.save(&doc)?;
        Ok(doc)
    }

    fn modify<T>(&self, apply: impl FnOnce(&mut WorkspaceDoc) -> Result<T>) -> Result<T> {
        let mut doc = self.load()?;
        let out = apply(&mut doc)?;
        self.save(&doc)?;
        Ok(out)
    }
}

impl Persistence for JsonStore {
    fn list(&self, space: Option<&str>) -> Result<Vec<Task>> {
        let doc = self.load()?;
        let mut tasks = doc.tasks;
        if let Some(space) = space {
            if space != EVERYTHING_SPACE {
                tasks.retain(|task| task.tags.iter().any(|tag| tag.eq_ignore_ascii_case(space)));
            }
        }
        Ok(tasks)
    }

    fn upsert(&self, task: &Task) -> Result<Task> {
        let task = task.clone();
        self.modify(|doc| {
            match doc.tasks.iter_mut().find(|existing| existing.id == task.id) {
                Some(existing) => *existing = task.clone(),
                None => doc.tasks.push(task.clone()),
            }
            Ok(task.clone())
        })
    }

    fn delete(&self, id: TaskId) -> Result<()> {
        // Deleting an already-deleted task is a no-op, not an error.
        self.modify(|doc| {
            doc.tasks.retain(|task| task.id != id);
            Ok(())
        })
    }

    fn add_comment(&self, task_id: TaskId, author_id: &str, content: &str) -> Result<Comment> {
        self.modify(|doc| {
            let task = doc
                .tasks
                .iter_mut()
                .find(|task| task.id == task_id)
                .ok_or(Error::TaskNotFound(task_id))?;
            let comment = Comment::new(author_id, content, Utc::now());
            task.comments.push(comment.clone());
            Ok(comment)
        })
    }
}

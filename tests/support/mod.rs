// Not every test binary uses every helper.
#![allow(dead_code)]

use std::path::{Path, PathBuf};

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use taskflow::employee::{Employee, Role};
use taskflow::store::{JsonStore, WorkspaceDoc};
use taskflow::task::Task;

/// A temporary workspace directory seeded with a roster.
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn data_path(&self) -> PathBuf {
        self.dir.path().join(".taskflow").join("workspace.json")
    }

    pub fn store(&self) -> JsonStore {
        JsonStore::new(self.data_path())
    }

    /// Seed the workspace document with the given tasks and the standard
    /// test roster (Alice is admin, Bob is a regular user).
    pub fn seed(&self, tasks: Vec<Task>) -> WorkspaceDoc {
        let mut doc = WorkspaceDoc::empty();
        doc.employees = roster();
        doc.tasks = tasks;
        self.store().save(&doc).expect("seed workspace");
        doc
    }

    pub fn load(&self) -> WorkspaceDoc {
        self.store().load().expect("load workspace")
    }
}

pub fn roster() -> Vec<Employee> {
    vec![
        Employee {
            id: "emp-1".to_string(),
            name: "Alice Johnson".to_string(),
            avatar_url: "https://example.com/alice.png".to_string(),
            role: Role::Admin,
        },
        Employee {
            id: "emp-2".to_string(),
            name: "Bob Williams".to_string(),
            avatar_url: "https://example.com/bob.png".to_string(),
            role: Role::User,
        },
    ]
}

pub fn task_at(id: i64, title: &str, secs: i64) -> Task {
    Task::new(id, title, Utc.timestamp_opt(secs, 0).unwrap())
}

pub fn taskflow_cmd(workspace: &TestWorkspace) -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("taskflow").expect("binary");
    cmd.current_dir(workspace.path());
    cmd.env("TASKFLOW_ACTOR", "emp-1");
    cmd
}

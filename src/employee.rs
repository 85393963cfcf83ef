//! Employee roster and actor identity.
//!
//! Actor resolution order:
//! 1) CLI --actor (explicit)
//! 2) TASKFLOW_ACTOR environment variable
//! 3) Persisted workspace value in .taskflow/actor
//! 4) Config default (actor.default)
//!
//! The resolved string is matched against the roster by employee id or
//! (case-insensitive) display name.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};

const ACTOR_FILENAME: &str = "actor";
const DATA_DIR: &str = ".taskflow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A workspace member. `name` and `avatar_url` are the live profile values;
/// activity entries copy them at write time rather than referencing them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}

/// The acting user for a batch of engine operations, as produced by the
/// identity collaborator.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub employee_id: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn from_employee(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id.clone(),
            role: employee.role,
        }
    }
}

/// Resolve the current actor string using CLI, environment, persisted value,
/// and config, in that order.
pub fn resolve_actor(workspace_root: Option<&Path>, cli_actor: Option<&str>) -> Result<String> {
    if let Some(actor) = non_empty(cli_actor) {
        return Ok(actor.to_string());
    }

    if let Ok(env_actor) = std::env::var("TASKFLOW_ACTOR") {
        if let Some(actor) = non_empty(Some(env_actor.as_str())) {
            return Ok(actor.to_string());
        }
    }

    if let Some(root) = workspace_root {
        if let Some(actor) = load_persisted_actor(root)? {
            return Ok(actor);
        }

        let config = Config::load_from_dir(root);
        return Ok(config.actor.default);
    }

    Ok("unknown".to_string())
}

/// Persist the actor identity in `.taskflow/actor`.
pub fn persist_actor(workspace_root: &Path, actor: &str) -> Result<()> {
    let actor = non_empty(Some(actor))
        .ok_or_else(|| Error::InvalidArgument("actor name cannot be empty".to_string()))?;

    let data_dir = workspace_root.join(DATA_DIR);
    std::fs::create_dir_all(&data_dir)?;
    let path = actor_path(workspace_root);
    std::fs::write(path, format!("{actor}\n"))?;
    Ok(())
}

/// Load the actor identity from `.taskflow/actor`, if present.
pub fn load_persisted_actor(workspace_root: &Path) -> Result<Option<String>> {
    let path = actor_path(workspace_root);
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path)?;
    let actor = raw.trim();
    if actor.is_empty() {
        return Ok(None);
    }

    Ok(Some(actor.to_string()))
}

/// Match an actor string against the roster by id or display name.
pub fn find_employee<'a>(roster: &'a [Employee], actor: &str) -> Option<&'a Employee> {
    let trimmed = actor.trim();
    roster
        .iter()
        .find(|employee| employee.id == trimmed)
        .or_else(|| {
            roster
                .iter()
                .find(|employee| employee.name.eq_ignore_ascii_case(trimmed))
        })
}

fn actor_path(workspace_root: &Path) -> PathBuf {
    workspace_root.join(DATA_DIR).join(ACTOR_FILENAME)
}

fn non_empty(input: Option<&str>) -> Option<&str> {
    input.and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Vec<Employee> {
        vec![
            Employee {
                id: "emp-1".to_string(),
                name: "Alice Johnson".to_string(),
                avatar_url: String::new(),
                role: Role::Admin,
            },
            Employee {
                id: "emp-2".to_string(),
                name: "Bob Williams".to_string(),
                avatar_url: String::new(),
                role: Role::User,
            },
        ]
    }

    #[test]
    fn finds_by_id_then_name() {
        let roster = roster();
        assert_eq!(find_employee(&roster, "emp-2").unwrap().name, "Bob Williams");
        assert_eq!(find_employee(&roster, "alice johnson").unwrap().id, "emp-1");
        assert!(find_employee(&roster, "nobody").is_none());
    }

    #[test]
    fn persisted_actor_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        persist_actor(dir.path(), "emp-1").expect("persist");
        let loaded = load_persisted_actor(dir.path()).expect("load");
        assert_eq!(loaded.as_deref(), Some("emp-1"));
    }

    #[test]
    fn empty_actor_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(persist_actor(dir.path(), "   ").is_err());
    }
}

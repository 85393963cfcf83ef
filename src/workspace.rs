//! Workspace context.
//!
//! The original application kept tasks, the employee roster, and the active
//! space as ambient UI state shared across call sites. Here they form one
//! explicit value object passed into every engine operation.

use chrono::{DateTime, Utc};

use crate::employee::Employee;
use crate::task::{Task, TaskId};

/// The space name that means "no space filter".
pub const EVERYTHING_SPACE: &str = "Everything";

#[derive(Debug, Clone, Default)]
pub struct WorkspaceContext {
    pub tasks: Vec<Task>,
    pub employees: Vec<Employee>,
    /// Active space; tags double as spaces. `Everything` selects all tasks.
    pub active_space: String,
}

impl WorkspaceContext {
    pub fn new(tasks: Vec<Task>, employees: Vec<Employee>, active_space: impl Into<String>) -> Self {
        Self {
            tasks,
            employees,
            active_space: active_space.into(),
        }
    }

    pub fn find_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn find_task_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|task| task.id == id)
    }

    pub fn find_employee(&self, employee_id: &str) -> Option<&Employee> {
        self.employees
            .iter()
            .find(|employee| employee.id == employee_id)
    }

    /// Whether the active space restricts the visible task set.
    pub fn space_scoped(&self) -> bool {
        !self.active_space.is_empty() && self.active_space != EVERYTHING_SPACE
    }

    /// Tags seeded onto a newly created task: the active space, when one is
    /// selected.
    pub fn seed_tags(&self) -> Vec<String> {
        if self.space_scoped() {
            vec![self.active_space.clone()]
        } else {
            Vec::new()
        }
    }

    /// Allocate a fresh task id from the wall clock, bumping past any
    /// existing id minted in the same millisecond.
    pub fn next_task_id(&self, now: DateTime<Utc>) -> TaskId {
        let mut candidate = now.timestamp_millis();
        while self.tasks.iter().any(|task| task.id == candidate) {
            candidate += 1;
        }
        candidate
    }

    /// Distinct tags across all tasks, in first-seen order. Drives the space
    /// sidebar.
    pub fn known_spaces(&self) -> Vec<String> {
        let mut spaces: Vec<String> = Vec::new();
        for task in &self.tasks {
            for tag in &task.tags {
                if !spaces.iter().any(|known| known.eq_ignore_ascii_case(tag)) {
                    spaces.push(tag.clone());
                }
            }
        }
        spaces
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn next_id_skips_collisions() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let base = now.timestamp_millis();
        let mut ctx = WorkspaceContext::default();
        ctx.tasks.push(Task::new(base, "a", now));
        ctx.tasks.push(Task::new(base + 1, "b", now));
        assert_eq!(ctx.next_task_id(now), base + 2);
    }

    #[test]
    fn seed_tags_follow_active_space() {
        let mut ctx = WorkspaceContext::default();
        ctx.active_space = EVERYTHING_SPACE.to_string();
        assert!(ctx.seed_tags().is_empty());
        ctx.active_space = "Marketing".to_string();
        assert_eq!(ctx.seed_tags(), vec!["Marketing".to_string()]);
    }

    #[test]
    fn known_spaces_dedupe_case_insensitively() {
        let now = Utc.timestamp_opt(0, 0).unwrap();
        let mut ctx = WorkspaceContext::default();
        let mut a = Task::new(1, "a", now);
        a.tags = vec!["Design".to_string(), "backend".to_string()];
        let mut b = Task::new(2, "b", now);
        b.tags = vec!["design".to_string()];
        ctx.tasks = vec![a, b];
        assert_eq!(ctx.known_spaces(), vec!["Design".to_string(), "backend".to_string()]);
    }
}

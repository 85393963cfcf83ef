//! Task data model.
//!
//! Defines the central `Task` record plus its owned satellites (subtasks,
//! time logs, comments) and the derived read-side computations (overdue,
//! logged time, subtask progress). All mutation lives in `engine`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// Task identifier: millisecond timestamp at creation. Monotonic-ish,
/// collision risk accepted for a single-workspace tracker.
pub type TaskId = i64;

/// Id prefix for subtasks typed in by a user.
pub const SUBTASK_MANUAL_PREFIX: &str = "manual";
/// Id prefix for AI-generated subtasks, kept distinct to avoid id collisions
/// with manual entries created in the same millisecond.
pub const SUBTASK_GENERATED_PREFIX: &str = "ai";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Display label as shown on the board columns.
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("todo") || trimmed.eq_ignore_ascii_case("to do") {
            Some(TaskStatus::Todo)
        } else if trimmed.eq_ignore_ascii_case("in_progress")
            || trimmed.eq_ignore_ascii_case("in progress")
            || trimmed.eq_ignore_ascii_case("in-progress")
        {
            Some(TaskStatus::InProgress)
        } else if trimmed.eq_ignore_ascii_case("done") {
            Some(TaskStatus::Done)
        } else {
            None
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Urgent => "Urgent",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One checklist item on a task. Deletion is by id; list order is the only
/// ordering guarantee.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub is_completed: bool,
}

impl Subtask {
    pub fn manual(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}-{}", SUBTASK_MANUAL_PREFIX, now.timestamp_millis()),
            title: title.into(),
            is_completed: false,
        }
    }

    pub fn generated(title: impl Into<String>, now: DateTime<Utc>, index: usize) -> Self {
        Self {
            id: format!(
                "{}-{}-{}",
                SUBTASK_GENERATED_PREFIX,
                now.timestamp_millis(),
                index
            ),
            title: title.into(),
            is_completed: false,
        }
    }
}

/// A closed stopwatch interval. Immutable once created; only ever produced
/// by stopping a running timer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeLogEntry {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub duration_ms: i64,
}

impl TimeLogEntry {
    pub fn close(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            start,
            end,
            duration_ms: (end - start).num_milliseconds(),
        }
    }
}

/// Append-only task comment. The engine never edits or deletes these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub author_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Comment {
    pub fn new(author_id: impl Into<String>, content: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            author_id: author_id.into(),
            content: content.into(),
            timestamp: now,
        }
    }
}

/// The central task record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub priority: Priority,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Closed intervals, newest first.
    #[serde(default)]
    pub time_logs: Vec<TimeLogEntry>,
    /// Non-null while a stopwatch is running. At most one open timer per task.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_start: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    /// Stamped when the task transitions into `Done`. Deliberately preserved
    /// when the task later leaves `Done` (last-completed-at semantics).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// The single blocker, if any. A task with a blocker is locked for
    /// board movement until the blocker resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<TaskId>,
}

impl Task {
    /// Build a fresh task with empty collections and `Todo` status.
    pub fn new(id: TaskId, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            description: String::new(),
            assignee_id: None,
            due_date: None,
            status: TaskStatus::Todo,
            priority: Priority::Medium,
            comments: Vec::new(),
            subtasks: Vec::new(),
            tags: Vec::new(),
            time_logs: Vec::new(),
            timer_start: None,
            created_at: now,
            completed_at: None,
            blocked_by: None,
        }
    }

    /// A task with a blocker is locked: calling surfaces must not offer it
    /// as draggable. Enforcement is advisory at the call site.
    pub fn is_locked(&self) -> bool {
        self.blocked_by.is_some()
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.due_date {
            Some(due) => due < today && self.status != TaskStatus::Done,
            None => false,
        }
    }

    /// Sum of all closed intervals plus the in-flight elapsed time if a
    /// timer is running. Pure read-side computation, never stored.
    pub fn total_logged_ms(&self, now: DateTime<Utc>) -> i64 {
        let closed: i64 = self.time_logs.iter().map(|log| log.duration_ms).sum();
        closed + self.elapsed_running_ms(now).unwrap_or(0)
    }

    /// Elapsed time of the currently running timer, if any.
    pub fn elapsed_running_ms(&self, now: DateTime<Utc>) -> Option<i64> {
        self.timer_start.map(|start| (now - start).num_milliseconds())
    }

    /// `(completed, total)` subtask counts for progress display.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let total = self.subtasks.len();
        let completed = self
            .subtasks
            .iter()
            .filter(|subtask| subtask.is_completed)
            .count();
        (completed, total)
    }

    /// Completion ratio in `[0.0, 1.0]`; 0 when there are no subtasks.
    pub fn subtask_ratio(&self) -> f64 {
        let (completed, total) = self.subtask_progress();
        if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64
        }
    }
}

/// Fields accepted by the save operation (manual form submit). `None`
/// collections mean "leave unchanged" on update and "empty" on create.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub blocked_by: Option<TaskId>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// A draft produced by the batch-creation collaborator. The engine assigns
/// the id, default status/priority, and empty collections on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// Render a millisecond duration as a compact `XhYm` / `XmYs` string for
/// activity messages and CLI display.
pub fn humanize_ms(ms: i64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn status_labels_round_trip() {
        for status in [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done] {
            assert_eq!(TaskStatus::parse(status.label()), Some(status));
        }
        assert_eq!(TaskStatus::parse("in-progress"), Some(TaskStatus::InProgress));
        assert_eq!(TaskStatus::parse("archived"), None);
    }

    #[test]
    fn overdue_requires_open_status() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 15).unwrap();
        let mut task = Task::new(1, "t", at(0));
        task.due_date = NaiveDate::from_ymd_opt(2025, 6, 10);
        assert!(task.is_overdue(today));
        task.status = TaskStatus::Done;
        assert!(!task.is_overdue(today));
    }

    #[test]
    fn subtask_ratio_handles_empty_list() {
        let mut task = Task::new(1, "t", at(0));
        assert_eq!(task.subtask_ratio(), 0.0);
        task.subtasks.push(Subtask::manual("a", at(1)));
        task.subtasks.push(Subtask::manual("b", at(2)));
        task.subtasks.push(Subtask::manual("c", at(3)));
        task.subtasks[0].is_completed = true;
        assert_eq!(task.subtask_progress(), (1, 3));
        assert!((task.subtask_ratio() - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn total_logged_includes_running_timer() {
        let mut task = Task::new(1, "t", at(0));
        task.time_logs.push(TimeLogEntry::close(at(0), at(60)));
        assert_eq!(task.total_logged_ms(at(100)), 60_000);
        task.timer_start = Some(at(90));
        assert_eq!(task.total_logged_ms(at(100)), 70_000);
        assert_eq!(task.elapsed_running_ms(at(100)), Some(10_000));
    }

    #[test]
    fn humanize_picks_largest_unit() {
        assert_eq!(humanize_ms(12_000), "12s");
        assert_eq!(humanize_ms(125_000), "2m 5s");
        assert_eq!(humanize_ms(3_725_000), "1h 2m");
    }
}

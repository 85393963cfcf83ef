//! Task lifecycle engine.
//!
//! All task mutation flows through `Engine`: status transitions with the
//! dependency unblock cascade, the per-task stopwatch, subtask checklists,
//! save/delete/comment, and AI batch insertion. Each successful mutation
//! writes into the workspace context and records a line in the activity
//! feed; nothing here calls back up into a UI.
//!
//! Not-found ids are silent no-ops by policy: the calling surface has
//! usually re-rendered past the stale id already, so there is nothing
//! actionable to report.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::activity::ActivityLog;
use crate::dependency;
use crate::employee::CurrentUser;
use crate::error::{Error, Result};
use crate::task::{Comment, Priority, Subtask, Task, TaskDraft, TaskId, TaskInput, TaskStatus};
use crate::workspace::WorkspaceContext;

/// Outcome of a `toggle_timer` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    Started,
    /// Timer stopped; carries the duration of the new time log entry.
    Logged { duration_ms: i64 },
}

pub struct Engine {
    ctx: WorkspaceContext,
    activity: ActivityLog,
    user: CurrentUser,
}

impl Engine {
    pub fn new(ctx: WorkspaceContext, activity: ActivityLog, user: CurrentUser) -> Self {
        Self {
            ctx,
            activity,
            user,
        }
    }

    pub fn ctx(&self) -> &WorkspaceContext {
        &self.ctx
    }

    pub fn activity(&self) -> &ActivityLog {
        &self.activity
    }

    pub fn user(&self) -> &CurrentUser {
        &self.user
    }

    /// Tear down into the context and activity log for persistence.
    pub fn into_parts(self) -> (WorkspaceContext, ActivityLog) {
        (self.ctx, self.activity)
    }

    /// Record an activity message attributed to the current user. If the
    /// acting employee is no longer in the roster the entry is silently
    /// skipped; activity is best-effort, never an error.
    fn log(&mut self, message: String, now: DateTime<Utc>) {
        match self.ctx.find_employee(&self.user.employee_id) {
            Some(employee) => {
                let actor = employee.clone();
                self.activity.record(&actor, message, now);
            }
            None => {
                debug!(
                    employee = %self.user.employee_id,
                    "actor not in roster, skipping activity entry"
                );
            }
        }
    }

    /// Apply a status change to one task.
    ///
    /// No-op when the id does not resolve or the status is unchanged.
    /// Transitioning into `Done` stamps `completed_at`; leaving `Done`
    /// preserves the prior stamp. The unblock cascade runs against the
    /// pre-write task list, before the status write commits.
    pub fn set_status(&mut self, id: TaskId, new_status: TaskStatus, now: DateTime<Utc>) -> bool {
        let (title, completed_at) = match self.ctx.find_task(id) {
            Some(task) if task.status != new_status => {
                let completed_at = if new_status == TaskStatus::Done {
                    Some(now)
                } else {
                    task.completed_at
                };
                (task.title.clone(), completed_at)
            }
            _ => return false,
        };

        let freed = dependency::unblock_dependents(&mut self.ctx.tasks, id);
        if !freed.is_empty() {
            debug!(task = id, dependents = freed.len(), "unblocked dependents");
        }

        if let Some(task) = self.ctx.find_task_mut(id) {
            task.status = new_status;
            task.completed_at = completed_at;
        }

        debug!(task = id, status = %new_status, "status changed");
        self.log(format!("moved \"{title}\" to {new_status}"), now);
        true
    }

    /// Start or stop the stopwatch on a task. Stopping converts the open
    /// interval into exactly one immutable time log entry. Unknown ids are
    /// a no-op.
    pub fn toggle_timer(&mut self, id: TaskId, now: DateTime<Utc>) -> Option<TimerAction> {
        let task = self.ctx.find_task_mut(id)?;
        let title = task.title.clone();

        let action = match task.timer_start.take() {
            Some(start) => {
                let entry = crate::task::TimeLogEntry::close(start, now);
                let duration_ms = entry.duration_ms;
                task.time_logs.insert(0, entry);
                TimerAction::Logged { duration_ms }
            }
            None => {
                task.timer_start = Some(now);
                TimerAction::Started
            }
        };

        match action {
            TimerAction::Started => {
                debug!(task = id, "timer started");
                self.log(format!("started timer on \"{title}\""), now);
            }
            TimerAction::Logged { duration_ms } => {
                debug!(task = id, duration_ms, "time logged");
                self.log(format!("logged time on \"{title}\""), now);
            }
        }
        Some(action)
    }

    /// Append a user-authored subtask. Unknown task ids are a no-op.
    pub fn add_subtask(&mut self, id: TaskId, title: &str, now: DateTime<Utc>) -> bool {
        let title = title.trim();
        if title.is_empty() {
            return false;
        }
        match self.ctx.find_task_mut(id) {
            Some(task) => {
                task.subtasks.push(Subtask::manual(title, now));
                true
            }
            None => false,
        }
    }

    /// Append AI-generated subtasks. Identical to manual entries apart from
    /// the distinct id prefix. Returns the number appended.
    pub fn add_generated_subtasks(
        &mut self,
        id: TaskId,
        titles: &[String],
        now: DateTime<Utc>,
    ) -> usize {
        match self.ctx.find_task_mut(id) {
            Some(task) => {
                let mut added = 0;
                for (index, title) in titles.iter().enumerate() {
                    let title = title.trim();
                    if title.is_empty() {
                        continue;
                    }
                    task.subtasks.push(Subtask::generated(title, now, index));
                    added += 1;
                }
                added
            }
            None => 0,
        }
    }

    /// Flip a subtask's completion flag. Never touches the parent task's
    /// status, even when the last open subtask completes.
    pub fn toggle_subtask(&mut self, id: TaskId, subtask_id: &str) -> bool {
        let Some(task) = self.ctx.find_task_mut(id) else {
            return false;
        };
        match task
            .subtasks
            .iter_mut()
            .find(|subtask| subtask.id == subtask_id)
        {
            Some(subtask) => {
                subtask.is_completed = !subtask.is_completed;
                true
            }
            None => false,
        }
    }

    /// Remove a subtask by id. Unknown task or subtask ids are a no-op.
    pub fn remove_subtask(&mut self, id: TaskId, subtask_id: &str) -> bool {
        let Some(task) = self.ctx.find_task_mut(id) else {
            return false;
        };
        let before = task.subtasks.len();
        task.subtasks.retain(|subtask| subtask.id != subtask_id);
        task.subtasks.len() != before
    }

    /// Create or update a task from form input. `existing` selects update
    /// mode; the collections owned by the task (comments, subtasks, time
    /// logs) are never replaced by a save.
    pub fn save_task(
        &mut self,
        input: TaskInput,
        existing: Option<TaskId>,
        now: DateTime<Utc>,
    ) -> Result<TaskId> {
        if input.title.trim().is_empty() {
            return Err(Error::InvalidArgument("task title cannot be empty".to_string()));
        }

        match existing {
            Some(id) => {
                if self.ctx.find_task(id).is_none() {
                    return Err(Error::TaskNotFound(id));
                }
                if let Some(blocker) = input.blocked_by {
                    dependency::validate_blocker(&self.ctx.tasks, id, blocker)?;
                }
                let task = self
                    .ctx
                    .find_task_mut(id)
                    .ok_or(Error::TaskNotFound(id))?;
                task.title = input.title.trim().to_string();
                task.description = input.description;
                task.assignee_id = input.assignee_id;
                task.due_date = input.due_date;
                if let Some(priority) = input.priority {
                    task.priority = priority;
                }
                task.blocked_by = input.blocked_by;
                if let Some(tags) = input.tags {
                    task.tags = tags;
                }
                let title = task.title.clone();
                debug!(task = id, "task updated");
                self.log(format!("updated \"{title}\""), now);
                Ok(id)
            }
            None => {
                let id = self.ctx.next_task_id(now);
                if let Some(blocker) = input.blocked_by {
                    dependency::validate_blocker(&self.ctx.tasks, id, blocker)?;
                }
                let mut task = Task::new(id, input.title.trim(), now);
                task.description = input.description;
                task.assignee_id = input.assignee_id;
                task.due_date = input.due_date;
                task.priority = input.priority.unwrap_or(Priority::Medium);
                task.blocked_by = input.blocked_by;
                task.tags = input.tags.unwrap_or_else(|| self.ctx.seed_tags());
                let title = task.title.clone();
                self.ctx.tasks.push(task);
                debug!(task = id, "task created");
                self.log(format!("created \"{title}\""), now);
                Ok(id)
            }
        }
    }

    /// Delete a task and everything it owns. Admin-only; the permission
    /// gate runs before any mutation. A missing id after the gate passes is
    /// a silent no-op.
    pub fn delete_task(&mut self, id: TaskId, now: DateTime<Utc>) -> Result<bool> {
        if !self.user.role.is_admin() {
            return Err(Error::PermissionDenied(
                "only admins can delete tasks".to_string(),
            ));
        }
        let Some(position) = self.ctx.tasks.iter().position(|task| task.id == id) else {
            return Ok(false);
        };
        let removed = self.ctx.tasks.remove(position);
        debug!(task = id, "task deleted");
        self.log(format!("deleted \"{}\"", removed.title), now);
        Ok(true)
    }

    /// Append a comment authored by the current user. Unknown ids are a
    /// no-op.
    pub fn add_comment(&mut self, id: TaskId, content: &str, now: DateTime<Utc>) -> Option<Comment> {
        let content = content.trim();
        if content.is_empty() {
            return None;
        }
        let author_id = self.user.employee_id.clone();
        let task = self.ctx.find_task_mut(id)?;
        let comment = Comment::new(author_id, content, now);
        task.comments.push(comment.clone());
        Some(comment)
    }

    /// Set or clear a task's blocker directly. Setting validates against
    /// self-blocking and predecessor cycles.
    pub fn set_blocker(&mut self, id: TaskId, blocker: Option<TaskId>, now: DateTime<Utc>) -> Result<bool> {
        if self.ctx.find_task(id).is_none() {
            return Ok(false);
        }
        if let Some(blocker_id) = blocker {
            dependency::validate_blocker(&self.ctx.tasks, id, blocker_id)?;
        }
        let task = self.ctx.find_task_mut(id).ok_or(Error::TaskNotFound(id))?;
        task.blocked_by = blocker;
        let title = task.title.clone();
        match blocker {
            Some(blocker_id) => {
                debug!(task = id, blocker = blocker_id, "blocker set");
                self.log(format!("blocked \"{title}\" on task {blocker_id}"), now);
            }
            None => {
                debug!(task = id, "blocker cleared");
                self.log(format!("unblocked \"{title}\""), now);
            }
        }
        Ok(true)
    }

    /// Insert drafts from the batch-creation collaborator. Each draft gets a
    /// fresh id, `Todo` status, `Medium` priority, empty collections, and
    /// the active space tag.
    pub fn insert_generated(&mut self, drafts: Vec<TaskDraft>, now: DateTime<Utc>) -> Vec<TaskId> {
        if drafts.is_empty() {
            return Vec::new();
        }
        let mut ids = Vec::with_capacity(drafts.len());
        for draft in drafts {
            let id = self.ctx.next_task_id(now);
            let mut task = Task::new(id, draft.title, now);
            task.description = draft.description;
            task.assignee_id = draft.assignee_id;
            task.due_date = draft.due_date;
            task.priority = Priority::Medium;
            task.tags = self.ctx.seed_tags();
            self.ctx.tasks.push(task);
            ids.push(id);
        }
        debug!(count = ids.len(), "generated tasks inserted");
        self.log(format!("AI generated {} tasks", ids.len()), now);
        ids
    }
}

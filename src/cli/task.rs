//! taskflow task command implementations.

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::cli::{CommandContext, TaskCommands};
use crate::engine::TimerAction;
use crate::error::{Error, Result};
use crate::filter::{filter_tasks, TaskFilter};
use crate::output::{emit_success, HumanOutput};
use crate::store::Persistence;
use crate::suggest;
use crate::task::{humanize_ms, Priority, Task, TaskId, TaskInput, TaskStatus};

pub(crate) fn run(ctx: &CommandContext, command: TaskCommands) -> Result<()> {
    match command {
        TaskCommands::Add {
            title,
            description,
            assignee,
            due,
            priority,
            blocked_by,
            tag,
        } => run_add(ctx, title, description, assignee, due, priority, blocked_by, tag),
        TaskCommands::Edit {
            id,
            title,
            description,
            assignee,
            due,
            priority,
        } => run_edit(ctx, id, title, description, assignee, due, priority),
        TaskCommands::List {
            search,
            assignee,
            priority,
        } => run_list(ctx, search, assignee, priority),
        TaskCommands::Show { id } => run_show(ctx, id),
        TaskCommands::Status { id, status } => run_status(ctx, id, &status),
        TaskCommands::Block { id, on } => run_block(ctx, id, Some(on)),
        TaskCommands::Unblock { id } => run_block(ctx, id, None),
        TaskCommands::Comment { id, message } => run_comment(ctx, id, &message),
        TaskCommands::Delete { id } => run_delete(ctx, id),
        TaskCommands::Generate { from } => run_generate(ctx, &from),
        TaskCommands::Suggest { id, from } => run_suggest(ctx, id, &from),
    }
}

pub(crate) fn run_init(ctx: &CommandContext) -> Result<()> {
    let doc = ctx.store.init()?;
    let mut human = HumanOutput::new(format!(
        "Initialized workspace at {}",
        ctx.store.path().display()
    ));
    for employee in &doc.employees {
        human.push_detail(format!("{} ({})", employee.name, employee.id));
    }
    emit_success(ctx.options, "init", &doc.employees, Some(&human))
}

#[allow(clippy::too_many_arguments)]
fn run_add(
    ctx: &CommandContext,
    title: String,
    description: String,
    assignee: Option<String>,
    due: Option<String>,
    priority: Option<String>,
    blocked_by: Option<TaskId>,
    tags: Vec<String>,
) -> Result<()> {
    let input = TaskInput {
        title,
        description,
        assignee_id: assignee,
        due_date: due.as_deref().map(parse_due).transpose()?,
        priority: match priority {
            Some(raw) => Some(parse_priority(&raw)?),
            None => Priority::parse(&ctx.config.tasks.default_priority),
        },
        blocked_by,
        tags: if tags.is_empty() { None } else { Some(tags) },
    };

    let mut engine = ctx.load_engine()?;
    let id = engine.save_task(input, None, Utc::now())?;
    let task = engine
        .ctx()
        .find_task(id)
        .cloned()
        .ok_or(Error::TaskNotFound(id))?;
    ctx.persist(engine)?;

    let mut human = HumanOutput::new(format!("Created task {id}"));
    human.push_summary("title", &task.title);
    human.push_summary("status", task.status.label());
    human.push_summary("priority", task.priority.label());
    if task.is_locked() {
        human.push_warning(format!("blocked by task {}", task.blocked_by.unwrap_or(0)));
    }
    emit_success(ctx.options, "task add", &task, Some(&human))
}

fn run_edit(
    ctx: &CommandContext,
    id: TaskId,
    title: Option<String>,
    description: Option<String>,
    assignee: Option<String>,
    due: Option<String>,
    priority: Option<String>,
) -> Result<()> {
    let mut engine = ctx.load_engine()?;
    let existing = engine
        .ctx()
        .find_task(id)
        .cloned()
        .ok_or(Error::TaskNotFound(id))?;

    // Unspecified flags keep the current values.
    let input = TaskInput {
        title: title.unwrap_or_else(|| existing.title.clone()),
        description: description.unwrap_or_else(|| existing.description.clone()),
        assignee_id: assignee.or_else(|| existing.assignee_id.clone()),
        due_date: match due {
            Some(raw) => Some(parse_due(&raw)?),
            None => existing.due_date,
        },
        priority: match priority {
            Some(raw) => Some(parse_priority(&raw)?),
            None => Some(existing.priority),
        },
        blocked_by: existing.blocked_by,
        tags: Some(existing.tags.clone()),
    };

    engine.save_task(input, Some(id), Utc::now())?;
    let task = engine
        .ctx()
        .find_task(id)
        .cloned()
        .ok_or(Error::TaskNotFound(id))?;
    ctx.persist(engine)?;

    let mut human = HumanOutput::new(format!("Updated task {id}"));
    human.push_summary("title", &task.title);
    emit_success(ctx.options, "task edit", &task, Some(&human))
}

fn run_list(
    ctx: &CommandContext,
    search: Option<String>,
    assignee: Option<String>,
    priority: Option<String>,
) -> Result<()> {
    let engine = ctx.load_engine()?;
    let filter = TaskFilter {
        search,
        space: Some(ctx.space.clone()),
        assignee,
        priority: priority.as_deref().map(parse_priority).transpose()?,
    };
    let visible: Vec<Task> = filter_tasks(&engine.ctx().tasks, &filter, Some(engine.user()))
        .into_iter()
        .cloned()
        .collect();

    let today = Utc::now().date_naive();
    let mut human = HumanOutput::new(format!(
        "{} task(s) in {}",
        visible.len(),
        ctx.space
    ));
    for task in &visible {
        let lock = if task.is_locked() { " [blocked]" } else { "" };
        let overdue = if task.is_overdue(today) { " [overdue]" } else { "" };
        human.push_detail(format!(
            "{} {} ({}, {}){}{}",
            task.id,
            task.title,
            task.status,
            task.priority,
            lock,
            overdue,
        ));
    }
    emit_success(ctx.options, "task list", &visible, Some(&human))
}

#[derive(Serialize)]
struct TaskDetailsView {
    #[serde(flatten)]
    task: Task,
    locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    blocker_title: Option<String>,
    subtasks_completed: usize,
    subtasks_total: usize,
    total_logged_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    running_elapsed_ms: Option<i64>,
    overdue: bool,
}

fn run_show(ctx: &CommandContext, id: TaskId) -> Result<()> {
    let engine = ctx.load_engine()?;
    let task = engine
        .ctx()
        .find_task(id)
        .cloned()
        .ok_or(Error::TaskNotFound(id))?;

    let now = Utc::now();
    let blocker_title = task
        .blocked_by
        .and_then(|blocker| engine.ctx().find_task(blocker))
        .map(|blocker| blocker.title.clone());
    let (completed, total) = task.subtask_progress();
    let view = TaskDetailsView {
        locked: task.is_locked(),
        blocker_title: blocker_title.clone(),
        subtasks_completed: completed,
        subtasks_total: total,
        total_logged_ms: task.total_logged_ms(now),
        running_elapsed_ms: task.elapsed_running_ms(now),
        overdue: task.is_overdue(now.date_naive()),
        task,
    };

    let mut human = HumanOutput::new(format!("{} {}", view.task.id, view.task.title));
    human.push_summary("status", view.task.status.label());
    human.push_summary("priority", view.task.priority.label());
    if let Some(assignee) = view.task.assignee_id.as_deref() {
        let name = engine
            .ctx()
            .find_employee(assignee)
            .map(|employee| employee.name.clone())
            .unwrap_or_else(|| assignee.to_string());
        human.push_summary("assignee", name);
    }
    if let Some(due) = view.task.due_date {
        human.push_summary("due", due.to_string());
    }
    human.push_summary(
        "subtasks",
        format!("{}/{}", view.subtasks_completed, view.subtasks_total),
    );
    human.push_summary("time logged", humanize_ms(view.total_logged_ms));
    if let Some(elapsed) = view.running_elapsed_ms {
        human.push_summary("timer running", humanize_ms(elapsed));
    }
    if view.locked {
        let blocker = blocker_title.unwrap_or_else(|| "unknown task".to_string());
        human.push_warning(format!("blocked by \"{blocker}\""));
    }
    if view.overdue {
        human.push_warning("overdue".to_string());
    }
    for comment in &view.task.comments {
        human.push_detail(format!("[{}] {}", comment.author_id, comment.content));
    }
    emit_success(ctx.options, "task show", &view, Some(&human))
}

fn run_status(ctx: &CommandContext, id: TaskId, status: &str) -> Result<()> {
    let new_status = TaskStatus::parse(status)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown status \"{status}\"")))?;

    let mut engine = ctx.load_engine()?;
    let changed = engine.set_status(id, new_status, Utc::now());
    if changed {
        ctx.persist(engine)?;
    }

    let human = if changed {
        HumanOutput::new(format!("Moved task {id} to {new_status}"))
    } else {
        // Stale id or unchanged status; nothing written by policy.
        HumanOutput::new(format!("No change for task {id}"))
    };
    #[derive(Serialize)]
    struct StatusResult {
        id: TaskId,
        changed: bool,
        status: TaskStatus,
    }
    emit_success(
        ctx.options,
        "task status",
        &StatusResult {
            id,
            changed,
            status: new_status,
        },
        Some(&human),
    )
}

fn run_block(ctx: &CommandContext, id: TaskId, on: Option<TaskId>) -> Result<()> {
    let mut engine = ctx.load_engine()?;
    let found = engine.set_blocker(id, on, Utc::now())?;
    if !found {
        return Err(Error::TaskNotFound(id));
    }
    ctx.persist(engine)?;

    let human = match on {
        Some(blocker) => HumanOutput::new(format!("Blocked task {id} on {blocker}")),
        None => HumanOutput::new(format!("Unblocked task {id}")),
    };
    #[derive(Serialize)]
    struct BlockResult {
        id: TaskId,
        #[serde(skip_serializing_if = "Option::is_none")]
        blocked_by: Option<TaskId>,
    }
    emit_success(
        ctx.options,
        "task block",
        &BlockResult { id, blocked_by: on },
        Some(&human),
    )
}

fn run_comment(ctx: &CommandContext, id: TaskId, message: &str) -> Result<()> {
    // Comments go through the persistence collaborator directly; the
    // engine only resolves the author.
    let engine = ctx.load_engine()?;
    let author = engine.user().employee_id.clone();
    let comment = ctx.store.add_comment(id, &author, message)?;

    let human = HumanOutput::new(format!("Commented on task {id}"));
    emit_success(ctx.options, "task comment", &comment, Some(&human))
}

fn run_delete(ctx: &CommandContext, id: TaskId) -> Result<()> {
    let mut engine = ctx.load_engine()?;
    let removed = engine.delete_task(id, Utc::now())?;
    if removed {
        ctx.persist(engine)?;
    }

    let human = if removed {
        HumanOutput::new(format!("Deleted task {id}"))
    } else {
        HumanOutput::new(format!("Task {id} was already gone"))
    };
    #[derive(Serialize)]
    struct DeleteResult {
        id: TaskId,
        removed: bool,
    }
    emit_success(
        ctx.options,
        "task delete",
        &DeleteResult { id, removed },
        Some(&human),
    )
}

fn run_generate(ctx: &CommandContext, from: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(from)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    let mut engine = ctx.load_engine()?;
    let drafts = suggest::drafts_from_value(&value, &engine.ctx().employees)?;
    let ids = engine.insert_generated(drafts, Utc::now());
    ctx.persist(engine)?;

    let mut human = HumanOutput::new(format!("Inserted {} generated task(s)", ids.len()));
    for id in &ids {
        human.push_detail(format!("task {id}"));
    }
    emit_success(ctx.options, "task generate", &ids, Some(&human))
}

fn run_suggest(ctx: &CommandContext, id: TaskId, from: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(from)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    // Shape is validated before any store mutation.
    let priority = suggest::priority_from_value(&value)?;

    let mut engine = ctx.load_engine()?;
    let existing = engine
        .ctx()
        .find_task(id)
        .cloned()
        .ok_or(Error::TaskNotFound(id))?;
    let input = TaskInput {
        title: existing.title.clone(),
        description: existing.description.clone(),
        assignee_id: existing.assignee_id.clone(),
        due_date: existing.due_date,
        priority: Some(priority),
        blocked_by: existing.blocked_by,
        tags: Some(existing.tags.clone()),
    };
    engine.save_task(input, Some(id), Utc::now())?;
    ctx.persist(engine)?;

    let human = HumanOutput::new(format!("Set task {id} priority to {priority}"));
    #[derive(Serialize)]
    struct SuggestResult {
        id: TaskId,
        priority: Priority,
    }
    emit_success(
        ctx.options,
        "task suggest",
        &SuggestResult { id, priority },
        Some(&human),
    )
}

pub(crate) fn run_timer(ctx: &CommandContext, id: TaskId) -> Result<()> {
    let mut engine = ctx.load_engine()?;
    let action = engine.toggle_timer(id, Utc::now());
    if action.is_some() {
        ctx.persist(engine)?;
    }

    let human = match action {
        Some(TimerAction::Started) => HumanOutput::new(format!("Started timer on task {id}")),
        Some(TimerAction::Logged { duration_ms }) => HumanOutput::new(format!(
            "Logged {} on task {id}",
            humanize_ms(duration_ms)
        )),
        None => HumanOutput::new(format!("No such task {id}")),
    };
    #[derive(Serialize)]
    struct TimerResult {
        id: TaskId,
        running: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        logged_ms: Option<i64>,
    }
    let result = TimerResult {
        id,
        running: matches!(action, Some(TimerAction::Started)),
        logged_ms: match action {
            Some(TimerAction::Logged { duration_ms }) => Some(duration_ms),
            _ => None,
        },
    };
    emit_success(ctx.options, "timer", &result, Some(&human))
}

fn parse_due(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| Error::InvalidArgument(format!("invalid due date \"{raw}\" (want YYYY-MM-DD)")))
}

fn parse_priority(raw: &str) -> Result<Priority> {
    Priority::parse(raw)
        .ok_or_else(|| Error::InvalidArgument(format!("unknown priority \"{raw}\"")))
}

//! taskflow subtask command implementations.

use chrono::Utc;
use serde::Serialize;

use crate::cli::{CommandContext, SubtaskCommands};
use crate::error::{Error, Result};
use crate::output::{emit_success, HumanOutput};
use crate::suggest;
use crate::task::TaskId;

pub(crate) fn run(ctx: &CommandContext, command: SubtaskCommands) -> Result<()> {
    match command {
        SubtaskCommands::Add { id, title } => run_add(ctx, id, &title),
        SubtaskCommands::Toggle { id, subtask_id } => run_toggle(ctx, id, &subtask_id),
        SubtaskCommands::Remove { id, subtask_id } => run_remove(ctx, id, &subtask_id),
        SubtaskCommands::Generate { id, from } => run_generate(ctx, id, &from),
    }
}

#[derive(Serialize)]
struct ProgressResult {
    id: TaskId,
    completed: usize,
    total: usize,
}

fn progress(engine: &crate::engine::Engine, id: TaskId) -> ProgressResult {
    let (completed, total) = engine
        .ctx()
        .find_task(id)
        .map(|task| task.subtask_progress())
        .unwrap_or((0, 0));
    ProgressResult {
        id,
        completed,
        total,
    }
}

fn run_add(ctx: &CommandContext, id: TaskId, title: &str) -> Result<()> {
    let mut engine = ctx.load_engine()?;
    if !engine.add_subtask(id, title, Utc::now()) {
        return Err(Error::TaskNotFound(id));
    }
    let result = progress(&engine, id);
    ctx.persist(engine)?;

    let human = HumanOutput::new(format!(
        "Added subtask to task {id} ({}/{})",
        result.completed, result.total
    ));
    emit_success(ctx.options, "subtask add", &result, Some(&human))
}

fn run_toggle(ctx: &CommandContext, id: TaskId, subtask_id: &str) -> Result<()> {
    let mut engine = ctx.load_engine()?;
    if !engine.toggle_subtask(id, subtask_id) {
        return Err(Error::InvalidArgument(format!(
            "no subtask {subtask_id} on task {id}"
        )));
    }
    let result = progress(&engine, id);
    ctx.persist(engine)?;

    let human = HumanOutput::new(format!(
        "Toggled subtask on task {id} ({}/{})",
        result.completed, result.total
    ));
    emit_success(ctx.options, "subtask toggle", &result, Some(&human))
}

fn run_remove(ctx: &CommandContext, id: TaskId, subtask_id: &str) -> Result<()> {
    let mut engine = ctx.load_engine()?;
    if !engine.remove_subtask(id, subtask_id) {
        return Err(Error::InvalidArgument(format!(
            "no subtask {subtask_id} on task {id}"
        )));
    }
    let result = progress(&engine, id);
    ctx.persist(engine)?;

    let human = HumanOutput::new(format!(
        "Removed subtask from task {id} ({}/{})",
        result.completed, result.total
    ));
    emit_success(ctx.options, "subtask remove", &result, Some(&human))
}

fn run_generate(ctx: &CommandContext, id: TaskId, from: &std::path::Path) -> Result<()> {
    let raw = std::fs::read_to_string(from)?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    // Shape failure aborts before any store mutation.
    let titles = suggest::titles_from_value(&value)?;

    let mut engine = ctx.load_engine()?;
    let added = engine.add_generated_subtasks(id, &titles, Utc::now());
    if added == 0 {
        return Err(Error::TaskNotFound(id));
    }
    let result = progress(&engine, id);
    ctx.persist(engine)?;

    let human = HumanOutput::new(format!(
        "Added {added} generated subtask(s) to task {id} ({}/{})",
        result.completed, result.total
    ));
    emit_success(ctx.options, "subtask generate", &result, Some(&human))
}

//! Command-line interface for taskflow
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command family is implemented in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::activity::ActivityLog;
use crate::config::Config;
use crate::employee::{self, CurrentUser, Role};
use crate::engine::Engine;
use crate::error::Result;
use crate::output::OutputOptions;
use crate::store::JsonStore;
use crate::workspace::WorkspaceContext;

mod activity;
mod subtask;
mod task;

/// taskflow - team task tracking
///
/// A CLI over the task lifecycle engine: statuses with dependency
/// unblocking, per-task timers, subtask checklists, and a bounded
/// workspace activity feed.
#[derive(Parser, Debug)]
#[command(name = "taskflow")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Workspace root directory (defaults to current directory)
    #[arg(long, global = true, env = "TASKFLOW_ROOT")]
    pub root: Option<PathBuf>,

    /// Actor identity (employee id or name) for activity attribution
    #[arg(long, global = true, env = "TASKFLOW_ACTOR")]
    pub actor: Option<String>,

    /// Active space; tags double as spaces ("Everything" disables scoping)
    #[arg(long, global = true)]
    pub space: Option<String>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a workspace with the default roster
    Init,

    /// Task management
    #[command(subcommand)]
    Task(TaskCommands),

    /// Start or stop the stopwatch on a task
    Timer {
        /// Task id
        id: i64,
    },

    /// Subtask checklist management
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// Show the workspace activity feed (newest first)
    Activity {
        /// Maximum entries to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Set or show actor identity
    #[command(subcommand)]
    Actor(ActorCommands),
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long, default_value = "")]
        description: String,

        /// Assignee (employee id)
        #[arg(long)]
        assignee: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Priority: low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,

        /// Block this task on another task id
        #[arg(long)]
        blocked_by: Option<i64>,

        /// Tags (repeatable)
        #[arg(long)]
        tag: Vec<String>,
    },

    /// Update an existing task's fields
    Edit {
        /// Task id
        id: i64,

        /// New title
        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        description: Option<String>,

        #[arg(long)]
        assignee: Option<String>,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Priority: low, medium, high, urgent
        #[arg(long)]
        priority: Option<String>,
    },

    /// List tasks in the active space
    List {
        /// Substring search on title or tags
        #[arg(long)]
        search: Option<String>,

        /// Filter by assignee (employee id)
        #[arg(long)]
        assignee: Option<String>,

        /// Filter by priority
        #[arg(long)]
        priority: Option<String>,
    },

    /// Show one task in detail
    Show {
        /// Task id
        id: i64,
    },

    /// Move a task to a new status
    Status {
        /// Task id
        id: i64,

        /// Destination status: todo, in-progress, done
        status: String,
    },

    /// Block a task on another task
    Block {
        /// Task id
        id: i64,

        /// Blocker task id
        on: i64,
    },

    /// Clear a task's blocker
    Unblock {
        /// Task id
        id: i64,
    },

    /// Comment on a task
    Comment {
        /// Task id
        id: i64,

        /// Comment text
        message: String,
    },

    /// Delete a task (admin only)
    Delete {
        /// Task id
        id: i64,
    },

    /// Insert AI-generated task drafts from a JSON file
    Generate {
        /// Path to a JSON drafts file (array or {"tasks": [...]})
        #[arg(long)]
        from: PathBuf,
    },

    /// Apply an AI priority suggestion from a JSON file
    Suggest {
        /// Task id
        id: i64,

        /// Path to a JSON file holding one priority string
        #[arg(long)]
        from: PathBuf,
    },
}

/// Subtask subcommands
#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Append a subtask
    Add {
        /// Parent task id
        id: i64,

        /// Subtask title
        title: String,
    },

    /// Flip a subtask's completion flag
    Toggle {
        /// Parent task id
        id: i64,

        /// Subtask id
        subtask_id: String,
    },

    /// Remove a subtask
    Remove {
        /// Parent task id
        id: i64,

        /// Subtask id
        subtask_id: String,
    },

    /// Append AI-generated subtasks from a JSON file
    Generate {
        /// Parent task id
        id: i64,

        /// Path to a JSON array of title strings
        #[arg(long)]
        from: PathBuf,
    },
}

/// Actor subcommands
#[derive(Subcommand, Debug)]
pub enum ActorCommands {
    /// Persist the actor identity for this workspace
    Set {
        /// Employee id or display name
        name: String,
    },

    /// Show the resolved actor
    Show,
}

/// Shared per-invocation state: resolved root, config, store, and actor.
pub(crate) struct CommandContext {
    pub root: PathBuf,
    pub config: Config,
    pub store: JsonStore,
    pub options: OutputOptions,
    pub actor: String,
    pub space: String,
}

impl CommandContext {
    fn resolve(cli: &Cli) -> Result<Self> {
        let root = match &cli.root {
            Some(root) => root.clone(),
            None => std::env::current_dir()?,
        };
        let config = Config::load_from_dir(&root);
        let store = JsonStore::new(config.data_path(&root));
        let actor = employee::resolve_actor(Some(&root), cli.actor.as_deref())?;
        let space = cli
            .space
            .clone()
            .unwrap_or_else(|| config.tasks.default_space.clone());
        Ok(Self {
            root,
            config,
            store,
            options: OutputOptions {
                json: cli.json,
                quiet: cli.quiet,
            },
            actor,
            space,
        })
    }

    /// Load the workspace document and build an engine for the current
    /// actor. Unresolved actors participate with `User` role; activity of
    /// theirs is silently skipped by the engine.
    pub(crate) fn load_engine(&self) -> Result<Engine> {
        let doc = self.store.load()?;
        let user = match employee::find_employee(&doc.employees, &self.actor) {
            Some(employee) => CurrentUser::from_employee(employee),
            None => CurrentUser {
                employee_id: self.actor.clone(),
                role: Role::User,
            },
        };
        let activity = ActivityLog::from_entries(doc.activity);
        let ctx = WorkspaceContext::new(doc.tasks, doc.employees, self.space.clone());
        Ok(Engine::new(ctx, activity, user))
    }

    /// Persist the engine's state back to the workspace document.
    /// Optimistic apply: the in-memory mutation already happened; a failure
    /// here leaves the file untouched and the caller re-reads on the next
    /// invocation.
    pub(crate) fn persist(&self, engine: Engine) -> Result<()> {
        let (ctx, activity) = engine.into_parts();
        let mut doc = crate::store::WorkspaceDoc::empty();
        doc.tasks = ctx.tasks;
        doc.employees = ctx.employees;
        doc.activity = activity.into_entries();
        self.store.save(&doc)
    }
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let ctx = CommandContext::resolve(&self)?;
        match self.command {
            Commands::Init => task::run_init(&ctx),
            Commands::Task(command) => task::run(&ctx, command),
            Commands::Timer { id } => task::run_timer(&ctx, id),
            Commands::Subtask(command) => subtask::run(&ctx, command),
            Commands::Activity { limit } => activity::run_show(&ctx, limit),
            Commands::Actor(command) => activity::run_actor(&ctx, command),
        }
    }
}

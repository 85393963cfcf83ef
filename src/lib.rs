//! taskflow - Team Task Tracking Library
//!
//! This library provides the core functionality for the taskflow CLI:
//! the task lifecycle engine behind a board/list/calendar style tracker.
//!
//! # Core Concepts
//!
//! - **Tasks**: the central record, with status, priority, due date,
//!   subtasks, tags, time logs, and comments
//! - **Dependencies**: a single-predecessor "blocked by" relation; blocked
//!   tasks are locked for movement until the blocker resolves
//! - **Timers**: per-task stopwatches converted to immutable time log
//!   entries on stop
//! - **Activity**: a bounded most-recent-first feed with actor snapshots
//! - **Spaces**: tags doubling as grouping boundaries for filtering
//!
//! # Module Organization
//!
//! - `cli`: command-line interface using clap
//! - `config`: configuration loading from `.taskflow.toml`
//! - `error`: error types and result aliases
//! - `task`: task data model and derived reads
//! - `engine`: all task mutation (status, timer, subtasks, save/delete)
//! - `dependency`: blocking relation and cycle validation
//! - `activity`: bounded activity log
//! - `filter`: derived search/filter index
//! - `suggest`: AI suggestion collaborator boundary and shape validation
//! - `employee`: roster, roles, and actor identity
//! - `workspace`: explicit workspace context value object
//! - `store`: persistence collaborator and file-backed JSON store
//! - `lock`: file locking and atomic writes

pub mod activity;
pub mod cli;
pub mod config;
pub mod dependency;
pub mod employee;
pub mod engine;
pub mod error;
pub mod filter;
pub mod lock;
pub mod output;
pub mod store;
pub mod suggest;
pub mod task;
pub mod workspace;

pub use error::{Error, Result};

//! Single-predecessor blocking relation.
//!
//! Every task has at most one blocker (`blocked_by`). A blocked task is
//! locked for board movement; the lock is advisory at the call site, the
//! store itself does not reject direct status writes.

use crate::error::{Error, Result};
use crate::task::{Task, TaskId};

/// Clear `blocked_by` on every task blocked by `resolved`. Returns the ids
/// that were freed.
///
/// Policy: dependents are freed on any status transition of the blocker,
/// not only on completion. Moving a blocker back to `To Do` still frees
/// everything it blocked.
pub fn unblock_dependents(tasks: &mut [Task], resolved: TaskId) -> Vec<TaskId> {
    let mut freed = Vec::new();
    for task in tasks.iter_mut() {
        if task.blocked_by == Some(resolved) {
            task.blocked_by = None;
            freed.push(task.id);
        }
    }
    freed
}

/// Validate a prospective `blocked_by` assignment.
///
/// Rejects self-blocking and any assignment that would close a predecessor
/// cycle (A blocks B blocks ... blocks A). The chain walk tolerates stale
/// references and pre-existing corruption by bounding itself to the task
/// count.
pub fn validate_blocker(tasks: &[Task], task_id: TaskId, blocker_id: TaskId) -> Result<()> {
    if task_id == blocker_id {
        return Err(Error::InvalidArgument(
            "a task cannot block itself".to_string(),
        ));
    }

    let mut current = Some(blocker_id);
    let mut hops = 0usize;
    while let Some(id) = current {
        if id == task_id {
            return Err(Error::DependencyCycle {
                task: task_id,
                blocker: blocker_id,
            });
        }
        if hops > tasks.len() {
            break;
        }
        hops += 1;
        current = tasks
            .iter()
            .find(|task| task.id == id)
            .and_then(|task| task.blocked_by);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn tasks(chain: &[(TaskId, Option<TaskId>)]) -> Vec<Task> {
        let now = Utc.timestamp_opt(0, 0).unwrap();
        chain
            .iter()
            .map(|(id, blocked_by)| {
                let mut task = Task::new(*id, format!("task {id}"), now);
                task.blocked_by = *blocked_by;
                task
            })
            .collect()
    }

    #[test]
    fn unblock_clears_every_dependent() {
        let mut tasks = tasks(&[(1, None), (2, Some(1)), (3, Some(1)), (4, Some(2))]);
        let freed = unblock_dependents(&mut tasks, 1);
        assert_eq!(freed, vec![2, 3]);
        assert!(tasks[1].blocked_by.is_none());
        assert!(tasks[2].blocked_by.is_none());
        // Task 4 stays locked on task 2.
        assert_eq!(tasks[3].blocked_by, Some(2));
    }

    #[test]
    fn self_block_rejected() {
        let tasks = tasks(&[(1, None)]);
        assert!(matches!(
            validate_blocker(&tasks, 1, 1),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn transitive_cycle_rejected() {
        // 3 -> 2 -> 1; blocking 3 on 1 is fine, blocking 1 on 3 closes a loop.
        let tasks = tasks(&[(1, None), (2, Some(1)), (3, Some(2))]);
        assert!(validate_blocker(&tasks, 3, 1).is_ok());
        assert!(matches!(
            validate_blocker(&tasks, 1, 3),
            Err(Error::DependencyCycle { task: 1, blocker: 3 })
        ));
    }

    #[test]
    fn chain_walk_bounded_on_corrupt_input() {
        // Pre-existing 1 <-> 2 loop must not hang the walk.
        let tasks = tasks(&[(1, Some(2)), (2, Some(1))]);
        assert!(validate_blocker(&tasks, 3, 1).is_ok());
    }
}

//! Derived search and filter index.
//!
//! A pure function of (tasks, filters): no mutation, no caching, safe to
//! recompute on every call. All predicates are ANDed; an absent filter is
//! always true.

use crate::employee::{CurrentUser, Role};
use crate::task::{Priority, Task};
use crate::workspace::EVERYTHING_SPACE;

#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring match on title OR any tag.
    pub search: Option<String>,
    /// Space filter: tags double as spaces. `None` or `Everything` selects
    /// all tasks.
    pub space: Option<String>,
    pub assignee: Option<String>,
    pub priority: Option<Priority>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(space) = self.space.as_deref() {
            if space != EVERYTHING_SPACE
                && !task.tags.iter().any(|tag| tag.eq_ignore_ascii_case(space))
            {
                return false;
            }
        }

        if let Some(search) = self.search.as_deref() {
            let term = search.to_lowercase();
            if !term.is_empty() {
                let title_hit = task.title.to_lowercase().contains(&term);
                let tag_hit = task
                    .tags
                    .iter()
                    .any(|tag| tag.to_lowercase().contains(&term));
                if !title_hit && !tag_hit {
                    return false;
                }
            }
        }

        if let Some(assignee) = self.assignee.as_deref() {
            if task.assignee_id.as_deref() != Some(assignee) {
                return false;
            }
        }

        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }

        true
    }
}

/// Apply `filter` to `tasks`, additionally scoping non-admin viewers to
/// their own assignments.
pub fn filter_tasks<'a>(
    tasks: &'a [Task],
    filter: &TaskFilter,
    viewer: Option<&CurrentUser>,
) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| match viewer {
            Some(user) if user.role != Role::Admin => {
                task.assignee_id.as_deref() == Some(user.employee_id.as_str())
            }
            _ => true,
        })
        .filter(|task| filter.matches(task))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample() -> Vec<Task> {
        let now = Utc.timestamp_opt(0, 0).unwrap();
        let mut landing = Task::new(1, "Design landing page", now);
        landing.tags = vec!["Design".to_string()];
        landing.assignee_id = Some("emp-1".to_string());
        landing.priority = Priority::High;

        let mut auth = Task::new(2, "Auth API", now);
        auth.tags = vec!["Backend".to_string()];
        auth.assignee_id = Some("emp-2".to_string());
        auth.priority = Priority::Urgent;

        let mut blog = Task::new(3, "Blog post on design trends", now);
        blog.assignee_id = Some("emp-1".to_string());
        blog.priority = Priority::Low;

        vec![landing, auth, blog]
    }

    #[test]
    fn search_matches_title_or_tag_case_insensitively() {
        let tasks = sample();
        let filter = TaskFilter {
            search: Some("DESIGN".to_string()),
            ..TaskFilter::default()
        };
        let hits = filter_tasks(&tasks, &filter, None);
        // "Design landing page" by title and tag, blog post by title.
        assert_eq!(hits.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn predicates_are_anded() {
        let tasks = sample();
        let filter = TaskFilter {
            search: Some("design".to_string()),
            assignee: Some("emp-2".to_string()),
            ..TaskFilter::default()
        };
        // Matches the search term but not the assignee: excluded.
        assert!(filter_tasks(&tasks, &filter, None).is_empty());

        let filter = TaskFilter {
            search: Some("design".to_string()),
            assignee: Some("emp-1".to_string()),
            priority: Some(Priority::High),
            ..TaskFilter::default()
        };
        let hits = filter_tasks(&tasks, &filter, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn everything_space_is_always_true() {
        let tasks = sample();
        let all = TaskFilter {
            space: Some(EVERYTHING_SPACE.to_string()),
            ..TaskFilter::default()
        };
        assert_eq!(filter_tasks(&tasks, &all, None).len(), 3);

        let scoped = TaskFilter {
            space: Some("backend".to_string()),
            ..TaskFilter::default()
        };
        let hits = filter_tasks(&tasks, &scoped, None);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }

    #[test]
    fn non_admin_viewer_sees_only_own_tasks() {
        let tasks = sample();
        let bob = CurrentUser {
            employee_id: "emp-2".to_string(),
            role: Role::User,
        };
        let hits = filter_tasks(&tasks, &TaskFilter::default(), Some(&bob));
        assert_eq!(hits.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);

        let admin = CurrentUser {
            employee_id: "emp-1".to_string(),
            role: Role::Admin,
        };
        assert_eq!(filter_tasks(&tasks, &TaskFilter::default(), Some(&admin)).len(), 3);
    }
}

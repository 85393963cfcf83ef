//! Suggestion collaborator boundary.
//!
//! The AI services are consumed as black boxes: the engine accepts a
//! priority suggestion, a list of generated subtask titles, or a batch of
//! task drafts, and validates shape only, never content. A shape mismatch
//! is a hard failure of that one call and must not touch the task store.

use serde_json::Value;

use crate::employee::Employee;
use crate::error::{Error, Result};
use crate::task::{Priority, TaskDraft};

/// Priority suggestion and subtask generation, per task.
pub trait SuggestionProvider {
    fn suggest_priority(&self, title: &str, description: &str) -> Result<Priority>;
    fn generate_subtask_titles(&self, title: &str, description: &str) -> Result<Vec<String>>;
}

/// Goal-to-drafts batch creation.
pub trait TaskGenerator {
    fn generate_drafts(&self, goal: &str, roster: &[Employee]) -> Result<Vec<TaskDraft>>;
}

/// Validate a raw priority suggestion: must be exactly one of the four
/// priority names.
pub fn priority_from_value(value: &Value) -> Result<Priority> {
    let raw = value.as_str().ok_or_else(|| {
        Error::MalformedSuggestion(format!("expected a priority string, got {value}"))
    })?;
    Priority::parse(raw)
        .ok_or_else(|| Error::MalformedSuggestion(format!("unknown priority \"{raw}\"")))
}

/// Validate a raw subtask title list: must be a non-empty array of
/// non-empty strings.
pub fn titles_from_value(value: &Value) -> Result<Vec<String>> {
    let items = value.as_array().ok_or_else(|| {
        Error::MalformedSuggestion("expected an array of subtask titles".to_string())
    })?;
    let mut titles = Vec::with_capacity(items.len());
    for item in items {
        let title = item
            .as_str()
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .ok_or_else(|| {
                Error::MalformedSuggestion(format!("expected a title string, got {item}"))
            })?;
        titles.push(title.to_string());
    }
    if titles.is_empty() {
        return Err(Error::MalformedSuggestion(
            "generated subtask list is empty".to_string(),
        ));
    }
    Ok(titles)
}

/// Validate a raw draft batch. Accepts either a bare array or an object
/// with a `tasks` array. Unknown assignee ids fall back to the first
/// roster member, matching the original service's behavior.
pub fn drafts_from_value(value: &Value, roster: &[Employee]) -> Result<Vec<TaskDraft>> {
    let items = value
        .as_array()
        .or_else(|| value.get("tasks").and_then(Value::as_array))
        .ok_or_else(|| {
            Error::MalformedSuggestion("expected a \"tasks\" array of drafts".to_string())
        })?;

    let mut drafts = Vec::with_capacity(items.len());
    for item in items {
        let mut draft: TaskDraft = serde_json::from_value(item.clone())
            .map_err(|err| Error::MalformedSuggestion(format!("bad draft shape: {err}")))?;
        if draft.title.trim().is_empty() {
            return Err(Error::MalformedSuggestion(
                "draft title cannot be empty".to_string(),
            ));
        }
        draft.assignee_id = match draft.assignee_id {
            Some(id) if roster.iter().any(|employee| employee.id == id) => Some(id),
            _ => roster.first().map(|employee| employee.id.clone()),
        };
        drafts.push(draft);
    }
    Ok(drafts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::Role;
    use serde_json::json;

    fn roster() -> Vec<Employee> {
        vec![Employee {
            id: "emp-1".to_string(),
            name: "Alice Johnson".to_string(),
            avatar_url: String::new(),
            role: Role::User,
        }]
    }

    #[test]
    fn priority_shape_checked() {
        assert_eq!(priority_from_value(&json!("Urgent")).unwrap(), Priority::Urgent);
        assert!(matches!(
            priority_from_value(&json!("Critical")),
            Err(Error::MalformedSuggestion(_))
        ));
        assert!(priority_from_value(&json!(3)).is_err());
    }

    #[test]
    fn titles_must_be_nonempty_strings() {
        let titles = titles_from_value(&json!(["draft spec", " review "])).unwrap();
        assert_eq!(titles, vec!["draft spec".to_string(), "review".to_string()]);
        assert!(titles_from_value(&json!([])).is_err());
        assert!(titles_from_value(&json!(["ok", 42])).is_err());
        assert!(titles_from_value(&json!("not a list")).is_err());
    }

    #[test]
    fn drafts_accept_bare_array_or_tasks_object() {
        let roster = roster();
        let bare = json!([{ "title": "Write copy", "assignee_id": "emp-1" }]);
        assert_eq!(drafts_from_value(&bare, &roster).unwrap().len(), 1);

        let wrapped = json!({ "tasks": [{ "title": "Write copy" }] });
        assert_eq!(drafts_from_value(&wrapped, &roster).unwrap().len(), 1);

        assert!(drafts_from_value(&json!({}), &roster).is_err());
    }

    #[test]
    fn unknown_assignee_falls_back_to_first_member() {
        let roster = roster();
        let raw = json!([{ "title": "Book venue", "assignee_id": "emp-404" }]);
        let drafts = drafts_from_value(&raw, &roster).unwrap();
        assert_eq!(drafts[0].assignee_id.as_deref(), Some("emp-1"));
    }
}

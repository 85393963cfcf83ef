mod support;

use assert_cmd::Command;
use predicates::str::contains;
use serde_json::Value;

use support::TestWorkspace;

fn taskflow(workspace: &TestWorkspace) -> Command {
    support::taskflow_cmd(workspace)
}

fn add_task(workspace: &TestWorkspace, title: &str) -> i64 {
    let output = taskflow(workspace)
        .args(["task", "add", title, "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("task add json");
    value["data"]["id"].as_i64().expect("task id")
}

#[test]
fn help_works() {
    Command::cargo_bin("taskflow")
        .expect("binary")
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("team task tracking"));
}

#[test]
fn subcommand_help_works() {
    for cmd in ["init", "task", "timer", "subtask", "activity", "actor"] {
        Command::cargo_bin("taskflow")
            .expect("binary")
            .arg(cmd)
            .arg("--help")
            .assert()
            .success();
    }
}

#[test]
fn add_status_timer_flow() {
    let workspace = TestWorkspace::new();
    workspace.seed(Vec::new());

    let id = add_task(&workspace, "Design landing page");
    let id_arg = id.to_string();

    taskflow(&workspace)
        .args(["task", "status", &id_arg, "in-progress"])
        .assert()
        .success()
        .stdout(contains("In Progress"));

    taskflow(&workspace)
        .args(["timer", &id_arg])
        .assert()
        .success()
        .stdout(contains("Started timer"));

    taskflow(&workspace)
        .args(["timer", &id_arg, "--json"])
        .assert()
        .success()
        .stdout(contains("logged_ms"));

    let doc = workspace.load();
    let task = doc.tasks.iter().find(|task| task.id == id).expect("task");
    assert_eq!(task.time_logs.len(), 1);
    assert!(task.timer_start.is_none());
    assert_eq!(doc.activity.len(), 4);
}

#[test]
fn blocked_task_unlocks_when_blocker_moves() {
    let workspace = TestWorkspace::new();
    workspace.seed(Vec::new());

    let blocker = add_task(&workspace, "Blocker");
    let blocked = add_task(&workspace, "Blocked");

    taskflow(&workspace)
        .args([
            "task",
            "block",
            &blocked.to_string(),
            &blocker.to_string(),
        ])
        .assert()
        .success();

    // Blocking the blocker on the blocked task closes a cycle: refused.
    taskflow(&workspace)
        .args([
            "task",
            "block",
            &blocker.to_string(),
            &blocked.to_string(),
        ])
        .assert()
        .failure()
        .code(3);

    taskflow(&workspace)
        .args(["task", "status", &blocker.to_string(), "done"])
        .assert()
        .success();

    let doc = workspace.load();
    let task = doc
        .tasks
        .iter()
        .find(|task| task.id == blocked)
        .expect("blocked task");
    assert!(task.blocked_by.is_none());
}

#[test]
fn delete_is_admin_gated() {
    let workspace = TestWorkspace::new();
    workspace.seed(vec![support::task_at(1, "keep me", 0)]);

    taskflow(&workspace)
        .env("TASKFLOW_ACTOR", "emp-2")
        .args(["task", "delete", "1"])
        .assert()
        .failure()
        .code(3)
        .stderr(contains("Permission denied"));

    taskflow(&workspace)
        .args(["task", "delete", "1"])
        .assert()
        .success();

    assert!(workspace.load().tasks.is_empty());
}

#[test]
fn generated_drafts_and_subtasks_are_shape_checked() {
    let workspace = TestWorkspace::new();
    workspace.seed(Vec::new());

    let drafts = workspace.path().join("drafts.json");
    std::fs::write(
        &drafts,
        r#"{"tasks": [{"title": "Research venues", "assignee_id": "emp-404"}]}"#,
    )
    .expect("write drafts");

    taskflow(&workspace)
        .args(["task", "generate", "--from"])
        .arg(&drafts)
        .assert()
        .success()
        .stdout(contains("Inserted 1 generated task(s)"));

    let doc = workspace.load();
    assert_eq!(doc.tasks.len(), 1);
    // Unknown assignee falls back to the first roster member.
    assert_eq!(doc.tasks[0].assignee_id.as_deref(), Some("emp-1"));
    let id = doc.tasks[0].id.to_string();

    let bad_titles = workspace.path().join("titles.json");
    std::fs::write(&bad_titles, r#"["draft spec", 42]"#).expect("write titles");
    taskflow(&workspace)
        .args(["subtask", "generate", &id, "--from"])
        .arg(&bad_titles)
        .assert()
        .failure()
        .code(2)
        .stderr(contains("Malformed suggestion"));

    // Store untouched by the failed call.
    assert!(workspace.load().tasks[0].subtasks.is_empty());

    std::fs::write(&bad_titles, r#"["draft spec", "review"]"#).expect("rewrite titles");
    taskflow(&workspace)
        .args(["subtask", "generate", &id, "--from"])
        .arg(&bad_titles)
        .assert()
        .success();
    assert_eq!(workspace.load().tasks[0].subtasks.len(), 2);
}

#[test]
fn list_filters_and_actor_show() {
    let workspace = TestWorkspace::new();
    let mut mine = support::task_at(1, "Design mockup", 0);
    mine.assignee_id = Some("emp-2".to_string());
    mine.tags = vec!["Design".to_string()];
    let theirs = support::task_at(2, "Auth API", 0);
    workspace.seed(vec![mine, theirs]);

    // Bob is not an admin; he only sees his own task.
    let output = taskflow(&workspace)
        .env("TASKFLOW_ACTOR", "emp-2")
        .args(["task", "list", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("list json");
    assert_eq!(value["data"].as_array().expect("array").len(), 1);

    // Admin search that misses the assignee filter is excluded.
    let output = taskflow(&workspace)
        .args(["task", "list", "--search", "design", "--assignee", "emp-1", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: Value = serde_json::from_slice(&output).expect("list json");
    assert_eq!(value["data"].as_array().expect("array").len(), 0);

    taskflow(&workspace)
        .args(["actor", "show"])
        .assert()
        .success()
        .stdout(contains("Alice Johnson"));
}

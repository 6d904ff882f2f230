use std::io::{self, Write};

use color_eyre::Result;
use ticklist_core::{
    storage::KeyValueStore,
    tasks::{Task, TaskId},
};
use ticklist_store::{TaskStore, ViewModel};

use crate::{cli::TaskCommand, config, storage};

/// Execute a task subcommand against the configured file store.
pub fn handle(cmd: TaskCommand, config: &config::Config) -> Result<()> {
    let mut store = storage::open_task_store(config)?;
    let stdout = io::stdout();
    run(cmd, &mut store, &mut stdout.lock())
}

/// Apply one command and report the outcome. Rejected input is reported, not an error.
pub fn run<S: KeyValueStore>(
    cmd: TaskCommand,
    store: &mut TaskStore<S>,
    out: &mut impl Write,
) -> Result<()> {
    match cmd {
        TaskCommand::List { filter, json } => {
            store.set_filter(filter);
            let view = store.view();
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&view)?)?;
            } else {
                print_view(&view, out)?;
            }
        }
        TaskCommand::Add { text } => match store.add_task(&text.join(" ")) {
            Some(id) => {
                let task = store
                    .get(&id)
                    .ok_or_else(|| color_eyre::eyre::eyre!("added task {id} vanished"))?;
                writeln!(out, "Created task {}: {}", task.id, task.text)?;
            }
            None => writeln!(out, "Nothing added: task text is blank.")?,
        },
        TaskCommand::Toggle { id } => {
            let id = resolve(store, id);
            if store.toggle_task(&id) {
                if let Some(task) = store.get(&id) {
                    let state = if task.completed { "done" } else { "active" };
                    writeln!(out, "Marked {state}: {}", task.text)?;
                }
            } else {
                writeln!(out, "No task with id {id}.")?;
            }
        }
        TaskCommand::Delete { id } => {
            let id = resolve(store, id);
            if store.delete_task(&id) {
                writeln!(out, "Deleted task {id}.")?;
            } else {
                writeln!(out, "No task with id {id}.")?;
            }
        }
        TaskCommand::Edit { id, text } => {
            let id = resolve(store, id);
            let Some(current) = store.get(&id).map(|t| t.text.clone()) else {
                writeln!(out, "No task with id {id}.")?;
                return Ok(());
            };
            store.start_editing(&id, &current);
            store.change_edit_buffer(&text.join(" "));
            if store.save_edit(&id) {
                if let Some(task) = store.get(&id) {
                    writeln!(out, "Updated task {id}: {}", task.text)?;
                }
            } else {
                store.cancel_editing();
                writeln!(out, "Task {id} unchanged: new text is blank.")?;
            }
        }
        TaskCommand::ClearCompleted => {
            let removed = store.clear_completed();
            writeln!(out, "Cleared {removed} completed task(s).")?;
        }
    }
    Ok(())
}

/// Digits typed on the command line parse as a numeric id; fall back to a
/// text id spelled the same way when only that exists.
fn resolve<S: KeyValueStore>(store: &TaskStore<S>, id: TaskId) -> TaskId {
    if store.get(&id).is_some() {
        return id;
    }
    match id {
        TaskId::Num(n) => {
            let text = TaskId::Text(n.to_string());
            if store.get(&text).is_some() {
                text
            } else {
                id
            }
        }
        TaskId::Text(_) => id,
    }
}

fn print_view(view: &ViewModel, out: &mut impl Write) -> io::Result<()> {
    if view.total() == 0 {
        return writeln!(out, "No tasks yet. Add one with `ticklist add <text>`.");
    }
    if view.tasks.is_empty() {
        writeln!(out, "No {} tasks.", view.filter)?;
    }
    for task in &view.tasks {
        writeln!(out, "{}", task_line(task))?;
    }
    writeln!(
        out,
        "\n{} active, {} completed (showing {})",
        view.active_count, view.completed_count, view.filter
    )
}

fn task_line(task: &Task) -> String {
    let mark = if task.completed { "x" } else { " " };
    format!("[{mark}] {}  {}", task.id, task.text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticklist_core::{
        storage::InMemoryStore,
        tasks::{FilterMode, TaskId},
    };

    fn exec(cmd: TaskCommand, store: &mut TaskStore<InMemoryStore>) -> String {
        let mut out = Vec::new();
        run(cmd, store, &mut out).expect("command should succeed");
        String::from_utf8(out).expect("utf8 output")
    }

    fn add(store: &mut TaskStore<InMemoryStore>, text: &str) -> TaskId {
        store.add_task(text).expect("add")
    }

    #[test]
    fn add_reports_created_task() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let output = exec(
            TaskCommand::Add {
                text: vec!["buy".into(), "milk".into()],
            },
            &mut store,
        );
        assert!(output.starts_with("Created task "));
        assert!(output.trim_end().ends_with(": buy milk"));
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn blank_add_is_reported_not_failed() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let output = exec(
            TaskCommand::Add {
                text: vec!["  ".into()],
            },
            &mut store,
        );
        assert_eq!(output, "Nothing added: task text is blank.\n");
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn list_filters_and_marks_completed() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let milk = add(&mut store, "buy milk");
        add(&mut store, "walk dog");
        store.toggle_task(&milk);

        let output = exec(
            TaskCommand::List {
                filter: FilterMode::Completed,
                json: false,
            },
            &mut store,
        );
        assert!(output.contains(&format!("[x] {milk}  buy milk")));
        assert!(!output.contains("walk dog"));
        assert!(output.contains("1 active, 1 completed (showing completed)"));
    }

    #[test]
    fn list_empty_store_hints_at_add() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let output = exec(
            TaskCommand::List {
                filter: FilterMode::All,
                json: false,
            },
            &mut store,
        );
        assert!(output.starts_with("No tasks yet."));
    }

    #[test]
    fn list_json_emits_view_model() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        add(&mut store, "a");
        let output = exec(
            TaskCommand::List {
                filter: FilterMode::Active,
                json: true,
            },
            &mut store,
        );
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");
        assert_eq!(value["filter"], "active");
        assert_eq!(value["tasks"][0]["text"], "a");
        assert_eq!(value["edit"]["state"], "idle");
    }

    #[test]
    fn toggle_and_delete_unknown_ids_are_notices() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let output = exec(TaskCommand::Toggle { id: TaskId::Num(9) }, &mut store);
        assert_eq!(output, "No task with id 9.\n");
        let output = exec(TaskCommand::Delete { id: TaskId::Num(9) }, &mut store);
        assert_eq!(output, "No task with id 9.\n");
    }

    #[test]
    fn toggle_reports_new_state() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let id = add(&mut store, "a");
        assert_eq!(
            exec(TaskCommand::Toggle { id: id.clone() }, &mut store),
            "Marked done: a\n"
        );
        assert_eq!(exec(TaskCommand::Toggle { id }, &mut store), "Marked active: a\n");
    }

    #[test]
    fn edit_replaces_text_or_keeps_it_when_blank() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let id = add(&mut store, "a");

        let output = exec(
            TaskCommand::Edit {
                id: id.clone(),
                text: vec!["b".into()],
            },
            &mut store,
        );
        assert_eq!(output, format!("Updated task {id}: b\n"));

        let output = exec(
            TaskCommand::Edit {
                id: id.clone(),
                text: vec![" ".into()],
            },
            &mut store,
        );
        assert_eq!(output, format!("Task {id} unchanged: new text is blank.\n"));
        assert_eq!(store.get(&id).expect("task").text, "b");
    }

    #[test]
    fn clear_completed_reports_count() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let a = add(&mut store, "a");
        add(&mut store, "b");
        store.toggle_task(&a);

        let output = exec(TaskCommand::ClearCompleted, &mut store);
        assert_eq!(output, "Cleared 1 completed task(s).\n");
        assert_eq!(store.tasks().len(), 1);
    }

    #[test]
    fn commands_reach_tasks_with_text_ids() {
        let backing = InMemoryStore::new();
        backing
            .put(
                ticklist_store::DEFAULT_SLOT,
                br#"[{"id":"a1","text":"x","completed":false},{"id":"42","text":"y","completed":false}]"#,
            )
            .expect("put");
        let mut store = TaskStore::with_store(backing);

        let id: TaskId = "a1".parse().expect("infallible");
        assert_eq!(exec(TaskCommand::Toggle { id }, &mut store), "Marked done: x\n");
        // "42" parses as a number but still finds the task stored under the string "42".
        let id: TaskId = "42".parse().expect("infallible");
        assert_eq!(exec(TaskCommand::Delete { id }, &mut store), "Deleted task 42.\n");
        assert_eq!(store.tasks().len(), 1);
    }
}

use serde::Serialize;
use ticklist_core::tasks::{FilterMode, Task, TaskId};

/// Which task (if any) is being text-edited, with its in-progress buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum EditSession {
    #[default]
    Idle,
    Editing { id: TaskId, buffer: String },
}

impl EditSession {
    pub fn editing_id(&self) -> Option<&TaskId> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing { id, .. } => Some(id),
        }
    }

    pub fn buffer(&self) -> Option<&str> {
        match self {
            EditSession::Idle => None,
            EditSession::Editing { buffer, .. } => Some(buffer),
        }
    }

    pub fn is_editing(&self, id: &TaskId) -> bool {
        self.editing_id() == Some(id)
    }
}

/// What a successful mutation did. Passed to observers alongside the new view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    TaskAdded(TaskId),
    TaskToggled { id: TaskId, completed: bool },
    TaskDeleted(TaskId),
    TaskEdited(TaskId),
    CompletedCleared { removed: usize },
    EditStarted(TaskId),
    EditBufferChanged(TaskId),
    EditCancelled(TaskId),
    FilterChanged(FilterMode),
}

/// Everything a renderer needs, already filtered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewModel {
    /// Tasks visible under `filter`, in collection order.
    pub tasks: Vec<Task>,
    pub filter: FilterMode,
    pub edit: EditSession,
    pub active_count: usize,
    pub completed_count: usize,
}

impl ViewModel {
    pub fn total(&self) -> usize {
        self.active_count + self.completed_count
    }
}

use ticklist_core::{
    storage::KeyValueStore,
    tasks::{normalize_text, FilterMode, Task, TaskId},
};
use tracing::{debug, warn};

use crate::{
    persistence::PersistenceAdapter,
    view::{Change, EditSession, ViewModel},
};

/// Handle returned by [`TaskStore::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&Change, &ViewModel)>;

/// Authoritative owner of the task collection, the filter and the edit session.
///
/// Operations never fail: blank text and unknown ids leave the state untouched
/// and return `false`/`None`. Every change to the collection is written through
/// the persistence adapter before observers are notified; write failures are
/// logged and the in-memory state stays authoritative.
pub struct TaskStore<S: KeyValueStore> {
    tasks: Vec<Task>,
    filter: FilterMode,
    edit: EditSession,
    last_issued: Option<i64>,
    persistence: PersistenceAdapter<S>,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl<S: KeyValueStore> TaskStore<S> {
    /// Hydrate from the adapter's slot. Filter starts at `All`, editing at `Idle`.
    pub fn open(persistence: PersistenceAdapter<S>) -> Self {
        let tasks = persistence.load();
        let last_issued = tasks.iter().filter_map(|t| t.id.as_num()).max();
        Self {
            tasks,
            filter: FilterMode::default(),
            edit: EditSession::Idle,
            last_issued,
            persistence,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Shorthand for [`TaskStore::open`] over the default slot.
    pub fn with_store(store: S) -> Self {
        Self::open(PersistenceAdapter::new(store))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == *id)
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Append a new open task. Returns its id, or `None` when `text` is blank.
    pub fn add_task(&mut self, text: &str) -> Option<TaskId> {
        let Some(text) = normalize_text(text) else {
            debug!("ignoring blank task");
            return None;
        };
        let id = self.issue_id();
        self.tasks.push(Task::new(id.clone(), text));
        debug!(%id, "task added");
        self.commit(Change::TaskAdded(id.clone()));
        Some(id)
    }

    pub fn toggle_task(&mut self, id: &TaskId) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) else {
            debug!(%id, "toggle ignored, no such task");
            return false;
        };
        task.completed = !task.completed;
        let completed = task.completed;
        debug!(%id, completed, "task toggled");
        self.commit(Change::TaskToggled {
            id: id.clone(),
            completed,
        });
        true
    }

    /// Remove a task. Deleting the task under edit also ends the edit session.
    pub fn delete_task(&mut self, id: &TaskId) -> bool {
        let Some(index) = self.tasks.iter().position(|t| t.id == *id) else {
            debug!(%id, "delete ignored, no such task");
            return false;
        };
        self.tasks.remove(index);
        if self.edit.is_editing(id) {
            self.edit = EditSession::Idle;
        }
        debug!(%id, "task deleted");
        self.commit(Change::TaskDeleted(id.clone()));
        true
    }

    /// Enter edit mode on `id` with `current_text` as the buffer.
    /// Any other open session is dropped without saving.
    pub fn start_editing(&mut self, id: &TaskId, current_text: &str) -> bool {
        if self.get(id).is_none() {
            debug!(%id, "edit ignored, no such task");
            return false;
        }
        if let Some(previous) = self.edit.editing_id().filter(|prev| *prev != id) {
            debug!(%previous, "discarding unsaved edit");
        }
        self.edit = EditSession::Editing {
            id: id.clone(),
            buffer: current_text.to_string(),
        };
        self.notify(Change::EditStarted(id.clone()));
        true
    }

    pub fn change_edit_buffer(&mut self, text: &str) -> bool {
        let EditSession::Editing { id, buffer } = &mut self.edit else {
            return false;
        };
        buffer.clear();
        buffer.push_str(text);
        let id = id.clone();
        self.notify(Change::EditBufferChanged(id));
        true
    }

    /// Commit the buffer to `id`. A blank buffer keeps the session open.
    pub fn save_edit(&mut self, id: &TaskId) -> bool {
        let EditSession::Editing {
            id: editing,
            buffer,
        } = &self.edit
        else {
            return false;
        };
        if editing != id {
            debug!(%id, editing = %editing, "save ignored, task is not being edited");
            return false;
        }
        let Some(text) = normalize_text(buffer).map(str::to_owned) else {
            debug!(%id, "save ignored, blank text");
            return false;
        };
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == *id) else {
            // Session outlived its task; close it like a cancel.
            warn!(%id, "edited task is gone, closing edit session");
            self.edit = EditSession::Idle;
            self.notify(Change::EditCancelled(id.clone()));
            return false;
        };
        task.text = text;
        self.edit = EditSession::Idle;
        debug!(%id, "task edited");
        self.commit(Change::TaskEdited(id.clone()));
        true
    }

    /// Leave edit mode without saving.
    pub fn cancel_editing(&mut self) -> bool {
        let Some(id) = self.edit.editing_id().cloned() else {
            return false;
        };
        self.edit = EditSession::Idle;
        self.notify(Change::EditCancelled(id));
        true
    }

    /// Drop every completed task, keeping the order of the rest. Returns how many went.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.completed);
        let removed = before - self.tasks.len();
        if removed == 0 {
            return 0;
        }
        let orphaned = self.edit.editing_id().is_some_and(|id| self.get(id).is_none());
        if orphaned {
            self.edit = EditSession::Idle;
        }
        debug!(removed, "cleared completed tasks");
        self.commit(Change::CompletedCleared { removed });
        removed
    }

    pub fn set_filter(&mut self, mode: FilterMode) -> bool {
        if self.filter == mode {
            return false;
        }
        self.filter = mode;
        self.notify(Change::FilterChanged(mode));
        true
    }

    /// Tasks visible under `mode`, in collection order.
    pub fn filtered_view(&self, mode: FilterMode) -> Vec<&Task> {
        self.tasks.iter().filter(|t| mode.matches(t)).collect()
    }

    /// Snapshot of everything a renderer needs under the current filter.
    pub fn view(&self) -> ViewModel {
        let completed_count = self.tasks.iter().filter(|t| t.completed).count();
        ViewModel {
            tasks: self
                .filtered_view(self.filter)
                .into_iter()
                .cloned()
                .collect(),
            filter: self.filter,
            edit: self.edit.clone(),
            active_count: self.tasks.len() - completed_count,
            completed_count,
        }
    }

    /// Register a callback run after every successful mutation.
    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&Change, &ViewModel) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Next numeric id after the last one issued. Once the numeric range is
    /// used up, hand out the largest value not already taken.
    fn issue_id(&mut self) -> TaskId {
        let id = TaskId::next_after(self.last_issued).unwrap_or_else(|| {
            warn!("numeric task ids exhausted, reusing a free value");
            (i64::MIN..=i64::MAX)
                .rev()
                .map(TaskId::Num)
                .find(|candidate| self.get(candidate).is_none())
                .unwrap_or(TaskId::Num(i64::MIN))
        });
        if let Some(n) = id.as_num() {
            self.last_issued = Some(self.last_issued.map_or(n, |prev| prev.max(n)));
        }
        id
    }

    fn commit(&mut self, change: Change) {
        if let Err(err) = self.persistence.save(&self.tasks) {
            warn!(
                slot = %self.persistence.slot(),
                error = %err,
                "failed to save tasks, keeping in-memory state"
            );
        }
        self.notify(change);
    }

    fn notify(&mut self, change: Change) {
        if self.observers.is_empty() {
            return;
        }
        let view = self.view();
        for (_, observer) in &mut self.observers {
            observer(&change, &view);
        }
    }
}

use std::{cell::RefCell, rc::Rc};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ticklist_core::{
    storage::KeyValueStore,
    tasks::{FilterMode, TaskId},
};
use ticklist_store::{Change, TaskStore, ViewModel};

/// Input state that lives in the UI, not in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Typing a new task; the draft is not persisted until committed.
    Adding(String),
}

/// Interactive state: the store plus cursor and input mode.
pub struct App<S: KeyValueStore> {
    store: TaskStore<S>,
    mode: Mode,
    selected: usize,
    status: Rc<RefCell<String>>,
    should_quit: bool,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(mut store: TaskStore<S>) -> Self {
        let status = Rc::new(RefCell::new(String::new()));
        let sink = Rc::clone(&status);
        store.subscribe(move |change, view| *sink.borrow_mut() = describe(change, view));
        Self {
            store,
            mode: Mode::Normal,
            selected: 0,
            status,
            should_quit: false,
        }
    }

    pub fn view(&self) -> ViewModel {
        self.store.view()
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn status(&self) -> String {
        self.status.borrow().clone()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    #[cfg(test)]
    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if let Some(id) = self.store.edit_session().editing_id().cloned() {
            self.handle_edit_key(id, key.code);
        } else if let Mode::Adding(_) = self.mode {
            self.handle_add_key(key.code);
        } else {
            self.handle_normal_key(key.code);
        }
        self.clamp_selection();
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.selected = self.selected.saturating_add(1),
            KeyCode::Char('k') | KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Char(' ') | KeyCode::Char('x') => {
                if let Some((id, _)) = self.selected_task() {
                    self.store.toggle_task(&id);
                }
            }
            KeyCode::Char('a') => self.mode = Mode::Adding(String::new()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some((id, text)) = self.selected_task() {
                    self.store.start_editing(&id, &text);
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some((id, _)) = self.selected_task() {
                    self.store.delete_task(&id);
                }
            }
            KeyCode::Char('c') => {
                if self.store.clear_completed() == 0 {
                    self.set_status("Nothing completed to clear");
                }
            }
            KeyCode::Char('f') | KeyCode::Tab => {
                let next = self.store.filter().cycle();
                self.store.set_filter(next);
            }
            KeyCode::Char('1') => {
                self.store.set_filter(FilterMode::All);
            }
            KeyCode::Char('2') => {
                self.store.set_filter(FilterMode::Active);
            }
            KeyCode::Char('3') => {
                self.store.set_filter(FilterMode::Completed);
            }
            _ => {}
        }
    }

    fn handle_add_key(&mut self, code: KeyCode) {
        let Mode::Adding(draft) = &mut self.mode else {
            return;
        };
        match code {
            KeyCode::Esc => self.mode = Mode::Normal,
            KeyCode::Enter => {
                let draft = draft.clone();
                match self.store.add_task(&draft) {
                    Some(id) => {
                        self.mode = Mode::Normal;
                        self.select(&id);
                    }
                    None => self.set_status("Task text cannot be blank"),
                }
            }
            KeyCode::Backspace => {
                draft.pop();
            }
            KeyCode::Char(c) => draft.push(c),
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, id: TaskId, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.store.cancel_editing();
            }
            KeyCode::Enter => {
                if !self.store.save_edit(&id) {
                    self.set_status("Task text cannot be blank");
                }
            }
            KeyCode::Backspace => {
                let mut buffer = self.edit_buffer();
                buffer.pop();
                self.store.change_edit_buffer(&buffer);
            }
            KeyCode::Char(c) => {
                let mut buffer = self.edit_buffer();
                buffer.push(c);
                self.store.change_edit_buffer(&buffer);
            }
            _ => {}
        }
    }

    fn edit_buffer(&self) -> String {
        self.store
            .edit_session()
            .buffer()
            .map(str::to_owned)
            .unwrap_or_default()
    }

    fn selected_task(&self) -> Option<(TaskId, String)> {
        self.store
            .filtered_view(self.store.filter())
            .get(self.selected)
            .map(|t| (t.id.clone(), t.text.clone()))
    }

    fn select(&mut self, id: &TaskId) {
        if let Some(index) = self
            .store
            .filtered_view(self.store.filter())
            .iter()
            .position(|t| t.id == *id)
        {
            self.selected = index;
        }
    }

    fn clamp_selection(&mut self) {
        let visible = self.store.filtered_view(self.store.filter()).len();
        self.selected = self.selected.min(visible.saturating_sub(1));
    }

    fn set_status(&self, message: &str) {
        *self.status.borrow_mut() = message.to_string();
    }
}

fn describe(change: &Change, view: &ViewModel) -> String {
    match change {
        Change::TaskAdded(_) => format!("Added task ({} total)", view.total()),
        Change::TaskToggled {
            completed: true, ..
        } => "Marked done".to_string(),
        Change::TaskToggled { .. } => "Marked active".to_string(),
        Change::TaskDeleted(_) => "Deleted task".to_string(),
        Change::TaskEdited(_) => "Saved edit".to_string(),
        Change::CompletedCleared { removed } => format!("Cleared {removed} completed"),
        Change::EditStarted(_) | Change::EditBufferChanged(_) => {
            "Editing: Enter to save, Esc to cancel".to_string()
        }
        Change::EditCancelled(_) => "Edit cancelled".to_string(),
        Change::FilterChanged(mode) => format!("Showing {mode} tasks"),
    }
}

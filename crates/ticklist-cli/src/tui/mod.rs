mod app;

use std::{io, time::Duration};

use color_eyre::Result;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem, ListState, Paragraph, Tabs},
    Frame, Terminal,
};
use ticklist_core::{
    storage::KeyValueStore,
    tasks::{FilterMode, Task},
};
use ticklist_store::{EditSession, TaskStore};

use app::{App, Mode};

/// Interactive task list. Press `q` or `Esc` to exit.
pub fn launch<S: KeyValueStore>(store: TaskStore<S>) -> Result<()> {
    // Guard restores the terminal even if we early-return.
    let guard = TerminalGuard::enter()?;
    let mut terminal = guard.terminal()?;
    let mut app = App::new(store);

    while !app.should_quit() {
        terminal.draw(|frame| draw(frame, &app))?;

        if event::poll(Duration::from_millis(150))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key);
                }
            }
        }
    }

    Ok(())
}

fn draw<S: KeyValueStore>(frame: &mut Frame, app: &App<S>) {
    let view = app.view();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let selected_tab = FilterMode::ALL
        .iter()
        .position(|mode| *mode == view.filter)
        .unwrap_or(0);
    let tabs = Tabs::new(FilterMode::ALL.iter().map(|mode| filter_title(*mode)))
        .select(selected_tab)
        .highlight_style(
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled(
                    "ticklist",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )),
        );
    frame.render_widget(tabs, chunks[0]);

    let items: Vec<ListItem> = view
        .tasks
        .iter()
        .map(|task| ListItem::new(task_line(task, &view.edit)))
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title("Tasks"))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !view.tasks.is_empty() {
        state.select(Some(app.selected()));
    }
    frame.render_stateful_widget(list, chunks[1], &mut state);

    let (input_title, input_text) = match (&view.edit, app.mode()) {
        (EditSession::Editing { buffer, .. }, _) => ("Edit task", buffer.as_str()),
        (EditSession::Idle, Mode::Adding(draft)) => ("New task", draft.as_str()),
        (EditSession::Idle, Mode::Normal) => ("Input", ""),
    };
    let input = Paragraph::new(Line::from(vec![
        Span::raw(input_text.to_string()),
        Span::styled("_", Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL).title(input_title));
    frame.render_widget(input, chunks[2]);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(
            format!("{} left, {} done", view.active_count, view.completed_count),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw("  "),
        Span::raw(app.status()),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title("a add  e edit  space toggle  d delete  c clear  f filter  q quit"),
    );
    frame.render_widget(footer, chunks[3]);
}

fn filter_title(mode: FilterMode) -> &'static str {
    match mode {
        FilterMode::All => "1 All",
        FilterMode::Active => "2 Active",
        FilterMode::Completed => "3 Completed",
    }
}

fn task_line<'a>(task: &'a Task, edit: &EditSession) -> Line<'a> {
    let (mark, color) = if task.completed {
        ("[x]", Color::Green)
    } else {
        ("[ ]", Color::Yellow)
    };
    let text_style = if task.completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default()
    };
    let mut spans = vec![
        Span::styled(mark, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::raw(" "),
        Span::styled(task.text.as_str(), text_style),
    ];
    if edit.is_editing(&task.id) {
        spans.push(Span::styled(" (editing)", Style::default().fg(Color::Cyan)));
    }
    Line::from(spans)
}

struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode()?;
        // Enter alternate screen to avoid polluting the shell buffer.
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self)
    }

    fn terminal(&self) -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
        let backend = CrosstermBackend::new(io::stdout());
        Ok(Terminal::new(backend)?)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Best-effort cleanup; errors are logged but not propagated from Drop.
        if let Err(err) = disable_raw_mode() {
            eprintln!("failed to disable raw mode: {err}");
        }
        if let Err(err) = execute!(io::stdout(), LeaveAlternateScreen) {
            eprintln!("failed to restore terminal: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::{backend::TestBackend, Terminal};
    use ticklist_core::storage::InMemoryStore;

    use super::*;

    fn render(app: &App<InMemoryStore>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 16)).expect("terminal");
        terminal.draw(|frame| draw(frame, app)).expect("draw");
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn renders_tasks_and_counts() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let milk = store.add_task("buy milk").expect("add");
        store.add_task("walk dog").expect("add");
        store.toggle_task(&milk);
        let app = App::new(store);

        let screen = render(&app);
        assert!(screen.contains("[x] buy milk"));
        assert!(screen.contains("[ ] walk dog"));
        assert!(screen.contains("1 left, 1 done"));
        assert!(screen.contains("3 Completed"));
    }

    #[test]
    fn marks_task_under_edit() {
        let mut store = TaskStore::with_store(InMemoryStore::new());
        let id = store.add_task("a").expect("add");
        store.start_editing(&id, "draft");
        let app = App::new(store);

        let screen = render(&app);
        assert!(screen.contains("(editing)"));
        assert!(screen.contains("Edit task"));
        assert!(screen.contains("draft_"));
    }
}

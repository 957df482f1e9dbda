use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Terminal,
};

use tasks_api::application::task_service::{TaskService, TaskServiceImpl};
use tasks_api::domain::{
    repository::TaskRepository,
    task::{CreateTask, Task, UpdateTask},
};
use tasks_api::infrastructure::sqlite_repo::{prepare_sqlite_file, SqliteTaskRepository};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://tasks.db".to_string());
    prepare_sqlite_file(&database_url)?;
    let repo = SqliteTaskRepository::connect(&database_url).await?;
    repo.init().await?;
    let service = TaskServiceImpl::new(repo);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, service).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    View,
    Create,
    Edit,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Filter {
    All,
    Active,
    Completed,
}

impl Filter {
    fn label(self) -> &'static str {
        match self {
            Filter::All => "All",
            Filter::Active => "Active",
            Filter::Completed => "Completed",
        }
    }
}

struct App<R: TaskRepository> {
    service: TaskServiceImpl<R>,
    items: Vec<Task>,
    selected: usize,
    last_tick: Instant,
    mode: Mode,
    list_state: ListState,
    filter: Filter,
    filtered_indices: Vec<usize>,
    draft_title: String,
}

impl<R: TaskRepository> App<R> {
    /// Re-fetch the full list; the local copy is a read-through cache
    /// invalidated after every mutating call.
    async fn load(&mut self) -> Result<()> {
        self.items = self.service.list().await?;
        self.recompute_filtered();
        Ok(())
    }

    fn recompute_filtered(&mut self) {
        self.filtered_indices.clear();
        for (i, task) in self.items.iter().enumerate() {
            let include = match self.filter {
                Filter::All => true,
                Filter::Active => !task.completed,
                Filter::Completed => task.completed,
            };
            if include {
                self.filtered_indices.push(i);
            }
        }
        // Clamp selection within filtered bounds
        let len = self.filtered_indices.len();
        if len == 0 {
            self.selected = 0;
            self.list_state.select(None);
        } else {
            if self.selected >= len {
                self.selected = len - 1;
            }
            self.list_state.select(Some(self.selected));
        }
    }

    fn selected_task(&self) -> Option<&Task> {
        self.filtered_indices
            .get(self.selected)
            .and_then(|&idx| self.items.get(idx))
    }
}

async fn run_app<R: TaskRepository>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    service: TaskServiceImpl<R>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut app = App {
        service,
        items: vec![],
        selected: 0,
        last_tick: Instant::now(),
        mode: Mode::View,
        list_state: ListState::default(),
        filter: Filter::All,
        filtered_indices: Vec::new(),
        draft_title: String::new(),
    };
    app.load().await?;

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let header = Paragraph::new("Tasks (Enter: toggle, n: new, e: edit, d: delete, f: filter, q: quit)  |  New/Edit: type title, Enter to save, Esc to cancel")
                .block(Block::default().borders(Borders::ALL).title("tasks-tui"));
            f.render_widget(header, chunks[0]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(chunks[1]);

            let list_items: Vec<ListItem> = app
                .filtered_indices
                .iter()
                .filter_map(|&idx| app.items.get(idx))
                .map(|t| {
                    let mark = if t.completed { "[x]" } else { "[ ]" };
                    ListItem::new(format!("{} {}", mark, t.title))
                })
                .collect();
            if app.filtered_indices.is_empty() {
                app.list_state.select(None);
            } else {
                app.list_state.select(Some(app.selected));
            }
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title(format!("items [{}]", app.filter.label())))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            let detail = match app.selected_task() {
                Some(t) => format!(
                    "Title:\n{}\n\nStatus: {}\n\nCreated:\n{}",
                    t.title,
                    if t.completed { "Completed" } else { "Active" },
                    t.created_at.to_rfc3339(),
                ),
                None => String::new(),
            };
            let details = Paragraph::new(detail)
                .block(Block::default().borders(Borders::ALL).title("details"));
            f.render_widget(details, middle[1]);

            let footer_text = match app.mode {
                Mode::View => format!(
                    "DATABASE_URL={}  |  Filter=[{}]",
                    std::env::var("DATABASE_URL").unwrap_or_default(),
                    app.filter.label()
                ),
                Mode::Create | Mode::Edit => format!(
                    "Title: {}_  |  (Enter to save, Esc to cancel)",
                    app.draft_title
                ),
            };
            let footer = Paragraph::new(footer_text)
                .block(Block::default().borders(Borders::ALL).title(match app.mode {
                    Mode::View => "info",
                    Mode::Create => "create",
                    Mode::Edit => "edit",
                }));
            f.render_widget(footer, chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match app.mode {
                    Mode::View => match key.code {
                        KeyCode::Char('q') => break,
                        KeyCode::Up => {
                            if app.selected > 0 {
                                app.selected -= 1;
                            }
                        }
                        KeyCode::Down => {
                            let len = app.filtered_indices.len();
                            if app.selected + 1 < len {
                                app.selected += 1;
                            }
                        }
                        KeyCode::Enter => {
                            if let Some((id, completed)) =
                                app.selected_task().map(|t| (t.id, t.completed))
                            {
                                let _ = app
                                    .service
                                    .update(id, UpdateTask { title: None, completed: Some(!completed) })
                                    .await;
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('n') => {
                            app.mode = Mode::Create;
                            app.draft_title.clear();
                        }
                        KeyCode::Char('e') => {
                            if let Some(task) = app.selected_task() {
                                app.draft_title = task.title.clone();
                                app.mode = Mode::Edit;
                            }
                        }
                        KeyCode::Char('d') => {
                            if let Some(id) = app.selected_task().map(|t| t.id) {
                                let _ = app.service.delete(id).await;
                                if app.selected > 0 {
                                    app.selected -= 1;
                                }
                                app.load().await?;
                            }
                        }
                        KeyCode::Char('f') => {
                            app.filter = match app.filter {
                                Filter::All => Filter::Active,
                                Filter::Active => Filter::Completed,
                                Filter::Completed => Filter::All,
                            };
                            app.recompute_filtered();
                        }
                        _ => {}
                    },
                    Mode::Create => match key.code {
                        KeyCode::Esc => {
                            app.mode = Mode::View;
                            app.draft_title.clear();
                        }
                        KeyCode::Enter => {
                            if !app.draft_title.trim().is_empty() {
                                let _ = app
                                    .service
                                    .create(CreateTask { title: app.draft_title.clone() })
                                    .await;
                            }
                            app.mode = Mode::View;
                            app.draft_title.clear();
                            app.load().await?;
                        }
                        KeyCode::Backspace => {
                            app.draft_title.pop();
                        }
                        KeyCode::Char(c) => app.draft_title.push(c),
                        _ => {}
                    },
                    Mode::Edit => match key.code {
                        KeyCode::Esc => {
                            app.mode = Mode::View;
                            app.draft_title.clear();
                        }
                        KeyCode::Enter => {
                            if let Some(id) = app.selected_task().map(|t| t.id) {
                                if !app.draft_title.trim().is_empty() {
                                    let _ = app
                                        .service
                                        .update(
                                            id,
                                            UpdateTask {
                                                title: Some(app.draft_title.clone()),
                                                completed: None,
                                            },
                                        )
                                        .await;
                                }
                            }
                            app.mode = Mode::View;
                            app.draft_title.clear();
                            app.load().await?;
                        }
                        KeyCode::Backspace => {
                            app.draft_title.pop();
                        }
                        KeyCode::Char(c) => app.draft_title.push(c),
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}

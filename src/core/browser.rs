//! Terminal browser over the explorer view. Runs the same commands as the
//! command line against the focused folder.

use crate::core::expansion::{ExpandCommand, run_command};
use crate::domain::models::{ExpandConfig, FolderRef, Invocation, NotificationLevel};
use crate::infra::delay::DelayPolicy;
use crate::infra::explorer_view::Row;
use crate::infra::fs_host::FsHost;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{debug, info, warn};
use ratatui::{
    Frame, Terminal,
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::{io, time::Duration};

struct App<'a> {
    host: &'a mut FsHost,
    config: &'a ExpandConfig,
    delay: &'a dyn DelayPolicy,
    rows: Vec<Row>,
    state: ListState,
    help_message: String,
}

impl<'a> App<'a> {
    fn new(host: &'a mut FsHost, config: &'a ExpandConfig, delay: &'a dyn DelayPolicy) -> Self {
        let mut app = App {
            host,
            config,
            delay,
            rows: Vec::new(),
            state: ListState::default(),
            help_message: String::from(
                "↑/↓: Navigate | →/←: Expand/Collapse | e: Expand recursively | E: Expand all | c: Collapse all | q: Quit",
            ),
        };
        app.refresh();
        let focused = app
            .host
            .view()
            .focused()
            .and_then(|path| app.rows.iter().position(|row| row.path == path));
        if !app.rows.is_empty() {
            app.state.select(Some(focused.unwrap_or(0)));
        }
        app
    }

    fn refresh(&mut self) {
        self.rows = self.host.view().rows();
        if let Some(i) = self.state.selected()
            && i >= self.rows.len()
        {
            self.state
                .select(if self.rows.is_empty() { None } else { Some(self.rows.len() - 1) });
        }
    }

    fn selected_row(&self) -> Option<&Row> {
        self.state.selected().and_then(|i| self.rows.get(i))
    }

    fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.rows.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.rows.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    fn set_selected_expanded(&mut self, expanded: bool) {
        let Some(row) = self.selected_row() else {
            return;
        };
        if !row.is_dir {
            return;
        }
        let path = row.path.clone();
        self.host.view_mut().focus(&path);
        if let Err(e) = self.host.set_expanded(&path, expanded) {
            warn!("Failed to toggle {}: {}", path.display(), e);
        }
        self.refresh();
    }

    fn run(&mut self, command: ExpandCommand, invocation: Invocation) {
        self.host.reset_cancellation();
        let report = run_command(&mut *self.host, command, &invocation, self.config, self.delay);
        debug!("Browser command expanded {} folders", report.visited.len());
        self.refresh();
    }

    fn expand_selected_recursively(&mut self) {
        let Some(row) = self.selected_row() else {
            return;
        };
        let invocation = Invocation::default().with_primary(FolderRef::new(row.path.clone()));
        self.run(ExpandCommand::ExpandRecursively, invocation);
    }

    fn collapse_all(&mut self) {
        self.host.view_mut().collapse_all();
        self.refresh();
    }

    /// Returns `true` when the browser should close.
    fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('c') => self.collapse_all(),
            KeyCode::Char('e') => self.expand_selected_recursively(),
            KeyCode::Char('E') => self.run(ExpandCommand::ExpandAll, Invocation::default()),
            KeyCode::Right => self.set_selected_expanded(true),
            KeyCode::Left => self.set_selected_expanded(false),
            KeyCode::Down => self.next(),
            KeyCode::Up => self.previous(),
            _ => {}
        }
        false
    }

    fn status_line(&self) -> (String, Style) {
        match self.host.last_notification() {
            Some(n) if n.level == NotificationLevel::Error => {
                (n.text.clone(), Style::default().fg(Color::Red))
            }
            Some(n) => (n.text.clone(), Style::default().fg(Color::Green)),
            None => (String::new(), Style::default()),
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = Paragraph::new(Span::styled(
        "Explorer",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    f.render_widget(title, chunks[0]);

    let selected_style = Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.depth);
            let prefix = match (row.is_dir, row.expanded) {
                (true, true) => "▼ ",
                (true, false) => "► ",
                (false, _) => "  ",
            };
            let style = if row.is_dir {
                Style::default().fg(Color::Blue)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(format!("{}{}{}", indent, prefix, row.name), style))
        })
        .collect();

    let view = app.host.view();
    let title = format!(
        "Folders ({} expanded, {} selected)",
        view.expanded_count(),
        view.selection().len()
    );
    let tree = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(selected_style);
    f.render_stateful_widget(tree, chunks[1], &mut app.state);

    let (status, status_style) = app.status_line();
    f.render_widget(Paragraph::new(Span::styled(status, status_style)), chunks[2]);

    let controls = Paragraph::new(Span::styled(
        app.help_message.clone(),
        Style::default().fg(Color::DarkGray),
    ));
    f.render_widget(controls, chunks[3]);
}

pub fn run_browser(
    host: &mut FsHost,
    config: &ExpandConfig,
    delay: &dyn DelayPolicy,
) -> anyhow::Result<()> {
    info!("Opening explorer browser");
    host.set_echo(false);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(host, config, delay);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && app.handle_key(key.code, key.modifiers)
        {
            return Ok(());
        }
    }
}

use crate::domain::models::{Node, NodeId, Selection};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
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
use std::io;

const INDENT_MARKER: &str = "|   ";
const HELP_MESSAGE: &str =
    "↑/↓: Navigate | Space: Toggle selection | Enter: Submit | q: Quit";

/// One line of the tree view.
#[derive(Debug, Clone)]
pub struct Row {
    pub node: NodeId,
    pub name: String,
    pub depth: usize,
    pub is_file: bool,
    pub selected: bool,
}

/// Pre-order flattening of everything below `root`; root's children sit at depth 0.
pub fn flatten_rows(root: &Node) -> Vec<Row> {
    fn flatten_node(node: &Node, depth: usize, rows: &mut Vec<Row>) {
        for child in node.children() {
            rows.push(Row {
                node: child.id,
                name: child.name.clone(),
                depth,
                is_file: child.is_file(),
                selected: false,
            });
            if !child.is_file() {
                flatten_node(child, depth + 1, rows);
            }
        }
    }

    debug!("Generating rows for {}", root.path.display());
    let mut rows = Vec::new();
    flatten_node(root, 0, &mut rows);
    rows
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Browsing,
    Submitted,
    Cancelled,
}

/// How a session ended. Only a submitted session hands back its selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Submitted(Selection),
    Cancelled,
}

struct App {
    rows: Vec<Row>,
    list_state: ListState,
    selection: Selection,
    session: SessionState,
    title: String,
}

impl App {
    fn new(root: &Node) -> App {
        info!("Initializing file selector UI");
        let rows = flatten_rows(root);
        let mut list_state = ListState::default();
        if !rows.is_empty() {
            list_state.select(Some(0));
        }

        App {
            rows,
            list_state,
            selection: Selection::new(),
            session: SessionState::Browsing,
            title: format!("Select files to export from {}", root.name),
        }
    }

    fn focused(&self) -> Option<usize> {
        self.list_state.selected().filter(|&i| i < self.rows.len())
    }

    fn next(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = match self.focused() {
            Some(i) => (i + 1).min(self.rows.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    fn previous(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        let i = self.focused().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    fn first(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    fn last(&mut self) {
        if !self.rows.is_empty() {
            self.list_state.select(Some(self.rows.len() - 1));
        }
    }

    fn toggle_focused(&mut self) {
        let Some(i) = self.focused() else {
            return;
        };
        let row = &mut self.rows[i];
        if !row.is_file {
            debug!("Ignoring toggle on directory row: {}", row.name);
            return;
        }
        row.selected = self.selection.toggle(row.node);
        info!(
            "Updating state for: {} - {}",
            row.name,
            if row.selected { "Selected" } else { "Deselected" }
        );
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press || self.session != SessionState::Browsing {
            return;
        }
        debug!("Key input: {:?}", key.code);

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                info!("Selection cancelled");
                self.session = SessionState::Cancelled;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                info!("Quitting the application");
                self.session = SessionState::Cancelled;
            }
            KeyCode::Enter => {
                info!("Submitting {} selected files", self.selection.len());
                self.session = SessionState::Submitted;
            }
            KeyCode::Char(' ') => {
                self.toggle_focused();
                debug!("Status line: {}", self.status_line());
            }
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.previous(),
            KeyCode::Home => self.first(),
            KeyCode::End => self.last(),
            _ => {}
        }
    }

    fn status_line(&self) -> String {
        if self.selection.is_empty() {
            return HELP_MESSAGE.to_string();
        }
        let names: Vec<&str> = self
            .selection
            .ids()
            .iter()
            .filter_map(|id| self.rows.iter().find(|row| row.node == *id))
            .map(|row| row.name.as_str())
            .collect();
        format!("Selected: {}", names.join(", "))
    }

    fn into_outcome(self) -> SessionOutcome {
        match self.session {
            SessionState::Submitted => SessionOutcome::Submitted(self.selection),
            SessionState::Browsing | SessionState::Cancelled => SessionOutcome::Cancelled,
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(1),
                Constraint::Min(1),
                Constraint::Length(1),
            ]
            .as_ref(),
        )
        .split(f.area());

    let title = Paragraph::new(Span::styled(
        app.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    ));
    f.render_widget(title, chunks[0]);

    let focus_style = Style::default()
        .bg(Color::Blue)
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD);

    let items: Vec<ListItem> = app
        .rows
        .iter()
        .map(|row| {
            let symbol = if row.is_file { "-" } else { "+" };
            let content = format!("{}{} {}", INDENT_MARKER.repeat(row.depth), symbol, row.name);
            let style = if row.selected {
                Style::default().fg(Color::LightGreen)
            } else {
                Style::default()
            };
            ListItem::new(Span::styled(content, style))
        })
        .collect();

    let total_files = app.rows.iter().filter(|row| row.is_file).count();
    let file_list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            "Files ({} selected of {})",
            app.selection.len(),
            total_files
        )))
        .highlight_style(focus_style);

    f.render_stateful_widget(file_list, chunks[1], &mut app.list_state);

    let status_style = if app.selection.is_empty() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::LightGreen)
    };
    let status = Paragraph::new(Span::styled(app.status_line(), status_style));
    f.render_widget(status, chunks[2]);
}

/// Leaves raw mode and the alternate screen. Safe to call more than once.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen);
}

/// Runs the interactive session over `root` until the user submits or quits.
pub fn select_files(root: &Node) -> anyhow::Result<SessionOutcome> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        restore_terminal();
        return Err(e.into());
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = match Terminal::new(backend) {
        Ok(terminal) => terminal,
        Err(e) => {
            restore_terminal();
            return Err(e.into());
        }
    };

    let mut app = App::new(root);
    let result = run_app(&mut terminal, &mut app);

    restore_terminal();
    terminal.show_cursor()?;

    match result {
        Ok(()) => {
            let outcome = app.into_outcome();
            match &outcome {
                SessionOutcome::Submitted(selection) => {
                    info!("Selected {} files", selection.len())
                }
                SessionOutcome::Cancelled => info!("Session cancelled"),
            }
            Ok(outcome)
        }
        Err(err) => {
            warn!("Error during file selection: {:#}", err);
            Err(err)
        }
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    info!("Starting the file selector main loop");
    while app.session == SessionState::Browsing {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            app.handle_key(key);
        }
    }
    Ok(())
}

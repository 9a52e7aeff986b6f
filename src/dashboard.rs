//! Interactive dashboard
//!
//! Single-threaded: start/stop/restart block the event loop until the
//! docker-compose command returns.

use std::{io, time::Duration};

use anyhow::{Context, Result};
use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};

use crate::{
    docker::{Manager, runner::CommandRunner},
    project::Project,
};

const HELP: &str = "[s]tart  [d]rop  [r]estart  [u]pdate  ↑/↓ move  [q]uit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    Stop,
    Restart,
}

pub struct App<R> {
    projects: Vec<Project>,
    selected: usize,
    manager: Manager<R>,
    message: String,
    last_error: Option<String>,
}

impl<R: CommandRunner> App<R> {
    pub fn new(projects: Vec<Project>, manager: Manager<R>) -> Self {
        Self {
            projects,
            selected: 0,
            manager,
            message: "Welcome to docker-manager".to_string(),
            last_error: None,
        }
    }

    /// Handle a key press; returns true when the dashboard should close
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.projects.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('s') => self.apply(Action::Start),
            KeyCode::Char('d') => self.apply(Action::Stop),
            KeyCode::Char('r') => self.apply(Action::Restart),
            KeyCode::Char('u') => self.refresh_all(),
            _ => {}
        }
        false
    }

    fn apply(&mut self, action: Action) {
        let Some(project) = self.projects.get(self.selected) else {
            return;
        };

        let result = match action {
            Action::Start => self.manager.start(project),
            Action::Stop => self.manager.stop(project),
            Action::Restart => self.manager.restart(project, None),
        };

        let name = project.name.clone();
        match result {
            Ok(()) => {
                let verb = match action {
                    Action::Start => "started",
                    Action::Stop => "stopped",
                    Action::Restart => "restarted",
                };
                self.set_message(format!("✅ Project {} {}", name, verb));
                self.last_error = None;
            }
            Err(e) => self.last_error = Some(format!("{:#}", e)),
        }

        if let Some(project) = self.projects.get_mut(self.selected) {
            self.manager.refresh(project);
        }
    }

    fn refresh_all(&mut self) {
        for project in &mut self.projects {
            self.manager.refresh(project);
        }
        self.set_message("Statuses refreshed".to_string());
    }

    fn set_message(&mut self, message: String) {
        self.message = format!("[{}] {}", Local::now().format("%H:%M:%S"), message);
    }

    fn render(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
            ])
            .split(frame.area());

        let title = Paragraph::new("🐳 docker-manager").style(
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(title, chunks[0]);

        let items: Vec<ListItem> = self
            .projects
            .iter()
            .map(|p| ListItem::new(format!("{:<20}  {}", p.name, p.status_string())))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Projects"))
            .highlight_style(
                Style::default()
                    .fg(Color::White)
                    .bg(Color::Magenta),
            );

        let mut state = ListState::default();
        if !self.projects.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(list, chunks[1], &mut state);

        frame.render_widget(
            Paragraph::new(self.message.as_str()).style(Style::default().fg(Color::LightGreen)),
            chunks[2],
        );

        if let Some(error) = &self.last_error {
            frame.render_widget(
                Paragraph::new(Line::from(format!("❌ {}", error))).style(Style::default().fg(Color::Red)),
                chunks[3],
            );
        }

        frame.render_widget(
            Paragraph::new(HELP).style(Style::default().fg(Color::DarkGray)),
            chunks[4],
        );
    }
}

/// Run the dashboard until the user quits
pub fn run<R: CommandRunner>(projects: Vec<Project>, manager: Manager<R>) -> Result<()> {
    let mut app = App::new(projects, manager);

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(e).context("Failed to enter alternate screen");
    }

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    let result = event_loop(&mut terminal, &mut app);

    // Restore the terminal even when the loop failed
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor()?;

    result
}

fn event_loop<R: CommandRunner>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App<R>,
) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if !event::poll(Duration::from_millis(250))? {
            continue;
        }

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press && app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

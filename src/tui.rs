use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::filter;
use crate::models::{ApplicationStatus, EMPLOYMENT_FILTERS, EmploymentType, SALARY_RANGES};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Keyword,
    Location,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Mode {
    Browse,
    Editing(Field),
}

struct AppState {
    selected: usize,
    scroll_offset: u16,
    mode: Mode,
}

impl AppState {
    fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            mode: Mode::Browse,
        }
    }

    fn next(&mut self, visible: usize) {
        if visible > 0 && self.selected < visible - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    fn clamp(&mut self, visible: usize) {
        if self.selected >= visible {
            self.selected = visible.saturating_sub(1);
            self.scroll_offset = 0;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

/// Next employment filter in the filter bar order, wrapping back to "All".
fn next_employment_type(current: Option<EmploymentType>) -> Option<EmploymentType> {
    let label = current.map(|t| t.label()).unwrap_or("All");
    let idx = EMPLOYMENT_FILTERS.iter().position(|l| *l == label).unwrap_or(0);
    let next = EMPLOYMENT_FILTERS[(idx + 1) % EMPLOYMENT_FILTERS.len()];
    EmploymentType::parse_filter(next).ok().flatten()
}

/// Next salary range label, with "" standing for "Any".
fn next_salary_range(current: &str) -> &'static str {
    let current = if current.is_empty() { "Any" } else { current };
    let idx = SALARY_RANGES.iter().position(|(l, _)| *l == current).unwrap_or(0);
    match SALARY_RANGES[(idx + 1) % SALARY_RANGES.len()].0 {
        "Any" => "",
        label => label,
    }
}

fn sync_selection(state: &mut AppState, session: &mut Session) {
    let visible = session.visible_jobs();
    state.clamp(visible.len());
    let id = visible.get(state.selected).map(|j| j.id.clone());
    match id {
        Some(id) => session.select_job(&id),
        None => session.clear_selection(),
    }
}

pub async fn run_browse(session: &mut Session) -> Result<()> {
    let mut state = AppState::new();
    sync_selection(&mut state, session);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state, session).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
    session: &mut Session,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select(Some(state.selected));
        terminal.draw(|frame| draw(frame, state, session, &mut list_state))?;

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Mode::Editing(field) = state.mode {
            let mut text = match field {
                Field::Keyword => session.criteria().keyword.clone(),
                Field::Location => session.criteria().location.clone(),
            };
            match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    state.mode = Mode::Browse;
                    continue;
                }
                KeyCode::Backspace => {
                    text.pop();
                }
                KeyCode::Char(c) => text.push(c),
                _ => continue,
            }
            match field {
                Field::Keyword => session.set_keyword(&text).await?,
                Field::Location => session.set_location(&text).await?,
            }
            sync_selection(state, session);
            continue;
        }

        let visible = session.visible_jobs().len();
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Down | KeyCode::Char('j') => state.next(visible),
            KeyCode::Up | KeyCode::Char('k') => state.prev(),
            KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
            KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
            KeyCode::Char('s') => {
                session.toggle_save_selected().await?;
            }
            KeyCode::Char('a') => {
                session.toggle_applied_selected().await?;
            }
            KeyCode::Char('/') => state.mode = Mode::Editing(Field::Keyword),
            KeyCode::Char('l') => state.mode = Mode::Editing(Field::Location),
            KeyCode::Char('r') => session.toggle_remote_only().await?,
            KeyCode::Char('t') => {
                let next = next_employment_type(session.criteria().employment_type);
                session.set_employment_type(next).await?;
            }
            KeyCode::Char('$') => {
                let next = next_salary_range(&session.criteria().salary_range);
                session.set_salary_range(next).await?;
            }
            KeyCode::Char('c') => session.clear_search().await?,
            KeyCode::Char('x') => session.reset_filters().await?,
            _ => {}
        }
        sync_selection(state, session);
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, session: &Session, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    // Search and filter bar
    let criteria = session.criteria();
    let cursor = |field: Field| if state.mode == Mode::Editing(field) { "_" } else { "" };
    let salary = if criteria.salary_range.is_empty() { "Any" } else { criteria.salary_range.as_str() };
    let search = Paragraph::new(format!(
        "Role/company: {}{}   Location: {}{}   Type: {}   Salary: {}   Remote only: {}",
        criteria.keyword,
        cursor(Field::Keyword),
        criteria.location,
        cursor(Field::Location),
        criteria.employment_type.map(|t| t.label()).unwrap_or("All"),
        salary,
        if criteria.remote_only { "yes" } else { "no" },
    ))
    .block(Block::default().borders(Borders::ALL).title(" Search "));
    frame.render_widget(search, rows[0]);

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    // Left panel: visible jobs
    let visible = session.visible_jobs();
    let items: Vec<ListItem> = visible
        .iter()
        .map(|job| {
            let saved = if session.is_saved(&job.id) { "*" } else { " " };
            let applied = if session.application_status(&job.id).is_applied() { "+" } else { " " };
            ListItem::new(format!("{}{} {} | {}", saved, applied, job.title, job.company))
        })
        .collect();

    let status = if filter::filters_active(criteria) { "filters active" } else { "curated for you" };
    let count = visible.len();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " {} role{} found, {} ",
            count,
            if count == 1 { "" } else { "s" },
            status
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: job detail
    let detail = Paragraph::new(build_detail(session))
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Detail  saved {}  applied {} ",
            session.saved_count(),
            session.applied_count()
        )))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(detail, chunks[1]);

    let help = Paragraph::new(match state.mode {
        Mode::Browse => {
            " j/k:navigate  s:save a:applied  /:keyword l:location r:remote t:type $:salary  c:clear x:reset  q:quit"
        }
        Mode::Editing(_) => " type to search  backspace:delete  enter/esc:done",
    })
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[2]);
}

fn build_detail(session: &Session) -> Text<'_> {
    let visible_empty = session.visible_jobs().is_empty();
    let Some(job) = session.selected_job().filter(|_| !visible_empty) else {
        return Text::from(vec![
            Line::from(Span::styled(
                "No roles match your filters yet.",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from("Try broadening your keyword, expanding locations, or lowering the salary minimum."),
            Line::from("Press c to clear the search and x to reset filters."),
        ]);
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        job.title.as_str(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(format!("at {}", job.company)));
    let remote = if job.is_remote { " (remote friendly)" } else { "" };
    lines.push(Line::from(format!("{}{}", job.location, remote)));
    lines.push(Line::from(format!("{}  {}", job.employment_type, job.salary)));
    lines.push(Line::from(""));

    if session.is_saved(&job.id) {
        lines.push(Line::from(Span::styled("Saved", Style::default().fg(Color::Green))));
    }
    if let ApplicationStatus::Applied { at } = session.application_status(&job.id) {
        lines.push(Line::from(Span::styled(
            format!("Applied {}", at),
            Style::default().fg(Color::Cyan),
        )));
    }

    if !job.tags.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tags",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(&job.tags.join(", "), 60).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}

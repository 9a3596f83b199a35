use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::analysis::{Dashboard, DeadlineBucket, FilterCriteria, TableRow};
use crate::client::ApiClient;
use crate::models::{ApplicationRecord, ApplicationStatus};
use crate::text::truncate;

const BAR_WIDTH: usize = 20;

/// Filter being typed into while the dashboard is in edit mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterField {
    Company,
    Role,
    Status,
}

impl FilterField {
    fn next(self) -> Self {
        match self {
            FilterField::Company => FilterField::Role,
            FilterField::Role => FilterField::Status,
            FilterField::Status => FilterField::Company,
        }
    }

    fn label(self) -> &'static str {
        match self {
            FilterField::Company => "company",
            FilterField::Role => "role",
            FilterField::Status => "status",
        }
    }
}

struct AppState<'a> {
    client: &'a ApiClient,
    criteria: FilterCriteria,
    /// Last fetched collection; filter edits rebuild from it without a re-fetch.
    records: Vec<ApplicationRecord>,
    dashboard: Dashboard,
    selected: usize,
    scroll_offset: u16,
    message: Option<String>,
    editing: Option<FilterField>,
}

impl<'a> AppState<'a> {
    fn new(client: &'a ApiClient, criteria: FilterCriteria) -> Self {
        let dashboard = Dashboard::build(&[], &criteria, today());
        let mut state = Self {
            client,
            criteria,
            records: Vec::new(),
            dashboard,
            selected: 0,
            scroll_offset: 0,
            message: None,
            editing: None,
        };
        state.refresh();
        state
    }

    /// Re-fetch the whole collection and rebuild every view from it. A
    /// failed fetch shows as an empty collection with the error on the footer.
    fn refresh(&mut self) {
        match self.client.list() {
            Ok(records) => self.records = records,
            Err(e) => {
                self.records.clear();
                self.message = Some(format!("Could not load applications: {}", e));
            }
        }
        self.rebuild();
    }

    fn rebuild(&mut self) {
        self.dashboard = Dashboard::build(&self.records, &self.criteria, today());
        if self.selected >= self.dashboard.rows.len() {
            self.selected = self.dashboard.rows.len().saturating_sub(1);
        }
    }

    fn current(&self) -> Option<&ApplicationRecord> {
        self.dashboard.rows.get(self.selected).map(|row| &row.record)
    }

    fn set_status(&mut self, status: ApplicationStatus) {
        let Some(record) = self.current() else { return };
        let id = record.id.clone();
        self.message = Some(match self.client.update_status(&id, &status) {
            Ok(updated) => format!("{} -> {}", updated.company, updated.status),
            Err(e) => format!("Update failed: {}", e),
        });
        self.refresh();
    }

    fn cycle_status(&mut self) {
        if let Some(record) = self.current() {
            let next = record.status.cycle();
            self.set_status(next);
        }
    }

    fn delete_current(&mut self) {
        let Some(record) = self.current() else { return };
        let id = record.id.clone();
        self.message = Some(match self.client.delete(&id) {
            Ok(message) => message,
            Err(e) => format!("Delete failed: {}", e),
        });
        self.refresh();
    }

    fn filter_slot(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::Company => &mut self.criteria.company,
            FilterField::Role => &mut self.criteria.role,
            FilterField::Status => &mut self.criteria.status,
        }
    }

    fn start_editing(&mut self) {
        self.editing = Some(FilterField::Company);
        self.message = None;
    }

    fn next_filter_field(&mut self) {
        self.editing = self.editing.map(FilterField::next);
    }

    fn push_filter_char(&mut self, c: char) {
        let Some(field) = self.editing else { return };
        self.filter_slot(field).get_or_insert_with(String::new).push(c);
        self.rebuild();
    }

    fn pop_filter_char(&mut self) {
        let Some(field) = self.editing else { return };
        let slot = self.filter_slot(field);
        if let Some(value) = slot.as_mut() {
            value.pop();
        }
        if slot.as_deref() == Some("") {
            *slot = None;
        }
        self.rebuild();
    }

    /// Step the status filter through "any" and each selectable status.
    fn cycle_status_filter(&mut self, forward: bool) {
        let mut options: Vec<Option<String>> = vec![None];
        options.extend(
            ApplicationStatus::choices()
                .iter()
                .map(|s| Some(s.as_str().to_string())),
        );
        let pos = options
            .iter()
            .position(|o| *o == self.criteria.status)
            .unwrap_or(0);
        let next = if forward {
            (pos + 1) % options.len()
        } else {
            (pos + options.len() - 1) % options.len()
        };
        self.criteria.status = options[next].clone();
        self.rebuild();
    }

    fn clear_filters(&mut self) {
        self.criteria = FilterCriteria::default();
        self.editing = None;
        self.message = Some("Filters cleared".to_string());
        self.rebuild();
    }

    fn next(&mut self) {
        if !self.dashboard.rows.is_empty() && self.selected < self.dashboard.rows.len() - 1 {
            self.selected += 1;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(3);
    }

    fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(3);
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn run_browse(client: &ApiClient, criteria: FilterCriteria) -> Result<()> {
    let mut state = AppState::new(client, criteria);

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut state);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut AppState,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select(if state.dashboard.rows.is_empty() {
            None
        } else {
            Some(state.selected)
        });
        terminal.draw(|frame| draw(frame, state, &mut list_state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let Some(field) = state.editing {
                match key.code {
                    KeyCode::Enter | KeyCode::Esc => state.editing = None,
                    KeyCode::Tab => state.next_filter_field(),
                    KeyCode::Backspace => state.pop_filter_char(),
                    KeyCode::Right if field == FilterField::Status => state.cycle_status_filter(true),
                    KeyCode::Left if field == FilterField::Status => state.cycle_status_filter(false),
                    KeyCode::Char(c) => state.push_filter_char(c),
                    _ => {}
                }
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Down | KeyCode::Char('j') => state.next(),
                KeyCode::Up | KeyCode::Char('k') => state.prev(),
                KeyCode::Char('J') | KeyCode::PageDown => state.scroll_down(),
                KeyCode::Char('K') | KeyCode::PageUp => state.scroll_up(),
                KeyCode::Char('s') => state.cycle_status(),
                KeyCode::Char('d') => state.delete_current(),
                KeyCode::Char('/') => state.start_editing(),
                KeyCode::Char('x') => state.clear_filters(),
                KeyCode::Char('r') => {
                    state.message = None;
                    state.refresh();
                }
                KeyCode::Char(c @ '1'..='8') => {
                    let index = c as usize - '1' as usize;
                    let status = ApplicationStatus::choices()[index].clone();
                    state.set_status(status);
                }
                _ => {}
            }
        }
    }
    Ok(())
}

fn draw(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(frame.area());

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[0]);

    // Left panel: filtered table
    let items: Vec<ListItem> = state.dashboard.rows.iter().map(table_item).collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Applications ({}/{}) {}",
            state.dashboard.rows.len(),
            state.dashboard.total,
            match filter_summary(&state.criteria) {
                summary if summary.is_empty() => String::new(),
                summary => format!("[{}] ", summary),
            }
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], list_state);

    // Right panel: selection and analysis over all records
    let analysis = Paragraph::new(build_analysis(state))
        .block(Block::default().borders(Borders::ALL).title(" Analysis "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));

    frame.render_widget(analysis, chunks[1]);

    let footer = match (state.editing, &state.message) {
        (Some(field), _) => format!(
            " Filter {}: {}_   Tab:next field{}  Backspace:erase  Enter:done",
            field.label(),
            filter_value(&state.criteria, field),
            if field == FilterField::Status { "  Left/Right:pick" } else { "" }
        ),
        (None, Some(message)) => format!(" {}", message),
        (None, None) => " j/k:navigate  J/K:scroll  s:next status 1-8:set status  d:delete  /:filter  x:clear filters  r:refresh  q:quit"
            .to_string(),
    };
    let help = Paragraph::new(footer).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, rows[1]);
}

fn filter_value(criteria: &FilterCriteria, field: FilterField) -> &str {
    let value = match field {
        FilterField::Company => &criteria.company,
        FilterField::Role => &criteria.role,
        FilterField::Status => &criteria.status,
    };
    value.as_deref().unwrap_or("")
}

fn filter_summary(criteria: &FilterCriteria) -> String {
    [
        FilterField::Company,
        FilterField::Role,
        FilterField::Status,
    ]
    .into_iter()
    .filter_map(|field| {
        let value = filter_value(criteria, field);
        (!value.is_empty()).then(|| format!("{}={}", field.label(), value))
    })
    .collect::<Vec<_>>()
    .join(" ")
}

fn table_item(row: &TableRow) -> ListItem<'static> {
    let record = &row.record;
    let text = format!(
        "{:<10} {:<18} {:<22} {}",
        record.deadline.as_str(),
        truncate(&record.company, 18),
        truncate(&record.role, 22),
        record.status
    );
    ListItem::new(text).style(bucket_style(row.bucket))
}

fn bucket_style(bucket: DeadlineBucket) -> Style {
    match bucket {
        DeadlineBucket::Overdue => Style::default().fg(Color::Red),
        DeadlineBucket::DueToday => Style::default().fg(Color::LightRed),
        DeadlineBucket::DueWithinWeek => Style::default().fg(Color::Yellow),
        DeadlineBucket::None => Style::default(),
    }
}

fn status_color(status: &str) -> Color {
    match status {
        "Applied" => Color::Blue,
        "Interviewed" => Color::Green,
        "Offered" => Color::Magenta,
        "Rejected" => Color::Red,
        "Interested" => Color::LightBlue,
        "Researching" => Color::Gray,
        _ => Color::DarkGray,
    }
}

fn build_analysis<'a>(state: &'a AppState) -> Text<'a> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let dashboard = &state.dashboard;
    let mut lines: Vec<Line> = Vec::new();

    if let Some(record) = state.current() {
        lines.push(Line::from(Span::styled(
            format!("{} - {}", record.company, record.role),
            bold,
        )));
        lines.push(Line::from(format!(
            "Deadline: {}  Status: {}  (#{})",
            record.deadline, record.status, record.id
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        format!("Total applications: {}", dashboard.total),
        bold,
    )));
    for entry in &dashboard.status_counts {
        let filled = ((entry.percentage / 100.0) * BAR_WIDTH as f64).round() as usize;
        lines.push(Line::from(vec![
            Span::raw(format!("{:<17}", format!("{}:", entry.status))),
            Span::styled(
                "#".repeat(filled),
                Style::default().fg(status_color(entry.status)),
            ),
            Span::styled(".".repeat(BAR_WIDTH.saturating_sub(filled)), dim),
            Span::raw(format!(" {} ({:.1}%)", entry.count, entry.percentage)),
        ]));
    }
    lines.push(Line::from(""));

    let sections: [(&str, &[ApplicationRecord], &str); 4] = [
        ("Upcoming deadlines (7 days)", dashboard.upcoming.as_slice(), "No upcoming deadlines."),
        ("Past deadlines", dashboard.past.as_slice(), "No past deadlines."),
        ("Pending applications", dashboard.pending.as_slice(), "No pending applications."),
        ("Follow-up reminders", dashboard.follow_up.as_slice(), "No follow-ups needed."),
    ];
    for (title, records, empty) in sections {
        lines.push(Line::from(Span::styled(title, bold)));
        if records.is_empty() {
            lines.push(Line::from(Span::styled(format!("  {}", empty), dim)));
        }
        for record in records {
            lines.push(Line::from(format!(
                "  {} - {} ({}, {})",
                record.company, record.role, record.deadline, record.status
            )));
        }
        lines.push(Line::from(""));
    }

    Text::from(lines)
}

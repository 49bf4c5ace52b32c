use std::{io, thread, time::Duration};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use gamelog_core::{
    CompletionFilter, GameRecord, HardwareFilter, QueryEngine, QueryState, RecordStore, Summary,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Tabs, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info};

const TICK_RATE: Duration = Duration::from_millis(250);
/// Borders plus the header row.
const TABLE_CHROME: u16 = 3;

#[derive(Debug, Clone)]
struct Theme {
    primary_fg: Color,
    accent: Color,
    muted: Color,
    selection_bg: Color,
    success: Color,
    warning: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary_fg: Color::White,
            accent: Color::Cyan,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,
            success: Color::Green,
            warning: Color::Yellow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Browse,
    Search,
}

enum AppEvent {
    Input(Event),
    Tick,
}

/// Interactive browser over a loaded record store.
pub struct GameLogApp {
    store: RecordStore,
    engine: QueryEngine,
    hardware: Vec<String>,
    query: QueryState,
    search_backup: String,
    state: UiState,
    theme: Theme,
}

impl GameLogApp {
    pub fn new(store: RecordStore, engine: QueryEngine, query: QueryState) -> Self {
        let hardware = engine.list_hardware(&store);
        let mut app = Self {
            store,
            engine,
            hardware,
            query,
            search_backup: String::new(),
            state: UiState::default(),
            theme: Theme::default(),
        };
        app.refresh();
        app
    }

    pub async fn run(&mut self) -> Result<()> {
        self.state.set_status(format!(
            "Loaded {} records on {} platforms",
            self.store.len(),
            self.hardware.len()
        ));

        let mut stdout = io::stdout();
        enable_raw_mode().context("failed to enter raw mode")?;
        execute!(stdout, EnterAlternateScreen).context("failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend).context("failed to create terminal")?;
        terminal.hide_cursor()?;
        terminal.clear()?;

        let (event_tx, mut event_rx) = mpsc::channel::<AppEvent>(128);
        spawn_input_thread(event_tx);

        loop {
            terminal.draw(|frame| self.draw(frame))?;
            if self.state.should_quit {
                break;
            }

            match event_rx.recv().await {
                Some(AppEvent::Input(Event::Key(key))) => {
                    if let Err(err) = self.handle_key(key) {
                        self.state.set_status(format!("Error: {err}"));
                    }
                }
                Some(AppEvent::Input(_)) => {}
                Some(AppEvent::Tick) => self.handle_tick(),
                None => break,
            }
        }

        restore_terminal(&mut terminal)?;
        info!("Browser closed");
        Ok(())
    }

    /// Recompute the visible rows from scratch for the current query.
    fn refresh(&mut self) {
        let view = self.engine.query_records(&self.store, &self.query);
        let summary = view.summary();
        let rows = view.records.into_iter().cloned().collect();
        self.state.set_rows(rows, summary);
        debug!(
            text = %self.query.text,
            hardware = %self.query.hardware,
            completion = %self.query.completion,
            sort = %self.query.sort,
            matched = summary.count,
            "View refreshed"
        );
    }

    fn handle_tick(&mut self) {
        if self.state.mode == Mode::Search {
            self.state.set_status(format!("Search: {}", self.query.text));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.state.mode {
            Mode::Search => self.handle_search_key(key),
            Mode::Browse => self.handle_browse_key(key),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                self.state.mode = Mode::Browse;
                self.query.text = std::mem::take(&mut self.search_backup);
                self.refresh();
                self.state.set_status("Search cancelled".to_string());
            }
            KeyCode::Enter => {
                self.state.mode = Mode::Browse;
                self.search_backup.clear();
                self.state.set_status(format!(
                    "Search applied: {} ({} matches)",
                    self.query.text, self.state.summary.count
                ));
            }
            KeyCode::Backspace => {
                self.query.text.pop();
                self.refresh();
                self.state.set_status(format!("Search: {}", self.query.text));
            }
            KeyCode::Char(c) => {
                if key.modifiers.is_empty() || key.modifiers == KeyModifiers::SHIFT {
                    self.query.text.push(c);
                    self.refresh();
                    self.state.set_status(format!("Search: {}", self.query.text));
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Char('q') if key.modifiers.is_empty() => self.state.should_quit = true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.state.should_quit = true
            }
            KeyCode::Char('j') | KeyCode::Down => self.state.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_cursor(-1),
            KeyCode::Char('g') if key.modifiers.is_empty() => self.state.move_to(0),
            KeyCode::Char('G') => self.state.move_to_end(),
            KeyCode::Home => self.state.move_to(0),
            KeyCode::End => self.state.move_to_end(),
            KeyCode::PageDown => self.state.page_down(),
            KeyCode::PageUp => self.state.page_up(),
            KeyCode::Char('/') => {
                self.state.mode = Mode::Search;
                self.search_backup = self.query.text.clone();
                self.state.set_status("Enter search text".to_string());
            }
            KeyCode::Char('h') => self.cycle_hardware(true),
            KeyCode::Char('H') => self.cycle_hardware(false),
            KeyCode::Char('c') => {
                self.query.completion = self.query.completion.cycle();
                self.refresh();
                self.state.set_status(format!(
                    "Completion: {}",
                    completion_label(self.query.completion)
                ));
            }
            KeyCode::Char('s') => self.cycle_sort(true),
            KeyCode::Char('S') => self.cycle_sort(false),
            KeyCode::Char('x') => {
                if self.query.has_filters() {
                    self.query.clear_filters();
                    self.refresh();
                    self.state.set_status("Filters cleared".to_string());
                } else {
                    self.state.set_status("No filters to clear".to_string());
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn cycle_hardware(&mut self, forward: bool) {
        self.query.hardware = self.query.hardware.cycle(&self.hardware, forward);
        self.refresh();
        self.state
            .set_status(format!("Hardware: {}", hardware_label(&self.query.hardware)));
    }

    fn cycle_sort(&mut self, forward: bool) {
        self.query.sort = self.query.sort.cycle(forward);
        self.refresh();
        self.state
            .set_status(format!("Sorted by {}", self.query.sort.label()));
    }

    fn draw(&mut self, frame: &mut Frame) {
        let size = frame.size();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(size);

        self.render_controls(frame, chunks[0]);

        let body_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[1]);

        self.render_table(frame, body_chunks[0]);
        self.render_details(frame, body_chunks[1]);
        self.render_status(frame, chunks[2]);
    }

    fn render_controls(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
                Constraint::Percentage(20),
            ])
            .split(area);

        let search_style = if self.state.mode == Mode::Search {
            Style::default().fg(self.theme.accent)
        } else {
            Style::default().fg(self.theme.primary_fg)
        };
        let mut search_line = vec![Span::styled(self.query.text.clone(), search_style)];
        if self.state.mode == Mode::Search {
            search_line.push(Span::styled("▏", Style::default().fg(self.theme.accent)));
        } else if self.query.text.is_empty() {
            search_line.push(Span::styled(
                "press / to search",
                Style::default().fg(self.theme.muted),
            ));
        }
        let search = Paragraph::new(Line::from(search_line))
            .block(Block::default().borders(Borders::ALL).title("Search"));
        frame.render_widget(search, chunks[0]);

        let hardware = Paragraph::new(hardware_label(&self.query.hardware))
            .block(Block::default().borders(Borders::ALL).title("Hardware [h/H]"));
        frame.render_widget(hardware, chunks[1]);

        let selected = CompletionFilter::VARIANTS
            .iter()
            .position(|filter| *filter == self.query.completion)
            .unwrap_or(0);
        let completion = Tabs::new(
            CompletionFilter::VARIANTS
                .iter()
                .map(|filter| completion_label(*filter))
                .collect::<Vec<_>>(),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(self.theme.accent)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("Clear [c]"));
        frame.render_widget(completion, chunks[2]);

        let sort = Paragraph::new(self.query.sort.label())
            .block(Block::default().borders(Borders::ALL).title("Sort [s/S]"));
        frame.render_widget(sort, chunks[3]);
    }

    fn render_table(&mut self, frame: &mut Frame, area: Rect) {
        self.state.list_height = area.height.saturating_sub(TABLE_CHROME) as usize;
        self.state.clamp_cursor();
        self.state.ensure_cursor_visible();

        let height = self.state.list_height;
        let rows: Vec<Row> = self
            .state
            .visible_rows(height)
            .iter()
            .map(|record| {
                let cleared = if record.completed {
                    Cell::from("✓").style(Style::default().fg(self.theme.success))
                } else {
                    Cell::from("-").style(Style::default().fg(self.theme.muted))
                };
                let archive = if record.archive_url().is_some() {
                    Cell::from("↗").style(Style::default().fg(self.theme.accent))
                } else {
                    Cell::from("-").style(Style::default().fg(self.theme.muted))
                };
                Row::new(vec![
                    Cell::from(record.hardware.clone()),
                    cleared,
                    Cell::from(record.title.clone())
                        .style(Style::default().add_modifier(Modifier::BOLD)),
                    Cell::from(format_hours(record.playtime)),
                    Cell::from(record.achievement().unwrap_or_default().to_string()),
                    Cell::from(record.notes().unwrap_or_default().to_string()),
                    archive,
                ])
            })
            .collect();

        let mut table_state = TableState::default();
        if !rows.is_empty() {
            let selected = self
                .state
                .cursor
                .saturating_sub(self.state.offset)
                .min(rows.len() - 1);
            table_state.select(Some(selected));
        }

        let widths = [
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Min(20),
            Constraint::Length(7),
            Constraint::Length(18),
            Constraint::Length(18),
            Constraint::Length(4),
        ];
        let header = Row::new(vec![
            "Hardware",
            "Clear",
            "Title",
            "Hours",
            "Achievement",
            "Notes",
            "Live",
        ])
        .style(
            Style::default()
                .fg(self.theme.warning)
                .add_modifier(Modifier::BOLD),
        );

        let title = format!("Games ({}/{})", self.state.rows.len(), self.store.len());
        if rows.is_empty() {
            let paragraph = Paragraph::new("No matching records")
                .style(Style::default().fg(self.theme.muted))
                .block(Block::default().borders(Borders::ALL).title(title));
            frame.render_widget(paragraph, area);
            return;
        }

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(self.theme.selection_bg))
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(table, area, &mut table_state);
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Details");
        let Some(record) = self.state.current_record() else {
            let paragraph = Paragraph::new("Nothing selected").block(block);
            frame.render_widget(paragraph, area);
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(
                record.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("Hardware: {}", record.hardware)),
        ];
        if let Some(released) = record.released_on() {
            lines.push(Line::from(format!(
                "Released: {}",
                released.format("%Y-%m-%d")
            )));
        }
        lines.push(Line::from(format!(
            "Playtime: {} h",
            format_hours(record.playtime)
        )));
        lines.push(Line::from(if record.completed {
            Span::styled("Cleared", Style::default().fg(self.theme.success))
        } else {
            Span::styled("Not cleared", Style::default().fg(self.theme.muted))
        }));
        if let Some(achievement) = record.achievement() {
            lines.push(Line::from(format!("Achievement: {achievement}")));
        }
        if let Some(notes) = record.notes() {
            lines.push(Line::from(format!("Notes: {notes}")));
        }
        if let Some(url) = record.archive_url() {
            lines.push(Line::from(format!("Archive: {url}")));
        }

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("Status");
        let primary = if self.state.mode == Mode::Search {
            format!("Search: {}", self.query.text)
        } else {
            self.state.status.clone()
        };
        let summary = Line::from(vec![
            Span::styled(
                format!(
                    "{} records / {} hours",
                    self.state.summary.count,
                    format_hours(self.state.summary.total_playtime)
                ),
                Style::default()
                    .fg(self.theme.accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                "   / search  h hardware  c clear  s sort  x reset  q quit",
                Style::default().fg(self.theme.muted),
            ),
        ]);
        let paragraph = Paragraph::new(vec![Line::from(primary), summary])
            .block(block)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}

fn hardware_label(filter: &HardwareFilter) -> &str {
    match filter {
        HardwareFilter::All => "All hardware",
        HardwareFilter::Only(hardware) => hardware,
    }
}

fn completion_label(filter: CompletionFilter) -> &'static str {
    match filter {
        CompletionFilter::All => "All",
        CompletionFilter::Done => "Done",
        CompletionFilter::Todo => "Todo",
    }
}

/// Hours with thousands grouping and at most one decimal place.
fn format_hours(hours: f64) -> String {
    let formatted = format!("{:.1}", hours);
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "0"));
    let (sign, digits) = match whole.strip_prefix('-') {
        Some(digits) => ("-", digits),
        None => ("", whole),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if fraction == "0" {
        if grouped == "0" {
            return grouped;
        }
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{fraction}")
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode().context("failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor()?;
    Ok(())
}

fn spawn_input_thread(sender: mpsc::Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::poll(TICK_RATE) {
            Ok(true) => match event::read() {
                Ok(evt) => {
                    if sender.blocking_send(AppEvent::Input(evt)).is_err() {
                        break;
                    }
                }
                Err(_) => break,
            },
            Ok(false) => {
                if sender.blocking_send(AppEvent::Tick).is_err() {
                    break;
                }
            }
            Err(_) => break,
        }
    });
}

struct UiState {
    rows: Vec<GameRecord>,
    summary: Summary,
    cursor: usize,
    offset: usize,
    list_height: usize,
    status: String,
    mode: Mode,
    should_quit: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            summary: Summary::default(),
            cursor: 0,
            offset: 0,
            list_height: 1,
            status: "Ready".to_string(),
            mode: Mode::Browse,
            should_quit: false,
        }
    }
}

impl UiState {
    fn set_rows(&mut self, rows: Vec<GameRecord>, summary: Summary) {
        self.rows = rows;
        self.summary = summary;
        self.cursor = 0;
        self.offset = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let len = self.rows.len() as isize;
        let idx = (self.cursor as isize + delta).clamp(0, len - 1);
        self.cursor = idx as usize;
        self.ensure_cursor_visible();
    }

    fn move_to(&mut self, index: usize) {
        if self.rows.is_empty() {
            return;
        }
        self.cursor = index.min(self.rows.len() - 1);
        self.ensure_cursor_visible();
    }

    fn move_to_end(&mut self) {
        if self.rows.is_empty() {
            return;
        }
        self.cursor = self.rows.len() - 1;
        self.ensure_cursor_visible();
    }

    fn page_down(&mut self) {
        if self.rows.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.rows.len());
        self.move_cursor(delta as isize);
    }

    fn page_up(&mut self) {
        if self.rows.is_empty() || self.list_height == 0 {
            return;
        }
        let delta = self.list_height.min(self.rows.len());
        self.move_cursor(-(delta as isize));
    }

    fn visible_rows(&self, height: usize) -> &[GameRecord] {
        if self.rows.is_empty() {
            return &[];
        }
        let end = (self.offset + height).min(self.rows.len());
        &self.rows[self.offset..end]
    }

    fn current_record(&self) -> Option<&GameRecord> {
        self.rows.get(self.cursor)
    }

    fn set_status(&mut self, message: String) {
        self.status = message;
    }

    fn clamp_cursor(&mut self) {
        if self.rows.is_empty() {
            self.cursor = 0;
            self.offset = 0;
        } else if self.cursor >= self.rows.len() {
            self.cursor = self.rows.len() - 1;
        }
    }

    fn ensure_cursor_visible(&mut self) {
        if self.rows.is_empty() || self.list_height == 0 {
            self.offset = 0;
            return;
        }
        let height = self.list_height;
        let max_offset = self.rows.len().saturating_sub(height);

        if self.cursor < self.offset {
            self.offset = self.cursor;
        } else if self.cursor >= self.offset + height {
            self.offset = self.cursor + 1 - height;
        }

        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }
}

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Cell, Clear, Gauge, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

use savings_tracker::render::{self, ChartSlice};
use savings_tracker::store::Event as AuditEvent;
use savings_tracker::{
    Config, FundTracker, GoalTracker, KeyValueStore, Priority, SavingsError, WEEKLY_THRESHOLD,
};

const ACTOR: &str = "tui";
const HISTORY_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Funds,
    Goals,
    History,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::Funds => Page::Goals,
            Page::Goals => Page::History,
            Page::History => Page::Funds,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            Page::Funds => Page::History,
            Page::Goals => Page::Funds,
            Page::History => Page::Goals,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::Funds => "Funds",
            Page::Goals => "Goals",
            Page::History => "History",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalField {
    Name,
    Target,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputMode {
    Normal,
    FundDeposit { buffer: String },
    GoalDeposit { buffer: String },
    AddGoal { field: GoalField, name: String, target: String, priority: Priority },
    EditAmount { id: String, buffer: String },
    ConfirmDelete { id: String, name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

pub struct App {
    store: Box<dyn KeyValueStore>,
    pub config: Config,
    pub funds: FundTracker,
    pub goals: GoalTracker,
    pub current_page: Page,
    pub goal_state: TableState,
    pub mode: InputMode,
    pub message: Option<StatusMessage>,
    pub recent: Vec<AuditEvent>,
    today: fn() -> NaiveDate,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

impl App {
    pub fn load<S: KeyValueStore + 'static>(store: S, config: Config) -> Result<Self> {
        let funds = FundTracker::load(&store)?.with_actor(ACTOR);
        let goals = GoalTracker::load(&store)?.with_actor(ACTOR);

        let mut goal_state = TableState::default();
        if !goals.is_empty() {
            goal_state.select(Some(0));
        }

        Ok(Self {
            store: Box::new(store),
            config,
            funds,
            goals,
            current_page: Page::Goals,
            goal_state,
            mode: InputMode::Normal,
            message: None,
            recent: Vec::new(),
            today: local_today,
        })
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    pub fn selected_goal_id(&self) -> Option<String> {
        self.goal_state
            .selected()
            .and_then(|i| self.goals.goals().get(i))
            .map(|g| g.id.clone())
    }

    fn success(&mut self, text: String) {
        self.message = Some(StatusMessage {
            kind: MessageKind::Success,
            text,
        });
    }

    fn error(&mut self, err: SavingsError) {
        self.message = Some(StatusMessage {
            kind: MessageKind::Error,
            text: err.to_string(),
        });
    }

    fn refresh_history(&mut self) {
        match self.store.recent_events(HISTORY_LIMIT) {
            Ok(events) => self.recent = events,
            Err(e) => self.error(SavingsError::from(e)),
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.goals.goals().len();
        let selected = match self.goal_state.selected() {
            _ if len == 0 => None,
            Some(i) if i >= len => Some(len - 1),
            Some(i) => Some(i),
            None => Some(0),
        };
        self.goal_state.select(selected);
    }

    pub fn next_page(&mut self) {
        self.current_page = self.current_page.next();
        if self.current_page == Page::History {
            self.refresh_history();
        }
    }

    pub fn previous_page(&mut self) {
        self.current_page = self.current_page.previous();
        if self.current_page == Page::History {
            self.refresh_history();
        }
    }

    pub fn next(&mut self) {
        let len = self.goals.goals().len();
        if len == 0 {
            return;
        }
        let i = match self.goal_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.goal_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.goals.goals().len();
        if len == 0 {
            return;
        }
        let i = match self.goal_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.goal_state.select(Some(i));
    }

    // ========================================================================
    // COMMANDS
    // ========================================================================

    fn submit_fund_deposit(&mut self, input: &str) {
        let today = self.today();
        match self.funds.save(self.store.as_mut(), input, today) {
            Ok(outcome) => {
                if outcome.weekly_goal_reached {
                    self.success("🎉 Weekly goal reached! Weekly fund reset to 0".to_string());
                } else {
                    self.success(format!(
                        "Saved: gym +{:.2}, weekly +{:.2}, protein +{:.2}",
                        outcome.split.gym, outcome.split.weekly, outcome.split.protein
                    ));
                }
            }
            Err(e) => self.error(e),
        }
    }

    fn submit_goal_deposit(&mut self, input: &str) {
        match self.goals.deposit(self.store.as_mut(), input) {
            Ok(outcome) => {
                let total: u64 = outcome.allocations.iter().map(|a| a.amount).sum();
                let text = format!("Saved {} across {} goals", self.config.money(total), outcome.allocations.len());
                self.success(text);
            }
            Err(e) => self.error(e),
        }
    }

    fn submit_new_goal(&mut self, name: &str, target: &str, priority: Priority) -> bool {
        match self.goals.add_goal(self.store.as_mut(), name, target, priority) {
            Ok(goal) => {
                self.success(format!("Added goal '{}'", goal.name));
                self.goal_state.select(Some(self.goals.goals().len() - 1));
                true
            }
            Err(e) => {
                self.error(e);
                false
            }
        }
    }

    fn submit_edit(&mut self, id: &str, input: &str) -> bool {
        match self.goals.edit_amount(self.store.as_mut(), id, input) {
            Ok(goal) => {
                let text = format!("'{}' set to {}, other goals rebalanced", goal.name, self.config.money(goal.amount));
                self.success(text);
                true
            }
            Err(e) => {
                self.error(e);
                false
            }
        }
    }

    fn reset_selected(&mut self) {
        let Some(id) = self.selected_goal_id() else { return };
        match self.goals.reset(self.store.as_mut(), &id) {
            Ok(()) => self.success("Goal reset to 0".to_string()),
            Err(e) => self.error(e),
        }
    }

    fn confirm_delete(&mut self, id: &str) {
        match self.goals.delete(self.store.as_mut(), id) {
            Ok(goal) => self.success(format!("Deleted goal '{}'", goal.name)),
            Err(e) => self.error(e),
        }
        self.clamp_selection();
    }

    // ========================================================================
    // KEYS
    // ========================================================================

    /// Apply one key press. Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let mode = std::mem::replace(&mut self.mode, InputMode::Normal);

        self.mode = match mode {
            InputMode::Normal => return self.handle_normal_key(key),

            InputMode::FundDeposit { mut buffer } => match key.code {
                KeyCode::Esc => InputMode::Normal,
                KeyCode::Enter => {
                    self.submit_fund_deposit(&buffer);
                    InputMode::Normal
                }
                code => {
                    edit_buffer(&mut buffer, code, true);
                    InputMode::FundDeposit { buffer }
                }
            },

            InputMode::GoalDeposit { mut buffer } => match key.code {
                KeyCode::Esc => InputMode::Normal,
                KeyCode::Enter => {
                    self.submit_goal_deposit(&buffer);
                    InputMode::Normal
                }
                code => {
                    edit_buffer(&mut buffer, code, false);
                    InputMode::GoalDeposit { buffer }
                }
            },

            InputMode::AddGoal { mut field, mut name, mut target, mut priority } => match key.code {
                KeyCode::Esc => InputMode::Normal,
                KeyCode::Enter => {
                    if self.submit_new_goal(&name, &target, priority) {
                        InputMode::Normal
                    } else {
                        InputMode::AddGoal { field, name, target, priority }
                    }
                }
                code => {
                    match code {
                        KeyCode::Tab | KeyCode::BackTab => {
                            field = match field {
                                GoalField::Name => GoalField::Target,
                                GoalField::Target => GoalField::Name,
                            };
                        }
                        KeyCode::Up | KeyCode::Down => priority = priority.next(),
                        code => match field {
                            GoalField::Name => edit_text(&mut name, code),
                            GoalField::Target => edit_buffer(&mut target, code, false),
                        },
                    }
                    InputMode::AddGoal { field, name, target, priority }
                }
            },

            InputMode::EditAmount { id, mut buffer } => match key.code {
                KeyCode::Esc => InputMode::Normal,
                KeyCode::Enter => {
                    if self.submit_edit(&id, &buffer) {
                        InputMode::Normal
                    } else {
                        InputMode::EditAmount { id, buffer }
                    }
                }
                code => {
                    edit_buffer(&mut buffer, code, false);
                    InputMode::EditAmount { id, buffer }
                }
            },

            InputMode::ConfirmDelete { id, name } => match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_delete(&id);
                    InputMode::Normal
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => InputMode::Normal,
                _ => InputMode::ConfirmDelete { id, name },
            },
        };

        false
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Tab => self.next_page(),
            KeyCode::BackTab => self.previous_page(),
            _ => {}
        }

        match self.current_page {
            Page::Funds => match key.code {
                KeyCode::Char('s') | KeyCode::Enter => {
                    if self.funds.has_saved_on(self.today()) {
                        self.error(SavingsError::DuplicateSaveToday);
                    } else {
                        self.message = None;
                        self.mode = InputMode::FundDeposit { buffer: String::new() };
                    }
                }
                _ => {}
            },
            Page::Goals => match key.code {
                KeyCode::Down | KeyCode::Char('j') => self.next(),
                KeyCode::Up | KeyCode::Char('k') => self.previous(),
                KeyCode::Char('s') => {
                    self.message = None;
                    self.mode = InputMode::GoalDeposit { buffer: String::new() };
                }
                KeyCode::Char('a') => {
                    self.message = None;
                    self.mode = InputMode::AddGoal {
                        field: GoalField::Name,
                        name: String::new(),
                        target: String::new(),
                        priority: Priority::default(),
                    };
                }
                KeyCode::Char('e') | KeyCode::Enter => {
                    if let Some(goal) = self.goal_state.selected().and_then(|i| self.goals.goals().get(i)) {
                        self.mode = InputMode::EditAmount {
                            id: goal.id.clone(),
                            buffer: goal.amount.to_string(),
                        };
                        self.message = None;
                    }
                }
                KeyCode::Char('r') => self.reset_selected(),
                KeyCode::Char('d') => {
                    if let Some(goal) = self.goal_state.selected().and_then(|i| self.goals.goals().get(i)) {
                        self.mode = InputMode::ConfirmDelete {
                            id: goal.id.clone(),
                            name: goal.name.clone(),
                        };
                    }
                }
                _ => {}
            },
            Page::History => {
                if key.code == KeyCode::Char('R') {
                    self.refresh_history();
                }
            }
        }

        false
    }
}

/// Numeric field editing; `allow_decimal` lets one '.' through
fn edit_buffer(buffer: &mut String, code: KeyCode, allow_decimal: bool) {
    match code {
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() => buffer.push(c),
        KeyCode::Char('.') if allow_decimal && !buffer.contains('.') => buffer.push('.'),
        _ => {}
    }
}

fn edit_text(buffer: &mut String, code: KeyCode) {
    match code {
        KeyCode::Backspace => {
            buffer.pop();
        }
        KeyCode::Char(c) if buffer.chars().count() < 40 => buffer.push(c),
        _ => {}
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

// ============================================================================
// DRAWING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::Funds => render_funds(f, chunks[1], app),
        Page::Goals => render_goals(f, chunks[1], app),
        Page::History => render_history(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);

    if app.mode != InputMode::Normal {
        render_input_popup(f, app);
    }
}

fn hex_color(hex: &str) -> Color {
    match render::hex_to_rgb(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::White,
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let pages = [Page::Funds, Page::Goals, Page::History];

    let mut tab_spans = vec![];
    for (i, page) in pages.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(page.title().to_string(), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Goals: {}", app.config.money(app.goals.total())),
        Style::default().fg(Color::Rgb(0, 255, 204)).add_modifier(Modifier::BOLD),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Funds: {}", app.config.money_f64(app.funds.funds().total())),
        Style::default().fg(Color::White),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn slice_bars(slices: &[ChartSlice]) -> Vec<Bar<'static>> {
    slices
        .iter()
        .map(|s| {
            Bar::default()
                .value(s.value.round().max(0.0) as u64)
                .label(Line::from(truncate(&s.label, 10)))
                .style(Style::default().fg(hex_color(s.color)))
                .text_value(format!("{:.0}", s.value))
        })
        .collect()
}

fn render_funds(f: &mut Frame, area: Rect, app: &App) {
    let funds = app.funds.funds();
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);

    let bars = slice_bars(&render::fund_slices(&funds));
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Breakdown "))
        .bar_width(9)
        .bar_gap(3)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, columns[0]);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(columns[1]);

    let saved_today = app.funds.has_saved_on(app.today());
    let label = |name: &'static str| Span::styled(name, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD));

    let content = vec![
        Line::from(""),
        Line::from(vec![label("  Gym:      "), Span::raw(app.config.money_f64(funds.gym))]),
        Line::from(vec![label("  Weekly:   "), Span::raw(app.config.money_f64(funds.weekly))]),
        Line::from(vec![label("  Protein:  "), Span::raw(app.config.money_f64(funds.protein))]),
        Line::from(""),
        Line::from(vec![
            label("  Last saved: "),
            Span::raw(app.funds.last_saved().map(|d| d.to_string()).unwrap_or_else(|| "never".to_string())),
        ]),
        Line::from(""),
        if saved_today {
            Line::from(Span::styled("  ✓ Already saved today", Style::default().fg(Color::Green)))
        } else {
            Line::from(vec![
                Span::raw("  Press "),
                Span::styled("s", Style::default().fg(Color::Yellow)),
                Span::raw(" to save today's amount"),
            ])
        },
    ];

    let panel = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Funds "),
    );
    f.render_widget(panel, rows[0]);

    let weekly = render::ProgressBar {
        current: funds.weekly,
        target: WEEKLY_THRESHOLD,
    };
    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Weekly goal "))
        .gauge_style(Style::default().fg(hex_color(render::WEEKLY_COLOR)))
        .ratio(weekly.ratio())
        .label(format!("{:.2} / {:.0}", funds.weekly, WEEKLY_THRESHOLD));
    f.render_widget(gauge, rows[1]);
}

fn render_goals(f: &mut Frame, area: Rect, app: &mut App) {
    if app.goals.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from("  No goals yet."),
            Line::from(vec![
                Span::raw("  Press "),
                Span::styled("a", Style::default().fg(Color::Yellow)),
                Span::raw(" to add your first goal."),
            ]),
        ])
        .block(Block::default().borders(Borders::ALL).title(" Goals "));
        f.render_widget(empty, area);
        return;
    }

    let rows_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(10), Constraint::Length(3)])
        .split(area);

    let header_cells = ["Name", "Priority", "Saved", "Target", "Progress"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells).style(Style::default().bg(Color::DarkGray)).height(1);

    let rows: Vec<Row> = app
        .goals
        .goals()
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let color = hex_color(render::goal_color(g.priority, i));
            let progress = render::goal_progress(g);
            Row::new(vec![
                Cell::from(truncate(&g.name, 28)),
                Cell::from(g.priority.as_str()).style(Style::default().fg(color)),
                Cell::from(app.config.money(g.amount)),
                Cell::from(app.config.money(g.target)),
                if g.is_complete() {
                    Cell::from("✓ done").style(Style::default().fg(Color::Green))
                } else {
                    Cell::from(format!("{:>3}%", progress.percent())).style(Style::default().fg(color))
                },
            ])
            .height(1)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(30),
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(10),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Goals "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, rows_area[0], &mut app.goal_state);

    let bars = slice_bars(&render::goal_slices(app.goals.goals()));
    let chart = BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(" Goals Breakdown "))
        .bar_width(10)
        .bar_gap(2)
        .data(BarGroup::default().bars(&bars));
    f.render_widget(chart, rows_area[1]);

    if let Some((i, goal)) = app
        .goal_state
        .selected()
        .and_then(|i| app.goals.goals().get(i).map(|g| (i, g)))
    {
        let progress = render::goal_progress(goal);
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(format!(" {} ", goal.name)))
            .gauge_style(Style::default().fg(hex_color(render::goal_color(goal.priority, i))))
            .ratio(progress.ratio())
            .label(format!(
                "{} / {}",
                app.config.money(goal.amount),
                app.config.money(goal.target)
            ));
        f.render_widget(gauge, rows_area[2]);
    }
}

fn render_history(f: &mut Frame, area: Rect, app: &App) {
    let header_cells = ["When", "Event", "Entity", "Details"].iter().map(|h| {
        Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    });
    let header = Row::new(header_cells).style(Style::default().bg(Color::DarkGray)).height(1);

    let rows = app.recent.iter().map(|e| {
        Row::new(vec![
            Cell::from(e.timestamp.with_timezone(&Local).format("%m/%d %H:%M").to_string()),
            Cell::from(e.event_type.clone()),
            Cell::from(truncate(&e.entity_id, 10)),
            Cell::from(truncate(&e.data.to_string(), 60)).style(Style::default().fg(Color::DarkGray)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(12),
            Constraint::Length(20),
            Constraint::Length(12),
            Constraint::Min(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Recent Activity "),
    );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let status_spans = match &app.message {
        Some(msg) => {
            let color = match msg.kind {
                MessageKind::Success => Color::Green,
                MessageKind::Error => Color::Red,
            };
            vec![Span::styled(format!(" {} ", msg.text), Style::default().fg(color))]
        }
        None => {
            let hints: &[(&str, &str)] = match app.current_page {
                Page::Funds => &[("s", " Save"), ("Tab", " Page"), ("q", " Quit")],
                Page::Goals => &[
                    ("s", " Save"),
                    ("a", " Add"),
                    ("e", " Edit"),
                    ("r", " Reset"),
                    ("d", " Delete"),
                    ("↑/↓", " Nav"),
                    ("Tab", " Page"),
                    ("q", " Quit"),
                ],
                Page::History => &[("R", " Refresh"), ("Tab", " Page"), ("q", " Quit")],
            };

            let mut spans = vec![Span::raw(" ")];
            for (i, (key, label)) in hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" | "));
                }
                let key_color = if *key == "q" { Color::Red } else { Color::Yellow };
                spans.push(Span::styled(*key, Style::default().fg(key_color)));
                spans.push(Span::raw(*label));
            }
            spans
        }
    };

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn render_input_popup(f: &mut Frame, app: &App) {
    let area = centered_rect(50, 9, f.size());
    let field_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
    let hint_style = Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC);

    let (title, lines) = match &app.mode {
        InputMode::Normal => return,
        InputMode::FundDeposit { buffer } => (
            " Save to Funds ",
            vec![
                Line::from(""),
                Line::from(vec![Span::raw("  Amount: "), Span::styled(format!("{}▏", buffer), field_style)]),
                Line::from(""),
                Line::from(Span::styled("  Enter to save, Esc to cancel", hint_style)),
            ],
        ),
        InputMode::GoalDeposit { buffer } => (
            " Save to Goals ",
            vec![
                Line::from(""),
                Line::from(vec![Span::raw("  Amount: "), Span::styled(format!("{}▏", buffer), field_style)]),
                Line::from(""),
                Line::from(Span::styled("  Split across goals by priority", hint_style)),
            ],
        ),
        InputMode::AddGoal { field, name, target, priority } => {
            let cursor = |f: GoalField| if *field == f { "▏" } else { "" };
            (
                " Add a New Goal ",
                vec![
                    Line::from(""),
                    Line::from(vec![
                        Span::raw("  Name:     "),
                        Span::styled(format!("{}{}", name, cursor(GoalField::Name)), field_style),
                    ]),
                    Line::from(vec![
                        Span::raw("  Target:   "),
                        Span::styled(format!("{}{}", target, cursor(GoalField::Target)), field_style),
                    ]),
                    Line::from(vec![
                        Span::raw("  Priority: "),
                        Span::styled(
                            priority.as_str(),
                            Style::default().fg(hex_color(render::goal_color(*priority, 0))),
                        ),
                    ]),
                    Line::from(""),
                    Line::from(Span::styled("  Tab field, ↑/↓ priority, Enter add", hint_style)),
                ],
            )
        }
        InputMode::EditAmount { buffer, .. } => (
            " Edit Amount ",
            vec![
                Line::from(""),
                Line::from(vec![Span::raw("  Amount: "), Span::styled(format!("{}▏", buffer), field_style)]),
                Line::from(""),
                Line::from(Span::styled("  Other goals are rebalanced to keep the total", hint_style)),
            ],
        ),
        InputMode::ConfirmDelete { name, .. } => (
            " Delete Goal ",
            vec![
                Line::from(""),
                Line::from(format!("  Delete '{}'?", name)),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  y", Style::default().fg(Color::Red)),
                    Span::raw(" yes   "),
                    Span::styled("n", Style::default().fg(Color::Yellow)),
                    Span::raw(" cancel"),
                ]),
            ],
        ),
    };

    let popup = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title),
    );

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

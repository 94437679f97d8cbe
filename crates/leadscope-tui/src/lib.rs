// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use leadscope_app::{
    ActiveView, AppEvent, Coordinator, DEFAULT_MAX_RESULTS, Gateway, HistoryEntry, Intent, Lead,
    NoticeLevel, POPULARITY_PLACEHOLDER, Platform, ResultPage, ResultView, SearchParams,
    SearchPlatform, SortField, Step, Task, TaskOutcome, ViewState, format_popularity,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use std::io;
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::debug;

const SAVED_MARK: &str = "★";
const VERIFIED_MARK: &str = "✓";
const FOCUS_MARK: &str = "›";
const MAX_RESULTS_DIGITS: usize = 3;

/// Settings the terminal client needs beyond the coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiOptions {
    pub export_path: PathBuf,
    pub search_defaults: SearchParams,
}

impl Default for UiOptions {
    fn default() -> Self {
        Self {
            export_path: PathBuf::from("leads.csv"),
            search_defaults: SearchParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
    TaskFinished(TaskOutcome),
}

/// Executes coordinator tasks and reports their outcomes on the internal
/// channel.
pub trait TaskRunner {
    fn run(&mut self, task: Task, tx: &Sender<InternalEvent>);
}

/// Runs each task on its own short-lived thread so the UI never blocks on the
/// network.
#[derive(Debug, Clone)]
pub struct ThreadRunner<G> {
    gateway: G,
}

impl<G> ThreadRunner<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }
}

impl<G: Gateway + Clone + Send + 'static> TaskRunner for ThreadRunner<G> {
    fn run(&mut self, task: Task, tx: &Sender<InternalEvent>) {
        debug!(?task, "spawning task");
        let gateway = self.gateway.clone();
        let sender = tx.clone();
        thread::spawn(move || {
            let outcome = task.run(&gateway);
            let _ = sender.send(InternalEvent::TaskFinished(outcome));
        });
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FormField {
    #[default]
    Keyword,
    Location,
    Platform,
    MaxResults,
}

impl FormField {
    const ALL: [Self; 4] = [
        Self::Keyword,
        Self::Location,
        Self::Platform,
        Self::MaxResults,
    ];

    const fn label(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Location => "location",
            Self::Platform => "platform",
            Self::MaxResults => "max results",
        }
    }

    fn rotated(self, delta: isize) -> Self {
        let current = Self::ALL
            .iter()
            .position(|field| *field == self)
            .unwrap_or(0) as isize;
        let len = Self::ALL.len() as isize;
        Self::ALL[(current + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SearchForm {
    keyword: String,
    location: String,
    platform: SearchPlatform,
    max_results: String,
    focus: FormField,
    editing: bool,
}

impl SearchForm {
    fn from_defaults(defaults: &SearchParams) -> Self {
        Self {
            keyword: defaults.keyword.clone(),
            location: defaults.location.clone(),
            platform: defaults.platform,
            max_results: defaults.max_results.to_string(),
            focus: FormField::Keyword,
            editing: false,
        }
    }

    fn params(&self) -> SearchParams {
        let max_results = self
            .max_results
            .trim()
            .parse::<i64>()
            .unwrap_or(i64::from(DEFAULT_MAX_RESULTS));
        SearchParams::new(
            self.keyword.trim(),
            self.location.trim(),
            self.platform,
            max_results,
        )
    }

    fn push_char(&mut self, ch: char) {
        match self.focus {
            FormField::Keyword => self.keyword.push(ch),
            FormField::Location => self.location.push(ch),
            FormField::Platform => {
                if ch == ' ' {
                    self.platform = self.platform.toggled();
                }
            }
            FormField::MaxResults => {
                if ch.is_ascii_digit() && self.max_results.len() < MAX_RESULTS_DIGITS {
                    self.max_results.push(ch);
                }
            }
        }
    }

    fn pop_char(&mut self) {
        match self.focus {
            FormField::Keyword => {
                self.keyword.pop();
            }
            FormField::Location => {
                self.location.pop();
            }
            FormField::Platform => {}
            FormField::MaxResults => {
                self.max_results.pop();
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct StatusMessage {
    level: NoticeLevel,
    text: String,
}

#[derive(Debug, Clone, PartialEq)]
struct ViewData {
    form: SearchForm,
    result_view: ResultView,
    result_cursor: usize,
    history_cursor: usize,
    saved_cursor: usize,
    help_visible: bool,
    status: Option<StatusMessage>,
    status_token: u64,
    export_path: PathBuf,
}

impl ViewData {
    fn new(options: &UiOptions) -> Self {
        Self {
            form: SearchForm::from_defaults(&options.search_defaults),
            result_view: ResultView::default(),
            result_cursor: 0,
            history_cursor: 0,
            saved_cursor: 0,
            help_visible: false,
            status: None,
            status_token: 0,
            export_path: options.export_path.clone(),
        }
    }
}

pub fn run_app<G>(coordinator: &mut Coordinator, gateway: G, options: UiOptions) -> Result<()>
where
    G: Gateway + Clone + Send + 'static,
{
    enable_raw_mode().context("enable raw mode")?;
    with_terminal_restored(
        || run_event_loop(coordinator, gateway, options),
        restore_terminal,
    )
}

/// Runs `body`, then `restore` no matter how `body` ended. An error from
/// `body` wins over one from `restore`.
fn with_terminal_restored<T>(
    body: impl FnOnce() -> Result<T>,
    restore: impl FnOnce() -> Result<()>,
) -> Result<T> {
    let result = body();
    let restored = restore();
    let value = result?;
    restored?;
    Ok(value)
}

fn restore_terminal() -> Result<()> {
    let raw = disable_raw_mode().context("disable raw mode");
    let screen =
        execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen");
    raw.and(screen)
}

fn run_event_loop<G>(coordinator: &mut Coordinator, gateway: G, options: UiOptions) -> Result<()>
where
    G: Gateway + Clone + Send + 'static,
{
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut runner = ThreadRunner::new(gateway);
    let mut view_data = ViewData::new(&options);
    let (internal_tx, internal_rx) = mpsc::channel();

    let step = coordinator.dispatch(Intent::Start);
    apply_step(&mut runner, &mut view_data, &internal_tx, step);

    loop {
        process_internal_events(
            coordinator,
            &mut runner,
            &mut view_data,
            &internal_tx,
            &internal_rx,
        );

        terminal
            .draw(|frame| render(frame, coordinator.state(), &view_data))
            .context("draw frame")?;

        if event::poll(Duration::from_millis(120)).context("poll event")?
            && let Event::Key(key) = event::read().context("read event")?
            && handle_key_event(coordinator, &mut runner, &mut view_data, &internal_tx, key)
        {
            return Ok(());
        }
    }
}

fn process_internal_events<R: TaskRunner>(
    coordinator: &mut Coordinator,
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    rx: &Receiver<InternalEvent>,
) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
            InternalEvent::TaskFinished(outcome) => {
                let step = coordinator.apply(outcome);
                apply_step(runner, view_data, tx, step);
                clamp_cursors(coordinator.state(), view_data);
            }
        }
    }
}

/// Reflects coordinator events in the UI and hands its tasks to the runner.
fn apply_step<R: TaskRunner>(
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    step: Step,
) {
    for event in step.events {
        match event {
            AppEvent::Notice(notice) => emit_status(view_data, tx, notice.level, notice.message),
            AppEvent::ResultsReplaced { .. } => {
                view_data.result_view.reset();
                view_data.result_cursor = 0;
            }
            AppEvent::HistoryRefreshed { .. } => view_data.history_cursor = 0,
            AppEvent::CsvExported { path, bytes } => {
                debug!(path = %path.display(), bytes, "csv exported");
            }
            AppEvent::LoadingChanged(_)
            | AppEvent::SavedLeadsRefreshed { .. }
            | AppEvent::AudienceConfigChanged
            | AppEvent::DetailOpened
            | AppEvent::DetailClosed
            | AppEvent::ViewChanged(_)
            | AppEvent::StaleSearchDiscarded { .. } => {}
        }
    }
    for task in step.tasks {
        runner.run(task, tx);
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(Duration::from_secs(4));
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    level: NoticeLevel,
    text: impl Into<String>,
) {
    view_data.status = Some(StatusMessage {
        level,
        text: text.into(),
    });
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

fn dispatch<R: TaskRunner>(
    coordinator: &mut Coordinator,
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    intent: Intent,
) {
    let step = coordinator.dispatch(intent);
    apply_step(runner, view_data, tx, step);
    clamp_cursors(coordinator.state(), view_data);
}

fn clamp_cursors(state: &ViewState, view_data: &mut ViewData) {
    let total = state.results.len();
    view_data.result_view.set_page(view_data.result_view.page, total);
    let rows = view_data.result_view.project(&state.results).rows.len();
    view_data.result_cursor = clamp_cursor(view_data.result_cursor, rows);
    view_data.history_cursor = clamp_cursor(view_data.history_cursor, state.history.len());
    view_data.saved_cursor = clamp_cursor(view_data.saved_cursor, state.saved_leads.len());
}

fn clamp_cursor(cursor: usize, len: usize) -> usize {
    cursor.min(len.saturating_sub(1))
}

fn move_cursor(cursor: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    cursor.saturating_add_signed(delta).min(len - 1)
}

/// Returns true when the app should quit.
fn handle_key_event<R: TaskRunner>(
    coordinator: &mut Coordinator,
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c'))
    {
        return true;
    }

    if view_data.help_visible {
        view_data.help_visible = false;
        return false;
    }

    if coordinator.state().selected_lead.is_some() {
        handle_detail_key(coordinator, runner, view_data, tx, key);
        return false;
    }

    if view_data.form.editing {
        handle_form_key(coordinator, runner, view_data, tx, key);
        return false;
    }

    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => view_data.help_visible = true,
        KeyCode::Tab | KeyCode::BackTab => {
            let delta = if key.code == KeyCode::Tab { 1 } else { -1 };
            let view = coordinator.state().rotated_view(delta);
            dispatch(coordinator, runner, view_data, tx, Intent::SwitchView(view));
        }
        KeyCode::Char('e') => {
            let path = view_data.export_path.clone();
            dispatch(coordinator, runner, view_data, tx, Intent::DownloadCsv(path));
        }
        _ => match coordinator.state().active_view {
            ActiveView::Search => handle_results_key(coordinator, runner, view_data, tx, key),
            ActiveView::History => handle_history_key(coordinator, runner, view_data, tx, key),
            ActiveView::Leads => handle_saved_key(coordinator, runner, view_data, tx, key),
        },
    }
    false
}

fn handle_form_key<R: TaskRunner>(
    coordinator: &mut Coordinator,
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let form = &mut view_data.form;
    match key.code {
        KeyCode::Esc => form.editing = false,
        KeyCode::Tab | KeyCode::Down => form.focus = form.focus.rotated(1),
        KeyCode::BackTab | KeyCode::Up => form.focus = form.focus.rotated(-1),
        KeyCode::Left | KeyCode::Right if form.focus == FormField::Platform => {
            form.platform = form.platform.toggled();
        }
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(ch) => form.push_char(ch),
        KeyCode::Enter => {
            if coordinator.is_loading() {
                emit_status(view_data, tx, NoticeLevel::Info, "search in progress");
                return;
            }
            let params = view_data.form.params();
            view_data.form.max_results = params.max_results.to_string();
            if !params.keyword.is_empty() {
                view_data.form.editing = false;
            }
            dispatch(coordinator, runner, view_data, tx, Intent::SubmitSearch(params));
        }
        _ => {}
    }
}

fn handle_results_key<R: TaskRunner>(
    coordinator: &mut Coordinator,
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let total = coordinator.state().results.len();
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('/') => view_data.form.editing = true,
        KeyCode::Char('j') | KeyCode::Down => {
            let rows = current_page(coordinator.state(), view_data).rows.len();
            view_data.result_cursor = move_cursor(view_data.result_cursor, 1, rows);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            let rows = current_page(coordinator.state(), view_data).rows.len();
            view_data.result_cursor = move_cursor(view_data.result_cursor, -1, rows);
        }
        KeyCode::Char('n') | KeyCode::Right | KeyCode::PageDown => {
            view_data.result_view.next_page(total);
            view_data.result_cursor = 0;
        }
        KeyCode::Char('p') | KeyCode::Left | KeyCode::PageUp => {
            view_data.result_view.prev_page(total);
            view_data.result_cursor = 0;
        }
        KeyCode::Char(ch @ '1'..='6') => {
            let index = ch as usize - '1' as usize;
            if let Some(field) = SortField::ALL.get(index) {
                view_data.result_view.toggle_sort(*field);
                clamp_cursors(coordinator.state(), view_data);
            }
        }
        KeyCode::Enter | KeyCode::Char('s') => {
            let lead = current_page(coordinator.state(), view_data)
                .rows
                .get(view_data.result_cursor)
                .map(|lead| (*lead).clone());
            if let Some(lead) = lead {
                let intent = if key.code == KeyCode::Enter {
                    Intent::SelectLead(lead)
                } else {
                    Intent::SaveLead(lead)
                };
                dispatch(coordinator, runner, view_data, tx, intent);
            }
        }
        _ => {}
    }
}

fn handle_history_key<R: TaskRunner>(
    coordinator: &mut Coordinator,
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let len = coordinator.state().history.len();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.history_cursor = move_cursor(view_data.history_cursor, 1, len);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.history_cursor = move_cursor(view_data.history_cursor, -1, len);
        }
        KeyCode::Enter | KeyCode::Char('r') => {
            if coordinator.is_loading() {
                emit_status(view_data, tx, NoticeLevel::Info, "search in progress");
                return;
            }
            let entry = coordinator
                .state()
                .history
                .get(view_data.history_cursor)
                .cloned();
            if let Some(entry) = entry {
                dispatch(coordinator, runner, view_data, tx, Intent::ReplayHistory(entry));
            }
        }
        _ => {}
    }
}

fn handle_saved_key<R: TaskRunner>(
    coordinator: &mut Coordinator,
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let len = coordinator.state().saved_leads.len();
    let selected = coordinator
        .state()
        .saved_leads
        .get(view_data.saved_cursor)
        .cloned();
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => {
            view_data.saved_cursor = move_cursor(view_data.saved_cursor, 1, len);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view_data.saved_cursor = move_cursor(view_data.saved_cursor, -1, len);
        }
        KeyCode::Enter => {
            if let Some(lead) = selected {
                dispatch(coordinator, runner, view_data, tx, Intent::SelectLead(lead));
            }
        }
        KeyCode::Char('d') => {
            if let Some(id) = selected.and_then(|lead| lead.id) {
                dispatch(coordinator, runner, view_data, tx, Intent::DeleteLead(id));
            }
        }
        _ => {}
    }
}

fn handle_detail_key<R: TaskRunner>(
    coordinator: &mut Coordinator,
    runner: &mut R,
    view_data: &mut ViewData,
    tx: &Sender<InternalEvent>,
    key: KeyEvent,
) {
    let Some(lead) = coordinator.state().selected_lead.clone() else {
        return;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            dispatch(coordinator, runner, view_data, tx, Intent::CloseDetail);
        }
        KeyCode::Char('s') => {
            dispatch(coordinator, runner, view_data, tx, Intent::SaveLead(lead));
        }
        KeyCode::Char('d') => {
            if let Some(id) = lead.id {
                dispatch(coordinator, runner, view_data, tx, Intent::DeleteLead(id));
            }
        }
        _ => {}
    }
}

fn current_page<'a>(state: &'a ViewState, view_data: &ViewData) -> ResultPage<'a> {
    view_data.result_view.project(&state.results)
}

fn render(frame: &mut ratatui::Frame<'_>, state: &ViewState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let selected = ActiveView::ALL
        .iter()
        .position(|view| *view == state.active_view)
        .unwrap_or(0);
    let tab_titles = ActiveView::ALL
        .iter()
        .map(|view| tab_title(*view, state))
        .collect::<Vec<String>>();
    let tabs = Tabs::new(tab_titles)
        .block(Block::default().title("leadscope").borders(Borders::ALL))
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .select(selected);
    frame.render_widget(tabs, layout[0]);

    match state.active_view {
        ActiveView::Search => render_search(frame, layout[1], state, view_data),
        ActiveView::History => render_history(frame, layout[1], state, view_data),
        ActiveView::Leads => render_saved(frame, layout[1], state, view_data),
    }

    let status_style = match view_data.status.as_ref().map(|status| status.level) {
        Some(NoticeLevel::Error) => Style::default().fg(Color::Red),
        Some(NoticeLevel::Warning) => Style::default().fg(Color::Magenta),
        _ => Style::default().fg(Color::Yellow),
    };
    let status_widget = Paragraph::new(status_text(state, view_data))
        .style(status_style)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(status_widget, layout[2]);

    if let Some(lead) = &state.selected_lead {
        let saved = lead_is_saved(state, lead);
        let area = centered_rect(70, 70, frame.area());
        frame.render_widget(Clear, area);
        let detail = Paragraph::new(render_detail_text(lead, saved)).block(
            Block::default()
                .title(lead.display_name().to_owned())
                .borders(Borders::ALL)
                .style(Style::default().fg(Color::Cyan)),
        );
        frame.render_widget(detail, area);
    }

    if view_data.help_visible {
        let area = centered_rect(72, 50, frame.area());
        frame.render_widget(Clear, area);
        let help = Paragraph::new(help_overlay_text())
            .block(Block::default().title("help").borders(Borders::ALL));
        frame.render_widget(help, area);
    }
}

fn tab_title(view: ActiveView, state: &ViewState) -> String {
    match view {
        ActiveView::Search => view.label().to_owned(),
        ActiveView::History => format!("{} ({})", view.label(), state.history.len()),
        ActiveView::Leads => format!("{} ({})", view.label(), state.saved_leads.len()),
    }
}

fn render_search(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &ViewState,
    view_data: &ViewData,
) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(1)])
        .split(area);

    let form_title = if state.loading {
        "search · searching…"
    } else if view_data.form.editing {
        "search · editing"
    } else {
        "search"
    };
    let form = Paragraph::new(render_form_text(
        &view_data.form,
        state
            .audience_config
            .as_ref()
            .and_then(|config| config.summary()),
    ))
    .block(Block::default().title(form_title).borders(Borders::ALL));
    frame.render_widget(form, sections[0]);

    render_results_table(frame, sections[1], state, view_data);
}

fn render_form_text(form: &SearchForm, audience: Option<String>) -> String {
    let mut lines = FormField::ALL
        .iter()
        .map(|field| {
            let marker = if form.editing && form.focus == *field {
                FOCUS_MARK
            } else {
                " "
            };
            let value = match field {
                FormField::Keyword => form.keyword.clone(),
                FormField::Location => form.location.clone(),
                FormField::Platform => SearchPlatform::ALL
                    .iter()
                    .map(|platform| {
                        if *platform == form.platform {
                            format!("[{}]", platform.label())
                        } else {
                            platform.label().to_owned()
                        }
                    })
                    .collect::<Vec<_>>()
                    .join(" "),
                FormField::MaxResults => form.max_results.clone(),
            };
            format!("{marker} {:<12}{value}", format!("{}:", field.label()))
        })
        .collect::<Vec<_>>();
    if let Some(audience) = audience {
        lines.push(format!("  audience:   {audience}"));
    }
    lines.join("\n")
}

fn results_title(page: &ResultPage<'_>, loading: bool) -> String {
    let mut title = if page.total == 0 {
        "results".to_owned()
    } else {
        format!(
            "results {}-{} of {} · page {}/{}",
            page.first_row, page.last_row, page.total, page.page, page.total_pages
        )
    };
    if loading {
        title.push_str(" · loading");
    }
    title
}

fn sort_header(field: SortField, view: &ResultView) -> String {
    let position = SortField::ALL
        .iter()
        .position(|candidate| *candidate == field)
        .unwrap_or(0)
        + 1;
    match view.sort.direction_for(field) {
        Some(direction) => format!("{position} {} {}", field.label(), direction.arrow()),
        None => format!("{position} {}", field.label()),
    }
}

fn platform_badge(platform: &Platform) -> (String, Color) {
    match platform {
        Platform::LinkedIn => ("in".to_owned(), Color::Blue),
        Platform::X => ("X".to_owned(), Color::White),
        Platform::Other(label) if label.trim().is_empty() => ("?".to_owned(), Color::DarkGray),
        Platform::Other(label) => (label.clone(), Color::DarkGray),
    }
}

fn lead_is_saved(state: &ViewState, lead: &Lead) -> bool {
    lead.id.as_ref().is_some_and(|id| state.is_lead_saved(id))
}

fn saved_mark(state: &ViewState, lead: &Lead) -> &'static str {
    if lead_is_saved(state, lead) {
        SAVED_MARK
    } else {
        " "
    }
}

fn popularity_cell(lead: &Lead) -> String {
    format_popularity(lead.popularity_count()).unwrap_or_else(|| POPULARITY_PLACEHOLDER.to_owned())
}

fn text_cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_owned()
}

fn render_results_table(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &ViewState,
    view_data: &ViewData,
) {
    let page = current_page(state, view_data);
    let header_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let mut header_cells = vec![Cell::from(" ").style(header_style)];
    header_cells.extend(
        SortField::ALL
            .iter()
            .map(|field| Cell::from(sort_header(*field, &view_data.result_view)).style(header_style)),
    );
    let header = Row::new(header_cells);

    let rows = page.rows.iter().enumerate().map(|(index, lead)| {
        let (badge, badge_color) = platform_badge(&lead.platform);
        let mut row_style = Style::default();
        if index == view_data.result_cursor && !view_data.form.editing {
            row_style = row_style.bg(Color::DarkGray);
        }
        Row::new(vec![
            Cell::from(saved_mark(state, lead)).style(Style::default().fg(Color::Yellow)),
            Cell::from(lead.display_name().to_owned()),
            Cell::from(badge).style(Style::default().fg(badge_color)),
            Cell::from(text_cell(lead.role.as_deref())),
            Cell::from(popularity_cell(lead)),
            Cell::from(text_cell(lead.region.as_deref())),
            Cell::from(text_cell(lead.company.as_deref())),
        ])
        .style(row_style)
    });

    let widths = [
        Constraint::Length(2),
        Constraint::Min(12),
        Constraint::Length(12),
        Constraint::Min(10),
        Constraint::Length(13),
        Constraint::Min(10),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(
            Block::default()
                .title(results_title(&page, state.loading))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, area);
}

fn history_row(entry: &HistoryEntry) -> [String; 5] {
    [
        entry
            .date()
            .map(|date| date.to_string())
            .unwrap_or_default(),
        entry.keyword.clone(),
        entry.location.clone(),
        entry.platform.clone(),
        entry
            .result_count
            .map(|count| count.to_string())
            .unwrap_or_else(|| POPULARITY_PLACEHOLDER.to_owned()),
    ]
}

fn render_history(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &ViewState,
    view_data: &ViewData,
) {
    let header = Row::new(
        ["date", "keyword", "location", "platform", "results"]
            .into_iter()
            .map(|label| {
                Cell::from(label).style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            }),
    );
    let rows = state.history.iter().enumerate().map(|(index, entry)| {
        let mut style = Style::default();
        if state.loading {
            style = style.fg(Color::DarkGray);
        }
        if index == view_data.history_cursor {
            style = style.bg(Color::DarkGray);
        }
        Row::new(history_row(entry).map(Cell::from)).style(style)
    });
    let widths = [
        Constraint::Length(10),
        Constraint::Min(14),
        Constraint::Min(12),
        Constraint::Length(9),
        Constraint::Length(7),
    ];
    let title = if state.history.is_empty() {
        "history · no searches yet".to_owned()
    } else {
        format!("history · {}", state.history.len())
    };
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_saved(
    frame: &mut ratatui::Frame<'_>,
    area: Rect,
    state: &ViewState,
    view_data: &ViewData,
) {
    let header = Row::new(
        ["name", "platform", "role", "followers", "saved"]
            .into_iter()
            .map(|label| {
                Cell::from(label).style(
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                )
            }),
    );
    let rows = state.saved_leads.iter().enumerate().map(|(index, lead)| {
        let (badge, badge_color) = platform_badge(&lead.platform);
        let mut style = Style::default();
        if index == view_data.saved_cursor {
            style = style.bg(Color::DarkGray);
        }
        Row::new(vec![
            Cell::from(lead.display_name().to_owned()),
            Cell::from(badge).style(Style::default().fg(badge_color)),
            Cell::from(text_cell(lead.role.as_deref())),
            Cell::from(popularity_cell(lead)),
            Cell::from(text_cell(lead.saved_at.as_deref().map(|value| {
                value.get(..10).unwrap_or(value)
            }))),
        ])
        .style(style)
    });
    let widths = [
        Constraint::Min(14),
        Constraint::Length(12),
        Constraint::Min(12),
        Constraint::Length(10),
        Constraint::Length(10),
    ];
    let title = if state.saved_leads.is_empty() {
        "saved · nothing saved yet".to_owned()
    } else {
        format!("saved · {}", state.saved_leads.len())
    };
    let table = Table::new(rows, widths)
        .header(header)
        .column_spacing(1)
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(table, area);
}

fn render_detail_text(lead: &Lead, saved: bool) -> String {
    let mut lines = Vec::new();
    let mut title = lead.display_name().to_owned();
    if lead.verified {
        title.push(' ');
        title.push_str(VERIFIED_MARK);
    }
    lines.push(title);
    lines.push(format!("platform: {}", platform_badge(&lead.platform).0));

    let mut push = |label: &str, value: Option<&str>| {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    };
    push("role", lead.role.as_deref());
    push("headline", lead.distinct_headline());
    push("company", lead.company.as_deref());
    push("industry", lead.industry.as_deref());
    push("location", lead.region.as_deref());
    if let Some(popularity) = lead.popularity
        && let Some(count) = format_popularity(Some(popularity.count()))
    {
        lines.push(format!("{}: {count}", popularity.label()));
    }
    if let Some(bio) = lead.bio.as_deref() {
        lines.push(String::new());
        lines.push(bio.to_owned());
        lines.push(String::new());
    }
    let mut push = |label: &str, value: Option<&str>| {
        if let Some(value) = value {
            lines.push(format!("{label}: {value}"));
        }
    };
    push("email", lead.email.as_deref());
    push("website", lead.website.as_deref());
    push("profile", lead.contact_link.as_deref());
    push("search term", lead.notes.as_deref());

    lines.push(String::new());
    let save_hint = if saved {
        format!("{SAVED_MARK} saved | d delete")
    } else {
        "s save".to_owned()
    };
    lines.push(format!("{save_hint} | esc close"));
    lines.join("\n")
}

fn status_text(state: &ViewState, view_data: &ViewData) -> String {
    let view = state.active_view.label().to_ascii_uppercase();
    let hints = if view_data.form.editing {
        "tab field | space/←→ platform | enter search | esc done"
    } else {
        match state.active_view {
            ActiveView::Search => {
                "i edit | j/k | n/p page | 1-6 sort | s save | enter detail | e csv | tab view | ? help"
            }
            ActiveView::History => "j/k | enter replay | e csv | tab view | ? help",
            ActiveView::Leads => "j/k | enter detail | d delete | e csv | tab view | ? help",
        }
    };
    let mut parts = vec![view];
    if state.loading {
        parts.push("searching…".to_owned());
    }
    if let Some(status) = &view_data.status {
        parts.push(status.text.clone());
    }
    parts.push(hints.to_owned());
    parts.join(" | ")
}

fn help_overlay_text() -> &'static str {
    "global: ctrl+q quit | q quit | tab/shift+tab view | e export csv | ? help\n\
search: i or / edit form | j/k row | n/p page | 1-6 sort by column | s save row | enter detail\n\
form: tab/shift+tab field | space or ←/→ platform | enter search | esc done\n\
history: j/k row | enter replay\n\
saved: j/k row | enter detail | d delete\n\
detail: s save | d delete | esc close"
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

//! App: component-based event loop for the admin console.
//!
//! Architecture:
//! - `App` owns the panels and `AppState` (read-only data for the panels).
//! - Terminal input, HTTP calls and the refresh runner all report back over
//!   one `tokio::mpsc` channel of `AppMessage`s.
//! - The loop draws a frame, then awaits the next message or timer tick.
//! - Panels return `Vec<Action>`; `dispatch` broadcasts each action to every
//!   panel and then applies it.

use std::collections::VecDeque;
use std::io;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use airdesk_proto::client::ApiClient;
use airdesk_proto::config::Config;
use airdesk_proto::protocol::{ArtistTrack, JobStatus, SpotifyStatus, Station};
use airdesk_proto::refresh::{
    ProgressUpdate, RefreshEvent, RefreshMode, RefreshOutcome, RefreshRunner, RefreshSettings,
    COMPLETE_MESSAGE,
};
use airdesk_proto::search::SearchQuery;
use airdesk_proto::tracker::JobKind;
use airdesk_proto::ui_state::UiStateStore;

use crate::{
    action::{Action, ComponentId, RefreshChoice, Workspace},
    app_state::{AppState, LineTone, LogLine, SearchOutcome, StatusOutcome},
    component::Component,
    components::{
        job_panel::JobPanel, log_panel::LogPanel, refresh_panel::RefreshPanel,
        search_panel::SearchPanel, tracks_panel::TracksPanel,
    },
    theme::{C_ACCENT, C_MUTED, C_SECONDARY},
    widgets::{
        pane_chrome::draw_collapsed_pane,
        status_bar::{self, InputMode},
        toast::ToastManager,
    },
};

// ── Internal event bus ────────────────────────────────────────────────────────

enum AppMessage {
    Event(Event),
    SearchDone(SearchQuery, Result<Vec<Station>, String>),
    Refresh(RefreshEvent),
    RefreshDone(RefreshOutcome),
    /// Reply to a status poll, tagged with the poll's sequence number.
    Status(JobKind, u64, Result<JobStatus, String>),
    Spotify(Result<SpotifyStatus, String>),
    Tracks(Result<Vec<ArtistTrack>, String>),
    JobControl {
        kind: JobKind,
        start: bool,
        result: Result<(), String>,
    },
}

const DASHBOARD_PANES: [ComponentId; 3] = [
    ComponentId::JobPanel(JobKind::Scan),
    ComponentId::JobPanel(JobKind::Discover),
    ComponentId::TracksPanel,
];

struct Panels {
    search: SearchPanel,
    refresh: RefreshPanel,
    scan: JobPanel,
    discover: JobPanel,
    tracks: TracksPanel,
    log: LogPanel,
}

impl Panels {
    fn new() -> Self {
        Self {
            search: SearchPanel::new(),
            refresh: RefreshPanel::new(),
            scan: JobPanel::new(JobKind::Scan),
            discover: JobPanel::new(JobKind::Discover),
            tracks: TracksPanel::new(),
            log: LogPanel::new(),
        }
    }

    fn get_mut(&mut self, id: ComponentId) -> &mut dyn Component {
        match id {
            ComponentId::SearchPanel => &mut self.search,
            ComponentId::RefreshPanel => &mut self.refresh,
            ComponentId::JobPanel(JobKind::Scan) => &mut self.scan,
            ComponentId::JobPanel(JobKind::Discover) => &mut self.discover,
            ComponentId::TracksPanel => &mut self.tracks,
            ComponentId::LogPanel => &mut self.log,
        }
    }

    fn all_mut(&mut self) -> [&mut dyn Component; 6] {
        [
            &mut self.search,
            &mut self.refresh,
            &mut self.scan,
            &mut self.discover,
            &mut self.tracks,
            &mut self.log,
        ]
    }
}

pub struct App {
    client: ApiClient,
    refresh_settings: RefreshSettings,
    poll_interval: Duration,
    state: AppState,
    ui: UiStateStore,
    panels: Panels,
    toast: ToastManager,
    workspace: Workspace,
    focus: usize,
    show_logs: bool,
    pending_search: Option<SearchQuery>,
    should_quit: bool,
    tx: Option<mpsc::Sender<AppMessage>>,
}

impl App {
    pub fn new(
        config: &Config,
        client: ApiClient,
        workspace: Workspace,
        initial_search: Option<SearchQuery>,
    ) -> Self {
        let ui = UiStateStore::load(config.paths.ui_state_file.clone());
        let mut state = AppState::new(
            client.base_url().to_string(),
            config.refresh.countries.clone(),
            config.dashboard.artist_id.clone(),
        );
        state.controls_expanded = ui.controls_expanded();

        let mut panels = Panels::new();
        if let Some(q) = &initial_search {
            panels.search.set_query(q);
        }

        Self {
            client,
            refresh_settings: RefreshSettings::from(&config.refresh),
            poll_interval: config.dashboard.poll_interval(),
            state,
            ui,
            panels,
            toast: ToastManager::new(),
            workspace,
            focus: 0,
            show_logs: false,
            pending_search: initial_search,
            should_quit: false,
            tx: None,
        }
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        debug!("terminal ready, size={:?}", terminal.size());

        let result = self.event_loop(&mut terminal).await;

        // ── Teardown ──────────────────────────────────────────────────────────
        self.save_ui_state();
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        let (tx, mut rx) = mpsc::channel::<AppMessage>(1024);
        self.tx = Some(tx.clone());
        self.push_log(format!("airdesk started against {}", self.state.base_url), LineTone::Info);

        // ── Background task: keyboard events ──────────────────────────────────
        // Polls with a timeout so the thread notices the loop has ended.
        let input_tx = tx.clone();
        tokio::task::spawn_blocking(move || {
            while !input_tx.is_closed() {
                match event::poll(Duration::from_millis(200)) {
                    Ok(true) => match event::read() {
                        Ok(ev) => {
                            if input_tx.blocking_send(AppMessage::Event(ev)).is_err() {
                                break;
                            }
                        }
                        Err(_) => break,
                    },
                    Ok(false) => {}
                    Err(_) => break,
                }
            }
        });

        if let Some(q) = self.pending_search.take() {
            self.dispatch(Action::RunSearch(q));
        }
        if self.state.artist_id.is_some() {
            self.dispatch(Action::LoadTracks);
        }

        // ── Periodic timers ───────────────────────────────────────────────────
        // First tick fires immediately, so the dashboard fills in on start.
        let mut status_poll = tokio::time::interval(self.poll_interval);
        status_poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut toast_tick = tokio::time::interval(Duration::from_millis(100));
        toast_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                break;
            }

            tokio::select! {
                Some(msg) = rx.recv() => {
                    self.handle_message(msg);
                    // Drain whatever else is queued before redrawing.
                    while let Ok(next) = rx.try_recv() {
                        self.handle_message(next);
                    }
                }
                _ = status_poll.tick() => {
                    for kind in JobKind::ALL {
                        self.poll_job(kind);
                    }
                    self.poll_spotify();
                }
                _ = toast_tick.tick() => {
                    self.toast.tick();
                }
            }
        }
        Ok(())
    }

    // ── Messages ──────────────────────────────────────────────────────────────

    fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key);
            }
            AppMessage::Event(_) => {}

            AppMessage::SearchDone(query, result) => {
                match self.state.on_search_result(&query, result) {
                    SearchOutcome::Stale => {
                        debug!("dropping stale results for {}", query.describe());
                    }
                    SearchOutcome::Loaded(n) => {
                        self.toast.dismiss_spinner();
                        info!("{} stations for {}", n, query.describe());
                    }
                    SearchOutcome::Failed(message) => {
                        self.toast.dismiss_spinner();
                        warn!("{}", message);
                        self.toast.error(message);
                    }
                }
            }

            AppMessage::Refresh(event) => self.on_refresh_event(event),

            AppMessage::RefreshDone(outcome) => match outcome {
                RefreshOutcome::Busy => self.toast.warning("A refresh is already running"),
                RefreshOutcome::Completed {
                    processed,
                    requests,
                } => self.push_log(
                    format!("refresh: {} processed in {} requests", processed, requests),
                    LineTone::Success,
                ),
                RefreshOutcome::Failed { error, requests } => self.push_log(
                    format!("{} (after {} requests)", error, requests),
                    LineTone::Error,
                ),
            },

            AppMessage::Status(kind, seq, result) => {
                if let Err(e) = &result {
                    warn!("[{}] status poll #{} failed: {}", kind.id(), seq, e);
                }
                match self.state.on_status_result(kind, seq, result) {
                    StatusOutcome::Observed(fired) => {
                        for n in &fired {
                            info!("{}", n.message);
                            self.toast.notify(n);
                        }
                    }
                    StatusOutcome::Unavailable(message) => self.toast.error(message),
                    StatusOutcome::Stale | StatusOutcome::StillUnavailable => {}
                }
            }

            AppMessage::Spotify(Ok(status)) => {
                self.state.spotify = Some(status);
                self.state.spotify_error = None;
            }
            AppMessage::Spotify(Err(e)) => {
                debug!("spotify status failed: {}", e);
                self.state.spotify_error = Some(e);
            }

            AppMessage::Tracks(result) => {
                self.state.tracks_loading = false;
                match result {
                    Ok(tracks) => {
                        self.push_log(format!("{} artist tracks", tracks.len()), LineTone::Info);
                        self.state.tracks = tracks;
                    }
                    Err(e) => {
                        self.toast.error(format!("Could not load tracks: {}", e));
                        self.push_log(format!("tracks failed: {}", e), LineTone::Error);
                    }
                }
            }

            AppMessage::JobControl {
                kind,
                start,
                result,
            } => {
                let verb = if start { "start" } else { "stop" };
                match result {
                    Ok(()) => {
                        self.toast.info(format!("{} {} requested", kind.label(), verb));
                        self.push_log(format!("{} {} requested", kind.label(), verb), LineTone::Info);
                        self.poll_job(kind);
                    }
                    Err(e) => {
                        self.toast.error(format!(
                            "Could not {} {}: {}",
                            verb,
                            kind.label().to_lowercase(),
                            e
                        ));
                        self.push_log(format!("{} {} failed: {}", kind.label(), verb, e), LineTone::Error);
                    }
                }
            }
        }
    }

    fn on_refresh_event(&mut self, event: RefreshEvent) {
        match event {
            RefreshEvent::Started { mode } => {
                self.state.refresh_mode = Some(mode);
                self.refresh_line(format!("Refresh started ({})", mode), LineTone::Info);
            }
            RefreshEvent::Message(text) => self.refresh_line(text, LineTone::Info),
            RefreshEvent::Progress(update) => {
                self.state.refresh_progress = Some(update);
            }
            RefreshEvent::Finished { processed } => {
                let bar = self
                    .state
                    .refresh_progress
                    .get_or_insert_with(|| ProgressUpdate {
                        processed,
                        total: processed,
                        percent: 100,
                        current_country: None,
                    });
                bar.percent = 100;
                bar.processed = bar.processed.max(bar.total);
                self.refresh_line(COMPLETE_MESSAGE, LineTone::Success);
                self.toast
                    .success(format!("Refresh complete: {} stations processed", processed));
            }
            RefreshEvent::Failed(error) => {
                self.refresh_line(error.clone(), LineTone::Error);
                self.toast.error(error);
            }
        }
    }

    // ── Keys ──────────────────────────────────────────────────────────────────

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.dispatch(Action::Quit);
            return;
        }
        if self.panels.search.is_editing() {
            let actions = self.panels.search.handle_key(key, &self.state);
            self.dispatch_all(actions);
            return;
        }

        let global = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('1') => Some(Action::SwitchWorkspace(Workspace::Search)),
            KeyCode::Char('2') => Some(Action::SwitchWorkspace(Workspace::Refresh)),
            KeyCode::Char('3') => Some(Action::SwitchWorkspace(Workspace::Dashboard)),
            KeyCode::Tab => Some(Action::FocusNext),
            KeyCode::BackTab => Some(Action::FocusPrev),
            KeyCode::Char('L') => Some(Action::ToggleLogs),
            KeyCode::Char('K') => Some(Action::ToggleControls),
            KeyCode::Char('c') if DASHBOARD_PANES.contains(&self.focused()) => {
                Some(Action::ToggleCollapse(self.focused()))
            }
            _ => None,
        };
        if let Some(action) = global {
            self.dispatch(action);
            return;
        }

        let id = self.focused();
        let actions = self.panels.get_mut(id).handle_key(key, &self.state);
        self.dispatch_all(actions);
    }

    fn focus_ring(&self) -> Vec<ComponentId> {
        let mut ring = match self.workspace {
            Workspace::Search => vec![ComponentId::SearchPanel],
            Workspace::Refresh => vec![ComponentId::RefreshPanel],
            Workspace::Dashboard => DASHBOARD_PANES.to_vec(),
        };
        if self.show_logs {
            ring.push(ComponentId::LogPanel);
        }
        ring
    }

    fn focused(&self) -> ComponentId {
        let ring = self.focus_ring();
        ring[self.focus.min(ring.len() - 1)]
    }

    // ── Actions ───────────────────────────────────────────────────────────────

    fn dispatch_all(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    fn dispatch(&mut self, action: Action) {
        let mut queue = VecDeque::from([action]);
        while let Some(action) = queue.pop_front() {
            for panel in self.panels.all_mut() {
                queue.extend(panel.on_action(&action, &self.state));
            }
            self.apply_action(action);
        }
    }

    fn apply_action(&mut self, action: Action) {
        match action {
            Action::RunSearch(query) => self.run_search(query),
            Action::Copy { what, text } => {
                match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(text.clone())) {
                    Ok(()) => {
                        let shown = if text.chars().count() > 40 {
                            format!("{}…", text.chars().take(40).collect::<String>())
                        } else {
                            text
                        };
                        self.toast.success(format!("Copied {}: {}", what, shown));
                    }
                    Err(e) => {
                        warn!("clipboard: {}", e);
                        self.toast.error(format!("Clipboard unavailable: {}", e));
                    }
                }
            }

            Action::StartRefresh(choice) => self.start_refresh(choice),

            Action::StartJob(kind) => self.job_control(kind, true),
            Action::StopJob(kind) => self.job_control(kind, false),
            Action::LoadTracks => self.load_tracks(),

            Action::FocusNext => {
                let len = self.focus_ring().len();
                self.focus = (self.focus.min(len - 1) + 1) % len;
            }
            Action::FocusPrev => {
                let len = self.focus_ring().len();
                self.focus = (self.focus.min(len - 1) + len - 1) % len;
            }
            Action::SwitchWorkspace(ws) => {
                self.workspace = ws;
                self.focus = 0;
            }
            Action::ToggleCollapse(id) => {
                let now = self.ui.toggle(id.pane_key(), true);
                debug!("pane {} is now {:?}", id.pane_key(), now);
                self.save_ui_state();
            }
            Action::ToggleControls => {
                let expanded = !self.ui.controls_expanded();
                self.ui.set_controls_expanded(expanded);
                self.state.controls_expanded = expanded;
                self.save_ui_state();
            }
            Action::ToggleLogs => {
                self.show_logs = !self.show_logs;
                self.focus = self.focus.min(self.focus_ring().len() - 1);
            }

            Action::Toast(severity, message) => self.toast.push(message, severity),
            Action::Quit => self.should_quit = true,
        }
    }

    // ── Background requests ───────────────────────────────────────────────────

    fn sender(&self) -> Option<mpsc::Sender<AppMessage>> {
        self.tx.clone()
    }

    fn run_search(&mut self, query: SearchQuery) {
        let Some(tx) = self.sender() else { return };
        info!("search: {}", query.describe());
        self.state.searching = true;
        self.state.last_query = Some(query.clone());
        self.toast.spinner(format!("Searching {}…", query.describe()));

        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.search(&query).await.map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::SearchDone(query, result)).await;
        });
    }

    fn start_refresh(&mut self, choice: RefreshChoice) {
        let countries = self.state.refresh_countries.clone();
        let mode = match choice {
            RefreshChoice::Batches => RefreshMode::Offset,
            RefreshChoice::Countries if countries.is_empty() => {
                self.toast
                    .warning("No countries configured ([refresh] countries)");
                return;
            }
            RefreshChoice::Countries => RefreshMode::Countries(countries),
            RefreshChoice::Task => RefreshMode::Task { countries },
        };
        let Some(tx) = self.sender() else { return };
        // Armed here, before the view is reset, so a second press queued in
        // the same batch cannot wipe the running job's log.
        let Some(guard) = self.state.begin_refresh(mode.label()) else {
            self.toast.warning("A refresh is already running");
            return;
        };

        let runner = RefreshRunner::new(self.client.clone(), self.refresh_settings.clone());
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();

        let forward = tx.clone();
        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                if forward.send(AppMessage::Refresh(event)).await.is_err() {
                    break;
                }
            }
        });
        tokio::spawn(async move {
            let outcome = runner.run_armed(guard, mode, &event_tx).await;
            drop(event_tx);
            let _ = tx.send(AppMessage::RefreshDone(outcome)).await;
        });
    }

    fn poll_job(&mut self, kind: JobKind) {
        let Some(tx) = self.sender() else { return };
        let seq = self.state.tracker_mut(kind).begin_poll();
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.job_status(kind).await.map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::Status(kind, seq, result)).await;
        });
    }

    fn poll_spotify(&self) {
        let Some(tx) = self.sender() else { return };
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client.spotify_status().await.map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::Spotify(result)).await;
        });
    }

    fn job_control(&self, kind: JobKind, start: bool) {
        let Some(tx) = self.sender() else { return };
        info!("[{}] {} requested", kind.id(), if start { "start" } else { "stop" });
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = if start {
                client.start_job(kind).await
            } else {
                client.stop_job(kind).await
            };
            let result = result.map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::JobControl { kind, start, result }).await;
        });
    }

    fn load_tracks(&mut self) {
        let Some(artist_id) = self.state.artist_id.clone() else {
            return;
        };
        let Some(tx) = self.sender() else { return };
        self.state.tracks_loading = true;
        let client = self.client.clone();
        tokio::spawn(async move {
            let result = client
                .artist_tracks(&artist_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(AppMessage::Tracks(result)).await;
        });
    }

    // ── Logging helpers ───────────────────────────────────────────────────────

    fn push_log(&mut self, text: impl Into<String>, tone: LineTone) {
        let text = text.into();
        info!("{}", text);
        self.state.push_log(text, tone);
    }

    fn refresh_line(&mut self, text: impl Into<String>, tone: LineTone) {
        self.state.refresh_log.push(LogLine::new(text, tone));
    }

    fn save_ui_state(&self) {
        if let Err(e) = self.ui.save() {
            warn!("could not save {}: {}", self.ui.path().display(), e);
        }
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let mut constraints = vec![Constraint::Length(1), Constraint::Min(3)];
        if self.show_logs {
            constraints.push(Constraint::Length(10));
        }
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        if self.state.controls_expanded {
            constraints.push(Constraint::Length(1));
        }
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        self.draw_header(frame, chunks[0]);

        let focused = self.focused();
        let body = chunks[1];
        match self.workspace {
            Workspace::Search => self.panels.search.draw(
                frame,
                body,
                focused == ComponentId::SearchPanel,
                &self.state,
            ),
            Workspace::Refresh => self.panels.refresh.draw(
                frame,
                body,
                focused == ComponentId::RefreshPanel,
                &self.state,
            ),
            Workspace::Dashboard => self.draw_dashboard(frame, body, focused),
        }

        let mut next = 2;
        if self.show_logs {
            self.panels.log.draw(
                frame,
                chunks[next],
                focused == ComponentId::LogPanel,
                &self.state,
            );
            next += 1;
        }
        status_bar::draw_separator(frame, chunks[next]);
        status_bar::draw_log_bar(
            frame,
            chunks[next + 1],
            self.state.last_log(),
            self.state.reachable,
        );
        if self.state.controls_expanded {
            let mode = if self.panels.search.is_editing() {
                InputMode::Editing
            } else {
                InputMode::Normal
            };
            status_bar::draw_keys_bar(frame, chunks[next + 2], mode, self.workspace);
        }

        self.toast.draw(frame, area);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            " airdesk ",
            Style::default().fg(C_ACCENT).add_modifier(Modifier::BOLD),
        )];
        for (i, ws) in Workspace::ALL.iter().enumerate() {
            let style = if *ws == self.workspace {
                Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else {
                Style::default().fg(C_SECONDARY)
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!(" {} {} ", i + 1, ws.label()), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!("{} ", self.state.base_url),
                Style::default().fg(C_MUTED),
            ))
            .alignment(Alignment::Right),
            area,
        );
    }

    fn draw_dashboard(&mut self, frame: &mut Frame, area: Rect, focused: ComponentId) {
        let open: Vec<bool> = DASHBOARD_PANES
            .iter()
            .map(|id| self.ui.is_open(id.pane_key(), true))
            .collect();
        let constraints: Vec<Constraint> = DASHBOARD_PANES
            .iter()
            .zip(&open)
            .map(|(id, &open)| {
                if open {
                    Constraint::Min(self.panels.get_mut(*id).min_height())
                } else {
                    Constraint::Length(1)
                }
            })
            .collect();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(area);

        for (i, id) in DASHBOARD_PANES.iter().enumerate() {
            let panel = self.panels.get_mut(*id);
            let is_focused = focused == *id;
            if open[i] {
                panel.draw(frame, chunks[i], is_focused, &self.state);
            } else {
                let summary = panel.collapse_summary(&self.state);
                draw_collapsed_pane(
                    frame,
                    chunks[i],
                    panel.title(),
                    summary.as_deref(),
                    is_focused,
                );
            }
        }
    }
}

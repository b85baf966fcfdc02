//! Action enum: user intents and internal events routed by the App.

use airdesk_proto::search::SearchQuery;
use airdesk_proto::tracker::JobKind;

use crate::widgets::toast::Severity;

/// Unique identifier for a focusable component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentId {
    SearchPanel,
    RefreshPanel,
    JobPanel(JobKind),
    TracksPanel,
    LogPanel,
}

impl ComponentId {
    /// Key under which the pane's open/closed state is persisted.
    pub fn pane_key(self) -> &'static str {
        match self {
            ComponentId::SearchPanel => "search",
            ComponentId::RefreshPanel => "refresh",
            ComponentId::JobPanel(kind) => kind.id(),
            ComponentId::TracksPanel => "tracks",
            ComponentId::LogPanel => "logs",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Workspace {
    Search,
    Refresh,
    Dashboard,
}

impl Workspace {
    pub const ALL: [Workspace; 3] = [Workspace::Search, Workspace::Refresh, Workspace::Dashboard];

    pub fn label(self) -> &'static str {
        match self {
            Workspace::Search => "Search",
            Workspace::Refresh => "Refresh",
            Workspace::Dashboard => "Dashboard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshChoice {
    Batches,
    Countries,
    Task,
}

impl RefreshChoice {
    pub fn next(self) -> Self {
        match self {
            RefreshChoice::Batches => RefreshChoice::Countries,
            RefreshChoice::Countries => RefreshChoice::Task,
            RefreshChoice::Task => RefreshChoice::Batches,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RefreshChoice::Batches => "all stations in batches",
            RefreshChoice::Countries => "country by country",
            RefreshChoice::Task => "server task",
        }
    }
}

/// Everything components can ask for. Components produce Actions; the App
/// dispatches them.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Search ───────────────────────────────────────────────────────────────
    RunSearch(SearchQuery),
    Copy { what: &'static str, text: String },

    // ── Refresh ──────────────────────────────────────────────────────────────
    StartRefresh(RefreshChoice),

    // ── Jobs ─────────────────────────────────────────────────────────────────
    StartJob(JobKind),
    StopJob(JobKind),
    LoadTracks,

    // ── Navigation / layout ──────────────────────────────────────────────────
    FocusNext,
    FocusPrev,
    SwitchWorkspace(Workspace),
    ToggleCollapse(ComponentId),
    ToggleControls,
    ToggleLogs,

    Toast(Severity, String),
    Quit,
}

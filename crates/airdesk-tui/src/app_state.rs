//! AppState: data shared read-only with every component.

use std::collections::{HashMap, VecDeque};

use airdesk_proto::protocol::{ArtistTrack, JobStatus, SpotifyStatus, Station};
use airdesk_proto::refresh::{ProgressUpdate, Trigger, TriggerGuard};
use airdesk_proto::search::{Facets, SearchQuery};
use airdesk_proto::tracker::{JobKind, Notification, StatusTracker};
use chrono::{DateTime, Local};

const MAX_LOG_LINES: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTone {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct LogLine {
    pub at: DateTime<Local>,
    pub text: String,
    pub tone: LineTone,
}

impl LogLine {
    pub fn new(text: impl Into<String>, tone: LineTone) -> Self {
        Self {
            at: Local::now(),
            text: text.into(),
            tone,
        }
    }

    pub fn stamp(&self) -> String {
        self.at.format("%H:%M:%S").to_string()
    }
}

/// What the app should surface after a status poll reply.
#[derive(Debug, PartialEq, Eq)]
pub enum StatusOutcome {
    /// An older reply than one already applied; ignored.
    Stale,
    Observed(Vec<Notification>),
    /// First failure of a streak; announce it.
    Unavailable(String),
    /// The job was already failing; stay quiet.
    StillUnavailable,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results for a query that has since been replaced.
    Stale,
    Loaded(usize),
    /// Previous results stay on screen.
    Failed(String),
}

pub struct AppState {
    pub base_url: String,

    // ── Search ───────────────────────────────────────────────────────────────
    pub stations: Vec<Station>,
    pub facets: Facets,
    pub last_query: Option<SearchQuery>,
    pub searching: bool,

    // ── Refresh ──────────────────────────────────────────────────────────────
    pub trigger: Trigger,
    pub refresh_countries: Vec<String>,
    pub refresh_mode: Option<&'static str>,
    pub refresh_progress: Option<ProgressUpdate>,
    pub refresh_log: Vec<LogLine>,

    // ── Dashboard ────────────────────────────────────────────────────────────
    pub scan: StatusTracker,
    pub discover: StatusTracker,
    /// Last poll error per job, cleared by the next successful poll.
    pub job_errors: HashMap<JobKind, String>,
    pub spotify: Option<SpotifyStatus>,
    pub spotify_error: Option<String>,
    pub artist_id: Option<String>,
    pub tracks: Vec<ArtistTrack>,
    pub tracks_loading: bool,

    pub controls_expanded: bool,
    pub reachable: bool,
    pub logs: VecDeque<LogLine>,
}

impl AppState {
    pub fn new(base_url: String, refresh_countries: Vec<String>, artist_id: Option<String>) -> Self {
        Self {
            base_url,
            stations: Vec::new(),
            facets: Facets::default(),
            last_query: None,
            searching: false,
            trigger: Trigger::new(),
            refresh_countries,
            refresh_mode: None,
            refresh_progress: None,
            refresh_log: Vec::new(),
            scan: StatusTracker::new(JobKind::Scan),
            discover: StatusTracker::new(JobKind::Discover),
            job_errors: HashMap::new(),
            spotify: None,
            spotify_error: None,
            artist_id,
            tracks: Vec::new(),
            tracks_loading: false,
            controls_expanded: true,
            reachable: true,
            logs: VecDeque::new(),
        }
    }

    pub fn tracker(&self, kind: JobKind) -> &StatusTracker {
        match kind {
            JobKind::Scan => &self.scan,
            JobKind::Discover => &self.discover,
        }
    }

    pub fn tracker_mut(&mut self, kind: JobKind) -> &mut StatusTracker {
        match kind {
            JobKind::Scan => &mut self.scan,
            JobKind::Discover => &mut self.discover,
        }
    }

    /// Apply the reply to status poll `seq` of `kind`.
    pub fn on_status_result(
        &mut self,
        kind: JobKind,
        seq: u64,
        result: Result<JobStatus, String>,
    ) -> StatusOutcome {
        if !self.tracker_mut(kind).accept(seq) {
            return StatusOutcome::Stale;
        }
        match result {
            Ok(status) => {
                self.reachable = true;
                if self.job_errors.remove(&kind).is_some() {
                    self.push_log(format!("{} status back", kind.label()), LineTone::Info);
                }
                let fired = self.tracker_mut(kind).observe(&status);
                for n in &fired {
                    self.push_log(n.message.clone(), LineTone::Success);
                }
                StatusOutcome::Observed(fired)
            }
            Err(e) => {
                self.reachable = false;
                if self.job_errors.insert(kind, e.clone()).is_some() {
                    return StatusOutcome::StillUnavailable;
                }
                self.push_log(format!("{} status failed: {}", kind.label(), e), LineTone::Error);
                StatusOutcome::Unavailable(format!("{} status unavailable: {}", kind.label(), e))
            }
        }
    }

    pub fn on_search_result(
        &mut self,
        query: &SearchQuery,
        result: Result<Vec<Station>, String>,
    ) -> SearchOutcome {
        if self.last_query.as_ref() != Some(query) {
            return SearchOutcome::Stale;
        }
        self.searching = false;
        match result {
            Ok(stations) => {
                let n = stations.len();
                self.reachable = true;
                self.facets = Facets::from_stations(&stations);
                self.stations = stations;
                self.push_log(format!("{} stations for {}", n, query.describe()), LineTone::Info);
                SearchOutcome::Loaded(n)
            }
            Err(e) => {
                self.reachable = false;
                self.push_log(format!("search failed: {}", e), LineTone::Error);
                SearchOutcome::Failed(format!("Search failed: {}", e))
            }
        }
    }

    /// Claim the refresh trigger and reset the refresh view for a new run.
    /// Returns `None`, leaving the running job's view alone, while a run
    /// holds the trigger.
    pub fn begin_refresh(&mut self, mode: &'static str) -> Option<TriggerGuard> {
        let guard = self.trigger.try_arm()?;
        self.refresh_log.clear();
        self.refresh_progress = None;
        self.refresh_mode = Some(mode);
        Some(guard)
    }

    pub fn push_log(&mut self, text: impl Into<String>, tone: LineTone) {
        self.logs.push_back(LogLine::new(text, tone));
        while self.logs.len() > MAX_LOG_LINES {
            self.logs.pop_front();
        }
    }

    pub fn last_log(&self) -> Option<&str> {
        self.logs.back().map(|l| l.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdesk_proto::protocol::JobState;

    fn state() -> AppState {
        AppState::new("http://127.0.0.1:8000".into(), Vec::new(), None)
    }

    fn poll(state: &mut AppState, result: Result<JobStatus, String>) -> StatusOutcome {
        let seq = state.tracker_mut(JobKind::Scan).begin_poll();
        state.on_status_result(JobKind::Scan, seq, result)
    }

    fn errors(state: &AppState) -> usize {
        state.logs.iter().filter(|l| l.tone == LineTone::Error).count()
    }

    #[test]
    fn status_failure_streak_is_announced_once() {
        let mut s = state();
        let down = || Err("connection refused".to_string());

        assert!(matches!(poll(&mut s, down()), StatusOutcome::Unavailable(_)));
        assert_eq!(poll(&mut s, down()), StatusOutcome::StillUnavailable);
        assert_eq!(errors(&s), 1);
        assert!(!s.reachable);

        let running = JobStatus {
            status: JobState::Running,
            ..JobStatus::default()
        };
        assert_eq!(poll(&mut s, Ok(running)), StatusOutcome::Observed(Vec::new()));
        assert_eq!(s.last_log(), Some("Scan status back"));
        assert!(s.job_errors.is_empty());

        assert!(matches!(poll(&mut s, down()), StatusOutcome::Unavailable(_)));
        assert_eq!(errors(&s), 2);
    }

    #[test]
    fn stale_status_reply_is_ignored() {
        let mut s = state();
        let slow = s.tracker_mut(JobKind::Scan).begin_poll();
        let fast = s.tracker_mut(JobKind::Scan).begin_poll();
        let done = JobStatus {
            status: JobState::Done,
            ..JobStatus::default()
        };
        assert!(matches!(
            s.on_status_result(JobKind::Scan, fast, Ok(done)),
            StatusOutcome::Observed(_)
        ));
        assert_eq!(
            s.on_status_result(JobKind::Scan, slow, Err("timeout".into())),
            StatusOutcome::Stale
        );
        assert!(s.reachable);
        assert_eq!(errors(&s), 0);
    }

    #[test]
    fn failed_search_keeps_previous_results() {
        let mut s = state();
        let first = SearchQuery::from_fields("France", "", "");
        s.last_query = Some(first.clone());
        let station = Station {
            name: "FIP".into(),
            country: "France".into(),
            ..Station::default()
        };
        assert_eq!(
            s.on_search_result(&first, Ok(vec![station])),
            SearchOutcome::Loaded(1)
        );

        let second = SearchQuery::from_fields("Belgium", "", "");
        s.last_query = Some(second.clone());
        s.searching = true;
        assert!(matches!(
            s.on_search_result(&second, Err("502".into())),
            SearchOutcome::Failed(_)
        ));
        assert_eq!(s.stations.len(), 1);
        assert!(!s.searching);
        assert_eq!(errors(&s), 1);

        // A late reply for the first query changes nothing.
        assert_eq!(s.on_search_result(&first, Ok(Vec::new())), SearchOutcome::Stale);
        assert_eq!(s.stations.len(), 1);
    }

    #[test]
    fn second_refresh_press_keeps_running_view() {
        let mut s = state();
        let guard = s.begin_refresh("batches").unwrap();
        s.refresh_log.push(LogLine::new("[1/10] Updated: FIP", LineTone::Info));

        assert!(s.begin_refresh("countries").is_none());
        assert_eq!(s.refresh_log.len(), 1);
        assert_eq!(s.refresh_mode, Some("batches"));

        drop(guard);
        assert!(s.begin_refresh("countries").is_some());
        assert!(s.refresh_log.is_empty());
    }
}

//! Scan / discovery job tracking: status badges and one-shot notifications.
//!
//! A `StatusTracker` owns the previous observation of one job, so that
//! transitions (a run completing, new playlists appearing) are reported once
//! no matter how often the status endpoint is polled.

use serde::{Deserialize, Serialize};

use crate::protocol::{JobState, JobStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    Scan,
    Discover,
}

impl JobKind {
    pub const ALL: [JobKind; 2] = [JobKind::Scan, JobKind::Discover];

    /// Stable id, also used as the pane id for persisted UI state.
    pub fn id(self) -> &'static str {
        match self {
            JobKind::Scan => "scan",
            JobKind::Discover => "discover",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            JobKind::Scan => "Scan",
            JobKind::Discover => "Discovery",
        }
    }
}

/// Colour family of a badge; the UI maps these onto its palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Muted,
    Success,
    Danger,
    Neutral,
}

/// What the dashboard shows for a job, and which controls are usable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub label: String,
    pub tone: Tone,
    pub start_enabled: bool,
    pub stop_enabled: bool,
}

impl Badge {
    pub fn for_state(kind: JobKind, state: JobState) -> Self {
        let name = kind.label();
        let (label, tone) = match state {
            JobState::Running => (format!("{} running…", name), Tone::Info),
            JobState::Stopped => (format!("{} stopped", name), Tone::Muted),
            JobState::Done => (format!("Last {} finished", name.to_lowercase()), Tone::Success),
            JobState::Error => (format!("{} failed", name), Tone::Danger),
            JobState::Idle => ("Waiting".to_string(), Tone::Neutral),
        };
        let running = state.is_running();
        Self {
            label,
            tone,
            start_enabled: !running,
            stop_enabled: running,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Completed,
    Failed,
    /// New items were created since the last poll.
    Created,
    /// More items were explored since the last poll.
    Explored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub job: JobKind,
    pub kind: NotificationKind,
    /// Size of the change for counter notifications, 1 for state transitions.
    pub count: u64,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct StatusTracker {
    job: JobKind,
    last: Option<JobStatus>,
    created_mark: u64,
    explored_mark: u64,
    /// Sequence number handed to the most recent poll.
    issued: u64,
    /// Highest sequence number whose reply has been applied.
    applied: u64,
}

impl StatusTracker {
    pub fn new(job: JobKind) -> Self {
        Self {
            job,
            last: None,
            created_mark: 0,
            explored_mark: 0,
            issued: 0,
            applied: 0,
        }
    }

    pub fn job(&self) -> JobKind {
        self.job
    }

    /// Most recent status seen, if any poll has succeeded yet.
    pub fn last(&self) -> Option<&JobStatus> {
        self.last.as_ref()
    }

    pub fn badge(&self) -> Badge {
        let state = self.last.as_ref().map(|s| s.status).unwrap_or_default();
        Badge::for_state(self.job, state)
    }

    pub fn created_mark(&self) -> u64 {
        self.created_mark
    }

    pub fn explored_mark(&self) -> u64 {
        self.explored_mark
    }

    /// Number the next status request. Replies are matched back with
    /// [`accept`](Self::accept).
    pub fn begin_poll(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether the reply to poll `seq` should be applied. Polls overlap when
    /// a reply is slower than the poll interval; a reply older than one
    /// already applied is stale and must not roll the state back.
    pub fn accept(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            tracing::debug!(
                "[{}] dropping stale poll #{} (applied #{})",
                self.job.id(),
                seq,
                self.applied
            );
            return false;
        }
        self.applied = seq;
        true
    }

    /// Record a poll result and return the notifications it triggers.
    /// The first observation only sets the baseline.
    pub fn observe(&mut self, status: &JobStatus) -> Vec<Notification> {
        let mut out = Vec::new();
        let counters = status.extra_json;

        let Some(previous) = self.last.replace(status.clone()) else {
            self.created_mark = counters.created;
            self.explored_mark = counters.explored;
            return out;
        };

        if counters.created > self.created_mark {
            let delta = counters.created - self.created_mark;
            self.created_mark = counters.created;
            out.push(self.notification(
                NotificationKind::Created,
                delta,
                format!("{}: {} new ({} total)", self.job.label(), delta, counters.created),
            ));
        }

        if counters.explored > self.explored_mark {
            let delta = counters.explored - self.explored_mark;
            self.explored_mark = counters.explored;
            out.push(self.notification(
                NotificationKind::Explored,
                delta,
                format!(
                    "{}: {} more explored ({} total)",
                    self.job.label(),
                    delta,
                    counters.explored
                ),
            ));
        }

        if status.status != previous.status {
            match status.status {
                JobState::Done => {
                    let detail = if status.extra_info.is_empty() {
                        String::new()
                    } else {
                        format!(": {}", status.extra_info)
                    };
                    out.push(self.notification(
                        NotificationKind::Completed,
                        1,
                        format!("{} completed{}", self.job.label(), detail),
                    ));
                }
                JobState::Error => {
                    out.push(self.notification(
                        NotificationKind::Failed,
                        1,
                        format!("{} failed: {}", self.job.label(), status.extra_info),
                    ));
                }
                _ => {}
            }
        }

        out
    }

    fn notification(&self, kind: NotificationKind, count: u64, message: String) -> Notification {
        tracing::debug!("[{}] notify {:?}: {}", self.job.id(), kind, message);
        Notification {
            job: self.job,
            kind,
            count,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JobCounters;

    fn status(state: JobState, created: u64, explored: u64) -> JobStatus {
        JobStatus {
            status: state,
            extra_json: JobCounters {
                created,
                explored,
                ..JobCounters::default()
            },
            extra_info: String::new(),
        }
    }

    fn kinds(n: &[Notification]) -> Vec<NotificationKind> {
        n.iter().map(|n| n.kind).collect()
    }

    #[test]
    fn running_to_done_fires_one_completion() {
        let mut t = StatusTracker::new(JobKind::Scan);
        assert!(t.observe(&status(JobState::Running, 0, 0)).is_empty());

        let fired = t.observe(&status(JobState::Done, 0, 0));
        assert_eq!(kinds(&fired), vec![NotificationKind::Completed]);

        assert!(t.observe(&status(JobState::Done, 0, 0)).is_empty());
        assert!(t.observe(&status(JobState::Done, 0, 0)).is_empty());
    }

    #[test]
    fn done_on_first_poll_is_only_a_baseline() {
        let mut t = StatusTracker::new(JobKind::Scan);
        assert!(t.observe(&status(JobState::Done, 4, 9)).is_empty());
        assert_eq!(t.created_mark(), 4);
        assert_eq!(t.explored_mark(), 9);
    }

    #[test]
    fn idle_to_done_also_completes() {
        let mut t = StatusTracker::new(JobKind::Discover);
        t.observe(&status(JobState::Idle, 0, 0));
        let fired = t.observe(&status(JobState::Done, 0, 0));
        assert_eq!(kinds(&fired), vec![NotificationKind::Completed]);
    }

    #[test]
    fn counter_growth_reports_delta() {
        let mut t = StatusTracker::new(JobKind::Discover);
        t.observe(&status(JobState::Running, 2, 10));

        let fired = t.observe(&status(JobState::Running, 5, 10));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, NotificationKind::Created);
        assert_eq!(fired[0].count, 3);

        let fired = t.observe(&status(JobState::Running, 5, 17));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].kind, NotificationKind::Explored);
        assert_eq!(fired[0].count, 7);
    }

    #[test]
    fn marks_never_decrease() {
        let mut t = StatusTracker::new(JobKind::Discover);
        t.observe(&status(JobState::Running, 8, 20));

        assert!(t.observe(&status(JobState::Running, 1, 3)).is_empty());
        assert_eq!(t.created_mark(), 8);
        assert_eq!(t.explored_mark(), 20);

        // Only growth beyond the old mark counts.
        let fired = t.observe(&status(JobState::Running, 10, 20));
        assert_eq!(fired[0].count, 2);
        assert_eq!(t.created_mark(), 10);
    }

    #[test]
    fn transition_into_error_notifies() {
        let mut t = StatusTracker::new(JobKind::Discover);
        t.observe(&status(JobState::Running, 0, 0));
        let mut failing = status(JobState::Error, 0, 0);
        failing.extra_info = "rate limited".into();
        let fired = t.observe(&failing);
        assert_eq!(kinds(&fired), vec![NotificationKind::Failed]);
        assert!(fired[0].message.contains("rate limited"));
    }

    #[test]
    fn badge_controls_follow_running_state() {
        let running = Badge::for_state(JobKind::Scan, JobState::Running);
        assert!(!running.start_enabled);
        assert!(running.stop_enabled);
        assert_eq!(running.tone, Tone::Info);

        for state in [JobState::Stopped, JobState::Done, JobState::Error, JobState::Idle] {
            let b = Badge::for_state(JobKind::Scan, state);
            assert!(b.start_enabled, "{:?}", state);
            assert!(!b.stop_enabled, "{:?}", state);
        }
        assert_eq!(
            Badge::for_state(JobKind::Scan, JobState::Done).label,
            "Last scan finished"
        );
    }

    #[test]
    fn late_reply_cannot_complete_twice() {
        let mut t = StatusTracker::new(JobKind::Scan);
        let first = t.begin_poll();
        assert!(t.accept(first));
        t.observe(&status(JobState::Running, 0, 0));

        // Two polls in flight; the newer one answers first.
        let slow = t.begin_poll();
        let fast = t.begin_poll();
        let mut fired = Vec::new();
        assert!(t.accept(fast));
        fired.extend(t.observe(&status(JobState::Done, 0, 0)));
        assert!(!t.accept(slow));

        let next = t.begin_poll();
        assert!(t.accept(next));
        fired.extend(t.observe(&status(JobState::Done, 0, 0)));

        assert_eq!(kinds(&fired), vec![NotificationKind::Completed]);
        assert_eq!(t.badge().label, "Last scan finished");
    }

    #[test]
    fn tracker_badge_before_any_poll_is_waiting() {
        let t = StatusTracker::new(JobKind::Scan);
        assert_eq!(t.badge().label, "Waiting");
    }
}

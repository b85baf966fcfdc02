//! JSON shapes served by the back end.
//!
//! Responses are not validated: every field defaults, and `null` is read as
//! the field's empty value, so a partial payload still renders.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A radio station row from the search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stationuuid: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    /// Region / state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: String,
    /// Comma-separated style tags.
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub homepage: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emails: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stream_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub favicon: String,
}

impl Station {
    pub fn tag_list(&self) -> impl Iterator<Item = &str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// One batch (or one progress poll) of a refresh job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshProgress {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub remaining: u64,
    #[serde(default)]
    pub next_offset: Option<u64>,
    #[serde(default)]
    pub next_country_index: Option<usize>,
    #[serde(default)]
    pub current_country: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub finished: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated: u64,
    #[serde(default)]
    pub task_id: Option<String>,
}

impl RefreshProgress {
    /// Completion percentage, when the server reported a total.
    pub fn percent(&self) -> Option<u8> {
        if self.total == 0 {
            return None;
        }
        let pct = (self.processed as f64 / self.total as f64 * 100.0).round();
        Some(pct.clamp(0.0, 100.0) as u8)
    }
}

/// Last known state of a server-side job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "String")]
pub enum JobState {
    Running,
    Stopped,
    Done,
    Error,
    /// Never run, or a value this client does not know.
    #[default]
    Idle,
}

impl From<Option<String>> for JobState {
    fn from(value: Option<String>) -> Self {
        match value.as_deref().map(str::trim) {
            Some("running") => JobState::Running,
            Some("stopped") => JobState::Stopped,
            Some("done") => JobState::Done,
            Some("error") => JobState::Error,
            _ => JobState::Idle,
        }
    }
}

impl From<JobState> for String {
    fn from(state: JobState) -> Self {
        state.as_str().to_string()
    }
}

impl JobState {
    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Running => "running",
            JobState::Stopped => "stopped",
            JobState::Done => "done",
            JobState::Error => "error",
            JobState::Idle => "",
        }
    }

    pub fn is_running(self) -> bool {
        self == JobState::Running
    }
}

/// The `extra_json` counters a job keeps while it runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobCounters {
    #[serde(default, deserialize_with = "null_as_default")]
    pub created: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub explored: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub processed: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

impl JobCounters {
    /// Fraction done in 0.0..=1.0, when the job reports a total.
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some((self.processed as f64 / self.total as f64).clamp(0.0, 1.0))
    }
}

/// Payload of the scan / discover status endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub status: JobState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extra_json: JobCounters,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extra_info: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotifyStatus {
    #[serde(default, deserialize_with = "null_as_default")]
    pub ok: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtistTrack {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Form fields of the add-track view. Sent url-encoded, not as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewTrack {
    pub name: String,
    pub spotify_id: String,
    pub spotify_url: String,
}

/// Reply of the task start endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskStarted {
    #[serde(default, deserialize_with = "null_as_default")]
    pub task_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_nulls_become_empty() {
        let s: Station = serde_json::from_str(
            r#"{"id": 7, "name": "FIP", "country": "France", "state": null, "tags": "jazz, eclectic,"}"#,
        )
        .unwrap();
        assert_eq!(s.id, 7);
        assert_eq!(s.state, "");
        assert_eq!(s.homepage, "");
        assert_eq!(s.tag_list().collect::<Vec<_>>(), vec!["jazz", "eclectic"]);
    }

    #[test]
    fn job_status_parses_known_and_unknown_states() {
        let done: JobStatus =
            serde_json::from_str(r#"{"status": "done", "extra_json": {"created": 3}}"#).unwrap();
        assert_eq!(done.status, JobState::Done);
        assert_eq!(done.extra_json.created, 3);
        assert_eq!(done.extra_json.explored, 0);

        let unset: JobStatus = serde_json::from_str(r#"{"extra_json": null}"#).unwrap();
        assert_eq!(unset.status, JobState::Idle);
        assert_eq!(unset.extra_json, JobCounters::default());

        let odd: JobStatus = serde_json::from_str(r#"{"status": "paused"}"#).unwrap();
        assert_eq!(odd.status, JobState::Idle);

        let null: JobStatus = serde_json::from_str(r#"{"status": null}"#).unwrap();
        assert_eq!(null.status, JobState::Idle);
    }

    #[test]
    fn job_state_serializes_as_wire_string() {
        let json = serde_json::to_string(&JobStatus {
            status: JobState::Running,
            ..JobStatus::default()
        })
        .unwrap();
        assert!(json.contains(r#""status":"running""#));
    }

    #[test]
    fn refresh_progress_percent_is_capped() {
        let p = RefreshProgress {
            processed: 150,
            total: 100,
            ..RefreshProgress::default()
        };
        assert_eq!(p.percent(), Some(100));

        let p = RefreshProgress {
            processed: 1,
            total: 3,
            ..RefreshProgress::default()
        };
        assert_eq!(p.percent(), Some(33));

        assert_eq!(RefreshProgress::default().percent(), None);
    }

    #[test]
    fn refresh_progress_tolerates_missing_fields() {
        let p: RefreshProgress = serde_json::from_str(r#"{"remaining": 0}"#).unwrap();
        assert!(p.messages.is_empty());
        assert_eq!(p.next_offset, None);
        assert!(!p.finished);
    }
}

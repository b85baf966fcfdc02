//! Batch refresh of the station catalogue.
//!
//! The server does the work one batch per request. The runner walks the job
//! strictly sequentially: the next request goes out only once the previous
//! response is in. Three cursor styles are supported:
//!
//! - `Offset`: self-paginating `offset` / `limit` until `remaining == 0`.
//! - `Countries`: the same pagination, country by country, by list index.
//! - `Task`: the server runs the job; we poll its task id until `finished`.
//!
//! Any request error ends the run with a single `Failed` event. There is no
//! retry and nothing is rolled back.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::client::{ApiClient, ApiError};
use crate::config::RefreshConfig;
use crate::protocol::RefreshProgress;

/// Line shown when a run finishes; consumers render it for `Finished`.
pub const COMPLETE_MESSAGE: &str = "Refresh complete!";

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("no countries to refresh")]
    NoCountries,
}

/// Cursor sent with one refresh request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRequest {
    pub offset: u64,
    pub limit: u32,
    pub country: Option<String>,
    pub country_index: Option<usize>,
    pub task_id: Option<String>,
}

impl BatchRequest {
    pub fn page(offset: u64, limit: u32) -> Self {
        Self {
            offset,
            limit,
            ..Self::default()
        }
    }

    pub fn task(task_id: &str) -> Self {
        Self {
            task_id: Some(task_id.to_string()),
            ..Self::default()
        }
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        if let Some(task_id) = &self.task_id {
            return vec![("task_id", task_id.clone())];
        }
        let mut params = vec![
            ("offset", self.offset.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(country) = &self.country {
            params.push(("country", country.clone()));
        }
        if let Some(idx) = self.country_index {
            params.push(("country_index", idx.to_string()));
        }
        params
    }
}

/// `Countries` with an empty list fails without sending a request. An empty
/// list in `Task` mode is passed through; the server then picks the countries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshMode {
    Offset,
    Countries(Vec<String>),
    Task { countries: Vec<String> },
}

impl RefreshMode {
    pub fn label(&self) -> &'static str {
        match self {
            RefreshMode::Offset => "batches",
            RefreshMode::Countries(_) => "countries",
            RefreshMode::Task { .. } => "task",
        }
    }
}

/// Enabled/disabled flag of the control that starts a refresh.
///
/// Clones share the flag. While a `TriggerGuard` is alive the trigger is
/// disabled; dropping the guard enables it again, on every exit path.
#[derive(Debug, Clone)]
pub struct Trigger {
    enabled: Arc<AtomicBool>,
}

#[derive(Debug)]
pub struct TriggerGuard {
    enabled: Arc<AtomicBool>,
}

impl Trigger {
    pub fn new() -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Disable the trigger for the lifetime of the returned guard, or return
    /// `None` if a job is already in flight.
    pub fn try_arm(&self) -> Option<TriggerGuard> {
        self.enabled
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| TriggerGuard {
                enabled: self.enabled.clone(),
            })
    }
}

impl Default for Trigger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TriggerGuard {
    fn drop(&mut self) {
        self.enabled.store(true, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressUpdate {
    pub processed: u64,
    pub total: u64,
    pub percent: u8,
    pub current_country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    Started { mode: &'static str },
    /// A line reported by the server.
    Message(String),
    Progress(ProgressUpdate),
    /// The run completed; shown as [`COMPLETE_MESSAGE`].
    Finished { processed: u64 },
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Completed { processed: u64, requests: usize },
    Failed { error: String, requests: usize },
    /// The trigger was disabled; nothing was sent.
    Busy,
}

#[derive(Debug, Clone)]
pub struct RefreshSettings {
    pub batch_size: u32,
    pub task_poll_interval: Duration,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self::from(&RefreshConfig::default())
    }
}

impl From<&RefreshConfig> for RefreshSettings {
    fn from(cfg: &RefreshConfig) -> Self {
        Self {
            batch_size: cfg.batch_size.max(1),
            task_poll_interval: cfg.task_poll_interval(),
        }
    }
}

pub struct RefreshRunner {
    client: ApiClient,
    settings: RefreshSettings,
}

/// Per-run bookkeeping shared by the three modes.
struct Run<'a> {
    events: &'a mpsc::UnboundedSender<RefreshEvent>,
    requests: usize,
    processed: u64,
}

impl Run<'_> {
    fn emit(&self, event: RefreshEvent) {
        let _ = self.events.send(event);
    }

    fn absorb(&mut self, progress: &RefreshProgress, messages: &[String]) {
        self.requests += 1;
        self.processed = self.processed.max(progress.processed);
        for msg in messages {
            self.emit(RefreshEvent::Message(msg.clone()));
        }
        if let Some(percent) = progress.percent() {
            self.emit(RefreshEvent::Progress(ProgressUpdate {
                processed: progress.processed,
                total: progress.total,
                percent,
                current_country: progress.current_country.clone(),
            }));
        }
    }
}

impl RefreshRunner {
    pub fn new(client: ApiClient, settings: RefreshSettings) -> Self {
        Self { client, settings }
    }

    /// Run one refresh job to completion, reporting through `events`.
    pub async fn run(
        &self,
        mode: RefreshMode,
        trigger: &Trigger,
        events: &mpsc::UnboundedSender<RefreshEvent>,
    ) -> RefreshOutcome {
        let Some(guard) = trigger.try_arm() else {
            warn!("refresh already running, ignoring trigger");
            return RefreshOutcome::Busy;
        };
        self.run_armed(guard, mode, events).await
    }

    /// Like [`run`](Self::run), for a caller that already holds the trigger.
    /// The trigger is enabled again when this returns.
    pub async fn run_armed(
        &self,
        _guard: TriggerGuard,
        mode: RefreshMode,
        events: &mpsc::UnboundedSender<RefreshEvent>,
    ) -> RefreshOutcome {
        info!("refresh started ({})", mode.label());
        let mut run = Run {
            events,
            requests: 0,
            processed: 0,
        };
        run.emit(RefreshEvent::Started { mode: mode.label() });

        let result = match &mode {
            RefreshMode::Offset => self.run_offset(&mut run).await,
            RefreshMode::Countries(countries) => self.run_countries(&mut run, countries).await,
            RefreshMode::Task { countries } => self.run_task(&mut run, countries).await,
        };

        match result {
            Ok(()) => {
                info!(
                    "refresh finished: {} processed in {} requests",
                    run.processed, run.requests
                );
                run.emit(RefreshEvent::Finished {
                    processed: run.processed,
                });
                RefreshOutcome::Completed {
                    processed: run.processed,
                    requests: run.requests,
                }
            }
            Err(e) => {
                warn!("refresh failed after {} requests: {}", run.requests, e);
                let error = format!("Refresh failed: {}", e);
                run.emit(RefreshEvent::Failed(error.clone()));
                RefreshOutcome::Failed {
                    error,
                    requests: run.requests,
                }
            }
        }
    }

    async fn run_offset(&self, run: &mut Run<'_>) -> Result<(), RefreshError> {
        let limit = self.settings.batch_size;
        let mut offset = 0u64;
        loop {
            let progress = self
                .client
                .refresh_batch(&BatchRequest::page(offset, limit))
                .await?;
            run.absorb(&progress, &progress.messages);

            if progress.finished || progress.remaining == 0 {
                return Ok(());
            }
            offset = progress
                .next_offset
                .filter(|&next| next > offset)
                .unwrap_or(offset + limit as u64);
        }
    }

    async fn run_countries(
        &self,
        run: &mut Run<'_>,
        countries: &[String],
    ) -> Result<(), RefreshError> {
        if countries.is_empty() {
            return Err(RefreshError::NoCountries);
        }
        let limit = self.settings.batch_size;
        let mut idx = 0usize;
        let mut offset = 0u64;

        while let Some(country) = countries.get(idx) {
            let request = BatchRequest {
                offset,
                limit,
                country: Some(country.clone()),
                country_index: Some(idx),
                task_id: None,
            };
            let mut progress = self.client.refresh_batch(&request).await?;
            if progress.current_country.is_none() {
                progress.current_country = Some(country.clone());
            }
            run.absorb(&progress, &progress.messages);

            if progress.finished {
                return Ok(());
            }
            if progress.remaining > 0 {
                offset = progress
                    .next_offset
                    .filter(|&next| next > offset)
                    .unwrap_or(offset + limit as u64);
            } else {
                idx = progress
                    .next_country_index
                    .filter(|&next| next > idx)
                    .unwrap_or(idx + 1);
                offset = 0;
            }
        }
        Ok(())
    }

    async fn run_task(&self, run: &mut Run<'_>, countries: &[String]) -> Result<(), RefreshError> {
        let started = self
            .client
            .start_refresh_task(countries, self.settings.batch_size)
            .await?;
        run.requests += 1;
        if started.task_id.is_empty() {
            return Err(ApiError::Missing("task_id").into());
        }
        info!("refresh task {} started", started.task_id);

        // The server reports a sliding window of its latest messages; only
        // lines missing from the previous window are new.
        let mut window: HashSet<String> = HashSet::new();
        loop {
            tokio::time::sleep(self.settings.task_poll_interval).await;
            let progress = self
                .client
                .refresh_batch(&BatchRequest::task(&started.task_id))
                .await?;
            let fresh: Vec<String> = progress
                .messages
                .iter()
                .filter(|m| !window.contains(*m))
                .cloned()
                .collect();
            window = progress.messages.iter().cloned().collect();
            run.absorb(&progress, &fresh);

            if progress.finished {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_guard_reenables_on_drop() {
        let trigger = Trigger::new();
        assert!(trigger.is_enabled());
        {
            let _guard = trigger.try_arm().unwrap();
            assert!(!trigger.is_enabled());
            assert!(trigger.clone().try_arm().is_none());
        }
        assert!(trigger.is_enabled());
    }

    #[test]
    fn batch_params_by_cursor_kind() {
        assert_eq!(
            BatchRequest::page(100, 50).to_params(),
            vec![("offset", "100".to_string()), ("limit", "50".to_string())]
        );

        let by_country = BatchRequest {
            offset: 0,
            limit: 50,
            country: Some("France".into()),
            country_index: Some(2),
            task_id: None,
        };
        assert_eq!(
            by_country.to_params(),
            vec![
                ("offset", "0".to_string()),
                ("limit", "50".to_string()),
                ("country", "France".to_string()),
                ("country_index", "2".to_string()),
            ]
        );

        assert_eq!(
            BatchRequest::task("abc").to_params(),
            vec![("task_id", "abc".to_string())]
        );
    }

    #[test]
    fn settings_clamp_zero_batch_size() {
        let cfg = RefreshConfig {
            batch_size: 0,
            ..RefreshConfig::default()
        };
        assert_eq!(RefreshSettings::from(&cfg).batch_size, 1);
    }
}

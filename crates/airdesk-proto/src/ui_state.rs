//! Persisted UI layout flags: which collapsible panes are open, and the
//! global "controls expanded" toggle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelState {
    Open,
    Closed,
}

impl PanelState {
    pub fn is_open(self) -> bool {
        self == PanelState::Open
    }

    pub fn flip(self) -> Self {
        match self {
            PanelState::Open => PanelState::Closed,
            PanelState::Closed => PanelState::Open,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Stored {
    #[serde(default)]
    accordions: BTreeMap<String, PanelState>,
    #[serde(default, rename = "controlsExpanded")]
    controls_expanded: bool,
}

/// Key-value store backed by a JSON file.
#[derive(Debug, Clone)]
pub struct UiStateStore {
    path: PathBuf,
    stored: Stored,
}

impl UiStateStore {
    /// Load from `path`. A missing or unreadable file yields empty state.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let stored = match std::fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("ignoring corrupt ui state {}: {}", path.display(), e);
                Stored::default()
            }),
            Err(_) => Stored::default(),
        };
        Self { path, stored }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored state for `id`, if it was ever toggled.
    pub fn get(&self, id: &str) -> Option<PanelState> {
        self.stored.accordions.get(id).copied()
    }

    pub fn is_open(&self, id: &str, default_open: bool) -> bool {
        self.get(id).map(PanelState::is_open).unwrap_or(default_open)
    }

    pub fn set(&mut self, id: impl Into<String>, state: PanelState) {
        self.stored.accordions.insert(id.into(), state);
    }

    /// Flip `id` and return the new state.
    pub fn toggle(&mut self, id: &str, default_open: bool) -> PanelState {
        let current = if self.is_open(id, default_open) {
            PanelState::Open
        } else {
            PanelState::Closed
        };
        let next = current.flip();
        self.set(id, next);
        next
    }

    pub fn controls_expanded(&self) -> bool {
        self.stored.controls_expanded
    }

    pub fn set_controls_expanded(&mut self, expanded: bool) {
        self.stored.controls_expanded = expanded;
    }

    pub fn save(&self) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&self.stored)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui_state.json");

        let mut store = UiStateStore::load(&path);
        store.set("scan-panel", PanelState::Open);
        store.save().unwrap();

        let reloaded = UiStateStore::load(&path);
        assert!(reloaded.is_open("scan-panel", false));
    }

    #[test]
    fn closed_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui_state.json");

        let mut store = UiStateStore::load(&path);
        store.set("scan-panel", PanelState::Closed);
        store.save().unwrap();

        let reloaded = UiStateStore::load(&path);
        assert!(!reloaded.is_open("scan-panel", true));
    }

    #[test]
    fn unknown_ids_use_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = UiStateStore::load(dir.path().join("missing.json"));
        assert!(store.is_open("anything", true));
        assert!(!store.is_open("anything", false));
        assert!(!store.controls_expanded());
    }

    #[test]
    fn toggle_flips_from_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = UiStateStore::load(dir.path().join("ui_state.json"));
        assert_eq!(store.toggle("log", true), PanelState::Closed);
        assert_eq!(store.toggle("log", true), PanelState::Open);
    }

    #[test]
    fn controls_flag_round_trips_with_browser_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui_state.json");

        let mut store = UiStateStore::load(&path);
        store.set_controls_expanded(true);
        store.save().unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("controlsExpanded"));
        assert!(UiStateStore::load(&path).controls_expanded());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ui_state.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = UiStateStore::load(&path);
        assert_eq!(store.get("x"), None);
    }
}

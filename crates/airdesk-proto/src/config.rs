use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::platform;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
    #[serde(default)]
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Root of the Django site, e.g. `http://127.0.0.1:8000`.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Name of the cookie Django stores its CSRF token in.
    #[serde(default = "default_csrf_cookie")]
    pub csrf_cookie: String,
    /// Raw `name=value` cookie injected into the jar (an admin session).
    #[serde(default)]
    pub session_cookie: Option<String>,
    /// Unset means requests never time out; a hung request stalls its loop.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

/// Paths of the JSON endpoints, relative to `server.base_url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    #[serde(default = "default_search")]
    pub search: String,
    #[serde(default = "default_refresh_batch")]
    pub refresh_batch: String,
    #[serde(default = "default_refresh_start")]
    pub refresh_start: String,
    #[serde(default = "default_scan_status")]
    pub scan_status: String,
    #[serde(default = "default_discover_status")]
    pub discover_status: String,
    #[serde(default = "default_scan_start")]
    pub scan_start: String,
    #[serde(default = "default_scan_stop")]
    pub scan_stop: String,
    #[serde(default = "default_discover_start")]
    pub discover_start: String,
    #[serde(default = "default_discover_stop")]
    pub discover_stop: String,
    #[serde(default = "default_spotify_status")]
    pub spotify_status: String,
    /// `{artist_id}` is substituted with the requested artist.
    #[serde(default = "default_artist_tracks")]
    pub artist_tracks: String,
    /// Form view that adds a tracked track.
    #[serde(default = "default_add_track")]
    pub add_track: String,
    #[serde(default = "default_export_radios_csv")]
    pub export_radios_csv: String,
    #[serde(default = "default_export_radios_xlsx")]
    pub export_radios_xlsx: String,
    #[serde(default = "default_export_radios_pdf")]
    pub export_radios_pdf: String,
    /// Spreadsheet of playlist appearances.
    #[serde(default = "default_export_appearances")]
    pub export_appearances: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Countries walked in order by the country-index mode.
    #[serde(default)]
    pub countries: Vec<String>,
    #[serde(default = "default_task_poll_ms")]
    pub task_poll_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Artist whose tracks are listed on the dashboard.
    #[serde(default)]
    pub artist_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_ui_state_file")]
    pub ui_state_file: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            csrf_cookie: default_csrf_cookie(),
            session_cookie: None,
            request_timeout_secs: None,
        }
    }
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            search: default_search(),
            refresh_batch: default_refresh_batch(),
            refresh_start: default_refresh_start(),
            scan_status: default_scan_status(),
            discover_status: default_discover_status(),
            scan_start: default_scan_start(),
            scan_stop: default_scan_stop(),
            discover_start: default_discover_start(),
            discover_stop: default_discover_stop(),
            spotify_status: default_spotify_status(),
            artist_tracks: default_artist_tracks(),
            add_track: default_add_track(),
            export_radios_csv: default_export_radios_csv(),
            export_radios_xlsx: default_export_radios_xlsx(),
            export_radios_pdf: default_export_radios_pdf(),
            export_appearances: default_export_appearances(),
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            countries: Vec::new(),
            task_poll_ms: default_task_poll_ms(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            artist_id: None,
        }
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            ui_state_file: default_ui_state_file(),
        }
    }
}

impl RefreshConfig {
    pub fn task_poll_interval(&self) -> Duration {
        Duration::from_millis(self.task_poll_ms)
    }
}

impl DashboardConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_csrf_cookie() -> String {
    "csrftoken".to_string()
}

fn default_search() -> String {
    "/radios/api/search/".to_string()
}

fn default_refresh_batch() -> String {
    "/radios/refresh/ajax/".to_string()
}

fn default_refresh_start() -> String {
    "/radios/refresh/start/".to_string()
}

fn default_scan_status() -> String {
    "/scan_status/".to_string()
}

fn default_discover_status() -> String {
    "/discover_status/".to_string()
}

fn default_scan_start() -> String {
    "/scan_playlists/".to_string()
}

fn default_scan_stop() -> String {
    "/scan_stop/".to_string()
}

fn default_discover_start() -> String {
    "/discover_playlists/".to_string()
}

fn default_discover_stop() -> String {
    "/discover_stop/".to_string()
}

fn default_spotify_status() -> String {
    "/spotify_status/".to_string()
}

fn default_artist_tracks() -> String {
    "/artist_tracks/{artist_id}/".to_string()
}

fn default_add_track() -> String {
    "/tracks/new/".to_string()
}

fn default_export_radios_csv() -> String {
    "/radios/export/csv/".to_string()
}

fn default_export_radios_xlsx() -> String {
    "/radios/export/xlsx/".to_string()
}

fn default_export_radios_pdf() -> String {
    "/radios/export/pdf/".to_string()
}

fn default_export_appearances() -> String {
    "/export/".to_string()
}

fn default_batch_size() -> u32 {
    50
}

fn default_task_poll_ms() -> u64 {
    1000
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_ui_state_file() -> PathBuf {
    platform::data_dir().join("ui_state.json")
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Read `path`, writing a default config there first if it is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Self =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.server.csrf_cookie, "csrftoken");
        assert_eq!(config.refresh.batch_size, 50);
        assert_eq!(config.dashboard.poll_interval(), Duration::from_secs(5));
        assert!(config.server.request_timeout_secs.is_none());
        assert!(config
            .paths
            .ui_state_file
            .ends_with("airdesk/ui_state.json"));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [server]
            base_url = "https://admin.example.org"

            [refresh]
            countries = ["France", "Belgium"]
            "#,
        )
        .unwrap();
        assert_eq!(config.server.base_url, "https://admin.example.org");
        assert_eq!(config.server.csrf_cookie, "csrftoken");
        assert_eq!(config.refresh.countries, vec!["France", "Belgium"]);
        assert_eq!(config.refresh.batch_size, 50);
        assert_eq!(config.endpoints.scan_status, "/scan_status/");
        assert_eq!(config.endpoints.export_radios_pdf, "/radios/export/pdf/");
    }

    #[test]
    fn test_load_from_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.refresh.task_poll_ms, 1000);

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.endpoints.search, config.endpoints.search);
    }
}

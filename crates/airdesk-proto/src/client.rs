//! HTTP client for the admin back end.
//!
//! Wraps a `reqwest::Client` with a cookie jar so the Django CSRF cookie can
//! be read back and echoed as `X-CSRFToken` on POSTs.

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderName, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{Config, EndpointsConfig, ServerConfig};
use crate::export::{attachment_filename, Download, ExportKind};
use crate::protocol::{
    ArtistTrack, JobStatus, NewTrack, RefreshProgress, SpotifyStatus, Station, TaskStarted,
};
use crate::refresh::BatchRequest;
use crate::search::SearchQuery;
use crate::tracker::JobKind;

pub const CSRF_HEADER: &str = "X-CSRFToken";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid url {url}: {reason}")]
    Url { url: String, reason: String },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },
    #[error("unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("{url} rejected the submitted form")]
    Rejected { url: String },
    #[error("response is missing {0}")]
    Missing(&'static str),
    #[error("failed to build http client: {0}")]
    Build(#[source] reqwest::Error),
}

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    jar: Arc<Jar>,
    base: Url,
    base_str: String,
    csrf_cookie: String,
    endpoints: EndpointsConfig,
}

impl ApiClient {
    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.server, &config.endpoints)
    }

    pub fn new(server: &ServerConfig, endpoints: &EndpointsConfig) -> Result<Self, ApiError> {
        let base_str = server.base_url.trim_end_matches('/').to_string();
        let base = parse_url(&format!("{}/", base_str))?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = server.session_cookie.as_deref() {
            jar.add_cookie_str(cookie, &base);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("airdesk/", env!("CARGO_PKG_VERSION")))
            .cookie_provider(jar.clone());
        if let Some(secs) = server.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().map_err(ApiError::Build)?;

        Ok(Self {
            http,
            jar,
            base,
            base_str,
            csrf_cookie: server.csrf_cookie.clone(),
            endpoints: endpoints.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolve an endpoint path against the base URL, keeping any path
    /// prefix the base carries.
    pub fn endpoint_url(&self, path: &str) -> Result<Url, ApiError> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return parse_url(path);
        }
        let path = path.trim_start_matches('/');
        parse_url(&format!("{}/{}", self.base_str, path))
    }

    /// Current CSRF token held in the cookie jar.
    pub fn csrf_token(&self) -> Option<String> {
        let header = self.jar.cookies(&self.base)?;
        let header = header.to_str().ok()?;
        cookie_value(header, &self.csrf_cookie)
    }

    /// Make sure a CSRF token is available, fetching the base page once to
    /// have the server set the cookie.
    async fn ensure_csrf(&self) -> Option<String> {
        if let Some(token) = self.csrf_token() {
            return Some(token);
        }
        debug!("no {} cookie yet, priming from {}", self.csrf_cookie, self.base);
        if let Err(e) = self.http.get(self.base.clone()).send().await {
            warn!("could not fetch CSRF cookie: {}", e);
            return None;
        }
        self.csrf_token()
    }

    /// Send one request and check its status. POSTs carry the CSRF token;
    /// `form` becomes an url-encoded body.
    async fn send<F: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        form: Option<&F>,
    ) -> Result<(Url, Response), ApiError> {
        let url = self.endpoint_url(path)?;

        let mut req = self.http.request(method.clone(), url.clone()).query(params);
        if method != Method::GET {
            if let Some(token) = self.ensure_csrf().await {
                req = req.header(CSRF_HEADER, token);
            }
        }
        if let Some(form) = form {
            req = req.form(form);
        }

        debug!("{} {} {:?}", method, url, params);
        let resp = req.send().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
            });
        }
        Ok((url, resp))
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let (url, resp) = self.send::<()>(method, path, params, None).await?;
        let url_str = url.to_string();

        let body = resp.bytes().await.map_err(|source| ApiError::Transport {
            url: url_str.clone(),
            source,
        })?;
        // Mutating endpoints may answer with an empty body.
        let body: &[u8] = if body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &body
        };
        serde_json::from_slice(body).map_err(|source| ApiError::Decode {
            url: url_str,
            source,
        })
    }

    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<Station>, ApiError> {
        let stations: Option<Vec<Station>> = self
            .request(Method::GET, &self.endpoints.search, &query.to_params())
            .await?;
        Ok(stations.unwrap_or_default())
    }

    /// One step of a refresh job: a batch by offset, a country page, or a
    /// task progress poll.
    pub async fn refresh_batch(&self, batch: &BatchRequest) -> Result<RefreshProgress, ApiError> {
        let progress: Option<RefreshProgress> = self
            .request(Method::POST, &self.endpoints.refresh_batch, &batch.to_params())
            .await?;
        Ok(progress.unwrap_or_default())
    }

    /// Start a server-tracked refresh task and return its id.
    pub async fn start_refresh_task(
        &self,
        countries: &[String],
        batch_size: u32,
    ) -> Result<TaskStarted, ApiError> {
        let mut params: Vec<(&str, String)> = countries
            .iter()
            .map(|c| ("countries", c.clone()))
            .collect();
        params.push(("batch_size", batch_size.to_string()));
        let started: Option<TaskStarted> = self
            .request(Method::POST, &self.endpoints.refresh_start, &params)
            .await?;
        Ok(started.unwrap_or_default())
    }

    pub async fn job_status(&self, kind: JobKind) -> Result<JobStatus, ApiError> {
        let path = match kind {
            JobKind::Scan => &self.endpoints.scan_status,
            JobKind::Discover => &self.endpoints.discover_status,
        };
        let status: Option<JobStatus> = self.request(Method::GET, path, &[]).await?;
        Ok(status.unwrap_or_default())
    }

    pub async fn scan_status(&self) -> Result<JobStatus, ApiError> {
        self.job_status(JobKind::Scan).await
    }

    pub async fn discover_status(&self) -> Result<JobStatus, ApiError> {
        self.job_status(JobKind::Discover).await
    }

    pub async fn start_job(&self, kind: JobKind) -> Result<(), ApiError> {
        let path = match kind {
            JobKind::Scan => &self.endpoints.scan_start,
            JobKind::Discover => &self.endpoints.discover_start,
        };
        let _: serde_json::Value = self.request(Method::POST, path, &[]).await?;
        Ok(())
    }

    pub async fn stop_job(&self, kind: JobKind) -> Result<(), ApiError> {
        let path = match kind {
            JobKind::Scan => &self.endpoints.scan_stop,
            JobKind::Discover => &self.endpoints.discover_stop,
        };
        let _: serde_json::Value = self.request(Method::POST, path, &[]).await?;
        Ok(())
    }

    pub async fn spotify_status(&self) -> Result<SpotifyStatus, ApiError> {
        let status: Option<SpotifyStatus> = self
            .request(Method::GET, &self.endpoints.spotify_status, &[])
            .await?;
        Ok(status.unwrap_or_default())
    }

    pub async fn artist_tracks(&self, artist_id: &str) -> Result<Vec<ArtistTrack>, ApiError> {
        let path = self.endpoints.artist_tracks.replace("{artist_id}", artist_id);
        let tracks: Option<Vec<ArtistTrack>> = self.request(Method::GET, &path, &[]).await?;
        Ok(tracks.unwrap_or_default())
    }

    /// Submit the add-track form. The view redirects away on success and
    /// renders the form again when validation fails.
    pub async fn add_track(&self, track: &NewTrack) -> Result<(), ApiError> {
        let (url, resp) = self
            .send(Method::POST, &self.endpoints.add_track, &[], Some(track))
            .await?;
        if resp.url().path() == url.path() {
            warn!("{} did not accept track {:?}", url, track.name);
            return Err(ApiError::Rejected {
                url: url.to_string(),
            });
        }
        Ok(())
    }

    /// Download one export into memory.
    pub async fn export(&self, kind: ExportKind) -> Result<Download, ApiError> {
        let path = match kind {
            ExportKind::RadiosCsv => &self.endpoints.export_radios_csv,
            ExportKind::RadiosXlsx => &self.endpoints.export_radios_xlsx,
            ExportKind::RadiosPdf => &self.endpoints.export_radios_pdf,
            ExportKind::Appearances => &self.endpoints.export_appearances,
        };
        let (url, resp) = self.send::<()>(Method::GET, path, &[], None).await?;

        let header = |name: HeaderName| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let filename = header(CONTENT_DISPOSITION)
            .as_deref()
            .and_then(attachment_filename)
            .unwrap_or_else(|| kind.fallback_filename().to_string());
        let content_type = header(CONTENT_TYPE).unwrap_or_default();

        let bytes = resp.bytes().await.map_err(|source| ApiError::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!("{} bytes of {} from {}", bytes.len(), content_type, url);
        Ok(Download {
            kind,
            filename,
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

fn parse_url(raw: &str) -> Result<Url, ApiError> {
    Url::parse(raw).map_err(|e| ApiError::Url {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Find `name` in a `Cookie:` header value (`a=1; b=2`).
pub fn cookie_value(header: &str, name: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_value_finds_named_cookie() {
        let header = "sessionid=abc; csrftoken=tok123; theme=dark";
        assert_eq!(cookie_value(header, "csrftoken").as_deref(), Some("tok123"));
        assert_eq!(cookie_value(header, "missing"), None);
        assert_eq!(cookie_value("csrftokenx=1", "csrftoken"), None);
    }

    #[test]
    fn endpoint_url_keeps_base_prefix() {
        let server = ServerConfig {
            base_url: "https://admin.example.org/tools/".into(),
            ..ServerConfig::default()
        };
        let client = ApiClient::new(&server, &EndpointsConfig::default()).unwrap();
        assert_eq!(
            client.endpoint_url("/scan_status/").unwrap().as_str(),
            "https://admin.example.org/tools/scan_status/"
        );
    }

    #[test]
    fn session_cookie_is_in_the_jar() {
        let server = ServerConfig {
            session_cookie: Some("csrftoken=seeded".into()),
            ..ServerConfig::default()
        };
        let client = ApiClient::new(&server, &EndpointsConfig::default()).unwrap();
        assert_eq!(client.csrf_token().as_deref(), Some("seeded"));
    }

    #[test]
    fn bad_base_url_is_rejected() {
        let server = ServerConfig {
            base_url: "not a url".into(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            ApiClient::new(&server, &EndpointsConfig::default()),
            Err(ApiError::Url { .. })
        ));
    }
}

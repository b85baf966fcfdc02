//! In-process stand-in for the admin back end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use airdesk_proto::client::ApiClient;
use airdesk_proto::config::{EndpointsConfig, ServerConfig};
use airdesk_proto::refresh::RefreshEvent;
use axum::Router;
use tokio::sync::mpsc;

/// Query strings and CSRF headers seen by the mock, in arrival order.
#[derive(Clone, Default)]
pub struct Recorder {
    inner: Arc<Mutex<Vec<Recorded>>>,
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub path: String,
    pub query: HashMap<String, String>,
    pub csrf: Option<String>,
}

impl Recorder {
    pub fn push(&self, path: &str, query: HashMap<String, String>, csrf: Option<String>) {
        self.inner.lock().unwrap().push(Recorded {
            path: path.to_string(),
            query,
            csrf,
        });
    }

    pub fn all(&self) -> Vec<Recorded> {
        self.inner.lock().unwrap().clone()
    }

    pub fn on(&self, path: &str) -> Vec<Recorded> {
        self.all().into_iter().filter(|r| r.path == path).collect()
    }
}

/// Serve `router` on an ephemeral port and return its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A base URL nothing listens on.
pub async fn dead_base_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn client_for(base_url: &str) -> ApiClient {
    let server = ServerConfig {
        base_url: base_url.to_string(),
        ..ServerConfig::default()
    };
    ApiClient::new(&server, &EndpointsConfig::default()).unwrap()
}

pub fn drain(rx: &mut mpsc::UnboundedReceiver<RefreshEvent>) -> Vec<RefreshEvent> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

pub fn csrf_of(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get("x-csrftoken")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

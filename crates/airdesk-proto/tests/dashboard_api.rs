//! Search, status polling and job controls against a mock back end.

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use airdesk_proto::client::ApiError;
use airdesk_proto::export::ExportKind;
use airdesk_proto::protocol::{JobState, NewTrack};
use airdesk_proto::search::{Facets, SearchQuery};
use airdesk_proto::tracker::{JobKind, NotificationKind, StatusTracker};
use axum::extract::{Form, Path, Query, State};
use axum::http::{header, HeaderMap};
use axum::response::{Html, IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Json, Router};
use common::{client_for, csrf_of, spawn, Recorder};
use serde_json::json;

#[tokio::test]
async fn search_sends_every_filter_value() {
    let seen: Arc<std::sync::Mutex<Vec<(String, String)>>> = Arc::default();
    let seen_in = seen.clone();
    let router = Router::new().route(
        "/radios/api/search/",
        get(move |Query(q): Query<Vec<(String, String)>>| {
            let seen = seen_in.clone();
            async move {
                *seen.lock().unwrap() = q;
                Json(json!([
                    {"id": 1, "name": "FIP", "country": "France", "state": null,
                     "tags": "jazz,eclectic", "homepage": "https://fip.fr", "emails": ""},
                    {"id": 2, "name": "Studio Brussel", "country": "Belgium",
                     "state": "Flanders", "tags": "rock"}
                ]))
            }
        }),
    );
    let base = spawn(router).await;
    let client = client_for(&base);

    let query = SearchQuery::from_fields("France, Belgium", "", "jazz");
    let stations = client.search(&query).await.unwrap();

    assert_eq!(stations.len(), 2);
    assert_eq!(stations[0].state, "");
    assert_eq!(stations[1].homepage, "");
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            ("country".to_string(), "France".to_string()),
            ("country".to_string(), "Belgium".to_string()),
            ("tag".to_string(), "jazz".to_string()),
        ]
    );

    let facets = Facets::from_stations(&stations);
    assert_eq!(facets.tags, vec!["eclectic", "jazz", "rock"]);
}

#[tokio::test]
async fn search_with_null_body_is_empty() {
    let router = Router::new().route("/radios/api/search/", get(|| async { Json(json!(null)) }));
    let base = spawn(router).await;
    let stations = client_for(&base)
        .search(&SearchQuery::default())
        .await
        .unwrap();
    assert!(stations.is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_decode_error() {
    let router = Router::new().route("/scan_status/", get(|| async { "<html>login</html>" }));
    let base = spawn(router).await;
    let err = client_for(&base).scan_status().await.unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }), "{:?}", err);
}

/// Scan status endpoint that steps through a scripted sequence.
#[derive(Clone)]
struct Script {
    step: Arc<AtomicUsize>,
    frames: Arc<Vec<serde_json::Value>>,
}

async fn scripted(State(s): State<Script>) -> Json<serde_json::Value> {
    let i = s.step.fetch_add(1, Ordering::SeqCst);
    let frame = s.frames.get(i).or(s.frames.last()).cloned();
    Json(frame.unwrap_or(serde_json::Value::Null))
}

#[tokio::test]
async fn polling_discovery_raises_each_transition_once() {
    let script = Script {
        step: Arc::default(),
        frames: Arc::new(vec![
            json!({"status": "running", "extra_json": {"created": 0, "updated": 0, "explored": 0}}),
            json!({"status": "running", "extra_json": {"created": 2, "updated": 0, "explored": 5}}),
            json!({"status": "running", "extra_json": {"created": 2, "updated": 1, "explored": 5}}),
            json!({"status": "done", "extra_info": "2 new, 1 updated, 9 explored",
                   "extra_json": {"created": 2, "updated": 1, "explored": 9}}),
            json!({"status": "done", "extra_json": {"created": 2, "updated": 1, "explored": 9}}),
        ]),
    };
    let router = Router::new()
        .route("/discover_status/", get(scripted))
        .with_state(script);
    let base = spawn(router).await;
    let client = client_for(&base);

    let mut tracker = StatusTracker::new(JobKind::Discover);
    let mut fired = Vec::new();
    for _ in 0..5 {
        let status = client.discover_status().await.unwrap();
        fired.extend(tracker.observe(&status));
    }

    let summary: Vec<(NotificationKind, u64)> = fired.iter().map(|n| (n.kind, n.count)).collect();
    assert_eq!(
        summary,
        vec![
            (NotificationKind::Created, 2),
            (NotificationKind::Explored, 5),
            (NotificationKind::Explored, 4),
            (NotificationKind::Completed, 1),
        ]
    );
    assert!(fired[3].message.contains("9 explored"));
    assert_eq!(tracker.badge().label, "Last discovery finished");
    assert!(tracker.badge().start_enabled);
}

#[tokio::test]
async fn unset_status_renders_as_waiting() {
    let router = Router::new().route("/scan_status/", get(|| async { Json(json!({})) }));
    let base = spawn(router).await;
    let status = client_for(&base).scan_status().await.unwrap();
    assert_eq!(status.status, JobState::Idle);

    let mut tracker = StatusTracker::new(JobKind::Scan);
    assert!(tracker.observe(&status).is_empty());
    assert_eq!(tracker.badge().label, "Waiting");
}

#[tokio::test]
async fn job_controls_post_with_csrf() {
    let rec = Recorder::default();
    let record = |path: &'static str| {
        move |State(rec): State<Recorder>, headers: HeaderMap| async move {
            rec.push(path, HashMap::new(), csrf_of(&headers));
            Json(json!({"ok": true}))
        }
    };
    let router = Router::new()
        .route(
            "/",
            get(|| async { ([(header::SET_COOKIE, "csrftoken=ctl-1; Path=/")], "ok").into_response() }),
        )
        .route("/scan_playlists/", post(record("/scan_playlists/")))
        .route("/scan_stop/", post(record("/scan_stop/")))
        .route("/discover_playlists/", post(record("/discover_playlists/")))
        .with_state(rec.clone());
    let base = spawn(router).await;
    let client = client_for(&base);

    client.start_job(JobKind::Scan).await.unwrap();
    client.stop_job(JobKind::Scan).await.unwrap();
    client.start_job(JobKind::Discover).await.unwrap();

    let paths: Vec<String> = rec.all().iter().map(|r| r.path.clone()).collect();
    assert_eq!(paths, vec!["/scan_playlists/", "/scan_stop/", "/discover_playlists/"]);
    assert!(rec.all().iter().all(|r| r.csrf.as_deref() == Some("ctl-1")));
}

#[tokio::test]
async fn missing_stop_endpoint_is_a_status_error() {
    let router = Router::new().route("/", get(|| async { "ok" }));
    let base = spawn(router).await;
    let err = client_for(&base)
        .stop_job(JobKind::Discover)
        .await
        .unwrap_err();
    match err {
        ApiError::Status { status, .. } => assert_eq!(status.as_u16(), 404),
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn spotify_status_and_artist_tracks() {
    let router = Router::new()
        .route(
            "/spotify_status/",
            get(|| async { Json(json!({"ok": false, "message": "token expired"})) }),
        )
        .route(
            "/artist_tracks/:artist_id/",
            get(|Path(artist_id): Path<String>| async move {
                Json(json!([
                    {"id": format!("{}-1", artist_id), "name": "Opening"},
                    {"id": format!("{}-2", artist_id), "name": null}
                ]))
            }),
        );
    let base = spawn(router).await;
    let client = client_for(&base);

    let spotify = client.spotify_status().await.unwrap();
    assert!(!spotify.ok);
    assert_eq!(spotify.message, "token expired");

    let tracks = client.artist_tracks("4dZ").await.unwrap();
    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].id, "4dZ-1");
    assert_eq!(tracks[1].name, "");
}

#[tokio::test]
async fn export_saves_attachment_under_server_name() {
    let router = Router::new()
        .route(
            "/radios/export/pdf/",
            get(|| async {
                (
                    [
                        (header::CONTENT_TYPE, "application/pdf"),
                        (header::CONTENT_DISPOSITION, "attachment; filename=radios.pdf"),
                    ],
                    b"%PDF-1.4 stations".to_vec(),
                )
            }),
        )
        .route(
            "/export/",
            get(|| async {
                (
                    [(
                        header::CONTENT_DISPOSITION,
                        r#"attachment; filename="Playlists_Spotify_2026-10-17.xlsx""#,
                    )],
                    b"PK".to_vec(),
                )
            }),
        );
    let base = spawn(router).await;
    let client = client_for(&base);
    let dir = tempfile::tempdir().unwrap();

    let pdf = client.export(ExportKind::RadiosPdf).await.unwrap();
    assert_eq!(pdf.filename, "radios.pdf");
    assert_eq!(pdf.content_type, "application/pdf");
    let saved = pdf.save(dir.path()).await.unwrap();
    assert_eq!(std::fs::read(saved).unwrap(), b"%PDF-1.4 stations");

    let sheet = client.export(ExportKind::Appearances).await.unwrap();
    assert_eq!(sheet.filename, "Playlists_Spotify_2026-10-17.xlsx");
    assert!(sheet.save(dir.path()).await.unwrap().exists());
}

#[tokio::test]
async fn export_without_disposition_uses_default_name() {
    let router = Router::new().route("/radios/export/csv/", get(|| async { "name,country\n" }));
    let base = spawn(router).await;
    let download = client_for(&base)
        .export(ExportKind::RadiosCsv)
        .await
        .unwrap();
    assert_eq!(download.filename, "radios.csv");
}

#[tokio::test]
async fn missing_export_view_is_a_status_error() {
    let router = Router::new().route("/", get(|| async { "ok" }));
    let base = spawn(router).await;
    let err = client_for(&base)
        .export(ExportKind::RadiosXlsx)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Status { .. }), "{:?}", err);
}

#[derive(Clone, Default)]
struct Forms {
    seen: Arc<std::sync::Mutex<Vec<(HashMap<String, String>, Option<String>)>>>,
}

async fn add_track_view(
    State(forms): State<Forms>,
    headers: HeaderMap,
    Form(fields): Form<HashMap<String, String>>,
) -> axum::response::Response {
    let valid = !fields.get("spotify_id").map_or(true, String::is_empty);
    forms.seen.lock().unwrap().push((fields, csrf_of(&headers)));
    if valid {
        Redirect::to("/").into_response()
    } else {
        Html("<form>This field is required.</form>").into_response()
    }
}

fn tracker_router(forms: Forms) -> Router {
    Router::new()
        .route(
            "/",
            get(|| async { ([(header::SET_COOKIE, "csrftoken=form-7; Path=/")], "dashboard") }),
        )
        .route("/tracks/new/", post(add_track_view))
        .with_state(forms)
}

#[tokio::test]
async fn add_track_posts_form_with_csrf() {
    let forms = Forms::default();
    let base = spawn(tracker_router(forms.clone())).await;
    let track = NewTrack {
        name: "Opening".into(),
        spotify_id: "3n3Ppam7vgaVa1iaRUc9Lp".into(),
        spotify_url: String::new(),
    };

    client_for(&base).add_track(&track).await.unwrap();

    let seen = forms.seen.lock().unwrap().clone();
    assert_eq!(seen.len(), 1);
    let (fields, csrf) = &seen[0];
    assert_eq!(fields["name"], "Opening");
    assert_eq!(fields["spotify_id"], "3n3Ppam7vgaVa1iaRUc9Lp");
    assert_eq!(fields["spotify_url"], "");
    assert_eq!(csrf.as_deref(), Some("form-7"));
}

#[tokio::test]
async fn invalid_track_is_rejected() {
    let base = spawn(tracker_router(Forms::default())).await;
    let track = NewTrack {
        name: "No id".into(),
        ..NewTrack::default()
    };
    let err = client_for(&base).add_track(&track).await.unwrap_err();
    assert!(matches!(err, ApiError::Rejected { .. }), "{:?}", err);
}

//! One-shot subcommands: print to stdout and exit.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{bail, Context};
use tokio::sync::mpsc;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use airdesk_proto::client::ApiClient;
use airdesk_proto::config::RefreshConfig;
use airdesk_proto::export::ExportKind;
use airdesk_proto::protocol::NewTrack;
use airdesk_proto::refresh::{
    RefreshEvent, RefreshMode, RefreshOutcome, RefreshRunner, RefreshSettings, Trigger,
    COMPLETE_MESSAGE,
};
use airdesk_proto::search::{Facets, SearchQuery};
use airdesk_proto::tracker::{JobKind, StatusTracker};

/// Cut `text` to at most `width` display columns and pad it to exactly that.
fn fit(text: &str, width: usize) -> String {
    let (mut out, mut used) = (String::new(), 0);
    if text.width() <= width {
        out.push_str(text);
        used = text.width();
    } else if width > 0 {
        for ch in text.chars() {
            let w = UnicodeWidthChar::width(ch).unwrap_or(0);
            if used + w > width - 1 {
                break;
            }
            out.push(ch);
            used += w;
        }
        out.push('…');
        used += 1;
    }
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

pub async fn search(client: &ApiClient, query: &SearchQuery, json: bool) -> anyhow::Result<()> {
    let stations = client.search(query).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&stations)?);
        return Ok(());
    }
    if stations.is_empty() {
        println!("No stations match {}.", query.describe());
        return Ok(());
    }

    let name_w = stations
        .iter()
        .map(|s| s.name.width())
        .max()
        .unwrap_or(4)
        .clamp(4, 32);
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {} {} {} HOMEPAGE",
        fit("NAME", name_w),
        fit("COUNTRY", 14),
        fit("REGION", 16),
        fit("STYLE", 24)
    )?;
    for s in &stations {
        let tags = s.tag_list().collect::<Vec<_>>().join(", ");
        writeln!(
            out,
            "{} {} {} {} {}",
            fit(&s.name, name_w),
            fit(&s.country, 14),
            fit(&s.state, 16),
            fit(&tags, 24),
            s.homepage
        )?;
    }
    let facets = Facets::from_stations(&stations);
    writeln!(
        out,
        "\n{} stations · {} countries · {} regions · {} styles",
        stations.len(),
        facets.countries.len(),
        facets.states.len(),
        facets.tags.len()
    )?;
    Ok(())
}

pub async fn refresh(
    client: &ApiClient,
    cfg: &RefreshConfig,
    countries: Vec<String>,
    task: bool,
) -> anyhow::Result<()> {
    let mode = match (task, countries.is_empty()) {
        (true, _) => RefreshMode::Task { countries },
        (false, true) => RefreshMode::Offset,
        (false, false) => RefreshMode::Countries(countries),
    };
    let runner = RefreshRunner::new(client.clone(), RefreshSettings::from(cfg));
    let trigger = Trigger::new();
    let (tx, mut rx) = mpsc::unbounded_channel();

    let printer = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                RefreshEvent::Started { mode } => eprintln!("refreshing ({})", mode),
                RefreshEvent::Message(m) => println!("{}", m),
                RefreshEvent::Progress(p) => {
                    let place = p
                        .current_country
                        .map(|c| format!(" [{}]", c))
                        .unwrap_or_default();
                    eprintln!("  {}/{} ({}%){}", p.processed, p.total, p.percent, place);
                }
                RefreshEvent::Finished { processed } => {
                    println!("{}", COMPLETE_MESSAGE);
                    eprintln!("done: {} processed", processed);
                }
                RefreshEvent::Failed(e) => eprintln!("{}", e),
            }
        }
    });

    let outcome = runner.run(mode, &trigger, &tx).await;
    drop(tx);
    let _ = printer.await;

    match outcome {
        RefreshOutcome::Completed { .. } => Ok(()),
        RefreshOutcome::Failed { error, .. } => bail!(error),
        RefreshOutcome::Busy => bail!("a refresh is already running"),
    }
}

pub async fn status(client: &ApiClient) -> anyhow::Result<()> {
    let (scan, discover, spotify) = tokio::join!(
        client.job_status(JobKind::Scan),
        client.job_status(JobKind::Discover),
        client.spotify_status()
    );

    for (kind, result) in [(JobKind::Scan, scan), (JobKind::Discover, discover)] {
        match result {
            Ok(status) => {
                let mut tracker = StatusTracker::new(kind);
                tracker.observe(&status);
                let badge = tracker.badge();
                let c = status.extra_json;
                println!("{:<10} {}", kind.label(), badge.label);
                println!(
                    "{:<10} created {} · updated {} · explored {}",
                    "", c.created, c.updated, c.explored
                );
                if let Some(ratio) = c.ratio() {
                    println!("{:<10} {}/{} ({:.0}%)", "", c.processed, c.total, ratio * 100.0);
                }
                if !status.extra_info.is_empty() {
                    println!("{:<10} {}", "", status.extra_info);
                }
            }
            Err(e) => println!("{:<10} unavailable: {}", kind.label(), e),
        }
    }

    match spotify {
        Ok(s) if s.ok => println!("{:<10} connected {}", "Spotify", s.message),
        Ok(s) => println!("{:<10} not connected {}", "Spotify", s.message),
        Err(e) => println!("{:<10} unavailable: {}", "Spotify", e),
    }
    Ok(())
}

pub async fn tracks(client: &ApiClient, artist_id: &str) -> anyhow::Result<()> {
    let tracks = client.artist_tracks(artist_id).await?;
    if tracks.is_empty() {
        println!("No tracks for artist {}.", artist_id);
    }
    for t in tracks {
        println!("{}  {}", fit(&t.id, 24), t.name);
    }
    Ok(())
}

pub async fn job(client: &ApiClient, kind: JobKind, start: bool) -> anyhow::Result<()> {
    if start {
        client.start_job(kind).await?;
        println!("{} start requested", kind.label());
    } else {
        client.stop_job(kind).await?;
        println!("{} stop requested", kind.label());
    }
    Ok(())
}

pub async fn export(client: &ApiClient, kind: ExportKind, output: &Path) -> anyhow::Result<()> {
    let download = client.export(kind).await?;
    let path = download
        .save(output)
        .await
        .with_context(|| format!("writing {}", output.display()))?;
    println!("{} ({} bytes)", path.display(), download.bytes.len());
    Ok(())
}

pub async fn add_track(client: &ApiClient, track: &NewTrack) -> anyhow::Result<()> {
    if track.name.trim().is_empty() || track.spotify_id.trim().is_empty() {
        bail!("a track needs a name and a Spotify id");
    }
    client.add_track(track).await?;
    println!("Added {} ({})", track.name, track.spotify_id);
    Ok(())
}

//! airdesk: terminal console for the radio catalogue admin back end.

mod action;
mod app;
mod app_state;
mod commands;
mod component;
mod components;
mod theme;
mod widgets;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use airdesk_proto::client::ApiClient;
use airdesk_proto::config::Config;
use airdesk_proto::export::ExportKind;
use airdesk_proto::protocol::NewTrack;
use airdesk_proto::search::SearchQuery;

use crate::action::Workspace;

#[derive(Parser)]
#[command(name = "airdesk")]
#[command(about = "Search stations, refresh the catalogue and watch scan/discovery jobs")]
#[command(version)]
struct Cli {
    /// Configuration file (default: ~/.config/airdesk/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the server base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Verbosity for one-shot commands (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search stations by country, region and style
    Search {
        #[command(flatten)]
        filters: Filters,

        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Refresh station data in batches
    Refresh {
        /// Refresh these countries one after another
        #[arg(long = "country")]
        countries: Vec<String>,

        /// Let the server run the job and poll its task id
        #[arg(long)]
        task: bool,

        /// Batch size (overrides [refresh] batch_size)
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show scan, discovery and Spotify status once
    Status,

    /// List an artist's tracks
    Tracks {
        /// Artist id (default: [dashboard] artist_id)
        artist_id: Option<String>,
    },

    /// Start or stop a scan / discovery job
    Job {
        #[arg(value_enum)]
        action: JobAction,

        #[arg(value_enum)]
        kind: JobArg,
    },

    /// Download a catalogue or tracker export
    Export {
        #[arg(value_enum)]
        kind: ExportArg,

        /// File or directory to write to (default: current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Add a track to the playlist tracker
    AddTrack {
        name: String,

        /// Spotify track id, e.g. 3n3Ppam7vgaVa1iaRUc9Lp
        spotify_id: String,

        #[arg(long)]
        spotify_url: Option<String>,
    },

    /// Interactive console (default)
    Dashboard {
        /// Open on this view
        #[arg(long, value_enum, default_value = "dashboard")]
        view: View,

        #[command(flatten)]
        filters: Filters,
    },
}

#[derive(clap::Args, Default)]
struct Filters {
    /// Country filter, repeatable or comma-separated
    #[arg(long = "country")]
    countries: Vec<String>,

    /// Region filter, repeatable or comma-separated
    #[arg(long = "state")]
    states: Vec<String>,

    /// Style tag filter, repeatable or comma-separated
    #[arg(long = "tag")]
    tags: Vec<String>,
}

impl Filters {
    fn query(&self) -> SearchQuery {
        SearchQuery::from_fields(
            &self.countries.join(","),
            &self.states.join(","),
            &self.tags.join(","),
        )
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum JobAction {
    Start,
    Stop,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum JobArg {
    Scan,
    Discover,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ExportArg {
    Csv,
    Xlsx,
    Pdf,
    /// Tracked tracks and their playlists
    Tracker,
}

impl From<ExportArg> for ExportKind {
    fn from(arg: ExportArg) -> Self {
        match arg {
            ExportArg::Csv => ExportKind::RadiosCsv,
            ExportArg::Xlsx => ExportKind::RadiosXlsx,
            ExportArg::Pdf => ExportKind::RadiosPdf,
            ExportArg::Tracker => ExportKind::Appearances,
        }
    }
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum View {
    Search,
    Refresh,
    Dashboard,
}

impl From<View> for Workspace {
    fn from(v: View) -> Self {
        match v {
            View::Search => Workspace::Search,
            View::Refresh => Workspace::Refresh,
            View::Dashboard => Workspace::Dashboard,
        }
    }
}

/// Dashboard mode owns the terminal, so its logs go to a file.
fn init_file_logging() -> anyhow::Result<PathBuf> {
    let log_path = airdesk_proto::platform::log_path();
    if let Some(dir) = log_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    // RUST_LOG wins; otherwise debug for our crates, quiet HTTP internals.
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(filter.as_str())
        .with_ansi(false)
        .init();
    Ok(log_path)
}

fn init_stderr_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| format!("{},hyper_util=warn,reqwest=warn,hyper=warn", level));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter.as_str())
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Dashboard {
        view: View::Dashboard,
        filters: Filters::default(),
    });

    let interactive = matches!(command, Commands::Dashboard { .. });
    if interactive {
        let log_path = init_file_logging()?;
        eprintln!("airdesk log: {}", log_path.display());
    } else {
        init_stderr_logging(cli.verbose);
    }

    // ── Load config ──────────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(url) = cli.base_url {
        config.server.base_url = url;
    }
    tracing::info!("airdesk starting against {}", config.server.base_url);

    let client = ApiClient::from_config(&config)?;

    match command {
        Commands::Search { filters, json } => {
            commands::search(&client, &filters.query(), json).await
        }
        Commands::Refresh {
            countries,
            task,
            limit,
        } => {
            if let Some(limit) = limit {
                config.refresh.batch_size = limit;
            }
            let countries: Vec<String> = countries
                .iter()
                .flat_map(|c| SearchQuery::parse_field(c))
                .collect();
            commands::refresh(&client, &config.refresh, countries, task).await
        }
        Commands::Status => commands::status(&client).await,
        Commands::Tracks { artist_id } => {
            let artist_id = artist_id
                .or_else(|| config.dashboard.artist_id.clone())
                .context("no artist id given and [dashboard] artist_id is not set")?;
            commands::tracks(&client, &artist_id).await
        }
        Commands::Job { action, kind } => {
            let kind = match kind {
                JobArg::Scan => airdesk_proto::tracker::JobKind::Scan,
                JobArg::Discover => airdesk_proto::tracker::JobKind::Discover,
            };
            commands::job(&client, kind, matches!(action, JobAction::Start)).await
        }
        Commands::Export { kind, output } => {
            let output = output.unwrap_or_else(|| PathBuf::from("."));
            commands::export(&client, kind.into(), &output).await
        }
        Commands::AddTrack {
            name,
            spotify_id,
            spotify_url,
        } => {
            let track = NewTrack {
                name,
                spotify_id,
                spotify_url: spotify_url.unwrap_or_default(),
            };
            commands::add_track(&client, &track).await
        }
        Commands::Dashboard { view, filters } => {
            let query = filters.query();
            let initial = (!query.is_empty()).then_some(query);
            app::App::new(&config, client, view.into(), initial)
                .run()
                .await
        }
    }
}

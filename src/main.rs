use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use radio_sync_server::background_jobs::{run_daemon, TierRunOutcome};
use radio_sync_server::config::{AppConfig, CliConfig, FileConfig};
use radio_sync_server::fetcher::ReqwestFetcher;
use radio_sync_server::station_store::{NewStation, NewStationStream};
use radio_sync_server::{App, SyncTier};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[command(name = "radio-sync", about = "Radio now-playing and song catalog sync")]
struct CliArgs {
    /// Directory holding server.db, songs.db and stations.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Path to a TOML config file. Its values override the command line.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Timeout in seconds for each now-playing fetch.
    #[clap(long, default_value_t = 4)]
    pub fetch_timeout_secs: u64,

    /// Number of days of song history to keep.
    #[clap(long, default_value_t = 30)]
    pub history_retention_days: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one tier once (suitable for cron).
    Sync {
        tier: SyncTier,
        /// Run even if a previous now-playing run looks in flight.
        #[clap(long)]
        force: bool,
    },
    /// Show when each tier last completed.
    Status {
        #[clap(long)]
        json: bool,
    },
    /// Run every tier on its interval until Ctrl-C.
    Run,
    /// Manage stations.
    Station {
        #[command(subcommand)]
        action: StationAction,
    },
    /// Manage station streams.
    Stream {
        #[command(subcommand)]
        action: StreamAction,
    },
    /// Print the stored now-playing snapshot of every stream as JSON.
    Nowplaying,
    /// Manage song identities.
    Song {
        #[command(subcommand)]
        action: SongAction,
    },
}

#[derive(Subcommand, Debug)]
enum StationAction {
    Add {
        name: String,
        #[clap(long)]
        short_name: Option<String>,
    },
    List,
    /// Poll the station's streams again.
    Enable { station_id: i64 },
    /// Stop polling the station; its streams read as offline.
    Disable { station_id: i64 },
}

#[derive(Subcommand, Debug)]
enum StreamAction {
    Add {
        station_id: i64,
        name: String,
        stream_url: String,
        /// Adapter source type (see `station list`).
        #[clap(long, default_value = "text")]
        source_type: String,
        /// Status URL, when different from the stream URL.
        #[clap(long)]
        nowplaying_url: Option<String>,
        #[clap(long)]
        default: bool,
    },
    /// Poll the stream again.
    Enable { stream_id: i64 },
    /// Stop polling the stream; it reads as offline.
    Disable { stream_id: i64 },
}

#[derive(Subcommand, Debug)]
enum SongAction {
    /// Make DUPLICATE an alias of CANONICAL.
    Merge { duplicate: String, canonical: String },
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let cli_config = CliConfig {
        db_dir: cli_args.db_dir.clone(),
        fetch_timeout_secs: cli_args.fetch_timeout_secs,
        history_retention_days: cli_args.history_retention_days,
    };
    let config = AppConfig::resolve(&cli_config, file_config)?;
    let app = App::open(config)?;

    match cli_args.command {
        Command::Sync { tier, force } => run_sync(&app, tier, force),
        Command::Status { json } => print_status(&app, json),
        Command::Run => run_forever(&app),
        Command::Station { action } => match action {
            StationAction::Add { name, short_name } => {
                let station = app.station_store.add_station(&NewStation { name, short_name })?;
                println!("Added station {} ({})", station.id, station.name);
                Ok(())
            }
            StationAction::List => {
                for entry in app.station_store.list_stations_with_streams()? {
                    println!("{} {}", entry.station.id, entry.station.name);
                    for stream in entry.streams {
                        println!(
                            "    {} {} [{}] {}",
                            stream.id,
                            stream.name,
                            stream.source_type,
                            stream.status_url()
                        );
                    }
                }
                Ok(())
            }
            StationAction::Enable { station_id } => set_station_active(&app, station_id, true),
            StationAction::Disable { station_id } => set_station_active(&app, station_id, false),
        },
        Command::Stream { action } => match action {
            StreamAction::Add {
                station_id,
                name,
                stream_url,
                source_type,
                nowplaying_url,
                default,
            } => {
                let stream = app.station_store.add_stream(&NewStationStream {
                    station_id,
                    name,
                    stream_url,
                    nowplaying_url,
                    source_type,
                    is_default: default,
                })?;
                println!("Added stream {} to station {}", stream.id, stream.station_id);
                Ok(())
            }
            StreamAction::Enable { stream_id } => set_stream_active(&app, stream_id, true),
            StreamAction::Disable { stream_id } => set_stream_active(&app, stream_id, false),
        },
        Command::Nowplaying => {
            let snapshots = app.station_store.list_nowplaying()?;
            println!("{}", serde_json::to_string_pretty(&snapshots)?);
            Ok(())
        }
        Command::Song { action } => match action {
            SongAction::Merge {
                duplicate,
                canonical,
            } => {
                let target = app.song_resolver().merge_song(&duplicate, &canonical)?;
                println!("{} now resolves to {}", duplicate, target.id);
                Ok(())
            }
        },
    }
}

fn set_station_active(app: &App, station_id: i64, is_active: bool) -> Result<()> {
    if !app.station_store.set_station_active(station_id, is_active)? {
        anyhow::bail!("No station with id {}", station_id);
    }
    println!(
        "Station {} {}",
        station_id,
        if is_active { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn set_stream_active(app: &App, stream_id: i64, is_active: bool) -> Result<()> {
    if !app.station_store.set_stream_active(stream_id, is_active)? {
        anyhow::bail!("No stream with id {}", stream_id);
    }
    println!(
        "Stream {} {}",
        stream_id,
        if is_active { "enabled" } else { "disabled" }
    );
    Ok(())
}

fn run_sync(app: &App, tier: SyncTier, force: bool) -> Result<()> {
    let fetcher = Arc::new(ReqwestFetcher::new()?);
    let manager = app.sync_manager(fetcher, CancellationToken::new());

    match manager.run_tier(tier, force)? {
        TierRunOutcome::Skipped { last_started_at } => {
            println!(
                "{} sync skipped: run started at {} is still in flight",
                tier, last_started_at
            );
        }
        TierRunOutcome::Ran(report) => {
            for job in &report.jobs {
                println!("{:<28} {:?} ({:?})", job.job_id, job.status, job.elapsed);
            }
            if report.completed_at.is_none() {
                anyhow::bail!("{} sync left work undone", tier);
            }
        }
    }
    Ok(())
}

fn print_status(app: &App, json: bool) -> Result<()> {
    let manager = app.sync_manager(Arc::new(ReqwestFetcher::new()?), CancellationToken::new());
    let times = manager.sync_times()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&times)?);
    } else {
        for status in times {
            println!(
                "{:<16} last run {} ago ({})",
                status.name,
                status.human_readable_age,
                status.contents.join(", ")
            );
        }
    }
    Ok(())
}

fn run_forever(app: &App) -> Result<()> {
    let shutdown = CancellationToken::new();
    // Built before the runtime: the blocking client must not be dropped inside it.
    let fetcher = Arc::new(ReqwestFetcher::new()?);
    let manager = Arc::new(app.sync_manager(fetcher, shutdown.clone()));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(async {
        let signal_token = shutdown.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Received Ctrl-C, shutting down"),
                Err(e) => error!("Failed to listen for Ctrl-C: {}", e),
            }
            signal_token.cancel();
        });

        run_daemon(Arc::clone(&manager)).await;
    });

    drop(runtime);
    info!("All tiers stopped");
    Ok(())
}

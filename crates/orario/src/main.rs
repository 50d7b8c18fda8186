use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

mod calendar;
mod config;
mod html;
mod schedule;
mod server;
mod source;
mod types;

use calendar::Locale;
use config::Settings;
use schedule::{LoadState, WeeklyScheduleView};
use source::SessionSource;

#[derive(Parser, Debug)]
#[command(name = "orario")]
#[command(about = "Weekly gym schedule viewer backed by the gym REST API")]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output directory for generated files
    #[arg(short, long, default_value = ".", global = true)]
    output: PathBuf,

    /// Read sessions from this JSON snapshot instead of the backend
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Weekday and month names (en, it); overrides ORARIO_LOCALE
    #[arg(long, global = true)]
    locale: Option<Locale>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the web server (default)
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8080")]
        port: u16,
    },

    /// Fetch sessions once and write a static index.html
    Build {
        /// Any date inside the week to render (YYYY-MM-DD, default: today)
        #[arg(long)]
        week: Option<NaiveDate>,
    },

    /// Download the session snapshot to sessions.json
    Fetch,
}

fn init_tracing(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level))
        .add_directive("hyper=warn".parse()?)
        .add_directive("tower_http=warn".parse()?);

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_max_level(Level::TRACE)
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_tracing(&args.log_level)?;

    let settings = Settings::from_env().context("Failed to load settings")?;
    let locale = args.locale.unwrap_or(settings.locale);

    match args.command {
        // Default to serve if no command specified
        None => {
            serve_command(&settings, args.snapshot, locale, 8080).await?;
        }
        Some(Commands::Serve { port }) => {
            serve_command(&settings, args.snapshot, locale, port).await?;
        }
        Some(Commands::Build { week }) => {
            let source = settings.session_source(args.snapshot.as_deref())?;
            let today = calendar::today();
            let mut view = WeeklyScheduleView::new(week.unwrap_or(today), locale);
            view.load_sessions(&source).await;
            if let LoadState::Failed(err) = view.load_state() {
                anyhow::bail!("Failed to load sessions from {}: {err}", source.describe());
            }

            std::fs::create_dir_all(&args.output).context("Failed to create output directory")?;
            let html_path = args.output.join("index.html");
            html::generate_html(&view, today, &html_path)?;
            info!(path = %html_path.display(), week = %view.week_start(), "HTML saved");
        }
        Some(Commands::Fetch) => {
            let source = settings.http_source()?;
            let sessions = source
                .fetch_sessions()
                .await
                .with_context(|| format!("Failed to fetch sessions from {}", source.url()))?;

            std::fs::create_dir_all(&args.output).context("Failed to create output directory")?;
            let json_path = args.output.join("sessions.json");
            let json = serde_json::to_string_pretty(&sessions)?;
            std::fs::write(&json_path, json)
                .with_context(|| format!("Failed to write {}", json_path.display()))?;
            info!(count = sessions.len(), path = %json_path.display(), "Snapshot saved");
        }
    }

    Ok(())
}

async fn serve_command(
    settings: &Settings,
    snapshot: Option<PathBuf>,
    locale: Locale,
    port: u16,
) -> Result<()> {
    let source = settings.session_source(snapshot.as_deref())?;
    info!(source = %source.describe(), "Loading sessions");
    server::serve(port, source, locale).await
}

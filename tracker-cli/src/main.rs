mod render;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use tracker_lib::upload::ANALYSIS_FAILED;
use tracker_lib::{
    AnalysisClient, AnalysisService, ClientConfig, Scale, Upload, View, ViewController,
    DEFAULT_API_BASE,
};

/// Analysis of a long recording can take a while server-side.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Parser)]
#[command(name = "scale-tracker", about = "Analyze and track scale practice recordings")]
struct Cli {
    /// Base URL of the analysis service
    #[arg(long, global = true, env = "SCALE_TRACKER_API", default_value = DEFAULT_API_BASE)]
    api: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported scales and their notes
    Scales,
    /// Upload a recording for analysis
    Analyze {
        /// Audio file to upload
        file: PathBuf,

        /// Scale that was played, e.g. "G major" or "G"
        #[arg(long, default_value = "C major")]
        scale: Scale,
    },
    /// Show past sessions, most recent first
    History {
        /// Only sessions for this scale
        #[arg(long)]
        scale: Option<Scale>,

        /// Print the raw records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show a single session by id
    Session {
        id: u64,

        #[arg(long)]
        json: bool,
    },
    /// Show long-term trends
    Trends {
        /// Only trends for this scale
        #[arg(long)]
        scale: Option<Scale>,

        #[arg(long)]
        json: bool,
    },
    /// Delete every stored session
    Clear {
        /// Skip the safety check
        #[arg(long)]
        yes: bool,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("scale-tracker/", env!("CARGO_PKG_VERSION")))
        .timeout(REQUEST_TIMEOUT)
        .build()
        .context("building HTTP client")?;
    let client = AnalysisClient::with_client(http, ClientConfig::from_optional(Some(&cli.api)));
    log::debug!("Using analysis service at {}", client.base_url());

    match cli.command {
        Commands::Scales => print!("{}", render::scales()),

        Commands::Analyze { file, scale } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "recording".to_string());
            if bytes.is_empty() {
                bail!("{name} is empty");
            }

            let mut tracker = ViewController::new();
            tracker.upload_mut().set_scale(scale);
            tracker.upload_mut().select_file(Upload::new(name, bytes));
            eprintln!("Analyzing {} as {scale}...", file.display());
            tracker.submit_with(&client).await;

            match tracker.upload().result() {
                Some(result) => print!("{}", render::result(result)),
                None => bail!("{}", tracker.upload().failure().unwrap_or(ANALYSIS_FAILED)),
            }
        }

        Commands::History { scale: None, json } => {
            let mut tracker = ViewController::new();
            tracker.set_view_with(View::History, &client).await;
            if let Some(message) = tracker.error() {
                bail!("{message}");
            }
            if json {
                print_json(&tracker.history())?;
            } else {
                print!("{}", render::history(tracker.history()));
            }
        }

        Commands::History { scale: Some(scale), json } => {
            let records = client
                .list_history_for_scale(scale)
                .await
                .with_context(|| format!("loading history for {scale}"))?;
            if json {
                print_json(&records)?;
            } else {
                print!("{}", render::history(&records));
            }
        }

        Commands::Session { id, json } => {
            let record = client
                .get_session(id)
                .await
                .with_context(|| format!("loading session {id}"))?;
            if json {
                print_json(&record)?;
            } else {
                print!("{}", render::history(std::slice::from_ref(&record)));
            }
        }

        Commands::Trends { scale, json } => {
            let trends = match scale {
                Some(scale) => client
                    .get_trends_for_scale(scale)
                    .await
                    .with_context(|| format!("loading trends for {scale}"))?,
                None => client.get_trends().await.context("loading trends")?,
            };
            if json {
                print_json(&trends)?;
            } else {
                print!("{}", render::trends(&trends));
            }
        }

        Commands::Clear { yes } => {
            if !yes {
                bail!("refusing to delete all sessions without --yes");
            }
            let mut tracker = ViewController::new();
            tracker.set_view_with(View::History, &client).await;
            if let Some(message) = tracker.error() {
                bail!("{message}");
            }
            let count = tracker.history().len();
            if !tracker.clear_history_with(&client).await {
                println!("History is already empty");
                return Ok(());
            }
            if let Some(message) = tracker.error() {
                bail!("{message}");
            }
            println!("Deleted {count} sessions");
        }
    }

    Ok(())
}

//! congregacao-import - Schedule import service
//!
//! Receives schedule JSON (uploaded files or the output of the PDF
//! extraction service), validates and normalizes it against the roster and
//! returns errors, warnings and the cleaned records.
//!
//! Subcommands:
//! - `serve`: HTTP service (`POST /import/:dominio`, `GET /health`)
//! - `check`: validate a JSON file from the command line

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use congregacao_common::config::{self, LoggingConfig, TomlConfig};
use congregacao_common::{NameMatcher, RosterIndex, SimilarityMatcher};
use congregacao_import::{AppState, ImportDomain, Importer};
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for congregacao-import
#[derive(Parser, Debug)]
#[command(name = "congregacao-import")]
#[command(about = "Schedule import validation for congregation management")]
#[command(version)]
struct Args {
    /// TOML configuration file (default: ~/.config/congregacao/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Roster JSON file ([{"id": ..., "nome": ...}])
    #[arg(short, long, global = true)]
    roster: Option<PathBuf>,

    /// Resolve names by edit-distance similarity instead of substring matching
    #[arg(long, global = true)]
    strict_names: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP import service
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Validate and clean a JSON file, printing the report
    Check {
        /// Schedule domain (nvc, mecanicas, limpeza, discursos)
        #[arg(short, long)]
        dominio: ImportDomain,

        /// JSON file to import
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let toml = TomlConfig::load_or_default(args.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&toml.logging)?;

    let roster_path = config::resolve_roster_path(args.roster.as_deref(), &toml);
    let roster = load_roster(roster_path.as_deref())?;
    let roster_entries = roster.len();
    let matcher: Arc<dyn NameMatcher> = if args.strict_names {
        Arc::new(SimilarityMatcher::new(roster))
    } else {
        Arc::new(roster)
    };
    let importer = Importer::new(matcher);

    match args.command {
        Command::Serve { port } => {
            let port = config::resolve_port(port, &toml)?;
            serve(AppState::new(importer, roster_entries), port).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Check { dominio, file } => check(&importer, dominio, &file),
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "congregacao_import={0},congregacao_common={0}",
            logging.level
        ))
    });
    let registry = tracing_subscriber::registry().with(filter);

    match &logging.file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            registry
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .init();
        }
        None => registry.with(fmt::layer().with_writer(std::io::stderr)).init(),
    }
    Ok(())
}

fn load_roster(path: Option<&Path>) -> Result<RosterIndex> {
    match path {
        Some(path) => RosterIndex::load(path)
            .with_context(|| format!("Failed to load roster {}", path.display())),
        None => {
            warn!("No roster configured, every name will be kept as a placeholder");
            Ok(RosterIndex::default())
        }
    }
}

async fn serve(state: AppState, port: u16) -> Result<()> {
    info!("Starting congregacao-import");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Roster entries: {}", state.roster_entries);

    let app = congregacao_import::build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    info!("Listening on http://127.0.0.1:{}", port);
    info!("Health check: http://127.0.0.1:{}/health", port);

    axum::serve(listener, app).await?;
    Ok(())
}

fn check(importer: &Importer, domain: ImportDomain, file: &Path) -> Result<ExitCode> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("{} is not valid JSON", file.display()))?;

    let report = importer.run(domain, &raw);
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

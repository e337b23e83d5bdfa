use anyhow::Context;
use clap::{Parser, Subcommand};
use impact_core::{ImpactEngine, PartialAssessment};
use impact_server::{impact_router, parse_evaluation_request, AppConfig, ConfigOrigin};
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "impact-server", version, about = "Incident impact scoring service")]
struct Cli {
    /// TOML configuration file. Defaults apply when it does not exist.
    #[arg(long, global = true, env = "IMPACT_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve {
        /// Overrides `[server]` host and port.
        #[arg(long)]
        listen: Option<SocketAddr>,
    },
    /// Evaluate one incident from a JSON file (`-` reads stdin) and print the assessment.
    Evaluate {
        file: PathBuf,
        /// Initial assessment to complete rather than starting from scratch.
        #[arg(long)]
        seed: Option<PathBuf>,
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let loaded = AppConfig::load(cli.config.as_deref())?;
    init_tracing(&loaded.config)?;

    if let ConfigOrigin::Defaults { missing } = &loaded.origin {
        tracing::warn!(path = %missing.display(), "config file not found, using defaults");
    }
    if !loaded.config.logging.is_valid() {
        tracing::warn!(level = %loaded.config.logging.level, "unknown log level, using info");
    }

    let config = loaded.config;
    let engine = ImpactEngine::new(config.impact.clone()).context("invalid [impact] configuration")?;

    match cli.command.unwrap_or(Command::Serve { listen: None }) {
        Command::Serve { listen } => {
            let addr = match listen {
                Some(addr) => addr,
                None => config.server.resolve().await?,
            };
            serve(engine, addr).await
        }
        Command::Evaluate { file, seed, pretty } => evaluate_file(&engine, &file, seed.as_deref(), pretty),
    }
}

fn init_tracing(config: &AppConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.effective_level()));
    let file_layer = config
        .logging
        .open_file()?
        .map(|file| fmt::layer().with_ansi(false).with_writer(Mutex::new(file)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .init();
    Ok(())
}

async fn serve(engine: ImpactEngine, addr: SocketAddr) -> anyhow::Result<()> {
    let app = impact_router(Arc::new(engine));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!(%addr, "impact-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("impact-server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
}

fn evaluate_file(
    engine: &ImpactEngine,
    file: &Path,
    seed: Option<&Path>,
    pretty: bool,
) -> anyhow::Result<()> {
    let payload = read_json(file)?;
    let (incident, mut initial) = parse_evaluation_request(payload)?;
    if let Some(seed) = seed {
        initial = Some(PartialAssessment::from_json(read_json(seed)?)?);
    }

    let assessment = engine.evaluate_json(&incident, initial)?;
    let out = if pretty {
        serde_json::to_string_pretty(&assessment)?
    } else {
        serde_json::to_string(&assessment)?
    };
    println!("{out}");
    Ok(())
}

fn read_json(path: &Path) -> anyhow::Result<serde_json::Value> {
    let raw = if path == Path::new("-") {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read stdin")?;
        raw
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?
    };
    serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", path.display()))
}

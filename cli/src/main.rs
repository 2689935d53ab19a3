//! CLI entrypoint for persona-chorus
//!
//! Wires the infrastructure adapters into the orchestrator using
//! dependency injection and runs either a one-shot message or a local
//! REPL session.

use anyhow::{Context, Result};
use chorus_application::{HandleMessageUseCase, OrchestratorSettings};
use chorus_domain::PersonaRegistry;
use chorus_infrastructure::{
    ChatCompletionsGateway, ConfigLoader, ConsoleTransport, GatewayClassifier,
    InMemoryConversationStore, KeywordCrisisDetector, ThreadRngSource,
};
use clap::Parser;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "chorus", about = "Multi-persona conversational orchestrator")]
struct Cli {
    /// Message to process once; omit for an interactive session
    message: Option<String>,

    /// Path to a config file (overrides discovered files)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip config files and use built-in defaults
    #[arg(long)]
    no_config: bool,

    /// Channel id for this session
    #[arg(long, default_value = "console")]
    channel: String,

    /// Display name used for your messages
    #[arg(long, default_value = "You")]
    name: String,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow::anyhow!(e))
            .context("failed to load configuration")?
    };

    info!("starting persona-chorus against {}", config.backend.base_url);

    // === Dependency Injection ===
    let gateway = Arc::new(
        ChatCompletionsGateway::from_config(&config.backend)
            .context("failed to construct model gateway")?,
    );
    let classifier = Arc::new(GatewayClassifier::new(Arc::clone(&gateway)));
    let store = Arc::new(InMemoryConversationStore::new(
        config.orchestrator.history_cap,
    ));
    let transport = Arc::new(ConsoleTransport::new());
    let registry = Arc::new(Mutex::new(PersonaRegistry::new()));

    let settings = OrchestratorSettings {
        fanout_timeout: config.orchestrator.fanout_timeout(),
        thinking_delay: config.orchestrator.thinking_delay(),
        history_window: config.orchestrator.history_window,
    };

    let orchestrator = HandleMessageUseCase::new(
        registry,
        gateway,
        classifier,
        Arc::new(KeywordCrisisDetector),
        store,
        transport,
        Arc::new(ThreadRngSource),
        settings,
    );

    if let Some(message) = cli.message {
        orchestrator.handle(&message, &cli.name, &cli.channel).await?;
        return Ok(());
    }

    println!("persona-chorus - type a message, !commands for admin, Ctrl-D to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        orchestrator.handle(line, &cli.name, &cli.channel).await?;
    }

    Ok(())
}

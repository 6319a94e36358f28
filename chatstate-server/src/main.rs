//! chatstate server entry point

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use chatstate_assistant::SessionManager;
use chatstate_core::config::ConfigLoader;
use chatstate_core::logging::init_logging;
use chatstate_core::session::FileConversationLog;
use chatstate_providers::OpenAiClient;
use chatstate_server::{server, state::AppState};

#[derive(Parser)]
#[command(name = "chatstate")]
#[command(about = "A stateful conversational assistant backend")]
#[command(version)]
struct Cli {
    /// Configuration directory
    #[arg(short, long)]
    config_dir: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loader = match &cli.config_dir {
        Some(dir) => ConfigLoader::with_dir(dir),
        None => ConfigLoader::new(),
    };
    let config = loader.load()?;

    let _guard = init_logging(&config.logging);
    info!(
        "Configuration loaded from {}",
        loader.config_dir().display()
    );

    let log = Arc::new(FileConversationLog::new(config.storage.collection_dir()));
    let gateway = Arc::new(OpenAiClient::new(&config.provider));
    let manager = Arc::new(SessionManager::new(log, gateway));

    let state = AppState {
        manager,
        default_instructions: config.assistant.default_instructions.clone(),
    };

    let port = cli.port.unwrap_or(config.server.port);
    server::run_server(state, &config.server.host, port).await
}

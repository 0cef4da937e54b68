use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use pairchat_cli::{bootstrap, BootstrapError, ChatClient, Terminal};
use pairchat_proto::{ChatConfig, DEFAULT_ACCEPT_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT};
use pairchat_session::{LocalDir, Role};

#[derive(Parser)]
#[command(name = "pairchat")]
#[command(version)]
#[command(about = "Turn-based point-to-point text chat with inline file transfer")]
struct Cli {
    /// JSON configuration file (names, colors, wire key)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory that /file reads from and saves into
    #[arg(long, global = true, default_value = ".")]
    dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for the peer, then greet it and start the conversation
    Listen {
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
        /// Seconds to wait for the peer before giving up
        #[arg(long, default_value_t = DEFAULT_ACCEPT_TIMEOUT_SECS)]
        accept_timeout_secs: u64,
    },
    /// Connect to a waiting peer
    Connect {
        #[arg(long, default_value = DEFAULT_HOST)]
        host: String,
        #[arg(short, long, default_value_t = DEFAULT_PORT)]
        port: u16,
    },
}

fn main() -> Result<ExitCode> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ChatConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ChatConfig::default(),
    };
    let client = ChatClient::new(config, LocalDir::new(cli.dir));

    let (stream, role) = match cli.command {
        Commands::Listen {
            port,
            accept_timeout_secs,
        } => match bootstrap::listen(port, Duration::from_secs(accept_timeout_secs)) {
            Ok(stream) => (stream, Role::Initiator),
            Err(e @ BootstrapError::AcceptTimeout { .. }) => {
                println!("{}", e);
                return Ok(ExitCode::FAILURE);
            }
            Err(e) => return Err(e.into()),
        },
        Commands::Connect { host, port } => (bootstrap::connect(&host, port)?, Role::Responder),
    };

    let console = Terminal::new().context("failed to open the terminal")?;
    client.run(stream, role, console)?;
    Ok(ExitCode::SUCCESS)
}

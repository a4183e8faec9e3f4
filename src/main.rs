use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use meditrack::cli::run_shell;
use meditrack::config::MeditrackConfig;
use meditrack::telemetry::init_telemetry;
use meditrack::transport::HttpTransport;
use meditrack::workflow::{ClinicWorkflow, SessionHandle};

#[derive(Parser)]
#[command(name = "meditrack")]
#[command(about = "Operator shell for the clinic visit workflow")]
#[command(long_about = "Meditrack walks one patient through a clinic visit: registration, \
                       vitals, consultation, lab tests and billing. Start it without arguments \
                       to open the interactive shell; type 'help' at the prompt for commands.")]
struct Cli {
    /// Clinic service base URL (overrides configuration)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Emit JSON log lines on stderr
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive operator shell (default)
    Shell,
    /// Print the effective configuration
    Config {
        /// Write the effective configuration to this TOML file
        #[arg(long, help = "Write the effective configuration to a TOML file")]
        write: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let env_file_loaded = MeditrackConfig::load_env_file()?;

    let cli = Cli::parse();
    let mut config = MeditrackConfig::load().context("Failed to load configuration")?;
    if let Some(base_url) = cli.base_url {
        config.service.base_url = base_url;
    }
    if let Some(timeout) = cli.timeout {
        config.service.request_timeout_seconds = Some(timeout);
    }
    if cli.json_logs {
        config.observability.json_logs = true;
    }

    init_telemetry(&config.observability)?;
    if env_file_loaded {
        info!("Loaded environment variables from .env file");
    }

    match cli.command.unwrap_or(Commands::Shell) {
        Commands::Shell => tokio::runtime::Runtime::new()?.block_on(async { shell(config).await }),
        Commands::Config { write } => {
            match write {
                Some(path) => {
                    config.save_to_file(&path)?;
                    println!("Wrote configuration to {}", path.display());
                }
                None => print!("{}", toml::to_string_pretty(&config)?),
            }
            Ok(())
        }
    }
}

async fn shell(config: MeditrackConfig) -> Result<()> {
    let transport = HttpTransport::new(&config.service.base_url, config.service.request_timeout())
        .context("Failed to build HTTP client")?;
    info!(base_url = %transport.base_url(), "Connecting to clinic service");

    let handle = SessionHandle::new(ClinicWorkflow::new(Arc::new(transport)));
    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    run_shell(&handle, stdin, tokio::io::stdout()).await
}

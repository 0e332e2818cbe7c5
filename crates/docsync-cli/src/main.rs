//! docsync CLI
//!
//! Command-line interface for docsync - browse, open and save documents
//! held for you on a document server.

use std::fs::OpenOptions;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docsync_core::{resolve_identity, Config, DocumentSyncClient, Identity, SyncError};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "docsync")]
#[command(about = "docsync - Browse and fetch your documents from a document server")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use this config file instead of the default
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// User name to act as (overrides the configured one)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Device name to derive the user from when no user name is set
    #[arg(long, global = true)]
    device_name: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the identity documents are fetched for
    Whoami,
    /// Choose and remember a user name
    Login {
        /// User name (prompts when omitted)
        name: Option<String>,
    },
    /// List available documents
    #[command(alias = "ls")]
    List,
    /// Fetch a document into the preview cache and open it
    Open {
        /// Document name as listed
        name: String,
        /// Only fetch; do not launch a viewer
        #[arg(long)]
        no_launch: bool,
    },
    /// Save a document to the documents directory
    #[command(alias = "get")]
    Download {
        /// Document name as listed
        name: String,
    },
    /// Pick a document interactively, then open or save it
    Browse,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (server_url, timeout_secs, username, device_name,
        /// documents_dir, preview_dir, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    if let Err(err) = run(cli, &output).await {
        report_error(&err, &output);
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let config = Config::load_with_cli_override(cli.config.as_ref())
        .context("Failed to load configuration")?;
    init_logging(&config);

    // Commands that don't talk to the server
    match &cli.command {
        Commands::Config { command } => {
            return handle_config_command(command.clone(), cli.config.as_ref(), output);
        }
        Commands::Login { name } => {
            let device_name = device_name(&cli.device_name, &config);
            return commands::login::run(
                name.clone().or_else(|| cli.user.clone()),
                device_name,
                cli.config.as_ref(),
                output,
            );
        }
        Commands::Whoami => {
            let identity = session_identity(&cli.user, &cli.device_name, &config)?;
            let device_name = device_name(&cli.device_name, &config);
            return commands::whoami::show(&identity, device_name.as_deref(), &config, output);
        }
        _ => {}
    }

    let identity = session_identity(&cli.user, &cli.device_name, &config)?;
    let client = DocumentSyncClient::from_config(&config, identity)?;
    info!(
        "Session for {} against {}",
        client.identity(),
        client.endpoint().base()
    );

    match cli.command {
        Commands::List => commands::list::run(&client, output).await,
        Commands::Open { name, no_launch } => {
            commands::fetch::open(&client, &name, !no_launch, output).await
        }
        Commands::Download { name } => commands::fetch::download(&client, &name, output).await,
        Commands::Browse => commands::browse::run(&client, output).await,
        Commands::Config { .. } | Commands::Login { .. } | Commands::Whoami => {
            unreachable!() // Handled above
        }
    }
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Device name from the command line, config, or host environment
fn device_name(flag: &Option<String>, config: &Config) -> Option<String> {
    flag.clone().or_else(|| config.effective_device_name())
}

/// Resolve the identity for this run
///
/// `--user` beats the configured user name; the device name is the fallback.
fn session_identity(
    user: &Option<String>,
    device_flag: &Option<String>,
    config: &Config,
) -> Result<Identity> {
    let explicit = user.as_deref().or(config.username.as_deref());
    let device = device_name(device_flag, config).unwrap_or_default();
    Ok(resolve_identity(explicit, &device)?)
}

/// Print a failure as one line plus an optional hint
fn report_error(err: &anyhow::Error, output: &Output) {
    let suggestion = err
        .chain()
        .find_map(|e| e.downcast_ref::<SyncError>())
        .and_then(SyncError::recovery_suggestion);

    if output.is_json() {
        println!(
            "{}",
            serde_json::json!({
                "status": "error",
                "message": format!("{:#}", err),
                "hint": suggestion
            })
        );
        return;
    }

    eprintln!("docsync error: {:#}", err);
    if let (Some(hint), false) = (suggestion, output.is_quiet()) {
        eprintln!("  hint: {}", hint);
    }
}

/// Initialize logging
///
/// Level comes from DOCSYNC_LOG (default: warn). Logs go to stderr, or to
/// `log_file` when configured.
fn init_logging(config: &Config) {
    let level = std::env::var("DOCSYNC_LOG").unwrap_or_else(|_| "warn".to_string());
    let env_filter = EnvFilter::new(format!("docsync_core={},docsync_cli={}", level, level));

    match &config.log_file {
        Some(path) => {
            let file = match OpenOptions::new().create(true).append(true).open(path) {
                Ok(f) => f,
                Err(e) => {
                    eprintln!("Warning: Could not open log file {:?}: {}", path, e);
                    return;
                }
            };
            // Ignore error if already initialized
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_ansi(false)
                .with_writer(file)
                .try_init();
        }
        None => {
            let _ = tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init();
        }
    }
}

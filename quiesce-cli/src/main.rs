///! Quiesce CLI
///!
///! Command-line interface for scheduling maintenance windows on the
///! monitoring platform

mod commands;
mod config;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

use quiesce_client::PlatformClient;

use crate::commands::auth::AuthCommands;
use crate::logging::{LogRotation, LoggingConfig};
use crate::output::OutputFormat;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Environment URL, e.g. https://abc123.live.example.com
    #[arg(short, long, env = "QUIESCE_ENVIRONMENT", global = true)]
    environment: Option<String>,

    /// API token
    #[arg(long, env = "QUIESCE_API_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, global = true)]
    output: Option<String>,

    /// Log level or filter directive, e.g. debug or quiesce_client=trace
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Also write JSON logs to this directory
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage maintenance windows
    Windows {
        #[command(subcommand)]
        command: WindowCommands,
    },
    /// Browse management zones
    Zones {
        #[command(subcommand)]
        command: ZoneCommands,
    },
    /// Browse entity types and search entities
    Entities {
        #[command(subcommand)]
        command: EntityCommands,
    },
    /// List the timezones windows can be scheduled in
    Timezones {
        /// Include legacy zones hidden from selection
        #[arg(long)]
        all: bool,
    },
    /// Authentication commands
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },
    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum WindowCommands {
    /// List maintenance windows
    List {
        /// Include disabled windows
        #[arg(short, long)]
        all: bool,
        /// Only windows whose name contains this text
        #[arg(short, long)]
        search: Option<String>,
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1)]
        page: usize,
    },
    /// Show maintenance window details
    Show { id: String },
    /// Create a one-time maintenance window
    Create(CreateArgs),
}

#[derive(Args)]
struct CreateArgs {
    /// Window name
    #[arg(short, long)]
    name: String,

    /// Free-text description; the author is appended automatically
    #[arg(short, long, default_value = "")]
    description: String,

    /// Start, local to the window's timezone (YYYY-MM-DDTHH:MM)
    #[arg(long)]
    start: String,

    /// End, local to the window's timezone (YYYY-MM-DDTHH:MM)
    #[arg(long)]
    end: String,

    /// Timezone id or alias; defaults to the configured or detected zone
    #[arg(long)]
    timezone: Option<String>,

    /// Problem detection and alerting behaviour
    #[arg(long, default_value = "DETECT_PROBLEMS_AND_ALERT")]
    suppression: String,

    /// Skip synthetic monitor executions during the window
    #[arg(long)]
    disable_synthetics: bool,

    /// Management zone id or name for a single filter group (repeatable)
    #[arg(long = "zone")]
    zones: Vec<String>,

    /// Tag `key` or `key:value` for the same filter group (repeatable)
    #[arg(long = "tag")]
    tags: Vec<String>,

    /// YAML or JSON file with filter groups
    #[arg(short, long)]
    filters: Option<PathBuf>,

    /// Host names separated by commas or whitespace, one group per host
    #[arg(long)]
    hosts: Option<String>,

    /// Read host names from a file
    #[arg(long)]
    hosts_file: Option<PathBuf>,

    /// Management zone applied to every bulk host group (repeatable)
    #[arg(long = "bulk-zone")]
    bulk_zones: Vec<String>,

    /// Tag applied to every bulk host group (repeatable)
    #[arg(long = "bulk-tag")]
    bulk_tags: Vec<String>,

    /// Extend bulk hosts to the processes running on them
    #[arg(long)]
    include_processes: bool,

    /// Extend bulk hosts to the services running on them
    #[arg(long)]
    include_services: bool,

    /// Print what would be submitted and stop
    #[arg(long)]
    dry_run: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,
}

#[derive(Subcommand)]
enum ZoneCommands {
    /// List management zones
    List,
}

#[derive(Subcommand)]
enum EntityCommands {
    /// List entity types
    Types {
        /// Only types whose label or id contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Search entities of a type by name
    Search {
        /// Entity type
        #[arg(short = 't', long = "type", default_value = "HOST")]
        entity_type: String,
        /// Name fragment
        term: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let mut config = config::Config::load().unwrap_or_default();

    let logging = LoggingConfig {
        level: cli.log_level.clone().unwrap_or_else(|| config.log_level.clone()),
        log_dir: cli.log_dir.clone().or_else(|| config.log_dir.as_ref().map(PathBuf::from)),
        rotation: LogRotation::parse(&config.log_rotation),
    };
    let _guard = logging.init()?;

    let output = OutputFormat::parse(cli.output.as_deref().unwrap_or(&config.default_output));

    // Execute command
    match cli.command {
        Commands::Windows { command } => {
            let api = build_client(cli.environment.as_deref(), cli.token.as_deref(), &config)?;
            commands::windows::handle_windows_command(command, &api, &config, output).await?
        }
        Commands::Zones { command } => {
            let api = build_client(cli.environment.as_deref(), cli.token.as_deref(), &config)?;
            commands::zones::handle_zones_command(command, &api, output).await?
        }
        Commands::Entities { command } => {
            let api = build_client(cli.environment.as_deref(), cli.token.as_deref(), &config)?;
            commands::entities::handle_entities_command(command, &api, output).await?
        }
        Commands::Timezones { all } => commands::timezones::handle_timezones_command(all, output)?,
        Commands::Auth { command } => {
            commands::auth::handle_auth_command(command, cli.environment, cli.token, &mut config).await?
        }
        Commands::Completions { shell } => {
            generate_completions(shell);
        }
    }

    Ok(())
}

/// Client for the environment named on the command line, in the
/// environment or in the config file, in that order
fn build_client(environment: Option<&str>, token: Option<&str>, config: &config::Config) -> Result<PlatformClient> {
    let environment = environment
        .or(config.environment_url.as_deref())
        .context("No environment configured. Run `quiesce auth login` or pass --environment.")?;

    let client = PlatformClient::new(environment)?;
    Ok(match token.or(config.api_token.as_deref()) {
        Some(token) => client.with_token(token),
        None => {
            tracing::warn!("No API token configured, requests will be unauthenticated");
            client
        }
    })
}

fn generate_completions(shell: clap_complete::Shell) {
    let mut cmd = Cli::command();
    let bin_name = cmd.get_name().to_string();
    clap_complete::generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
}

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args, CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod core;
mod daemon;
mod indicator;
mod providers;
#[cfg(test)]
mod testing;

use crate::core::settings::{PartialSettings, Settings};

#[derive(Parser)]
#[command(name = "servicenow-flag")]
#[command(
    author,
    version,
    about = "Shows the ServiceNow assignment-group queue on Luxafor flags"
)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Args)]
struct ConfigArgs {
    /// Luxafor API key ID (comma separated IDs are supported)
    #[arg(short = 'l', long = "luxaforapiid", env = "SNF_LUXID", value_name = "LUXID", global = true)]
    luxafor_ids: Option<String>,

    /// ServiceNow account username
    #[arg(short = 'u', long = "username", env = "SNF_SNUSER", global = true)]
    username: Option<String>,

    /// ServiceNow account password
    #[arg(
        short = 'p',
        long = "password",
        env = "SNF_SNPASS",
        hide_env_values = true,
        global = true
    )]
    password: Option<String>,

    /// ServiceNow assignment group
    #[arg(short = 'a', long = "assignmentgroup", env = "SNF_SNASSIGNGROUP", global = true)]
    assignment_group: Option<String>,

    /// ServiceNow custom base-url (e.g. https://acme.service-now.com)
    #[arg(short = 'c', long = "customurl", env = "SNF_SNBASEURL", value_name = "URL", global = true)]
    servicenow_url: Option<String>,

    /// Luxafor webhook actions base-url
    #[arg(long = "luxafor-url", env = "SNF_LUXAFORURL", value_name = "URL", global = true)]
    luxafor_url: Option<String>,

    /// Highest ticket count shown as green (default: 1)
    #[arg(long, env = "SNF_LOW", global = true)]
    low: Option<usize>,

    /// Highest ticket count shown as blue (default: 2)
    #[arg(long, env = "SNF_HIGH", global = true)]
    high: Option<usize>,

    /// Keep the current flag color when ServiceNow answers with an error status
    #[arg(
        long = "hold-on-error",
        env = "SNF_HOLD_ON_ERROR",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    hold_on_error: bool,

    /// Show verbose debug information
    #[arg(
        short,
        long,
        env = "SNF_VERBOSE",
        action = ArgAction::SetTrue,
        value_parser = BoolishValueParser::new(),
        global = true
    )]
    verbose: bool,

    /// Config file (default: ~/.config/servicenow-flag/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    fn overrides(&self) -> PartialSettings {
        PartialSettings {
            luxafor_ids: non_empty(&self.luxafor_ids),
            username: non_empty(&self.username),
            password: non_empty(&self.password),
            assignment_group: non_empty(&self.assignment_group),
            servicenow_url: non_empty(&self.servicenow_url),
            luxafor_url: non_empty(&self.luxafor_url),
            low: self.low,
            high: self.high,
            verbose: self.verbose.then_some(true),
            hold_on_upstream_error: self.hold_on_error.then_some(true),
        }
    }
}

/// An exported but empty variable counts as unset.
fn non_empty(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

#[derive(Subcommand)]
enum Commands {
    /// Poll ServiceNow and drive the flags (default)
    Run,

    /// Read the queue once and print it
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Switch every flag off
    Reset,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stdout)
                .with_target(false),
        )
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let settings = Settings::load(cli.config.overrides(), cli.config.config.as_deref())?;
    init_logging(settings.verbose);
    if let Some(path) = &settings.config_file {
        tracing::debug!(?path, "Loaded config");
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => daemon::run(settings).await,
        Commands::Status { json } => cli::status::run(settings, json).await,
        Commands::Reset => cli::reset::run(settings).await,
        Commands::Completions { .. } => Ok(()),
    }
}

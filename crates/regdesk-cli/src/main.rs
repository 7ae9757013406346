use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use regdesk_core::case::InMemoryCaseRegistry;
use regdesk_core::config::RootConfig;
use regdesk_infrastructure::{ConfigService, TomlCaseLoader};
use std::path::PathBuf;

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "regdesk")]
#[command(about = "regdesk - Regulatory case desk with case-grounded AI chat", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.config/regdesk/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Cases file to load instead of the configured or built-in fixtures
    #[arg(long, global = true, value_name = "PATH")]
    cases: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List regulatory cases
    Cases {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the executive summary of a case
    Show { case_id: String },
    /// Print the system prompt used when chatting about a case
    Prompt { case_id: String },
    /// Chat about a case
    Chat { case_id: String },
}

/// Everything a command needs, loaded once at startup.
pub struct AppContext {
    pub config: RootConfig,
    pub cases: InMemoryCaseRegistry,
}

impl AppContext {
    fn load(cli: &Cli) -> Result<Self> {
        let config_service = match &cli.config {
            Some(path) => ConfigService::with_path(path.clone()),
            None => ConfigService::new()?,
        };
        let config = config_service
            .get_config()
            .with_context(|| format!("Failed to load {}", config_service.path().display()))?;

        let loader = match &cli.cases {
            Some(path) => TomlCaseLoader::with_path(path.clone()).strict(config.fixtures.strict),
            None => TomlCaseLoader::from_config(&config.fixtures),
        };
        let cases = loader.load().context("Failed to load cases")?;

        Ok(Self { config, cases })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = logging::init();

    let ctx = AppContext::load(&cli)?;
    tracing::debug!(cases = ctx.cases.len(), "Loaded cases");

    match cli.command {
        Commands::Cases { json } => commands::cases::run(&ctx, json)?,
        Commands::Show { case_id } => commands::show::run(&ctx, &case_id)?,
        Commands::Prompt { case_id } => commands::prompt::run(&ctx, &case_id)?,
        Commands::Chat { case_id } => commands::chat::run(ctx, &case_id).await?,
    }

    Ok(())
}

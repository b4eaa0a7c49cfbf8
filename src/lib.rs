pub mod cli;
pub mod core;

use crate::cli::allocate::AllocateArgs;
use crate::cli::compare::CompareArgs;
use crate::cli::project::ProjectArgs;
use crate::core::config::AppConfig;
use crate::core::loader::{self, ColumnAliases};
use anyhow::{Context, Result};
use tracing::{debug, info};

pub enum AppCommand {
    Summary,
    Project(ProjectArgs),
    Compare(CompareArgs),
    Allocate(AllocateArgs),
    Health,
}

pub fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("FII assistant starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    cli::ui::apply_display(&config.display);

    let aliases = ColumnAliases::with_extra(&config.column_aliases)
        .context("Invalid column_aliases in config")?;
    let portfolio_path = config.portfolio_path();
    let portfolio = loader::load_portfolio(&portfolio_path, &aliases)
        .with_context(|| format!("Failed to load portfolio from {}", portfolio_path.display()))?;

    match command {
        AppCommand::Summary => cli::summary::run(&portfolio, &config),
        AppCommand::Project(args) => cli::project::run(&portfolio, &config, &args),
        AppCommand::Compare(args) => cli::compare::run(&portfolio, &config, &args),
        AppCommand::Allocate(args) => cli::allocate::run(&portfolio, &config, &args),
        AppCommand::Health => cli::health::run(&portfolio, &config.display),
    }
}

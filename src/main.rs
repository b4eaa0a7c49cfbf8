use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fii_assistant::cli::allocate::AllocateArgs;
use fii_assistant::cli::compare::CompareArgs;
use fii_assistant::cli::project::ProjectArgs;
use fii_assistant::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fii_assistant::AppCommand {
    fn from(cmd: Commands) -> fii_assistant::AppCommand {
        match cmd {
            Commands::Summary => fii_assistant::AppCommand::Summary,
            Commands::Project {
                months,
                step,
                export,
            } => fii_assistant::AppCommand::Project(ProjectArgs {
                months,
                step,
                export,
            }),
            Commands::Compare {
                months,
                step,
                export,
            } => fii_assistant::AppCommand::Compare(CompareArgs {
                months,
                step,
                export,
            }),
            Commands::Allocate {
                policy,
                pool,
                units,
                apply,
                export,
            } => fii_assistant::AppCommand::Allocate(AllocateArgs {
                policy,
                pool,
                units,
                apply,
                export,
            }),
            Commands::Health => fii_assistant::AppCommand::Health,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration and an example portfolio
    Setup,
    /// Display holdings and portfolio totals
    Summary,
    /// Project monthly income with and without reinvestment
    Project {
        /// Horizon in months
        #[arg(short, long)]
        months: Option<u32>,
        /// Show every n-th month
        #[arg(short, long, default_value_t = 12)]
        step: u32,
        /// Write every month to a CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Compare reinvested wealth against fixed-rate benchmarks
    Compare {
        /// Horizon in months
        #[arg(short, long)]
        months: Option<u32>,
        /// Show every n-th month
        #[arg(short, long, default_value_t = 12)]
        step: u32,
        /// Write every month to a CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Split a reinvestment pool across holdings
    Allocate {
        /// proportional_to_income, proportional_to_yield or inverse_concentration
        #[arg(short, long)]
        policy: Option<String>,
        /// Amount to reinvest; defaults to the monthly income
        #[arg(long)]
        pool: Option<f64>,
        /// Convert amounts into whole units
        #[arg(short, long)]
        units: bool,
        /// Write the portfolio after buying the units to this CSV
        #[arg(short, long)]
        apply: Option<PathBuf>,
        /// Write the allocation to a CSV file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// Score diversification and yield, with recommendations
    Health,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => fii_assistant::cli::setup::setup_at_path(path),
            None => fii_assistant::cli::setup::setup(),
        },
        Some(cmd) => fii_assistant::run_command(cmd.into(), cli.config_path.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

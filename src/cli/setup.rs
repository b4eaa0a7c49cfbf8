use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

const EXAMPLE_CONFIG: &str = include_str!("../../docs/example_config.yaml");
const EXAMPLE_PORTFOLIO: &str = include_str!("../../docs/example_portfolio.csv");

/// Creates a default configuration file with example content at the default location
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(path)
}

/// Creates the example configuration at `path`, plus the example portfolio it
/// points to when that file does not exist yet.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;
    tracing::info!("Created default configuration at {}", path.display());

    let portfolio_path = AppConfig::load_from_path(path)?.portfolio_path();
    if !portfolio_path.exists() {
        std::fs::write(&portfolio_path, EXAMPLE_PORTFOLIO).with_context(|| {
            format!(
                "Failed to write example portfolio to {}",
                portfolio_path.display()
            )
        })?;
        tracing::info!("Created example portfolio at {}", portfolio_path.display());
    }

    Ok(())
}

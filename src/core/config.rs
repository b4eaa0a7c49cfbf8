use crate::core::allocation::AllocationPolicy;
use crate::core::benchmark::Benchmark;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProjectionConfig {
    #[serde(default = "default_months")]
    pub default_months: u32,
    #[serde(default = "max_months")]
    pub max_months: u32,
}

fn default_months() -> u32 {
    60
}

fn max_months() -> u32 {
    120
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        ProjectionConfig {
            default_months: default_months(),
            max_months: max_months(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ReinvestConfig {
    #[serde(default = "default_policy")]
    pub policy: AllocationPolicy,
}

fn default_policy() -> AllocationPolicy {
    AllocationPolicy::ProportionalToIncome
}

impl Default for ReinvestConfig {
    fn default() -> Self {
        ReinvestConfig {
            policy: default_policy(),
        }
    }
}

/// Rendering options handed to the output layer.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayConfig {
    #[serde(default = "default_color")]
    pub color: bool,
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,
}

fn default_color() -> bool {
    true
}

fn default_currency_symbol() -> String {
    "R$".to_string()
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            color: default_color(),
            currency_symbol: default_currency_symbol(),
        }
    }
}

fn default_benchmarks() -> Vec<Benchmark> {
    vec![
        Benchmark {
            name: "CDI".to_string(),
            annual_rate: 0.10,
        },
        Benchmark {
            name: "IBOV".to_string(),
            annual_rate: 0.08,
        },
    ]
}

fn default_currency() -> String {
    "BRL".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Path to the holdings CSV.
    pub portfolio: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub projection: ProjectionConfig,
    #[serde(default = "default_benchmarks")]
    pub benchmarks: Vec<Benchmark>,
    #[serde(default)]
    pub reinvest: ReinvestConfig,
    /// Extra header spellings, keyed by canonical column name.
    #[serde(default)]
    pub column_aliases: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "fii-assistant", "fii-assistant")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        // A relative portfolio path is taken relative to the config file.
        let portfolio_path = PathBuf::from(&config.portfolio);
        if portfolio_path.is_relative() {
            if let Some(parent) = path.as_ref().parent() {
                config.portfolio = parent.join(portfolio_path).to_string_lossy().into_owned();
            }
        }
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn portfolio_path(&self) -> PathBuf {
        PathBuf::from(&self.portfolio)
    }
}

use fii_assistant::cli::allocate::AllocateArgs;
use fii_assistant::cli::compare::CompareArgs;
use fii_assistant::cli::project::ProjectArgs;
use fii_assistant::core::loader::{self, ColumnAliases};
use fii_assistant::{AppCommand, run_command};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::info;

const PORTFOLIO: &str = "\
Ticker;Quantidade;Preço Médio;Dividendo Mensal;Cotação
BTLG11;101;103,58;0,79;104,10
VISC11;90;108,84;0,80;
KNCR11;83;105,61;1,21;103,90
MXRF11;700;10,14;0,10;9,85
";

mod test_utils {
    use super::*;

    /// Writes a config and portfolio into a fresh directory and returns the
    /// directory together with the config path.
    pub fn workspace(portfolio: &str, extra_config: &str) -> (TempDir, PathBuf) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("carteira.csv"), portfolio).expect("Failed to write portfolio");

        let config_path = dir.path().join("config.yaml");
        let config = format!(
            "portfolio: carteira.csv\ndisplay:\n  color: false\n{extra_config}"
        );
        fs::write(&config_path, config).expect("Failed to write config");
        (dir, config_path)
    }

    pub fn run(command: AppCommand, config_path: &Path) -> anyhow::Result<()> {
        run_command(command, config_path.to_str())
    }
}

use test_utils::{run, workspace};

#[test_log::test]
fn test_summary_and_health() {
    let (_dir, config_path) = workspace(PORTFOLIO, "");
    run(AppCommand::Summary, &config_path).expect("summary failed");
    run(AppCommand::Health, &config_path).expect("health failed");
}

#[test_log::test]
fn test_project_with_export() {
    let (dir, config_path) = workspace(PORTFOLIO, "");
    let export = dir.path().join("projection.csv");

    run(
        AppCommand::Project(ProjectArgs {
            months: Some(24),
            step: 6,
            export: Some(export.clone()),
        }),
        &config_path,
    )
    .expect("project failed");

    let content = fs::read_to_string(&export).unwrap();
    let mut lines = content.lines();
    assert_eq!(
        lines.next(),
        Some("month,static_income,static_wealth,reinvest_income,reinvest_wealth")
    );
    assert_eq!(lines.count(), 24);
}

#[test_log::test]
fn test_project_uses_configured_default_horizon() {
    let (dir, config_path) = workspace(PORTFOLIO, "projection:\n  default_months: 18\n");
    let export = dir.path().join("projection.csv");

    run(
        AppCommand::Project(ProjectArgs {
            export: Some(export.clone()),
            ..ProjectArgs::default()
        }),
        &config_path,
    )
    .expect("project failed");

    assert_eq!(fs::read_to_string(&export).unwrap().lines().count(), 19);
}

#[test_log::test]
fn test_horizon_too_long_is_rejected() {
    let (_dir, config_path) = workspace(PORTFOLIO, "");
    let err = run(
        AppCommand::Project(ProjectArgs {
            months: Some(121),
            step: 12,
            export: None,
        }),
        &config_path,
    )
    .unwrap_err();
    info!(%err, "Horizon rejected");
    assert!(err.to_string().contains("exceeds the maximum of 120"));
}

#[test_log::test]
fn test_compare_with_configured_benchmarks() {
    let (dir, config_path) = workspace(
        PORTFOLIO,
        "benchmarks:\n  - name: SELIC\n    annual_rate: 0.1075\n",
    );
    let export = dir.path().join("compare.csv");

    run(
        AppCommand::Compare(CompareArgs {
            months: Some(12),
            step: 12,
            export: Some(export.clone()),
        }),
        &config_path,
    )
    .expect("compare failed");

    let content = fs::read_to_string(&export).unwrap();
    assert!(content.starts_with("month,Portfolio (reinvested),SELIC\n"));
    assert_eq!(content.lines().count(), 13);
}

#[test_log::test]
fn test_allocate_apply_updates_portfolio() {
    let (dir, config_path) = workspace(PORTFOLIO, "");
    let updated_path = dir.path().join("updated.csv");
    let export = dir.path().join("plan.csv");

    run(
        AppCommand::Allocate(AllocateArgs {
            policy: Some("inverse_concentration".to_string()),
            pool: Some(1000.0),
            units: true,
            apply: Some(updated_path.clone()),
            export: Some(export.clone()),
        }),
        &config_path,
    )
    .expect("allocate failed");

    let before = loader::load_portfolio(dir.path().join("carteira.csv"), &ColumnAliases::default())
        .unwrap();
    let after = loader::load_portfolio(&updated_path, &ColumnAliases::default()).unwrap();
    assert_eq!(after.len(), before.len());
    assert!(
        after
            .iter()
            .zip(before.iter())
            .all(|(a, b)| a.ticker == b.ticker && a.quantity >= b.quantity)
    );
    assert!(after.total_invested() > before.total_invested());
    assert!(after.total_invested() <= before.total_invested() + 1000.0 + 1e-6);

    let plan = fs::read_to_string(&export).unwrap();
    assert!(plan.starts_with("ticker,weight,amount\n"));
    assert_eq!(plan.lines().count(), 5);
}

#[test_log::test]
fn test_invalid_policy_is_reported() {
    let (_dir, config_path) = workspace(PORTFOLIO, "");
    let err = run(
        AppCommand::Allocate(AllocateArgs {
            policy: Some("everything".to_string()),
            ..AllocateArgs::default()
        }),
        &config_path,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid policy 'everything'"));
}

#[test_log::test]
fn test_missing_column_is_reported() {
    let (_dir, config_path) = workspace("ticker,quantity,average_cost\nA,1,10\n", "");
    let err = run(AppCommand::Summary, &config_path).unwrap_err();
    let chain = format!("{err:#}");
    assert!(chain.contains("monthly_distribution"), "unexpected error: {chain}");
}

#[test_log::test]
fn test_configured_column_alias() {
    let (_dir, config_path) = workspace(
        "Fundo,Cotas Totais,PM,Provento\nHGLG11,10,160,1.1\n",
        "column_aliases:\n  ticker: [\"Fundo\"]\n  quantity: [\"Cotas Totais\"]\n",
    );
    run(AppCommand::Summary, &config_path).expect("summary with aliases failed");
}

#[test_log::test]
fn test_missing_config_fails() {
    let dir = TempDir::new().unwrap();
    let err = run(AppCommand::Summary, &dir.path().join("absent.yaml")).unwrap_err();
    assert!(err.to_string().contains("Failed to read config file"));
}

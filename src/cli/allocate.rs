use super::{export, ui};
use crate::core::allocation::{self, AllocationPlan, AllocationPolicy, PurchasePlan};
use crate::core::config::{AppConfig, DisplayConfig};
use crate::core::holding::Portfolio;
use crate::core::loader;
use anyhow::{Context, Result};
use chrono::Local;
use comfy_table::{Attribute, Cell};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, Default)]
pub struct AllocateArgs {
    /// Policy name; the configured policy when absent.
    pub policy: Option<String>,
    /// Amount to distribute; the portfolio's monthly income when absent.
    pub pool: Option<f64>,
    /// Convert amounts into whole units at the current price.
    pub units: bool,
    /// Write the portfolio after the purchases to this CSV.
    pub apply: Option<PathBuf>,
    pub export: Option<PathBuf>,
}

fn display_plan(plan: &AllocationPlan, display: &DisplayConfig) -> String {
    let mut table = ui::new_styled_table(display);
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Share"),
        ui::header_cell("Amount"),
    ]);
    for line in &plan.lines {
        table.add_row(vec![
            Cell::new(&line.ticker),
            ui::format_percentage_cell(line.weight * 100.0),
            ui::money_cell(line.amount, display),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        ui::money_cell(plan.total(), display),
    ]);

    format!(
        "{}\n{}\n\n{table}",
        ui::style_text(
            &format!("Reinvesting {}", ui::format_money(plan.pool, display)),
            ui::StyleType::Title
        ),
        ui::style_text(
            &format!("{}: {}", plan.policy, plan.policy.description()),
            ui::StyleType::Subtle
        ),
    )
}

fn display_purchases(purchases: &PurchasePlan, display: &DisplayConfig) -> String {
    let mut table = ui::new_styled_table(display);
    table.set_header(vec![
        ui::header_cell("Fund"),
        ui::header_cell("Unit Price"),
        ui::header_cell("Units"),
        ui::header_cell("Spent"),
        ui::header_cell("Left Over"),
    ]);
    for line in &purchases.lines {
        table.add_row(vec![
            Cell::new(&line.ticker),
            ui::money_cell(line.unit_price, display),
            Cell::new(line.units),
            ui::money_cell(line.spent, display),
            ui::money_cell(line.remainder, display),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        Cell::new(purchases.total_units()),
        ui::money_cell(purchases.total_spent(), display),
        ui::money_cell(purchases.total_remainder(), display),
    ]);

    format!(
        "{} {}\n\n{table}",
        ui::style_text("Purchase Plan", ui::StyleType::Title),
        ui::style_text(
            &Local::now().format("(%Y-%m-%d %H:%M)").to_string(),
            ui::StyleType::Subtle
        ),
    )
}

pub fn run(portfolio: &Portfolio, config: &AppConfig, args: &AllocateArgs) -> Result<()> {
    let policy = match &args.policy {
        Some(name) => name.parse::<AllocationPolicy>()?,
        None => config.reinvest.policy,
    };
    let pool = args.pool.unwrap_or_else(|| portfolio.total_monthly_income());
    info!("Allocating {pool:.2} with {policy}");

    let plan = allocation::allocate(portfolio.holdings(), pool, policy)?;
    println!("{}", display_plan(&plan, &config.display));

    if args.units || args.apply.is_some() {
        let purchases = allocation::plan_purchases(&plan, &allocation::unit_prices(portfolio))?;
        println!("\n{}", display_purchases(&purchases, &config.display));

        if let Some(path) = &args.apply {
            if purchases.total_units() == 0 {
                warn!("The pool buys no whole units; the portfolio is unchanged");
            }
            let updated = allocation::apply_purchases(portfolio, &purchases);
            loader::save_portfolio(path, &updated)
                .with_context(|| format!("Failed to save portfolio to {}", path.display()))?;
            info!("Saved updated portfolio to {}", path.display());
        }
    }

    if let Some(path) = &args.export {
        export::write_rows(path, &plan.lines)?;
    }
    Ok(())
}

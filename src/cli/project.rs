use super::{export, ui};
use crate::core::analytics;
use crate::core::config::{AppConfig, DisplayConfig};
use crate::core::holding::Portfolio;
use crate::core::projection::{self, ProjectionPolicy};
use anyhow::Result;
use comfy_table::{Attribute, Cell};
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Horizon in months; the configured default when absent.
    pub months: Option<u32>,
    /// Show every n-th month in the table.
    pub step: u32,
    pub export: Option<PathBuf>,
}

/// Static and reinvested projections side by side for one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionRow {
    pub month: u32,
    pub static_income: f64,
    pub static_wealth: f64,
    pub reinvest_income: f64,
    pub reinvest_wealth: f64,
}

pub fn build_rows(portfolio: &Portfolio, months: u32) -> Result<Vec<ProjectionRow>> {
    let aggregates = analytics::aggregate(portfolio.holdings())?;
    let flat = projection::project(
        aggregates.total_invested,
        aggregates.total_income,
        months,
        ProjectionPolicy::Static,
    )?;
    let reinvested = projection::project(
        aggregates.total_invested,
        aggregates.total_income,
        months,
        ProjectionPolicy::Reinvest,
    )?;

    Ok(flat
        .iter()
        .zip(&reinvested)
        .map(|(s, r)| ProjectionRow {
            month: s.month,
            static_income: s.income,
            static_wealth: s.wealth,
            reinvest_income: r.income,
            reinvest_wealth: r.wealth,
        })
        .collect())
}

fn display_projection(rows: &[ProjectionRow], step: u32, display: &DisplayConfig) -> String {
    let mut table = ui::new_styled_table(display);
    table.set_header(vec![
        ui::header_cell("Month"),
        ui::header_cell("Income (static)"),
        ui::header_cell("Income (reinvested)"),
        ui::header_cell("Wealth (reinvested)"),
    ]);

    let last = rows.last().map_or(0, |r| r.month);
    for row in rows
        .iter()
        .filter(|r| ui::is_displayed_month(r.month, step, last))
    {
        table.add_row(vec![
            Cell::new(row.month),
            ui::money_cell(row.static_income, display),
            ui::money_cell(row.reinvest_income, display),
            ui::money_cell(row.reinvest_wealth, display),
        ]);
    }

    let mut output = format!(
        "{}\n\n{table}",
        ui::style_text("Income Projection", ui::StyleType::Title)
    );

    if let Some(row) = rows.last() {
        let mut gains = ui::new_styled_table(display);
        gains.set_header(vec![
            ui::header_cell(&format!("Month {}", row.month)),
            ui::header_cell("Static"),
            ui::header_cell("Reinvested"),
            ui::header_cell("Difference"),
        ]);
        let income_gain = if row.static_income > 0.0 {
            Some((row.reinvest_income / row.static_income - 1.0) * 100.0)
        } else {
            None
        };
        gains.add_row(vec![
            Cell::new("Monthly income").add_attribute(Attribute::Bold),
            ui::money_cell(row.static_income, display),
            ui::money_cell(row.reinvest_income, display),
            income_gain.map_or_else(|| ui::na_cell(false), ui::change_cell),
        ]);
        output.push_str(&format!("\n\n{gains}"));
    }

    output
}

pub fn run(portfolio: &Portfolio, config: &AppConfig, args: &ProjectArgs) -> Result<()> {
    let months = projection::validate_horizon(
        args.months.unwrap_or(config.projection.default_months),
        config.projection.max_months,
    )?;
    info!("Projecting {months} months");

    let rows = build_rows(portfolio, months)?;
    println!("{}", display_projection(&rows, args.step, &config.display));

    if let Some(path) = &args.export {
        export::write_rows(path, &rows)?;
    }
    Ok(())
}

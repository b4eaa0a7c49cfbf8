use super::ui;
use crate::core::analytics::{self, Aggregates, HoldingMetrics};
use crate::core::config::{AppConfig, DisplayConfig};
use crate::core::holding::Portfolio;
use anyhow::Result;
use comfy_table::Cell;

pub struct PortfolioSummary {
    pub holdings: Vec<HoldingMetrics>,
    pub current_prices: Vec<Option<f64>>,
    pub aggregates: Aggregates,
}

impl PortfolioSummary {
    pub fn build(portfolio: &Portfolio) -> Result<Self> {
        let aggregates = analytics::aggregate(portfolio.holdings())?;
        Ok(Self {
            holdings: analytics::holding_metrics(portfolio),
            current_prices: portfolio.iter().map(|h| h.current_price).collect(),
            aggregates,
        })
    }

    /// Renders the holdings table and totals; `currency` is the code shown in the title.
    pub fn display_as_table(&self, currency: &str, display: &DisplayConfig) -> String {
        let mut table = ui::new_styled_table(display);

        table.set_header(vec![
            ui::header_cell("Fund"),
            ui::header_cell("Units"),
            ui::header_cell("Invested"),
            ui::header_cell("Price"),
            ui::header_cell("Market Value"),
            ui::header_cell("Income / month"),
            ui::header_cell("Yield (% a.m.)"),
            ui::header_cell("Weight (%)"),
        ]);

        for (holding, price) in self.holdings.iter().zip(&self.current_prices) {
            table.add_row(vec![
                Cell::new(&holding.ticker),
                ui::number_cell(holding.quantity, 0),
                ui::money_cell(holding.invested_value, display),
                ui::format_optional_cell(*price, |p| ui::format_money(p, display)),
                ui::money_cell(holding.market_value, display),
                ui::money_cell(holding.monthly_income, display),
                ui::number_cell(holding.monthly_yield * 100.0, 2),
                ui::format_percentage_cell(holding.weight),
            ]);
        }

        let aggregates = &self.aggregates;
        let mut output = format!(
            "{}\n\n",
            ui::style_text(&format!("Portfolio Overview ({currency})"), ui::StyleType::Title)
        );
        output.push_str(&table.to_string());

        let totals = [
            ("Total Invested", ui::format_money(aggregates.total_invested, display)),
            ("Monthly Income", ui::format_money(aggregates.total_income, display)),
            (
                "Blended Yield",
                format!("{:.2}% a month", aggregates.blended_yield * 100.0),
            ),
            ("Annual Income", ui::format_money(aggregates.annual_income, display)),
        ];
        output.push('\n');
        for (label, value) in totals {
            output.push_str(&format!(
                "\n{}: {}",
                ui::style_text(label, ui::StyleType::TotalLabel),
                ui::style_text(&value, ui::StyleType::TotalValue)
            ));
        }

        output
    }
}

pub fn run(portfolio: &Portfolio, config: &AppConfig) -> Result<()> {
    let summary = PortfolioSummary::build(portfolio)?;
    println!("{}", summary.display_as_table(&config.currency, &config.display));
    Ok(())
}

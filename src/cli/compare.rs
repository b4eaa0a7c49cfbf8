use super::{export, ui};
use crate::core::analytics;
use crate::core::benchmark::{self, Benchmark};
use crate::core::config::{AppConfig, DisplayConfig};
use crate::core::holding::Portfolio;
use crate::core::projection::{self, ProjectionPolicy};
use anyhow::Result;
use comfy_table::Cell;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct CompareArgs {
    pub months: Option<u32>,
    pub step: u32,
    pub export: Option<PathBuf>,
}

/// A named growth series starting from the portfolio's invested value.
#[derive(Debug, Clone)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
    /// Number of monthly growth steps the last value includes.
    pub growth_steps: u32,
}

pub struct Comparison {
    pub initial_value: f64,
    pub months: u32,
    pub series: Vec<Series>,
}

impl Comparison {
    /// Puts the reinvested portfolio next to each benchmark. The portfolio's
    /// month `n` is its state at the start of that month, while a benchmark's
    /// month `n` already includes `n` months of growth.
    pub fn build(portfolio: &Portfolio, benchmarks: &[Benchmark], months: u32) -> Result<Self> {
        let aggregates = analytics::aggregate(portfolio.holdings())?;
        let initial_value = aggregates.total_invested;

        let reinvested = projection::project(
            initial_value,
            aggregates.total_income,
            months,
            ProjectionPolicy::Reinvest,
        )?;
        let mut series = vec![Series {
            name: "Portfolio (reinvested)".to_string(),
            values: reinvested.iter().map(|p| p.wealth).collect(),
            growth_steps: months - 1,
        }];

        for bench in benchmarks {
            debug!("Simulating benchmark {} at {}", bench.name, bench.annual_rate);
            let points = benchmark::simulate_benchmark(initial_value, bench.annual_rate, months)?;
            series.push(Series {
                name: bench.name.clone(),
                values: points.iter().map(|p| p.value).collect(),
                growth_steps: months,
            });
        }

        Ok(Self {
            initial_value,
            months,
            series,
        })
    }

    /// Compound annual rate of each series, when it can be computed.
    pub fn annualized_returns(&self) -> Vec<Option<f64>> {
        self.series
            .iter()
            .map(|s| {
                let last = *s.values.last()?;
                benchmark::annualized_return(self.initial_value, last, s.growth_steps).ok()
            })
            .collect()
    }

    fn headers(&self) -> Vec<String> {
        std::iter::once("month".to_string())
            .chain(self.series.iter().map(|s| s.name.clone()))
            .collect()
    }

    fn records(&self) -> Vec<Vec<String>> {
        (0..self.months as usize)
            .map(|i| {
                std::iter::once((i + 1).to_string())
                    .chain(self.series.iter().map(|s| format!("{:.2}", s.values[i])))
                    .collect()
            })
            .collect()
    }

    pub fn display_as_table(&self, step: u32, display: &DisplayConfig) -> String {
        let mut table = ui::new_styled_table(display);
        table.set_header(
            self.headers()
                .iter()
                .map(|h| ui::header_cell(if h == "month" { "Month" } else { h.as_str() }))
                .collect::<Vec<_>>(),
        );

        for i in 0..self.months as usize {
            let month = i as u32 + 1;
            if !ui::is_displayed_month(month, step, self.months) {
                continue;
            }
            let mut row = vec![Cell::new(month)];
            row.extend(self.series.iter().map(|s| ui::money_cell(s.values[i], display)));
            table.add_row(row);
        }

        let mut returns = ui::new_styled_table(display);
        returns.set_header(vec![
            ui::header_cell("Series"),
            ui::header_cell(&format!("Value at month {}", self.months)),
            ui::header_cell("Annualized"),
        ]);
        for (series, annualized) in self.series.iter().zip(self.annualized_returns()) {
            returns.add_row(vec![
                Cell::new(&series.name),
                ui::format_optional_cell(series.values.last().copied(), |v| {
                    ui::format_money(v, display)
                }),
                annualized.map_or_else(|| ui::na_cell(false), |r| ui::change_cell(r * 100.0)),
            ]);
        }

        format!(
            "{}\n\nStarting from {}\n\n{table}\n\n{returns}",
            ui::style_text("Portfolio vs Benchmarks", ui::StyleType::Title),
            ui::style_text(
                &ui::format_money(self.initial_value, display),
                ui::StyleType::TotalLabel
            ),
        )
    }
}

pub fn run(portfolio: &Portfolio, config: &AppConfig, args: &CompareArgs) -> Result<()> {
    let months = projection::validate_horizon(
        args.months.unwrap_or(config.projection.default_months),
        config.projection.max_months,
    )?;
    info!(
        "Comparing against {} benchmarks over {months} months",
        config.benchmarks.len()
    );

    let comparison = Comparison::build(portfolio, &config.benchmarks, months)?;
    println!("{}", comparison.display_as_table(args.step, &config.display));

    if let Some(path) = &args.export {
        export::write_records(path, &comparison.headers(), &comparison.records())?;
    }
    Ok(())
}

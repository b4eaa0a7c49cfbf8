//! Comparative growth series at a fixed annual rate.

use crate::core::error::{Error, Result};
use anyhow::anyhow;
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A named comparison series, e.g. a fixed-income or equity index proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub name: String,
    pub annual_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkPoint {
    pub month: u32,
    pub value: f64,
}

/// Effective monthly rate that compounds to `annual_rate` over twelve months.
pub fn monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / 12.0) - 1.0
}

/// Grows `initial_value` month by month. Month 1 already includes one month of
/// growth; the initial value itself is not part of the series.
pub fn simulate_benchmark(
    initial_value: f64,
    annual_rate: f64,
    months: u32,
) -> Result<Vec<BenchmarkPoint>> {
    if months == 0 {
        return Err(Error::NonPositiveHorizon);
    }
    if !initial_value.is_finite() || initial_value < 0.0 {
        return Err(Error::invalid_value(
            "initial_value",
            format!("{initial_value} is not a non-negative amount"),
        ));
    }
    if !annual_rate.is_finite() || annual_rate <= -1.0 {
        return Err(Error::invalid_value(
            "annual_rate",
            format!("{annual_rate} must be a finite rate above -100%"),
        ));
    }

    let rate = monthly_rate(annual_rate);
    debug!("Benchmark at {annual_rate} a year, {rate} a month, over {months} months");

    let mut value = initial_value;
    Ok((1..=months)
        .map(|month| {
            value *= 1.0 + rate;
            BenchmarkPoint { month, value }
        })
        .collect())
}

/// Compound annual growth rate of a series going from `initial` to `last`
/// over `months` months.
pub fn annualized_return(initial: f64, last: f64, months: u32) -> anyhow::Result<f64> {
    if initial <= 0.0 || last <= 0.0 || months == 0 {
        return Err(anyhow!(
            "Annualized return needs positive values and a non-empty horizon"
        ));
    }

    // Decimal::powd panics instead of failing when the growth factor overflows.
    let growth = (last / initial).powf(12.0 / f64::from(months));
    let max = Decimal::MAX.to_f64().unwrap_or(f64::MAX);
    if !growth.is_finite() || growth >= max {
        return Err(anyhow!(
            "Annualized return of {initial} to {last} over {months} months is out of range"
        ));
    }

    let begin_bal = Decimal::from_f64(initial).ok_or_else(|| anyhow!("Invalid initial value"))?;
    let end_bal = Decimal::from_f64(last).ok_or_else(|| anyhow!("Invalid final value"))?;
    let n_years = Decimal::from(months) / Decimal::from(12);

    let rate = cagr(begin_bal, end_bal, n_years);
    debug!("cagr: {begin_bal}, {end_bal}, {n_years} = {rate}");
    rate.to_f64().ok_or_else(|| anyhow!("Annualized return conversion failed"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_year_recovers_annual_rate() {
        for (value, rate) in [(1000.0, 0.12), (52_000.0, 0.105), (1.0, 0.0), (300.0, -0.2)] {
            let series = simulate_benchmark(value, rate, 12).unwrap();
            let last = series.last().unwrap().value;
            let expected = value * (1.0 + rate);
            assert!(((last - expected) / expected).abs() < 1e-6);
        }
    }

    #[test]
    fn test_scenario_twelve_percent() {
        let series = simulate_benchmark(1000.0, 0.12, 12).unwrap();
        assert_eq!(series.len(), 12);
        assert!((series[11].value - 1120.0).abs() < 0.01);
    }

    #[test]
    fn test_first_month_is_after_growth() {
        let series = simulate_benchmark(1000.0, 0.12, 3).unwrap();
        assert_eq!(series[0].month, 1);
        assert!(series[0].value > 1000.0);
        assert!((series[0].value - 1000.0 * (1.0 + monthly_rate(0.12))).abs() < 1e-9);
    }

    #[test]
    fn test_compounding_differs_from_simple_division() {
        let compounded = monthly_rate(0.12);
        assert!(compounded < 0.01);
        assert!((compounded - 0.009488792934).abs() < 1e-9);

        let series = simulate_benchmark(1000.0, 0.12, 120).unwrap();
        let naive = 1000.0 * 1.01_f64.powi(120);
        assert!(naive - series[119].value > 150.0);
    }

    #[test]
    fn test_rejects_zero_horizon() {
        assert!(matches!(
            simulate_benchmark(1000.0, 0.1, 0),
            Err(Error::NonPositiveHorizon)
        ));
    }

    #[test]
    fn test_annualized_return() {
        let rate = annualized_return(1000.0, 1210.0, 24).unwrap();
        assert!((rate - 0.1).abs() < 1e-4);
        assert!(annualized_return(0.0, 100.0, 12).is_err());
    }

    #[test]
    fn test_annualized_return_out_of_range_is_an_error() {
        assert!(annualized_return(1.0, 1001.0, 1).is_err());
        assert!(annualized_return(1.0, f64::MAX, 12).is_err());
    }

    #[test]
    fn test_rejects_invalid_initial_value() {
        for initial in [f64::NAN, -1.0, f64::INFINITY] {
            assert!(matches!(
                simulate_benchmark(initial, 0.1, 12),
                Err(Error::InvalidValue { .. })
            ));
        }
    }
}

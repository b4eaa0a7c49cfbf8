//! Provides functions for computing portfolio aggregates and per-holding metrics.
use crate::core::error::{Error, Result};
use crate::core::holding::{Holding, Portfolio};
use serde::Serialize;
use tracing::debug;

/// Portfolio-level aggregates. All income figures are per month unless named otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aggregates {
    pub total_invested: f64,
    pub total_income: f64,
    pub blended_yield: f64,
    pub annual_income: f64,
}

/// Represents the calculated value, income and weight of a single holding.
#[derive(Debug, Clone, Serialize)]
pub struct HoldingMetrics {
    pub ticker: String,
    pub quantity: f64,
    pub invested_value: f64,
    pub market_value: f64,
    pub monthly_income: f64,
    pub monthly_yield: f64,
    /// Share of total invested value, in percent.
    pub weight: f64,
}

/// Computes the portfolio aggregates.
///
/// Fails without a partial result when nothing is invested, since the blended
/// yield is undefined then.
pub fn aggregate(holdings: &[Holding]) -> Result<Aggregates> {
    let total_invested: f64 = holdings.iter().map(Holding::invested_value).sum();
    let total_income: f64 = holdings.iter().map(Holding::monthly_income).sum();

    if total_invested == 0.0 {
        return Err(Error::division_by_zero(
            "blended yield requires a non-zero total invested value",
        ));
    }

    let blended_yield = total_income / total_invested;
    debug!(
        "{} holdings: invested={total_invested}, income={total_income}, yield={blended_yield}",
        holdings.len()
    );

    Ok(Aggregates {
        total_invested,
        total_income,
        blended_yield,
        annual_income: total_income * 12.0,
    })
}

/// Mean of the per-holding yields weighted by invested value. Equal to
/// `total_income / total_invested` whenever every income-producing holding
/// has a cost basis.
pub fn weighted_mean_yield(holdings: &[Holding]) -> Result<f64> {
    let total_invested: f64 = holdings.iter().map(Holding::invested_value).sum();
    if total_invested == 0.0 {
        return Err(Error::division_by_zero(
            "weighted yield requires a non-zero total invested value",
        ));
    }
    let weighted: f64 = holdings
        .iter()
        .map(|h| h.monthly_yield() * h.invested_value())
        .sum();
    Ok(weighted / total_invested)
}

/// Builds the per-holding table. Weights are left at zero when nothing is invested.
pub fn holding_metrics(portfolio: &Portfolio) -> Vec<HoldingMetrics> {
    let total_invested = portfolio.total_invested();

    portfolio
        .iter()
        .map(|holding| {
            let invested_value = holding.invested_value();
            let weight = if total_invested > 0.0 {
                invested_value / total_invested * 100.0
            } else {
                0.0
            };
            HoldingMetrics {
                ticker: holding.ticker.clone(),
                quantity: holding.quantity,
                invested_value,
                market_value: holding.market_value(),
                monthly_income: holding.monthly_income(),
                monthly_yield: holding.monthly_yield(),
                weight,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_holdings() -> Vec<Holding> {
        vec![
            Holding::new("A", 100.0, 100.0, 1.0),
            Holding::new("B", 50.0, 200.0, 3.0),
        ]
    }

    #[test]
    fn test_aggregate_scenario() {
        let aggregates = aggregate(&scenario_holdings()).unwrap();

        assert_eq!(aggregates.total_invested, 20000.0);
        assert_eq!(aggregates.total_income, 250.0);
        assert!((aggregates.blended_yield - 0.0125).abs() < 1e-12);
        assert_eq!(aggregates.annual_income, 3000.0);
    }

    #[test]
    fn test_blended_yield_matches_weighted_mean() {
        let portfolios = vec![
            scenario_holdings(),
            vec![Holding::new("X", 1.0, 9.87, 0.11)],
            vec![
                Holding::new("BTLG11", 101.0, 103.58, 0.79),
                Holding::new("KNCR11", 83.0, 105.61, 1.21),
                Holding::new("MXRF11", 700.0, 10.14, 0.1),
                Holding::new("ZERO11", 10.0, 95.0, 0.0),
            ],
        ];

        for holdings in portfolios {
            let aggregates = aggregate(&holdings).unwrap();
            let weighted = weighted_mean_yield(&holdings).unwrap();
            assert!(
                (aggregates.blended_yield - aggregates.total_income / aggregates.total_invested)
                    .abs()
                    < f64::EPSILON
            );
            assert!((aggregates.blended_yield - weighted).abs() < 1e-12);
        }
    }

    #[test]
    fn test_aggregate_rejects_zero_invested() {
        let holdings = vec![Holding::new("A", 0.0, 100.0, 1.0)];
        assert!(matches!(
            aggregate(&holdings),
            Err(Error::DivisionByZero { .. })
        ));
        assert!(matches!(aggregate(&[]), Err(Error::DivisionByZero { .. })));
    }

    #[test]
    fn test_holding_metrics_weights() {
        let portfolio = Portfolio::from_holdings(scenario_holdings());
        let metrics = holding_metrics(&portfolio);

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].ticker, "A");
        assert!((metrics[0].weight - 50.0).abs() < 1e-9);
        assert!((metrics[1].monthly_yield - 0.015).abs() < 1e-12);
        assert_eq!(metrics[1].market_value, 10000.0);
        let total: f64 = metrics.iter().map(|m| m.weight).sum();
        assert!((total - 100.0).abs() < 1e-9);
    }
}

//! Distribution of reinvestable cash across holdings.

use crate::core::error::{Error, Result};
use crate::core::holding::{Holding, Portfolio};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

/// Added to each holding's percentage share before inverting, so that tiny
/// positions get a bounded weight.
const CONCENTRATION_OFFSET: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationPolicy {
    ProportionalToIncome,
    ProportionalToYield,
    InverseConcentration,
}

impl AllocationPolicy {
    pub const ALL: [AllocationPolicy; 3] = [
        AllocationPolicy::ProportionalToIncome,
        AllocationPolicy::ProportionalToYield,
        AllocationPolicy::InverseConcentration,
    ];

    pub fn description(&self) -> &'static str {
        match self {
            AllocationPolicy::ProportionalToIncome => "in proportion to the income each fund pays",
            AllocationPolicy::ProportionalToYield => "favouring the highest yields",
            AllocationPolicy::InverseConcentration => "favouring the smallest positions",
        }
    }
}

impl Display for AllocationPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                AllocationPolicy::ProportionalToIncome => "proportional_to_income",
                AllocationPolicy::ProportionalToYield => "proportional_to_yield",
                AllocationPolicy::InverseConcentration => "inverse_concentration",
            }
        )
    }
}

impl FromStr for AllocationPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "proportional_to_income" | "income" => Ok(AllocationPolicy::ProportionalToIncome),
            "proportional_to_yield" | "yield" => Ok(AllocationPolicy::ProportionalToYield),
            "inverse_concentration" | "diversify" => Ok(AllocationPolicy::InverseConcentration),
            _ => Err(Error::InvalidPolicy {
                name: s.to_string(),
                expected: AllocationPolicy::ALL
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationLine {
    pub ticker: String,
    /// Fraction of the pool, between 0 and 1.
    pub weight: f64,
    pub amount: f64,
}

/// Proposed reinvestment per ticker. The amounts add up to `pool`.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationPlan {
    pub policy: AllocationPolicy,
    pub pool: f64,
    pub lines: Vec<AllocationLine>,
}

impl AllocationPlan {
    pub fn total(&self) -> f64 {
        self.lines.iter().map(|l| l.amount).sum()
    }

    pub fn amount_for(&self, ticker: &str) -> Option<f64> {
        self.lines
            .iter()
            .find(|l| l.ticker == ticker)
            .map(|l| l.amount)
    }
}

/// Splits `pool` across `holdings` according to `policy`.
///
/// When every score is zero the pool is split evenly instead of dividing by zero.
pub fn allocate(
    holdings: &[Holding],
    pool: f64,
    policy: AllocationPolicy,
) -> Result<AllocationPlan> {
    if holdings.is_empty() {
        return Err(Error::division_by_zero("cannot allocate over an empty portfolio"));
    }
    if !pool.is_finite() || pool < 0.0 {
        return Err(Error::invalid_value(
            "pool",
            format!("{pool} is not a non-negative amount"),
        ));
    }

    let mut scored: Vec<(&Holding, f64)> = match policy {
        AllocationPolicy::ProportionalToIncome => holdings
            .iter()
            .map(|h| (h, h.monthly_income()))
            .collect(),
        AllocationPolicy::ProportionalToYield => {
            let mut by_yield: Vec<(&Holding, f64)> =
                holdings.iter().map(|h| (h, h.monthly_yield())).collect();
            by_yield.sort_by(|(_, a), (_, b)| b.total_cmp(a));
            by_yield
        }
        AllocationPolicy::InverseConcentration => {
            let total_invested: f64 = holdings.iter().map(Holding::invested_value).sum();
            holdings
                .iter()
                .map(|h| {
                    let pct = if total_invested > 0.0 {
                        h.invested_value() / total_invested * 100.0
                    } else {
                        0.0
                    };
                    (h, 1.0 / (pct + CONCENTRATION_OFFSET))
                })
                .collect()
        }
    };

    let total_score: f64 = scored.iter().map(|(_, s)| *s).sum();
    if total_score > 0.0 && total_score.is_finite() {
        for (_, score) in scored.iter_mut() {
            *score /= total_score;
        }
    } else {
        debug!("All {policy} scores are zero, splitting the pool evenly");
        let even = 1.0 / scored.len() as f64;
        for (_, score) in scored.iter_mut() {
            *score = even;
        }
    }

    let lines = scored
        .into_iter()
        .map(|(holding, weight)| AllocationLine {
            ticker: holding.ticker.clone(),
            weight,
            amount: pool * weight,
        })
        .collect();

    Ok(AllocationPlan {
        policy,
        pool,
        lines,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseLine {
    pub ticker: String,
    pub amount: f64,
    pub unit_price: f64,
    pub units: u64,
    pub spent: f64,
    pub remainder: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PurchasePlan {
    pub lines: Vec<PurchaseLine>,
}

impl PurchasePlan {
    pub fn total_units(&self) -> u64 {
        self.lines.iter().map(|l| l.units).sum()
    }

    pub fn total_spent(&self) -> f64 {
        self.lines.iter().map(|l| l.spent).sum()
    }

    pub fn total_remainder(&self) -> f64 {
        self.lines.iter().map(|l| l.remainder).sum()
    }
}

/// Price per unit for every holding, falling back to the average cost when
/// no market price is known.
pub fn unit_prices(portfolio: &Portfolio) -> HashMap<String, f64> {
    portfolio
        .iter()
        .map(|h| (h.ticker.clone(), h.unit_price()))
        .collect()
}

/// Turns a plan into whole-unit purchases, keeping what cannot buy a full unit
/// as the remainder. A non-positive price buys nothing.
pub fn plan_purchases(
    plan: &AllocationPlan,
    prices: &HashMap<String, f64>,
) -> Result<PurchasePlan> {
    let mut lines = Vec::with_capacity(plan.lines.len());

    for line in &plan.lines {
        let unit_price = *prices
            .get(&line.ticker)
            .ok_or_else(|| Error::missing_column(format!("price for {}", line.ticker)))?;

        let whole = if unit_price > 0.0 && line.amount > 0.0 {
            (line.amount / unit_price).floor()
        } else {
            0.0
        };
        // A price small enough to overflow the unit count buys nothing.
        let units = if whole.is_finite() && whole < u64::MAX as f64 {
            whole as u64
        } else {
            0
        };
        let spent = units as f64 * unit_price;
        let remainder = (line.amount - spent).max(0.0);
        debug!(
            "{}: {} at {unit_price} buys {units} units, {remainder} left",
            line.ticker, line.amount
        );

        lines.push(PurchaseLine {
            ticker: line.ticker.clone(),
            amount: line.amount,
            unit_price,
            units,
            spent,
            remainder,
        });
    }

    Ok(PurchasePlan { lines })
}

/// Returns the portfolio after the purchases, with quantities increased and
/// average costs re-weighted by the purchase price.
pub fn apply_purchases(portfolio: &Portfolio, purchases: &PurchasePlan) -> Portfolio {
    Portfolio::from_holdings(portfolio.iter().map(|holding| {
        let Some(purchase) = purchases
            .lines
            .iter()
            .find(|p| p.ticker == holding.ticker && p.units > 0)
        else {
            return holding.clone();
        };

        let bought = purchase.units as f64;
        let quantity = holding.quantity + bought;
        let average_cost = if quantity > 0.0 {
            (holding.invested_value() + bought * purchase.unit_price) / quantity
        } else {
            holding.average_cost
        };

        Holding {
            quantity,
            average_cost,
            ..holding.clone()
        }
    }))
}

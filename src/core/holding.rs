//! Holdings and the portfolio that owns them.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A position in a single fund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub quantity: f64,
    pub average_cost: f64,
    /// Distribution paid per unit each month.
    pub monthly_distribution: f64,
    /// Last known market price per unit, when the input carries one.
    #[serde(default)]
    pub current_price: Option<f64>,
}

impl Holding {
    pub fn new(ticker: &str, quantity: f64, average_cost: f64, monthly_distribution: f64) -> Self {
        Self {
            ticker: normalize_ticker(ticker),
            quantity,
            average_cost,
            monthly_distribution,
            current_price: None,
        }
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    pub fn invested_value(&self) -> f64 {
        self.quantity * self.average_cost
    }

    pub fn monthly_income(&self) -> f64 {
        self.quantity * self.monthly_distribution
    }

    /// Monthly income over invested value, zero for a position with no cost basis.
    pub fn monthly_yield(&self) -> f64 {
        let invested = self.invested_value();
        if invested > 0.0 {
            self.monthly_income() / invested
        } else {
            0.0
        }
    }

    /// Price used for valuation and purchases: the market price if known,
    /// the average cost otherwise.
    pub fn unit_price(&self) -> f64 {
        self.current_price.unwrap_or(self.average_cost)
    }

    pub fn market_value(&self) -> f64 {
        self.quantity * self.unit_price()
    }
}

pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Ordered holdings, unique by ticker.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    holdings: Vec<Holding>,
}

impl Portfolio {
    /// Builds a portfolio, letting a later holding replace an earlier one with
    /// the same ticker while keeping the earlier position in the order.
    pub fn from_holdings(holdings: impl IntoIterator<Item = Holding>) -> Self {
        let mut portfolio = Self::default();
        for holding in holdings {
            portfolio.upsert(holding);
        }
        portfolio
    }

    fn upsert(&mut self, holding: Holding) {
        match self
            .holdings
            .iter_mut()
            .find(|existing| existing.ticker == holding.ticker)
        {
            Some(existing) => {
                debug!("Duplicate ticker {}, keeping the last row", holding.ticker);
                *existing = holding;
            }
            None => self.holdings.push(holding),
        }
    }

    pub fn holdings(&self) -> &[Holding] {
        &self.holdings
    }

    pub fn iter(&self) -> impl Iterator<Item = &Holding> {
        self.holdings.iter()
    }

    pub fn get(&self, ticker: &str) -> Option<&Holding> {
        let ticker = normalize_ticker(ticker);
        self.holdings.iter().find(|h| h.ticker == ticker)
    }

    pub fn len(&self) -> usize {
        self.holdings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holdings.is_empty()
    }

    pub fn total_invested(&self) -> f64 {
        self.holdings.iter().map(Holding::invested_value).sum()
    }

    pub fn total_monthly_income(&self) -> f64 {
        self.holdings.iter().map(Holding::monthly_income).sum()
    }
}

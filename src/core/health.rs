//! Rule-based diagnosis of a portfolio: concentration, yield and growth signals.

use crate::core::analytics::{aggregate, weighted_mean_yield};
use crate::core::error::Result;
use crate::core::holding::Portfolio;
use serde::Serialize;
use std::fmt::Display;

/// Monthly income below which growth still depends mostly on reinvesting.
pub const INCOME_AUTONOMY_THRESHOLD: f64 = 1000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Finding {
    fn new(severity: Severity, title: &str, message: String) -> Self {
        Self {
            severity,
            title: title.to_string(),
            message,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Priority::High => "High",
                Priority::Medium => "Medium",
                Priority::Low => "Low",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub title: String,
    pub description: String,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HealthStatus {
    Excellent,
    Good,
    Attention,
    Critical,
}

impl HealthStatus {
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => HealthStatus::Excellent,
            60..=79 => HealthStatus::Good,
            40..=59 => HealthStatus::Attention,
            _ => HealthStatus::Critical,
        }
    }
}

impl Display for HealthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                HealthStatus::Excellent => "Excellent",
                HealthStatus::Good => "Good",
                HealthStatus::Attention => "Attention",
                HealthStatus::Critical => "Critical",
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthMetrics {
    pub asset_count: usize,
    /// Herfindahl-Hirschman index over percentage weights (0 to 10000).
    pub hhi: f64,
    /// Largest position as a percentage of total invested value.
    pub max_concentration: f64,
    /// Blended monthly yield, in percent.
    pub blended_yield_pct: f64,
    /// Sample standard deviation of holding yields, in percentage points.
    pub yield_std_dev_pct: f64,
    /// Months for reinvested wealth to double at the blended yield; 0 when it never does.
    pub months_to_double: f64,
    pub monthly_income: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub score: u32,
    pub status: HealthStatus,
    pub metrics: HealthMetrics,
    pub insights: Vec<Finding>,
    pub alerts: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
    pub monthly_insight: String,
}

/// Analyzes the portfolio. Fails when nothing is invested.
pub fn analyze(portfolio: &Portfolio) -> Result<HealthReport> {
    let aggregates = aggregate(portfolio.holdings())?;
    let total_invested = aggregates.total_invested;
    let blended_yield = weighted_mean_yield(portfolio.holdings())?;
    let asset_count = portfolio.len();

    let weights: Vec<f64> = portfolio
        .iter()
        .map(|h| h.invested_value() / total_invested * 100.0)
        .collect();
    let yields: Vec<f64> = portfolio.iter().map(|h| h.monthly_yield()).collect();

    let max_concentration = weights.iter().copied().fold(0.0, f64::max);
    let hhi: f64 = weights.iter().map(|w| w * w).sum();
    let mean_yield = yields.iter().sum::<f64>() / asset_count as f64;
    let yield_std_dev = sample_std_dev(&yields, mean_yield);
    let months_to_double = if blended_yield > 0.0 {
        2f64.ln() / (1.0 + blended_yield).ln()
    } else {
        0.0
    };

    let mut score: i32 = 100;
    let mut insights = Vec::new();
    let mut alerts = Vec::new();

    if max_concentration > 30.0 {
        alerts.push(Finding::new(
            Severity::Warning,
            "High Concentration",
            format!(
                "Largest position is {max_concentration:.1}% of the portfolio. Consider diversifying."
            ),
        ));
        score -= 10;
    } else if max_concentration < 10.0 && asset_count < 8 {
        insights.push(Finding::new(
            Severity::Info,
            "Well Balanced Portfolio",
            format!("Balanced distribution across {asset_count} assets."),
        ));
    }

    if hhi > 2000.0 {
        alerts.push(Finding::new(
            Severity::Warning,
            "High Concentration (HHI)",
            format!("Herfindahl index is {hhi:.0}. Ideally below 1500."),
        ));
    }

    let blended_yield_pct = blended_yield * 100.0;
    if blended_yield_pct < 0.8 {
        alerts.push(Finding::new(
            Severity::Error,
            "Low Average Yield",
            format!("Average yield of {blended_yield_pct:.2}% a month may fall short of the income goal."),
        ));
        score -= 15;
    } else {
        insights.push(Finding::new(
            Severity::Success,
            "Adequate Yield",
            format!("Average yield of {blended_yield_pct:.2}% a month is in line with the income goal."),
        ));
    }

    let yield_std_dev_pct = yield_std_dev * 100.0;
    if yield_std_dev_pct > 3.0 {
        let min = yields.iter().copied().fold(f64::INFINITY, f64::min) * 100.0;
        let max = yields.iter().copied().fold(f64::NEG_INFINITY, f64::max) * 100.0;
        insights.push(Finding::new(
            Severity::Info,
            "Yield Disparity",
            format!("Yields range widely ({min:.2}% to {max:.2}%). Consider rebalancing."),
        ));
    }

    if asset_count < 5 {
        alerts.push(Finding::new(
            Severity::Warning,
            "Low Diversification",
            format!("Only {asset_count} assets. Consider adding more funds to reduce risk."),
        ));
        score -= 10;
    } else if asset_count >= 10 {
        insights.push(Finding::new(
            Severity::Success,
            "Adequate Diversification",
            format!("{asset_count} assets give good diversification."),
        ));
    }

    let underperformers: Vec<&str> = portfolio
        .iter()
        .filter(|h| h.monthly_yield() < mean_yield * 0.7)
        .map(|h| h.ticker.as_str())
        .collect();
    if !underperformers.is_empty() {
        alerts.push(Finding::new(
            Severity::Warning,
            "Underperforming Assets",
            format!("Review {}: yield below the average.", underperformers.join(", ")),
        ));
    }

    insights.push(Finding::new(
        Severity::Info,
        "Organic Growth",
        format!(
            "Reinvesting, the portfolio doubles in about {months_to_double:.0} months ({:.1} years).",
            months_to_double / 12.0
        ),
    ));

    let score = score.clamp(0, 100) as u32;
    let monthly_income = aggregates.total_income;

    Ok(HealthReport {
        score,
        status: HealthStatus::from_score(score),
        metrics: HealthMetrics {
            asset_count,
            hhi,
            max_concentration,
            blended_yield_pct,
            yield_std_dev_pct,
            months_to_double,
            monthly_income,
        },
        insights,
        alerts,
        recommendations: recommendations(asset_count, blended_yield_pct, monthly_income),
        monthly_insight: monthly_insight(monthly_income).to_string(),
    })
}

fn recommendations(
    asset_count: usize,
    blended_yield_pct: f64,
    monthly_income: f64,
) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    if asset_count < 8 {
        recommendations.push(Recommendation {
            priority: Priority::High,
            category: "Diversification".to_string(),
            title: "Increase Diversification".to_string(),
            description: format!(
                "Add {} more funds to reduce specific risk.",
                8 - asset_count
            ),
            action: "Direct new contributions to different segments".to_string(),
        });
    }

    if blended_yield_pct < 1.0 {
        recommendations.push(Recommendation {
            priority: Priority::Medium,
            category: "Returns".to_string(),
            title: "Improve Yield".to_string(),
            description: format!(
                "Current yield of {blended_yield_pct:.2}% could improve with rebalancing."
            ),
            action: "Review the lowest yielding funds and consider replacing them".to_string(),
        });
    }

    if monthly_income > 0.0 {
        recommendations.push(Recommendation {
            priority: Priority::Low,
            category: "Strategy".to_string(),
            title: "Automatic Reinvestment".to_string(),
            description: format!(
                "With {monthly_income:.2} a month in distributions, keep reinvesting."
            ),
            action: "Keep reinvesting distributions for organic growth".to_string(),
        });
    }

    recommendations
}

/// Canned insight for the month, based only on the income level.
pub fn monthly_insight(monthly_income: f64) -> &'static str {
    if monthly_income < INCOME_AUTONOMY_THRESHOLD {
        "Income still depends heavily on reinvestment. Staying consistent now has an exponential effect in the medium term."
    } else {
        "The portfolio already provides income autonomy. Rebalancing now matters more than growth."
    }
}

fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use crate::core::holding::Holding;

    fn titles(findings: &[Finding]) -> Vec<&str> {
        findings.iter().map(|f| f.title.as_str()).collect()
    }

    #[test]
    fn test_concentrated_two_fund_portfolio() {
        let portfolio = Portfolio::from_holdings(vec![
            Holding::new("A", 100.0, 100.0, 1.0),
            Holding::new("B", 50.0, 200.0, 3.0),
        ]);
        let report = analyze(&portfolio).unwrap();

        assert_eq!(report.metrics.asset_count, 2);
        assert!((report.metrics.hhi - 5000.0).abs() < 1e-6);
        assert!((report.metrics.max_concentration - 50.0).abs() < 1e-9);
        assert!((report.metrics.blended_yield_pct - 1.25).abs() < 1e-9);
        let aggregates = aggregate(portfolio.holdings()).unwrap();
        let expected_pct = aggregates.blended_yield * 100.0;
        assert!((report.metrics.blended_yield_pct - expected_pct).abs() < 1e-9);
        // ln 2 / ln 1.0125
        assert!((report.metrics.months_to_double - 55.797).abs() < 0.01);

        let alerts = titles(&report.alerts);
        assert!(alerts.contains(&"High Concentration"));
        assert!(alerts.contains(&"High Concentration (HHI)"));
        assert!(alerts.contains(&"Low Diversification"));
        // Concentration and asset count cost 10 points each.
        assert_eq!(report.score, 80);
        assert_eq!(report.status, HealthStatus::Excellent);
        assert!(titles(&report.insights).contains(&"Adequate Yield"));
        assert_eq!(report.recommendations[0].priority, Priority::High);
        assert!(report.monthly_insight.starts_with("Income still depends"));
    }

    #[test]
    fn test_low_yield_and_underperformers() {
        let portfolio = Portfolio::from_holdings(vec![
            Holding::new("A", 10.0, 100.0, 0.5),
            Holding::new("B", 10.0, 100.0, 0.6),
            Holding::new("C", 10.0, 100.0, 0.1),
        ]);
        let report = analyze(&portfolio).unwrap();

        // 100 - 10 (concentration) - 15 (yield) - 10 (few assets)
        assert_eq!(report.score, 65);
        assert_eq!(report.status, HealthStatus::Good);
        let underperformers = report
            .alerts
            .iter()
            .find(|f| f.title == "Underperforming Assets")
            .unwrap();
        assert!(underperformers.message.contains('C'));
        assert!(!underperformers.message.contains('A'));
        assert!(
            report
                .recommendations
                .iter()
                .any(|r| r.priority == Priority::Medium)
        );
    }

    #[test]
    fn test_diversified_portfolio() {
        let holdings = (0..10).map(|i| Holding::new(&format!("F{i:02}11"), 10.0, 100.0, 1.0));
        let report = analyze(&Portfolio::from_holdings(holdings)).unwrap();

        assert_eq!(report.score, 100);
        assert!(report.alerts.is_empty());
        assert!(titles(&report.insights).contains(&"Adequate Diversification"));
        assert!((report.metrics.hhi - 1000.0).abs() < 1e-6);
        assert!(report.metrics.yield_std_dev_pct < 1e-12);
    }

    #[test]
    fn test_zero_yield_never_doubles() {
        let portfolio = Portfolio::from_holdings(vec![Holding::new("A", 10.0, 100.0, 0.0)]);
        let report = analyze(&portfolio).unwrap();
        assert_eq!(report.metrics.months_to_double, 0.0);
    }

    #[test]
    fn test_empty_portfolio_is_rejected() {
        assert!(matches!(
            analyze(&Portfolio::default()),
            Err(Error::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_status_bands() {
        assert_eq!(HealthStatus::from_score(100), HealthStatus::Excellent);
        assert_eq!(HealthStatus::from_score(60), HealthStatus::Good);
        assert_eq!(HealthStatus::from_score(45), HealthStatus::Attention);
        assert_eq!(HealthStatus::from_score(10), HealthStatus::Critical);
    }

    #[test]
    fn test_monthly_insight_threshold() {
        assert!(monthly_insight(999.99).starts_with("Income still depends"));
        assert!(monthly_insight(1000.0).starts_with("The portfolio already"));
    }
}

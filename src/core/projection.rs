//! Forward simulation of portfolio income and wealth.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionPolicy {
    /// Income is spent; wealth and income stay flat.
    Static,
    /// Income is added to wealth before the next month's income is computed.
    Reinvest,
}

impl Display for ProjectionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                ProjectionPolicy::Static => "static",
                ProjectionPolicy::Reinvest => "reinvest",
            }
        )
    }
}

impl FromStr for ProjectionPolicy {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "static" => Ok(ProjectionPolicy::Static),
            "reinvest" => Ok(ProjectionPolicy::Reinvest),
            _ => Err(Error::InvalidPolicy {
                name: s.to_string(),
                expected: "static, reinvest".to_string(),
            }),
        }
    }
}

/// State of the simulated portfolio at the start of a month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProjectionPoint {
    pub month: u32,
    pub income: f64,
    pub wealth: f64,
}

/// Projects `months` points starting at month 1.
///
/// The yield is fixed at `initial_income / initial_wealth` for the whole
/// horizon. With a zero yield the reinvest policy behaves like the static one.
pub fn project(
    initial_wealth: f64,
    initial_income: f64,
    months: u32,
    policy: ProjectionPolicy,
) -> Result<Vec<ProjectionPoint>> {
    if months == 0 {
        return Err(Error::NonPositiveHorizon);
    }
    if !initial_wealth.is_finite() || initial_wealth < 0.0 {
        return Err(Error::invalid_value(
            "initial_wealth",
            format!("{initial_wealth} is not a non-negative amount"),
        ));
    }
    if !initial_income.is_finite() || initial_income < 0.0 {
        return Err(Error::invalid_value(
            "initial_income",
            format!("{initial_income} is not a non-negative amount"),
        ));
    }

    let blended_yield = if initial_wealth > 0.0 {
        initial_income / initial_wealth
    } else {
        0.0
    };
    debug!("Projecting {months} months with policy={policy}, yield={blended_yield}");

    let mut wealth = initial_wealth;
    let mut income = initial_income;
    let mut points = Vec::with_capacity(months as usize);

    for month in 1..=months {
        points.push(ProjectionPoint {
            month,
            income,
            wealth,
        });

        if policy == ProjectionPolicy::Reinvest && blended_yield > 0.0 {
            wealth += income;
            income = wealth * blended_yield;
        }
    }

    Ok(points)
}

/// Checks a requested horizon against the configured maximum.
pub fn validate_horizon(months: u32, max: u32) -> Result<u32> {
    if months == 0 {
        return Err(Error::NonPositiveHorizon);
    }
    if months > max {
        return Err(Error::HorizonTooLong { months, max });
    }
    Ok(months)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_policy_keeps_income_flat() {
        let points = project(20000.0, 250.0, 24, ProjectionPolicy::Static).unwrap();

        assert_eq!(points.len(), 24);
        assert_eq!(points[0].month, 1);
        assert_eq!(points[23].month, 24);
        assert!(points.iter().all(|p| p.income == 250.0));
        assert!(points.iter().all(|p| p.wealth == 20000.0));
    }

    #[test]
    fn test_reinvest_policy_compounds() {
        let points = project(20000.0, 250.0, 60, ProjectionPolicy::Reinvest).unwrap();

        assert_eq!(points.len(), 60);
        assert_eq!(points[0].wealth, 20000.0);
        assert_eq!(points[0].income, 250.0);
        assert_eq!(points[1].wealth, 20250.0);
        assert!((points[1].income - 20250.0 * 0.0125).abs() < 1e-9);
        assert!(points.windows(2).all(|w| w[1].wealth > w[0].wealth));
        // Wealth after n reinvested months is W * (1 + y)^(n - 1).
        let expected = 20000.0 * 1.0125_f64.powi(59);
        assert!((points[59].wealth - expected).abs() < 1e-6);
    }

    #[test]
    fn test_reinvest_with_zero_yield_degenerates_to_static() {
        let reinvest = project(10000.0, 0.0, 36, ProjectionPolicy::Reinvest).unwrap();
        let flat = project(10000.0, 0.0, 36, ProjectionPolicy::Static).unwrap();

        assert_eq!(reinvest, flat);
        assert!(reinvest.iter().all(|p| p.wealth == 10000.0));
    }

    #[test]
    fn test_reinvest_with_no_wealth_does_not_grow() {
        let points = project(0.0, 50.0, 12, ProjectionPolicy::Reinvest).unwrap();
        assert!(points.iter().all(|p| p.wealth == 0.0 && p.income == 50.0));
    }

    #[test]
    fn test_projection_is_deterministic() {
        let a = project(12345.0, 111.0, 120, ProjectionPolicy::Reinvest).unwrap();
        let b = project(12345.0, 111.0, 120, ProjectionPolicy::Reinvest).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rejects_zero_horizon() {
        assert!(matches!(
            project(100.0, 1.0, 0, ProjectionPolicy::Static),
            Err(Error::NonPositiveHorizon)
        ));
    }

    #[test]
    fn test_rejects_negative_wealth() {
        assert!(matches!(
            project(-1.0, 1.0, 12, ProjectionPolicy::Static),
            Err(Error::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_validate_horizon() {
        assert_eq!(validate_horizon(60, 120).unwrap(), 60);
        assert!(matches!(
            validate_horizon(0, 120),
            Err(Error::NonPositiveHorizon)
        ));
        assert!(matches!(
            validate_horizon(121, 120),
            Err(Error::HorizonTooLong {
                months: 121,
                max: 120
            })
        ));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "Reinvest".parse::<ProjectionPolicy>().unwrap(),
            ProjectionPolicy::Reinvest
        );
        assert!(matches!(
            "compound".parse::<ProjectionPolicy>(),
            Err(Error::InvalidPolicy { .. })
        ));
    }
}

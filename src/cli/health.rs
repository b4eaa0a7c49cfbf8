use super::ui;
use crate::core::config::DisplayConfig;
use crate::core::health::{self, Finding, HealthReport, HealthStatus, Severity};
use crate::core::holding::Portfolio;
use anyhow::Result;
use comfy_table::{Cell, Color};

fn status_style(status: HealthStatus) -> ui::StyleType {
    match status {
        HealthStatus::Excellent | HealthStatus::Good => ui::StyleType::TotalValue,
        HealthStatus::Attention => ui::StyleType::Warning,
        HealthStatus::Critical => ui::StyleType::Error,
    }
}

fn format_finding(finding: &Finding) -> String {
    let (marker, style) = match finding.severity {
        Severity::Info => ("i", ui::StyleType::Subtle),
        Severity::Success => ("+", ui::StyleType::TotalValue),
        Severity::Warning => ("!", ui::StyleType::Warning),
        Severity::Error => ("x", ui::StyleType::Error),
    };
    format!(
        "  {}\n    {}",
        ui::style_text(&format!("[{marker}] {}", finding.title), style),
        finding.message
    )
}

pub fn display_report(report: &HealthReport, display: &DisplayConfig) -> String {
    let metrics = &report.metrics;
    let mut output = format!(
        "{}\n\nScore: {} ({})\n",
        ui::style_text("Portfolio Health", ui::StyleType::Title),
        ui::style_text(&format!("{}/100", report.score), ui::StyleType::TotalLabel),
        ui::style_text(&report.status.to_string(), status_style(report.status)),
    );

    let mut table = ui::new_styled_table(display);
    table.set_header(vec![ui::header_cell("Metric"), ui::header_cell("Value")]);
    let rows = [
        ("Assets", metrics.asset_count.to_string()),
        ("Herfindahl index", format!("{:.0}", metrics.hhi)),
        ("Largest position", format!("{:.1}%", metrics.max_concentration)),
        ("Blended yield", format!("{:.2}% a month", metrics.blended_yield_pct)),
        ("Yield dispersion", format!("{:.2} pp", metrics.yield_std_dev_pct)),
        ("Monthly income", ui::format_money(metrics.monthly_income, display)),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    table.add_row(vec![
        Cell::new("Months to double"),
        if metrics.months_to_double > 0.0 {
            Cell::new(format!("{:.0}", metrics.months_to_double))
        } else {
            ui::na_cell(false)
        },
    ]);
    output.push_str(&format!("\n{table}\n"));

    for (title, findings) in [("Alerts", &report.alerts), ("Insights", &report.insights)] {
        if findings.is_empty() {
            continue;
        }
        output.push_str(&format!(
            "\n{}\n",
            ui::style_text(title, ui::StyleType::TotalLabel)
        ));
        for finding in findings {
            output.push_str(&format_finding(finding));
            output.push('\n');
        }
    }

    if !report.recommendations.is_empty() {
        let mut recs = ui::new_styled_table(display);
        recs.set_header(vec![
            ui::header_cell("Priority"),
            ui::header_cell("Category"),
            ui::header_cell("Recommendation"),
            ui::header_cell("Action"),
        ]);
        for rec in &report.recommendations {
            let color = match rec.priority {
                health::Priority::High => Color::Red,
                health::Priority::Medium => Color::Yellow,
                health::Priority::Low => Color::Green,
            };
            recs.add_row(vec![
                Cell::new(rec.priority).fg(color),
                Cell::new(&rec.category),
                Cell::new(format!("{}\n{}", rec.title, rec.description)),
                Cell::new(&rec.action),
            ]);
        }
        output.push_str(&format!(
            "\n{}\n\n{recs}\n",
            ui::style_text("Recommendations", ui::StyleType::TotalLabel)
        ));
    }

    output.push_str(&format!(
        "\n{}",
        ui::style_text(&report.monthly_insight, ui::StyleType::Subtle)
    ));
    output
}

pub fn run(portfolio: &Portfolio, display: &DisplayConfig) -> Result<()> {
    let report = health::analyze(portfolio)?;
    tracing::debug!("Health score {} ({})", report.score, report.status);
    println!("{}", display_report(&report, display));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holding::Holding;

    #[test]
    fn test_display_report() {
        console::set_colors_enabled(false);
        let portfolio = Portfolio::from_holdings(vec![
            Holding::new("A", 100.0, 100.0, 1.0),
            Holding::new("B", 50.0, 200.0, 3.0),
        ]);
        let display = DisplayConfig {
            color: false,
            ..DisplayConfig::default()
        };
        let report = health::analyze(&portfolio).unwrap();
        let output = display_report(&report, &display);

        assert!(output.contains("Portfolio Health"));
        assert!(output.contains(&format!("{}/100", report.score)));
        assert!(output.contains("[!] High Concentration"));
        assert!(output.contains("Low Diversification"));
        assert!(output.contains("Increase Diversification"));
        assert!(output.contains(health::monthly_insight(250.0)));
    }

    #[test]
    fn test_zero_yield_never_doubles() {
        console::set_colors_enabled(false);
        let portfolio = Portfolio::from_holdings(vec![Holding::new("A", 10.0, 100.0, 0.0)]);
        let report = health::analyze(&portfolio).unwrap();
        let output = display_report(&report, &DisplayConfig::default());
        assert!(output.contains("Months to double"));
        assert!(output.contains("N/A"));
    }
}

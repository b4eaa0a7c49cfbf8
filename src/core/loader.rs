//! Reads and writes the holdings file.
//!
//! Headers are resolved once through a declarative alias table, so the rest
//! of the crate only ever sees the canonical schema. Rows with a missing
//! required value fail the whole load instead of being dropped.

use crate::core::error::{Error, Result};
use crate::core::holding::{Holding, Portfolio};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::collections::{BTreeMap, HashMap};
use std::fmt::Display;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

/// Canonical columns of the holdings file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    Ticker,
    Quantity,
    AverageCost,
    MonthlyDistribution,
    CurrentPrice,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Ticker,
        Field::Quantity,
        Field::AverageCost,
        Field::MonthlyDistribution,
        Field::CurrentPrice,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Field::Ticker => "ticker",
            Field::Quantity => "quantity",
            Field::AverageCost => "average_cost",
            Field::MonthlyDistribution => "monthly_distribution",
            Field::CurrentPrice => "current_price",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Field::CurrentPrice)
    }

    fn builtin_aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Ticker => &["ticker", "symbol", "codigo", "código", "ativo", "fii", "papel"],
            Field::Quantity => &["quantity", "qty", "units", "quantidade", "qtd", "cotas"],
            Field::AverageCost => &[
                "average_cost",
                "avg_cost",
                "cost",
                "preco_medio",
                "preço_médio",
                "preço_medio",
                "pm",
            ],
            Field::MonthlyDistribution => &[
                "monthly_distribution",
                "distribution",
                "dividend",
                "monthly_dividend",
                "dividendo_mensal",
                "dividendo",
                "rendimento",
                "provento",
            ],
            Field::CurrentPrice => &[
                "current_price",
                "price",
                "market_price",
                "preco_atual",
                "preço_atual",
                "cotacao",
                "cotação",
            ],
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let normalized = normalize_header(s);
        Field::ALL
            .into_iter()
            .find(|f| f.name() == normalized)
            .ok_or_else(|| Error::invalid_value("column", format!("unknown field '{s}'")))
    }
}

/// Lowercases a header and folds spaces and hyphens into underscores.
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
}

/// Mapping from accepted header spellings to canonical fields.
#[derive(Debug, Clone)]
pub struct ColumnAliases {
    aliases: HashMap<String, Field>,
}

impl Default for ColumnAliases {
    fn default() -> Self {
        let aliases = Field::ALL
            .iter()
            .flat_map(|field| {
                field
                    .builtin_aliases()
                    .iter()
                    .map(move |alias| (normalize_header(alias), *field))
            })
            .collect();
        Self { aliases }
    }
}

impl ColumnAliases {
    /// Extends the built-in table with extra spellings keyed by canonical field name.
    pub fn with_extra(extra: &BTreeMap<String, Vec<String>>) -> Result<Self> {
        let mut table = Self::default();
        for (field_name, spellings) in extra {
            let field: Field = field_name.parse()?;
            for spelling in spellings {
                table.aliases.insert(normalize_header(spelling), field);
            }
        }
        Ok(table)
    }

    pub fn field_for(&self, header: &str) -> Option<Field> {
        self.aliases.get(&normalize_header(header)).copied()
    }

    /// Finds the column index of every field present in `headers`. The first
    /// matching column wins when several resolve to the same field.
    fn resolve(&self, headers: &StringRecord) -> Result<BTreeMap<Field, usize>> {
        let mut columns = BTreeMap::new();
        for (index, header) in headers.iter().enumerate() {
            match self.field_for(header) {
                Some(field) => {
                    columns.entry(field).or_insert(index);
                }
                None => debug!("Ignoring unknown column '{header}'"),
            }
        }

        if let Some(missing) = Field::ALL
            .iter()
            .find(|f| f.is_required() && !columns.contains_key(f))
        {
            return Err(Error::missing_column(missing.name()));
        }
        Ok(columns)
    }
}

fn detect_delimiter(content: &str) -> u8 {
    let header = content.lines().next().unwrap_or_default();
    if header.matches(';').count() > header.matches(',').count() {
        b';'
    } else {
        b','
    }
}

/// Parses an amount written with either `.` or `,` as the decimal separator,
/// optionally prefixed by a currency symbol.
fn parse_amount(raw: &str, field: Field, row: usize) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches("R$")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    let value: f64 = normalized.parse().map_err(|_| {
        Error::invalid_value(field.name(), format!("'{raw}' in row {row} is not a number"))
    })?;
    if !value.is_finite() || value < 0.0 {
        return Err(Error::invalid_value(
            field.name(),
            format!("'{raw}' in row {row} must be a non-negative amount"),
        ));
    }
    Ok(value)
}

fn cell<'r>(
    record: &'r StringRecord,
    columns: &BTreeMap<Field, usize>,
    field: Field,
) -> Option<&'r str> {
    columns
        .get(&field)
        .and_then(|&index| record.get(index))
        .filter(|value| !value.trim().is_empty())
}

fn required_cell<'r>(
    record: &'r StringRecord,
    columns: &BTreeMap<Field, usize>,
    field: Field,
    row: usize,
) -> Result<&'r str> {
    cell(record, columns, field).ok_or_else(|| Error::missing_cell(field.name(), row))
}

/// Reads holdings from delimited text. Rows are numbered from 1, excluding the header.
pub fn read_portfolio<R: Read>(mut reader: R, aliases: &ColumnAliases) -> Result<Portfolio> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;

    let mut csv_reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(&content))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(content.as_bytes());

    let columns = aliases.resolve(csv_reader.headers()?)?;
    debug!("Resolved columns: {columns:?}");

    let mut holdings = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record?;
        let row = index + 1;

        let ticker = required_cell(&record, &columns, Field::Ticker, row)?;
        let quantity = parse_amount(
            required_cell(&record, &columns, Field::Quantity, row)?,
            Field::Quantity,
            row,
        )?;
        let average_cost = parse_amount(
            required_cell(&record, &columns, Field::AverageCost, row)?,
            Field::AverageCost,
            row,
        )?;
        let monthly_distribution = parse_amount(
            required_cell(&record, &columns, Field::MonthlyDistribution, row)?,
            Field::MonthlyDistribution,
            row,
        )?;

        let mut holding = Holding::new(ticker, quantity, average_cost, monthly_distribution);
        if let Some(price) = cell(&record, &columns, Field::CurrentPrice) {
            holding = holding.with_current_price(parse_amount(price, Field::CurrentPrice, row)?);
        }
        holdings.push(holding);
    }

    Ok(Portfolio::from_holdings(holdings))
}

pub fn load_portfolio<P: AsRef<Path>>(path: P, aliases: &ColumnAliases) -> Result<Portfolio> {
    let file = fs::File::open(path.as_ref())?;
    let portfolio = read_portfolio(file, aliases)?;
    info!(
        "Loaded {} holdings from {}",
        portfolio.len(),
        path.as_ref().display()
    );
    Ok(portfolio)
}

/// Writes the portfolio using the canonical headers.
pub fn write_portfolio<W: Write>(writer: W, portfolio: &Portfolio) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for holding in portfolio.iter() {
        csv_writer.serialize(holding)?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn save_portfolio<P: AsRef<Path>>(path: P, portfolio: &Portfolio) -> Result<()> {
    let file = fs::File::create(path.as_ref())?;
    write_portfolio(file, portfolio)?;
    info!(
        "Saved {} holdings to {}",
        portfolio.len(),
        path.as_ref().display()
    );
    Ok(())
}

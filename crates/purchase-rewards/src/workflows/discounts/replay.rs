use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use super::domain::{Customer, CustomerId, MoneyCents, PurchaseEvent};

#[derive(Debug)]
pub enum ReplayError {
    Io(std::io::Error),
    Csv(csv::Error),
    InvalidAmount { row: usize, value: String },
    InvalidTimestamp { row: usize, value: String },
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplayError::Io(err) => write!(f, "failed to read replay file: {}", err),
            ReplayError::Csv(err) => write!(f, "invalid replay CSV data: {}", err),
            ReplayError::InvalidAmount { row, value } => {
                write!(f, "row {}: '{}' is not a dollar amount", row, value)
            }
            ReplayError::InvalidTimestamp { row, value } => {
                write!(f, "row {}: '{}' is not an RFC 3339 timestamp", row, value)
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReplayError::Io(err) => Some(err),
            ReplayError::Csv(err) => Some(err),
            ReplayError::InvalidAmount { .. } | ReplayError::InvalidTimestamp { .. } => None,
        }
    }
}

impl From<std::io::Error> for ReplayError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ReplayError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

#[derive(Debug, Deserialize)]
struct CustomerRow {
    id: String,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    registered_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PurchaseRow {
    customer_id: String,
    amount: String,
    timestamp: String,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|raw| !raw.trim().is_empty()))
}

fn reader_for<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

/// Reads `id,name[,registered_at]` rows. Rows without a registration time are registered at
/// `default_registered_at`.
pub fn parse_customers<R: Read>(
    reader: R,
    default_registered_at: DateTime<Utc>,
) -> Result<Vec<Customer>, ReplayError> {
    let mut customers = Vec::new();

    for (index, row) in reader_for(reader).deserialize::<CustomerRow>().enumerate() {
        let row = row?;
        let registered_at = match row.registered_at {
            Some(raw) => parse_timestamp(index + 1, &raw)?,
            None => default_registered_at,
        };
        customers.push(Customer::new(CustomerId(row.id), row.name, registered_at));
    }

    Ok(customers)
}

/// Reads `customer_id,amount,timestamp` rows; amounts are dollars such as `49.99`.
pub fn parse_purchases<R: Read>(reader: R) -> Result<Vec<PurchaseEvent>, ReplayError> {
    let mut purchases = Vec::new();

    for (index, row) in reader_for(reader).deserialize::<PurchaseRow>().enumerate() {
        let row = row?;
        let line = index + 1;
        purchases.push(PurchaseEvent {
            customer_id: CustomerId(row.customer_id),
            amount: parse_amount(line, &row.amount)?,
            timestamp: parse_timestamp(line, &row.timestamp)?,
        });
    }

    Ok(purchases)
}

pub fn load_customers(
    path: &Path,
    default_registered_at: DateTime<Utc>,
) -> Result<Vec<Customer>, ReplayError> {
    parse_customers(File::open(path)?, default_registered_at)
}

pub fn load_purchases(path: &Path) -> Result<Vec<PurchaseEvent>, ReplayError> {
    parse_purchases(File::open(path)?)
}

fn parse_timestamp(row: usize, raw: &str) -> Result<DateTime<Utc>, ReplayError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|_| ReplayError::InvalidTimestamp {
            row,
            value: raw.to_string(),
        })
}

/// Parses `123`, `123.4` or `123.45` (optionally prefixed with `$`) into cents.
pub(crate) fn parse_amount(row: usize, raw: &str) -> Result<MoneyCents, ReplayError> {
    let invalid = || ReplayError::InvalidAmount {
        row,
        value: raw.to_string(),
    };
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('$').unwrap_or(trimmed);

    let (whole, fraction) = match trimmed.split_once('.') {
        Some((whole, fraction)) => (whole, fraction),
        None => (trimmed, ""),
    };
    if whole.is_empty()
        || fraction.len() > 2
        || !whole.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let dollars: MoneyCents = whole.parse().map_err(|_| invalid())?;
    let cents: MoneyCents = match fraction.len() {
        0 => 0,
        1 => fraction.parse::<MoneyCents>().map_err(|_| invalid())? * 10,
        _ => fraction.parse().map_err(|_| invalid())?,
    };

    dollars
        .checked_mul(100)
        .and_then(|value| value.checked_add(cents))
        .ok_or_else(invalid)
}

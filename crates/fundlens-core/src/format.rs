//! Display formatting: currency, period-over-period deltas and sentiment.

use serde::Serialize;
use thiserror::Error;

use crate::table::{as_f64, Table};

/// CSS applied to values classified [`Sentiment::Negative`].
pub const NEGATIVE_STYLE: &str = "color: rgba(255, 0, 0, 0.9);";

/// Format an amount as `$` followed by a comma-grouped value with 2 decimals.
///
/// Negative amounts keep the sign after the currency symbol: `$-1,234.50`.
pub fn format_currency(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };

    format!("${sign}{}.{fraction}", group_thousands(whole))
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Why a delta could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeltaError {
    #[error("Key '{key}' not found in DataFrame columns.")]
    MissingColumn { key: String },

    #[error("DataFrame must contain at least two rows.")]
    InsufficientRows,

    #[error("Values in column '{key}' must be numeric.")]
    NonNumeric { key: String },
}

/// Percent change from row 1 to row 0 of column `key`, formatted `"{:.2}%"`.
///
/// Row 0 holds the current value and row 1 the previous one. The change is
/// divided by the absolute previous value whenever either value is not
/// positive.
pub fn delta(table: &Table, key: &str) -> Result<String, DeltaError> {
    let Some(index) = table.column_index(key) else {
        return Err(DeltaError::MissingColumn {
            key: key.to_string(),
        });
    };
    if table.len() < 2 {
        return Err(DeltaError::InsufficientRows);
    }

    let numeric = |row: usize| {
        as_f64(&table.rows[row][index]).ok_or_else(|| DeltaError::NonNumeric {
            key: key.to_string(),
        })
    };
    let current = numeric(0)?;
    let previous = numeric(1)?;

    let change = if current <= 0.0 || previous <= 0.0 {
        (current - previous) / previous.abs() * 100.0
    } else {
        (current - previous) / previous * 100.0
    };

    Ok(format!("{change:.2}%"))
}

/// [`delta`] collapsed to a single display string.
pub fn delta_label(table: &Table, key: &str) -> String {
    delta(table, key).unwrap_or_else(|error| error.to_string())
}

/// Conditional styling for formatted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sentiment {
    Negative,
    Neutral,
}

impl Sentiment {
    /// Values starting with `-` are negative; everything else is neutral.
    pub fn classify(value: &str) -> Self {
        if value.starts_with('-') {
            Self::Negative
        } else {
            Self::Neutral
        }
    }

    pub fn style(self) -> Option<&'static str> {
        match self {
            Self::Negative => Some(NEGATIVE_STYLE),
            Self::Neutral => None,
        }
    }
}

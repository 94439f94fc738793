//! Profile cards and display labels for the fact columns.

use std::fmt::{self, Display, Formatter};

use serde::Serialize;
use serde_json::Value;

use fundlens_warehouse::FundProfile;

use crate::dates::normalize_date;
use crate::format::format_currency;
use crate::table::{as_f64, Table};

/// Shown where a value is absent.
pub const NOT_AVAILABLE: &str = "N/A";

pub const VALUATION_COLUMNS: [&str; 4] = [
    "fund_price_book_ratio",
    "fund_price_cashflow_ratio",
    "fund_price_earning_ratio",
    "fund_price_sales_ratio",
];

pub const VALUATION_RATIO_LABELS: [(&str, &str); 4] = [
    ("fund_price_book_ratio", "Fund Price/Book Ratio"),
    ("fund_price_cashflow_ratio", "Fund Price/Cashflow Ratio"),
    ("fund_price_earning_ratio", "Fund Price/Earning Ratio"),
    ("fund_price_sales_ratio", "Fund Price/Sales Ratio"),
];

pub const RISK_COLUMNS: [&str; 21] = [
    "fund_alpha_3years",
    "fund_beta_3years",
    "fund_mean_annual_return_3years",
    "fund_r_squared_3years",
    "fund_stdev_3years",
    "fund_sharpe_ratio_3years",
    "fund_treynor_ratio_3years",
    "fund_alpha_5years",
    "fund_beta_5years",
    "fund_mean_annual_return_5years",
    "fund_r_squared_5years",
    "fund_stdev_5years",
    "fund_sharpe_ratio_5years",
    "fund_treynor_ratio_5years",
    "fund_alpha_10years",
    "fund_beta_10years",
    "fund_mean_annual_return_10years",
    "fund_r_squared_10years",
    "fund_stdev_10years",
    "fund_sharpe_ratio_10years",
    "fund_treynor_ratio_10years",
];

pub const RISK_METRIC_LABELS: [(&str, &str); 21] = [
    ("fund_alpha_3years", "Alpha 3years"),
    ("fund_beta_3years", "Beta 3years"),
    ("fund_mean_annual_return_3years", "Mean Annual Return 3years"),
    ("fund_r_squared_3years", "R Squared 3years"),
    ("fund_stdev_3years", "Standard Deviation 3years"),
    ("fund_sharpe_ratio_3years", "Sharpe Ratio 3years"),
    ("fund_treynor_ratio_3years", "Treynor Ratio 3years"),
    ("fund_alpha_5years", "Alpha 5years"),
    ("fund_beta_5years", "Beta 5years"),
    ("fund_mean_annual_return_5years", "Mean Annual Return 5years"),
    ("fund_r_squared_5years", "R Squared 5years"),
    ("fund_stdev_5years", "Standard Deviation 5years"),
    ("fund_sharpe_ratio_5years", "Sharpe Ratio 5years"),
    ("fund_treynor_ratio_5years", "Treynor Ratio 5years"),
    ("fund_alpha_10years", "Alpha 10years"),
    ("fund_beta_10years", "Beta 10years"),
    ("fund_mean_annual_return_10years", "Mean Annual Return 10years"),
    ("fund_r_squared_10years", "R Squared 10years"),
    ("fund_stdev_10years", "Standard Deviation 10years"),
    ("fund_sharpe_ratio_10years", "Sharpe Ratio 10years"),
    ("fund_treynor_ratio_10years", "Treynor Ratio 10years"),
];

/// A short titled value such as `Currency: USD`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub title: String,
    pub value: String,
}

impl Card {
    pub fn new(title: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
        }
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.value)
    }
}

/// The descriptive attribute grid of a fund, one card per `dim_etf` column.
pub fn attribute_cards(profile: &FundProfile) -> Vec<Card> {
    [
        ("Fund Short Name", &profile.short_name),
        ("Currency", &profile.currency),
        ("Fund Family", &profile.family),
        ("Exchange Timezone", &profile.exchange_timezone),
        ("Fund Long Name", &profile.long_name),
        ("Fund Category", &profile.category),
        ("Exchange Code", &profile.exchange_code),
        ("Exchange Name", &profile.exchange_name),
        ("Investment Type", &profile.investment_type),
        ("Size Type", &profile.size_type),
    ]
    .into_iter()
    .map(|(title, value)| Card::new(title, value.as_deref().unwrap_or(NOT_AVAILABLE)))
    .collect()
}

/// Label/value rows of the "Profile and Investment" card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvestmentProfile {
    pub rows: Vec<Card>,
}

impl InvestmentProfile {
    /// Combine the descriptive profile with the newest fact row.
    ///
    /// `facts` is expected newest-first; only row 0 is read. Total net assets
    /// is rendered as currency and the inception date as a calendar date.
    pub fn build(profile: &FundProfile, facts: &Table) -> Self {
        let text = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

        let total_net_assets = facts
            .value(0, "total_net_assets")
            .and_then(as_f64)
            .map_or_else(|| NOT_AVAILABLE.to_string(), format_currency);

        let inception_date = match facts.value(0, "inception_date") {
            Some(Value::String(raw)) => normalize_date(raw)
                .map(|date| date.to_string())
                .unwrap_or_else(|_| raw.clone()),
            _ => NOT_AVAILABLE.to_string(),
        };

        Self {
            rows: vec![
                Card::new("Fund Name", text(&profile.long_name)),
                Card::new("Fund Category", text(&profile.category)),
                Card::new("Total net assets", total_net_assets),
                Card::new("Inception date", inception_date),
                Card::new("Fund Family", text(&profile.family)),
                Card::new("Currency", text(&profile.currency)),
                Card::new("Exchange Name", text(&profile.exchange_name)),
                Card::new("Exchange code", text(&profile.exchange_code)),
                Card::new("Region", "US"),
            ],
        }
    }

    pub fn get(&self, title: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|card| card.title == title)
            .map(|card| card.value.as_str())
    }
}

//! Fixture database shared by the behavior suites.
//!
//! | Symbol | dim_etf | fact_etfs | holdings | sectors |
//! |--------|---------|-----------|----------|---------|
//! | `SPY` | yes | 2021-01-04 .. 2021-01-08 | 3 | 3 |
//! | `QQQ` | yes | 2021-01-04 .. 2021-01-06 | 2 | 1 |
//! | `VTSAX` | yes | 2021-01-07 .. 2021-01-08 | none | none |
//! | `ORPHN` | no | 2021-01-04 | none | none |

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use duckdb::Connection;
use fundlens_core::cards::RISK_COLUMNS;
use fundlens_warehouse::{Warehouse, WarehouseConfig, FACT_COLUMNS};
use tempfile::{tempdir, TempDir};

pub const SCHEMA: &str = "main_etfs";

pub struct FundFixture {
    _temp: TempDir,
    pub db_path: PathBuf,
}

impl FundFixture {
    pub fn build() -> Self {
        let temp = tempdir().expect("tempdir");
        let db_path = temp.path().join("us-funds-project.db");
        seed(&db_path);
        Self {
            _temp: temp,
            db_path,
        }
    }

    pub fn config(&self) -> WarehouseConfig {
        WarehouseConfig::at(&self.db_path)
    }

    pub fn warehouse(&self) -> Warehouse {
        Warehouse::open(self.config()).expect("fixture warehouse opens")
    }
}

fn fact_column_type(column: &str) -> &'static str {
    match column {
        "fund_symbol" => "VARCHAR",
        "price_date" => "TIMESTAMP",
        "inception_date" | "returns_as_of_date" => "DATE",
        "volume" => "BIGINT",
        _ => "DOUBLE",
    }
}

fn seed(path: &Path) {
    // Read-write only while seeding; dropped before any read-only open.
    let connection = Connection::open(path).expect("seed connection");

    let fact_columns = FACT_COLUMNS
        .iter()
        .map(|column| format!("{column} {}", fact_column_type(column)))
        .collect::<Vec<_>>()
        .join(", ");

    connection
        .execute_batch(&format!(
            "CREATE SCHEMA {SCHEMA};
             CREATE TABLE {SCHEMA}.dim_etf (
                 fund_symbol VARCHAR, fund_short_name VARCHAR, fund_long_name VARCHAR,
                 currency VARCHAR, fund_category VARCHAR, fund_family VARCHAR,
                 exchange_code VARCHAR, exchange_name VARCHAR, exchange_timezone VARCHAR,
                 investment_strategy VARCHAR, investment_type VARCHAR, size_type VARCHAR
             );
             CREATE TABLE {SCHEMA}.fact_etfs ({fact_columns});
             CREATE TABLE {SCHEMA}.dim_holdings (
                 fund_symbol VARCHAR, holding_name VARCHAR, holding_weight DOUBLE
             );
             CREATE TABLE {SCHEMA}.dim_holdings_enriched (
                 fund_symbol VARCHAR, holding_name VARCHAR, holding_weight DOUBLE,
                 sector VARCHAR
             );
             CREATE TABLE {SCHEMA}.dim_sectors (
                 fund_symbol VARCHAR, sector VARCHAR, weight DOUBLE
             );"
        ))
        .expect("create tables");

    connection
        .execute_batch(&format!(
            "INSERT INTO {SCHEMA}.dim_etf VALUES
                 ('SPY', 'SPDR S&P 500', 'SPDR S&P 500 ETF Trust', 'USD', 'Large Blend',
                  'SPDR State Street Global Advisors', 'PCX', 'NYSEArca', 'America/New_York',
                  'The Trust seeks to track the S&P 500 Index.', 'ETF', 'Large'),
                 ('QQQ', 'Invesco QQQ', 'Invesco QQQ Trust, Series 1', 'USD', 'Large Growth',
                  'Invesco', 'NMS', 'NasdaqGS', 'America/New_York',
                  'The Fund tracks the Nasdaq-100 Index.', 'ETF', 'Large'),
                 ('VTSAX', 'Vanguard Total Stock', 'Vanguard Total Stock Market Index Fund', 'USD',
                  'Large Blend', 'Vanguard', 'NAS', 'Nasdaq', 'America/New_York',
                  NULL, 'MUTUALFUND', 'Large');

             INSERT INTO {SCHEMA}.dim_holdings VALUES
                 ('SPY', 'Apple Inc', 0.065),
                 ('SPY', 'Microsoft Corp', 0.058),
                 ('SPY', 'Amazon.com Inc', 0.041),
                 ('QQQ', 'Apple Inc', 0.11),
                 ('QQQ', 'Microsoft Corp', 0.10);

             INSERT INTO {SCHEMA}.dim_holdings_enriched VALUES
                 ('SPY', 'Apple Inc', 0.065, 'Technology'),
                 ('SPY', 'Microsoft Corp', 0.058, 'Technology'),
                 ('SPY', 'Amazon.com Inc', 0.041, 'Consumer Cyclical');

             INSERT INTO {SCHEMA}.dim_sectors VALUES
                 ('SPY', 'technology', 0.27),
                 ('SPY', 'healthcare', 0.13),
                 ('SPY', 'financial_services', 0.11),
                 ('QQQ', 'technology', 0.48);"
        ))
        .expect("seed dimensions");

    let rows = [
        ("SPY", "2021-01-04", 100.0, 1_000_i64),
        ("SPY", "2021-01-05", 102.0, 1_100),
        ("SPY", "2021-01-06", 101.0, 900),
        ("SPY", "2021-01-07", 103.0, 1_300),
        ("SPY", "2021-01-08", 104.0, 1_200),
        ("QQQ", "2021-01-04", 300.0, 5_000),
        ("QQQ", "2021-01-05", 310.0, 5_500),
        ("QQQ", "2021-01-06", 290.0, 6_000),
        ("VTSAX", "2021-01-07", 95.0, 0),
        ("VTSAX", "2021-01-08", 96.5, 0),
        ("ORPHN", "2021-01-04", 10.0, 10),
    ];

    let risk_columns = RISK_COLUMNS;

    for (symbol, date, close, volume) in rows {
        let risk_values = (1..=risk_columns.len())
            .map(|index| format!("{}", index as f64 / 10.0))
            .collect::<Vec<_>>()
            .join(", ");

        connection
            .execute_batch(&format!(
                "INSERT INTO {SCHEMA}.fact_etfs (
                     fund_symbol, price_date, open, high, low, close, adj_close, volume,
                     total_net_assets, inception_date,
                     fund_price_book_ratio, fund_price_cashflow_ratio,
                     fund_price_earning_ratio, fund_price_sales_ratio,
                     {risk}
                 ) VALUES (
                     '{symbol}', TIMESTAMP '{date} 00:00:00',
                     {open}, {high}, {low}, {close}, {close}, {volume},
                     1234567.8, DATE '1993-01-22',
                     3.5, 15.2, 24.1, 2.7,
                     {risk_values}
                 )",
                risk = risk_columns.join(", "),
                open = close - 1.0,
                high = close + 1.5,
                low = close - 2.0,
            ))
            .expect("seed facts");
    }
}

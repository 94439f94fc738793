//! # Fundlens Warehouse
//!
//! Read-only query layer over the US funds analytical database.
//!
//! ## Overview
//!
//! This crate opens a pre-built `DuckDB` snapshot of mutual fund and ETF data
//! and exposes one method per analytical question asked by the dashboard.
//! The store is never written to.
//!
//! ### Features
//!
//! - 🔒 **Bound parameters**: fund symbols are always passed as query
//!   parameters, never spliced into SQL text
//! - 📖 **Read-only**: the database is opened once in read-only access mode
//! - 🔄 **Connection pooling**: connections are cloned from the single
//!   database handle and reused
//! - ⚡ **Row guardrails**: fact-series fetches are capped and report
//!   truncation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fundlens_warehouse::{QueryGuardrails, Warehouse};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warehouse = Warehouse::open_default()?;
//!
//!     for window in warehouse.fund_universe()? {
//!         println!("{}: {} .. {}", window.symbol, window.min_date, window.max_date);
//!     }
//!
//!     let facts = warehouse.fund_facts("SPY", QueryGuardrails::default())?;
//!     println!("{} daily rows", facts.row_count);
//!     Ok(())
//! }
//! ```
//!
//! ## Tables
//!
//! | Table | Description |
//! |-------|-------------|
//! | `dim_etf` | Fund metadata, one row per symbol |
//! | `fact_etfs` | Daily price and metric snapshot per symbol |
//! | `dim_holdings` | Top holdings with portfolio weights |
//! | `dim_holdings_enriched` | Holdings joined with company metadata |
//! | `dim_sectors` | Sector weights per symbol |

pub mod duckdb;
mod queries;

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use ::duckdb::types::Value as DuckValue;
use ::duckdb::{Connection, ToSql};
use serde::Serialize;
use serde_json::{Number, Value};
use thiserror::Error;

pub use duckdb::{DuckDbConnectionManager, PooledConnection};
pub use queries::{
    FundProfile, FundWindow, HoldingWeight, NetAssetCoverage, SectorWeight, FACT_COLUMNS,
};

/// Default schema holding the fund tables.
pub const DEFAULT_SCHEMA: &str = "main_etfs";

/// Default database file name inside the fundlens home directory.
pub const DEFAULT_DB_FILE: &str = "us-funds-project.db";

/// Errors that can occur during warehouse operations.
#[derive(Debug, Error)]
pub enum WarehouseError {
    /// `DuckDB` database error.
    #[error(transparent)]
    DuckDb(#[from] ::duckdb::Error),

    /// I/O error (file system operations).
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The configured database file does not exist.
    #[error("database file not found: {}", path.display())]
    DatabaseMissing { path: PathBuf },

    /// The warehouse configuration is not acceptable.
    #[error("configuration rejected: {0}")]
    ConfigRejected(String),
}

/// Configuration for the warehouse database.
#[derive(Debug, Clone)]
pub struct WarehouseConfig {
    /// Path to the `DuckDB` database file.
    pub db_path: PathBuf,
    /// Schema containing the `dim_*` and `fact_*` tables.
    pub schema: String,
    /// Maximum number of idle connections kept in the pool.
    pub max_pool_size: usize,
    /// Access mode flag. Only `true` is accepted.
    pub read_only: bool,
}

impl Default for WarehouseConfig {
    fn default() -> Self {
        Self {
            db_path: resolve_db_path(),
            schema: DEFAULT_SCHEMA.to_string(),
            max_pool_size: 4,
            read_only: true,
        }
    }
}

impl WarehouseConfig {
    /// Configuration for a database at `db_path` with default settings.
    pub fn at(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration before any file is touched.
    pub fn validate(&self) -> Result<(), WarehouseError> {
        if !self.read_only {
            return Err(WarehouseError::ConfigRejected(String::from(
                "the fund warehouse only supports read-only access",
            )));
        }
        if !is_sql_identifier(&self.schema) {
            return Err(WarehouseError::ConfigRejected(format!(
                "invalid schema name '{}'",
                self.schema
            )));
        }
        if self.max_pool_size == 0 {
            return Err(WarehouseError::ConfigRejected(String::from(
                "max_pool_size must be greater than zero",
            )));
        }
        Ok(())
    }
}

/// Guardrails for fact-series fetches.
#[derive(Debug, Clone, Copy)]
pub struct QueryGuardrails {
    /// Maximum number of rows to return.
    pub max_rows: usize,
}

impl Default for QueryGuardrails {
    fn default() -> Self {
        Self { max_rows: 100_000 }
    }
}

/// Untyped tabular result used for the wide fact series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Column names in select order.
    pub columns: Vec<String>,
    /// Row data as JSON values.
    pub rows: Vec<Vec<Value>>,
    /// Number of rows returned.
    pub row_count: usize,
    /// Whether results were truncated due to the `max_rows` limit.
    pub truncated: bool,
}

impl QueryResult {
    /// Position of a named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Whether the result holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read-only handle on the fund database.
///
/// Cloning is cheap; clones share the same connection pool.
#[derive(Clone)]
pub struct Warehouse {
    config: WarehouseConfig,
    manager: DuckDbConnectionManager,
}

impl Warehouse {
    /// Open a warehouse with default configuration.
    pub fn open_default() -> Result<Self, WarehouseError> {
        Self::open(WarehouseConfig::default())
    }

    /// Open a warehouse with the specified configuration.
    pub fn open(config: WarehouseConfig) -> Result<Self, WarehouseError> {
        config.validate()?;
        if !config.db_path.is_file() {
            return Err(WarehouseError::DatabaseMissing {
                path: config.db_path.clone(),
            });
        }

        let manager = DuckDbConnectionManager::open(config.db_path.clone(), config.max_pool_size)?;
        Ok(Self { config, manager })
    }

    /// Get the path to the database file.
    pub fn db_path(&self) -> &Path {
        self.manager.db_path()
    }

    /// Schema the fund tables are read from.
    pub fn schema(&self) -> &str {
        &self.config.schema
    }

    /// Schema-qualified name of a fund table.
    fn table(&self, name: &str) -> String {
        format!("{}.{}", self.config.schema, name)
    }

    fn connection(&self) -> Result<PooledConnection, WarehouseError> {
        Ok(self.manager.acquire()?)
    }
}

/// Run a SELECT and collect its rows as JSON values.
fn select_table(
    connection: &Connection,
    sql: &str,
    columns: Vec<String>,
    params: &[&dyn ToSql],
    guardrails: QueryGuardrails,
) -> Result<QueryResult, WarehouseError> {
    let mut statement = connection.prepare(sql)?;
    let mut rows_cursor = statement.query(params)?;
    let column_count = columns.len();
    let mut rows = Vec::new();
    let mut truncated = false;

    while let Some(row) = rows_cursor.next()? {
        if rows.len() >= guardrails.max_rows {
            truncated = true;
            break;
        }
        rows.push(read_row(row, column_count)?);
    }

    Ok(QueryResult {
        columns,
        row_count: rows.len(),
        rows,
        truncated,
    })
}

/// Read a single row from the result set.
fn read_row(row: &::duckdb::Row<'_>, column_count: usize) -> Result<Vec<Value>, ::duckdb::Error> {
    let mut output = Vec::with_capacity(column_count);
    for index in 0..column_count {
        let value: DuckValue = row.get(index)?;
        output.push(to_json_value(value));
    }
    Ok(output)
}

/// Convert a `DuckDB` value to a JSON value.
fn to_json_value(value: DuckValue) -> Value {
    match value {
        DuckValue::Null => Value::Null,
        DuckValue::Boolean(value) => Value::Bool(value),
        DuckValue::TinyInt(value) => Value::Number(Number::from(value)),
        DuckValue::SmallInt(value) => Value::Number(Number::from(value)),
        DuckValue::Int(value) => Value::Number(Number::from(value)),
        DuckValue::BigInt(value) => Value::Number(Number::from(value)),
        DuckValue::HugeInt(value) => i64::try_from(value)
            .map(|value| Value::Number(Number::from(value)))
            .unwrap_or_else(|_| number_from_f64(value as f64)),
        DuckValue::UTinyInt(value) => Value::Number(Number::from(value)),
        DuckValue::USmallInt(value) => Value::Number(Number::from(value)),
        DuckValue::UInt(value) => Value::Number(Number::from(value)),
        DuckValue::UBigInt(value) => Value::Number(Number::from(value)),
        DuckValue::Float(value) => number_from_f64(f64::from(value)),
        DuckValue::Double(value) => number_from_f64(value),
        DuckValue::Decimal(value) => value
            .to_string()
            .parse::<f64>()
            .map_or(Value::Null, number_from_f64),
        DuckValue::Text(value) => Value::String(value),
        DuckValue::Blob(value) => Value::String(hex::encode(value)),
        other => Value::String(format!("{other:?}")),
    }
}

/// Convert an f64 to a JSON number, returning Null for NaN/Inf.
fn number_from_f64(value: f64) -> Value {
    Number::from_f64(value)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}

/// Check that a name can be used unquoted as a SQL identifier.
fn is_sql_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}

/// Resolve the database path from the environment or default.
fn resolve_db_path() -> PathBuf {
    resolve_db_path_with(|name| env::var_os(name))
}

fn resolve_db_path_with(lookup: impl Fn(&str) -> Option<OsString>) -> PathBuf {
    let non_empty = |name: &str| lookup(name).filter(|value| !value.is_empty());

    if let Some(path) = non_empty("FUNDLENS_DB") {
        return PathBuf::from(path);
    }

    if let Some(home) = non_empty("FUNDLENS_HOME") {
        return PathBuf::from(home).join(DEFAULT_DB_FILE);
    }

    if let Some(home) = non_empty("HOME") {
        return PathBuf::from(home).join(".fundlens").join(DEFAULT_DB_FILE);
    }

    PathBuf::from(".fundlens").join(DEFAULT_DB_FILE)
}

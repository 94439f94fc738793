//! One query per analytical question.
//!
//! Every symbol-scoped query binds the symbol as a parameter. The only text
//! spliced into SQL is the schema-qualified table name, whose schema part was
//! validated when the warehouse was opened.

use ::duckdb::ToSql;
use serde::Serialize;
use time::Date;
use tracing::{debug, warn};

use crate::{select_table, QueryGuardrails, QueryResult, Warehouse, WarehouseError};

/// Every column of the fact series, in select order.
pub const FACT_COLUMNS: [&str; 93] = [
    "fund_symbol",
    "price_date",
    "open",
    "high",
    "low",
    "close",
    "adj_close",
    "volume",
    "avg_vol_3month",
    "avg_vol_10day",
    "total_net_assets",
    "day50_moving_average",
    "day200_moving_average",
    "week52_high_low_change",
    "week52_high_low_change_perc",
    "week52_high",
    "week52_high_change",
    "week52_high_change_perc",
    "week52_low",
    "week52_low_change",
    "week52_low_change_perc",
    "fund_yield",
    "inception_date",
    "annual_holdings_turnover",
    "fund_annual_report_net_expense_ratio",
    "category_annual_report_net_expense_ratio",
    "asset_stocks",
    "asset_bonds",
    "fund_sector_basic_materials",
    "fund_sector_communication_services",
    "fund_sector_consumer_cyclical",
    "fund_sector_consumer_defensive",
    "fund_sector_energy",
    "fund_sector_financial_services",
    "fund_sector_healthcare",
    "fund_sector_industrials",
    "fund_sector_real_estate",
    "fund_sector_technology",
    "fund_sector_utilities",
    "fund_price_book_ratio",
    "fund_price_cashflow_ratio",
    "fund_price_earning_ratio",
    "fund_price_sales_ratio",
    "fund_bond_maturity",
    "fund_bond_duration",
    "fund_bonds_us_government",
    "fund_bonds_aaa",
    "fund_bonds_aa",
    "fund_bonds_a",
    "fund_bonds_bbb",
    "fund_bonds_bb",
    "fund_bonds_b",
    "fund_bonds_below_b",
    "fund_bonds_others",
    "top10_holdings_total_assets",
    "returns_as_of_date",
    "fund_return_ytd",
    "category_return_ytd",
    "fund_return_1month",
    "category_return_1month",
    "fund_return_3months",
    "category_return_3months",
    "fund_return_1year",
    "category_return_1year",
    "fund_return_3years",
    "category_return_3years",
    "fund_return_5years",
    "category_return_5years",
    "fund_return_10years",
    "category_return_10years",
    "years_up",
    "years_down",
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

/// Date-typed fact columns, read back as text.
const FACT_DATE_COLUMNS: [&str; 3] = ["price_date", "inception_date", "returns_as_of_date"];

/// A fund symbol with the bounds of its daily data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundWindow {
    pub symbol: String,
    pub min_date: String,
    pub max_date: String,
}

/// Descriptive attributes of a fund from `dim_etf`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FundProfile {
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub category: Option<String>,
    pub family: Option<String>,
    pub exchange_code: Option<String>,
    pub exchange_name: Option<String>,
    pub exchange_timezone: Option<String>,
    pub investment_strategy: Option<String>,
    pub investment_type: Option<String>,
    pub size_type: Option<String>,
}

/// A holding and its share of the portfolio in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingWeight {
    pub name: String,
    pub weight_pct: f64,
}

/// A sector and its share of the portfolio in percent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorWeight {
    pub sector: String,
    pub weight_pct: f64,
}

/// Portion of net assets covered by the listed holdings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetAssetCoverage {
    pub symbol: String,
    /// `round(sum(holding_weight) * 100, 2)`.
    pub net_assets_pct: f64,
}

impl Warehouse {
    /// Every fund symbol with its first and last `price_date`, by symbol.
    pub fn fund_universe(&self) -> Result<Vec<FundWindow>, WarehouseError> {
        let sql = format!(
            "SELECT fund_symbol, \
                    CAST(MIN(price_date) AS VARCHAR) AS min_date, \
                    CAST(MAX(price_date) AS VARCHAR) AS max_date \
             FROM {fact} \
             GROUP BY fund_symbol \
             ORDER BY fund_symbol",
            fact = self.table("fact_etfs")
        );

        let connection = self.connection()?;
        let mut statement = connection.prepare(&sql)?;
        let windows = statement
            .query_map([] as [&dyn ToSql; 0], |row| {
                Ok(FundWindow {
                    symbol: row.get(0)?,
                    min_date: row.get(1)?,
                    max_date: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(funds = windows.len(), "loaded fund universe");
        Ok(windows)
    }

    /// Descriptive profile of one fund, `None` when the symbol is unknown.
    pub fn fund_profile(&self, symbol: &str) -> Result<Option<FundProfile>, WarehouseError> {
        let sql = format!(
            "SELECT fund_short_name, fund_long_name, currency, fund_category, fund_family, \
                    exchange_code, exchange_name, exchange_timezone, investment_strategy, \
                    investment_type, size_type \
             FROM {dim} \
             WHERE fund_symbol = ?",
            dim = self.table("dim_etf")
        );

        let connection = self.connection()?;
        let mut statement = connection.prepare(&sql)?;
        let params: [&dyn ToSql; 1] = [&symbol];
        let profiles = statement
            .query_map(params.as_slice(), |row| {
                Ok(FundProfile {
                    short_name: row.get(0)?,
                    long_name: row.get(1)?,
                    currency: row.get(2)?,
                    category: row.get(3)?,
                    family: row.get(4)?,
                    exchange_code: row.get(5)?,
                    exchange_name: row.get(6)?,
                    exchange_timezone: row.get(7)?,
                    investment_strategy: row.get(8)?,
                    investment_type: row.get(9)?,
                    size_type: row.get(10)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        if profiles.len() > 1 {
            warn!(symbol, rows = profiles.len(), "fund symbol is not unique in dim_etf");
        }
        debug!(symbol, found = !profiles.is_empty(), "loaded fund profile");
        Ok(profiles.into_iter().next())
    }

    /// Full fact series of one fund, newest `price_date` first.
    pub fn fund_facts(
        &self,
        symbol: &str,
        guardrails: QueryGuardrails,
    ) -> Result<QueryResult, WarehouseError> {
        let sql = format!(
            "SELECT {columns} FROM {fact} WHERE fund_symbol = ? ORDER BY price_date DESC",
            columns = fact_select_list(),
            fact = self.table("fact_etfs")
        );
        let params: [&dyn ToSql; 1] = [&symbol];
        self.fact_rows(&sql, params.as_slice(), guardrails, symbol)
    }

    /// Fact series restricted to `start..=end` on the calendar date of
    /// `price_date`, newest first.
    pub fn fund_facts_between(
        &self,
        symbol: &str,
        start: Date,
        end: Date,
        guardrails: QueryGuardrails,
    ) -> Result<QueryResult, WarehouseError> {
        let sql = format!(
            "SELECT {columns} FROM {fact} \
             WHERE fund_symbol = ? \
               AND CAST(price_date AS DATE) BETWEEN CAST(? AS DATE) AND CAST(? AS DATE) \
             ORDER BY price_date DESC",
            columns = fact_select_list(),
            fact = self.table("fact_etfs")
        );
        let start = start.to_string();
        let end = end.to_string();
        let params: [&dyn ToSql; 3] = [&symbol, &start, &end];
        self.fact_rows(&sql, params.as_slice(), guardrails, symbol)
    }

    /// Holdings from `dim_holdings`, heaviest first, weights in percent.
    pub fn top_holdings(&self, symbol: &str) -> Result<Vec<HoldingWeight>, WarehouseError> {
        self.holdings_from(&self.table("dim_holdings"), symbol)
    }

    /// Holdings from `dim_holdings_enriched`, heaviest first, weights in percent.
    pub fn portfolio_weights(&self, symbol: &str) -> Result<Vec<HoldingWeight>, WarehouseError> {
        self.holdings_from(&self.table("dim_holdings_enriched"), symbol)
    }

    /// Sector weights of one fund, heaviest first, in percent.
    pub fn sector_allocation(&self, symbol: &str) -> Result<Vec<SectorWeight>, WarehouseError> {
        let sql = format!(
            "SELECT COALESCE(sector, ''), CAST(weight AS DOUBLE) * 100 AS weight_pct \
             FROM {dim} \
             WHERE fund_symbol = ? AND weight IS NOT NULL \
             ORDER BY weight DESC, sector",
            dim = self.table("dim_sectors")
        );

        let connection = self.connection()?;
        let mut statement = connection.prepare(&sql)?;
        let params: [&dyn ToSql; 1] = [&symbol];
        let sectors = statement
            .query_map(params.as_slice(), |row| {
                Ok(SectorWeight {
                    sector: row.get(0)?,
                    weight_pct: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(symbol, sectors = sectors.len(), "loaded sector allocation");
        Ok(sectors)
    }

    /// Summed holding weight of one fund, `None` when it lists no holdings.
    pub fn net_asset_coverage(
        &self,
        symbol: &str,
    ) -> Result<Option<NetAssetCoverage>, WarehouseError> {
        let sql = format!(
            "SELECT fund_symbol, ROUND(SUM(CAST(holding_weight AS DOUBLE)) * 100, 2) AS net_assets_pct \
             FROM {dim} \
             WHERE fund_symbol = ? \
             GROUP BY fund_symbol",
            dim = self.table("dim_holdings")
        );

        let connection = self.connection()?;
        let mut statement = connection.prepare(&sql)?;
        let params: [&dyn ToSql; 1] = [&symbol];
        let rows = statement
            .query_map(params.as_slice(), |row| {
                let symbol: String = row.get(0)?;
                let pct: Option<f64> = row.get(1)?;
                Ok(pct.map(|net_assets_pct| NetAssetCoverage {
                    symbol,
                    net_assets_pct,
                }))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows.into_iter().flatten().next())
    }

    fn holdings_from(
        &self,
        table: &str,
        symbol: &str,
    ) -> Result<Vec<HoldingWeight>, WarehouseError> {
        let sql = format!(
            "SELECT COALESCE(holding_name, ''), CAST(holding_weight AS DOUBLE) * 100 AS weight_pct \
             FROM {table} \
             WHERE fund_symbol = ? AND holding_weight IS NOT NULL \
             ORDER BY holding_weight DESC, holding_name"
        );

        let connection = self.connection()?;
        let mut statement = connection.prepare(&sql)?;
        let params: [&dyn ToSql; 1] = [&symbol];
        let holdings = statement
            .query_map(params.as_slice(), |row| {
                Ok(HoldingWeight {
                    name: row.get(0)?,
                    weight_pct: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        debug!(symbol, table, holdings = holdings.len(), "loaded holdings");
        Ok(holdings)
    }

    fn fact_rows(
        &self,
        sql: &str,
        params: &[&dyn ToSql],
        guardrails: QueryGuardrails,
        symbol: &str,
    ) -> Result<QueryResult, WarehouseError> {
        if guardrails.max_rows == 0 {
            return Err(WarehouseError::ConfigRejected(String::from(
                "max_rows must be greater than zero",
            )));
        }

        let connection = self.connection()?;
        let columns = FACT_COLUMNS.iter().map(|column| (*column).to_string()).collect();
        let result = select_table(&connection, sql, columns, params, guardrails)?;

        if result.truncated {
            warn!(symbol, max_rows = guardrails.max_rows, "fact series truncated");
        }
        debug!(symbol, rows = result.row_count, "loaded fact series");
        Ok(result)
    }
}

/// Select list for the fact series with date columns cast to text.
fn fact_select_list() -> String {
    FACT_COLUMNS
        .iter()
        .map(|column| {
            if FACT_DATE_COLUMNS.contains(column) {
                format!("CAST({column} AS VARCHAR) AS {column}")
            } else {
                (*column).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

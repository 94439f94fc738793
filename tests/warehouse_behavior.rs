//! Behavior-driven tests for the fund warehouse
//!
//! These tests verify WHAT each analytical query returns against a seeded
//! fixture database, focusing on ordering, filtering and empty results.

mod support;

use approx::assert_relative_eq;
use fundlens_warehouse::{QueryGuardrails, Warehouse, WarehouseConfig, WarehouseError, FACT_COLUMNS};
use serde_json::Value;
use std::thread;
use time::macros::date;

use support::FundFixture;

// =============================================================================
// Warehouse: Fund universe
// =============================================================================

#[test]
fn when_user_lists_funds_they_are_sorted_with_their_data_windows() {
    // Given: A warehouse over the fixture snapshot
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    // When: The user lists the fund universe
    let funds = warehouse.fund_universe().expect("universe");

    // Then: Every symbol with daily data appears once, in symbol order
    let symbols: Vec<_> = funds.iter().map(|fund| fund.symbol.as_str()).collect();
    assert_eq!(symbols, ["ORPHN", "QQQ", "SPY", "VTSAX"]);

    // And: Each window starts no later than it ends
    for fund in &funds {
        let min = fundlens_core::normalize_date(&fund.min_date).expect("min date");
        let max = fundlens_core::normalize_date(&fund.max_date).expect("max date");
        assert!(min <= max, "{} window is inverted", fund.symbol);
    }

    let spy = funds.iter().find(|fund| fund.symbol == "SPY").expect("SPY");
    assert!(spy.min_date.starts_with("2021-01-04"));
    assert!(spy.max_date.starts_with("2021-01-08"));
}

// =============================================================================
// Warehouse: Fund profile
// =============================================================================

#[test]
fn when_user_requests_a_known_profile_exactly_one_is_returned() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    let profile = warehouse
        .fund_profile("SPY")
        .expect("profile query")
        .expect("SPY has a profile");

    assert_eq!(profile.long_name.as_deref(), Some("SPDR S&P 500 ETF Trust"));
    assert_eq!(profile.currency.as_deref(), Some("USD"));
    assert_eq!(profile.exchange_code.as_deref(), Some("PCX"));
    assert_eq!(profile.size_type.as_deref(), Some("Large"));
}

#[test]
fn when_user_requests_an_unknown_profile_nothing_is_returned() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    assert!(warehouse.fund_profile("NOPE").expect("profile query").is_none());
    // ORPHN has daily data but no dimension row
    assert!(warehouse.fund_profile("ORPHN").expect("profile query").is_none());
}

#[test]
fn when_profile_attributes_are_null_they_stay_absent() {
    let fixture = FundFixture::build();
    let profile = fixture
        .warehouse()
        .fund_profile("VTSAX")
        .expect("profile query")
        .expect("VTSAX has a profile");

    assert!(profile.investment_strategy.is_none());
    assert_eq!(profile.investment_type.as_deref(), Some("MUTUALFUND"));
}

// =============================================================================
// Warehouse: Fact series
// =============================================================================

#[test]
fn when_user_fetches_facts_they_are_newest_first_with_every_column() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    let facts = warehouse
        .fund_facts("SPY", QueryGuardrails::default())
        .expect("facts");

    assert_eq!(facts.columns, FACT_COLUMNS.to_vec());
    assert_eq!(facts.row_count, 5);
    assert!(!facts.truncated);

    let date_index = facts.column_index("price_date").expect("price_date");
    let dates: Vec<_> = facts
        .rows
        .iter()
        .map(|row| row[date_index].as_str().expect("date text").to_string())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort();
    sorted.reverse();
    assert_eq!(dates, sorted, "rows must be ordered by price_date descending");

    let close_index = facts.column_index("close").expect("close");
    assert_eq!(facts.rows[0][close_index], Value::from(104.0));

    let volume_index = facts.column_index("volume").expect("volume");
    assert_eq!(facts.rows[0][volume_index], Value::from(1_200));
}

#[test]
fn when_user_fetches_facts_in_a_range_only_those_days_are_returned() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    // Given: A range covering the middle three trading days
    let facts = warehouse
        .fund_facts_between(
            "SPY",
            date!(2021 - 01 - 05),
            date!(2021 - 01 - 07),
            QueryGuardrails::default(),
        )
        .expect("facts in range");

    // Then: Both ends are inclusive
    let date_index = facts.column_index("price_date").expect("price_date");
    let days: Vec<_> = facts
        .rows
        .iter()
        .map(|row| row[date_index].as_str().expect("text")[..10].to_string())
        .collect();
    assert_eq!(days, ["2021-01-07", "2021-01-06", "2021-01-05"]);
}

#[test]
fn when_fact_rows_exceed_the_guardrail_the_result_is_truncated() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    let facts = warehouse
        .fund_facts("SPY", QueryGuardrails { max_rows: 2 })
        .expect("facts");

    assert_eq!(facts.row_count, 2);
    assert!(facts.truncated);

    let rejected = warehouse.fund_facts("SPY", QueryGuardrails { max_rows: 0 });
    assert!(matches!(rejected, Err(WarehouseError::ConfigRejected(_))));
}

#[test]
fn when_queries_repeat_the_results_are_identical() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    let first = warehouse.fund_facts("QQQ", QueryGuardrails::default()).expect("first");
    let second = warehouse.fund_facts("QQQ", QueryGuardrails::default()).expect("second");
    assert_eq!(first, second);

    assert_eq!(
        warehouse.top_holdings("SPY").expect("first"),
        warehouse.top_holdings("SPY").expect("second")
    );
}

// =============================================================================
// Warehouse: Holdings, sectors and coverage
// =============================================================================

#[test]
fn when_user_lists_holdings_they_are_heaviest_first_in_percent() {
    let fixture = FundFixture::build();
    let holdings = fixture.warehouse().top_holdings("SPY").expect("holdings");

    let names: Vec<_> = holdings.iter().map(|holding| holding.name.as_str()).collect();
    assert_eq!(names, ["Apple Inc", "Microsoft Corp", "Amazon.com Inc"]);
    assert_relative_eq!(holdings[0].weight_pct, 6.5, epsilon = 1e-9);

    for pair in holdings.windows(2) {
        assert!(pair[0].weight_pct >= pair[1].weight_pct);
    }
    for holding in &holdings {
        assert!((0.0..=100.0).contains(&holding.weight_pct));
    }
}

#[test]
fn when_user_asks_for_portfolio_weights_the_enriched_table_is_read() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    let weights = warehouse.portfolio_weights("SPY").expect("weights");
    assert_eq!(weights.len(), 3);
    assert_eq!(weights[0].name, "Apple Inc");

    // QQQ only has plain holdings
    assert!(warehouse.portfolio_weights("QQQ").expect("weights").is_empty());
    assert_eq!(warehouse.top_holdings("QQQ").expect("holdings").len(), 2);
}

#[test]
fn when_user_lists_sectors_they_are_heaviest_first_in_percent() {
    let fixture = FundFixture::build();
    let sectors = fixture.warehouse().sector_allocation("SPY").expect("sectors");

    let names: Vec<_> = sectors.iter().map(|sector| sector.sector.as_str()).collect();
    assert_eq!(names, ["technology", "healthcare", "financial_services"]);
    assert_relative_eq!(sectors[0].weight_pct, 27.0, epsilon = 1e-9);
    for sector in &sectors {
        assert!((0.0..=100.0).contains(&sector.weight_pct));
    }
}

#[test]
fn when_user_checks_coverage_it_matches_the_rounded_sum_of_holdings() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    let coverage = warehouse
        .net_asset_coverage("SPY")
        .expect("coverage")
        .expect("SPY has holdings");
    let summed: f64 = warehouse
        .top_holdings("SPY")
        .expect("holdings")
        .iter()
        .map(|holding| holding.weight_pct)
        .sum();

    assert_eq!(coverage.symbol, "SPY");
    assert_relative_eq!(coverage.net_assets_pct, 16.4, epsilon = 1e-9);
    assert_relative_eq!(coverage.net_assets_pct, (summed * 100.0).round() / 100.0, epsilon = 1e-9);

    assert!(warehouse.net_asset_coverage("VTSAX").expect("coverage").is_none());
}

// =============================================================================
// Warehouse: Security and isolation
// =============================================================================

#[test]
fn when_symbols_contain_sql_metacharacters_they_match_nothing() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    for symbol in ["SPY' OR '1'='1", "SPY; DROP TABLE main_etfs.dim_etf; --", "\"SPY\"", "SPY%"] {
        assert!(warehouse.fund_profile(symbol).expect("profile").is_none());
        assert!(warehouse.top_holdings(symbol).expect("holdings").is_empty());
        assert!(warehouse.sector_allocation(symbol).expect("sectors").is_empty());
        assert!(warehouse.net_asset_coverage(symbol).expect("coverage").is_none());
        assert!(warehouse
            .fund_facts(symbol, QueryGuardrails::default())
            .expect("facts")
            .is_empty());
    }

    // And: The tables are untouched
    assert!(warehouse.fund_profile("SPY").expect("profile").is_some());
}

#[test]
fn when_the_schema_does_not_exist_queries_fail_with_a_database_error() {
    let fixture = FundFixture::build();
    let warehouse = Warehouse::open(WarehouseConfig {
        schema: String::from("other_schema"),
        ..fixture.config()
    })
    .expect("open succeeds; schema is only checked by queries");

    let result = warehouse.fund_universe();
    assert!(matches!(result, Err(WarehouseError::DuckDb(_))));
}

#[test]
fn when_clones_query_from_several_threads_they_share_the_pool() {
    let fixture = FundFixture::build();
    let warehouse = fixture.warehouse();

    let handles: Vec<_> = ["SPY", "QQQ", "VTSAX"]
        .into_iter()
        .map(|symbol| {
            let warehouse = warehouse.clone();
            thread::spawn(move || warehouse.fund_facts(symbol, QueryGuardrails::default()))
        })
        .collect();

    let counts: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("thread").expect("facts").row_count)
        .collect();
    assert_eq!(counts, [5, 3, 2]);
}

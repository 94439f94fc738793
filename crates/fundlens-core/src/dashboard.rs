//! Fund report composition.
//!
//! A report issues independent queries for one symbol and reshapes each into
//! a [`Section`]. A query that comes back empty becomes a placeholder
//! message; it never fails the report.

use serde::Serialize;
use thiserror::Error;
use time::Date;
use tracing::{debug, info};

use fundlens_warehouse::{
    FundWindow, HoldingWeight, NetAssetCoverage, QueryGuardrails, SectorWeight, Warehouse,
    WarehouseError,
};

use crate::cards::{
    attribute_cards, Card, InvestmentProfile, NOT_AVAILABLE, RISK_COLUMNS, RISK_METRIC_LABELS, VALUATION_COLUMNS,
    VALUATION_RATIO_LABELS,
};
use crate::charts::{CandlestickChart, DonutChart, VolumeChart};
use crate::dates::{normalize_date, serialize_iso};
use crate::format::{delta_label, Sentiment};
use crate::table::{as_f64, Table};
use crate::CoreError;

pub const INVALID_RANGE: &str = "Please select a valid date range.";
pub const NO_FUNDS: &str = "No funds found.";
pub const NO_BASIC_INFO: &str = "No basic information found for the selected ETF.";
pub const NO_HOLDINGS: &str = "No holdings found for the selected fund.";
pub const NO_SECTORS: &str = "No sector allocation found for the selected fund.";
pub const NO_FACTS: &str = "No daily data found for the selected date range.";

/// Hole size of the report's donut charts.
const REPORT_DONUT_HOLE: f64 = 0.4;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("{}", INVALID_RANGE)]
    InvalidRange,

    #[error(transparent)]
    Warehouse(#[from] WarehouseError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// First and last date with data for one fund.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    #[serde(serialize_with = "serialize_iso")]
    pub min: Date,
    #[serde(serialize_with = "serialize_iso")]
    pub max: Date,
}

/// Inclusive date range chosen within a [`DateWindow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    #[serde(serialize_with = "serialize_iso")]
    pub start: Date,
    #[serde(serialize_with = "serialize_iso")]
    pub end: Date,
}

impl TryFrom<&FundWindow> for DateWindow {
    type Error = CoreError;

    fn try_from(window: &FundWindow) -> Result<Self, Self::Error> {
        Ok(Self {
            min: normalize_date(&window.min_date)?,
            max: normalize_date(&window.max_date)?,
        })
    }
}

impl DateWindow {
    /// The whole window as a range.
    pub fn full(&self) -> DateRange {
        DateRange {
            start: self.min,
            end: self.max,
        }
    }

    /// Turn the values of a two-ended date picker into a range.
    ///
    /// Exactly two values are required, in order, both inside the window.
    pub fn select(&self, values: &[Date]) -> Result<DateRange, ReportError> {
        let [start, end] = values else {
            return Err(ReportError::InvalidRange);
        };
        if start > end || *start < self.min || *end > self.max {
            return Err(ReportError::InvalidRange);
        }
        Ok(DateRange {
            start: *start,
            end: *end,
        })
    }
}

/// Which sections a report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportVariant {
    /// Profile cards and investment strategy.
    Overview,
    /// Overview plus top holdings and enriched portfolio weights.
    Holdings,
    /// Profile, holdings, valuation, sectors and price charts.
    MutualFund,
    /// Every section, risk metrics included.
    #[default]
    Etf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Profile,
    Holdings,
    PortfolioWeights,
    Valuation,
    Sectors,
    Risk,
    Price,
}

impl ReportVariant {
    pub fn sections(self) -> &'static [SectionKind] {
        use SectionKind::*;
        match self {
            Self::Overview => &[Profile],
            Self::Holdings => &[Profile, Holdings, PortfolioWeights],
            Self::MutualFund => &[Profile, Holdings, Valuation, Sectors, Price],
            Self::Etf => &[
                Profile,
                Holdings,
                PortfolioWeights,
                Valuation,
                Sectors,
                Risk,
                Price,
            ],
        }
    }

    pub fn includes(self, kind: SectionKind) -> bool {
        self.sections().contains(&kind)
    }
}

/// One region of a report: content, or the reason there is none.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "content", rename_all = "snake_case")]
pub enum Section<T> {
    Available(T),
    NoData(String),
}

impl<T> Section<T> {
    fn no_data(message: &str) -> Self {
        Self::NoData(message.to_string())
    }

    pub fn available(&self) -> Option<&T> {
        match self {
            Self::Available(content) => Some(content),
            Self::NoData(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileSection {
    pub selected: Card,
    pub data_window: String,
    pub cards: Vec<Card>,
    pub investment: InvestmentProfile,
    pub strategy: Card,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingsSection {
    pub holdings: Vec<HoldingWeight>,
    pub coverage: Option<NetAssetCoverage>,
    pub chart: DonutChart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorSection {
    pub sectors: Vec<SectorWeight>,
    pub chart: DonutChart,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceSection {
    pub candlestick: CandlestickChart,
    pub volume: VolumeChart,
}

/// Newest close and its change from the previous trading day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundSummary {
    pub price_date: Option<String>,
    pub latest_close: Option<f64>,
    pub close_delta: String,
    pub sentiment: Sentiment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<&'static str>,
}

impl FundSummary {
    pub fn from_facts(facts: &Table) -> Self {
        let close_delta = delta_label(facts, "close");
        let sentiment = Sentiment::classify(&close_delta);
        Self {
            price_date: facts
                .value(0, "price_date")
                .and_then(|value| value.as_str())
                .map(|raw| {
                    normalize_date(raw)
                        .map(|date| date.to_string())
                        .unwrap_or_else(|_| raw.to_string())
                }),
            latest_close: facts.value(0, "close").and_then(as_f64),
            close_delta,
            sentiment,
            style: sentiment.style(),
        }
    }
}

/// Every section of one fund's report.
///
/// A `None` section is not part of the report's variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundReport {
    pub symbol: String,
    pub variant: ReportVariant,
    pub window: Option<DateWindow>,
    pub range: Option<DateRange>,
    pub summary: Section<FundSummary>,
    pub profile: Section<ProfileSection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holdings: Option<Section<HoldingsSection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio_weights: Option<Section<Vec<HoldingWeight>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valuation: Option<Section<Table>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Section<SectorSection>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk: Option<Section<Table>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Section<PriceSection>>,
}

impl FundReport {
    /// Report with every section of `variant` replaced by `message`.
    fn placeholder(
        symbol: &str,
        variant: ReportVariant,
        window: Option<DateWindow>,
        message: &str,
    ) -> Self {
        Self {
            symbol: symbol.to_string(),
            variant,
            window,
            range: None,
            summary: Section::no_data(message),
            profile: Section::no_data(message),
            holdings: placeholder_part(variant, SectionKind::Holdings, message),
            portfolio_weights: placeholder_part(variant, SectionKind::PortfolioWeights, message),
            valuation: placeholder_part(variant, SectionKind::Valuation, message),
            sectors: placeholder_part(variant, SectionKind::Sectors, message),
            risk: placeholder_part(variant, SectionKind::Risk, message),
            price: placeholder_part(variant, SectionKind::Price, message),
        }
    }

    /// Placeholder messages of every section with no data.
    pub fn missing_sections(&self) -> Vec<(&'static str, &str)> {
        let sections = [
            ("summary", no_data_message(Some(&self.summary))),
            ("profile", no_data_message(Some(&self.profile))),
            ("holdings", no_data_message(self.holdings.as_ref())),
            ("portfolio_weights", no_data_message(self.portfolio_weights.as_ref())),
            ("valuation", no_data_message(self.valuation.as_ref())),
            ("sectors", no_data_message(self.sectors.as_ref())),
            ("risk", no_data_message(self.risk.as_ref())),
            ("price", no_data_message(self.price.as_ref())),
        ];
        sections
            .into_iter()
            .filter_map(|(name, message)| message.map(|message| (name, message)))
            .collect()
    }
}

fn placeholder_part<T>(variant: ReportVariant, kind: SectionKind, message: &str) -> Option<Section<T>> {
    variant.includes(kind).then(|| Section::no_data(message))
}

fn no_data_message<T>(section: Option<&Section<T>>) -> Option<&str> {
    match section {
        Some(Section::NoData(message)) => Some(message.as_str()),
        _ => None,
    }
}

/// Composes fund reports from warehouse queries.
#[derive(Clone)]
pub struct Dashboard {
    warehouse: Warehouse,
    guardrails: QueryGuardrails,
}

impl Dashboard {
    pub fn new(warehouse: Warehouse) -> Self {
        Self {
            warehouse,
            guardrails: QueryGuardrails::default(),
        }
    }

    pub fn with_guardrails(mut self, guardrails: QueryGuardrails) -> Self {
        self.guardrails = guardrails;
        self
    }

    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    /// Every fund with its data window.
    pub fn universe(&self) -> Result<Vec<FundWindow>, ReportError> {
        Ok(self.warehouse.fund_universe()?)
    }

    /// Data window of one fund, `None` when it has no daily data.
    pub fn window(&self, symbol: &str) -> Result<Option<DateWindow>, ReportError> {
        let universe = self.warehouse.fund_universe()?;
        let Some(fund) = universe.iter().find(|fund| fund.symbol == symbol) else {
            return Ok(None);
        };
        Ok(Some(DateWindow::try_from(fund)?))
    }

    /// Resolve a date-picker selection against the fund's window.
    ///
    /// `None` selects the whole window. A fund without daily data has no
    /// window and yields `Ok(None)`.
    pub fn resolve_range(
        &self,
        symbol: &str,
        selection: Option<&[Date]>,
    ) -> Result<Option<(DateWindow, DateRange)>, ReportError> {
        let Some(window) = self.window(symbol)? else {
            return Ok(None);
        };
        let range = match selection {
            Some(values) => window.select(values)?,
            None => window.full(),
        };
        Ok(Some((window, range)))
    }

    /// Daily facts of one fund within `range`, newest first.
    pub fn facts(&self, symbol: &str, range: DateRange) -> Result<Table, ReportError> {
        let result =
            self.warehouse
                .fund_facts_between(symbol, range.start, range.end, self.guardrails)?;
        Ok(Table::from(result))
    }

    /// Build the report of `symbol` for the chosen date range and variant.
    ///
    /// An invalid selection still yields a report: the window is kept and
    /// every section carries the validation message.
    pub fn report(
        &self,
        symbol: &str,
        selection: Option<&[Date]>,
        variant: ReportVariant,
    ) -> Result<FundReport, ReportError> {
        let Some(window) = self.window(symbol)? else {
            debug!(symbol, "fund has no data window");
            return Ok(FundReport::placeholder(symbol, variant, None, NO_BASIC_INFO));
        };

        let range = match selection {
            Some(values) => match window.select(values) {
                Ok(range) => range,
                Err(_) => {
                    info!(symbol, ?values, "date range selection rejected");
                    return Ok(FundReport::placeholder(
                        symbol,
                        variant,
                        Some(window),
                        INVALID_RANGE,
                    ));
                }
            },
            None => window.full(),
        };

        let Some(profile) = self.warehouse.fund_profile(symbol)? else {
            debug!(symbol, "fund has no basic information");
            return Ok(FundReport::placeholder(symbol, variant, Some(window), NO_BASIC_INFO));
        };

        let facts = self.facts(symbol, range)?;
        info!(
            symbol,
            variant = ?variant,
            start = %range.start,
            end = %range.end,
            facts = facts.len(),
            "building fund report"
        );

        let summary = if facts.is_empty() {
            Section::no_data(NO_FACTS)
        } else {
            Section::Available(FundSummary::from_facts(&facts))
        };

        let profile = Section::Available(ProfileSection {
            selected: Card::new("Selected Fund", symbol),
            data_window: format!(
                "For {symbol}, we can provide data between the {} and {}",
                window.min, window.max
            ),
            cards: attribute_cards(&profile),
            strategy: Card::new(
                "Investment Strategy",
                profile
                    .investment_strategy
                    .clone()
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            investment: InvestmentProfile::build(&profile, &facts),
        });

        let holdings = variant
            .includes(SectionKind::Holdings)
            .then(|| self.holdings_section(symbol))
            .transpose()?;

        let portfolio_weights = variant
            .includes(SectionKind::PortfolioWeights)
            .then(|| -> Result<_, ReportError> {
                let weights = self.warehouse.portfolio_weights(symbol)?;
                Ok(non_empty(weights, NO_HOLDINGS))
            })
            .transpose()?;

        let valuation = variant
            .includes(SectionKind::Valuation)
            .then(|| valuation_section(&facts))
            .transpose()?;

        let sectors = variant
            .includes(SectionKind::Sectors)
            .then(|| self.sector_section(symbol))
            .transpose()?;

        let risk = variant
            .includes(SectionKind::Risk)
            .then(|| risk_section(&facts))
            .transpose()?;

        let price = variant
            .includes(SectionKind::Price)
            .then(|| price_section(&facts))
            .transpose()?;

        Ok(FundReport {
            symbol: symbol.to_string(),
            variant,
            window: Some(window),
            range: Some(range),
            summary,
            profile,
            holdings,
            portfolio_weights,
            valuation,
            sectors,
            risk,
            price,
        })
    }

    fn holdings_section(&self, symbol: &str) -> Result<Section<HoldingsSection>, ReportError> {
        let holdings = self.warehouse.top_holdings(symbol)?;
        if holdings.is_empty() {
            return Ok(Section::no_data(NO_HOLDINGS));
        }

        let coverage = self.warehouse.net_asset_coverage(symbol)?;
        let chart = DonutChart::from_holdings(&holdings, holdings_title(coverage.as_ref()))
            .with_hole(REPORT_DONUT_HOLE);

        Ok(Section::Available(HoldingsSection {
            holdings,
            coverage,
            chart,
        }))
    }

    fn sector_section(&self, symbol: &str) -> Result<Section<SectorSection>, ReportError> {
        let sectors = self.warehouse.sector_allocation(symbol)?;
        if sectors.is_empty() {
            return Ok(Section::no_data(NO_SECTORS));
        }

        let chart = DonutChart::from_sectors(&sectors, "").with_hole(REPORT_DONUT_HOLE);
        Ok(Section::Available(SectorSection { sectors, chart }))
    }
}

/// Title of the top holdings donut.
pub fn holdings_title(coverage: Option<&NetAssetCoverage>) -> String {
    match coverage {
        Some(coverage) => format!(
            "Top 10 holdings as % of portfolio : {} % Net assets",
            coverage.net_assets_pct
        ),
        None => String::from("Top 10 holdings as % of portfolio"),
    }
}

fn non_empty<T>(items: Vec<T>, message: &str) -> Section<Vec<T>> {
    if items.is_empty() {
        Section::no_data(message)
    } else {
        Section::Available(items)
    }
}

/// Distinct valuation ratio rows with display labels.
pub fn valuation_section(facts: &Table) -> Result<Section<Table>, ReportError> {
    if facts.is_empty() {
        return Ok(Section::no_data(NO_FACTS));
    }
    let ratios = facts
        .select(&VALUATION_COLUMNS)?
        .drop_duplicates()
        .relabel_columns(&VALUATION_RATIO_LABELS);
    Ok(Section::Available(ratios))
}

/// Distinct risk metric rows melted to `Metric`/`Value` pairs.
pub fn risk_section(facts: &Table) -> Result<Section<Table>, ReportError> {
    if facts.is_empty() {
        return Ok(Section::no_data(NO_FACTS));
    }
    let metrics = facts
        .select(&RISK_COLUMNS)?
        .drop_duplicates()
        .melt("Metric", "Value")
        .relabel_values("Metric", &RISK_METRIC_LABELS);
    Ok(Section::Available(metrics))
}

pub fn price_section(facts: &Table) -> Result<Section<PriceSection>, ReportError> {
    if facts.is_empty() {
        return Ok(Section::no_data(NO_FACTS));
    }
    Ok(Section::Available(PriceSection {
        candlestick: CandlestickChart::from_facts(facts)?,
        volume: VolumeChart::from_facts(facts)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::date;

    fn window() -> DateWindow {
        DateWindow {
            min: date!(2020 - 01 - 02),
            max: date!(2020 - 12 - 31),
        }
    }

    #[test]
    fn selection_needs_two_ordered_dates_inside_the_window() {
        let window = window();
        let range = window
            .select(&[date!(2020 - 03 - 01), date!(2020 - 06 - 30)])
            .unwrap();
        assert_eq!(range.start, date!(2020 - 03 - 01));
        assert_eq!(range.end, date!(2020 - 06 - 30));

        let single_day = window.select(&[date!(2020 - 03 - 01), date!(2020 - 03 - 01)]);
        assert!(single_day.is_ok());

        for values in [
            vec![],
            vec![date!(2020 - 03 - 01)],
            vec![date!(2020 - 03 - 01), date!(2020 - 04 - 01), date!(2020 - 05 - 01)],
            vec![date!(2020 - 06 - 30), date!(2020 - 03 - 01)],
            vec![date!(2019 - 12 - 31), date!(2020 - 03 - 01)],
            vec![date!(2020 - 03 - 01), date!(2021 - 01 - 01)],
        ] {
            let error = window.select(&values).unwrap_err();
            assert!(matches!(error, ReportError::InvalidRange));
            assert_eq!(error.to_string(), "Please select a valid date range.");
        }
    }

    #[test]
    fn variants_select_section_subsets() {
        assert_eq!(ReportVariant::Overview.sections(), &[SectionKind::Profile]);
        assert!(ReportVariant::Holdings.includes(SectionKind::PortfolioWeights));
        assert!(!ReportVariant::Holdings.includes(SectionKind::Price));
        assert!(ReportVariant::MutualFund.includes(SectionKind::Valuation));
        assert!(!ReportVariant::MutualFund.includes(SectionKind::Risk));
        assert_eq!(ReportVariant::Etf.sections().len(), 7);
    }

    #[test]
    fn holdings_title_mentions_coverage() {
        let coverage = NetAssetCoverage {
            symbol: "SPY".into(),
            net_assets_pct: 27.35,
        };
        assert_eq!(
            holdings_title(Some(&coverage)),
            "Top 10 holdings as % of portfolio : 27.35 % Net assets"
        );
        assert_eq!(holdings_title(None), "Top 10 holdings as % of portfolio");
    }

    #[test]
    fn placeholder_report_only_carries_variant_sections() {
        let report = FundReport::placeholder("ZZZ", ReportVariant::Overview, None, NO_BASIC_INFO);
        assert!(report.holdings.is_none());
        assert!(report.price.is_none());
        assert_eq!(report.profile, Section::NoData(NO_BASIC_INFO.to_string()));

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["profile"]["status"], "no_data");
        assert_eq!(value["profile"]["content"], NO_BASIC_INFO);
        assert!(value.get("holdings").is_none());
    }

    #[test]
    fn rejected_selection_keeps_the_window() {
        let report = FundReport::placeholder("SPY", ReportVariant::Etf, Some(window()), INVALID_RANGE);
        assert_eq!(report.window, Some(window()));
        assert!(report.range.is_none());
        assert_eq!(report.missing_sections().len(), 8);
        assert!(report
            .missing_sections()
            .iter()
            .all(|(_, message)| *message == INVALID_RANGE));
    }

    #[test]
    fn summary_classifies_the_close_delta() {
        let facts = Table::new(
            vec!["price_date".into(), "close".into()],
            vec![
                vec![json!("2020-01-03 00:00:00"), json!(90.0)],
                vec![json!("2020-01-02"), json!(100.0)],
            ],
        );
        let summary = FundSummary::from_facts(&facts);
        assert_eq!(summary.close_delta, "-10.00%");
        assert_eq!(summary.sentiment, Sentiment::Negative);
        assert_eq!(summary.latest_close, Some(90.0));
        assert_eq!(summary.price_date.as_deref(), Some("2020-01-03"));
        assert!(summary.style.is_some());
    }

    #[test]
    fn date_ranges_serialize_as_iso_dates() {
        let value = serde_json::to_value(window().full()).unwrap();
        assert_eq!(value, json!({ "start": "2020-01-02", "end": "2020-12-31" }));
    }
}

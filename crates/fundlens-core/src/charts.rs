//! Renderer-neutral chart descriptions.
//!
//! Each chart is plain data. [`DonutChart::to_plotly`] and friends export a
//! Plotly figure (`{"data": [...], "layout": {...}}`) for an external
//! renderer.

use serde::Serialize;
use serde_json::{json, Value};
use time::Date;

use fundlens_warehouse::{HoldingWeight, SectorWeight};

use crate::dates::normalize_date;
use crate::table::{as_f64, Table};
use crate::CoreError;

pub const DEFAULT_HOLE: f64 = 0.3;
pub const LABEL_PERCENT: &str = "label+percent";
pub const DONUT_HOVER_TEMPLATE: &str = "<b>%{label}</b><br>%{value}<br><extra></extra>";

pub const CANDLESTICK_TITLE: &str = "Open, High, Low, Close (OHLC)";
pub const VOLUME_TITLE: &str = "Trading Volume";

/// Ring-shaped pie chart of a compositional breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DonutChart {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
    pub hole: f64,
    pub title: String,
    pub text_info: String,
    pub hover_info: String,
    pub hover_template: String,
    pub show_legend: bool,
}

impl DonutChart {
    pub fn new(labels: Vec<String>, values: Vec<f64>, title: impl Into<String>) -> Self {
        Self {
            labels,
            values,
            hole: DEFAULT_HOLE,
            title: title.into(),
            text_info: LABEL_PERCENT.to_string(),
            hover_info: LABEL_PERCENT.to_string(),
            hover_template: DONUT_HOVER_TEMPLATE.to_string(),
            show_legend: false,
        }
    }

    pub fn with_hole(mut self, hole: f64) -> Self {
        self.hole = hole;
        self
    }

    pub fn from_holdings(holdings: &[HoldingWeight], title: impl Into<String>) -> Self {
        Self::new(
            holdings.iter().map(|holding| holding.name.clone()).collect(),
            holdings.iter().map(|holding| holding.weight_pct).collect(),
            title,
        )
    }

    pub fn from_sectors(sectors: &[SectorWeight], title: impl Into<String>) -> Self {
        Self::new(
            sectors.iter().map(|sector| sector.sector.clone()).collect(),
            sectors.iter().map(|sector| sector.weight_pct).collect(),
            title,
        )
    }

    pub fn to_plotly(&self) -> Value {
        json!({
            "data": [{
                "type": "pie",
                "labels": self.labels,
                "values": self.values,
                "hole": self.hole,
                "textinfo": self.text_info,
                "hoverinfo": self.hover_info,
                "hovertemplate": self.hover_template,
            }],
            "layout": {
                "title": { "text": self.title },
                "showlegend": self.show_legend,
            }
        })
    }
}

/// Axis titles shared by the time-series charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Axes {
    pub x_title: String,
    pub y_title: String,
}

impl Axes {
    fn new(x_title: &str, y_title: &str) -> Self {
        Self {
            x_title: x_title.to_string(),
            y_title: y_title.to_string(),
        }
    }

    fn to_layout(&self, title: &str) -> Value {
        json!({
            "title": { "text": title },
            "xaxis": { "title": { "text": self.x_title } },
            "yaxis": { "title": { "text": self.y_title } },
        })
    }
}

/// Daily OHLC price chart, oldest date first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickChart {
    pub x: Vec<String>,
    pub open: Vec<Option<f64>>,
    pub high: Vec<Option<f64>>,
    pub low: Vec<Option<f64>>,
    pub close: Vec<Option<f64>>,
    pub increasing_color: String,
    pub decreasing_color: String,
    pub title: String,
    pub axes: Axes,
}

impl CandlestickChart {
    /// Build from a fact series in any row order.
    pub fn from_facts(facts: &Table) -> Result<Self, CoreError> {
        let (x, mut series) = ascending_series(facts, &["open", "high", "low", "close"])?;
        let close = series.pop().unwrap_or_default();
        let low = series.pop().unwrap_or_default();
        let high = series.pop().unwrap_or_default();
        let open = series.pop().unwrap_or_default();

        Ok(Self {
            x,
            open,
            high,
            low,
            close,
            increasing_color: "green".to_string(),
            decreasing_color: "red".to_string(),
            title: CANDLESTICK_TITLE.to_string(),
            axes: Axes::new("Date", "Price"),
        })
    }

    pub fn to_plotly(&self) -> Value {
        json!({
            "data": [{
                "type": "candlestick",
                "x": self.x,
                "open": self.open,
                "high": self.high,
                "low": self.low,
                "close": self.close,
                "increasing": { "line": { "color": self.increasing_color } },
                "decreasing": { "line": { "color": self.decreasing_color } },
            }],
            "layout": self.axes.to_layout(&self.title),
        })
    }
}

/// Daily traded volume as a line, oldest date first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeChart {
    pub x: Vec<String>,
    pub y: Vec<Option<f64>>,
    pub line_color: String,
    pub title: String,
    pub axes: Axes,
}

impl VolumeChart {
    pub fn from_facts(facts: &Table) -> Result<Self, CoreError> {
        let (x, mut series) = ascending_series(facts, &["volume"])?;

        Ok(Self {
            x,
            y: series.pop().unwrap_or_default(),
            line_color: "blue".to_string(),
            title: VOLUME_TITLE.to_string(),
            axes: Axes::new("Date", "Volume"),
        })
    }

    pub fn to_plotly(&self) -> Value {
        json!({
            "data": [{
                "type": "scatter",
                "mode": "lines",
                "x": self.x,
                "y": self.y,
                "line": { "color": self.line_color },
            }],
            "layout": self.axes.to_layout(&self.title),
        })
    }
}

/// Dates and the named numeric columns, sorted by `price_date` ascending.
fn ascending_series(
    facts: &Table,
    columns: &[&str],
) -> Result<(Vec<String>, Vec<Vec<Option<f64>>>), CoreError> {
    let dates = facts
        .column("price_date")?
        .into_iter()
        .map(|value| match value {
            Value::String(text) => normalize_date(text),
            other => Err(CoreError::InvalidDate {
                value: other.to_string(),
            }),
        })
        .collect::<Result<Vec<Date>, _>>()?;

    let values = columns
        .iter()
        .map(|column| facts.column(column))
        .collect::<Result<Vec<_>, _>>()?;

    let mut order: Vec<usize> = (0..dates.len()).collect();
    order.sort_by_key(|&row| dates[row]);

    let x = order.iter().map(|&row| dates[row].to_string()).collect();
    let series = values
        .iter()
        .map(|column| order.iter().map(|&row| as_f64(column[row])).collect())
        .collect();

    Ok((x, series))
}

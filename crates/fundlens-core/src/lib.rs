//! # Fundlens Core
//!
//! Presentation transforms and report composition for the fundlens fund
//! analytics toolkit.
//!
//! ## Overview
//!
//! Query results from [`fundlens_warehouse`] are reshaped here into
//! display-ready values. Nothing in this crate renders; charts are emitted as
//! renderer-neutral descriptions with a Plotly figure export.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`table`] | Column-named JSON table with `select`, `drop_duplicates` and `melt` |
//! | [`format`] | Currency strings, deltas and sentiment styling |
//! | [`dates`] | Calendar date normalization |
//! | [`charts`] | Donut, candlestick and volume chart descriptions |
//! | [`cards`] | Investment profile card and column label maps |
//! | [`dashboard`] | Date-range selection and fund report composition |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use fundlens_core::dashboard::{Dashboard, ReportVariant};
//! use fundlens_warehouse::Warehouse;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let dashboard = Dashboard::new(Warehouse::open_default()?);
//!     let report = dashboard.report("SPY", None, ReportVariant::Etf)?;
//!
//!     for (section, message) in report.missing_sections() {
//!         println!("{section}: {message}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod cards;
pub mod charts;
pub mod dashboard;
pub mod dates;
mod error;
pub mod format;
pub mod table;

pub use cards::{attribute_cards, Card, InvestmentProfile};
pub use charts::{CandlestickChart, DonutChart, VolumeChart};
pub use dashboard::{
    Dashboard, DateRange, DateWindow, FundReport, ReportError, ReportVariant, Section,
};
pub use dates::normalize_date;
pub use error::CoreError;
pub use format::{delta, delta_label, format_currency, DeltaError, Sentiment};
pub use table::Table;

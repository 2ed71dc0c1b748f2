//! UPS battery runtime charts and their PDF reports.
//!
//! [`dataset`] holds the runtime tables, [`chart`] rasterises them, and
//! [`export::ReportExporter`] composes the chart snapshot, the data table and
//! the supporting text into a dated PDF file.

pub mod assets;
pub mod chart;
pub mod clock;
pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod fonts;
pub mod format;
pub mod imaging;
pub mod layout;
pub mod metrics;
pub mod model;
pub mod render;
pub mod sink;
pub mod snapshot;

pub use config::ReportConfig;
pub use dataset::{runtime_table, KvaRating, RuntimeDataset, RuntimeSeries};
pub use error::{ReportError, ReportResult};
pub use export::{ExportSummary, ReportExporter};

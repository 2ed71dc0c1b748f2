//! Error types for the report pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::dataset::KvaRating;

pub type ReportResult<T> = Result<T, ReportError>;

/// Violations of the runtime dataset invariants.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("dataset has no load points")]
    NoLoadPoints,

    #[error("dataset has no runtime series")]
    NoSeries,

    #[error("load point {index} is not finite: {value}")]
    NonFiniteLoad { index: usize, value: f64 },

    #[error("load points must be strictly increasing: {previous} is followed by {value} at index {index}")]
    LoadNotIncreasing {
        index: usize,
        previous: f64,
        value: f64,
    },

    #[error("series '{series}' has {actual} values but the dataset has {expected} load points")]
    LengthMismatch {
        series: String,
        expected: usize,
        actual: usize,
    },

    #[error("series '{series}' has an invalid runtime {value} at index {index}")]
    InvalidRuntime {
        series: String,
        index: usize,
        value: f64,
    },

    #[error("dataset belongs to {dataset} kVA but {requested} kVA was requested")]
    RatingMismatch {
        requested: KvaRating,
        dataset: KvaRating,
    },

    #[error("unknown kVA rating '{0}'")]
    UnknownRating(String),
}

/// Failures while rasterising the runtime chart.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("invalid chart size: width={width}, height={height}")]
    InvalidSize { width: u32, height: u32 },

    #[error("chart drawing failed: {0}")]
    Render(String),

    #[error("label font data is not a usable TrueType font")]
    InvalidFont,

    #[error("no chart label font found. Checked: {0}")]
    FontNotFound(String),

    #[error("failed to read font file {path}")]
    FontIo {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failures while acquiring the chart snapshot. These abort an export.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("chart snapshot has no pixels ({width}x{height})")]
    Empty { width: u32, height: u32 },

    #[error("chart surface is unavailable: {0}")]
    Unavailable(String),

    #[error("failed to decode chart snapshot")]
    Decode(#[from] image::ImageError),

    #[error("failed to read chart snapshot from {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Chart(#[from] ChartError),
}

/// Failures while loading the optional verification asset. These never abort an export.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read asset {location}")]
    Io {
        location: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to fetch asset {location}: {message}")]
    Http { location: String, message: String },

    #[error("asset {location} is not reachable without the `http-assets` feature")]
    UnsupportedLocation { location: String },

    #[error("asset {location} did not arrive within {timeout_ms} ms")]
    Timeout { location: String, timeout_ms: u128 },

    #[error("failed to decode asset image")]
    Decode(#[from] image::ImageError),

    #[error("asset loading is disabled")]
    Disabled,
}

/// Top-level error of a report export.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("invalid runtime dataset")]
    Dataset(#[from] DatasetError),

    #[error("chart snapshot could not be acquired")]
    Snapshot(#[from] SnapshotError),

    #[error("failed to load report configuration")]
    Config(#[from] config::ConfigError),

    #[error("PDF generation failed")]
    Pdf(#[from] printpdf::Error),

    #[error("failed to save {filename}")]
    Sink {
        filename: String,
        #[source]
        source: io::Error,
    },
}

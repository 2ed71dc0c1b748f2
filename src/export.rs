//! The report export pipeline.
//!
//! An export validates its inputs, waits for the chart snapshot, waits for the
//! optional verification badge, then composes and renders the document without
//! further suspension.  The sink only ever sees a complete document.

use std::error::Error as _;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, error, info};

use crate::assets::{self, AssetSource, DeploymentAssets};
use crate::clock::{Clock, SystemClock};
use crate::config::ReportConfig;
use crate::dataset::{KvaRating, RuntimeDataset};
use crate::error::{ReportError, ReportResult};
use crate::format;
use crate::layout::{self, ReportContent};
use crate::model::ReportLayout;
use crate::render::{self, ReportImages};
use crate::sink::{DirectorySink, SaveSink};
use crate::snapshot::SnapshotProvider;

/// A rendered report that has not been saved yet.
#[derive(Clone, Debug)]
pub struct ComposedReport {
    pub filename: String,
    pub layout: ReportLayout,
    pub bytes: Vec<u8>,
    pub verification_included: bool,
}

/// Outcome of a successful export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportSummary {
    pub filename: String,
    /// Where the sink stored the file, when it stores files on disk.
    pub path: Option<PathBuf>,
    pub page_count: usize,
    pub byte_len: usize,
    pub verification_included: bool,
}

/// Runs report exports against injected collaborators.
pub struct ReportExporter {
    config: ReportConfig,
    clock: Arc<dyn Clock>,
    assets: Arc<dyn AssetSource>,
    sink: Arc<dyn SaveSink>,
}

impl ReportExporter {
    /// An exporter using the system clock, deployment assets and the current directory.
    pub fn new(config: ReportConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
            assets: Arc::new(DeploymentAssets::new()),
            sink: Arc::new(DirectorySink::new(".")),
        }
    }

    /// Sets the clock and returns the updated exporter.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Sets the asset source and returns the updated exporter.
    pub fn with_assets(mut self, assets: impl AssetSource + 'static) -> Self {
        self.assets = Arc::new(assets);
        self
    }

    /// Sets the save sink and returns the updated exporter.
    pub fn with_sink(mut self, sink: impl SaveSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    /// Builds the document for `dataset` without saving it.
    pub async fn compose(
        &self,
        rating: KvaRating,
        dataset: &RuntimeDataset,
        snapshots: &dyn SnapshotProvider,
    ) -> ReportResult<ComposedReport> {
        dataset.validate()?;
        dataset.ensure_rating(rating)?;

        let snapshot = snapshots.capture(dataset).await?;
        let verification =
            assets::load_verification_image(self.assets.as_ref(), &self.config.assets).await;

        let generated_on = self.clock.today();
        let branding = &self.config.branding;
        let layout = layout::compose(&ReportContent {
            dataset,
            chart_px: snapshot.dimensions(),
            generated_on,
            include_verification: verification.is_some(),
            branding,
            policy: self.config.layout.overflow,
        });

        let bytes = render::render_pdf(
            &layout,
            &ReportImages {
                chart: snapshot.image(),
                verification: verification.as_ref(),
            },
            &branding.title,
        )?;

        Ok(ComposedReport {
            filename: format::report_filename(&branding.file_prefix, rating, generated_on),
            layout,
            bytes,
            verification_included: verification.is_some(),
        })
    }

    /// Composes the report and hands it to the sink, returning any failure.
    pub async fn try_export(
        &self,
        rating: KvaRating,
        dataset: &RuntimeDataset,
        snapshots: &dyn SnapshotProvider,
    ) -> ReportResult<ExportSummary> {
        let report = self.compose(rating, dataset, snapshots).await?;
        let page_count = report.layout.page_count();
        let byte_len = report.bytes.len();
        debug!(
            "handing {} ({} page(s), {} bytes) to the sink",
            report.filename, page_count, byte_len
        );

        let path = self
            .sink
            .save(&report.filename, report.bytes)
            .await
            .map_err(|source| ReportError::Sink {
                filename: report.filename.clone(),
                source,
            })?;

        info!("exported {}", report.filename);
        Ok(ExportSummary {
            filename: report.filename,
            path,
            page_count,
            byte_len,
            verification_included: report.verification_included,
        })
    }

    /// Exports the report, logging instead of returning failures.
    ///
    /// Returns `None` when no file was produced.
    pub async fn export_report(
        &self,
        rating: KvaRating,
        dataset: &RuntimeDataset,
        snapshots: &dyn SnapshotProvider,
    ) -> Option<ExportSummary> {
        match self.try_export(rating, dataset, snapshots).await {
            Ok(summary) => Some(summary),
            Err(err) => {
                error!("report export for {} kVA failed: {}", rating, error_chain(&err));
                None
            }
        }
    }
}

/// Renders `err` followed by each of its sources, separated by `": "`.
pub fn error_chain(err: &ReportError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::assets::NoAssets;
    use crate::clock::FixedClock;
    use crate::dataset::runtime_table;
    use crate::error::{DatasetError, SnapshotError};
    use crate::sink::MemorySink;
    use crate::snapshot::{ChartSnapshot, StaticSnapshot};

    fn exporter(sink: MemorySink) -> ReportExporter {
        ReportExporter::new(ReportConfig::default())
            .with_clock(FixedClock::new(
                NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"),
            ))
            .with_assets(NoAssets)
            .with_sink(sink)
    }

    fn snapshot() -> StaticSnapshot {
        StaticSnapshot::new(
            ChartSnapshot::from_rgb(image::RgbImage::new(120, 80)).expect("snapshot"),
        )
    }

    #[tokio::test]
    async fn mismatched_rating_produces_no_file() {
        let sink = MemorySink::new();
        let dataset = runtime_table().get(KvaRating::Two);
        let result = exporter(sink.clone())
            .try_export(KvaRating::Three, dataset, &snapshot())
            .await;
        assert!(matches!(
            result,
            Err(ReportError::Dataset(DatasetError::RatingMismatch { .. }))
        ));
        assert!(sink.files().is_empty());
    }

    #[tokio::test]
    async fn saved_under_the_dated_filename() {
        let sink = MemorySink::new();
        let dataset = runtime_table().get(KvaRating::Two);
        let summary = exporter(sink.clone())
            .export_report(KvaRating::Two, dataset, &snapshot())
            .await
            .expect("export succeeds");
        assert_eq!(summary.filename, "Ksavio_UPS_2kVA_Runtime_Chart_2024-03-15.pdf");
        assert!(!summary.verification_included);
        assert_eq!(summary.path, None);

        let files = sink.files();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].0, summary.filename);
        assert_eq!(files[0].1.len(), summary.byte_len);
    }

    #[test]
    fn error_chain_includes_sources() {
        let err = ReportError::from(SnapshotError::Unavailable("surface detached".to_owned()));
        assert_eq!(
            error_chain(&err),
            "chart snapshot could not be acquired: chart surface is unavailable: surface detached"
        );
    }
}

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use image::{DynamicImage, ImageOutputFormat, RgbImage};

use ups_runtime_report::assets::{AssetLocation, AssetSource, DeploymentAssets};
use ups_runtime_report::clock::FixedClock;
use ups_runtime_report::error::{AssetError, SnapshotError};
use ups_runtime_report::model::ImageSlot;
use ups_runtime_report::sink::{DirectorySink, MemorySink};
use ups_runtime_report::snapshot::{ChartSnapshot, SnapshotProvider, StaticSnapshot};
use ups_runtime_report::{
    runtime_table, KvaRating, ReportConfig, ReportError, ReportExporter, RuntimeDataset,
};

struct DetachedChart;

#[async_trait]
impl SnapshotProvider for DetachedChart {
    async fn capture(&self, _dataset: &RuntimeDataset) -> Result<ChartSnapshot, SnapshotError> {
        Err(SnapshotError::Unavailable("chart is not attached".to_owned()))
    }
}

struct RejectingAssets;

#[async_trait]
impl AssetSource for RejectingAssets {
    async fn fetch(&self, location: &AssetLocation) -> Result<Vec<u8>, AssetError> {
        Err(AssetError::Http {
            location: location.to_string(),
            message: "404 Not Found".to_owned(),
        })
    }
}

struct HangingAssets;

#[async_trait]
impl AssetSource for HangingAssets {
    async fn fetch(&self, _location: &AssetLocation) -> Result<Vec<u8>, AssetError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        Ok(Vec::new())
    }
}

struct CorruptAssets;

#[async_trait]
impl AssetSource for CorruptAssets {
    async fn fetch(&self, _location: &AssetLocation) -> Result<Vec<u8>, AssetError> {
        Ok(b"<html>not an image</html>".to_vec())
    }
}

fn march_15() -> FixedClock {
    FixedClock::new(NaiveDate::from_ymd_opt(2024, 3, 15).expect("valid date"))
}

fn snapshot() -> StaticSnapshot {
    StaticSnapshot::new(ChartSnapshot::from_rgb(RgbImage::new(1200, 800)).expect("snapshot"))
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = env::temp_dir().join(format!("ups-report-export-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_badge(root: &Path) {
    fs::create_dir_all(root.join("images")).expect("create images dir");
    let mut png = Vec::new();
    DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, image::Rgb([40, 160, 60])))
        .write_to(&mut png, ImageOutputFormat::Png)
        .expect("encode badge");
    fs::write(root.join("images/verified.png"), png).expect("write badge");
}

#[tokio::test]
async fn rejected_asset_fetch_still_produces_the_report() {
    let sink = MemorySink::new();
    let exporter = ReportExporter::new(ReportConfig::default())
        .with_clock(march_15())
        .with_assets(RejectingAssets)
        .with_sink(sink.clone());

    let dataset = runtime_table().get(KvaRating::Three);
    let summary = exporter
        .export_report(KvaRating::Three, dataset, &snapshot())
        .await
        .expect("report produced");

    assert!(!summary.verification_included);
    assert_eq!(sink.files().len(), 1);
}

#[tokio::test]
async fn timed_out_asset_fetch_still_produces_the_report() {
    let mut config = ReportConfig::default();
    config.assets.timeout_ms = Some(20);
    let sink = MemorySink::new();
    let exporter = ReportExporter::new(config)
        .with_clock(march_15())
        .with_assets(HangingAssets)
        .with_sink(sink.clone());

    let dataset = runtime_table().get(KvaRating::One);
    let report = exporter
        .compose(KvaRating::One, dataset, &snapshot())
        .await
        .expect("report composed");

    assert!(!report.verification_included);
    for page in report.layout.pages() {
        assert!(page.images().all(|(slot, _)| slot == ImageSlot::Chart));
        assert!(!page.contains_text("VERIFIED"));
    }
}

#[tokio::test]
async fn undecodable_badge_is_skipped() {
    let exporter = ReportExporter::new(ReportConfig::default())
        .with_clock(march_15())
        .with_assets(CorruptAssets)
        .with_sink(MemorySink::new());
    let dataset = runtime_table().get(KvaRating::Two);
    let summary = exporter
        .try_export(KvaRating::Two, dataset, &snapshot())
        .await
        .expect("report produced");
    assert!(!summary.verification_included);
}

#[tokio::test]
async fn snapshot_failure_aborts_without_a_file() {
    let sink = MemorySink::new();
    let exporter = ReportExporter::new(ReportConfig::default())
        .with_clock(march_15())
        .with_assets(RejectingAssets)
        .with_sink(sink.clone());
    let dataset = runtime_table().get(KvaRating::Six);

    let result = exporter
        .try_export(KvaRating::Six, dataset, &DetachedChart)
        .await;
    assert!(matches!(
        result,
        Err(ReportError::Snapshot(SnapshotError::Unavailable(_)))
    ));

    assert!(exporter
        .export_report(KvaRating::Six, dataset, &DetachedChart)
        .await
        .is_none());
    assert!(sink.files().is_empty());
}

#[tokio::test]
async fn verification_badge_comes_from_the_deployment_root() {
    let root = scratch_dir("badge");
    write_badge(&root);
    let out = scratch_dir("badge-out");

    let exporter = ReportExporter::new(ReportConfig::default().with_asset_root(root.display().to_string()))
        .with_clock(march_15())
        .with_assets(DeploymentAssets::new())
        .with_sink(DirectorySink::new(&out));

    let dataset = runtime_table().get(KvaRating::Two);
    let summary = exporter
        .try_export(KvaRating::Two, dataset, &snapshot())
        .await
        .expect("report produced");

    assert!(summary.verification_included);
    let expected = out.join("Ksavio_UPS_2kVA_Runtime_Chart_2024-03-15.pdf");
    assert_eq!(summary.path.as_ref(), Some(&expected));
    let bytes = fs::read(&expected).expect("report written");
    assert_eq!(bytes.len(), summary.byte_len);
    let document = lopdf::Document::load_mem(&bytes).expect("parse report");
    assert_eq!(document.get_pages().len(), summary.page_count);

    fs::remove_dir_all(&root).ok();
    fs::remove_dir_all(&out).ok();
}

#[tokio::test]
async fn disabled_verification_skips_the_block() {
    let root = scratch_dir("disabled");
    write_badge(&root);

    let exporter = ReportExporter::new(
        ReportConfig::default()
            .with_asset_root(root.display().to_string())
            .with_verification(false),
    )
    .with_clock(march_15())
    .with_sink(MemorySink::new());

    let dataset = runtime_table().get(KvaRating::One);
    let report = exporter
        .compose(KvaRating::One, dataset, &snapshot())
        .await
        .expect("report composed");
    assert!(!report.verification_included);

    fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn repeated_exports_compose_identical_layouts() {
    let root = scratch_dir("repeat");
    write_badge(&root);
    let exporter = ReportExporter::new(ReportConfig::default().with_asset_root(root.display().to_string()))
        .with_clock(march_15())
        .with_sink(MemorySink::new());

    let dataset = runtime_table().get(KvaRating::Ten);
    let first = exporter
        .compose(KvaRating::Ten, dataset, &snapshot())
        .await
        .expect("first export");
    let second = exporter
        .compose(KvaRating::Ten, dataset, &snapshot())
        .await
        .expect("second export");

    assert_eq!(first.filename, second.filename);
    assert_eq!(first.layout, second.layout);
    assert!(first.verification_included && second.verification_included);

    fs::remove_dir_all(&root).ok();
}

#[tokio::test]
async fn every_builtin_rating_exports() {
    let sink = MemorySink::new();
    let exporter = ReportExporter::new(ReportConfig::default())
        .with_clock(march_15())
        .with_assets(RejectingAssets)
        .with_sink(sink.clone());

    for dataset in runtime_table().iter() {
        let summary = exporter
            .export_report(dataset.rating(), dataset, &snapshot())
            .await
            .expect("report produced");
        assert_eq!(
            summary.filename,
            format!("Ksavio_UPS_{}kVA_Runtime_Chart_2024-03-15.pdf", dataset.rating())
        );
    }
    assert_eq!(sink.files().len(), KvaRating::ALL.len());
}

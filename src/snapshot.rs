//! Chart snapshots and the providers that capture them.

use std::path::PathBuf;

use async_trait::async_trait;
use image::{DynamicImage, GenericImageView, ImageOutputFormat, RgbImage};
use log::debug;

use crate::chart::ChartRenderer;
use crate::dataset::RuntimeDataset;
use crate::error::SnapshotError;
use crate::imaging;

/// A rasterised chart and its pixel dimensions.
#[derive(Clone, Debug)]
pub struct ChartSnapshot {
    image: DynamicImage,
}

impl ChartSnapshot {
    /// Wraps `image`, rejecting images without pixels.
    pub fn new(image: DynamicImage) -> Result<Self, SnapshotError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(SnapshotError::Empty { width, height });
        }
        Ok(Self { image })
    }

    pub fn from_rgb(image: RgbImage) -> Result<Self, SnapshotError> {
        Self::new(DynamicImage::ImageRgb8(image))
    }

    /// Decodes an encoded image such as a PNG export of the chart.
    pub fn from_bytes(bytes: impl AsRef<[u8]>) -> Result<Self, SnapshotError> {
        Self::new(imaging::decode_image_from_bytes(bytes)?)
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Encodes the snapshot as PNG.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        let mut bytes = Vec::new();
        self.image.write_to(&mut bytes, ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}

/// Produces the chart snapshot embedded in a report.
///
/// A failing provider aborts the export: a report is never produced without its chart.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    async fn capture(&self, dataset: &RuntimeDataset) -> Result<ChartSnapshot, SnapshotError>;
}

/// Hands out a copy of a snapshot captured earlier.
#[derive(Clone, Debug)]
pub struct StaticSnapshot(ChartSnapshot);

impl StaticSnapshot {
    pub fn new(snapshot: ChartSnapshot) -> Self {
        Self(snapshot)
    }
}

#[async_trait]
impl SnapshotProvider for StaticSnapshot {
    async fn capture(&self, _dataset: &RuntimeDataset) -> Result<ChartSnapshot, SnapshotError> {
        Ok(self.0.clone())
    }
}

/// Reads the snapshot from an image file on every capture.
#[derive(Clone, Debug)]
pub struct PngFileSnapshot {
    path: PathBuf,
}

impl PngFileSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SnapshotProvider for PngFileSnapshot {
    async fn capture(&self, _dataset: &RuntimeDataset) -> Result<ChartSnapshot, SnapshotError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| SnapshotError::Io {
                path: self.path.clone(),
                source,
            })?;
        debug!("read chart snapshot from {}", self.path.display());
        ChartSnapshot::from_bytes(bytes)
    }
}

/// Rasterises the dataset with [`ChartRenderer`] on every capture.
#[derive(Clone, Debug, Default)]
pub struct RenderedChart {
    renderer: ChartRenderer,
}

impl RenderedChart {
    pub fn new(renderer: ChartRenderer) -> Self {
        Self { renderer }
    }
}

#[async_trait]
impl SnapshotProvider for RenderedChart {
    async fn capture(&self, dataset: &RuntimeDataset) -> Result<ChartSnapshot, SnapshotError> {
        let image = self.renderer.render(dataset)?;
        ChartSnapshot::from_rgb(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::ChartStyle;
    use crate::dataset::{runtime_table, KvaRating};

    #[test]
    fn empty_images_are_rejected() {
        let result = ChartSnapshot::from_rgb(RgbImage::new(0, 10));
        assert!(matches!(
            result,
            Err(SnapshotError::Empty {
                width: 0,
                height: 10
            })
        ));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        assert!(matches!(
            ChartSnapshot::from_bytes(b"definitely not a png"),
            Err(SnapshotError::Decode(_))
        ));
    }

    #[test]
    fn png_encoding_keeps_the_dimensions() {
        let snapshot = ChartSnapshot::from_rgb(RgbImage::new(12, 8)).expect("snapshot");
        let bytes = snapshot.to_png_bytes().expect("encode");
        let decoded = ChartSnapshot::from_bytes(bytes).expect("decode");
        assert_eq!(decoded.dimensions(), (12, 8));
    }

    #[tokio::test]
    async fn missing_snapshot_file_is_an_io_error() {
        let provider = PngFileSnapshot::new("/nonexistent/chart.png");
        let dataset = runtime_table().get(KvaRating::One);
        assert!(matches!(
            provider.capture(dataset).await,
            Err(SnapshotError::Io { .. })
        ));
    }

    #[tokio::test]
    async fn rendered_chart_matches_the_style_size() {
        let provider = RenderedChart::new(ChartRenderer::new(ChartStyle {
            width_px: 200,
            height_px: 100,
            ..ChartStyle::default()
        }));
        let dataset = runtime_table().get(KvaRating::Six);
        let snapshot = provider.capture(dataset).await.expect("capture");
        assert_eq!(snapshot.dimensions(), (200, 100));
    }

    #[tokio::test]
    async fn rendering_failures_surface_as_snapshot_errors() {
        let provider = RenderedChart::new(ChartRenderer::new(ChartStyle {
            height_px: 0,
            ..ChartStyle::default()
        }));
        let dataset = runtime_table().get(KvaRating::One);
        assert!(matches!(
            provider.capture(dataset).await,
            Err(SnapshotError::Chart(_))
        ));
    }
}

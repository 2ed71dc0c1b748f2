//! Optional static assets such as the verification badge.
//!
//! Assets live under a deployment root that is either a local directory or, with
//! the `http-assets` feature, an HTTP(S) base URL.  A missing or broken asset
//! never fails an export; callers get `None` and a warning in the log.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use log::{debug, warn};

use crate::config::AssetSettings;
use crate::error::AssetError;
use crate::imaging;

/// Resolved location of an asset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetLocation {
    File(PathBuf),
    Url(String),
}

impl fmt::Display for AssetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetLocation::File(path) => write!(f, "{}", path.display()),
            AssetLocation::Url(url) => f.write_str(url),
        }
    }
}

fn is_url(root: &str) -> bool {
    root.starts_with("http://") || root.starts_with("https://")
}

/// Joins `relative` onto the deployment `root`.
pub fn resolve_asset(root: &str, relative: &str) -> AssetLocation {
    let relative = relative.trim_start_matches('/');
    if is_url(root) {
        AssetLocation::Url(format!("{}/{}", root.trim_end_matches('/'), relative))
    } else {
        AssetLocation::File(Path::new(root).join(relative))
    }
}

/// Fetches the raw bytes of an asset.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, location: &AssetLocation) -> Result<Vec<u8>, AssetError>;
}

/// Reads assets from the file system and, with `http-assets`, over HTTP.
#[derive(Clone, Debug, Default)]
pub struct DeploymentAssets {
    #[cfg(feature = "http-assets")]
    client: reqwest::Client,
}

impl DeploymentAssets {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "http-assets")]
    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let http_error = |err: reqwest::Error| AssetError::Http {
            location: url.to_owned(),
            message: err.to_string(),
        };
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(http_error)?;
        let bytes = response.bytes().await.map_err(http_error)?;
        Ok(bytes.to_vec())
    }

    #[cfg(not(feature = "http-assets"))]
    async fn fetch_url(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        Err(AssetError::UnsupportedLocation {
            location: url.to_owned(),
        })
    }
}

#[async_trait]
impl AssetSource for DeploymentAssets {
    async fn fetch(&self, location: &AssetLocation) -> Result<Vec<u8>, AssetError> {
        match location {
            AssetLocation::File(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|source| AssetError::Io {
                        location: path.display().to_string(),
                        source,
                    })
            }
            AssetLocation::Url(url) => self.fetch_url(url).await,
        }
    }
}

/// An asset source that never has anything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAssets;

#[async_trait]
impl AssetSource for NoAssets {
    async fn fetch(&self, _location: &AssetLocation) -> Result<Vec<u8>, AssetError> {
        Err(AssetError::Disabled)
    }
}

/// Fetches `location`, giving up after `timeout` when one is set.
pub async fn fetch_with_timeout(
    source: &dyn AssetSource,
    location: &AssetLocation,
    timeout: Option<Duration>,
) -> Result<Vec<u8>, AssetError> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, source.fetch(location))
            .await
            .map_err(|_| AssetError::Timeout {
                location: location.to_string(),
                timeout_ms: limit.as_millis(),
            })?,
        None => source.fetch(location).await,
    }
}

async fn fetch_image(
    source: &dyn AssetSource,
    location: &AssetLocation,
    timeout: Option<Duration>,
) -> Result<DynamicImage, AssetError> {
    let bytes = fetch_with_timeout(source, location, timeout).await?;
    Ok(imaging::decode_image_from_bytes(bytes)?)
}

/// Loads the verification badge described by `settings`.
///
/// Returns `None` when the block is disabled or the image cannot be fetched or decoded.
pub async fn load_verification_image(
    source: &dyn AssetSource,
    settings: &AssetSettings,
) -> Option<DynamicImage> {
    if !settings.enabled {
        debug!("verification block disabled");
        return None;
    }

    let location = resolve_asset(&settings.resolved_root(), &settings.verification_path);
    match fetch_image(source, &location, settings.timeout()).await {
        Ok(image) => {
            debug!("loaded verification image from {}", location);
            Some(image)
        }
        Err(err) => {
            warn!(
                "verification image unavailable at {}, continuing without it: {}",
                location, err
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;

    use image::{ImageOutputFormat, RgbImage};

    use super::*;

    struct SlowAssets;

    #[async_trait]
    impl AssetSource for SlowAssets {
        async fn fetch(&self, _location: &AssetLocation) -> Result<Vec<u8>, AssetError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        }
    }

    fn settings(root: &Path) -> AssetSettings {
        AssetSettings {
            root: Some(root.display().to_string()),
            ..AssetSettings::default()
        }
    }

    #[test]
    fn resolves_against_directories_and_urls() {
        assert_eq!(
            resolve_asset("public", "images/verified.png"),
            AssetLocation::File(PathBuf::from("public/images/verified.png"))
        );
        assert_eq!(
            resolve_asset("https://cdn.example.com/app/", "/images/verified.png"),
            AssetLocation::Url("https://cdn.example.com/app/images/verified.png".to_owned())
        );
    }

    #[tokio::test]
    async fn loads_badge_from_the_deployment_root() {
        let root = env::temp_dir().join(format!("ups-report-assets-{}", std::process::id()));
        fs::create_dir_all(root.join("images")).expect("create asset dir");
        let mut png = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(5, 5))
            .write_to(&mut png, ImageOutputFormat::Png)
            .expect("encode badge");
        fs::write(root.join("images/verified.png"), png).expect("write badge");

        let image = load_verification_image(&DeploymentAssets::new(), &settings(&root)).await;
        assert!(image.is_some());

        fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn missing_badge_is_not_an_error() {
        let root = env::temp_dir().join("ups-report-assets-missing");
        let image = load_verification_image(&DeploymentAssets::new(), &settings(&root)).await;
        assert!(image.is_none());
    }

    #[tokio::test]
    async fn disabled_settings_skip_the_fetch() {
        let settings = AssetSettings {
            enabled: false,
            ..AssetSettings::default()
        };
        assert!(load_verification_image(&SlowAssets, &settings).await.is_none());
    }

    #[tokio::test]
    async fn slow_sources_time_out() {
        let location = AssetLocation::Url("https://example.com/badge.png".to_owned());
        let result =
            fetch_with_timeout(&SlowAssets, &location, Some(Duration::from_millis(10))).await;
        assert!(matches!(
            result,
            Err(AssetError::Timeout { timeout_ms: 10, .. })
        ));
    }

    #[tokio::test]
    async fn no_assets_is_always_disabled() {
        let location = resolve_asset("public", "images/verified.png");
        assert!(matches!(
            NoAssets.fetch(&location).await,
            Err(AssetError::Disabled)
        ));
    }
}

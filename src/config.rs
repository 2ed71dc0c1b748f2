//! Report configuration.
//!
//! Every field has a default, so an empty file (or no file at all) yields the
//! stock Ksavio report.  Values can be overridden from a TOML file and from
//! `UPS_REPORT__<SECTION>__<FIELD>` environment variables.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::chart::ChartStyle;
use crate::error::ReportResult;
use crate::layout::OverflowPolicy;

/// Prefix of the environment variables read by [`ReportConfig::load`].
pub const ENV_PREFIX: &str = "UPS_REPORT";

/// Environment variable naming the deployment root of static assets.
pub const DEPLOYMENT_ROOT_ENV: &str = "PUBLIC_URL";

/// Asset root used when neither the configuration nor the environment name one.
pub const DEFAULT_ASSET_ROOT: &str = "public";

/// Every fixed string printed on the report.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Branding {
    pub file_prefix: String,
    pub title: String,
    pub subtitle: String,
    pub watermark: String,
    pub table_title: String,
    pub name_column_header: String,
    pub notes_title: String,
    pub disclaimer: String,
    pub verified_label: String,
    pub footer_contact: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            file_prefix: "Ksavio_UPS".to_owned(),
            title: "Ksavio UPS Runtime Chart".to_owned(),
            subtitle: "Professional Battery Runtime Analysis".to_owned(),
            watermark: "DUMMY DATA".to_owned(),
            table_title: "Runtime Data Table".to_owned(),
            name_column_header: "Model / Load".to_owned(),
            notes_title: "Important Notes:".to_owned(),
            disclaimer: "Battery runtimes are approximate and may vary with equipment depending on \
                configuration, battery age, temperature, etc. This chart should be used for reference \
                purposes only. For critical applications, please consult with a Ksavio technical \
                representative."
                .to_owned(),
            verified_label: "VERIFIED".to_owned(),
            footer_contact: "For more information, visit www.ksavio.com | Contact: support@ksavio.com | Tel: +1-800-KSAVIO"
                .to_owned(),
        }
    }
}

/// Where the optional verification badge comes from.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct AssetSettings {
    /// Set to `false` to never render the verification block.
    pub enabled: bool,
    /// Deployment root; falls back to `PUBLIC_URL`, then to `public`.
    pub root: Option<String>,
    /// Path of the badge relative to the deployment root.
    pub verification_path: String,
    /// Upper bound for the badge fetch. No limit when unset.
    pub timeout_ms: Option<u64>,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            root: None,
            verification_path: "images/verified.png".to_owned(),
            timeout_ms: None,
        }
    }
}

impl AssetSettings {
    /// The deployment root after applying the environment fallback.
    pub fn resolved_root(&self) -> String {
        let non_blank = |root: &String| !root.trim().is_empty();
        self.root
            .clone()
            .filter(non_blank)
            .or_else(|| env::var(DEPLOYMENT_ROOT_ENV).ok().filter(non_blank))
            .unwrap_or_else(|| DEFAULT_ASSET_ROOT.to_owned())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Page composition options.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutSettings {
    pub overflow: OverflowPolicy,
}

/// Size of the rasterised chart.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChartSettings {
    pub width_px: u32,
    pub height_px: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        let style = ChartStyle::default();
        Self {
            width_px: style.width_px,
            height_px: style.height_px,
        }
    }
}

impl ChartSettings {
    /// The default chart style resized to these settings.
    pub fn style(&self) -> ChartStyle {
        ChartStyle {
            width_px: self.width_px,
            height_px: self.height_px,
            ..ChartStyle::default()
        }
    }
}

/// Complete configuration of a report export.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub branding: Branding,
    pub assets: AssetSettings,
    pub layout: LayoutSettings,
    pub chart: ChartSettings,
}

impl ReportConfig {
    /// Loads the configuration from an optional TOML file plus environment overrides.
    pub fn load(path: Option<&Path>) -> ReportResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Parses a TOML document without consulting the environment.
    pub fn from_toml_str(source: &str) -> ReportResult<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(source, config::FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    /// Sets the overflow policy and returns the updated configuration.
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.layout.overflow = overflow;
        self
    }

    /// Sets the asset deployment root and returns the updated configuration.
    pub fn with_asset_root(mut self, root: impl Into<String>) -> Self {
        self.assets.root = Some(root.into());
        self
    }

    /// Enables or disables the verification block and returns the updated configuration.
    pub fn with_verification(mut self, enabled: bool) -> Self {
        self.assets.enabled = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReportError;

    /// Sets environment variables for the lifetime of the guard.
    struct ScopedEnv(Vec<&'static str>);

    impl ScopedEnv {
        fn set(vars: &[(&'static str, &str)]) -> Self {
            for (key, value) in vars {
                env::set_var(key, value);
            }
            Self(vars.iter().map(|(key, _)| *key).collect())
        }
    }

    impl Drop for ScopedEnv {
        fn drop(&mut self) {
            for key in &self.0 {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn empty_document_yields_defaults() {
        let config = ReportConfig::from_toml_str("").expect("empty config parses");
        assert_eq!(config, ReportConfig::default());
        assert_eq!(config.branding.file_prefix, "Ksavio_UPS");
        assert_eq!(config.layout.overflow, OverflowPolicy::Paginate);
        assert!(config.assets.enabled);
    }

    #[test]
    fn sections_override_individual_fields() {
        let config = ReportConfig::from_toml_str(
            r#"
            [branding]
            watermark = "SAMPLE"

            [assets]
            root = "https://cdn.example.com/app"
            timeout_ms = 1500

            [layout]
            overflow = "unbounded"

            [chart]
            width_px = 900
            "#,
        )
        .expect("config parses");

        assert_eq!(config.branding.watermark, "SAMPLE");
        assert_eq!(config.branding.title, Branding::default().title);
        assert_eq!(config.assets.resolved_root(), "https://cdn.example.com/app");
        assert_eq!(config.assets.timeout(), Some(Duration::from_millis(1500)));
        assert_eq!(config.layout.overflow, OverflowPolicy::Unbounded);
        assert_eq!(config.chart.width_px, 900);
        assert_eq!(config.chart.height_px, ChartStyle::default().height_px);
    }

    #[test]
    fn builder_methods_update_fields() {
        let config = ReportConfig::default()
            .with_overflow(OverflowPolicy::Unbounded)
            .with_asset_root("/srv/www")
            .with_verification(false);
        assert_eq!(config.layout.overflow, OverflowPolicy::Unbounded);
        assert_eq!(config.assets.resolved_root(), "/srv/www");
        assert!(!config.assets.enabled);
    }

    #[test]
    fn environment_overrides_and_deployment_root_fallback() {
        let _env = ScopedEnv::set(&[
            ("UPS_REPORT__BRANDING__WATERMARK", "SAMPLE"),
            ("UPS_REPORT__ASSETS__TIMEOUT_MS", "2500"),
            ("UPS_REPORT__LAYOUT__OVERFLOW", "unbounded"),
            (DEPLOYMENT_ROOT_ENV, "https://cdn.example.com/ups"),
        ]);

        let config = ReportConfig::load(None).expect("environment config loads");
        assert_eq!(config.branding.watermark, "SAMPLE");
        assert_eq!(config.branding.title, Branding::default().title);
        assert_eq!(config.assets.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.layout.overflow, OverflowPolicy::Unbounded);

        assert_eq!(config.assets.root, None);
        assert_eq!(config.assets.resolved_root(), "https://cdn.example.com/ups");
        let explicit = config.with_asset_root("/srv/www");
        assert_eq!(explicit.assets.resolved_root(), "/srv/www");
    }

    #[test]
    fn malformed_documents_are_config_errors() {
        let result = ReportConfig::from_toml_str("[layout]\noverflow = \"sideways\"\n");
        assert!(matches!(result, Err(ReportError::Config(_))));
    }
}

//! Locates the TrueType font used for chart labels.
//!
//! The PDF itself only uses the built-in Helvetica faces, so this font is needed
//! for the rasterised chart alone.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::chart;
use crate::error::ChartError;

/// Environment variable naming an extra directory to search first.
pub const FONTS_DIR_ENV: &str = "UPS_REPORT_FONTS_DIR";

/// File name of the chart label font.
pub const CHART_FONT_FILE: &str = "Roboto-Medium.ttf";

fn bundled_font_directory() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn executable_font_directory() -> Option<PathBuf> {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("assets/fonts")))
}

/// Directories searched for [`CHART_FONT_FILE`], in order.
pub fn font_search_path() -> Vec<PathBuf> {
    let mut directories = Vec::new();
    if let Some(dir) = env::var_os(FONTS_DIR_ENV).filter(|dir| !dir.is_empty()) {
        directories.push(PathBuf::from(dir));
    }
    directories.extend(executable_font_directory());
    directories.push(bundled_font_directory());
    directories
}

fn find_in(directories: &[PathBuf]) -> Result<PathBuf, ChartError> {
    directories
        .iter()
        .map(|dir| dir.join(CHART_FONT_FILE))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            ChartError::FontNotFound(
                directories
                    .iter()
                    .map(|dir| dir.join(CHART_FONT_FILE).display().to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        })
}

/// Returns the first existing chart font on the search path.
pub fn locate_chart_font() -> Result<PathBuf, ChartError> {
    find_in(&font_search_path())
}

/// Reads the font file at `path`.
pub fn load_chart_font(path: &Path) -> Result<Vec<u8>, ChartError> {
    fs::read(path).map_err(|source| ChartError::FontIo {
        path: path.to_path_buf(),
        source,
    })
}

/// Finds, loads and registers the chart label font.
///
/// Returns `false` when no usable font was found; charts are then drawn without text.
pub fn install_chart_font() -> bool {
    let result = locate_chart_font().and_then(|path| {
        let bytes = load_chart_font(&path)?;
        chart::register_label_font(bytes)?;
        Ok(path)
    });
    match result {
        Ok(path) => {
            info!("chart labels use {}", path.display());
            true
        }
        Err(err) => {
            warn!("chart labels disabled: {}", err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("ups-report-fonts-{}-{}", name, std::process::id()));
        fs::create_dir_all(&dir).expect("create scratch dir");
        dir
    }

    #[test]
    fn first_directory_with_the_font_wins() {
        let empty = scratch_dir("empty");
        let filled = scratch_dir("filled");
        fs::write(filled.join(CHART_FONT_FILE), b"not really a font").expect("write font");

        let found = find_in(&[empty.clone(), filled.clone()]).expect("font found");
        assert_eq!(found, filled.join(CHART_FONT_FILE));
        assert_eq!(load_chart_font(&found).expect("font reads"), b"not really a font");

        fs::remove_dir_all(&filled).ok();
        fs::remove_dir_all(&empty).ok();
    }

    #[test]
    fn missing_font_lists_every_candidate() {
        let empty = scratch_dir("missing");
        match find_in(&[empty.clone()]) {
            Err(ChartError::FontNotFound(checked)) => {
                assert!(checked.contains(CHART_FONT_FILE));
            }
            other => panic!("expected FontNotFound, got {other:?}"),
        }
        fs::remove_dir_all(&empty).ok();
    }

    #[test]
    fn bundled_directory_is_always_searched() {
        assert!(font_search_path().contains(&bundled_font_directory()));
    }
}

//! Report configuration (loaded from an optional `report.toml`).
//!
//! ```toml
//! [input]
//! path = "data/deorbit_analysis.csv"
//! # format = "csv"      # csv | tsv | json | parquet, default: from extension
//! # delimiter = ";"
//!
//! [output]
//! path = "plots/deorbit_comprehensive_analysis.png"
//! dpi = 300
//! width_in = 14.0
//! height_in = 10.0
//! tight_bbox = true
//! pad_inches = 0.1
//! show = false
//!
//! [style]
//! # font = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"
//! font_size_pt = 10.0
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::data::loader::{LoadOptions, TableFormat};

/// Longest edge, in pixels, a figure may have.
const MAX_EDGE_PX: f64 = 20_000.0;

/// Main report configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub style: StyleConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct InputConfig {
    pub path: PathBuf,
    pub format: Option<TableFormat>,
    pub delimiter: Option<char>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("data/deorbit_analysis.csv"),
            format: None,
            delimiter: None,
        }
    }
}

impl InputConfig {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            format: self.format,
            delimiter: self.delimiter.and_then(|c| u8::try_from(c).ok()),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub path: PathBuf,
    pub dpi: f64,
    pub width_in: f64,
    pub height_in: f64,
    /// Crop to drawn content plus `pad_inches`.
    pub tight_bbox: bool,
    pub pad_inches: f64,
    pub show: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("plots/deorbit_comprehensive_analysis.png"),
            dpi: 300.0,
            width_in: 14.0,
            height_in: 10.0,
            tight_bbox: true,
            pad_inches: 0.1,
            show: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleConfig {
    /// TrueType face for all text; searched for in system font directories when unset.
    pub font: Option<PathBuf>,
    pub font_size_pt: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font: None,
            font_size_pt: 10.0,
        }
    }
}

impl ReportConfig {
    /// Reject values that would make rendering meaningless.
    pub fn validate(&self) -> Result<()> {
        let out = &self.output;
        if !(out.dpi.is_finite() && out.dpi > 0.0) {
            bail!("output.dpi must be positive, got {}", out.dpi);
        }
        for (name, inches) in [("width_in", out.width_in), ("height_in", out.height_in)] {
            if !(inches.is_finite() && inches > 0.0) {
                bail!("output.{name} must be positive, got {inches}");
            }
            if inches * out.dpi > MAX_EDGE_PX {
                bail!(
                    "output.{name} = {inches} at {} DPI exceeds {MAX_EDGE_PX} px",
                    out.dpi
                );
            }
        }
        if !(out.pad_inches.is_finite() && out.pad_inches >= 0.0) {
            bail!("output.pad_inches must be non-negative, got {}", out.pad_inches);
        }
        if !(self.style.font_size_pt.is_finite() && self.style.font_size_pt > 0.0) {
            bail!("style.font_size_pt must be positive, got {}", self.style.font_size_pt);
        }
        if let Some(c) = self.input.delimiter {
            if !c.is_ascii() {
                bail!("input.delimiter must be a single ASCII character, got {c:?}");
            }
        }
        Ok(())
    }
}

/// Load and validate a configuration file.
pub fn load_config(path: &Path) -> Result<ReportConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    let config: ReportConfig = toml::from_str(&text)
        .with_context(|| format!("parsing config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_figure() {
        let config = ReportConfig::default();
        assert_eq!(config.output.dpi, 300.0);
        assert_eq!((config.output.width_in, config.output.height_in), (14.0, 10.0));
        assert!(config.output.tight_bbox);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: ReportConfig = toml::from_str(
            r#"
            [input]
            path = "runs/leo.tsv"
            delimiter = ";"

            [output]
            dpi = 150
            "#,
        )
        .unwrap();

        assert_eq!(config.input.path, PathBuf::from("runs/leo.tsv"));
        assert_eq!(config.input.load_options().delimiter, Some(b';'));
        assert_eq!(config.output.dpi, 150.0);
        assert_eq!(config.output.width_in, 14.0);
        assert_eq!(config.style.font_size_pt, 10.0);
    }

    #[test]
    fn format_is_lowercase() {
        let config: ReportConfig = toml::from_str("[input]\nformat = \"parquet\"\n").unwrap();
        assert_eq!(config.input.format, Some(TableFormat::Parquet));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<ReportConfig>("[output]\nresolution = 300\n").is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut config = ReportConfig::default();
        config.output.dpi = 0.0;
        assert!(config.validate().is_err());

        let mut config = ReportConfig::default();
        config.output.width_in = 1000.0;
        assert!(config.validate().is_err());

        let mut config = ReportConfig::default();
        config.input.delimiter = Some('§');
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_names_path() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.toml"));
    }
}

//! Deorbit analysis report renderer.
//!
//! Reads a table of precomputed deorbit metrics (altitude, delta-V, natural
//! decay time, ESA 25-year compliance) and renders a 2x2 panel:
//!
//! | | |
//! |---|---|
//! | delta-V vs altitude | decay time (log) with 25-year limit |
//! | compliance status bars | rounded summary table |

use std::path::PathBuf;

use thiserror::Error;

pub mod color;
pub mod config;
pub mod data;
pub mod render;

pub use config::ReportConfig;
pub use data::loader::{load_file, LoadError, LoadOptions, TableFormat};
pub use data::model::{DeorbitRecord, DeorbitTable};
pub use render::{RenderError, ReportRenderer};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Load the configured table and write the report image. Returns the image path.
///
/// The table is fully loaded and checked before any rendering starts.
pub fn run(config: &ReportConfig) -> Result<PathBuf, ReportError> {
    let table = load_file(&config.input.path, &config.input.load_options())?;
    let renderer = ReportRenderer::new(config.output.clone(), config.style.clone());
    Ok(renderer.render(&table)?)
}

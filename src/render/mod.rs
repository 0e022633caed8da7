//! Rendering layer: table → four panels → one PNG.
//!
//! ```text
//!   DeorbitTable
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  scene    │  ReportPanels: points, bars, colours, table cells
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  figure   │  CompositeFigure (2x2) ← panels::draw_*
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  output   │  tight crop, PNG write
//!   └──────────┘
//! ```

use std::io;
use std::path::{Path, PathBuf};

use image::Rgb;
use thiserror::Error;

use crate::color;
use crate::config::{OutputConfig, StyleConfig};
use crate::data::model::DeorbitTable;

pub mod figure;
pub mod fonts;
pub mod output;
pub mod panels;
pub mod scene;

use figure::{CompositeFigure, FigureLayout};
use panels::Typography;
use scene::ReportPanels;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("output directory does not exist: {}", .dir.display())]
    OutputDirMissing { dir: PathBuf },

    #[error("permission denied writing {}", .path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to write {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read font {}", .path.display())]
    FontRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{} is not a valid TrueType font", .path.display())]
    InvalidFont { path: PathBuf },

    #[error("drawing failed: {0}")]
    Draw(String),

    #[error("failed to encode PNG {}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl RenderError {
    /// Flatten a plotters drawing error, whose type is generic over the backend.
    pub fn draw<E: std::fmt::Display>(err: E) -> Self {
        RenderError::Draw(err.to_string())
    }

    /// Map a failed write of `path` onto the output error kinds.
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => RenderError::OutputDirMissing {
                dir: output::output_dir(path),
            },
            io::ErrorKind::PermissionDenied => RenderError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => RenderError::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }
}

// ---------------------------------------------------------------------------
// ReportRenderer
// ---------------------------------------------------------------------------

/// Renders a [`DeorbitTable`] into the 2x2 report image.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    output: OutputConfig,
    style: StyleConfig,
}

impl ReportRenderer {
    pub fn new(output: OutputConfig, style: StyleConfig) -> Self {
        Self { output, style }
    }

    pub fn layout(&self) -> FigureLayout {
        FigureLayout {
            width_in: self.output.width_in,
            height_in: self.output.height_in,
            dpi: self.output.dpi,
        }
    }

    /// Render and write the report, returning the path written.
    ///
    /// The output directory is checked before any drawing happens.
    pub fn render(&self, table: &DeorbitTable) -> Result<PathBuf, RenderError> {
        let path = &self.output.path;
        output::check_output_dir(path)?;

        let family = fonts::ensure_registered(self.style.font.as_deref())?;
        match &self.style.font {
            Some(font) => log::debug!("Text rendered with {}", font.display()),
            None => log::debug!("Text rendered with the bundled face"),
        }

        let panels = ReportPanels::from_table(table);
        let typography = Typography::new(family, self.output.dpi, self.style.font_size_pt);

        let mut figure = CompositeFigure::new(&self.layout());
        let (w, h) = figure.size();
        log::debug!("Drawing {w}x{h} px figure at {} DPI", self.output.dpi);
        figure.draw(&panels, &typography)?;

        let mut image = figure.into_image()?;
        if self.output.tight_bbox {
            let pad = (self.output.pad_inches * self.output.dpi).round() as u32;
            let bg = color::background_color();
            image = output::crop_tight(image, Rgb([bg.0, bg.1, bg.2]), pad);
        }

        output::write_png(&image, path)?;
        log::info!(
            "Wrote {}x{} px report to {}",
            image.width(),
            image.height(),
            path.display()
        );

        self.show(path);
        Ok(path.clone())
    }

    /// There is no display surface; only acknowledges the request.
    fn show(&self, path: &Path) {
        if self.output.show {
            log::info!(
                "Display requested but running non-interactively; open {} to view",
                path.display()
            );
        }
    }
}

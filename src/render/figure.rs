use image::RgbImage;
use plotters::prelude::*;

use super::panels::{self, Typography};
use super::scene::ReportPanels;
use super::RenderError;
use crate::color;

/// Physical size of the composite figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FigureLayout {
    pub width_in: f64,
    pub height_in: f64,
    pub dpi: f64,
}

impl FigureLayout {
    /// Pixel dimensions at the configured DPI.
    pub fn pixel_size(&self) -> (u32, u32) {
        let px = |inches: f64| (inches * self.dpi).round().max(1.0) as u32;
        (px(self.width_in), px(self.height_in))
    }
}

/// The 2x2 composite panel. Owns the RGB pixel buffer every renderer draws into.
pub struct CompositeFigure {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl CompositeFigure {
    pub fn new(layout: &FigureLayout) -> Self {
        let (width, height) = layout.pixel_size();
        CompositeFigure {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 3],
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Draw all four panels row-major: delta-V, decay, compliance, summary.
    pub fn draw(&mut self, panels: &ReportPanels, ty: &Typography) -> Result<(), RenderError> {
        let root = BitMapBackend::with_buffer(&mut self.pixels, (self.width, self.height))
            .into_drawing_area();
        root.fill(&color::background_color())
            .map_err(RenderError::draw)?;

        // Outer padding plus per-cell spacing, in the spirit of tight_layout().
        let outer = ty.px_u32(6.0);
        let gap = ty.px_u32(8.0);
        let cells = root.margin(outer, outer, outer, outer).split_evenly((2, 2));
        let cells: Vec<_> = cells.iter().map(|c| c.margin(gap, gap, gap, gap)).collect();

        panels::draw_delta_v(&cells[0], &panels.delta_v, ty)?;
        log::debug!("Rendered delta-V panel ({} points)", panels.delta_v.points.len());

        panels::draw_decay(&cells[1], &panels.decay, ty)?;
        log::debug!(
            "Rendered decay panel ({} bars, limit at {} years)",
            panels.decay.bars.len(),
            panels.decay.limit_years
        );

        panels::draw_compliance(&cells[2], &panels.compliance, ty)?;
        log::debug!("Rendered compliance panel ({} bars)", panels.compliance.bars.len());

        panels::draw_summary(&cells[3], &panels.summary, ty)?;
        log::debug!("Rendered summary table ({} rows)", panels.summary.rows.len());

        root.present().map_err(RenderError::draw)?;
        Ok(())
    }

    pub fn into_image(self) -> Result<RgbImage, RenderError> {
        let (width, height) = (self.width, self.height);
        RgbImage::from_raw(width, height, self.pixels).ok_or_else(|| {
            RenderError::Draw(format!("pixel buffer does not match {width}x{height}"))
        })
    }
}

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::series::DashedLineSeries;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{FontDesc, FontFamily, FontStyle};

use super::scene::{
    CompliancePanel, DecayPanel, DeltaVPanel, PanelText, SummaryPanel, COMPLIANCE_TEXT, DECAY_TEXT,
    DELTA_V_TEXT, ESA_LIMIT_LABEL,
};
use super::RenderError;
use crate::color;

// ---------------------------------------------------------------------------
// Typography – point sizes scaled to the output resolution
// ---------------------------------------------------------------------------

/// Converts matplotlib-style point sizes into pixels at the figure's DPI.
#[derive(Debug, Clone, Copy)]
pub struct Typography {
    family: &'static str,
    dpi: f64,
    base_pt: f64,
}

impl Typography {
    /// `family` must already be registered (see [`super::fonts::ensure_registered`]).
    pub fn new(family: &'static str, dpi: f64, base_pt: f64) -> Self {
        Self {
            family,
            dpi,
            base_pt,
        }
    }

    pub fn px(&self, pt: f64) -> f64 {
        pt * self.dpi / 72.0
    }

    pub fn px_u32(&self, pt: f64) -> u32 {
        self.px(pt).round().max(1.0) as u32
    }

    fn font(&self, scale: f64) -> TextStyle<'static> {
        self.at_px(self.px(self.base_pt * scale))
    }

    pub fn title(&self) -> TextStyle<'static> {
        self.font(1.2)
    }

    pub fn axis_label(&self) -> TextStyle<'static> {
        self.font(1.0)
    }

    pub fn tick_label(&self) -> TextStyle<'static> {
        self.font(1.0)
    }

    /// Font at an explicit pixel size.
    pub fn at_px(&self, px: f64) -> TextStyle<'static> {
        TextStyle::from(FontDesc::new(FontFamily::Name(self.family), px, FontStyle::Normal))
    }

    pub fn base_px(&self) -> f64 {
        self.px(self.base_pt)
    }
}

// ---------------------------------------------------------------------------
// Shared chart scaffolding
// ---------------------------------------------------------------------------

fn chart_builder<'a, 'b, DB: DrawingBackend>(
    area: &'a DrawingArea<DB, Shift>,
    text: &PanelText,
    ty: &Typography,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(area);
    builder
        .caption(text.title, ty.title())
        .margin(ty.px_u32(6.0))
        .x_label_area_size(ty.px_u32(30.0))
        .y_label_area_size(ty.px_u32(48.0));
    builder
}

/// Grid colour at the given opacity (matplotlib `grid(alpha=...)`).
fn grid(alpha: f64) -> RGBAColor {
    BLACK.mix(alpha)
}

fn format_log_tick(v: f64) -> String {
    if v >= 1.0 {
        format!("{v:.0}")
    } else {
        let s = format!("{v:.6}");
        s.trim_end_matches('0').to_string()
    }
}

// ---------------------------------------------------------------------------
// Panel 1 – delta-V line chart
// ---------------------------------------------------------------------------

pub fn draw_delta_v<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &DeltaVPanel,
    ty: &Typography,
) -> Result<(), RenderError> {
    let mut chart = chart_builder(area, &DELTA_V_TEXT, ty)
        .build_cartesian_2d(panel.x_range.clone(), panel.y_range.clone())
        .map_err(RenderError::draw)?;

    chart
        .configure_mesh()
        .x_desc(DELTA_V_TEXT.x_label)
        .y_desc(DELTA_V_TEXT.y_label)
        .label_style(ty.tick_label())
        .axis_desc_style(ty.axis_label())
        .bold_line_style(grid(0.3))
        .light_line_style(TRANSPARENT)
        .draw()
        .map_err(RenderError::draw)?;

    let line = color::series_color();
    chart
        .draw_series(LineSeries::new(
            panel.points.iter().copied(),
            line.stroke_width(ty.px_u32(2.0)),
        ))
        .map_err(RenderError::draw)?;

    let radius = ty.px_u32(4.0);
    chart
        .draw_series(
            panel
                .points
                .iter()
                .map(|&p| Circle::new(p, radius, line.filled())),
        )
        .map_err(RenderError::draw)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Panel 2 – decay-time bars on a log axis
// ---------------------------------------------------------------------------

pub fn draw_decay<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &DecayPanel,
    ty: &Typography,
) -> Result<(), RenderError> {
    let mut chart = chart_builder(area, &DECAY_TEXT, ty)
        .build_cartesian_2d(panel.x_range.clone(), panel.y_range.clone().log_scale())
        .map_err(RenderError::draw)?;

    chart
        .configure_mesh()
        .x_desc(DECAY_TEXT.x_label)
        .y_desc(DECAY_TEXT.y_label)
        .y_label_formatter(&|v| format_log_tick(*v))
        .label_style(ty.tick_label())
        .axis_desc_style(ty.axis_label())
        .bold_line_style(grid(0.3))
        .light_line_style(TRANSPARENT)
        .draw()
        .map_err(RenderError::draw)?;

    let half = panel.bar_width / 2.0;
    let floor = panel.y_range.start;
    chart
        .draw_series(panel.drawable_bars().map(|b| {
            Rectangle::new([(b.x - half, floor), (b.x + half, b.height)], b.color.filled())
        }))
        .map_err(RenderError::draw)?;

    let skipped = panel.bars.len() - panel.drawable_bars().count();
    if skipped > 0 {
        log::debug!("{skipped} non-positive decay time(s) cannot be drawn on a log axis");
    }

    let limit = color::limit_line_color();
    let width = ty.px_u32(2.0);
    let legend_len = ty.px_u32(20.0) as i32;
    chart
        .draw_series(DashedLineSeries::new(
            vec![
                (panel.x_range.start, panel.limit_years),
                (panel.x_range.end, panel.limit_years),
            ],
            ty.px_u32(6.0),
            ty.px_u32(3.0),
            limit.stroke_width(width),
        ))
        .map_err(RenderError::draw)?
        .label(ESA_LIMIT_LABEL)
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + legend_len, y)], limit.stroke_width(width))
        });

    chart
        .configure_series_labels()
        .label_font(ty.tick_label())
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK.mix(0.3))
        .draw()
        .map_err(RenderError::draw)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Panel 3 – compliance status bars
// ---------------------------------------------------------------------------

pub fn draw_compliance<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &CompliancePanel,
    ty: &Typography,
) -> Result<(), RenderError> {
    let mut chart = chart_builder(area, &COMPLIANCE_TEXT, ty)
        .build_cartesian_2d(panel.x_range.clone(), panel.y_range.clone())
        .map_err(RenderError::draw)?;

    // Binary status display: no y ticks, no grid.
    chart
        .configure_mesh()
        .disable_mesh()
        .y_labels(0)
        .x_desc(COMPLIANCE_TEXT.x_label)
        .y_desc(COMPLIANCE_TEXT.y_label)
        .label_style(ty.tick_label())
        .axis_desc_style(ty.axis_label())
        .draw()
        .map_err(RenderError::draw)?;

    let half = panel.bar_width / 2.0;
    chart
        .draw_series(panel.bars.iter().map(|b| {
            Rectangle::new([(b.x - half, 0.0), (b.x + half, b.height)], b.color.filled())
        }))
        .map_err(RenderError::draw)?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Panel 4 – summary table
// ---------------------------------------------------------------------------

/// Text table centred in the panel; rows shrink to fit long tables.
pub fn draw_summary<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    panel: &SummaryPanel,
    ty: &Typography,
) -> Result<(), RenderError> {
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as f64, h as f64);
    let n_rows = panel.rows.len() + 1;

    // matplotlib's table.scale(1, 2): rows twice the default cell height.
    let natural_row = ty.base_px() * 2.0 * 1.4;
    let row_h = natural_row.min(h * 0.95 / n_rows as f64);
    let font_px = ty.base_px().min(row_h * 0.7);
    let cell_font = ty
        .at_px(font_px)
        .pos(Pos::new(HPos::Center, VPos::Center));

    let table_w = w * 0.9;
    let col_w = table_w / 3.0;
    let left = (w - table_w) / 2.0;
    let top = (h - row_h * n_rows as f64) / 2.0;
    let border = BLACK.stroke_width(1);

    let header = panel.headers.iter().map(|s| s.to_string());
    let body = panel.rows.iter().flat_map(|cells| cells.iter().cloned());
    for (i, text) in header.chain(body).enumerate() {
        let (row, col) = (i / 3, i % 3);
        let x0 = left + col as f64 * col_w;
        let y0 = top + row as f64 * row_h;
        let rect = [
            (x0.round() as i32, y0.round() as i32),
            ((x0 + col_w).round() as i32, (y0 + row_h).round() as i32),
        ];
        area.draw(&Rectangle::new(rect, border))
            .map_err(RenderError::draw)?;

        let centre = ((x0 + col_w / 2.0).round() as i32, (y0 + row_h / 2.0).round() as i32);
        area.draw(&Text::new(text, centre, cell_font.clone()))
            .map_err(RenderError::draw)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_sizes_scale_with_dpi() {
        let ty = Typography::new("sans-serif", 300.0, 10.0);
        assert_eq!(ty.px(72.0), 300.0);
        assert_eq!(ty.px_u32(2.0), 8);
        assert_eq!(Typography::new("sans-serif", 10.0, 10.0).px_u32(1.0), 1);
    }

    #[test]
    fn log_ticks_are_compact() {
        assert_eq!(format_log_tick(100.0), "100");
        assert_eq!(format_log_tick(1.0), "1");
        assert_eq!(format_log_tick(0.1), "0.1");
        assert_eq!(format_log_tick(0.001), "0.001");
    }
}

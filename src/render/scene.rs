//! Data-derived description of the four report panels.
//!
//! Everything here is plain data: which points, bars, colours and table
//! cells end up in each panel, and the axis ranges they are drawn over.
//! The drawing itself lives in [`super::panels`].

use std::ops::Range;

use plotters::style::RGBColor;

use crate::color;
use crate::data::model::DeorbitTable;

/// Natural decay must finish within this many years to satisfy ESA.
pub const ESA_LIMIT_YEARS: f64 = 25.0;

pub const ESA_LIMIT_LABEL: &str = "ESA 25-year limit";

pub const SUMMARY_HEADERS: [&str; 3] = ["Alt (km)", "ΔV (m/s)", "Decay (yr)"];

/// Fraction of the bar pitch each bar occupies.
const BAR_FILL: f64 = 0.8;

/// Fixed strings for one chart panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelText {
    pub title: &'static str,
    pub x_label: &'static str,
    pub y_label: &'static str,
}

pub const DELTA_V_TEXT: PanelText = PanelText {
    title: "Active Deorbit Delta-V Requirements",
    x_label: "Altitude (km)",
    y_label: "Delta-V (m/s)",
};

pub const DECAY_TEXT: PanelText = PanelText {
    title: "Natural Decay Timeline vs ESA Compliance",
    x_label: "Altitude (km)",
    y_label: "Decay Time (years)",
};

pub const COMPLIANCE_TEXT: PanelText = PanelText {
    title: "ESA Zero-Debris 25-Year Compliance",
    x_label: "Altitude (km)",
    y_label: "Compliance Status",
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    /// Bar centre on the altitude axis.
    pub x: f64,
    pub height: f64,
    pub color: RGBColor,
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------

/// Line-and-marker chart of delta-V against altitude, in table order.
#[derive(Debug, Clone, PartialEq)]
pub struct DeltaVPanel {
    pub points: Vec<(f64, f64)>,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

/// Decay-time bars over a log axis with the 25-year reference line.
#[derive(Debug, Clone, PartialEq)]
pub struct DecayPanel {
    pub bars: Vec<Bar>,
    pub bar_width: f64,
    pub limit_years: f64,
    pub x_range: Range<f64>,
    /// Log-axis bounds; always strictly positive and containing `limit_years`.
    pub y_range: Range<f64>,
}

impl DecayPanel {
    /// Bars that can be drawn on a log axis.
    pub fn drawable_bars(&self) -> impl Iterator<Item = &Bar> {
        self.bars.iter().filter(|b| b.height > 0.0 && b.height.is_finite())
    }
}

/// Unit-height status bars, one per row.
#[derive(Debug, Clone, PartialEq)]
pub struct CompliancePanel {
    pub bars: Vec<Bar>,
    pub bar_width: f64,
    pub x_range: Range<f64>,
    pub y_range: Range<f64>,
}

/// Rounded copy of the numeric columns for the text table.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryPanel {
    pub headers: [&'static str; 3],
    pub rows: Vec<[String; 3]>,
}

impl SummaryPanel {
    /// Rows as `alt | dv | decay` lines.
    pub fn lines(&self) -> Vec<String> {
        self.rows.iter().map(|cells| cells.join(" | ")).collect()
    }
}

/// All four panels, in figure order (row-major).
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPanels {
    pub delta_v: DeltaVPanel,
    pub decay: DecayPanel,
    pub compliance: CompliancePanel,
    pub summary: SummaryPanel,
}

impl ReportPanels {
    pub fn from_table(table: &DeorbitTable) -> Self {
        let altitudes: Vec<f64> = table.iter().map(|r| r.altitude_km).collect();
        let bar_width = bar_width(&altitudes);
        let bar_x_range = bar_axis_range(&altitudes, bar_width);

        let points: Vec<(f64, f64)> = table.iter().map(|r| (r.altitude_km, r.delta_v_ms)).collect();
        let delta_v = DeltaVPanel {
            x_range: padded_range(points.iter().map(|p| p.0)),
            y_range: padded_range(points.iter().map(|p| p.1)),
            points,
        };

        let decay_bars: Vec<Bar> = table
            .iter()
            .map(|r| Bar {
                x: r.altitude_km,
                height: r.decay_time_years,
                color: color::decay_bar_color(),
            })
            .collect();
        let decay = DecayPanel {
            y_range: log_range(decay_bars.iter().map(|b| b.height).chain([ESA_LIMIT_YEARS])),
            bars: decay_bars,
            bar_width,
            limit_years: ESA_LIMIT_YEARS,
            x_range: bar_x_range.clone(),
        };

        let compliance = CompliancePanel {
            bars: table
                .iter()
                .map(|r| Bar {
                    x: r.altitude_km,
                    height: 1.0,
                    color: color::compliance_color(r.esa_compliant),
                })
                .collect(),
            bar_width,
            x_range: bar_x_range,
            y_range: 0.0..1.05,
        };

        let summary = SummaryPanel {
            headers: SUMMARY_HEADERS,
            rows: table
                .iter()
                .map(|r| {
                    [
                        format!("{:.1}", r.altitude_km),
                        format!("{:.1}", r.delta_v_ms),
                        format!("{:.1}", r.decay_time_years),
                    ]
                })
                .collect(),
        };

        ReportPanels {
            delta_v,
            decay,
            compliance,
            summary,
        }
    }
}

// ---------------------------------------------------------------------------
// Axis helpers
// ---------------------------------------------------------------------------

/// Largest magnitude an axis bound may take, so `end - start` stays finite.
const AXIS_LIMIT: f64 = f64::MAX / 4.0;

/// Log-axis bounds stay within these decades.
const LOG_DECADE_LIMIT: f64 = 300.0;

/// Data bounds widened by 5% on each side; degenerate inputs get a unit span.
/// Values beyond [`AXIS_LIMIT`] are clamped and fall outside the plot area.
fn padded_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = finite_bounds(values).unwrap_or((0.0, 1.0));
    let min = min.clamp(-AXIS_LIMIT, AXIS_LIMIT);
    let max = max.clamp(-AXIS_LIMIT, AXIS_LIMIT);
    let span = max - min;
    if span <= f64::EPSILON {
        let half = (min.abs() * 0.05).max(0.5);
        return (min - half)..(max + half);
    }
    (min - span * 0.05)..(max + span * 0.05)
}

/// Log-axis bounds over the positive values, padded by a fraction of a decade.
fn log_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let positive = values.filter(|v| *v > 0.0);
    let (min, max) = finite_bounds(positive).unwrap_or((ESA_LIMIT_YEARS, ESA_LIMIT_YEARS));
    let lo = min.log10().clamp(-LOG_DECADE_LIMIT, LOG_DECADE_LIMIT);
    let hi = max.log10().clamp(-LOG_DECADE_LIMIT, LOG_DECADE_LIMIT);
    let pad = ((hi - lo) * 0.05).max(0.1);
    let lo = (lo - pad).max(-LOG_DECADE_LIMIT);
    let hi = (hi + pad).min(LOG_DECADE_LIMIT);
    10f64.powf(lo)..10f64.powf(hi)
}

fn finite_bounds(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Bars take `BAR_FILL` of the tightest spacing between distinct altitudes.
fn bar_width(altitudes: &[f64]) -> f64 {
    let mut sorted: Vec<f64> = altitudes.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();

    let pitch = sorted
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);

    if pitch.is_finite() {
        (pitch * BAR_FILL).min(AXIS_LIMIT)
    } else {
        let single = sorted.first().copied().unwrap_or(0.0);
        (single.abs() * 0.1).max(1.0) * BAR_FILL
    }
}

fn bar_axis_range(altitudes: &[f64], width: f64) -> Range<f64> {
    let half = width / 2.0;
    padded_range(
        altitudes
            .iter()
            .flat_map(|&x| [x - half, x + half]),
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::data::model::DeorbitRecord;

    fn example_table() -> DeorbitTable {
        DeorbitTable::from_records(vec![
            DeorbitRecord::new(400.0, 120.5, 1.2, true),
            DeorbitRecord::new(800.0, 340.0, 45.7, false),
        ])
    }

    #[test]
    fn example_rows_produce_expected_panels() {
        let panels = ReportPanels::from_table(&example_table());

        assert_eq!(panels.delta_v.points, vec![(400.0, 120.5), (800.0, 340.0)]);

        let heights: Vec<f64> = panels.decay.bars.iter().map(|b| b.height).collect();
        assert_eq!(heights, vec![1.2, 45.7]);
        assert_eq!(panels.decay.limit_years, 25.0);

        let colors: Vec<RGBColor> = panels.compliance.bars.iter().map(|b| b.color).collect();
        assert_eq!(colors, vec![color::compliance_color(true), color::compliance_color(false)]);
        assert!(panels.compliance.bars.iter().all(|b| b.height == 1.0));

        assert_eq!(
            panels.summary.lines(),
            vec!["400.0 | 120.5 | 1.2", "800.0 | 340.0 | 45.7"]
        );
    }

    #[test]
    fn points_keep_table_order() {
        let table = DeorbitTable::from_records(vec![
            DeorbitRecord::new(900.0, 230.0, 600.0, false),
            DeorbitRecord::new(300.0, 72.0, 0.1, true),
            DeorbitRecord::new(600.0, 154.0, 30.0, false),
        ]);
        let panels = ReportPanels::from_table(&table);
        let xs: Vec<f64> = panels.delta_v.points.iter().map(|p| p.0).collect();
        assert_eq!(xs, vec![900.0, 300.0, 600.0]);
    }

    #[test]
    fn compliance_colour_follows_flag() {
        let table = DeorbitTable::from_records(
            (0..10)
                .map(|i| DeorbitRecord::new(300.0 + 50.0 * i as f64, 100.0, 1.0, i % 3 == 0))
                .collect(),
        );
        let panels = ReportPanels::from_table(&table);
        for (record, bar) in table.iter().zip(&panels.compliance.bars) {
            assert_eq!(bar.color == color::compliance_color(true), record.esa_compliant);
        }
    }

    #[test]
    fn limit_line_is_fixed_and_inside_log_axis() {
        for decay in [[0.01, 0.02], [1e3, 5e4], [25.0, 25.0]] {
            let table = DeorbitTable::from_records(vec![
                DeorbitRecord::new(400.0, 100.0, decay[0], true),
                DeorbitRecord::new(500.0, 120.0, decay[1], true),
            ]);
            let decay_panel = ReportPanels::from_table(&table).decay;
            assert_eq!(decay_panel.limit_years, ESA_LIMIT_YEARS);
            assert!(decay_panel.y_range.start > 0.0);
            assert!(decay_panel.y_range.contains(&ESA_LIMIT_YEARS));
        }
    }

    #[test]
    fn empty_table_gives_empty_but_valid_panels() {
        let panels = ReportPanels::from_table(&DeorbitTable::default());

        assert!(panels.delta_v.points.is_empty());
        assert!(panels.decay.bars.is_empty());
        assert!(panels.compliance.bars.is_empty());
        assert!(panels.summary.rows.is_empty());
        assert!(panels.delta_v.x_range.start < panels.delta_v.x_range.end);
        assert!(panels.decay.y_range.contains(&ESA_LIMIT_YEARS));
    }

    #[test]
    fn non_positive_decay_is_not_drawable() {
        let table = DeorbitTable::from_records(vec![
            DeorbitRecord::new(400.0, 100.0, 0.0, true),
            DeorbitRecord::new(500.0, 120.0, 3.0, true),
        ]);
        let decay = ReportPanels::from_table(&table).decay;
        assert_eq!(decay.bars.len(), 2);
        assert_eq!(decay.drawable_bars().count(), 1);
    }

    #[test]
    fn bar_width_uses_tightest_pitch() {
        assert_relative_eq!(bar_width(&[400.0, 800.0, 500.0]), 80.0);
        assert_relative_eq!(bar_width(&[500.0, 500.0]), 40.0);
        assert_relative_eq!(bar_width(&[]), 0.8);
    }

    #[test]
    fn summary_rounds_for_display_only() {
        let table = DeorbitTable::from_records(vec![DeorbitRecord::new(412.34, 99.96, 0.04, true)]);
        let panels = ReportPanels::from_table(&table);

        assert_eq!(panels.summary.rows[0], ["412.3".to_string(), "100.0".into(), "0.0".into()]);
        assert_eq!(panels.delta_v.points[0], (412.34, 99.96));
    }

    fn assert_finite_span(range: &Range<f64>) {
        assert!(range.start.is_finite() && range.end.is_finite(), "{range:?}");
        assert!((range.end - range.start).is_finite(), "{range:?}");
        assert!(range.start < range.end, "{range:?}");
    }

    #[test]
    fn extreme_values_keep_axes_finite() {
        let table = DeorbitTable::from_records(vec![
            DeorbitRecord::new(-1e308, -1e308, 1e-320, true),
            DeorbitRecord::new(1e308, 1e308, 1e308, false),
            DeorbitRecord::new(f64::MAX, f64::MIN, f64::MAX, false),
        ]);
        let panels = ReportPanels::from_table(&table);

        assert_finite_span(&panels.delta_v.x_range);
        assert_finite_span(&panels.delta_v.y_range);
        assert_finite_span(&panels.decay.x_range);
        assert_finite_span(&panels.compliance.x_range);
        assert!(panels.decay.bar_width.is_finite());

        let y = &panels.decay.y_range;
        assert!(y.start > 0.0 && y.end.is_finite(), "{y:?}");
        assert!(y.contains(&ESA_LIMIT_YEARS));
    }
}

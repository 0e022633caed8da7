use palette::named;
use palette::Srgb;
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Fixed colour roles
// ---------------------------------------------------------------------------

fn to_rgb(c: Srgb<u8>) -> RGBColor {
    RGBColor(c.red, c.green, c.blue)
}

/// Delta-V line and markers (matplotlib's default first cycle colour).
pub fn series_color() -> RGBColor {
    RGBColor(0x1f, 0x77, 0xb4)
}

/// Decay-time bars.
pub fn decay_bar_color() -> RGBColor {
    to_rgb(named::STEELBLUE)
}

/// The 25-year reference line.
pub fn limit_line_color() -> RGBColor {
    to_rgb(named::RED)
}

/// Compliance bars: green when the orbit meets the 25-year rule, red otherwise.
pub fn compliance_color(compliant: bool) -> RGBColor {
    if compliant {
        to_rgb(named::GREEN)
    } else {
        to_rgb(named::RED)
    }
}

pub fn background_color() -> RGBColor {
    to_rgb(named::WHITE)
}

//! Built-in value → color scales for climate overlays.
//!
//! Each scale maps a value within a `[min, max]` domain onto a sequential ramp
//! of ColorBrewer stops and returns a CSS `rgb(r, g, b)` string, the same shape
//! any external color function hands to [`crate::raster::rasterize`].

use serde::{Deserialize, Serialize};

use crate::color::{hex_to_rgb, interpolate_color, Color};

const YL_OR_RD: &[&str] = &[
    "#ffffcc", "#ffeda0", "#fed976", "#feb24c", "#fd8d3c", "#fc4e2a", "#e31a1c", "#bd0026",
    "#800026",
];

const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

const BR_BG: &[&str] = &[
    "#543005", "#8c510a", "#bf812d", "#dfc27d", "#f6e8c3", "#f5f5f5", "#c7eae5", "#80cdc1",
    "#35978f", "#01665e", "#003c30",
];

const RD_BU: &[&str] = &[
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#f7f7f7", "#d1e5f0", "#92c5de",
    "#4393c3", "#2166ac", "#053061",
];

/// Named color scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    /// Yellow → orange → red.
    #[default]
    Temperature,
    /// Light → dark blue.
    Precipitation,
    /// Yellow → dark red.
    HotDays,
    /// Teal for few dry days, brown for many.
    DryDays,
    /// Red for increases, blue for decreases, centered on zero.
    Diverging,
}

impl ColorScale {
    pub const ALL: [ColorScale; 5] = [
        ColorScale::Temperature,
        ColorScale::Precipitation,
        ColorScale::HotDays,
        ColorScale::DryDays,
        ColorScale::Diverging,
    ];

    /// Look up a scale by name. Unknown names fall back to temperature.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().replace('-', "_").as_str() {
            "precipitation" => Self::Precipitation,
            "hot_days" => Self::HotDays,
            "dry_days" => Self::DryDays,
            "diverging" => Self::Diverging,
            _ => Self::Temperature,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Temperature => "temperature",
            Self::Precipitation => "precipitation",
            Self::HotDays => "hot_days",
            Self::DryDays => "dry_days",
            Self::Diverging => "diverging",
        }
    }

    fn stops(&self) -> &'static [&'static str] {
        match self {
            Self::Temperature | Self::HotDays => YL_OR_RD,
            Self::Precipitation => BLUES,
            Self::DryDays => BR_BG,
            Self::Diverging => RD_BU,
        }
    }

    /// Ramp domain `(start, end)`: the value mapped to the first stop and the
    /// value mapped to the last.
    fn domain(&self, min: f64, max: f64) -> (f64, f64) {
        match self {
            Self::DryDays => (max, min),
            Self::Diverging => {
                let abs_max = min.abs().max(max.abs());
                (abs_max, -abs_max)
            }
            _ => (min, max),
        }
    }

    /// Color for `value` within `[min, max]` as a [`Color`].
    pub fn color_at(&self, value: f64, min: f64, max: f64) -> Color {
        let (start, end) = self.domain(min, max);
        let span = end - start;
        let t = if span == 0.0 { 0.5 } else { (value - start) / span };
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        sample_ramp(self.stops(), t)
    }

    /// Color for `value` within `[min, max]` as a CSS string.
    pub fn color(&self, value: f64, min: f64, max: f64) -> String {
        self.color_at(value, min, max).to_css()
    }
}

/// Position `t` in `[0, 1]` along evenly spaced hex stops.
fn sample_ramp(stops: &[&str], t: f64) -> Color {
    let to_color = |hex: &str| {
        hex_to_rgb(hex)
            .map(|(r, g, b)| Color::rgb(r, g, b))
            .unwrap_or_else(Color::transparent)
    };

    let Some(last) = stops.len().checked_sub(1) else {
        return Color::transparent();
    };
    if last == 0 {
        return to_color(stops[0]);
    }

    let pos = t * last as f64;
    let lower = (pos.floor() as usize).min(last - 1);
    let frac = pos - lower as f64;
    interpolate_color(to_color(stops[lower]), to_color(stops[lower + 1]), frac)
}

/// A labelled point on a legend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegendStop {
    pub value: f64,
    pub color: String,
}

/// `steps + 1` evenly spaced legend entries from `min` to `max`.
///
/// Values are rounded to one decimal; colors use the unrounded value.
pub fn legend_stops(min: f64, max: f64, scale: ColorScale, steps: usize) -> Vec<LegendStop> {
    let steps = steps.max(1);
    (0..=steps)
        .map(|i| {
            let value = min + (max - min) * (i as f64 / steps as f64);
            LegendStop {
                value: (value * 10.0).round() / 10.0,
                color: scale.color(value, min, max),
            }
        })
        .collect()
}

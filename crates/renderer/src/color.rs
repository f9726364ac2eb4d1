//! RGBA colors and CSS color-string parsing.
//!
//! Color functions hand back CSS strings; the rasterizer turns them into bytes
//! with [`try_parse_color`]. Parsing never fails loudly: anything that is not
//! `rgb(...)`, `rgba(...)` or `#rrggbb` is treated as transparent black.

/// Color value in RGBA format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Same color with a different alpha.
    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// CSS `rgb(r, g, b)` form. Alpha is dropped.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// `[r, g, b, a]` as stored in an RGBA8 buffer.
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Parse hex color string to RGB
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Parse a CSS color string, or `None` if the format is not recognised.
///
/// Accepted forms (case-insensitive, surrounding whitespace ignored):
/// - `rgb(r, g, b)`, alpha 255
/// - `rgba(r, g, b, a)` with `a` in `[0, 1]`
/// - `#rrggbb`, alpha 255
///
/// Channel values above 255 saturate.
pub fn try_parse_color(input: &str) -> Option<Color> {
    let s = input.trim();
    let lower = s.to_ascii_lowercase();

    if let Some(args) = function_args(&lower, "rgba") {
        let [r, g, b, a] = parse_components::<4>(args)?;
        let alpha = (a.clamp(0.0, 1.0) * 255.0).round() as u8;
        return Some(Color::new(channel(r), channel(g), channel(b), alpha));
    }

    if let Some(args) = function_args(&lower, "rgb") {
        let [r, g, b] = parse_components::<3>(args)?;
        return Some(Color::rgb(channel(r), channel(g), channel(b)));
    }

    if s.starts_with('#') {
        let (r, g, b) = hex_to_rgb(s)?;
        return Some(Color::rgb(r, g, b));
    }

    None
}

/// Parse a CSS color string, falling back to transparent black.
pub fn parse_color(input: &str) -> Color {
    try_parse_color(input).unwrap_or_else(Color::transparent)
}

/// Linear color interpolation
pub fn interpolate_color(color1: Color, color2: Color, t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;

    Color::new(
        lerp(color1.r, color2.r),
        lerp(color1.g, color2.g),
        lerp(color1.b, color2.b),
        lerp(color1.a, color2.a),
    )
}

/// Contents between `name(` and the closing `)`.
fn function_args<'a>(s: &'a str, name: &str) -> Option<&'a str> {
    s.strip_prefix(name)?
        .trim_start()
        .strip_prefix('(')?
        .strip_suffix(')')
}

fn parse_components<const N: usize>(args: &str) -> Option<[f64; N]> {
    let mut out = [0.0; N];
    let mut parts = args.split(',');
    for slot in out.iter_mut() {
        let v: f64 = parts.next()?.trim().parse().ok()?;
        if !v.is_finite() || v < 0.0 {
            return None;
        }
        *slot = v;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(out)
}

/// Round and saturate a channel value into a byte.
fn channel(v: f64) -> u8 {
    v.round().min(255.0) as u8
}

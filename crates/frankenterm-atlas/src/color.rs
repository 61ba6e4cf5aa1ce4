//! Concrete colors, the ANSI palette, and luminance math.

use serde::{Deserialize, Serialize};

use crate::error::AtlasError;

/// Packed `0xRRGGBBAA` color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgba(pub u32);

impl Rgba {
    pub const TRANSPARENT: Self = Self(0);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self(((r as u32) << 24) | ((g as u32) << 16) | ((b as u32) << 8) | (a as u32))
    }

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 0xFF)
    }

    /// Packed RGBA from a 24-bit `0xRRGGBB` value: shifted left by 8 so the
    /// alpha byte is appended as zero.
    #[must_use]
    pub const fn from_packed_rgb(rgb: u32) -> Self {
        Self((rgb & 0x00FF_FFFF) << 8)
    }

    #[must_use]
    pub const fn r(self) -> u8 {
        (self.0 >> 24) as u8
    }

    #[must_use]
    pub const fn g(self) -> u8 {
        (self.0 >> 16) as u8
    }

    #[must_use]
    pub const fn b(self) -> u8 {
        (self.0 >> 8) as u8
    }

    #[must_use]
    pub const fn a(self) -> u8 {
        self.0 as u8
    }

    /// RGB portion as `0xRRGGBB`.
    #[must_use]
    pub const fn rgb_bits(self) -> u32 {
        self.0 >> 8
    }

    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self((self.0 & 0xFFFF_FF00) | a as u32)
    }

    /// `#rrggbb`, ignoring alpha.
    #[must_use]
    pub fn to_css_opaque(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r(), self.g(), self.b())
    }

    /// `#rrggbb` when opaque, `#rrggbbaa` otherwise.
    #[must_use]
    pub fn to_css(self) -> String {
        if self.a() == 0xFF {
            self.to_css_opaque()
        } else {
            format!(
                "#{:02x}{:02x}{:02x}{:02x}",
                self.r(),
                self.g(),
                self.b(),
                self.a()
            )
        }
    }
}

/// A color in both CSS and packed RGBA form. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResolvedColor {
    pub css: String,
    pub rgba: Rgba,
}

impl ResolvedColor {
    #[must_use]
    pub fn opaque(r: u8, g: u8, b: u8) -> Self {
        let rgba = Rgba::rgb(r, g, b);
        Self {
            css: rgba.to_css_opaque(),
            rgba,
        }
    }

    /// Fully transparent black, used when the host allows transparency.
    #[must_use]
    pub fn transparent() -> Self {
        Self {
            css: "rgba(0, 0, 0, 0)".to_owned(),
            rgba: Rgba::TRANSPARENT,
        }
    }

    /// Parse a CSS color, keeping the original string as the CSS form.
    pub fn from_css(css: &str) -> Result<Self, AtlasError> {
        let rgba = parse_css_color(css).ok_or_else(|| AtlasError::InvalidColor(css.to_owned()))?;
        Ok(Self {
            css: css.to_owned(),
            rgba,
        })
    }
}

impl TryFrom<String> for ResolvedColor {
    type Error = AtlasError;

    fn try_from(css: String) -> Result<Self, Self::Error> {
        let rgba = parse_css_color(&css).ok_or_else(|| AtlasError::InvalidColor(css.clone()))?;
        Ok(Self { css, rgba })
    }
}

impl From<ResolvedColor> for String {
    fn from(color: ResolvedColor) -> Self {
        color.css
    }
}

/// Parse `#rgb`, `#rrggbb`, `#rrggbbaa`, `rgb(r, g, b)` or `rgba(r, g, b, a)`.
#[must_use]
pub fn parse_css_color(css: &str) -> Option<Rgba> {
    let css = css.trim();
    if let Some(hex) = css.strip_prefix('#') {
        return parse_hex(hex);
    }
    let lower = css.to_ascii_lowercase();
    if let Some(body) = lower.strip_prefix("rgba(").and_then(|s| s.strip_suffix(')')) {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return None;
        }
        let alpha: f32 = parts[3].parse().ok()?;
        if !(0.0..=1.0).contains(&alpha) {
            return None;
        }
        return Some(Rgba::new(
            parts[0].parse().ok()?,
            parts[1].parse().ok()?,
            parts[2].parse().ok()?,
            (alpha * 255.0).round() as u8,
        ));
    }
    if let Some(body) = lower.strip_prefix("rgb(").and_then(|s| s.strip_suffix(')')) {
        let parts: Vec<&str> = body.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return None;
        }
        return Some(Rgba::rgb(
            parts[0].parse().ok()?,
            parts[1].parse().ok()?,
            parts[2].parse().ok()?,
        ));
    }
    None
}

fn parse_hex(hex: &str) -> Option<Rgba> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    match hex.len() {
        3 => {
            let nibble = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some(Rgba::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
        }
        6 => Some(Rgba::rgb(byte(0)?, byte(2)?, byte(4)?)),
        8 => Some(Rgba::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        _ => None,
    }
}

/// Default foreground, background and ANSI palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorTheme {
    pub foreground: ResolvedColor,
    pub background: ResolvedColor,
    pub ansi: Vec<ResolvedColor>,
}

impl Default for ColorTheme {
    fn default() -> Self {
        Self {
            foreground: ResolvedColor::opaque(0xFF, 0xFF, 0xFF),
            background: ResolvedColor::opaque(0x00, 0x00, 0x00),
            ansi: default_palette(),
        }
    }
}

const ANSI16_PALETTE: [(u8, u8, u8); 16] = [
    (0, 0, 0),       // Black
    (205, 0, 0),     // Red
    (0, 205, 0),     // Green
    (205, 205, 0),   // Yellow
    (0, 0, 238),     // Blue
    (205, 0, 205),   // Magenta
    (0, 205, 205),   // Cyan
    (229, 229, 229), // White
    (127, 127, 127), // Bright Black
    (255, 0, 0),     // Bright Red
    (0, 255, 0),     // Bright Green
    (255, 255, 0),   // Bright Yellow
    (92, 92, 255),   // Bright Blue
    (255, 0, 255),   // Bright Magenta
    (0, 255, 255),   // Bright Cyan
    (255, 255, 255), // Bright White
];

/// RGB for an xterm 256-color index.
#[must_use]
pub fn ansi256_to_rgb(index: u8) -> (u8, u8, u8) {
    if index < 16 {
        return ANSI16_PALETTE[index as usize];
    }
    if index >= 232 {
        let gray = 8 + 10 * (index - 232);
        return (gray, gray, gray);
    }
    const LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];
    let idx = index - 16;
    (
        LEVELS[(idx / 36) as usize],
        LEVELS[((idx / 6) % 6) as usize],
        LEVELS[(idx % 6) as usize],
    )
}

/// The full 256-entry xterm palette.
#[must_use]
pub fn default_palette() -> Vec<ResolvedColor> {
    (0..=255u8)
        .map(|idx| {
            let (r, g, b) = ansi256_to_rgb(idx);
            ResolvedColor::opaque(r, g, b)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Luminance and contrast (WCAG 2.x)
// ---------------------------------------------------------------------------

fn channel_luminance(c: u8) -> f64 {
    let s = f64::from(c) / 255.0;
    if s <= 0.03928 {
        s / 12.92
    } else {
        ((s + 0.055) / 1.055).powf(2.4)
    }
}

/// Relative luminance of an sRGB color, in `0.0..=1.0`.
#[must_use]
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    0.2126 * channel_luminance(r) + 0.7152 * channel_luminance(g) + 0.0722 * channel_luminance(b)
}

/// Contrast ratio between two relative luminances, in `1.0..=21.0`.
#[must_use]
pub fn contrast_ratio(l1: f64, l2: f64) -> f64 {
    let (lighter, darker) = if l1 >= l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// Contrast ratio between two packed colors, alpha ignored.
#[must_use]
pub fn rgba_contrast_ratio(a: Rgba, b: Rgba) -> f64 {
    contrast_ratio(
        relative_luminance(a.r(), a.g(), a.b()),
        relative_luminance(b.r(), b.g(), b.b()),
    )
}

fn ceil_tenth(v: u8) -> u8 {
    ((u16::from(v) + 9) / 10) as u8
}

/// Darken `fg` in 10% steps until it reaches `ratio` against `bg` or hits black.
#[must_use]
pub fn reduce_luminance(bg: Rgba, fg: Rgba, ratio: f64) -> Rgba {
    let (mut r, mut g, mut b) = (fg.r(), fg.g(), fg.b());
    let bg_l = relative_luminance(bg.r(), bg.g(), bg.b());
    let mut cr = contrast_ratio(relative_luminance(r, g, b), bg_l);
    while cr < ratio && (r > 0 || g > 0 || b > 0) {
        r -= ceil_tenth(r);
        g -= ceil_tenth(g);
        b -= ceil_tenth(b);
        cr = contrast_ratio(relative_luminance(r, g, b), bg_l);
    }
    Rgba::rgb(r, g, b)
}

/// Lighten `fg` in 10% steps until it reaches `ratio` against `bg` or hits white.
#[must_use]
pub fn increase_luminance(bg: Rgba, fg: Rgba, ratio: f64) -> Rgba {
    let (mut r, mut g, mut b) = (fg.r(), fg.g(), fg.b());
    let bg_l = relative_luminance(bg.r(), bg.g(), bg.b());
    let mut cr = contrast_ratio(relative_luminance(r, g, b), bg_l);
    while cr < ratio && (r < 0xFF || g < 0xFF || b < 0xFF) {
        r += ceil_tenth(0xFF - r);
        g += ceil_tenth(0xFF - g);
        b += ceil_tenth(0xFF - b);
        cr = contrast_ratio(relative_luminance(r, g, b), bg_l);
    }
    Rgba::rgb(r, g, b)
}

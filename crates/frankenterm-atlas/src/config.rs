//! Atlas configuration: colors, font, and cell geometry.
//!
//! Supplied once at construction and treated as immutable afterwards. A color
//! change means building a new atlas (or clearing the contrast memo and the
//! texture explicitly).

use serde::{Deserialize, Serialize};

use crate::attrs::ColorMode;
use crate::color::{ColorTheme, ResolvedColor, Rgba};
use crate::error::AtlasError;

/// Padding (px) around the cell on the scratch surface. Absorbs antialiasing
/// bleed and glyphs that overhang their cell.
pub const GLYPH_PADDING: u16 = 2;

/// Global alpha applied to dim text.
pub const DIM_OPACITY: f32 = 0.5;

/// Atlas texture width in pixels.
pub const TEXTURE_WIDTH: u32 = 1024;
/// Atlas texture height in pixels.
pub const TEXTURE_HEIGHT: u32 = 1024;

const MIN_DPR: f32 = 0.25;
const MAX_DPR: f32 = 8.0;
const MAX_CONTRAST_RATIO: f32 = 21.0;

/// CSS-style numeric font weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: Self = Self(400);
    pub const BOLD: Self = Self(700);

    /// Weights of 600 and above select a bold face.
    #[must_use]
    pub const fn is_bold(self) -> bool {
        self.0 >= 600
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlasConfig {
    pub colors: ColorTheme,
    pub font_family: String,
    /// Font size in CSS pixels; rasterized at `font_size * device_pixel_ratio`.
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_weight_bold: FontWeight,
    pub device_pixel_ratio: f32,
    /// Cell width in device pixels.
    pub scaled_char_width: u16,
    /// Cell height in device pixels.
    pub scaled_char_height: u16,
    /// Render backgrounds fully transparent.
    pub allow_transparency: bool,
    /// 1.0 disables contrast enforcement.
    pub minimum_contrast_ratio: f32,
    /// Bold text in palette colors 0-7 uses the bright variant (8-15).
    pub draw_bold_text_in_bright_colors: bool,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            colors: ColorTheme::default(),
            font_family: "monospace".to_owned(),
            font_size: 15.0,
            font_weight: FontWeight::NORMAL,
            font_weight_bold: FontWeight::BOLD,
            device_pixel_ratio: 1.0,
            scaled_char_width: 9,
            scaled_char_height: 17,
            allow_transparency: false,
            minimum_contrast_ratio: 1.0,
            draw_bold_text_in_bright_colors: true,
        }
    }
}

fn normalized_scale(value: f32, fallback: f32, min: f32, max: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl AtlasConfig {
    /// Clamp scale factors into supported ranges.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.device_pixel_ratio = normalized_scale(self.device_pixel_ratio, 1.0, MIN_DPR, MAX_DPR);
        self.minimum_contrast_ratio =
            normalized_scale(self.minimum_contrast_ratio, 1.0, 1.0, MAX_CONTRAST_RATIO);
        self
    }

    /// Font size in device pixels.
    #[must_use]
    pub fn scaled_font_size(&self) -> f32 {
        self.font_size * self.device_pixel_ratio
    }

    /// Scratch surface size: room for a double-width glyph plus padding.
    #[must_use]
    pub fn scratch_size(&self) -> (u32, u32) {
        let pad = u32::from(GLYPH_PADDING);
        (
            u32::from(self.scaled_char_width) * 2 + pad * 2,
            u32::from(self.scaled_char_height) + pad * 2,
        )
    }

    /// Reject configurations that cannot produce a working atlas.
    pub fn validate(&self) -> Result<(), AtlasError> {
        if self.scaled_char_width == 0 || self.scaled_char_height == 0 {
            return Err(AtlasError::InvalidConfig("cell size must be non-zero"));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(AtlasError::InvalidConfig("font size must be positive"));
        }
        let (w, h) = self.scratch_size();
        if w > TEXTURE_WIDTH || h > TEXTURE_HEIGHT {
            return Err(AtlasError::InvalidConfig(
                "scratch surface does not fit in the atlas texture",
            ));
        }
        if self.colors.ansi.is_empty() {
            return Err(AtlasError::InvalidConfig("palette must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Color resolution
// ---------------------------------------------------------------------------
//
// Inputs are the *effective* sides, i.e. after the inverse swap: `mode` and
// `value` come from whichever attribute word ends up painting that side, and
// `inverse` only matters for default colors.

impl AtlasConfig {
    /// ANSI palette entry, or an error if the index is past the palette end.
    pub fn palette_color(&self, index: u32) -> Result<&ResolvedColor, AtlasError> {
        self.colors
            .ansi
            .get(index as usize)
            .ok_or(AtlasError::PaletteIndexOutOfRange {
                index,
                len: self.colors.ansi.len(),
            })
    }

    fn brightened_index(&self, value: u32, bold: bool) -> u32 {
        if bold && self.draw_bold_text_in_bright_colors && value < 8 {
            value + 8
        } else {
            value
        }
    }

    /// Background fill for the scratch surface.
    pub fn resolve_background(
        &self,
        mode: ColorMode,
        value: u32,
        inverse: bool,
    ) -> Result<ResolvedColor, AtlasError> {
        if self.allow_transparency {
            return Ok(ResolvedColor::transparent());
        }
        match mode {
            ColorMode::Palette16 | ColorMode::Palette256 => self.palette_color(value).cloned(),
            ColorMode::Rgb => {
                let rgba = Rgba::from_packed_rgb(value);
                Ok(ResolvedColor {
                    css: rgba.to_css_opaque(),
                    rgba,
                })
            }
            ColorMode::Default if inverse => Ok(self.colors.foreground.clone()),
            ColorMode::Default => Ok(self.colors.background.clone()),
        }
    }

    /// Packed background used for contrast math. Ignores `allow_transparency`.
    pub fn background_rgba(
        &self,
        mode: ColorMode,
        value: u32,
        inverse: bool,
    ) -> Result<Rgba, AtlasError> {
        match mode {
            ColorMode::Palette16 | ColorMode::Palette256 => Ok(self.palette_color(value)?.rgba),
            ColorMode::Rgb => Ok(Rgba::from_packed_rgb(value)),
            ColorMode::Default if inverse => Ok(self.colors.foreground.rgba),
            ColorMode::Default => Ok(self.colors.background.rgba),
        }
    }

    /// Packed foreground used for contrast math.
    pub fn foreground_rgba(
        &self,
        mode: ColorMode,
        value: u32,
        inverse: bool,
        bold: bool,
    ) -> Result<Rgba, AtlasError> {
        match mode {
            ColorMode::Palette16 | ColorMode::Palette256 => {
                Ok(self.palette_color(self.brightened_index(value, bold))?.rgba)
            }
            ColorMode::Rgb => Ok(Rgba::from_packed_rgb(value)),
            ColorMode::Default if inverse => Ok(self.colors.background.rgba),
            ColorMode::Default => Ok(self.colors.foreground.rgba),
        }
    }

    /// CSS foreground before contrast enforcement.
    pub fn foreground_css(
        &self,
        mode: ColorMode,
        value: u32,
        inverse: bool,
        bold: bool,
    ) -> Result<String, AtlasError> {
        match mode {
            ColorMode::Palette16 | ColorMode::Palette256 => Ok(self
                .palette_color(self.brightened_index(value, bold))?
                .css
                .clone()),
            ColorMode::Rgb => Ok(Rgba::from_packed_rgb(value).to_css_opaque()),
            ColorMode::Default if inverse => {
                let css = &self.colors.background.css;
                // #rrggbbaa -> #rrggbb
                match css.get(..7) {
                    Some(rgb) if css.len() == 9 && css.starts_with('#') => Ok(rgb.to_owned()),
                    _ => Ok(css.clone()),
                }
            }
            ColorMode::Default => Ok(self.colors.foreground.css.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AtlasConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.colors.ansi.len(), 256);
    }

    #[test]
    fn scratch_size_fits_double_width_plus_padding() {
        let config = AtlasConfig {
            scaled_char_width: 10,
            scaled_char_height: 20,
            ..AtlasConfig::default()
        };
        assert_eq!(config.scratch_size(), (24, 24));
    }

    #[test]
    fn zero_cell_rejected() {
        let config = AtlasConfig {
            scaled_char_width: 0,
            ..AtlasConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(AtlasError::InvalidConfig("cell size must be non-zero"))
        );
    }

    #[test]
    fn oversized_cell_rejected() {
        let config = AtlasConfig {
            scaled_char_width: 600,
            ..AtlasConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_font_size_rejected() {
        let config = AtlasConfig {
            font_size: f32::NAN,
            ..AtlasConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn normalized_clamps_scales() {
        let config = AtlasConfig {
            device_pixel_ratio: 100.0,
            minimum_contrast_ratio: 0.5,
            ..AtlasConfig::default()
        }
        .normalized();
        assert_eq!(config.device_pixel_ratio, MAX_DPR);
        assert_eq!(config.minimum_contrast_ratio, 1.0);

        let config = AtlasConfig {
            device_pixel_ratio: f32::NAN,
            minimum_contrast_ratio: 30.0,
            ..AtlasConfig::default()
        }
        .normalized();
        assert_eq!(config.device_pixel_ratio, 1.0);
        assert_eq!(config.minimum_contrast_ratio, MAX_CONTRAST_RATIO);
    }

    #[test]
    fn font_weight_boldness() {
        assert!(!FontWeight::NORMAL.is_bold());
        assert!(FontWeight::BOLD.is_bold());
        assert!(FontWeight(600).is_bold());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: AtlasConfig =
            serde_json::from_str(r#"{"font_size": 20.0, "font_weight_bold": 800}"#)
                .expect("deserialize");
        assert_eq!(config.font_size, 20.0);
        assert_eq!(config.font_weight_bold, FontWeight(800));
        assert_eq!(config.scaled_char_width, 9);
        assert_eq!(config.colors, ColorTheme::default());
    }

    #[test]
    fn json_round_trip() {
        let config = AtlasConfig {
            allow_transparency: true,
            minimum_contrast_ratio: 4.5,
            ..AtlasConfig::default()
        };
        let json = serde_json::to_string(&config).expect("serialize");
        let back: AtlasConfig = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, config);
    }

    fn themed() -> AtlasConfig {
        let mut config = AtlasConfig::default();
        config.colors.foreground = ResolvedColor::from_css("#d0d0d0").expect("fg");
        config.colors.background = ResolvedColor::from_css("#10203080").expect("bg");
        config
    }

    #[test]
    fn palette_lookup_out_of_range_is_error() {
        let mut config = AtlasConfig::default();
        config.colors.ansi.truncate(16);
        assert_eq!(
            config.resolve_background(ColorMode::Palette256, 200, false),
            Err(AtlasError::PaletteIndexOutOfRange { index: 200, len: 16 })
        );
    }

    #[test]
    fn bold_brightens_low_palette_entries() {
        let config = AtlasConfig::default();
        let css = config
            .foreground_css(ColorMode::Palette16, 1, false, true)
            .expect("css");
        assert_eq!(css, config.colors.ansi[9].css);
        let rgba = config
            .foreground_rgba(ColorMode::Palette16, 1, false, true)
            .expect("rgba");
        assert_eq!(rgba, config.colors.ansi[9].rgba);

        // Index 8 and above are left alone.
        let css = config
            .foreground_css(ColorMode::Palette256, 8, false, true)
            .expect("css");
        assert_eq!(css, config.colors.ansi[8].css);
    }

    #[test]
    fn bold_brightening_can_be_disabled() {
        let config = AtlasConfig {
            draw_bold_text_in_bright_colors: false,
            ..AtlasConfig::default()
        };
        let css = config
            .foreground_css(ColorMode::Palette16, 1, false, true)
            .expect("css");
        assert_eq!(css, config.colors.ansi[1].css);
    }

    #[test]
    fn background_never_brightens() {
        let config = AtlasConfig::default();
        let bg = config
            .resolve_background(ColorMode::Palette16, 1, false)
            .expect("bg");
        assert_eq!(bg, config.colors.ansi[1]);
    }

    #[test]
    fn truecolor_formats_css_and_shifts_rgba() {
        let config = AtlasConfig::default();
        let bg = config
            .resolve_background(ColorMode::Rgb, 0x0A_0B_0C, false)
            .expect("bg");
        assert_eq!(bg.css, "#0a0b0c");
        assert_eq!(bg.rgba, Rgba(0x0A0B_0C00));
        assert_eq!(
            config
                .foreground_css(ColorMode::Rgb, 0xFF_80_00, false, true)
                .expect("css"),
            "#ff8000"
        );
        assert_eq!(
            config
                .foreground_rgba(ColorMode::Rgb, 0xFF_80_00, false, false)
                .expect("rgba"),
            Rgba(0xFF80_0000)
        );
    }

    #[test]
    fn default_colors_swap_under_inverse() {
        let config = themed();
        assert_eq!(
            config
                .resolve_background(ColorMode::Default, 0, true)
                .expect("bg"),
            config.colors.foreground
        );
        assert_eq!(
            config
                .background_rgba(ColorMode::Default, 0, false)
                .expect("bg"),
            config.colors.background.rgba
        );
        assert_eq!(
            config
                .foreground_rgba(ColorMode::Default, 0, true, false)
                .expect("fg"),
            config.colors.background.rgba
        );
    }

    #[test]
    fn inverse_default_foreground_drops_alpha_suffix() {
        let config = themed();
        assert_eq!(
            config
                .foreground_css(ColorMode::Default, 0, true, false)
                .expect("css"),
            "#102030"
        );
        assert_eq!(
            config
                .foreground_css(ColorMode::Default, 0, false, false)
                .expect("css"),
            "#d0d0d0"
        );
    }

    #[test]
    fn inverse_default_foreground_keeps_non_ascii_css_whole() {
        let mut config = themed();
        config.colors.background.css = "#ab\u{20AC}\u{20AC}".to_owned();
        assert_eq!(config.colors.background.css.len(), 9);
        assert_eq!(
            config
                .foreground_css(ColorMode::Default, 0, true, false)
                .expect("css"),
            "#ab\u{20AC}\u{20AC}"
        );
    }

    #[test]
    fn transparency_overrides_background_css_only() {
        let config = AtlasConfig {
            allow_transparency: true,
            ..AtlasConfig::default()
        };
        let bg = config
            .resolve_background(ColorMode::Palette16, 4, false)
            .expect("bg");
        assert_eq!(bg, ResolvedColor::transparent());
        // Contrast math still sees the real color.
        assert_eq!(
            config
                .background_rgba(ColorMode::Palette16, 4, false)
                .expect("rgba"),
            config.colors.ansi[4].rgba
        );
    }
}

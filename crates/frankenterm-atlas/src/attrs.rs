//! Packed cell attributes as consumed by the atlas.
//!
//! Each side of an [`AttributePair`] is a single `u32` word:
//!
//! ```text
//!  31            26 25 24 23                      0
//! +----------------+-----+-------------------------+
//! |     flags      | CM  |  color value            |
//! +----------------+-----+-------------------------+
//! ```
//!
//! - bits 0..24: palette index (low byte) or packed `0xRRGGBB`
//! - bits 24..26: color mode (default, palette-16, palette-256, RGB)
//! - bits 26..32: style flags; the foreground word carries inverse, bold,
//!   underline, blink, invisible and strikethrough, the background word
//!   carries italic and dim.
//!
//! The raw words are the cache partition key, so two attribute pairs that
//! resolve to the same colors but differ in encoding are cached separately.

use bitflags::bitflags;

/// Encoding of "use the configured default color" on either side.
pub const DEFAULT_COLOR: u32 = 0;

/// Mask for a palette index.
pub const PALETTE_MASK: u32 = 0x0000_00FF;
/// Mask for a packed `0xRRGGBB` value.
pub const RGB_MASK: u32 = 0x00FF_FFFF;
/// Mask for the color-mode bits.
pub const COLOR_MODE_MASK: u32 = 0x0300_0000;
/// Mask for the flag bits.
pub const FLAGS_MASK: u32 = 0xFC00_0000;

const CM_DEFAULT: u32 = 0;
const CM_P16: u32 = 0x0100_0000;
const CM_P256: u32 = 0x0200_0000;
const CM_RGB: u32 = 0x0300_0000;

bitflags! {
    /// Flags stored in the foreground word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FgFlags: u32 {
        const INVERSE       = 1 << 26;
        const BOLD          = 1 << 27;
        const UNDERLINE     = 1 << 28;
        const BLINK         = 1 << 29;
        const INVISIBLE     = 1 << 30;
        const STRIKETHROUGH = 1 << 31;
    }
}

bitflags! {
    /// Flags stored in the background word.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BgFlags: u32 {
        const ITALIC = 1 << 26;
        const DIM    = 1 << 27;
    }
}

/// Color-mode tag of one attribute word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorMode {
    #[default]
    Default,
    Palette16,
    Palette256,
    Rgb,
}

impl ColorMode {
    #[must_use]
    pub const fn from_word(word: u32) -> Self {
        match word & COLOR_MODE_MASK {
            CM_P16 => Self::Palette16,
            CM_P256 => Self::Palette256,
            CM_RGB => Self::Rgb,
            _ => Self::Default,
        }
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        match self {
            Self::Default => CM_DEFAULT,
            Self::Palette16 => CM_P16,
            Self::Palette256 => CM_P256,
            Self::Rgb => CM_RGB,
        }
    }

    /// Palette modes index the configured ANSI palette.
    #[must_use]
    pub const fn is_palette(self) -> bool {
        matches!(self, Self::Palette16 | Self::Palette256)
    }
}

/// Typed view of the color portion of an attribute word.
///
/// Mirrors the terminal color hierarchy:
/// default → 16 named → 256 indexed → 24-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorSpec {
    #[default]
    Default,
    Palette16(u8),
    Palette256(u8),
    Rgb(u8, u8, u8),
}

impl ColorSpec {
    /// Encode into the low 26 bits of an attribute word (no flags).
    #[must_use]
    pub const fn encode(self) -> u32 {
        match self {
            Self::Default => CM_DEFAULT,
            Self::Palette16(idx) => CM_P16 | idx as u32,
            Self::Palette256(idx) => CM_P256 | idx as u32,
            Self::Rgb(r, g, b) => CM_RGB | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32),
        }
    }

    /// Decode the color portion of an attribute word, ignoring flags.
    #[must_use]
    pub const fn decode(word: u32) -> Self {
        match ColorMode::from_word(word) {
            ColorMode::Default => Self::Default,
            ColorMode::Palette16 => Self::Palette16((word & PALETTE_MASK) as u8),
            ColorMode::Palette256 => Self::Palette256((word & PALETTE_MASK) as u8),
            ColorMode::Rgb => Self::Rgb(
                ((word >> 16) & 0xFF) as u8,
                ((word >> 8) & 0xFF) as u8,
                (word & 0xFF) as u8,
            ),
        }
    }
}

/// Encoded foreground/background attributes for one draw call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttributePair {
    pub fg: u32,
    pub bg: u32,
}

impl AttributePair {
    /// Default colors, no flags.
    pub const DEFAULT: Self = Self {
        fg: DEFAULT_COLOR,
        bg: DEFAULT_COLOR,
    };

    #[must_use]
    pub const fn new(fg: u32, bg: u32) -> Self {
        Self { fg, bg }
    }

    /// Replace the foreground color, keeping foreground flags.
    #[must_use]
    pub const fn with_fg(self, color: ColorSpec) -> Self {
        Self {
            fg: (self.fg & FLAGS_MASK) | color.encode(),
            bg: self.bg,
        }
    }

    /// Replace the background color, keeping background flags.
    #[must_use]
    pub const fn with_bg(self, color: ColorSpec) -> Self {
        Self {
            fg: self.fg,
            bg: (self.bg & FLAGS_MASK) | color.encode(),
        }
    }

    #[must_use]
    pub const fn with_fg_flags(self, flags: FgFlags) -> Self {
        Self {
            fg: self.fg | flags.bits(),
            bg: self.bg,
        }
    }

    #[must_use]
    pub const fn with_bg_flags(self, flags: BgFlags) -> Self {
        Self {
            fg: self.fg,
            bg: self.bg | flags.bits(),
        }
    }

    #[must_use]
    pub const fn fg_flags(self) -> FgFlags {
        FgFlags::from_bits_truncate(self.fg)
    }

    #[must_use]
    pub const fn bg_flags(self) -> BgFlags {
        BgFlags::from_bits_truncate(self.bg)
    }

    #[must_use]
    pub const fn is_inverse(self) -> bool {
        self.fg_flags().contains(FgFlags::INVERSE)
    }

    #[must_use]
    pub const fn is_bold(self) -> bool {
        self.fg_flags().contains(FgFlags::BOLD)
    }

    #[must_use]
    pub const fn is_invisible(self) -> bool {
        self.fg_flags().contains(FgFlags::INVISIBLE)
    }

    #[must_use]
    pub const fn is_italic(self) -> bool {
        self.bg_flags().contains(BgFlags::ITALIC)
    }

    #[must_use]
    pub const fn is_dim(self) -> bool {
        self.bg_flags().contains(BgFlags::DIM)
    }

    #[must_use]
    pub const fn fg_color_mode(self) -> ColorMode {
        ColorMode::from_word(self.fg)
    }

    #[must_use]
    pub const fn bg_color_mode(self) -> ColorMode {
        ColorMode::from_word(self.bg)
    }

    /// Foreground color value: palette index, packed RGB, or 0 for default.
    #[must_use]
    pub const fn fg_color(self) -> u32 {
        color_value(self.fg)
    }

    /// Background color value: palette index, packed RGB, or 0 for default.
    #[must_use]
    pub const fn bg_color(self) -> u32 {
        color_value(self.bg)
    }
}

const fn color_value(word: u32) -> u32 {
    match ColorMode::from_word(word) {
        ColorMode::Palette16 | ColorMode::Palette256 => word & PALETTE_MASK,
        ColorMode::Rgb => word & RGB_MASK,
        ColorMode::Default => 0,
    }
}

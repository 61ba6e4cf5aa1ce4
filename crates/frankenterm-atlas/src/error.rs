//! Error type shared by every atlas component.

use std::fmt;

/// Failures surfaced by the atlas.
///
/// None of these are recoverable by the atlas itself: they indicate a bad
/// configuration or a backend that could not be set up. Empty glyphs and
/// texture overflow are not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AtlasError {
    /// A palette color mode referenced an index past the end of the palette.
    PaletteIndexOutOfRange { index: u32, len: usize },
    /// A configured color string could not be parsed.
    InvalidColor(String),
    /// The configuration cannot produce a working atlas.
    InvalidConfig(&'static str),
    /// The glyph renderer backend could not be initialized.
    Font(String),
}

impl fmt::Display for AtlasError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PaletteIndexOutOfRange { index, len } => {
                write!(f, "no color found for palette index {index} (palette has {len} entries)")
            }
            Self::InvalidColor(css) => write!(f, "invalid color: {css:?}"),
            Self::InvalidConfig(reason) => write!(f, "invalid atlas config: {reason}"),
            Self::Font(reason) => write!(f, "font backend unavailable: {reason}"),
        }
    }
}

impl std::error::Error for AtlasError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_palette_index_out_of_range() {
        let err = AtlasError::PaletteIndexOutOfRange { index: 300, len: 256 };
        assert_eq!(
            err.to_string(),
            "no color found for palette index 300 (palette has 256 entries)"
        );
    }

    #[test]
    fn display_invalid_config() {
        let err = AtlasError::InvalidConfig("cell size must be non-zero");
        assert!(err.to_string().contains("cell size must be non-zero"));
    }

    #[test]
    fn implements_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(AtlasError::Font("bad bytes".into()));
        assert!(err.to_string().contains("bad bytes"));
    }
}

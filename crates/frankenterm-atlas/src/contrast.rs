//! Minimum-contrast enforcement with a per-attribute-pair memo.
//!
//! The memo distinguishes "not computed yet" (no entry) from "computed, no
//! adjustment" ([`ContrastEntry::NoAdjustment`]), so the luminance search runs
//! at most once per `(bg, fg)` attribute pair until the cache is cleared.

use rustc_hash::FxHashMap;

use crate::color::{
    Rgba, contrast_ratio, increase_luminance, reduce_luminance, relative_luminance,
    rgba_contrast_ratio,
};
use crate::error::AtlasError;

/// Memoized outcome for one attribute pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContrastEntry {
    /// Foreground replaced by this CSS color.
    Adjusted(String),
    /// Either the pair already meets the ratio or no candidate could.
    NoAdjustment,
}

/// Map from raw `(bg, fg)` attribute words to a memoized outcome.
#[derive(Debug, Default)]
pub struct ContrastCache {
    entries: FxHashMap<(u32, u32), ContrastEntry>,
}

impl ContrastCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, bg: u32, fg: u32) -> Option<&ContrastEntry> {
        self.entries.get(&(bg, fg))
    }

    pub fn set(&mut self, bg: u32, fg: u32, entry: ContrastEntry) {
        self.entries.insert((bg, fg), entry);
    }

    /// Drop every memoized entry. Call when the color configuration changes.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Find a foreground that reaches `ratio` against `bg`.
///
/// Returns `None` when `fg` already meets the ratio, or when neither darkening
/// nor lightening can reach it. The search first moves away from the
/// background in the direction the foreground already lies.
#[must_use]
pub fn ensure_contrast_ratio(bg: Rgba, fg: Rgba, ratio: f64) -> Option<Rgba> {
    let bg_l = relative_luminance(bg.r(), bg.g(), bg.b());
    let fg_l = relative_luminance(fg.r(), fg.g(), fg.b());
    if contrast_ratio(bg_l, fg_l) >= ratio {
        return None;
    }

    let darker_first = fg_l < bg_l;
    let (first, second): (fn(Rgba, Rgba, f64) -> Rgba, fn(Rgba, Rgba, f64) -> Rgba) =
        if darker_first {
            (reduce_luminance, increase_luminance)
        } else {
            (increase_luminance, reduce_luminance)
        };

    [first, second]
        .into_iter()
        .map(|adjust| adjust(bg, fg, ratio))
        .find(|candidate| rgba_contrast_ratio(bg, *candidate) >= ratio)
}

/// Memoizing front end over [`ensure_contrast_ratio`].
#[derive(Debug, Default)]
pub struct ContrastEnforcer {
    cache: ContrastCache,
    computations: u64,
}

impl ContrastEnforcer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adjusted foreground CSS for `(bg_attr, fg_attr)`, if any.
    ///
    /// `resolve` yields the effective `(bg, fg)` colors and is only called on
    /// a memo miss. A ratio of 1 (or below) disables enforcement entirely and
    /// leaves the memo untouched.
    pub fn minimum_contrast_css<F>(
        &mut self,
        bg_attr: u32,
        fg_attr: u32,
        ratio: f64,
        resolve: F,
    ) -> Result<Option<String>, AtlasError>
    where
        F: FnOnce() -> Result<(Rgba, Rgba), AtlasError>,
    {
        if ratio <= 1.0 {
            return Ok(None);
        }

        if let Some(entry) = self.cache.get(bg_attr, fg_attr) {
            return Ok(match entry {
                ContrastEntry::Adjusted(css) => Some(css.clone()),
                ContrastEntry::NoAdjustment => None,
            });
        }

        let (bg, fg) = resolve()?;
        self.computations += 1;
        match ensure_contrast_ratio(bg, fg, ratio) {
            Some(adjusted) => {
                let css = adjusted.to_css_opaque();
                self.cache
                    .set(bg_attr, fg_attr, ContrastEntry::Adjusted(css.clone()));
                Ok(Some(css))
            }
            None => {
                self.cache
                    .set(bg_attr, fg_attr, ContrastEntry::NoAdjustment);
                Ok(None)
            }
        }
    }

    /// Number of luminance searches performed (memo misses).
    #[must_use]
    pub fn computations(&self) -> u64 {
        self.computations
    }

    #[must_use]
    pub fn cache(&self) -> &ContrastCache {
        &self.cache
    }

    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

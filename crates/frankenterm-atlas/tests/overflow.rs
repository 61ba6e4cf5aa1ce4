//! Overflow and reset protocol, driven through the public API.

use frankenterm_atlas::{
    AtlasConfig, AttributePair, CharAtlas, ColorSpec, GlyphKey, ProceduralRenderer,
    RasterizedGlyph, TEXTURE_CAPACITY, TEXTURE_HEIGHT, TEXTURE_WIDTH, WARM_UP_RANGE,
};

/// Large cells so the texture fills after ~1.6k glyphs.
fn big_atlas() -> CharAtlas<ProceduralRenderer> {
    let config = AtlasConfig {
        font_size: 40.0,
        scaled_char_width: 24,
        scaled_char_height: 48,
        ..AtlasConfig::default()
    };
    CharAtlas::new(config, ProceduralRenderer).expect("atlas")
}

/// The `i`-th distinct visible (code, fg) combination on the default bg.
fn combo(i: u32) -> (u32, u32) {
    let code = 33 + i % 94;
    let fg = ColorSpec::Rgb(0xFF, (i / 94) as u8, 0x80).encode();
    (code, fg)
}

fn assert_in_bounds(glyph: &RasterizedGlyph) {
    assert!(glyph.texture_position.x + glyph.size.x <= TEXTURE_WIDTH);
    assert!(glyph.texture_position.y + glyph.size.y <= TEXTURE_HEIGHT);
}

fn assert_warm_up_present(atlas: &CharAtlas<ProceduralRenderer>) {
    let default = AttributePair::DEFAULT;
    for code in WARM_UP_RANGE {
        assert!(
            atlas
                .cached(&GlyphKey::code(code, default.bg, default.fg))
                .is_some(),
            "warm-up glyph {code} missing"
        );
    }
}

#[test]
fn begin_frame_resets_once_per_overflow() {
    let mut atlas = big_atlas();
    atlas.warm_up().expect("warm up");
    assert!(!atlas.begin_frame().expect("frame"));

    let mut i = 0;
    let mut last = RasterizedGlyph::NULL;
    while atlas.cursor().row_y <= TEXTURE_CAPACITY {
        let (code, fg) = combo(i);
        last = atlas.get_glyph(code, 0, fg).expect("glyph");
        assert_in_bounds(&last);
        i += 1;
        assert!(i < 5_000, "atlas never filled");
    }
    let (old_code, old_fg) = combo(i - 1);
    assert!(last.texture_position.y > TEXTURE_CAPACITY / 2);

    assert!(atlas.begin_frame().expect("frame"));
    assert!(!atlas.begin_frame().expect("frame"));
    assert_eq!(atlas.stats().resets, 1);
    assert!(atlas.has_canvas_changed());

    // Warm-up was re-run eagerly and starts again at the origin.
    assert_warm_up_present(&atlas);
    let first = atlas.get_glyph(33, 0, 0).expect("glyph");
    assert_eq!(first.texture_position.x, 0);
    assert_eq!(first.texture_position.y, 0);

    // A glyph cached before the reset is rasterized again near the top.
    assert_eq!(atlas.cached(&GlyphKey::code(old_code, 0, old_fg)), None);
    let misses = atlas.stats().misses;
    let again = atlas.get_glyph(old_code, 0, old_fg).expect("glyph");
    assert_eq!(atlas.stats().misses, misses + 1);
    assert!(again.texture_position.y < last.texture_position.y);
    assert!(again.texture_position.y <= atlas.cursor().row_y);
}

#[test]
fn two_thousand_combinations_trigger_reset() {
    let mut atlas = big_atlas();
    atlas.warm_up().expect("warm up");

    let mut resets = 0;
    for i in 0..2_000 {
        if i % 100 == 0 && atlas.begin_frame().expect("frame") {
            resets += 1;
            assert_warm_up_present(&atlas);
        }
        let (code, fg) = combo(i);
        let glyph = atlas.get_glyph(code, 0, fg).expect("glyph");
        assert_in_bounds(&glyph);
    }
    if atlas.begin_frame().expect("frame") {
        resets += 1;
    }

    assert!(resets >= 1);
    assert_eq!(atlas.stats().resets, resets);
    assert_warm_up_present(&atlas);
}

#[test]
fn explicit_clear_then_frame_does_not_double_reset() {
    let mut atlas = big_atlas();
    atlas.warm_up().expect("warm up");
    atlas.clear_texture();
    assert!(atlas.is_empty());
    assert!(!atlas.begin_frame().expect("frame"));
    atlas.warm_up().expect("warm up");
    assert_warm_up_present(&atlas);
}

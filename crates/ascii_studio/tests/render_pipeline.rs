//! End-to-end checks of the render pipeline against synthetic images.

use ascii_studio::{
    AspectRatio, AsciiError, CellColor, ImageHandle, ParameterSet, RenderConfig, RenderPipeline,
    Rgb,
};
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;

fn solid(width: u32, height: u32, rgba: [u8; 4]) -> ImageHandle {
    ImageHandle::new(RgbaImage::from_pixel(width, height, Rgba(rgba))).unwrap()
}

fn gradient(width: u32, height: u32) -> ImageHandle {
    let pixels = RgbaImage::from_fn(width, height, |x, y| {
        let v = ((x * 255) / (width - 1)) as u8;
        Rgba([v, (y * 7 % 256) as u8, 255 - v, 255])
    });
    ImageHandle::new(pixels).unwrap()
}

fn params(resolution: u32) -> ParameterSet {
    ParameterSet { resolution, ..Default::default() }
}

#[test]
fn render_is_deterministic() {
    let pipeline = RenderPipeline::default();
    let image = gradient(64, 48);
    let params = ParameterSet {
        resolution: 50,
        color_mode: true,
        rotation: 33.0,
        scale: 1.3,
        offset_x: -12.5,
        contrast: 1.4,
        ..Default::default()
    };

    let first = pipeline.render(&image, &params).unwrap();
    let second = pipeline.render(&image, &params).unwrap();
    assert_eq!(first, second);
}

#[test]
fn grid_matches_source_ratio_and_glyph_aspect() {
    let pipeline = RenderPipeline::default();
    let grid = pipeline.render(&solid(192, 108, [255, 255, 255, 255]), &params(100)).unwrap();

    assert_eq!((grid.cols, grid.rows), (100, 33));
    assert!((grid.metrics.width - 1200.0).abs() < 0.01);
    assert!((grid.metrics.height - 660.0).abs() < 0.01);
}

#[test]
fn white_image_renders_dense_glyphs_and_margins_stay_empty() {
    let pipeline = RenderPipeline::default();
    let grid = pipeline.render(&solid(192, 108, [255, 255, 255, 255]), &params(100)).unwrap();

    // Fit-to-height leaves roughly one uncovered column on each side.
    for y in 0..grid.rows {
        assert!(grid.get(0, y).is_none());
        assert!(grid.get(99, y).is_none());
        let cell = grid.get(50, y).unwrap();
        assert_eq!(cell.glyph, '@');
        assert_eq!(cell.color, CellColor::Monochrome);
    }
}

#[test]
fn brightness_filter_runs_before_tone_mapping() {
    let pipeline = RenderPipeline::default();
    let image = solid(40, 40, [128, 128, 128, 255]);
    let aspect = AspectRatio::Ratio { width: 0.6, height: 1.0 };

    let neutral = ParameterSet { aspect_ratio: aspect, ..params(10) };
    let grid = pipeline.render(&image, &neutral).unwrap();
    assert_eq!(grid.get(5, 5).unwrap().glyph, '=');

    let dimmed = ParameterSet { brightness: 0.5, ..neutral };
    let grid = pipeline.render(&image, &dimmed).unwrap();
    assert_eq!(grid.get(5, 5).unwrap().glyph, ':');
}

#[test]
fn transparent_source_draws_nothing() {
    let pipeline = RenderPipeline::default();
    let grid = pipeline.render(&solid(30, 30, [255, 255, 255, 0]), &params(20)).unwrap();
    assert_eq!(grid.drawn_cells(), 0);
    assert!(grid.rows().all(|row| row.trim().is_empty()));
}

#[test]
fn background_is_reported_for_presentation() {
    let pipeline = RenderPipeline::default();
    let background = Rgb::new(12, 34, 56);
    let params = ParameterSet { background_color: background, rotation: 45.0, ..params(40) };
    let grid = pipeline.render(&solid(50, 50, [255, 255, 255, 255]), &params).unwrap();

    assert_eq!(grid.background, background);
    // Rotated 45 degrees, the corners are uncovered.
    assert!(grid.get(0, 0).is_none());
    assert!(grid.get(grid.cols - 1, grid.rows - 1).is_none());
}

#[test]
fn color_mode_samples_source_rgb() {
    let pipeline = RenderPipeline::default();
    let params = ParameterSet { color_mode: true, ..params(16) };
    let grid = pipeline.render(&solid(32, 32, [40, 90, 200, 255]), &params).unwrap();
    let cell = grid.get(8, grid.rows / 2).unwrap();
    assert_eq!(cell.color, CellColor::Rgb(Rgb::new(40, 90, 200)));
}

/// Baseline for invert + tint together: the glyph follows inverted brightness
/// while the tint follows raw brightness.
#[test]
fn invert_with_tint_keeps_diverging_polarities() {
    let pipeline = RenderPipeline::default();
    let params = ParameterSet {
        color_mode: true,
        custom_tint: true,
        invert: true,
        shadow_color: Rgb::new(0, 0, 255),
        highlight_color: Rgb::new(255, 0, 0),
        ..params(16)
    };

    let white = pipeline.render(&solid(32, 32, [255, 255, 255, 255]), &params).unwrap();
    let cell = white.get(8, white.rows / 2).unwrap();
    assert_eq!(cell.glyph, ' ');
    assert_eq!(cell.color, CellColor::Rgb(Rgb::new(255, 0, 0)));

    let black = pipeline.render(&solid(32, 32, [0, 0, 0, 255]), &params).unwrap();
    let cell = black.get(8, black.rows / 2).unwrap();
    assert_eq!(cell.glyph, '@');
    assert_eq!(cell.color, CellColor::Rgb(Rgb::new(0, 0, 255)));
}

#[test]
fn offset_moves_the_image() {
    let pipeline = RenderPipeline::default();
    let image = solid(100, 100, [255, 255, 255, 255]);
    let aspect = AspectRatio::Ratio { width: 1.0, height: 1.0 };
    let shifted = ParameterSet { aspect_ratio: aspect, offset_x: 100.0, ..params(20) };

    let grid = pipeline.render(&image, &shifted).unwrap();
    // Shifted by a full grid width, the image leaves the grid entirely.
    assert_eq!(grid.drawn_cells(), 0);
}

#[test]
fn custom_config_changes_metrics_only() {
    let config = RenderConfig { font_size: 12.0, density_scale: 1.0, ..Default::default() };
    let custom = RenderPipeline::new(config);
    let default = RenderPipeline::default();
    let image = gradient(64, 64);

    let a = custom.render(&image, &params(30)).unwrap();
    let b = default.render(&image, &params(30)).unwrap();
    assert_eq!(a.cells, b.cells);
    assert_eq!(a.metrics.char_height, 12.0);
    assert_eq!(a.metrics.height, a.rows as f32 * 12.0);
}

#[test]
fn degenerate_inputs_fail_without_panicking() {
    let pipeline = RenderPipeline::default();
    let image = solid(10, 10, [255, 255, 255, 255]);

    let zero_scale = ParameterSet { scale: 0.0, ..params(10) };
    assert!(matches!(
        pipeline.render(&image, &zero_scale),
        Err(AsciiError::DegenerateGeometry(_))
    ));

    let huge = ParameterSet {
        aspect_ratio: AspectRatio::Ratio { width: 1.0, height: 100_000.0 },
        ..params(100_000)
    };
    assert!(matches!(pipeline.render(&image, &huge), Err(AsciiError::GridTooLarge { .. })));

    let empty = RgbaImage::new(0, 0);
    assert!(matches!(pipeline.render(&empty, &params(10)), Err(AsciiError::EmptyImage)));
}

mod ascii;
mod color;
mod history;
mod image_pipeline;
mod params;
mod session;

use log::debug;

pub use ascii::{
    gradient::GlyphRamp,
    grid::{Cell, CellColor, RenderGrid, SurfaceMetrics},
    mapping::{brightness, ToneMapper, ALPHA_CUTOFF},
};
pub use color::{ColorError, Rgb};
pub use history::{
    get_changes, Change, Direction, HistoryStep, ParameterHistory, Snapshot, DEFAULT_CAPACITY,
};
pub use image_pipeline::{
    adjust::ToneFilter,
    affine::Affine,
    geometry::{
        compute_grid, compute_placement, GridDimensions, Placement, DEFAULT_GLYPH_ASPECT,
        MAX_GRID_CELLS,
    },
    source::{ImageHandle, SourceImage},
};
pub use params::{AspectRatio, ConfigError, ParamChange, ParamError, ParameterSet};
pub use session::{Notice, RenderOutcome, Session};

use image_pipeline::sampler;

#[derive(Debug, thiserror::Error)]
pub enum AsciiError {
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("source image has no pixels")]
    EmptyImage,
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
    #[error("grid of {cols}x{rows} cells exceeds the render limit")]
    GridTooLarge { cols: u32, rows: u32 },
    #[error("glyph ramp needs at least two characters, got {0}")]
    InvalidRamp(usize),
}

/// Fixed properties of the output surface, independent of user parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderConfig {
    /// Width over height of one glyph cell.
    pub glyph_aspect: f64,
    pub font_size: f32,
    /// Output sharpness multiplier for the presentation surface.
    pub density_scale: f32,
    /// Supersampling taps per axis for each grid pixel.
    pub samples_per_axis: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            glyph_aspect: DEFAULT_GLYPH_ASPECT,
            font_size: 10.0,
            density_scale: 2.0,
            samples_per_axis: 4,
        }
    }
}

/// Turns a source image and a parameter set into a glyph grid.
///
/// Rendering is a pure function of its inputs: the same image and parameters
/// always produce the same grid.
#[derive(Clone, Debug, Default)]
pub struct RenderPipeline {
    config: RenderConfig,
}

impl RenderPipeline {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn grid_dimensions<S: SourceImage + ?Sized>(
        &self,
        source: &S,
        params: &ParameterSet,
    ) -> GridDimensions {
        let (width, height) = source.dimensions();
        compute_grid(params.resolution, params.aspect_ratio, width, height, self.config.glyph_aspect)
    }

    pub fn render<S: SourceImage + ?Sized>(
        &self,
        source: &S,
        params: &ParameterSet,
    ) -> Result<RenderGrid, AsciiError> {
        let (width, height) = source.dimensions();
        if width == 0 || height == 0 {
            return Err(AsciiError::EmptyImage);
        }

        let grid = self.grid_dimensions(source, params);
        let GridDimensions { cols, rows, .. } = grid;
        if u64::from(cols) * u64::from(rows) > MAX_GRID_CELLS {
            return Err(AsciiError::GridTooLarge { cols, rows });
        }

        let placement = compute_placement(
            width,
            height,
            cols,
            rows,
            self.config.glyph_aspect,
            f64::from(params.scale),
            f64::from(params.rotation),
            f64::from(params.offset_x),
            f64::from(params.offset_y),
        )?;

        let filter = ToneFilter::new(params.contrast, params.brightness);
        let pixels = sampler::rasterize(
            source,
            &placement,
            &filter,
            params.background_color,
            cols,
            rows,
            self.config.samples_per_axis,
        );

        let mapper = ToneMapper::new(params);
        let cells = pixels.iter().map(|&[r, g, b, a]| mapper.map(r, g, b, a)).collect();

        let metrics = SurfaceMetrics::new(
            cols,
            rows,
            self.config.font_size,
            self.config.glyph_aspect as f32,
            self.config.density_scale,
        );

        debug!(
            "rendered {}x{} grid from {}x{} source ({}x{} px surface)",
            cols, rows, width, height, metrics.width, metrics.height
        );

        Ok(RenderGrid::new(cols, rows, cells, params.background_color, metrics))
    }
}

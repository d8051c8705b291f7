use crate::color::Rgb;
use crate::params::ParameterSet;

use super::gradient::GlyphRamp;
use super::grid::{Cell, CellColor};

/// Samples with alpha below this are not drawn.
pub const ALPHA_CUTOFF: u8 = 128;

/// Maps sampled RGBA values to glyphs and display colors.
///
/// Brightness is the unweighted channel mean, not perceptual luma.
#[derive(Clone, Debug)]
pub struct ToneMapper {
    ramp: GlyphRamp,
    invert: bool,
    color: ColorResolution,
}

#[derive(Clone, Copy, Debug)]
enum ColorResolution {
    Monochrome,
    Sampled,
    Tint { shadow: Rgb, highlight: Rgb },
}

impl ToneMapper {
    pub fn new(params: &ParameterSet) -> Self {
        let color = match (params.color_mode, params.custom_tint) {
            (false, _) => ColorResolution::Monochrome,
            (true, false) => ColorResolution::Sampled,
            (true, true) => ColorResolution::Tint {
                shadow: params.shadow_color,
                highlight: params.highlight_color,
            },
        };

        Self { ramp: params.glyph_ramp.clone(), invert: params.invert, color }
    }

    /// One-off mapping without keeping a mapper around.
    pub fn map_cell(r: u8, g: u8, b: u8, a: u8, params: &ParameterSet) -> Option<Cell> {
        Self::new(params).map(r, g, b, a)
    }

    pub fn map(&self, r: u8, g: u8, b: u8, a: u8) -> Option<Cell> {
        if a < ALPHA_CUTOFF {
            return None;
        }

        let brightness = brightness(r, g, b);
        let glyph = self.ramp.char_at(self.glyph_index(brightness));

        let color = match self.color {
            ColorResolution::Monochrome => CellColor::Monochrome,
            ColorResolution::Sampled => CellColor::Rgb(Rgb::new(r, g, b)),
            // Tint follows raw brightness even when the glyph polarity is inverted.
            ColorResolution::Tint { shadow, highlight } => {
                CellColor::Rgb(Rgb::lerp(shadow, highlight, (brightness / 255.0) as f32))
            },
        };

        Some(Cell { glyph, color })
    }

    pub fn glyph_index(&self, brightness: f64) -> usize {
        let levels = self.ramp.max_index() as f64;
        let level = if self.invert { 255.0 - brightness } else { brightness };
        let index = ((level / 255.0) * levels).floor();
        index.clamp(0.0, levels) as usize
    }
}

pub fn brightness(r: u8, g: u8, b: u8) -> f64 {
    (f64::from(r) + f64::from(g) + f64::from(b)) / 3.0
}

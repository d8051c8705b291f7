use std::f64::consts::PI;

use crate::params::AspectRatio;
use crate::AsciiError;

use super::affine::Affine;

/// Width over height of one rendered glyph cell.
pub const DEFAULT_GLYPH_ASPECT: f64 = 0.6;

/// Upper bound on cells per grid; beyond this a render is rejected.
pub const MAX_GRID_CELLS: u64 = 16 * 1024 * 1024;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridDimensions {
    pub cols: u32,
    pub rows: u32,
    /// Visual width over height the grid is sized for.
    pub target_ratio: f64,
}

impl GridDimensions {
    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

/// Size the glyph grid for `requested_cols` columns.
///
/// Rows are stretched by `glyph_aspect` because glyph cells are taller than
/// wide. Both sides are at least 1.
pub fn compute_grid(
    requested_cols: u32,
    aspect: AspectRatio,
    source_width: u32,
    source_height: u32,
    glyph_aspect: f64,
) -> GridDimensions {
    let cols = requested_cols.max(1);
    let source_ratio = f64::from(source_width) / f64::from(source_height);

    let target_ratio = match aspect.ratio() {
        Some(ratio) if ratio.is_finite() && ratio > 0.0 => ratio,
        _ if source_ratio.is_finite() && source_ratio > 0.0 => source_ratio,
        _ => 1.0,
    };

    let rows = (f64::from(cols) / target_ratio * glyph_aspect).floor();
    let rows = if rows.is_finite() { rows.clamp(1.0, f64::from(u32::MAX)) as u32 } else { 1 };

    GridDimensions { cols, rows, target_ratio }
}

/// Where the source image lands inside the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Size of the drawn image rectangle before scale and rotation.
    pub draw_width: f64,
    pub draw_height: f64,
    /// Maps image-rectangle space (origin at the rectangle center) to grid space.
    pub transform: Affine,
    inverse: Affine,
}

impl Placement {
    pub fn inverse(&self) -> Affine {
        self.inverse
    }

    /// Source pixel coordinates under the grid point `(gx, gy)`, if the image covers it.
    pub fn source_point(
        &self,
        gx: f64,
        gy: f64,
        source_width: u32,
        source_height: u32,
    ) -> Option<(f64, f64)> {
        let (lx, ly) = self.inverse.apply(gx, gy);
        let half_w = self.draw_width / 2.0;
        let half_h = self.draw_height / 2.0;

        if lx < -half_w || lx >= half_w || ly < -half_h || ly >= half_h {
            return None;
        }

        let u = (lx + half_w) / self.draw_width * f64::from(source_width);
        let v = (ly + half_h) / self.draw_height * f64::from(source_height);
        Some((u, v))
    }
}

/// Fit the source into the grid ("contain") and compose the user transform.
///
/// The transform is built about the grid center in this order: offset in
/// un-rotated grid space, then rotation, then uniform scale.
#[allow(clippy::too_many_arguments)]
pub fn compute_placement(
    source_width: u32,
    source_height: u32,
    cols: u32,
    rows: u32,
    glyph_aspect: f64,
    scale: f64,
    rotation_degrees: f64,
    offset_x_percent: f64,
    offset_y_percent: f64,
) -> Result<Placement, AsciiError> {
    if source_width == 0 || source_height == 0 {
        return Err(AsciiError::EmptyImage);
    }

    let cols_f = f64::from(cols.max(1));
    let rows_f = f64::from(rows.max(1));

    let image_ratio = f64::from(source_width) / f64::from(source_height);
    // The intermediate buffer has square pixels but is shown through
    // non-square glyphs, so the drawn rectangle is pre-stretched.
    let grid_image_ratio = image_ratio / glyph_aspect;
    if !grid_image_ratio.is_finite() || grid_image_ratio <= 0.0 {
        return Err(AsciiError::DegenerateGeometry("glyph aspect must be positive"));
    }

    let (draw_width, draw_height) = if grid_image_ratio > cols_f / rows_f {
        (cols_f, cols_f / grid_image_ratio)
    } else {
        (rows_f * grid_image_ratio, rows_f)
    };

    let transform = Affine::IDENTITY
        .translate(cols_f / 2.0, rows_f / 2.0)
        .translate(offset_x_percent * cols_f / 100.0, offset_y_percent * rows_f / 100.0)
        .rotate(rotation_degrees * PI / 180.0)
        .scale(scale, scale);

    let inverse = transform
        .invert()
        .ok_or(AsciiError::DegenerateGeometry("placement transform is not invertible"))?;

    Ok(Placement { draw_width, draw_height, transform, inverse })
}

use crate::color::Rgb;

/// Foreground color of a drawn glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CellColor {
    /// The presentation layer's default foreground (white).
    Monochrome,
    Rgb(Rgb),
}

impl CellColor {
    pub fn resolve(self) -> Rgb {
        match self {
            CellColor::Monochrome => Rgb::WHITE,
            CellColor::Rgb(rgb) => rgb,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    pub glyph: char,
    pub color: CellColor,
}

/// Pixel dimensions the presentation layer needs to size its drawing surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMetrics {
    pub font_size: f32,
    pub char_width: f32,
    pub char_height: f32,
    /// Output sharpness multiplier applied on top of the glyph cell size.
    pub density_scale: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceMetrics {
    pub fn new(cols: u32, rows: u32, font_size: f32, glyph_aspect: f32, density_scale: f32) -> Self {
        let char_width = font_size * glyph_aspect;
        let char_height = font_size;
        Self {
            font_size,
            char_width,
            char_height,
            density_scale,
            width: cols as f32 * char_width * density_scale,
            height: rows as f32 * char_height * density_scale,
        }
    }
}

/// Row-major matrix of glyph cells. `None` marks a position the presentation
/// layer must skip so the background fill shows through.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderGrid {
    pub cols: u32,
    pub rows: u32,
    pub cells: Vec<Option<Cell>>,
    pub background: Rgb,
    pub metrics: SurfaceMetrics,
}

impl RenderGrid {
    pub fn new(
        cols: u32,
        rows: u32,
        cells: Vec<Option<Cell>>,
        background: Rgb,
        metrics: SurfaceMetrics,
    ) -> Self {
        assert_eq!(cols as usize * rows as usize, cells.len());
        Self { cols, rows, cells, background, metrics }
    }

    pub fn get(&self, x: u32, y: u32) -> Option<&Cell> {
        if x >= self.cols || y >= self.rows {
            return None;
        }
        self.cells[(y * self.cols + x) as usize].as_ref()
    }

    pub fn row_cells(&self) -> impl Iterator<Item = &[Option<Cell>]> + '_ {
        self.cells.chunks(self.cols as usize)
    }

    /// Plain text rows; skipped cells become spaces.
    pub fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.row_cells()
            .map(|row| row.iter().map(|cell| cell.map_or(' ', |cell| cell.glyph)).collect())
    }

    pub fn drawn_cells(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

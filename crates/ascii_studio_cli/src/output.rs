use std::io::{self, Write};

use ascii_studio::{Cell, RenderGrid, Rgb};
use clap::ValueEnum;

const ANSI_RESET: &str = "\x1b[0m";

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain glyphs, skipped cells as spaces
    #[default]
    Text,
    /// 24-bit ANSI escapes with background fill and per-cell foreground
    Ansi,
}

pub fn write_grid<W: Write>(out: &mut W, grid: &RenderGrid, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => {
            for row in grid.rows() {
                writeln!(out, "{}", row.trim_end())?;
            }
        },
        OutputFormat::Ansi => {
            for row in grid.row_cells() {
                writeln!(out, "{}", ansi_row(row, grid.background))?;
            }
        },
    }

    Ok(())
}

/// One row of truecolor output. Foreground escapes are only emitted when the
/// color actually changes.
fn ansi_row(cells: &[Option<Cell>], background: Rgb) -> String {
    let mut line = format!("\x1b[48;2;{};{};{}m", background.r, background.g, background.b);
    let mut current: Option<Rgb> = None;

    for cell in cells {
        match cell {
            Some(cell) => {
                let color = cell.color.resolve();
                if current != Some(color) {
                    line.push_str(&format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b));
                    current = Some(color);
                }
                line.push(cell.glyph);
            },
            None => line.push(' '),
        }
    }

    line.push_str(ANSI_RESET);
    line
}

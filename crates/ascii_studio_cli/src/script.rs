//! Replay of edit scripts against a [`Session`].
//!
//! One command per line, `#` starts a comment:
//!
//! ```text
//! image photo.png
//! set resolution=80
//! set contrast=1.4
//! commit
//! undo
//! show
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use ascii_studio::{ImageHandle, ParamChange, ParameterSet, Session};
use log::{debug, warn};

use crate::output::{write_grid, OutputFormat};

#[derive(Clone, Debug, PartialEq)]
pub enum ScriptCommand {
    /// Live edit, not recorded until the next commit.
    Set(ParamChange),
    Commit,
    Undo,
    Redo,
    Reset,
    Show,
    /// Load an image and commit it.
    Image(PathBuf),
    /// Replace all parameters from a preset file and commit.
    Preset(PathBuf),
}

/// Parse one script line. Blank lines and comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>> {
    let line = line.trim_start();
    if line.trim_end().is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let command = match word.to_ascii_lowercase().as_str() {
        "set" => ScriptCommand::Set(rest.parse()?),
        "commit" => ScriptCommand::Commit,
        "undo" => ScriptCommand::Undo,
        "redo" => ScriptCommand::Redo,
        "reset" => ScriptCommand::Reset,
        "show" => ScriptCommand::Show,
        "image" | "preset" if rest.trim().is_empty() => bail!("'{word}' needs a path"),
        "image" => ScriptCommand::Image(PathBuf::from(rest.trim())),
        "preset" => ScriptCommand::Preset(PathBuf::from(rest.trim())),
        other => bail!("unknown command '{other}'"),
    };

    Ok(Some(command))
}

/// Runs script commands, writing notices and grids to `out`.
pub struct Replay<'a, W> {
    session: &'a mut Session,
    out: W,
    format: OutputFormat,
    base_dir: PathBuf,
    skipped: usize,
}

impl<'a, W: Write> Replay<'a, W> {
    /// Relative paths in the script resolve against `base_dir`.
    pub fn new(session: &'a mut Session, out: W, format: OutputFormat, base_dir: &Path) -> Self {
        Self { session, out, format, base_dir: base_dir.to_path_buf(), skipped: 0 }
    }

    /// Lines that failed to parse and were ignored.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn run(&mut self, script: &str) -> Result<()> {
        for (index, line) in script.lines().enumerate() {
            let number = index + 1;
            match parse_line(line) {
                Ok(Some(command)) => {
                    self.execute(command).with_context(|| format!("script line {number}"))?
                },
                Ok(None) => (),
                Err(err) => {
                    warn!("ignoring script line {number}: {err}");
                    self.skipped += 1;
                },
            }
        }

        Ok(())
    }

    pub fn execute(&mut self, command: ScriptCommand) -> Result<()> {
        debug!("script command {command:?}");

        match command {
            ScriptCommand::Set(change) => {
                self.session.apply_live_change(change);
            },
            ScriptCommand::Commit => self.session.commit_change(),
            ScriptCommand::Undo => match self.session.undo() {
                Some(notice) => writeln!(self.out, "{notice}")?,
                None => writeln!(self.out, "Nothing to undo")?,
            },
            ScriptCommand::Redo => match self.session.redo() {
                Some(notice) => writeln!(self.out, "{notice}")?,
                None => writeln!(self.out, "Nothing to redo")?,
            },
            ScriptCommand::Reset => {
                let notice = self.session.reset();
                writeln!(self.out, "{notice}")?;
            },
            ScriptCommand::Show => match self.session.grid() {
                Some(grid) => write_grid(&mut self.out, grid, self.format)?,
                None => writeln!(self.out, "No image loaded")?,
            },
            ScriptCommand::Image(path) => {
                let path = self.resolve(&path);
                let image = ImageHandle::open(&path)
                    .with_context(|| format!("failed to open image {}", path.display()))?;
                self.session.set_image(image);
                self.session.commit_change();
            },
            ScriptCommand::Preset(path) => {
                let params = ParameterSet::load(&self.resolve(&path))?;
                self.session.replace_params(params);
                self.session.commit_change();
            },
        }

        Ok(())
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

#[cfg(test)]
mod tests {
    use ascii_studio::{Rgb, RenderPipeline};
    use image::{Rgba, RgbaImage};

    use super::*;

    fn session_with_image() -> Session {
        with_image(8, 8)
    }

    fn with_image(width: u32, height: u32) -> Session {
        let mut session = Session::new(RenderPipeline::default());
        let pixels = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        session.set_image(ImageHandle::new(pixels).unwrap());
        session.commit_change();
        session
    }

    fn replay(session: &mut Session, script: &str) -> (String, usize) {
        let mut out = Vec::new();
        let mut replay = Replay::new(session, &mut out, OutputFormat::Text, Path::new("."));
        replay.run(script).unwrap();
        let skipped = replay.skipped();
        (String::from_utf8(out).unwrap(), skipped)
    }

    #[test]
    fn parses_commands_and_skips_comments() {
        assert_eq!(parse_line("  # note").unwrap(), None);
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("UNDO").unwrap(), Some(ScriptCommand::Undo));
        assert_eq!(
            parse_line("set background-color=#010203").unwrap(),
            Some(ScriptCommand::Set(ParamChange::BackgroundColor(Rgb::new(1, 2, 3))))
        );
        assert_eq!(
            parse_line("image shots/a.png").unwrap(),
            Some(ScriptCommand::Image(PathBuf::from("shots/a.png")))
        );
        assert!(parse_line("image").is_err());
        assert!(parse_line("zoom 3").is_err());
        assert!(parse_line("set resolution").is_err());
    }

    #[test]
    fn undo_and_redo_print_notices() {
        let mut session = session_with_image();
        let script = "set resolution=4\nset invert=on\ncommit\nundo\nredo\nredo\n";
        let (out, skipped) = replay(&mut session, script);

        assert_eq!(out, "Undo: Resolution, Invert\nRedo: Resolution, Invert\nNothing to redo\n");
        assert_eq!(skipped, 0);
        assert_eq!(session.params().resolution, 4);
    }

    #[test]
    fn invalid_lines_are_skipped() {
        let mut session = session_with_image();
        let (out, skipped) = replay(&mut session, "set resolution=abc\nset scale=2\nreset\nundo\n");

        assert_eq!(out, "Reset\nNothing to undo\n");
        assert_eq!(skipped, 1);
        assert!(session.image().is_none());
    }

    #[test]
    fn show_writes_the_current_grid() {
        // An 18x10 source over 0.6 wide glyphs fills a 3x1 grid exactly.
        let mut session = with_image(18, 10);
        let (out, _) = replay(&mut session, "set resolution=3\nshow\n");
        assert_eq!(out, "@@@\n");
    }

    #[test]
    fn show_without_image_reports_it() {
        let mut session = Session::default();
        let (out, _) = replay(&mut session, "show\n");
        assert_eq!(out, "No image loaded\n");
    }

    #[test]
    fn missing_image_aborts_with_line_number() {
        let mut session = Session::default();
        let mut out = Vec::new();
        let mut replay = Replay::new(&mut session, &mut out, OutputFormat::Text, Path::new("."));
        let err = replay.run("\nimage does-not-exist.png\n").unwrap_err();
        assert_eq!(err.to_string(), "script line 2");
    }
}

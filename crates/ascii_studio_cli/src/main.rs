use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ascii_studio::{
    AspectRatio, GlyphRamp, ImageHandle, ParamChange, ParameterSet, RenderConfig, RenderPipeline,
    Rgb, Session,
};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use walkdir::WalkDir;

mod logging;
mod output;
mod script;

use output::{write_grid, OutputFormat};
use script::Replay;

/// Extensions picked up by `batch`.
const IMAGE_EXTENSIONS: &[&str] =
    &["png", "jpg", "jpeg", "gif", "bmp", "ico", "pnm", "ppm", "pgm", "tif", "tiff", "webp"];

#[derive(Parser, Debug)]
#[command(author, version, about = "Render images as ASCII glyph grids")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render to stdout, in truecolor unless --plain is given
    Preview(PreviewArgs),
    /// Render an image and write the result to disk
    Convert(ConvertArgs),
    /// Render every image below a directory
    Batch(BatchArgs),
    /// Replay an edit script with undo and redo against one session
    Session(SessionArgs),
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input image path
    input: PathBuf,
    /// Print glyphs only, without ANSI colors
    #[arg(long)]
    plain: bool,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct ConvertArgs {
    /// Input image path
    input: PathBuf,
    /// Output file path
    #[arg(short, long)]
    output: PathBuf,
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory searched recursively for images
    input: PathBuf,
    /// Output directory for rendered files
    #[arg(short, long)]
    out_dir: PathBuf,
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug)]
struct SessionArgs {
    /// Script with one command per line (set, commit, undo, redo, reset, show, image, preset)
    script: PathBuf,
    /// Image loaded and committed before the script runs
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
    #[command(flatten)]
    settings: RenderSettings,
}

#[derive(Parser, Debug, Clone)]
struct RenderSettings {
    /// TOML preset providing the starting parameters
    #[arg(long)]
    preset: Option<PathBuf>,
    /// Number of glyph columns
    #[arg(long)]
    resolution: Option<u32>,
    /// Contrast gain, 1.0 is neutral
    #[arg(long)]
    contrast: Option<f32>,
    /// Brightness gain, 1.0 is neutral
    #[arg(long)]
    brightness: Option<f32>,
    /// Color glyphs from the source image
    #[arg(long)]
    color: bool,
    /// Color glyphs with a shadow to highlight blend (implies --color)
    #[arg(long)]
    tint: bool,
    #[arg(long, value_name = "HEX")]
    highlight: Option<Rgb>,
    #[arg(long, value_name = "HEX")]
    shadow: Option<Rgb>,
    #[arg(long, value_name = "HEX")]
    background: Option<Rgb>,
    /// Swap sparse and dense glyphs
    #[arg(long)]
    invert: bool,
    /// Grid aspect ratio, `source` or `W:H`
    #[arg(long, value_name = "RATIO")]
    aspect: Option<AspectRatio>,
    #[arg(long)]
    scale: Option<f32>,
    /// Clockwise rotation in degrees
    #[arg(long, allow_hyphen_values = true)]
    rotation: Option<f32>,
    /// Horizontal offset in percent of the grid width
    #[arg(long, allow_hyphen_values = true)]
    offset_x: Option<f32>,
    /// Vertical offset in percent of the grid height
    #[arg(long, allow_hyphen_values = true)]
    offset_y: Option<f32>,
    /// Built-in glyph ramp
    #[arg(long, value_enum)]
    ramp: Option<RampPreset>,
    /// Any parameter as FIELD=VALUE, applied last
    #[arg(long = "set", value_name = "FIELD=VALUE")]
    overrides: Vec<ParamChange>,
    /// Glyph cell width over height
    #[arg(long, default_value_t = ascii_studio::DEFAULT_GLYPH_ASPECT)]
    glyph_aspect: f64,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RampPreset {
    Standard,
    Detailed,
    Blocks,
    Minimal,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.verbose).context("failed to install logger")?;

    match cli.command {
        Commands::Preview(args) => preview(args),
        Commands::Convert(args) => convert(args),
        Commands::Batch(args) => batch(args),
        Commands::Session(args) => session(args),
    }
}

fn preview(args: PreviewArgs) -> Result<()> {
    let params = args.settings.params()?;
    let image = open_image(&args.input)?;
    let grid = args
        .settings
        .pipeline()
        .render(&image, &params)
        .with_context(|| format!("failed to render {}", args.input.display()))?;

    let format = if args.plain { OutputFormat::Text } else { OutputFormat::Ansi };
    let mut stdout = io::stdout().lock();
    write_grid(&mut stdout, &grid, format)?;
    Ok(())
}

fn convert(args: ConvertArgs) -> Result<()> {
    let params = args.settings.params()?;
    let pipeline = args.settings.pipeline();
    render_to_file(&pipeline, &params, &args.input, &args.output, args.format)?;
    info!("wrote {}", args.output.display());
    Ok(())
}

fn batch(args: BatchArgs) -> Result<()> {
    let params = args.settings.params()?;
    let pipeline = args.settings.pipeline();
    fs::create_dir_all(&args.out_dir).with_context(|| {
        format!("failed to create output directory {}", args.out_dir.display())
    })?;

    let inputs = collect_images(&args.input);
    if inputs.is_empty() {
        anyhow::bail!("no image files found in {}", args.input.display());
    }

    let progress = ProgressBar::new(inputs.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{spinner} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} images",
        )?
        .progress_chars("=> "),
    );

    let extension = match args.format {
        OutputFormat::Text => "txt",
        OutputFormat::Ansi => "ans",
    };

    let mut failed = 0;
    for input in &inputs {
        let relative = input.strip_prefix(&args.input).unwrap_or(input);
        let output = args.out_dir.join(relative).with_extension(extension);
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        if let Err(err) = render_to_file(&pipeline, &params, input, &output, args.format) {
            progress.suspend(|| warn!("skipping {}: {err:#}", input.display()));
            failed += 1;
        }
        progress.inc(1);
    }

    progress.finish_with_message(format!(
        "{} of {} images written to {}",
        inputs.len() - failed,
        inputs.len(),
        args.out_dir.display()
    ));
    Ok(())
}

fn session(args: SessionArgs) -> Result<()> {
    let params = args.settings.params()?;
    let mut session = Session::with_params(params, args.settings.pipeline());

    if let Some(path) = &args.image {
        session.set_image(open_image(path)?);
        session.commit_change();
    }

    let script = fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let base_dir = args.script.parent().unwrap_or_else(|| Path::new("."));

    let stdout = io::stdout().lock();
    let mut replay = Replay::new(&mut session, stdout, args.format, base_dir);
    replay.run(&script).with_context(|| format!("failed to run {}", args.script.display()))?;

    if replay.skipped() > 0 {
        warn!("{} script lines were ignored", replay.skipped());
    }
    Ok(())
}

fn open_image(path: &Path) -> Result<ImageHandle> {
    ImageHandle::open(path).with_context(|| format!("failed to open image {}", path.display()))
}

fn render_to_file(
    pipeline: &RenderPipeline,
    params: &ParameterSet,
    input: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<()> {
    let image = open_image(input)?;
    let grid = pipeline
        .render(&image, params)
        .with_context(|| format!("failed to render {}", input.display()))?;

    let file =
        File::create(output).with_context(|| format!("failed to create {}", output.display()))?;
    let mut writer = BufWriter::new(file);
    write_grid(&mut writer, &grid, format)?;
    writer.flush()?;
    Ok(())
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut entries: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| is_image(path))
        .collect();
    entries.sort();
    entries
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

impl RenderSettings {
    /// Preset first, then individual flags, then `--set` overrides.
    fn params(&self) -> Result<ParameterSet> {
        let mut params = match &self.preset {
            Some(path) => ParameterSet::load(path)?,
            None => ParameterSet::default(),
        };

        let flags = [
            self.resolution.map(ParamChange::Resolution),
            self.contrast.map(ParamChange::Contrast),
            self.brightness.map(ParamChange::Brightness),
            (self.color || self.tint).then_some(ParamChange::ColorMode(true)),
            self.tint.then_some(ParamChange::CustomTint(true)),
            self.highlight.map(ParamChange::HighlightColor),
            self.shadow.map(ParamChange::ShadowColor),
            self.background.map(ParamChange::BackgroundColor),
            self.invert.then_some(ParamChange::Invert(true)),
            self.aspect.map(ParamChange::AspectRatio),
            self.scale.map(ParamChange::Scale),
            self.rotation.map(ParamChange::Rotation),
            self.offset_x.map(ParamChange::OffsetX),
            self.offset_y.map(ParamChange::OffsetY),
            self.ramp.map(|ramp| ParamChange::GlyphRamp(ramp.to_ramp())),
        ];

        for change in flags.into_iter().flatten().chain(self.overrides.iter().cloned()) {
            params.apply(change);
        }

        Ok(params)
    }

    fn pipeline(&self) -> RenderPipeline {
        RenderPipeline::new(RenderConfig { glyph_aspect: self.glyph_aspect, ..Default::default() })
    }
}

impl RampPreset {
    fn to_ramp(self) -> GlyphRamp {
        match self {
            RampPreset::Standard => GlyphRamp::standard(),
            RampPreset::Detailed => GlyphRamp::detailed(),
            RampPreset::Blocks => GlyphRamp::blocks(),
            RampPreset::Minimal => GlyphRamp::minimal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(args: &[&str]) -> RenderSettings {
        #[derive(Parser)]
        struct Harness {
            #[command(flatten)]
            settings: RenderSettings,
        }

        let argv = std::iter::once("ascii-studio").chain(args.iter().copied());
        Harness::parse_from(argv).settings
    }

    #[test]
    fn flags_override_defaults() {
        let args = ["--resolution", "64", "--tint", "--rotation", "-15"];
        let params = settings(&args).params().unwrap();
        assert_eq!(params.resolution, 64);
        assert!(params.color_mode);
        assert!(params.custom_tint);
        assert_eq!(params.rotation, -15.0);
    }

    #[test]
    fn set_overrides_apply_last() {
        let args = ["--resolution", "64", "--set", "resolution=32", "--set", "glyph-ramp= .#"];
        let params = settings(&args).params().unwrap();
        assert_eq!(params.resolution, 32);
        assert_eq!(params.glyph_ramp.to_string(), " .#");
    }

    #[test]
    fn typed_flags_parse_colors_and_ratios() {
        let args = ["--background", "#0f0", "--aspect", "4:3", "--ramp", "blocks"];
        let params = settings(&args).params().unwrap();
        assert_eq!(params.background_color, Rgb::new(0, 255, 0));
        assert_eq!(params.aspect_ratio, AspectRatio::Ratio { width: 4.0, height: 3.0 });
        assert_eq!(params.glyph_ramp, GlyphRamp::blocks());
    }

    #[test]
    fn batch_only_picks_images() {
        assert!(is_image(Path::new("a/b/photo.JPG")));
        assert!(!is_image(Path::new("notes.txt")));
        assert!(!is_image(Path::new("no_extension")));
    }
}

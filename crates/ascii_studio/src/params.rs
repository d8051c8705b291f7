//! The user-editable parameter set and typed edits against it.
//!
//! A [`ParameterSet`] can also be loaded from a TOML preset where every key is
//! optional:
//!
//! ```toml
//! resolution = 160
//! color-mode = true
//! aspect-ratio = "16:9"
//! glyph-ramp = " .:#"
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ascii::gradient::GlyphRamp;
use crate::color::{ColorError, Rgb};
use crate::AsciiError;

/// Target ratio of the glyph grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AspectRatio {
    /// Follow the source image.
    #[default]
    Source,
    Ratio { width: f64, height: f64 },
}

impl AspectRatio {
    /// Width over height, or `None` when following the source image.
    pub fn ratio(self) -> Option<f64> {
        match self {
            AspectRatio::Source => None,
            AspectRatio::Ratio { width, height } => Some(width / height),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("source") || s.eq_ignore_ascii_case("auto") {
            return Ok(AspectRatio::Source);
        }

        let invalid = || ParamError::InvalidAspect(s.to_string());
        let (width, height) = s.split_once(':').ok_or_else(invalid)?;
        let width: f64 = width.trim().parse().map_err(|_| invalid())?;
        let height: f64 = height.trim().parse().map_err(|_| invalid())?;

        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(invalid());
        }

        Ok(AspectRatio::Ratio { width, height })
    }
}

impl TryFrom<String> for AspectRatio {
    type Error = ParamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AspectRatio> for String {
    fn from(value: AspectRatio) -> Self {
        value.to_string()
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AspectRatio::Source => f.write_str("source"),
            AspectRatio::Ratio { width, height } => write!(f, "{width}:{height}"),
        }
    }
}

/// Every value that shapes a render.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct ParameterSet {
    /// Number of glyph columns.
    pub resolution: u32,
    /// Multiplicative contrast gain, 1.0 is neutral.
    pub contrast: f32,
    /// Multiplicative brightness gain, 1.0 is neutral.
    pub brightness: f32,
    pub color_mode: bool,
    /// Blend shadow and highlight colors by brightness instead of using sampled color.
    pub custom_tint: bool,
    pub highlight_color: Rgb,
    pub shadow_color: Rgb,
    pub background_color: Rgb,
    pub invert: bool,
    pub aspect_ratio: AspectRatio,
    pub scale: f32,
    /// Clockwise rotation in degrees.
    pub rotation: f32,
    /// Horizontal translation as a percentage of the grid width.
    pub offset_x: f32,
    /// Vertical translation as a percentage of the grid height.
    pub offset_y: f32,
    pub glyph_ramp: GlyphRamp,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            resolution: 128,
            contrast: 1.0,
            brightness: 1.0,
            color_mode: false,
            custom_tint: false,
            highlight_color: Rgb::WHITE,
            shadow_color: Rgb::BLACK,
            background_color: Rgb::BLACK,
            invert: false,
            aspect_ratio: AspectRatio::Source,
            scale: 1.0,
            rotation: 0.0,
            offset_x: 0.0,
            offset_y: 0.0,
            glyph_ramp: GlyphRamp::default(),
        }
    }
}

impl ParameterSet {
    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load a preset file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    pub fn apply(&mut self, change: ParamChange) {
        match change {
            ParamChange::Resolution(cols) => self.resolution = cols.max(1),
            ParamChange::Contrast(value) => self.contrast = value,
            ParamChange::Brightness(value) => self.brightness = value,
            ParamChange::ColorMode(on) => self.color_mode = on,
            ParamChange::CustomTint(on) => self.custom_tint = on,
            ParamChange::HighlightColor(color) => self.highlight_color = color,
            ParamChange::ShadowColor(color) => self.shadow_color = color,
            ParamChange::BackgroundColor(color) => self.background_color = color,
            ParamChange::Invert(on) => self.invert = on,
            ParamChange::AspectRatio(aspect) => self.aspect_ratio = aspect,
            ParamChange::Scale(value) => self.scale = value,
            ParamChange::Rotation(degrees) => self.rotation = degrees,
            ParamChange::OffsetX(percent) => self.offset_x = percent,
            ParamChange::OffsetY(percent) => self.offset_y = percent,
            ParamChange::GlyphRamp(ramp) => self.glyph_ramp = ramp,
        }
    }
}

/// A single field edit coming from the UI binding layer.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamChange {
    Resolution(u32),
    Contrast(f32),
    Brightness(f32),
    ColorMode(bool),
    CustomTint(bool),
    HighlightColor(Rgb),
    ShadowColor(Rgb),
    BackgroundColor(Rgb),
    Invert(bool),
    AspectRatio(AspectRatio),
    Scale(f32),
    Rotation(f32),
    OffsetX(f32),
    OffsetY(f32),
    GlyphRamp(GlyphRamp),
}

impl ParamChange {
    /// Build an edit from a field name and its textual value.
    pub fn parse(field: &str, value: &str) -> Result<Self, ParamError> {
        let field = field.trim().to_ascii_lowercase().replace('_', "-");
        let trimmed = value.trim();

        let change = match field.as_str() {
            "resolution" => ParamChange::Resolution(parse_number(&field, trimmed)?),
            "contrast" => ParamChange::Contrast(parse_float(&field, trimmed)?),
            "brightness" => ParamChange::Brightness(parse_float(&field, trimmed)?),
            "color-mode" => ParamChange::ColorMode(parse_bool(&field, trimmed)?),
            "custom-tint" => ParamChange::CustomTint(parse_bool(&field, trimmed)?),
            "highlight-color" => ParamChange::HighlightColor(parse_color(&field, trimmed)?),
            "shadow-color" => ParamChange::ShadowColor(parse_color(&field, trimmed)?),
            "background-color" => ParamChange::BackgroundColor(parse_color(&field, trimmed)?),
            "invert" => ParamChange::Invert(parse_bool(&field, trimmed)?),
            "aspect-ratio" => ParamChange::AspectRatio(trimmed.parse()?),
            "scale" => ParamChange::Scale(parse_float(&field, trimmed)?),
            "rotation" => ParamChange::Rotation(parse_float(&field, trimmed)?),
            "offset-x" => ParamChange::OffsetX(parse_float(&field, trimmed)?),
            "offset-y" => ParamChange::OffsetY(parse_float(&field, trimmed)?),
            // Leading and trailing spaces are meaningful glyphs here.
            "glyph-ramp" => ParamChange::GlyphRamp(GlyphRamp::new(value)?),
            _ => return Err(ParamError::UnknownField(field)),
        };

        Ok(change)
    }
}

impl FromStr for ParamChange {
    type Err = ParamError;

    /// Parse `field=value`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, value) =
            s.split_once('=').ok_or_else(|| ParamError::MissingValue(s.trim().to_string()))?;
        Self::parse(field, value)
    }
}

fn parse_number(field: &str, value: &str) -> Result<u32, ParamError> {
    value.parse().map_err(|_| invalid_value(field, value))
}

fn parse_float(field: &str, value: &str) -> Result<f32, ParamError> {
    let parsed: f32 = value.parse().map_err(|_| invalid_value(field, value))?;
    if !parsed.is_finite() {
        return Err(invalid_value(field, value));
    }
    Ok(parsed)
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ParamError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid_value(field, value)),
    }
}

fn parse_color(field: &str, value: &str) -> Result<Rgb, ParamError> {
    Rgb::from_hex(value).map_err(|source| ParamError::Color { field: field.to_string(), source })
}

fn invalid_value(field: &str, value: &str) -> ParamError {
    ParamError::InvalidValue { field: field.to_string(), value: value.to_string() }
}

#[derive(Debug, thiserror::Error)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    UnknownField(String),
    #[error("expected field=value, got '{0}'")]
    MissingValue(String),
    #[error("invalid value '{value}' for {field}")]
    InvalidValue { field: String, value: String },
    #[error("invalid aspect ratio '{0}', expected 'source' or 'W:H'")]
    InvalidAspect(String),
    #[error("invalid color for {field}: {source}")]
    Color { field: String, source: ColorError },
    #[error(transparent)]
    Ramp(#[from] AsciiError),
}

/// Errors that can occur when loading a preset.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read preset '{}': {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse preset '{}': {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn aspect_ratio_parses_source_and_ratios() {
        assert_eq!("source".parse::<AspectRatio>().unwrap(), AspectRatio::Source);
        assert_eq!("auto".parse::<AspectRatio>().unwrap(), AspectRatio::Source);
        assert_eq!(
            "16:9".parse::<AspectRatio>().unwrap(),
            AspectRatio::Ratio { width: 16.0, height: 9.0 }
        );
        assert!("0:9".parse::<AspectRatio>().is_err());
        assert!("16x9".parse::<AspectRatio>().is_err());
        assert_eq!(AspectRatio::Ratio { width: 4.0, height: 3.0 }.to_string(), "4:3");
    }

    #[test]
    fn preset_keys_are_optional() {
        let params = ParameterSet::from_toml_str(
            r##"
            resolution = 64
            color-mode = true
            highlight-color = "#ff0000"
            aspect-ratio = "1:1"
            glyph-ramp = " .#"
            "##,
        )
        .unwrap();

        assert_eq!(params.resolution, 64);
        assert!(params.color_mode);
        assert_eq!(params.highlight_color, Rgb::new(255, 0, 0));
        assert_eq!(params.aspect_ratio, AspectRatio::Ratio { width: 1.0, height: 1.0 });
        assert_eq!(params.glyph_ramp.to_string(), " .#");
        assert_eq!(params.contrast, 1.0);
        assert_eq!(params.background_color, Rgb::BLACK);
    }

    #[test]
    fn preset_rejects_unknown_keys_and_bad_ramps() {
        assert!(ParameterSet::from_toml_str("zoom = 2.0").is_err());
        assert!(ParameterSet::from_toml_str("glyph-ramp = \"x\"").is_err());
    }

    #[test]
    fn preset_round_trips_through_toml() {
        let params = ParameterSet { rotation: 45.0, invert: true, ..Default::default() };
        let text = params.to_toml_string().unwrap();
        assert_eq!(ParameterSet::from_toml_str(&text).unwrap(), params);
    }

    #[test]
    fn changes_parse_from_field_value_pairs() {
        assert_eq!("resolution=80".parse::<ParamChange>().unwrap(), ParamChange::Resolution(80));
        assert_eq!("color_mode=on".parse::<ParamChange>().unwrap(), ParamChange::ColorMode(true));
        assert_eq!(
            "shadow-color=#102030".parse::<ParamChange>().unwrap(),
            ParamChange::ShadowColor(Rgb::new(16, 32, 48))
        );
        assert_eq!(
            "glyph-ramp= .o0".parse::<ParamChange>().unwrap(),
            ParamChange::GlyphRamp(GlyphRamp::new(" .o0").unwrap())
        );
        assert!(matches!("zoom=2".parse::<ParamChange>(), Err(ParamError::UnknownField(_))));
        assert!(matches!("scale".parse::<ParamChange>(), Err(ParamError::MissingValue(_))));
        assert!(matches!("scale=NaN".parse::<ParamChange>(), Err(ParamError::InvalidValue { .. })));
    }

    #[test]
    fn resolution_is_clamped_on_apply() {
        let mut params = ParameterSet::default();
        params.apply(ParamChange::Resolution(0));
        assert_eq!(params.resolution, 1);
        params.apply(ParamChange::OffsetX(25.0));
        assert_eq!(params.offset_x, 25.0);
    }
}

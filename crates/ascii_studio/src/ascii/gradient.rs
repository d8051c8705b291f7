use std::fmt;

use serde::{Deserialize, Serialize};

use crate::AsciiError;

/// Glyph lookup table ordered from visually sparsest to densest.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GlyphRamp {
    chars: Vec<char>,
}

impl GlyphRamp {
    pub fn new(chars: impl Into<String>) -> Result<Self, AsciiError> {
        let chars: Vec<char> = chars.into().chars().collect();
        if chars.len() < 2 {
            return Err(AsciiError::InvalidRamp(chars.len()));
        }
        Ok(Self { chars })
    }

    /// The ten level ramp used by default.
    pub fn standard() -> Self {
        Self::from_static(" .:-=+*#%@")
    }

    pub fn detailed() -> Self {
        Self::from_static(" .'`^\",:;Il!i><~+_-?][}{1)(|\\/tfjrxnuvczXYUJCLQ0OZmwqpdbkhao*#MW&8%B@$")
    }

    pub fn blocks() -> Self {
        Self::from_static(" ░▒▓█")
    }

    pub fn minimal() -> Self {
        Self::from_static(" .:#")
    }

    fn from_static(chars: &'static str) -> Self {
        Self { chars: chars.chars().collect() }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn max_index(&self) -> usize {
        self.chars.len() - 1
    }

    pub fn char_at(&self, index: usize) -> char {
        self.chars[index.min(self.max_index())]
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<String> for GlyphRamp {
    type Error = AsciiError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GlyphRamp> for String {
    fn from(value: GlyphRamp) -> Self {
        value.chars.into_iter().collect()
    }
}

impl fmt::Display for GlyphRamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.chars.iter().try_for_each(|ch| write!(f, "{ch}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_run_sparse_to_dense() {
        for ramp in [GlyphRamp::standard(), GlyphRamp::detailed(), GlyphRamp::blocks()] {
            assert_eq!(ramp.char_at(0), ' ');
            assert!(ramp.len() >= 2);
        }
        assert_eq!(GlyphRamp::standard().char_at(9), '@');
        assert_eq!(GlyphRamp::standard().char_at(99), '@');
    }

    #[test]
    fn rejects_short_ramps() {
        assert!(matches!(GlyphRamp::new("x"), Err(AsciiError::InvalidRamp(1))));
        assert!(matches!(GlyphRamp::new(""), Err(AsciiError::InvalidRamp(0))));
        assert_eq!(GlyphRamp::new("ab").unwrap().to_string(), "ab");
    }
}

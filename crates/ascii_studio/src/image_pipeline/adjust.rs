/// Gains at or below zero are clamped to this.
pub const MIN_GAIN: f32 = 1e-3;

/// Contrast followed by brightness, with the usual canvas filter semantics:
/// contrast scales the distance from mid-gray, brightness scales the level.
///
/// Both steps are per-channel and pointwise, so the whole curve is tabulated
/// once per render and looked up per sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToneFilter {
    lut: [u8; 256],
    identity: bool,
}

impl ToneFilter {
    pub fn new(contrast: f32, brightness: f32) -> Self {
        let contrast = sanitize_gain(contrast);
        let brightness = sanitize_gain(brightness);

        let mut lut = [0u8; 256];
        for (value, slot) in lut.iter_mut().enumerate() {
            let v = value as f32 / 255.0;
            let v = ((v - 0.5) * contrast + 0.5).clamp(0.0, 1.0);
            let v = (v * brightness).clamp(0.0, 1.0);
            *slot = (v * 255.0).round() as u8;
        }

        let identity = lut.iter().enumerate().all(|(value, &out)| value == usize::from(out));
        Self { lut, identity }
    }

    pub fn is_identity(&self) -> bool {
        self.identity
    }

    #[inline]
    pub fn apply(&self, value: u8) -> u8 {
        self.lut[usize::from(value)]
    }

    #[inline]
    pub fn apply_rgb(&self, rgb: [u8; 3]) -> [u8; 3] {
        [self.apply(rgb[0]), self.apply(rgb[1]), self.apply(rgb[2])]
    }
}

impl Default for ToneFilter {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

fn sanitize_gain(gain: f32) -> f32 {
    if !gain.is_finite() {
        1.0
    } else {
        gain.max(MIN_GAIN)
    }
}

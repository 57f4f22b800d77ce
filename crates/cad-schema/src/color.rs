use serde::{Deserialize, Serialize};

/// Normalized RGB color sent alongside the command list.
///
/// Every channel is kept in `0.0..=1.0`; non-finite input collapses to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Rgb([f32; 3]);

impl Rgb {
    /// Neutral grey used when a component carries no color.
    pub const DEFAULT_GREY: Rgb = Rgb([0.7, 0.7, 0.7]);

    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self([clamp_channel(r), clamp_channel(g), clamp_channel(b)])
    }

    /// Build from 8-bit channels (color pickers work in 0..=255).
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }

    pub fn channels(&self) -> [f32; 3] {
        self.0
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::DEFAULT_GREY
    }
}

impl From<[f32; 3]> for Rgb {
    fn from(c: [f32; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }
}

impl From<Rgb> for [f32; 3] {
    fn from(c: Rgb) -> Self {
        c.0
    }
}

fn clamp_channel(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

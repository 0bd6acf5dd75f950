//! Cell color mapping
//!
//! Single-hue perceptual scale: hue and saturation are fixed, lightness is
//! interpolated linearly from a light endpoint (normalized 0) to a dark
//! endpoint (normalized 1). Missing cells never go through the scale; they use
//! [`NEUTRAL_COLOR`].

use crate::error::MatrixError;
use serde::{Deserialize, Serialize};

/// Background for cells without a score
pub const NEUTRAL_COLOR: &str = "#ffffff";

/// Blue-ish default hue (degrees)
const DEFAULT_HUE: f64 = 205.0;
const DEFAULT_SATURATION: f64 = 60.0;
const DEFAULT_LIGHT: f64 = 95.0;
const DEFAULT_DARK: f64 = 50.0;

/// A color in HSL space (hue in degrees, saturation and lightness in percent)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub hue: f64,
    pub saturation: f64,
    pub lightness: f64,
}

impl Hsl {
    /// CSS functional notation, e.g. `hsl(205, 60%, 95%)`
    pub fn to_css(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }

    /// Convert to 8-bit sRGB channels
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let h = self.hue.rem_euclid(360.0) / 360.0;
        let s = (self.saturation / 100.0).clamp(0.0, 1.0);
        let l = (self.lightness / 100.0).clamp(0.0, 1.0);

        if s == 0.0 {
            let v = channel(l);
            return (v, v, v);
        }

        let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;

        (
            channel(hue_to_rgb(p, q, h + 1.0 / 3.0)),
            channel(hue_to_rgb(p, q, h)),
            channel(hue_to_rgb(p, q, h - 1.0 / 3.0)),
        )
    }

    /// Hex notation, e.g. `#e8f2f9`
    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

fn hue_to_rgb(p: f64, q: f64, t: f64) -> f64 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn channel(v: f64) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Lightness ramp used to shade scored cells
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorScale {
    /// Hue in degrees
    pub hue: f64,
    /// Saturation in percent
    pub saturation: f64,
    /// Lightness for normalized score 0 (percent)
    pub light: f64,
    /// Lightness for normalized score 1 (percent)
    pub dark: f64,
}

impl Default for ColorScale {
    fn default() -> Self {
        Self {
            hue: DEFAULT_HUE,
            saturation: DEFAULT_SATURATION,
            light: DEFAULT_LIGHT,
            dark: DEFAULT_DARK,
        }
    }
}

impl ColorScale {
    /// Map a normalized score to a color.
    ///
    /// Input is clamped to [0, 1]; non-finite input maps to the light endpoint.
    pub fn color_for(&self, normalized: f64) -> Hsl {
        let t = if normalized.is_finite() {
            normalized.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Hsl {
            hue: self.hue,
            saturation: self.saturation,
            lightness: self.light - t * (self.light - self.dark),
        }
    }

    /// Ensure the scale is monotonic and never produces the neutral color
    pub fn validate(&self) -> Result<(), MatrixError> {
        if !(0.0..360.0).contains(&self.hue) {
            return Err(MatrixError::InvalidConfig(format!(
                "color hue {} must be in [0, 360)",
                self.hue
            )));
        }
        if !(self.saturation > 0.0 && self.saturation <= 100.0) {
            return Err(MatrixError::InvalidConfig(format!(
                "color saturation {} must be in (0, 100]",
                self.saturation
            )));
        }
        if !(self.light < 100.0 && self.dark >= 0.0 && self.dark <= self.light) {
            return Err(MatrixError::InvalidConfig(format!(
                "color lightness must satisfy 0 <= dark ({}) <= light ({}) < 100",
                self.dark, self.light
            )));
        }
        // The light endpoint is the palest data color; once rounded to sRGB it
        // must still differ from the neutral background.
        let palest = self.color_for(0.0).to_hex();
        if palest == NEUTRAL_COLOR {
            return Err(MatrixError::InvalidConfig(format!(
                "color light endpoint {} renders as the neutral color {}",
                self.light, NEUTRAL_COLOR
            )));
        }
        Ok(())
    }
}

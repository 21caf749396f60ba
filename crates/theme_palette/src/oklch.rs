//! sRGB <-> OKLab <-> OKLCH conversions.
//!
//! Lightness edits happen in OKLCH so that hue and saturation stay perceptually stable, which
//! naive HSL lightening does not guarantee.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ColorError;

/// 8-bit sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Rgb8 {
    /// Creates a color from channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#RRGGBB` or `#RGB`.
    pub fn parse_hex(raw: &str) -> Result<Self, ColorError> {
        let trimmed = raw.trim();
        let digits = trimmed
            .strip_prefix('#')
            .ok_or_else(|| ColorError::InvalidHex(raw.to_string()))?;
        if !digits.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(raw.to_string()));
        }

        let expanded = match digits.len() {
            6 => digits.to_string(),
            3 => digits.chars().flat_map(|ch| [ch, ch]).collect(),
            _ => return Err(ColorError::InvalidHex(raw.to_string())),
        };
        let channel = |index: usize| {
            expanded
                .get(index..index + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| ColorError::InvalidHex(raw.to_string()))
        };

        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Formats as lowercase `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// WCAG 2.x relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(self) -> f64 {
        let [r, g, b] = self.linear();
        0.2126 * r + 0.7152 * g + 0.0722 * b
    }

    /// WCAG contrast ratio between two colors, in `1.0..=21.0`.
    pub fn contrast_ratio(self, other: Self) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (light, dark) = if a >= b { (a, b) } else { (b, a) };
        (light + 0.05) / (dark + 0.05)
    }

    fn linear(self) -> [f64; 3] {
        [self.r, self.g, self.b].map(|channel| srgb_to_linear(f64::from(channel) / 255.0))
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn to_channel(c: f64) -> u8 {
    // clamp handles out-of-gamut results after lightness edits
    (linear_to_srgb(c).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// OKLab color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklab {
    /// Perceptual lightness, `0.0..=1.0`.
    pub l: f64,
    /// Green/red axis.
    pub a: f64,
    /// Blue/yellow axis.
    pub b: f64,
}

impl Oklab {
    /// Converts from sRGB.
    pub fn from_rgb(rgb: Rgb8) -> Self {
        let [r, g, b] = rgb.linear();

        let l = 0.412_221_470_8 * r + 0.536_332_536_3 * g + 0.051_445_992_9 * b;
        let m = 0.211_903_498_2 * r + 0.680_699_545_1 * g + 0.107_396_956_6 * b;
        let s = 0.088_302_461_9 * r + 0.281_718_837_6 * g + 0.629_978_700_5 * b;

        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        Self {
            l: 0.210_454_255_3 * l_ + 0.793_617_785_0 * m_ - 0.004_072_046_8 * s_,
            a: 1.977_998_495_1 * l_ - 2.428_592_205_0 * m_ + 0.450_593_709_9 * s_,
            b: 0.025_904_037_1 * l_ + 0.782_771_766_2 * m_ - 0.808_675_766_0 * s_,
        }
    }

    /// Converts to sRGB, clamping out-of-gamut channels.
    pub fn to_rgb(self) -> Rgb8 {
        let l_ = self.l + 0.396_337_777_4 * self.a + 0.215_803_757_3 * self.b;
        let m_ = self.l - 0.105_561_345_8 * self.a - 0.063_854_172_8 * self.b;
        let s_ = self.l - 0.089_484_177_5 * self.a - 1.291_485_548_0 * self.b;

        let l = l_ * l_ * l_;
        let m = m_ * m_ * m_;
        let s = s_ * s_ * s_;

        let r = 4.076_741_662_1 * l - 3.307_711_591_3 * m + 0.230_969_929_2 * s;
        let g = -1.268_438_004_6 * l + 2.609_757_401_1 * m - 0.341_319_396_5 * s;
        let b = -0.004_196_086_3 * l - 0.703_418_614_7 * m + 1.707_614_701_0 * s;

        Rgb8::new(to_channel(r), to_channel(g), to_channel(b))
    }
}

/// Chroma below this is treated as achromatic so grays get a stable zero hue.
const ACHROMATIC_CHROMA: f64 = 1e-4;

/// OKLCH color: lightness, chroma, hue in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklch {
    /// Perceptual lightness, `0.0..=1.0`.
    pub l: f64,
    /// Chroma, roughly `0.0..=0.4` for sRGB colors.
    pub c: f64,
    /// Hue angle in `0.0..360.0`.
    pub h: f64,
}

impl Oklch {
    /// Parses a hex seed straight into OKLCH.
    pub fn from_hex(raw: &str) -> Result<Self, ColorError> {
        Rgb8::parse_hex(raw).map(Self::from_rgb)
    }

    /// Converts from sRGB.
    pub fn from_rgb(rgb: Rgb8) -> Self {
        Self::from_oklab(Oklab::from_rgb(rgb))
    }

    /// Converts from OKLab.
    pub fn from_oklab(lab: Oklab) -> Self {
        let c = lab.a.hypot(lab.b);
        if c < ACHROMATIC_CHROMA {
            return Self { l: lab.l, c: 0.0, h: 0.0 };
        }
        let h = lab.b.atan2(lab.a).to_degrees().rem_euclid(360.0);
        Self { l: lab.l, c, h }
    }

    /// Converts to OKLab.
    pub fn to_oklab(self) -> Oklab {
        let radians = self.h.to_radians();
        Oklab {
            l: self.l,
            a: self.c * radians.cos(),
            b: self.c * radians.sin(),
        }
    }

    /// Converts to sRGB, clamping out-of-gamut channels.
    pub fn to_rgb(self) -> Rgb8 {
        self.to_oklab().to_rgb()
    }

    /// Returns the same hue and chroma at another lightness.
    pub fn with_lightness(self, l: f64) -> Self {
        Self {
            l: l.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Formats as the space-separated `L% C H` triple used by CSS `oklch()` custom properties.
    pub fn css_components(self) -> String {
        format!(
            "{}% {} {}",
            fixed(self.l * 100.0, 2),
            fixed(self.c, 4),
            fixed(self.h, 2)
        )
    }
}

fn fixed(value: f64, decimals: usize) -> String {
    let rendered = format!("{value:.decimals$}");
    // `-0.00` would make otherwise identical blocks differ
    if rendered.starts_with('-') && rendered[1..].chars().all(|ch| ch == '0' || ch == '.') {
        rendered[1..].to_string()
    } else {
        rendered
    }
}

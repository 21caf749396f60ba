//! Custom theme palette derivation.
//!
//! Converts the 11 hex seed colors of a user-defined theme into OKLCH, derives focus and
//! content variants per seed, and serializes the result as a scoped CSS custom-property block.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod oklch;
pub mod palette;

use thiserror::Error;

pub use oklch::{Oklab, Oklch, Rgb8};
pub use palette::{contrast_content, focus_variant, DerivedColor, Palette, SeedRole, ThemeSeeds};

/// Color parsing and palette errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ColorError {
    /// The value is not `#RRGGBB` or `#RGB`.
    #[error("invalid hex color `{0}`")]
    InvalidHex(String),
    /// A theme seed failed to parse.
    #[error("invalid seed for --{role}: `{value}`")]
    InvalidSeed {
        /// CSS token of the failing role.
        role: &'static str,
        /// Raw seed text.
        value: String,
    },
}

/// Derives the stylesheet block for a custom theme in one call.
pub fn derive_theme_css(theme_id: &str, seeds: &ThemeSeeds) -> Result<String, ColorError> {
    Palette::from_seeds(seeds).map(|palette| palette.to_css(theme_id))
}

/// Returns `true` for the strict 7-character `#RRGGBB` form accepted by color inputs.
pub fn is_strict_hex(raw: &str) -> bool {
    raw.len() == 7
        && raw.starts_with('#')
        && raw.chars().skip(1).all(|ch| ch.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_hex_only_accepts_seven_characters() {
        assert!(is_strict_hex("#3B82F6"));
        assert!(is_strict_hex("#abcdef"));
        assert!(!is_strict_hex("#abc"));
        assert!(!is_strict_hex("3B82F6"));
        assert!(!is_strict_hex("#3B82F"));
        assert!(!is_strict_hex("#3B82FG"));
    }
}

//! Semantic seed roles, derived focus/content colors, and the CSS custom-property block.

use serde::{Deserialize, Serialize};

use crate::{
    oklch::{Oklch, Rgb8},
    ColorError,
};

/// Lightness shift applied to produce the hover/focus variant.
pub const FOCUS_LIGHTNESS_SHIFT: f64 = 0.07;
const LIGHT_CONTENT_LIGHTNESS: f64 = 0.98;
const DARK_CONTENT_LIGHTNESS: f64 = 0.2;
const LIGHT_CONTENT_MAX_CHROMA: f64 = 0.02;
const DARK_CONTENT_MAX_CHROMA: f64 = 0.04;

/// The 11 semantic roles a custom theme defines a seed color for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeedRole {
    /// Main brand color.
    Primary,
    /// Secondary brand color.
    Secondary,
    /// Highlight color.
    Accent,
    /// Neutral chrome color.
    Neutral,
    /// Page background.
    Base100,
    /// Raised surface.
    Base200,
    /// Further raised surface.
    Base300,
    /// Informational status.
    Info,
    /// Success status.
    Success,
    /// Warning status.
    Warning,
    /// Error status.
    Error,
}

impl SeedRole {
    /// Every role in palette order.
    pub const ALL: [Self; 11] = [
        Self::Primary,
        Self::Secondary,
        Self::Accent,
        Self::Neutral,
        Self::Base100,
        Self::Base200,
        Self::Base300,
        Self::Info,
        Self::Success,
        Self::Warning,
        Self::Error,
    ];

    /// CSS custom-property stem, e.g. `p` for `--p`, `--pf`, `--pc`.
    pub const fn css_token(self) -> &'static str {
        match self {
            Self::Primary => "p",
            Self::Secondary => "s",
            Self::Accent => "a",
            Self::Neutral => "n",
            Self::Base100 => "b1",
            Self::Base200 => "b2",
            Self::Base300 => "b3",
            Self::Info => "in",
            Self::Success => "su",
            Self::Warning => "wa",
            Self::Error => "er",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// Hex seed colors as stored by the theme registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSeeds {
    /// Primary seed.
    pub primary: String,
    /// Secondary seed.
    pub secondary: String,
    /// Accent seed.
    pub accent: String,
    /// Neutral seed.
    pub neutral: String,
    /// Base-100 seed.
    #[serde(alias = "base-100")]
    pub base100: String,
    /// Base-200 seed.
    #[serde(alias = "base-200")]
    pub base200: String,
    /// Base-300 seed.
    #[serde(alias = "base-300")]
    pub base300: String,
    /// Info seed.
    pub info: String,
    /// Success seed.
    pub success: String,
    /// Warning seed.
    pub warning: String,
    /// Error seed.
    pub error: String,
}

impl ThemeSeeds {
    /// Returns the hex seed for a role.
    pub fn get(&self, role: SeedRole) -> &str {
        match role {
            SeedRole::Primary => &self.primary,
            SeedRole::Secondary => &self.secondary,
            SeedRole::Accent => &self.accent,
            SeedRole::Neutral => &self.neutral,
            SeedRole::Base100 => &self.base100,
            SeedRole::Base200 => &self.base200,
            SeedRole::Base300 => &self.base300,
            SeedRole::Info => &self.info,
            SeedRole::Success => &self.success,
            SeedRole::Warning => &self.warning,
            SeedRole::Error => &self.error,
        }
    }
}

/// Derived colors for one role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedColor {
    /// The seed itself.
    pub seed: Oklch,
    /// Hover/focus variant.
    pub focus: Oklch,
    /// Legible foreground when the seed is a background.
    pub content: Oklch,
}

/// A full theme palette.
///
/// Only the parsed seeds are held; every derived value is computed on demand so a palette is
/// always a pure function of its seeds.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    seeds: [Oklch; 11],
}

impl Palette {
    /// Parses all 11 seeds.
    pub fn from_seeds(seeds: &ThemeSeeds) -> Result<Self, ColorError> {
        let mut parsed = [Oklch { l: 0.0, c: 0.0, h: 0.0 }; 11];
        for role in SeedRole::ALL {
            let raw = seeds.get(role);
            parsed[role.index()] = Oklch::from_hex(raw).map_err(|_| ColorError::InvalidSeed {
                role: role.css_token(),
                value: raw.to_string(),
            })?;
        }
        Ok(Self { seeds: parsed })
    }

    /// Returns the seed color for a role.
    pub fn seed(&self, role: SeedRole) -> Oklch {
        self.seeds[role.index()]
    }

    /// Returns every derived value for a role.
    pub fn derived(&self, role: SeedRole) -> DerivedColor {
        let seed = self.seed(role);
        DerivedColor {
            seed,
            focus: focus_variant(seed),
            content: contrast_content(seed),
        }
    }

    /// Whether the page background reads as dark.
    pub fn is_dark(&self) -> bool {
        self.seed(SeedRole::Base100).l < 0.5
    }

    /// Serializes the palette as a CSS block scoped to `[data-theme="<theme_id>"]`.
    ///
    /// Output is byte-identical for identical seeds and theme ids.
    pub fn to_css(&self, theme_id: &str) -> String {
        let mut css = format!("[data-theme=\"{}\"] {{\n", sanitize_theme_id(theme_id));
        css.push_str(&format!(
            "  color-scheme: {};\n",
            if self.is_dark() { "dark" } else { "light" }
        ));
        for role in SeedRole::ALL {
            let token = role.css_token();
            let derived = self.derived(role);
            css.push_str(&format!("  --{token}: {};\n", derived.seed.css_components()));
            css.push_str(&format!("  --{token}f: {};\n", derived.focus.css_components()));
            css.push_str(&format!("  --{token}c: {};\n", derived.content.css_components()));
        }
        css.push_str(&format!(
            "  --bc: {};\n",
            self.derived(SeedRole::Base100).content.css_components()
        ));
        css.push('}');
        css.push('\n');
        css
    }
}

/// Shifts lightness toward the middle of the range, keeping hue and chroma.
pub fn focus_variant(seed: Oklch) -> Oklch {
    if seed.l > 0.5 {
        seed.with_lightness(seed.l - FOCUS_LIGHTNESS_SHIFT)
    } else {
        seed.with_lightness(seed.l + FOCUS_LIGHTNESS_SHIFT)
    }
}

/// Picks a near-white or near-black tint of the seed hue, whichever contrasts more.
pub fn contrast_content(seed: Oklch) -> Oklch {
    let background = seed.to_rgb();
    let light = Oklch {
        l: LIGHT_CONTENT_LIGHTNESS,
        c: seed.c.min(LIGHT_CONTENT_MAX_CHROMA),
        h: seed.h,
    };
    let dark = Oklch {
        l: DARK_CONTENT_LIGHTNESS,
        c: seed.c.min(DARK_CONTENT_MAX_CHROMA),
        h: seed.h,
    };
    if ratio(light, background) >= ratio(dark, background) {
        light
    } else {
        dark
    }
}

fn ratio(foreground: Oklch, background: Rgb8) -> f64 {
    foreground.to_rgb().contrast_ratio(background)
}

fn sanitize_theme_id(raw: &str) -> String {
    raw.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn ocean_seeds() -> ThemeSeeds {
        ThemeSeeds {
            primary: "#3B82F6".to_string(),
            secondary: "#A855F7".to_string(),
            accent: "#14B8A6".to_string(),
            neutral: "#1E293B".to_string(),
            base100: "#FFFFFF".to_string(),
            base200: "#F1F5F9".to_string(),
            base300: "#E2E8F0".to_string(),
            info: "#0EA5E9".to_string(),
            success: "#22C55E".to_string(),
            warning: "#FDE047".to_string(),
            error: "#EF4444".to_string(),
        }
    }

    #[test]
    fn css_output_is_deterministic() {
        let palette = Palette::from_seeds(&ocean_seeds()).expect("palette");
        let first = palette.to_css("custom-ocean");
        let second = Palette::from_seeds(&ocean_seeds())
            .expect("palette")
            .to_css("custom-ocean");
        assert_eq!(first, second);
        assert!(first.starts_with("[data-theme=\"custom-ocean\"] {\n"));
        assert!(first.contains("  color-scheme: light;\n"));
        assert!(first.contains("  --p: "));
        assert!(first.contains("  --erc: "));
    }

    #[test]
    fn focus_variant_changes_lightness_and_keeps_hue() {
        let seed = Oklch::from_hex("#3B82F6").expect("seed");
        let focus = focus_variant(seed);
        assert!((seed.l - focus.l - FOCUS_LIGHTNESS_SHIFT).abs() < 1e-9);

        // re-measure after the sRGB round trip to catch gamut clamping drift
        let measured = Oklch::from_rgb(focus.to_rgb());
        assert!((measured.h - seed.h).abs() < 3.0, "hue {} vs {}", measured.h, seed.h);
        assert!((measured.l - seed.l).abs() > 0.05);
    }

    #[test]
    fn dark_seeds_get_lighter_focus_variants() {
        let seed = Oklch::from_hex("#1E293B").expect("seed");
        assert!(focus_variant(seed).l > seed.l);
    }

    #[test]
    fn content_color_picks_legible_side() {
        let navy = Oklch::from_hex("#1E293B").expect("navy");
        let yellow = Oklch::from_hex("#FDE047").expect("yellow");
        assert_eq!(contrast_content(navy).l, LIGHT_CONTENT_LIGHTNESS);
        assert_eq!(contrast_content(yellow).l, DARK_CONTENT_LIGHTNESS);

        for seed in [navy, yellow] {
            let content = contrast_content(seed).to_rgb();
            assert!(content.contrast_ratio(seed.to_rgb()) >= 4.5);
        }
    }

    #[test]
    fn invalid_seed_names_its_role() {
        let mut seeds = ocean_seeds();
        seeds.warning = "yellow".to_string();
        assert_eq!(
            Palette::from_seeds(&seeds),
            Err(ColorError::InvalidSeed {
                role: "wa",
                value: "yellow".to_string(),
            })
        );
    }

    #[test]
    fn theme_id_is_sanitized_in_selector() {
        let palette = Palette::from_seeds(&ocean_seeds()).expect("palette");
        assert!(palette
            .to_css("custom\"]{evil")
            .starts_with("[data-theme=\"custom---evil\"] {"));
    }

    #[test]
    fn seeds_accept_dashed_base_keys() {
        let raw = serde_json::json!({
            "primary": "#3B82F6", "secondary": "#A855F7", "accent": "#14B8A6",
            "neutral": "#1E293B", "base-100": "#0F172A", "base-200": "#1E293B",
            "base-300": "#334155", "info": "#0EA5E9", "success": "#22C55E",
            "warning": "#FDE047", "error": "#EF4444"
        });
        let seeds: ThemeSeeds = serde_json::from_value(raw).expect("seeds");
        let palette = Palette::from_seeds(&seeds).expect("palette");
        assert!(palette.is_dark());
    }
}

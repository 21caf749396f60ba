//! Theme activation: remote registry update, local preference mirror, and custom stylesheet
//! derivation.

use std::cell::RefCell;

use theme_palette::{derive_theme_css, ColorError};
use thiserror::Error;

use crate::{
    config::OutputConfig,
    host::{
        load_pref_with, save_pref_with, CustomTheme, PrefsStore, StylesheetHost, ThemeRegistry,
    },
    stylesheet::ThemeStylesheet,
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Theme activation failures. Registry and preference failures are logged, not returned.
pub enum ThemeError {
    /// No custom theme with this id is known remotely or in the local cache.
    #[error("custom theme `{0}` not found")]
    UnknownCustomTheme(String),
    /// The theme's seed colors do not parse.
    #[error(transparent)]
    Color(#[from] ColorError),
    /// The stylesheet host refused the node.
    #[error("stylesheet injection failed: {0}")]
    Stylesheet(String),
    /// A later activation started before this one finished; nothing was applied.
    #[error("theme `{0}` was superseded by a later activation")]
    Superseded(String),
}

#[derive(Clone, Copy)]
/// Host services theme activation talks to.
pub struct ThemeHosts<'a> {
    /// Remote theme registry.
    pub registry: &'a dyn ThemeRegistry,
    /// Local preference store.
    pub prefs: &'a dyn PrefsStore,
    /// Stylesheet injection.
    pub styles: &'a dyn StylesheetHost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Applied theme.
pub struct ThemeActivation {
    /// Theme id as requested.
    pub theme_id: String,
    /// Whether a derived stylesheet was injected.
    pub custom: bool,
}

/// Activates `theme_id`: clears any injected stylesheet, records the choice remotely and in local
/// preferences, then injects a derived stylesheet when the id is a custom theme.
///
/// Repeating the call with the same id leaves exactly one injected node. When activations
/// overlap, the one started last wins.
///
/// # Errors
///
/// Returns [`ThemeError`] when a custom theme cannot be resolved or rendered, and
/// [`ThemeError::Superseded`] when a later activation began before this one finished.
/// Built-in themes otherwise never fail.
pub async fn activate_theme(
    hosts: ThemeHosts<'_>,
    config: &OutputConfig,
    stylesheet: &RefCell<ThemeStylesheet>,
    theme_id: &str,
) -> Result<ThemeActivation, ThemeError> {
    let generation = stylesheet.borrow_mut().begin(hosts.styles);

    if let Err(err) = hosts.registry.update_theme(theme_id).await {
        leptos::logging::warn!("theme registry update for {theme_id} failed: {err}");
    }
    ensure_current(stylesheet, generation, theme_id)?;
    if let Err(err) = save_pref_with(hosts.prefs, &config.theme_pref_key, &theme_id).await {
        leptos::logging::warn!("theme preference save failed: {err}");
    }

    apply_theme(hosts, config, stylesheet, generation, theme_id).await
}

/// Re-applies the theme recorded in local preferences, without touching the registry.
///
/// # Errors
///
/// Returns [`ThemeError`] when the stored custom theme cannot be resolved or rendered.
pub async fn restore_theme(
    hosts: ThemeHosts<'_>,
    config: &OutputConfig,
    stylesheet: &RefCell<ThemeStylesheet>,
) -> Result<Option<ThemeActivation>, ThemeError> {
    let stored = match load_pref_with::<_, String>(hosts.prefs, &config.theme_pref_key).await {
        Ok(stored) => stored,
        Err(err) => {
            leptos::logging::warn!("theme preference load failed: {err}");
            None
        }
    };
    let Some(theme_id) = stored.filter(|id| !id.trim().is_empty()) else {
        return Ok(None);
    };

    let generation = stylesheet.borrow_mut().begin(hosts.styles);
    apply_theme(hosts, config, stylesheet, generation, &theme_id)
        .await
        .map(Some)
}

fn ensure_current(
    stylesheet: &RefCell<ThemeStylesheet>,
    generation: u64,
    theme_id: &str,
) -> Result<(), ThemeError> {
    if stylesheet.borrow().is_current(generation) {
        Ok(())
    } else {
        Err(ThemeError::Superseded(theme_id.to_string()))
    }
}

async fn apply_theme(
    hosts: ThemeHosts<'_>,
    config: &OutputConfig,
    stylesheet: &RefCell<ThemeStylesheet>,
    generation: u64,
    theme_id: &str,
) -> Result<ThemeActivation, ThemeError> {
    ensure_current(stylesheet, generation, theme_id)?;
    hosts.styles.set_active_theme(theme_id);
    if !config.is_custom_theme(theme_id) {
        return Ok(ThemeActivation {
            theme_id: theme_id.to_string(),
            custom: false,
        });
    }

    let theme = lookup_custom_theme(hosts, config, theme_id)
        .await
        .ok_or_else(|| ThemeError::UnknownCustomTheme(theme_id.to_string()))?;
    let css = derive_theme_css(theme_id, &theme.colors)?;
    ensure_current(stylesheet, generation, theme_id)?;
    stylesheet
        .borrow_mut()
        .replace(hosts.styles, theme_id, &css)
        .map_err(ThemeError::Stylesheet)?;

    Ok(ThemeActivation {
        theme_id: theme_id.to_string(),
        custom: true,
    })
}

async fn lookup_custom_theme(
    hosts: ThemeHosts<'_>,
    config: &OutputConfig,
    theme_id: &str,
) -> Option<CustomTheme> {
    let themes = match hosts.registry.custom_themes().await {
        Ok(themes) => {
            if let Err(err) =
                save_pref_with(hosts.prefs, &config.custom_theme_cache_key, &themes).await
            {
                leptos::logging::warn!("custom theme cache save failed: {err}");
            }
            themes
        }
        Err(err) => {
            leptos::logging::warn!("custom theme fetch failed, using local cache: {err}");
            load_pref_with::<_, Vec<CustomTheme>>(hosts.prefs, &config.custom_theme_cache_key)
                .await
                .unwrap_or_else(|err| {
                    leptos::logging::warn!("custom theme cache load failed: {err}");
                    None
                })
                .unwrap_or_default()
        }
    };

    let bare_id = theme_id
        .strip_prefix(config.custom_theme_prefix.as_str())
        .unwrap_or(theme_id);
    themes
        .into_iter()
        .find(|theme| theme.id == theme_id || theme.id == bare_id)
}

//! Browser adapters for the output runtime host traits.
//!
//! Every adapter compiles on native targets, where browser calls are replaced by no-ops so the
//! crate can be unit tested without a DOM.

use std::{cell::RefCell, collections::HashMap};

use leptos::{Callable, Callback};
use output_runtime::host::{HostFuture, Navigator, PrefsStore, StyleNodeId, StylesheetHost};

/// Attribute carried by injected theme stylesheets.
pub const THEME_STYLE_ATTRIBUTE: &str = "data-output-theme";

#[derive(Debug, Clone, Copy, Default)]
/// Preference store backed by `window.localStorage`.
pub struct WebPrefsStore;

impl WebPrefsStore {
    fn load_json(self, key: &str) -> Option<String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()?.local_storage().ok().flatten()?;
            storage.get_item(key).ok().flatten()
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            None
        }
    }

    fn save_json(self, key: &str, raw_json: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .set_item(key, raw_json)
                .map_err(|e| format!("localStorage set_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (key, raw_json);
            Ok(())
        }
    }

    fn delete_json(self, key: &str) -> Result<(), String> {
        #[cfg(target_arch = "wasm32")]
        {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok().flatten())
                .ok_or_else(|| "localStorage unavailable".to_string())?;
            storage
                .remove_item(key)
                .map_err(|e| format!("localStorage remove_item failed: {e:?}"))
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = key;
            Ok(())
        }
    }
}

impl PrefsStore for WebPrefsStore {
    fn load_pref<'a>(&'a self, key: &'a str) -> HostFuture<'a, Result<Option<String>, String>> {
        let store = *self;
        Box::pin(async move { Ok(store.load_json(key)) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> HostFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.save_json(key, raw_json) })
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> HostFuture<'a, Result<(), String>> {
        let store = *self;
        Box::pin(async move { store.delete_json(key) })
    }
}

#[derive(Debug, Default)]
/// Injects theme stylesheets as `<style>` elements in `document.head` and mirrors the active
/// theme onto the root element's `data-theme` attribute.
pub struct DomStylesheetHost {
    next_id: RefCell<u64>,
    nodes: RefCell<HashMap<StyleNodeId, web_sys::Element>>,
}

impl StylesheetHost for DomStylesheetHost {
    fn insert_style(&self, theme_id: &str, css: &str) -> Result<StyleNodeId, String> {
        let id = {
            let mut next_id = self.next_id.borrow_mut();
            *next_id += 1;
            StyleNodeId(*next_id)
        };

        #[cfg(target_arch = "wasm32")]
        {
            let document = web_sys::window()
                .and_then(|window| window.document())
                .ok_or_else(|| "document unavailable".to_string())?;
            let head = document
                .head()
                .ok_or_else(|| "document head unavailable".to_string())?;
            let style = document
                .create_element("style")
                .map_err(|e| format!("create style element failed: {e:?}"))?;
            style
                .set_attribute(THEME_STYLE_ATTRIBUTE, theme_id)
                .map_err(|e| format!("style attribute failed: {e:?}"))?;
            style.set_text_content(Some(css));
            head.append_child(&style)
                .map_err(|e| format!("style append failed: {e:?}"))?;
            self.nodes.borrow_mut().insert(id, style);
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = (theme_id, css);
        }

        Ok(id)
    }

    fn remove_style(&self, node: StyleNodeId) {
        if let Some(element) = self.nodes.borrow_mut().remove(&node) {
            element.remove();
        }
    }

    fn set_active_theme(&self, theme_id: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            let root = web_sys::window()
                .and_then(|window| window.document())
                .and_then(|document| document.document_element());
            if let Some(root) = root {
                if let Err(err) = root.set_attribute("data-theme", theme_id) {
                    leptos::logging::warn!("data-theme update failed: {err:?}");
                }
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let _ = theme_id;
        }
    }
}

/// Navigator that pushes browser history entries and reports project switches to the app.
pub struct WebNavigator {
    on_switch_project: Option<Callback<String>>,
}

impl WebNavigator {
    /// Creates a navigator. `on_switch_project` receives every project switch.
    pub fn new(on_switch_project: Option<Callback<String>>) -> Self {
        Self { on_switch_project }
    }
}

impl Navigator for WebNavigator {
    fn switch_project(&self, project_id: &str) {
        if let Some(callback) = self.on_switch_project {
            callback.call(project_id.to_string());
        }
    }

    fn navigate(&self, path: &str) {
        #[cfg(target_arch = "wasm32")]
        {
            let history = web_sys::window().and_then(|window| window.history().ok());
            match history {
                Some(history) => {
                    if let Err(err) =
                        history.push_state_with_url(&wasm_bindgen::JsValue::NULL, "", Some(path))
                    {
                        leptos::logging::warn!("navigation to {path} failed: {err:?}");
                    }
                }
                None => leptos::logging::warn!("navigation to {path} failed: history unavailable"),
            }
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            leptos::logging::log!("navigate {path}");
        }
    }
}

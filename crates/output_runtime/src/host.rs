//! Host service contracts the output runtime talks to, plus in-memory adapters.
//!
//! Async methods return [`HostFuture`] so the traits stay object-safe and can be held as
//! `Rc<dyn Trait>` by the single-threaded runtime.

use std::{cell::RefCell, collections::HashMap, future::Future, pin::Pin, rc::Rc};

use command_result_contract::{CommandResult, HistoryEntryId, WizardRecord};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use theme_palette::ThemeSeeds;

/// Object-safe boxed future used by host service async methods.
pub type HostFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Backend command execution boundary.
pub trait CommandExecutor {
    /// Runs one command line in the context of `project_id`.
    fn execute<'a>(
        &'a self,
        command: &'a str,
        project_id: Option<&'a str>,
    ) -> HostFuture<'a, Result<CommandResult, String>>;

    /// Posts raw collected data to the project creation endpoint.
    fn create_project<'a>(
        &'a self,
        data: &'a Map<String, Value>,
    ) -> HostFuture<'a, Result<CommandResult, String>>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
/// User-defined theme as listed by the theme registry.
pub struct CustomTheme {
    /// Theme id, with or without the custom prefix.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Seed colors.
    pub colors: ThemeSeeds,
}

/// Remote theme registry.
pub trait ThemeRegistry {
    /// Lists the user's custom themes.
    fn custom_themes(&self) -> HostFuture<'_, Result<Vec<CustomTheme>, String>>;

    /// Records the active theme choice remotely.
    fn update_theme<'a>(&'a self, theme_id: &'a str) -> HostFuture<'a, Result<(), String>>;
}

/// Application navigation and project context.
pub trait Navigator {
    /// Makes `project_id` the active project context.
    fn switch_project(&self, project_id: &str);

    /// Navigates to an application path.
    fn navigate(&self, path: &str);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Handle to one injected stylesheet node.
pub struct StyleNodeId(pub u64);

/// Injects and removes stylesheet nodes (a `<style>` element in the browser).
pub trait StylesheetHost {
    /// Inserts a stylesheet node tagged with `theme_id`.
    fn insert_style(&self, theme_id: &str, css: &str) -> Result<StyleNodeId, String>;

    /// Removes a previously inserted node. Unknown handles are ignored.
    fn remove_style(&self, node: StyleNodeId);

    /// Marks `theme_id` as the document theme (the `data-theme` attribute in the browser).
    fn set_active_theme(&self, theme_id: &str);
}

/// Store for wizard snapshots keyed by history entry.
pub trait WizardArchive {
    /// Saves or replaces the snapshot for its entry.
    fn save_record<'a>(&'a self, record: &'a WizardRecord) -> HostFuture<'a, Result<(), String>>;

    /// Loads the snapshot recorded for an entry.
    fn load_record(
        &self,
        entry_id: HistoryEntryId,
    ) -> HostFuture<'_, Result<Option<WizardRecord>, String>>;

    /// Drops the snapshot of an entry that left the history.
    fn delete_record(&self, entry_id: HistoryEntryId) -> HostFuture<'_, Result<(), String>>;
}

/// Host service for lightweight preference values (JSON stored as text per key).
pub trait PrefsStore {
    /// Loads a raw JSON string for a preference key.
    fn load_pref<'a>(&'a self, key: &'a str) -> HostFuture<'a, Result<Option<String>, String>>;

    /// Saves a raw JSON string for a preference key.
    fn save_pref<'a>(&'a self, key: &'a str, raw_json: &'a str)
        -> HostFuture<'a, Result<(), String>>;

    /// Deletes a preference key.
    fn delete_pref<'a>(&'a self, key: &'a str) -> HostFuture<'a, Result<(), String>>;
}

#[derive(Debug, Clone, Default)]
/// In-memory preference store keyed by string.
pub struct MemoryPrefsStore {
    inner: Rc<RefCell<HashMap<String, String>>>,
}

impl PrefsStore for MemoryPrefsStore {
    fn load_pref<'a>(&'a self, key: &'a str) -> HostFuture<'a, Result<Option<String>, String>> {
        Box::pin(async move { Ok(self.inner.borrow().get(key).cloned()) })
    }

    fn save_pref<'a>(
        &'a self,
        key: &'a str,
        raw_json: &'a str,
    ) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner
                .borrow_mut()
                .insert(key.to_string(), raw_json.to_string());
            Ok(())
        })
    }

    fn delete_pref<'a>(&'a self, key: &'a str) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            self.inner.borrow_mut().remove(key);
            Ok(())
        })
    }
}

/// Loads and deserializes a typed preference value through a [`PrefsStore`] implementation.
///
/// # Errors
///
/// Returns an error when the store or JSON deserialization fails.
pub async fn load_pref_with<S: PrefsStore + ?Sized, T: DeserializeOwned>(
    store: &S,
    key: &str,
) -> Result<Option<T>, String> {
    let Some(raw) = store.load_pref(key).await? else {
        return Ok(None);
    };
    let value = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(Some(value))
}

/// Serializes and saves a typed preference value through a [`PrefsStore`] implementation.
///
/// # Errors
///
/// Returns an error when serialization or store save fails.
pub async fn save_pref_with<S: PrefsStore + ?Sized, T: Serialize>(
    store: &S,
    key: &str,
    value: &T,
) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.save_pref(key, &raw).await
}

#[derive(Clone)]
/// [`WizardArchive`] that keeps one preference key per history entry.
pub struct PrefsWizardArchive {
    prefs: Rc<dyn PrefsStore>,
    key_prefix: String,
}

impl PrefsWizardArchive {
    /// Stores records under `<key_prefix><entry number>`.
    pub fn new(prefs: Rc<dyn PrefsStore>, key_prefix: impl Into<String>) -> Self {
        Self {
            prefs,
            key_prefix: key_prefix.into(),
        }
    }

    fn key(&self, entry_id: HistoryEntryId) -> String {
        format!("{}{}", self.key_prefix, entry_id.0)
    }
}

impl WizardArchive for PrefsWizardArchive {
    fn save_record<'a>(&'a self, record: &'a WizardRecord) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async move {
            let entry_id = record
                .entry_id
                .ok_or_else(|| "wizard record has no history entry".to_string())?;
            save_pref_with(self.prefs.as_ref(), &self.key(entry_id), record).await
        })
    }

    fn load_record(
        &self,
        entry_id: HistoryEntryId,
    ) -> HostFuture<'_, Result<Option<WizardRecord>, String>> {
        Box::pin(async move { load_pref_with(self.prefs.as_ref(), &self.key(entry_id)).await })
    }

    fn delete_record(&self, entry_id: HistoryEntryId) -> HostFuture<'_, Result<(), String>> {
        Box::pin(async move { self.prefs.delete_pref(&self.key(entry_id)).await })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Stylesheet node held by [`MemoryStylesheetHost`].
pub struct StyleNode {
    /// Handle returned at insertion.
    pub id: StyleNodeId,
    /// Theme the node styles.
    pub theme_id: String,
    /// Stylesheet text.
    pub css: String,
}

#[derive(Debug, Clone, Default)]
/// In-memory [`StylesheetHost`] for non-browser targets and tests.
pub struct MemoryStylesheetHost {
    nodes: Rc<RefCell<Vec<StyleNode>>>,
    next_id: Rc<RefCell<u64>>,
    active_theme: Rc<RefCell<Option<String>>>,
}

impl MemoryStylesheetHost {
    /// Currently inserted nodes in insertion order.
    pub fn nodes(&self) -> Vec<StyleNode> {
        self.nodes.borrow().clone()
    }

    /// Last theme passed to [`StylesheetHost::set_active_theme`].
    pub fn active_theme(&self) -> Option<String> {
        self.active_theme.borrow().clone()
    }
}

impl StylesheetHost for MemoryStylesheetHost {
    fn insert_style(&self, theme_id: &str, css: &str) -> Result<StyleNodeId, String> {
        let mut next_id = self.next_id.borrow_mut();
        *next_id += 1;
        let id = StyleNodeId(*next_id);
        self.nodes.borrow_mut().push(StyleNode {
            id,
            theme_id: theme_id.to_string(),
            css: css.to_string(),
        });
        Ok(id)
    }

    fn remove_style(&self, node: StyleNodeId) {
        self.nodes.borrow_mut().retain(|existing| existing.id != node);
    }

    fn set_active_theme(&self, theme_id: &str) {
        *self.active_theme.borrow_mut() = Some(theme_id.to_string());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Call observed by [`RecordingNavigator`].
pub enum NavigationCall {
    /// Project context switch.
    SwitchProject(String),
    /// Path navigation.
    Navigate(String),
}

#[derive(Debug, Clone, Default)]
/// [`Navigator`] that records calls in order.
pub struct RecordingNavigator {
    calls: Rc<RefCell<Vec<NavigationCall>>>,
}

impl RecordingNavigator {
    /// Calls observed so far.
    pub fn calls(&self) -> Vec<NavigationCall> {
        self.calls.borrow().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn switch_project(&self, project_id: &str) {
        self.calls
            .borrow_mut()
            .push(NavigationCall::SwitchProject(project_id.to_string()));
    }

    fn navigate(&self, path: &str) {
        self.calls
            .borrow_mut()
            .push(NavigationCall::Navigate(path.to_string()));
    }
}

//! Single-threaded output runtime: runs commands, dispatches results, and drains effects.

use std::{
    cell::{Ref, RefCell},
    collections::VecDeque,
    rc::Rc,
};

use command_result_contract::{CommandResult, HistoryEntryId, ResultKind, WizardRecord};
use serde::{Deserialize, Serialize};
use wizard_engine::{
    render_archived, ArchivedSummary, SubmissionTarget, WizardAction, WizardEffect, WizardSession,
};

use crate::{
    config::OutputConfig,
    dispatcher::{dispatch, side_effects, DispatchContext, DispatchEffect},
    host::{
        load_pref_with, save_pref_with, CommandExecutor, Navigator, PrefsStore, StylesheetHost,
        ThemeRegistry, WizardArchive,
    },
    stylesheet::ThemeStylesheet,
    theme::{self, ThemeActivation, ThemeError, ThemeHosts},
    views::RenderedOutput,
    wizards::WizardRegistry,
    RuntimeError,
};

#[derive(Clone)]
/// Host services injected by the entry layer.
pub struct OutputHosts {
    /// Command interpreter and project creation endpoint.
    pub executor: Rc<dyn CommandExecutor>,
    /// Remote theme registry.
    pub themes: Rc<dyn ThemeRegistry>,
    /// Project context and routing.
    pub navigator: Rc<dyn Navigator>,
    /// Stylesheet injection.
    pub styles: Rc<dyn StylesheetHost>,
    /// Wizard snapshot persistence.
    pub archive: Rc<dyn WizardArchive>,
    /// Local preferences.
    pub prefs: Rc<dyn PrefsStore>,
}

#[derive(Debug, Clone, PartialEq)]
/// One command and its rendered result.
pub struct HistoryEntry {
    /// Entry id.
    pub id: HistoryEntryId,
    /// Command line as typed.
    pub command: String,
    /// Raw interpreter result.
    pub result: CommandResult,
    /// Rendering at the time the entry was added.
    pub output: RenderedOutput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Ephemeral notification raised by a wizard.
pub struct Notice {
    /// Severity.
    pub level: ResultKind,
    /// Text.
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PersistedHistory {
    next_entry: u64,
    entries: Vec<PersistedEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedEntry {
    id: HistoryEntryId,
    command: String,
    result: CommandResult,
}

#[derive(Debug, Default)]
struct RuntimeState {
    wizards: WizardRegistry,
    history: VecDeque<HistoryEntry>,
    next_entry: u64,
    active_project: Option<String>,
}

/// Output runtime owning history, live wizards, and the injected theme stylesheet.
///
/// State lives behind [`RefCell`]s and no borrow is held across an `.await`, so host futures
/// may call back into the runtime.
pub struct OutputRuntime {
    config: OutputConfig,
    hosts: OutputHosts,
    state: RefCell<RuntimeState>,
    stylesheet: RefCell<ThemeStylesheet>,
}

impl OutputRuntime {
    /// Creates an empty runtime.
    pub fn new(config: OutputConfig, hosts: OutputHosts) -> Self {
        Self {
            config,
            hosts,
            state: RefCell::new(RuntimeState::default()),
            stylesheet: RefCell::new(ThemeStylesheet::default()),
        }
    }

    /// Active project context.
    pub fn active_project(&self) -> Option<String> {
        self.state.borrow().active_project.clone()
    }

    /// Sets the project context without notifying the navigator.
    pub fn set_active_project(&self, project_id: Option<String>) {
        self.state.borrow_mut().active_project = project_id;
    }

    /// History, oldest first.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.state.borrow().history.iter().cloned().collect()
    }

    /// Snapshot of the live session opened by `entry_id`.
    pub fn wizard(&self, entry_id: HistoryEntryId) -> Option<WizardSession> {
        self.state.borrow().wizards.get(entry_id).cloned()
    }

    /// Borrow of the live session opened by `entry_id`, for views that read many fields.
    pub fn with_wizard<R>(
        &self,
        entry_id: HistoryEntryId,
        read: impl FnOnce(Option<&WizardSession>) -> R,
    ) -> R {
        let state: Ref<'_, RuntimeState> = self.state.borrow();
        read(state.wizards.get(entry_id))
    }

    /// Summary of a live session, as it would be replayed from its current snapshot.
    pub fn wizard_summary(&self, entry_id: HistoryEntryId) -> Option<ArchivedSummary> {
        self.with_wizard(entry_id, |session| {
            session.map(|session| render_archived(&session.to_record()))
        })
    }

    /// Theme id of the injected custom stylesheet.
    pub fn injected_theme(&self) -> Option<String> {
        self.stylesheet.borrow().active_theme().map(str::to_string)
    }

    /// Executes a command line in the active project and records the result.
    ///
    /// Transport failures become error results so the entry still renders.
    pub async fn run_command(&self, command: &str) -> HistoryEntry {
        let project_id = self.active_project();
        let result = match self
            .hosts
            .executor
            .execute(command, project_id.as_deref())
            .await
        {
            Ok(result) => result,
            Err(err) => {
                leptos::logging::warn!("command `{command}` failed: {err}");
                CommandResult::error(err)
            }
        };
        self.present(command, result).await
    }

    /// Rebuilds the history saved by earlier sessions and returns how many entries were restored.
    ///
    /// Entries render through [`OutputRuntime::replay`], so restoring never re-runs side effects.
    /// New entries continue numbering after the highest restored id. Call once at boot, before
    /// running commands.
    pub async fn restore_history(&self) -> usize {
        let loaded = load_pref_with::<_, PersistedHistory>(
            self.hosts.prefs.as_ref(),
            &self.config.history_pref_key,
        )
        .await;
        let PersistedHistory {
            next_entry,
            entries,
        } = match loaded {
            Ok(persisted) => persisted.unwrap_or_default(),
            Err(err) => {
                leptos::logging::warn!("history restore failed: {err}");
                PersistedHistory::default()
            }
        };

        let skip = entries.len().saturating_sub(self.config.history_capacity);
        let mut restored = Vec::with_capacity(entries.len() - skip);
        for entry in entries.into_iter().skip(skip) {
            let output = self.replay(entry.id, &entry.command, &entry.result).await;
            restored.push(HistoryEntry {
                id: entry.id,
                command: entry.command,
                result: entry.result,
                output,
            });
        }

        let count = restored.len();
        let evicted = {
            let mut state = self.state.borrow_mut();
            let highest = restored.iter().map(|entry| entry.id.0).max().unwrap_or(0);
            state.next_entry = state.next_entry.max(next_entry).max(highest);
            for entry in restored.into_iter().rev() {
                state.history.push_front(entry);
            }
            self.evict_overflow(&mut state)
        };
        self.persist_history(evicted).await;
        count
    }

    /// Records an already available result, dispatches it, and executes its effects in order.
    pub async fn present(&self, command: &str, result: CommandResult) -> HistoryEntry {
        let (entry_id, active_project) = {
            let mut state = self.state.borrow_mut();
            state.next_entry += 1;
            (HistoryEntryId(state.next_entry), state.active_project.clone())
        };

        let dispatched = dispatch(
            &result,
            &DispatchContext {
                entry_id,
                command,
                active_project: active_project.as_deref(),
                archived: None,
                config: &self.config,
            },
        );
        self.run_effects(dispatched.effects).await;

        let entry = HistoryEntry {
            id: entry_id,
            command: command.to_string(),
            result,
            output: dispatched.output,
        };
        let evicted = self.push_history(entry.clone());
        self.persist_history(evicted).await;
        entry
    }

    /// Re-renders a restored history entry without side effects.
    ///
    /// Wizards always render read-only: from the archived snapshot when one exists and was taken
    /// from the same payload, otherwise from the original payload as an incomplete run.
    pub async fn replay(
        &self,
        entry_id: HistoryEntryId,
        command: &str,
        result: &CommandResult,
    ) -> RenderedOutput {
        let stored = match self.hosts.archive.load_record(entry_id).await {
            Ok(record) => record,
            Err(err) => {
                leptos::logging::warn!("wizard archive load for {entry_id} failed: {err}");
                None
            }
        };
        let fallback = fallback_record(entry_id, command, result);
        let record = match (stored, fallback) {
            (Some(stored), Some(fallback)) if !same_wizard(&stored, &fallback) => {
                leptos::logging::warn!("wizard archive for {entry_id} belongs to another run");
                Some(fallback)
            }
            (stored, fallback) => stored.or(fallback),
        };

        dispatch(
            result,
            &DispatchContext {
                entry_id,
                command,
                active_project: None,
                archived: record.as_ref(),
                config: &self.config,
            },
        )
        .output
    }

    /// Reissues the command that opened an archived wizard.
    pub async fn run_again(&self, summary: &ArchivedSummary) -> Option<HistoryEntry> {
        let command = summary.run_again.as_deref()?;
        Some(self.run_command(command).await)
    }

    /// Applies a wizard action and drains the resulting effects, including submission round trips.
    ///
    /// A successful submission also runs the navigation and theme effects of its response.
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the entry has no live wizard or the reducer rejects the
    /// action.
    pub async fn wizard_action(
        &self,
        entry_id: HistoryEntryId,
        action: WizardAction,
    ) -> Result<Vec<Notice>, RuntimeError> {
        let effects = self.apply_wizard(entry_id, action)?;
        Ok(self.run_wizard_effects(entry_id, effects).await)
    }

    /// Applies a wizard action synchronously and returns its effects without running them.
    ///
    /// Views use this to render the updated session (for example, a submission in flight)
    /// before awaiting [`OutputRuntime::run_wizard_effects`].
    ///
    /// # Errors
    ///
    /// Returns [`RuntimeError`] when the entry has no live wizard or the reducer rejects the
    /// action.
    pub fn apply_wizard(
        &self,
        entry_id: HistoryEntryId,
        action: WizardAction,
    ) -> Result<Vec<WizardEffect>, RuntimeError> {
        self.state.borrow_mut().wizards.apply(entry_id, action)
    }

    /// Executes wizard effects in order and returns the notifications they raised.
    pub async fn run_wizard_effects(
        &self,
        entry_id: HistoryEntryId,
        effects: Vec<WizardEffect>,
    ) -> Vec<Notice> {
        let mut queue = VecDeque::from(effects);
        let mut notices = Vec::new();

        while let Some(effect) = queue.pop_front() {
            match effect {
                WizardEffect::Dispatch { ticket, target } => {
                    let outcome = self.submit(&target).await;
                    let response_effects = match &outcome {
                        Ok(result) if !result.is_error() => side_effects(&result.payload),
                        _ => Vec::new(),
                    };
                    let follow_up = match outcome {
                        Ok(result) => WizardAction::SubmissionResolved { ticket, result },
                        Err(message) => WizardAction::SubmissionFailed { ticket, message },
                    };
                    match self.apply_wizard(entry_id, follow_up) {
                        Ok(more) => queue.extend(more),
                        Err(err) => {
                            leptos::logging::warn!("wizard {entry_id} submission dropped: {err}")
                        }
                    }
                    if self.is_completed(entry_id) {
                        self.run_effects(response_effects).await;
                    }
                }
                WizardEffect::PersistRecord(record) => {
                    if let Err(err) = self.hosts.archive.save_record(&record).await {
                        leptos::logging::warn!("wizard archive save for {entry_id} failed: {err}");
                    }
                }
                WizardEffect::Notify { level, message } => notices.push(Notice { level, message }),
            }
        }

        notices
    }

    /// Makes `project_id` the active project, notifying the navigator when it changes.
    pub fn switch_project(&self, project_id: &str) {
        let changed = {
            let mut state = self.state.borrow_mut();
            let changed = state.active_project.as_deref() != Some(project_id);
            state.active_project = Some(project_id.to_string());
            changed
        };
        if changed {
            self.hosts.navigator.switch_project(project_id);
        }
    }

    /// Navigates to an application path.
    pub fn navigate(&self, path: &str) {
        self.hosts.navigator.navigate(path);
    }

    /// Re-applies the theme stored in local preferences. Call once at boot.
    pub async fn restore_theme(&self) -> Option<ThemeActivation> {
        match theme::restore_theme(self.theme_hosts(), &self.config, &self.stylesheet).await {
            Ok(activation) => activation,
            Err(err) => {
                leptos::logging::warn!("stored theme restore failed: {err}");
                None
            }
        }
    }

    async fn submit(&self, target: &SubmissionTarget) -> Result<CommandResult, String> {
        match target {
            SubmissionTarget::CreateProject { data } => {
                self.hosts.executor.create_project(data).await
            }
            SubmissionTarget::ExecuteCommand {
                command,
                project_id,
            } => {
                self.hosts
                    .executor
                    .execute(command, project_id.as_deref())
                    .await
            }
        }
    }

    async fn run_effects(&self, effects: Vec<DispatchEffect>) {
        for effect in effects {
            match effect {
                DispatchEffect::OpenWizard(session) => {
                    self.state.borrow_mut().wizards.open(*session);
                }
                DispatchEffect::SwitchProject(project_id) => self.switch_project(&project_id),
                DispatchEffect::Navigate(path) => self.navigate(&path),
                DispatchEffect::ActivateTheme(theme_id) => {
                    let activated = theme::activate_theme(
                        self.theme_hosts(),
                        &self.config,
                        &self.stylesheet,
                        &theme_id,
                    )
                    .await;
                    match activated {
                        Ok(_) => {}
                        Err(ThemeError::Superseded(_)) => {
                            leptos::logging::log!("theme {theme_id} superseded");
                        }
                        Err(err) => {
                            leptos::logging::warn!("theme {theme_id} activation failed: {err}");
                        }
                    }
                }
            }
        }
    }

    fn theme_hosts(&self) -> ThemeHosts<'_> {
        ThemeHosts {
            registry: self.hosts.themes.as_ref(),
            prefs: self.hosts.prefs.as_ref(),
            styles: self.hosts.styles.as_ref(),
        }
    }

    fn is_completed(&self, entry_id: HistoryEntryId) -> bool {
        self.state
            .borrow()
            .wizards
            .get(entry_id)
            .is_some_and(WizardSession::is_completed)
    }

    fn push_history(&self, entry: HistoryEntry) -> Vec<HistoryEntryId> {
        let mut state = self.state.borrow_mut();
        state.history.push_back(entry);
        self.evict_overflow(&mut state)
    }

    fn evict_overflow(&self, state: &mut RuntimeState) -> Vec<HistoryEntryId> {
        let mut evicted = Vec::new();
        while state.history.len() > self.config.history_capacity {
            if let Some(entry) = state.history.pop_front() {
                state.wizards.remove(entry.id);
                evicted.push(entry.id);
            }
        }
        evicted
    }

    async fn persist_history(&self, evicted: Vec<HistoryEntryId>) {
        let snapshot = {
            let state = self.state.borrow();
            PersistedHistory {
                next_entry: state.next_entry,
                entries: state
                    .history
                    .iter()
                    .map(|entry| PersistedEntry {
                        id: entry.id,
                        command: entry.command.clone(),
                        result: entry.result.clone(),
                    })
                    .collect(),
            }
        };
        if let Err(err) = save_pref_with(
            self.hosts.prefs.as_ref(),
            &self.config.history_pref_key,
            &snapshot,
        )
        .await
        {
            leptos::logging::warn!("history save failed: {err}");
        }
        for entry_id in evicted {
            if let Err(err) = self.hosts.archive.delete_record(entry_id).await {
                leptos::logging::warn!("wizard archive delete for {entry_id} failed: {err}");
            }
        }
    }
}

/// Whether an archived snapshot was taken from the wizard a history entry describes.
fn same_wizard(stored: &WizardRecord, expected: &WizardRecord) -> bool {
    stored.wizard_type == expected.wizard_type
        && stored.origin_command == expected.origin_command
        && stored.steps == expected.steps
}

fn fallback_record(
    entry_id: HistoryEntryId,
    command: &str,
    result: &CommandResult,
) -> Option<WizardRecord> {
    let project_id = result
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.project_id.clone());
    WizardSession::from_payload(entry_id, command, project_id, &result.payload)
        .ok()
        .map(|session| session.to_record())
}

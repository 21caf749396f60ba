//! Terminal app UI: a command line whose results render through the output runtime.
//!
//! Commands run through the injected [`CommandExecutor`]; each result is dispatched into a
//! [`CommandOutput`] view, wizard results become interactive [`WizardPanel`]s, and theme, project,
//! and navigation effects are applied through the browser adapters in [`web_host`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod output_view;
pub mod web_host;
mod wizard_panel;

use std::rc::Rc;

use command_result_contract::{HistoryEntryId, ResultKind};
use leptos::ev::KeyboardEvent;
use leptos::*;
use output_runtime::{
    host::{
        load_pref_with, save_pref_with, CommandExecutor, PrefsStore, PrefsWizardArchive,
        ThemeRegistry,
    },
    HistoryEntry, Notice, OutputConfig, OutputHosts, OutputRuntime,
};
use serde::{Deserialize, Serialize};
use wizard_engine::{ArchivedSummary, WizardAction, WizardSession};

pub use output_view::{ArchivedWizard, CommandOutput};
pub use web_host::{DomStylesheetHost, WebNavigator, WebPrefsStore};
pub use wizard_panel::WizardPanel;

const BUNDLED_CONFIG: &str = include_str!("../output.toml");
const TERMINAL_STATE_KEY: &str = "output.terminal.v1";
const WIZARD_ARCHIVE_PREFIX: &str = "output.wizard.";
const MAX_RECALL: usize = 100;
const MAX_NOTICES: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct TerminalPersistedState {
    recall: Vec<String>,
}

/// Appends a command to the recall list, skipping blanks and immediate repeats.
fn push_recall(recall: &mut Vec<String>, command: &str) {
    let command = command.trim();
    if command.is_empty() || recall.last().is_some_and(|last| last == command) {
        return;
    }
    recall.push(command.to_string());
    if recall.len() > MAX_RECALL {
        let overflow = recall.len() - MAX_RECALL;
        recall.drain(0..overflow);
    }
}

/// Moves the recall cursor. `-1` walks back in time, `1` forward; walking past the newest entry
/// returns to the empty prompt.
fn recall_step(len: usize, cursor: Option<usize>, direction: i32) -> Option<usize> {
    if len == 0 {
        return None;
    }
    match (cursor, direction) {
        (None, -1) => Some(len - 1),
        (Some(index), -1) if index > 0 => Some(index - 1),
        (Some(index), 1) if index + 1 < len => Some(index + 1),
        (Some(_), 1) => None,
        (current, _) => current,
    }
}

/// Uses `config` when given, otherwise the bundled `output.toml`, falling back to defaults when
/// that does not load.
fn resolve_config(config: Option<OutputConfig>) -> OutputConfig {
    config.unwrap_or_else(|| {
        OutputConfig::from_toml_str(BUNDLED_CONFIG).unwrap_or_else(|err| {
            logging::warn!("bundled output config rejected: {err}");
            OutputConfig::default()
        })
    })
}

fn notice_class(level: ResultKind) -> &'static str {
    match level {
        ResultKind::Error => "terminal-notice terminal-notice-error",
        ResultKind::Success => "terminal-notice terminal-notice-success",
        _ => "terminal-notice",
    }
}

#[derive(Clone, Copy)]
/// Reactive handle shared by the terminal views.
pub(crate) struct TerminalContext {
    runtime: StoredValue<Rc<OutputRuntime>>,
    entries: RwSignal<Vec<HistoryEntry>>,
    revision: RwSignal<u64>,
    notices: RwSignal<Vec<Notice>>,
    recall: RwSignal<Vec<String>>,
}

impl TerminalContext {
    /// Live session for an entry. Tracks runtime revisions.
    pub(crate) fn session(self, entry_id: HistoryEntryId) -> Option<WizardSession> {
        self.revision.get();
        self.runtime.with_value(|runtime| runtime.wizard(entry_id))
    }

    fn active_project(self) -> Option<String> {
        self.revision.get();
        self.runtime.with_value(|runtime| runtime.active_project())
    }

    fn refresh(self) {
        let history = self.runtime.with_value(|runtime| runtime.history());
        self.entries.set(history);
        self.revision.update(|revision| *revision += 1);
    }

    fn push_notices(self, notices: Vec<Notice>) {
        if notices.is_empty() {
            return;
        }
        self.notices.update(|current| {
            current.extend(notices);
            if current.len() > MAX_NOTICES {
                let overflow = current.len() - MAX_NOTICES;
                current.drain(0..overflow);
            }
        });
    }

    fn persist_recall(self) {
        let state = TerminalPersistedState {
            recall: self.recall.get_untracked(),
        };
        spawn_local(async move {
            if let Err(err) = save_pref_with(&WebPrefsStore, TERMINAL_STATE_KEY, &state).await {
                logging::warn!("terminal persist failed: {err}");
            }
        });
    }

    /// Runs a command line and appends its result.
    pub(crate) fn run_command(self, command: String) {
        let command = command.trim().to_string();
        if command.is_empty() {
            return;
        }
        self.recall.update(|recall| push_recall(recall, &command));
        self.persist_recall();

        let runtime = self.runtime.get_value();
        spawn_local(async move {
            runtime.run_command(&command).await;
            self.refresh();
        });
    }

    /// Sends an action to a live wizard, rendering the immediate state before host round trips.
    pub(crate) fn wizard_action(self, entry_id: HistoryEntryId, action: WizardAction) {
        let runtime = self.runtime.get_value();
        let effects = match runtime.apply_wizard(entry_id, action) {
            Ok(effects) => effects,
            Err(err) => {
                logging::warn!("wizard action for {entry_id} rejected: {err}");
                return;
            }
        };
        self.revision.update(|revision| *revision += 1);
        if effects.is_empty() {
            return;
        }
        spawn_local(async move {
            let notices = runtime.run_wizard_effects(entry_id, effects).await;
            self.push_notices(notices);
            self.refresh();
        });
    }

    /// Reissues the command behind an archived wizard.
    pub(crate) fn run_again(self, summary: ArchivedSummary) {
        let runtime = self.runtime.get_value();
        spawn_local(async move {
            if runtime.run_again(&summary).await.is_none() {
                logging::warn!("wizard summary has no command to run again");
            }
            self.refresh();
        });
    }

    /// Makes a project the active context.
    pub(crate) fn switch_project(self, project_id: String) {
        self.runtime
            .with_value(|runtime| runtime.switch_project(&project_id));
        self.revision.update(|revision| *revision += 1);
    }

    /// Navigates to an application path.
    pub(crate) fn navigate(self, path: &str) {
        self.runtime.with_value(|runtime| runtime.navigate(path));
    }
}

#[component]
/// Terminal app contents.
///
/// Theme stylesheets, preferences, wizard archives, and navigation use the browser adapters;
/// command execution and the theme registry are injected by the entry layer.
pub fn TerminalApp(
    /// Command interpreter boundary.
    executor: Rc<dyn CommandExecutor>,
    /// Remote theme registry.
    themes: Rc<dyn ThemeRegistry>,
    /// Output runtime configuration; the bundled `output.toml` applies when omitted.
    #[prop(optional)]
    config: Option<OutputConfig>,
    /// Receives project switches requested by results.
    #[prop(optional)]
    on_switch_project: Option<Callback<String>>,
) -> impl IntoView {
    let prefs: Rc<dyn PrefsStore> = Rc::new(WebPrefsStore);
    let hosts = OutputHosts {
        executor,
        themes,
        navigator: Rc::new(WebNavigator::new(on_switch_project)),
        styles: Rc::new(DomStylesheetHost::default()),
        archive: Rc::new(PrefsWizardArchive::new(prefs.clone(), WIZARD_ARCHIVE_PREFIX)),
        prefs,
    };
    let runtime = Rc::new(OutputRuntime::new(resolve_config(config), hosts));

    let terminal = TerminalContext {
        runtime: store_value(runtime.clone()),
        entries: create_rw_signal(Vec::new()),
        revision: create_rw_signal(0),
        notices: create_rw_signal(Vec::new()),
        recall: create_rw_signal(Vec::new()),
    };
    provide_context(terminal);

    let input = create_rw_signal(String::new());
    let recall_cursor = create_rw_signal::<Option<usize>>(None);
    let cleared_through = create_rw_signal::<Option<HistoryEntryId>>(None);

    spawn_local(async move {
        if let Some(activation) = runtime.restore_theme().await {
            logging::log!("restored theme {}", activation.theme_id);
        }
        let restored = runtime.restore_history().await;
        if restored > 0 {
            logging::log!("restored {restored} history entries");
            terminal.refresh();
        }
        match load_pref_with::<_, TerminalPersistedState>(&WebPrefsStore, TERMINAL_STATE_KEY).await
        {
            Ok(Some(state)) => terminal.recall.set(state.recall),
            Ok(None) => {}
            Err(err) => logging::warn!("terminal hydrate failed: {err}"),
        }
    });

    let submit = move || {
        let command = input.get_untracked();
        input.set(String::new());
        recall_cursor.set(None);
        if command.trim().eq_ignore_ascii_case("clear") {
            cleared_through.set(terminal.entries.get_untracked().last().map(|entry| entry.id));
            return;
        }
        terminal.run_command(command);
    };

    let navigate_recall = move |direction: i32| {
        let recall = terminal.recall.get_untracked();
        let next = recall_step(recall.len(), recall_cursor.get_untracked(), direction);
        recall_cursor.set(next);
        input.set(next.and_then(|index| recall.get(index).cloned()).unwrap_or_default());
    };

    let visible_entries = move || {
        let cutoff = cleared_through.get();
        terminal
            .entries
            .get()
            .into_iter()
            .filter(|entry| cutoff.map_or(true, |cutoff| entry.id.0 > cutoff.0))
            .collect::<Vec<_>>()
    };

    view! {
        <div class="app-shell app-terminal-shell">
            <div class="terminal-screen" role="log" aria-live="polite">
                <For each=visible_entries key=|entry| entry.id let:entry>
                    <div class="terminal-entry">
                        <div class="terminal-line terminal-echo">{format!("> {}", entry.command)}</div>
                        <CommandOutput output=entry.output />
                    </div>
                </For>
            </div>

            <Show when=move || !terminal.notices.get().is_empty() fallback=|| ()>
                <div class="terminal-notices" role="status">
                    {move || {
                        terminal
                            .notices
                            .get()
                            .into_iter()
                            .map(|notice| view! { <p class=notice_class(notice.level)>{notice.message}</p> })
                            .collect_view()
                    }}
                    <button
                        type="button"
                        class="app-action"
                        on:click=move |_| terminal.notices.set(Vec::new())
                    >
                        "Dismiss"
                    </button>
                </div>
            </Show>

            <div class="terminal-input-row">
                <label class="terminal-prompt" for="output-terminal-input">">"</label>
                <input
                    id="output-terminal-input"
                    class="terminal-input app-field"
                    type="text"
                    prop:value=move || input.get()
                    on:input=move |ev| input.set(event_target_value(&ev))
                    on:keydown=move |ev: KeyboardEvent| {
                        match ev.key().as_str() {
                            "Enter" => submit(),
                            "ArrowUp" => {
                                ev.prevent_default();
                                navigate_recall(-1);
                            }
                            "ArrowDown" => {
                                ev.prevent_default();
                                navigate_recall(1);
                            }
                            _ => {}
                        }
                    }
                    placeholder="Try: /help"
                    autocomplete="off"
                    spellcheck="false"
                />
                <button type="button" class="terminal-run app-action" on:click=move |_| submit()>
                    "Run"
                </button>
            </div>

            <div class="app-statusbar">
                <span>
                    {move || match terminal.active_project() {
                        Some(project_id) => format!("Project: {project_id}"),
                        None => "No project selected".to_string(),
                    }}
                </span>
                <span>
                    {move || match terminal.entries.with(Vec::len) {
                        1 => "1 entry".to_string(),
                        count => format!("{count} entries"),
                    }}
                </span>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn recall_skips_blanks_and_repeats_and_stays_bounded() {
        let mut recall = Vec::new();
        push_recall(&mut recall, " /help ");
        push_recall(&mut recall, "/help");
        push_recall(&mut recall, "   ");
        push_recall(&mut recall, "/list todos");
        assert_eq!(recall, vec!["/help".to_string(), "/list todos".to_string()]);

        for index in 0..MAX_RECALL + 5 {
            push_recall(&mut recall, &format!("/cmd {index}"));
        }
        assert_eq!(recall.len(), MAX_RECALL);
        assert_eq!(recall.last().map(String::as_str), Some("/cmd 104"));
    }

    #[test]
    fn recall_cursor_walks_back_and_returns_to_prompt() {
        assert_eq!(recall_step(0, None, -1), None);
        assert_eq!(recall_step(3, None, -1), Some(2));
        assert_eq!(recall_step(3, Some(2), -1), Some(1));
        assert_eq!(recall_step(3, Some(0), -1), Some(0));
        assert_eq!(recall_step(3, Some(1), 1), Some(2));
        assert_eq!(recall_step(3, Some(2), 1), None);
        assert_eq!(recall_step(3, None, 1), None);
    }

    #[test]
    fn bundled_config_loads_and_explicit_config_wins() {
        assert_eq!(
            OutputConfig::from_toml_str(BUNDLED_CONFIG),
            Ok(OutputConfig::default())
        );

        let explicit = OutputConfig {
            history_capacity: 10,
            ..OutputConfig::default()
        };
        assert_eq!(resolve_config(Some(explicit.clone())), explicit);
        assert_eq!(resolve_config(None), OutputConfig::default());
    }

    #[test]
    fn persisted_state_round_trips_through_json() {
        let state = TerminalPersistedState {
            recall: vec!["/help".to_string()],
        };
        let raw = serde_json::to_string(&state).expect("serialize");
        assert_eq!(
            serde_json::from_str::<TerminalPersistedState>(&raw).expect("deserialize"),
            state
        );
        assert_eq!(notice_class(ResultKind::Error), "terminal-notice terminal-notice-error");
    }
}

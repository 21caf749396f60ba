use std::{cell::RefCell, collections::VecDeque, rc::Rc};

use command_result_contract::{CommandResult, HistoryEntryId, ResultKind};
use futures::executor::block_on;
use output_runtime::{
    host::{
        CommandExecutor, CustomTheme, HostFuture, MemoryPrefsStore, MemoryStylesheetHost,
        NavigationCall, PrefsStore, PrefsWizardArchive, RecordingNavigator, ThemeRegistry,
    },
    OutputBody, OutputConfig, OutputHosts, OutputRuntime, WizardBody,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use wizard_engine::{ReplayStatus, SummaryValue, WizardAction};

#[derive(Default)]
struct Backend {
    responses: RefCell<VecDeque<CommandResult>>,
    executed: RefCell<Vec<String>>,
    created: RefCell<Vec<Map<String, Value>>>,
}

impl Backend {
    fn respond(&self, result: CommandResult) {
        self.responses.borrow_mut().push_back(result);
    }

    fn next(&self) -> CommandResult {
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| CommandResult::success("ok"))
    }
}

impl CommandExecutor for Backend {
    fn execute<'a>(
        &'a self,
        command: &'a str,
        _project_id: Option<&'a str>,
    ) -> HostFuture<'a, Result<CommandResult, String>> {
        self.executed.borrow_mut().push(command.to_string());
        let result = self.next();
        Box::pin(async move { Ok(result) })
    }

    fn create_project<'a>(
        &'a self,
        data: &'a Map<String, Value>,
    ) -> HostFuture<'a, Result<CommandResult, String>> {
        self.created.borrow_mut().push(data.clone());
        let result = self.next();
        Box::pin(async move { Ok(result) })
    }
}

struct Themes(Vec<CustomTheme>);

impl ThemeRegistry for Themes {
    fn custom_themes(&self) -> HostFuture<'_, Result<Vec<CustomTheme>, String>> {
        let themes = self.0.clone();
        Box::pin(async move { Ok(themes) })
    }

    fn update_theme<'a>(&'a self, _theme_id: &'a str) -> HostFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

struct Harness {
    runtime: OutputRuntime,
    backend: Rc<Backend>,
    navigator: RecordingNavigator,
    styles: MemoryStylesheetHost,
}

fn harness() -> Harness {
    harness_on(MemoryPrefsStore::default())
}

/// Runtime over `prefs`; clones of one store share their contents.
fn harness_on(prefs: MemoryPrefsStore) -> Harness {
    let backend = Rc::new(Backend::default());
    let navigator = RecordingNavigator::default();
    let styles = MemoryStylesheetHost::default();
    let prefs: Rc<dyn PrefsStore> = Rc::new(prefs);
    let ember: CustomTheme = serde_json::from_value(json!({
        "id": "ember",
        "name": "Ember",
        "colors": {
            "primary": "#E4572E", "secondary": "#F3A712", "accent": "#A8C686",
            "neutral": "#29335C", "base-100": "#1B1B1E", "base-200": "#26262B",
            "base-300": "#32323A", "info": "#669BBC", "success": "#4C956C",
            "warning": "#F3A712", "error": "#C1121F"
        }
    }))
    .expect("theme fixture");
    let hosts = OutputHosts {
        executor: backend.clone(),
        themes: Rc::new(Themes(vec![ember])),
        navigator: Rc::new(navigator.clone()),
        styles: Rc::new(styles.clone()),
        archive: Rc::new(PrefsWizardArchive::new(prefs.clone(), "wizard.")),
        prefs,
    };
    Harness {
        runtime: OutputRuntime::new(OutputConfig::default(), hosts),
        backend,
        navigator,
        styles,
    }
}

fn new_project_wizard() -> CommandResult {
    CommandResult::new(ResultKind::Info, "Let's create a project").with_payload(json!({
        "wizardType": "new_project",
        "title": "Create project",
        "steps": [
            { "id": "name", "label": "Name", "type": "text", "required": true },
            { "id": "category", "label": "Category", "type": "select", "options": ["tool", "app"] },
            { "id": "tags", "label": "Tags", "type": "tags" }
        ]
    }))
}

fn delete_note_wizard() -> CommandResult {
    CommandResult::new(ResultKind::Warning, "Confirm deletion").with_payload(json!({
        "wizardType": "delete_note",
        "title": "Delete note",
        "steps": [{ "id": "confirm", "label": "Type the note id", "type": "text", "required": true }]
    }))
}

fn archived(output: &output_runtime::RenderedOutput) -> &wizard_engine::ArchivedSummary {
    match &output.body {
        Some(OutputBody::Wizard(WizardBody::Archived(summary))) => summary,
        other => panic!("expected archived summary, got {other:?}"),
    }
}

fn act(h: &Harness, entry: HistoryEntryId, action: WizardAction) {
    block_on(h.runtime.wizard_action(entry, action)).expect("wizard action");
}

#[test]
fn new_project_wizard_completes_and_replays_with_run_again() {
    let h = harness();
    h.backend.respond(new_project_wizard());
    let entry = block_on(h.runtime.run_command("/new project"));
    assert_eq!(
        entry.output.body,
        Some(OutputBody::Wizard(WizardBody::Live(entry.id)))
    );

    act(&h, entry.id, WizardAction::Input { value: "Demo".to_string() });
    act(&h, entry.id, WizardAction::Next);
    act(&h, entry.id, WizardAction::Input { value: "tool".to_string() });
    act(&h, entry.id, WizardAction::Next);
    for tag in ["alpha", "beta"] {
        act(&h, entry.id, WizardAction::SetTagDraft { value: tag.to_string() });
        act(&h, entry.id, WizardAction::CommitTag);
    }

    h.backend.respond(
        CommandResult::success("Project created")
            .with_payload(json!({ "metadata": { "projectId": "proj-9" }, "redirect": "/projects" })),
    );
    let notices = block_on(h.runtime.wizard_action(entry.id, WizardAction::Submit)).expect("submit");
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].message, "Project created");

    assert_eq!(
        h.backend.created.borrow()[0],
        json!({ "name": "Demo", "category": "tool", "tags": ["alpha", "beta"] })
            .as_object()
            .cloned()
            .expect("object")
    );
    assert_eq!(
        h.navigator.calls(),
        vec![
            NavigationCall::SwitchProject("proj-9".to_string()),
            NavigationCall::Navigate("/projects".to_string()),
        ]
    );

    let replayed = block_on(h.runtime.replay(entry.id, "/new project", &new_project_wizard()));
    let Some(OutputBody::Wizard(WizardBody::Archived(summary))) = replayed.body else {
        panic!("expected archived summary");
    };
    assert_eq!(summary.status, ReplayStatus::Completed);
    assert_eq!(summary.title, "Create project");
    let values: Vec<_> = summary
        .fields
        .iter()
        .map(|field| (field.label.as_str(), field.value.clone()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("Name", SummaryValue::Text("Demo".to_string())),
            ("Category", SummaryValue::Text("tool".to_string())),
            (
                "Tags",
                SummaryValue::Tags(vec!["alpha".to_string(), "beta".to_string()])
            ),
        ]
    );
    assert_eq!(summary.go_to.map(|link| link.path), Some("/projects"));

    let rerun = block_on(h.runtime.run_again(&summary)).expect("run again");
    assert_eq!(rerun.command, "/new project");
    assert_eq!(
        *h.backend.executed.borrow(),
        vec!["/new project".to_string(), "/new project".to_string()]
    );
}

#[test]
fn completed_wizard_rejects_further_edits() {
    let h = harness();
    let entry = block_on(h.runtime.present("/new project", new_project_wizard()));
    act(&h, entry.id, WizardAction::Abandon);

    assert!(block_on(h.runtime.wizard_action(
        entry.id,
        WizardAction::Input {
            value: "late".to_string()
        }
    ))
    .is_err());
    assert_eq!(
        h.runtime.wizard_summary(entry.id).map(|summary| summary.status),
        Some(ReplayStatus::Abandoned)
    );
}

#[test]
fn reapplying_a_custom_theme_keeps_one_stylesheet() {
    let h = harness();
    for _ in 0..3 {
        h.backend
            .respond(CommandResult::success("Theme set").with_payload(json!({ "theme": "custom-ember" })));
        block_on(h.runtime.run_command("/theme custom-ember"));
    }

    let nodes = h.styles.nodes();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].theme_id, "custom-ember");
    assert!(nodes[0].css.contains("[data-theme=\"custom-ember\"]"));
    assert_eq!(h.runtime.injected_theme().as_deref(), Some("custom-ember"));

    h.backend
        .respond(CommandResult::success("Theme set").with_payload(json!({ "theme": { "id": "dracula" } })));
    block_on(h.runtime.run_command("/theme dracula"));
    assert!(h.styles.nodes().is_empty());
    assert_eq!(h.styles.active_theme().as_deref(), Some("dracula"));
}

#[test]
fn restored_history_replays_read_only_and_continues_numbering() {
    let prefs = MemoryPrefsStore::default();
    let first = harness_on(prefs.clone());
    let wizard = block_on(first.runtime.present("/new project", new_project_wizard()));
    act(&first, wizard.id, WizardAction::Input { value: "Demo".to_string() });
    act(&first, wizard.id, WizardAction::Abandon);
    block_on(first.runtime.present("/status", CommandResult::success("All good")));

    let second = harness_on(prefs);
    assert_eq!(block_on(second.runtime.restore_history()), 2);

    let history = second.runtime.history();
    let ids: Vec<_> = history.iter().map(|entry| entry.id).collect();
    assert_eq!(ids, vec![HistoryEntryId(1), HistoryEntryId(2)]);
    let summary = archived(&history[0].output);
    assert_eq!(summary.status, ReplayStatus::Abandoned);
    assert_eq!(summary.run_again.as_deref(), Some("/new project"));
    assert!(second.runtime.wizard(HistoryEntryId(1)).is_none());
    assert_eq!(history[1].output.message, "All good");
    assert!(second.backend.executed.borrow().is_empty());
    assert!(second.navigator.calls().is_empty());

    let next = block_on(second.runtime.run_command("/list todos"));
    assert_eq!(next.id, HistoryEntryId(3));
}

#[test]
fn archive_written_by_another_runtime_is_not_replayed() {
    let prefs = MemoryPrefsStore::default();
    let other = harness_on(prefs.clone());
    let deletion = block_on(other.runtime.present("/delete note n1", delete_note_wizard()));
    act(&other, deletion.id, WizardAction::Abandon);

    let fresh = harness_on(prefs);
    let todo = CommandResult::new(ResultKind::Info, "New todo").with_payload(json!({
        "wizardType": "add_todo",
        "title": "Add todo",
        "steps": [{ "id": "title", "label": "Title", "type": "text", "required": true }]
    }));
    let entry = block_on(fresh.runtime.present("/add todo", todo.clone()));
    assert_eq!(entry.id, deletion.id);

    let replayed = block_on(fresh.runtime.replay(entry.id, "/add todo", &todo));
    let summary = archived(&replayed);
    assert_eq!(summary.wizard_type.as_deref(), Some("add_todo"));
    assert_eq!(summary.status, ReplayStatus::Incomplete);
    assert_eq!(summary.run_again.as_deref(), Some("/add todo"));
}

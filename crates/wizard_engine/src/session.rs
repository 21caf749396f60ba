//! Wizard session state and submission building.

use command_result_contract::{
    HistoryEntryId, StepType, StepValue, WizardRecord, WizardStep,
};
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

use crate::{
    relationships::RelationshipEditor,
    steps::is_step_valid,
    template::{build_command, build_positional},
    WizardError,
};

/// Submission routing family derived from the wizard type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardFamily {
    /// `new_project`: posts raw data to the project creation endpoint.
    NewProject,
    /// `add_*` wizards.
    Add,
    /// `edit_*` wizards.
    Edit,
    /// `edit_relationship_type`: positional command naming two entities.
    RelationshipRetype,
    /// `*_selector` wizards.
    Selector,
    /// `*_confirm` wizards.
    Confirm,
    /// Anything else still goes through the command boundary.
    Other,
}

/// Wizard discriminator such as `add_todo`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WizardType(String);

impl WizardType {
    /// Wraps a raw discriminator.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the discriminator text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Classifies the discriminator.
    pub fn family(&self) -> WizardFamily {
        let raw = self.0.as_str();
        match raw {
            "new_project" => WizardFamily::NewProject,
            "edit_relationship_type" => WizardFamily::RelationshipRetype,
            _ if raw.ends_with("_selector") => WizardFamily::Selector,
            _ if raw.ends_with("_confirm") => WizardFamily::Confirm,
            _ if raw.starts_with("add_") => WizardFamily::Add,
            _ if raw.starts_with("edit_") => WizardFamily::Edit,
            _ => WizardFamily::Other,
        }
    }

    /// Interpreter operation for the discriminator, e.g. `add todo` for `add_todo`.
    pub fn operation(&self) -> String {
        let raw = self.0.as_str();
        let stem = raw
            .strip_suffix("_selector")
            .or_else(|| raw.strip_suffix("_confirm"))
            .unwrap_or(raw);
        stem.replace('_', " ")
    }
}

/// In-flight tracking for the single outstanding submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionState {
    /// Nothing outstanding.
    #[default]
    Idle,
    /// Waiting on the execution boundary.
    InFlight {
        /// Ticket the response must carry to be applied.
        ticket: u64,
    },
}

/// Where a submission goes.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionTarget {
    /// Direct project creation with raw collected data.
    CreateProject {
        /// Merged collected data.
        data: Map<String, Value>,
    },
    /// Generated command executed through the interpreter.
    ExecuteCommand {
        /// Command line.
        command: String,
        /// Project context for execution.
        project_id: Option<String>,
    },
}

/// Live state for one guided flow.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardSession {
    entry_id: HistoryEntryId,
    wizard_type: WizardType,
    title: Option<String>,
    origin_command: String,
    project_id: Option<String>,
    entity_id: Option<String>,
    operation: Option<String>,
    steps: Vec<WizardStep>,
    pub(crate) current_step: usize,
    pub(crate) collected: IndexMap<String, StepValue>,
    pub(crate) tag_draft: String,
    pub(crate) relationships: RelationshipEditor,
    pub(crate) submission: SubmissionState,
    pub(crate) next_ticket: u64,
    pub(crate) completed: bool,
    pub(crate) abandoned: bool,
    pub(crate) last_error: Option<String>,
    pub(crate) response: Option<Value>,
}

impl WizardSession {
    /// Creates a session at step 0.
    pub fn new(
        entry_id: HistoryEntryId,
        wizard_type: WizardType,
        steps: Vec<WizardStep>,
    ) -> Result<Self, WizardError> {
        if steps.is_empty() {
            return Err(WizardError::NoSteps);
        }
        Ok(Self {
            entry_id,
            wizard_type,
            title: None,
            origin_command: String::new(),
            project_id: None,
            entity_id: None,
            operation: None,
            steps,
            current_step: 0,
            collected: IndexMap::new(),
            tag_draft: String::new(),
            relationships: RelationshipEditor::default(),
            submission: SubmissionState::Idle,
            next_ticket: 0,
            completed: false,
            abandoned: false,
            last_error: None,
            response: None,
        })
    }

    /// Builds a session from a wizard-shaped payload.
    ///
    /// Recognized keys: `wizardType`, `steps`, `title`, `entityId`, `operation`, `initialData`.
    pub fn from_payload(
        entry_id: HistoryEntryId,
        origin_command: impl Into<String>,
        project_id: Option<String>,
        payload: &Value,
    ) -> Result<Self, WizardError> {
        let wizard_type = payload
            .get("wizardType")
            .and_then(Value::as_str)
            .filter(|raw| !raw.trim().is_empty())
            .ok_or(WizardError::MissingType)?;
        let steps: Vec<WizardStep> = payload
            .get("steps")
            .cloned()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|err| WizardError::InvalidSteps(err.to_string()))?
            .unwrap_or_default();

        let mut session = Self::new(entry_id, WizardType::new(wizard_type), steps)?;
        session.origin_command = origin_command.into();
        session.project_id = project_id;
        session.title = string_field(payload, "title");
        session.entity_id = string_field(payload, "entityId");
        session.operation = string_field(payload, "operation");

        if let Some(Value::Object(initial)) = payload.get("initialData") {
            for (key, value) in initial {
                if let Some(value) = StepValue::from_json(value) {
                    session.collected.insert(key.clone(), value);
                }
            }
        }
        Ok(session)
    }

    /// Sets the command line re-issued by "run again".
    pub fn with_origin_command(mut self, command: impl Into<String>) -> Self {
        self.origin_command = command.into();
        self
    }

    /// Sets the project context.
    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }

    /// Sets the entity an `edit_*` wizard targets.
    pub fn with_entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Originating history entry.
    pub fn entry_id(&self) -> HistoryEntryId {
        self.entry_id
    }

    /// Wizard discriminator.
    pub fn wizard_type(&self) -> &WizardType {
        &self.wizard_type
    }

    /// Header text from the payload.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Payload title, or the humanized wizard type.
    pub fn heading(&self) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| crate::replay::humanize(self.wizard_type.as_str()))
    }

    /// Original command line.
    pub fn origin_command(&self) -> &str {
        &self.origin_command
    }

    /// Project context.
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Step definitions.
    pub fn steps(&self) -> &[WizardStep] {
        &self.steps
    }

    /// Index of the visible step.
    pub fn current_index(&self) -> usize {
        self.current_step
    }

    /// Visible step definition.
    pub fn current_step(&self) -> &WizardStep {
        // `new` rejects empty step lists and navigation stays in bounds
        &self.steps[self.current_step]
    }

    /// Collected values in insertion order.
    pub fn collected(&self) -> &IndexMap<String, StepValue> {
        &self.collected
    }

    /// Collected value for a step.
    pub fn value(&self, step_id: &str) -> Option<&StepValue> {
        self.collected.get(step_id)
    }

    /// Text bound to both the hex input and the picker of a color step.
    pub fn color_value(&self, step_id: &str) -> Option<&str> {
        self.value(step_id).and_then(StepValue::as_text)
    }

    /// Pending tag text.
    pub fn tag_draft(&self) -> &str {
        &self.tag_draft
    }

    /// Relationship editor for the visible step.
    pub fn relationship_editor(&self) -> &RelationshipEditor {
        &self.relationships
    }

    /// Whether submission succeeded.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the user dismissed the flow.
    pub fn is_abandoned(&self) -> bool {
        self.abandoned
    }

    /// Whether no further mutation is accepted.
    pub fn is_terminal(&self) -> bool {
        self.completed || self.abandoned
    }

    /// Whether a submission is outstanding.
    pub fn is_submitting(&self) -> bool {
        matches!(self.submission, SubmissionState::InFlight { .. })
    }

    /// Ticket of the outstanding submission.
    pub fn in_flight_ticket(&self) -> Option<u64> {
        match self.submission {
            SubmissionState::InFlight { ticket } => Some(ticket),
            SubmissionState::Idle => None,
        }
    }

    /// Message of the last failed submission.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Payload captured from the successful submission.
    pub fn response(&self) -> Option<&Value> {
        self.response.as_ref()
    }

    /// Whether the visible step is the last one.
    pub fn is_last_step(&self) -> bool {
        self.current_step + 1 == self.steps.len()
    }

    /// Whether the visible step's value passes its validity predicate.
    pub fn current_step_valid(&self) -> bool {
        let step = self.current_step();
        is_step_valid(step, self.collected.get(&step.id))
    }

    /// Whether `next` would advance.
    pub fn can_advance(&self) -> bool {
        !self.is_terminal() && !self.is_last_step() && self.current_step_valid()
    }

    /// Whether `back` would move.
    pub fn can_go_back(&self) -> bool {
        !self.is_terminal() && !self.is_submitting() && self.current_step > 0
    }

    /// Whether `submit` would dispatch.
    pub fn can_submit(&self) -> bool {
        !self.is_terminal()
            && !self.is_submitting()
            && self.is_last_step()
            && self
                .steps
                .iter()
                .all(|step| is_step_valid(step, self.collected.get(&step.id)))
    }

    /// Collected data in the order it was entered, followed by the defaults of steps left
    /// empty (in step order).
    pub fn submission_data(&self) -> IndexMap<String, Value> {
        let mut data: IndexMap<String, Value> = self
            .collected
            .iter()
            .filter(|(_, value)| !value.is_blank())
            .map(|(key, value)| (key.clone(), step_value_json(value)))
            .collect();
        for step in &self.steps {
            if data.contains_key(&step.id) {
                continue;
            }
            if let Some(default) = step.default_value.clone().filter(|value| !value.is_null()) {
                data.insert(step.id.clone(), default);
            }
        }
        data
    }

    /// Interpreter operation this wizard submits to.
    pub fn operation(&self) -> String {
        if let Some(operation) = &self.operation {
            return operation.clone();
        }
        let base = self.wizard_type.operation();
        match (self.wizard_type.family(), &self.entity_id) {
            (WizardFamily::Edit, Some(entity_id)) => format!("{base} {entity_id}"),
            _ => base,
        }
    }

    /// Builds the submission for the merged data.
    pub fn build_submission(&self) -> SubmissionTarget {
        let data = self.submission_data();
        match self.wizard_type.family() {
            WizardFamily::NewProject => SubmissionTarget::CreateProject {
                data: data.into_iter().collect(),
            },
            WizardFamily::RelationshipRetype => {
                let text = |keys: &[&str]| {
                    keys.iter()
                        .find_map(|key| data.get(*key).and_then(Value::as_str))
                        .unwrap_or_default()
                        .to_string()
                };
                let source = text(&["source", "sourceName"]);
                let target = text(&["target", "targetName"]);
                let relation_type = text(&["relationType", "type"]);
                SubmissionTarget::ExecuteCommand {
                    command: build_positional(
                        "edit relationship",
                        &[&source, &target, &relation_type],
                    ),
                    project_id: self.project_id.clone(),
                }
            }
            _ => SubmissionTarget::ExecuteCommand {
                command: build_command(&self.operation(), &data),
                project_id: self.project_id.clone(),
            },
        }
    }

    /// Snapshot for history persistence and archived replay.
    pub fn to_record(&self) -> WizardRecord {
        WizardRecord {
            entry_id: Some(self.entry_id),
            wizard_type: Some(self.wizard_type.as_str().to_string()),
            title: self.title.clone(),
            origin_command: (!self.origin_command.is_empty()).then(|| self.origin_command.clone()),
            project_id: self.project_id.clone(),
            steps: self.steps.clone(),
            collected_data: self.collected.clone(),
            completed: self.completed,
            abandoned: self.abandoned,
            response: self.response.clone(),
        }
    }

    pub(crate) fn current_step_type(&self) -> StepType {
        self.current_step().step_type
    }
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload
        .get(key)
        .and_then(Value::as_str)
        .filter(|raw| !raw.trim().is_empty())
        .map(str::to_string)
}

fn step_value_json(value: &StepValue) -> Value {
    match value {
        StepValue::Text(text) => Value::String(text.clone()),
        StepValue::Tags(tags) => json!(tags),
        // client ids are local bookkeeping and never leave the wizard
        StepValue::Relationships(links) => Value::Array(
            links
                .iter()
                .map(|link| {
                    let mut entry = Map::new();
                    entry.insert("targetId".to_string(), json!(link.target_id));
                    entry.insert("relationType".to_string(), json!(link.relation_type));
                    if let Some(description) = &link.description {
                        entry.insert("description".to_string(), json!(description));
                    }
                    Value::Object(entry)
                })
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use command_result_contract::StepType;
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn families_follow_discriminator() {
        let cases = [
            ("new_project", WizardFamily::NewProject),
            ("add_todo", WizardFamily::Add),
            ("edit_note", WizardFamily::Edit),
            ("edit_relationship_type", WizardFamily::RelationshipRetype),
            ("project_selector", WizardFamily::Selector),
            ("delete_note_confirm", WizardFamily::Confirm),
            ("import", WizardFamily::Other),
        ];
        for (raw, family) in cases {
            assert_eq!(WizardType::new(raw).family(), family, "{raw}");
        }
        assert_eq!(WizardType::new("delete_note_confirm").operation(), "delete note");
    }

    #[test]
    fn payload_builds_session_with_prefill() {
        let payload = json!({
            "wizardType": "edit_note",
            "entityId": "n7",
            "title": "Edit note",
            "steps": [
                { "id": "title", "label": "Title", "type": "text", "required": true },
                { "id": "body", "label": "Body", "type": "textarea" }
            ],
            "initialData": { "title": "Old title" }
        });
        let session =
            WizardSession::from_payload(HistoryEntryId(3), "/edit note n7", None, &payload)
                .expect("session");

        assert_eq!(session.current_index(), 0);
        assert_eq!(session.value("title"), Some(&StepValue::Text("Old title".to_string())));
        assert_eq!(session.operation(), "edit note n7");
        assert!(session.can_advance());
    }

    #[test]
    fn payload_without_type_or_steps_is_rejected() {
        assert_eq!(
            WizardSession::from_payload(HistoryEntryId(1), "", None, &json!({ "steps": [] })),
            Err(WizardError::MissingType)
        );
        assert_eq!(
            WizardSession::from_payload(
                HistoryEntryId(1),
                "",
                None,
                &json!({ "wizardType": "add_todo", "steps": [] })
            ),
            Err(WizardError::NoSteps)
        );
        assert!(matches!(
            WizardSession::from_payload(
                HistoryEntryId(1),
                "",
                None,
                &json!({ "wizardType": "add_todo", "steps": [{ "id": "x" }] })
            ),
            Err(WizardError::InvalidSteps(_))
        ));
    }

    #[test]
    fn submission_data_keeps_entry_order_then_fills_defaults() {
        let mut session = WizardSession::new(
            HistoryEntryId(1),
            WizardType::new("add_todo"),
            vec![
                WizardStep::new("title", "Title", StepType::Text).required(),
                WizardStep::new("priority", "Priority", StepType::Select)
                    .with_options(["low", "medium", "high"])
                    .with_default(json!("medium")),
                WizardStep::new("notes", "Notes", StepType::Textarea),
            ],
        )
        .expect("session");
        session
            .collected
            .insert("notes".to_string(), StepValue::Text("later".to_string()));
        session
            .collected
            .insert("title".to_string(), StepValue::Text("Write docs".to_string()));

        let data = session.submission_data();
        assert_eq!(
            data.keys().map(String::as_str).collect::<Vec<_>>(),
            vec!["notes", "title", "priority"]
        );
        assert_eq!(
            session.build_submission(),
            SubmissionTarget::ExecuteCommand {
                command: "/add todo --notes=\"later\" --title=\"Write docs\" --priority=\"medium\""
                    .to_string(),
                project_id: None,
            }
        );
    }

    #[test]
    fn relationship_retype_uses_positional_command() {
        let mut session = WizardSession::new(
            HistoryEntryId(1),
            WizardType::new("edit_relationship_type"),
            vec![WizardStep::new("relationType", "Type", StepType::Select)
                .with_options(["uses", "calls"])],
        )
        .expect("session");
        session
            .collected
            .insert("source".to_string(), StepValue::Text("Auth".to_string()));
        session
            .collected
            .insert("target".to_string(), StepValue::Text("Db".to_string()));
        session
            .collected
            .insert("relationType".to_string(), StepValue::Text("calls".to_string()));

        assert_eq!(
            session.build_submission(),
            SubmissionTarget::ExecuteCommand {
                command: "/edit relationship \"Auth\" \"Db\" \"calls\"".to_string(),
                project_id: None,
            }
        );
    }
}

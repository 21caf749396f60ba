//! Shared command-result contracts used by the output dispatcher, wizard engine, and terminal UI.
//!
//! This crate is intentionally runtime-agnostic. It defines the serializable result envelope the
//! backend command interpreter emits, the wizard step/relationship vocabulary, and the persisted
//! wizard record shape without depending on Leptos, browser APIs, or runtime internals.

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

use std::{fmt, str::FromStr};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of one terminal history entry. Wizard sessions are keyed by the entry that
/// produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HistoryEntryId(pub u64);

impl fmt::Display for HistoryEntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// Result category reported by the command interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// Command completed and mutated or produced something.
    Success,
    /// Command failed.
    Error,
    /// Command completed with caveats.
    Warning,
    /// Informational output.
    Info,
    /// Pure data listing.
    Data,
    /// Interpreter is asking the user for more input. The message is the prompt.
    Prompt,
}

impl ResultKind {
    /// Returns a stable icon token for the result line.
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Success => "check",
            Self::Error => "cross",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Data => "table",
            Self::Prompt => "prompt",
        }
    }

    /// Returns whether payload content may render below the message.
    pub const fn renders_body(self) -> bool {
        !matches!(self, Self::Prompt)
    }

    /// Returns a stable lowercase token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
            Self::Data => "data",
            Self::Prompt => "prompt",
        }
    }
}

/// Project context attached to a result for navigation affordances.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResultMetadata {
    /// Project the command ran against.
    pub project_id: Option<String>,
    /// Display name of that project.
    pub project_name: Option<String>,
    /// Action token, such as `created` or `switched`.
    pub action: Option<String>,
}

/// One result emitted by the backend command interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    /// Result category.
    #[serde(rename = "type", alias = "kind")]
    pub kind: ResultKind,
    /// Human-readable headline. Always rendered.
    #[serde(default)]
    pub message: String,
    /// Untyped payload whose shape selects the renderer.
    #[serde(default, alias = "data")]
    pub payload: Value,
    /// Optional project context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResultMetadata>,
    /// Follow-up commands offered as quick actions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl CommandResult {
    /// Creates a result with no payload.
    pub fn new(kind: ResultKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: Value::Null,
            metadata: None,
            suggestions: Vec::new(),
        }
    }

    /// Successful result.
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ResultKind::Success, message)
    }

    /// Error result.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ResultKind::Error, message)
    }

    /// Replaces the payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Replaces the metadata.
    pub fn with_metadata(mut self, metadata: ResultMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Replaces the suggestion list.
    pub fn with_suggestions<I, S>(mut self, suggestions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.suggestions = suggestions.into_iter().map(Into::into).collect();
        self
    }

    /// Returns whether the interpreter reported a failure.
    pub fn is_error(&self) -> bool {
        self.kind == ResultKind::Error
    }
}

/// Input widget family for one wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepType {
    /// Single-line text.
    Text,
    /// Multi-line text.
    Textarea,
    /// One of a fixed option list.
    Select,
    /// `#RRGGBB` color.
    Color,
    /// Ordered, deduplicated tag list.
    Tags,
    /// Typed links to other entities.
    Relationships,
}

/// Entity that a relationship may point to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationTarget {
    /// Backend identifier.
    pub id: String,
    /// Display name.
    #[serde(default, alias = "title")]
    pub name: String,
    /// Optional entity category.
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// One wizard step definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardStep {
    /// Key under which the entered value is collected.
    pub id: String,
    /// Prompt label.
    #[serde(default)]
    pub label: String,
    /// Widget family.
    #[serde(rename = "type")]
    pub step_type: StepType,
    /// Whether a value is needed to advance.
    #[serde(default)]
    pub required: bool,
    /// Allowed values for select steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// Link targets for relationship steps.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub available_targets: Vec<RelationTarget>,
    /// Value used at submission when the user entered nothing.
    #[serde(default, alias = "value", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    /// Placeholder hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl WizardStep {
    /// Creates a step with no options or defaults.
    pub fn new(id: impl Into<String>, label: impl Into<String>, step_type: StepType) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            step_type,
            required: false,
            options: Vec::new(),
            available_targets: Vec::new(),
            default_value: None,
            placeholder: None,
        }
    }

    /// Marks the step as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the select option list.
    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = options.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the relationship target list.
    pub fn with_targets(mut self, targets: Vec<RelationTarget>) -> Self {
        self.available_targets = targets;
        self
    }

    /// Sets the submission default.
    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// Closed set of directed relationship types between entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// Source uses target.
    Uses,
    /// Source implements target.
    Implements,
    /// Source extends target.
    Extends,
    /// Source depends on target.
    DependsOn,
    /// Source calls target.
    Calls,
    /// Source contains target.
    Contains,
    /// Source mentions target.
    Mentions,
    /// Source is similar to target.
    Similar,
}

impl RelationType {
    /// Every relationship type in menu order.
    pub const ALL: [Self; 8] = [
        Self::Uses,
        Self::Implements,
        Self::Extends,
        Self::DependsOn,
        Self::Calls,
        Self::Contains,
        Self::Mentions,
        Self::Similar,
    ];

    /// Returns the wire token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uses => "uses",
            Self::Implements => "implements",
            Self::Extends => "extends",
            Self::DependsOn => "depends_on",
            Self::Calls => "calls",
            Self::Contains => "contains",
            Self::Mentions => "mentions",
            Self::Similar => "similar",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == raw.trim())
            .ok_or_else(|| format!("unknown relationship type `{raw}`"))
    }
}

/// One typed link from the entity being edited to a target entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    /// Client-generated (`local-N`) or backend-assigned identifier.
    pub id: String,
    /// Target entity identifier.
    pub target_id: String,
    /// Link type.
    pub relation_type: RelationType,
    /// Optional free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Value collected for one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StepValue {
    /// Text, textarea, select, and color steps.
    Text(String),
    /// Tag steps.
    Tags(Vec<String>),
    /// Relationship steps.
    Relationships(Vec<Relationship>),
}

impl StepValue {
    /// Returns whether the value counts as "nothing entered".
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Tags(tags) => tags.is_empty(),
            Self::Relationships(links) => links.is_empty(),
        }
    }

    /// Returns the text form when this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Converts a JSON default into a step value.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Bool(_) | Value::Number(_) => Some(Self::Text(value.to_string())),
            Value::Array(_) | Value::Object(_) => serde_json::from_value(value.clone()).ok(),
        }
    }
}

/// Persisted snapshot of a wizard session as stored in terminal history.
///
/// Every field is optional on read so that older or truncated history entries still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WizardRecord {
    /// History entry that produced the wizard.
    pub entry_id: Option<HistoryEntryId>,
    /// Wizard discriminator.
    pub wizard_type: Option<String>,
    /// Display title.
    pub title: Option<String>,
    /// Command line that originally produced the wizard payload.
    pub origin_command: Option<String>,
    /// Active project when the wizard ran.
    pub project_id: Option<String>,
    /// Step definitions.
    pub steps: Vec<WizardStep>,
    /// Values entered by the user.
    pub collected_data: IndexMap<String, StepValue>,
    /// Whether submission succeeded.
    pub completed: bool,
    /// Whether the user dismissed the wizard before submitting.
    pub abandoned: bool,
    /// Payload captured from the submission response.
    pub response: Option<Value>,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn command_result_reads_interpreter_wire_shape() {
        let raw = json!({
            "type": "success",
            "message": "Todo added",
            "data": { "todo": { "id": "t1" } },
            "metadata": { "projectId": "p1", "projectName": "Demo", "action": "created" },
            "suggestions": ["/todos"]
        });

        let result: CommandResult = serde_json::from_value(raw).expect("parse result");
        assert_eq!(result.kind, ResultKind::Success);
        assert_eq!(result.payload, json!({ "todo": { "id": "t1" } }));
        assert_eq!(
            result.metadata.and_then(|meta| meta.project_name),
            Some("Demo".to_string())
        );
        assert_eq!(result.suggestions, vec!["/todos".to_string()]);
    }

    #[test]
    fn prompt_kind_never_renders_a_body() {
        assert!(!ResultKind::Prompt.renders_body());
        assert!(ResultKind::Data.renders_body());
    }

    #[test]
    fn relation_type_parses_wire_tokens() {
        assert_eq!("depends_on".parse::<RelationType>(), Ok(RelationType::DependsOn));
        assert!("owns".parse::<RelationType>().is_err());
    }

    #[test]
    fn truncated_wizard_record_still_loads() {
        let record: WizardRecord =
            serde_json::from_value(json!({ "wizardType": "add_todo" })).expect("parse record");
        assert_eq!(record.wizard_type.as_deref(), Some("add_todo"));
        assert!(record.steps.is_empty());
        assert!(!record.completed);
    }

    #[test]
    fn step_value_blankness_follows_variant() {
        assert!(StepValue::Text("   ".to_string()).is_blank());
        assert!(StepValue::Tags(Vec::new()).is_blank());
        assert!(!StepValue::Tags(vec!["a".to_string()]).is_blank());
    }
}

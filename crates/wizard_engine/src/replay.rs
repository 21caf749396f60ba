//! Read-only summaries of completed, abandoned, or in-progress wizard records.
//!
//! The projection never mutates its input and never consults live state, so loading the same
//! record twice yields equal summaries. Records persisted by older builds may lack any field;
//! missing pieces render as [`MISSING_PLACEHOLDER`] instead of failing the whole summary.

use command_result_contract::{
    HistoryEntryId, RelationTarget, Relationship, StepValue, WizardRecord, WizardStep,
};
use serde_json::Value;

use crate::routes::{page_for, PageLink};

/// Text shown for a field the record does not carry.
pub const MISSING_PLACEHOLDER: &str = "(not provided)";
/// Title used when the record names neither a title nor a wizard type.
pub const UNKNOWN_WIZARD_TITLE: &str = "Unknown wizard";

/// Outcome shown in the summary header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStatus {
    /// Submission succeeded.
    Completed,
    /// Dismissed before submission.
    Abandoned,
    /// Persisted mid-flow.
    Incomplete,
}

/// Rendered value of one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryValue {
    /// Single text value.
    Text(String),
    /// Tag list.
    Tags(Vec<String>),
    /// One line per relationship, e.g. `depends_on Storage`.
    Relationships(Vec<String>),
    /// Nothing recorded.
    Missing,
}

impl SummaryValue {
    /// Plain-text rendering used by the terminal view.
    pub fn display(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Tags(tags) => tags.join(", "),
            Self::Relationships(lines) => lines.join("; "),
            Self::Missing => MISSING_PLACEHOLDER.to_string(),
        }
    }
}

/// One labelled row of the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryField {
    /// Step id or collected key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Rendered value.
    pub value: SummaryValue,
}

/// Read-only view model for an archived wizard.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchivedSummary {
    /// History entry, when recorded.
    pub entry_id: Option<HistoryEntryId>,
    /// Header text.
    pub title: String,
    /// Wizard discriminator, when recorded.
    pub wizard_type: Option<String>,
    /// Outcome.
    pub status: ReplayStatus,
    /// Rows in step order, then any collected keys without a step.
    pub fields: Vec<SummaryField>,
    /// Original command re-issued by "run again".
    pub run_again: Option<String>,
    /// Page link from the fixed lookup.
    pub go_to: Option<PageLink>,
    /// Response payload captured at completion.
    pub response: Option<Value>,
}

/// Projects a persisted record into its read-only summary.
pub fn render_archived(record: &WizardRecord) -> ArchivedSummary {
    let status = if record.completed {
        ReplayStatus::Completed
    } else if record.abandoned {
        ReplayStatus::Abandoned
    } else {
        ReplayStatus::Incomplete
    };

    let mut fields: Vec<SummaryField> = record
        .steps
        .iter()
        .map(|step| SummaryField {
            key: step.id.clone(),
            label: step_label(step),
            value: step_summary(step, record),
        })
        .collect();
    for (key, value) in &record.collected_data {
        if record.steps.iter().any(|step| step.id == *key) {
            continue;
        }
        fields.push(SummaryField {
            key: key.clone(),
            label: key.clone(),
            value: value_summary(value, &[]),
        });
    }

    let wizard_type = record
        .wizard_type
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty());
    let title = record
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .or_else(|| wizard_type.map(humanize))
        .unwrap_or_else(|| UNKNOWN_WIZARD_TITLE.to_string());

    ArchivedSummary {
        entry_id: record.entry_id,
        title,
        wizard_type: wizard_type.map(str::to_string),
        status,
        fields,
        run_again: record
            .origin_command
            .as_deref()
            .map(str::trim)
            .filter(|command| !command.is_empty())
            .map(str::to_string),
        go_to: wizard_type.and_then(page_for),
        response: record.response.clone(),
    }
}

fn step_label(step: &WizardStep) -> String {
    if step.label.trim().is_empty() {
        step.id.clone()
    } else {
        step.label.clone()
    }
}

fn step_summary(step: &WizardStep, record: &WizardRecord) -> SummaryValue {
    let entered = record
        .collected_data
        .get(&step.id)
        .filter(|value| !value.is_blank());
    if let Some(value) = entered {
        return value_summary(value, &step.available_targets);
    }
    step.default_value
        .as_ref()
        .and_then(StepValue::from_json)
        .filter(|value| !value.is_blank())
        .map(|value| value_summary(&value, &step.available_targets))
        .unwrap_or(SummaryValue::Missing)
}

fn value_summary(value: &StepValue, targets: &[RelationTarget]) -> SummaryValue {
    match value {
        _ if value.is_blank() => SummaryValue::Missing,
        StepValue::Text(text) => SummaryValue::Text(text.clone()),
        StepValue::Tags(tags) => SummaryValue::Tags(tags.clone()),
        StepValue::Relationships(links) => SummaryValue::Relationships(
            links.iter().map(|link| relationship_line(link, targets)).collect(),
        ),
    }
}

fn relationship_line(link: &Relationship, targets: &[RelationTarget]) -> String {
    let target = targets
        .iter()
        .find(|target| target.id == link.target_id)
        .map(|target| target.name.as_str())
        .filter(|name| !name.is_empty())
        .unwrap_or(&link.target_id);
    match &link.description {
        Some(description) => format!("{} {target} ({description})", link.relation_type),
        None => format!("{} {target}", link.relation_type),
    }
}

pub(crate) fn humanize(wizard_type: &str) -> String {
    let words = wizard_type.replace('_', " ");
    let mut chars = words.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

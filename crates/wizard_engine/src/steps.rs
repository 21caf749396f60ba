//! Per-step input acceptance and validity rules.

use command_result_contract::{StepType, StepValue, WizardStep};
use serde_json::Value;
use theme_palette::is_strict_hex;

/// Returns whether a free-text edit may replace the step's current value.
///
/// Rejected edits leave the previous value in place; the caller does not surface an error.
pub fn accepts_text(step: &WizardStep, raw: &str) -> bool {
    match step.step_type {
        StepType::Text | StepType::Textarea => true,
        StepType::Select => step.options.iter().any(|option| option == raw),
        StepType::Color => is_strict_hex(raw),
        StepType::Tags | StepType::Relationships => false,
    }
}

/// Validity predicate gating `next` and `submit`.
///
/// A step left empty is satisfied by a usable `default_value`, since submission fills the
/// default in.
pub fn is_step_valid(step: &WizardStep, value: Option<&StepValue>) -> bool {
    match value.filter(|value| !value.is_blank()) {
        Some(value) => entered_is_valid(step, value),
        None if step.step_type == StepType::Tags => default_satisfies(step),
        None => !step.required || default_satisfies(step),
    }
}

fn entered_is_valid(step: &WizardStep, value: &StepValue) -> bool {
    match (step.step_type, value) {
        (StepType::Tags, StepValue::Tags(_)) => true,
        (StepType::Select | StepType::Color, StepValue::Text(raw)) => accepts_text(step, raw),
        (StepType::Select | StepType::Color | StepType::Tags, _) => false,
        (StepType::Text | StepType::Textarea | StepType::Relationships, _) => true,
    }
}

fn default_satisfies(step: &WizardStep) -> bool {
    match (&step.default_value, step.step_type) {
        (None | Some(Value::Null), _) => false,
        (Some(Value::String(raw)), StepType::Select | StepType::Color) => accepts_text(step, raw),
        (Some(Value::String(raw)), StepType::Text | StepType::Textarea) => !raw.trim().is_empty(),
        (Some(Value::Array(items)), StepType::Tags | StepType::Relationships) => !items.is_empty(),
        (Some(Value::Bool(_) | Value::Number(_)), StepType::Text | StepType::Textarea) => true,
        _ => false,
    }
}

/// Trims `draft` and appends it unless it is empty or already present (case-sensitive).
///
/// Returns whether the list changed.
pub fn commit_tag(tags: &mut Vec<String>, draft: &str) -> bool {
    let tag = draft.trim();
    if tag.is_empty() || tags.iter().any(|existing| existing == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}

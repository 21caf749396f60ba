//! Guided multi-step wizard engine for command results.
//!
//! A [`WizardSession`] is created from a wizard-shaped result payload and mutated only through
//! [`reduce_wizard`]. Submissions are rendered back into interpreter command syntax by
//! [`template`], and persisted [`WizardRecord`](command_result_contract::WizardRecord) snapshots
//! are projected into read-only summaries by [`replay`].

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

pub mod reducer;
pub mod relationships;
pub mod replay;
pub mod routes;
pub mod session;
pub mod steps;
pub mod template;

use command_result_contract::StepType;
use thiserror::Error;

pub use reducer::{reduce_wizard, WizardAction, WizardEffect};
pub use relationships::{ConfirmRejection, RelationshipDraft, RelationshipEditor};
pub use replay::{render_archived, ArchivedSummary, ReplayStatus, SummaryField, SummaryValue};
pub use routes::{page_for, PageLink};
pub use session::{SubmissionState, SubmissionTarget, WizardFamily, WizardSession, WizardType};
pub use template::{build_command, build_positional, parse_flags, ParsedCommand, TemplateError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Wizard construction and transition errors.
pub enum WizardError {
    /// The session is completed or abandoned.
    #[error("wizard is read-only")]
    ReadOnly,
    /// The payload has no `wizardType`.
    #[error("wizard payload is missing `wizardType`")]
    MissingType,
    /// The payload has no steps.
    #[error("wizard has no steps")]
    NoSteps,
    /// The `steps` array does not deserialize.
    #[error("invalid wizard steps: {0}")]
    InvalidSteps(String),
    /// The action does not apply to the visible step.
    #[error("`{action}` does not apply to a {step_type:?} step")]
    StepTypeMismatch {
        /// Rejected action.
        action: &'static str,
        /// Visible step type.
        step_type: StepType,
    },
}

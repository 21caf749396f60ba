//! Wizard actions, side-effect intents, and the transition function.

use command_result_contract::{
    CommandResult, RelationType, Relationship, ResultKind, StepType, StepValue, WizardRecord,
};
use indexmap::IndexMap;

use crate::{
    relationships::RelationshipEditor,
    session::{SubmissionState, SubmissionTarget, WizardSession},
    steps::{accepts_text, commit_tag},
    WizardError,
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_wizard`].
pub enum WizardAction {
    /// Free-text edit of a text, textarea, select, or color step.
    Input {
        /// New raw value.
        value: String,
    },
    /// Replace the pending tag text.
    SetTagDraft {
        /// Draft text.
        value: String,
    },
    /// Commit the pending tag (add button or Enter).
    CommitTag,
    /// Remove a committed tag.
    RemoveTag {
        /// Tag to remove.
        tag: String,
    },
    /// Open a relationship draft.
    BeginRelationship,
    /// Choose the draft target.
    SetRelationshipTarget {
        /// Target entity id.
        target_id: String,
    },
    /// Choose the draft link type.
    SetRelationshipType {
        /// Link type.
        relation_type: RelationType,
    },
    /// Edit the draft note.
    SetRelationshipDescription {
        /// Note text.
        description: String,
    },
    /// Move the draft into the step's list.
    ConfirmRelationship,
    /// Discard the draft.
    CancelRelationship,
    /// Remove a listed relationship before submission.
    RemoveRelationship {
        /// Client or backend id.
        id: String,
    },
    /// Advance one step.
    Next,
    /// Go back one step.
    Back,
    /// Escape key; behaves like [`WizardAction::Back`].
    Escape,
    /// Submit from the last step.
    Submit,
    /// The execution boundary answered a submission.
    SubmissionResolved {
        /// Ticket issued with the dispatch.
        ticket: u64,
        /// Interpreter result.
        result: CommandResult,
    },
    /// The execution boundary failed to answer.
    SubmissionFailed {
        /// Ticket issued with the dispatch.
        ticket: u64,
        /// Transport error text.
        message: String,
    },
    /// Dismiss the wizard without submitting.
    Abandon,
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_wizard`] for the output runtime to execute.
pub enum WizardEffect {
    /// Send the submission to the execution boundary and report back with `ticket`.
    Dispatch {
        /// Ticket the response must echo.
        ticket: u64,
        /// Endpoint and body.
        target: SubmissionTarget,
    },
    /// Persist the session snapshot into history.
    PersistRecord(WizardRecord),
    /// Show an ephemeral notification.
    Notify {
        /// Severity.
        level: ResultKind,
        /// Text.
        message: String,
    },
}

/// Applies a [`WizardAction`] to a session and collects resulting side effects.
///
/// Late submission responses whose ticket does not match the outstanding one are dropped without
/// error. Edits and navigation are ignored while a submission is in flight. Invalid `next` and
/// `submit` requests are no-ops; callers gate their controls on
/// [`WizardSession::can_advance`] and [`WizardSession::can_submit`].
///
/// # Errors
///
/// Returns [`WizardError::ReadOnly`] for mutations of a completed or abandoned session and
/// [`WizardError::StepTypeMismatch`] when an action does not fit the visible step.
pub fn reduce_wizard(
    session: &mut WizardSession,
    action: WizardAction,
) -> Result<Vec<WizardEffect>, WizardError> {
    let mut effects = Vec::new();

    match action {
        WizardAction::SubmissionResolved { ticket, result } => {
            if session.in_flight_ticket() != Some(ticket) {
                return Ok(effects);
            }
            session.submission = SubmissionState::Idle;
            if result.is_error() {
                session.last_error = Some(result.message.clone());
                effects.push(WizardEffect::Notify {
                    level: ResultKind::Error,
                    message: result.message,
                });
            } else {
                session.completed = true;
                session.last_error = None;
                session.response = Some(result.payload);
                effects.push(WizardEffect::PersistRecord(session.to_record()));
                effects.push(WizardEffect::Notify {
                    level: ResultKind::Success,
                    message: result.message,
                });
            }
            return Ok(effects);
        }
        WizardAction::SubmissionFailed { ticket, message } => {
            if session.in_flight_ticket() != Some(ticket) {
                return Ok(effects);
            }
            session.submission = SubmissionState::Idle;
            session.last_error = Some(message.clone());
            effects.push(WizardEffect::Notify {
                level: ResultKind::Error,
                message,
            });
            return Ok(effects);
        }
        WizardAction::Escape if session.is_terminal() => return Ok(effects),
        _ if session.is_terminal() => return Err(WizardError::ReadOnly),
        WizardAction::Abandon => {
            session.abandoned = true;
            session.submission = SubmissionState::Idle;
            reset_drafts(session);
            effects.push(WizardEffect::PersistRecord(session.to_record()));
            return Ok(effects);
        }
        _ if session.is_submitting() => return Ok(effects),
        _ => {}
    }

    match action {
        WizardAction::Input { value } => {
            let step = session.current_step();
            if matches!(step.step_type, StepType::Tags | StepType::Relationships) {
                return Err(mismatch(session, "input"));
            }
            if accepts_text(step, &value) {
                let step_id = step.id.clone();
                session.collected.insert(step_id, StepValue::Text(value));
            }
        }
        WizardAction::SetTagDraft { value } => {
            expect_step(session, StepType::Tags, "tag draft")?;
            session.tag_draft = value;
        }
        WizardAction::CommitTag => {
            expect_step(session, StepType::Tags, "commit tag")?;
            let draft = std::mem::take(&mut session.tag_draft);
            let step_id = session.current_step().id.clone();
            update_tags(&mut session.collected, &step_id, |tags| commit_tag(tags, &draft));
        }
        WizardAction::RemoveTag { tag } => {
            expect_step(session, StepType::Tags, "remove tag")?;
            let step_id = session.current_step().id.clone();
            update_tags(&mut session.collected, &step_id, |tags| {
                let before = tags.len();
                tags.retain(|existing| *existing != tag);
                tags.len() != before
            });
        }
        WizardAction::BeginRelationship => {
            expect_step(session, StepType::Relationships, "begin relationship")?;
            session.relationships.begin();
        }
        WizardAction::SetRelationshipTarget { target_id } => {
            expect_step(session, StepType::Relationships, "relationship target")?;
            session.relationships.set_target(target_id);
        }
        WizardAction::SetRelationshipType { relation_type } => {
            expect_step(session, StepType::Relationships, "relationship type")?;
            session.relationships.set_relation_type(relation_type);
        }
        WizardAction::SetRelationshipDescription { description } => {
            expect_step(session, StepType::Relationships, "relationship description")?;
            session.relationships.set_description(description);
        }
        WizardAction::ConfirmRelationship => {
            expect_step(session, StepType::Relationships, "confirm relationship")?;
            let step = session.current_step().clone();
            let mut links = relationship_list(&session.collected, &step.id);
            if session
                .relationships
                .confirm(&mut links, &step.available_targets)
                .is_ok()
            {
                session
                    .collected
                    .insert(step.id, StepValue::Relationships(links));
            }
        }
        WizardAction::CancelRelationship => {
            expect_step(session, StepType::Relationships, "cancel relationship")?;
            session.relationships.cancel();
        }
        WizardAction::RemoveRelationship { id } => {
            expect_step(session, StepType::Relationships, "remove relationship")?;
            let step_id = session.current_step().id.clone();
            let mut links = relationship_list(&session.collected, &step_id);
            if RelationshipEditor::remove(&mut links, &id) {
                session
                    .collected
                    .insert(step_id, StepValue::Relationships(links));
            }
        }
        WizardAction::Next => {
            if session.can_advance() {
                session.current_step += 1;
                reset_drafts(session);
            }
        }
        WizardAction::Back | WizardAction::Escape => {
            if session.can_go_back() {
                session.current_step -= 1;
                reset_drafts(session);
            }
        }
        WizardAction::Submit => {
            if session.can_submit() {
                session.next_ticket += 1;
                let ticket = session.next_ticket;
                session.submission = SubmissionState::InFlight { ticket };
                session.last_error = None;
                effects.push(WizardEffect::Dispatch {
                    ticket,
                    target: session.build_submission(),
                });
            }
        }
        WizardAction::SubmissionResolved { .. }
        | WizardAction::SubmissionFailed { .. }
        | WizardAction::Abandon => {}
    }

    Ok(effects)
}

fn reset_drafts(session: &mut WizardSession) {
    session.tag_draft.clear();
    session.relationships.cancel();
}

fn expect_step(
    session: &WizardSession,
    expected: StepType,
    action: &'static str,
) -> Result<(), WizardError> {
    if session.current_step_type() == expected {
        Ok(())
    } else {
        Err(mismatch(session, action))
    }
}

fn mismatch(session: &WizardSession, action: &'static str) -> WizardError {
    WizardError::StepTypeMismatch {
        action,
        step_type: session.current_step_type(),
    }
}

fn update_tags(
    collected: &mut IndexMap<String, StepValue>,
    step_id: &str,
    update: impl FnOnce(&mut Vec<String>) -> bool,
) {
    let mut tags = match collected.get(step_id) {
        Some(StepValue::Tags(tags)) => tags.clone(),
        _ => Vec::new(),
    };
    if update(&mut tags) {
        collected.insert(step_id.to_string(), StepValue::Tags(tags));
    }
}

fn relationship_list(collected: &IndexMap<String, StepValue>, step_id: &str) -> Vec<Relationship> {
    match collected.get(step_id) {
        Some(StepValue::Relationships(links)) => links.clone(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use command_result_contract::{HistoryEntryId, RelationTarget, WizardStep};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::session::WizardType;

    fn apply(session: &mut WizardSession, action: WizardAction) -> Vec<WizardEffect> {
        reduce_wizard(session, action).expect("reduce")
    }

    fn input(session: &mut WizardSession, value: &str) {
        apply(
            session,
            WizardAction::Input {
                value: value.to_string(),
            },
        );
    }

    fn three_step_session() -> WizardSession {
        WizardSession::new(
            HistoryEntryId(9),
            WizardType::new("add_note"),
            vec![
                WizardStep::new("title", "Title", StepType::Text).required(),
                WizardStep::new("color", "Color", StepType::Color),
                WizardStep::new("tags", "Tags", StepType::Tags),
            ],
        )
        .expect("session")
        .with_origin_command("/add note")
    }

    fn submit(session: &mut WizardSession) -> u64 {
        let effects = apply(session, WizardAction::Submit);
        match effects.as_slice() {
            [WizardEffect::Dispatch { ticket, .. }] => *ticket,
            other => panic!("expected dispatch, got {other:?}"),
        }
    }

    #[test]
    fn navigation_keeps_collected_data() {
        let mut session = three_step_session();
        apply(&mut session, WizardAction::Back);
        assert_eq!(session.current_index(), 0);

        apply(&mut session, WizardAction::Next);
        assert_eq!(session.current_index(), 0, "required title blocks next");

        input(&mut session, "Release notes");
        apply(&mut session, WizardAction::Next);
        apply(&mut session, WizardAction::Next);
        assert_eq!(session.current_index(), 2);
        apply(&mut session, WizardAction::Next);
        assert_eq!(session.current_index(), 2, "next is disallowed on the last step");

        apply(&mut session, WizardAction::Back);
        apply(&mut session, WizardAction::Escape);
        assert_eq!(session.current_index(), 0);
        assert_eq!(
            session.value("title"),
            Some(&StepValue::Text("Release notes".to_string()))
        );
    }

    #[test]
    fn required_step_with_default_advances_and_submits_the_default() {
        let mut session = WizardSession::new(
            HistoryEntryId(4),
            WizardType::new("add_todo"),
            vec![
                WizardStep::new("priority", "Priority", StepType::Select)
                    .with_options(["low", "medium", "high"])
                    .required()
                    .with_default(json!("medium")),
                WizardStep::new("title", "Title", StepType::Text).required(),
            ],
        )
        .expect("session")
        .with_origin_command("/add todo");

        assert!(session.can_advance());
        apply(&mut session, WizardAction::Next);
        assert_eq!(session.current_index(), 1);

        input(&mut session, "Ship it");
        assert!(session.can_submit());
        assert_eq!(
            session.submission_data().get("priority"),
            Some(&json!("medium"))
        );
    }

    #[test]
    fn color_step_rejects_partial_hex_silently() {
        let mut session = three_step_session();
        input(&mut session, "Note");
        apply(&mut session, WizardAction::Next);

        input(&mut session, "#22C55E");
        input(&mut session, "#22C");
        input(&mut session, "green");
        assert_eq!(session.color_value("color"), Some("#22C55E"));
    }

    #[test]
    fn typed_hex_replaces_picked_color_once_complete() {
        let mut session = three_step_session();
        input(&mut session, "Note");
        apply(&mut session, WizardAction::Next);
        input(&mut session, "#22C55E");

        let typed = "#1d4ed8";
        for end in 1..typed.len() {
            input(&mut session, &typed[..end]);
            assert_eq!(session.color_value("color"), Some("#22C55E"));
        }
        input(&mut session, typed);
        assert_eq!(session.color_value("color"), Some("#1d4ed8"));
        assert!(session.can_advance());
    }

    #[test]
    fn tags_commit_once_and_gate_submit() {
        let mut session = three_step_session();
        input(&mut session, "Note");
        apply(&mut session, WizardAction::Next);
        apply(&mut session, WizardAction::Next);
        assert!(!session.can_submit());

        for draft in ["alpha", "alpha", " beta "] {
            apply(
                &mut session,
                WizardAction::SetTagDraft {
                    value: draft.to_string(),
                },
            );
            apply(&mut session, WizardAction::CommitTag);
        }
        assert_eq!(
            session.value("tags"),
            Some(&StepValue::Tags(vec!["alpha".to_string(), "beta".to_string()]))
        );
        assert_eq!(session.tag_draft(), "");

        apply(
            &mut session,
            WizardAction::RemoveTag {
                tag: "beta".to_string(),
            },
        );
        assert_eq!(
            session.value("tags"),
            Some(&StepValue::Tags(vec!["alpha".to_string()]))
        );
        assert!(session.can_submit());
    }

    #[test]
    fn tag_actions_on_text_step_are_rejected() {
        let mut session = three_step_session();
        assert_eq!(
            reduce_wizard(&mut session, WizardAction::CommitTag),
            Err(WizardError::StepTypeMismatch {
                action: "commit tag",
                step_type: StepType::Text,
            })
        );
    }

    fn ready_to_submit() -> WizardSession {
        let mut session = three_step_session();
        input(&mut session, "Note");
        apply(&mut session, WizardAction::Next);
        apply(&mut session, WizardAction::Next);
        apply(
            &mut session,
            WizardAction::SetTagDraft {
                value: "alpha".to_string(),
            },
        );
        apply(&mut session, WizardAction::CommitTag);
        session
    }

    #[test]
    fn submit_dispatches_once_and_blocks_navigation() {
        let mut session = ready_to_submit();
        let ticket = submit(&mut session);
        assert!(session.is_submitting());
        assert_eq!(apply(&mut session, WizardAction::Submit), Vec::new());

        apply(&mut session, WizardAction::Escape);
        assert_eq!(session.current_index(), 2, "escape is suppressed while in flight");

        let effects = apply(
            &mut session,
            WizardAction::SubmissionResolved {
                ticket,
                result: CommandResult::success("Note added").with_payload(json!({ "id": "n1" })),
            },
        );
        assert!(session.is_completed());
        assert_eq!(session.response(), Some(&json!({ "id": "n1" })));
        assert!(matches!(effects[0], WizardEffect::PersistRecord(ref record) if record.completed));
        assert_eq!(
            effects[1],
            WizardEffect::Notify {
                level: ResultKind::Success,
                message: "Note added".to_string(),
            }
        );
    }

    #[test]
    fn completed_session_is_read_only() {
        let mut session = ready_to_submit();
        let ticket = submit(&mut session);
        apply(
            &mut session,
            WizardAction::SubmissionResolved {
                ticket,
                result: CommandResult::success("ok"),
            },
        );

        assert_eq!(
            reduce_wizard(&mut session, WizardAction::Back),
            Err(WizardError::ReadOnly)
        );
        assert_eq!(reduce_wizard(&mut session, WizardAction::Escape), Ok(Vec::new()));
    }

    #[test]
    fn error_result_keeps_last_step_and_data() {
        let mut session = ready_to_submit();
        let ticket = submit(&mut session);
        let effects = apply(
            &mut session,
            WizardAction::SubmissionResolved {
                ticket,
                result: CommandResult::error("Title already exists"),
            },
        );

        assert!(!session.is_completed());
        assert!(!session.is_submitting());
        assert_eq!(session.current_index(), 2);
        assert_eq!(session.last_error(), Some("Title already exists"));
        assert_eq!(session.value("title"), Some(&StepValue::Text("Note".to_string())));
        assert_eq!(
            effects,
            vec![WizardEffect::Notify {
                level: ResultKind::Error,
                message: "Title already exists".to_string(),
            }]
        );

        let retry = submit(&mut session);
        assert_ne!(retry, ticket);
    }

    #[test]
    fn late_response_after_abandon_is_ignored() {
        let mut session = ready_to_submit();
        let ticket = submit(&mut session);
        let effects = apply(&mut session, WizardAction::Abandon);
        assert!(matches!(effects.as_slice(), [WizardEffect::PersistRecord(record)] if record.abandoned));

        let late = reduce_wizard(
            &mut session,
            WizardAction::SubmissionResolved {
                ticket,
                result: CommandResult::success("Note added"),
            },
        );
        assert_eq!(late, Ok(Vec::new()));
        assert!(!session.is_completed());
        assert!(session.is_abandoned());
    }

    #[test]
    fn transport_failure_with_stale_ticket_is_ignored() {
        let mut session = ready_to_submit();
        let ticket = submit(&mut session);
        apply(
            &mut session,
            WizardAction::SubmissionFailed {
                ticket,
                message: "offline".to_string(),
            },
        );
        let second = submit(&mut session);

        let stale = apply(
            &mut session,
            WizardAction::SubmissionFailed {
                ticket,
                message: "offline again".to_string(),
            },
        );
        assert!(stale.is_empty());
        assert_eq!(session.in_flight_ticket(), Some(second));
    }

    #[test]
    fn relationship_step_collects_confirmed_links() {
        let mut session = WizardSession::new(
            HistoryEntryId(2),
            WizardType::new("add_component"),
            vec![WizardStep::new("relationships", "Links", StepType::Relationships).with_targets(
                vec![RelationTarget {
                    id: "c2".to_string(),
                    name: "Storage".to_string(),
                    kind: None,
                }],
            )],
        )
        .expect("session");

        apply(&mut session, WizardAction::BeginRelationship);
        apply(
            &mut session,
            WizardAction::SetRelationshipTarget {
                target_id: "c2".to_string(),
            },
        );
        apply(
            &mut session,
            WizardAction::SetRelationshipType {
                relation_type: RelationType::DependsOn,
            },
        );
        apply(&mut session, WizardAction::ConfirmRelationship);

        let Some(StepValue::Relationships(links)) = session.value("relationships") else {
            panic!("relationships collected");
        };
        assert_eq!(links.len(), 1);
        let id = links[0].id.clone();
        assert!(session.relationship_editor().draft().is_none());

        apply(&mut session, WizardAction::BeginRelationship);
        apply(&mut session, WizardAction::CancelRelationship);
        apply(&mut session, WizardAction::RemoveRelationship { id });
        assert_eq!(
            session.value("relationships"),
            Some(&StepValue::Relationships(Vec::new()))
        );
    }
}

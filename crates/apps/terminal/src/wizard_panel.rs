//! Interactive wizard panel bound to a live session in the output runtime.
//!
//! The panel skeleton re-renders only when the step index or terminal flag changes; field values
//! and button states read the session reactively so typing never rebuilds the focused input.

use command_result_contract::{
    HistoryEntryId, RelationTarget, RelationType, Relationship, StepType, StepValue, WizardStep,
};
use leptos::ev::KeyboardEvent;
use leptos::*;
use wizard_engine::{render_archived, WizardAction, WizardSession};

use crate::{output_view::ArchivedWizard, TerminalContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    index: usize,
    terminal: bool,
}

type Snapshot = Memo<Option<WizardSession>>;

#[component]
/// Live wizard for one history entry.
pub fn WizardPanel(
    /// Entry whose session this panel drives.
    entry_id: HistoryEntryId,
) -> impl IntoView {
    let terminal = expect_context::<TerminalContext>();
    let snapshot: Snapshot = create_memo(move |_| terminal.session(entry_id));
    let frame = create_memo(move |_| {
        snapshot.with(|session| {
            session.as_ref().map(|session| Frame {
                index: session.current_index(),
                terminal: session.is_terminal(),
            })
        })
    });

    view! {
        <div
            class="wizard-panel"
            on:keydown=move |ev: KeyboardEvent| {
                if ev.key() == "Escape" {
                    ev.prevent_default();
                    terminal.wizard_action(entry_id, WizardAction::Escape);
                }
            }
        >
            {move || match frame.get() {
                None => view! {
                    <p class="output-empty">"This wizard is no longer available."</p>
                }
                .into_view(),
                Some(Frame { terminal: true, .. }) => snapshot
                    .with_untracked(|session| {
                        session.as_ref().map(|session| render_archived(&session.to_record()))
                    })
                    .map(|summary| view! { <ArchivedWizard summary=summary /> })
                    .into_view(),
                Some(Frame { index, .. }) => step_frame(terminal, entry_id, snapshot, index),
            }}
        </div>
    }
}

fn step_frame(
    terminal: TerminalContext,
    entry_id: HistoryEntryId,
    snapshot: Snapshot,
    index: usize,
) -> View {
    let Some(session) = snapshot.get_untracked() else {
        return ().into_view();
    };
    let Some(step) = session.steps().get(index).cloned() else {
        return ().into_view();
    };
    let total = session.steps().len();
    let last = index + 1 == total;
    let heading = session.heading();

    let flag = move |pick: fn(&WizardSession) -> bool| {
        move || snapshot.with(|session| session.as_ref().is_some_and(pick))
    };
    let cannot_advance = flag(|session| !session.can_advance());
    let cannot_submit = flag(|session| !session.can_submit());
    let cannot_go_back = flag(|session| !session.can_go_back());
    let submitting = flag(WizardSession::is_submitting);
    let error = move || {
        snapshot.with(|session| {
            session
                .as_ref()
                .and_then(WizardSession::last_error)
                .map(str::to_string)
        })
    };
    let send = move |action: WizardAction| terminal.wizard_action(entry_id, action);
    let label = step.label.clone();
    let required = step.required;

    view! {
        <div class="wizard-step">
            <div class="wizard-head">
                <strong>{heading}</strong>
                <span class="wizard-progress">{format!("Step {} of {total}", index + 1)}</span>
            </div>
            <label class="wizard-label">
                {label}
                {required.then(|| view! { <span class="wizard-required">" *"</span> })}
            </label>
            {step_input(terminal, entry_id, snapshot, step)}
            {move || error().map(|message| view! { <p class="wizard-error" role="alert">{message}</p> })}
            <div class="wizard-actions">
                <button
                    type="button"
                    class="app-action"
                    disabled=cannot_go_back
                    on:click=move |_| send(WizardAction::Back)
                >
                    "Back"
                </button>
                {if last {
                    view! {
                        <button
                            type="button"
                            class="app-action wizard-submit"
                            disabled=cannot_submit
                            on:click=move |_| send(WizardAction::Submit)
                        >
                            {move || if submitting() { "Submitting" } else { "Submit" }}
                        </button>
                    }
                    .into_view()
                } else {
                    view! {
                        <button
                            type="button"
                            class="app-action"
                            disabled=cannot_advance
                            on:click=move |_| send(WizardAction::Next)
                        >
                            "Next"
                        </button>
                    }
                    .into_view()
                }}
                <button
                    type="button"
                    class="app-action wizard-cancel"
                    on:click=move |_| send(WizardAction::Abandon)
                >
                    "Cancel"
                </button>
            </div>
        </div>
    }
    .into_view()
}

fn step_input(
    terminal: TerminalContext,
    entry_id: HistoryEntryId,
    snapshot: Snapshot,
    step: WizardStep,
) -> View {
    let send = move |action: WizardAction| terminal.wizard_action(entry_id, action);
    let step_id = step.id.clone();
    let text = move || {
        snapshot.with(|session| {
            session
                .as_ref()
                .and_then(|session| session.value(&step_id))
                .and_then(StepValue::as_text)
                .unwrap_or_default()
                .to_string()
        })
    };
    let placeholder = step.placeholder.clone().unwrap_or_default();

    match step.step_type {
        StepType::Text => view! {
            <input
                type="text"
                class="app-field wizard-input"
                placeholder=placeholder
                prop:value=text
                on:input=move |ev| send(WizardAction::Input { value: event_target_value(&ev) })
            />
        }
        .into_view(),
        StepType::Textarea => view! {
            <textarea
                class="app-field wizard-input"
                placeholder=placeholder
                prop:value=text
                on:input=move |ev| send(WizardAction::Input { value: event_target_value(&ev) })
            ></textarea>
        }
        .into_view(),
        StepType::Select => view! {
            <select
                class="app-field wizard-input"
                prop:value=text
                on:change=move |ev| send(WizardAction::Input { value: event_target_value(&ev) })
            >
                <option value="">"Choose an option"</option>
                {step
                    .options
                    .into_iter()
                    .map(|option| view! { <option value=option.clone()>{option}</option> })
                    .collect_view()}
            </select>
        }
        .into_view(),
        StepType::Color => {
            let hex = text.clone();
            let placeholder = step.placeholder.unwrap_or_else(|| "#RRGGBB".to_string());
            view! {
                <div class="wizard-color">
                    <input
                        type="color"
                        prop:value=text
                        on:input=move |ev| send(WizardAction::Input { value: event_target_value(&ev) })
                    />
                    // Partial hex is ignored by the session until it reaches #RRGGBB.
                    <input
                        type="text"
                        class="app-field wizard-input wizard-color-hex"
                        maxlength="7"
                        spellcheck="false"
                        placeholder=placeholder
                        prop:value=hex
                        on:input=move |ev| send(WizardAction::Input { value: event_target_value(&ev) })
                    />
                </div>
            }
            .into_view()
        }
        StepType::Tags => tags_input(terminal, entry_id, snapshot, step.id),
        StepType::Relationships => {
            relationships_input(terminal, entry_id, snapshot, step.id, step.available_targets)
        }
    }
}

fn tags_input(
    terminal: TerminalContext,
    entry_id: HistoryEntryId,
    snapshot: Snapshot,
    step_id: String,
) -> View {
    let send = move |action: WizardAction| terminal.wizard_action(entry_id, action);
    let tags = move || {
        snapshot.with(|session| match session.as_ref().and_then(|s| s.value(&step_id)) {
            Some(StepValue::Tags(tags)) => tags.clone(),
            _ => Vec::new(),
        })
    };
    let draft = move || {
        snapshot.with(|session| {
            session
                .as_ref()
                .map(|session| session.tag_draft().to_string())
                .unwrap_or_default()
        })
    };

    view! {
        <div class="wizard-tags">
            <div class="wizard-tag-list">
                {move || {
                    tags()
                        .into_iter()
                        .map(|tag| {
                            let remove = tag.clone();
                            view! {
                                <span class="output-chip">
                                    {tag}
                                    <button
                                        type="button"
                                        class="wizard-chip-remove"
                                        aria-label="Remove tag"
                                        on:click=move |_| send(WizardAction::RemoveTag { tag: remove.clone() })
                                    >
                                        "x"
                                    </button>
                                </span>
                            }
                        })
                        .collect_view()
                }}
            </div>
            <input
                type="text"
                class="app-field wizard-input"
                placeholder="Add a tag"
                prop:value=draft
                on:input=move |ev| send(WizardAction::SetTagDraft { value: event_target_value(&ev) })
                on:keydown=move |ev: KeyboardEvent| {
                    if ev.key() == "Enter" {
                        ev.prevent_default();
                        send(WizardAction::CommitTag);
                    }
                }
            />
            <button type="button" class="app-action" on:click=move |_| send(WizardAction::CommitTag)>
                "Add"
            </button>
        </div>
    }
    .into_view()
}

fn relationships_input(
    terminal: TerminalContext,
    entry_id: HistoryEntryId,
    snapshot: Snapshot,
    step_id: String,
    targets: Vec<RelationTarget>,
) -> View {
    let send = move |action: WizardAction| terminal.wizard_action(entry_id, action);
    let targets = store_value(targets);
    let links = {
        let step_id = step_id.clone();
        move || {
            snapshot.with(|session| {
                match session.as_ref().and_then(|s| s.value(&step_id)) {
                    Some(StepValue::Relationships(links)) => links.clone(),
                    _ => Vec::new(),
                }
            })
        }
    };
    let draft_open = create_memo(move |_| {
        snapshot.with(|session| {
            session
                .as_ref()
                .is_some_and(|session| session.relationship_editor().draft().is_some())
        })
    });
    let cannot_confirm = {
        let links = links.clone();
        move || {
            let current = links();
            snapshot.with(|session| {
                session.as_ref().map_or(true, |session| {
                    targets.with_value(|targets| {
                        session
                            .relationship_editor()
                            .check(&current, targets)
                            .is_err()
                    })
                })
            })
        }
    };
    let draft_field = move |read: fn(&WizardSession) -> String| {
        move || snapshot.with(|session| session.as_ref().map(read).unwrap_or_default())
    };
    let draft_target = draft_field(|session| {
        session
            .relationship_editor()
            .draft()
            .and_then(|draft| draft.target_id.clone())
            .unwrap_or_default()
    });
    let draft_type = draft_field(|session| {
        session
            .relationship_editor()
            .draft()
            .map(|draft| draft.relation_type.as_str().to_string())
            .unwrap_or_default()
    });
    let draft_description = draft_field(|session| {
        session
            .relationship_editor()
            .draft()
            .map(|draft| draft.description.clone())
            .unwrap_or_default()
    });

    view! {
        <div class="wizard-relationships">
            <ul class="wizard-relationship-list">
                {move || {
                    links()
                        .into_iter()
                        .map(|link| relationship_row(link, targets, send))
                        .collect_view()
                }}
            </ul>
            {move || {
                if draft_open.get() {
                    view! {
                        <div class="wizard-relationship-editor">
                            <select
                                class="app-field"
                                prop:value=draft_target
                                on:change=move |ev| {
                                    send(WizardAction::SetRelationshipTarget { target_id: event_target_value(&ev) })
                                }
                            >
                                <option value="">"Choose a target"</option>
                                {targets
                                    .get_value()
                                    .into_iter()
                                    .map(|target| view! { <option value=target.id.clone()>{target_label(&target)}</option> })
                                    .collect_view()}
                            </select>
                            <select
                                class="app-field"
                                prop:value=draft_type
                                on:change=move |ev| {
                                    match event_target_value(&ev).parse::<RelationType>() {
                                        Ok(relation_type) => send(WizardAction::SetRelationshipType { relation_type }),
                                        Err(err) => logging::warn!("relationship type rejected: {err}"),
                                    }
                                }
                            >
                                {RelationType::ALL
                                    .into_iter()
                                    .map(|kind| view! { <option value=kind.as_str()>{kind.as_str()}</option> })
                                    .collect_view()}
                            </select>
                            <input
                                type="text"
                                class="app-field"
                                placeholder="Description (optional)"
                                prop:value=draft_description
                                on:input=move |ev| {
                                    send(WizardAction::SetRelationshipDescription { description: event_target_value(&ev) })
                                }
                            />
                            <button
                                type="button"
                                class="app-action"
                                disabled=cannot_confirm.clone()
                                on:click=move |_| send(WizardAction::ConfirmRelationship)
                            >
                                "Add link"
                            </button>
                            <button
                                type="button"
                                class="app-action"
                                on:click=move |_| send(WizardAction::CancelRelationship)
                            >
                                "Cancel"
                            </button>
                        </div>
                    }
                    .into_view()
                } else {
                    view! {
                        <button
                            type="button"
                            class="app-action"
                            on:click=move |_| send(WizardAction::BeginRelationship)
                        >
                            "Add relationship"
                        </button>
                    }
                    .into_view()
                }
            }}
        </div>
    }
    .into_view()
}

fn relationship_row(
    link: Relationship,
    targets: StoredValue<Vec<RelationTarget>>,
    send: impl Fn(WizardAction) + Copy + 'static,
) -> impl IntoView {
    let target = targets.with_value(|targets| {
        targets
            .iter()
            .find(|target| target.id == link.target_id)
            .map(target_label)
            .unwrap_or_else(|| link.target_id.clone())
    });
    let id = link.id.clone();
    view! {
        <li class="wizard-relationship">
            <span class="output-chip">{link.relation_type.as_str()}</span>
            <span>{target}</span>
            {link.description.map(|description| view! { <small>{description}</small> })}
            <button
                type="button"
                class="wizard-chip-remove"
                aria-label="Remove relationship"
                on:click=move |_| send(WizardAction::RemoveRelationship { id: id.clone() })
            >
                "x"
            </button>
        </li>
    }
}

/// Option text for a relationship target.
pub(crate) fn target_label(target: &RelationTarget) -> String {
    match (&target.kind, target.name.trim().is_empty()) {
        (_, true) => target.id.clone(),
        (Some(kind), false) => format!("{} ({kind})", target.name),
        (None, false) => target.name.clone(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn target_labels_fall_back_to_ids() {
        let named = RelationTarget {
            id: "c1".to_string(),
            name: "Storage".to_string(),
            kind: Some("component".to_string()),
        };
        let unnamed = RelationTarget {
            id: "c2".to_string(),
            name: " ".to_string(),
            kind: None,
        };
        assert_eq!(target_label(&named), "Storage (component)");
        assert_eq!(target_label(&unnamed), "c2");
    }
}

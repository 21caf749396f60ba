//! Leptos rendering of [`RenderedOutput`] view models.

use leptos::*;
use output_runtime::views::{
    BatchItem, ConfirmationView, DetailKind, DetailView, Field, HelpSection, KeyValueRow,
    ListView, OutputBody, ProjectContext, RelationshipRow, RenderedOutput, SearchView, StackGroup,
    TagRow, ThemeChangeView, ThemeRow, WizardBody,
};
use wizard_engine::{ArchivedSummary, ReplayStatus};

use crate::{wizard_panel::WizardPanel, TerminalContext};

#[component]
/// One command result: icon, message, body, project link, and suggestions.
pub fn CommandOutput(
    /// View model to render.
    output: RenderedOutput,
) -> impl IntoView {
    let context = output.context.clone().map(project_link);
    let suggestions = (!output.suggestions.is_empty()).then(|| suggestion_row(output.suggestions));
    let body = output.body.map(body_view);

    view! {
        <div class=format!("command-output command-output-{}", output.kind.as_str())>
            <div class="command-output-head">
                <span class="command-output-icon" aria-hidden="true">{output.icon}</span>
                <span class="command-output-message">{output.message}</span>
            </div>
            {body}
            {context}
            {suggestions}
        </div>
    }
}

fn body_view(body: OutputBody) -> View {
    match body {
        OutputBody::Wizard(WizardBody::Live(entry_id)) => {
            view! { <WizardPanel entry_id=entry_id /> }.into_view()
        }
        OutputBody::Wizard(WizardBody::Archived(summary)) => {
            view! { <ArchivedWizard summary=summary /> }.into_view()
        }
        OutputBody::Confirmation(confirmation) => confirmation_view(confirmation),
        OutputBody::Batch(items) => batch_view(items),
        OutputBody::Help(sections) => help_view(sections),
        OutputBody::Search(search) => search_view(search),
        OutputBody::List(list) => list_view(list),
        OutputBody::Relationships(rows) => relationships_view(rows),
        OutputBody::Themes(rows) => themes_view(rows),
        OutputBody::Tags(tags) => tags_view(tags),
        OutputBody::Detail(detail) => detail_view(detail),
        OutputBody::Stats(fields) => fields_view("output-stats", fields),
        OutputBody::Settings(fields) => fields_view("output-settings", fields),
        OutputBody::Stack(groups) => stack_view(groups),
        OutputBody::Content(text) => view! { <pre class="output-content">{text}</pre> }.into_view(),
        OutputBody::ThemeChange(change) => theme_change_view(change),
        OutputBody::KeyValue(rows) => key_value_view(rows),
        OutputBody::Raw(text) => view! { <pre class="output-raw">{text}</pre> }.into_view(),
    }
}

fn project_link(context: ProjectContext) -> View {
    let ProjectContext {
        project_id,
        label,
        action,
    } = context;
    let terminal = expect_context::<TerminalContext>();
    view! {
        <div class="output-project">
            {action.map(|action| view! { <span class="output-project-action">{action}</span> })}
            <button
                type="button"
                class="app-action output-project-link"
                on:click=move |_| terminal.switch_project(project_id.clone())
            >
                {label}
            </button>
        </div>
    }
    .into_view()
}

fn suggestion_row(suggestions: Vec<String>) -> View {
    let terminal = expect_context::<TerminalContext>();
    view! {
        <div class="output-suggestions">
            {suggestions
                .into_iter()
                .map(|suggestion| {
                    let command = suggestion.clone();
                    view! {
                        <button
                            type="button"
                            class="app-action output-suggestion"
                            on:click=move |_| terminal.run_command(command.clone())
                        >
                            {suggestion}
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
    .into_view()
}

fn confirmation_view(confirmation: ConfirmationView) -> View {
    let terminal = expect_context::<TerminalContext>();
    let ConfirmationView {
        prompt,
        confirm_command,
        cancel_command,
        destructive,
    } = confirmation;
    let confirm_class = if destructive {
        "app-action output-confirm output-confirm-destructive"
    } else {
        "app-action output-confirm"
    };
    view! {
        <div class="output-confirmation">
            {prompt.map(|prompt| view! { <p class="output-confirmation-prompt">{prompt}</p> })}
            <button
                type="button"
                class=confirm_class
                on:click=move |_| terminal.run_command(confirm_command.clone())
            >
                "Confirm"
            </button>
            {cancel_command.map(|cancel| view! {
                <button
                    type="button"
                    class="app-action output-cancel"
                    on:click=move |_| terminal.run_command(cancel.clone())
                >
                    "Cancel"
                </button>
            })}
        </div>
    }
    .into_view()
}

fn batch_view(items: Vec<BatchItem>) -> View {
    view! {
        <ol class="output-batch">
            {items
                .into_iter()
                .map(|item| view! {
                    <li class="output-batch-item">
                        {item.command.map(|command| view! { <code class="output-batch-command">{command}</code> })}
                        <CommandOutput output=item.output />
                    </li>
                })
                .collect_view()}
        </ol>
    }
    .into_view()
}

fn help_view(sections: Vec<HelpSection>) -> View {
    view! {
        <div class="output-help">
            {sections
                .into_iter()
                .map(|section| view! {
                    <section class="output-help-section">
                        <h4>{section.category}</h4>
                        <dl>
                            {section
                                .commands
                                .into_iter()
                                .map(|command| {
                                    let aliases = (!command.aliases.is_empty())
                                        .then(|| format!("aliases: {}", command.aliases.join(", ")));
                                    view! {
                                        <dt><code>{command.syntax}</code></dt>
                                        <dd>
                                            {command.description}
                                            {aliases.map(|aliases| view! { <small>{aliases}</small> })}
                                            {command
                                                .examples
                                                .into_iter()
                                                .map(|example| view! { <code class="output-help-example">{example}</code> })
                                                .collect_view()}
                                        </dd>
                                    }
                                })
                                .collect_view()}
                        </dl>
                    </section>
                })
                .collect_view()}
        </div>
    }
    .into_view()
}

fn search_view(search: SearchView) -> View {
    let summary = format!("{} result(s) for \"{}\"", search.total, search.query);
    view! {
        <div class="output-search">
            <p class="output-search-summary">{summary}</p>
            <ul>
                {search
                    .hits
                    .into_iter()
                    .map(|hit| view! {
                        <li class="output-search-hit">
                            {hit.kind.map(|kind| view! { <span class="output-chip">{kind}</span> })}
                            <strong>{hit.title}</strong>
                            {hit.snippet.map(|snippet| view! { <p>{snippet}</p> })}
                        </li>
                    })
                    .collect_view()}
            </ul>
        </div>
    }
    .into_view()
}

fn list_view(list: ListView) -> View {
    if list.rows.is_empty() {
        return view! { <p class="output-empty">{list.kind.empty_text()}</p> }.into_view();
    }
    let truncated = (list.truncated > 0).then(|| format!("{} more not shown", list.truncated));
    view! {
        <div class="output-list">
            <h4>{format!("{} ({})", list.kind.heading(), list.rows.len() + list.truncated)}</h4>
            <ul>
                {list
                    .rows
                    .into_iter()
                    .map(|row| view! {
                        <li class="output-list-row">
                            <span class="output-list-title">{row.title}</span>
                            {row.status.map(|status| view! { <span class="output-chip output-status">{status}</span> })}
                            {row
                                .badges
                                .into_iter()
                                .map(|badge| view! { <span class="output-chip">{badge}</span> })
                                .collect_view()}
                            {row.detail.map(|detail| view! { <p class="output-list-detail">{detail}</p> })}
                        </li>
                    })
                    .collect_view()}
            </ul>
            {truncated.map(|text| view! { <p class="output-truncated">{text}</p> })}
        </div>
    }
    .into_view()
}

fn relationships_view(rows: Vec<RelationshipRow>) -> View {
    if rows.is_empty() {
        return view! { <p class="output-empty">"No relationships."</p> }.into_view();
    }
    view! {
        <table class="output-relationships">
            <tbody>
                {rows
                    .into_iter()
                    .map(|row| view! {
                        <tr>
                            <td>{row.source}</td>
                            <td><span class="output-chip">{row.relation_type}</span></td>
                            <td>{row.target}</td>
                            <td>{row.description.unwrap_or_default()}</td>
                        </tr>
                    })
                    .collect_view()}
            </tbody>
        </table>
    }
    .into_view()
}

fn themes_view(rows: Vec<ThemeRow>) -> View {
    let terminal = expect_context::<TerminalContext>();
    view! {
        <ul class="output-themes">
            {rows
                .into_iter()
                .map(|row| {
                    let command = format!("/theme {}", row.id);
                    let class = if row.active { "output-theme output-theme-active" } else { "output-theme" };
                    view! {
                        <li class=class>
                            <button
                                type="button"
                                class="app-action"
                                on:click=move |_| terminal.run_command(command.clone())
                            >
                                {row.name}
                            </button>
                            {row.custom.then(|| view! { <span class="output-chip">"custom"</span> })}
                        </li>
                    }
                })
                .collect_view()}
        </ul>
    }
    .into_view()
}

fn tags_view(tags: Vec<TagRow>) -> View {
    view! {
        <div class="output-tags">
            {tags
                .into_iter()
                .map(|tag| {
                    let text = match tag.count {
                        Some(count) => format!("{} ({count})", tag.name),
                        None => tag.name,
                    };
                    view! { <span class="output-chip">{text}</span> }
                })
                .collect_view()}
        </div>
    }
    .into_view()
}

fn detail_view(detail: DetailView) -> View {
    let class = match detail.kind {
        DetailKind::Project => "output-detail output-detail-project",
        DetailKind::Todo => "output-detail output-detail-todo",
        DetailKind::Note => "output-detail output-detail-note",
    };
    view! {
        <article class=class>
            <h4>{detail.title}</h4>
            {field_list(detail.fields)}
            {detail.body.map(|body| view! { <pre class="output-detail-body">{body}</pre> })}
        </article>
    }
    .into_view()
}

fn fields_view(class: &'static str, fields: Vec<Field>) -> View {
    view! { <div class=class>{field_list(fields)}</div> }.into_view()
}

fn field_list(fields: Vec<Field>) -> View {
    view! {
        <dl class="output-fields">
            {fields
                .into_iter()
                .map(|field| view! { <dt>{field.label}</dt><dd>{field.value}</dd> })
                .collect_view()}
        </dl>
    }
    .into_view()
}

fn stack_view(groups: Vec<StackGroup>) -> View {
    view! {
        <div class="output-stack">
            {groups
                .into_iter()
                .map(|group| view! {
                    <section>
                        <h4>{group.category}</h4>
                        {group
                            .items
                            .into_iter()
                            .map(|item| view! { <span class="output-chip">{item}</span> })
                            .collect_view()}
                    </section>
                })
                .collect_view()}
        </div>
    }
    .into_view()
}

fn theme_change_view(change: ThemeChangeView) -> View {
    let text = if change.custom {
        format!("Theme {} applied (custom palette)", change.theme_id)
    } else {
        format!("Theme {} applied", change.theme_id)
    };
    view! { <p class="output-theme-change">{text}</p> }.into_view()
}

fn key_value_view(rows: Vec<KeyValueRow>) -> View {
    view! {
        <div class="output-key-values">
            {rows
                .into_iter()
                .map(|row| {
                    let style = format!("padding-left: {}rem", row.depth);
                    match row.value {
                        Some(value) => view! {
                            <div class="output-kv-row" style=style>
                                <span class="output-kv-key">{row.key}</span>
                                <span class="output-kv-value">{value}</span>
                            </div>
                        }
                        .into_view(),
                        None => view! {
                            <div class="output-kv-section" style=style>{row.key}</div>
                        }
                        .into_view(),
                    }
                })
                .collect_view()}
        </div>
    }
    .into_view()
}

/// Header text for an archived wizard status.
pub(crate) fn status_label(status: ReplayStatus) -> &'static str {
    match status {
        ReplayStatus::Completed => "Completed",
        ReplayStatus::Abandoned => "Cancelled",
        ReplayStatus::Incomplete => "Incomplete",
    }
}

#[component]
/// Read-only wizard summary with run-again and go-to actions.
pub fn ArchivedWizard(
    /// Summary to render.
    summary: ArchivedSummary,
) -> impl IntoView {
    let terminal = expect_context::<TerminalContext>();
    let status = status_label(summary.status);
    let fields = summary
        .fields
        .iter()
        .map(|field| (field.label.clone(), field.value.display()))
        .collect::<Vec<_>>();
    let go_to = summary.go_to;
    let has_run_again = summary.run_again.is_some();
    let title = summary.title.clone();

    view! {
        <div class="wizard-summary" aria-readonly="true">
            <div class="wizard-summary-head">
                <strong>{title}</strong>
                <span class="output-chip">{status}</span>
            </div>
            <dl class="output-fields">
                {fields
                    .into_iter()
                    .map(|(label, value)| view! { <dt>{label}</dt><dd>{value}</dd> })
                    .collect_view()}
            </dl>
            <div class="wizard-summary-actions">
                {has_run_again.then(|| view! {
                    <button
                        type="button"
                        class="app-action"
                        on:click=move |_| terminal.run_again(summary.clone())
                    >
                        "Run again"
                    </button>
                })}
                {go_to.map(|link| view! {
                    <button
                        type="button"
                        class="app-action"
                        on:click=move |_| terminal.navigate(link.path)
                    >
                        {link.label}
                    </button>
                })}
            </div>
        </div>
    }
}

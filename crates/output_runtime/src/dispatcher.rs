//! Response dispatcher: one [`CommandResult`] in, one [`RenderedOutput`] plus ordered effects out.
//!
//! Dispatch is pure. Host interaction (project switch, navigation, theme activation, wizard
//! registration) is returned as [`DispatchEffect`] values for the runtime to execute in order.

use command_result_contract::{CommandResult, HistoryEntryId, ResultKind, WizardRecord};
use serde_json::{Map, Value};
use wizard_engine::{render_archived, WizardSession};

use crate::{
    config::OutputConfig,
    render,
    shapes::{classify, PayloadShape},
    views::{
        BatchItem, DetailKind, ListKind, OutputBody, ProjectContext, RenderedOutput, WizardBody,
    },
};

#[derive(Debug, Clone, Copy)]
/// Inputs besides the result itself.
pub struct DispatchContext<'a> {
    /// History entry the output belongs to.
    pub entry_id: HistoryEntryId,
    /// Command line that produced the result.
    pub command: &'a str,
    /// Active project, used as wizard context when the result names none.
    pub active_project: Option<&'a str>,
    /// Persisted wizard snapshot for this entry; when present the wizard is replayed read-only.
    pub archived: Option<&'a WizardRecord>,
    /// Runtime configuration.
    pub config: &'a OutputConfig,
}

#[derive(Debug, Clone, PartialEq)]
/// Host-facing consequence of a dispatch, executed in emission order.
pub enum DispatchEffect {
    /// Register a live wizard session for the entry.
    OpenWizard(Box<WizardSession>),
    /// Make a project the active context.
    SwitchProject(String),
    /// Navigate to a path. Always emitted after any project switch.
    Navigate(String),
    /// Clear, persist, and (for custom themes) derive and inject a theme.
    ActivateTheme(String),
}

#[derive(Debug, Clone, PartialEq)]
/// Dispatch outcome.
pub struct Dispatched {
    /// View model to render.
    pub output: RenderedOutput,
    /// Effects in execution order.
    pub effects: Vec<DispatchEffect>,
}

/// Classifies and renders one result.
///
/// Prompt results never render a body. Unknown shapes degrade to the generic listing or a raw
/// dump, and the message is always part of the output.
pub fn dispatch(result: &CommandResult, ctx: &DispatchContext<'_>) -> Dispatched {
    let mut effects = Vec::new();
    let (shape, body) = if result.kind.renders_body() {
        let shape = classify(&result.payload);
        let body = match shape {
            PayloadShape::Wizard => Some(wizard_body(result, ctx, &mut effects)),
            _ => render_body(shape, &result.payload, ctx.config),
        };
        (Some(shape), body)
    } else {
        (None, None)
    };

    effects.extend(side_effects(&result.payload));

    Dispatched {
        output: RenderedOutput {
            kind: result.kind,
            icon: result.kind.icon(),
            message: result.message.clone(),
            shape,
            body,
            context: project_context(result),
            suggestions: result.suggestions.clone(),
        },
        effects,
    }
}

/// Renders a result without registering wizards or producing effects. Used for nested results.
pub fn render_passive(result: &CommandResult, config: &OutputConfig) -> RenderedOutput {
    let (shape, body) = if result.kind.renders_body() {
        let shape = classify(&result.payload);
        (Some(shape), render_body(shape, &result.payload, config))
    } else {
        (None, None)
    };
    RenderedOutput {
        kind: result.kind,
        icon: result.kind.icon(),
        message: result.message.clone(),
        shape,
        body,
        context: project_context(result),
        suggestions: result.suggestions.clone(),
    }
}

/// Navigation and theme effects carried by a payload, in execution order.
///
/// A project switch always precedes the redirect so the destination renders in the new context.
pub fn side_effects(payload: &Value) -> Vec<DispatchEffect> {
    let mut effects = Vec::new();
    let Value::Object(obj) = payload else {
        return effects;
    };

    let project_id = obj
        .get("metadata")
        .and_then(|metadata| metadata.get("projectId"))
        .and_then(render::scalar_text);
    if let Some(project_id) = project_id {
        effects.push(DispatchEffect::SwitchProject(project_id));
    }
    let redirect = obj
        .get("redirect")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|path| !path.is_empty());
    if let Some(path) = redirect {
        effects.push(DispatchEffect::Navigate(path.to_string()));
    }
    if let Some(theme_id) = obj.get("theme").and_then(render::theme_id) {
        effects.push(DispatchEffect::ActivateTheme(theme_id));
    }
    effects
}

fn wizard_body(
    result: &CommandResult,
    ctx: &DispatchContext<'_>,
    effects: &mut Vec<DispatchEffect>,
) -> OutputBody {
    if let Some(record) = ctx.archived {
        return OutputBody::Wizard(WizardBody::Archived(render_archived(record)));
    }

    let project_id = result
        .metadata
        .as_ref()
        .and_then(|metadata| metadata.project_id.clone())
        .or_else(|| ctx.active_project.map(str::to_string));
    match WizardSession::from_payload(ctx.entry_id, ctx.command, project_id, &result.payload) {
        Ok(session) => {
            effects.push(DispatchEffect::OpenWizard(Box::new(session)));
            OutputBody::Wizard(WizardBody::Live(ctx.entry_id))
        }
        Err(err) => {
            leptos::logging::warn!("wizard payload for {} rejected: {err}", ctx.entry_id);
            match &result.payload {
                Value::Object(obj) => render::key_values(obj, ctx.config),
                other => render::raw(other),
            }
        }
    }
}

fn render_body(shape: PayloadShape, payload: &Value, config: &OutputConfig) -> Option<OutputBody> {
    let obj = match payload {
        Value::Object(obj) => obj,
        Value::Null => return None,
        other => return Some(render::raw(other)),
    };
    let body = match shape {
        PayloadShape::Empty => return None,
        PayloadShape::Wizard => render::key_values(obj, config),
        PayloadShape::Confirmation => render::confirmation(obj),
        PayloadShape::Batch => OutputBody::Batch(
            array(obj, "batch")
                .iter()
                .map(|item| batch_item(item, config))
                .collect(),
        ),
        PayloadShape::Help => render::help(array(obj, "commands")),
        PayloadShape::Search => render::search(obj, array(obj, "results")),
        PayloadShape::Projects => render::list(ListKind::Projects, array(obj, "projects"), config),
        PayloadShape::Todos => render::list(ListKind::Todos, array(obj, "todos"), config),
        PayloadShape::Notes => render::list(ListKind::Notes, array(obj, "notes"), config),
        PayloadShape::DevLog => render::list(ListKind::DevLog, array(obj, "devlog"), config),
        PayloadShape::Components => {
            render::list(ListKind::Components, array(obj, "components"), config)
        }
        PayloadShape::Relationships => render::relationships(array(obj, "relationships")),
        PayloadShape::Ideas => render::list(ListKind::Ideas, array(obj, "ideas"), config),
        PayloadShape::Activity => {
            render::list(ListKind::Activity, array(obj, "activities"), config)
        }
        PayloadShape::Members => render::list(ListKind::Members, array(obj, "members"), config),
        PayloadShape::Notifications => {
            render::list(ListKind::Notifications, array(obj, "notifications"), config)
        }
        PayloadShape::Themes => render::themes(obj, array(obj, "themes"), config),
        PayloadShape::Tags => render::tags(array(obj, "tags")),
        PayloadShape::Project => render::detail(DetailKind::Project, object(obj, "project")?),
        PayloadShape::Todo => render::detail(DetailKind::Todo, object(obj, "todo")?),
        PayloadShape::Note => render::detail(DetailKind::Note, object(obj, "note")?),
        PayloadShape::Stats => OutputBody::Stats(render::fields(object(obj, "stats")?)),
        PayloadShape::Settings => OutputBody::Settings(render::fields(object(obj, "settings")?)),
        PayloadShape::Stack => render::stack(obj.get("stack")?),
        PayloadShape::Content => OutputBody::Content(
            obj.get("content")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        ),
        PayloadShape::ThemeChange => obj
            .get("theme")
            .and_then(|theme| render::theme_change(theme, config))
            .unwrap_or_else(|| render::key_values(obj, config)),
        PayloadShape::GenericObject => render::key_values(obj, config),
        PayloadShape::Raw => render::raw(payload),
    };
    Some(body)
}

fn array<'a>(obj: &'a Map<String, Value>, key: &str) -> &'a [Value] {
    obj.get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

fn object<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Map<String, Value>> {
    obj.get(key).and_then(Value::as_object)
}

fn batch_item(item: &Value, config: &OutputConfig) -> BatchItem {
    let command = item
        .get("command")
        .and_then(Value::as_str)
        .map(str::to_string);
    let nested = item.get("result").unwrap_or(item);
    let output = match serde_json::from_value::<CommandResult>(nested.clone()) {
        Ok(result) => render_passive(&result, config),
        Err(_) => render_passive(
            &CommandResult::new(ResultKind::Info, "")
                .with_payload(nested.clone()),
            config,
        ),
    };
    BatchItem { command, output }
}

fn project_context(result: &CommandResult) -> Option<ProjectContext> {
    let metadata = result.metadata.as_ref()?;
    let project_id = metadata
        .project_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())?;
    Some(ProjectContext {
        project_id: project_id.to_string(),
        label: metadata
            .project_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| project_id.to_string()),
        action: metadata.action.clone(),
    })
}

//! Leaf renderers: payload shape to view model.
//!
//! Field lookups are lenient. The interpreter has used several names for the same field over
//! time (`name`/`title`, `type`/`relationType`), so each renderer takes the first key present.

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::{
    config::OutputConfig,
    views::{
        ConfirmationView, DetailKind, DetailView, Field, HelpCommand, HelpSection, KeyValueRow,
        ListKind, ListRow, ListView, OutputBody, RelationshipRow, SearchHit, SearchView,
        StackGroup, TagRow, ThemeChangeView, ThemeRow,
    },
};

const SNIPPET_CHARS: usize = 80;
const DEFAULT_HELP_CATEGORY: &str = "General";
const DEFAULT_STACK_CATEGORY: &str = "Stack";

struct RowSpec {
    title: &'static [&'static str],
    detail: &'static [&'static str],
    status: &'static [&'static str],
    badges: &'static [&'static str],
}

const fn row_spec(kind: ListKind) -> RowSpec {
    match kind {
        ListKind::Projects => RowSpec {
            title: &["name", "title"],
            detail: &["description"],
            status: &["status"],
            badges: &["category", "tags"],
        },
        ListKind::Todos => RowSpec {
            title: &["title", "text", "content"],
            detail: &["description"],
            status: &["status"],
            badges: &["priority", "dueDate", "due"],
        },
        ListKind::Notes => RowSpec {
            title: &["title", "name"],
            detail: &["content", "body"],
            status: &[],
            badges: &["tags"],
        },
        ListKind::DevLog => RowSpec {
            title: &["title", "entry"],
            detail: &["content", "description"],
            status: &["mood"],
            badges: &["date", "createdAt", "tags"],
        },
        ListKind::Components => RowSpec {
            title: &["name", "title"],
            detail: &["description"],
            status: &["type", "kind"],
            badges: &["category", "status"],
        },
        ListKind::Ideas => RowSpec {
            title: &["title", "text", "name"],
            detail: &["description", "content"],
            status: &["status"],
            badges: &["priority", "tags"],
        },
        ListKind::Activity => RowSpec {
            title: &["description", "action", "message"],
            detail: &["entityTitle", "target", "entity"],
            status: &["type"],
            badges: &["user", "actor", "createdAt", "timestamp"],
        },
        ListKind::Members => RowSpec {
            title: &["name", "username", "email"],
            detail: &["email"],
            status: &["role"],
            badges: &["status"],
        },
        ListKind::Notifications => RowSpec {
            title: &["message", "title"],
            detail: &["description", "body"],
            status: &[],
            badges: &["createdAt", "type"],
        },
    }
}

/// Renders an entity list.
pub(crate) fn list(kind: ListKind, items: &[Value], config: &OutputConfig) -> OutputBody {
    let spec = row_spec(kind);
    let rows = items
        .iter()
        .take(config.max_list_rows)
        .map(|item| list_row(kind, &spec, item))
        .collect();
    OutputBody::List(ListView {
        kind,
        rows,
        truncated: items.len().saturating_sub(config.max_list_rows),
    })
}

fn list_row(kind: ListKind, spec: &RowSpec, item: &Value) -> ListRow {
    let Value::Object(obj) = item else {
        return ListRow {
            title: scalar_text(item).unwrap_or_default(),
            ..ListRow::default()
        };
    };

    let mut status = first_text(obj, spec.status);
    if status.is_none() {
        status = match kind {
            ListKind::Todos => obj
                .get("completed")
                .and_then(Value::as_bool)
                .map(|done| if done { "done" } else { "open" }.to_string()),
            ListKind::Notifications => obj
                .get("read")
                .and_then(Value::as_bool)
                .map(|read| if read { "read" } else { "unread" }.to_string()),
            _ => None,
        };
    }

    let title_key = spec.title.iter().find(|key| has_text(obj, key));
    let detail = spec
        .detail
        .iter()
        .filter(|key| Some(*key) != title_key)
        .find_map(|key| obj.get(*key).and_then(scalar_text))
        .map(|text| snippet(&text));

    ListRow {
        id: obj.get("id").and_then(scalar_text),
        title: title_key
            .and_then(|key| obj.get(*key))
            .and_then(scalar_text)
            .unwrap_or_else(|| "(untitled)".to_string()),
        detail,
        status,
        badges: spec
            .badges
            .iter()
            .filter_map(|key| obj.get(*key))
            .flat_map(badge_texts)
            .collect(),
    }
}

fn badge_texts(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(scalar_text).collect(),
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Renders a confirmation prompt.
pub(crate) fn confirmation(obj: &Map<String, Value>) -> OutputBody {
    let confirm_command = text(obj, "confirmCommand").unwrap_or_default();
    let destructive = obj
        .get("destructive")
        .and_then(Value::as_bool)
        .unwrap_or_else(|| {
            let lowered = confirm_command.to_ascii_lowercase();
            lowered.contains("delete") || lowered.contains("remove")
        });
    OutputBody::Confirmation(ConfirmationView {
        prompt: first_text(obj, &["confirmMessage", "warning", "details"]),
        cancel_command: text(obj, "cancelCommand"),
        confirm_command,
        destructive,
    })
}

/// Renders the help listing grouped by category in first-seen order.
pub(crate) fn help(commands: &[Value]) -> OutputBody {
    let mut sections: IndexMap<String, Vec<HelpCommand>> = IndexMap::new();
    for entry in commands {
        let (category, command) = match entry {
            Value::Object(obj) => (
                first_text(obj, &["category", "group"]),
                HelpCommand {
                    syntax: first_text(obj, &["syntax", "command", "name", "usage"])
                        .unwrap_or_default(),
                    description: first_text(obj, &["description", "summary"]),
                    aliases: string_list(obj.get("aliases")),
                    examples: string_list(obj.get("examples")),
                },
            ),
            other => (
                None,
                HelpCommand {
                    syntax: scalar_text(other).unwrap_or_default(),
                    description: None,
                    aliases: Vec::new(),
                    examples: Vec::new(),
                },
            ),
        };
        if command.syntax.is_empty() {
            continue;
        }
        sections
            .entry(category.unwrap_or_else(|| DEFAULT_HELP_CATEGORY.to_string()))
            .or_default()
            .push(command);
    }
    OutputBody::Help(
        sections
            .into_iter()
            .map(|(category, commands)| HelpSection { category, commands })
            .collect(),
    )
}

/// Renders search hits.
pub(crate) fn search(obj: &Map<String, Value>, results: &[Value]) -> OutputBody {
    let hits: Vec<SearchHit> = results
        .iter()
        .map(|hit| match hit {
            Value::Object(hit) => SearchHit {
                kind: first_text(hit, &["type", "kind", "entityType"]),
                title: first_text(hit, &["title", "name", "text"])
                    .unwrap_or_else(|| "(untitled)".to_string()),
                snippet: first_text(hit, &["snippet", "excerpt", "content", "description"])
                    .map(|text| snippet(&text)),
                id: hit.get("id").and_then(scalar_text),
            },
            other => SearchHit {
                kind: None,
                title: scalar_text(other).unwrap_or_default(),
                snippet: None,
                id: None,
            },
        })
        .collect();
    let total = obj
        .get("total")
        .and_then(Value::as_u64)
        .and_then(|total| usize::try_from(total).ok())
        .unwrap_or(hits.len());
    OutputBody::Search(SearchView {
        query: obj.get("query").and_then(scalar_text).unwrap_or_default(),
        hits,
        total,
    })
}

/// Renders relationship rows.
pub(crate) fn relationships(items: &[Value]) -> OutputBody {
    OutputBody::Relationships(
        items
            .iter()
            .filter_map(Value::as_object)
            .map(|obj| RelationshipRow {
                source: first_text(obj, &["sourceName", "source", "from"]).unwrap_or_default(),
                relation_type: first_text(obj, &["relationType", "type"])
                    .unwrap_or_else(|| "related".to_string()),
                target: first_text(obj, &["targetName", "target", "to", "targetId"])
                    .unwrap_or_default(),
                description: text(obj, "description"),
            })
            .collect(),
    )
}

/// Renders the theme list, marking the active entry.
pub(crate) fn themes(
    obj: &Map<String, Value>,
    items: &[Value],
    config: &OutputConfig,
) -> OutputBody {
    let active = first_text(obj, &["current", "active", "theme"]);
    OutputBody::Themes(
        items
            .iter()
            .filter_map(|item| {
                let (id, name, custom_flag, active_flag) = match item {
                    Value::Object(theme) => (
                        first_text(theme, &["id", "name"])?,
                        first_text(theme, &["name", "label", "id"]),
                        theme.get("custom").and_then(Value::as_bool),
                        theme.get("active").and_then(Value::as_bool),
                    ),
                    other => (scalar_text(other)?, None, None, None),
                };
                Some(ThemeRow {
                    custom: custom_flag.unwrap_or_else(|| config.is_custom_theme(&id)),
                    active: active_flag.unwrap_or_else(|| active.as_deref() == Some(id.as_str())),
                    name: name.unwrap_or_else(|| id.clone()),
                    id,
                })
            })
            .collect(),
    )
}

/// Renders tags, with counts when present.
pub(crate) fn tags(items: &[Value]) -> OutputBody {
    OutputBody::Tags(
        items
            .iter()
            .filter_map(|item| match item {
                Value::Object(tag) => Some(TagRow {
                    name: first_text(tag, &["name", "tag"])?,
                    count: tag.get("count").and_then(Value::as_u64),
                }),
                other => Some(TagRow {
                    name: scalar_text(other)?,
                    count: None,
                }),
            })
            .collect(),
    )
}

/// Renders a single project, todo, or note.
pub(crate) fn detail(kind: DetailKind, entity: &Map<String, Value>) -> OutputBody {
    let (title_keys, body_keys): (&[&str], &[&str]) = match kind {
        DetailKind::Project => (&["name", "title"], &["description"]),
        DetailKind::Todo => (&["title", "text"], &["description"]),
        DetailKind::Note => (&["title", "name"], &["content", "body"]),
    };
    let title_key = title_keys.iter().copied().find(|key| has_text(entity, key));
    let body_key = body_keys.iter().copied().find(|key| has_text(entity, key));

    let fields = entity
        .iter()
        .filter(|(key, _)| Some(key.as_str()) != title_key && Some(key.as_str()) != body_key)
        .filter_map(|(key, value)| {
            Some(Field {
                label: humanize_key(key),
                value: scalar_text(value)?,
            })
        })
        .collect();

    OutputBody::Detail(DetailView {
        kind,
        title: title_key
            .and_then(|key| text(entity, key))
            .unwrap_or_else(|| "(untitled)".to_string()),
        fields,
        body: body_key.and_then(|key| text(entity, key)),
    })
}

/// Flattens one level of an object into labelled fields.
pub(crate) fn fields(obj: &Map<String, Value>) -> Vec<Field> {
    obj.iter()
        .map(|(key, value)| Field {
            label: humanize_key(key),
            value: match value {
                Value::Object(nested) => nested
                    .iter()
                    .filter_map(|(key, value)| Some(format!("{key}: {}", scalar_text(value)?)))
                    .collect::<Vec<_>>()
                    .join(", "),
                other => scalar_text(other).unwrap_or_else(|| "-".to_string()),
            },
        })
        .collect()
}

/// Renders stack groups from either `{category: [items]}` or a flat list.
pub(crate) fn stack(value: &Value) -> OutputBody {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    match value {
        Value::Object(categories) => {
            for (category, items) in categories {
                groups
                    .entry(category.clone())
                    .or_default()
                    .extend(stack_items(items));
            }
        }
        Value::Array(items) => {
            for item in items {
                let category = item
                    .as_object()
                    .and_then(|obj| first_text(obj, &["category", "type"]))
                    .unwrap_or_else(|| DEFAULT_STACK_CATEGORY.to_string());
                groups
                    .entry(category)
                    .or_default()
                    .extend(stack_items(item));
            }
        }
        _ => {}
    }
    OutputBody::Stack(
        groups
            .into_iter()
            .map(|(category, items)| StackGroup { category, items })
            .collect(),
    )
}

fn stack_items(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().flat_map(stack_items).collect(),
        Value::Object(obj) => {
            let name = first_text(obj, &["name", "title"]);
            match (name, text(obj, "version")) {
                (Some(name), Some(version)) => vec![format!("{name} {version}")],
                (Some(name), None) => vec![name],
                (None, _) => Vec::new(),
            }
        }
        other => scalar_text(other).into_iter().collect(),
    }
}

/// Theme id named by a `theme` payload field (string or `{ id }` object).
pub(crate) fn theme_id(theme: &Value) -> Option<String> {
    match theme {
        Value::Object(obj) => first_text(obj, &["id", "name"]),
        other => scalar_text(other),
    }
}

/// Renders the theme activation notice.
pub(crate) fn theme_change(theme: &Value, config: &OutputConfig) -> Option<OutputBody> {
    let theme_id = theme_id(theme)?;
    Some(OutputBody::ThemeChange(ThemeChangeView {
        custom: config.is_custom_theme(&theme_id),
        theme_id,
    }))
}

/// Generic nested key/value listing, expanded to the configured depth.
pub(crate) fn key_values(obj: &Map<String, Value>, config: &OutputConfig) -> OutputBody {
    let mut rows = Vec::new();
    push_object_rows(&mut rows, obj, 0, config.generic_listing_depth);
    OutputBody::KeyValue(rows)
}

fn push_object_rows(
    rows: &mut Vec<KeyValueRow>,
    obj: &Map<String, Value>,
    depth: usize,
    max_depth: usize,
) {
    for (key, value) in obj {
        push_value_rows(rows, key.clone(), value, depth, max_depth);
    }
}

fn push_value_rows(
    rows: &mut Vec<KeyValueRow>,
    key: String,
    value: &Value,
    depth: usize,
    max_depth: usize,
) {
    if let Some(text) = scalar_text(value) {
        rows.push(KeyValueRow {
            depth,
            key,
            value: Some(text),
        });
        return;
    }
    let summary = match value {
        Value::Object(obj) if obj.is_empty() => Some("{}".to_string()),
        Value::Array(items) if items.is_empty() => Some("[]".to_string()),
        Value::Object(obj) if depth + 1 >= max_depth => Some(format!("{{{} fields}}", obj.len())),
        Value::Array(items) if depth + 1 >= max_depth => Some(format!("[{} items]", items.len())),
        Value::Null => Some("null".to_string()),
        _ => None,
    };
    if let Some(summary) = summary {
        rows.push(KeyValueRow {
            depth,
            key,
            value: Some(summary),
        });
        return;
    }

    rows.push(KeyValueRow {
        depth,
        key,
        value: None,
    });
    match value {
        Value::Object(obj) => push_object_rows(rows, obj, depth + 1, max_depth),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                push_value_rows(rows, format!("[{index}]"), item, depth + 1, max_depth);
            }
        }
        _ => {}
    }
}

/// Pretty-printed dump for payloads no renderer understands.
pub(crate) fn raw(value: &Value) -> OutputBody {
    OutputBody::Raw(serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()))
}

/// Display text for scalars and arrays of scalars. Blank strings count as absent.
pub(crate) fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(if *flag { "yes" } else { "no" }.to_string()),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(scalar_text)
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(", ")),
        _ => None,
    }
}

fn text(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(scalar_text)
}

fn has_text(obj: &Map<String, Value>, key: &str) -> bool {
    text(obj, key).is_some()
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(obj, key))
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    }
}

fn snippet(text: &str) -> String {
    let first_line = text.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() <= SNIPPET_CHARS {
        return first_line.to_string();
    }
    let cut: String = first_line.chars().take(SNIPPET_CHARS).collect();
    format!("{}...", cut.trim_end())
}

/// `createdAt` / `due_date` to `Created at` / `Due date`.
pub(crate) fn humanize_key(key: &str) -> String {
    let mut words = String::with_capacity(key.len() + 4);
    for (index, ch) in key.chars().enumerate() {
        if ch == '_' || ch == '-' {
            words.push(' ');
        } else if ch.is_ascii_uppercase() && index > 0 {
            words.push(' ');
            words.push(ch.to_ascii_lowercase());
        } else if index == 0 {
            words.extend(ch.to_uppercase());
        } else {
            words.push(ch);
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(obj) => obj,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn todo_rows_pick_fields_and_derive_status() {
        let body = list(
            ListKind::Todos,
            &[
                json!({ "id": "t1", "title": "Ship", "priority": "high", "completed": true }),
                json!("loose text"),
            ],
            &OutputConfig::default(),
        );
        let OutputBody::List(view) = body else {
            panic!("list body");
        };
        assert_eq!(
            view.rows,
            vec![
                ListRow {
                    id: Some("t1".to_string()),
                    title: "Ship".to_string(),
                    detail: None,
                    status: Some("done".to_string()),
                    badges: vec!["high".to_string()],
                },
                ListRow {
                    title: "loose text".to_string(),
                    ..ListRow::default()
                },
            ]
        );
    }

    #[test]
    fn lists_truncate_to_configured_rows() {
        let config = OutputConfig {
            max_list_rows: 2,
            ..OutputConfig::default()
        };
        let items = vec![json!("a"), json!("b"), json!("c")];
        let OutputBody::List(view) = list(ListKind::Notes, &items, &config) else {
            panic!("list body");
        };
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.truncated, 1);
    }

    #[test]
    fn note_detail_splits_title_body_and_fields() {
        let body = detail(
            DetailKind::Note,
            &object(json!({
                "id": "n1",
                "title": "Plan",
                "content": "Line one\nLine two",
                "createdAt": "2024-01-02",
                "meta": { "x": 1 }
            })),
        );
        assert_eq!(
            body,
            OutputBody::Detail(DetailView {
                kind: DetailKind::Note,
                title: "Plan".to_string(),
                fields: vec![
                    Field {
                        label: "Id".to_string(),
                        value: "n1".to_string(),
                    },
                    Field {
                        label: "Created at".to_string(),
                        value: "2024-01-02".to_string(),
                    },
                ],
                body: Some("Line one\nLine two".to_string()),
            })
        );
    }

    #[test]
    fn help_groups_by_category_in_first_seen_order() {
        let OutputBody::Help(sections) = help(&[
            json!({ "command": "/add todo", "category": "Todos", "description": "Add" }),
            json!("/help"),
            json!({ "command": "/todos", "category": "Todos" }),
        ]) else {
            panic!("help body");
        };
        assert_eq!(
            sections
                .iter()
                .map(|section| (section.category.as_str(), section.commands.len()))
                .collect::<Vec<_>>(),
            vec![("Todos", 2), ("General", 1)]
        );
    }

    #[test]
    fn themes_mark_active_and_custom_entries() {
        let payload = object(json!({
            "current": "custom-ocean",
            "themes": ["light", { "id": "custom-ocean", "name": "Ocean" }]
        }));
        let items = payload["themes"].as_array().cloned().unwrap_or_default();
        let OutputBody::Themes(rows) = themes(&payload, &items, &OutputConfig::default()) else {
            panic!("themes body");
        };
        assert_eq!(
            rows,
            vec![
                ThemeRow {
                    id: "light".to_string(),
                    name: "light".to_string(),
                    custom: false,
                    active: false,
                },
                ThemeRow {
                    id: "custom-ocean".to_string(),
                    name: "Ocean".to_string(),
                    custom: true,
                    active: true,
                },
            ]
        );
    }

    #[test]
    fn stack_accepts_grouped_and_flat_forms() {
        assert_eq!(
            stack(&json!({ "frontend": ["leptos", { "name": "trunk", "version": "0.20" }] })),
            OutputBody::Stack(vec![StackGroup {
                category: "frontend".to_string(),
                items: vec!["leptos".to_string(), "trunk 0.20".to_string()],
            }])
        );
        assert_eq!(
            stack(&json!([{ "name": "postgres", "category": "data" }, "redis"])),
            OutputBody::Stack(vec![
                StackGroup {
                    category: "data".to_string(),
                    items: vec!["postgres".to_string()],
                },
                StackGroup {
                    category: "Stack".to_string(),
                    items: vec!["redis".to_string()],
                },
            ])
        );
    }

    #[test]
    fn key_values_stop_expanding_at_depth_limit() {
        let config = OutputConfig {
            generic_listing_depth: 2,
            ..OutputConfig::default()
        };
        let OutputBody::KeyValue(rows) = key_values(
            &object(json!({ "a": 1, "b": { "c": { "d": 2 }, "e": [] } })),
            &config,
        ) else {
            panic!("key/value body");
        };
        let row = |depth, key: &str, value: Option<&str>| KeyValueRow {
            depth,
            key: key.to_string(),
            value: value.map(str::to_string),
        };
        assert_eq!(
            rows,
            vec![
                row(0, "a", Some("1")),
                row(0, "b", None),
                row(1, "c", Some("{1 fields}")),
                row(1, "e", Some("[]")),
            ]
        );
    }

    #[test]
    fn snippets_keep_first_line_and_cap_length() {
        assert_eq!(snippet("one\ntwo"), "one");
        let long = "x".repeat(100);
        assert_eq!(snippet(&long), format!("{}...", "x".repeat(80)));
    }

    #[test]
    fn humanizes_camel_and_snake_keys() {
        assert_eq!(humanize_key("createdAt"), "Created at");
        assert_eq!(humanize_key("due_date"), "Due date");
    }
}

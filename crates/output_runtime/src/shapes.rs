//! Ordered payload shape classification.
//!
//! Payloads carry no discriminant. Some satisfy several shapes at once (a project object that
//! also lists todos, a theme list that also names the active theme), so classification walks
//! [`SHAPE_PRIORITY`] top to bottom and the first matching predicate is authoritative.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Presentation shape selected for a payload.
pub enum PayloadShape {
    /// `wizardType` string with a `steps` array.
    Wizard,
    /// `confirmCommand` string.
    Confirmation,
    /// `batch` array of nested results.
    Batch,
    /// `commands` array.
    Help,
    /// `results` array with a `query`.
    Search,
    /// `projects` array.
    Projects,
    /// `todos` array.
    Todos,
    /// `notes` array.
    Notes,
    /// `devlog` array.
    DevLog,
    /// `components` array.
    Components,
    /// `relationships` array.
    Relationships,
    /// `ideas` array.
    Ideas,
    /// `activities` array.
    Activity,
    /// `members` array.
    Members,
    /// `notifications` array.
    Notifications,
    /// `themes` array.
    Themes,
    /// `tags` array.
    Tags,
    /// `project` object.
    Project,
    /// `todo` object.
    Todo,
    /// `note` object.
    Note,
    /// `stats` object.
    Stats,
    /// `settings` object.
    Settings,
    /// `stack` object or array.
    Stack,
    /// Pre-rendered `content` string.
    Content,
    /// `theme` present.
    ThemeChange,
    /// Any other non-empty object.
    GenericObject,
    /// Non-object payloads.
    Raw,
    /// `null` or `{}`.
    Empty,
}

type ShapePredicate = fn(&Map<String, Value>) -> bool;

/// Object shapes in priority order. Objects matching none are [`PayloadShape::GenericObject`].
pub const SHAPE_PRIORITY: [(PayloadShape, ShapePredicate); 25] = [
    (PayloadShape::Wizard, |obj| {
        is_string(obj, "wizardType") && is_array(obj, "steps")
    }),
    (PayloadShape::Confirmation, |obj| is_string(obj, "confirmCommand")),
    (PayloadShape::Batch, |obj| is_array(obj, "batch")),
    (PayloadShape::Help, |obj| is_array(obj, "commands")),
    (PayloadShape::Search, |obj| {
        is_array(obj, "results") && obj.contains_key("query")
    }),
    (PayloadShape::Projects, |obj| is_array(obj, "projects")),
    (PayloadShape::Todos, |obj| is_array(obj, "todos")),
    (PayloadShape::Notes, |obj| is_array(obj, "notes")),
    (PayloadShape::DevLog, |obj| is_array(obj, "devlog")),
    (PayloadShape::Components, |obj| is_array(obj, "components")),
    (PayloadShape::Relationships, |obj| is_array(obj, "relationships")),
    (PayloadShape::Ideas, |obj| is_array(obj, "ideas")),
    (PayloadShape::Activity, |obj| is_array(obj, "activities")),
    (PayloadShape::Members, |obj| is_array(obj, "members")),
    (PayloadShape::Notifications, |obj| is_array(obj, "notifications")),
    (PayloadShape::Themes, |obj| is_array(obj, "themes")),
    (PayloadShape::Tags, |obj| is_array(obj, "tags")),
    (PayloadShape::Project, |obj| is_object(obj, "project")),
    (PayloadShape::Todo, |obj| is_object(obj, "todo")),
    (PayloadShape::Note, |obj| is_object(obj, "note")),
    (PayloadShape::Stats, |obj| is_object(obj, "stats")),
    (PayloadShape::Settings, |obj| is_object(obj, "settings")),
    (PayloadShape::Stack, |obj| {
        is_object(obj, "stack") || is_array(obj, "stack")
    }),
    (PayloadShape::Content, |obj| is_string(obj, "content")),
    (PayloadShape::ThemeChange, |obj| {
        obj.get("theme").is_some_and(|theme| !theme.is_null())
    }),
];

/// Classifies a payload. Never fails: unmatched objects and non-objects have fallback shapes.
pub fn classify(payload: &Value) -> PayloadShape {
    match payload {
        Value::Null => PayloadShape::Empty,
        Value::Object(obj) if obj.is_empty() => PayloadShape::Empty,
        Value::Object(obj) => SHAPE_PRIORITY
            .iter()
            .find(|(_, matches)| matches(obj))
            .map(|(shape, _)| *shape)
            .unwrap_or(PayloadShape::GenericObject),
        _ => PayloadShape::Raw,
    }
}

fn is_string(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).is_some_and(Value::is_string)
}

fn is_array(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).is_some_and(Value::is_array)
}

fn is_object(obj: &Map<String, Value>, key: &str) -> bool {
    obj.get(key).is_some_and(Value::is_object)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn overlapping_payloads_take_the_higher_priority_shape() {
        let cases = [
            (json!({ "todos": [], "notes": [] }), PayloadShape::Todos),
            (
                json!({ "project": { "id": "p1" }, "settings": { "a": 1 } }),
                PayloadShape::Project,
            ),
            (
                json!({ "themes": [], "theme": "dracula" }),
                PayloadShape::Themes,
            ),
            (
                json!({ "wizardType": "add_todo", "steps": [], "confirmCommand": "/x" }),
                PayloadShape::Wizard,
            ),
            (
                json!({ "confirmCommand": "/delete note n1", "batch": [] }),
                PayloadShape::Confirmation,
            ),
            (
                json!({ "content": "hello", "theme": "dark" }),
                PayloadShape::Content,
            ),
        ];
        for (payload, expected) in cases {
            assert_eq!(classify(&payload), expected, "{payload}");
        }
    }

    #[test]
    fn predicates_check_field_types() {
        assert_eq!(
            classify(&json!({ "wizardType": "add_todo" })),
            PayloadShape::GenericObject
        );
        assert_eq!(classify(&json!({ "results": [] })), PayloadShape::GenericObject);
        assert_eq!(classify(&json!({ "project": "p1" })), PayloadShape::GenericObject);
        assert_eq!(classify(&json!({ "stack": ["rust"] })), PayloadShape::Stack);
        assert_eq!(classify(&json!({ "theme": null })), PayloadShape::GenericObject);
    }

    #[test]
    fn fallbacks_cover_everything_else() {
        assert_eq!(classify(&Value::Null), PayloadShape::Empty);
        assert_eq!(classify(&json!({})), PayloadShape::Empty);
        assert_eq!(classify(&json!({ "id": 4 })), PayloadShape::GenericObject);
        assert_eq!(classify(&json!([1, 2])), PayloadShape::Raw);
        assert_eq!(classify(&json!("text")), PayloadShape::Raw);
    }
}

//! Command-string templates for wizard submissions.
//!
//! Wizards never call CRUD endpoints directly; they render their collected data back into the
//! same textual command syntax a user could type so that every mutation passes through the
//! interpreter. The flag parser exists so generated commands can be checked for round trips.

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

/// Flag parse failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// The command does not start with `/`.
    #[error("command must start with `/`")]
    MissingSlash,
    /// A `--flag` is not followed by `=`.
    #[error("flag `--{0}` has no value")]
    MissingValue(String),
    /// A quoted value never closes.
    #[error("unterminated quoted value for `{0}`")]
    Unterminated(String),
    /// An escape sequence is not one the builder produces.
    #[error("unsupported escape `\\{0}`")]
    UnsupportedEscape(char),
}

/// Escapes a flag value.
///
/// Backslashes go first so the escapes added afterwards are not escaped again.
pub fn escape_value(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('"', "\\\"")
}

/// Reverses [`escape_value`].
pub fn unescape_value(escaped: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(escaped.len());
    let mut chars = escaped.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('"') => out.push('"'),
            Some(other) => return Err(TemplateError::UnsupportedEscape(other)),
            None => return Err(TemplateError::UnsupportedEscape(' ')),
        }
    }
    Ok(out)
}

/// Renders one data value as flag text, or `None` when it should be omitted.
fn flag_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(items) => {
            let strings = items.iter().map(Value::as_str).collect::<Option<Vec<_>>>();
            match strings {
                Some(strings) => Some(strings.join(",")),
                None => Some(value.to_string()),
            }
        }
        Value::Object(map) if map.is_empty() => None,
        Value::Object(_) => Some(value.to_string()),
    }
}

/// Builds `/<operation> --key="value" ...` from insertion-ordered data.
///
/// Null and blank values are skipped. String arrays join with `,`; other structured values are
/// written as compact JSON.
pub fn build_command(operation: &str, data: &IndexMap<String, Value>) -> String {
    let mut command = format!("/{}", operation.trim());
    for (key, value) in data {
        let Some(text) = flag_text(value) else {
            continue;
        };
        command.push_str(" --");
        command.push_str(key);
        command.push_str("=\"");
        command.push_str(&escape_value(&text));
        command.push('"');
    }
    command
}

/// Builds `/<operation> "arg" "arg" ...` with every positional argument quoted.
pub fn build_positional(operation: &str, args: &[&str]) -> String {
    let mut command = format!("/{}", operation.trim());
    for arg in args {
        command.push_str(" \"");
        command.push_str(&escape_value(arg));
        command.push('"');
    }
    command
}

/// Command split into positional words and `--key="value"` flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedCommand {
    /// Words before and between flags, unquoted.
    pub words: Vec<String>,
    /// Flags in source order.
    pub flags: IndexMap<String, String>,
}

/// Parses a command produced by [`build_command`] or [`build_positional`].
pub fn parse_flags(command: &str) -> Result<ParsedCommand, TemplateError> {
    let body = command
        .trim_start()
        .strip_prefix('/')
        .ok_or(TemplateError::MissingSlash)?;
    let mut parsed = ParsedCommand::default();
    let mut rest = body;

    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }

        if let Some(flag) = rest.strip_prefix("--") {
            let key_end = flag
                .find(|ch: char| ch == '=' || ch.is_whitespace())
                .unwrap_or(flag.len());
            let key = &flag[..key_end];
            let after_key = &flag[key_end..];
            let Some(after_eq) = after_key.strip_prefix('=') else {
                return Err(TemplateError::MissingValue(key.to_string()));
            };
            let (value, remaining) = take_value(after_eq, key)?;
            parsed.flags.insert(key.to_string(), value);
            rest = remaining;
        } else {
            let (word, remaining) = take_value(rest, "argument")?;
            parsed.words.push(word);
            rest = remaining;
        }
    }

    Ok(parsed)
}

fn take_value<'a>(input: &'a str, label: &str) -> Result<(String, &'a str), TemplateError> {
    let Some(quoted) = input.strip_prefix('"') else {
        let end = input.find(char::is_whitespace).unwrap_or(input.len());
        return Ok((input[..end].to_string(), &input[end..]));
    };

    let mut escaped = false;
    for (offset, ch) in quoted.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => {
                let value = unescape_value(&quoted[..offset])?;
                return Ok((value, &quoted[offset + 1..]));
            }
            _ => {}
        }
    }
    Err(TemplateError::Unterminated(label.to_string()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn data(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn escapes_in_fixed_order() {
        assert_eq!(
            escape_value("He said \"hi\"\nline2"),
            "He said \\\"hi\\\"\\nline2"
        );
        assert_eq!(escape_value("a\\nb"), "a\\\\nb");
        assert_eq!(escape_value("x\r\ny"), "x\\r\\ny");
    }

    #[test]
    fn builds_flags_in_insertion_order_and_skips_blanks() {
        let command = build_command(
            "add todo",
            &data(&[
                ("title", json!("Ship it")),
                ("notes", json!("   ")),
                ("priority", json!("high")),
                ("due", Value::Null),
                ("tags", json!(["a", "b"])),
                ("estimate", json!(3)),
            ]),
        );
        assert_eq!(
            command,
            "/add todo --title=\"Ship it\" --priority=\"high\" --tags=\"a,b\" --estimate=\"3\""
        );
    }

    #[test]
    fn structured_values_serialize_as_json() {
        let command = build_command(
            "add component",
            &data(&[("relationships", json!([{ "targetId": "c2", "relationType": "uses" }]))]),
        );
        let parsed = parse_flags(&command).expect("parse");
        let value: Value =
            serde_json::from_str(&parsed.flags["relationships"]).expect("json flag");
        assert_eq!(value, json!([{ "targetId": "c2", "relationType": "uses" }]));
    }

    #[test]
    fn round_trips_awkward_values() {
        let original = data(&[
            ("a", json!("x")),
            ("b", json!("y")),
            ("quote", json!("He said \"hi\"\nline2")),
            ("path", json!("C:\\temp\\new")),
            ("crlf", json!("one\r\ntwo")),
        ]);
        let command = build_command("edit note n1", &original);
        let parsed = parse_flags(&command).expect("parse");

        assert_eq!(parsed.words, vec!["edit", "note", "n1"]);
        let recovered = parsed
            .flags
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .collect::<IndexMap<_, _>>();
        assert_eq!(recovered, original);
    }

    #[test]
    fn positional_form_quotes_each_argument() {
        let command = build_positional("edit relationship", &["Auth \"core\"", "Db", "depends_on"]);
        assert_eq!(
            command,
            "/edit relationship \"Auth \\\"core\\\"\" \"Db\" \"depends_on\""
        );
        let parsed = parse_flags(&command).expect("parse");
        assert_eq!(
            parsed.words,
            vec!["edit", "relationship", "Auth \"core\"", "Db", "depends_on"]
        );
    }

    #[test]
    fn parse_rejects_malformed_commands() {
        assert_eq!(parse_flags("add todo"), Err(TemplateError::MissingSlash));
        assert_eq!(
            parse_flags("/add --title"),
            Err(TemplateError::MissingValue("title".to_string()))
        );
        assert_eq!(
            parse_flags("/add --title=\"open"),
            Err(TemplateError::Unterminated("title".to_string()))
        );
    }
}

//! Defensive parsing of generator text into [`Joke`] values.
//!
//! Models asked for "plain JSON" still wrap it in code fences, misspell
//! keys, or leave entries half-filled. Whole-batch problems are errors;
//! individual bad entries are dropped.

use inventory::Joke;
use serde_json::{Map, Value};

use crate::GeneratorError;

/// Parse `{ "jokes": [ { "setup": .., "punchline": .. }, .. ] }` or a bare
/// array of the same objects.
pub fn parse_jokes(content: &str) -> Result<Vec<Joke>, GeneratorError> {
    let body = strip_code_fence(content);
    if body.is_empty() {
        return Err(GeneratorError::EmptyBatch);
    }

    let value: Value = serde_json::from_str(body)
        .map_err(|e| GeneratorError::Malformed(format!("content is not JSON: {e}")))?;

    let items = match value {
        Value::Object(mut map) => match map.remove("jokes") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(GeneratorError::Malformed(format!(
                    "`jokes` must be an array, got {}",
                    kind(&other)
                )))
            }
            None => {
                return Err(GeneratorError::Malformed(
                    "missing `jokes` field".into(),
                ))
            }
        },
        Value::Array(items) => items,
        other => {
            return Err(GeneratorError::Malformed(format!(
                "expected object or array, got {}",
                kind(&other)
            )))
        }
    };

    if items.is_empty() {
        return Err(GeneratorError::EmptyBatch);
    }

    let total = items.len();
    let jokes: Vec<Joke> = items.into_iter().filter_map(joke_from_value).collect();
    if jokes.is_empty() {
        return Err(GeneratorError::Malformed(format!(
            "none of {total} entries had a setup and punchline"
        )));
    }
    if jokes.len() < total {
        tracing::warn!(
            dropped = total - jokes.len(),
            total,
            "dropped malformed joke entries"
        );
    }
    Ok(jokes)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

fn joke_from_value(value: Value) -> Option<Joke> {
    let Value::Object(mut obj) = value else {
        return None;
    };
    let setup = take_text(&mut obj, &["setup"])?;
    let punchline = take_text(&mut obj, &["punchline", "puchline"])?;
    Some(Joke::new(setup, punchline))
}

fn take_text(obj: &mut Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.remove(*key) {
        Some(Value::String(text)) if !text.trim().is_empty() => Some(text),
        _ => None,
    })
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wrapped_object() {
        let content = r#"{ "jokes": [
            { "setup": "Why did the bicycle fall over? 🚲", "punchline": "It was two-tired." },
            { "setup": "What do you call a bear with no teeth?", "punchline": "A gummy bear." }
        ] }"#;
        let jokes = parse_jokes(content).unwrap();
        assert_eq!(jokes.len(), 2);
        assert_eq!(jokes[0].punchline, "It was two-tired.");
    }

    #[test]
    fn parses_bare_array_and_code_fence() {
        let content = "```json\n[{\"setup\":\"s\",\"punchline\":\"p\"}]\n```";
        let jokes = parse_jokes(content).unwrap();
        assert_eq!(jokes, vec![Joke::new("s", "p")]);
    }

    #[test]
    fn accepts_misspelled_punchline_key() {
        let jokes = parse_jokes(r#"{"jokes":[{"setup":"s","puchline":"p"}]}"#).unwrap();
        assert_eq!(jokes, vec![Joke::new("s", "p")]);
    }

    #[test]
    fn drops_incomplete_entries_but_keeps_the_rest() {
        let content = r#"{"jokes":[
            {"setup":"only a setup"},
            {"setup":"  ","punchline":"blank setup"},
            {"setup":"ok","punchline":"fine"},
            "just a string",
            {"setup":1,"punchline":"numeric setup"}
        ]}"#;
        assert_eq!(parse_jokes(content).unwrap(), vec![Joke::new("ok", "fine")]);
    }

    #[test]
    fn rejects_unparseable_output() {
        assert!(matches!(
            parse_jokes("Sure! Here are some jokes: ..."),
            Err(GeneratorError::Malformed(_))
        ));
        assert!(matches!(
            parse_jokes(r#"{"items":[]}"#),
            Err(GeneratorError::Malformed(_))
        ));
        assert!(matches!(
            parse_jokes(r#"{"jokes":"none"}"#),
            Err(GeneratorError::Malformed(_))
        ));
        assert!(matches!(
            parse_jokes(r#"{"jokes":[{"foo":"bar"}]}"#),
            Err(GeneratorError::Malformed(_))
        ));
    }

    #[test]
    fn empty_output_is_an_empty_batch() {
        assert_eq!(parse_jokes("   "), Err(GeneratorError::EmptyBatch));
        assert_eq!(parse_jokes(r#"{"jokes":[]}"#), Err(GeneratorError::EmptyBatch));
        assert_eq!(parse_jokes("```json\n```"), Err(GeneratorError::EmptyBatch));
    }
}

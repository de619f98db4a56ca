//! Conversation normalisation: resolve the top-level JSON shape once and
//! deserialize each conversation into a typed record with explicit defaults.
//!
//! Exports come in two shapes:
//!
//! ```text
//! { "conversations": [ {..}, {..} ] }     → Shape::Wrapped
//! [ {..}, {..} ]                          → Shape::Bare
//! anything else                           → Shape::Invalid
//! ```
//!
//! Field access is defensive: a missing `id` is an empty string, missing
//! `messages` an empty list, missing `text` an empty string, and any author
//! other than `"user"` collapses to [`Author::Assistant`].

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Key holding the conversation list in the wrapped shape.
pub const CONVERSATIONS_KEY: &str = "conversations";

/// Top-level shape of a conversations file, resolved once after loading.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// `{ "conversations": [...] }`
    Wrapped(Vec<Conversation>),
    /// `[...]`
    Bare(Vec<Conversation>),
    /// Neither; the conversation stage stops.
    Invalid,
}

impl Shape {
    /// Classify a parsed tree.
    ///
    /// An object whose `"conversations"` value is not an array is
    /// [`Shape::Invalid`]. Array elements that are not JSON objects are
    /// skipped with a warning.
    pub fn classify(root: Value) -> Self {
        match root {
            Value::Object(mut map) => match map.remove(CONVERSATIONS_KEY) {
                Some(Value::Array(items)) => Shape::Wrapped(collect_conversations(items)),
                _ => Shape::Invalid,
            },
            Value::Array(items) => Shape::Bare(collect_conversations(items)),
            _ => Shape::Invalid,
        }
    }

    /// The conversation sequence, or `None` for [`Shape::Invalid`].
    pub fn into_conversations(self) -> Option<Vec<Conversation>> {
        match self {
            Shape::Wrapped(c) | Shape::Bare(c) => Some(c),
            Shape::Invalid => None,
        }
    }
}

fn collect_conversations(items: Vec<Value>) -> Vec<Conversation> {
    items
        .into_iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            if !item.is_object() {
                warn!("Skipping conversation #{}: not a JSON object", idx + 1);
                return None;
            }
            match serde_json::from_value::<Conversation>(item) {
                Ok(c) => Some(c),
                Err(e) => {
                    warn!("Skipping conversation #{}: {}", idx + 1, e);
                    None
                }
            }
        })
        .collect()
}

/// One chat thread.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Conversation {
    /// Identifier as found in the export; empty when absent.
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,

    /// Turns in source order; empty when absent.
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Header label, e.g. `"Conversation abc123"`.
    pub fn label(&self) -> String {
        format!("Conversation {}", self.id)
    }
}

/// One turn in a conversation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Message {
    #[serde(default, deserialize_with = "lenient_author")]
    pub author: Author,

    /// Epoch seconds; `None` when absent or not a number.
    #[serde(default, deserialize_with = "lenient_number")]
    pub timestamp: Option<f64>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub text: String,
}

/// Binary author classification: exactly two rendered labels exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Author {
    User,
    #[default]
    Assistant,
}

impl Author {
    /// `"user"` (case-insensitive, surrounding whitespace ignored) is
    /// [`Author::User`]; every other value is [`Author::Assistant`].
    pub fn classify(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("user") => Author::User,
            _ => Author::Assistant,
        }
    }

    /// Rendered speaker label.
    pub fn label<'a>(&self, assistant_label: &'a str) -> &'a str {
        match self {
            Author::User => "User",
            Author::Assistant => assistant_label,
        }
    }
}

// ── Lenient field deserializers ──────────────────────────────────────────

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_f64())
}

fn lenient_author<'de, D>(deserializer: D) -> Result<Author, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(Author::classify(value.as_str()))
}

fn lenient_messages<'de, D>(deserializer: D) -> Result<Vec<Message>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };

    Ok(items
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conv(id: &str, text: &str) -> Value {
        json!({ "id": id, "messages": [ { "author": "user", "text": text } ] })
    }

    #[test]
    fn wrapped_shape_yields_list() {
        let root = json!({ "conversations": [conv("x", "a"), conv("y", "b")] });
        let shape = Shape::classify(root);
        assert!(matches!(shape, Shape::Wrapped(_)));
        let convs = shape.into_conversations().unwrap();
        assert_eq!(convs.len(), 2);
        assert_eq!(convs[0].id, "x");
        assert_eq!(convs[1].id, "y");
    }

    #[test]
    fn bare_shape_yields_same_list() {
        let wrapped = Shape::classify(json!({ "conversations": [conv("x", "a"), conv("y", "b")] }))
            .into_conversations()
            .unwrap();
        let shape = Shape::classify(json!([conv("x", "a"), conv("y", "b")]));
        assert!(matches!(shape, Shape::Bare(_)));
        assert_eq!(shape.into_conversations().unwrap(), wrapped);
    }

    #[test]
    fn object_without_key_is_invalid() {
        let shape = Shape::classify(json!({ "foo": 1 }));
        assert_eq!(shape, Shape::Invalid);
        assert!(shape.into_conversations().is_none());
    }

    #[test]
    fn non_array_conversations_value_is_invalid() {
        assert_eq!(
            Shape::classify(json!({ "conversations": { "a": 1 } })),
            Shape::Invalid
        );
    }

    #[test]
    fn scalar_root_is_invalid() {
        assert_eq!(Shape::classify(json!("hello")), Shape::Invalid);
        assert_eq!(Shape::classify(json!(42)), Shape::Invalid);
    }

    #[test]
    fn non_object_elements_are_skipped() {
        let convs = Shape::classify(json!([1, conv("keep", "x"), "nope"]))
            .into_conversations()
            .unwrap();
        assert_eq!(convs.len(), 1);
        assert_eq!(convs[0].id, "keep");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let convs = Shape::classify(json!([{}])).into_conversations().unwrap();
        assert_eq!(convs[0], Conversation::default());
        assert_eq!(convs[0].label(), "Conversation ");
    }

    #[test]
    fn numeric_id_rendered_as_text() {
        let convs = Shape::classify(json!([{ "id": 17 }])).into_conversations().unwrap();
        assert_eq!(convs[0].id, "17");
    }

    #[test]
    fn message_defaults() {
        let m: Message = serde_json::from_value(json!({})).unwrap();
        assert_eq!(m.author, Author::Assistant);
        assert_eq!(m.timestamp, None);
        assert_eq!(m.text, "");
    }

    #[test]
    fn null_text_is_empty() {
        let m: Message = serde_json::from_value(json!({ "text": null })).unwrap();
        assert_eq!(m.text, "");
    }

    #[test]
    fn non_numeric_timestamp_is_absent() {
        let m: Message = serde_json::from_value(json!({ "timestamp": "yesterday" })).unwrap();
        assert_eq!(m.timestamp, None);
        let m: Message = serde_json::from_value(json!({ "timestamp": 1700000000.5 })).unwrap();
        assert_eq!(m.timestamp, Some(1_700_000_000.5));
    }

    #[test]
    fn author_classification_is_binary() {
        assert_eq!(Author::classify(Some("user")), Author::User);
        assert_eq!(Author::classify(Some("User ")), Author::User);
        assert_eq!(Author::classify(Some("assistant")), Author::Assistant);
        assert_eq!(Author::classify(Some("system")), Author::Assistant);
        assert_eq!(Author::classify(Some("tool")), Author::Assistant);
        assert_eq!(Author::classify(None), Author::Assistant);
    }

    #[test]
    fn missing_author_renders_assistant_label() {
        let m: Message = serde_json::from_value(json!({ "text": "hi" })).unwrap();
        assert_eq!(m.author.label("ChatGPT"), "ChatGPT");
        let m: Message = serde_json::from_value(json!({ "author": "user" })).unwrap();
        assert_eq!(m.author.label("ChatGPT"), "User");
    }

    #[test]
    fn non_string_author_is_assistant() {
        let m: Message = serde_json::from_value(json!({ "author": { "role": "user" } })).unwrap();
        assert_eq!(m.author, Author::Assistant);
    }

    #[test]
    fn malformed_messages_are_dropped_not_fatal() {
        let convs = Shape::classify(json!([{ "id": "a", "messages": "oops" }]))
            .into_conversations()
            .unwrap();
        assert!(convs[0].messages.is_empty());

        let convs = Shape::classify(json!([{ "messages": [ 5, { "text": "ok" } ] }]))
            .into_conversations()
            .unwrap();
        assert_eq!(convs[0].messages.len(), 1);
        assert_eq!(convs[0].messages[0].text, "ok");
    }
}

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fingerprint::Fingerprint;
use crate::InventoryError;

/// A single setup/punchline pair.
///
/// Jokes carry no identifier. Identity is the [`Fingerprint`] of the
/// canonical form returned by [`Joke::canonical_json`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Joke {
    pub setup: String,
    pub punchline: String,
}

impl Joke {
    pub fn new(setup: impl Into<String>, punchline: impl Into<String>) -> Self {
        Self {
            setup: setup.into(),
            punchline: punchline.into(),
        }
    }

    /// Compact JSON with keys in declaration order: `{"setup":..,"punchline":..}`.
    ///
    /// The form is re-emitted from the typed value, so the key order or
    /// spacing of whatever produced the joke never leaks into its identity.
    /// Bytes inside the strings are kept exactly as given.
    pub fn canonical_json(&self) -> String {
        format!(
            "{{\"setup\":{},\"punchline\":{}}}",
            Value::String(self.setup.clone()),
            Value::String(self.punchline.clone())
        )
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of_canonical(self.canonical_json().as_bytes())
    }

    /// Decode a joke previously stored in canonical form.
    pub fn from_canonical_json(raw: &str) -> Result<Self, InventoryError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_json_is_compact_and_ordered() {
        let joke = Joke::new("Why?", "Because.");
        assert_eq!(
            joke.canonical_json(),
            r#"{"setup":"Why?","punchline":"Because."}"#
        );
    }

    #[test]
    fn key_order_of_input_does_not_change_identity() {
        let a: Joke = serde_json::from_str(r#"{"setup":"s","punchline":"p"}"#).unwrap();
        let b: Joke = serde_json::from_str(r#"{ "punchline": "p",  "setup": "s" }"#).unwrap();
        assert_eq!(a.canonical_json(), b.canonical_json());
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn whitespace_and_emoji_inside_fields_are_significant() {
        let plain = Joke::new("Knock knock", "Who's there?");
        let spaced = Joke::new("Knock knock ", "Who's there?");
        let emoji = Joke::new("Knock knock", "Who's there? 🚪");
        assert_ne!(plain.fingerprint(), spaced.fingerprint());
        assert_ne!(plain.fingerprint(), emoji.fingerprint());
    }

    #[test]
    fn canonical_json_matches_serde_output() {
        let joke = Joke::new("Tab\there", "Quote \" and slash \\");
        assert_eq!(joke.canonical_json(), serde_json::to_string(&joke).unwrap());
    }

    #[test]
    fn canonical_roundtrip_preserves_value() {
        let joke = Joke::new("Line \"one\"\n", "ünïcødé 🎉");
        let decoded = Joke::from_canonical_json(&joke.canonical_json()).unwrap();
        assert_eq!(decoded, joke);
    }

    #[test]
    fn from_canonical_json_rejects_garbage() {
        assert!(Joke::from_canonical_json("not json").is_err());
    }
}

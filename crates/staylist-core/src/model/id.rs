// ── Item identity ──
//
// Record ids in the store are either JSON numbers or strings, depending
// on how a collection was seeded. Both compare by their textual form so
// an id typed on the command line matches whatever the store returned.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Identifier of a catalog record, unique within its entity kind.
///
/// Equality, ordering and hashing use the textual form only; the original
/// JSON representation is remembered so full-replace writes echo it back
/// unchanged.
#[derive(Debug, Clone)]
pub struct ItemId {
    text: String,
    numeric: bool,
}

impl ItemId {
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether the store represented this id as a JSON number.
    pub fn is_numeric(&self) -> bool {
        self.numeric
    }
}

impl PartialEq for ItemId {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for ItemId {}

impl Hash for ItemId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for ItemId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self {
            text: n.to_string(),
            numeric: true,
        }
    }
}

impl From<String> for ItemId {
    fn from(text: String) -> Self {
        Self {
            text,
            numeric: false,
        }
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

// ── Serde ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Numeric(u64),
    Text(String),
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.text.parse::<u64>() {
            Ok(n) if self.numeric => serializer.serialize_u64(n),
            _ => serializer.serialize_str(&self.text),
        }
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Numeric(n) => Self::from(n),
            RawId::Text(s) => Self::from(s),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_text_ids_compare_by_text() {
        let from_store: ItemId = serde_json::from_str("7").unwrap();
        let from_cli: ItemId = "7".parse().unwrap();
        assert_eq!(from_store, from_cli);
        assert!(from_store.is_numeric());
        assert!(!from_cli.is_numeric());
    }

    #[test]
    fn serialization_keeps_original_representation() {
        let numeric: ItemId = serde_json::from_str("12").unwrap();
        let text: ItemId = serde_json::from_str("\"a1f3\"").unwrap();
        assert_eq!(serde_json::to_string(&numeric).unwrap(), "12");
        assert_eq!(serde_json::to_string(&text).unwrap(), "\"a1f3\"");
    }

    #[test]
    fn string_digits_stay_strings() {
        let id: ItemId = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"5\"");
        assert_eq!(id, ItemId::from(5));
    }
}

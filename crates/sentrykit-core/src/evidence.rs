//! The heterogeneous evidence tree attached to a [`crate::model::Finding`].
//!
//! Modeled as a closed, tagged enum (rather than reusing `serde_json::Value`
//! directly) so the block-rule's `classification` lookup and the recursive
//! redaction walk stay total: every variant is handled explicitly, so a new
//! evidence shape can't quietly skip redaction.

use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

/// One value in an evidence tree: a string leaf, an integer, a bool, an
/// ordered list, or a nested key/value map.
#[derive(Debug, Clone, PartialEq)]
pub enum EvidenceValue {
    /// A string leaf; the only variant the redaction filter rewrites.
    Str(String),
    /// An integer leaf (pay thresholds, company-size counts, ...).
    Int(i64),
    /// A boolean leaf.
    Bool(bool),
    /// An ordered list of values (e.g. sorted offending locations).
    List(Vec<EvidenceValue>),
    /// A nested key/value map, insertion-ordered.
    Map(EvidenceMap),
}

impl EvidenceValue {
    /// Borrow this value as a string, if it is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Recursively walk every string leaf, rewriting it in place.
    pub fn walk_strings_mut(&mut self, f: &mut impl FnMut(&str) -> String) {
        match self {
            Self::Str(s) => *s = f(s),
            Self::Int(_) | Self::Bool(_) => {}
            Self::List(items) => {
                for item in items {
                    item.walk_strings_mut(f);
                }
            }
            Self::Map(map) => {
                for (_, v) in &mut map.0 {
                    v.walk_strings_mut(f);
                }
            }
        }
    }
}

impl From<&str> for EvidenceValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for EvidenceValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<i64> for EvidenceValue {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<bool> for EvidenceValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl<T: Into<EvidenceValue>> From<Vec<T>> for EvidenceValue {
    fn from(items: Vec<T>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl Serialize for EvidenceValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(s) => serializer.serialize_str(s),
            Self::Int(n) => serializer.serialize_i64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => map.serialize(serializer),
        }
    }
}

/// An insertion-ordered string-keyed map of [`EvidenceValue`]s.
///
/// Ordinary Rust maps (`HashMap`/`BTreeMap`) either lose insertion order
/// or impose alphabetical order; a report should render evidence in the
/// order each checker inserted it, so this is a thin ordered-map
/// newtype instead.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvidenceMap(pub Vec<(String, EvidenceValue)>);

impl EvidenceMap {
    /// Build an empty evidence map.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a key/value pair, appending it in insertion order.
    ///
    /// Replaces the value in place if the key is already present,
    /// preserving its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<EvidenceValue>) -> &mut Self {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.0.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.0.push((key, value));
        }
        self
    }

    /// Builder-style insert, returning `self` by value.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<EvidenceValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EvidenceValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Look up a string-valued entry by key.
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(EvidenceValue::as_str)
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &EvidenceValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl Serialize for EvidenceMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

//! Shared value types used across the catalog and workspace layers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Free-form configuration map attached to an installation.
///
/// Keys are parameter names; interpretation belongs to the template
/// collaborator that renders values files from them.
pub type ContextMap = BTreeMap<String, ContextValue>;

/// A tagged configuration value.
///
/// The catalog delivers arbitrary user-supplied configuration; this enum
/// keeps it structured at the model boundary instead of leaking an "any"
/// type into the core. Serialized untagged so documents read naturally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<ContextValue>),
    Map(BTreeMap<String, ContextValue>),
}

impl ContextValue {
    /// String contents, if this value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ContextValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ContextValue {
    fn from(value: &str) -> Self {
        ContextValue::String(value.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(value: String) -> Self {
        ContextValue::String(value)
    }
}

impl From<bool> for ContextValue {
    fn from(value: bool) -> Self {
        ContextValue::Bool(value)
    }
}

impl From<i64> for ContextValue {
    fn from(value: i64) -> Self {
        ContextValue::Int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untagged_round_trip_through_json() {
        let mut map = ContextMap::new();
        map.insert("region".to_string(), "us-east-1".into());
        map.insert("replicas".to_string(), 3i64.into());
        map.insert("tls".to_string(), true.into());
        map.insert(
            "zones".to_string(),
            ContextValue::List(vec!["a".into(), "b".into()]),
        );

        let json = serde_json::to_string(&map).expect("serialize should succeed");
        let back: ContextMap = serde_json::from_str(&json).expect("deserialize should succeed");
        assert_eq!(back, map);
        assert_eq!(back["region"].as_str(), Some("us-east-1"));
    }

    #[test]
    fn numbers_stay_integers_when_possible() {
        let value: ContextValue = serde_json::from_str("4").expect("deserialize should succeed");
        assert_eq!(value, ContextValue::Int(4));

        let value: ContextValue = serde_json::from_str("4.5").expect("deserialize should succeed");
        assert_eq!(value, ContextValue::Float(4.5));
    }
}

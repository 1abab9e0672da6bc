//! Resource state - the numeric/string values a run accumulates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single resource value.
///
/// Serialized untagged, so save files and episode `vars` hold plain JSON
/// numbers and strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResourceValue {
    Number(f64),
    Text(String),
}

impl ResourceValue {
    /// The numeric value, or `None` for text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            ResourceValue::Number(n) => Some(*n),
            ResourceValue::Text(_) => None,
        }
    }
}

impl From<f64> for ResourceValue {
    fn from(value: f64) -> Self {
        ResourceValue::Number(value)
    }
}

impl From<i32> for ResourceValue {
    fn from(value: i32) -> Self {
        ResourceValue::Number(value.into())
    }
}

impl From<&str> for ResourceValue {
    fn from(value: &str) -> Self {
        ResourceValue::Text(value.to_owned())
    }
}

impl From<String> for ResourceValue {
    fn from(value: String) -> Self {
        ResourceValue::Text(value)
    }
}

impl std::fmt::Display for ResourceValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceValue::Number(n) => write!(f, "{}", n),
            ResourceValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Mutable resource state owned by one run.
///
/// Absent keys read as `0` for every numeric purpose.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceState {
    values: BTreeMap<String, ResourceValue>,
}

impl ResourceState {
    /// Create an empty resource state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly useful for seeding a run.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ResourceValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Get the raw value for a key.
    pub fn get(&self, key: &str) -> Option<&ResourceValue> {
        self.values.get(key)
    }

    /// Read a key as a number, defaulting to `0` when absent.
    ///
    /// Returns `None` when the key holds text.
    pub fn number_or_default(&self, key: &str) -> Option<f64> {
        match self.values.get(key) {
            None => Some(0.0),
            Some(value) => value.as_number(),
        }
    }

    /// Overwrite a key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ResourceValue>) {
        self.values.insert(key.into(), value.into());
    }

    /// Add `delta` to a key and return the new value.
    ///
    /// An absent key starts at `0`. A text value cannot be summed; it is
    /// replaced as though it were `0`.
    pub fn add(&mut self, key: &str, delta: f64) -> f64 {
        let current = match self.number_or_default(key) {
            Some(n) => n,
            None => {
                tracing::warn!(key, delta, "adding to a text resource, treating it as 0");
                0.0
            }
        };
        let updated = current + delta;
        self.values.insert(key.to_owned(), ResourceValue::Number(updated));
        updated
    }

    /// Render a key for display, `0` when absent.
    pub fn render(&self, key: &str) -> String {
        self.values
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "0".to_owned())
    }

    /// Check if a key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Number of keys held.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no keys are held.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<ResourceValue>> FromIterator<(K, V)> for ResourceState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_key_reads_as_zero() {
        let state = ResourceState::new();
        assert_eq!(state.number_or_default("gold"), Some(0.0));
        assert_eq!(state.render("gold"), "0");
        assert!(!state.contains("gold"));
    }

    #[test]
    fn test_text_value_is_not_a_number() {
        let state = ResourceState::new().with("mood", "grim");
        assert_eq!(state.number_or_default("mood"), None);
        assert_eq!(state.render("mood"), "grim");
    }

    #[test]
    fn test_add_accumulates() {
        let mut state = ResourceState::new();
        assert_eq!(state.add("gold", 5.0), 5.0);
        assert_eq!(state.add("gold", -2.0), 3.0);
        assert_eq!(state.get("gold"), Some(&ResourceValue::Number(3.0)));
    }

    #[test]
    fn test_add_over_text_starts_from_zero() {
        let mut state = ResourceState::new().with("gold", "lots");
        assert_eq!(state.add("gold", 4.0), 4.0);
    }

    #[test]
    fn test_whole_numbers_render_without_fraction() {
        assert_eq!(ResourceValue::from(5).to_string(), "5");
        assert_eq!(ResourceValue::from(2.5).to_string(), "2.5");
    }

    #[test]
    fn test_json_shape_is_plain() {
        let state = ResourceState::new().with("gold", 10).with("name", "Ada");
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json, serde_json::json!({ "gold": 10.0, "name": "Ada" }));

        let back: ResourceState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }
}

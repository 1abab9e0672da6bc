//! Resource mechanics: requirement checks, gains, `set` semantics and
//! summary interpolation.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::resources::{ResourceState, ResourceValue};

/// Minimum thresholds keyed by resource.
pub type Requirement = BTreeMap<String, f64>;

/// Additive deltas keyed by resource.
pub type Gain = BTreeMap<String, f64>;

static INTEGER_DELTA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-+]?[0-9]+$").expect("valid integer pattern"));

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(.*?)\}").expect("valid placeholder pattern"));

/// Check a requirement against the current state.
///
/// No requirement always passes. Otherwise every key must read (defaulting
/// to `0`) at or above its threshold. A text value never meets a threshold.
pub fn check_req(req: Option<&Requirement>, state: &ResourceState) -> bool {
    let Some(req) = req else {
        return true;
    };

    req.iter().all(|(key, threshold)| match state.number_or_default(key) {
        Some(value) => value >= *threshold,
        None => {
            tracing::warn!(key = key.as_str(), "requirement checked against a text resource");
            false
        }
    })
}

/// Add every delta in `gain` into the state. Never overwrites.
pub fn apply_gain(gain: Option<&Gain>, state: &mut ResourceState) {
    let Some(gain) = gain else {
        return;
    };

    for (key, delta) in gain {
        state.add(key, *delta);
    }
}

/// Parse a `set` value written as a signed integer string, e.g. `"+3"`.
pub fn integer_delta(value: &str) -> Option<f64> {
    if !INTEGER_DELTA.is_match(value) {
        return None;
    }
    // Digits beyond i64 range still count as a delta.
    value
        .parse::<i64>()
        .map(|n| n as f64)
        .or_else(|_| value.parse::<f64>())
        .ok()
}

/// Apply the variables of a `set` node.
///
/// Signed integer strings are deltas; anything else (numbers, other text)
/// overwrites the key.
pub fn apply_set(vars: &BTreeMap<String, ResourceValue>, state: &mut ResourceState) {
    for (key, value) in vars {
        match value {
            ResourceValue::Text(text) => match integer_delta(text) {
                Some(delta) => {
                    state.add(key, delta);
                }
                None => state.set(key.as_str(), value.clone()),
            },
            ResourceValue::Number(_) => state.set(key.as_str(), value.clone()),
        }
    }
}

/// Substitute every `{key}` placeholder with the current value of `key`.
pub fn interpolate(template: &str, state: &ResourceState) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| state.render(&caps[1]))
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(pairs: &[(&str, f64)]) -> Requirement {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn test_no_requirement_passes() {
        assert!(check_req(None, &ResourceState::new()));
    }

    #[test]
    fn test_requirement_defaults_to_zero() {
        let state = ResourceState::new();
        assert!(!check_req(Some(&req(&[("gold", 10.0)])), &state));
        assert!(check_req(Some(&req(&[("gold", 0.0)])), &state));
        assert!(check_req(Some(&req(&[("debt", -5.0)])), &state));
    }

    #[test]
    fn test_requirement_needs_every_key() {
        let state = ResourceState::new().with("gold", 10).with("energy", 1);
        assert!(check_req(Some(&req(&[("gold", 10.0), ("energy", 1.0)])), &state));
        assert!(!check_req(Some(&req(&[("gold", 10.0), ("energy", 2.0)])), &state));
    }

    #[test]
    fn test_requirement_on_text_is_not_met() {
        let state = ResourceState::new().with("gold", "plenty");
        assert!(!check_req(Some(&req(&[("gold", 1.0)])), &state));
    }

    #[test]
    fn test_gain_adds_and_leaves_other_keys() {
        let mut state = ResourceState::new().with("gold", 3).with("name", "Ada");
        apply_gain(Some(&req(&[("gold", 2.0), ("runes", -1.0)])), &mut state);

        assert_eq!(state.number_or_default("gold"), Some(5.0));
        assert_eq!(state.number_or_default("runes"), Some(-1.0));
        assert_eq!(state.get("name"), Some(&ResourceValue::from("Ada")));
    }

    #[test]
    fn test_absent_gain_is_noop() {
        let mut state = ResourceState::new().with("gold", 3);
        apply_gain(None, &mut state);
        assert_eq!(state, ResourceState::new().with("gold", 3));
    }

    #[test]
    fn test_integer_delta_pattern() {
        assert_eq!(integer_delta("5"), Some(5.0));
        assert_eq!(integer_delta("+5"), Some(5.0));
        assert_eq!(integer_delta("-12"), Some(-12.0));
        assert_eq!(integer_delta("1.5"), None);
        assert_eq!(integer_delta(" 5"), None);
        assert_eq!(integer_delta("five"), None);
        assert_eq!(integer_delta(""), None);
    }

    #[test]
    fn test_set_integer_string_accumulates_twice() {
        let vars: BTreeMap<String, ResourceValue> =
            [("gold".to_string(), ResourceValue::from("+3"))].into_iter().collect();
        let mut state = ResourceState::new();

        apply_set(&vars, &mut state);
        apply_set(&vars, &mut state);

        assert_eq!(state.number_or_default("gold"), Some(6.0));
    }

    #[test]
    fn test_set_literal_overwrites_idempotently() {
        let vars: BTreeMap<String, ResourceValue> = [
            ("mood".to_string(), ResourceValue::from("brave")),
            ("gold".to_string(), ResourceValue::from(7)),
        ]
        .into_iter()
        .collect();
        let mut state = ResourceState::new().with("gold", 100);

        apply_set(&vars, &mut state);
        let once = state.clone();
        apply_set(&vars, &mut state);

        assert_eq!(state, once);
        assert_eq!(state.render("mood"), "brave");
        assert_eq!(state.number_or_default("gold"), Some(7.0));
    }

    #[test]
    fn test_interpolate_summary() {
        let state = ResourceState::new().with("gold", 5).with("name", "Ada");
        assert_eq!(interpolate("Final gold: {gold}", &state), "Final gold: 5");
        assert_eq!(interpolate("{name} has {runes} runes", &state), "Ada has 0 runes");
        assert_eq!(interpolate("no placeholders", &state), "no placeholders");
    }
}

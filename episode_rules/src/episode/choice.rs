//! Choice options offered by a `choice` node.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::NodeId;
use crate::mechanics::{check_req, Gain, Requirement};
use crate::resources::ResourceState;

static PREMIUM_META: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)premium|iap").expect("valid premium pattern"));

/// One selectable option of a choice.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    #[serde(default)]
    pub id: String,

    pub label: String,

    #[serde(default)]
    pub next: NodeId,

    /// Applied to the state when the option is taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gain: Option<Gain>,

    /// Gates whether the option can be taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub req: Option<Requirement>,

    /// Free-form metadata; only used for display annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<String>,
}

impl ChoiceOption {
    /// Create an option leading to `next`.
    pub fn new(id: impl Into<String>, label: impl Into<String>, next: impl Into<NodeId>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            next: next.into(),
            ..Default::default()
        }
    }

    /// Set the gain applied on selection.
    pub fn with_gain(mut self, key: impl Into<String>, delta: f64) -> Self {
        self.gain.get_or_insert_with(Gain::new).insert(key.into(), delta);
        self
    }

    /// Add a requirement threshold.
    pub fn with_req(mut self, key: impl Into<String>, threshold: f64) -> Self {
        self.req
            .get_or_insert_with(Requirement::new)
            .insert(key.into(), threshold);
        self
    }

    /// Set the metadata string.
    pub fn with_meta(mut self, meta: impl Into<String>) -> Self {
        self.meta = Some(meta.into());
        self
    }

    /// Whether the option can be taken in the given state.
    pub fn is_selectable(&self, state: &ResourceState) -> bool {
        check_req(self.req.as_ref(), state)
    }

    /// Whether the metadata marks this as a premium purchase.
    pub fn is_premium(&self) -> bool {
        self.meta
            .as_deref()
            .is_some_and(|meta| PREMIUM_META.is_match(meta))
    }

    /// Cost annotation shown after the label, e.g. `" (3 energy, premium)"`.
    ///
    /// Empty when there is nothing to show.
    pub fn cost_annotation(&self) -> String {
        let mut parts = Vec::new();

        if let Some(gain) = &self.gain {
            for resource in ["energy", "runes"] {
                if let Some(delta) = gain.get(resource).filter(|d| **d < 0.0) {
                    parts.push(format!("{} {}", -delta, resource));
                }
            }
        }

        if self.is_premium() {
            parts.push("premium".to_owned());
        }

        if parts.is_empty() {
            String::new()
        } else {
            format!(" ({})", parts.join(", "))
        }
    }
}

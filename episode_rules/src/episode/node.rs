//! Node variants.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{ChoiceOption, NodeId};
use crate::mechanics::Requirement;
use crate::resources::ResourceValue;

/// Where a portrait is placed on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpritePosition {
    Left,
    Right,
    /// Also used for any unrecognised position.
    #[default]
    #[serde(other)]
    Center,
}

/// One step of an episode, tagged by `type`.
///
/// A missing `next` deserializes to the terminal id, which ends the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Node {
    /// Change the background.
    Bg {
        bg: String,
        #[serde(default)]
        next: NodeId,
    },

    /// Start a looping music track.
    Music {
        music: String,
        #[serde(default)]
        next: NodeId,
    },

    /// A line of dialogue.
    Say {
        who: String,
        text: String,
        #[serde(default)]
        next: NodeId,
    },

    /// Mutate resource state. See [`crate::apply_set`].
    Set {
        #[serde(default)]
        vars: BTreeMap<String, ResourceValue>,
        #[serde(default)]
        next: NodeId,
    },

    /// Place or update a named portrait.
    Sprite {
        who: String,
        sprite: String,
        #[serde(default)]
        pos: SpritePosition,
        #[serde(default)]
        next: NodeId,
    },

    /// Wait for the player to pick an option.
    Choice {
        #[serde(default)]
        text: String,
        options: Vec<ChoiceOption>,
    },

    /// Branch on a requirement without waiting.
    Check {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        req: Option<Requirement>,
        #[serde(rename = "onPass", default)]
        on_pass: NodeId,
        #[serde(rename = "onFail", default)]
        on_fail: NodeId,
    },

    /// A one-shot sound effect.
    Sfx {
        sfx: String,
        #[serde(default)]
        next: NodeId,
    },

    /// Hand off to an external minigame.
    Minigame {
        id: String,
        #[serde(default)]
        rules: String,
        #[serde(rename = "onWin", default)]
        on_win: NodeId,
        #[serde(rename = "onLose", default)]
        on_lose: NodeId,
    },

    /// Unconditional branch.
    Jump { to: NodeId },

    /// Terminate the run, optionally rendering a summary.
    End {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        save: Option<bool>,
    },

    /// Any `type` tag this build does not understand.
    #[serde(other)]
    Unknown,
}

impl Node {
    /// The `type` tag of this node.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Bg { .. } => "bg",
            Node::Music { .. } => "music",
            Node::Say { .. } => "say",
            Node::Set { .. } => "set",
            Node::Sprite { .. } => "sprite",
            Node::Choice { .. } => "choice",
            Node::Check { .. } => "check",
            Node::Sfx { .. } => "sfx",
            Node::Minigame { .. } => "minigame",
            Node::Jump { .. } => "jump",
            Node::End { .. } => "end",
            Node::Unknown => "unknown",
        }
    }

    /// Every id this node can transition to.
    pub fn targets(&self) -> Vec<&NodeId> {
        match self {
            Node::Bg { next, .. }
            | Node::Music { next, .. }
            | Node::Say { next, .. }
            | Node::Set { next, .. }
            | Node::Sprite { next, .. }
            | Node::Sfx { next, .. } => vec![next],
            Node::Choice { options, .. } => options.iter().map(|o| &o.next).collect(),
            Node::Check { on_pass, on_fail, .. } => vec![on_pass, on_fail],
            Node::Minigame { on_win, on_lose, .. } => vec![on_win, on_lose],
            Node::Jump { to } => vec![to],
            Node::End { .. } | Node::Unknown => Vec::new(),
        }
    }
}

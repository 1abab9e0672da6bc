//! Presentation - the contract between the interpreter and whatever shows
//! the episode to a player.
//!
//! The interpreter only ever hands over asset keys; resolving them to
//! images or audio is the sink's business.

mod transcript;

pub use transcript::*;

use episode_rules::{ChoiceOption, NodeId, ResourceState, SpritePosition};
use serde::{Deserialize, Serialize};

/// A player-visible effect of one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Effect {
    Background {
        asset: String,
    },

    /// Start a looping track.
    Music {
        asset: String,
    },

    /// A line of text. Narration has no speaker.
    Line {
        speaker: Option<String>,
        text: String,
    },

    Sprite {
        who: String,
        asset: String,
        position: SpritePosition,
    },

    /// One-shot sound effect.
    Sound {
        asset: String,
    },

    Minigame {
        id: String,
        rules: String,
    },
}

impl Effect {
    /// A line without a speaker.
    pub fn narration(text: impl Into<String>) -> Self {
        Effect::Line {
            speaker: None,
            text: text.into(),
        }
    }
}

/// Failure reported by a sink. Never stops the run.
#[derive(Debug, thiserror::Error)]
pub enum PresentationError {
    #[error("playback of {asset} failed: {reason}")]
    Playback { asset: String, reason: String },

    #[error("render failed: {0}")]
    Render(String),
}

/// Outcome of an external minigame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MinigameOutcome {
    Won,
    Lost,
}

/// How one option of a choice is shown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceView {
    /// Position within the node's options; this is what a sink returns.
    pub index: usize,
    pub id: String,
    pub label: String,
    /// Cost annotation such as `" (3 energy)"`, possibly empty.
    pub annotation: String,
    /// Options whose requirement fails are shown but cannot be picked.
    pub selectable: bool,
}

impl ChoiceView {
    pub fn new(index: usize, option: &ChoiceOption, state: &ResourceState) -> Self {
        Self {
            index,
            id: option.id.clone(),
            label: option.label.clone(),
            annotation: option.cost_annotation(),
            selectable: option.is_selectable(state),
        }
    }

    /// Label followed by its annotation.
    pub fn display_label(&self) -> String {
        format!("{}{}", self.label, self.annotation)
    }
}

/// A pending choice waiting for the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoicePrompt {
    pub node_id: NodeId,
    pub text: String,
    pub options: Vec<ChoiceView>,
}

impl ChoicePrompt {
    pub fn new(node_id: NodeId, text: &str, options: &[ChoiceOption], state: &ResourceState) -> Self {
        Self {
            node_id,
            text: text.to_owned(),
            options: options
                .iter()
                .enumerate()
                .map(|(index, option)| ChoiceView::new(index, option, state))
                .collect(),
        }
    }

    /// The options that can currently be picked.
    pub fn selectable(&self) -> impl Iterator<Item = &ChoiceView> {
        self.options.iter().filter(|view| view.selectable)
    }
}

/// Renders node effects and collects player input.
pub trait PresentationSink {
    /// Show an effect. Errors are logged by the caller and otherwise ignored.
    fn render(&mut self, effect: &Effect) -> Result<(), PresentationError>;

    /// Wait for the player and return the index of the chosen option, or
    /// `None` when no answer will ever come (e.g. input was closed).
    ///
    /// Must only return a selectable option; anything else is rejected and
    /// the sink is asked again.
    fn choose(&mut self, prompt: &ChoicePrompt) -> Option<usize>;

    /// Play a minigame. Only consulted under the `ask_sink` minigame policy.
    fn resolve_minigame(&mut self, _id: &str, _rules: &str) -> MinigameOutcome {
        MinigameOutcome::Won
    }

    /// Called once between transitions so the previous effect can be flushed.
    fn yield_now(&mut self) {}
}

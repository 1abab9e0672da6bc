//! Interpreter errors.

use episode_rules::NodeId;

use crate::persistence::PersistenceError;

/// Why a step or choice resolution failed.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// A referenced node is absent from the graph. Fatal.
    #[error("node {node_id} not found")]
    MissingNode { node_id: NodeId },

    /// A node's type tag is not understood. Fatal.
    #[error("unknown node type at {node_id}")]
    UnknownNodeVariant { node_id: NodeId },

    /// A save for one episode was offered to another.
    #[error("save belongs to episode {found}, not {expected}")]
    EpisodeMismatch { expected: String, found: String },

    #[error("no choice is pending")]
    NotAwaitingChoice,

    /// The choice is still pending.
    #[error("choice has no option {index}")]
    UnknownOption { index: usize },

    /// The choice is still pending.
    #[error("option {index} does not meet its requirement")]
    RequirementNotMet { index: usize },

    /// The sink had no answer for a choice. The choice is still pending.
    #[error("no answer for the choice at {node_id}")]
    ChoiceAbandoned { node_id: NodeId },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl RunError {
    /// Whether the run cannot continue past this error.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RunError::MissingNode { .. } | RunError::UnknownNodeVariant { .. }
        )
    }

    /// Whether this rejects a single choice resolution, leaving it pending.
    pub fn is_rejected_choice(&self) -> bool {
        matches!(
            self,
            RunError::UnknownOption { .. } | RunError::RequirementNotMet { .. }
        )
    }
}

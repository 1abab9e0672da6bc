//! Episode definitions - the node graph a run walks.

mod choice;
mod node;

pub use choice::*;
pub use node::*;

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Identifier of a node within an episode.
///
/// The empty id is the terminal position: a run that reaches it is over.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    /// Create a node id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The terminal (empty) node id.
    pub fn terminal() -> Self {
        Self(String::new())
    }

    /// Whether this id marks the end of a run.
    pub fn is_terminal(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for NodeId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NodeId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors raised while loading an episode document.
#[derive(Debug, thiserror::Error)]
pub enum EpisodeError {
    #[error("failed to read episode file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed episode document: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A complete branching-narrative unit.
///
/// Node references are resolved lazily by whoever walks the graph; loading
/// never validates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub episode_id: String,

    #[serde(default)]
    pub title: String,

    /// Node the episode starts at.
    pub start: NodeId,

    pub nodes: HashMap<NodeId, Node>,
}

impl Episode {
    /// Create an empty episode starting at `start`.
    pub fn new(episode_id: impl Into<String>, start: impl Into<NodeId>) -> Self {
        Self {
            episode_id: episode_id.into(),
            title: String::new(),
            start: start.into(),
            nodes: HashMap::new(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add a node under `id`.
    pub fn with_node(mut self, id: impl Into<NodeId>, node: Node) -> Self {
        self.nodes.insert(id.into(), node);
        self
    }

    /// Parse an episode from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, EpisodeError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an episode from any JSON reader.
    pub fn from_reader(reader: impl std::io::Read) -> Result<Self, EpisodeError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load an episode document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EpisodeError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| EpisodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    /// Resolve a single node id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Every non-terminal id some node transitions to, sorted and deduplicated.
    ///
    /// Diagnostics only; nothing requires these to resolve.
    pub fn referenced_ids(&self) -> Vec<&NodeId> {
        let mut ids: Vec<_> = self
            .nodes
            .values()
            .flat_map(|node| node.targets())
            .filter(|id| !id.is_terminal())
            .collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "episodeId": "ep1",
        "title": "The Market",
        "start": "intro",
        "nodes": {
            "intro": { "type": "say", "who": "Mira", "text": "Welcome.", "next": "shop" },
            "shop": {
                "type": "choice",
                "text": "Buy something?",
                "options": [
                    { "id": "buy", "label": "Buy", "next": "done", "gain": { "gold": -10 }, "req": { "gold": 10 } },
                    { "id": "leave", "label": "Leave", "next": "done" }
                ]
            },
            "gate": { "type": "check", "req": { "gold": 10 }, "onPass": "done", "onFail": "intro" },
            "done": { "type": "end", "summary": "Gold: {gold}" }
        }
    }"#;

    #[test]
    fn test_parse_episode() {
        let episode = Episode::from_json_str(SAMPLE).unwrap();
        assert_eq!(episode.episode_id, "ep1");
        assert_eq!(episode.title, "The Market");
        assert_eq!(episode.start, NodeId::from("intro"));
        assert_eq!(episode.nodes.len(), 4);

        match episode.node("gate") {
            Some(Node::Check { on_pass, on_fail, .. }) => {
                assert_eq!(on_pass.as_str(), "done");
                assert_eq!(on_fail.as_str(), "intro");
            }
            other => panic!("expected check node, got {:?}", other),
        }
    }

    #[test]
    fn test_lookup_missing_node() {
        let episode = Episode::from_json_str(SAMPLE).unwrap();
        assert!(episode.node("nowhere").is_none());
    }

    #[test]
    fn test_referenced_ids() {
        let episode = Episode::from_json_str(SAMPLE).unwrap();
        let ids: Vec<_> = episode.referenced_ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, vec!["done", "intro", "shop"]);
    }

    #[test]
    fn test_malformed_document() {
        let err = Episode::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, EpisodeError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Episode::load("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, EpisodeError::Io { .. }));
    }

    #[test]
    fn test_builder() {
        let episode = Episode::new("ep2", "a")
            .with_title("Short")
            .with_node("a", Node::Jump { to: "b".into() })
            .with_node("b", Node::End { summary: None, save: None });

        assert_eq!(episode.title, "Short");
        assert!(episode.node("a").is_some());
        assert!(episode.node("b").is_some());
    }
}

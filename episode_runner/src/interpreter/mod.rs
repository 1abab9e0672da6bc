//! Interpreter - walks an episode's node graph one transition at a time.
//!
//! A run is a small state machine: it is either at a node or finished (the
//! current id is empty). [`EpisodeRunner::step`] dispatches the current node
//! and persists the resulting position. A `choice` node suspends the run
//! until [`EpisodeRunner::choose`] resolves it. The host decides when to call
//! each; [`EpisodeRunner::run_to_end`] is the plain loop that yields once per
//! transition.

mod error;

pub use error::*;

use episode_rules::{
    apply_gain, apply_set, check_req, interpolate, Episode, Node, NodeId, ResourceState,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{MinigamePolicy, RunnerConfig};
use crate::persistence::{PersistenceError, PersistenceGateway, SaveRecord, SaveStore};
use crate::presentation::{ChoicePrompt, Effect, MinigameOutcome, PresentationSink};

/// Identifies one run in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Create a new random run ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of one step or choice resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// Moved to `next`. The host should yield before stepping again.
    Advanced { next: NodeId },

    /// Suspended on a choice until [`EpisodeRunner::choose`] is called.
    AwaitingChoice(ChoicePrompt),

    /// The run reached the terminal position.
    Finished,
}

/// Executes one run of an episode.
///
/// The episode is borrowed for the whole run; resource state is owned.
#[derive(Debug)]
pub struct EpisodeRunner<'a> {
    episode: &'a Episode,
    config: RunnerConfig,
    run_id: RunId,
    current: NodeId,
    state: ResourceState,
    awaiting_choice: bool,
}

impl<'a> EpisodeRunner<'a> {
    /// Start at the episode's declared start with empty state.
    pub fn new(episode: &'a Episode, config: RunnerConfig) -> Self {
        Self::resume(episode, episode.start.clone(), ResourceState::new(), config)
    }

    /// Start at an arbitrary node with arbitrary state.
    ///
    /// Nothing is validated here; a bad id fails on the first step.
    pub fn resume(
        episode: &'a Episode,
        start: impl Into<NodeId>,
        state: ResourceState,
        config: RunnerConfig,
    ) -> Self {
        let runner = Self {
            episode,
            config,
            run_id: RunId::new(),
            current: start.into(),
            state,
            awaiting_choice: false,
        };
        tracing::info!(
            run_id = %runner.run_id,
            episode = episode.episode_id.as_str(),
            node = %runner.current,
            "run started"
        );
        runner
    }

    /// Resume from a save record, which must belong to this episode.
    pub fn from_save(
        episode: &'a Episode,
        record: &SaveRecord,
        config: RunnerConfig,
    ) -> Result<Self, RunError> {
        if record.episode_id != episode.episode_id {
            return Err(RunError::EpisodeMismatch {
                expected: episode.episode_id.clone(),
                found: record.episode_id.clone(),
            });
        }
        Ok(Self::resume(
            episode,
            record.node_id.clone(),
            record.resources.clone(),
            config,
        ))
    }

    /// Resume from the gateway's auto slot if it holds an unfinished run of
    /// this episode, otherwise start fresh.
    ///
    /// A slot that cannot be decoded also starts fresh; failing to read the
    /// slot at all is returned.
    pub fn resume_latest<S: SaveStore>(
        episode: &'a Episode,
        gateway: &PersistenceGateway<S>,
        config: RunnerConfig,
    ) -> Result<Self, RunError> {
        let saved = match gateway.load_for_episode(gateway.auto_slot(), &episode.episode_id) {
            Ok(saved) => saved,
            Err(
                err @ (PersistenceError::Serde(_) | PersistenceError::UnsupportedVersion { .. }),
            ) => {
                tracing::warn!(
                    episode = episode.episode_id.as_str(),
                    error = %err,
                    "unreadable auto save, starting fresh"
                );
                None
            }
            Err(err) => return Err(err.into()),
        };

        match saved {
            Some(record) if !record.is_finished() => {
                tracing::info!(
                    episode = episode.episode_id.as_str(),
                    node = %record.node_id,
                    "resuming from save"
                );
                Self::from_save(episode, &record, config)
            }
            _ => Ok(Self::new(episode, config)),
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    /// The node the next step dispatches; empty once finished.
    pub fn current_node(&self) -> &NodeId {
        &self.current
    }

    pub fn state(&self) -> &ResourceState {
        &self.state
    }

    pub fn into_state(self) -> ResourceState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn is_awaiting_choice(&self) -> bool {
        self.awaiting_choice
    }

    /// Dispatch the current node.
    ///
    /// While a choice is pending this only returns the prompt again.
    pub fn step<P, S>(
        &mut self,
        sink: &mut P,
        gateway: &mut PersistenceGateway<S>,
    ) -> Result<StepOutcome, RunError>
    where
        P: PresentationSink + ?Sized,
        S: SaveStore,
    {
        if self.is_finished() {
            return Ok(StepOutcome::Finished);
        }

        let episode = self.episode;
        let node = episode
            .node(self.current.as_str())
            .ok_or_else(|| RunError::MissingNode {
                node_id: self.current.clone(),
            })?;

        if self.awaiting_choice {
            if let Node::Choice { text, options } = node {
                return Ok(StepOutcome::AwaitingChoice(ChoicePrompt::new(
                    self.current.clone(),
                    text,
                    options,
                    &self.state,
                )));
            }
        }

        tracing::debug!(
            run_id = %self.run_id,
            node = %self.current,
            kind = node.kind(),
            "dispatching node"
        );

        let next = match node {
            Node::Bg { bg, next } => {
                self.present(sink, Effect::Background { asset: bg.clone() });
                next.clone()
            }
            Node::Music { music, next } => {
                self.present(sink, Effect::Music { asset: music.clone() });
                next.clone()
            }
            Node::Say { who, text, next } => {
                self.present(
                    sink,
                    Effect::Line {
                        speaker: Some(who.clone()),
                        text: text.clone(),
                    },
                );
                next.clone()
            }
            Node::Set { vars, next } => {
                apply_set(vars, &mut self.state);
                next.clone()
            }
            Node::Sprite {
                who,
                sprite,
                pos,
                next,
            } => {
                self.present(
                    sink,
                    Effect::Sprite {
                        who: who.clone(),
                        asset: sprite.clone(),
                        position: *pos,
                    },
                );
                next.clone()
            }
            Node::Choice { text, options } => {
                self.present(sink, Effect::narration(text.clone()));
                self.awaiting_choice = true;
                return Ok(StepOutcome::AwaitingChoice(ChoicePrompt::new(
                    self.current.clone(),
                    text,
                    options,
                    &self.state,
                )));
            }
            Node::Check {
                req,
                on_pass,
                on_fail,
            } => {
                if check_req(req.as_ref(), &self.state) {
                    on_pass.clone()
                } else {
                    on_fail.clone()
                }
            }
            Node::Sfx { sfx, next } => {
                self.present(sink, Effect::Sound { asset: sfx.clone() });
                next.clone()
            }
            Node::Minigame {
                id,
                rules,
                on_win,
                on_lose,
            } => {
                self.present(
                    sink,
                    Effect::Minigame {
                        id: id.clone(),
                        rules: rules.clone(),
                    },
                );
                let outcome = match self.config.minigame.policy {
                    MinigamePolicy::AutoWin => MinigameOutcome::Won,
                    MinigamePolicy::AskSink => sink.resolve_minigame(id, rules),
                };
                match outcome {
                    MinigameOutcome::Won => on_win.clone(),
                    MinigameOutcome::Lost => on_lose.clone(),
                }
            }
            Node::Jump { to } => to.clone(),
            Node::End { summary, .. } => {
                if let Some(summary) = summary {
                    let line = interpolate(summary, &self.state);
                    self.present(sink, Effect::narration(line));
                }
                let end_line = self.config.presentation.end_line.clone();
                self.present(sink, Effect::narration(end_line));
                NodeId::terminal()
            }
            Node::Unknown => {
                return Err(RunError::UnknownNodeVariant {
                    node_id: self.current.clone(),
                })
            }
        };

        self.transition(next, gateway)
    }

    /// Resolve the pending choice with the option at `index`.
    ///
    /// The requirement is checked again here, so a stale prompt cannot
    /// select an option the state no longer allows. A rejected resolution
    /// leaves the choice pending.
    pub fn choose<S: SaveStore>(
        &mut self,
        index: usize,
        gateway: &mut PersistenceGateway<S>,
    ) -> Result<StepOutcome, RunError> {
        if !self.awaiting_choice {
            return Err(RunError::NotAwaitingChoice);
        }

        let episode = self.episode;
        let Some(Node::Choice { options, .. }) = episode.node(self.current.as_str()) else {
            return Err(RunError::NotAwaitingChoice);
        };

        let Some(option) = options.get(index) else {
            tracing::warn!(run_id = %self.run_id, index, "choice has no such option");
            return Err(RunError::UnknownOption { index });
        };

        if !option.is_selectable(&self.state) {
            tracing::warn!(
                run_id = %self.run_id,
                index,
                option = option.id.as_str(),
                "rejected option that does not meet its requirement"
            );
            return Err(RunError::RequirementNotMet { index });
        }

        tracing::debug!(run_id = %self.run_id, option = option.id.as_str(), "option accepted");
        apply_gain(option.gain.as_ref(), &mut self.state);
        self.awaiting_choice = false;
        self.transition(option.next.clone(), gateway)
    }

    /// Step until the run finishes, asking the sink to resolve choices and
    /// yielding to it once after every transition that does not finish the
    /// run.
    ///
    /// When the sink has no answer for a choice this returns
    /// [`RunError::ChoiceAbandoned`] with the choice still pending.
    pub fn run_to_end<P, S>(
        &mut self,
        sink: &mut P,
        gateway: &mut PersistenceGateway<S>,
    ) -> Result<(), RunError>
    where
        P: PresentationSink + ?Sized,
        S: SaveStore,
    {
        loop {
            let outcome = match self.step(sink, gateway)? {
                StepOutcome::AwaitingChoice(prompt) => loop {
                    let Some(index) = sink.choose(&prompt) else {
                        return Err(RunError::ChoiceAbandoned {
                            node_id: prompt.node_id.clone(),
                        });
                    };
                    match self.choose(index, gateway) {
                        Ok(outcome) => break outcome,
                        Err(err) if err.is_rejected_choice() => continue,
                        Err(err) => return Err(err),
                    }
                },
                outcome => outcome,
            };

            match outcome {
                StepOutcome::Finished => return Ok(()),
                StepOutcome::Advanced { .. } | StepOutcome::AwaitingChoice(_) => sink.yield_now(),
            }
        }
    }

    fn present<P: PresentationSink + ?Sized>(&self, sink: &mut P, effect: Effect) {
        if let Err(err) = sink.render(&effect) {
            tracing::debug!(run_id = %self.run_id, error = %err, "presentation failed, continuing");
        }
    }

    fn transition<S: SaveStore>(
        &mut self,
        next: NodeId,
        gateway: &mut PersistenceGateway<S>,
    ) -> Result<StepOutcome, RunError> {
        self.current = next;
        let record = SaveRecord::new(
            self.episode.episode_id.clone(),
            self.current.clone(),
            self.state.clone(),
        );
        gateway.auto_save(&record)?;

        if self.current.is_terminal() {
            tracing::info!(run_id = %self.run_id, "run finished");
            Ok(StepOutcome::Finished)
        } else {
            Ok(StepOutcome::Advanced {
                next: self.current.clone(),
            })
        }
    }
}

/// Run an episode to completion.
///
/// Starts at `start` (or the episode's start) with `initial_state` and drives
/// it with [`EpisodeRunner::run_to_end`]. Returns the final resource state.
pub fn run_episode<P, S>(
    episode: &Episode,
    sink: &mut P,
    gateway: &mut PersistenceGateway<S>,
    start: Option<&str>,
    initial_state: ResourceState,
    config: &RunnerConfig,
) -> Result<ResourceState, RunError>
where
    P: PresentationSink + ?Sized,
    S: SaveStore,
{
    let start = start
        .map(NodeId::from)
        .unwrap_or_else(|| episode.start.clone());
    let mut runner = EpisodeRunner::resume(episode, start, initial_state, config.clone());
    runner.run_to_end(sink, gateway)?;
    Ok(runner.into_state())
}

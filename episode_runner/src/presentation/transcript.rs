//! A headless sink that records everything it is shown.

use std::collections::VecDeque;

use super::{ChoicePrompt, Effect, MinigameOutcome, PresentationError, PresentationSink};
use crate::config::PresentationConfig;

/// Records effects and formatted lines, answering choices from a script.
///
/// With an empty script it picks the first selectable option, and gives up
/// when there is none.
#[derive(Debug, Default)]
pub struct TranscriptSink {
    config: PresentationConfig,
    lines: Vec<String>,
    effects: Vec<Effect>,
    prompts: Vec<ChoicePrompt>,
    scripted_choices: VecDeque<usize>,
    minigame_outcomes: VecDeque<MinigameOutcome>,
    yields: usize,
}

impl TranscriptSink {
    /// Create a sink with default line formatting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink formatting lines with the given config.
    pub fn with_config(config: PresentationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Queue option indices to answer upcoming choices with.
    pub fn with_choices(mut self, choices: impl IntoIterator<Item = usize>) -> Self {
        self.scripted_choices.extend(choices);
        self
    }

    /// Queue minigame outcomes.
    pub fn with_minigame_outcomes(
        mut self,
        outcomes: impl IntoIterator<Item = MinigameOutcome>,
    ) -> Self {
        self.minigame_outcomes.extend(outcomes);
        self
    }

    /// Formatted text lines, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Every effect rendered, in order.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Every prompt the sink was asked to answer.
    pub fn prompts(&self) -> &[ChoicePrompt] {
        &self.prompts
    }

    /// Number of per-step yields observed.
    pub fn yields(&self) -> usize {
        self.yields
    }
}

impl PresentationSink for TranscriptSink {
    fn render(&mut self, effect: &Effect) -> Result<(), PresentationError> {
        if let Effect::Line { speaker, text } = effect {
            self.lines
                .push(self.config.format_line(speaker.as_deref(), text));
        }
        self.effects.push(effect.clone());
        Ok(())
    }

    fn choose(&mut self, prompt: &ChoicePrompt) -> Option<usize> {
        self.prompts.push(prompt.clone());
        self.scripted_choices
            .pop_front()
            .or_else(|| prompt.selectable().next().map(|view| view.index))
    }

    fn resolve_minigame(&mut self, _id: &str, _rules: &str) -> MinigameOutcome {
        self.minigame_outcomes
            .pop_front()
            .unwrap_or(MinigameOutcome::Won)
    }

    fn yield_now(&mut self) {
        self.yields += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use episode_rules::{ChoiceOption, NodeId, ResourceState};

    #[test]
    fn test_records_lines_with_speaker() {
        let mut sink = TranscriptSink::new();
        sink.render(&Effect::Line {
            speaker: Some("Mira".to_owned()),
            text: "Hello".to_owned(),
        })
        .unwrap();
        sink.render(&Effect::Background {
            asset: "market".to_owned(),
        })
        .unwrap();

        assert_eq!(sink.lines(), ["Mira: Hello"]);
        assert_eq!(sink.effects().len(), 2);
    }

    #[test]
    fn test_falls_back_to_first_selectable() {
        let options = vec![
            ChoiceOption::new("locked", "Locked", "A").with_req("key", 1.0),
            ChoiceOption::new("open", "Open", "B"),
        ];
        let prompt = ChoicePrompt::new(NodeId::from("door"), "", &options, &ResourceState::new());

        let mut sink = TranscriptSink::new().with_choices([0]);
        assert_eq!(sink.choose(&prompt), Some(0));
        assert_eq!(sink.choose(&prompt), Some(1));
        assert_eq!(sink.prompts().len(), 2);
    }
}

//! Console player: plays an episode file in the terminal, saving as it goes.
//!
//! Usage: `play <episode.json> [config.toml] [--new]`
//!
//! Without `--new` the run resumes from the auto slot when it holds an
//! unfinished run of the same episode.

use std::io::{BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use episode_rules::Episode;
use episode_runner::{
    ChoicePrompt, Effect, EpisodeRunner, FileStore, PersistenceGateway, PresentationConfig,
    PresentationError, PresentationSink, RunError, RunnerConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Prints lines to stdout and reads numbered choices from stdin.
struct ConsoleSink {
    config: PresentationConfig,
}

impl PresentationSink for ConsoleSink {
    fn render(&mut self, effect: &Effect) -> Result<(), PresentationError> {
        match effect {
            Effect::Line { speaker, text } => {
                println!("{}", self.config.format_line(speaker.as_deref(), text))
            }
            Effect::Background { asset } => println!("[background: {}]", asset),
            Effect::Sprite {
                who,
                asset,
                position,
            } => println!("[{} appears ({}) at {:?}]", who, asset, position),
            Effect::Minigame { id, rules } => println!("Minigame: {} - {}", id, rules),
            Effect::Music { asset } | Effect::Sound { asset } => {
                return Err(PresentationError::Playback {
                    asset: asset.clone(),
                    reason: "no audio output in the console".to_owned(),
                })
            }
        }
        Ok(())
    }

    fn choose(&mut self, prompt: &ChoicePrompt) -> Option<usize> {
        for view in &prompt.options {
            let marker = if view.selectable { "" } else { " [locked]" };
            println!("  {}) {}{}", view.index + 1, view.display_label(), marker);
        }

        let stdin = std::io::stdin();
        loop {
            print!("> ");
            if let Err(err) = std::io::stdout().flush() {
                tracing::warn!(error = %err, "failed to flush prompt");
            }

            let mut input = String::new();
            match stdin.lock().read_line(&mut input) {
                Ok(0) => {
                    println!();
                    return None;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to read choice");
                    return None;
                }
                Ok(_) => {}
            }

            let picked = input
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|index| prompt.options.get(index));
            match picked {
                Some(view) if view.selectable => return Some(view.index),
                Some(_) => println!("That option is not available."),
                None => println!("Pick a number between 1 and {}.", prompt.options.len()),
            }
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "episode_runner=info,episode_rules=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let fresh = args.iter().any(|a| a == "--new");
    let mut paths = args.iter().filter(|a| !a.starts_with("--"));

    let Some(episode_path) = paths.next() else {
        eprintln!("usage: play <episode.json> [config.toml] [--new]");
        return ExitCode::from(2);
    };

    match play(Path::new(episode_path), paths.next().map(Path::new), fresh) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}

fn play(
    episode_path: &Path,
    config_path: Option<&Path>,
    fresh: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = match config_path {
        Some(path) if path.exists() => RunnerConfig::load(path)?,
        Some(path) => {
            tracing::warn!(path = %path.display(), "config file not found, using defaults");
            RunnerConfig::default()
        }
        None => RunnerConfig::default(),
    };

    let episode = Episode::load(episode_path)?;
    if !episode.title.is_empty() {
        println!("== {} ==", episode.title);
    }

    let store = FileStore::new(config.persistence.save_dir.clone());
    let mut gateway = PersistenceGateway::with_config(store, &config.persistence);
    let mut sink = ConsoleSink {
        config: config.presentation.clone(),
    };

    let mut runner = if fresh {
        EpisodeRunner::new(&episode, config)
    } else {
        EpisodeRunner::resume_latest(&episode, &gateway, config)?
    };

    match runner.run_to_end(&mut sink, &mut gateway) {
        Ok(()) => Ok(()),
        Err(RunError::ChoiceAbandoned { node_id }) => {
            tracing::info!(node = %node_id, "input closed, progress is saved");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

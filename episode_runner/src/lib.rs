//! # Episode Runner
//!
//! Drives a branching episode from `episode_rules` through a session:
//! dispatching nodes, handing visible effects to a presentation sink,
//! waiting on choices and persisting the position after every transition.
//!
//! ## Core Components
//!
//! - **interpreter**: the step/choose state machine and the `run_episode` loop
//! - **presentation**: effects, choice prompts and the sink contract
//! - **persistence**: save records, key/value stores and the gateway
//! - **config**: TOML runtime configuration

pub mod config;
pub mod interpreter;
pub mod persistence;
pub mod presentation;

pub use config::*;
pub use interpreter::*;
pub use persistence::*;
pub use presentation::*;

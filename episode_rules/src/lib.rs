//! # Episode Rules
//!
//! The data model for branching episodes and the rules that read and mutate
//! resource state. This crate knows nothing about presentation or
//! persistence; it is the single source of truth for what a node means.
//!
//! - **episode**: the node graph, node variants and choice options
//! - **resources**: the per-run key/value resource state
//! - **mechanics**: requirement checks, gains, `set` semantics and summaries

pub mod episode;
pub mod mechanics;
pub mod resources;

pub use episode::*;
pub use mechanics::*;
pub use resources::*;

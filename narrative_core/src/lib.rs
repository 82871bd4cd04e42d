//! # Narrative Core
//!
//! The state engine behind Quantum Chronicles. Given a [`NarrativeGraph`] and a
//! flat map of player flags and variables, it resolves the active node, the
//! choices currently legal, and how taking a choice transforms state.
//!
//! ## Core Components
//!
//! - **conditions**: Decides whether a choice's guards hold for a state
//! - **mutator**: Applies a choice's state updates, left to right
//! - **text**: Resolves literal, templated and generated node text
//! - **controller**: The traversal controller, sole owner of mutable session state
//! - **branch_map**: Read-only projection of the neighborhood around the current node
//! - **events**: Notifications for telemetry sinks and milestone schedulers
//!
//! ## Design Philosophy
//!
//! - **Pure Components**: Evaluation, mutation and text resolution are functions of their inputs
//! - **Single Owner**: Only the controller mutates session state, and only through `select` and `reset`
//! - **Advisory Observers**: Collaborators are told what happened; they cannot change it

pub mod branch_map;
pub mod conditions;
pub mod config;
pub mod controller;
pub mod error;
pub mod events;
pub mod mutator;
pub mod text;

pub use branch_map::*;
pub use conditions::*;
pub use config::*;
pub use controller::*;
pub use error::*;
pub use events::*;
pub use mutator::*;
pub use text::*;

pub use story_graph::{
    state_map, validate, validate_with_generators, Choice, Condition, GraphError, NarrativeGraph,
    NarrativeNode, Operator, StateMap, StateUpdate, StateValue, TextSpec, UpdateOp,
    ValidationIssue, ValidationReport,
};

//! # Story Graph
//!
//! The data side of the narrative engine: state values, nodes, choices,
//! conditions, state updates and the graph that holds them. This crate is the
//! single source of truth for authored story structure and does not contain
//! any traversal logic.

pub mod error;
pub mod graph;
pub mod state;
pub mod validation;

pub use error::*;
pub use graph::*;
pub use state::*;
pub use validation::*;

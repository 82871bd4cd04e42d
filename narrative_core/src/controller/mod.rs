//! Traversal controller - the stateful orchestrator of a playthrough.
//!
//! The controller owns the only mutable session state: the current node, the
//! history of visited nodes and the flag/variable map. It changes through
//! exactly two doors:
//! 1. **select**: validate a choice, compute the next state, then commit position,
//!    history and state together
//! 2. **reset**: go back to the start node with a fresh copy of the baseline state
//!
//! Everything else is a read. Observers are told about changes after they commit.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use story_graph::{validate_with_generators, Choice, NarrativeGraph, NarrativeNode, StateMap};

use crate::branch_map::{self, BranchMap};
use crate::conditions::is_legal;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::{NarrativeEvent, NarrativeObserver, SessionId};
use crate::mutator::apply_updates_with;
use crate::text::{ResolvedText, TextGenerators, TextResolver};

/// Outcome of a successful selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    /// Position moved to another node.
    Moved { from: String, to: String },

    /// The choice led to a sentinel. State was updated, position was not.
    Exited { from: String, sentinel: String },
}

/// Point-in-time copy of the session state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub current_node_id: String,
    pub history: Vec<String>,
    pub state: StateMap,
}

/// Create a controller for `graph`, optionally overriding the start node and
/// the initial state. Overrides become the baseline that `reset` restores.
///
/// `generators` backs every computed text the graph names. Pass
/// `TextGenerators::new()` for graphs made of literal text only.
pub fn initialize(
    graph: NarrativeGraph,
    start_override: Option<&str>,
    initial_state_override: Option<StateMap>,
    generators: TextGenerators,
) -> EngineResult<TraversalController> {
    let mut builder = TraversalController::builder(graph).generators(generators);
    if let Some(start) = start_override {
        builder = builder.start_at(start);
    }
    if let Some(state) = initial_state_override {
        builder = builder.initial_state(state);
    }
    builder.build()
}

/// Configures and builds a [`TraversalController`].
pub struct ControllerBuilder {
    graph: NarrativeGraph,
    config: EngineConfig,
    generators: TextGenerators,
    observers: Vec<Arc<dyn NarrativeObserver>>,
    start: Option<String>,
    initial_state: Option<StateMap>,
}

impl ControllerBuilder {
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn generators(mut self, generators: TextGenerators) -> Self {
        self.generators = generators;
        self
    }

    /// Add a telemetry sink, milestone scheduler or other observer.
    pub fn observer(mut self, observer: Arc<dyn NarrativeObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn start_at(mut self, node_id: impl Into<String>) -> Self {
        self.start = Some(node_id.into());
        self
    }

    pub fn initial_state(mut self, state: StateMap) -> Self {
        self.initial_state = Some(state);
        self
    }

    #[tracing::instrument(skip_all, fields(nodes = self.graph.node_count(), start = self.graph.start()))]
    pub fn build(self) -> EngineResult<TraversalController> {
        if self.config.validate_on_load {
            let report = validate_with_generators(&self.graph, self.generators.names());
            for warning in report.warnings() {
                tracing::warn!(%warning, "Graph validation warning");
            }
            if !report.is_valid() {
                tracing::error!(%report, "Graph failed validation");
                return Err(EngineError::InvalidGraph(report));
            }
        }

        let start = self
            .start
            .unwrap_or_else(|| self.graph.start().to_string());
        let position = self
            .graph
            .position(&start)
            .ok_or_else(|| EngineError::UnknownNode(start.clone()))?;
        let baseline = self
            .initial_state
            .unwrap_or_else(|| self.graph.initial_state().clone());

        let controller = TraversalController {
            resolver: TextResolver::new(self.generators),
            graph: self.graph,
            config: self.config,
            observers: self.observers,
            session: SessionId::new(),
            start: start.clone(),
            start_position: position,
            state: baseline.clone(),
            baseline,
            position,
            history: vec![start],
        };

        tracing::info!(session = %controller.session, start = %controller.start, "Narrative session started");
        controller.announce_current();
        Ok(controller)
    }
}

/// Owns the position, history and state of one playthrough.
pub struct TraversalController {
    graph: NarrativeGraph,
    config: EngineConfig,
    resolver: TextResolver,
    observers: Vec<Arc<dyn NarrativeObserver>>,
    session: SessionId,

    start: String,
    start_position: usize,
    baseline: StateMap,

    /// Graph position of the current node.
    position: usize,
    history: Vec<String>,
    state: StateMap,
}

impl TraversalController {
    /// Controller with default configuration, the graph's start node and its declared initial state.
    pub fn new(graph: NarrativeGraph) -> EngineResult<Self> {
        Self::builder(graph).build()
    }

    pub fn builder(graph: NarrativeGraph) -> ControllerBuilder {
        ControllerBuilder {
            graph,
            config: EngineConfig::default(),
            generators: TextGenerators::new(),
            observers: Vec::new(),
            start: None,
            initial_state: None,
        }
    }

    pub fn graph(&self) -> &NarrativeGraph {
        &self.graph
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn session_id(&self) -> SessionId {
        self.session
    }

    pub fn current_node(&self) -> &NarrativeNode {
        self.graph.node_at(self.position)
    }

    pub fn current_node_id(&self) -> &str {
        &self.current_node().id
    }

    /// Main and supplementary text of the current node.
    pub fn resolved_text(&self) -> ResolvedText {
        self.resolver.resolve_node(self.current_node(), &self.state)
    }

    /// Current node text with any supplementary text appended.
    pub fn current_text(&self) -> String {
        self.resolved_text().joined()
    }

    /// Choices of the current node whose conditions hold, in display order.
    pub fn available_choices(&self) -> Vec<&Choice> {
        self.current_node()
            .choices
            .iter()
            .filter(|choice| is_legal(&choice.conditions, &self.state))
            .collect()
    }

    /// Check that `choice` belongs to the current node and its conditions hold.
    pub fn is_choice_available(&self, choice: &Choice) -> bool {
        self.current_node().choices.contains(choice) && is_legal(&choice.conditions, &self.state)
    }

    pub fn is_terminal(&self) -> bool {
        self.current_node().is_terminal()
    }

    /// Take a choice from the current node.
    ///
    /// Nothing changes unless the choice belongs to the current node, its
    /// conditions hold, its target exists and its updates apply cleanly.
    #[tracing::instrument(skip_all, fields(session = %self.session, node = %self.current_node_id(), choice = %choice.text))]
    pub fn select(&mut self, choice: &Choice) -> EngineResult<Transition> {
        let node = self.current_node();
        let from = node.id.clone();

        if !node.choices.contains(choice) {
            return Err(EngineError::ForeignChoice {
                node_id: from,
                choice: choice.text.clone(),
            });
        }
        if !is_legal(&choice.conditions, &self.state) {
            return Err(EngineError::ChoiceUnavailable {
                node_id: from,
                choice: choice.text.clone(),
            });
        }

        let target = self.graph.position(&choice.target);
        if target.is_none() && !self.graph.is_sentinel(&choice.target) {
            tracing::error!(target = %choice.target, "Choice targets a node missing from the graph");
            return Err(EngineError::DanglingTarget {
                node_id: from,
                choice: choice.text.clone(),
                target: choice.target.clone(),
            });
        }

        let next_state = apply_updates_with(&choice.updates, &self.state, self.config.arithmetic)?;

        // Commit. Nothing below can fail.
        self.state = next_state;
        let transition = match target {
            Some(position) => {
                self.position = position;
                self.history.push(choice.target.clone());
                Transition::Moved {
                    from: from.clone(),
                    to: choice.target.clone(),
                }
            }
            None => Transition::Exited {
                from: from.clone(),
                sentinel: choice.target.clone(),
            },
        };
        tracing::info!(?transition, "Choice applied");

        self.notify(NarrativeEvent::ChoiceSelected {
            session: self.session,
            node_id: from.clone(),
            choice: choice.text.clone(),
            target: choice.target.clone(),
        });
        match &transition {
            Transition::Moved { .. } => self.announce_current(),
            Transition::Exited { sentinel, .. } => self.notify(NarrativeEvent::SentinelReached {
                session: self.session,
                from,
                sentinel: sentinel.clone(),
                state: self.state.clone(),
            }),
        }

        Ok(transition)
    }

    /// Take the `index`-th currently available choice.
    pub fn select_index(&mut self, index: usize) -> EngineResult<Transition> {
        let available = self.available_choices();
        let choice = available
            .get(index)
            .map(|choice| (*choice).clone())
            .ok_or_else(|| EngineError::ChoiceIndexOutOfRange {
                node_id: self.current_node_id().to_string(),
                index,
                available: available.len(),
            })?;
        self.select(&choice)
    }

    /// Return to the start node with a fresh copy of the baseline state.
    pub fn reset(&mut self) {
        self.position = self.start_position;
        self.state = self.baseline.clone();
        self.history = vec![self.start.clone()];

        tracing::info!(session = %self.session, start = %self.start, "Narrative session reset");
        self.notify(NarrativeEvent::SessionReset {
            session: self.session,
            start: self.start.clone(),
        });
        self.announce_current();
    }

    /// Visited node ids, oldest first, ending with the current node.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Check if a node appears anywhere in the history.
    pub fn visited(&self, node_id: &str) -> bool {
        self.history.iter().any(|id| id == node_id)
    }

    pub fn state(&self) -> &StateMap {
        &self.state
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            current_node_id: self.current_node_id().to_string(),
            history: self.history.clone(),
            state: self.state.clone(),
        }
    }

    /// Map of the current node's neighborhood.
    pub fn branch_map(&self) -> BranchMap {
        branch_map::project(self)
    }

    fn announce_current(&self) {
        self.notify(NarrativeEvent::NodeEntered {
            session: self.session,
            node_id: self.current_node_id().to_string(),
            step: self.history.len() - 1,
            is_terminal: self.is_terminal(),
        });
    }

    fn notify(&self, event: NarrativeEvent) {
        for observer in &self.observers {
            if let Err(err) = observer.notify(&event) {
                tracing::warn!(error = %err, event = event.name(), "Observer failed");
            }
        }
    }
}

impl std::fmt::Debug for TraversalController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalController")
            .field("session", &self.session)
            .field("current", &self.current_node_id())
            .field("history", &self.history)
            .field("state", &self.state)
            .field("observers", &self.observers.len())
            .finish()
    }
}

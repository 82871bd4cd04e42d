//! Text resolver - turns a node's text spec into the string shown to the player.
//!
//! Literal text supports `{{name}}` placeholders. A placeholder naming an absent
//! key stays in the output verbatim so authoring gaps are visible on screen.
//! Computed text is produced by generators registered by name, which receive a
//! shared borrow of the state and so cannot change it.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use story_graph::{NarrativeNode, StateMap, TextSpec};

/// A pure function from state to text.
pub type TextGenerator = Arc<dyn Fn(&StateMap) -> String + Send + Sync>;

/// Named text generators available to computed node text.
#[derive(Clone, Default)]
pub struct TextGenerators {
    generators: BTreeMap<String, TextGenerator>,
}

impl TextGenerators {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a generator, replacing any previous one with the same name.
    pub fn register<F>(&mut self, name: impl Into<String>, generator: F)
    where
        F: Fn(&StateMap) -> String + Send + Sync + 'static,
    {
        self.generators.insert(name.into(), Arc::new(generator));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: impl Into<String>, generator: F) -> Self
    where
        F: Fn(&StateMap) -> String + Send + Sync + 'static,
    {
        self.register(name, generator);
        self
    }

    pub fn get(&self, name: &str) -> Option<&TextGenerator> {
        self.generators.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }

    /// Registered generator names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.generators.keys().map(|k| k.as_str())
    }
}

impl std::fmt::Debug for TextGenerators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.generators.keys()).finish()
    }
}

/// Main and supplementary text of a node, resolved against one state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedText {
    pub text: String,
    pub text_after: Option<String>,
}

impl ResolvedText {
    /// Both blocks separated by a blank line.
    pub fn joined(&self) -> String {
        match &self.text_after {
            Some(after) => format!("{}\n\n{}", self.text, after),
            None => self.text.clone(),
        }
    }
}

/// Resolves text specs using a set of registered generators.
#[derive(Debug, Clone, Default)]
pub struct TextResolver {
    generators: TextGenerators,
}

impl TextResolver {
    pub fn new(generators: TextGenerators) -> Self {
        Self { generators }
    }

    pub fn generators(&self) -> &TextGenerators {
        &self.generators
    }

    /// Resolve a single text spec.
    pub fn resolve(&self, spec: &TextSpec, state: &StateMap) -> String {
        match spec {
            TextSpec::Literal(template) => substitute(template, state),
            TextSpec::Computed { generator } => match self.generators.get(generator) {
                Some(generate) => generate(state),
                None => {
                    tracing::warn!(generator = %generator, "Unregistered text generator");
                    format!("{{{{generator:{}}}}}", generator)
                }
            },
        }
    }

    /// Resolve a node's main text and, if present, its supplementary text.
    pub fn resolve_node(&self, node: &NarrativeNode, state: &StateMap) -> ResolvedText {
        ResolvedText {
            text: self.resolve(&node.text, state),
            text_after: node
                .text_after
                .as_ref()
                .map(|spec| self.resolve(spec, state)),
        }
    }
}

/// Replace `{{name}}` placeholders with the current value of `name`.
///
/// Whitespace inside the braces is ignored. Absent keys and unclosed braces are
/// copied through unchanged, and substituted values are not scanned again.
pub fn substitute(template: &str, state: &StateMap) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        let Some(close) = after_open.find("}}") else {
            out.push_str(&rest[open..]);
            return out;
        };

        let name = after_open[..close].trim();
        match state.get(name) {
            Some(value) => out.push_str(&value.to_string()),
            None => out.push_str(&rest[open..open + 2 + close + 2]),
        }
        rest = &after_open[close + 2..];
    }

    out.push_str(rest);
    out
}

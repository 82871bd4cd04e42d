//! Node definitions - single story beats.

use serde::{Deserialize, Serialize};

use super::Choice;

/// How a node's text is produced.
///
/// Authored as either a plain string or `{ generator = "name" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextSpec {
    /// Literal text, possibly containing `{{name}}` placeholders.
    Literal(String),

    /// Text produced by a named generator registered with the engine.
    Computed { generator: String },
}

impl TextSpec {
    pub fn literal(text: impl Into<String>) -> Self {
        TextSpec::Literal(text.into())
    }

    pub fn computed(generator: impl Into<String>) -> Self {
        TextSpec::Computed {
            generator: generator.into(),
        }
    }

    /// The literal text, if this is not a computed spec.
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            TextSpec::Literal(s) => Some(s),
            TextSpec::Computed { .. } => None,
        }
    }

    /// The generator name, if this is a computed spec.
    pub fn generator(&self) -> Option<&str> {
        match self {
            TextSpec::Literal(_) => None,
            TextSpec::Computed { generator } => Some(generator),
        }
    }
}

impl From<&str> for TextSpec {
    fn from(value: &str) -> Self {
        TextSpec::literal(value)
    }
}

impl From<String> for TextSpec {
    fn from(value: String) -> Self {
        TextSpec::Literal(value)
    }
}

/// A single story beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeNode {
    /// Unique across the graph. May be namespaced, e.g. `"partII:intro"`.
    pub id: String,

    pub text: TextSpec,

    /// Supplementary text resolved after `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_after: Option<TextSpec>,

    /// Short label for map views.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Display order matters. Empty means the node is an ending.
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl NarrativeNode {
    /// Create a terminal node with the given text.
    pub fn new(id: impl Into<String>, text: impl Into<TextSpec>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            text_after: None,
            label: None,
            choices: Vec::new(),
        }
    }

    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }

    pub fn with_choices(mut self, choices: impl IntoIterator<Item = Choice>) -> Self {
        self.choices.extend(choices);
        self
    }

    pub fn with_text_after(mut self, text_after: impl Into<TextSpec>) -> Self {
        self.text_after = Some(text_after.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Check if the node has no outgoing choices.
    pub fn is_terminal(&self) -> bool {
        self.choices.is_empty()
    }

    /// Namespace prefix of the id (`"partII"` for `"partII:intro"`).
    pub fn segment(&self) -> Option<&str> {
        segment_of(&self.id)
    }
}

/// Namespace prefix of a node id, if it has one.
pub fn segment_of(id: &str) -> Option<&str> {
    id.split_once(':').map(|(segment, _)| segment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_terminal() {
        let node = NarrativeNode::new("ending", "The lights go out.");
        assert!(node.is_terminal());
        assert_eq!(node.text.as_literal(), Some("The lights go out."));
    }

    #[test]
    fn test_segment() {
        let node = NarrativeNode::new("partII:intro", "...");
        assert_eq!(node.segment(), Some("partII"));
        assert_eq!(segment_of("intro"), None);
    }

    #[test]
    fn test_text_spec_untagged() {
        let literal: TextSpec = serde_json::from_str(r#""Hello {{name}}""#).unwrap();
        assert_eq!(literal, TextSpec::literal("Hello {{name}}"));

        let computed: TextSpec = serde_json::from_str(r#"{"generator": "lab_report"}"#).unwrap();
        assert_eq!(computed.generator(), Some("lab_report"));
    }
}

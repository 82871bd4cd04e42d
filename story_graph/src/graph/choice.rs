//! Choice definitions - guarded, state-mutating edges between nodes.

use serde::{Deserialize, Serialize};

use crate::state::StateValue;

/// A directed, conditionally available edge from one node to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// Label shown to the player.
    pub text: String,

    /// Id of the node (or sentinel) this choice leads to.
    pub target: String,

    /// All must hold for the choice to be selectable.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,

    /// Applied left to right when the choice is taken.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub updates: Vec<StateUpdate>,
}

impl Choice {
    /// Create an unconditional choice with no state updates.
    pub fn new(text: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            target: target.into(),
            conditions: Vec::new(),
            updates: Vec::new(),
        }
    }

    /// Add a guard condition.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Add a state update.
    pub fn with_update(mut self, update: StateUpdate) -> Self {
        self.updates.push(update);
        self
    }

    /// Check if the choice carries no conditions.
    pub fn is_unconditional(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// Comparison operators available to conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "==", alias = "eq")]
    Eq,
    #[serde(rename = "!=", alias = "ne")]
    Ne,
    #[serde(rename = ">", alias = "gt")]
    Gt,
    #[serde(rename = "<", alias = "lt")]
    Lt,
    #[serde(rename = ">=", alias = "ge")]
    Ge,
    #[serde(rename = "<=", alias = "le")]
    Le,
}

impl Operator {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Lt => "<",
            Operator::Ge => ">=",
            Operator::Le => "<=",
        }
    }

    /// Check if the operator orders its operands (and so needs numbers).
    pub fn is_ordering(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Lt | Operator::Ge | Operator::Le)
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A single guard clause comparing a named state value against an operand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    pub op: Operator,
    pub value: StateValue,
}

impl Condition {
    pub fn new(key: impl Into<String>, op: Operator, value: impl Into<StateValue>) -> Self {
        Self {
            key: key.into(),
            op,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.key, self.op, self.value)
    }
}

/// Operations a state update can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateOp {
    Set,
    Increment,
    Decrement,
}

/// A single named-value mutation attached to a choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateUpdate {
    pub key: String,
    pub op: UpdateOp,
    pub value: StateValue,
}

impl StateUpdate {
    pub fn new(key: impl Into<String>, op: UpdateOp, value: impl Into<StateValue>) -> Self {
        Self {
            key: key.into(),
            op,
            value: value.into(),
        }
    }

    pub fn set(key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        Self::new(key, UpdateOp::Set, value)
    }

    pub fn increment(key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        Self::new(key, UpdateOp::Increment, value)
    }

    pub fn decrement(key: impl Into<String>, value: impl Into<StateValue>) -> Self {
        Self::new(key, UpdateOp::Decrement, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_builder() {
        let choice = Choice::new("Open the door", "hall")
            .with_condition(Condition::new("has_key", Operator::Eq, true))
            .with_update(StateUpdate::increment("courage", 1));

        assert_eq!(choice.target, "hall");
        assert!(!choice.is_unconditional());
        assert_eq!(choice.updates.len(), 1);
    }

    #[test]
    fn test_operator_symbols_and_aliases() {
        let op: Operator = serde_json::from_str(r#"">=""#).unwrap();
        assert_eq!(op, Operator::Ge);

        let op: Operator = serde_json::from_str(r#""ne""#).unwrap();
        assert_eq!(op, Operator::Ne);

        assert_eq!(serde_json::to_string(&Operator::Lt).unwrap(), r#""<""#);
        assert!(serde_json::from_str::<Operator>(r#""~=""#).is_err());
    }

    #[test]
    fn test_condition_display() {
        let condition = Condition::new("coherence", Operator::Ge, 10);
        assert_eq!(condition.to_string(), "coherence >= 10");
    }

    #[test]
    fn test_update_op_serde() {
        let update: StateUpdate =
            serde_json::from_str(r#"{"key": "x", "op": "decrement", "value": 2}"#).unwrap();
        assert_eq!(update, StateUpdate::decrement("x", 2));
    }
}

//! Condition evaluator - decides whether a choice's guards hold.
//!
//! Evaluation is fail-closed and never panics:
//! - a missing key fails every operator except `!=`, which absence satisfies
//! - ordering operators need numbers on both sides, anything else fails
//! - equality across different kinds of value is simply unequal

use std::cmp::Ordering;

use story_graph::{Condition, Operator, StateMap, StateValue};

/// Check that every condition holds. An empty list is always legal.
pub fn is_legal(conditions: &[Condition], state: &StateMap) -> bool {
    conditions.iter().all(|condition| {
        let holds = evaluate(condition, state);
        if !holds {
            tracing::debug!(condition = %condition, "Condition not met");
        }
        holds
    })
}

/// Evaluate a single condition against the state.
pub fn evaluate(condition: &Condition, state: &StateMap) -> bool {
    let Some(current) = state.get(&condition.key) else {
        return condition.op == Operator::Ne;
    };

    match condition.op {
        Operator::Eq => current == &condition.value,
        Operator::Ne => current != &condition.value,
        Operator::Gt => numeric_cmp(current, &condition.value) == Some(Ordering::Greater),
        Operator::Lt => numeric_cmp(current, &condition.value) == Some(Ordering::Less),
        Operator::Ge => matches!(
            numeric_cmp(current, &condition.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Le => matches!(
            numeric_cmp(current, &condition.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

/// Two integers compare exactly, matching `StateValue` equality. Any float
/// involved moves the comparison to `f64`.
fn numeric_cmp(current: &StateValue, operand: &StateValue) -> Option<Ordering> {
    match (current, operand) {
        (StateValue::Int(a), StateValue::Int(b)) => Some(a.cmp(b)),
        _ => current.as_f64()?.partial_cmp(&operand.as_f64()?),
    }
}

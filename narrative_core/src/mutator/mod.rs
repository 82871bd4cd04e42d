//! State mutator - computes the next state from a choice's update list.

use story_graph::{StateMap, StateUpdate, StateValue, UpdateOp};

use crate::config::ArithmeticMode;
use crate::error::{EngineError, EngineResult};

/// Apply updates left to right in lenient mode, returning a new map.
///
/// The input map is never touched. Increment/decrement on an absent key starts
/// from zero; on a non-numeric value they degrade to a `set` of the raw operand.
pub fn apply_updates(updates: &[StateUpdate], state: &StateMap) -> StateMap {
    let mut next = state.clone();
    for update in updates {
        let value = next_value(next.get(&update.key), update).unwrap_or_else(|| {
            tracing::warn!(
                key = %update.key,
                op = op_name(update.op),
                value = %update.value,
                "Non-numeric arithmetic, falling back to set"
            );
            update.value.clone()
        });
        commit(&mut next, update, value);
    }
    next
}

/// Apply updates left to right under the given arithmetic mode.
///
/// In strict mode a non-numeric increment/decrement fails the whole list and
/// no partially updated map is returned.
pub fn apply_updates_with(
    updates: &[StateUpdate],
    state: &StateMap,
    mode: ArithmeticMode,
) -> EngineResult<StateMap> {
    if mode == ArithmeticMode::Lenient {
        return Ok(apply_updates(updates, state));
    }

    let mut next = state.clone();
    for update in updates {
        let value = next_value(next.get(&update.key), update).ok_or_else(|| {
            EngineError::NonNumericUpdate {
                key: update.key.clone(),
                op: op_name(update.op),
            }
        })?;
        commit(&mut next, update, value);
    }
    Ok(next)
}

fn commit(state: &mut StateMap, update: &StateUpdate, value: StateValue) {
    tracing::debug!(key = %update.key, value = %value, "Setting state value");
    state.insert(update.key.clone(), value);
}

/// The value `update` produces from `current`. `None` for arithmetic on non-numbers.
fn next_value(current: Option<&StateValue>, update: &StateUpdate) -> Option<StateValue> {
    match update.op {
        UpdateOp::Set => Some(update.value.clone()),
        UpdateOp::Increment => add(current, &update.value, false),
        UpdateOp::Decrement => add(current, &update.value, true),
    }
}

/// `current ± operand`, with an absent current value counting as zero.
///
/// Integers stay integers unless the result overflows. `None` when either side
/// is not a number.
fn add(current: Option<&StateValue>, operand: &StateValue, negate: bool) -> Option<StateValue> {
    let zero = StateValue::Int(0);
    let current = current.unwrap_or(&zero);

    if let (StateValue::Int(a), StateValue::Int(b)) = (current, operand) {
        let sum = if negate { a.checked_sub(*b) } else { a.checked_add(*b) };
        if let Some(sum) = sum {
            return Some(StateValue::Int(sum));
        }
    }

    let a = current.as_f64()?;
    let b = operand.as_f64()?;
    Some(StateValue::Float(if negate { a - b } else { a + b }))
}

fn op_name(op: UpdateOp) -> &'static str {
    match op {
        UpdateOp::Set => "set",
        UpdateOp::Increment => "increment",
        UpdateOp::Decrement => "decrement",
    }
}

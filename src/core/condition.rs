/// Condition evaluation for conditional jumps.
///
/// A condition is either empty (always true), a single variable name
/// (its truthiness, false when unset), or `<var> <op> <literal>`. Anything
/// else evaluates to false.

use std::cmp::Ordering;

use crate::schema::value::{RuntimeState, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
}

impl CompareOp {
    pub fn parse(op: &str) -> Option<CompareOp> {
        match op {
            "==" => Some(Self::Eq),
            "!=" => Some(Self::Ne),
            ">" => Some(Self::Gt),
            "<" => Some(Self::Lt),
            ">=" => Some(Self::Ge),
            "<=" => Some(Self::Le),
            _ => None,
        }
    }

    /// Apply the operator. Values that cannot be ordered against each
    /// other fail every ordering operator.
    pub fn apply(self, lhs: &Value, rhs: &Value) -> bool {
        let ordering = lhs.loose_cmp(rhs);
        match (self, ordering) {
            (Self::Eq, _) => lhs.loosely_eq(rhs),
            (Self::Ne, _) => !lhs.loosely_eq(rhs),
            (Self::Gt, Some(o)) => o == Ordering::Greater,
            (Self::Lt, Some(o)) => o == Ordering::Less,
            (Self::Ge, Some(o)) => o != Ordering::Less,
            (Self::Le, Some(o)) => o != Ordering::Greater,
            (_, None) => false,
        }
    }
}

/// Evaluate `condition` against the current variables.
pub fn evaluate(condition: &str, state: &RuntimeState) -> bool {
    let parts: Vec<&str> = condition.split_whitespace().collect();
    match parts.as_slice() {
        [] => true,
        [var] => state.get(var).map_or(false, Value::is_truthy),
        [var, op, literal] => {
            let Some(op) = CompareOp::parse(op) else {
                return false;
            };
            let current = state.get(var).cloned().unwrap_or(Value::Int(0));
            op.apply(&current, &Value::parse(literal))
        }
        _ => false,
    }
}

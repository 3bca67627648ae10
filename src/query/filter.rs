//! Condition evaluation
//!
//! Evaluates a conjunction of `(field, operator, value)` triples against a
//! record. A condition whose field is absent from the record never matches,
//! whatever the operator; this mirrors document stores where an index entry
//! only exists for records carrying the field.

use crate::storage::record::{Record, Value};
use rosterq::{Condition, Literal, Operator};
use std::cmp::Ordering;

/// Evaluate a conjunction of conditions against a record.
/// An empty condition list matches everything.
pub fn matches(conditions: &[Condition], record: &Record) -> bool {
    conditions.iter().all(|cond| evaluate(cond, record))
}

fn evaluate(cond: &Condition, record: &Record) -> bool {
    let Some(value) = record.field(&cond.field) else {
        return false;
    };

    match cond.op {
        Operator::Eq => values_equal(&value, &cond.value),
        Operator::Ne => !values_equal(&value, &cond.value),
        Operator::Lt => compare(&value, &cond.value)
            .map(|o| o == Ordering::Less)
            .unwrap_or(false),
        Operator::Le => compare(&value, &cond.value)
            .map(|o| o != Ordering::Greater)
            .unwrap_or(false),
        Operator::Gt => compare(&value, &cond.value)
            .map(|o| o == Ordering::Greater)
            .unwrap_or(false),
        Operator::Ge => compare(&value, &cond.value)
            .map(|o| o != Ordering::Less)
            .unwrap_or(false),
        Operator::In => in_list(&value, &cond.value),
        Operator::NotIn => !in_list(&value, &cond.value),
        Operator::Contains => value
            .as_array()
            .map(|arr| {
                arr.iter()
                    .any(|item| item.compare(&literal_to_value(&cond.value)) == Some(Ordering::Equal))
            })
            .unwrap_or(false),
        Operator::Like => match &cond.value {
            Literal::String(pattern) => value.matches_pattern(pattern),
            _ => false,
        },
    }
}

fn in_list(value: &Value, literal: &Literal) -> bool {
    match literal {
        Literal::Array(items) => items.iter().any(|item| values_equal(value, item)),
        // A non-array right-hand side degrades to single-element membership
        other => values_equal(value, other),
    }
}

fn values_equal(value: &Value, literal: &Literal) -> bool {
    let rhs = literal_to_value(literal);
    match (value, &rhs) {
        (Value::Null, Value::Null) => true,
        _ => value.compare(&rhs) == Some(Ordering::Equal),
    }
}

fn compare(value: &Value, literal: &Literal) -> Option<Ordering> {
    value.compare(&literal_to_value(literal))
}

/// Convert a filter literal into a stored value
pub fn literal_to_value(lit: &Literal) -> Value {
    match lit {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::String(s) => Value::String(s.clone()),
        Literal::Array(arr) => Value::Array(arr.iter().map(literal_to_value).collect()),
    }
}

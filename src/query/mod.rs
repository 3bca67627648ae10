//! Query execution for roster
//!
//! Applies a conjunctive filter, an optional single-field ascending order,
//! and an optional result cap to a set of records. The same pipeline backs
//! `Store::query`, live subscriptions, and the dashboard export.

pub mod filter;

use crate::storage::record::Record;
use rosterq::Condition;
use std::cmp::Ordering;

/// Run the filter/order/limit pipeline over a record set.
pub fn run(
    records: Vec<Record>,
    conditions: &[Condition],
    order_by: Option<&str>,
    limit: Option<usize>,
) -> Vec<Record> {
    let mut records: Vec<Record> = records
        .into_iter()
        .filter(|record| filter::matches(conditions, record))
        .collect();

    if let Some(field) = order_by {
        records.sort_by(|a, b| compare_by_field(a, b, field));
    }

    if let Some(limit) = limit {
        records.truncate(limit);
    }

    records
}

/// Ascending order on one field; records missing the field sort first.
fn compare_by_field(a: &Record, b: &Record, field: &str) -> Ordering {
    match (a.field(field), b.field(field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(av), Some(bv)) => av.compare(&bv).unwrap_or(Ordering::Equal),
    }
}

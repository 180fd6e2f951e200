//! Bound-predicate evaluation over stored telemetry
//!
//! The predicate arrives as structured `{field, op, value}` data and is
//! applied to each stored record directly; there is no query text to
//! assemble, so there is nothing to inject into.

use crate::store::StoredRecord;
use sensegrid_core::{NodeRecord, QueryExpr, QueryOp};
use std::cmp::Ordering;

/// Evaluate a predicate against stored records, returning matching rows
pub fn evaluate(expression: &QueryExpr, records: &[StoredRecord]) -> Vec<serde_json::Value> {
    records
        .iter()
        .filter(|stored| matches(expression, &stored.record))
        .map(row)
        .collect()
}

/// Whether one record satisfies the predicate
///
/// Missing fields and incomparable operand kinds never match; they are not
/// errors.
fn matches(expression: &QueryExpr, record: &NodeRecord) -> bool {
    let value = match record.field(&expression.field) {
        Some(value) => value,
        None => return false,
    };

    if expression.op == QueryOp::Exists {
        return !value.is_null();
    }

    let ordering = match value.compare(&expression.value) {
        Some(ordering) => ordering,
        None => return false,
    };

    match expression.op {
        QueryOp::Eq => ordering == Ordering::Equal,
        QueryOp::Ne => ordering != Ordering::Equal,
        QueryOp::Gt => ordering == Ordering::Greater,
        QueryOp::Gte => ordering != Ordering::Less,
        QueryOp::Lt => ordering == Ordering::Less,
        QueryOp::Lte => ordering != Ordering::Greater,
        QueryOp::Exists => unreachable!("handled above"),
    }
}

/// Render one stored record as an opaque result row
fn row(stored: &StoredRecord) -> serde_json::Value {
    let mut value = serde_json::to_value(&stored.record).unwrap_or(serde_json::Value::Null);
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "received_at".to_string(),
            serde_json::Value::String(stored.received_at.to_rfc3339()),
        );
    }
    value
}

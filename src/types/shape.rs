//! Structural helpers for cache data.
//!
//! The overwrite operations (`refresh`, `mutate`) branch on what kind of
//! value currently sits in the cache. [`DataShape`] names that three-way
//! classification, decided once at the call site:
//!
//! - `Sequence` — an ordered list; refresh hands the cache a new container
//!   with the same elements.
//! - `Mapping` — a field map; refresh clones the container, mutate unions
//!   new fields over it.
//! - `Scalar` — anything else (including strings and null); passed through
//!   unchanged.

use serde_json::{Map, Value};

/// Tagged classification of a cache value's container shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataShape {
    /// Ordered sequence (`Value::Array`).
    Sequence,
    /// Field mapping (`Value::Object`).
    Mapping,
    /// Non-container data, passed through unchanged by structural ops.
    Scalar,
}

impl DataShape {
    /// Classify a value.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Array(_) => DataShape::Sequence,
            Value::Object(_) => DataShape::Mapping,
            _ => DataShape::Scalar,
        }
    }
}

/// Shallow structural clone: same values, new container identity.
///
/// Used by `refresh` so the cache sees an overwrite (forcing revalidation of
/// an unchanged key) without the displayed data changing. Scalars pass
/// through unchanged.
pub fn shallow_clone(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.clone()),
        Value::Object(fields) => Value::Object(fields.clone()),
        scalar => scalar.clone(),
    }
}

/// Merge `new_data` into `current` for an optimistic local update.
///
/// When `current` is a mapping, the result is the field union with
/// `new_data`'s fields winning on conflict. For any other current shape
/// (or no current data) the result is `new_data` verbatim.
pub fn merge_fields(current: Option<&Value>, new_data: Value) -> Value {
    match current {
        Some(Value::Object(existing)) => {
            let mut merged: Map<String, Value> = existing.clone();
            match new_data {
                Value::Object(incoming) => {
                    for (k, v) in incoming {
                        merged.insert(k, v);
                    }
                    Value::Object(merged)
                }
                other => other,
            }
        }
        _ => new_data,
    }
}

/// Structural parameter equality, by value rather than identity.
///
/// `serde_json::Value` equality compares arrays elementwise and objects
/// fieldwise, which is the deep comparison `run` needs to recognise a
/// repeated call.
pub fn params_equal(a: Option<&Value>, b: Option<&Value>) -> bool {
    a == b
}

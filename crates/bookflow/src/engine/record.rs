use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The incrementally built record behind one flow instance.
///
/// Keys are written by step submissions and never implicitly cleared; a
/// later update only changes the keys it names. Composite values (objects,
/// arrays) are replaced wholesale because each step owns and rebuilds its
/// full sub-object before emitting it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AggregateRecord(Map<String, Value>);

impl AggregateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Builds a record from any JSON value; non-objects yield an empty record.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Looks up a field, descending through nested objects on `.`.
    pub fn get(&self, field: &str) -> Option<&Value> {
        let mut segments = field.split('.');
        let mut current = self.0.get(segments.next()?)?;
        for segment in segments {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Whether a field holds a value that counts as filled in.
    ///
    /// Conventions shared by every flow: arrays count once non-empty,
    /// objects count by presence alone, scalars count when truthy
    /// (non-empty string, non-zero number, `true`). Absent fields and
    /// `null` never count.
    pub fn field_complete(&self, field: &str) -> bool {
        self.get(field).is_some_and(value_is_complete)
    }

    /// Folds a step's partial update into a new record.
    ///
    /// Every key in `partial` overwrites the same key here, whole-value.
    /// The receiver is left untouched so earlier snapshots stay valid.
    #[must_use]
    pub fn apply_update(&self, partial: &Map<String, Value>) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in partial {
            merged.insert(key.clone(), value.clone());
        }
        Self(merged)
    }
}

pub(crate) fn value_is_complete(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(_) => true,
    }
}

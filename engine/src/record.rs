//! FILENAME: engine/src/record.rs
//! PURPOSE: Field access for rows fed into a cloud.
//! CONTEXT: Rows are opaque to the cloud. Only axis projections look inside
//! them. `Row` is the small contract the default field projection needs.
//! `Record` is the ready-made row type used by the schema layer and the query crate.

use std::collections::HashMap;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A row whose fields can be read by name.
pub trait Row {
    /// Returns the field, or `None` when the row has no such field or it has no scalar form.
    fn field(&self, name: &str) -> Option<Value>;

    /// Whether the field exists at all, scalar or not.
    fn has_field(&self, name: &str) -> bool {
        self.field(name).is_some()
    }
}

/// A flat record of named scalar fields. Deserializes from a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: FxHashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Record {
            fields: FxHashMap::default(),
        }
    }

    /// Builder-style field insertion.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Numeric field helper for fold closures; `None` when absent or not numeric.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(Value::as_f64)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Row for Record {
    fn field(&self, name: &str) -> Option<Value> {
        self.fields.get(name).cloned()
    }
}

impl<R: Row + ?Sized> Row for &R {
    fn field(&self, name: &str) -> Option<Value> {
        (**self).field(name)
    }

    fn has_field(&self, name: &str) -> bool {
        (**self).has_field(name)
    }
}

impl<S: std::hash::BuildHasher> Row for HashMap<String, Value, S> {
    fn field(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }
}

/// JSON objects are rows. Scalars map onto `Value`. Arrays and nested objects
/// cannot be coordinates: `field` returns `None` but `has_field` is true.
impl Row for serde_json::Value {
    fn field(&self, name: &str) -> Option<Value> {
        let raw = self.as_object()?.get(name)?;
        match raw {
            serde_json::Value::Null => Some(Value::None),
            serde_json::Value::Bool(b) => Some(Value::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(Value::Int(i)),
                None => n.as_f64().map(Value::number),
            },
            serde_json::Value::String(s) => Some(Value::Text(s.clone())),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    fn has_field(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

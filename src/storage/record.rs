//! Record representation
//!
//! A Record is one entity in a collection: a store-assigned identifier, a
//! schema-less field map, and two store-managed timestamps. On disk each
//! record is a single YAML file; timestamps serialize as ISO-8601 text.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;

/// A record in the store
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Unique identifier (derived from filename, without .yaml extension)
    pub id: String,

    /// Domain fields
    pub fields: Fields,

    /// Set once when the record is first written
    pub created_at: DateTime<Utc>,

    /// Bumped on every write
    pub updated_at: DateTime<Utc>,
}

/// A map of field names to values
pub type Fields = HashMap<String, Value>;

/// Field values that can be stored in a record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(HashMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Check if this value matches a `like` pattern (`%` matches any run of
    /// characters, `_` matches a single character). Non-strings never match.
    pub fn matches_pattern(&self, pattern: &str) -> bool {
        match self {
            Value::String(s) => {
                let regex_pattern = regex::escape(pattern).replace('%', ".*").replace('_', ".");
                regex::Regex::new(&format!("^{}$", regex_pattern))
                    .map(|r| r.is_match(s))
                    .unwrap_or(false)
            }
            _ => false,
        }
    }

    /// Ordering between values of comparable types. Cross-type comparisons
    /// other than Int/Float are not ordered.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Convert to a serde_json value (for exports and templates)
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::Number((*i).into()),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(Value::to_json).collect())
            }
            Value::Object(obj) => {
                let map: serde_json::Map<String, serde_json::Value> = obj
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect();
                serde_json::Value::Object(map)
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Pseudo-fields resolved against record metadata rather than the field map.
pub const FIELD_ID: &str = "id";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_UPDATED_AT: &str = "updatedAt";

impl Record {
    /// Create a record stamped with the current time.
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            fields,
            created_at: now,
            updated_at: now,
        }
    }

    /// Set a field value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Get a domain field value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Resolve a field for filtering and ordering. `id`, `createdAt`, and
    /// `updatedAt` resolve to metadata; everything else reads the field map.
    /// Timestamps resolve to fixed-precision ISO-8601 strings so they order
    /// lexicographically.
    pub fn field(&self, name: &str) -> Option<Value> {
        match name {
            FIELD_ID => Some(Value::String(self.id.clone())),
            FIELD_CREATED_AT => Some(Value::String(
                self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            )),
            FIELD_UPDATED_AT => Some(Value::String(
                self.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            )),
            _ => self.fields.get(name).cloned(),
        }
    }

    /// Flatten to a serde_json object including id and timestamps.
    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert(
            "id".to_string(),
            serde_json::Value::String(self.id.clone()),
        );
        obj.insert(
            "createdAt".to_string(),
            serde_json::Value::String(
                self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ),
        );
        obj.insert(
            "updatedAt".to_string(),
            serde_json::Value::String(
                self.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            ),
        );
        for (key, value) in &self.fields {
            obj.insert(key.clone(), value.to_json());
        }
        serde_json::Value::Object(obj)
    }
}

/// The serde shape of a record file: timestamps plus the field map.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoredRecord {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub fields: Fields,
}

impl StoredRecord {
    pub fn into_record(self, id: impl Into<String>) -> Record {
        Record {
            id: id.into(),
            fields: self.fields,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn from_record(record: &Record) -> Self {
        Self {
            created_at: record.created_at,
            updated_at: record.updated_at,
            fields: record.fields.clone(),
        }
    }
}

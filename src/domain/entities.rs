//! Domain entities: the records a tree is built from

use std::fmt;
use std::hash::Hash;

use serde_json::{Map, Value};

use crate::config::TreeOptions;

/// A caller-supplied keyed record.
///
/// The tree never inspects a record beyond three fields, named by
/// [`TreeOptions`](crate::config::TreeOptions): the identifier, the parent identifier,
/// and the children field written on reconstructed output.
pub trait Record: Clone + fmt::Debug {
    /// Identifier type; only compared for equality and hashed.
    type Id: Clone + Eq + Hash + fmt::Debug;

    /// Read the field `key` as an identifier. `None` means absent or not usable as an id.
    fn field_id(&self, key: &str) -> Option<Self::Id>;

    /// Store `children` under `key`, replacing whatever the field held.
    fn set_children(&mut self, key: &str, children: Vec<Self>);

    /// Drop the field `key`.
    fn remove_children(&mut self, key: &str);
}

/// Field names taken from [`TreeOptions`] once, when a tree is built.
///
/// Every record access of a tree goes through these accessors.
#[derive(Debug, Clone)]
pub(crate) struct RecordKeys {
    id: Box<str>,
    parent_id: Box<str>,
    children: Box<str>,
}

impl RecordKeys {
    pub(crate) fn resolve(options: &TreeOptions) -> Self {
        Self {
            id: options.id_key.as_str().into(),
            parent_id: options.parent_id_key.as_str().into(),
            children: options.children_key.as_str().into(),
        }
    }

    pub(crate) fn id_of<R: Record>(&self, record: &R) -> Option<R::Id> {
        record.field_id(&self.id)
    }

    pub(crate) fn parent_id_of<R: Record>(&self, record: &R) -> Option<R::Id> {
        record.field_id(&self.parent_id)
    }

    /// Store `children` on the record, or drop the children field when there are none.
    pub(crate) fn attach_children<R: Record>(&self, record: &mut R, children: Vec<R>) {
        if children.is_empty() {
            record.remove_children(&self.children);
        } else {
            record.set_children(&self.children, children);
        }
    }
}

/// Identifier read from a JSON field.
///
/// Numbers keep their serde_json text form, so `1` and `"1"` are different identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonId {
    String(String),
    Number(String),
    Bool(bool),
}

impl JsonId {
    /// `null`, arrays and objects are not identifiers.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(JsonId::String(s.clone())),
            Value::Number(n) => Some(JsonId::Number(n.to_string())),
            Value::Bool(b) => Some(JsonId::Bool(*b)),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }
}

impl fmt::Display for JsonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonId::String(s) | JsonId::Number(s) => write!(f, "{}", s),
            JsonId::Bool(b) => write!(f, "{}", b),
        }
    }
}

impl From<&str> for JsonId {
    fn from(s: &str) -> Self {
        JsonId::String(s.to_string())
    }
}

impl From<String> for JsonId {
    fn from(s: String) -> Self {
        JsonId::String(s)
    }
}

impl From<i64> for JsonId {
    fn from(n: i64) -> Self {
        JsonId::Number(n.to_string())
    }
}

impl From<u64> for JsonId {
    fn from(n: u64) -> Self {
        JsonId::Number(n.to_string())
    }
}

impl From<bool> for JsonId {
    fn from(b: bool) -> Self {
        JsonId::Bool(b)
    }
}

impl Record for Map<String, Value> {
    type Id = JsonId;

    fn field_id(&self, key: &str) -> Option<JsonId> {
        self.get(key).and_then(JsonId::from_value)
    }

    fn set_children(&mut self, key: &str, children: Vec<Self>) {
        let children = children.into_iter().map(Value::Object).collect();
        self.insert(key.to_string(), Value::Array(children));
    }

    fn remove_children(&mut self, key: &str) {
        self.remove(key);
    }
}

/// Objects behave like [`Map`]; any other JSON value is a record without fields.
impl Record for Value {
    type Id = JsonId;

    fn field_id(&self, key: &str) -> Option<JsonId> {
        self.get(key).and_then(JsonId::from_value)
    }

    fn set_children(&mut self, key: &str, children: Vec<Self>) {
        if let Some(object) = self.as_object_mut() {
            object.insert(key.to_string(), Value::Array(children));
        }
    }

    fn remove_children(&mut self, key: &str) {
        if let Some(object) = self.as_object_mut() {
            object.remove(key);
        }
    }
}

//! Dynamic values produced by plugin code.
//!
//! Factories and surface operations return arbitrary nested data. `Value`
//! models that tree: scalars, sequences, string-keyed mappings, and class
//! references. A class reference is the only way a value can name a type
//! rather than carry data, which is what the `assistant_class` check relies on.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Key marking a class reference in JSON/YAML: `{"$class": "Name"}`.
pub const CLASS_TAG: &str = "$class";

/// String-keyed mapping that keeps keys in declaration order.
pub type Mapping = IndexMap<String, Value>;

/// A node in a plugin-produced value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Seq(Vec<Value>),
    Map(Mapping),
    /// Reference to a class by name (a type, not an instance).
    Class(String),
}

/// Shape classification of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Text,
    Sequence,
    Mapping,
    Class,
}

impl ValueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Text => "text",
            ValueKind::Sequence => "sequence",
            ValueKind::Mapping => "mapping",
            ValueKind::Class => "class",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Value {
    /// Build a mapping from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Build a sequence of text values.
    pub fn texts<S: AsRef<str>>(items: &[S]) -> Self {
        Value::Seq(items.iter().map(|s| Value::from(s.as_ref())).collect())
    }

    /// Build a class reference.
    pub fn class(name: impl Into<String>) -> Self {
        Value::Class(name.into())
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Seq(_) => ValueKind::Sequence,
            Value::Map(_) => ValueKind::Mapping,
            Value::Class(_) => ValueKind::Class,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Look up a key when this value is a mapping.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Convert to a JSON value. Class references become `{"$class": name}`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Int(i) => serde_json::Value::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Seq(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Map(m) => serde_json::Value::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Class(name) => {
                let mut obj = serde_json::Map::new();
                obj.insert(CLASS_TAG.to_string(), serde_json::Value::String(name.clone()));
                serde_json::Value::Object(obj)
            }
        }
    }
}

/// Text renders bare, everything else as JSON.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Class(name) => write!(f, "<class {}>", name),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::Seq(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(obj) => {
                if obj.len() == 1 {
                    if let Some(serde_json::Value::String(name)) = obj.get(CLASS_TAG) {
                        return Value::Class(name.clone());
                    }
                }
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(items)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tag_round_trip() {
        let json = serde_json::json!({"assistant_class": {"$class": "EnhancedDemo"}, "n": 1});
        let value = Value::from(json.clone());

        assert_eq!(
            value.get("assistant_class"),
            Some(&Value::Class("EnhancedDemo".to_string()))
        );
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn test_class_tag_with_siblings_is_a_plain_map() {
        let value = Value::from(serde_json::json!({"$class": "X", "other": true}));
        assert_eq!(value.kind(), ValueKind::Mapping);
    }

    #[test]
    fn test_kinds() {
        assert_eq!(Value::from("x").kind().as_str(), "text");
        assert_eq!(Value::texts(&["a"]).kind().as_str(), "sequence");
        assert_eq!(Value::from(serde_json::json!(1.5)).kind(), ValueKind::Float);
        assert_eq!(Value::from(serde_json::json!(3)).kind(), ValueKind::Int);
    }

    #[test]
    fn test_deserialize_from_yaml() {
        let yaml = "name: Demo\ntags: [a, b]\ncls: { $class: EnhancedDemo }\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(value.get("name").and_then(Value::as_text), Some("Demo"));
        assert_eq!(value.get("tags").and_then(Value::as_seq).map(<[Value]>::len), Some(2));
        assert_eq!(value.get("cls"), Some(&Value::class("EnhancedDemo")));
    }

    #[test]
    fn test_mapping_keeps_declared_order() {
        let yaml = "zeta: 1\nalpha: { second: 2, first: 1 }\nmid: 3\n";
        let value: Value = serde_yaml::from_str(yaml).unwrap();

        let keys: Vec<&str> = value.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
        let nested: Vec<&str> = value
            .get("alpha")
            .and_then(Value::as_map)
            .unwrap()
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(nested, ["second", "first"]);
        assert_eq!(
            value.to_json().to_string(),
            r#"{"zeta":1,"alpha":{"second":2,"first":1},"mid":3}"#
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::from("plain").to_string(), "plain");
        assert_eq!(Value::Int(2).to_string(), "2");
        assert_eq!(Value::class("A").to_string(), "<class A>");
    }
}

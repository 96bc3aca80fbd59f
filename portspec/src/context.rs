// context.rs — Resolution contexts for symbolic dimensions
//
// The resolver only needs attribute-by-name lookup on the node that owns a
// port. `AttributeSource` is that capability; `NodeAttrs` is the concrete
// attribute map used by the CLI and connection documents.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Read-only named attribute lookup on a node.
pub trait AttributeSource {
    /// Raw attribute value, if the node has an attribute with this name.
    fn attribute(&self, name: &str) -> Option<Value>;

    /// The node's externally visible identifier, if it has one.
    fn node_id(&self) -> Option<String> {
        None
    }

    /// Integer-valued attribute lookup. `None` when absent or not an integer.
    fn get_int_attribute(&self, name: &str) -> Option<i64> {
        self.attribute(name).and_then(|v| v.as_i64())
    }
}

/// Human-readable label for a node: its identifier, or its address.
pub fn node_label(node: &dyn AttributeSource) -> String {
    match node.node_id() {
        Some(id) if !id.is_empty() => id,
        _ => format!("<node@{:p}>", std::ptr::from_ref(node).cast::<()>()),
    }
}

/// Kind name of an attribute value, as reported in type errors.
pub fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "int",
        Value::Number(n) if n.is_u64() => "int (out of range)",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

// ── NodeAttrs ───────────────────────────────────────────────────────────────

/// A node described by an optional identifier and a flat attribute map.
///
/// In JSON the identifier is the `id` key; every other key is an attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub attrs: BTreeMap<String, Value>,
}

impl NodeAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        NodeAttrs {
            id: Some(id.into()),
            attrs: BTreeMap::new(),
        }
    }

    /// Set an attribute, replacing any previous value.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Parse a `name=value` assignment. The value is read as JSON when it
    /// parses as JSON, otherwise kept as a string.
    pub fn parse_assignment(s: &str) -> Result<(String, Value), String> {
        let (name, raw) = s
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE, got '{s}'"))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(format!("empty attribute name in '{s}'"));
        }
        let raw = raw.trim();
        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        Ok((name.to_string(), value))
    }
}

impl AttributeSource for NodeAttrs {
    fn attribute(&self, name: &str) -> Option<Value> {
        if name == "id" {
            return self.id.clone().map(Value::String);
        }
        self.attrs.get(name).cloned()
    }

    fn node_id(&self) -> Option<String> {
        self.id.clone()
    }
}

impl AttributeSource for HashMap<String, i64> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).map(|&v| Value::from(v))
    }
}

impl AttributeSource for BTreeMap<String, i64> {
    fn attribute(&self, name: &str) -> Option<Value> {
        self.get(name).map(|&v| Value::from(v))
    }
}

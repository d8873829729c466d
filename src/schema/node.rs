//! Wire schema nodes: the JSON-Schema-shaped derivation served to clients.

use serde_json::{json, Map, Value};

/// Discriminated union over wire schema node kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<String>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Object {
        /// Properties in declaration order.
        properties: Vec<(String, SchemaNode)>,
        required: Vec<String>,
    },
    Array {
        items: Box<SchemaNode>,
    },
    /// Serialized as a string node carrying an `enum` list.
    Enum {
        values: Vec<String>,
    },
}

/// One node of the derived wire schema. Always a finite tree: nodes own
/// their children outright, so no node can appear twice on a path.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    pub kind: NodeKind,
    pub description: Option<String>,
}

impl SchemaNode {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn with_description(kind: NodeKind, description: Option<String>) -> Self {
        Self { kind, description }
    }

    /// The wire `type` keyword this node serializes under.
    pub fn type_name(&self) -> &'static str {
        match &self.kind {
            NodeKind::String { .. } | NodeKind::Enum { .. } => "string",
            NodeKind::Number { .. } => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Object { .. } => "object",
            NodeKind::Array { .. } => "array",
        }
    }

    /// Render as a JSON Schema value.
    pub fn to_json(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), json!(self.type_name()));

        match &self.kind {
            NodeKind::String {
                min_length,
                max_length,
                pattern,
            } => {
                if let Some(min) = min_length {
                    schema.insert("minLength".into(), json!(min));
                }
                if let Some(max) = max_length {
                    schema.insert("maxLength".into(), json!(max));
                }
                if let Some(pattern) = pattern {
                    schema.insert("pattern".into(), json!(pattern));
                }
            }
            NodeKind::Number { minimum, maximum } => {
                if let Some(min) = minimum {
                    schema.insert("minimum".into(), json!(min));
                }
                if let Some(max) = maximum {
                    schema.insert("maximum".into(), json!(max));
                }
            }
            NodeKind::Boolean => {}
            NodeKind::Object {
                properties,
                required,
            } => {
                let mut props = Map::new();
                for (name, node) in properties {
                    props.insert(name.clone(), node.to_json());
                }
                schema.insert("properties".into(), Value::Object(props));
                schema.insert("required".into(), json!(required));
            }
            NodeKind::Array { items } => {
                schema.insert("items".into(), items.to_json());
            }
            NodeKind::Enum { values } => {
                schema.insert("enum".into(), json!(values));
            }
        }

        if let Some(description) = &self.description {
            schema.insert("description".into(), json!(description));
        }

        Value::Object(schema)
    }
}

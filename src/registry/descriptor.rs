//! Immutable tool and parameter descriptors.

use serde_json::{json, Map, Value};

use crate::schema::{translate, SchemaSpec};

/// Metadata for one declared tool parameter.
#[derive(Debug, Clone)]
pub struct ParameterDescriptor {
    /// Resolved parameter name (explicit, or generated `param<N>`).
    pub name: String,
    /// 0-based call-order position.
    pub position: usize,
    /// The author's validation schema, kept untranslated for per-call checks.
    pub schema: SchemaSpec,
    /// Whether a call must supply this parameter.
    pub required: bool,
    pub description: Option<String>,
}

/// Metadata for one declared tool. Built once by the declaration builder,
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// Parameters ordered by position.
    pub parameters: Vec<ParameterDescriptor>,
}

impl ToolDescriptor {
    /// The single object-typed parameter, when this tool declares exactly
    /// one parameter and its schema is an object. Such a tool receives the
    /// whole argument object as that parameter's value, and its wire schema
    /// is the object schema itself.
    pub fn single_object_parameter(&self) -> Option<&ParameterDescriptor> {
        match self.parameters.as_slice() {
            [only] if only.schema.is_object() => Some(only),
            _ => None,
        }
    }

    /// Derive the wire input schema: `{type:"object", properties, required}`
    /// over the ordered parameter list, or the translated object schema for
    /// a single object-typed parameter.
    pub fn input_schema(&self) -> Value {
        if let Some(only) = self.single_object_parameter() {
            let mut node = translate(&only.schema);
            if only.description.is_some() {
                node.description = only.description.clone();
            }
            return node.to_json();
        }

        let mut properties = Map::new();
        let mut required = Vec::new();

        for parameter in &self.parameters {
            let mut node = translate(&parameter.schema);
            if parameter.description.is_some() {
                node.description = parameter.description.clone();
            }
            properties.insert(parameter.name.clone(), node.to_json());
            if parameter.required {
                required.push(parameter.name.clone());
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

//! Translate validation schemas into wire schema nodes.

use super::node::{NodeKind, SchemaNode};
use super::spec::{SchemaSpec, SpecKind};

/// Derive the wire schema node for a validation schema.
///
/// Total over the closed constructor set; never fails. Two conversions are
/// lossy on purpose: unions translate only their first option (per-call
/// validation still checks the full union against the original schema), and
/// custom predicates collapse to a plain string leaf. An empty enum gets a
/// single `"unknown"` placeholder so the emitted schema stays valid.
pub fn translate(spec: &SchemaSpec) -> SchemaNode {
    let description = spec.description().map(str::to_owned);

    let kind = match spec.kind() {
        SpecKind::String {
            min_length,
            max_length,
            pattern,
        } => NodeKind::String {
            min_length: *min_length,
            max_length: *max_length,
            pattern: pattern.as_ref().map(|regex| regex.as_str().to_owned()),
        },
        SpecKind::Number { minimum, maximum } => NodeKind::Number {
            minimum: *minimum,
            maximum: *maximum,
        },
        SpecKind::Boolean => NodeKind::Boolean,
        SpecKind::Object { fields } => {
            let mut properties = Vec::with_capacity(fields.len());
            let mut required = Vec::new();
            for field in fields {
                properties.push((field.name.clone(), translate(&field.schema)));
                if !field.schema.is_optional() {
                    required.push(field.name.clone());
                }
            }
            NodeKind::Object {
                properties,
                required,
            }
        }
        SpecKind::Array { items } => NodeKind::Array {
            items: Box::new(translate(items)),
        },
        SpecKind::Enum { values } => NodeKind::Enum {
            values: if values.is_empty() {
                vec!["unknown".into()]
            } else {
                values.clone()
            },
        },
        // Lossy: only the first union option reaches the wire schema.
        SpecKind::Union { options } => match options.first() {
            Some(first) => return describe(translate(first), description),
            None => fallback_string(),
        },
        // Optionality is tracked by the enclosing object/parameter, not the node.
        SpecKind::Optional { inner } => return describe(translate(inner), description),
        // Catch-all for constructs the wire schema cannot express.
        SpecKind::Custom { .. } => fallback_string(),
    };

    SchemaNode::with_description(kind, description)
}

fn fallback_string() -> NodeKind {
    NodeKind::String {
        min_length: None,
        max_length: None,
        pattern: None,
    }
}

fn describe(mut node: SchemaNode, description: Option<String>) -> SchemaNode {
    if description.is_some() {
        node.description = description;
    }
    node
}

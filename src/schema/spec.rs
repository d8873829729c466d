//! Validation schemas: the author-side type and constraint declarations.
//!
//! Built from a closed set of constructors (string, number, boolean, object,
//! array, enum, union, optional, custom) with chainable refinements. These
//! are what tool parameters carry; the dispatcher re-validates every call
//! argument against them, so constraints the wire translation cannot express
//! (full union checking, patterns, ranges) are still enforced.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

/// Predicate used by [`SchemaSpec::custom`] schemas.
pub type CustomCheck = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Discriminated union over schema constructors.
#[derive(Clone)]
pub enum SpecKind {
    String {
        min_length: Option<usize>,
        max_length: Option<usize>,
        pattern: Option<Regex>,
    },
    Number {
        minimum: Option<f64>,
        maximum: Option<f64>,
    },
    Boolean,
    Object { fields: Vec<FieldSpec> },
    Array { items: Box<SchemaSpec> },
    Enum { values: Vec<String> },
    Union { options: Vec<SchemaSpec> },
    Optional { inner: Box<SchemaSpec> },
    /// Escape hatch: an opaque predicate the translator cannot inspect.
    Custom { check: CustomCheck },
}

/// One named field of an object schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub schema: SchemaSpec,
}

/// A validation schema: a [`SpecKind`] plus metadata shared by all kinds.
#[derive(Clone)]
pub struct SchemaSpec {
    kind: SpecKind,
    description: Option<String>,
    default: Option<Value>,
}

impl SchemaSpec {
    fn new(kind: SpecKind) -> Self {
        Self {
            kind,
            description: None,
            default: None,
        }
    }

    /// String schema.
    pub fn string() -> Self {
        Self::new(SpecKind::String {
            min_length: None,
            max_length: None,
            pattern: None,
        })
    }

    /// Number schema (accepts any JSON number).
    pub fn number() -> Self {
        Self::new(SpecKind::Number {
            minimum: None,
            maximum: None,
        })
    }

    /// Boolean schema.
    pub fn boolean() -> Self {
        Self::new(SpecKind::Boolean)
    }

    /// Object schema with the given named fields, in declaration order.
    pub fn object(fields: Vec<FieldSpec>) -> Self {
        Self::new(SpecKind::Object { fields })
    }

    /// Array schema with homogeneous items.
    pub fn array(items: SchemaSpec) -> Self {
        Self::new(SpecKind::Array {
            items: Box::new(items),
        })
    }

    /// Enum schema over a fixed set of string values.
    pub fn enum_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(SpecKind::Enum {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// Union schema: a value is valid when any option accepts it.
    pub fn union(options: Vec<SchemaSpec>) -> Self {
        Self::new(SpecKind::Union { options })
    }

    /// Optional wrapper: the value may be absent or null.
    pub fn optional(inner: SchemaSpec) -> Self {
        Self::new(SpecKind::Optional {
            inner: Box::new(inner),
        })
    }

    /// Custom schema backed by an opaque predicate.
    pub fn custom<F>(check: F) -> Self
    where
        F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    {
        Self::new(SpecKind::Custom {
            check: Arc::new(check),
        })
    }

    /// Attach a human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Attach a default substituted for absent optional parameters.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Minimum numeric value (inclusive). No effect on non-number schemas.
    pub fn min(mut self, value: f64) -> Self {
        if let SpecKind::Number { minimum, .. } = &mut self.kind {
            *minimum = Some(value);
        }
        self
    }

    /// Maximum numeric value (inclusive). No effect on non-number schemas.
    pub fn max(mut self, value: f64) -> Self {
        if let SpecKind::Number { maximum, .. } = &mut self.kind {
            *maximum = Some(value);
        }
        self
    }

    /// Minimum string length. No effect on non-string schemas.
    pub fn min_length(mut self, length: usize) -> Self {
        if let SpecKind::String { min_length, .. } = &mut self.kind {
            *min_length = Some(length);
        }
        self
    }

    /// Maximum string length. No effect on non-string schemas.
    pub fn max_length(mut self, length: usize) -> Self {
        if let SpecKind::String { max_length, .. } = &mut self.kind {
            *max_length = Some(length);
        }
        self
    }

    /// Regex the full string value must match. No effect on non-string schemas.
    pub fn pattern(mut self, regex: Regex) -> Self {
        if let SpecKind::String { pattern, .. } = &mut self.kind {
            *pattern = Some(regex);
        }
        self
    }

    pub fn kind(&self) -> &SpecKind {
        &self.kind
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Whether this schema is wrapped in `optional`.
    pub fn is_optional(&self) -> bool {
        matches!(self.kind, SpecKind::Optional { .. })
    }

    /// Whether this schema resolves to an object constructor.
    pub fn is_object(&self) -> bool {
        matches!(self.kind, SpecKind::Object { .. })
    }

    /// Validate a value against this schema.
    ///
    /// Full recursive check: every violation found is collected rather than
    /// short-circuiting on the first. Unions are checked completely here
    /// (unlike the lossy wire translation): a value passes when at least one
    /// option accepts it.
    pub fn validate(&self, value: &Value) -> Result<(), Vec<String>> {
        self.validate_at("value", value)
    }

    /// Like [`validate`](Self::validate), with an explicit root path used in
    /// error messages (the dispatcher passes the parameter name).
    pub fn validate_at(&self, path: &str, value: &Value) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        self.check(value, path, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn check(&self, value: &Value, path: &str, errors: &mut Vec<String>) {
        match &self.kind {
            SpecKind::String {
                min_length,
                max_length,
                pattern,
            } => match value.as_str() {
                Some(text) => {
                    if let Some(min) = min_length {
                        if text.chars().count() < *min {
                            errors.push(format!("{path}: shorter than {min} characters"));
                        }
                    }
                    if let Some(max) = max_length {
                        if text.chars().count() > *max {
                            errors.push(format!("{path}: longer than {max} characters"));
                        }
                    }
                    if let Some(regex) = pattern {
                        if !regex.is_match(text) {
                            errors.push(format!(
                                "{path}: does not match pattern '{}'",
                                regex.as_str()
                            ));
                        }
                    }
                }
                None => errors.push(type_mismatch(path, "string", value)),
            },
            SpecKind::Number { minimum, maximum } => match value.as_f64() {
                Some(number) => {
                    if let Some(min) = minimum {
                        if number < *min {
                            errors.push(format!("{path}: below minimum {min}"));
                        }
                    }
                    if let Some(max) = maximum {
                        if number > *max {
                            errors.push(format!("{path}: above maximum {max}"));
                        }
                    }
                }
                None => errors.push(type_mismatch(path, "number", value)),
            },
            SpecKind::Boolean => {
                if !value.is_boolean() {
                    errors.push(type_mismatch(path, "boolean", value));
                }
            }
            SpecKind::Object { fields } => match value.as_object() {
                Some(map) => {
                    for field in fields {
                        let field_path = format!("{path}.{}", field.name);
                        match map.get(&field.name) {
                            Some(field_value) => {
                                field.schema.check(field_value, &field_path, errors);
                            }
                            None if field.schema.is_optional() => {}
                            None => errors.push(format!("{field_path}: required field missing")),
                        }
                    }
                }
                None => errors.push(type_mismatch(path, "object", value)),
            },
            SpecKind::Array { items } => match value.as_array() {
                Some(elements) => {
                    for (index, element) in elements.iter().enumerate() {
                        items.check(element, &format!("{path}[{index}]"), errors);
                    }
                }
                None => errors.push(type_mismatch(path, "array", value)),
            },
            SpecKind::Enum { values } => match value.as_str() {
                Some(text) if values.iter().any(|v| v == text) => {}
                Some(text) => errors.push(format!(
                    "{path}: '{text}' is not one of [{}]",
                    values.join(", ")
                )),
                None => errors.push(type_mismatch(path, "string", value)),
            },
            SpecKind::Union { options } => {
                let matched = options.iter().any(|option| {
                    let mut scratch = Vec::new();
                    option.check(value, path, &mut scratch);
                    scratch.is_empty()
                });
                if !matched {
                    errors.push(format!(
                        "{path}: matches none of the {} union options",
                        options.len()
                    ));
                }
            }
            SpecKind::Optional { inner } => {
                if !value.is_null() {
                    inner.check(value, path, errors);
                }
            }
            SpecKind::Custom { check } => {
                if let Err(message) = check(value) {
                    errors.push(format!("{path}: {message}"));
                }
            }
        }
    }
}

fn type_mismatch(path: &str, expected: &str, value: &Value) -> String {
    format!("{path}: expected {expected}, got {}", json_type_name(value))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, schema: SchemaSpec) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

impl fmt::Debug for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String {
                min_length,
                max_length,
                pattern,
            } => f
                .debug_struct("String")
                .field("min_length", min_length)
                .field("max_length", max_length)
                .field("pattern", &pattern.as_ref().map(Regex::as_str))
                .finish(),
            Self::Number { minimum, maximum } => f
                .debug_struct("Number")
                .field("minimum", minimum)
                .field("maximum", maximum)
                .finish(),
            Self::Boolean => f.write_str("Boolean"),
            Self::Object { fields } => f.debug_struct("Object").field("fields", fields).finish(),
            Self::Array { items } => f.debug_struct("Array").field("items", items).finish(),
            Self::Enum { values } => f.debug_struct("Enum").field("values", values).finish(),
            Self::Union { options } => f.debug_struct("Union").field("options", options).finish(),
            Self::Optional { inner } => f.debug_struct("Optional").field("inner", inner).finish(),
            Self::Custom { .. } => f.write_str("Custom"),
        }
    }
}

impl fmt::Debug for SchemaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaSpec")
            .field("kind", &self.kind)
            .field("description", &self.description)
            .field("default", &self.default)
            .finish()
    }
}

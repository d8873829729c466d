//! Two-phase declaration builder for tools and their parameters.
//!
//! Phase one declares the tool (name, description) and attaches parameter
//! specs by formal position; phase two binds the handler and produces an
//! immutable [`ToolDescriptor`]. Position conflicts and gaps are fatal at
//! `build`, so a bad declaration can never reach dispatch.

use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde_json::Value;

use super::descriptor::{ParameterDescriptor, ToolDescriptor};
use crate::dispatch::CallArgs;
use crate::error::{Error, Result};
use crate::schema::SchemaSpec;

/// Boxed future returned by tool handlers.
pub type HandlerFuture = BoxFuture<'static, Result<Value>>;

/// A tool handler bound to its service type. Receives the shared service
/// instance and the marshaled call arguments.
pub type ServiceHandler<S> = Arc<dyn Fn(Arc<S>, CallArgs) -> HandlerFuture + Send + Sync>;

/// Declaration of one tool parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: Option<String>,
    schema: SchemaSpec,
    description: Option<String>,
    required: Option<bool>,
}

impl ParamSpec {
    /// Parameter with a generated name (`param<N>` at its position).
    pub fn new(schema: SchemaSpec) -> Self {
        Self {
            name: None,
            schema,
            description: None,
            required: None,
        }
    }

    /// Parameter with an explicit name.
    pub fn named(name: impl Into<String>, schema: SchemaSpec) -> Self {
        Self {
            name: Some(name.into()),
            schema,
            description: None,
            required: None,
        }
    }

    /// Attach a human-readable description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the required flag computed from the schema's optionality.
    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }
}

/// A fully declared tool: descriptor plus unbound handler.
pub struct ToolDecl<S> {
    pub descriptor: ToolDescriptor,
    pub handler: ServiceHandler<S>,
}

impl<S> std::fmt::Debug for ToolDecl<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolDecl")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Builder for one tool declaration.
pub struct ToolBuilder {
    name: String,
    description: String,
    params: Vec<(usize, ParamSpec)>,
}

impl ToolBuilder {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Attach a parameter at the next free position.
    pub fn param(self, spec: ParamSpec) -> Self {
        let position = self.params.len();
        self.param_at(position, spec)
    }

    /// Attach or update the parameter at an explicit formal position.
    pub fn param_at(mut self, position: usize, spec: ParamSpec) -> Self {
        match self.params.iter_mut().find(|(p, _)| *p == position) {
            Some(slot) => slot.1 = spec,
            None => self.params.push((position, spec)),
        }
        self
    }

    /// Bind the handler and produce the tool declaration.
    ///
    /// Fails with [`Error::Registration`] when the declared positions do not
    /// form the contiguous range `0..N`: such a parameter cannot be resolved
    /// against any real call order, and the failure must surface here rather
    /// than at first invocation.
    pub fn build<S, F, Fut>(mut self, handler: F) -> Result<ToolDecl<S>>
    where
        S: Send + Sync + 'static,
        F: Fn(Arc<S>, CallArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        self.params.sort_by_key(|(position, _)| *position);
        let arity = self.params.len();
        for (index, (position, _)) in self.params.iter().enumerate() {
            if *position != index {
                return Err(Error::Registration(format!(
                    "tool '{}': parameter position {position} cannot be resolved \
                     ({arity} parameters declared, positions must cover 0..{arity})",
                    self.name
                )));
            }
        }

        let parameters = self
            .params
            .into_iter()
            .map(|(position, spec)| ParameterDescriptor {
                name: spec.name.unwrap_or_else(|| format!("param{position}")),
                position,
                required: spec.required.unwrap_or(!spec.schema.is_optional()),
                schema: spec.schema,
                description: spec.description,
            })
            .collect();

        Ok(ToolDecl {
            descriptor: ToolDescriptor {
                name: self.name,
                description: self.description,
                parameters,
            },
            handler: Arc::new(move |service, args| Box::pin(handler(service, args))),
        })
    }
}

/// The declaration table of one service: every tool it exposes, in order.
pub struct ServiceManifest<S> {
    tools: Vec<ToolDecl<S>>,
}

impl<S> ServiceManifest<S> {
    pub fn new() -> Self {
        Self { tools: Vec::new() }
    }

    /// Add a tool declaration.
    pub fn tool(mut self, decl: ToolDecl<S>) -> Self {
        self.tools.push(decl);
        self
    }

    pub fn into_tools(self) -> Vec<ToolDecl<S>> {
        self.tools
    }
}

impl<S> Default for ServiceManifest<S> {
    fn default() -> Self {
        Self::new()
    }
}

/// Implemented by service types that expose tools.
///
/// `manifest` is the explicit registration phase: it returns the full
/// declaration table for the type. The registrar constructs exactly one
/// instance and binds every declared handler to it.
pub trait ToolService: Send + Sync + Sized + 'static {
    fn manifest() -> Result<ServiceManifest<Self>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Nop;

    fn nop_handler(
        _service: Arc<Nop>,
        _args: CallArgs,
    ) -> impl Future<Output = Result<Value>> + Send {
        async { Ok(json!(null)) }
    }

    #[test]
    fn params_get_positions_in_declaration_order() {
        let decl: ToolDecl<Nop> = ToolBuilder::new("t", "test tool")
            .param(ParamSpec::named("first", SchemaSpec::string()))
            .param(ParamSpec::new(SchemaSpec::number()))
            .build(nop_handler)
            .unwrap();

        let params = &decl.descriptor.parameters;
        assert_eq!(params[0].name, "first");
        assert_eq!(params[0].position, 0);
        assert_eq!(params[1].name, "param1");
        assert_eq!(params[1].position, 1);
    }

    #[test]
    fn gap_in_positions_is_fatal_at_build() {
        let result: Result<ToolDecl<Nop>> = ToolBuilder::new("t", "test tool")
            .param_at(0, ParamSpec::new(SchemaSpec::string()))
            .param_at(2, ParamSpec::new(SchemaSpec::string()))
            .build(nop_handler);

        let err = result.unwrap_err();
        assert!(matches!(err, Error::Registration(_)));
        assert!(err.to_string().contains("position 2"));
    }

    #[test]
    fn tool_decl_debug_renders_descriptor_without_handler() {
        let decl: ToolDecl<Nop> = ToolBuilder::new("t", "test tool")
            .build(nop_handler)
            .unwrap();

        let rendered = format!("{decl:?}");
        assert!(rendered.contains("descriptor"));
        assert!(rendered.contains("\"t\""));
        assert!(!rendered.contains("handler"));
    }

    #[test]
    fn redeclaring_a_position_updates_it() {
        let decl: ToolDecl<Nop> = ToolBuilder::new("t", "test tool")
            .param_at(0, ParamSpec::named("old", SchemaSpec::string()))
            .param_at(0, ParamSpec::named("new", SchemaSpec::number()))
            .build(nop_handler)
            .unwrap();

        assert_eq!(decl.descriptor.parameters.len(), 1);
        assert_eq!(decl.descriptor.parameters[0].name, "new");
    }

    #[test]
    fn required_defaults_from_optionality_and_respects_override() {
        let decl: ToolDecl<Nop> = ToolBuilder::new("t", "test tool")
            .param(ParamSpec::new(SchemaSpec::string()))
            .param(ParamSpec::new(SchemaSpec::optional(SchemaSpec::string())))
            .param(ParamSpec::new(SchemaSpec::string()).required(false))
            .build(nop_handler)
            .unwrap();

        let params = &decl.descriptor.parameters;
        assert!(params[0].required);
        assert!(!params[1].required);
        assert!(!params[2].required);
    }

    #[test]
    fn tool_with_no_params_builds_empty_descriptor() {
        let decl: ToolDecl<Nop> = ToolBuilder::new("ping", "liveness probe")
            .build(nop_handler)
            .unwrap();

        assert!(decl.descriptor.parameters.is_empty());
        assert_eq!(decl.descriptor.name, "ping");
    }
}

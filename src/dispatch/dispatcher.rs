//! The dispatcher: validates, marshals, executes a tool call, and normalizes
//! its outcome into the wire envelope.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::arguments::CallArgs;
use super::registry::{RegisteredTool, ToolRegistry};
use super::wire::{
    CallRequest, CallResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestHandler,
    RequestId, ToolInfo, PROTOCOL_VERSION,
};
use crate::config::ServerInfo;
use crate::error::{Error, Result};
use crate::registry::ToolDescriptor;
use crate::schema::SpecKind;

/// Serves discovery and invocation requests against a sealed [`ToolRegistry`].
pub struct Dispatcher {
    registry: ToolRegistry,
    info: ServerInfo,
}

impl Dispatcher {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            info: ServerInfo::default(),
        }
    }

    /// Override the identity reported by `initialize`.
    pub fn with_server_info(mut self, info: ServerInfo) -> Self {
        self.info = info;
        self
    }

    /// All registered tools with their derived wire input schemas, in
    /// registration order.
    pub fn list_tools(&self) -> Vec<ToolInfo> {
        self.registry
            .descriptors()
            .map(|descriptor| ToolInfo {
                name: descriptor.name.clone(),
                description: descriptor.description.clone(),
                input_schema: descriptor.input_schema(),
            })
            .collect()
    }

    /// Invoke a tool and normalize the outcome. This is the outermost
    /// failure barrier: handler errors never propagate past here.
    pub async fn invoke(&self, name: &str, arguments: Value) -> CallResult {
        match self.dispatch(name, arguments).await {
            Ok(value) => match value {
                Value::String(text) => CallResult::success(text),
                other => CallResult::success(other.to_string()),
            },
            Err(error) => {
                warn!(tool = name, error = %error, "tool call failed");
                CallResult::error(error.to_string())
            }
        }
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> Result<Value> {
        let tool = self
            .registry
            .get(name)
            .ok_or_else(|| Error::NotFound(name.to_owned()))?;

        let arguments = match arguments {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(Error::validation(format!(
                    "arguments must be an object, got {other}"
                )))
            }
        };

        validate_call(tool.descriptor.as_ref(), &arguments)?;
        let args = marshal(tool.descriptor.as_ref(), &arguments)?;

        debug!(tool = name, argc = args.len(), "invoking tool");
        run_handler(tool, name, args).await
    }

    /// Route one parsed wire request. Returns `None` for notifications.
    pub async fn handle_request(&self, body: Value) -> Option<Value> {
        let request: JsonRpcRequest = match serde_json::from_value(body) {
            Ok(request) => request,
            Err(error) => {
                return Some(
                    JsonRpcResponse::failure(
                        RequestId::Null,
                        JsonRpcError::parse_error(format!("invalid request: {error}")),
                    )
                    .into_value(),
                )
            }
        };

        // Notifications get no response.
        let id = request.id?;

        let response = match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(
                id,
                serde_json::json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "capabilities": { "tools": {} },
                    "serverInfo": { "name": self.info.name, "version": self.info.version },
                }),
            ),
            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),
            "tools/list" => JsonRpcResponse::success(
                id,
                serde_json::json!({ "tools": self.list_tools() }),
            ),
            "tools/call" => {
                let params: CallRequest =
                    match serde_json::from_value(request.params.unwrap_or(Value::Null)) {
                        Ok(params) => params,
                        Err(error) => {
                            return Some(
                                JsonRpcResponse::failure(
                                    id,
                                    JsonRpcError::invalid_params(format!(
                                        "invalid tools/call params: {error}"
                                    )),
                                )
                                .into_value(),
                            )
                        }
                    };
                let result = self.invoke(&params.name, params.arguments).await;
                match serde_json::to_value(result) {
                    Ok(value) => JsonRpcResponse::success(id, value),
                    Err(error) => JsonRpcResponse::failure(
                        id,
                        JsonRpcError::internal_error(error.to_string()),
                    ),
                }
            }
            method => JsonRpcResponse::failure(id, JsonRpcError::method_not_found(method)),
        };

        Some(response.into_value())
    }

    /// Package this dispatcher as the request handler transports consume.
    pub fn request_handler(self: &Arc<Self>) -> RequestHandler {
        let dispatcher = Arc::clone(self);
        Arc::new(move |body| {
            let dispatcher = Arc::clone(&dispatcher);
            Box::pin(async move { dispatcher.handle_request(body).await })
        })
    }
}

/// Structural and per-field validation, strict mode. All violations are
/// aggregated into a single report.
fn validate_call(descriptor: &ToolDescriptor, arguments: &Map<String, Value>) -> Result<()> {
    let mut reasons = Vec::new();

    // Single object parameter: the wire properties are the object's fields.
    if let Some(only) = descriptor.single_object_parameter() {
        if let SpecKind::Object { fields } = only.schema.kind() {
            for field in fields {
                if !field.schema.is_optional() {
                    match arguments.get(&field.name) {
                        Some(value) if !value.is_null() => {}
                        Some(_) => reasons.push(format!(
                            "required parameter '{}' must not be null",
                            field.name
                        )),
                        None => {
                            reasons.push(format!("missing required parameter '{}'", field.name))
                        }
                    }
                }
            }
            for key in arguments.keys() {
                if !fields.iter().any(|f| &f.name == key) {
                    reasons.push(format!("unknown parameter '{key}'"));
                }
            }
        }
        if reasons.is_empty() {
            let whole = Value::Object(arguments.clone());
            if let Err(errors) = only.schema.validate_at(&only.name, &whole) {
                reasons.extend(errors);
            }
        }
        return if reasons.is_empty() {
            Ok(())
        } else {
            Err(Error::ValidationFailed { reasons })
        };
    }

    for parameter in &descriptor.parameters {
        if parameter.required {
            match arguments.get(&parameter.name) {
                Some(value) if !value.is_null() => {}
                Some(_) => reasons.push(format!(
                    "required parameter '{}' must not be null",
                    parameter.name
                )),
                None => reasons.push(format!("missing required parameter '{}'", parameter.name)),
            }
        }
    }

    for key in arguments.keys() {
        if !descriptor.parameters.iter().any(|p| &p.name == key) {
            reasons.push(format!("unknown parameter '{key}'"));
        }
    }

    if reasons.is_empty() {
        // Re-validate each present value against the author's original
        // schema, not the derived node, so constraints lost in translation
        // are still enforced.
        for parameter in &descriptor.parameters {
            if let Some(value) = arguments.get(&parameter.name) {
                if let Err(errors) = parameter.schema.validate_at(&parameter.name, value) {
                    reasons.extend(errors);
                }
            }
        }
    }

    if reasons.is_empty() {
        Ok(())
    } else {
        Err(Error::ValidationFailed { reasons })
    }
}

/// Shape the validated argument object into what the handler expects.
fn marshal(descriptor: &ToolDescriptor, arguments: &Map<String, Value>) -> Result<CallArgs> {
    // A single object-typed parameter receives the whole argument object.
    if descriptor.single_object_parameter().is_some() {
        return Ok(CallArgs::new(vec![Value::Object(arguments.clone())]));
    }

    let mut values = Vec::with_capacity(descriptor.parameters.len());
    for parameter in &descriptor.parameters {
        match arguments.get(&parameter.name) {
            Some(value) if !value.is_null() => values.push(value.clone()),
            _ if parameter.required => {
                // Defensive re-check; validate_call already rejected this.
                return Err(Error::validation(format!(
                    "required parameter '{}' unexpectedly absent",
                    parameter.name
                )));
            }
            _ => values.push(
                parameter
                    .schema
                    .default()
                    .cloned()
                    .unwrap_or(Value::Null),
            ),
        }
    }
    Ok(CallArgs::new(values))
}

async fn run_handler(tool: &RegisteredTool, name: &str, args: CallArgs) -> Result<Value> {
    (tool.handler)(args).await.map_err(|error| match error {
        already @ Error::Execution { .. } => already,
        other => Error::execution(name, other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ParamSpec, ServiceManifest, ToolBuilder, ToolService};
    use crate::schema::{FieldSpec, SchemaSpec};
    use serde_json::json;

    struct Calculator;

    impl ToolService for Calculator {
        fn manifest() -> Result<ServiceManifest<Self>> {
            Ok(ServiceManifest::new().tool(
                ToolBuilder::new("add", "Add two numbers")
                    .param(ParamSpec::named("a", SchemaSpec::number()))
                    .param(ParamSpec::named("b", SchemaSpec::number()))
                    .build(|_service, args| async move {
                        Ok(json!(args.get_f64(0)? + args.get_f64(1)?))
                    })?,
            ))
        }
    }

    fn dispatcher() -> Dispatcher {
        let mut registry = ToolRegistry::new();
        registry.register(Calculator).unwrap();
        Dispatcher::new(registry)
    }

    #[tokio::test]
    async fn successful_call_returns_serialized_result() {
        let result = dispatcher().invoke("add", json!({ "a": 2, "b": 3 })).await;
        assert!(!result.is_error);
        assert_eq!(result.text(), "5.0");
    }

    #[tokio::test]
    async fn missing_required_parameter_is_reported_by_name() {
        let result = dispatcher().invoke("add", json!({ "a": 2 })).await;
        assert!(result.is_error);
        assert!(result.text().contains("'b'"));
    }

    #[tokio::test]
    async fn unknown_parameter_is_rejected_strictly() {
        let result = dispatcher()
            .invoke("add", json!({ "a": 2, "b": 3, "c": 9 }))
            .await;
        assert!(result.is_error);
        assert!(result.text().contains("unknown parameter 'c'"));
    }

    #[tokio::test]
    async fn unregistered_tool_is_not_found() {
        let result = dispatcher().invoke("subtract", json!({})).await;
        assert!(result.is_error);
        assert!(result.text().contains("tool not found: subtract"));
    }

    #[tokio::test]
    async fn string_results_pass_through_verbatim() {
        struct Echo;

        impl ToolService for Echo {
            fn manifest() -> Result<ServiceManifest<Self>> {
                Ok(ServiceManifest::new().tool(
                    ToolBuilder::new("echo", "Echo a string")
                        .param(ParamSpec::named("text", SchemaSpec::string()))
                        .build(|_service, args| async move {
                            Ok(json!(args.get_str(0)?))
                        })?,
                ))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Echo).unwrap();
        let result = Dispatcher::new(registry)
            .invoke("echo", json!({ "text": "plain text" }))
            .await;

        assert_eq!(result.text(), "plain text");
    }

    #[tokio::test]
    async fn single_object_parameter_receives_whole_argument_object() {
        struct Profile;

        impl ToolService for Profile {
            fn manifest() -> Result<ServiceManifest<Self>> {
                Ok(ServiceManifest::new().tool(
                    ToolBuilder::new("save", "Save a profile")
                        .param(ParamSpec::named(
                            "profile",
                            SchemaSpec::object(vec![
                                FieldSpec::new("name", SchemaSpec::string()),
                                FieldSpec::new(
                                    "age",
                                    SchemaSpec::optional(SchemaSpec::number()),
                                ),
                            ]),
                        ))
                        .build(|_service, args| async move {
                            // The whole object lands in position 0.
                            Ok(args.get(0)["name"].clone())
                        })?,
                ))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Profile).unwrap();
        let result = Dispatcher::new(registry)
            .invoke("save", json!({ "name": "Ada", "age": 36 }))
            .await;

        assert!(!result.is_error);
        assert_eq!(result.text(), "Ada");
    }

    #[tokio::test]
    async fn absent_optional_parameter_takes_schema_default() {
        struct Greeting;

        impl ToolService for Greeting {
            fn manifest() -> Result<ServiceManifest<Self>> {
                Ok(ServiceManifest::new().tool(
                    ToolBuilder::new("greet", "Greet someone")
                        .param(ParamSpec::named("name", SchemaSpec::string()))
                        .param(ParamSpec::named(
                            "salutation",
                            SchemaSpec::optional(SchemaSpec::string())
                                .default_value(json!("Hello")),
                        ))
                        .build(|_service, args| async move {
                            Ok(json!(format!(
                                "{}, {}!",
                                args.get_str(1)?,
                                args.get_str(0)?
                            )))
                        })?,
                ))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Greeting).unwrap();
        let result = Dispatcher::new(registry)
            .invoke("greet", json!({ "name": "Ada" }))
            .await;

        assert_eq!(result.text(), "Hello, Ada!");
    }

    #[tokio::test]
    async fn handler_error_is_caught_and_wrapped() {
        struct Flaky;

        impl ToolService for Flaky {
            fn manifest() -> Result<ServiceManifest<Self>> {
                Ok(ServiceManifest::new().tool(
                    ToolBuilder::new("explode", "Always fails").build(
                        |_service, _args| async move {
                            Err(Error::execution("explode", "kaboom"))
                        },
                    )?,
                ))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Flaky).unwrap();
        let result = Dispatcher::new(registry).invoke("explode", json!({})).await;

        assert!(result.is_error);
        assert!(result.text().contains("kaboom"));
    }

    #[tokio::test]
    async fn constraint_lost_in_translation_is_still_enforced() {
        struct Unioned;

        impl ToolService for Unioned {
            fn manifest() -> Result<ServiceManifest<Self>> {
                Ok(ServiceManifest::new().tool(
                    ToolBuilder::new("pick", "Accepts a string or number")
                        .param(ParamSpec::named(
                            "value",
                            SchemaSpec::union(vec![
                                SchemaSpec::string(),
                                SchemaSpec::number(),
                            ]),
                        ))
                        .build(|_service, args| async move { Ok(args.get(0).clone()) })?,
                ))
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Unioned).unwrap();
        let dispatcher = Dispatcher::new(registry);

        // Wire schema only shows the first option (string), but the original
        // union still admits numbers and rejects booleans.
        let ok = dispatcher.invoke("pick", json!({ "value": 7 })).await;
        assert!(!ok.is_error);

        let rejected = dispatcher.invoke("pick", json!({ "value": true })).await;
        assert!(rejected.is_error);
        assert!(rejected.text().contains("union"));
    }

    #[tokio::test]
    async fn validation_reasons_are_aggregated() {
        let result = dispatcher()
            .invoke("add", json!({ "b": "three", "z": 1 }))
            .await;

        let text = result.text();
        assert!(result.is_error);
        assert!(text.contains("missing required parameter 'a'"));
        assert!(text.contains("unknown parameter 'z'"));
    }

    #[tokio::test]
    async fn handle_request_routes_list_and_call() {
        let dispatcher = dispatcher();

        let listing = dispatcher
            .handle_request(json!({ "jsonrpc": "2.0", "method": "tools/list", "id": 1 }))
            .await
            .unwrap();
        assert_eq!(listing["result"]["tools"][0]["name"], "add");

        let call = dispatcher
            .handle_request(json!({
                "jsonrpc": "2.0",
                "method": "tools/call",
                "params": { "name": "add", "arguments": { "a": 2, "b": 3 } },
                "id": 2,
            }))
            .await
            .unwrap();
        assert_eq!(call["result"]["content"][0]["text"], "5.0");
    }

    #[tokio::test]
    async fn handle_request_ignores_notifications() {
        let response = dispatcher()
            .handle_request(json!({
                "jsonrpc": "2.0",
                "method": "notifications/initialized",
            }))
            .await;
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn unknown_method_maps_to_json_rpc_error() {
        let response = dispatcher()
            .handle_request(json!({ "jsonrpc": "2.0", "method": "resources/list", "id": 3 }))
            .await
            .unwrap();
        assert_eq!(response["error"]["code"], -32601);
    }
}

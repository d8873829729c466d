//! End-to-end tests for registration and dispatch.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use toolgate::prelude::*;

struct Calculator {
    calls: AtomicUsize,
}

impl Calculator {
    fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

impl ToolService for Calculator {
    fn manifest() -> Result<ServiceManifest<Self>> {
        Ok(ServiceManifest::new()
            .tool(
                ToolBuilder::new("add", "Add two numbers")
                    .param(ParamSpec::named("a", SchemaSpec::number()).describe("first addend"))
                    .param(ParamSpec::named("b", SchemaSpec::number()).describe("second addend"))
                    .build(|service: Arc<Self>, args| async move {
                        service.calls.fetch_add(1, Ordering::SeqCst);
                        Ok(json!(args.get_f64(0)? + args.get_f64(1)?))
                    })?,
            )
            .tool(
                ToolBuilder::new("describe", "Describe a color")
                    .param(ParamSpec::named(
                        "color",
                        SchemaSpec::enum_of(["red", "green", "blue"]),
                    ))
                    .build(|service: Arc<Self>, args| async move {
                        service.calls.fetch_add(1, Ordering::SeqCst);
                        Ok(json!(format!("a nice shade of {}", args.get_str(0)?)))
                    })?,
            )
            .tool(
                ToolBuilder::new("ping", "Liveness probe").build(
                    |service: Arc<Self>, _args| async move {
                        service.calls.fetch_add(1, Ordering::SeqCst);
                        Ok(json!("pong"))
                    },
                )?,
            ))
    }
}

fn dispatcher() -> Dispatcher {
    let mut registry = ToolRegistry::new();
    registry.register(Calculator::new()).unwrap();
    Dispatcher::new(registry)
}

#[test]
fn registration_round_trip_lists_every_tool_in_order() {
    let tools = dispatcher().list_tools();

    let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["add", "describe", "ping"]);

    let add = &tools[0];
    assert_eq!(add.description, "Add two numbers");
    assert_eq!(add.input_schema["type"], "object");
    assert_eq!(add.input_schema["required"], json!(["a", "b"]));
    assert_eq!(add.input_schema["properties"]["a"]["type"], "number");
    assert_eq!(
        add.input_schema["properties"]["a"]["description"],
        "first addend"
    );

    let describe = &tools[1];
    assert_eq!(
        describe.input_schema["properties"]["color"]["enum"],
        json!(["red", "green", "blue"])
    );

    let ping = &tools[2];
    assert_eq!(ping.input_schema["properties"], json!({}));
    assert_eq!(ping.input_schema["required"], json!([]));
}

#[tokio::test]
async fn add_with_both_numbers_succeeds() {
    let result = dispatcher().invoke("add", json!({ "a": 2, "b": 3 })).await;
    assert!(!result.is_error);
    assert_eq!(result.text(), "5.0");
}

#[tokio::test]
async fn missing_required_parameter_mentions_its_name() {
    let result = dispatcher().invoke("add", json!({ "a": 2 })).await;
    assert!(result.is_error);
    assert!(result.text().contains("'b'"), "got: {}", result.text());
}

#[tokio::test]
async fn unknown_key_is_rejected_and_handler_never_runs() {
    let mut registry = ToolRegistry::new();
    registry.register(Calculator::new()).unwrap();
    let dispatcher = Arc::new(Dispatcher::new(registry));

    let result = dispatcher
        .invoke("add", json!({ "a": 2, "b": 3, "c": 9 }))
        .await;
    assert!(result.is_error);
    assert!(result.text().contains("'c'"));

    // The rejected call leaves the registry fully serviceable.
    let handler = dispatcher.request_handler();
    let response = handler(json!({
        "jsonrpc": "2.0",
        "method": "tools/call",
        "params": { "name": "ping", "arguments": {} },
        "id": 1,
    }))
    .await
    .unwrap();
    assert_eq!(response["result"]["content"][0]["text"], "pong");
}

#[tokio::test]
async fn strict_mode_handler_call_count_stays_zero() {
    let calls = Arc::new(AtomicUsize::new(0));

    struct Probe {
        calls: Arc<AtomicUsize>,
    }

    impl ToolService for Probe {
        fn manifest() -> Result<ServiceManifest<Self>> {
            Ok(ServiceManifest::new().tool(
                ToolBuilder::new("probe", "Count invocations")
                    .param(ParamSpec::named("x", SchemaSpec::number()))
                    .build(|service: Arc<Self>, _args| async move {
                        service.calls.fetch_add(1, Ordering::SeqCst);
                        Ok(json!(null))
                    })?,
            ))
        }
    }

    let mut registry = ToolRegistry::new();
    registry
        .register(Probe {
            calls: Arc::clone(&calls),
        })
        .unwrap();
    let dispatcher = Dispatcher::new(registry);

    let result = dispatcher
        .invoke("probe", json!({ "x": 1, "stray": true }))
        .await;
    assert!(result.is_error);
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let result = dispatcher.invoke("probe", json!({ "x": 1 })).await;
    assert!(!result.is_error);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unregistered_tool_reports_not_found() {
    let result = dispatcher().invoke("multiply", json!({})).await;
    assert!(result.is_error);
    assert!(result.text().contains("tool not found: multiply"));
}

#[tokio::test]
async fn enum_parameter_round_trips_through_validation() {
    let dispatcher = dispatcher();

    let ok = dispatcher
        .invoke("describe", json!({ "color": "green" }))
        .await;
    assert_eq!(ok.text(), "a nice shade of green");

    let rejected = dispatcher
        .invoke("describe", json!({ "color": "mauve" }))
        .await;
    assert!(rejected.is_error);
    assert!(rejected.text().contains("'mauve' is not one of"));
}

#[tokio::test]
async fn initialize_reports_server_identity() {
    let mut registry = ToolRegistry::new();
    registry.register(Calculator::new()).unwrap();
    let dispatcher = Dispatcher::new(registry).with_server_info(ServerInfo {
        name: "calc-server".into(),
        version: "9.9.9".into(),
    });

    let response = dispatcher
        .handle_request(json!({ "jsonrpc": "2.0", "method": "initialize", "id": 1 }))
        .await
        .unwrap();
    assert_eq!(response["result"]["serverInfo"]["name"], "calc-server");
    assert_eq!(response["result"]["capabilities"]["tools"], json!({}));
}

#[tokio::test]
async fn concurrent_calls_share_one_service_instance() {
    let mut registry = ToolRegistry::new();
    registry.register(Calculator::new()).unwrap();
    let dispatcher = Arc::new(Dispatcher::new(registry));

    let mut joins = Vec::new();
    for i in 0..8 {
        let dispatcher = Arc::clone(&dispatcher);
        joins.push(tokio::spawn(async move {
            dispatcher.invoke("add", json!({ "a": i, "b": 1 })).await
        }));
    }
    for join in joins {
        assert!(!join.await.unwrap().is_error);
    }
}

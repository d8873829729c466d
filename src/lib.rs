//! toolgate — declarative tool exposure and invocation engine.
//!
//! Services declare callable operations ("tools") through an explicit
//! declaration table, the engine derives wire parameter schemas from the
//! validation schemas, and discovery/invocation requests are served over
//! pluggable transports (stdio, streamable HTTP).
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use toolgate::prelude::*;
//!
//! struct Calculator;
//!
//! impl ToolService for Calculator {
//!     fn manifest() -> Result<ServiceManifest<Self>> {
//!         Ok(ServiceManifest::new().tool(
//!             ToolBuilder::new("add", "Add two numbers")
//!                 .param(ParamSpec::named("a", SchemaSpec::number()))
//!                 .param(ParamSpec::named("b", SchemaSpec::number()))
//!                 .build(|_service, args| async move {
//!                     Ok(json!(args.get_f64(0)? + args.get_f64(1)?))
//!                 })?,
//!         ))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let mut registry = ToolRegistry::new();
//! registry.register(Calculator)?;
//! let dispatcher = Arc::new(Dispatcher::new(registry));
//!
//! let mut manager = TransportManager::new();
//! manager.set_current(Box::new(StdioTransport::new()))?;
//! manager.start(dispatcher.request_handler()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod prelude;
pub mod registry;
pub mod schema;
pub mod transport;

pub use error::{Error, Result};

//! Convenience re-exports for common use.

pub use crate::config::{HttpConfig, ServerInfo};
pub use crate::dispatch::{CallArgs, CallResult, Dispatcher, ToolInfo, ToolRegistry};
pub use crate::error::{Error, Result};
pub use crate::registry::{ParamSpec, ServiceManifest, ToolBuilder, ToolDescriptor, ToolService};
pub use crate::schema::{translate, FieldSpec, SchemaNode, SchemaSpec};
pub use crate::transport::{
    HttpTransport, StdioTransport, Transport, TransportKind, TransportManager,
};

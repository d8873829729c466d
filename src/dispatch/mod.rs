//! Service registration and tool call dispatch.

pub mod arguments;
pub mod dispatcher;
pub mod registry;
pub mod wire;

pub use arguments::CallArgs;
pub use dispatcher::Dispatcher;
pub use registry::{BoundHandler, RegisteredTool, ToolRegistry};
pub use wire::{
    CallRequest, CallResult, ContentItem, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    RequestHandler, RequestId, ToolInfo,
};

//! Tool metadata: descriptors and the declaration builder.
//!
//! Services describe their tools through an explicit declaration table: a
//! [`ToolBuilder`] per exposed method, aggregated into a [`ServiceManifest`].
//! Declaration problems (unresolvable parameter positions) fail at build
//! time, never at first invocation.

pub mod builder;
pub mod descriptor;

pub use builder::{
    HandlerFuture, ParamSpec, ServiceHandler, ServiceManifest, ToolBuilder, ToolDecl, ToolService,
};
pub use descriptor::{ParameterDescriptor, ToolDescriptor};

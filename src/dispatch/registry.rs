//! Tool registry: name → descriptor plus handler bound to one service instance.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dispatch::CallArgs;
use crate::error::Result;
use crate::registry::{HandlerFuture, ToolDescriptor, ToolService};

/// A handler with its service instance already captured.
pub type BoundHandler = Arc<dyn Fn(CallArgs) -> HandlerFuture + Send + Sync>;

/// One registered tool.
#[derive(Clone)]
pub struct RegisteredTool {
    pub descriptor: Arc<ToolDescriptor>,
    pub handler: BoundHandler,
}

/// Registry of every exposed tool. Populated by [`ToolRegistry::register`]
/// before transport start; read-only during dispatch.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, RegisteredTool>,
    /// Registration order of the names in `tools`.
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a service: construct exactly one shared instance and bind
    /// every tool in its manifest to it. All calls to any of the service's
    /// tools go through that single instance.
    ///
    /// A duplicate tool name overwrites the earlier registration (last one
    /// wins); the collision is logged.
    pub fn register<S: ToolService>(&mut self, service: S) -> Result<()> {
        let instance = Arc::new(service);
        for decl in S::manifest()?.into_tools() {
            let handler = decl.handler;
            let instance = Arc::clone(&instance);
            let bound: BoundHandler = Arc::new(move |args| handler(Arc::clone(&instance), args));

            let name = decl.descriptor.name.clone();
            debug!(tool = %name, params = decl.descriptor.parameters.len(), "registering tool");
            let previous = self.tools.insert(
                name.clone(),
                RegisteredTool {
                    descriptor: Arc::new(decl.descriptor),
                    handler: bound,
                },
            );
            match previous {
                Some(_) => warn!(tool = %name, "duplicate tool name, last registration wins"),
                None => self.order.push(name),
            }
        }
        Ok(())
    }

    /// Register a service constructed from its `Default` impl.
    pub fn register_default<S: ToolService + Default>(&mut self) -> Result<()> {
        self.register(S::default())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Descriptors in registration order.
    pub fn descriptors(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| tool.descriptor.as_ref())
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.order)
            .finish()
    }
}

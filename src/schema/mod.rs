//! Schema system: validation schemas, wire schema nodes, and translation.
//!
//! A [`SchemaSpec`] is the author-side declaration attached to a tool
//! parameter (the source of truth for validation). A [`SchemaNode`] is the
//! wire-protocol-shaped derivation served to clients. [`translate`] maps one
//! to the other, best effort, never failing.

pub mod node;
pub mod spec;
pub mod translate;

pub use node::{NodeKind, SchemaNode};
pub use spec::{FieldSpec, SchemaSpec, SpecKind};
pub use translate::translate;

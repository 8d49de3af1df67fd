//! DOM Module - Versioned arena document store
//!
//! Implements a copy-on-write document representation using:
//! - Arena allocation for nodes, addressed by NodeId (u32)
//! - String interning for names, values and content
//! - Action batches as the only way to derive a new version
//! - A builder that turns tokenizer output into the first batch

pub mod action;
pub mod builder;
pub mod node;
pub mod serialize;
pub mod store;
pub mod strings;

pub use action::{Action, NodeRef, Transaction};
pub use builder::{parse, Builder};
pub use node::{Links, NodeData, NodeId, NodeKind, NodeRecord, NONE, ROOT};
pub use serialize::{render, render_node};
pub use store::{Descendants, DocumentStore, Siblings};
pub use strings::{StrId, StringPool};

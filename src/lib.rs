//! xmlarena - XML tokenizing, versioned arena documents and path queries
//!
//! Layers:
//! - core: byte-level tokenizer emitting structural entities with positions
//! - dom: copy-on-write document store, string interning, builder, serializer
//! - xpath: minimal path language (`/a/b[@k='v']`), cache, parallel evaluation
//!
//! ```
//! use xmlarena::{parse, query, render, ParseOptions, ROOT};
//!
//! let store = parse(b"<root><child attr=\"a\">A</child><child attr=\"b\">B</child></root>",
//!                   &ParseOptions::default()).unwrap();
//! let hits = query(&store, ROOT, "/root/child[@attr=\"a\"]").unwrap();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(store.text_content(hits[0]), b"A");
//! assert_eq!(render(&store), b"<root><child attr=\"a\">A</child><child attr=\"b\">B</child></root>");
//! ```

pub mod config;
pub mod core;
mod document;
pub mod dom;
pub mod error;
pub mod xpath;

pub use config::{Limits, ParseOptions, WhitespaceMode};
pub use crate::core::{tokenize, Entity, EntityKind, EntitySink, Tokenizer};
pub use document::Document;
pub use dom::{
    parse, render, render_node, Action, DocumentStore, NodeId, NodeKind, NodeRef, Transaction, ROOT,
};
pub use error::{Error, Result, StoreError, TokenizeError, XPathError};
pub use xpath::{evaluate, query, QueryCache};
#[cfg(feature = "parallel")]
pub use xpath::evaluate_many;

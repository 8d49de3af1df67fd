//! Document handle
//!
//! Wraps one store version in an `Arc` so it can be handed around and
//! shared between threads cheaply. Transforming a handle returns a new
//! handle; the old one keeps answering queries against its own version.

use std::sync::Arc;

use crate::config::ParseOptions;
use crate::dom::{self, Action, DocumentStore, NodeId, ROOT};
use crate::error::Result;
use crate::xpath::{self, Path, QueryCache};

/// A parsed document at one version
#[derive(Debug, Clone)]
pub struct Document {
    store: Arc<DocumentStore>,
}

impl Document {
    /// Parse with default options
    pub fn parse(input: &[u8]) -> Result<Self> {
        Self::parse_with(input, &ParseOptions::default())
    }

    pub fn parse_with(input: &[u8], options: &ParseOptions) -> Result<Self> {
        Ok(Document::from(dom::parse(input, options)?))
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn version(&self) -> u64 {
        self.store.version()
    }

    pub fn root_element(&self) -> Option<NodeId> {
        self.store.root_element()
    }

    /// Evaluate `expr` from the document root
    pub fn query(&self, expr: &str) -> Result<Vec<NodeId>> {
        self.query_from(ROOT, expr)
    }

    /// Evaluate `expr` from a Document or Element node
    pub fn query_from(&self, context: NodeId, expr: &str) -> Result<Vec<NodeId>> {
        Ok(xpath::query(&self.store, context, expr)?)
    }

    /// Evaluate through a shared cache of parsed paths
    pub fn query_cached(&self, cache: &QueryCache, expr: &str) -> Result<Vec<NodeId>> {
        Ok(cache.query(&self.store, ROOT, expr)?)
    }

    /// Evaluate a parsed path from the document root
    pub fn select(&self, path: &Path) -> Vec<NodeId> {
        xpath::evaluate(&self.store, ROOT, path)
    }

    /// Next version with `actions` applied; `self` is unchanged
    pub fn transform<I>(&self, actions: I) -> Result<Document>
    where
        I: IntoIterator<Item = Action>,
    {
        Ok(Document::from(self.store.transform(actions)?))
    }

    /// Serialize the whole document
    pub fn render(&self) -> Vec<u8> {
        dom::render(&self.store)
    }

    /// Serialize one node and its subtree
    pub fn render_node(&self, id: NodeId) -> Vec<u8> {
        dom::render_node(&self.store, id)
    }

    /// Concatenated text below `id`, lossily decoded as UTF-8
    pub fn text(&self, id: NodeId) -> String {
        String::from_utf8_lossy(&self.store.text_content(id)).into_owned()
    }
}

impl From<DocumentStore> for Document {
    fn from(store: DocumentStore) -> Self {
        Document {
            store: Arc::new(store),
        }
    }
}

impl AsRef<DocumentStore> for Document {
    fn as_ref(&self) -> &DocumentStore {
        &self.store
    }
}

//! Tree Builder - entities to store actions
//!
//! Consumes tokenizer output and records one batch that builds the tree
//! under the document root:
//! - Open: create the element, set its attributes, append it to the current
//!   insertion point and make it the new insertion point
//! - Close: pop the insertion point (close names are not matched)
//! - Text, CDATA, Comment, PI: create the node and append it
//!
//! Entity references in text and attribute values are stored undecoded.

use tracing::debug;

use super::action::{NodeRef, Transaction};
use super::node::ROOT;
use super::store::DocumentStore;
use crate::config::{ParseOptions, WhitespaceMode};
use crate::core::scanner::is_all_whitespace;
use crate::core::{Entity, EntityKind, EntitySink, Tokenizer};
use crate::error::Result;

/// Entity sink that records the tree-building batch
pub struct Builder<'a> {
    input: &'a [u8],
    whitespace: WhitespaceMode,
    /// Open elements, innermost last
    stack: Vec<NodeRef>,
    tx: Transaction,
}

/// Each tag costs a create and an append; text runs are not counted
fn action_estimate(input: &[u8]) -> usize {
    memchr::memchr_iter(b'<', input).count() * 2
}

impl<'a> Builder<'a> {
    pub fn new(input: &'a [u8], whitespace: WhitespaceMode) -> Self {
        Builder {
            input,
            whitespace,
            stack: Vec::with_capacity(32),
            tx: Transaction::with_capacity(action_estimate(input)),
        }
    }

    /// Current insertion point
    #[inline]
    fn parent(&self) -> NodeRef {
        self.stack.last().copied().unwrap_or(NodeRef::Id(ROOT))
    }

    /// Number of elements opened but not yet closed
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The recorded batch
    pub fn finish(self) -> Transaction {
        if !self.stack.is_empty() {
            debug!(unclosed = self.stack.len(), "input ended inside open elements");
        }
        self.tx
    }
}

impl EntitySink for Builder<'_> {
    fn entity(&mut self, entity: Entity) {
        let input = self.input;
        match &entity.kind {
            EntityKind::Open {
                name, attributes, ..
            } => {
                let parent = self.parent();
                let element = self.tx.create_element(name.slice(input));
                for attr in attributes {
                    self.tx
                        .set_attribute(element, attr.name.slice(input), attr.value.slice(input));
                }
                self.tx.append_child(parent, element);
                self.stack.push(element);
            }
            EntityKind::Close { .. } => {
                // Never pops past the document root
                self.stack.pop();
            }
            EntityKind::Text => {
                let text = entity.span.slice(input);
                if self.whitespace == WhitespaceMode::Ignore && is_all_whitespace(text) {
                    return;
                }
                let parent = self.parent();
                let node = self.tx.create_text(text);
                self.tx.append_child(parent, node);
            }
            EntityKind::CData { content } => {
                let parent = self.parent();
                let node = self.tx.create_cdata(content.slice(input));
                self.tx.append_child(parent, node);
            }
            EntityKind::Comment { content } => {
                let parent = self.parent();
                let node = self.tx.create_comment(content.slice(input));
                self.tx.append_child(parent, node);
            }
            EntityKind::ProcessingInstruction { content } => {
                let parent = self.parent();
                let node = self.tx.create_processing_instruction(content.slice(input));
                self.tx.append_child(parent, node);
            }
        }
    }
}

/// Parse `input` into a fresh store whose version 1 holds the document
pub fn parse(input: &[u8], options: &ParseOptions) -> Result<DocumentStore> {
    let mut builder = Builder::new(input, options.whitespace);
    let entities = Tokenizer::with_limits(options.limits).write(input, &mut builder)?;
    let tx = builder.finish();
    debug!(
        bytes = input.len(),
        entities,
        actions = tx.len(),
        "built document batch"
    );
    let store = DocumentStore::with_limits(options.limits).transform(tx)?;
    Ok(store)
}

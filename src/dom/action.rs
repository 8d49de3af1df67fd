//! Actions - recorded structural edits
//!
//! A batch of actions is applied by `DocumentStore::transform`. Nodes created
//! earlier in the same batch are addressed with `NodeRef::New(n)`, the n-th
//! creation of the batch, since their ids are only assigned during the
//! transform.

use super::node::NodeId;

/// Target of an action: an existing id or a node created in this batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Id(NodeId),
    New(usize),
}

impl From<NodeId> for NodeRef {
    fn from(id: NodeId) -> Self {
        NodeRef::Id(id)
    }
}

/// One structural edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    CreateDocument,
    CreateElement { tag: Vec<u8> },
    CreateAttribute { name: Vec<u8>, value: Vec<u8> },
    CreateText { content: Vec<u8> },
    CreateCData { content: Vec<u8> },
    CreateComment { content: Vec<u8> },
    CreateProcessingInstruction { content: Vec<u8> },
    AppendChild { parent: NodeRef, child: NodeRef },
    PrependChild { parent: NodeRef, child: NodeRef },
    RemoveChild { parent: NodeRef, child: NodeRef },
    SetAttribute { element: NodeRef, name: Vec<u8>, value: Vec<u8> },
    RemoveAttribute { element: NodeRef, name: Vec<u8> },
}

impl Action {
    /// True if applying this action allocates a node the batch can refer to
    pub fn creates_node(&self) -> bool {
        matches!(
            self,
            Action::CreateDocument
                | Action::CreateElement { .. }
                | Action::CreateAttribute { .. }
                | Action::CreateText { .. }
                | Action::CreateCData { .. }
                | Action::CreateComment { .. }
                | Action::CreateProcessingInstruction { .. }
        )
    }
}

/// Records a batch of actions, numbering created nodes as it goes
///
/// ```
/// use xmlarena::dom::{DocumentStore, Transaction, ROOT};
///
/// let base = DocumentStore::new();
/// let mut tx = Transaction::new();
/// let item = tx.create_element("item");
/// tx.set_attribute(item, "id", "1");
/// tx.append_child(ROOT, item);
/// let next = base.transform(tx).unwrap();
/// assert_eq!(next.child_count(ROOT), 1);
/// assert_eq!(base.child_count(ROOT), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Transaction {
    actions: Vec<Action>,
    created: usize,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(actions: usize) -> Self {
        Transaction {
            actions: Vec::with_capacity(actions),
            created: 0,
        }
    }

    /// Record an action; returns its node reference if it creates one
    pub fn push(&mut self, action: Action) -> Option<NodeRef> {
        let creates = action.creates_node();
        self.actions.push(action);
        if creates {
            self.created += 1;
            Some(NodeRef::New(self.created - 1))
        } else {
            None
        }
    }

    fn create(&mut self, action: Action) -> NodeRef {
        self.actions.push(action);
        self.created += 1;
        NodeRef::New(self.created - 1)
    }

    pub fn create_document(&mut self) -> NodeRef {
        self.create(Action::CreateDocument)
    }

    pub fn create_element(&mut self, tag: impl AsRef<[u8]>) -> NodeRef {
        self.create(Action::CreateElement {
            tag: tag.as_ref().to_vec(),
        })
    }

    pub fn create_attribute(&mut self, name: impl AsRef<[u8]>, value: impl AsRef<[u8]>) -> NodeRef {
        self.create(Action::CreateAttribute {
            name: name.as_ref().to_vec(),
            value: value.as_ref().to_vec(),
        })
    }

    pub fn create_text(&mut self, content: impl AsRef<[u8]>) -> NodeRef {
        self.create(Action::CreateText {
            content: content.as_ref().to_vec(),
        })
    }

    pub fn create_cdata(&mut self, content: impl AsRef<[u8]>) -> NodeRef {
        self.create(Action::CreateCData {
            content: content.as_ref().to_vec(),
        })
    }

    pub fn create_comment(&mut self, content: impl AsRef<[u8]>) -> NodeRef {
        self.create(Action::CreateComment {
            content: content.as_ref().to_vec(),
        })
    }

    pub fn create_processing_instruction(&mut self, content: impl AsRef<[u8]>) -> NodeRef {
        self.create(Action::CreateProcessingInstruction {
            content: content.as_ref().to_vec(),
        })
    }

    pub fn append_child(&mut self, parent: impl Into<NodeRef>, child: impl Into<NodeRef>) {
        self.actions.push(Action::AppendChild {
            parent: parent.into(),
            child: child.into(),
        });
    }

    pub fn prepend_child(&mut self, parent: impl Into<NodeRef>, child: impl Into<NodeRef>) {
        self.actions.push(Action::PrependChild {
            parent: parent.into(),
            child: child.into(),
        });
    }

    pub fn remove_child(&mut self, parent: impl Into<NodeRef>, child: impl Into<NodeRef>) {
        self.actions.push(Action::RemoveChild {
            parent: parent.into(),
            child: child.into(),
        });
    }

    pub fn set_attribute(
        &mut self,
        element: impl Into<NodeRef>,
        name: impl AsRef<[u8]>,
        value: impl AsRef<[u8]>,
    ) {
        self.actions.push(Action::SetAttribute {
            element: element.into(),
            name: name.as_ref().to_vec(),
            value: value.as_ref().to_vec(),
        });
    }

    pub fn remove_attribute(&mut self, element: impl Into<NodeRef>, name: impl AsRef<[u8]>) {
        self.actions.push(Action::RemoveAttribute {
            element: element.into(),
            name: name.as_ref().to_vec(),
        });
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of nodes this batch will create
    pub fn created(&self) -> usize {
        self.created
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn into_actions(self) -> Vec<Action> {
        self.actions
    }
}

impl IntoIterator for Transaction {
    type Item = Action;
    type IntoIter = std::vec::IntoIter<Action>;

    fn into_iter(self) -> Self::IntoIter {
        self.actions.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creations_are_numbered() {
        let mut tx = Transaction::new();
        let a = tx.create_element("a");
        tx.set_attribute(a, "k", "v");
        let t = tx.create_text("hi");
        tx.append_child(a, t);
        assert_eq!(a, NodeRef::New(0));
        assert_eq!(t, NodeRef::New(1));
        assert_eq!(tx.created(), 2);
        assert_eq!(tx.len(), 4);
    }

    #[test]
    fn test_push_reports_creations() {
        let mut tx = Transaction::new();
        assert_eq!(tx.push(Action::CreateDocument), Some(NodeRef::New(0)));
        assert_eq!(
            tx.push(Action::RemoveAttribute {
                element: NodeRef::Id(2),
                name: b"x".to_vec()
            }),
            None
        );
    }
}

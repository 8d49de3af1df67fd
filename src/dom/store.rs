//! Document Store - versioned, arena-indexed node table
//!
//! Node records live in one flat arena addressed by 1-based ids; structural
//! links are ids, never references. Ids are allocated monotonically and
//! never reused.
//!
//! A store is never edited in place. `transform` copies the arena and string
//! pool of its base (equivalent to replaying the base's action log), applies
//! a new batch of actions to the copy and returns it as the next version.
//! The base stays valid and unchanged, and a returned version is never
//! written to again, so versions can be shared across threads freely.

use std::sync::Arc;

use tracing::{debug, trace};

use super::action::{Action, NodeRef};
use super::node::{Links, NodeData, NodeId, NodeKind, NodeRecord, NONE, ROOT};
use super::strings::{StrId, StringPool};
use crate::config::Limits;
use crate::error::StoreError;

/// One immutable version of a document
#[derive(Debug, Clone)]
pub struct DocumentStore {
    /// Arena of nodes; slot 0 is a placeholder so ids start at 1
    nodes: Vec<NodeRecord>,
    /// Interned names and content
    strings: StringPool,
    /// Every batch applied since the empty base, oldest first
    log: Vec<Arc<[Action]>>,
    /// Ids allocated by the batch that produced this version
    created: Vec<NodeId>,
    version: u64,
    limits: Limits,
}

impl DocumentStore {
    /// Empty base: only the document root (id 1) exists
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    pub fn with_limits(limits: Limits) -> Self {
        Self::with_capacity(limits, 64, 256, 4096)
    }

    /// Empty base with room for `nodes` records and `strings` distinct
    /// strings totalling `bytes` bytes
    pub fn with_capacity(limits: Limits, nodes: usize, strings: usize, bytes: usize) -> Self {
        let mut arena = Vec::with_capacity(nodes.saturating_add(2));
        arena.push(NodeRecord::document());
        arena.push(NodeRecord::document());
        DocumentStore {
            nodes: arena,
            strings: StringPool::with_capacity(strings, bytes),
            log: Vec::new(),
            created: Vec::new(),
            version: 0,
            limits,
        }
    }

    // ========================================================================
    // Versioning
    // ========================================================================

    /// Derive the next version by applying `actions` to a copy of this one.
    ///
    /// Fails on the first action whose preconditions do not hold; nothing
    /// of the batch is kept and `self` is untouched either way.
    pub fn transform<I>(&self, actions: I) -> Result<DocumentStore, StoreError>
    where
        I: IntoIterator<Item = Action>,
    {
        let actions: Vec<Action> = actions.into_iter().collect();
        let creates = actions.iter().filter(|a| a.creates_node()).count();

        let mut next = DocumentStore {
            nodes: self.nodes.clone(),
            strings: self.strings.clone(),
            log: self.log.clone(),
            created: Vec::with_capacity(creates),
            version: self.version + 1,
            limits: self.limits,
        };
        next.nodes
            .try_reserve(creates)
            .map_err(|_| StoreError::CapacityExceeded {
                limit: self.limits.max_nodes,
            })?;

        for (index, action) in actions.iter().enumerate() {
            trace!(version = next.version, index, "applying action");
            next.apply(action)?;
        }

        debug!(
            version = next.version,
            actions = actions.len(),
            created = next.created.len(),
            nodes = next.node_count(),
            "transformed store"
        );
        next.log.push(actions.into());
        Ok(next)
    }

    /// Rebuild this version from an empty base by replaying its action log
    pub fn replay(&self) -> Result<DocumentStore, StoreError> {
        let mut store = DocumentStore::with_capacity(
            self.limits,
            self.node_count(),
            self.strings.len(),
            self.strings.bytes_used(),
        );
        for batch in &self.log {
            store = store.transform(batch.iter().cloned())?;
        }
        Ok(store)
    }

    /// Number of transforms between the empty base and this version
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Action batches applied since the empty base, oldest first
    pub fn history(&self) -> impl Iterator<Item = &[Action]> + '_ {
        self.log.iter().map(|batch| &batch[..])
    }

    /// Id assigned to the `index`-th node created by the last batch
    pub fn created(&self, index: usize) -> Option<NodeId> {
        self.created.get(index).copied()
    }

    /// All ids created by the last batch, in creation order
    pub fn created_ids(&self) -> &[NodeId] {
        &self.created
    }

    /// Resolve a batch reference against the last batch
    pub fn resolve(&self, node: NodeRef) -> Option<NodeId> {
        match node {
            NodeRef::Id(id) => self.contains(id).then_some(id),
            NodeRef::New(index) => self.created(index),
        }
    }

    // ========================================================================
    // Action application
    // ========================================================================

    fn apply(&mut self, action: &Action) -> Result<(), StoreError> {
        match action {
            Action::CreateDocument => {
                let id = self.alloc(NodeRecord::document())?;
                self.created.push(id);
            }
            Action::CreateElement { tag } => {
                let id = self.create_element(tag)?;
                self.created.push(id);
            }
            Action::CreateAttribute { name, value } => {
                let id = self.create_attribute(name, value)?;
                self.created.push(id);
            }
            Action::CreateText { content } => {
                let id = self.create_leaf(content, NodeData::Text)?;
                self.created.push(id);
            }
            Action::CreateCData { content } => {
                let id = self.create_leaf(content, NodeData::CData)?;
                self.created.push(id);
            }
            Action::CreateComment { content } => {
                let id = self.create_leaf(content, NodeData::Comment)?;
                self.created.push(id);
            }
            Action::CreateProcessingInstruction { content } => {
                let id = self.create_leaf(content, NodeData::ProcessingInstruction)?;
                self.created.push(id);
            }
            Action::AppendChild { parent, child } => {
                let (parent, child) = (self.resolve_ref(*parent)?, self.resolve_ref(*child)?);
                self.append_child(parent, child)?;
            }
            Action::PrependChild { parent, child } => {
                let (parent, child) = (self.resolve_ref(*parent)?, self.resolve_ref(*child)?);
                self.prepend_child(parent, child)?;
            }
            Action::RemoveChild { parent, child } => {
                let (parent, child) = (self.resolve_ref(*parent)?, self.resolve_ref(*child)?);
                self.remove_child(parent, child)?;
            }
            Action::SetAttribute {
                element,
                name,
                value,
            } => {
                let element = self.resolve_ref(*element)?;
                self.set_attribute(element, name, value)?;
            }
            Action::RemoveAttribute { element, name } => {
                let element = self.resolve_ref(*element)?;
                self.remove_attribute(element, name)?;
            }
        }
        Ok(())
    }

    fn resolve_ref(&self, node: NodeRef) -> Result<NodeId, StoreError> {
        match node {
            NodeRef::Id(id) => Ok(id),
            NodeRef::New(index) => self
                .created
                .get(index)
                .copied()
                .ok_or(StoreError::UnresolvedReference(index)),
        }
    }

    fn alloc(&mut self, record: NodeRecord) -> Result<NodeId, StoreError> {
        let id = self.nodes.len();
        if id > self.limits.max_nodes {
            return Err(StoreError::CapacityExceeded {
                limit: self.limits.max_nodes,
            });
        }
        self.nodes
            .try_reserve(1)
            .map_err(|_| StoreError::CapacityExceeded {
                limit: self.limits.max_nodes,
            })?;
        self.nodes.push(record);
        Ok(id as NodeId)
    }

    fn create_element(&mut self, tag: &[u8]) -> Result<NodeId, StoreError> {
        let name = self.strings.intern(tag);
        self.alloc(NodeRecord::element(name))
    }

    fn create_attribute(&mut self, name: &[u8], value: &[u8]) -> Result<NodeId, StoreError> {
        let name = self.strings.intern(name);
        let value = self.strings.intern(value);
        self.alloc(NodeRecord::new(NodeData::Attribute { name, value }))
    }

    fn create_leaf(&mut self, content: &[u8], kind: fn(StrId) -> NodeData) -> Result<NodeId, StoreError> {
        let content = self.strings.intern(content);
        self.alloc(NodeRecord::new(kind(content)))
    }

    /// Look up a live record; id 0 and ids past the arena are invalid
    fn record(&self, id: NodeId) -> Result<&NodeRecord, StoreError> {
        self.get(id).ok_or(StoreError::InvalidNodeIndex(id))
    }

    /// Shared preconditions of append/prepend
    fn check_insert(&self, parent: NodeId, child: NodeId) -> Result<(), StoreError> {
        let parent_record = self.record(parent)?;
        let child_record = self.record(child)?;

        match child_record.data {
            NodeData::Attribute { .. } | NodeData::Document { .. } => {
                return Err(StoreError::InvalidChildType(child))
            }
            NodeData::Element { .. }
            | NodeData::Text(_)
            | NodeData::CData(_)
            | NodeData::Comment(_)
            | NodeData::ProcessingInstruction(_) => {}
        }
        match parent_record.data {
            NodeData::Element { .. } | NodeData::Document { .. } => {}
            NodeData::Attribute { .. }
            | NodeData::Text(_)
            | NodeData::CData(_)
            | NodeData::Comment(_)
            | NodeData::ProcessingInstruction(_) => return Err(StoreError::InvalidParentType(parent)),
        }
        if child_record.parent != NONE {
            return Err(StoreError::AlreadyAttached(child));
        }

        let mut cursor = parent;
        while cursor != NONE {
            if cursor == child {
                return Err(StoreError::HierarchyCycle { parent, child });
            }
            cursor = self.nodes[cursor as usize].parent;
        }
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StoreError> {
        self.check_insert(parent, child)?;

        let links = self.nodes[parent as usize]
            .children_mut()
            .ok_or(StoreError::InvalidParentType(parent))?;
        let previous_last = links.last;
        if links.first == NONE {
            links.first = child;
        }
        links.last = child;
        links.count += 1;

        if previous_last != NONE {
            self.nodes[previous_last as usize].next_sibling = child;
        }
        let record = &mut self.nodes[child as usize];
        record.parent = parent;
        record.next_sibling = NONE;
        Ok(())
    }

    fn prepend_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StoreError> {
        self.check_insert(parent, child)?;

        let links = self.nodes[parent as usize]
            .children_mut()
            .ok_or(StoreError::InvalidParentType(parent))?;
        let previous_first = links.first;
        links.first = child;
        if links.last == NONE {
            links.last = child;
        }
        links.count += 1;

        let record = &mut self.nodes[child as usize];
        record.parent = parent;
        record.next_sibling = previous_first;
        Ok(())
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), StoreError> {
        let parent_record = self.record(parent)?;
        let child_record = self.record(child)?;

        match child_record.data {
            NodeData::Attribute { .. } | NodeData::Document { .. } => {
                return Err(StoreError::InvalidChildType(child))
            }
            NodeData::Element { .. }
            | NodeData::Text(_)
            | NodeData::CData(_)
            | NodeData::Comment(_)
            | NodeData::ProcessingInstruction(_) => {}
        }
        let links = match parent_record.data {
            NodeData::Element { children, .. } | NodeData::Document { children } => children,
            NodeData::Attribute { .. }
            | NodeData::Text(_)
            | NodeData::CData(_)
            | NodeData::Comment(_)
            | NodeData::ProcessingInstruction(_) => return Err(StoreError::InvalidParentType(parent)),
        };

        let (previous, found) = self.scan(links.first, |id, _| id == child);
        if found == NONE {
            return Err(StoreError::ChildNotFound { parent, child });
        }
        self.unlink(parent, previous, child, NodeRecord::children_mut);
        Ok(())
    }

    fn set_attribute(&mut self, element: NodeId, name: &[u8], value: &[u8]) -> Result<(), StoreError> {
        let first = self.attribute_list(element)?.first;
        let name_id = self.strings.intern(name);
        let value_id = self.strings.intern(value);

        let existing = self.find_attribute(first, name_id)?;
        if existing != NONE {
            if let NodeData::Attribute { value, .. } = &mut self.nodes[existing as usize].data {
                *value = value_id;
            }
            return Ok(());
        }

        let attr = self.alloc(NodeRecord::new(NodeData::Attribute {
            name: name_id,
            value: value_id,
        }))?;
        let links = self.nodes[element as usize]
            .attributes_mut()
            .ok_or(StoreError::NotElement(element))?;
        let previous_last = links.last;
        if links.first == NONE {
            links.first = attr;
        }
        links.last = attr;
        links.count += 1;

        if previous_last != NONE {
            self.nodes[previous_last as usize].next_sibling = attr;
        }
        self.nodes[attr as usize].parent = element;
        Ok(())
    }

    /// Removing an attribute that is not set is a no-op
    fn remove_attribute(&mut self, element: NodeId, name: &[u8]) -> Result<(), StoreError> {
        let first = self.attribute_list(element)?.first;
        let Some(name_id) = self.strings.lookup(name) else {
            trace!(element, "attribute name never interned, nothing to remove");
            return Ok(());
        };

        let attr = self.find_attribute(first, name_id)?;
        if attr == NONE {
            return Ok(());
        }
        let (previous, _) = self.scan(first, |id, _| id == attr);
        self.unlink(element, previous, attr, NodeRecord::attributes_mut);
        Ok(())
    }

    fn attribute_list(&self, element: NodeId) -> Result<Links, StoreError> {
        match self.record(element)?.data {
            NodeData::Element { attributes, .. } => Ok(attributes),
            NodeData::Document { .. }
            | NodeData::Attribute { .. }
            | NodeData::Text(_)
            | NodeData::CData(_)
            | NodeData::Comment(_)
            | NodeData::ProcessingInstruction(_) => Err(StoreError::NotElement(element)),
        }
    }

    /// Attribute with interned name `name` in the list starting at `first`
    fn find_attribute(&self, first: NodeId, name: StrId) -> Result<NodeId, StoreError> {
        let mut cursor = first;
        while cursor != NONE {
            let record = &self.nodes[cursor as usize];
            match record.data {
                NodeData::Attribute { name: n, .. } if n == name => return Ok(cursor),
                NodeData::Attribute { .. } => {}
                _ => return Err(StoreError::InvalidAttributeType(cursor)),
            }
            cursor = record.next_sibling;
        }
        Ok(NONE)
    }

    /// Walk a list from `first`; returns (predecessor, match) or (_, NONE)
    fn scan<F>(&self, first: NodeId, mut matches: F) -> (NodeId, NodeId)
    where
        F: FnMut(NodeId, &NodeRecord) -> bool,
    {
        let mut previous = NONE;
        let mut cursor = first;
        while cursor != NONE {
            let record = &self.nodes[cursor as usize];
            if matches(cursor, record) {
                return (previous, cursor);
            }
            previous = cursor;
            cursor = record.next_sibling;
        }
        (previous, NONE)
    }

    /// Splice `node` out of `owner`'s list selected by `list`
    fn unlink(
        &mut self,
        owner: NodeId,
        previous: NodeId,
        node: NodeId,
        list: fn(&mut NodeRecord) -> Option<&mut Links>,
    ) {
        let next = self.nodes[node as usize].next_sibling;
        if previous != NONE {
            self.nodes[previous as usize].next_sibling = next;
        }
        if let Some(links) = list(&mut self.nodes[owner as usize]) {
            if previous == NONE {
                links.first = next;
            }
            if links.last == node {
                links.last = previous;
            }
            links.count -= 1;
        }
        let record = &mut self.nodes[node as usize];
        record.parent = NONE;
        record.next_sibling = NONE;
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Record for `id`, or None for id 0 and unknown ids
    #[inline]
    pub fn get(&self, id: NodeId) -> Option<&NodeRecord> {
        if id == NONE {
            return None;
        }
        self.nodes.get(id as usize)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live records, the document root included
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }

    /// The document root
    #[inline]
    pub fn root(&self) -> NodeId {
        ROOT
    }

    /// First Element child of the document root
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(ROOT).find(|&id| self.kind(id) == Some(NodeKind::Element))
    }

    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.get(id).map(NodeRecord::kind)
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|r| r.parent).filter(|&p| p != NONE)
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)
            .and_then(NodeRecord::children)
            .map(|l| l.first)
            .filter(|&c| c != NONE)
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)
            .and_then(NodeRecord::children)
            .map(|l| l.last)
            .filter(|&c| c != NONE)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).map(|r| r.next_sibling).filter(|&s| s != NONE)
    }

    /// Number of children of an element or document, 0 for anything else
    pub fn child_count(&self, id: NodeId) -> usize {
        self.get(id)
            .and_then(NodeRecord::children)
            .map_or(0, |l| l.count as usize)
    }

    /// Children in sibling order
    pub fn children(&self, id: NodeId) -> Siblings<'_> {
        let first = self.get(id).and_then(NodeRecord::children).map_or(NONE, |l| l.first);
        Siblings { store: self, next: first }
    }

    /// Attribute nodes of an element, in insertion order
    pub fn attributes(&self, id: NodeId) -> Siblings<'_> {
        let first = self.get(id).and_then(NodeRecord::attributes).map_or(NONE, |l| l.first);
        Siblings { store: self, next: first }
    }

    pub fn attribute_count(&self, id: NodeId) -> usize {
        self.get(id)
            .and_then(NodeRecord::attributes)
            .map_or(0, |l| l.count as usize)
    }

    /// Attribute node named `name` on `element`
    pub fn attribute_node(&self, element: NodeId, name: &[u8]) -> Option<NodeId> {
        let name = self.strings.lookup(name)?;
        self.attributes(element)
            .find(|&id| self.get(id).and_then(NodeRecord::name) == Some(name))
    }

    /// Value of attribute `name` on `element`
    pub fn attribute(&self, element: NodeId, name: &[u8]) -> Option<&[u8]> {
        self.attribute_node(element, name).and_then(|id| self.value(id))
    }

    /// (name, value) pairs of an element, in insertion order
    pub fn attribute_pairs(&self, element: NodeId) -> Vec<(&[u8], &[u8])> {
        self.attributes(element)
            .filter_map(|id| Some((self.name(id)?, self.value(id)?)))
            .collect()
    }

    /// Tag name of an element or name of an attribute
    pub fn name(&self, id: NodeId) -> Option<&[u8]> {
        self.name_id(id).and_then(|s| self.strings.get(s))
    }

    pub fn name_id(&self, id: NodeId) -> Option<StrId> {
        self.get(id).and_then(NodeRecord::name)
    }

    /// Value of an attribute node
    pub fn value(&self, id: NodeId) -> Option<&[u8]> {
        match self.get(id)?.data {
            NodeData::Attribute { value, .. } => self.strings.get(value),
            _ => None,
        }
    }

    /// Content of a Text, CDATA, Comment or ProcessingInstruction node
    pub fn content(&self, id: NodeId) -> Option<&[u8]> {
        self.get(id)
            .and_then(NodeRecord::content)
            .and_then(|s| self.strings.get(s))
    }

    /// Concatenated Text and CDATA content below `id`, in document order
    pub fn text_content(&self, id: NodeId) -> Vec<u8> {
        let mut out = Vec::new();
        match self.kind(id) {
            Some(NodeKind::Text | NodeKind::CData) => {
                out.extend_from_slice(self.content(id).unwrap_or_default());
            }
            Some(NodeKind::Attribute) => {
                out.extend_from_slice(self.value(id).unwrap_or_default());
            }
            _ => {
                for node in self.descendants(id) {
                    if matches!(self.kind(node), Some(NodeKind::Text | NodeKind::CData)) {
                        out.extend_from_slice(self.content(node).unwrap_or_default());
                    }
                }
            }
        }
        out
    }

    /// All nodes below `id` in depth-first pre-order, attributes excluded
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack = Vec::new();
        if let Some(first) = self.first_child(id) {
            stack.push(first);
        }
        Descendants { store: self, stack }
    }

    /// Check every list: links point at live records, walking `next_sibling`
    /// from `first` ends at `last` after exactly `count` steps, and each
    /// member names its owner as parent.
    pub fn is_consistent(&self) -> bool {
        (ROOT..self.nodes.len() as NodeId).all(|id| {
            let record = &self.nodes[id as usize];
            let lists = [record.children(), record.attributes()];
            lists.into_iter().flatten().all(|links| self.list_is_consistent(id, links))
        })
    }

    fn list_is_consistent(&self, owner: NodeId, links: &Links) -> bool {
        if links.count == 0 {
            return links.first == NONE && links.last == NONE;
        }
        let mut cursor = links.first;
        let mut last = NONE;
        for _ in 0..links.count {
            match self.get(cursor) {
                Some(record) if record.parent == owner => {
                    last = cursor;
                    cursor = record.next_sibling;
                }
                _ => return false,
            }
        }
        cursor == NONE && last == links.last
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator along a forward-linked sibling list
pub struct Siblings<'a> {
    store: &'a DocumentStore,
    next: NodeId,
}

impl<'a> Iterator for Siblings<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == NONE {
            return None;
        }
        let current = self.next;
        self.next = self.store.get(current).map_or(NONE, |r| r.next_sibling);
        Some(current)
    }
}

/// Pre-order iterator over descendants
pub struct Descendants<'a> {
    store: &'a DocumentStore,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        if let Some(record) = self.store.get(current) {
            if record.next_sibling != NONE {
                self.stack.push(record.next_sibling);
            }
            if let Some(children) = record.children() {
                if children.first != NONE {
                    self.stack.push(children.first);
                }
            }
        }
        Some(current)
    }
}

//! Node records
//!
//! Uses NodeId (u32) for compact, cache-friendly node references. Id 0 is
//! the absence marker and never names a real node; the document root
//! reserved by every store is id 1.

use super::strings::StrId;

/// Compact node identifier (index into the arena)
pub type NodeId = u32;

/// Absent link
pub const NONE: NodeId = 0;

/// Document root of every store
pub const ROOT: NodeId = 1;

/// Type of a node record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Document,
    Element,
    Attribute,
    Text,
    CData,
    Comment,
    ProcessingInstruction,
}

/// Head, tail and length of a forward-linked list of nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Links {
    pub first: NodeId,
    pub last: NodeId,
    pub count: u32,
}

/// Per-kind payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeData {
    Document {
        children: Links,
    },
    Element {
        name: StrId,
        children: Links,
        attributes: Links,
    },
    Attribute {
        name: StrId,
        value: StrId,
    },
    Text(StrId),
    CData(StrId),
    Comment(StrId),
    ProcessingInstruction(StrId),
}

/// One arena slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRecord {
    /// Owning element or document, `NONE` while detached
    pub parent: NodeId,
    /// Next node in the parent's child (or attribute) list
    pub next_sibling: NodeId,
    pub data: NodeData,
}

impl NodeRecord {
    pub fn new(data: NodeData) -> Self {
        NodeRecord {
            parent: NONE,
            next_sibling: NONE,
            data,
        }
    }

    pub fn document() -> Self {
        Self::new(NodeData::Document {
            children: Links::default(),
        })
    }

    pub fn element(name: StrId) -> Self {
        Self::new(NodeData::Element {
            name,
            children: Links::default(),
            attributes: Links::default(),
        })
    }

    pub fn kind(&self) -> NodeKind {
        match self.data {
            NodeData::Document { .. } => NodeKind::Document,
            NodeData::Element { .. } => NodeKind::Element,
            NodeData::Attribute { .. } => NodeKind::Attribute,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::CData(_) => NodeKind::CData,
            NodeData::Comment(_) => NodeKind::Comment,
            NodeData::ProcessingInstruction(_) => NodeKind::ProcessingInstruction,
        }
    }

    /// Child list of an element or document
    #[inline]
    pub fn children(&self) -> Option<&Links> {
        match &self.data {
            NodeData::Document { children } | NodeData::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    #[inline]
    pub fn children_mut(&mut self) -> Option<&mut Links> {
        match &mut self.data {
            NodeData::Document { children } | NodeData::Element { children, .. } => Some(children),
            _ => None,
        }
    }

    #[inline]
    pub fn attributes(&self) -> Option<&Links> {
        match &self.data {
            NodeData::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    #[inline]
    pub fn attributes_mut(&mut self) -> Option<&mut Links> {
        match &mut self.data {
            NodeData::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Tag name of an element or name of an attribute
    pub fn name(&self) -> Option<StrId> {
        match self.data {
            NodeData::Element { name, .. } | NodeData::Attribute { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Content of a Text, CDATA, Comment or ProcessingInstruction node
    pub fn content(&self) -> Option<StrId> {
        match self.data {
            NodeData::Text(s)
            | NodeData::CData(s)
            | NodeData::Comment(s)
            | NodeData::ProcessingInstruction(s) => Some(s),
            _ => None,
        }
    }
}

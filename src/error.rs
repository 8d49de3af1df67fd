//! Error Types
//!
//! Three independent domains, none of which recovers internally:
//! - `TokenizeError`: resource exhaustion while scanning (malformed input is
//!   not an error, the tokenizer just stops emitting)
//! - `StoreError`: precondition violations on document store operations
//! - `XPathError`: expression parse failures (evaluation never fails)
//!
//! Each error maps to a stable numeric status code so host bindings can
//! translate it without matching on the Rust type.

use crate::dom::NodeId;

/// Tokenizer failure. Only raised when a resource limit is hit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenizeError {
    #[error("tag at offset {position} has more than {limit} attributes")]
    AttributeOverflow { position: usize, limit: usize },

    #[error("attribute list allocation failed at offset {position}")]
    OutOfMemory { position: usize },
}

impl TokenizeError {
    pub fn code(&self) -> u32 {
        match self {
            TokenizeError::AttributeOverflow { .. } => 100,
            TokenizeError::OutOfMemory { .. } => 101,
        }
    }
}

/// Document store precondition violation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("invalid node index {0}")]
    InvalidNodeIndex(NodeId),

    #[error("node {0} cannot be used as a child")]
    InvalidChildType(NodeId),

    #[error("node {0} cannot have children")]
    InvalidParentType(NodeId),

    #[error("node {0} is not an element")]
    NotElement(NodeId),

    #[error("node {0} in an attribute list is not an attribute")]
    InvalidAttributeType(NodeId),

    #[error("node {child} is not a child of node {parent}")]
    ChildNotFound { parent: NodeId, child: NodeId },

    #[error("node {0} already has a parent")]
    AlreadyAttached(NodeId),

    #[error("appending node {child} under node {parent} would create a cycle")]
    HierarchyCycle { parent: NodeId, child: NodeId },

    #[error("batch-local node reference #{0} was never created")]
    UnresolvedReference(usize),

    #[error("store is limited to {limit} nodes")]
    CapacityExceeded { limit: usize },
}

impl StoreError {
    pub fn code(&self) -> u32 {
        match self {
            StoreError::InvalidNodeIndex(_) => 200,
            StoreError::InvalidChildType(_) => 201,
            StoreError::InvalidParentType(_) => 202,
            StoreError::NotElement(_) => 203,
            StoreError::InvalidAttributeType(_) => 204,
            StoreError::ChildNotFound { .. } => 205,
            StoreError::AlreadyAttached(_) => 206,
            StoreError::HierarchyCycle { .. } => 207,
            StoreError::UnresolvedReference(_) => 208,
            StoreError::CapacityExceeded { .. } => 209,
        }
    }
}

/// XPath expression parse failure, naming the violated expectation.
///
/// `position` is the byte offset into the expression.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum XPathError {
    #[error("expected '/' at offset {position}")]
    ExpectedSlash { position: usize },

    #[error("expected an identifier at offset {position}")]
    ExpectedIdentifier { position: usize },

    #[error("expected '@' at offset {position}")]
    ExpectedAt { position: usize },

    #[error("expected '=' at offset {position}")]
    ExpectedEquals { position: usize },

    #[error("expected a quoted string at offset {position}")]
    ExpectedStringLiteral { position: usize },

    #[error("expected ']' at offset {position}")]
    ExpectedCloseBracket { position: usize },

    #[error("string starting at offset {position} is not terminated")]
    UnterminatedString { position: usize },

    #[error("invalid character {ch:?} at offset {position}")]
    InvalidCharacter { ch: char, position: usize },

    #[error("unexpected input after the path at offset {position}")]
    TrailingInput { position: usize },
}

impl XPathError {
    pub fn code(&self) -> u32 {
        match self {
            XPathError::ExpectedSlash { .. } => 300,
            XPathError::ExpectedIdentifier { .. } => 301,
            XPathError::ExpectedAt { .. } => 302,
            XPathError::ExpectedEquals { .. } => 303,
            XPathError::ExpectedStringLiteral { .. } => 304,
            XPathError::ExpectedCloseBracket { .. } => 305,
            XPathError::UnterminatedString { .. } => 306,
            XPathError::InvalidCharacter { .. } => 307,
            XPathError::TrailingInput { .. } => 308,
        }
    }

    /// Byte offset in the expression where parsing failed
    pub fn position(&self) -> usize {
        match *self {
            XPathError::ExpectedSlash { position }
            | XPathError::ExpectedIdentifier { position }
            | XPathError::ExpectedAt { position }
            | XPathError::ExpectedEquals { position }
            | XPathError::ExpectedStringLiteral { position }
            | XPathError::ExpectedCloseBracket { position }
            | XPathError::UnterminatedString { position }
            | XPathError::InvalidCharacter { position, .. }
            | XPathError::TrailingInput { position } => position,
        }
    }
}

/// Any failure surfaced by the one-call conveniences
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    XPath(#[from] XPathError),
}

impl Error {
    pub fn code(&self) -> u32 {
        match self {
            Error::Tokenize(e) => e.code(),
            Error::Store(e) => e.code(),
            Error::XPath(e) => e.code(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

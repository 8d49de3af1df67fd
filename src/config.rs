//! Parse Options and Resource Limits
//!
//! The tokenizer, the document store and the builder receive their limits
//! explicitly. Nothing here is global.

/// How whitespace-only text between markup is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WhitespaceMode {
    /// Keep every whitespace run as its own Text node
    #[default]
    Preserve,
    /// Drop Text entities made only of space, tab, CR and LF
    Ignore,
}

/// Resource limits shared by the tokenizer and the document store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Maximum attributes collected for a single tag
    pub max_attributes: usize,
    /// Maximum node records in one store version (the root included)
    pub max_nodes: usize,
}

impl Limits {
    pub const DEFAULT_MAX_ATTRIBUTES: usize = 4096;
    pub const DEFAULT_MAX_NODES: usize = u32::MAX as usize - 1;

    pub fn with_max_attributes(mut self, max: usize) -> Self {
        self.max_attributes = max;
        self
    }

    pub fn with_max_nodes(mut self, max: usize) -> Self {
        self.max_nodes = max.min(Self::DEFAULT_MAX_NODES);
        self
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_attributes: Self::DEFAULT_MAX_ATTRIBUTES,
            max_nodes: Self::DEFAULT_MAX_NODES,
        }
    }
}

/// Options for a single parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub whitespace: WhitespaceMode,
    pub limits: Limits,
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn whitespace(mut self, mode: WhitespaceMode) -> Self {
        self.whitespace = mode;
        self
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }
}

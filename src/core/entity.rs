//! Tokenizer output: entities, byte spans and source positions

/// A half-open byte range `[start, end)` into the tokenized input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// Zero-length span at `at`
    #[inline]
    pub const fn empty(at: usize) -> Self {
        Span { start: at, end: at }
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Extract the byte slice from input, or an empty slice if out of range
    #[inline]
    pub fn slice<'a>(&self, input: &'a [u8]) -> &'a [u8] {
        input.get(self.start..self.end).unwrap_or(&[])
    }
}

/// 1-based line and column of a byte offset.
///
/// Lines advance on `\n`; columns advance once per non-continuation byte,
/// so a multi-byte UTF-8 sequence counts as one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const START: Position = Position { line: 1, column: 1 };
}

impl Default for Position {
    fn default() -> Self {
        Position::START
    }
}

/// One `name=value` pair inside an open tag. Quotes are not part of `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribute {
    pub name: Span,
    pub value: Span,
}

/// What a structural unit is, with the sub-spans that matter for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// `<name attr="value">` or the opening half of `<name/>`
    Open {
        name: Span,
        attributes: Vec<Attribute>,
        self_closing: bool,
    },
    /// `</name>`, or the close synthesized right after a self-closing open
    Close { name: Span, synthesized: bool },
    /// Raw character data between markup, entity references untouched
    Text,
    /// `<!--content-->`
    Comment { content: Span },
    /// `<?content?>`
    ProcessingInstruction { content: Span },
    /// `<![CDATA[content]]>`
    CData { content: Span },
}

/// A structural event with its whole byte range and source positions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    pub span: Span,
    pub start: Position,
    pub end: Position,
}

impl Entity {
    /// The payload range: tag name for Open/Close, enclosed bytes otherwise
    pub fn content(&self) -> Span {
        match &self.kind {
            EntityKind::Open { name, .. } | EntityKind::Close { name, .. } => *name,
            EntityKind::Text => self.span,
            EntityKind::Comment { content }
            | EntityKind::ProcessingInstruction { content }
            | EntityKind::CData { content } => *content,
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        matches!(self.kind, EntityKind::Open { .. })
    }

    #[inline]
    pub fn is_close(&self) -> bool {
        matches!(self.kind, EntityKind::Close { .. })
    }
}

/// Receiver for tokenizer output
///
/// The tokenizer calls `entity` once per structural unit, in input order.
pub trait EntitySink {
    fn entity(&mut self, entity: Entity);
}

impl EntitySink for Vec<Entity> {
    #[inline]
    fn entity(&mut self, entity: Entity) {
        self.push(entity);
    }
}

//! XML Tokenizer - byte-position state machine
//!
//! Single pass over an in-memory buffer, emitting one `Entity` per
//! structural unit:
//! - Open / Close tags (a self-closing tag emits Open then a synthesized Close)
//! - Text between markup
//! - Comments, CDATA sections and processing instructions, each as one span
//!
//! The tokenizer is permissive: a malformed or truncated construct ends
//! emission for the rest of the buffer instead of raising an error. The only
//! errors are resource exhaustion while collecting attributes.

use std::mem;

use tracing::{debug, warn};

use super::entity::{Attribute, Entity, EntityKind, EntitySink, Span};
use super::scanner::{is_whitespace, LineTracker, Scanner};
use crate::config::Limits;
use crate::error::TokenizeError;

/// Scanner state between bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// Character data, looking for `<`
    Text,
    /// Inside `<!--`, looking for `-->`
    IgnoreComment,
    /// Inside `<?`, looking for `?>`
    IgnoreInstruction,
    /// Inside `<![CDATA[`, looking for `]]>`
    Cdata,
    /// Reading the tag name after `<` or `</`
    TagName,
    /// Between attributes inside a tag
    Tag,
    /// Reading an attribute name
    AttrName,
    /// After an attribute name and whitespace, expecting `=`
    AttrEq,
    /// After `=`, expecting a quote or an unquoted value
    AttrQuot,
    /// Reading an attribute value
    AttrValue,
}

/// Byte-level XML tokenizer
///
/// Holds only its limits; each `write` call scans one complete buffer and
/// carries no state into the next call.
#[derive(Debug, Clone, Default)]
pub struct Tokenizer {
    limits: Limits,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(limits: Limits) -> Self {
        Tokenizer { limits }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Tokenize `input`, handing each entity to `sink` in order.
    ///
    /// Returns the number of entities emitted.
    pub fn write<S: EntitySink>(&self, input: &[u8], sink: &mut S) -> Result<usize, TokenizeError> {
        let mut run = Run::new(input, self.limits);
        run.scan(sink)?;
        debug!(bytes = input.len(), entities = run.emitted, "tokenized buffer");
        Ok(run.emitted)
    }
}

/// Tokenize a buffer with default limits and collect the entities
pub fn tokenize(input: &[u8]) -> Result<Vec<Entity>, TokenizeError> {
    let mut entities = Vec::new();
    Tokenizer::new().write(input, &mut entities)?;
    Ok(entities)
}

/// State of one `write` call
struct Run<'a> {
    input: &'a [u8],
    scanner: Scanner<'a>,
    lines: LineTracker,
    limits: Limits,
    state: State,
    /// Start of pending character data
    text_start: usize,
    /// Offset of the `<` that opened the current construct
    tag_start: usize,
    /// Start of enclosed content (comment, PI, CDATA) or of the tag name
    content_start: usize,
    name: Span,
    closing: bool,
    attr_name: Span,
    attr_start: usize,
    value_start: usize,
    quote: Option<u8>,
    attributes: Vec<Attribute>,
    emitted: usize,
    stopped: bool,
}

impl<'a> Run<'a> {
    fn new(input: &'a [u8], limits: Limits) -> Self {
        Run {
            input,
            scanner: Scanner::new(input),
            lines: LineTracker::new(),
            limits,
            state: State::Text,
            text_start: 0,
            tag_start: 0,
            content_start: 0,
            name: Span::default(),
            closing: false,
            attr_name: Span::default(),
            attr_start: 0,
            value_start: 0,
            quote: None,
            attributes: Vec::new(),
            emitted: 0,
            stopped: false,
        }
    }

    fn scan<S: EntitySink>(&mut self, sink: &mut S) -> Result<(), TokenizeError> {
        while let Some(b) = self.scanner.peek() {
            match self.state {
                State::Text => self.text(sink),
                State::IgnoreComment => self.enclosed(sink, b"-->"),
                State::IgnoreInstruction => self.enclosed(sink, b"?>"),
                State::Cdata => self.enclosed(sink, b"]]>"),
                State::TagName => self.tag_name(b, sink),
                State::Tag => self.tag(b, sink),
                State::AttrName => self.attr_name(b)?,
                State::AttrEq => self.attr_eq(b)?,
                State::AttrQuot => self.attr_quot(b)?,
                State::AttrValue => self.attr_value(b)?,
            }
        }

        if self.state == State::Text {
            let end = self.input.len();
            self.flush_text(end, sink);
        } else if !self.stopped {
            warn!(state = ?self.state, offset = self.tag_start, "input ends inside markup, construct dropped");
        }
        Ok(())
    }

    fn text<S: EntitySink>(&mut self, sink: &mut S) {
        let Some(lt) = self.scanner.find_byte(b'<') else {
            self.scanner.set_position(self.input.len());
            return;
        };
        self.scanner.set_position(lt);
        self.flush_text(lt, sink);
        self.tag_start = lt;

        if self.scanner.starts_with_at(1, b"!--") {
            self.enter(State::IgnoreComment, lt + 4);
        } else if self.scanner.starts_with_at(1, b"![CDATA[") {
            self.enter(State::Cdata, lt + 9);
        } else if self.scanner.peek_at(1) == Some(b'?') {
            self.enter(State::IgnoreInstruction, lt + 2);
        } else if self.scanner.peek_at(1) == Some(b'/') {
            self.closing = true;
            self.enter(State::TagName, lt + 2);
        } else {
            self.closing = false;
            self.enter(State::TagName, lt + 1);
        }
    }

    #[inline]
    fn enter(&mut self, state: State, content_start: usize) {
        self.state = state;
        self.content_start = content_start;
        self.scanner.set_position(content_start);
    }

    /// Comment, PI or CDATA: one entity for everything up to the terminator
    fn enclosed<S: EntitySink>(&mut self, sink: &mut S, terminator: &[u8]) {
        let Some(found) = self.scanner.find_terminator(self.content_start, terminator) else {
            self.truncate();
            return;
        };
        let content = Span::new(self.content_start, found);
        let kind = match self.state {
            State::IgnoreComment => EntityKind::Comment { content },
            State::IgnoreInstruction => EntityKind::ProcessingInstruction { content },
            _ => EntityKind::CData { content },
        };
        let end = found + terminator.len();
        self.emit(sink, kind, Span::new(self.tag_start, end));
        self.resume_text(end);
    }

    fn tag_name<S: EntitySink>(&mut self, b: u8, sink: &mut S) {
        let pos = self.scanner.position();
        if is_whitespace(b) {
            if self.end_name(pos) {
                self.state = State::Tag;
                self.scanner.advance(1);
            }
        } else if b == b'>' {
            if self.end_name(pos) {
                self.emit_tag(sink, pos + 1, false);
            }
        } else if b == b'/' && self.scanner.peek_at(1) == Some(b'>') {
            if self.end_name(pos) {
                self.emit_tag(sink, pos + 2, true);
            }
        } else {
            self.scanner.advance(1);
        }
    }

    /// Close the tag name at `pos`. An empty name ends emission.
    fn end_name(&mut self, pos: usize) -> bool {
        self.name = Span::new(self.content_start, pos);
        if self.name.is_empty() {
            self.truncate();
            return false;
        }
        true
    }

    fn tag<S: EntitySink>(&mut self, b: u8, sink: &mut S) {
        let pos = self.scanner.position();
        match b {
            b'>' => self.emit_tag(sink, pos + 1, false),
            b'/' if self.scanner.peek_at(1) == Some(b'>') => self.emit_tag(sink, pos + 2, true),
            _ if is_whitespace(b) || b == b'/' || self.closing => self.scanner.advance(1),
            _ => {
                self.attr_start = pos;
                self.state = State::AttrName;
                self.scanner.advance(1);
            }
        }
    }

    fn attr_name(&mut self, b: u8) -> Result<(), TokenizeError> {
        let pos = self.scanner.position();
        if b == b'=' {
            self.attr_name = Span::new(self.attr_start, pos);
            self.state = State::AttrQuot;
            self.scanner.advance(1);
        } else if is_whitespace(b) {
            self.attr_name = Span::new(self.attr_start, pos);
            self.state = State::AttrEq;
            self.scanner.advance(1);
        } else if self.at_tag_end(b) {
            // unget: record the bare name, let Tag consume the `>`
            self.attr_name = Span::new(self.attr_start, pos);
            self.push_attribute(Span::empty(pos))?;
            self.state = State::Tag;
        } else {
            self.scanner.advance(1);
        }
        Ok(())
    }

    fn attr_eq(&mut self, b: u8) -> Result<(), TokenizeError> {
        if is_whitespace(b) {
            self.scanner.advance(1);
        } else if b == b'=' {
            self.state = State::AttrQuot;
            self.scanner.advance(1);
        } else {
            // bare name followed by another attribute or the tag end
            self.push_attribute(Span::empty(self.attr_name.end))?;
            self.state = State::Tag;
        }
        Ok(())
    }

    fn attr_quot(&mut self, b: u8) -> Result<(), TokenizeError> {
        let pos = self.scanner.position();
        if is_whitespace(b) {
            self.scanner.advance(1);
        } else if b == b'"' || b == b'\'' {
            self.quote = Some(b);
            self.value_start = pos + 1;
            self.state = State::AttrValue;
            self.scanner.advance(1);
        } else if self.at_tag_end(b) {
            self.push_attribute(Span::empty(pos))?;
            self.state = State::Tag;
        } else {
            self.quote = None;
            self.value_start = pos;
            self.state = State::AttrValue;
            self.scanner.advance(1);
        }
        Ok(())
    }

    fn attr_value(&mut self, b: u8) -> Result<(), TokenizeError> {
        let pos = self.scanner.position();
        match self.quote {
            Some(quote) => match self.scanner.find_byte(quote) {
                Some(close) => {
                    self.push_attribute(Span::new(self.value_start, close))?;
                    self.state = State::Tag;
                    self.scanner.set_position(close + 1);
                }
                None => self.truncate(),
            },
            None => {
                if is_whitespace(b) {
                    self.push_attribute(Span::new(self.value_start, pos))?;
                    self.state = State::Tag;
                    self.scanner.advance(1);
                } else if self.at_tag_end(b) {
                    self.push_attribute(Span::new(self.value_start, pos))?;
                    self.state = State::Tag;
                } else {
                    self.scanner.advance(1);
                }
            }
        }
        Ok(())
    }

    /// `>` or `/>` at the cursor
    #[inline]
    fn at_tag_end(&self, b: u8) -> bool {
        b == b'>' || (b == b'/' && self.scanner.peek_at(1) == Some(b'>'))
    }

    fn push_attribute(&mut self, value: Span) -> Result<(), TokenizeError> {
        if self.attributes.len() >= self.limits.max_attributes {
            return Err(TokenizeError::AttributeOverflow {
                position: self.tag_start,
                limit: self.limits.max_attributes,
            });
        }
        self.attributes
            .try_reserve(1)
            .map_err(|_| TokenizeError::OutOfMemory {
                position: self.tag_start,
            })?;
        self.attributes.push(Attribute {
            name: self.attr_name,
            value,
        });
        Ok(())
    }

    fn emit_tag<S: EntitySink>(&mut self, sink: &mut S, end: usize, self_closing: bool) {
        let span = Span::new(self.tag_start, end);
        let name = self.name;
        if self.closing {
            self.attributes.clear();
            self.emit(
                sink,
                EntityKind::Close {
                    name,
                    synthesized: false,
                },
                span,
            );
        } else {
            let attributes = mem::take(&mut self.attributes);
            self.emit(
                sink,
                EntityKind::Open {
                    name,
                    attributes,
                    self_closing,
                },
                span,
            );
            if self_closing {
                self.emit(
                    sink,
                    EntityKind::Close {
                        name,
                        synthesized: true,
                    },
                    Span::empty(end),
                );
            }
        }
        self.resume_text(end);
    }

    fn flush_text<S: EntitySink>(&mut self, end: usize, sink: &mut S) {
        if end > self.text_start {
            self.emit(sink, EntityKind::Text, Span::new(self.text_start, end));
        }
    }

    #[inline]
    fn resume_text(&mut self, at: usize) {
        self.state = State::Text;
        self.text_start = at;
        self.scanner.set_position(at);
    }

    /// Stop emitting: skip to the end of input without flushing
    fn truncate(&mut self) {
        warn!(state = ?self.state, offset = self.tag_start, "malformed markup, emission stopped");
        self.stopped = true;
        self.scanner.set_position(self.input.len());
    }

    fn emit<S: EntitySink>(&mut self, sink: &mut S, kind: EntityKind, span: Span) {
        let start = self.lines.at(self.input, span.start);
        let end = self.lines.at(self.input, span.end);
        sink.entity(Entity {
            kind,
            span,
            start,
            end,
        });
        self.emitted += 1;
    }
}

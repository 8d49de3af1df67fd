//! Core XML scanning primitives
//!
//! This module contains the byte-level building blocks:
//! - Scanner: SIMD-accelerated delimiter and terminator search using memchr
//! - Tokenizer: state machine turning bytes into structural entities
//! - Entity: the entity, span and position types the tokenizer emits

pub mod entity;
pub mod scanner;
pub mod tokenizer;

pub use entity::{Attribute, Entity, EntityKind, EntitySink, Position, Span};
pub use tokenizer::{tokenize, Tokenizer};

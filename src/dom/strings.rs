//! String Interning Pool
//!
//! Stores every distinct byte string once and hands out small integer ids
//! for element names, attribute names and values, and text content.
//!
//! - `data`: one contiguous buffer holding all interned bytes
//! - `entries`: (offset, len) into `data`, indexed by string id
//! - `hash_index`: hash -> list of ids (handles rare collisions)
//!
//! Id 0 is the empty string. Ids are stable for the pool's lifetime, and a
//! cloned pool keeps every id of the original.

use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Interned string identifier
pub type StrId = u32;

/// The empty string's id
pub const EMPTY: StrId = 0;

#[derive(Debug, Clone, Copy)]
struct StringEntry {
    offset: u32,
    len: u32,
}

/// String interning pool
#[derive(Debug, Clone)]
pub struct StringPool {
    /// Entries indexed by string ID
    entries: Vec<StringEntry>,
    /// Buffer holding all interned bytes
    data: Vec<u8>,
    /// Hash of string content -> list of IDs with that hash
    hash_index: HashMap<u64, Vec<StrId>>,
}

impl StringPool {
    /// Create a new empty string pool
    pub fn new() -> Self {
        Self::with_capacity(256, 4096)
    }

    /// Create a pool sized for `strings` distinct strings totalling `bytes`
    pub fn with_capacity(strings: usize, bytes: usize) -> Self {
        let mut entries = Vec::with_capacity(strings.max(1));
        // Entry 0 is reserved for the empty string
        entries.push(StringEntry { offset: 0, len: 0 });
        StringPool {
            entries,
            data: Vec::with_capacity(bytes),
            hash_index: HashMap::with_capacity(strings),
        }
    }

    #[inline]
    fn compute_hash(s: &[u8]) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    /// Intern a byte string, returning the existing id if already present
    pub fn intern(&mut self, s: &[u8]) -> StrId {
        if s.is_empty() {
            return EMPTY;
        }

        let hash = Self::compute_hash(s);
        if let Some(id) = self.find(hash, s) {
            return id;
        }

        let offset = self.data.len() as u32;
        self.data.extend_from_slice(s);

        let id = self.entries.len() as StrId;
        self.entries.push(StringEntry {
            offset,
            len: s.len() as u32,
        });
        self.hash_index.entry(hash).or_default().push(id);

        id
    }

    /// Id of `s` if it has been interned, without interning it
    pub fn lookup(&self, s: &[u8]) -> Option<StrId> {
        if s.is_empty() {
            return Some(EMPTY);
        }
        self.find(Self::compute_hash(s), s)
    }

    fn find(&self, hash: u64, s: &[u8]) -> Option<StrId> {
        self.hash_index
            .get(&hash)?
            .iter()
            .copied()
            .find(|&id| self.get(id) == Some(s))
    }

    /// Get the bytes of an interned string
    pub fn get(&self, id: StrId) -> Option<&[u8]> {
        let entry = self.entries.get(id as usize)?;
        let start = entry.offset as usize;
        self.data.get(start..start + entry.len as usize)
    }

    /// Get an interned string as UTF-8
    pub fn get_str(&self, id: StrId) -> Option<&str> {
        self.get(id).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of distinct strings, the reserved empty string included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing besides the empty string has been interned
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// Total bytes of interned string data
    pub fn bytes_used(&self) -> usize {
        self.data.len()
    }
}

impl Default for StringPool {
    fn default() -> Self {
        Self::new()
    }
}

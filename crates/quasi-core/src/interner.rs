//! String interning for names, operators and atoms.
//!
//! Converts heap-allocated strings into cheap integer handles (`Symbol`).
//! Comparing two symbols is O(1) integer comparison.
//!
//! Every interner is seeded with the reserved marker names, so the markers
//! have the same `Symbol` in every interner and can be matched as constants.

use std::collections::HashMap;

/// A lightweight handle to an interned string.
///
/// Comparing two symbols is O(1). Symbols are ordered by insertion order,
/// not lexicographically. Use `Interner::resolve` if you need the text.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Symbol(u32);

impl Symbol {
    /// `_`: the pure wildcard name. Never binds.
    pub const WILDCARD: Symbol = Symbol(0);
    /// `unquote`: the inline-quote marker.
    pub const UNQUOTE: Symbol = Symbol(1);
    /// `unquote_splicing`: the splice marker.
    pub const UNQUOTE_SPLICING: Symbol = Symbol(2);
    /// `__raw__`: operator tag of an escaped variable reference. Never a
    /// legal operator in a code tree; the reader rejects it.
    pub const RAW: Symbol = Symbol(3);

    /// Raw index for serialization/debugging.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Create a Symbol from a raw index. Use only for deserialization.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Whether this is one of the seeded marker symbols.
    #[inline]
    pub fn is_reserved(self) -> bool {
        (self.0 as usize) < RESERVED.len()
    }
}

impl PartialOrd for Symbol {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Symbol {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.cmp(&other.0)
    }
}

/// Names seeded into every interner, in `Symbol` index order.
pub const RESERVED: [&str; 4] = ["_", "unquote", "unquote_splicing", "__raw__"];

/// String interner. Deduplicates strings and returns cheap Symbol handles.
#[derive(Debug, Clone)]
pub struct Interner {
    /// Map from string to symbol for deduplication.
    map: HashMap<String, Symbol>,
    /// Storage for interned strings, indexed by Symbol.
    strings: Vec<String>,
}

impl Default for Interner {
    fn default() -> Self {
        let mut interner = Self {
            map: HashMap::new(),
            strings: Vec::with_capacity(RESERVED.len()),
        };
        for name in RESERVED {
            interner.intern(name);
        }
        interner
    }
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its Symbol.
    /// If the string was already interned, returns the existing Symbol.
    pub fn intern(&mut self, s: &str) -> Symbol {
        if let Some(&sym) = self.map.get(s) {
            return sym;
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.to_owned());
        self.map.insert(s.to_owned(), sym);
        sym
    }

    /// Intern an owned string, avoiding clone if not already present.
    pub fn intern_owned(&mut self, s: String) -> Symbol {
        if let Some(&sym) = self.map.get(&s) {
            return sym;
        }

        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(s.clone());
        self.map.insert(s, sym);
        sym
    }

    /// Look up a string without interning it.
    pub fn get(&self, s: &str) -> Option<Symbol> {
        self.map.get(s).copied()
    }

    /// Resolve a Symbol back to its string.
    ///
    /// # Panics
    /// Panics if the symbol was not created by this interner.
    #[inline]
    pub fn resolve(&self, sym: Symbol) -> &str {
        &self.strings[sym.0 as usize]
    }

    /// Try to resolve a Symbol, returning None if invalid.
    #[inline]
    pub fn try_resolve(&self, sym: Symbol) -> Option<&str> {
        self.strings.get(sym.0 as usize).map(|s| s.as_str())
    }

    /// Number of interned strings, reserved markers included.
    #[inline]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether nothing beyond the reserved markers has been interned.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.strings.len() == RESERVED.len()
    }

    /// Iterate over all interned strings with their symbols.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &str)> {
        self.strings
            .iter()
            .enumerate()
            .map(|(i, s)| (Symbol(i as u32), s.as_str()))
    }
}

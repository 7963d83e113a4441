//! String interner for identifier deduplication.
//!
//! Identifier and string-literal text is interned into a per-compilation pool
//! and passed around as `Atom`s (u32 indices). Name comparisons in symbol
//! tables become integer comparisons instead of string comparisons.

use rustc_hash::FxHashMap;
use serde::Serialize;

/// An interned string identifier.
///
/// Atoms are cheap to copy (just a u32) and can be compared with `==` in O(1).
/// To get the actual string, use `Interner::resolve(atom)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Default, PartialOrd, Ord)]
pub struct Atom(pub u32);

impl Atom {
    /// A sentinel value representing no atom / empty string.
    pub const NONE: Atom = Atom(0);

    #[inline]
    pub fn is_none(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A per-compilation string pool.
///
/// Atom 0 is reserved for the empty string so `Atom::NONE` always resolves.
#[derive(Debug)]
pub struct Interner {
    map: FxHashMap<String, Atom>,
    strings: Vec<String>,
}

impl Default for Interner {
    fn default() -> Self {
        Interner::new()
    }
}

impl Interner {
    pub fn new() -> Interner {
        let mut interner = Interner {
            map: FxHashMap::default(),
            strings: Vec::new(),
        };
        // Reserve slot 0 for Atom::NONE.
        interner.strings.push(String::new());
        interner.map.insert(String::new(), Atom::NONE);
        interner
    }

    /// Intern a string, returning its atom. Repeated calls with the same text
    /// return the same atom.
    pub fn intern(&mut self, text: &str) -> Atom {
        if let Some(&atom) = self.map.get(text) {
            return atom;
        }
        let atom = Atom(self.strings.len() as u32);
        self.strings.push(text.to_string());
        self.map.insert(text.to_string(), atom);
        atom
    }

    /// Resolve an atom back to its string.
    ///
    /// Panics if the atom did not come from this interner.
    pub fn resolve(&self, atom: Atom) -> &str {
        &self.strings[atom.0 as usize]
    }

    /// Look up an already-interned string without inserting.
    pub fn get(&self, text: &str) -> Option<Atom> {
        self.map.get(text).copied()
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        // Slot 0 is always present.
        self.strings.len() <= 1
    }
}

//! Symbol tables and the table arena.
//!
//! Tables are stored centrally in a [`TableList`] and addressed by
//! [`TableId`], giving every table a plain identity. The resolver's
//! copy-on-write overlay cache maps a base table's id to its overlay's id;
//! base tables created by the binder are never mutated after binding.

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use tydl_common::Atom;

use crate::symbols::SymbolId;

/// Handle to a table in a [`TableList`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TableId(pub u32);

/// Insertion-ordered name → symbol mapping with collision tracking.
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    entries: IndexMap<Atom, SymbolId, FxBuildHasher>,
    /// Colliding symbols, keyed by the binding that won the slot. The set
    /// contains every symbol that competed for the name, the winner included.
    duplicates: FxHashMap<SymbolId, FxHashSet<SymbolId>>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    #[inline]
    pub fn get(&self, name: Atom) -> Option<SymbolId> {
        self.entries.get(&name).copied()
    }

    #[inline]
    pub fn has(&self, name: Atom) -> bool {
        self.entries.contains_key(&name)
    }

    /// Bind `name` to `sym`. A rebinding overwrites (last write wins) and
    /// records the collision under the new primary so diagnostics can see
    /// every contender.
    pub fn set(&mut self, name: Atom, sym: SymbolId) {
        if let Some(&existing) = self.entries.get(&name) {
            if existing != sym {
                // Carry over any collisions already recorded for the old
                // primary.
                let mut set = self.duplicates.remove(&existing).unwrap_or_default();
                set.insert(existing);
                set.insert(sym);
                self.duplicates.insert(sym, set);
            }
        }
        self.entries.insert(name, sym);
    }

    /// Whether `sym` won a contested slot in this table.
    pub fn is_duplicate(&self, sym: SymbolId) -> bool {
        self.duplicates.contains_key(&sym)
    }

    /// Record `dup` as having collided with `primary` (used when collisions
    /// recorded elsewhere are carried into this table).
    pub fn record_duplicate(&mut self, primary: SymbolId, dup: SymbolId) {
        self.duplicates.entry(primary).or_default().insert(dup);
    }

    pub fn duplicates(&self) -> impl Iterator<Item = (SymbolId, &FxHashSet<SymbolId>)> {
        self.duplicates.iter().map(|(&k, v)| (k, v))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Atom, SymbolId)> + '_ {
        self.entries.iter().map(|(&k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bulk-merge every binding (and recorded collision) of `other` into
    /// `self`, in `other`'s insertion order.
    pub fn include(&mut self, other: &SymbolTable) {
        for (sym, set) in other.duplicates.iter() {
            self.duplicates.entry(*sym).or_default().extend(set.iter());
        }
        for (name, sym) in other.iter() {
            self.set(name, sym);
        }
    }
}

/// Arena owning every symbol table of a compilation.
#[derive(Default)]
pub struct TableList {
    tables: Vec<SymbolTable>,
}

impl TableList {
    pub fn new() -> TableList {
        TableList::default()
    }

    pub fn alloc(&mut self) -> TableId {
        let id = TableId(self.tables.len() as u32);
        self.tables.push(SymbolTable::new());
        id
    }

    /// Allocate a new table seeded with a clone of `base`'s current entries
    /// (the copy-on-write overlay seed).
    pub fn alloc_clone_of(&mut self, base: TableId) -> TableId {
        let clone = self.get(base).clone();
        let id = TableId(self.tables.len() as u32);
        self.tables.push(clone);
        id
    }

    #[inline]
    pub fn get(&self, id: TableId) -> &SymbolTable {
        &self.tables[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: TableId) -> &mut SymbolTable {
        &mut self.tables[id.0 as usize]
    }

    /// Copy every binding of `source` into `target` (`include` across two
    /// tables of the arena).
    pub fn include(&mut self, source: TableId, target: TableId) {
        debug_assert_ne!(source, target, "cannot include a table into itself");
        let (source_table, target_table) = self.pair_mut(source, target);
        target_table.include(source_table);
    }

    /// Disjoint mutable access to two distinct tables.
    fn pair_mut(&mut self, a: TableId, b: TableId) -> (&SymbolTable, &mut SymbolTable) {
        let (a_idx, b_idx) = (a.0 as usize, b.0 as usize);
        if a_idx < b_idx {
            let (left, right) = self.tables.split_at_mut(b_idx);
            (&left[a_idx], &mut right[0])
        } else {
            let (left, right) = self.tables.split_at_mut(a_idx);
            (&right[0], &mut left[b_idx])
        }
    }
}

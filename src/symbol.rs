//! Interned grammar symbols.
//!
//! Every name that appears in a grammar, whether on the left of a rule, inside
//! an alternative, or minted during EBNF desugaring, is interned exactly once.
//! The resulting `SymbolId` is a dense index into the table, so lookups by id
//! are a plain slice access.

use std::collections::HashMap;

use derive_more::{Display, From, Into};

#[cfg(test)]
#[path = "tests/symbol.rs"]
mod tests_for_symbol;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From, Into)]
#[display(fmt = "#{}", _0)]
pub struct SymbolId(usize);

impl SymbolId {
    pub fn index(self) -> usize { self.0 }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum SymbolKind {
    Terminal,
    Nonterminal,
    Synthetic,
    Unknown,
}

impl SymbolKind {
    /// Nonterminal and Synthetic symbols both expand through productions;
    /// the predictor treats them alike.
    pub fn expands(self) -> bool {
        matches!(self, SymbolKind::Nonterminal | SymbolKind::Synthetic)
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Symbol {
    pub(crate) name: String,
    pub(crate) kind: SymbolKind,
    pub(crate) is_lhs: bool,
}

impl Symbol {
    pub fn name(&self) -> &str { &self.name }
    pub fn kind(&self) -> SymbolKind { self.kind }
    pub fn is_lhs(&self) -> bool { self.is_lhs }
}

#[derive(Clone, Default, Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
    // symbols in the order they were first used as a left-hand side
    lhs_order: Vec<SymbolId>,
    synthetic_counter: usize,
}

impl SymbolTable {
    pub fn new() -> Self { Default::default() }

    pub fn len(&self) -> usize { self.symbols.len() }
    pub fn is_empty(&self) -> bool { self.symbols.is_empty() }

    /// Returns the id already bound to `name`, or appends a fresh symbol of
    /// kind `Unknown`.
    pub fn intern(&mut self, name: &str) -> SymbolId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = SymbolId(self.symbols.len());
        self.symbols.push(Symbol { name: name.to_string(), kind: SymbolKind::Unknown, is_lhs: false });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn lookup(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.0)
    }

    pub fn contains(&self, id: SymbolId) -> bool { id.0 < self.symbols.len() }

    /// Name of `id`; `None` for an id this table never minted.
    pub fn name(&self, id: SymbolId) -> Option<&str> {
        self.get(id).map(|s| s.name.as_str())
    }

    pub fn kind(&self, id: SymbolId) -> Option<SymbolKind> {
        self.get(id).map(|s| s.kind)
    }

    pub fn set_kind(&mut self, id: SymbolId, kind: SymbolKind) {
        if let Some(s) = self.symbols.get_mut(id.0) {
            s.kind = kind;
        }
    }

    /// Marks `id` as used on a left-hand side. Returns true on the first
    /// marking only.
    pub fn mark_as_lhs(&mut self, id: SymbolId) -> bool {
        match self.symbols.get_mut(id.0) {
            Some(s) if !s.is_lhs => {
                s.is_lhs = true;
                self.lhs_order.push(id);
                true
            }
            _ => false,
        }
    }

    pub fn lhs_order(&self) -> &[SymbolId] { &self.lhs_order }

    /// Interns a new `Synthetic` symbol whose name is guaranteed not to be
    /// in use yet.
    pub fn create_synthetic(&mut self, prefix: &str) -> SymbolId {
        loop {
            let name = format!("__synth_{}_{}__", self.synthetic_counter, prefix);
            self.synthetic_counter += 1;
            if self.by_name.contains_key(&name) {
                continue;
            }
            let id = self.intern(&name);
            self.set_kind(id, SymbolKind::Synthetic);
            return id;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item=(SymbolId, &Symbol)> {
        self.symbols.iter().enumerate().map(|(i, s)| (SymbolId(i), s))
    }
}

impl std::ops::Index<SymbolId> for SymbolTable {
    type Output = Symbol;
    fn index(&self, id: SymbolId) -> &Symbol { &self.symbols[id.0] }
}

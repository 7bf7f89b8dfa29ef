// A grammar G is a tuple (Sigma, Delta, S, P), where
//   Sigma is the set of terminals (symbols never used on a left-hand side),
//   Delta is the set of nonterminals, including synthetic ones,
//   S in Delta is the start symbol, and
//   P is an ordered list of productions A ::= X_1 ... X_n (n may be 0).
//
// Productions are identified by their position in P; the Earley engine uses
// that position as part of an item's identity.

use derive_more::{Display, From, Into};
use tracing::debug;

use crate::error::GrammarSemanticError;
use crate::symbol::{Symbol, SymbolId, SymbolKind, SymbolTable};

#[cfg(test)]
#[path = "tests/grammar.rs"]
mod tests_for_grammar;

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From, Into)]
#[display(fmt = "p{}", _0)]
pub struct ProductionId(usize);

impl ProductionId {
    pub fn index(self) -> usize { self.0 }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Production {
    pub(crate) lhs: SymbolId,
    pub(crate) rhs: Vec<SymbolId>,
}

impl Production {
    pub fn lhs(&self) -> SymbolId { self.lhs }
    pub fn rhs(&self) -> &[SymbolId] { &self.rhs }
    pub fn is_epsilon(&self) -> bool { self.rhs.is_empty() }
}

#[derive(Clone, Default, Debug)]
pub struct Grammar {
    symbols: SymbolTable,
    productions: Vec<Production>,
    // productions indexed by the symbol index of their left-hand side
    by_lhs: Vec<Vec<ProductionId>>,
    start: Option<SymbolId>,
    classified: bool,
}

impl Grammar {
    pub fn new() -> Self { Default::default() }

    pub fn symbols(&self) -> &SymbolTable { &self.symbols }
    pub(crate) fn symbols_mut(&mut self) -> &mut SymbolTable { &mut self.symbols }

    pub fn symbol(&self, id: SymbolId) -> Option<&Symbol> { self.symbols.get(id) }
    pub fn name(&self, id: SymbolId) -> Option<&str> { self.symbols.name(id) }
    pub fn lookup(&self, name: &str) -> Option<SymbolId> { self.symbols.lookup(name) }

    pub fn productions(&self) -> &[Production] { &self.productions }
    pub fn production(&self, id: ProductionId) -> Option<&Production> { self.productions.get(id.0) }

    pub fn productions_for(&self, lhs: SymbolId) -> &[ProductionId] {
        self.by_lhs.get(lhs.index()).map(|v| &v[..]).unwrap_or(&[])
    }

    pub fn start(&self) -> Option<SymbolId> { self.start }
    pub fn is_classified(&self) -> bool { self.classified }

    pub fn add_symbol(&mut self, name: &str) -> SymbolId {
        self.symbols.intern(name)
    }

    /// Appends `lhs ::= rhs`. An empty `rhs` is an epsilon production.
    /// The grammar needs classifying again afterwards.
    pub fn add_production(&mut self, lhs: SymbolId, rhs: &[SymbolId]) -> ProductionId {
        let id = ProductionId(self.productions.len());
        self.symbols.mark_as_lhs(lhs);
        self.classified = false;
        self.productions.push(Production { lhs, rhs: rhs.to_vec() });
        if !self.symbols.contains(lhs) {
            // left for validate() to report
            return id;
        }
        if self.by_lhs.len() <= lhs.index() {
            self.by_lhs.resize_with(lhs.index() + 1, Vec::new);
        }
        self.by_lhs[lhs.index()].push(id);
        id
    }

    pub fn set_start(&mut self, symbol: SymbolId) {
        self.start = Some(symbol);
    }

    /// Falls back to the first symbol ever used as a left-hand side when no
    /// start symbol has been set.
    pub fn infer_start(&mut self) -> Option<SymbolId> {
        if self.start.is_none() {
            self.start = self.symbols.lhs_order().first().copied();
            if let Some(s) = self.start {
                debug!(start = self.symbols[s].name(), "inferred start symbol");
            }
        }
        self.start
    }

    /// Resolves every `Unknown` symbol: left-hand sides become nonterminals,
    /// everything else becomes a terminal. Runs once per batch of
    /// productions; calling it again before the next `add_production` does
    /// nothing.
    pub fn classify_symbols(&mut self) {
        if self.classified { return; }
        let unresolved: Vec<(SymbolId, bool)> = self.symbols.iter()
            .filter(|(_, s)| s.kind == SymbolKind::Unknown)
            .map(|(id, s)| (id, s.is_lhs))
            .collect();
        for (id, is_lhs) in unresolved {
            let kind = if is_lhs { SymbolKind::Nonterminal } else { SymbolKind::Terminal };
            self.symbols.set_kind(id, kind);
        }
        self.classified = true;
    }

    /// Checks everything the Earley engine relies on: a start symbol with
    /// productions, no out-of-range symbol ids, and no `Unknown` symbol in any
    /// production.
    pub fn validate(&self) -> Result<(), GrammarSemanticError> {
        if self.productions.is_empty() {
            return Err(GrammarSemanticError::Empty);
        }
        for (i, p) in self.productions.iter().enumerate() {
            let dangling = std::iter::once(&p.lhs).chain(p.rhs.iter())
                .find(|s| !self.symbols.contains(**s));
            if let Some(s) = dangling {
                return Err(GrammarSemanticError::DanglingSymbol { production: ProductionId(i), index: s.index() });
            }
        }
        let start = self.start.ok_or(GrammarSemanticError::NoStartSymbol)?;
        if !self.symbols.contains(start) {
            return Err(GrammarSemanticError::NoStartSymbol);
        }
        if self.productions_for(start).is_empty() {
            return Err(GrammarSemanticError::StartWithoutProductions(self.symbols[start].name().to_string()));
        }
        let unknown = |s: &SymbolId| self.symbols.kind(*s) == Some(SymbolKind::Unknown);
        if !self.classified || self.productions.iter().any(|p| unknown(&p.lhs) || p.rhs.iter().any(unknown)) {
            return Err(GrammarSemanticError::Unclassified);
        }
        Ok(())
    }

    pub fn terminals(&self) -> impl Iterator<Item=SymbolId> + '_ {
        self.symbols.iter()
            .filter(|(_, s)| s.kind == SymbolKind::Terminal)
            .map(|(id, _)| id)
    }

    pub fn nonterminals(&self) -> impl Iterator<Item=SymbolId> + '_ {
        self.symbols.iter()
            .filter(|(_, s)| s.kind.expands())
            .map(|(id, _)| id)
    }
}

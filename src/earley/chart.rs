//! The Earley chart: one set of items per input position.
//!
//! Inference rules, with `S` the start symbol, `w = t_0 ... t_(n-1)` the
//! input and `(A ::= α • β, i)` an item of set `k`:
//!
//! ```text
//!                                    S ::= γ in P
//!   Init      ───────────────────────────────────────────────
//!                          (S ::= • γ, 0) in set 0
//!
//!              (A ::= α • B β, i) in set k      B ::= γ in P
//!   Predict   ───────────────────────────────────────────────
//!                          (B ::= • γ, k) in set k
//!
//!              (A ::= α • a β, i) in set k      a matches t_k
//!   Scan      ───────────────────────────────────────────────
//!                       (A ::= α a • β, i) in set k+1
//!
//!        (B ::= γ •, j) in set k      (A ::= α • B β, i) in set j
//!   Complete  ───────────────────────────────────────────────
//!                        (A ::= α B • β, i) in set k
//! ```
//!
//! Scan and Complete record how each item was reached as a `Link`, so the
//! chart doubles as a derivation graph for the forest walk.

use std::collections::{BTreeSet, HashMap};

use linear_map::LinearMap;
use tracing::trace;

use crate::error::ResourceExhausted;
use crate::grammar::{Grammar, Production, ProductionId};
use crate::symbol::{SymbolId, SymbolKind};
use crate::tokenizer::{Token, TokenKind};

/// Position of an item in the chart: set index, then slot within the set.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ItemRef {
    pub(crate) set: usize,
    pub(crate) slot: usize,
}

/// Identity of an item within a set.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct ItemKey {
    pub(crate) production: ProductionId,
    pub(crate) dot: usize,
    pub(crate) origin: usize,
}

impl ItemKey {
    fn advanced(self) -> ItemKey { ItemKey { dot: self.dot + 1, ..self } }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Link {
    /// `predecessor` consumed token `token`.
    Scan { predecessor: ItemRef, token: usize },
    /// `predecessor` was waiting on the left-hand side of `completed`.
    Complete { predecessor: ItemRef, completed: ItemRef },
}

#[derive(Debug)]
pub(crate) struct Item {
    pub(crate) key: ItemKey,
    pub(crate) links: Vec<Link>,
}

#[derive(Default, Debug)]
pub(crate) struct EarleySet {
    items: Vec<Item>,
    index: HashMap<ItemKey, usize>,
    // slots of items whose next symbol is the key
    waiting: LinearMap<SymbolId, Vec<usize>>,
    // slots of complete items with origin at this set, by left-hand side
    completed_here: LinearMap<SymbolId, Vec<usize>>,
}

impl EarleySet {
    pub(crate) fn len(&self) -> usize { self.items.len() }
    pub(crate) fn is_empty(&self) -> bool { self.items.is_empty() }
}

pub(crate) struct Chart<'g> {
    grammar: &'g Grammar,
    sets: Vec<EarleySet>,
    max_set_items: Option<usize>,
}

impl<'g> Chart<'g> {
    /// Chart for `grammar`, which must have passed `Grammar::validate`.
    pub(crate) fn new(grammar: &'g Grammar, max_set_items: Option<usize>) -> Self {
        Chart { grammar, sets: vec![], max_set_items }
    }

    pub(crate) fn item(&self, r: ItemRef) -> &Item {
        &self.sets[r.set].items[r.slot]
    }

    pub(crate) fn production(&self, id: ProductionId) -> &'g Production {
        &self.grammar.productions()[id.index()]
    }

    fn kind(&self, s: SymbolId) -> SymbolKind {
        self.grammar.symbols()[s].kind()
    }

    fn next_symbol(&self, key: ItemKey) -> Option<SymbolId> {
        self.production(key.production).rhs().get(key.dot).copied()
    }

    /// Builds every set for `tokens`. Stops early once a set comes out of
    /// the scanner empty, since nothing can follow it.
    pub(crate) fn build(&mut self, start: SymbolId, tokens: &[Token<'_>]) -> Result<(), ResourceExhausted> {
        self.sets.try_reserve(tokens.len() + 1)?;
        self.sets.push(EarleySet::default());
        for &p in self.grammar.productions_for(start) {
            self.add(0, ItemKey { production: p, dot: 0, origin: 0 }, None)?;
        }
        for k in 0..=tokens.len() {
            self.process(k)?;
            trace!(set = k, items = self.sets[k].len(), "processed chart set");
            if k == tokens.len() { break; }
            self.sets.push(EarleySet::default());
            self.scan(k, &tokens[k])?;
            if self.sets[k + 1].is_empty() { break; }
        }
        Ok(())
    }

    fn add(&mut self, k: usize, key: ItemKey, link: Option<Link>) -> Result<(), ResourceExhausted> {
        let set = &mut self.sets[k];
        if let Some(&slot) = set.index.get(&key) {
            if let Some(link) = link {
                let links = &mut set.items[slot].links;
                if !links.contains(&link) {
                    links.try_reserve(1)?;
                    links.push(link);
                }
            }
            return Ok(());
        }
        if let Some(limit) = self.max_set_items {
            if set.items.len() >= limit {
                return Err(ResourceExhausted::ItemLimit { position: k, limit });
            }
        }
        set.items.try_reserve(1)?;
        set.index.try_reserve(1)?;
        set.index.insert(key, set.items.len());
        set.items.push(Item { key, links: link.into_iter().collect() });
        Ok(())
    }

    /// Predictor and completer over set `k`, until the set stops growing.
    fn process(&mut self, k: usize) -> Result<(), ResourceExhausted> {
        let mut slot = 0;
        while slot < self.sets[k].items.len() {
            let key = self.sets[k].items[slot].key;
            let here = ItemRef { set: k, slot };
            match self.next_symbol(key) {
                Some(next) if self.kind(next).expands() => self.predict(k, here, key, next)?,
                Some(_) => {}
                None => self.complete(k, here, key)?,
            }
            slot += 1;
        }
        Ok(())
    }

    fn predict(&mut self, k: usize, here: ItemRef, key: ItemKey, next: SymbolId) -> Result<(), ResourceExhausted> {
        self.sets[k].waiting.entry(next).or_insert(Vec::new()).push(here.slot);
        for &p in self.grammar.productions_for(next) {
            self.add(k, ItemKey { production: p, dot: 0, origin: k }, None)?;
        }
        // `next` may already have been completed empty at k; the completer
        // will not revisit those items for a waiter registered after them.
        let nulled = self.sets[k].completed_here.get(&next).cloned().unwrap_or_default();
        for slot in nulled {
            let link = Link::Complete { predecessor: here, completed: ItemRef { set: k, slot } };
            self.add(k, key.advanced(), Some(link))?;
        }
        Ok(())
    }

    fn complete(&mut self, k: usize, here: ItemRef, key: ItemKey) -> Result<(), ResourceExhausted> {
        let lhs = self.production(key.production).lhs();
        let j = key.origin;
        if j == k {
            self.sets[k].completed_here.entry(lhs).or_insert(Vec::new()).push(here.slot);
        }
        let waiters = self.sets[j].waiting.get(&lhs).cloned().unwrap_or_default();
        for w in waiters {
            let waiting = self.sets[j].items[w].key;
            let link = Link::Complete { predecessor: ItemRef { set: j, slot: w }, completed: here };
            self.add(k, waiting.advanced(), Some(link))?;
        }
        Ok(())
    }

    fn scan(&mut self, k: usize, token: &Token<'_>) -> Result<(), ResourceExhausted> {
        for slot in 0..self.sets[k].items.len() {
            let key = self.sets[k].items[slot].key;
            let next = match self.next_symbol(key) {
                Some(s) if self.kind(s) == SymbolKind::Terminal => s,
                _ => continue,
            };
            if terminal_matches(self.grammar, next, token) {
                let link = Link::Scan { predecessor: ItemRef { set: k, slot }, token: k };
                self.add(k + 1, key.advanced(), Some(link))?;
            }
        }
        Ok(())
    }

    /// Complete items of the last set that derive `start` from position 0.
    pub(crate) fn accepting(&self, start: SymbolId, n: usize) -> Vec<ItemRef> {
        let set = match self.sets.get(n) {
            Some(set) if self.sets.len() == n + 1 => set,
            _ => return vec![],
        };
        set.items.iter().enumerate()
            .filter(|(_, item)| {
                let p = self.production(item.key.production);
                item.key.origin == 0 && p.lhs() == start && item.key.dot == p.rhs().len()
            })
            .map(|(slot, _)| ItemRef { set: n, slot })
            .collect()
    }

    /// Index of the last set holding any item.
    pub(crate) fn furthest(&self) -> usize {
        self.sets.iter().rposition(|s| !s.is_empty()).unwrap_or(0)
    }

    /// Names of the terminals set `k` could have scanned next.
    pub(crate) fn expected_at(&self, k: usize) -> Vec<String> {
        let set = match self.sets.get(k) { Some(s) => s, None => return vec![] };
        let names: BTreeSet<&str> = set.items.iter()
            .filter_map(|item| self.next_symbol(item.key))
            .filter(|&s| self.kind(s) == SymbolKind::Terminal)
            .map(|s| self.grammar.symbols()[s].name())
            .collect();
        names.into_iter().map(String::from).collect()
    }
}

/// A token matches a terminal when the tokenizer already bound it to that
/// terminal, when the terminal names a lexical category the token belongs
/// to, or when the token text is the terminal's name.
pub(crate) fn terminal_matches(grammar: &Grammar, terminal: SymbolId, token: &Token<'_>) -> bool {
    if token.kind == TokenKind::Eof { return false; }
    if token.terminal == Some(terminal) { return true; }
    let name = grammar.symbols()[terminal].name();
    if TokenKind::category(name).map_or(false, |kinds| kinds.contains(&token.kind)) {
        return true;
    }
    token.text == name
}

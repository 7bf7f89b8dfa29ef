//! Parse trees out of the chart's link graph.
//!
//! Every derivation of an item `(A ::= X_1 ... X_d • β, i)` is a sequence of
//! `d` child nodes. An item with the dot at 0 has exactly one, the empty
//! sequence. Otherwise each link contributes the derivations of its
//! predecessor, extended by a leaf for a scanned token or by each tree of the
//! completed item. A complete item's trees wrap its derivations in a node for
//! `A`.
//!
//! Results are memoized per item and every list is capped at `max_trees`, so
//! exponentially ambiguous inputs stay bounded. An item that recurs on the
//! path being expanded (a cyclic grammar, `A ⇒+ A`) contributes nothing on
//! that path; results computed under such a cut depend on the path and are
//! recomputed rather than memoized.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::earley::chart::{Chart, ItemRef, Link};
use crate::node::Node;
use crate::tokenizer::Token;

pub(crate) struct Forest<'c, 'g, 't> {
    chart: &'c Chart<'g>,
    tokens: &'t [Token<'t>],
    max_trees: usize,
    derivations: HashMap<ItemRef, Rc<Vec<Vec<Node>>>>,
    trees: HashMap<ItemRef, Rc<Vec<Node>>>,
    active: HashSet<ItemRef>,
}

impl<'c, 'g, 't> Forest<'c, 'g, 't> {
    pub(crate) fn new(chart: &'c Chart<'g>, tokens: &'t [Token<'t>], max_trees: usize) -> Self {
        Forest {
            chart,
            tokens,
            max_trees,
            derivations: HashMap::new(),
            trees: HashMap::new(),
            active: HashSet::new(),
        }
    }

    /// Trees for all `roots`, in root order, at most `max_trees` overall.
    pub(crate) fn build(mut self, roots: &[ItemRef]) -> Vec<Node> {
        let mut out = Vec::new();
        for &root in roots {
            let remaining = self.max_trees.saturating_sub(out.len());
            if remaining == 0 { break; }
            let (trees, _) = self.trees_of(root);
            out.extend(trees.iter().take(remaining).cloned());
        }
        out
    }

    fn trees_of(&mut self, r: ItemRef) -> (Rc<Vec<Node>>, bool) {
        if let Some(done) = self.trees.get(&r) {
            return (done.clone(), false);
        }
        if self.active.contains(&r) {
            return (Rc::new(vec![]), true);
        }
        let chart = self.chart;
        let key = chart.item(r).key;
        let lhs = chart.production(key.production).lhs();
        let (derivations, cut) = self.derivations_of(r);
        let trees: Vec<Node> = derivations.iter()
            .map(|children| Node::Nonterminal { symbol: lhs, production: key.production, children: children.clone() })
            .collect();
        let trees = Rc::new(trees);
        if !cut {
            self.trees.insert(r, trees.clone());
        }
        (trees, cut)
    }

    /// Derivations of `r`, and whether a cycle was cut while computing them.
    /// A cut result holds only for the current path and is not memoized.
    fn derivations_of(&mut self, r: ItemRef) -> (Rc<Vec<Vec<Node>>>, bool) {
        if let Some(done) = self.derivations.get(&r) {
            return (done.clone(), false);
        }
        let chart = self.chart;
        let tokens = self.tokens;
        let item = chart.item(r);
        if item.key.dot == 0 {
            return (Rc::new(vec![vec![]]), false);
        }
        if !self.active.insert(r) {
            return (Rc::new(vec![]), true);
        }
        let symbol = chart.production(item.key.production).rhs()[item.key.dot - 1];
        let mut out: Vec<Vec<Node>> = Vec::new();
        let mut cut = false;
        for link in item.links.iter() {
            if out.len() >= self.max_trees { break; }
            match *link {
                Link::Scan { predecessor, token } => {
                    let t = &tokens[token];
                    let leaf = Node::Terminal {
                        symbol,
                        text: t.text.to_string(),
                        line: t.line,
                        column: t.column,
                        position: token,
                    };
                    let (prefixes, prefix_cut) = self.derivations_of(predecessor);
                    cut |= prefix_cut;
                    for prefix in prefixes.iter() {
                        if out.len() >= self.max_trees { break; }
                        let mut children = prefix.clone();
                        children.push(leaf.clone());
                        out.push(children);
                    }
                }
                Link::Complete { predecessor, completed } => {
                    let (prefixes, prefix_cut) = self.derivations_of(predecessor);
                    let (subtrees, subtree_cut) = self.trees_of(completed);
                    cut |= prefix_cut || subtree_cut;
                    'prefixes: for prefix in prefixes.iter() {
                        for subtree in subtrees.iter() {
                            if out.len() >= self.max_trees { break 'prefixes; }
                            let mut children = prefix.clone();
                            children.push(subtree.clone());
                            out.push(children);
                        }
                    }
                }
            }
        }
        self.active.remove(&r);
        let out = Rc::new(out);
        if !cut {
            self.derivations.insert(r, out.clone());
        }
        (out, cut)
    }
}

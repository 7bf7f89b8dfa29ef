use crate::grammar::ProductionId;
use crate::symbol::SymbolId;

/// A parse tree. Terminal leaves own a copy of the token text so a tree
/// outlives the token buffer it was built from.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Node {
    Terminal {
        symbol: SymbolId,
        text: String,
        line: usize,
        column: usize,
        /// Index of the token in the parsed sequence.
        position: usize,
    },
    Nonterminal {
        symbol: SymbolId,
        production: ProductionId,
        children: Vec<Node>,
    },
}

impl Node {
    pub fn symbol(&self) -> SymbolId {
        match self {
            Node::Terminal { symbol, .. } | Node::Nonterminal { symbol, .. } => *symbol,
        }
    }

    pub fn production(&self) -> Option<ProductionId> {
        match self {
            Node::Terminal { .. } => None,
            Node::Nonterminal { production, .. } => Some(*production),
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Terminal { .. } => &[],
            Node::Nonterminal { children, .. } => children,
        }
    }

    pub fn is_terminal(&self) -> bool { matches!(self, Node::Terminal { .. }) }

    /// Token texts under this node, left to right.
    pub fn leaves(&self) -> Vec<&str> {
        let mut out = vec![];
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Node::Terminal { text, .. } => out.push(text),
            Node::Nonterminal { children, .. } => {
                for c in children { c.collect_leaves(out); }
            }
        }
    }
}

//! Earley recognition and parse-tree reconstruction over a [`Grammar`].
//!
//! For each input position the engine builds a set of items, i.e. productions
//! with a dot marking how much of the right-hand side has been matched and the
//! position where matching began. The sets memoize: no portion of the input
//! is ever reparsed, and left recursion, epsilon productions and ambiguity
//! need no special treatment.
//!
//! A failed parse is a normal result, not an error. Only resource exhaustion
//! (an item limit, or a failed allocation) is reported through `Err`.

use tracing::debug;

use crate::error::{line_column, GrammarSemanticError, ParseError, ResourceExhausted};
use crate::grammar::Grammar;
use crate::node::Node;
use crate::symbol::SymbolId;
use crate::tokenizer::{Token, TokenKind, Tokenizer};

mod chart;
mod forest;

use chart::Chart;
use forest::Forest;

#[cfg(test)]
#[path = "tests/earley.rs"]
mod tests_for_earley;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct ParseOptions {
    /// Largest number of items any one chart set may hold.
    pub max_set_items: Option<usize>,
    /// Trees reconstructed per parse; further derivations are dropped.
    pub max_trees: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions { max_set_items: None, max_trees: 256 }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseFailure {
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Index of the furthest chart set that still held items.
    pub position: usize,
    /// Terminals that set could have scanned.
    pub expected: Vec<String>,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ParseResult {
    pub success: bool,
    pub trees: Vec<Node>,
    pub error: Option<ParseFailure>,
}

pub struct Parser<'g> {
    grammar: &'g Grammar,
    start: SymbolId,
    options: ParseOptions,
}

impl<'g> Parser<'g> {
    pub fn new(grammar: &'g Grammar) -> Result<Self, GrammarSemanticError> {
        grammar.validate()?;
        let start = grammar.start().ok_or(GrammarSemanticError::NoStartSymbol)?;
        Ok(Parser { grammar, start, options: ParseOptions::default() })
    }

    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn grammar(&self) -> &'g Grammar { self.grammar }

    /// Parses `tokens` up to the first `Eof` token, or all of them when
    /// there is none.
    pub fn parse(&self, tokens: &[Token<'_>]) -> Result<ParseResult, ResourceExhausted> {
        let n = tokens.iter().position(|t| t.kind == TokenKind::Eof).unwrap_or(tokens.len());
        let input = &tokens[..n];

        let mut chart = Chart::new(self.grammar, self.options.max_set_items);
        chart.build(self.start, input)?;

        let accepted = chart.accepting(self.start, n);
        if accepted.is_empty() {
            let failure = self.failure(&chart, tokens, n);
            debug!(tokens = n, position = failure.position, "parse failed");
            return Ok(ParseResult { success: false, trees: vec![], error: Some(failure) });
        }
        let trees = Forest::new(&chart, input, self.options.max_trees).build(&accepted);
        debug!(tokens = n, trees = trees.len(), "parse succeeded");
        Ok(ParseResult { success: true, trees, error: None })
    }

    /// Tokenizes `input` against this grammar's terminals, then parses.
    pub fn parse_str(&self, input: &str) -> Result<ParseResult, ResourceExhausted> {
        let tokens = Tokenizer::for_grammar(self.grammar).tokenize(input);
        self.parse(&tokens)
    }

    fn failure(&self, chart: &Chart<'_>, tokens: &[Token<'_>], n: usize) -> ParseFailure {
        let position = chart.furthest();
        let expected = chart.expected_at(position);
        let (mut message, line, column) = if position < n {
            let t = &tokens[position];
            (format!("unexpected token `{}`", t.text), t.line, t.column)
        } else {
            let (line, column) = end_of_input(tokens, n);
            ("unexpected end of input".to_string(), line, column)
        };
        if !expected.is_empty() {
            message.push_str("; expected ");
            message.push_str(&expected.iter().map(|e| format!("`{}`", e)).collect::<Vec<_>>().join(", "));
        }
        ParseFailure { message, line, column, position, expected }
    }
}

// position just past the last token, preferring an explicit Eof token's
fn end_of_input(tokens: &[Token<'_>], n: usize) -> (usize, usize) {
    match (tokens.get(n), n.checked_sub(1).and_then(|i| tokens.get(i))) {
        (Some(eof), _) => (eof.line, eof.column),
        (None, Some(last)) => {
            let (dl, dc) = line_column(last.text, last.text.len());
            if dl == 1 { (last.line, last.column + dc - 1) } else { (last.line + dl - 1, dc) }
        }
        (None, None) => (1, 1),
    }
}

/// Parses `tokens` with default options.
pub fn parse(grammar: &Grammar, tokens: &[Token<'_>]) -> Result<ParseResult, ParseError> {
    Ok(Parser::new(grammar)?.parse(tokens)?)
}

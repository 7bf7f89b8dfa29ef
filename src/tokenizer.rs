//! Runtime tokenizer: turns input text into the `Token` sequence the Earley
//! engine consumes.
//!
//! Terminals of the grammar are tried first, longest first, and come out as
//! `Keyword` tokens already bound to their terminal symbol. Anything else
//! falls into a lexical category: quoted strings, numbers with an optional
//! leading `-`, identifiers, and single-character symbols. Every sequence
//! ends with one `Eof` token.

use std::sync::OnceLock;

use derive_more::Display;
use regex::Regex;

use crate::grammar::Grammar;
use crate::symbol::SymbolId;

#[cfg(test)]
#[path = "tests/tokenizer.rs"]
mod tests_for_tokenizer;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum TokenKind {
    Ident,
    Integer,
    Float,
    String,
    Symbol,
    Keyword,
    Eof,
}

impl TokenKind {
    /// The kinds a terminal named after a lexical category accepts, e.g.
    /// `NUMBER` accepts integers and floats. Names compare case-insensitively.
    pub fn category(name: &str) -> Option<&'static [TokenKind]> {
        const NUMBER: &[TokenKind] = &[TokenKind::Integer, TokenKind::Float];
        const INTEGER: &[TokenKind] = &[TokenKind::Integer];
        const FLOAT: &[TokenKind] = &[TokenKind::Float];
        const STRING: &[TokenKind] = &[TokenKind::String];
        const IDENT: &[TokenKind] = &[TokenKind::Ident];
        match name.to_ascii_uppercase().as_str() {
            "NUMBER" => Some(NUMBER),
            "INTEGER" | "INT" => Some(INTEGER),
            "FLOAT" => Some(FLOAT),
            "STRING" => Some(STRING),
            "IDENT" | "ID" | "IDENTIFIER" => Some(IDENT),
            _ => None,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
    pub column: usize,
    /// Terminal this token was recognized as, when the tokenizer knew the
    /// grammar.
    pub terminal: Option<SymbolId>,
}

impl<'a> Token<'a> {
    pub fn new(kind: TokenKind, text: &'a str, line: usize, column: usize) -> Self {
        Token { kind, text, line, column, terminal: None }
    }

    pub fn eof(line: usize, column: usize) -> Self {
        Token::new(TokenKind::Eof, "", line, column)
    }

    pub fn with_terminal(mut self, terminal: SymbolId) -> Self {
        self.terminal = Some(terminal);
        self
    }
}

struct Patterns {
    number: Regex,
    ident: Regex,
    double_quoted: Regex,
    single_quoted: Regex,
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let re = |p: &str| Regex::new(p).expect("token patterns are valid regexes");
        Patterns {
            number: re(r"^-?[0-9]+(\.[0-9]+)?"),
            ident: re(r"^[A-Za-z_][A-Za-z0-9_]*"),
            // an unterminated string runs to the end of input
            double_quoted: re(r#"(?s)^"(?:[^"\\]|\\.)*"?"#),
            single_quoted: re(r#"(?s)^'(?:[^'\\]|\\.)*'?"#),
        }
    })
}

fn is_word_char(c: char) -> bool { c.is_alphanumeric() || c == '_' }

pub struct Tokenizer<'g> {
    // longest first
    keywords: Vec<(&'g str, SymbolId)>,
    line_comment: Option<char>,
}

impl Default for Tokenizer<'static> {
    fn default() -> Self { Tokenizer { keywords: vec![], line_comment: Some('#') } }
}

impl Tokenizer<'static> {
    pub fn new() -> Self { Default::default() }
}

impl<'g> Tokenizer<'g> {
    /// A tokenizer that recognizes the terminals of `grammar` as keywords.
    /// Terminals named after a lexical category are left to their category.
    pub fn for_grammar(grammar: &'g Grammar) -> Self {
        let mut keywords: Vec<(&'g str, SymbolId)> = grammar.terminals()
            .map(|t| (grammar.symbols()[t].name(), t))
            .filter(|(name, _)| !name.is_empty() && TokenKind::category(name).is_none())
            .collect();
        keywords.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.1.cmp(&b.1)));
        Tokenizer { keywords, line_comment: Some('#') }
    }

    pub fn with_line_comment(mut self, c: Option<char>) -> Self {
        self.line_comment = c;
        self
    }

    fn keyword_at(&self, rest: &str) -> Option<(usize, SymbolId)> {
        self.keywords.iter()
            .filter(|(name, _)| rest.starts_with(name))
            .find(|(name, _)| {
                let needs_boundary = name.chars().last().map_or(false, is_word_char);
                !needs_boundary || !rest[name.len()..].chars().next().map_or(false, is_word_char)
            })
            .map(|(name, id)| (name.len(), *id))
    }

    pub fn tokenize<'a>(&self, input: &'a str) -> Vec<Token<'a>> {
        let p = patterns();
        let mut tokens = Vec::new();
        let mut cursor = Cursor { pos: 0, line: 1, column: 1 };
        while let Some(c) = input[cursor.pos..].chars().next() {
            let rest = &input[cursor.pos..];
            if c.is_whitespace() {
                cursor.advance(&rest[..c.len_utf8()]);
                continue;
            }
            if Some(c) == self.line_comment {
                let len = rest.find('\n').unwrap_or(rest.len());
                cursor.advance(&rest[..len]);
                continue;
            }
            let (kind, len, terminal) = if let Some((len, id)) = self.keyword_at(rest) {
                (TokenKind::Keyword, len, Some(id))
            } else if let Some(m) = p.double_quoted.find(rest).or_else(|| p.single_quoted.find(rest)) {
                (TokenKind::String, m.end(), None)
            } else if let Some(m) = p.number.find(rest) {
                let kind = if m.as_str().contains('.') { TokenKind::Float } else { TokenKind::Integer };
                (kind, m.end(), None)
            } else if let Some(m) = p.ident.find(rest) {
                (TokenKind::Ident, m.end(), None)
            } else {
                (TokenKind::Symbol, c.len_utf8(), None)
            };
            let text = &rest[..len];
            tokens.push(Token { kind, text, line: cursor.line, column: cursor.column, terminal });
            cursor.advance(text);
        }
        tokens.push(Token::eof(cursor.line, cursor.column));
        tokens
    }
}

struct Cursor { pos: usize, line: usize, column: usize }

impl Cursor {
    fn advance(&mut self, consumed: &str) {
        for c in consumed.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += consumed.len();
    }
}

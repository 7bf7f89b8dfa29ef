//! Adapts luthor lexemes into the tokens the generated grammar parser
//! consumes. Three decisions that need context live here rather than in the
//! parser: an identifier directly followed by `::=` is a rule name, the END
//! directive cuts the stream off, and plain BNF refuses EBNF-only syntax.

use std::fmt;
use std::iter::Peekable;

use thiserror::Error;

use crate::builder::Dialect;
use crate::luthor::{self, Directive, Lexeme, LexicalError};
use crate::rhs::CharRange;
use crate::Spanned;

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum TokError {
    #[error(transparent)]
    Lex(#[from] LexicalError),
    #[error("{construct} are only available in EBNF grammars")]
    EbnfOnly { offset: usize, construct: &'static str },
}

impl TokError {
    pub fn offset(&self) -> usize {
        match self {
            TokError::Lex(e) => e.offset(),
            TokError::EbnfOnly { offset, .. } => *offset,
        }
    }
}

pub struct Lexer<'a> {
    inner: Peekable<luthor::Lexer<'a>>,
    dialect: Dialect,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(inner: luthor::Lexer<'a>, dialect: Dialect) -> Self {
        Lexer { inner: inner.peekable(), dialect, done: false }
    }

    fn rule_head_follows(&mut self) -> bool {
        matches!(self.inner.peek(), Some(Ok((_, Lexeme::Define, _))))
    }

    fn ebnf_only(&self, offset: usize, construct: &'static str) -> Option<TokError> {
        match self.dialect {
            Dialect::Bnf => Some(TokError::EbnfOnly { offset, construct }),
            Dialect::Ebnf => None,
        }
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Spanned<Tok<'input>, usize, TokError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done { return None; }
        let (i, lexeme, j) = match self.inner.next()? {
            Ok(x) => x,
            Err(e) => return Some(Err(TokError::Lex(e))),
        };
        let tok = match lexeme {
            Lexeme::Directive(Directive::End) => {
                self.done = true;
                return None;
            }
            Lexeme::Directive(Directive::RuleBegin) => Tok::RuleBegin,
            Lexeme::Directive(Directive::RuleEnd) => Tok::RuleEnd,
            Lexeme::Directive(Directive::Start) => Tok::Start,
            Lexeme::Ident(s) if self.rule_head_follows() => Tok::RuleName(s),
            Lexeme::Ident(s) => Tok::Ident(s),
            Lexeme::Quoted(s) => Tok::Literal(s),
            Lexeme::Define => Tok::Define,
            Lexeme::Bar => Tok::Bar,
            Lexeme::Bracket(c) => match self.ebnf_only(i, "grouping brackets") {
                Some(e) => return Some(Err(e)),
                None => Tok::Bracket(c),
            },
            Lexeme::Postfix(c) => match self.ebnf_only(i, "postfix operators") {
                Some(e) => return Some(Err(e)),
                None => Tok::Postfix(c),
            },
            Lexeme::Abnf(s) => match self.ebnf_only(i, "ABNF literals") {
                Some(e) => return Some(Err(e)),
                None => Tok::Literal(s),
            },
            Lexeme::Range(r) => match self.ebnf_only(i, "ABNF literals") {
                Some(e) => return Some(Err(e)),
                None => Tok::Range(r),
            },
        };
        Some(Ok((i, tok, j)))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok<'a> {
    // "(", ")", "{", "}", "[", "]"
    Bracket(char),
    // "*", "+", "?"
    Postfix(char),
    // "::="
    Define,
    // "|"
    Bar,

    // configured directive texts
    RuleBegin,
    RuleEnd,
    Start,

    // identifier followed by "::="
    RuleName(&'a str),
    Ident(&'a str),

    // quoted text, %s"..." or %x48.69
    Literal(String),
    // %x30-39
    Range(CharRange),
}

impl fmt::Display for Tok<'_> {
    fn fmt(&self, w: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Tok::Bracket(c) | Tok::Postfix(c) => write!(w, "`{}`", c),
            Tok::Define => write!(w, "`::=`"),
            Tok::Bar => write!(w, "`|`"),
            Tok::RuleBegin => write!(w, "rule-begin directive"),
            Tok::RuleEnd => write!(w, "rule-end directive"),
            Tok::Start => write!(w, "start directive"),
            Tok::RuleName(s) => write!(w, "rule head `{}`", s),
            Tok::Ident(s) => write!(w, "`{}`", s),
            Tok::Literal(s) => write!(w, "literal {:?}", s),
            Tok::Range(r) => write!(w, "range {:?}-{:?}", r.lo, r.hi),
        }
    }
}

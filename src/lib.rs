//! Context-free grammars from BNF/EBNF text, and an Earley parser over them.
//!
//! ```text
//! grammar text ──builder──▶ Grammar ──┐
//!                                     ├──earley──▶ ParseResult (trees, or failure)
//! input text ──tokenizer──▶ [Token] ──┘
//! ```
//!
//! A grammar is built once and only read afterwards, so any number of
//! parses may run against it; every parse owns its own chart.

#[macro_use] extern crate lalrpop_util;

pub type Spanned<Tok, Loc, Error> = Result<(Loc, Tok, Loc), Error>;

pub mod builder;
pub mod earley;
pub mod error;
pub mod grammar;
pub mod node;
pub mod symbol;
pub mod tokenizer;

mod luthor;
mod rhs;
mod toyman;

lalrpop_mod!(#[allow(clippy::all, unused)] bnf);

pub use builder::{build_bnf, build_bnf_with_config, build_ebnf, load_bnf, load_ebnf, Config, Dialect};
pub use earley::{parse, ParseFailure, ParseOptions, ParseResult, Parser};
pub use error::{GrammarError, GrammarSemanticError, GrammarSyntaxError, ParseError, ResourceExhausted};
pub use grammar::{Grammar, Production, ProductionId};
pub use node::Node;
pub use symbol::{Symbol, SymbolId, SymbolKind, SymbolTable};
pub use tokenizer::{Token, TokenKind, Tokenizer};

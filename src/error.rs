use std::collections::TryReserveError;

use thiserror::Error;

use crate::grammar::ProductionId;

/// Malformed grammar text. `line` and `column` are 1-based; columns count
/// characters, not bytes.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{line}:{column}: {message}")]
pub struct GrammarSyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl GrammarSyntaxError {
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let (line, column) = line_column(source, offset);
        GrammarSyntaxError { line, column, message: message.into() }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum GrammarSemanticError {
    #[error("grammar has no productions")]
    Empty,
    #[error("no start symbol could be inferred")]
    NoStartSymbol,
    #[error("start symbol `{0}` has no productions")]
    StartWithoutProductions(String),
    #[error("production {production} refers to unknown symbol index {index}")]
    DanglingSymbol { production: ProductionId, index: usize },
    #[error("literal `{0}` is also the name of a rule")]
    LiteralRuleConflict(String),
    #[error("grammar symbols have not been classified")]
    Unclassified,
}

#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("grammar syntax error at {0}")]
    Syntax(#[from] GrammarSyntaxError),
    #[error("invalid grammar: {0}")]
    Semantic(#[from] GrammarSemanticError),
    #[error("grammar io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ResourceExhausted {
    #[error("chart set {position} exceeded the limit of {limit} items")]
    ItemLimit { position: usize, limit: usize },
    #[error("chart allocation failed: {0}")]
    Allocation(#[from] TryReserveError),
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ParseError {
    #[error(transparent)]
    Grammar(#[from] GrammarSemanticError),
    #[error(transparent)]
    Resource(#[from] ResourceExhausted),
}

/// 1-based (line, column) of byte `offset` in `source`. Offsets past the end
/// land just after the last character.
pub(crate) fn line_column(source: &str, offset: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for (i, c) in source.char_indices() {
        if i >= offset { break; }
        if c == '\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

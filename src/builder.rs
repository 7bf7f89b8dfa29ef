//! Builds a [`Grammar`] from BNF or EBNF source text.
//!
//! Source text goes through three stages: luthor carves it into lexemes,
//! toyman turns those into parser tokens, and the generated `bnf` parser
//! produces a list of statements. The statements are then lowered into plain
//! productions here, with every EBNF construct replaced by a synthetic
//! nonterminal:
//!
//! ```text
//! X*  or {X}   R ::= X R | ε
//! X+           P ::= X R        (R as above)
//! X?  or [X]   O ::= X | ε
//! (X | Y)      G ::= X | Y
//! %x30-39      C ::= '0' | ... | '9'
//! ```

use std::path::Path;

use lalrpop_util::ParseError;
use tracing::debug;

use crate::bnf;
use crate::error::{GrammarError, GrammarSemanticError, GrammarSyntaxError};
use crate::grammar::Grammar;
use crate::luthor::{self, Directive};
use crate::rhs::{Alternative, RegularRightSide, Rule, Statement};
use crate::symbol::{SymbolId, SymbolKind};
use crate::toyman::{self, Tok, TokError};

#[cfg(test)]
#[path = "tests/builder.rs"]
mod tests_for_builder;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Dialect { Bnf, Ebnf }

/// Optional directive texts recognized in grammar source. An absent
/// directive is simply not recognized: rule heads are inferred from
/// `name ::=`, rules end at the next rule head, and the start symbol is the
/// first rule defined.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Config {
    /// Optional marker in front of a rule head.
    pub rule_begin_token: Option<String>,
    /// Optional terminator after a rule or a start directive.
    pub rule_end_token: Option<String>,
    /// `START name` selects the start symbol explicitly.
    pub start_token: Option<String>,
    /// Everything after this marker is ignored.
    pub end_token: Option<String>,
    pub line_comment: Option<char>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            rule_begin_token: None,
            rule_end_token: None,
            start_token: None,
            end_token: None,
            line_comment: Some(';'),
        }
    }
}

impl Config {
    pub fn with_rule_begin(mut self, text: impl Into<String>) -> Self { self.rule_begin_token = Some(text.into()); self }
    pub fn with_rule_end(mut self, text: impl Into<String>) -> Self { self.rule_end_token = Some(text.into()); self }
    pub fn with_start(mut self, text: impl Into<String>) -> Self { self.start_token = Some(text.into()); self }
    pub fn with_end(mut self, text: impl Into<String>) -> Self { self.end_token = Some(text.into()); self }
    pub fn with_line_comment(mut self, c: Option<char>) -> Self { self.line_comment = c; self }

    fn lexer<'a>(&self, source: &'a str) -> luthor::Lexer<'a> {
        let directives = [
            (&self.rule_begin_token, Directive::RuleBegin),
            (&self.rule_end_token, Directive::RuleEnd),
            (&self.start_token, Directive::Start),
            (&self.end_token, Directive::End),
        ];
        directives.iter()
            .filter_map(|(text, d)| text.as_deref().map(|t| (t, *d)))
            .fold(luthor::Lexer::new(source).with_line_comment(self.line_comment),
                  |lexer, (text, d)| lexer.with_directive(text, d))
    }
}

pub fn build_bnf(source: &str) -> Result<Grammar, GrammarError> {
    build(source, &Config::default(), Dialect::Bnf)
}

pub fn build_bnf_with_config(source: &str, config: &Config) -> Result<Grammar, GrammarError> {
    build(source, config, Dialect::Bnf)
}

pub fn build_ebnf(source: &str, config: Option<Config>) -> Result<Grammar, GrammarError> {
    build(source, &config.unwrap_or_default(), Dialect::Ebnf)
}

pub fn load_bnf(path: impl AsRef<Path>) -> Result<Grammar, GrammarError> {
    let source = fs_err::read_to_string(path.as_ref())?;
    build_bnf(&source)
}

pub fn load_ebnf(path: impl AsRef<Path>, config: Option<Config>) -> Result<Grammar, GrammarError> {
    let source = fs_err::read_to_string(path.as_ref())?;
    build_ebnf(&source, config)
}

pub fn build(source: &str, config: &Config, dialect: Dialect) -> Result<Grammar, GrammarError> {
    let statements = parse_statements(source, config, dialect)?;
    let mut lowering = Desugar::default();
    let mut rule_count = 0;
    for statement in statements {
        match statement {
            Statement::Rule(rule) => {
                lowering.rule(rule);
                rule_count += 1;
            }
            Statement::Start(name) => {
                let start = lowering.grammar.add_symbol(&name);
                lowering.grammar.set_start(start);
            }
        }
    }
    let grammar = lowering.finish()?;
    debug!(?dialect, rules = rule_count, productions = grammar.productions().len(),
           symbols = grammar.symbols().len(), "built grammar");
    Ok(grammar)
}

pub(crate) fn parse_statements(source: &str, config: &Config, dialect: Dialect) -> Result<Vec<Statement>, GrammarSyntaxError> {
    let tokens = toyman::Lexer::new(config.lexer(source), dialect);
    bnf::GrammarParser::new().parse(tokens).map_err(|e| syntax_error(source, e))
}

fn expects(expected: &[String], terminal: &str) -> bool {
    expected.iter().any(|e| e.trim_matches('"') == terminal)
}

fn unclosed(expected: &[String]) -> Option<&'static str> {
    if expects(expected, ")") {
        Some("unterminated group: expected `)`")
    } else if expects(expected, "}") {
        Some("unterminated repetition: expected `}`")
    } else if expects(expected, "]") {
        Some("unterminated option: expected `]`")
    } else {
        None
    }
}

fn only(expected: &[String], terminal: &str) -> bool {
    expected.len() == 1 && expects(expected, terminal)
}

fn syntax_error(source: &str, e: ParseError<usize, Tok<'_>, TokError>) -> GrammarSyntaxError {
    match e {
        ParseError::InvalidToken { location } => {
            GrammarSyntaxError::at(source, location, "invalid token")
        }
        ParseError::UnrecognizedEOF { location, expected } => {
            let message = if let Some(m) = unclosed(&expected) {
                m.to_string()
            } else if only(&expected, "rule-name") {
                "expected a rule name after the rule-begin directive".to_string()
            } else if only(&expected, "ident") {
                "expected a symbol name after the start directive".to_string()
            } else {
                "unexpected end of grammar".to_string()
            };
            GrammarSyntaxError::at(source, location, message)
        }
        ParseError::UnrecognizedToken { token: (l, tok, _), expected } => {
            let message = match (&tok, unclosed(&expected)) {
                (Tok::Ident(name), _) if only(&expected, "rule-name") => {
                    format!("expected `::=` after rule name `{}`", name)
                }
                (Tok::Postfix(c), _) => {
                    format!("postfix `{}` must follow a symbol or group and cannot be stacked", c)
                }
                _ if only(&expected, "ident") => {
                    format!("expected a symbol name after the start directive, found {}", tok)
                }
                (Tok::Bracket(_) | Tok::RuleName(_) | Tok::RuleEnd | Tok::Start, Some(m)) => {
                    format!("{}, found {}", m, tok)
                }
                _ if expects(&expected, "rule-name") => {
                    format!("unexpected {} at top level; expected a rule head `name ::=`", tok)
                }
                _ => format!("unexpected {}", tok),
            };
            GrammarSyntaxError::at(source, l, message)
        }
        ParseError::ExtraToken { token: (l, tok, _) } => {
            GrammarSyntaxError::at(source, l, format!("unexpected {}", tok))
        }
        ParseError::User { error } => {
            GrammarSyntaxError::at(source, error.offset(), error.to_string())
        }
    }
}

/// Lowers statements into a [`Grammar`], minting synthetic nonterminals for
/// EBNF constructs as they are encountered.
#[derive(Default)]
struct Desugar {
    grammar: Grammar,
    literals: Vec<SymbolId>,
}

impl Desugar {
    fn rule(&mut self, rule: Rule) {
        let lhs = self.grammar.add_symbol(&rule.name);
        // the head is an LHS before any synthetic minted from its body
        let symbols = self.grammar.symbols_mut();
        symbols.mark_as_lhs(lhs);
        symbols.set_kind(lhs, SymbolKind::Nonterminal);
        for alternative in rule.alternatives {
            let rhs = self.alternative(alternative);
            self.grammar.add_production(lhs, &rhs);
        }
    }

    fn alternative(&mut self, alternative: Alternative) -> Vec<SymbolId> {
        let mut rhs = Vec::with_capacity(alternative.0.len());
        for item in alternative.0 {
            self.lower(item, &mut rhs);
        }
        rhs
    }

    fn lower(&mut self, item: RegularRightSide, rhs: &mut Vec<SymbolId>) {
        match item {
            // '' derives nothing
            RegularRightSide::Literal(text) if text.is_empty() => {}
            RegularRightSide::Literal(text) => rhs.push(self.literal(&text)),
            RegularRightSide::Symbol(name) => rhs.push(self.grammar.add_symbol(&name)),
            RegularRightSide::Range(range) => {
                let chars = self.synthetic("range");
                for c in range.chars() {
                    let t = self.literal(c.encode_utf8(&mut [0; 4]));
                    self.grammar.add_production(chars, &[t]);
                }
                rhs.push(chars);
            }
            RegularRightSide::Group(alternatives) => {
                let group = self.synthetic("group");
                for alternative in alternatives {
                    let body = self.alternative(alternative);
                    self.grammar.add_production(group, &body);
                }
                rhs.push(group);
            }
            RegularRightSide::Kleene(inner) => {
                let body = self.operand(*inner);
                rhs.push(self.repetition(&body));
            }
            RegularRightSide::Plus(inner) => {
                let body = self.operand(*inner);
                let rep = self.repetition(&body);
                let plus = self.synthetic("plus");
                let mut first = body;
                first.push(rep);
                self.grammar.add_production(plus, &first);
                rhs.push(plus);
            }
            RegularRightSide::Optional(inner) => {
                let body = self.operand(*inner);
                let opt = self.synthetic("opt");
                self.grammar.add_production(opt, &body);
                self.grammar.add_production(opt, &[]);
                rhs.push(opt);
            }
        }
    }

    /// The symbols a postfix operator applies to: one symbol, or none for an
    /// empty literal.
    fn operand(&mut self, item: RegularRightSide) -> Vec<SymbolId> {
        let mut body = Vec::with_capacity(1);
        self.lower(item, &mut body);
        body
    }

    // R ::= X R | ε
    fn repetition(&mut self, body: &[SymbolId]) -> SymbolId {
        let rep = self.synthetic("rep");
        let mut step = body.to_vec();
        step.push(rep);
        self.grammar.add_production(rep, &step);
        self.grammar.add_production(rep, &[]);
        rep
    }

    fn synthetic(&mut self, suffix: &str) -> SymbolId {
        let id = self.grammar.symbols_mut().create_synthetic(suffix);
        debug!(name = self.grammar.symbols()[id].name(), "created synthetic nonterminal");
        id
    }

    fn literal(&mut self, text: &str) -> SymbolId {
        let id = self.grammar.add_symbol(text);
        if self.grammar.symbols().kind(id) == Some(SymbolKind::Unknown) {
            self.grammar.symbols_mut().set_kind(id, SymbolKind::Terminal);
        }
        self.literals.push(id);
        id
    }

    fn finish(self) -> Result<Grammar, GrammarSemanticError> {
        let Desugar { mut grammar, literals } = self;
        if let Some(&clash) = literals.iter().find(|&&id| grammar.symbol(id).map_or(false, |s| s.is_lhs())) {
            return Err(GrammarSemanticError::LiteralRuleConflict(grammar.symbols()[clash].name().to_string()));
        }
        grammar.classify_symbols();
        grammar.infer_start();
        grammar.validate()?;
        Ok(grammar)
    }
}

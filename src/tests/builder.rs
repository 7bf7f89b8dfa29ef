// This is actually defined at `crate::builder::tests_for_builder`

use crate::builder::*;
use crate::error::{GrammarError, GrammarSemanticError, GrammarSyntaxError};
use crate::grammar::Grammar;
use crate::symbol::SymbolKind;
use crate::tests::{bnf, ebnf};

macro_rules! assert_matches {
    ($e:expr, $p:pat) => {
        let v = $e;
        if let $p = v { } else {
            panic!("assert fail {:?} does not match pattern {}", v, stringify!($p));
        }
    }
}

fn syntax_error(result: Result<Grammar, GrammarError>) -> GrammarSyntaxError {
    match result {
        Err(GrammarError::Syntax(e)) => e,
        other => panic!("expected a syntax error, got {:?}", other),
    }
}

fn start_name(g: &Grammar) -> &str {
    g.name(g.start().unwrap()).unwrap()
}

fn synthetic_count(g: &Grammar) -> usize {
    g.symbols().iter().filter(|(_, s)| s.kind() == SymbolKind::Synthetic).count()
}

#[test]
fn bnf_rules_and_alternatives() {
    let g = bnf("S ::= 'a' T\nT ::= 'b' |");
    assert_eq!(g.productions().len(), 3);
    assert_eq!(start_name(&g), "S");
    let t = g.lookup("T").unwrap();
    let rhs: Vec<usize> = g.productions_for(t).iter().map(|&p| g.production(p).unwrap().rhs().len()).collect();
    assert_eq!(rhs, vec![1, 0]);
    assert_eq!(g.symbols().kind(t), Some(SymbolKind::Nonterminal));
    assert_eq!(g.symbols().kind(g.lookup("a").unwrap()), Some(SymbolKind::Terminal));
    assert!(g.is_classified());
}

#[test]
fn identifiers_never_defined_are_terminals() {
    let g = bnf("<sum> ::= <sum> plus NUMBER | NUMBER");
    assert_eq!(g.symbols().kind(g.lookup("plus").unwrap()), Some(SymbolKind::Terminal));
    assert_eq!(g.symbols().kind(g.lookup("NUMBER").unwrap()), Some(SymbolKind::Terminal));
    assert_eq!(start_name(&g), "sum");
}

#[test]
fn start_inference_follows_rule_order() {
    assert_eq!(start_name(&bnf("A ::= B\nB ::= 'x'")), "A");
    assert_eq!(start_name(&bnf("B ::= 'x'\nA ::= B")), "B");
}

#[test]
fn start_directive() {
    let config = Config::default().with_start("START");
    let g = build_bnf_with_config("A ::= 'a'\nB ::= A\nSTART B", &config).unwrap();
    assert_eq!(start_name(&g), "B");

    let g = build_ebnf("START B\nA ::= 'a'\nB ::= A", Some(config.clone())).unwrap();
    assert_eq!(start_name(&g), "B");

    let e = build_bnf_with_config("A ::= 'a'\nSTART C", &config).unwrap_err();
    assert_matches!(e, GrammarError::Semantic(GrammarSemanticError::StartWithoutProductions(_)));
}

#[test]
fn end_directive_stops_reading() {
    let config = Config::default().with_end("END");
    let g = build_bnf_with_config("A ::= 'a'\nEND\nthis is ( not } a grammar", &config).unwrap();
    assert_eq!(g.productions().len(), 1);
}

#[test]
fn rule_markers() {
    let config = Config::default().with_rule_begin("RULE").with_rule_end(";");
    let g = build_bnf_with_config("RULE A ::= 'a' B ;\nRULE B ::= 'b' | ;\nC ::= A", &config).unwrap();
    assert_eq!(g.productions().len(), 4);
    assert_eq!(start_name(&g), "A");
}

#[test]
fn comments() {
    let g = bnf("; leading comment\nA ::= 'a' ; trailing\n; B ::= 'b'");
    assert_eq!(g.productions().len(), 1);
    assert_eq!(g.lookup("B"), None);

    let config = Config::default().with_line_comment(Some('#'));
    let g = build_ebnf("# comment\nA ::= 'a'*", Some(config)).unwrap();
    assert_eq!(g.productions().len(), 3);
}

#[test]
fn kleene_desugars_to_right_recursion() {
    let g = ebnf("A ::= 'x'*");
    assert_eq!(start_name(&g), "A");
    assert_eq!(synthetic_count(&g), 1);
    let a = g.lookup("A").unwrap();
    let x = g.lookup("x").unwrap();
    let rep = g.production(g.productions_for(a)[0]).unwrap().rhs()[0];
    assert_eq!(g.symbols().kind(rep), Some(SymbolKind::Synthetic));
    assert!(g.name(rep).unwrap().starts_with("__synth_"));
    let bodies: Vec<_> = g.productions_for(rep).iter().map(|&p| g.production(p).unwrap().rhs().to_vec()).collect();
    assert_eq!(bodies, vec![vec![x, rep], vec![]]);
}

#[test]
fn plus_reuses_repetition() {
    let g = ebnf("A ::= 'x'+");
    assert_eq!(synthetic_count(&g), 2);
    assert_eq!(g.productions().len(), 4);
    let a = g.lookup("A").unwrap();
    let x = g.lookup("x").unwrap();
    let plus = g.production(g.productions_for(a)[0]).unwrap().rhs()[0];
    let body = g.production(g.productions_for(plus)[0]).unwrap().rhs().to_vec();
    assert_eq!(body.len(), 2);
    assert_eq!(body[0], x);
    assert_eq!(g.symbols().kind(body[1]), Some(SymbolKind::Synthetic));
}

#[test]
fn brackets_and_groups() {
    // {X} is X*, [X] is X?, (X) is a plain group
    let g = ebnf("A ::= { 'a' | 'b' } [ 'c' ] ( 'd' 'e' | )");
    let a = g.lookup("A").unwrap();
    assert_eq!(g.productions_for(a).len(), 1);
    assert_eq!(g.production(g.productions_for(a)[0]).unwrap().rhs().len(), 3);
    // group+rep for {}, group+opt for [], group for ()
    assert_eq!(synthetic_count(&g), 5);
}

#[test]
fn abnf_literals() {
    let g = ebnf(r#"digit ::= %x30-39
word ::= %s"Hi" %x21"#);
    let digit = g.lookup("digit").unwrap();
    assert_eq!(g.productions_for(digit).len(), 1);
    let range = g.production(g.productions_for(digit)[0]).unwrap().rhs()[0];
    assert_eq!(g.productions_for(range).len(), 10);
    assert!(g.lookup("Hi").is_some());
    assert!(g.lookup("!").is_some());
}

#[test]
fn synthetics_are_never_the_inferred_start() {
    let g = ebnf("A ::= ('x' | 'y')+ B\nB ::= 'z'?");
    assert_eq!(start_name(&g), "A");
}

#[test]
fn empty_grammar() {
    assert_matches!(build_bnf("; nothing here"), Err(GrammarError::Semantic(GrammarSemanticError::Empty)));
}

#[test]
fn literal_that_names_a_rule() {
    assert_matches!(build_bnf("A ::= 'B'\nB ::= 'b'"),
                    Err(GrammarError::Semantic(GrammarSemanticError::LiteralRuleConflict(_))));
}

#[test]
fn bnf_rejects_ebnf_syntax() {
    let e = syntax_error(build_bnf("A ::= 'a'*"));
    assert_eq!((e.line, e.column), (1, 10));
    assert!(e.message.contains("only available in EBNF"), "{}", e.message);

    let e = syntax_error(build_bnf("A ::= ( 'a' )"));
    assert_eq!((e.line, e.column), (1, 7));

    let e = syntax_error(build_bnf("A ::= %x41"));
    assert!(e.message.contains("ABNF"), "{}", e.message);
}

#[test]
fn unterminated_groups() {
    let e = syntax_error(build_ebnf("A ::= ( 'a'", None));
    assert_eq!(e.line, 1);
    assert!(e.message.contains("unterminated group"), "{}", e.message);

    let e = syntax_error(build_ebnf("A ::= ( 'a'\nB ::= 'b'", None));
    assert_eq!((e.line, e.column), (2, 1));
    assert!(e.message.contains("unterminated group"), "{}", e.message);

    let e = syntax_error(build_ebnf("A ::= [ 'a' }", None));
    assert_eq!((e.line, e.column), (1, 13));
    assert!(e.message.contains("expected `]`"), "{}", e.message);
}

#[test]
fn missing_define_after_rule_begin() {
    let config = Config::default().with_rule_begin("RULE");
    let e = syntax_error(build_bnf_with_config("RULE A 'a'", &config));
    assert_eq!((e.line, e.column), (1, 6));
    assert!(e.message.contains("expected `::=` after rule name `A`"), "{}", e.message);
}

#[test]
fn postfix_operators_do_not_stack() {
    let e = syntax_error(build_ebnf("A ::= 'a'*+", None));
    assert_eq!((e.line, e.column), (1, 11));
    assert!(e.message.contains("cannot be stacked"), "{}", e.message);
}

#[test]
fn unexpected_top_level_token() {
    let e = syntax_error(build_ebnf("A ::= 'a'\n)", None));
    assert_eq!((e.line, e.column), (2, 1));
    assert!(e.message.contains("unexpected `)`"), "{}", e.message);
}

#[test]
fn lexical_errors_carry_positions() {
    let e = syntax_error(build_bnf("A ::= 'a'\nB ::= 'b"));
    assert_eq!((e.line, e.column), (2, 7));
    assert!(e.message.contains("unterminated quotation"), "{}", e.message);

    let e = syntax_error(build_bnf("A ::= 'a' := b"));
    assert_eq!((e.line, e.column), (1, 11));
    assert!(e.message.contains("unrecognized character `:`"), "{}", e.message);
}

#[test]
fn loading_from_files() {
    let file = temp_file::with_contents(b"A ::= 'a' A | 'a'");
    let g = load_bnf(file.path()).unwrap();
    assert_eq!(g.productions().len(), 2);

    let file = temp_file::with_contents(b"A ::= 'a'+");
    let g = load_ebnf(file.path(), None).unwrap();
    assert_eq!(synthetic_count(&g), 2);

    let missing = file.path().with_extension("missing");
    let e = load_bnf(&missing).unwrap_err();
    assert_matches!(&e, GrammarError::Io(_));
    assert!(e.to_string().contains("missing"), "{}", e);
}

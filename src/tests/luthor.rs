// This is actually defined at `crate::luthor::tests_for_luthor`

use crate::luthor::*;
use crate::rhs::CharRange;

fn lex(s: &str) -> Vec<Result<Lexeme<'_>, LexicalError>> {
    Lexer::new(s).with_line_comment(Some(';')).map(|r| r.map(|(_, tok, _)| tok)).collect()
}

fn lex_oks(s: &str) -> Vec<Lexeme<'_>> {
    lex(s).into_iter().filter_map(|r| r.ok()).collect()
}

fn quoted(s: &str) -> Lexeme<'static> { Lexeme::Quoted(s.to_string()) }

#[test]
fn lexing_basics() {
    assert!(lex("").is_empty());
    assert_eq!(lex_oks("a"), vec![Lexeme::Ident("a")]);
    assert_eq!(lex_oks("expr ::= term | expr '+' term"), vec![
        Lexeme::Ident("expr"), Lexeme::Define, Lexeme::Ident("term"), Lexeme::Bar,
        Lexeme::Ident("expr"), quoted("+"), Lexeme::Ident("term"),
    ]);
    assert_eq!(lex_oks("postal-address ::= name_part"), vec![
        Lexeme::Ident("postal-address"), Lexeme::Define, Lexeme::Ident("name_part"),
    ]);
}

#[test]
fn angle_identifiers() {
    assert_eq!(lex_oks("<postal address> ::= <name>"), vec![
        Lexeme::Ident("postal address"), Lexeme::Define, Lexeme::Ident("name"),
    ]);
    assert_eq!(lex("<oops"), vec![Err(LexicalError::UnterminatedAngle(0))]);
}

#[test]
fn quotations() {
    assert_eq!(lex_oks(r#"'a' "b c" '"' "'""#), vec![quoted("a"), quoted("b c"), quoted("\""), quoted("'")]);
    assert_eq!(lex_oks(r#""\n\t\\\"""#), vec![quoted("\n\t\\\"")]);
    assert_eq!(lex(r#"x 'abc"#), vec![Ok(Lexeme::Ident("x")), Err(LexicalError::UnterminatedQuote(2))]);
    assert_eq!(lex(r#"'\q'"#)[0], Err(LexicalError::UnknownEscape(1, 'q')));
}

#[test]
fn punctuation_and_operators() {
    assert_eq!(lex_oks("( ) { } [ ] * + ?"), vec![
        Lexeme::Bracket('('), Lexeme::Bracket(')'),
        Lexeme::Bracket('{'), Lexeme::Bracket('}'),
        Lexeme::Bracket('['), Lexeme::Bracket(']'),
        Lexeme::Postfix('*'), Lexeme::Postfix('+'), Lexeme::Postfix('?'),
    ]);
    assert_eq!(lex("a := b")[1], Err(LexicalError::UnrecognizedChar(2, ':')));
    assert_eq!(lex("⟨a⟩")[0], Err(LexicalError::UnsupportedBracket(0, '⟨')));
}

#[test]
fn comments_are_skipped() {
    assert_eq!(lex_oks("a ; the rest is ignored\nb"), vec![Lexeme::Ident("a"), Lexeme::Ident("b")]);
    let lexemes: Vec<_> = Lexer::new("a # b").with_line_comment(Some('#')).filter_map(|r| r.ok()).map(|(_, t, _)| t).collect();
    assert_eq!(lexemes, vec![Lexeme::Ident("a")]);
}

#[test]
fn abnf_literals() {
    assert_eq!(lex_oks(r#"%s"Hi""#), vec![Lexeme::Abnf("Hi".to_string())]);
    assert_eq!(lex_oks("%x48.69"), vec![Lexeme::Abnf("Hi".to_string())]);
    assert_eq!(lex_oks("%d72.105"), vec![Lexeme::Abnf("Hi".to_string())]);
    assert_eq!(lex_oks("%b1000001"), vec![Lexeme::Abnf("A".to_string())]);
    assert_eq!(lex_oks("%x30-39"), vec![Lexeme::Range(CharRange { lo: '0', hi: '9' })]);
    assert_eq!(lex("%q"), vec![Err(LexicalError::InvalidNumeric(0))]);
    assert_eq!(lex("%x39-30"), vec![Err(LexicalError::InvalidNumeric(0))]);
    assert_eq!(lex("%x0-1000"), vec![Err(LexicalError::RangeTooWide(0))]);
}

#[test]
fn directives() {
    let lexer = |s| Lexer::new(s)
        .with_directive("RULE", Directive::RuleBegin)
        .with_directive(".", Directive::RuleEnd)
        .with_directive("START", Directive::Start)
        .with_directive("END", Directive::End)
        .with_directive("", Directive::End);
    let lexemes: Vec<_> = lexer("START s . RULE s ::= 'a' . END").map(|r| r.map(|(_, t, _)| t)).collect();
    assert_eq!(lexemes, vec![
        Ok(Lexeme::Directive(Directive::Start)), Ok(Lexeme::Ident("s")), Ok(Lexeme::Directive(Directive::RuleEnd)),
        Ok(Lexeme::Directive(Directive::RuleBegin)), Ok(Lexeme::Ident("s")), Ok(Lexeme::Define), Ok(quoted("a")),
        Ok(Lexeme::Directive(Directive::RuleEnd)), Ok(Lexeme::Directive(Directive::End)),
    ]);
    // word-like directives need a word boundary
    let lexemes: Vec<_> = lexer("STARTER ENDING END_X RULE-X").filter_map(|r| r.ok()).map(|(_, t, _)| t).collect();
    assert_eq!(lexemes, vec![
        Lexeme::Ident("STARTER"), Lexeme::Ident("ENDING"), Lexeme::Ident("END_X"), Lexeme::Ident("RULE-X"),
    ]);
}

#[test]
fn directives_beat_comments() {
    let lexemes: Vec<_> = Lexer::new("a ::= b ; c ::= d ;")
        .with_line_comment(Some(';'))
        .with_directive(";", Directive::RuleEnd)
        .filter_map(|r| r.ok()).map(|(_, t, _)| t).collect();
    assert_eq!(lexemes.iter().filter(|t| **t == Lexeme::Directive(Directive::RuleEnd)).count(), 2);
    assert_eq!(lexemes.len(), 8);
}

#[test]
fn spans() {
    let spans: Vec<_> = Lexer::new("ab ::= 'c'").filter_map(|r| r.ok()).map(|(i, _, j)| (i, j)).collect();
    assert_eq!(spans, vec![(0, 2), (3, 6), (7, 10)]);
}

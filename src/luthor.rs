//! Luthor is the character-level lexer for grammar source text. It knows
//! nothing about rules; it only carves the text into lexemes:
//!
//! 1. directives: the configured rule-begin, rule-end, start and end texts.
//! These are checked first at every position, longest text first; a text
//! ending in a word character only matches at a word boundary.
//!
//! 2. identifiers: `[A-Za-z_][A-Za-z0-9_-]*`, or any name written between
//! angle brackets as in classic BNF (`<postal-address>`).
//!
//! 3. quotations: `'...'` or `"..."` with backslash escapes, yielding the
//! unescaped content.
//!
//! 4. ABNF literals: `%s"..."`, and `%d`, `%x`, `%b` numeric characters
//! joined by `.` (`%x48.69`) or spanning a range (`%x30-39`).
//!
//! 5. punctuation: `::=`, `|`, the ASCII brackets and the postfix operators.
//!
//! Whitespace and line comments are skipped.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;
use unicode_brackets::UnicodeBrackets;

use crate::rhs::CharRange;
use crate::Spanned;

#[cfg(test)]
#[path = "tests/luthor.rs"]
mod tests_for_luthor;

/// Widest character range a single `%x..-..` literal may span.
pub(crate) const MAX_RANGE_WIDTH: u32 = 256;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Directive { RuleBegin, RuleEnd, Start, End }

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Lexeme<'a> {
    Ident(&'a str),
    Quoted(String),
    Abnf(String),
    Range(CharRange),
    Define,
    Bar,
    Bracket(char),
    Postfix(char),
    Directive(Directive),
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum LexicalError {
    #[error("unterminated quotation")]
    UnterminatedQuote(usize),
    #[error("no character after backslash")]
    NoCharAfterBackslash(usize),
    #[error("unknown escape `\\{1}`")]
    UnknownEscape(usize, char),
    #[error("unterminated `<` identifier")]
    UnterminatedAngle(usize),
    #[error("unrecognized character `{1}`")]
    UnrecognizedChar(usize, char),
    #[error("unsupported bracket `{1}`")]
    UnsupportedBracket(usize, char),
    #[error("malformed numeric literal")]
    InvalidNumeric(usize),
    #[error("character range wider than {} code points", MAX_RANGE_WIDTH)]
    RangeTooWide(usize),
}

impl LexicalError {
    pub fn offset(&self) -> usize {
        match *self {
            LexicalError::UnterminatedQuote(i) |
            LexicalError::NoCharAfterBackslash(i) |
            LexicalError::UnknownEscape(i, _) |
            LexicalError::UnterminatedAngle(i) |
            LexicalError::UnrecognizedChar(i, _) |
            LexicalError::UnsupportedBracket(i, _) |
            LexicalError::InvalidNumeric(i) |
            LexicalError::RangeTooWide(i) => i,
        }
    }
}

pub struct Lexer<'input> {
    input: &'input str,
    chars: Peekable<CharIndices<'input>>,
    directives: Vec<(String, Directive)>,
    line_comment: Option<char>,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self {
        Lexer { input, chars: input.char_indices().peekable(), directives: vec![], line_comment: None }
    }

    pub fn with_line_comment(mut self, c: Option<char>) -> Self {
        self.line_comment = c;
        self
    }

    /// Registers `text` as the spelling of `directive`. Empty texts are
    /// ignored.
    pub fn with_directive(mut self, text: &str, directive: Directive) -> Self {
        if !text.is_empty() {
            self.directives.push((text.to_string(), directive));
            self.directives.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        }
        self
    }

    fn pos(&mut self) -> usize {
        self.chars.peek().map(|(i, _)| *i).unwrap_or(self.input.len())
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn skip_to(&mut self, end: usize) {
        while self.pos() < end {
            self.chars.next();
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'input str {
        let start = self.pos();
        while let Some(c) = self.peek_char() {
            if !pred(c) { break; }
            self.chars.next();
        }
        let end = self.pos();
        let input = self.input;
        &input[start..end]
    }

    fn directive_at(&self, i: usize) -> Option<(Directive, usize)> {
        let rest = &self.input[i..];
        self.directives.iter()
            .filter(|(text, _)| rest.starts_with(text.as_str()))
            .find(|(text, _)| {
                let ends_in_word = text.chars().last().map_or(false, is_word_char);
                !ends_in_word || !rest[text.len()..].chars().next().map_or(false, is_ident_char)
            })
            .map(|(text, d)| (*d, text.len()))
    }

    fn read_quoted(&mut self, start: usize, quote: char) -> Result<(usize, Lexeme<'input>, usize), LexicalError> {
        let content = self.read_quoted_content(start, quote)?;
        Ok((start, Lexeme::Quoted(content), self.pos()))
    }

    fn read_quoted_content(&mut self, start: usize, quote: char) -> Result<String, LexicalError> {
        let mut buf = String::new();
        loop {
            let (i, c) = self.chars.next().ok_or(LexicalError::UnterminatedQuote(start))?;
            if c == quote {
                return Ok(buf);
            }
            if c != '\\' {
                buf.push(c);
                continue;
            }
            let (_, e) = self.chars.next().ok_or(LexicalError::NoCharAfterBackslash(i))?;
            buf.push(match e {
                '\\' | '"' | '\'' => e,
                'n' => '\n',
                't' => '\t',
                'r' => '\r',
                e => return Err(LexicalError::UnknownEscape(i, e)),
            });
        }
    }

    fn read_angle(&mut self, start: usize) -> Result<(usize, Lexeme<'input>, usize), LexicalError> {
        let inner = self.take_while(|c| c != '>' && c != '\n');
        if self.peek_char() != Some('>') || inner.trim().is_empty() {
            return Err(LexicalError::UnterminatedAngle(start));
        }
        self.chars.next();
        Ok((start, Lexeme::Ident(inner.trim()), self.pos()))
    }

    fn read_abnf(&mut self, start: usize) -> Result<(usize, Lexeme<'input>, usize), LexicalError> {
        let radix = match self.chars.next() {
            Some((_, 's')) | Some((_, 'S')) => {
                if self.chars.next().map(|(_, c)| c) != Some('"') {
                    return Err(LexicalError::InvalidNumeric(start));
                }
                let content = self.read_quoted_content(start, '"')?;
                return Ok((start, Lexeme::Abnf(content), self.pos()));
            }
            Some((_, 'd')) | Some((_, 'D')) => 10,
            Some((_, 'x')) | Some((_, 'X')) => 16,
            Some((_, 'b')) | Some((_, 'B')) => 2,
            _ => return Err(LexicalError::InvalidNumeric(start)),
        };
        let first = self.read_code_point(start, radix)?;
        match self.peek_char() {
            Some('-') => {
                self.chars.next();
                let last = self.read_code_point(start, radix)?;
                if last < first {
                    return Err(LexicalError::InvalidNumeric(start));
                }
                if (last as u32) - (first as u32) >= MAX_RANGE_WIDTH {
                    return Err(LexicalError::RangeTooWide(start));
                }
                Ok((start, Lexeme::Range(CharRange { lo: first, hi: last }), self.pos()))
            }
            _ => {
                let mut text = String::new();
                text.push(first);
                while self.peek_char() == Some('.') {
                    self.chars.next();
                    text.push(self.read_code_point(start, radix)?);
                }
                Ok((start, Lexeme::Abnf(text), self.pos()))
            }
        }
    }

    fn read_code_point(&mut self, start: usize, radix: u32) -> Result<char, LexicalError> {
        let digits = self.take_while(|c| c.is_digit(radix));
        u32::from_str_radix(digits, radix).ok()
            .and_then(char::from_u32)
            .ok_or(LexicalError::InvalidNumeric(start))
    }
}

fn is_word_char(c: char) -> bool { c.is_alphanumeric() || c == '_' }
fn is_ident_char(c: char) -> bool { is_word_char(c) || c == '-' }

impl<'input> Iterator for Lexer<'input> {
    type Item = Spanned<Lexeme<'input>, usize, LexicalError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (i, c) = self.chars.peek().copied()?;
            if c.is_whitespace() {
                self.chars.next();
                continue;
            }
            if let Some((d, len)) = self.directive_at(i) {
                self.skip_to(i + len);
                return Some(Ok((i, Lexeme::Directive(d), i + len)));
            }
            if Some(c) == self.line_comment {
                self.take_while(|c| c != '\n');
                continue;
            }
            self.chars.next();
            let single = |lexeme| Some(Ok((i, lexeme, i + c.len_utf8())));
            return match c {
                '\'' | '"' => Some(self.read_quoted(i, c)),
                '<' => Some(self.read_angle(i)),
                '%' => Some(self.read_abnf(i)),
                ':' if self.input[i..].starts_with("::=") => {
                    self.skip_to(i + 3);
                    Some(Ok((i, Lexeme::Define, i + 3)))
                }
                '|' => single(Lexeme::Bar),
                '*' | '+' | '?' => single(Lexeme::Postfix(c)),
                '(' | ')' | '{' | '}' | '[' | ']' => single(Lexeme::Bracket(c)),
                c if c.is_alphabetic() || c == '_' => {
                    let input = self.input;
                    self.take_while(is_ident_char);
                    let end = self.pos();
                    Some(Ok((i, Lexeme::Ident(&input[i..end]), end)))
                }
                c if c.is_open_bracket() || c.is_close_bracket() => {
                    Some(Err(LexicalError::UnsupportedBracket(i, c)))
                }
                c => Some(Err(LexicalError::UnrecognizedChar(i, c))),
            };
        }
    }
}

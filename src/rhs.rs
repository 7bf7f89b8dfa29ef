//! Syntax tree of grammar source text, as produced by the generated parser
//! and consumed by the builder.

// Regular right sides
//
// r ::= A                <symbol reference>
//    |  'text'           <literal>
//    |  %x30-39          <character range>
//    |  (a | ... | a)    <group>
//    |  r*  or {a|...}   <zero or more>
//    |  r+               <one or more>
//    |  r?  or [a|...]   <zero or one>
//
// where an alternative `a` is a possibly empty sequence `r r ... r`.

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Statement {
    Rule(Rule),
    Start(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Rule {
    pub name: String,
    pub alternatives: Vec<Alternative>,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Alternative(pub Vec<RegularRightSide>);

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CharRange {
    pub lo: char,
    pub hi: char,
}

impl CharRange {
    pub fn chars(self) -> impl Iterator<Item=char> {
        self.lo..=self.hi
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RegularRightSide {
    Symbol(String),
    Literal(String),
    Range(CharRange),
    Group(Vec<Alternative>),
    Kleene(Box<Self>),
    Plus(Box<Self>),
    Optional(Box<Self>),
}

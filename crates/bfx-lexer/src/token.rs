/// Source location span
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub line: usize,
    pub column: usize,
}

/// All token types in bfx
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    // Literals
    Number,       // 42
    Char,         // 'a'
    StringLit,    // "hello"
    Word,         // identifiers

    // Arithmetic operators
    Add,          // +
    Sub,          // -
    Mul,          // *
    Div,          // /
    Mod,          // %
    AddSelf,      // ++
    SubSelf,      // --

    // Compound assignment
    CompositeAdd, // +=
    CompositeSub, // -=
    CompositeMul, // *=
    CompositeDiv, // /=
    CompositeMod, // %=
    DivMod,       // /=%
    ModDiv,       // %=/

    // Comparison
    Gt,           // >
    Lt,           // <
    GtEq,         // >=
    LtEq,         // <=
    Eq,           // ==
    NotEq,        // !=

    // Logical
    Not,          // !
    Also,         // &&
    Perhaps,      // ||

    // Assignment & access
    Assignment,   // =
    Dot,          // .
    Hash,         // #

    // Delimiters
    LParen,       // (
    RParen,       // )
    LBrace,       // {
    RBrace,       // }
    LBracket,     // [
    RBracket,     // ]
    Comma,        // ,
    Semicolon,    // ;

    // Keywords
    Function,
    Let,
    Const,
    Struct,
    If,
    Else,
    For,
    While,
    SizeOf,
    Bf,

    // Special
    Eof,          // end of file
}

/// Semantic value attached to literal and identifier tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Identifier or string text
    Text(String),
    /// Unsigned 8-bit number parsed from digits
    Byte(u8),
    /// Single character
    Char(u8),
}

/// A single token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub value: String,
    pub literal: Option<Literal>,
    pub span: Span,
}

impl Token {
    /// Numeric or character payload as a byte, if this token carries one.
    pub fn byte(&self) -> Option<u8> {
        match self.literal {
            Some(Literal::Byte(b)) | Some(Literal::Char(b)) => Some(b),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.literal {
            Some(Literal::Text(s)) => Some(s),
            _ => None,
        }
    }
}

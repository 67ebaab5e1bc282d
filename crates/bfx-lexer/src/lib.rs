mod token;
mod lexer;

pub use token::{Literal, Token, TokenType, Span};
pub use lexer::{LexError, Lexer};

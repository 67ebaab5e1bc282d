//! Integration tests for the bfx lexer on complete programs.

use bfx_lexer::{Lexer, Literal, Token, TokenType};

fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize().expect("lexer should succeed")
}

fn types(tokens: &[Token]) -> Vec<TokenType> {
    tokens.iter().map(|t| t.token_type).collect()
}

#[test]
fn full_program() {
    let src = r#"
const SIZE = 5;

struct Point {
    x;
    [2] y;
};

function r = sum(arr) {
    let r = 0;
    for (let i = 0; i < sizeof(arr); ++i)
        r += arr[i];
}

function main() {
    let [SIZE] values = #{1, 2, 3, 4, 5};
    let total = sum(values);
    if (total >= 15 && total != 0) {
        bf(total, "[-]");
    } else {
        total = 'x';
    }
}
"#;
    let tokens = lex(src);
    assert_eq!(tokens.last().map(|t| t.token_type), Some(TokenType::Eof));

    let functions = tokens
        .iter()
        .filter(|t| t.token_type == TokenType::Function)
        .count();
    assert_eq!(functions, 2);

    let bf = tokens.iter().position(|t| t.token_type == TokenType::Bf).unwrap();
    assert_eq!(
        types(&tokens[bf..bf + 6]),
        vec![
            TokenType::Bf,
            TokenType::LParen,
            TokenType::Word,
            TokenType::Comma,
            TokenType::StringLit,
            TokenType::RParen,
        ]
    );
    assert_eq!(tokens[bf + 4].literal, Some(Literal::Text("[-]".to_string())));
}

#[test]
fn array_literal_tokens() {
    let tokens = lex("#{1, 'a'} #[4, 0]");
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Hash,
            TokenType::LBrace,
            TokenType::Number,
            TokenType::Comma,
            TokenType::Char,
            TokenType::RBrace,
            TokenType::Hash,
            TokenType::LBracket,
            TokenType::Number,
            TokenType::Comma,
            TokenType::Number,
            TokenType::RBracket,
            TokenType::Eof,
        ]
    );
}

#[test]
fn member_access_and_postfix() {
    let tokens = lex("p.y[1]++;");
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Word,
            TokenType::Dot,
            TokenType::Word,
            TokenType::LBracket,
            TokenType::Number,
            TokenType::RBracket,
            TokenType::AddSelf,
            TokenType::Semicolon,
            TokenType::Eof,
        ]
    );
}

#[test]
fn error_reports_location() {
    let err = Lexer::new("let x;\nlet y = 300;").tokenize().unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("line 2"), "unexpected message: {msg}");
}

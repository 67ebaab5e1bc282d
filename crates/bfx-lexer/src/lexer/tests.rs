use super::*;
use crate::token::TokenType;

fn lex(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize().expect("lexer should succeed")
}

fn types(tokens: &[Token]) -> Vec<TokenType> {
    tokens.iter().map(|t| t.token_type).collect()
}

#[test]
fn empty_source() {
    let tokens = lex("");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token_type, TokenType::Eof);
}

#[test]
fn number_literal() {
    let tokens = lex("42");
    assert_eq!(types(&tokens), vec![TokenType::Number, TokenType::Eof]);
    assert_eq!(tokens[0].byte(), Some(42));
}

#[test]
fn number_out_of_range() {
    assert!(Lexer::new("256").tokenize().is_err());
    assert_eq!(lex("255")[0].byte(), Some(255));
}

#[test]
fn string_literal() {
    let tokens = lex("\"hello\"");
    assert_eq!(types(&tokens), vec![TokenType::StringLit, TokenType::Eof]);
    assert_eq!(tokens[0].text(), Some("hello"));
}

#[test]
fn string_with_escape() {
    let tokens = lex(r#""a\"b\n""#);
    assert_eq!(tokens[0].text(), Some("a\"b\n"));
}

#[test]
fn unclosed_string_error() {
    assert!(Lexer::new("\"hello").tokenize().is_err());
}

#[test]
fn char_literals() {
    let tokens = lex(r"'a' '\n' '\''");
    assert_eq!(tokens[0].byte(), Some(b'a'));
    assert_eq!(tokens[1].byte(), Some(b'\n'));
    assert_eq!(tokens[2].byte(), Some(b'\''));
    assert_eq!(tokens[0].token_type, TokenType::Char);
}

#[test]
fn malformed_char_literal() {
    assert!(Lexer::new("'ab'").tokenize().is_err());
    assert!(Lexer::new("''").tokenize().is_err());
}

#[test]
fn keywords() {
    let tokens = lex("function let const struct if else for while sizeof bf");
    let expected = vec![
        TokenType::Function,
        TokenType::Let,
        TokenType::Const,
        TokenType::Struct,
        TokenType::If,
        TokenType::Else,
        TokenType::For,
        TokenType::While,
        TokenType::SizeOf,
        TokenType::Bf,
        TokenType::Eof,
    ];
    assert_eq!(types(&tokens), expected);
}

#[test]
fn identifiers_carry_text() {
    let tokens = lex("main _tmp x1");
    assert!(tokens[..3].iter().all(|t| t.token_type == TokenType::Word));
    assert_eq!(tokens[1].text(), Some("_tmp"));
}

#[test]
fn divmod_operators() {
    let tokens = lex("a /=% b %=/ c /= d %= e");
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Word,
            TokenType::DivMod,
            TokenType::Word,
            TokenType::ModDiv,
            TokenType::Word,
            TokenType::CompositeDiv,
            TokenType::Word,
            TokenType::CompositeMod,
            TokenType::Word,
            TokenType::Eof,
        ]
    );
}

#[test]
fn increments_and_compounds() {
    let tokens = lex("++ -- += -= *=");
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::AddSelf,
            TokenType::SubSelf,
            TokenType::CompositeAdd,
            TokenType::CompositeSub,
            TokenType::CompositeMul,
            TokenType::Eof,
        ]
    );
}

#[test]
fn comparisons_and_logic() {
    let tokens = lex("< <= > >= == != ! && ||");
    assert_eq!(
        types(&tokens),
        vec![
            TokenType::Lt,
            TokenType::LtEq,
            TokenType::Gt,
            TokenType::GtEq,
            TokenType::Eq,
            TokenType::NotEq,
            TokenType::Not,
            TokenType::Also,
            TokenType::Perhaps,
            TokenType::Eof,
        ]
    );
}

#[test]
fn single_ampersand_is_an_error() {
    assert!(Lexer::new("a & b").tokenize().is_err());
}

#[test]
fn comments_are_skipped() {
    let tokens = lex("x // line comment\n/* block\ncomment */ y");
    assert_eq!(types(&tokens), vec![TokenType::Word, TokenType::Word, TokenType::Eof]);
    assert_eq!(tokens[1].span.line, 3);
}

#[test]
fn unterminated_block_comment() {
    assert!(Lexer::new("/* never closed").tokenize().is_err());
}

#[test]
fn spans_track_lines_and_columns() {
    let tokens = lex("let x;\n  x = 1;");
    assert_eq!(tokens[0].span, Span { line: 1, column: 1 });
    assert_eq!(tokens[3].span, Span { line: 2, column: 3 });
}

#[test]
fn illegal_character() {
    let err = Lexer::new("let $x;").tokenize().unwrap_err();
    assert!(err.to_string().contains("illegal token '$'"));
}

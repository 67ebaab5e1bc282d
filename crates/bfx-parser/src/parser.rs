use bfx_codegen::instr::*;
use bfx_codegen::{FieldSpec, Function, Item, Program, SizeSpec, TypeSpec};
use bfx_lexer::{Span, Token, TokenType};

mod exprs;
mod stmts;

/// Recursive-descent parser for bfx.
///
/// Produces a [`Program`] whose function bodies and global initializers are
/// instruction trees; nothing is resolved until the compiler runs them.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

/// What follows `let`: the name and how its type was written.
enum Declaration {
    Typed { name: String, ty: TypeSpec },
    /// `[] name`, sized by its initializer.
    Placeholder { name: String },
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Parse all tokens into a Program
    pub fn parse(&mut self) -> Result<Program, ParseError> {
        let mut items = Vec::new();
        while !self.is_at_end() {
            if let Some(item) = self.item()? {
                items.push(item);
            }
        }
        Ok(Program { items })
    }

    // ── Token navigation ─────────────────────────────────────

    fn current(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn current_type(&self) -> TokenType {
        self.current().token_type
    }

    fn current_span(&self) -> Span {
        self.current().span
    }

    fn peek_type_at(&self, offset: usize) -> TokenType {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        self.tokens[idx].token_type
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check(&self, expected: TokenType) -> bool {
        self.current_type() == expected
    }

    /// Consume the current token if it has the given type.
    fn eat(&mut self, expected: TokenType) -> bool {
        if self.check(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: TokenType) -> Result<Token, ParseError> {
        let tok = self.advance().clone();
        if tok.token_type != expected {
            return Err(self.error_at(
                tok.span,
                format!("expected {:?}, found {:?} '{}'", expected, tok.token_type, tok.value),
            ));
        }
        Ok(tok)
    }

    fn expect_word(&mut self) -> Result<String, ParseError> {
        Ok(self.expect(TokenType::Word)?.value)
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len() || self.current_type() == TokenType::Eof
    }

    fn error_at(&self, span: Span, message: String) -> ParseError {
        ParseError::Error {
            line: span.line,
            column: span.column,
            message,
        }
    }

    fn unexpected(&self, context: &str) -> ParseError {
        let tok = self.current();
        self.error_at(
            tok.span,
            format!("unexpected '{}' ({:?}), expected {}", tok.value, tok.token_type, context),
        )
    }

    // ── Items ────────────────────────────────────────────────
    // <Item> ::= const | struct | let | function | ;

    fn item(&mut self) -> Result<Option<Item>, ParseError> {
        let span = self.current_span();
        match self.current_type() {
            TokenType::Const => self.const_item().map(Some),
            TokenType::Struct => self.struct_item().map(Some),
            TokenType::Function => self.function_item().map(Some),
            TokenType::Let => {
                let decl = self.let_statement()?;
                self.expect(TokenType::Semicolon)?;
                Ok(Some(Item::Global(statement(decl, span))))
            }
            TokenType::Semicolon => {
                self.advance();
                Ok(None)
            }
            _ => Err(self.unexpected("const/struct/let/function")),
        }
    }

    // const NAME = NUM;
    fn const_item(&mut self) -> Result<Item, ParseError> {
        let span = self.expect(TokenType::Const)?.span;
        let name = self.expect_word()?;
        self.expect(TokenType::Assignment)?;
        let tok = self.advance().clone();
        let value = match (tok.token_type, tok.byte()) {
            (TokenType::Number | TokenType::Char, Some(value)) => value,
            _ => {
                return Err(self.error_at(
                    tok.span,
                    format!("constant \"{}\" must be initialized with a number", name),
                ));
            }
        };
        self.expect(TokenType::Semicolon)?;
        Ok(Item::Const { name, value, span })
    }

    // struct Name { field; [N] field; Other field; };
    fn struct_item(&mut self) -> Result<Item, ParseError> {
        let span = self.expect(TokenType::Struct)?.span;
        let name = self.expect_word()?;
        self.expect(TokenType::LBrace)?;

        let mut fields = Vec::new();
        while !self.check(TokenType::RBrace) {
            if self.is_at_end() {
                return Err(self.unexpected("'}' to close the struct"));
            }
            let field_span = self.current_span();
            match self.declaration()? {
                Declaration::Typed { name, ty } => fields.push(FieldSpec { name, ty }),
                Declaration::Placeholder { name } => {
                    return Err(self.error_at(
                        field_span,
                        format!("field \"{}\" cannot have a placeholder size", name),
                    ));
                }
            }
            self.expect(TokenType::Semicolon)?;
        }
        self.expect(TokenType::RBrace)?;
        self.eat(TokenType::Semicolon);

        if fields.is_empty() {
            return Err(self.error_at(span, format!("struct \"{}\" has no fields", name)));
        }
        Ok(Item::Struct { name, fields, span })
    }

    // function [ret =] name(a, b) { ... }
    fn function_item(&mut self) -> Result<Item, ParseError> {
        let span = self.expect(TokenType::Function)?.span;
        let first = self.expect_word()?;
        let (return_var, name) = if self.eat(TokenType::Assignment) {
            (Some(first), self.expect_word()?)
        } else {
            (None, first)
        };

        self.expect(TokenType::LParen)?;
        let mut params = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                params.push(self.expect_word()?);
                if !self.eat(TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenType::RParen)?;

        if !self.check(TokenType::LBrace) {
            return Err(self.unexpected("'{' to open the function body"));
        }
        let body = self.block()?;

        Ok(Item::Function(Function {
            name,
            params,
            return_var,
            body,
            span,
        }))
    }

    // ── Declarations ─────────────────────────────────────────
    // <Decl> ::= name | [N] name | [] name | Type name

    fn declaration(&mut self) -> Result<Declaration, ParseError> {
        if self.eat(TokenType::LBracket) {
            if self.eat(TokenType::RBracket) {
                let name = self.expect_word()?;
                return Ok(Declaration::Placeholder { name });
            }
            let size = self.size()?;
            self.expect(TokenType::RBracket)?;
            let name = self.expect_word()?;
            return Ok(Declaration::Typed {
                name,
                ty: TypeSpec::Int(size),
            });
        }

        let first = self.expect_word()?;
        if self.check(TokenType::Word) {
            let name = self.expect_word()?;
            return Ok(Declaration::Typed {
                name,
                ty: TypeSpec::Struct(first),
            });
        }
        Ok(Declaration::Typed {
            name: first,
            ty: TypeSpec::scalar(),
        })
    }

    /// Size inside brackets: a number or a constant's name.
    fn size(&mut self) -> Result<SizeSpec, ParseError> {
        let tok = self.advance().clone();
        match tok.token_type {
            TokenType::Number => Ok(SizeSpec::Literal(tok.byte().unwrap_or_default())),
            TokenType::Word => Ok(SizeSpec::Const(tok.value)),
            _ => Err(self.error_at(
                tok.span,
                format!("expected a size (number or constant), found '{}'", tok.value),
            )),
        }
    }

    /// `let decl [= expr]`, without the terminator.
    fn let_statement(&mut self) -> Result<Instr, ParseError> {
        let span = self.expect(TokenType::Let)?.span;
        let declaration = self.declaration()?;

        match declaration {
            Declaration::Placeholder { name } => {
                if !self.eat(TokenType::Assignment) {
                    return Err(self.error_at(
                        span,
                        format!("placeholder declaration of \"{}\" needs an initializer", name),
                    ));
                }
                let value = self.expression()?;
                Ok(Box::new(DeclarePlaceholder { name, value }))
            }
            Declaration::Typed { name, ty } => {
                let target: Instr = Box::new(Declare { name, ty });
                if self.eat(TokenType::Assignment) {
                    let value = self.expression()?;
                    Ok(Box::new(Assign { target, value }))
                } else {
                    Ok(target)
                }
            }
        }
    }
}

/// Wrap an instruction as a statement at `span`.
fn statement(inner: Instr, span: Span) -> Instr {
    Box::new(Statement { inner, span })
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Parse error at line {line}, column {column}: {message}")]
    Error {
        line: usize,
        column: usize,
        message: String,
    },
}

// ── Tests ────────────────────────────────────────────────────

#[cfg(test)]
mod tests;

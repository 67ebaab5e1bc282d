use crate::token::{Literal, Token, TokenType, Span};

/// Lexer for bfx source code
pub struct Lexer {
    source: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Tokenize the entire source and return the token list
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        while self.pos < self.source.len() {
            let ch = self.source[self.pos];
            match ch {
                // Whitespace (skip)
                ' ' | '\t' | '\r' => {
                    self.advance();
                }
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.column = 1;
                }

                '"' => self.read_string(),
                '\'' => self.read_char(),
                '0'..='9' => self.read_number(),
                'a'..='z' | 'A'..='Z' | '_' => self.read_identifier_or_keyword(),

                // Operators and delimiters
                '+' => self.read_plus(),
                '-' => self.read_minus(),
                '*' => self.read_star(),
                '/' => self.read_slash(),
                '%' => self.read_percent(),
                '!' => self.read_bang(),
                '>' => self.read_gt(),
                '<' => self.read_lt(),
                '=' => self.read_eq(),
                '&' => self.read_amp(),
                '|' => self.read_pipe(),
                '.' => self.single(TokenType::Dot, "."),
                '#' => self.single(TokenType::Hash, "#"),
                ',' => self.single(TokenType::Comma, ","),
                ';' => self.single(TokenType::Semicolon, ";"),
                '(' => self.single(TokenType::LParen, "("),
                ')' => self.single(TokenType::RParen, ")"),
                '{' => self.single(TokenType::LBrace, "{"),
                '}' => self.single(TokenType::RBrace, "}"),
                '[' => self.single(TokenType::LBracket, "["),
                ']' => self.single(TokenType::RBracket, "]"),

                // Illegal character
                _ => {
                    self.error_here(format!("illegal token '{}'", ch));
                    self.advance();
                }
            }
        }

        let span = self.span();
        self.push_token(TokenType::Eof, "End".to_string(), span);

        if !self.errors.is_empty() {
            return Err(self.errors.swap_remove(0));
        }

        Ok(std::mem::take(&mut self.tokens))
    }

    // ── Helpers ──────────────────────────────────────────────

    fn current(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.current()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn span(&self) -> Span {
        Span { line: self.line, column: self.column }
    }

    fn push_token(&mut self, token_type: TokenType, value: String, span: Span) {
        self.tokens.push(Token { token_type, value, literal: None, span });
    }

    fn push_literal(&mut self, token_type: TokenType, value: String, literal: Literal, span: Span) {
        self.tokens.push(Token { token_type, value, literal: Some(literal), span });
    }

    fn single(&mut self, token_type: TokenType, text: &str) {
        let span = self.span();
        self.push_token(token_type, text.to_string(), span);
        self.advance();
    }

    fn error_here(&mut self, message: String) {
        self.errors.push(LexError::Error {
            line: self.line,
            column: self.column,
            message,
        });
    }

    /// Consume `next` if it is the current character.
    fn eat(&mut self, next: char) -> bool {
        if self.current() == Some(next) {
            self.advance();
            true
        } else {
            false
        }
    }

    // ── Number ───────────────────────────────────────────────

    fn read_number(&mut self) {
        let span = self.span();
        let mut value = String::new();

        while let Some(ch) = self.current() {
            if !ch.is_ascii_digit() {
                break;
            }
            value.push(ch);
            self.advance();
        }

        match value.parse::<u8>() {
            Ok(byte) => self.push_literal(TokenType::Number, value, Literal::Byte(byte), span),
            Err(_) => self.errors.push(LexError::Error {
                line: span.line,
                column: span.column,
                message: format!("number literal {} does not fit in a cell (0-255)", value),
            }),
        }
    }

    // ── String / Character ───────────────────────────────────

    /// Read one possibly escaped character; `None` at end of input.
    fn read_escaped(&mut self) -> Option<char> {
        let ch = self.advance()?;
        if ch != '\\' {
            return Some(ch);
        }
        let escaped = self.advance()?;
        Some(match escaped {
            'n' => '\n',
            't' => '\t',
            'r' => '\r',
            '0' => '\0',
            other => other,
        })
    }

    fn read_string(&mut self) {
        let span = self.span();
        self.advance(); // opening quote
        let mut value = String::new();
        let mut closed = false;

        while let Some(ch) = self.current() {
            if ch == '"' {
                self.advance();
                closed = true;
                break;
            }
            match self.read_escaped() {
                Some(c) => value.push(c),
                None => break,
            }
        }

        if !closed {
            self.errors.push(LexError::Error {
                line: span.line,
                column: span.column,
                message: "unterminated string literal".to_string(),
            });
            return;
        }
        if !value.is_ascii() {
            self.errors.push(LexError::Error {
                line: span.line,
                column: span.column,
                message: "string literal must be ASCII".to_string(),
            });
            return;
        }

        self.push_literal(TokenType::StringLit, value.clone(), Literal::Text(value), span);
    }

    fn read_char(&mut self) {
        let span = self.span();
        self.advance(); // opening quote
        let ch = self.read_escaped();
        let closed = self.eat('\'');

        match ch {
            Some(c) if closed && c.is_ascii() => {
                self.push_literal(TokenType::Char, c.to_string(), Literal::Char(c as u8), span);
            }
            _ => self.errors.push(LexError::Error {
                line: span.line,
                column: span.column,
                message: "malformed character literal".to_string(),
            }),
        }
    }

    // ── Identifier / Keyword ─────────────────────────────────

    fn read_identifier_or_keyword(&mut self) {
        let span = self.span();
        let mut word = String::new();

        while let Some(ch) = self.current() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                word.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let token_type = match word.as_str() {
            "function" => TokenType::Function,
            "let" => TokenType::Let,
            "const" => TokenType::Const,
            "struct" => TokenType::Struct,
            "if" => TokenType::If,
            "else" => TokenType::Else,
            "for" => TokenType::For,
            "while" => TokenType::While,
            "sizeof" => TokenType::SizeOf,
            "bf" => TokenType::Bf,
            _ => {
                self.push_literal(TokenType::Word, word.clone(), Literal::Text(word), span);
                return;
            }
        };

        self.push_token(token_type, word, span);
    }

    // ── Compound operators ───────────────────────────────────

    /// `+`, `++`, `+=`
    fn read_plus(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('+') {
            self.push_token(TokenType::AddSelf, "++".to_string(), span);
        } else if self.eat('=') {
            self.push_token(TokenType::CompositeAdd, "+=".to_string(), span);
        } else {
            self.push_token(TokenType::Add, "+".to_string(), span);
        }
    }

    /// `-`, `--`, `-=`
    fn read_minus(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('-') {
            self.push_token(TokenType::SubSelf, "--".to_string(), span);
        } else if self.eat('=') {
            self.push_token(TokenType::CompositeSub, "-=".to_string(), span);
        } else {
            self.push_token(TokenType::Sub, "-".to_string(), span);
        }
    }

    /// `*`, `*=`
    fn read_star(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('=') {
            self.push_token(TokenType::CompositeMul, "*=".to_string(), span);
        } else {
            self.push_token(TokenType::Mul, "*".to_string(), span);
        }
    }

    /// `/`, `/=`, `/=%`, `// comment`, `/* comment */`
    fn read_slash(&mut self) {
        let span = self.span();
        self.advance();
        match self.current() {
            Some('/') => {
                while let Some(ch) = self.current() {
                    if ch == '\n' {
                        break;
                    }
                    self.advance();
                }
            }
            Some('*') => {
                self.advance();
                let mut closed = false;
                while let Some(ch) = self.advance() {
                    if ch == '*' && self.eat('/') {
                        closed = true;
                        break;
                    }
                }
                if !closed {
                    self.errors.push(LexError::Error {
                        line: span.line,
                        column: span.column,
                        message: "unterminated block comment".to_string(),
                    });
                }
            }
            Some('=') => {
                self.advance();
                if self.eat('%') {
                    self.push_token(TokenType::DivMod, "/=%".to_string(), span);
                } else {
                    self.push_token(TokenType::CompositeDiv, "/=".to_string(), span);
                }
            }
            _ => self.push_token(TokenType::Div, "/".to_string(), span),
        }
    }

    /// `%`, `%=`, `%=/`
    fn read_percent(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('=') {
            if self.eat('/') {
                self.push_token(TokenType::ModDiv, "%=/".to_string(), span);
            } else {
                self.push_token(TokenType::CompositeMod, "%=".to_string(), span);
            }
        } else {
            self.push_token(TokenType::Mod, "%".to_string(), span);
        }
    }

    /// `!`, `!=`
    fn read_bang(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('=') {
            self.push_token(TokenType::NotEq, "!=".to_string(), span);
        } else {
            self.push_token(TokenType::Not, "!".to_string(), span);
        }
    }

    /// `>`, `>=`
    fn read_gt(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('=') {
            self.push_token(TokenType::GtEq, ">=".to_string(), span);
        } else {
            self.push_token(TokenType::Gt, ">".to_string(), span);
        }
    }

    /// `<`, `<=`
    fn read_lt(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('=') {
            self.push_token(TokenType::LtEq, "<=".to_string(), span);
        } else {
            self.push_token(TokenType::Lt, "<".to_string(), span);
        }
    }

    /// `=`, `==`
    fn read_eq(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('=') {
            self.push_token(TokenType::Eq, "==".to_string(), span);
        } else {
            self.push_token(TokenType::Assignment, "=".to_string(), span);
        }
    }

    /// `&&`
    fn read_amp(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('&') {
            self.push_token(TokenType::Also, "&&".to_string(), span);
        } else {
            self.errors.push(LexError::Error {
                line: span.line,
                column: span.column,
                message: "illegal token '&', did you mean '&&'?".to_string(),
            });
        }
    }

    /// `||`
    fn read_pipe(&mut self) {
        let span = self.span();
        self.advance();
        if self.eat('|') {
            self.push_token(TokenType::Perhaps, "||".to_string(), span);
        } else {
            self.errors.push(LexError::Error {
                line: span.line,
                column: span.column,
                message: "illegal token '|', did you mean '||'?".to_string(),
            });
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LexError {
    #[error("Lex error at line {line}, column {column}: {message}")]
    Error {
        line: usize,
        column: usize,
        message: String,
    },
}

#[cfg(test)]
mod tests;

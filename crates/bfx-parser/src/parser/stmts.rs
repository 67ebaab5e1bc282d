use super::*;

impl Parser {
    // ── Statement ────────────────────────────────────────────
    // Dispatch based on current token

    pub(super) fn statement(&mut self) -> Result<Instr, ParseError> {
        let span = self.current_span();
        let inner = match self.current_type() {
            TokenType::Let => {
                let decl = self.let_statement()?;
                self.expect(TokenType::Semicolon)?;
                decl
            }
            TokenType::If => self.if_statement()?,
            TokenType::While => self.while_statement()?,
            TokenType::For => self.for_statement()?,
            TokenType::LBrace => self.block()?,
            TokenType::Bf => self.inline_statement()?,
            TokenType::Semicolon => {
                self.advance();
                Box::new(Nop)
            }
            TokenType::Eof => return Err(self.unexpected("a statement")),
            _ => {
                let expr = self.expression()?;
                self.expect(TokenType::Semicolon)?;
                expr
            }
        };
        Ok(statement(inner, span))
    }

    // { <Statement>* }
    pub(super) fn block(&mut self) -> Result<Instr, ParseError> {
        self.expect(TokenType::LBrace)?;
        let mut body = Vec::new();
        while !self.check(TokenType::RBrace) {
            if self.is_at_end() {
                return Err(self.unexpected("'}' to close the block"));
            }
            body.push(self.statement()?);
        }
        self.expect(TokenType::RBrace)?;
        Ok(Box::new(Block(body)))
    }

    // if ( <Expr> ) <Statement> [ else <Statement> ]
    fn if_statement(&mut self) -> Result<Instr, ParseError> {
        self.expect(TokenType::If)?;
        let condition = self.condition()?;
        let then = self.statement()?;
        let otherwise = if self.eat(TokenType::Else) {
            Some(self.statement()?)
        } else {
            None
        };
        Ok(Box::new(If {
            condition,
            then,
            otherwise,
        }))
    }

    // while ( <Expr> ) <Statement>
    fn while_statement(&mut self) -> Result<Instr, ParseError> {
        self.expect(TokenType::While)?;
        let condition = self.condition()?;
        let body = self.statement()?;
        Ok(Box::new(While { condition, body }))
    }

    // for ( [init] ; [cond] ; [step] ) <Statement>
    fn for_statement(&mut self) -> Result<Instr, ParseError> {
        self.expect(TokenType::For)?;
        self.expect(TokenType::LParen)?;

        let init: Instr = match self.current_type() {
            TokenType::Semicolon => Box::new(Nop),
            TokenType::Let => self.let_statement()?,
            _ => self.expression()?,
        };
        self.expect(TokenType::Semicolon)?;

        let condition: Instr = if self.check(TokenType::Semicolon) {
            Box::new(Literal(1))
        } else {
            self.expression()?
        };
        self.expect(TokenType::Semicolon)?;

        let step: Instr = if self.check(TokenType::RParen) {
            Box::new(Nop)
        } else {
            self.expression()?
        };
        self.expect(TokenType::RParen)?;

        let body = self.statement()?;
        Ok(Box::new(For {
            init,
            condition,
            step,
            body,
        }))
    }

    fn condition(&mut self) -> Result<Instr, ParseError> {
        self.expect(TokenType::LParen)?;
        let condition = self.expression()?;
        self.expect(TokenType::RParen)?;
        Ok(condition)
    }

    // bf ( [<Expr> ,] "code" ) ;
    fn inline_statement(&mut self) -> Result<Instr, ParseError> {
        self.expect(TokenType::Bf)?;
        self.expect(TokenType::LParen)?;

        let target = if self.check(TokenType::StringLit) {
            None
        } else {
            let target = self.expression()?;
            self.expect(TokenType::Comma)?;
            Some(target)
        };

        let code = self.expect(TokenType::StringLit)?;
        let code = code.text().unwrap_or(&code.value).to_string();
        self.expect(TokenType::RParen)?;
        self.expect(TokenType::Semicolon)?;
        Ok(Box::new(Inline { target, code }))
    }
}

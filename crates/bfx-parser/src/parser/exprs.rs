use super::*;

impl Parser {
    // ── Expression ───────────────────────────────────────────
    // Expression -> Or ((= | += | -= | *= | /= | %= | /=% | %=/) Expression)?

    pub(super) fn expression(&mut self) -> Result<Instr, ParseError> {
        let target = self.logical_or()?;

        let op = match self.current_type() {
            TokenType::Assignment => None,
            TokenType::CompositeAdd => Some(CompoundOp::Add),
            TokenType::CompositeSub => Some(CompoundOp::Sub),
            TokenType::CompositeMul => Some(CompoundOp::Mul),
            TokenType::CompositeDiv => Some(CompoundOp::Div),
            TokenType::CompositeMod => Some(CompoundOp::Mod),
            TokenType::DivMod => Some(CompoundOp::DivMod),
            TokenType::ModDiv => Some(CompoundOp::ModDiv),
            _ => return Ok(target),
        };
        self.advance(); // consume the operator
        let value = self.expression()?;

        Ok(match (op, target.into_element()) {
            (None, Ok((array, index))) => Box::new(ElementAssign {
                array,
                index,
                value,
            }),
            (None, Err(target)) => Box::new(Assign { target, value }),
            (Some(op), Ok((array, index))) => Box::new(ElementCompound {
                op,
                array,
                index,
                value,
            }),
            (Some(op), Err(target)) => Box::new(Compound { op, target, value }),
        })
    }

    // Or -> And (|| And)*
    fn logical_or(&mut self) -> Result<Instr, ParseError> {
        let mut lhs = self.logical_and()?;
        while self.eat(TokenType::Perhaps) {
            let rhs = self.logical_and()?;
            lhs = binary(BinaryOp::Or, lhs, rhs);
        }
        Ok(lhs)
    }

    // And -> Equality (&& Equality)*
    fn logical_and(&mut self) -> Result<Instr, ParseError> {
        let mut lhs = self.equality()?;
        while self.eat(TokenType::Also) {
            let rhs = self.equality()?;
            lhs = binary(BinaryOp::And, lhs, rhs);
        }
        Ok(lhs)
    }

    // Equality -> Relational ((== | !=) Relational)*
    fn equality(&mut self) -> Result<Instr, ParseError> {
        let mut lhs = self.relational()?;
        loop {
            let op = match self.current_type() {
                TokenType::Eq => BinaryOp::Eq,
                TokenType::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.advance();
            let rhs = self.relational()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // Relational -> Additive ((< | > | <= | >=) Additive)*
    fn relational(&mut self) -> Result<Instr, ParseError> {
        let mut lhs = self.additive()?;
        loop {
            let op = match self.current_type() {
                TokenType::Lt => BinaryOp::Lt,
                TokenType::Gt => BinaryOp::Gt,
                TokenType::LtEq => BinaryOp::LtEq,
                TokenType::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.advance();
            let rhs = self.additive()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // Additive -> Term ((+|-) Term)*
    fn additive(&mut self) -> Result<Instr, ParseError> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.current_type() {
                TokenType::Add => BinaryOp::Add,
                TokenType::Sub => BinaryOp::Sub,
                _ => break,
            };
            self.advance();
            let rhs = self.term()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // Term -> Unary ((*|/|%) Unary)*
    fn term(&mut self) -> Result<Instr, ParseError> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.current_type() {
                TokenType::Mul => BinaryOp::Mul,
                TokenType::Div => BinaryOp::Div,
                TokenType::Mod => BinaryOp::Mod,
                _ => break,
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = binary(op, lhs, rhs);
        }
        Ok(lhs)
    }

    // Unary -> (! | ++ | --) Unary | Postfix
    fn unary(&mut self) -> Result<Instr, ParseError> {
        match self.current_type() {
            TokenType::Not => {
                self.advance();
                let operand = self.unary()?;
                Ok(Box::new(Not(operand)))
            }
            TokenType::AddSelf => {
                self.advance();
                let target = self.unary()?;
                Ok(step(StepOp::PreIncrement, target))
            }
            TokenType::SubSelf => {
                self.advance();
                let target = self.unary()?;
                Ok(step(StepOp::PreDecrement, target))
            }
            _ => self.postfix(),
        }
    }

    // Postfix -> Primary ([Expr] | .field | ++ | --)*
    fn postfix(&mut self) -> Result<Instr, ParseError> {
        let mut result = self.primary()?;
        loop {
            match self.current_type() {
                TokenType::LBracket => {
                    self.advance();
                    let index = self.expression()?;
                    self.expect(TokenType::RBracket)?;
                    result = Box::new(Index {
                        array: result,
                        index,
                    });
                }
                TokenType::Dot => {
                    self.advance();
                    let field = self.expect_word()?;
                    result = Box::new(Member {
                        base: result,
                        field,
                    });
                }
                TokenType::AddSelf => {
                    self.advance();
                    result = step(StepOp::PostIncrement, result);
                }
                TokenType::SubSelf => {
                    self.advance();
                    result = step(StepOp::PostDecrement, result);
                }
                _ => break,
            }
        }
        Ok(result)
    }

    // Primary -> NUM | CHAR | STRING | WORD | WORD(args) | sizeof(WORD)
    //          | #{ Expr, ... } | #[ Size, Expr ] | ( Expr )
    fn primary(&mut self) -> Result<Instr, ParseError> {
        let tok = self.advance().clone();
        match tok.token_type {
            TokenType::Number | TokenType::Char => {
                let value = tok.byte().unwrap_or_default();
                Ok(Box::new(Literal(value)))
            }
            TokenType::StringLit => {
                let text = tok.text().unwrap_or(&tok.value).to_string();
                Ok(Box::new(StringLiteral(text)))
            }
            TokenType::Word => {
                if self.check(TokenType::LParen) {
                    let args = self.arguments()?;
                    return Ok(Box::new(Call {
                        name: tok.value,
                        args,
                    }));
                }
                Ok(Box::new(Variable(tok.value)))
            }
            TokenType::SizeOf => {
                self.expect(TokenType::LParen)?;
                let name = self.expect_word()?;
                self.expect(TokenType::RParen)?;
                Ok(Box::new(SizeOf(name)))
            }
            TokenType::Hash => self.array_literal(),
            TokenType::LParen => {
                let inner = self.expression()?;
                self.expect(TokenType::RParen)?;
                Ok(inner)
            }
            _ => Err(self.error_at(
                tok.span,
                format!("unexpected '{}', expected an expression", tok.value),
            )),
        }
    }

    // ( [Expr (, Expr)*] )
    fn arguments(&mut self) -> Result<Vec<Instr>, ParseError> {
        self.expect(TokenType::LParen)?;
        let mut args = Vec::new();
        if !self.check(TokenType::RParen) {
            loop {
                args.push(self.expression()?);
                if !self.eat(TokenType::Comma) {
                    break;
                }
            }
        }
        self.expect(TokenType::RParen)?;
        Ok(args)
    }

    // After '#': { Expr, ... } or [ Size, Expr ]
    fn array_literal(&mut self) -> Result<Instr, ParseError> {
        if self.eat(TokenType::LBrace) {
            let mut items = Vec::new();
            if !self.check(TokenType::RBrace) {
                loop {
                    items.push(self.expression()?);
                    if !self.eat(TokenType::Comma) {
                        break;
                    }
                }
            }
            self.expect(TokenType::RBrace)?;
            return Ok(Box::new(ArrayList(items)));
        }

        if self.eat(TokenType::LBracket) {
            let size = self.size()?;
            self.expect(TokenType::Comma)?;

            let is_static = matches!(self.current_type(), TokenType::Number | TokenType::Char)
                && self.peek_type_at(1) == TokenType::RBracket;
            if is_static {
                let value = self.advance().byte().unwrap_or_default();
                self.expect(TokenType::RBracket)?;
                return Ok(Box::new(ArrayFill { size, value }));
            }
            let value = self.expression()?;
            self.expect(TokenType::RBracket)?;
            return Ok(Box::new(ArrayFillWith { size, value }));
        }

        Err(self.unexpected("'{' or '[' after '#'"))
    }
}

fn binary(op: BinaryOp, lhs: Instr, rhs: Instr) -> Instr {
    Box::new(Binary { op, lhs, rhs })
}

/// Increment/decrement; element targets write back through the array.
fn step(op: StepOp, target: Instr) -> Instr {
    match target.into_element() {
        Ok((array, index)) => Box::new(ElementStep { op, array, index }),
        Err(target) => Box::new(Step { op, target }),
    }
}

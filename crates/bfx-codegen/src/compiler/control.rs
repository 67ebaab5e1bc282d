use super::*;

impl Compiler {
    /// Cell a loop may consume as its condition. Anything that is not a
    /// single-cell temporary is copied first so the loop never zeroes a
    /// variable or a neighbour of one.
    fn condition_cell(&mut self, condition: &Place) -> Result<Address, CompileError> {
        self.scalar(condition)?;
        if self.memory.is_temp(condition.addr) {
            return Ok(condition.addr);
        }
        let copy = self.temp(1);
        self.bf_assign(copy, condition.addr);
        Ok(copy)
    }

    /// `if (c) a else b`. Both flags are computed before either branch runs,
    /// so the then-branch cannot influence whether the else-branch runs.
    pub fn if_statement(
        &mut self,
        condition: &dyn Instruction,
        then: &dyn Instruction,
        otherwise: Option<&dyn Instruction>,
    ) -> Result<(), CompileError> {
        let condition = self.value(condition)?;
        let flag = self.condition_cell(&condition)?;
        let else_flag = self.temp(1);
        self.bf_not(flag, else_flag);

        self.push_stack(flag);
        self.push_stack(else_flag);

        self.bf_move(flag);
        self.emitter.open();
        then.evaluate(self)?;
        self.bf_set(flag, 0);
        self.emitter.close();

        self.bf_move(else_flag);
        self.emitter.open();
        if let Some(otherwise) = otherwise {
            otherwise.evaluate(self)?;
        }
        self.bf_set(else_flag, 0);
        self.emitter.close();

        self.pop_stack();
        self.pop_stack();
        Ok(())
    }

    pub fn while_statement(
        &mut self,
        condition: &dyn Instruction,
        body: &dyn Instruction,
    ) -> Result<(), CompileError> {
        let first = self.value(condition)?;
        let flag = self.condition_cell(&first)?;
        self.push_stack(flag);

        self.bf_move(flag);
        self.emitter.open();
        body.evaluate(self)?;
        self.reevaluate(condition, flag)?;
        self.emitter.close();

        self.pop_stack();
        Ok(())
    }

    pub fn for_statement(
        &mut self,
        init: &dyn Instruction,
        condition: &dyn Instruction,
        step: &dyn Instruction,
        body: &dyn Instruction,
    ) -> Result<(), CompileError> {
        init.evaluate(self)?;
        let first = self.value(condition)?;
        let flag = self.condition_cell(&first)?;
        self.push_stack(flag);

        self.bf_move(flag);
        self.emitter.open();
        body.evaluate(self)?;
        step.evaluate(self)?;
        self.reevaluate(condition, flag)?;
        self.emitter.close();

        self.pop_stack();
        Ok(())
    }

    /// Recompute a loop condition into its flag, leaving the pointer there.
    fn reevaluate(&mut self, condition: &dyn Instruction, flag: Address) -> Result<(), CompileError> {
        let next = self.value(condition)?;
        self.scalar(&next)?;
        self.bf_assign(flag, next.addr);
        self.bf_move(flag);
        Ok(())
    }

    /// Splice user-written target code, optionally starting at `target`.
    /// The code must leave the pointer where it found it.
    pub fn inline(&mut self, target: Option<&Place>, code: &str) -> Result<(), CompileError> {
        if !is_balanced(code) {
            return Err(self.error(ErrorKind::UnbalancedInline));
        }
        if let Some(target) = target {
            self.bf_move(target.addr);
        }
        let cursor = self.emitter.cursor();
        self.emitter.raw(code, cursor);
        Ok(())
    }
}

/// Every bracket pair, and the code as a whole, must have zero net pointer
/// movement, and the brackets must nest.
pub(crate) fn is_balanced(code: &str) -> bool {
    let mut shifts: Vec<i64> = vec![0];
    for op in code.chars() {
        match op {
            '>' => *shifts.last_mut().expect("outer frame") += 1,
            '<' => *shifts.last_mut().expect("outer frame") -= 1,
            '[' => shifts.push(0),
            ']' => {
                if shifts.len() < 2 || shifts.pop() != Some(0) {
                    return false;
                }
            }
            _ => {}
        }
    }
    shifts == [0]
}

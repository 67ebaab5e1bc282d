//! Deferred instructions built by the parser and run by the [`Compiler`].
//!
//! Every node evaluates itself against the compiler state, emitting code as
//! a side effect and yielding the place of its result (if any). Nodes hold
//! their operands as boxed sub-instructions, so nothing is resolved until
//! the surrounding function is actually called.

use std::fmt::Debug;

use bfx_lexer::Span;

use crate::compiler::{Compiler, Place};
use crate::error::CompileError;
use crate::program::{SizeSpec, TypeSpec};

pub type Instr = Box<dyn Instruction>;

pub trait Instruction: Debug {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError>;

    /// Value known at compile time, used to pick static indexing.
    fn constant(&self, _compiler: &Compiler) -> Option<u8> {
        None
    }

    /// Split an index expression into `(array, index)` so assignments can
    /// write through it instead of into a fetched copy.
    fn into_element(self: Box<Self>) -> Result<(Instr, Instr), Instr>;
}

macro_rules! not_an_element {
    () => {
        fn into_element(self: Box<Self>) -> Result<(Instr, Instr), Instr> {
            Err(self)
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompoundOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `a /=% b`: quotient into `a`, yields the remainder.
    DivMod,
    /// `a %=/ b`: remainder into `a`, yields the quotient.
    ModDiv,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOp {
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

// ── Values ───────────────────────────────────────────────────

#[derive(Debug)]
pub struct Nop;

impl Instruction for Nop {
    fn evaluate(&self, _compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        Ok(None)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct Literal(pub u8);

impl Instruction for Literal {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        Ok(Some(compiler.const_val(self.0)))
    }

    fn constant(&self, _compiler: &Compiler) -> Option<u8> {
        Some(self.0)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct StringLiteral(pub String);

impl Instruction for StringLiteral {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.string(&self.0).map(Some)
    }
    not_an_element!();
}

/// `#{a, b, c}`
#[derive(Debug)]
pub struct ArrayList(pub Vec<Instr>);

impl Instruction for ArrayList {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.array_from_list(&self.0).map(Some)
    }
    not_an_element!();
}

/// `#[N, v]` with a literal fill value.
#[derive(Debug)]
pub struct ArrayFill {
    pub size: SizeSpec,
    pub value: u8,
}

impl Instruction for ArrayFill {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.array_fill(&self.size, self.value).map(Some)
    }
    not_an_element!();
}

/// `#[N, expr]` with a runtime fill value.
#[derive(Debug)]
pub struct ArrayFillWith {
    pub size: SizeSpec,
    pub value: Instr,
}

impl Instruction for ArrayFillWith {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let value = compiler.value(self.value.as_ref())?;
        compiler.array_fill_with(&self.size, &value).map(Some)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct Variable(pub String);

impl Instruction for Variable {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.variable(&self.0).map(Some)
    }

    fn constant(&self, compiler: &Compiler) -> Option<u8> {
        compiler.constant(&self.0)
    }
    not_an_element!();
}

/// `let x`, `let [4] x`, `let Point p`.
#[derive(Debug)]
pub struct Declare {
    pub name: String,
    pub ty: TypeSpec,
}

impl Instruction for Declare {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.declare(&self.name, &self.ty).map(Some)
    }
    not_an_element!();
}

/// `let [] x = expr`: size taken from the initializer.
#[derive(Debug)]
pub struct DeclarePlaceholder {
    pub name: String,
    pub value: Instr,
}

impl Instruction for DeclarePlaceholder {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler
            .declare_placeholder(&self.name, self.value.as_ref())
            .map(Some)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct SizeOf(pub String);

impl Instruction for SizeOf {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.size_of(&self.0).map(Some)
    }
    not_an_element!();
}

// ── Access ───────────────────────────────────────────────────

/// `base[index]`
#[derive(Debug)]
pub struct Index {
    pub array: Instr,
    pub index: Instr,
}

impl Instruction for Index {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let array = compiler.value(self.array.as_ref())?;
        if let Some(k) = self.index.constant(compiler) {
            return compiler.index_static(&array, k as usize).map(Some);
        }
        let index = compiler.value(self.index.as_ref())?;
        compiler.fetch_element(&array, &index).map(Some)
    }

    fn into_element(self: Box<Self>) -> Result<(Instr, Instr), Instr> {
        let Index { array, index } = *self;
        Ok((array, index))
    }
}

/// `base.field`
#[derive(Debug)]
pub struct Member {
    pub base: Instr,
    pub field: String,
}

impl Instruction for Member {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let base = compiler.value(self.base.as_ref())?;
        compiler.member(&base, &self.field).map(Some)
    }
    not_an_element!();
}

// ── Operators ────────────────────────────────────────────────

#[derive(Debug)]
pub struct Assign {
    pub target: Instr,
    pub value: Instr,
}

impl Instruction for Assign {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let target = compiler.value(self.target.as_ref())?;
        let value = compiler.value(self.value.as_ref())?;
        compiler.assign(&target, &value).map(Some)
    }
    not_an_element!();
}

/// `arr[i] = v`
#[derive(Debug)]
pub struct ElementAssign {
    pub array: Instr,
    pub index: Instr,
    pub value: Instr,
}

impl Instruction for ElementAssign {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let array = compiler.value(self.array.as_ref())?;
        if let Some(k) = self.index.constant(compiler) {
            let element = compiler.index_static(&array, k as usize)?;
            let value = compiler.value(self.value.as_ref())?;
            return compiler.assign(&element, &value).map(Some);
        }
        let index = compiler.value(self.index.as_ref())?;
        let value = compiler.value(self.value.as_ref())?;
        compiler.assign_element(&array, &index, &value).map(Some)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct Binary {
    pub op: BinaryOp,
    pub lhs: Instr,
    pub rhs: Instr,
}

impl Instruction for Binary {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let lhs = compiler.value(self.lhs.as_ref())?;
        let rhs = compiler.value(self.rhs.as_ref())?;
        compiler.binary(self.op, &lhs, &rhs).map(Some)
    }
    not_an_element!();
}

/// `a += b` and friends.
#[derive(Debug)]
pub struct Compound {
    pub op: CompoundOp,
    pub target: Instr,
    pub value: Instr,
}

impl Instruction for Compound {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let target = compiler.value(self.target.as_ref())?;
        let value = compiler.value(self.value.as_ref())?;
        compiler.compound(self.op, &target, &value).map(Some)
    }
    not_an_element!();
}

/// `arr[i] += b`: fetch, operate on the copy, write back.
#[derive(Debug)]
pub struct ElementCompound {
    pub op: CompoundOp,
    pub array: Instr,
    pub index: Instr,
    pub value: Instr,
}

impl Instruction for ElementCompound {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let array = compiler.value(self.array.as_ref())?;
        if let Some(k) = self.index.constant(compiler) {
            let element = compiler.index_static(&array, k as usize)?;
            let value = compiler.value(self.value.as_ref())?;
            return compiler.compound(self.op, &element, &value).map(Some);
        }
        let index = compiler.value(self.index.as_ref())?;
        let element = compiler.fetch_element(&array, &index)?;
        let value = compiler.value(self.value.as_ref())?;
        let result = compiler.compound(self.op, &element, &value)?;
        compiler.assign_element(&array, &index, &element)?;
        Ok(Some(result))
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct Not(pub Instr);

impl Instruction for Not {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let operand = compiler.value(self.0.as_ref())?;
        compiler.logical_not(&operand).map(Some)
    }
    not_an_element!();
}

/// `++x`, `x--`, ...
#[derive(Debug)]
pub struct Step {
    pub op: StepOp,
    pub target: Instr,
}

impl Instruction for Step {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let target = compiler.value(self.target.as_ref())?;
        compiler.step(self.op, &target).map(Some)
    }
    not_an_element!();
}

/// `++arr[i]`, `arr[i]--`, ...
#[derive(Debug)]
pub struct ElementStep {
    pub op: StepOp,
    pub array: Instr,
    pub index: Instr,
}

impl Instruction for ElementStep {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let array = compiler.value(self.array.as_ref())?;
        if let Some(k) = self.index.constant(compiler) {
            let element = compiler.index_static(&array, k as usize)?;
            return compiler.step(self.op, &element).map(Some);
        }
        let index = compiler.value(self.index.as_ref())?;
        let element = compiler.fetch_element(&array, &index)?;
        let result = compiler.step(self.op, &element)?;
        compiler.assign_element(&array, &index, &element)?;
        Ok(Some(result))
    }
    not_an_element!();
}

// ── Calls and control flow ───────────────────────────────────

#[derive(Debug)]
pub struct Call {
    pub name: String,
    pub args: Vec<Instr>,
}

impl Instruction for Call {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.call(&self.name, &self.args)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct If {
    pub condition: Instr,
    pub then: Instr,
    pub otherwise: Option<Instr>,
}

impl Instruction for If {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.if_statement(
            self.condition.as_ref(),
            self.then.as_ref(),
            self.otherwise.as_deref(),
        )?;
        Ok(None)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct While {
    pub condition: Instr,
    pub body: Instr,
}

impl Instruction for While {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.while_statement(self.condition.as_ref(), self.body.as_ref())?;
        Ok(None)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct For {
    pub init: Instr,
    pub condition: Instr,
    pub step: Instr,
    pub body: Instr,
}

impl Instruction for For {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.for_statement(
            self.init.as_ref(),
            self.condition.as_ref(),
            self.step.as_ref(),
            self.body.as_ref(),
        )?;
        Ok(None)
    }
    not_an_element!();
}

#[derive(Debug)]
pub struct Block(pub Vec<Instr>);

impl Instruction for Block {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        for instr in &self.0 {
            instr.evaluate(compiler)?;
        }
        Ok(None)
    }
    not_an_element!();
}

/// One source statement. Temporaries die when it completes.
#[derive(Debug)]
pub struct Statement {
    pub inner: Instr,
    pub span: Span,
}

impl Instruction for Statement {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        compiler.set_location(self.span);
        compiler.statement(self.inner.as_ref())?;
        Ok(None)
    }
    not_an_element!();
}

/// `bf("...")` or `bf(x, "...")`.
#[derive(Debug)]
pub struct Inline {
    pub target: Option<Instr>,
    pub code: String,
}

impl Instruction for Inline {
    fn evaluate(&self, compiler: &mut Compiler) -> Result<Option<Place>, CompileError> {
        let target = match &self.target {
            Some(target) => Some(compiler.value(target.as_ref())?),
            None => None,
        };
        compiler.inline(target.as_ref(), &self.code)?;
        Ok(None)
    }
    not_an_element!();
}

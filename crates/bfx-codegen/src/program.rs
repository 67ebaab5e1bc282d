use bfx_lexer::Span;

use crate::function::Function;
use crate::instr::Instr;

/// A parsed source file: every top-level item, in source order.
#[derive(Debug, Default)]
pub struct Program {
    pub items: Vec<Item>,
}

#[derive(Debug)]
pub enum Item {
    /// `const NAME = 10;`
    Const { name: String, value: u8, span: Span },
    /// `struct Name { ... };`
    Struct {
        name: String,
        fields: Vec<FieldSpec>,
        span: Span,
    },
    /// Top-level `let` declaration, evaluated before `main`.
    Global(Instr),
    Function(Function),
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: TypeSpec,
}

/// Size written in source: `[4]` or `[N]` with `N` a constant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeSpec {
    Literal(u8),
    Const(String),
}

/// Declared type before resolution against the constants and structs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Int(SizeSpec),
    Struct(String),
}

impl TypeSpec {
    pub fn scalar() -> Self {
        TypeSpec::Int(SizeSpec::Literal(1))
    }
}

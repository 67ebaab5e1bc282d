use std::collections::{BTreeMap, HashMap};

use bfx_lexer::Span;
use tracing::debug;

use crate::emitter::Emitter;
use crate::error::{CompileError, ErrorKind};
use crate::function::FunctionRegistry;
use crate::instr::{BinaryOp, CompoundOp, Instr, Instruction, StepOp};
use crate::memory::{Address, Memory};
use crate::optimize::cancel_opposite_commands;
use crate::program::{FieldSpec, Item, Program, SizeSpec, TypeSpec};
use crate::types::{Type, TypeCatalog};

mod arrays;
mod calls;
mod control;
mod operators;
mod primitives;

/// Name of the function every program starts in.
pub const ENTRY_POINT: &str = "main";

/// Tunables for one compilation.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Reported in diagnostics.
    pub file: String,
    /// Largest value (in cells) a declaration or literal may have.
    pub max_array_size: usize,
    /// Run the `><` / `+-` cancellation pass over the output.
    pub cancel_opposites: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            file: "<input>".to_string(),
            max_array_size: 255,
            cancel_opposites: true,
        }
    }
}

/// Result of a successful compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Target code, newline-terminated.
    pub code: String,
    /// Cell of every global and every top-level local of `main`.
    pub symbols: BTreeMap<String, Address>,
}

/// A value on the tape: where it starts and what it is.
///
/// Carried instead of a bare address because a struct's first field shares
/// its address with the struct itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub addr: Address,
    pub ty: Type,
}

impl Place {
    pub fn new(addr: Address, ty: Type) -> Self {
        Self { addr, ty }
    }

    pub fn size(&self) -> usize {
        self.ty.size()
    }
}

/// Single-pass compiler state: types, tape, emitted code and call chain.
pub struct Compiler {
    options: CompileOptions,
    catalog: TypeCatalog,
    memory: Memory,
    emitter: Emitter,
    functions: FunctionRegistry,
    constants: HashMap<String, u8>,
    /// Cells whose value must survive until the enclosing construct ends.
    stack: Vec<Address>,
    location: Span,
    symbols: BTreeMap<String, Address>,
}

impl Compiler {
    pub fn new(options: CompileOptions) -> Self {
        Self {
            options,
            catalog: TypeCatalog::new(),
            memory: Memory::new(0),
            emitter: Emitter::new(),
            functions: FunctionRegistry::new(),
            constants: HashMap::new(),
            stack: Vec::new(),
            location: Span::default(),
            symbols: BTreeMap::new(),
        }
    }

    /// Compile a whole program, starting at `main`.
    pub fn compile(&mut self, program: Program) -> Result<Artifact, CompileError> {
        let mut structs = Vec::new();
        let mut functions = Vec::new();
        let mut globals = Vec::new();
        for item in program.items {
            match item {
                Item::Const { name, value, span } => {
                    self.set_location(span);
                    self.add_constant(&name, value)?;
                }
                Item::Struct { name, fields, span } => structs.push((name, fields, span)),
                Item::Function(function) => functions.push(function),
                Item::Global(instr) => globals.push(instr),
            }
        }

        for (name, fields, span) in structs {
            self.set_location(span);
            self.add_struct(&name, &fields)?;
        }

        for function in functions {
            self.set_location(function.span);
            let name = function.name.clone();
            if !self.functions.add(function) {
                return Err(self.error(ErrorKind::FunctionRedefinition(name)));
            }
        }

        for global in &globals {
            global.evaluate(self)?;
        }
        debug!(globals = ?self.memory.named(""), "globals allocated");

        if !self.functions.contains(ENTRY_POINT) {
            self.location = Span::default();
            return Err(self.error(ErrorKind::MissingEntrypoint));
        }
        self.call(ENTRY_POINT, &[])?;

        let code = self.finish();
        debug!(len = code.len(), cells = self.memory.len(), "compiled");
        Ok(Artifact {
            code,
            symbols: std::mem::take(&mut self.symbols),
        })
    }

    /// Take the code emitted so far, post-processed and newline-terminated.
    pub fn finish(&mut self) -> String {
        let raw = std::mem::take(&mut self.emitter).into_code();
        let mut code = if self.options.cancel_opposites {
            cancel_opposite_commands(&raw)
        } else {
            raw
        };
        code.push('\n');
        code
    }

    // ── Declarations ─────────────────────────────────────────

    pub fn add_constant(&mut self, name: &str, value: u8) -> Result<(), CompileError> {
        if self.constants.contains_key(name) {
            return Err(self.error(ErrorKind::ConstantRedefinition(name.to_string())));
        }
        self.constants.insert(name.to_string(), value);
        Ok(())
    }

    pub fn constant(&self, name: &str) -> Option<u8> {
        self.constants.get(name).copied()
    }

    pub fn add_struct(&mut self, name: &str, fields: &[FieldSpec]) -> Result<Type, CompileError> {
        if self.catalog.contains(name) {
            return Err(self.error(ErrorKind::StructRedefinition(name.to_string())));
        }

        let mut resolved: Vec<(String, Type)> = Vec::with_capacity(fields.len());
        for field in fields {
            if resolved.iter().any(|(n, _)| *n == field.name) {
                return Err(self.error(ErrorKind::DuplicateField {
                    ty: name.to_string(),
                    field: field.name.clone(),
                }));
            }
            let ty = self.resolve_type(&field.ty, &field.name)?;
            resolved.push((field.name.clone(), ty));
        }

        let ty = self
            .catalog
            .add(name, resolved)
            .ok_or_else(|| self.error(ErrorKind::StructRedefinition(name.to_string())))?;
        self.check_size(&field_owner(name), ty.size())?;
        Ok(ty)
    }

    pub fn resolve_size(&self, size: &SizeSpec) -> Result<usize, CompileError> {
        match size {
            SizeSpec::Literal(n) => Ok(*n as usize),
            SizeSpec::Const(name) => self
                .constant(name)
                .map(usize::from)
                .ok_or_else(|| self.error(ErrorKind::UnknownConstant(name.clone()))),
        }
    }

    fn resolve_type(&self, spec: &TypeSpec, owner: &str) -> Result<Type, CompileError> {
        let ty = match spec {
            TypeSpec::Int(size) => Type::Int(self.resolve_size(size)?),
            TypeSpec::Struct(name) => self
                .catalog
                .lookup(name)
                .ok_or_else(|| self.error(ErrorKind::UnknownType(name.clone())))?,
        };
        self.check_size(owner, ty.size())?;
        Ok(ty)
    }

    fn check_size(&self, owner: &str, size: usize) -> Result<(), CompileError> {
        if size == 0 {
            return Err(self.error(ErrorKind::ZeroSize(owner.to_string())));
        }
        if size > self.options.max_array_size {
            return Err(self.error(ErrorKind::SizeLimit {
                size,
                max: self.options.max_array_size,
            }));
        }
        Ok(())
    }

    /// `let name` in the current scope. Redeclaring with the same type
    /// yields the existing variable.
    pub fn declare(&mut self, name: &str, spec: &TypeSpec) -> Result<Place, CompileError> {
        if self.constants.contains_key(name) {
            return Err(self.error(ErrorKind::ConstantRedeclaration(name.to_string())));
        }
        let ty = self.resolve_type(spec, name)?;

        if let Some(addr) = self.memory.find_local(name, self.functions.current_scope()) {
            if self.memory.type_of(addr) != ty {
                return Err(self.error(ErrorKind::SizeRedeclaration(name.to_string())));
            }
            return Ok(Place::new(addr, ty));
        }

        let addr = self
            .memory
            .allocate(name, self.functions.current_scope(), ty.clone())
            .ok_or_else(|| self.error(ErrorKind::IdentifierRedefinition(name.to_string())))?;
        Ok(Place::new(addr, ty))
    }

    /// `let [] name = value`: declare with the value's type, then assign.
    pub fn declare_placeholder(
        &mut self,
        name: &str,
        value: &dyn Instruction,
    ) -> Result<Place, CompileError> {
        if self.constants.contains_key(name) {
            return Err(self.error(ErrorKind::ConstantRedeclaration(name.to_string())));
        }
        if self
            .memory
            .find(name, self.functions.current_scope())
            .is_some()
        {
            return Err(self.error(ErrorKind::PlaceholderRedeclaration(name.to_string())));
        }

        let value = self.value(value)?;
        let addr = self
            .memory
            .allocate(name, self.functions.current_scope(), value.ty.clone())
            .ok_or_else(|| self.error(ErrorKind::IdentifierRedefinition(name.to_string())))?;
        let place = Place::new(addr, value.ty.clone());
        self.assign(&place, &value)
    }

    /// Resolve a name to a place. Constants materialize into a fresh temp.
    pub fn variable(&mut self, name: &str) -> Result<Place, CompileError> {
        if let Some(value) = self.constant(name) {
            return Ok(self.const_val(value));
        }
        let addr = self
            .memory
            .find(name, self.functions.current_scope())
            .ok_or_else(|| self.error(ErrorKind::UnknownIdentifier(name.to_string())))?;
        Ok(Place::new(addr, self.memory.type_of(addr)))
    }

    pub fn size_of(&mut self, name: &str) -> Result<Place, CompileError> {
        let addr = self
            .memory
            .find(name, self.functions.current_scope())
            .ok_or_else(|| self.error(ErrorKind::UnknownIdentifier(name.to_string())))?;
        let size = self.memory.size_of(addr);
        let size = u8::try_from(size).map_err(|_| {
            self.error(ErrorKind::SizeLimit {
                size,
                max: u8::MAX as usize,
            })
        })?;
        Ok(self.const_val(size))
    }

    pub fn member(&self, base: &Place, field: &str) -> Result<Place, CompileError> {
        let def = base
            .ty
            .as_struct()
            .ok_or_else(|| self.error(ErrorKind::NotAStruct(base.ty.to_string())))?;
        let field = def.field(field).ok_or_else(|| {
            self.error(ErrorKind::UnknownField {
                ty: def.name().to_string(),
                field: field.to_string(),
            })
        })?;
        Ok(Place::new(base.addr + field.offset, field.ty.clone()))
    }

    pub fn index_static(&self, array: &Place, index: usize) -> Result<Place, CompileError> {
        if index >= array.size() {
            return Err(self.error(ErrorKind::IndexOutOfRange {
                index,
                size: array.size(),
            }));
        }
        Ok(Place::new(array.addr + index, Type::Int(1)))
    }

    // ── Statements ───────────────────────────────────────────

    /// Run one statement, then release the temporaries it created.
    pub fn statement(&mut self, instr: &dyn Instruction) -> Result<(), CompileError> {
        instr.evaluate(self)?;
        let scope = self.functions.current_scope().to_string();
        self.memory.free_temps(&scope);
        Ok(())
    }

    /// Evaluate an instruction that must produce a value.
    pub fn value(&mut self, instr: &dyn Instruction) -> Result<Place, CompileError> {
        instr
            .evaluate(self)?
            .ok_or_else(|| self.error(ErrorKind::VoidValue))
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: &Place, rhs: &Place) -> Result<Place, CompileError> {
        self.scalar(lhs)?;
        self.scalar(rhs)?;
        let (l, r) = (lhs.addr, rhs.addr);
        let addr = match op {
            BinaryOp::Add => self.add(l, r),
            BinaryOp::Sub => self.subtract(l, r),
            BinaryOp::Mul => self.multiply(l, r),
            BinaryOp::Div => self.divide(l, r),
            BinaryOp::Mod => self.modulo(l, r),
            BinaryOp::Eq => self.equal(l, r),
            BinaryOp::NotEq => self.not_equal(l, r),
            BinaryOp::Lt => self.less(l, r),
            BinaryOp::Gt => self.greater(l, r),
            BinaryOp::LtEq => self.less_or_equal(l, r),
            BinaryOp::GtEq => self.greater_or_equal(l, r),
            BinaryOp::And => self.and(l, r),
            BinaryOp::Or => self.or(l, r),
        };
        Ok(Place::new(addr, Type::Int(1)))
    }

    pub fn compound(
        &mut self,
        op: CompoundOp,
        target: &Place,
        value: &Place,
    ) -> Result<Place, CompileError> {
        self.scalar(target)?;
        self.scalar(value)?;
        let (t, v) = (target.addr, value.addr);
        let addr = match op {
            CompoundOp::Add => self.add_to(t, v),
            CompoundOp::Sub => self.subtract_from(t, v),
            CompoundOp::Mul => self.multiply_by(t, v),
            CompoundOp::Div => self.divide_by(t, v),
            CompoundOp::Mod => self.modulo_by(t, v),
            CompoundOp::DivMod => self.div_mod(t, v),
            CompoundOp::ModDiv => self.mod_div(t, v),
        };
        Ok(Place::new(addr, Type::Int(1)))
    }

    pub fn step(&mut self, op: StepOp, target: &Place) -> Result<Place, CompileError> {
        self.scalar(target)?;
        let addr = match op {
            StepOp::PreIncrement => self.pre_increment(target.addr),
            StepOp::PreDecrement => self.pre_decrement(target.addr),
            StepOp::PostIncrement => self.post_increment(target.addr),
            StepOp::PostDecrement => self.post_decrement(target.addr),
        };
        Ok(Place::new(addr, Type::Int(1)))
    }

    pub fn logical_not(&mut self, operand: &Place) -> Result<Place, CompileError> {
        self.scalar(operand)?;
        let result = self.temp(1);
        self.bf_not(operand.addr, result);
        Ok(Place::new(result, Type::Int(1)))
    }

    // ── Helpers ──────────────────────────────────────────────

    pub fn set_location(&mut self, span: Span) {
        self.location = span;
    }

    pub(crate) fn error(&self, kind: ErrorKind) -> CompileError {
        CompileError {
            kind,
            file: self.options.file.clone(),
            line: self.location.line,
            column: self.location.column,
        }
    }

    fn scalar(&self, place: &Place) -> Result<(), CompileError> {
        if place.size() != 1 {
            return Err(self.error(ErrorKind::NotScalar(place.size())));
        }
        Ok(())
    }

    /// Fresh temporary of `size` cells in the current scope.
    pub fn temp(&mut self, size: usize) -> Address {
        self.memory
            .get_temp(self.functions.current_scope(), Type::Int(size))
    }

    /// Temporary cell holding a literal byte.
    pub fn const_val(&mut self, value: u8) -> Place {
        let addr = self.temp(1);
        self.bf_set(addr, value);
        Place::new(addr, Type::Int(1))
    }

    /// Protect a cell until the matching [`Compiler::pop_stack`].
    fn push_stack(&mut self, addr: Address) {
        self.memory.push(addr);
        self.stack.push(addr);
    }

    fn pop_stack(&mut self) -> Address {
        let addr = self.stack.pop().expect("value stack is empty");
        let restored = self.memory.pop();
        assert_eq!(addr, restored, "value stack out of sync with protect stack");
        addr
    }

    /// Current emitted code, before post-processing.
    pub fn code(&self) -> &str {
        self.emitter.code()
    }

    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn call_depth(&self) -> usize {
        self.functions.depth()
    }
}

fn field_owner(struct_name: &str) -> String {
    format!("struct {}", struct_name)
}

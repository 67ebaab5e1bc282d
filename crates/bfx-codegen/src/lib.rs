mod compiler;
mod emitter;
mod error;
mod function;
pub mod instr;
mod memory;
mod optimize;
mod program;
mod types;

pub use compiler::{Artifact, CompileOptions, Compiler, Place, ENTRY_POINT};
pub use emitter::Emitter;
pub use error::{CompileError, ErrorKind};
pub use function::{Function, FunctionRegistry};
pub use memory::{Address, Content, Memory};
pub use optimize::cancel_opposite_commands;
pub use program::{FieldSpec, Item, Program, SizeSpec, TypeSpec};
pub use types::{Field, StructDef, Type, TypeCatalog};

mod parser;

pub use parser::{ParseError, Parser};

use bfx_codegen::{Artifact, CompileError, CompileOptions, Compiler};
use bfx_lexer::{LexError, Lexer};

/// Any failure on the way from source text to target code.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Lex, parse and compile one source file.
pub fn compile_source(source: &str, options: CompileOptions) -> Result<Artifact, BuildError> {
    let tokens = Lexer::new(source).tokenize()?;
    let program = Parser::new(tokens).parse()?;
    Ok(Compiler::new(options).compile(program)?)
}

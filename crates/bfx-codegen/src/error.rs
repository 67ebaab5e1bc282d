/// A fatal diagnostic, located at the statement being compiled.
#[derive(Debug, thiserror::Error)]
#[error("{file}:{line}:{column}: {kind}")]
pub struct CompileError {
    pub kind: ErrorKind,
    pub file: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    // ── Declarations ─────────────────────────────────────────
    #[error("cannot declare variable \"{0}\" of size 0")]
    ZeroSize(String),
    #[error("maximum array size ({max}) exceeded (got {size})")]
    SizeLimit { size: usize, max: usize },
    #[error("redefinition of function \"{0}\" is not allowed")]
    FunctionRedefinition(String),
    #[error("redefinition of constant \"{0}\" is not allowed")]
    ConstantRedefinition(String),
    #[error("redefinition of struct \"{0}\" is not allowed")]
    StructRedefinition(String),
    #[error("\"{0}\" is already defined in this scope")]
    IdentifierRedefinition(String),
    #[error("\"{0}\" is a compile-time constant and cannot be declared as a variable")]
    ConstantRedeclaration(String),
    #[error("variable \"{0}\" was previously declared with a different size")]
    SizeRedeclaration(String),
    #[error("placeholder size brackets can not be attached to previously declared variable \"{0}\"")]
    PlaceholderRedeclaration(String),
    #[error("duplicate field \"{field}\" in struct \"{ty}\"")]
    DuplicateField { ty: String, field: String },
    #[error("no entrypoint provided; the entrypoint should be main()")]
    MissingEntrypoint,

    // ── References ───────────────────────────────────────────
    #[error("unknown identifier \"{0}\"")]
    UnknownIdentifier(String),
    #[error("call to unknown function \"{0}\"")]
    UnknownFunction(String),
    #[error("\"{0}\" is being used as a const but was not defined as such")]
    UnknownConstant(String),
    #[error("unknown type \"{0}\"")]
    UnknownType(String),
    #[error("type \"{ty}\" has no field \"{field}\"")]
    UnknownField { ty: String, field: String },
    #[error("member access on a value of type {0}, which is not a struct")]
    NotAStruct(String),

    // ── Calls ────────────────────────────────────────────────
    #[error("calling function \"{function}\" with invalid number of arguments: expected {expected}, got {got}")]
    ArityMismatch {
        function: String,
        expected: usize,
        got: usize,
    },
    #[error("function \"{0}\" is called recursively; recursion is not allowed")]
    RecursiveCall(String),
    #[error("invalid argument to function \"{function}\": the expression passed as argument {index} returns void")]
    VoidArgument { function: String, index: usize },
    #[error("return value \"{variable}\" of function \"{function}\" was not declared in the function body")]
    MissingReturnVariable { function: String, variable: String },
    #[error("expression does not produce a value")]
    VoidValue,

    // ── Shapes ───────────────────────────────────────────────
    #[error("cannot assign a value of size {right} to a variable of size {left}")]
    SizeMismatch { left: usize, right: usize },
    #[error("array fill-value must refer to a variable of size 1, but it is of size {0}")]
    FillValueSize(usize),
    #[error("operator requires a value of size 1, got size {0}")]
    NotScalar(usize),
    #[error("index {index} out of range for a value of size {size}")]
    IndexOutOfRange { index: usize, size: usize },

    // ── Inline code ──────────────────────────────────────────
    #[error("inline code may not have a net effect on the pointer position; make sure left and right shifts cancel out within each set of []")]
    UnbalancedInline,
}

use bfx_codegen::instr::{Assign, BinaryOp, Binary, Block, Declare, Instr, Literal, Statement, Variable};
use bfx_codegen::{CompileOptions, Compiler, Function, Item, Program, TypeSpec};
use bfx_lexer::Span;

fn stmt(inner: Instr) -> Instr {
    Box::new(Statement {
        inner,
        span: Span::default(),
    })
}

fn declare_and_set(name: &str, value: Instr) -> Instr {
    stmt(Box::new(Assign {
        target: Box::new(Declare {
            name: name.to_string(),
            ty: TypeSpec::scalar(),
        }),
        value,
    }))
}

fn program(body: Vec<Instr>) -> Program {
    Program {
        items: vec![Item::Function(Function {
            name: "main".to_string(),
            params: Vec::new(),
            return_var: None,
            body: Box::new(Block(body)),
            span: Span::default(),
        })],
    }
}

#[test]
fn artifact_runs_on_the_reference_machine() {
    let artifact = Compiler::new(CompileOptions::default())
        .compile(program(vec![
            declare_and_set("a", Box::new(Literal(6))),
            declare_and_set(
                "b",
                Box::new(Binary {
                    op: BinaryOp::Mul,
                    lhs: Box::new(Variable("a".to_string())),
                    rhs: Box::new(Literal(7)),
                }),
            ),
        ]))
        .expect("compile failed");

    assert!(artifact.code.ends_with('\n'));
    assert!(artifact.code.chars().all(|c| "<>+-[]\n".contains(c)));

    let machine = bfx_vm::run(&artifact.code).expect("run failed");
    assert_eq!(machine.cell(artifact.symbols["a"]), 6);
    assert_eq!(machine.cell(artifact.symbols["b"]), 42);
}

#[test]
fn empty_main_compiles_to_a_newline() {
    let artifact = Compiler::new(CompileOptions::default())
        .compile(program(Vec::new()))
        .unwrap();
    assert_eq!(artifact.code, "\n");
    assert!(artifact.symbols.is_empty());
}

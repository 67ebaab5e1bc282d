use super::*;
use bfx_lexer::Lexer;

fn parse_source(src: &str) -> Result<Program, ParseError> {
    let tokens = Lexer::new(src).tokenize().expect("lexer should succeed");
    let mut parser = Parser::new(tokens);
    parser.parse()
}

fn parse_ok(src: &str) -> Program {
    parse_source(src).expect("parse should succeed")
}

/// Debug rendering of `main`'s body, for shape assertions.
fn main_body(src: &str) -> String {
    let program = parse_ok(&format!("function main() {{ {src} }}"));
    match &program.items[0] {
        Item::Function(f) => format!("{:?}", f.body),
        other => panic!("expected function, got {other:?}"),
    }
}

// ── Items ────────────────────────────────────────────────────

#[test]
fn top_level_items() {
    let program = parse_ok(
        "const N = 4;\n\
         struct P { x; [N] y; };\n\
         let [2] g;\n\
         function r = f(a, b) { let r = a; }\n\
         function main() {}",
    );
    assert_eq!(program.items.len(), 5);
    assert!(matches!(&program.items[0], Item::Const { name, value: 4, .. } if name == "N"));
    match &program.items[1] {
        Item::Struct { name, fields, .. } => {
            assert_eq!(name, "P");
            assert_eq!(fields[0].ty, TypeSpec::scalar());
            assert_eq!(fields[1].ty, TypeSpec::Int(SizeSpec::Const("N".to_string())));
        }
        other => panic!("expected struct, got {other:?}"),
    }
    assert!(matches!(&program.items[2], Item::Global(_)));
    match &program.items[3] {
        Item::Function(f) => {
            assert_eq!(f.name, "f");
            assert_eq!(f.params, vec!["a", "b"]);
            assert_eq!(f.return_var.as_deref(), Some("r"));
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn char_constant() {
    let program = parse_ok("const A = 'A';");
    assert!(matches!(&program.items[0], Item::Const { value: 65, .. }));
}

#[test]
fn struct_typed_declaration() {
    let body = main_body("let Point p;");
    assert!(body.contains(r#"Declare { name: "p", ty: Struct("Point") }"#), "{body}");
}

#[test]
fn placeholder_declaration() {
    let body = main_body(r#"let [] s = "hi";"#);
    assert!(body.contains(r#"DeclarePlaceholder { name: "s", value: StringLiteral("hi") }"#), "{body}");
}

// ── Expressions ──────────────────────────────────────────────

#[test]
fn multiplication_binds_tighter() {
    let body = main_body("x = 1 + 2 * 3;");
    assert!(
        body.contains(
            "Binary { op: Add, lhs: Literal(1), rhs: Binary { op: Mul, lhs: Literal(2), rhs: Literal(3) } }"
        ),
        "{body}"
    );
}

#[test]
fn comparison_below_arithmetic_and_logic_below_comparison() {
    let body = main_body("x = a + 1 < b && c == d || e;");
    assert!(body.contains("Binary { op: Or, lhs: Binary { op: And, lhs: Binary { op: Lt"), "{body}");
}

#[test]
fn assignment_is_right_associative() {
    let body = main_body("a = b = 1;");
    assert!(
        body.contains(r#"Assign { target: Variable("a"), value: Assign { target: Variable("b"), value: Literal(1) } }"#),
        "{body}"
    );
}

#[test]
fn div_mod_operators() {
    let body = main_body("r = a /=% b; q = c %=/ d;");
    assert!(body.contains("Compound { op: DivMod"), "{body}");
    assert!(body.contains("Compound { op: ModDiv"), "{body}");
}

#[test]
fn element_targets_write_through() {
    let body = main_body("a[i] = 1; a[i] += 2; a[i]++; --a[0];");
    assert!(body.contains("ElementAssign"), "{body}");
    assert!(body.contains("ElementCompound { op: Add"), "{body}");
    assert!(body.contains("ElementStep { op: PostIncrement"), "{body}");
    assert!(body.contains("ElementStep { op: PreDecrement"), "{body}");
}

#[test]
fn member_and_index_chain() {
    let body = main_body("x = p.y[1];");
    assert!(
        body.contains(r#"Index { array: Member { base: Variable("p"), field: "y" }, index: Literal(1) }"#),
        "{body}"
    );
}

#[test]
fn array_literals() {
    let body = main_body("a = #{1, 2, 3}; b = #[4, 7]; c = #[N, x];");
    assert!(body.contains("ArrayList([Literal(1), Literal(2), Literal(3)])"), "{body}");
    assert!(body.contains("ArrayFill { size: Literal(4), value: 7 }"), "{body}");
    assert!(body.contains(r#"ArrayFillWith { size: Const("N"), value: Variable("x") }"#), "{body}");
}

#[test]
fn calls_and_sizeof() {
    let body = main_body("x = f(1, g()) + sizeof(x);");
    assert!(body.contains(r#"Call { name: "f", args: [Literal(1), Call { name: "g", args: [] }] }"#), "{body}");
    assert!(body.contains(r#"SizeOf("x")"#), "{body}");
}

// ── Statements ───────────────────────────────────────────────

#[test]
fn control_flow() {
    let body = main_body("if (x) y = 1; else { y = 2; } while (x) --x; for (let i = 0; i < 3; ++i) ;");
    assert!(body.contains("If { condition: Variable(\"x\")"), "{body}");
    assert!(body.contains("otherwise: Some("), "{body}");
    assert!(body.contains("While {"), "{body}");
    assert!(body.contains("For { init: Assign"), "{body}");
}

#[test]
fn empty_for_clauses() {
    let body = main_body("for (;;) {}");
    assert!(body.contains("For { init: Nop, condition: Literal(1), step: Nop"), "{body}");
}

#[test]
fn inline_code() {
    let body = main_body(r#"bf("+>-<"); bf(x, "[-]");"#);
    assert!(body.contains(r#"Inline { target: None, code: "+>-<" }"#), "{body}");
    assert!(body.contains(r#"Inline { target: Some(Variable("x")), code: "[-]" }"#), "{body}");
}

// ── Errors ───────────────────────────────────────────────────

#[test]
fn missing_semicolon() {
    assert!(parse_source("function main() { x = 1 }").is_err());
}

#[test]
fn statements_are_not_items() {
    let err = parse_source("x = 1;").unwrap_err();
    assert!(err.to_string().contains("line 1"), "{err}");
}

#[test]
fn placeholder_needs_initializer() {
    assert!(parse_source("function main() { let [] s; }").is_err());
}

#[test]
fn struct_field_rules() {
    assert!(parse_source("struct S { [] x; };").is_err());
    assert!(parse_source("struct S { };").is_err());
}

#[test]
fn unterminated_block() {
    assert!(parse_source("function main() { x = 1;").is_err());
}

#[test]
fn error_location_points_at_token() {
    let err = parse_source("function main() {\n  x = ;\n}").unwrap_err();
    match err {
        ParseError::Error { line, column, .. } => {
            assert_eq!(line, 2);
            assert_eq!(column, 7);
        }
    }
}

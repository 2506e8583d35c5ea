//! Integration tests for the ALGOL-0 compiler
//!
//! Tests the full pipeline: Source → Parse → Build → Rearrange → Codegen,
//! plus execution through `llvm-as`/`lli` when they are installed.

use std::process::{Command, Stdio};

use algol0::codegen::{self, Compiler, Destination, PRELUDE};
use algol0::error::{Diagnostic, ErrorCode};
use algol0::{build_ast, compile_source, fmt, grammar, lexer, lint, parser, CompileError};

/// Compile ALGOL-0 source and return the IR after the prelude
fn main_body(source: &str) -> String {
    let ir = compile_source(source).expect("compilation failed");
    let prefix = format!("{}\n", PRELUDE);
    assert!(ir.starts_with(&prefix), "IR must open with the runtime prelude");
    ir[prefix.len()..].to_string()
}

/// Assemble and interpret IR, feeding `stdin`. `None` when the LLVM tools
/// are not installed.
fn execute(ir: &str, stdin: &str, name: &str) -> Option<String> {
    let llvm_as = which::which("llvm-as").ok()?;
    let lli = which::which("lli").ok()?;

    let base = std::env::temp_dir().join(format!("algol0-it-{}-{}", name, std::process::id()));
    let ll = base.with_extension("ll");
    let bc = base.with_extension("bc");
    std::fs::write(&ll, ir).expect("write .ll failed");

    let assembled = Command::new(llvm_as)
        .arg(&ll)
        .arg("-o")
        .arg(&bc)
        .output()
        .expect("llvm-as failed to start");
    let _ = std::fs::remove_file(&ll);
    assert!(
        assembled.status.success(),
        "llvm-as rejected the IR:\n{}",
        String::from_utf8_lossy(&assembled.stderr)
    );

    let mut child = Command::new(lli)
        .arg(&bc)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("lli failed to start");
    if let Some(mut input) = child.stdin.take() {
        use std::io::Write;
        input.write_all(stdin.as_bytes()).expect("write stdin failed");
    }
    let output = child.wait_with_output().expect("lli failed");

    let _ = std::fs::remove_file(&bc);
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[test]
fn test_assign_then_print() {
    let body = main_body("begin x := 1 + 2; print(x) end");

    assert_eq!(body.matches("%x = alloca i32").count(), 1);
    assert!(body.contains("%0 = add i32 1, 2\nstore i32 %0, i32* %x\n"));
    assert!(body.contains("%1 = load i32, i32* %x\ncall void @println(i32 %1)\n"));
    assert!(body.ends_with("ret i32 0\n}\n"));
}

#[test]
fn test_while_loop_has_one_label_triple() {
    let source = r#"
begin
  read(n);
  while n > 0 do
    print(n);
    n := n - 1
  endwhile
end
"#;
    let body = main_body(source);

    for label in ["whileCond0:", "whileCode0:", "endwhile0:"] {
        assert_eq!(body.matches(label).count(), 1, "{}", label);
    }
    assert!(!body.contains("whileCond1"));
    assert!(body.contains("\nbr i1 %2, label %whileCode0, label %endwhile0\n"));
    assert_eq!(body.matches("br label %whileCond0").count(), 2);
}

#[test]
fn test_precedence_reaches_codegen() {
    // a + b * c: the multiply is lowered first
    let body = main_body("begin x := a + b * c end");
    assert!(body.contains(
        "%0 = load i32, i32* %a\n\
         %1 = load i32, i32* %b\n\
         %2 = load i32, i32* %c\n\
         %3 = mul i32 %1, %2\n\
         %4 = add i32 %0, %3\n"
    ));

    // a - b - c associates left
    let body = main_body("begin x := a - b - c end");
    assert!(body.contains("%2 = sub i32 %0, %1\n%3 = load i32, i32* %c\n%4 = sub i32 %2, %3\n"));
}

#[test]
fn test_label_indices_are_per_construct_kind() {
    let source = r#"
begin
  for i from 0 by 1 to 3 do
    if i = 1 then print(i) endif
  endwhile;
  while i > 0 do i := i - 1 endwhile;
  if i = 0 then print(i) else print(j) endif
end
"#;
    let body = main_body(source);

    for label in [
        "forCond0:", "forCode0:", "endfor0:", "ifCode0:", "endif0:", "whileCond0:",
        "whileCode0:", "endwhile0:", "ifCode1:", "elseCode1:", "endif1:",
    ] {
        assert_eq!(body.matches(label).count(), 1, "{}", label);
    }
    assert!(!body.contains("elseCode0"));
    assert!(!body.contains("forCond1"));
}

#[test]
fn test_empty_constructs_generate_nothing() {
    let source = r#"
begin
  while a > 0 do endwhile;
  if a = 1 then endif;
  for i from 1 by 1 to 2 do endwhile;
  print(a)
end
"#;
    let body = main_body(source);

    assert!(!body.contains("label"));
    assert!(!body.contains("%i = alloca"));
    assert!(body.starts_with("\n\n\n%0 = load i32, i32* %a\n"));
}

#[test]
fn test_file_destination_is_truncated() {
    let path = std::env::temp_dir().join(format!("algol0-it-trunc-{}.ll", std::process::id()));
    std::fs::write(&path, "stale contents that must disappear\n".repeat(100)).unwrap();

    let program = build_ast("begin x := 4; print(x) end").unwrap();
    Compiler::to_destination(&Destination::File(path.clone()))
        .unwrap()
        .compile(&program)
        .unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    let _ = std::fs::remove_file(&path);
    assert_eq!(written, codegen::generate(&program).unwrap());
    assert!(!written.contains("stale"));
}

#[test]
fn test_syntax_error_reported_with_position() {
    let err = compile_source("begin\n  x := 1 +\nend").unwrap_err();
    match &err {
        CompileError::Syntax { line, .. } => assert!(*line >= 2, "line {}", line),
        other => panic!("expected syntax error, got {:?}", other),
    }
    assert_eq!(Diagnostic::from(&err).code, ErrorCode::E002);
}

#[test]
fn test_stray_character() {
    let source = "begin x := 1 # 2 end";
    assert!(compile_source(source).is_err());

    let err = lexer::tokenize(source).unwrap_err();
    assert!(matches!(err, CompileError::Lexical { line: 1, column: 14, .. }));
    assert_eq!(Diagnostic::from(&err).code, ErrorCode::E001);
}

#[test]
fn test_derivation_starts_at_program() {
    let tree = parser::parse("begin print(x) end").unwrap();
    let rules = grammar::derivation(&tree).unwrap();
    assert_eq!(rules.first(), Some(&1));
    assert!(grammar::render_trace(&rules, false).starts_with("1 "));
}

#[test]
fn test_lints_on_compilable_program() {
    let program = build_ast("begin print(y); x := 1 / 0; while x > 9 do endwhile end").unwrap();
    let codes: Vec<&str> = lint::lint(&program).iter().map(|w| w.code).collect();
    assert_eq!(codes, vec!["W001", "W003", "W002"]);
}

#[test]
fn test_formatted_program_compiles_identically() {
    let source = "begin read(n); for i from 1 by 1 to n * 2 - 1 do print(i) endwhile end";
    let formatted = fmt::format_program(&build_ast(source).unwrap());
    assert_eq!(compile_source(&formatted).unwrap(), compile_source(source).unwrap());
}

#[test]
fn test_execute_countdown() {
    let source = r#"
begin
  read(n);
  while n > 0 do
    print(n);
    n := n - 1
  endwhile
end
"#;
    let ir = compile_source(source).unwrap();
    let Some(stdout) = execute(&ir, "3\n", "countdown") else {
        return;
    };
    assert_eq!(stdout, "3\n2\n1\n");
}

#[test]
fn test_execute_for_and_precedence() {
    let source = r#"
begin
  for i from 1 by 1 to 4 do
    x := i * i - -1;
    if x >= 5 and not x = 10 then print(x) else z := 0; print(z) endif
  endwhile
end
"#;
    let ir = compile_source(source).unwrap();
    for label in ["forCode0:", "ifCode0:", "elseCode0:", "endif0:", "endfor0:"] {
        assert_eq!(ir.matches(label).count(), 1, "{}", label);
    }
    let Some(stdout) = execute(&ir, "", "for") else {
        return;
    };
    // i = 1..3 (the bound is exclusive): x = 2, 5, 10
    assert_eq!(stdout, "0\n5\n0\n");
}

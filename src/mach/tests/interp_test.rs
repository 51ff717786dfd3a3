use super::{interpret, run};
use crate::lang::{self, ErrorCode};
use crate::mach::Interpreter;

fn interpret_err(source: &str) -> lang::Error {
    let tokens = lang::lex(source).expect("lex");
    let program = lang::parse(&tokens).expect("parse");
    Interpreter::new().run(&program).unwrap_err()
}

#[test]
fn test_counting_loop() {
    let source = "declare i = 0; while (i < 3) { output i; i += 1; }";
    assert_eq!(interpret(source), vec![0, 1, 2]);
}

#[test]
fn test_multiplicative_operators() {
    assert_eq!(interpret("output 6 * 7;"), vec![42]);
    assert_eq!(interpret("declare x = 6; x /= 4; output x;"), vec![1]);
    assert_eq!(interpret("output 7 % 3;"), vec![1]);
    // Truncation toward zero.
    assert_eq!(interpret("output (0 - 7) / 2;"), vec![-3]);
}

#[test]
fn test_division_by_zero() {
    let error = interpret_err("output 1 / 0;");
    assert_eq!(error.code(), ErrorCode::DivisionByZero as u16);
    let error = interpret_err("declare x = 1;\ndeclare y;\noutput x % y;");
    assert_eq!(error.to_string(), "DIVISION BY ZERO IN LINE 3");
}

#[test]
fn test_short_circuit_prevents_evaluation() {
    // The right side would fail with a subscript error if evaluated.
    let source = "declare a[2]; declare i = 5; \
                  if (i < 3 && a[i] == 0) { output 1; } else { output 0; }";
    assert_eq!(interpret(source), vec![0]);
}

#[test]
fn test_runtime_subscript_check() {
    let error = interpret_err("declare a[2]; declare i = 3; output a[i];");
    assert_eq!(error.code(), ErrorCode::SubscriptOutOfRange as u16);
}

#[test]
fn test_variables_persist_across_runs() {
    let mut interpreter = Interpreter::new();
    let declare = lang::parse(&lang::lex("declare x = 41;").unwrap()).unwrap();
    assert!(interpreter.run(&declare).unwrap().is_empty());
    let output = lang::parse(&lang::lex("++x; output x;").unwrap()).unwrap();
    assert_eq!(interpreter.run(&output).unwrap(), vec![42]);
    let error = interpreter.run(&declare).unwrap_err();
    assert_eq!(error.code(), ErrorCode::DuplicateDeclaration as u16);
}

#[test]
fn test_step_effects_run_in_source_order() {
    let sources = [
        "declare x = 0; output x - ++x; output x;",
        "declare x = 0; output ++x - x; output x;",
        "declare x = 0; \
         if (++x > x) { output 1; } else { output 0; } \
         output x;",
        "declare x = 5; \
         if (x >= --x) { output 1; } else { output 0; } \
         output x;",
    ];
    for source in sources.iter() {
        assert_eq!(run(source), interpret(source), "source: {}", source);
    }
}

#[test]
fn test_backends_agree() {
    let sources = [
        "declare i = 0; while (i < 5) { output i + 1; i += 2; }",
        "declare a[3]; declare i = 0; \
         while (i < 3) { a[i] = 9 - i; ++i; } \
         output a[0]; output a[1]; output a[2];",
        "declare x = 4; \
         if (x > 3 && x < 5) { output 1; } else { output 0; } \
         if (x == 0 || x >= 10) { output 1; } else { output 0; }",
        "output (1 - (2 - 3)) - (4 - (5 - 6));",
    ];
    for source in sources.iter() {
        assert_eq!(run(source), interpret(source), "source: {}", source);
    }
}

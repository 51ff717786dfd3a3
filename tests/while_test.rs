mod common;
use common::*;

#[test]
fn test_counting() {
    let source = "declare i = 0; while (i < 3) { output i; i += 1; }";
    assert_eq!(exec(source), "0\n1\n2\n");
    assert_eq!(interp(source), "0\n1\n2\n");
}

#[test]
fn test_countdown_on_bare_expression() {
    let source = "declare i = 3; while (i) { output i; --i; }";
    assert_eq!(exec(source), "3\n2\n1\n");
    assert_eq!(interp(source), "3\n2\n1\n");
}

#[test]
fn test_nested_loops() {
    // Multiplication by repeated addition, since the machine has no
    // multiply instruction.
    let source = "declare p = 0; declare i = 0; declare j; \
                  while (i < 3) { \
                      j = 0; \
                      while (j < 4) { p += 1; ++j; } \
                      ++i; \
                  } \
                  output p;";
    assert_eq!(exec(source), "12\n");
    assert_eq!(interp(source), "12\n");
}

#[test]
fn test_compound_exit_condition() {
    let source = "declare i = 0; while (i < 10 && i != 4) { ++i; } output i;";
    assert_eq!(exec(source), "4\n");
    assert_eq!(interp(source), "4\n");
}

#[test]
fn test_loop_never_entered() {
    let source = "declare i = 9; while (i < 3) { output i; } output 99;";
    assert_eq!(exec(source), "99\n");
    assert_eq!(interp(source), "99\n");
}

#[test]
fn test_cycle_budget() {
    assert_eq!(
        exec_n("while (0 == 0) { }", 100),
        "100 execution cycles exceeded\n"
    );
}

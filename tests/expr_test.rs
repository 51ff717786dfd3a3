mod common;
use common::*;

#[test]
fn test_additive_chain() {
    let source = "output 2 + 3 - 1 + 10;";
    assert_eq!(exec(source), "14\n");
    assert_eq!(interp(source), "14\n");
}

#[test]
fn test_parenthesized_operands_spill() {
    let source = "declare x = 2; declare y = 3; output x + (y + 4);";
    assert_eq!(exec(source), "9\n");
    assert_eq!(interp(source), "9\n");
    let source = "output (1 - (2 - 3)) - (4 - (5 - 6));";
    assert_eq!(exec(source), "-3\n");
    assert_eq!(interp(source), "-3\n");
}

#[test]
fn test_step_inside_expression() {
    let source = "declare i = 4; output ++i + 10; output i;";
    assert_eq!(exec(source), "15\n5\n");
    assert_eq!(interp(source), "15\n5\n");
}

#[test]
fn test_step_in_operand_position() {
    // The increment lands before the right side is read on both backends.
    let source = "declare x = 0; output x - ++x; output x;";
    assert_eq!(exec(source), "-1\n1\n");
    assert_eq!(interp(source), "-1\n1\n");
}

#[test]
fn test_compound_assignment_operators() {
    let source = "declare x = 10; x -= 3; x += 1; output x;";
    assert_eq!(exec(source), "8\n");
    assert_eq!(interp(source), "8\n");
}

#[test]
fn test_generator_rejects_multiplicative() {
    assert_eq!(exec("output 2 * 3;"), "UNSUPPORTED OPERATOR IN LINE 1\n");
    assert_eq!(exec("output 8 / 2;"), "UNSUPPORTED OPERATOR IN LINE 1\n");
    assert_eq!(exec("output 8 % 3;"), "UNSUPPORTED OPERATOR IN LINE 1\n");
    assert_eq!(
        exec("declare x = 2;\nx *= 2;"),
        "UNSUPPORTED OPERATOR IN LINE 2\n"
    );
}

#[test]
fn test_interpreter_accepts_multiplicative() {
    assert_eq!(interp("output 2 * 3;"), "6\n");
    assert_eq!(interp("output 8 / 2;"), "4\n");
    assert_eq!(interp("output 8 % 3;"), "2\n");
    assert_eq!(interp("declare x = 2; x *= 7; output x;"), "14\n");
    // Truncating division.
    assert_eq!(interp("output 7 / 2;"), "3\n");
    assert_eq!(interp("output (0 - 7) / 2;"), "-3\n");
}

#[test]
fn test_division_by_zero() {
    assert_eq!(interp("output 1 / 0;"), "DIVISION BY ZERO IN LINE 1\n");
    assert_eq!(
        interp("declare x;\noutput 3 % x;"),
        "DIVISION BY ZERO IN LINE 2\n"
    );
}

#[test]
fn test_undeclared_and_duplicate() {
    assert_eq!(exec("output q;"), "UNDECLARED VARIABLE IN LINE 1\n");
    assert_eq!(
        exec("declare x;\ndeclare x;"),
        "DUPLICATE DECLARATION IN LINE 2\n"
    );
    assert_eq!(interp("output q;"), "UNDECLARED VARIABLE IN LINE 1\n");
}

#[test]
fn test_negative_results() {
    let source = "declare x = 3; output x - 10;";
    assert_eq!(exec(source), "-7\n");
    assert_eq!(interp(source), "-7\n");
}

// Integration tests for the minipy interpreter
//
// These tests verify the interpreter's behavior by running complete
// programs and checking captured print output or the resulting globals.
// Tests cover:
// - Arithmetic on big integers, floats, and strings
// - Assignment (chained, augmented) and scoping
// - Control flow (if/elif/else, while, break/continue, return)
// - Functions with positional, keyword, and default arguments
// - Short-circuit operators and chained comparisons
// - F-string interpolation and the built-in functions
// - Fatal runtime errors

use minipy::bigint::BigInt;
use minipy::errors::ErrorKind;
use minipy::interpreter::{Interpreter, Value};
use minipy::lexer::tokenize;
use minipy::parser::Parser;
use std::sync::{Arc, Mutex};

fn run_code(code: &str) -> (Interpreter, String) {
    let tokens = tokenize(code).expect("lexing failed");
    let mut parser = Parser::new(tokens);
    let program = parser.parse().expect("parsing failed");
    let mut interp = Interpreter::new();
    let buffer = Arc::new(Mutex::new(Vec::new()));
    interp.set_output(buffer.clone());
    interp.run(&program).expect("evaluation failed");
    let output = String::from_utf8(buffer.lock().unwrap().clone()).expect("output was not UTF-8");
    (interp, output)
}

fn run_output(code: &str) -> String {
    run_code(code).1
}

/// Runs a program expected to abort, returning the error kind.
fn run_error(code: &str) -> ErrorKind {
    let tokens = tokenize(code).expect("lexing failed");
    let mut parser = Parser::new(tokens);
    let program = parser.parse().expect("parsing failed");
    let mut interp = Interpreter::new();
    interp.set_output(Arc::new(Mutex::new(Vec::new())));
    interp.run(&program).expect_err("expected a runtime error").kind
}

#[test]
fn test_big_integer_multiplication() {
    let out = run_output("x = 100000000000000000000 * 100000000000000000000\nprint(x)\n");
    assert_eq!(out, "10000000000000000000000000000000000000000\n");
}

#[test]
fn test_floor_division_and_modulo_signs() {
    let out = run_output("a = -7\nb = 2\nprint(a // b, a % b)\n");
    assert_eq!(out, "-4 1\n");
    let out = run_output("print(7 // -2, 7 % -2)\n");
    assert_eq!(out, "-4 -1\n");
}

#[test]
fn test_defaults_and_keyword_arguments() {
    let code = "def f(x, y=3):\n    return x + y\nprint(f(1))\nprint(f(1, 2))\nprint(f(y=10, x=5))\n";
    assert_eq!(run_output(code), "4\n3\n15\n");
}

#[test]
fn test_string_repetition_and_concatenation() {
    assert_eq!(run_output("s = \"ha\"\nprint(s * 3 + \"!\")\n"), "hahaha!\n");
    assert_eq!(run_output("print(3 * \"ab\")\n"), "ababab\n");
    assert_eq!(run_output("print(\"ab\" * -2 + \"end\")\n"), "end\n");
}

#[test]
fn test_while_loop_factorial() {
    let code = "n = 5\nacc = 1\nwhile n > 0:\n    acc *= n\n    n -= 1\nprint(acc)\n";
    assert_eq!(run_output(code), "120\n");
}

#[test]
fn test_recursive_factorial_overflows_machine_integers() {
    let code = "def fact(n):\n    if n <= 1:\n        return 1\n    return n * fact(n - 1)\nprint(fact(25))\n";
    assert_eq!(run_output(code), "15511210043330985984000000\n");
}

#[test]
fn test_fstring_interpolation() {
    assert_eq!(
        run_output("name = \"world\"\nprint(f\"hello {name}!\")\n"),
        "hello world!\n"
    );
}

#[test]
fn test_fstring_expression_list_is_space_joined() {
    let code = "a = 1\nb = 2\nprint(f\"pair: {a, b}\")\n";
    assert_eq!(run_output(code), "pair: 1 2\n");
}

#[test]
fn test_fstring_embedded_arithmetic() {
    assert_eq!(run_output("n = 6\nprint(f\"{n * 7} wins\")\n"), "42 wins\n");
}

#[test]
fn test_short_circuit_or_skips_second_operand() {
    let code = "def t():\n    print(\"called\")\n    return 2\nx = 1 or t()\nprint(x)\n";
    assert_eq!(run_output(code), "1\n");
}

#[test]
fn test_short_circuit_and_skips_second_operand() {
    let code = "def t():\n    print(\"called\")\n    return 2\nx = 0 and t()\nprint(x)\n";
    assert_eq!(run_output(code), "0\n");
}

#[test]
fn test_boolean_operators_preserve_values() {
    assert_eq!(run_output("print(0 or \"fallback\")\n"), "fallback\n");
    assert_eq!(run_output("print(1 and 2 and 3)\n"), "3\n");
    assert_eq!(run_output("print(not \"\")\nprint(not 5)\n"), "True\nFalse\n");
}

#[test]
fn test_chained_comparison_evaluates_middle_once() {
    let code = "def mid():\n    print(\"mid\")\n    return 5\nprint(1 < mid() < 10)\n";
    assert_eq!(run_output(code), "mid\nTrue\n");
}

#[test]
fn test_chained_comparison_short_circuits() {
    let code = "def boom():\n    print(\"boom\")\n    return 0\nprint(9 < 2 < boom())\n";
    assert_eq!(run_output(code), "False\n");
}

#[test]
fn test_scope_isolation_after_return() {
    let code = "def f():\n    local = 99\n    return 1\nx = f()\nprint(local)\n";
    let (interp, out) = run_code(code);
    assert_eq!(out, "None\n");
    assert_eq!(interp.env.get("local"), None);
    assert_eq!(interp.env.get("x"), Some(Value::Int(BigInt::from(1))));
}

#[test]
fn test_parameters_shadow_globals() {
    let code = "x = \"global\"\ndef f(x):\n    return x\nprint(f(\"inner\"))\nprint(x)\n";
    assert_eq!(run_output(code), "inner\nglobal\n");
}

#[test]
fn test_defaults_captured_at_definition_time() {
    let code = "n = 5\ndef f(x=n):\n    return x\nn = 10\nprint(f())\n";
    assert_eq!(run_output(code), "5\n");
}

#[test]
fn test_later_definition_shadows_earlier() {
    let code = "def f():\n    return 1\ndef f():\n    return 2\nprint(f())\n";
    assert_eq!(run_output(code), "2\n");
}

#[test]
fn test_fall_through_returns_none() {
    let code = "def f():\n    x = 1\nprint(f())\n";
    assert_eq!(run_output(code), "None\n");
}

#[test]
fn test_bare_return() {
    let code = "def f():\n    return\nprint(f())\n";
    assert_eq!(run_output(code), "None\n");
}

#[test]
fn test_chained_assignment_evaluates_rhs_once() {
    let code = "def v():\n    print(\"once\")\n    return 7\na = b = v()\nprint(a, b)\n";
    assert_eq!(run_output(code), "once\n7 7\n");
}

#[test]
fn test_augmented_assignment_operators() {
    let code = "x = 10\nx += 5\nx -= 3\nx *= 2\nx //= 4\nx %= 4\nprint(x)\n";
    // ((10 + 5 - 3) * 2) // 4 = 6, 6 % 4 = 2
    assert_eq!(run_output(code), "2\n");
    assert_eq!(run_output("x = 9\nx /= 2\nprint(x)\n"), "4.500000\n");
}

#[test]
fn test_if_elif_else_first_true_branch_wins() {
    let code = "x = 5\nif x < 0:\n    print(\"neg\")\nelif x == 5:\n    print(\"five\")\nelif x > 1:\n    print(\"big\")\nelse:\n    print(\"other\")\n";
    assert_eq!(run_output(code), "five\n");
}

#[test]
fn test_break_and_continue() {
    let code = "i = 0\nwhile True:\n    i += 1\n    if i == 3:\n        continue\n    if i > 5:\n        break\n    print(i)\n";
    assert_eq!(run_output(code), "1\n2\n4\n5\n");
}

#[test]
fn test_nested_loops_break_inner_only() {
    let code = "i = 0\nwhile i < 2:\n    j = 0\n    while True:\n        j += 1\n        if j == 2:\n            break\n    print(i, j)\n    i += 1\n";
    assert_eq!(run_output(code), "0 2\n1 2\n");
}

#[test]
fn test_return_unwinds_out_of_loop() {
    let code = "def first_over(limit):\n    n = 0\n    while True:\n        n += 1\n        if n > limit:\n            return n\nprint(first_over(4))\n";
    assert_eq!(run_output(code), "5\n");
}

#[test]
fn test_true_division_is_float() {
    assert_eq!(run_output("print(7 / 2)\n"), "3.500000\n");
    assert_eq!(run_output("print(1 / 0.0)\n"), "inf\n");
}

#[test]
fn test_mixed_equality() {
    assert_eq!(run_output("print(1 == 1.0)\nprint(\"1\" == 1)\nprint(1 != 2)\n"), "True\nFalse\nTrue\n");
}

#[test]
fn test_undefined_name_reads_as_none() {
    assert_eq!(run_output("print(missing)\n"), "None\n");
}

#[test]
fn test_unknown_function_call_yields_none() {
    assert_eq!(run_output("print(mystery(1, 2))\n"), "None\n");
}

#[test]
fn test_builtin_conversions() {
    let code = "print(int(\"42\"), int(3.9), int())\nprint(float(2), str(5) + \"!\", bool(0), bool(\"x\"))\n";
    assert_eq!(run_output(code), "42 3 0\n2.000000 5! False True\n");
}

#[test]
fn test_print_with_no_arguments_emits_blank_line() {
    assert_eq!(run_output("print()\nprint(1)\n"), "\n1\n");
}

#[test]
fn test_adjacent_string_literals_concatenate() {
    assert_eq!(run_output("print(\"foo\" \"bar\")\n"), "foobar\n");
}

#[test]
fn test_string_escapes_in_output() {
    assert_eq!(run_output("print(\"a\\tb\")\n"), "a\tb\n");
}

#[test]
fn test_semicolons_separate_small_statements() {
    assert_eq!(run_output("a = -7; b = 2; print(a // b, a % b)\n"), "-4 1\n");
}

#[test]
fn test_unary_minus_on_values() {
    assert_eq!(run_output("x = 5\nprint(-x, -2.5, -0)\n"), "-5 -2.500000 0\n");
}

#[test]
fn test_integer_division_by_zero_aborts() {
    assert_eq!(run_error("x = 1 // 0\n"), ErrorKind::DivisionByZero);
    assert_eq!(run_error("x = 1 % 0\n"), ErrorKind::DivisionByZero);
}

#[test]
fn test_stray_control_flow_aborts() {
    assert_eq!(run_error("break\n"), ErrorKind::StrayControlFlow);
    assert_eq!(run_error("continue\n"), ErrorKind::StrayControlFlow);
    assert_eq!(run_error("return 1\n"), ErrorKind::StrayControlFlow);
}

#[test]
fn test_comparison_of_strings_is_lexicographic() {
    assert_eq!(run_output("print(\"apple\" < \"banana\")\nprint(\"b\" < \"a\")\n"), "True\nFalse\n");
}

#[test]
fn test_else_branch_taken_when_no_test_matches() {
    let code = "x = 0\nif x:\n    print(\"then\")\nelse:\n    print(\"else\")\n";
    assert_eq!(run_output(code), "else\n");
}

#[test]
fn test_single_line_suite() {
    assert_eq!(run_output("if 1: print(\"yes\")\n"), "yes\n");
}

#[test]
fn test_globals_visible_inside_functions() {
    let code = "base = 10\ndef shifted(n):\n    return base + n\nprint(shifted(5))\n";
    assert_eq!(run_output(code), "15\n");
}

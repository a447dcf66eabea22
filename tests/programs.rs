mod common;

use std::fs::read_to_string;

use assert2::assert;
use tacgen::ir::InvariantPolicy;
use tacgen::{Error, TacGenBuilder};
use yare::parameterized;

#[parameterized(
    arithmetic = { "arithmetic" },
    boolean = { "boolean" },
    control = { "control" },
    switch = { "switch" },
    bool_compare = { "bool_compare" },
    undefined = { "undefined" },
    declarations_only = { "declarations_only" },
)]
fn test_compile_program(name: &str) {
    let input = read_to_string(format!("tests/test-resources/{name}.src")).unwrap();
    let expected_output = read_to_string(format!("tests/test-resources/{name}.tac")).unwrap();

    let output = common::compile(&input);

    self::assert!(output == expected_output);
}

#[parameterized(
    arithmetic = { "arithmetic" },
    boolean = { "boolean" },
    control = { "control" },
    switch = { "switch" },
    bool_compare = { "bool_compare" },
)]
fn test_strict_mode_accepts_valid_program(name: &str) {
    let input = read_to_string(format!("tests/test-resources/{name}.src")).unwrap();
    let mut tacgen = TacGenBuilder::default()
        .invariant_policy(InvariantPolicy::Fail)
        .output_handler(|_| {})
        .build();

    let report = tacgen.compile(&input).expect("Failed to compile program");
    self::assert!(report.violations.is_empty());
    self::assert!(report.emitted > 0);
}

#[test]
fn test_strict_mode_rejects_undefined_identifier() {
    let input = read_to_string("tests/test-resources/undefined.src").unwrap();
    let mut tacgen = TacGenBuilder::default()
        .invariant_policy(InvariantPolicy::Fail)
        .output_handler(|_| {})
        .build();

    let result = tacgen.compile(&input);
    self::assert!(let Err(Error::Codegen(_)) = result);
}

#[test]
fn test_control_program_runs() {
    let input = read_to_string("tests/test-resources/control.src").unwrap();
    let machine = common::Machine::load(&common::compile(&input));
    let execution = machine.run(&[]);

    // 0 + 1 + ... + 6 = 21 is the first sum above 20
    self::assert!(execution.get("s") == 21);
    self::assert!(execution.get("i") == 7);
    self::assert!(execution.get("done") == 1);
    self::assert!(execution.errors == 0);
}

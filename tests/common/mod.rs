//! Tiny interpreter for the generated three-address code, used to check
//! the runtime behavior of the emitted text.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use tacgen::TacGenBuilder;

const STEP_LIMIT: usize = 10_000;

/// Compiles `source` with default options and returns the generated text.
pub fn compile(source: &str) -> String {
    let output = Rc::new(RefCell::new(String::new()));
    let output_clone = Rc::clone(&output);
    let mut tacgen = TacGenBuilder::default()
        .output_handler(move |line: String| {
            output_clone.borrow_mut().push_str(&line);
            output_clone.borrow_mut().push('\n');
        })
        .build();
    tacgen.compile(source).expect("Failed to compile program");
    output.borrow().clone()
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Copy { dst: String, src: String },
    Binary { dst: String, left: String, op: String, right: String },
    Negate { dst: String, src: String },
    Label,
    Goto(String),
    If { negated: bool, left: String, op: String, right: String, target: String },
    Error,
}

fn parse_line(line: &str) -> Op {
    let tokens = line.split_whitespace().collect::<Vec<_>>();
    match tokens.as_slice() {
        ["error"] => Op::Error,
        [_label] => Op::Label,
        ["goto", target] => Op::Goto(target.to_string()),
        [kind @ ("if" | "ifFalse"), left, op, right, "goto", target] => Op::If {
            negated: *kind == "ifFalse",
            left: left.to_string(),
            op: op.to_string(),
            right: right.to_string(),
            target: target.to_string(),
        },
        [dst, "=", "-", src] => Op::Negate {
            dst: dst.to_string(),
            src: src.to_string(),
        },
        [dst, "=", left, op, right] => Op::Binary {
            dst: dst.to_string(),
            left: left.to_string(),
            op: op.to_string(),
            right: right.to_string(),
        },
        [dst, "=", src] => Op::Copy {
            dst: dst.to_string(),
            src: src.to_string(),
        },
        _ => panic!("Unrecognized line: {line:?}"),
    }
}

pub struct Machine {
    lines: Vec<String>,
    ops: Vec<Op>,
    labels: HashMap<String, usize>,
}

#[derive(Debug)]
pub struct Execution {
    pub vars: HashMap<String, i64>,
    /// Indices of the executed lines, in execution order.
    pub trace: Vec<usize>,
    pub errors: usize,
    lines: Vec<String>,
}

impl Execution {
    pub fn get(&self, name: &str) -> i64 {
        self.vars.get(name).copied().unwrap_or(0)
    }

    pub fn executed(&self) -> Vec<&str> {
        self.trace.iter().map(|&i| self.lines[i].as_str()).collect()
    }
}

impl Machine {
    pub fn load(text: &str) -> Self {
        let lines = text.lines().map(str::to_string).collect::<Vec<_>>();
        let ops = lines.iter().map(|line| parse_line(line)).collect::<Vec<_>>();
        let mut labels = HashMap::new();
        for (index, (line, op)) in lines.iter().zip(&ops).enumerate() {
            if *op == Op::Label {
                let previous = labels.insert(line.trim().to_string(), index);
                assert!(previous.is_none(), "Label {line} placed twice");
            }
        }
        Machine { lines, ops, labels }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Labels placed in the code.
    pub fn placed_labels(&self) -> impl Iterator<Item = &String> {
        self.labels.keys()
    }

    /// Labels named by any jump, with repetition.
    pub fn jump_targets(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Goto(target) | Op::If { target, .. } => Some(target.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Runs the code from the first line with the given initial variables.
    pub fn run(&self, inputs: &[(&str, i64)]) -> Execution {
        let mut vars = inputs
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect::<HashMap<_, _>>();
        let mut trace = Vec::new();
        let mut errors = 0;
        let mut pc = 0;

        while pc < self.ops.len() {
            assert!(trace.len() < STEP_LIMIT, "Step limit exceeded");
            trace.push(pc);

            let value = |vars: &HashMap<String, i64>, operand: &str| {
                operand
                    .parse::<i64>()
                    .unwrap_or_else(|_| vars.get(operand).copied().unwrap_or(0))
            };

            match &self.ops[pc] {
                Op::Copy { dst, src } => {
                    let v = value(&vars, src);
                    vars.insert(dst.clone(), v);
                }
                Op::Binary {
                    dst,
                    left,
                    op,
                    right,
                } => {
                    let (l, r) = (value(&vars, left), value(&vars, right));
                    let v = match op.as_str() {
                        "+" => l.wrapping_add(r),
                        "-" => l.wrapping_sub(r),
                        "*" => l.wrapping_mul(r),
                        "/" => l.checked_div(r).expect("Division by zero"),
                        "%" => l.checked_rem(r).expect("Division by zero"),
                        _ => panic!("Unknown operator {op}"),
                    };
                    vars.insert(dst.clone(), v);
                }
                Op::Negate { dst, src } => {
                    let v = value(&vars, src).wrapping_neg();
                    vars.insert(dst.clone(), v);
                }
                Op::Label => {}
                Op::Error => errors += 1,
                Op::Goto(target) => {
                    pc = self.label(target);
                    continue;
                }
                Op::If {
                    negated,
                    left,
                    op,
                    right,
                    target,
                } => {
                    let (l, r) = (value(&vars, left), value(&vars, right));
                    let holds = match op.as_str() {
                        "==" => l == r,
                        "!=" => l != r,
                        "<" => l < r,
                        "<=" => l <= r,
                        ">" => l > r,
                        ">=" => l >= r,
                        _ => panic!("Unknown relational operator {op}"),
                    };
                    if holds != *negated {
                        pc = self.label(target);
                        continue;
                    }
                }
            }
            pc += 1;
        }

        Execution {
            vars,
            trace,
            errors,
            lines: self.lines.clone(),
        }
    }

    fn label(&self, name: &str) -> usize {
        *self
            .labels
            .get(name)
            .unwrap_or_else(|| panic!("Jump to unplaced label {name}"))
    }
}

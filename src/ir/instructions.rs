// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::ast::{ArithmeticOperator, RelationalOperator};
use crate::ir::Violation;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn new(name: impl Into<String>) -> Self {
        Label(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Relational test of a conditional jump, e.g. `a < _t0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub left: String,
    pub op: RelationalOperator,
    pub right: String,
}

impl Condition {
    pub fn new(left: impl Into<String>, op: RelationalOperator, right: impl Into<String>) -> Self {
        Condition {
            left: left.into(),
            op,
            right: right.into(),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

/// One line of three-address code.
///
/// Operands are addresses: a declared identifier, a temporary or literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// `dst = src`
    Copy { dst: String, src: String },
    /// `dst = left op right`
    Binary {
        dst: String,
        left: String,
        op: ArithmeticOperator,
        right: String,
    },
    /// `dst = - src`
    Negate { dst: String, src: String },

    // Control flow instructions
    /// A bare label placed in the stream.
    Label(Label),
    /// `goto label`
    Goto(Label),
    /// `if cond goto label`, taken when the condition holds
    IfGoto { condition: Condition, target: Label },
    /// `ifFalse cond goto label`, taken when the condition does not hold
    IfFalseGoto { condition: Condition, target: Label },

    /// Marker left in the stream when generation hit an internal invariant violation.
    Error,
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Copy { dst, src } => write!(f, "{dst} = {src}"),
            Instruction::Binary {
                dst,
                left,
                op,
                right,
            } => write!(f, "{dst} = {left} {op} {right}"),
            Instruction::Negate { dst, src } => write!(f, "{dst} = - {src}"),
            Instruction::Label(label) => write!(f, "{label}"),
            Instruction::Goto(target) => write!(f, "goto {target}"),
            Instruction::IfGoto { condition, target } => write!(f, "if {condition} goto {target}"),
            Instruction::IfFalseGoto { condition, target } => {
                write!(f, "ifFalse {condition} goto {target}")
            }
            Instruction::Error => write!(f, "error"),
        }
    }
}

/// Append-only destination of the generated code.
pub trait Sink {
    fn emit(&mut self, instruction: Instruction);
}

impl Sink for Vec<Instruction> {
    fn emit(&mut self, instruction: Instruction) {
        self.push(instruction);
    }
}

/// Renders every instruction to its text line and hands it to a callback.
pub struct LineSink<F: FnMut(String)> {
    handler: F,
}

impl<F: FnMut(String)> LineSink<F> {
    pub fn new(handler: F) -> Self {
        LineSink { handler }
    }
}

impl<F: FnMut(String)> Sink for LineSink<F> {
    fn emit(&mut self, instruction: Instruction) {
        (self.handler)(instruction.to_string());
    }
}

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub instructions: Vec<Instruction>,
    /// Invariant violations that were reported with an `error` marker.
    pub violations: Vec<Violation>,
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            writeln!(f, "{instruction}")?;
        }
        Ok(())
    }
}

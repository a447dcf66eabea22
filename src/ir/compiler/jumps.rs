// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

//! Jumping code for boolean expressions.
//!
//! A boolean expression is never evaluated into a value and then tested.
//! Instead it is compiled against a pair of targets: where control goes when
//! the expression is true and where it goes when it is false. Either target
//! may be [`Target::Fall`], meaning control simply continues with the next
//! emitted instruction, so no jump is needed for that outcome.

use super::{CodeGenerator, CodegenError, Violation};
use crate::ast::{Expression, LogicalOperator, RelationalOperator, VarType};
use crate::ir::{Condition, Instruction, Label};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Label(Label),
    /// Continue with the next emitted instruction.
    Fall,
}

impl Target {
    pub fn is_fall(&self) -> bool {
        matches!(self, Target::Fall)
    }
}

/// Where control goes after a boolean expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpTargets {
    pub on_true: Target,
    pub on_false: Target,
}

impl JumpTargets {
    pub fn new(on_true: Target, on_false: Target) -> Self {
        Self { on_true, on_false }
    }

    /// The same targets with the true and false outcomes exchanged.
    pub fn swapped(self) -> Self {
        Self {
            on_true: self.on_false,
            on_false: self.on_true,
        }
    }
}

impl CodeGenerator<'_> {
    /// Emits code that transfers control to `targets.on_true` when `expr`
    /// holds and to `targets.on_false` otherwise.
    pub(super) fn compile_jumps(
        &mut self,
        expr: &Expression,
        targets: JumpTargets,
    ) -> Result<(), CodegenError> {
        match expr {
            Expression::Logical {
                operands,
                operators,
            } => self.compile_logical(operands, operators, targets),
            Expression::Comparison { left, tail: None } => self.compile_jumps(left, targets),
            Expression::Comparison {
                left,
                tail: Some((op, right)),
            } => self.compile_comparison(left, *op, right, targets),
            Expression::Not { negations, operand } => {
                // An even number of negations cancels out.
                let targets = if negations % 2 == 1 {
                    targets.swapped()
                } else {
                    targets
                };
                self.compile_jumps(operand, targets)
            }
            Expression::Group(inner) => self.compile_jumps(inner, targets),
            Expression::Boolean(value) => {
                let target = if *value {
                    &targets.on_true
                } else {
                    &targets.on_false
                };
                if let Target::Label(label) = target {
                    self.emit_goto(label);
                }
                Ok(())
            }
            Expression::Identifier(name) => match self.lookup(name)? {
                Some(VarType::Bool) => self.emit_conditional_jump(
                    Condition::new(name.clone(), RelationalOperator::Equal, "1"),
                    &targets,
                ),
                Some(VarType::Number) => Err(CodegenError::UnsupportedShape(format!(
                    "Number variable {name} used as a condition"
                ))),
                None => Ok(()),
            },
            Expression::Arithmetic {
                operands,
                operators,
            } if operators.is_empty() && operands.len() == 1 => {
                self.compile_jumps(&operands[0], targets)
            }
            Expression::Negate {
                negations: 0,
                operand,
            } => self.compile_jumps(operand, targets),
            Expression::Arithmetic { .. } | Expression::Negate { .. } | Expression::Integer(_) => {
                Err(CodegenError::UnsupportedShape(format!(
                    "Arithmetic expression used as a condition: {expr:?}"
                )))
            }
        }
    }

    /// `operands[0] op0 (operands[1] op1 (...))`, the chain associates to the right.
    fn compile_logical(
        &mut self,
        operands: &[Expression],
        operators: &[LogicalOperator],
        targets: JumpTargets,
    ) -> Result<(), CodegenError> {
        if operands.len() != operators.len() + 1 {
            return Err(CodegenError::UnsupportedShape(format!(
                "Logical expression with {} operands and {} operators",
                operands.len(),
                operators.len()
            )));
        }

        let (left, rest) = (&operands[0], &operands[1..]);
        let Some((operator, rest_operators)) = operators.split_first() else {
            return self.compile_jumps(left, targets);
        };

        match operator {
            LogicalOperator::Or => match &targets.on_true {
                Target::Fall => {
                    // The left side short-circuits past the right side.
                    let true_label = self.names.new_label();
                    self.compile_jumps(
                        left,
                        JumpTargets::new(Target::Label(true_label.clone()), Target::Fall),
                    )?;
                    self.compile_logical(
                        rest,
                        rest_operators,
                        JumpTargets::new(Target::Fall, targets.on_false.clone()),
                    )?;
                    self.place_label(&true_label);
                }
                Target::Label(on_true) => {
                    self.compile_jumps(
                        left,
                        JumpTargets::new(Target::Label(on_true.clone()), Target::Fall),
                    )?;
                    self.compile_logical(
                        rest,
                        rest_operators,
                        JumpTargets::new(targets.on_true.clone(), targets.on_false.clone()),
                    )?;
                }
            },
            LogicalOperator::And => match &targets.on_false {
                Target::Fall => {
                    let false_label = self.names.new_label();
                    self.compile_jumps(
                        left,
                        JumpTargets::new(Target::Fall, Target::Label(false_label.clone())),
                    )?;
                    self.compile_logical(
                        rest,
                        rest_operators,
                        JumpTargets::new(targets.on_true.clone(), Target::Fall),
                    )?;
                    self.place_label(&false_label);
                }
                Target::Label(on_false) => {
                    self.compile_jumps(
                        left,
                        JumpTargets::new(Target::Fall, Target::Label(on_false.clone())),
                    )?;
                    self.compile_logical(
                        rest,
                        rest_operators,
                        JumpTargets::new(targets.on_true.clone(), targets.on_false.clone()),
                    )?;
                }
            },
        }
        Ok(())
    }

    fn compile_comparison(
        &mut self,
        left: &Expression,
        op: RelationalOperator,
        right: &Expression,
        targets: JumpTargets,
    ) -> Result<(), CodegenError> {
        if targets.on_true.is_fall() && targets.on_false.is_fall() {
            return self.report(Violation::MissingJumpTarget(format!("comparison {op}")));
        }

        let (left, right) = match self.operand_kind(left) {
            VarType::Number => {
                let left = self.compile_value(left)?;
                let right = self.compile_value(right)?;
                (left, right)
            }
            VarType::Bool => {
                let left_temp = self.names.new_temp();
                let left = self.materialize(left, left_temp, None)?;
                let right_temp = self.names.new_temp();
                let right = self.materialize(right, right_temp, None)?;
                (left, right)
            }
        };

        self.emit_conditional_jump(Condition::new(left, op, right), &targets)
    }

    /// Emits the cheapest jump sequence for a relational test.
    fn emit_conditional_jump(
        &mut self,
        condition: Condition,
        targets: &JumpTargets,
    ) -> Result<(), CodegenError> {
        match (&targets.on_true, &targets.on_false) {
            (Target::Label(on_true), Target::Label(on_false)) => {
                self.emit(Instruction::IfGoto {
                    condition,
                    target: on_true.clone(),
                });
                self.emit_goto(on_false);
            }
            (Target::Label(on_true), Target::Fall) => self.emit(Instruction::IfGoto {
                condition,
                target: on_true.clone(),
            }),
            (Target::Fall, Target::Label(on_false)) => self.emit(Instruction::IfFalseGoto {
                condition,
                target: on_false.clone(),
            }),
            (Target::Fall, Target::Fall) => {
                return self.report(Violation::MissingJumpTarget(condition.to_string()));
            }
        }
        Ok(())
    }

    /// Decides whether a comparison operand is numeric or boolean by walking
    /// down its leftmost chain until a node whose type is known.
    fn operand_kind(&self, expr: &Expression) -> VarType {
        match expr {
            // Undefined identifiers are reported when the operand is compiled.
            Expression::Identifier(name) => self.symbols.lookup(name).unwrap_or(VarType::Number),
            Expression::Integer(_) => VarType::Number,
            Expression::Boolean(_) => VarType::Bool,
            Expression::Group(inner) | Expression::Comparison { left: inner, tail: None } => {
                self.operand_kind(inner)
            }
            Expression::Comparison { tail: Some(_), .. } => VarType::Bool,
            Expression::Logical {
                operands,
                operators,
            } => match (operators.is_empty(), operands.first()) {
                (true, Some(first)) => self.operand_kind(first),
                _ => VarType::Bool,
            },
            Expression::Arithmetic {
                operands,
                operators,
            } => match (operators.is_empty(), operands.first()) {
                (true, Some(first)) => self.operand_kind(first),
                _ => VarType::Number,
            },
            Expression::Negate {
                negations: 0,
                operand,
            }
            | Expression::Not {
                negations: 0,
                operand,
            } => self.operand_kind(operand),
            Expression::Negate { .. } => VarType::Number,
            Expression::Not { .. } => VarType::Bool,
        }
    }

    /// Stores the truth value of `expr` into `dst` as `1` or `0` and returns `dst`.
    ///
    /// When `merge` is given, the enclosing statement places that label right
    /// after this code, so it is jumped to but not placed here.
    pub(super) fn materialize(
        &mut self,
        expr: &Expression,
        dst: String,
        merge: Option<Label>,
    ) -> Result<String, CodegenError> {
        let false_label = self.names.new_label();
        let (merge_label, place_merge) = match merge {
            Some(label) => (label, false),
            None => (self.names.new_label(), true),
        };

        self.compile_jumps(
            expr,
            JumpTargets::new(Target::Fall, Target::Label(false_label.clone())),
        )?;

        self.emit(Instruction::Copy {
            dst: dst.clone(),
            src: "1".to_string(),
        });
        self.emit_goto(&merge_label);
        self.place_label(&false_label);
        self.emit(Instruction::Copy {
            dst: dst.clone(),
            src: "0".to_string(),
        });
        if place_merge {
            self.place_label(&merge_label);
        }

        Ok(dst)
    }
}

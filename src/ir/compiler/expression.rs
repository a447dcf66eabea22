// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

use itertools::Itertools;

use super::{CodeGenerator, CodegenError};
use crate::ast::Expression;
use crate::ir::Instruction;

impl CodeGenerator<'_> {
    /// Compiles a value-producing expression and returns the address holding
    /// its value. Operands are evaluated strictly left to right.
    pub(super) fn compile_value(&mut self, expr: &Expression) -> Result<String, CodegenError> {
        match expr {
            Expression::Identifier(name) => {
                self.lookup(name)?;
                Ok(name.clone())
            }
            Expression::Integer(value) => Ok(value.to_string()),
            Expression::Group(inner) => self.compile_value(inner),
            Expression::Comparison { left, tail: None } => self.compile_value(left),
            Expression::Arithmetic {
                operands,
                operators,
            } => {
                let Some((first, rest)) = operands.split_first() else {
                    return Err(CodegenError::UnsupportedShape(
                        "Arithmetic expression without operands".to_string(),
                    ));
                };
                if rest.len() != operators.len() {
                    return Err(CodegenError::UnsupportedShape(format!(
                        "Arithmetic expression with {} operands and {} operators",
                        operands.len(),
                        operators.len()
                    )));
                }

                let mut address = self.compile_value(first)?;
                for (op, operand) in operators.iter().zip_eq(rest) {
                    let right = self.compile_value(operand)?;
                    let dst = self.names.new_temp();
                    self.emit(Instruction::Binary {
                        dst: dst.clone(),
                        left: address,
                        op: *op,
                        right,
                    });
                    address = dst;
                }
                Ok(address)
            }
            Expression::Negate { negations, operand } => {
                let mut address = self.compile_value(operand)?;
                for _ in 0..*negations {
                    let dst = self.names.new_temp();
                    self.emit(Instruction::Negate {
                        dst: dst.clone(),
                        src: address,
                    });
                    address = dst;
                }
                Ok(address)
            }
            Expression::Logical {
                operands,
                operators,
            } if operators.is_empty() && operands.len() == 1 => self.compile_value(&operands[0]),
            Expression::Not {
                negations: 0,
                operand,
            } => self.compile_value(operand),
            Expression::Logical { .. }
            | Expression::Comparison { tail: Some(_), .. }
            | Expression::Not { .. }
            | Expression::Boolean(_) => {
                // Boolean value wanted as a plain value, e.g. a boolean switch selector.
                let temp = self.names.new_temp();
                self.materialize(expr, temp, None)
            }
        }
    }
}

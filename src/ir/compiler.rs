// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

mod expression;
mod jumps;

use crate::ast::{self, RelationalOperator, VarType};
use crate::ir::{self, Condition, Instruction, Label, NameGenerator, NameKind, Sink};
use crate::symbols::SymbolTable;

use itertools::Itertools;
use thiserror::Error;

pub use jumps::{JumpTargets, Target};

/// What to do when generation detects an internal invariant violation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum InvariantPolicy {
    /// Emit an `error` line, remember the violation and keep going.
    #[default]
    EmitMarker,
    /// Abort generation with [`CodegenError::InvariantViolation`].
    Fail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    pub invariant_policy: InvariantPolicy,
    pub temp_prefix: String,
    pub label_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            invariant_policy: InvariantPolicy::default(),
            temp_prefix: "_t".to_string(),
            label_prefix: "_L".to_string(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("Boolean value consumed without a jump target: {0}")]
    MissingJumpTarget(String),

    #[error("Undefined identifier: {0}")]
    UndefinedIdentifier(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    #[error("Invariant violation: {0}")]
    InvariantViolation(#[from] Violation),

    #[error("Unsupported input shape: {0}")]
    UnsupportedShape(String),
}

/// Single-pass three-address code generator.
///
/// The generator borrows the symbol table and the output sink for the whole
/// compilation and owns the name counters, so two generators never share
/// state.
pub struct CodeGenerator<'a> {
    symbols: &'a SymbolTable,
    sink: &'a mut dyn Sink,
    names: NameGenerator,
    policy: InvariantPolicy,
    violations: Vec<Violation>,
    emitted: usize,
}

impl<'a> CodeGenerator<'a> {
    pub fn new(symbols: &'a SymbolTable, sink: &'a mut dyn Sink, options: Options) -> Self {
        Self {
            symbols,
            sink,
            names: NameGenerator::new(&options.temp_prefix, &options.label_prefix),
            policy: options.invariant_policy,
            violations: Vec::new(),
            emitted: 0,
        }
    }

    pub fn generate(&mut self, program: &ast::Program) -> Result<(), CodegenError> {
        log::debug!(
            "Generating code for {} declarations and {} statements",
            program.declarations.len(),
            program.statements.len()
        );

        for statement in &program.statements {
            self.compile_statement(statement, None)?;
        }

        log::debug!(
            "Emitted {} instructions using {} temporaries and {} labels",
            self.emitted,
            self.names.issued(NameKind::Temporary),
            self.names.issued(NameKind::Label)
        );
        Ok(())
    }

    /// Violations reported so far under [`InvariantPolicy::EmitMarker`].
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_violations(self) -> Vec<Violation> {
        self.violations
    }

    /// Number of instructions written to the sink so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn emit(&mut self, instruction: Instruction) {
        self.emitted += 1;
        self.sink.emit(instruction);
    }

    fn emit_goto(&mut self, label: &Label) {
        self.emit(Instruction::Goto(label.clone()));
    }

    fn place_label(&mut self, label: &Label) {
        self.emit(Instruction::Label(label.clone()));
    }

    fn report(&mut self, violation: Violation) -> Result<(), CodegenError> {
        match self.policy {
            InvariantPolicy::Fail => Err(violation.into()),
            InvariantPolicy::EmitMarker => {
                log::warn!("{violation}");
                self.emit(Instruction::Error);
                self.violations.push(violation);
                Ok(())
            }
        }
    }

    /// Resolves the type of an identifier, reporting it when it was never declared.
    fn lookup(&mut self, identifier: &str) -> Result<Option<VarType>, CodegenError> {
        match self.symbols.lookup(identifier) {
            Some(r#type) => Ok(Some(r#type)),
            None => {
                self.report(Violation::UndefinedIdentifier(identifier.to_string()))?;
                Ok(None)
            }
        }
    }

    /// Compiles a statement. `next` is the label its enclosing construct
    /// places, or jumps to, right after the statement.
    fn compile_statement(
        &mut self,
        statement: &ast::Statement,
        next: Option<&Label>,
    ) -> Result<(), CodegenError> {
        match statement {
            ast::Statement::Block(statements) => {
                if let Some((last, rest)) = statements.split_last() {
                    for statement in rest {
                        self.compile_statement(statement, None)?;
                    }
                    self.compile_statement(last, next)?;
                }
            }
            ast::Statement::Assign {
                identifier,
                expression,
            } => {
                log::debug!("Lowering assignment to {identifier}");
                match self.lookup(identifier)? {
                    Some(VarType::Number) => {
                        let value = self.compile_value(expression)?;
                        self.emit(Instruction::Copy {
                            dst: identifier.clone(),
                            src: value,
                        });
                    }
                    Some(VarType::Bool) => {
                        self.materialize(expression, identifier.clone(), next.cloned())?;
                    }
                    None => {}
                }
            }
            ast::Statement::If {
                condition,
                then_branch,
                else_branch: None,
            } => {
                log::debug!("Lowering if statement");
                let next_label = self.names.new_label();

                self.compile_jumps(
                    condition,
                    JumpTargets::new(Target::Fall, Target::Label(next_label.clone())),
                )?;
                self.compile_statement(then_branch, Some(&next_label))?;
                self.place_label(&next_label);
            }
            ast::Statement::If {
                condition,
                then_branch,
                else_branch: Some(else_branch),
            } => {
                log::debug!("Lowering if-else statement");
                let false_label = self.names.new_label();
                let next_label = self.names.new_label();

                self.compile_jumps(
                    condition,
                    JumpTargets::new(Target::Fall, Target::Label(false_label.clone())),
                )?;
                self.compile_statement(then_branch, Some(&next_label))?;
                self.emit_goto(&next_label);

                self.place_label(&false_label);
                self.compile_statement(else_branch, Some(&next_label))?;
                self.place_label(&next_label);
            }
            ast::Statement::While { condition, body } => {
                log::debug!("Lowering while statement");
                let begin_label = self.names.new_label();
                let next_label = self.names.new_label();

                self.place_label(&begin_label);
                self.compile_jumps(
                    condition,
                    JumpTargets::new(Target::Fall, Target::Label(next_label.clone())),
                )?;
                self.compile_statement(body, Some(&begin_label))?;
                self.emit_goto(&begin_label);
                self.place_label(&next_label);
            }
            ast::Statement::Switch { selector, cases } => {
                log::debug!("Lowering switch statement with {} cases", cases.len());
                let selector = self.compile_value(selector)?;
                let test_label = self.names.new_label();
                let next_label = self.names.new_label();

                self.emit_goto(&test_label);

                // Case bodies, in source order
                let mut case_labels = Vec::with_capacity(cases.len());
                for case in cases {
                    let case_label = self.names.new_label();
                    self.place_label(&case_label);
                    self.compile_statement(&case.body, Some(&next_label))?;
                    self.emit_goto(&next_label);
                    case_labels.push(case_label);
                }

                // Dispatch, in source order. The default jumps unconditionally
                // at its own position.
                self.place_label(&test_label);
                for (case, case_label) in cases.iter().zip_eq(case_labels) {
                    match &case.value {
                        Some(value) => {
                            let value = self.compile_value(value)?;
                            self.emit(Instruction::IfGoto {
                                condition: Condition::new(
                                    selector.clone(),
                                    RelationalOperator::Equal,
                                    value,
                                ),
                                target: case_label,
                            });
                        }
                        None => self.emit_goto(&case_label),
                    }
                }
                self.place_label(&next_label);
            }
        }
        Ok(())
    }
}

/// Compiles a whole program into an in-memory instruction list.
pub fn compile(
    program: &ast::Program,
    symbols: &SymbolTable,
    options: Options,
) -> Result<ir::Program, CodegenError> {
    let mut instructions = Vec::new();
    let mut generator = CodeGenerator::new(symbols, &mut instructions, options);
    generator.generate(program)?;
    let violations = generator.into_violations();

    Ok(ir::Program {
        instructions,
        violations,
    })
}

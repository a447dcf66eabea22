// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

pub mod parser;
pub mod ast;
pub mod ir;
pub mod symbols;

use pest::Parser;
use thiserror::Error;

use crate::ir::{CodeGenerator, CodegenError, InvariantPolicy, LineSink, Options, Violation};
use crate::parser::{Rule, TacParser};
use crate::symbols::SymbolTable;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Parse error: {0}")]
    Parse(#[from] Box<pest::error::Error<Rule>>),

    #[error("AST error: {0}")]
    Ast(#[from] ast::AstError),

    #[error("Code generation error: {0}")]
    Codegen(#[from] CodegenError),
}

/// Outcome of a successful compilation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    /// Number of lines handed to the output handler.
    pub emitted: usize,
    pub violations: Vec<Violation>,
}

pub fn default_output_handler(line: String) {
    println!("{line}");
}

/// Parses source text into an AST.
pub fn parse(source: &str) -> Result<ast::Program, Error> {
    let mut parsed = TacParser::parse(Rule::program, source).map_err(Box::new)?;
    let program = parsed.next().ok_or(ast::AstError::EmptyProgram)?;
    Ok(ast::Program::try_from(program)?)
}

/// Source to three-address code driver.
pub struct TacGen {
    options: Options,
    output_handler: Box<dyn FnMut(String)>,
}

impl TacGen {
    pub fn new() -> Self {
        TacGenBuilder::default().build()
    }

    /// Compiles `source` and streams every generated line to the output handler.
    ///
    /// Lines emitted before an error are not taken back.
    pub fn compile(&mut self, source: &str) -> Result<Report, Error> {
        let program = parse(source)?;
        let symbols = SymbolTable::from_declarations(&program.declarations);
        log::debug!("Declared {} identifiers", symbols.len());

        let mut sink = LineSink::new(&mut self.output_handler);
        let mut generator = CodeGenerator::new(&symbols, &mut sink, self.options.clone());
        generator.generate(&program)?;

        Ok(Report {
            emitted: generator.emitted(),
            violations: generator.into_violations(),
        })
    }
}

impl Default for TacGen {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Default)]
pub struct TacGenBuilder {
    options: Options,
    output_handler: Option<Box<dyn FnMut(String)>>,
}

impl TacGenBuilder {
    pub fn invariant_policy(mut self, policy: InvariantPolicy) -> Self {
        self.options.invariant_policy = policy;
        self
    }

    pub fn temp_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.temp_prefix = prefix.into();
        self
    }

    pub fn label_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.options.label_prefix = prefix.into();
        self
    }

    pub fn output_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(String) + 'static,
    {
        self.output_handler = Some(Box::new(handler));
        self
    }

    pub fn build(self) -> TacGen {
        TacGen {
            options: self.options,
            output_handler: self
                .output_handler
                .unwrap_or_else(|| Box::new(default_output_handler)),
        }
    }
}

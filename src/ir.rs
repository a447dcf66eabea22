// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

mod compiler;
mod instructions;
mod names;

pub use compiler::{
    CodeGenerator, CodegenError, InvariantPolicy, JumpTargets, Options, Target, Violation, compile,
};
pub use instructions::{Condition, Instruction, Label, LineSink, Program, Sink};
pub use names::{NameGenerator, NameKind};

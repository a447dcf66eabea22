// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

use std::collections::HashMap;

use crate::ast::{Declaration, VarType};

/// Static type of every declared identifier.
///
/// The table is filled once before code generation starts and is only read
/// afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    symbols: HashMap<String, VarType>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the table from the declaration section of a program. A later
    /// declaration of the same identifier replaces the earlier one.
    pub fn from_declarations(declarations: &[Declaration]) -> Self {
        let mut table = Self::new();
        for declaration in declarations {
            table.declare(&declaration.identifier, declaration.r#type);
        }
        table
    }

    pub fn declare(&mut self, identifier: &str, r#type: VarType) {
        if let Some(previous) = self.symbols.insert(identifier.to_string(), r#type) {
            log::debug!("Redeclaring {identifier}: {previous} -> {}", r#type);
        }
    }

    pub fn lookup(&self, identifier: &str) -> Option<VarType> {
        self.symbols.get(identifier).copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl FromIterator<(String, VarType)> for SymbolTable {
    fn from_iter<I: IntoIterator<Item = (String, VarType)>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

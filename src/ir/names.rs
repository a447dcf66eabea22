// SPDX-FileCopyrightText: 2025 Daniel Vrátil <me@dvratil.cz>
//
// SPDX-License-Identifier: MIT

use enum_map::{Enum, EnumMap};

use crate::ir::Label;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Enum)]
pub enum NameKind {
    Temporary,
    Label,
}

/// Hands out unique temporary and label names for one compilation.
///
/// Both kinds are numbered independently, starting from zero.
#[derive(Debug)]
pub struct NameGenerator {
    counters: EnumMap<NameKind, usize>,
    prefixes: EnumMap<NameKind, String>,
}

impl NameGenerator {
    pub fn new(temp_prefix: &str, label_prefix: &str) -> Self {
        Self {
            counters: EnumMap::default(),
            prefixes: EnumMap::from_fn(|kind| match kind {
                NameKind::Temporary => temp_prefix.to_string(),
                NameKind::Label => label_prefix.to_string(),
            }),
        }
    }

    fn next_name(&mut self, kind: NameKind) -> String {
        let name = format!("{}{}", self.prefixes[kind], self.counters[kind]);
        self.counters[kind] += 1;
        name
    }

    pub fn new_temp(&mut self) -> String {
        let temp = self.next_name(NameKind::Temporary);
        log::trace!("Allocated temporary {temp}");
        temp
    }

    pub fn new_label(&mut self) -> Label {
        let label = Label::new(self.next_name(NameKind::Label));
        log::trace!("Allocated label {label}");
        label
    }

    /// Number of names of the given kind handed out so far.
    pub fn issued(&self, kind: NameKind) -> usize {
        self.counters[kind]
    }
}

impl Default for NameGenerator {
    fn default() -> Self {
        Self::new("_t", "_L")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_generation() {
        let mut names = NameGenerator::default();
        let label1 = names.new_label();
        let label2 = names.new_label();

        assert_eq!(label1.name(), "_L0");
        assert_eq!(label2.name(), "_L1");
        assert_ne!(label1, label2);
    }

    #[test]
    fn test_counters_are_independent() {
        let mut names = NameGenerator::default();
        assert_eq!(names.new_temp(), "_t0");
        assert_eq!(names.new_label().name(), "_L0");
        assert_eq!(names.new_temp(), "_t1");
        assert_eq!(names.new_temp(), "_t2");
        assert_eq!(names.new_label().name(), "_L1");

        assert_eq!(names.issued(NameKind::Temporary), 3);
        assert_eq!(names.issued(NameKind::Label), 2);
    }

    #[test]
    fn test_custom_prefixes() {
        let mut names = NameGenerator::new("tmp", "L");
        assert_eq!(names.new_temp(), "tmp0");
        assert_eq!(names.new_label().name(), "L0");
    }
}

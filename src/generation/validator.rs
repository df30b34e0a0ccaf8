//! Table Reference Validation
//!
//! Lexical pre-filter, not a parser: it picks up the identifier following each
//! FROM / JOIN keyword. Aliases, subquery scoping and quoted identifiers are
//! not resolved, so it misses references rather than inventing them. The
//! database's own error on execution remains the authoritative check.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{BTreeSet, HashSet};

lazy_static! {
    static ref TABLE_REFERENCE: Regex =
        Regex::new(r"(?i)\b(?:FROM|JOIN)\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

/// Identifiers that appear directly after FROM or JOIN.
pub fn extract_referenced_tables(sql: &str) -> BTreeSet<String> {
    TABLE_REFERENCE
        .captures_iter(sql)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Valid when nothing was extracted, or every extracted name is an exact
/// (case-sensitive) member of `allowed_tables`.
pub fn is_valid(sql: &str, allowed_tables: &HashSet<String>) -> bool {
    ValidationReport::check(sql, allowed_tables).is_valid()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub referenced_tables: BTreeSet<String>,
    pub unknown_tables: BTreeSet<String>,
}

impl ValidationReport {
    pub fn check(sql: &str, allowed_tables: &HashSet<String>) -> Self {
        Self::from_referenced(extract_referenced_tables(sql), allowed_tables)
    }

    pub fn from_referenced(referenced_tables: BTreeSet<String>, allowed_tables: &HashSet<String>) -> Self {
        let unknown_tables = referenced_tables
            .iter()
            .filter(|t| !allowed_tables.contains(*t))
            .cloned()
            .collect();
        Self {
            referenced_tables,
            unknown_tables,
        }
    }

    /// An empty referenced set counts as valid: it means "undeterminable".
    pub fn is_valid(&self) -> bool {
        self.unknown_tables.is_empty()
    }
}

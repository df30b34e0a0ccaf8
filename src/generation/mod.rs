//! SQL Generation
//!
//! Turns a question into a candidate SQL statement: oracle call, output
//! sanitization, table-reference validation and the single strict regeneration.

pub mod generator;
pub mod regeneration_loop;
pub mod sanitizer;
pub mod validator;


pub use generator::QueryGenerator;
pub use regeneration_loop::RegenerationController;
pub use sanitizer::sanitize;
pub use validator::{extract_referenced_tables, is_valid, ValidationReport};

use serde::Serialize;
use std::collections::BTreeSet;

/// Which generation round produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Attempt {
    Initial,
    Strict,
}

/// Sanitized SQL produced by one generation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateQuery {
    pub raw: String,
    pub sql: String,
    pub referenced_tables: BTreeSet<String>,
    pub attempt: Attempt,
}

impl CandidateQuery {
    pub fn from_raw(raw: impl Into<String>, attempt: Attempt) -> Self {
        let raw = raw.into();
        let sql = sanitize(&raw);
        let referenced_tables = extract_referenced_tables(&sql);
        Self {
            raw,
            sql,
            referenced_tables,
            attempt,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }
}

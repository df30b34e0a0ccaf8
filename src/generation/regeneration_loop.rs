//! Single-shot Regeneration
//!
//! A candidate that references unknown tables gets exactly one more
//! generation round with the strict prompt. The second candidate is handed
//! on without being validated again.

use super::generator::QueryGenerator;
use super::validator::ValidationReport;
use super::{Attempt, CandidateQuery};
use crate::prompt::PromptBuilder;
use crate::schema::SchemaDescription;
use tracing::{debug, info, warn};

pub struct RegenerationController {
    generator: QueryGenerator,
}

impl RegenerationController {
    pub fn new(generator: QueryGenerator) -> Self {
        Self { generator }
    }

    /// Return `initial` unchanged if its table references check out, otherwise
    /// the result of one strict regeneration. If that regeneration fails or
    /// yields nothing usable, `initial` is returned so the request can still
    /// show and execute a query.
    pub async fn ensure_valid(
        &self,
        initial: CandidateQuery,
        question: &str,
        schema: &SchemaDescription,
    ) -> CandidateQuery {
        let report = ValidationReport::from_referenced(initial.referenced_tables.clone(), &schema.allowed_tables());
        if report.is_valid() {
            debug!("Referenced tables {:?} are all known", report.referenced_tables);
            return initial;
        }

        info!(
            "Generated SQL references unknown tables {:?}; regenerating once with strict prompt",
            report.unknown_tables
        );
        let prompt = PromptBuilder::build(schema, true, Some(&report.unknown_tables));

        let raw = match self.generator.generate(&prompt, question).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Regeneration failed: {}. Keeping the initial query.", e);
                return initial;
            }
        };

        let candidate = CandidateQuery::from_raw(raw, Attempt::Strict);
        if candidate.is_empty() {
            warn!("Regeneration produced no SQL. Keeping the initial query.");
            return initial;
        }

        debug!("Regenerated SQL references {:?}", candidate.referenced_tables);
        candidate
    }
}

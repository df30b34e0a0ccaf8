//! Translate-validate-execute pipeline
//!
//! question -> schema snapshot -> prompt -> generation -> sanitization ->
//! table validation (one strict regeneration at most) -> execution.
//! Nothing is carried over between questions.

use crate::config::InsightsConfig;
use crate::error::{InsightsError, Result};
use crate::executor::{QueryExecutor, QueryOutcome};
use crate::generation::{Attempt, CandidateQuery, QueryGenerator, RegenerationController};
use crate::llm::LanguageModel;
use crate::prompt::PromptBuilder;
use crate::schema::SchemaIntrospector;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

/// What the presentation layer needs for one question.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub request_id: Uuid,
    pub asked_at: DateTime<Utc>,
    pub question: String,
    /// Final sanitized SQL, shown to the user whatever the outcome
    pub sql: String,
    pub regenerated: bool,
    pub outcome: QueryOutcome,
}

pub struct InsightsPipeline {
    introspector: SchemaIntrospector,
    generator: QueryGenerator,
    regeneration: RegenerationController,
    executor: QueryExecutor,
}

impl InsightsPipeline {
    pub fn new(config: &InsightsConfig, model: Arc<dyn LanguageModel>) -> Self {
        let generator = QueryGenerator::new(model);
        Self {
            introspector: SchemaIntrospector::new(&config.db_path, config.busy_timeout()),
            regeneration: RegenerationController::new(generator.clone()),
            generator,
            executor: QueryExecutor::new(&config.db_path, config.busy_timeout()),
        }
    }

    /// Answer one natural-language question.
    ///
    /// Schema and initial generation failures are returned as errors.
    /// Validation problems are handled by regeneration and execution problems
    /// come back inside `Answer::outcome`.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let request_id = Uuid::new_v4();
        let span = info_span!("ask", %request_id);
        self.ask_inner(request_id, question).instrument(span).await
    }

    async fn ask_inner(&self, request_id: Uuid, question: &str) -> Result<Answer> {
        let asked_at = Utc::now();
        if question.trim().is_empty() {
            return Err(InsightsError::Generation("empty question".to_string()));
        }
        info!("Question: {}", question.trim());

        let schema = self.introspector.introspect()?;
        let prompt = PromptBuilder::build(&schema, false, None);

        let raw = self.generator.generate(&prompt, question).await?;
        let initial = CandidateQuery::from_raw(raw, Attempt::Initial);
        if initial.is_empty() {
            return Err(InsightsError::Generation(
                "model returned no usable SQL".to_string(),
            ));
        }
        info!("Sanitized SQL: {}", initial.sql);

        let candidate = self.regeneration.ensure_valid(initial, question, &schema).await;
        let regenerated = candidate.attempt == Attempt::Strict;

        let outcome = self.executor.execute(&candidate.sql);

        Ok(Answer {
            request_id,
            asked_at,
            question: question.to_string(),
            sql: candidate.sql,
            regenerated,
            outcome,
        })
    }
}

//! Query generation through the language-model oracle.

use crate::error::Result;
use crate::llm::LanguageModel;
use crate::prompt::GenerationPrompt;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct QueryGenerator {
    model: Arc<dyn LanguageModel>,
}

impl QueryGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Send the prompt and the verbatim question as two inputs and return the
    /// raw completion unmodified. Oracle errors are not retried here.
    pub async fn generate(&self, prompt: &GenerationPrompt, question: &str) -> Result<String> {
        info!(
            model = self.model.name(),
            strict = prompt.is_strict(),
            "Generating SQL for question"
        );
        let raw = self.model.complete(prompt.text(), question).await?;
        debug!("Raw completion ({} chars): {}", raw.len(), raw);
        Ok(raw)
    }
}

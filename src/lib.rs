pub mod config;
pub mod error;
pub mod executor;
pub mod generation;
pub mod llm;
pub mod pipeline;
pub mod prompt;
pub mod render;
pub mod schema;
pub mod seed;

pub use config::InsightsConfig;
pub use error::{InsightsError, Result};
pub use executor::{CellValue, ExecutionFailure, QueryExecutor, QueryOutcome, ResultSet};
pub use llm::{LanguageModel, LlmClient};
pub use pipeline::{Answer, InsightsPipeline};
pub use schema::{SchemaDescription, SchemaIntrospector};

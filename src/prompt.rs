//! Generation prompt construction
//!
//! The prompt is the system-side instruction only. The user's question is sent
//! to the model as a separate message and is never interpolated here.

use crate::schema::SchemaDescription;
use itertools::Itertools;
use std::collections::BTreeSet;

const INSTRUCTIONS: &str = "You convert English questions into valid SQLite SQL.
Use ONLY existing tables and columns from this schema:";

const RULES: &str = "Rules:
- Output ONLY the final SQL statement; no explanations or labels.
- Use exact table/column names and SQLite syntax.
- Prefer a single statement ending with a semicolon.
- If aggregation is implied, use GROUP BY appropriately.
- Do NOT invent tables or columns.";

const EXAMPLE: &str = "Example:
Q: How many movies are in the Action genre?
A: SELECT COUNT(*) AS count FROM MOVIES WHERE GENRE = 'Action';";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt {
    text: String,
    strict: bool,
}

impl GenerationPrompt {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }
}

pub struct PromptBuilder;

impl PromptBuilder {
    /// Build the instruction prompt for one generation attempt.
    ///
    /// `strict` appends the allow-list clause used on regeneration; `rejected`
    /// names tables a previous attempt referenced that are not in the schema.
    pub fn build(schema: &SchemaDescription, strict: bool, rejected: Option<&BTreeSet<String>>) -> GenerationPrompt {
        let mut text = format!(
            "{}\n{}\n\n{}\n\n{}\n",
            INSTRUCTIONS,
            Self::schema_hint(schema),
            RULES,
            EXAMPLE
        );

        if strict {
            text.push_str(&format!(
                "\nAdditional constraint: The ONLY valid tables are: {}. Do not reference any other tables.",
                schema.table_names().join(", ")
            ));
            if let Some(rejected) = rejected.filter(|r| !r.is_empty()) {
                text.push_str(&format!(
                    "\nThe previous answer referenced tables that do not exist: {}.",
                    rejected.iter().join(", ")
                ));
            }
            text.push('\n');
        }

        GenerationPrompt { text, strict }
    }

    /// One `- TABLE(col, col)` line per table, in catalog order.
    pub fn schema_hint(schema: &SchemaDescription) -> String {
        schema
            .tables
            .iter()
            .map(|t| format!("- {}({})", t.name, t.column_names().join(", ")))
            .join("\n")
    }
}

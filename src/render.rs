//! Plain-text rendering of answers for the terminal.

use crate::executor::{QueryOutcome, ResultSet};
use crate::pipeline::Answer;
use itertools::Itertools;

pub const NO_DATA: &str = "The query returned no data.";
pub const EXECUTION_ERROR: &str =
    "There was an error executing the SQL query. Please check the generated query and your database.";

pub fn render_answer(answer: &Answer) -> String {
    let mut out = String::new();
    out.push_str("Generated SQL Query\n");
    out.push_str(&answer.sql);
    out.push_str("\n\n");
    out.push_str(&render_outcome(&answer.outcome));
    out
}

pub fn render_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Rows(rs) => format!("Query Results\n{}", render_table(rs)),
        QueryOutcome::Empty { .. } => NO_DATA.to_string(),
        QueryOutcome::Failed(failure) => format!("{}\n{}", EXECUTION_ERROR, failure),
    }
}

/// Column-aligned table with a header rule.
pub fn render_table(rs: &ResultSet) -> String {
    let cells: Vec<Vec<String>> = rs
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();

    let widths: Vec<usize> = rs
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|c| c.chars().count())
                .chain(std::iter::once(name.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: &[String]| {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut out = line(&rs.columns);
    out.push('\n');
    out.push_str(&widths.iter().map(|w| "-".repeat(*w)).join("-+-"));
    for row in &cells {
        out.push('\n');
        out.push_str(&line(row));
    }
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{CellValue, ExecutionFailure};

    #[test]
    fn test_render_table_aligns_columns() {
        let rs = ResultSet {
            columns: vec!["GENRE".into(), "N".into()],
            rows: vec![
                vec![CellValue::Text("Action".into()), CellValue::Integer(12)],
                vec![CellValue::Text("Drama".into()), CellValue::Null],
            ],
        };
        assert_eq!(
            render_table(&rs),
            "GENRE  | N\n-------+-----\nAction | 12\nDrama  | NULL\n"
        );
    }

    #[test]
    fn test_three_outcomes_render_differently() {
        let rows = render_outcome(&QueryOutcome::Rows(ResultSet {
            columns: vec!["X".into()],
            rows: vec![vec![CellValue::Integer(1)]],
        }));
        let empty = render_outcome(&QueryOutcome::Empty { columns: vec!["X".into()] });
        let failed = render_outcome(&QueryOutcome::Failed(ExecutionFailure {
            message: "no such column: Y".into(),
        }));

        assert!(rows.starts_with("Query Results"));
        assert_eq!(empty, NO_DATA);
        assert!(failed.starts_with(EXECUTION_ERROR));
        assert!(failed.ends_with("no such column: Y"));
    }
}

//! Query Execution
//!
//! Runs the final SQL against the database file on a connection scoped to
//! that one statement. Database errors never escape: they are logged and
//! returned as `QueryOutcome::Failed`.

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl From<ValueRef<'_>> for CellValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => CellValue::Null,
            ValueRef::Integer(i) => CellValue::Integer(i),
            ValueRef::Real(f) => CellValue::Real(f),
            ValueRef::Text(t) => CellValue::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => CellValue::Blob(b.to_vec()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Real(r) => write!(f, "{}", r),
            CellValue::Text(s) => f.write_str(s),
            CellValue::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

/// Non-empty result of a successful statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionFailure {
    pub message: String,
}

impl fmt::Display for ExecutionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Rows, a valid query with no matching data, or a failed statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryOutcome {
    Rows(ResultSet),
    Empty { columns: Vec<String> },
    Failed(ExecutionFailure),
}

impl QueryOutcome {
    pub fn row_count(&self) -> usize {
        match self {
            QueryOutcome::Rows(rs) => rs.rows.len(),
            _ => 0,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }
}

pub struct QueryExecutor {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl QueryExecutor {
    pub fn new(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            busy_timeout,
        }
    }

    /// Execute one statement and fetch all rows. Statement type is not checked.
    pub fn execute(&self, sql: &str) -> QueryOutcome {
        // The connection lives only inside run() and is dropped on every path
        match self.run(sql) {
            Ok(outcome) => {
                info!("Query returned {} rows", outcome.row_count());
                outcome
            }
            Err(e) => {
                error!("Database error: {}", e);
                QueryOutcome::Failed(ExecutionFailure { message: e.to_string() })
            }
        }
    }

    fn run(&self, sql: &str) -> rusqlite::Result<QueryOutcome> {
        let conn = Connection::open_with_flags(&self.db_path, open_flags())?;
        conn.busy_timeout(self.busy_timeout)?;

        let mut stmt = conn.prepare(sql)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let width = columns.len();

        let mut rows = stmt.query([])?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(width);
            for idx in 0..width {
                values.push(CellValue::from(row.get_ref(idx)?));
            }
            collected.push(values);
        }

        if collected.is_empty() {
            Ok(QueryOutcome::Empty { columns })
        } else {
            Ok(QueryOutcome::Rows(ResultSet { columns, rows: collected }))
        }
    }
}

/// Plain filesystem path, read-write, never created.
fn open_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX
}

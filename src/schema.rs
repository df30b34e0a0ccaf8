//! Schema Introspection
//!
//! Reads table and column metadata from the SQLite catalog. A fresh snapshot is
//! taken for every question; nothing here is cached.

use crate::error::{InsightsError, Result};
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const NO_TABLES_FOUND: &str = "No tables found in the database.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    /// Declared type as written in the DDL (may be empty in SQLite)
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// Read-only snapshot of the database structure, tables in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescription {
    pub tables: Vec<TableSchema>,
}

impl SchemaDescription {
    pub fn new(tables: Vec<TableSchema>) -> Self {
        Self { tables }
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    /// Exact (case-sensitive) table names, as used by reference validation.
    pub fn allowed_tables(&self) -> HashSet<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Table -> ordered column names.
    pub fn tables_and_columns(&self) -> Vec<(String, Vec<String>)> {
        self.tables
            .iter()
            .map(|t| (t.name.clone(), t.column_names()))
            .collect()
    }

    /// Human-readable rendering of the schema.
    pub fn render(&self) -> String {
        if self.tables.is_empty() {
            return NO_TABLES_FOUND.to_string();
        }

        let mut out = String::from("The database has the following schema:\n");
        for table in &self.tables {
            out.push_str(&format!("\nTable '{}':\n", table.name));
            for column in &table.columns {
                out.push_str(&format!(
                    "  - Column '{}' with data type '{}'\n",
                    column.name, column.data_type
                ));
            }
        }
        out
    }
}

/// Plain filesystem path, read-only, never created.
fn open_flags() -> OpenFlags {
    OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX
}

pub struct SchemaIntrospector {
    db_path: PathBuf,
    busy_timeout: Duration,
}

impl SchemaIntrospector {
    pub fn new(db_path: impl AsRef<Path>, busy_timeout: Duration) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
            busy_timeout,
        }
    }

    /// Enumerate non-system tables and their columns.
    pub fn introspect(&self) -> Result<SchemaDescription> {
        let conn = self.open()?;

        let table_names: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'")
                .map_err(|e| InsightsError::SchemaUnavailable(format!("Failed to read catalog: {}", e)))?;
            let rows = stmt
                .query_map([], |row| row.get::<_, String>(0))
                .map_err(|e| InsightsError::SchemaUnavailable(format!("Failed to read catalog: {}", e)))?;
            rows.collect::<std::result::Result<_, _>>()
                .map_err(|e| InsightsError::SchemaUnavailable(format!("Failed to read catalog: {}", e)))?
        };

        let mut tables = Vec::with_capacity(table_names.len());
        for name in table_names {
            let columns = Self::columns_of(&conn, &name)?;
            if columns.is_empty() {
                debug!("Skipping table '{}' with no visible columns", name);
                continue;
            }
            tables.push(TableSchema { name, columns });
        }

        debug!("Introspected {} tables from {}", tables.len(), self.db_path.display());
        Ok(SchemaDescription::new(tables))
    }

    /// Nested text description, or the "no tables" sentinel for an empty catalog.
    pub fn describe_schema(&self) -> Result<String> {
        Ok(self.introspect()?.render())
    }

    pub fn list_tables_and_columns(&self) -> Result<Vec<(String, Vec<String>)>> {
        Ok(self.introspect()?.tables_and_columns())
    }

    fn open(&self) -> Result<Connection> {
        if !self.db_path.exists() {
            return Err(InsightsError::SchemaUnavailable(format!(
                "Database file '{}' not found",
                self.db_path.display()
            )));
        }

        let conn = Connection::open_with_flags(&self.db_path, open_flags()).map_err(|e| {
            InsightsError::SchemaUnavailable(format!("Failed to open database '{}': {}", self.db_path.display(), e))
        })?;
        conn.busy_timeout(self.busy_timeout)
            .map_err(|e| InsightsError::SchemaUnavailable(format!("Failed to configure connection: {}", e)))?;
        Ok(conn)
    }

    fn columns_of(conn: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = conn
            .prepare("SELECT name, type FROM pragma_table_info(?1) ORDER BY cid")
            .map_err(|e| InsightsError::SchemaUnavailable(format!("Failed to read columns of '{}': {}", table, e)))?;
        let rows = stmt
            .query_map([table], |row| {
                Ok(ColumnInfo {
                    name: row.get(0)?,
                    data_type: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                })
            })
            .map_err(|e| InsightsError::SchemaUnavailable(format!("Failed to read columns of '{}': {}", table, e)))?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| InsightsError::SchemaUnavailable(format!("Failed to read columns of '{}': {}", table, e)))
    }
}

//! SQLite table sources.

use std::path::{Path, PathBuf};

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, OptionalExtension};
use tracing::{debug, info};

use pain_model::RawRecord;

use crate::error::{Result, SourceError};
use crate::loader::RecordLoader;
use crate::sanitize::sanitize_table_name;

/// Aliases SQLite accepts for the rowid, in order of preference.
const ROWID_ALIASES: [&str; 3] = ["rowid", "_rowid_", "oid"];

/// Order in which the rows of a source are read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOrder {
    /// Rowid tables: insertion order, through the first rowid alias no
    /// column shadows.
    Rowid(&'static str),
    /// `WITHOUT ROWID` tables store no insertion order; rows come back by
    /// primary key.
    PrimaryKey(Vec<String>),
    /// Views and virtual tables: the order their own definition yields.
    AsDefined,
}

impl RowOrder {
    fn clause(&self) -> String {
        match self {
            RowOrder::Rowid(alias) => format!(" ORDER BY {alias}"),
            RowOrder::PrimaryKey(columns) => {
                let columns: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
                format!(" ORDER BY {}", columns.join(", "))
            }
            RowOrder::AsDefined => String::new(),
        }
    }
}

/// Reads every row of one table or view from a database opened read-only.
/// See [`RowOrder`] for the order rows come back in.
#[derive(Debug, Clone)]
pub struct SqliteTableLoader {
    path: PathBuf,
    table: String,
}

impl SqliteTableLoader {
    /// `table` is sanitized here, before it can reach a query.
    pub fn new(path: impl Into<PathBuf>, table: &str) -> Self {
        Self {
            path: path.into(),
            table: sanitize_table_name(table),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The sanitized table identifier.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The exact statement run against the database for `order`.
    pub fn select_statement(&self, order: &RowOrder) -> String {
        format!("SELECT * FROM {}{}", quote_identifier(&self.table), order.clause())
    }

    /// Works out how the rows of the source can be read in a stable order.
    /// `None` when no table or view of that name exists.
    fn row_order(&self, connection: &Connection) -> Result<Option<RowOrder>> {
        let shape = connection
            .query_row(
                "SELECT type, wr FROM pragma_table_list WHERE schema = 'main' AND name = ?1",
                [self.table.as_str()],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, bool>(1)?)),
            )
            .optional()
            .map_err(|e| self.db_error(e))?;
        let Some((kind, without_rowid)) = shape else {
            return Ok(None);
        };
        if kind != "table" {
            return Ok(Some(RowOrder::AsDefined));
        }

        let mut statement = connection
            .prepare("SELECT name, pk FROM pragma_table_info(?1) ORDER BY pk")
            .map_err(|e| self.db_error(e))?;
        let columns = statement
            .query_map([self.table.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| self.db_error(e))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| self.db_error(e))?;

        if without_rowid {
            let key = columns
                .into_iter()
                .filter(|(_, pk)| *pk > 0)
                .map(|(name, _)| name)
                .collect();
            return Ok(Some(RowOrder::PrimaryKey(key)));
        }
        let alias = ROWID_ALIASES.into_iter().find(|alias| {
            !columns
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(alias))
        });
        Ok(Some(alias.map_or(RowOrder::AsDefined, RowOrder::Rowid)))
    }

    fn db_error(&self, source: rusqlite::Error) -> SourceError {
        SourceError::Database {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecordLoader for SqliteTableLoader {
    fn describe(&self) -> String {
        format!("table {} in {}", self.table, self.path.display())
    }

    fn load(&self) -> Result<Vec<RawRecord>> {
        if !self.path.is_file() {
            return Err(SourceError::NotFound {
                path: self.path.clone(),
            });
        }
        let connection = Connection::open_with_flags(
            &self.path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| self.db_error(e))?;

        let Some(order) = self.row_order(&connection)? else {
            return Err(SourceError::TableNotFound {
                path: self.path.clone(),
                table: self.table.clone(),
            });
        };
        if !matches!(order, RowOrder::Rowid(_)) {
            info!(
                table = %self.table,
                order = ?order,
                "source has no rowid; insertion order is not available"
            );
        }

        let mut statement = connection
            .prepare(&self.select_statement(&order))
            .map_err(|e| self.db_error(e))?;
        let columns: Vec<String> = statement
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut rows = statement.query([]).map_err(|e| self.db_error(e))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next().map_err(|e| self.db_error(e))? {
            let mut record = RawRecord::new();
            for (index, name) in columns.iter().enumerate() {
                let value = row.get_ref(index).map_err(|e| self.db_error(e))?;
                record.push(name.clone(), cell_text(value));
            }
            records.push(record);
        }

        debug!(
            path = %self.path.display(),
            table = %self.table,
            records = records.len(),
            "loaded table source"
        );
        Ok(records)
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn cell_text(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(number) => number.to_string(),
        ValueRef::Real(number) => number.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

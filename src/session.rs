//! The caller-facing session protocol.
//!
//! A [`Session`] holds at most one open database and at most one cursor:
//!
//! ```text
//!            open              query
//! Closed ----------> Open ------------> Queried --+
//!   ^                 |                  ^   |    | fetch / value
//!   |      close      |                  |   +----+
//!   +-----------------+------------------+ query
//! ```
//!
//! `open`, `query` and `fetch` report failure through [`SessionError`];
//! `value` and `close` never fail.

mod cursor;
mod error;

pub use error::{ErrorKind, SessionError};

use std::path::Path;

use tracing::{debug, info, warn};

use self::cursor::Cursor;
use crate::catalog::Catalog;
use crate::config::SessionConfig;
use crate::db::{Database, DatabaseError};
use crate::executor::{QueryError, ResultRow};
use crate::sql::Literal;

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No database is open.
    Closed,
    /// A database is open with no query.
    Open,
    /// A query has been issued; rows may be fetched.
    Queried,
}

/// One caller's view of one database file.
///
/// Sessions are independent of each other: the single-open guard applies to
/// a session, not to the process.
#[derive(Default)]
pub struct Session {
    config: SessionConfig,
    db: Option<Database>,
    cursor: Option<Cursor>,
}

impl Session {
    /// Creates a closed session with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a closed session with the given options.
    pub fn with_config(config: SessionConfig) -> Self {
        Self {
            config,
            db: None,
            cursor: None,
        }
    }

    /// Returns the session's options.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        match (&self.db, &self.cursor) {
            (None, _) => SessionState::Closed,
            (Some(_), None) => SessionState::Open,
            (Some(_), Some(_)) => SessionState::Queried,
        }
    }

    /// Opens a database file.
    ///
    /// # Errors
    ///
    /// Returns `Busy` if a database is already open; the open one is left
    /// untouched. Returns `Open` if the file cannot be read or its catalog
    /// cannot be loaded; the file is released before returning.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), SessionError> {
        if let Some(db) = &self.db {
            let path = db.reader().path().to_path_buf();
            warn!(open = %path.display(), "open rejected: session busy");
            return Err(SessionError::Busy { path });
        }
        self.db = Some(Database::open(path)?);
        Ok(())
    }

    /// Issues a query, replacing any previous one.
    ///
    /// The previous cursor is discarded before the new text is parsed, so a
    /// failed query leaves the session `Open`. Nothing is read from the table
    /// until the first `fetch`.
    ///
    /// # Errors
    ///
    /// Returns `NotOpen` without a database, and `Query` if the text does not
    /// parse or does not fit the catalog.
    pub fn query(&mut self, text: &str) -> Result<(), SessionError> {
        let db = self.db.as_ref().ok_or(SessionError::NotOpen)?;
        self.cursor = None;

        let plan = db.prepare(text)?;
        if plan.table.system && !self.config.include_system_tables {
            let name = plan.table.name.clone();
            return Err(DatabaseError::Query(QueryError::UnknownTable(name)).into());
        }

        debug!(table = %plan.table.name, "query started");
        let rows = db.execute(&plan, self.config.decode_errors);
        self.cursor = Some(Cursor::new(rows));
        Ok(())
    }

    /// Advances to the next result row.
    ///
    /// Returns `Ok(false)` when the results are exhausted, and keeps doing so
    /// on later calls.
    ///
    /// # Errors
    ///
    /// Returns `NotOpen` or `NoActiveQuery` when there is nothing to fetch
    /// from. Returns `Row` for a row that could not be decoded (when decode
    /// errors are surfaced) or a table that could not be scanned; the next
    /// fetch continues after the bad row, or reports exhaustion after a
    /// failed scan.
    pub fn fetch(&mut self) -> Result<bool, SessionError> {
        if self.db.is_none() {
            return Err(SessionError::NotOpen);
        }
        let cursor = self.cursor.as_mut().ok_or(SessionError::NoActiveQuery)?;
        Ok(cursor.advance()?)
    }

    /// Returns the formatted value of `column` in the current row.
    ///
    /// `None` when no row is positioned, when the current query does not
    /// project a column of that exact name, or when the value is null.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.current_row()?.get(column)
    }

    /// Returns the current row, if one is positioned.
    pub fn current_row(&self) -> Option<&ResultRow> {
        self.cursor.as_ref()?.current()
    }

    /// Returns the output column names of the current query.
    pub fn columns(&self) -> Option<&[String]> {
        Some(self.cursor.as_ref()?.names())
    }

    /// Returns the open database's catalog.
    pub fn catalog(&self) -> Option<&Catalog> {
        self.db.as_ref().map(Database::catalog)
    }

    /// Returns the names of the tables a query may name.
    ///
    /// System tables are listed only when the session is configured to
    /// include them.
    ///
    /// # Errors
    ///
    /// Returns `NotOpen` without a database.
    pub fn table_names(&self) -> Result<Vec<&str>, SessionError> {
        let catalog = self.catalog().ok_or(SessionError::NotOpen)?;
        Ok(catalog
            .tables()
            .filter(|t| self.config.include_system_tables || !t.system)
            .map(|t| t.name.as_str())
            .collect())
    }

    /// Closes the database and discards any cursor.
    ///
    /// Does nothing on a closed session.
    pub fn close(&mut self) {
        self.cursor = None;
        if let Some(db) = self.db.take() {
            info!(path = %db.reader().path().display(), "database closed");
        }
    }
}

/// Reads every row of `table` in one call.
///
/// Builds `SELECT * FROM table`, adding `WHERE field = value` when a filter
/// is given. The database is closed on every path out of this function.
///
/// # Errors
///
/// Returns the first error from opening, querying or fetching.
pub fn read_table(
    path: impl AsRef<Path>,
    table: &str,
    filter: Option<(&str, Literal)>,
    config: SessionConfig,
) -> Result<Vec<ResultRow>, SessionError> {
    let mut text = format!("SELECT * FROM {}", quote_ident(table));
    if let Some((field, value)) = filter {
        text.push_str(&format!(" WHERE {} = {}", quote_ident(field), value));
    }

    let mut session = Session::with_config(config);
    session.open(path)?;
    let result = collect_rows(&mut session, &text);
    session.close();
    result
}

fn collect_rows(session: &mut Session, text: &str) -> Result<Vec<ResultRow>, SessionError> {
    session.query(text)?;
    let mut rows = Vec::new();
    while session.fetch()? {
        if let Some(row) = session.current_row() {
            rows.push(row.clone());
        }
    }
    Ok(rows)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

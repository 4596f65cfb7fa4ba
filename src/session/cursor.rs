//! The position of a session within a query's results.

use std::sync::Arc;

use crate::executor::{ExecError, ResultRow, ResultRows};

/// A result stream plus the row most recently fetched from it.
///
/// The stream is dropped as soon as it reports exhaustion; the cursor itself
/// lives until the next query or `close`.
pub(crate) struct Cursor {
    rows: Option<ResultRows>,
    current: Option<ResultRow>,
    names: Arc<[String]>,
}

impl Cursor {
    pub(crate) fn new(rows: ResultRows) -> Self {
        Self {
            names: rows.names().clone(),
            rows: Some(rows),
            current: None,
        }
    }

    /// Moves to the next row.
    ///
    /// Returns `Ok(false)` once the stream is exhausted, and on every call
    /// after that. A failed row leaves the cursor unpositioned.
    pub(crate) fn advance(&mut self) -> Result<bool, ExecError> {
        self.current = None;
        let Some(rows) = self.rows.as_mut() else {
            return Ok(false);
        };
        match rows.next() {
            Some(Ok(row)) => {
                self.current = Some(row);
                Ok(true)
            }
            Some(Err(e)) => Err(e),
            None => {
                self.rows = None;
                Ok(false)
            }
        }
    }

    pub(crate) fn current(&self) -> Option<&ResultRow> {
        self.current.as_ref()
    }

    pub(crate) fn names(&self) -> &[String] {
        &self.names
    }
}

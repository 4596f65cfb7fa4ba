//! Streaming query results.

use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::error::ExecError;
use super::plan::QueryPlan;
use super::predicate::CompiledPredicate;
use crate::heap::{RawRow, TableScanner};
use crate::row::{DecodeError, RowDecoder, Value};
use crate::storage::PageReader;

/// What to do with a row that cannot be decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeErrorPolicy {
    /// Log the row and continue with the next one.
    #[default]
    Skip,
    /// Yield the error, then continue with the next row.
    Surface,
}

/// One result row: output names paired with formatted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    names: Arc<[String]>,
    values: Vec<Option<String>>,
}

impl ResultRow {
    /// Creates a row; `values` must line up with `names`.
    pub fn new(names: Arc<[String]>, values: Vec<Option<String>>) -> Self {
        Self { names, values }
    }

    /// Returns the formatted value of the column named exactly `name`.
    ///
    /// `None` for an unknown name or a null value.
    pub fn get(&self, name: &str) -> Option<&str> {
        let idx = self.names.iter().position(|n| n == name)?;
        self.values.get(idx)?.as_deref()
    }

    /// Returns the output column names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Returns the formatted values in column order.
    pub fn values(&self) -> &[Option<String>] {
        &self.values
    }

    /// Iterates over `(name, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.names
            .iter()
            .zip(&self.values)
            .map(|(n, v)| (n.as_str(), v.as_deref()))
    }
}

enum ScanState {
    /// The usage map has not been read yet.
    Pending,
    Running(TableScanner),
    Done,
}

/// Lazy iterator over a query's result rows.
///
/// Rows are read, filtered and formatted one at a time. The filter column is
/// decoded before the projection, so rows rejected by the filter never decode
/// their other columns.
pub struct ResultRows {
    reader: Arc<PageReader>,
    decoder: RowDecoder,
    scan: ScanState,
    names: Arc<[String]>,
    projection: Vec<usize>,
    predicate: Option<CompiledPredicate>,
    policy: DecodeErrorPolicy,
}

/// Starts streaming the results of `plan`.
///
/// Nothing is read until the first call to `next`.
pub fn execute(reader: Arc<PageReader>, plan: &QueryPlan, policy: DecodeErrorPolicy) -> ResultRows {
    let names: Arc<[String]> = plan.column_names().map(str::to_string).collect();
    ResultRows {
        decoder: RowDecoder::new(reader.clone(), plan.table.clone()),
        reader,
        scan: ScanState::Pending,
        names,
        projection: plan.columns.iter().map(|c| c.index).collect(),
        predicate: plan.predicate.clone(),
        policy,
    }
}

impl ResultRows {
    /// Returns the output column names.
    pub fn names(&self) -> &Arc<[String]> {
        &self.names
    }

    /// Filters and formats one raw row.
    ///
    /// `Ok(None)` means the row was filtered out.
    fn process(&self, raw: &RawRow) -> Result<Option<ResultRow>, DecodeError> {
        let cracked = self.decoder.crack(&raw.data)?;

        let mut filter_value = None;
        if let Some(predicate) = &self.predicate {
            let value = self.decoder.value(&cracked, predicate.column)?;
            if !predicate.matches(&value) {
                return Ok(None);
            }
            filter_value = Some((predicate.column, value));
        }

        let values = self
            .projection
            .iter()
            .map(|&idx| {
                let value = match &filter_value {
                    Some((column, value)) if *column == idx => value.clone(),
                    _ => self.decoder.value(&cracked, idx)?,
                };
                Ok(Value::to_text(&value))
            })
            .collect::<Result<Vec<_>, DecodeError>>()?;

        Ok(Some(ResultRow::new(self.names.clone(), values)))
    }

    fn next_raw(&mut self) -> Option<Result<RawRow, ExecError>> {
        loop {
            match &mut self.scan {
                ScanState::Done => return None,
                ScanState::Pending => {
                    match TableScanner::new(self.reader.clone(), self.decoder.table()) {
                        Ok(scanner) => self.scan = ScanState::Running(scanner),
                        Err(e) => {
                            self.scan = ScanState::Done;
                            return Some(Err(e.into()));
                        }
                    }
                }
                ScanState::Running(scanner) => {
                    return match scanner.next() {
                        Some(Ok(raw)) => Some(Ok(raw)),
                        Some(Err(e)) => {
                            self.scan = ScanState::Done;
                            Some(Err(e.into()))
                        }
                        None => {
                            self.scan = ScanState::Done;
                            None
                        }
                    };
                }
            }
        }
    }
}

impl Iterator for ResultRows {
    type Item = Result<ResultRow, ExecError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let raw = match self.next_raw()? {
                Ok(raw) => raw,
                Err(e) => return Some(Err(e)),
            };

            match self.process(&raw) {
                Ok(Some(row)) => return Some(Ok(row)),
                Ok(None) => continue,
                Err(source) => {
                    let table = self.decoder.table().name.clone();
                    match self.policy {
                        DecodeErrorPolicy::Skip => {
                            warn!(
                                table = %table,
                                page = %raw.page,
                                row = raw.row,
                                error = %source,
                                "skipping undecodable row"
                            );
                        }
                        DecodeErrorPolicy::Surface => {
                            return Some(Err(ExecError::Decode {
                                table,
                                page: raw.page,
                                row: raw.row,
                                source,
                            }));
                        }
                    }
                }
            }
        }
    }
}

impl std::iter::FusedIterator for ResultRows {}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ResultRow {
        let names: Arc<[String]> = vec!["SiteID".to_string(), "Name".to_string()].into();
        ResultRow::new(names, vec![Some("7".to_string()), None])
    }

    #[test]
    fn test_get_is_exact() {
        let row = row();
        assert_eq!(row.get("SiteID"), Some("7"));
        assert_eq!(row.get("siteid"), None);
        assert_eq!(row.get("Name"), None);
        assert_eq!(row.get("Missing"), None);
    }

    #[test]
    fn test_iter_pairs() {
        let row = row();
        let pairs: Vec<_> = row.iter().collect();
        assert_eq!(pairs, [("SiteID", Some("7")), ("Name", None)]);
    }

    #[test]
    fn test_policy_deserialize() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: DecodeErrorPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"surface\"").unwrap();
        assert_eq!(w.policy, DecodeErrorPolicy::Surface);
        assert_eq!(DecodeErrorPolicy::default(), DecodeErrorPolicy::Skip);
    }
}

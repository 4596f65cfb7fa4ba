//! Query compilation and pull-based execution.
//!
//! # Architecture
//!
//! ```text
//! SelectStmt
//!       |
//! [compile] -- resolves table/columns via Catalog, type-checks the filter
//!       |
//! QueryPlan
//!       |
//! [execute] -- ResultRows: TableScanner -> RowDecoder -> predicate -> projection
//! ```
//!
//! # Components
//!
//! - [`compile`]: binds a parsed statement to the catalog
//! - [`CompiledPredicate`]: the WHERE condition, checked per row
//! - [`ResultRows`]: lazy iterator of [`ResultRow`]s

mod error;
mod plan;
mod predicate;
mod rows;

pub use error::{ExecError, QueryError};
pub use plan::{OutputColumn, QueryPlan, compile};
pub use predicate::{CompiledPredicate, LikePattern, parse_date};
pub use rows::{DecodeErrorPolicy, ResultRow, ResultRows, execute};

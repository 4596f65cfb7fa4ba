//! Read-only access to Microsoft Access JET3/JET4 database files.
//!
//! ```no_run
//! use jetdb::Session;
//!
//! # fn main() -> Result<(), jetdb::SessionError> {
//! let mut session = Session::new();
//! session.open("deployments.mdb")?;
//! session.query("SELECT SiteID, Name FROM Sites WHERE Depth > 10")?;
//! while session.fetch()? {
//!     println!("{:?} {:?}", session.value("SiteID"), session.value("Name"));
//! }
//! session.close();
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod config;
pub mod db;
pub mod executor;
pub mod heap;
pub mod row;
pub mod session;
pub mod sql;
pub mod storage;

pub use config::{ConfigError, SessionConfig};
pub use db::Database;
pub use executor::{DecodeErrorPolicy, ResultRow};
pub use session::{ErrorKind, Session, SessionError, SessionState, read_table};

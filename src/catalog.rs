//! Table and column directory of an open database.
//!
//! The catalog is built once when a file is opened, from the `MSysObjects`
//! system table and the TDEF page chain of every table it lists. It is
//! immutable afterwards.
//!
//! ## System Objects
//!
//! | Column  | Use                                                  |
//! |---------|------------------------------------------------------|
//! | `Id`    | Low 24 bits: TDEF page of the object                 |
//! | `Name`  | Table name                                           |
//! | `Type`  | `1` for a local table (high bit masked off)          |
//! | `Flags` | `0x80000002` bits mark system tables                 |

mod error;
mod loader;
mod tdef;
mod types;

pub use error::CatalogError;
pub use tdef::{TABLE_TYPE_SYSTEM, TABLE_TYPE_USER, read_table_def, read_tdef_chain};
pub use types::{
    COLUMN_FLAG_AUTO_NUMBER, COLUMN_FLAG_FIXED, COLUMN_FLAG_NULLABLE, ColumnDef, ColumnType,
    TableDef, TypeClass,
};

use std::collections::HashMap;
use std::sync::Arc;

/// An in-memory, read-only directory of the tables in one file.
///
/// Table names are matched ignoring ASCII case, as Access does.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    /// Lowercased name → index into `tables`.
    table_ids: HashMap<String, usize>,
    /// Tables in load order.
    tables: Vec<Arc<TableDef>>,
}

impl Catalog {
    /// Creates a catalog from already-parsed table definitions.
    ///
    /// When two tables share a name ignoring case, the first one wins.
    pub fn new(tables: Vec<TableDef>) -> Self {
        let mut table_ids = HashMap::with_capacity(tables.len());
        let mut entries = Vec::with_capacity(tables.len());

        for table in tables {
            let key = table.name.to_ascii_lowercase();
            if table_ids.contains_key(&key) {
                tracing::warn!(table = %table.name, "duplicate table name ignored");
                continue;
            }
            table_ids.insert(key, entries.len());
            entries.push(Arc::new(table));
        }

        Self {
            table_ids,
            tables: entries,
        }
    }

    /// Resolves a table by name.
    pub fn resolve_table(&self, name: &str) -> Option<&Arc<TableDef>> {
        let &idx = self.table_ids.get(&name.to_ascii_lowercase())?;
        self.tables.get(idx)
    }

    /// Resolves a column of a table.
    pub fn resolve_column(&self, table: &str, column: &str) -> Option<&ColumnDef> {
        self.resolve_table(table)?.column(column).map(|(_, c)| c)
    }

    /// Returns every table, system tables included, in load order.
    pub fn tables(&self) -> impl Iterator<Item = &Arc<TableDef>> {
        self.tables.iter()
    }

    /// Returns the non-system tables in load order.
    pub fn user_tables(&self) -> impl Iterator<Item = &Arc<TableDef>> {
        self.tables.iter().filter(|t| !t.system)
    }

    /// Returns the number of tables.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Returns true if the catalog holds no tables.
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

//! Builds a [`Catalog`] by walking `MSysObjects`.

use std::sync::Arc;

use tracing::{debug, warn};

use super::Catalog;
use super::error::CatalogError;
use super::tdef::read_table_def;
use crate::heap::TableScanner;
use crate::row::{RowDecoder, Value};
use crate::storage::{PageId, PageReader};

/// Name of the system table listing every database object.
pub const SYSTEM_OBJECTS: &str = "MSysObjects";

/// `MSysObjects.Type` value of a local table.
const OBJECT_TYPE_TABLE: i64 = 1;
/// Mask removing the high flag bit of `MSysObjects.Type`.
const OBJECT_TYPE_MASK: i64 = 0x7fff;
/// `MSysObjects.Id` bits holding the TDEF page.
const OBJECT_ID_PAGE_MASK: i64 = 0x00ff_ffff;
/// `MSysObjects.Flags` bits set on system tables.
const OBJECT_FLAGS_SYSTEM: i64 = 0x8000_0002;

/// One table entry from `MSysObjects`.
struct TableObject {
    name: String,
    tdef_page: PageId,
    system: bool,
}

impl Catalog {
    /// Loads the catalog of a mounted file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if `MSysObjects` or any table definition it
    /// points at is unreadable. Unsupported column types do not fail the load.
    pub fn load(reader: &Arc<PageReader>) -> Result<Self, CatalogError> {
        let system_objects = Arc::new(read_table_def(
            reader,
            PageId::SYSTEM_OBJECTS,
            SYSTEM_OBJECTS,
        )?);

        let column = |name: &'static str| {
            system_objects
                .column(name)
                .map(|(idx, _)| idx)
                .ok_or(CatalogError::MissingSystemColumn(name))
        };
        let wanted = [column("Id")?, column("Name")?, column("Type")?, column("Flags")?];

        let decoder = RowDecoder::new(reader.clone(), system_objects.clone());
        let mut objects = Vec::new();
        for raw in TableScanner::new(reader.clone(), &system_objects)? {
            let raw = raw?;
            let values = match decoder.decode(&raw, &wanted) {
                Ok(values) => values,
                Err(e) => {
                    warn!(page = %raw.page, row = raw.row, error = %e, "skipping unreadable MSysObjects row");
                    continue;
                }
            };
            if let Some(object) = table_object(&values) {
                objects.push(object);
            }
        }

        let mut tables = Vec::with_capacity(objects.len() + 1);
        let mut system_objects = Arc::unwrap_or_clone(system_objects);
        system_objects.system = true;
        tables.push(system_objects);

        for object in objects {
            if object.tdef_page == PageId::SYSTEM_OBJECTS {
                continue;
            }
            let mut table = read_table_def(reader, object.tdef_page, &object.name)?;
            table.system |= object.system;
            tables.push(table);
        }

        let catalog = Catalog::new(tables);
        debug!(
            tables = catalog.len(),
            user_tables = catalog.user_tables().count(),
            "catalog loaded"
        );
        Ok(catalog)
    }
}

/// Extracts a table entry from decoded `Id`, `Name`, `Type`, `Flags` values.
fn table_object(values: &[Value]) -> Option<TableObject> {
    let [id, name, object_type, flags] = values else {
        return None;
    };
    if object_type.as_i64()? & OBJECT_TYPE_MASK != OBJECT_TYPE_TABLE {
        return None;
    }
    let Value::Text(name) = name else {
        return None;
    };
    let id = id.as_i64()?;
    let flags = flags.as_i64().unwrap_or(0);

    Some(TableObject {
        name: name.clone(),
        tdef_page: PageId::new((id & OBJECT_ID_PAGE_MASK) as u32),
        system: flags & OBJECT_FLAGS_SYSTEM != 0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_object_filters_types() {
        let row = |object_type: i16, flags: i32| {
            vec![
                Value::Long(0x0100_000a),
                Value::Text("Sites".to_string()),
                Value::Int(object_type),
                Value::Long(flags),
            ]
        };

        let object = table_object(&row(1, 0)).unwrap();
        assert_eq!(object.name, "Sites");
        assert_eq!(object.tdef_page, PageId::new(10));
        assert!(!object.system);

        // High bit of Type is a flag, not part of the type
        assert!(table_object(&row(-32767, 0)).is_some());

        let system = table_object(&row(1, 0x8000_0000_u32 as i32)).unwrap();
        assert!(system.system);

        // Queries, forms and other objects are not tables
        assert!(table_object(&row(5, 0)).is_none());
        assert!(table_object(&row(-32764, 0)).is_none());
    }

    #[test]
    fn test_table_object_requires_name() {
        let values = vec![Value::Long(10), Value::Null, Value::Int(1), Value::Long(0)];
        assert!(table_object(&values).is_none());
        assert!(table_object(&[]).is_none());
    }
}

//! Integration tests for catalog loading, table scans and value decoding.


use std::sync::Arc;

use jetdb::catalog::{ColumnType, TypeClass};
use jetdb::heap::{ScanError, TableScanner, UsageMap, fetch_moved_row, fetch_row};
use jetdb::storage::{PageId, RowPointer};
use jetdb::{Database, DecodeErrorPolicy, ErrorKind, Session, SessionConfig};
use jet_test_support::{
    Cell, Column, Fixture, Lval, SYSTEM_OBJECTS_PAGE, TYPE_COMPLEX, Table, Version, deployments,
    write_bytes,
};

fn query_column(path: &std::path::Path, sql: &str, column: &str) -> Vec<Option<String>> {
    let mut session = Session::new();
    session.open(path).unwrap();
    session.query(sql).unwrap();
    let mut values = Vec::new();
    while session.fetch().unwrap() {
        values.push(session.value(column).map(str::to_string));
    }
    session.close();
    values
}

#[test]
fn test_catalog_directory() {
    let file = deployments(Version::Jet4).write();
    let db = Database::open(file.path()).unwrap();
    let catalog = db.catalog();

    let names: Vec<_> = catalog.user_tables().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["Sites", "Instruments"]);
    assert_eq!(catalog.len(), 4);

    let objects = catalog.resolve_table("msysobjects").unwrap();
    assert!(objects.system);
    assert_eq!(objects.tdef_page, PageId::new(SYSTEM_OBJECTS_PAGE));
    assert!(catalog.resolve_table("MSysAccessStorage").unwrap().system);

    let sites = catalog.resolve_table("SITES").unwrap();
    assert!(!sites.system);
    assert_eq!(sites.num_rows, 5);
    assert_eq!(
        sites.column_names().collect::<Vec<_>>(),
        ["SiteID", "Name", "Depth", "Deployed", "Active", "Notes"]
    );
    let types: Vec<_> = sites.columns.iter().map(|c| c.column_type).collect();
    assert_eq!(
        types,
        [
            ColumnType::Long,
            ColumnType::Text,
            ColumnType::Double,
            ColumnType::DateTime,
            ColumnType::Boolean,
            ColumnType::Memo,
        ]
    );

    let attachments = catalog.resolve_column("Instruments", "attachments").unwrap();
    assert_eq!(attachments.column_type, ColumnType::Opaque(TYPE_COMPLEX));
    assert_eq!(attachments.class(), TypeClass::Opaque);
}

#[test]
fn test_scanner_yields_live_rows() {
    let file = deployments(Version::Jet4).write();
    let db = Database::open(file.path()).unwrap();
    let sites = db.catalog().resolve_table("Sites").unwrap();

    let rows: Vec<_> = TableScanner::new(db.reader().clone(), sites)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 5);

    // The moved row is read from its target page, in its stub's place
    let pages: Vec<_> = rows.iter().map(|r| r.page).collect();
    assert_eq!(pages[0], pages[1]);
    assert_eq!(pages[2], pages[4]);
    assert!(pages[1] < pages[2] && pages[2] < pages[3]);
}

#[test]
fn test_moved_row_read_through_pointer() {
    let file = deployments(Version::Jet4).write();
    let db = Database::open(file.path()).unwrap();
    let sites = db.catalog().resolve_table("Sites").unwrap();

    let moved = TableScanner::new(db.reader().clone(), sites)
        .unwrap()
        .nth(3)
        .unwrap()
        .unwrap();
    let pointer = RowPointer {
        page: moved.page,
        row: moved.row as u8,
    };

    // The target is flagged deleted and lives on a page in the usage map
    let map = UsageMap::load(db.reader(), sites.usage_map).unwrap();
    assert!(map.pages(db.reader()).unwrap().contains(&moved.page));
    assert!(matches!(
        fetch_row(db.reader(), pointer),
        Err(ScanError::InvalidPointer { .. })
    ));
    assert_eq!(fetch_moved_row(db.reader(), pointer).unwrap(), moved.data);

    let ids = query_column(file.path(), "SELECT SiteID FROM Sites", "SiteID");
    assert_eq!(ids, ["1", "2", "3", "4", "5"].map(|s| Some(s.to_string())));
}

#[test]
fn test_tdef_continuation_chain() {
    let mut columns = vec![Column::long("Id")];
    columns.extend((0..60).map(|i| Column::int(&format!("Reading{i:02}"))));
    columns.push(Column::text("Label"));
    let mut row = vec![Cell::Long(7)];
    row.extend((0..60).map(|i| Cell::Int(i * 10)));
    row.push(Cell::text("wide"));

    let file = Fixture::jet4()
        .table(Table::new("Wide", columns).real_indexes(400).row(row))
        .write();

    let db = Database::open(file.path()).unwrap();
    let wide = db.catalog().resolve_table("Wide").unwrap();
    assert_eq!(wide.columns.len(), 62);
    assert_eq!(wide.columns[61].name, "Label");

    let values = query_column(file.path(), "SELECT Reading59, Label FROM Wide", "Reading59");
    assert_eq!(values, [Some("590".to_string())]);
    let labels = query_column(file.path(), "SELECT * FROM Wide", "Label");
    assert_eq!(labels, [Some("wide".to_string())]);
}

#[test]
fn test_reference_usage_map() {
    let file = Fixture::jet4()
        .table(
            Table::new("Readings", vec![Column::long("Id")])
                .reference_usage_map()
                .rows_per_page(2)
                .row(vec![Cell::Long(1)])
                .row(vec![Cell::Long(2)])
                .row(vec![Cell::Long(3)]),
        )
        .write();

    let db = Database::open(file.path()).unwrap();
    let table = db.catalog().resolve_table("Readings").unwrap();
    let map = UsageMap::load(db.reader(), table.usage_map).unwrap();
    assert!(matches!(map, UsageMap::Reference { .. }));
    assert_eq!(map.pages(db.reader()).unwrap().len(), 2);

    let ids = query_column(file.path(), "SELECT Id FROM Readings", "Id");
    assert_eq!(ids, ["1", "2", "3"].map(|s| Some(s.to_string())));
}

#[test]
fn test_foreign_and_non_data_pages_skipped() {
    let file = Fixture::jet4()
        .table(
            Table::new("Casts", vec![Column::long("Id")])
                .stray_pages()
                .row(vec![Cell::Long(1)])
                .row(vec![Cell::Long(2)]),
        )
        .write();

    let ids = query_column(file.path(), "SELECT Id FROM Casts", "Id");
    assert_eq!(ids, ["1", "2"].map(|s| Some(s.to_string())));
}

#[test]
fn test_rows_across_many_pages() {
    let mut table = Table::new("Samples", vec![Column::long("Id"), Column::text("Tag")]);
    for i in 0..600 {
        table = table.row(vec![Cell::Long(i), Cell::text(&format!("sample-{i}"))]);
    }
    let file = Fixture::jet4().table(table).write();

    let ids = query_column(file.path(), "SELECT Id FROM Samples", "Id");
    assert_eq!(ids.len(), 600);
    assert_eq!(ids[599].as_deref(), Some("599"));

    let tags = query_column(
        file.path(),
        "SELECT Tag FROM Samples WHERE Id >= 598",
        "Tag",
    );
    assert_eq!(tags, ["sample-598", "sample-599"].map(|s| Some(s.to_string())));
}

#[test]
fn test_long_values() {
    let long_text = "temperature and salinity profile ".repeat(20);
    let file = Fixture::jet4()
        .table(
            Table::new(
                "Casts",
                vec![Column::long("Id"), Column::memo("Notes"), Column::ole("Blob")],
            )
            .row(vec![
                Cell::Long(1),
                Cell::Memo("short".into(), Lval::Inline),
                Cell::Ole(vec![0xde, 0xad], Lval::Inline),
            ])
            .row(vec![
                Cell::Long(2),
                Cell::Memo(long_text.clone(), Lval::SinglePage),
                Cell::Ole(vec![0xbe, 0xef, 0x01], Lval::SinglePage),
            ])
            .row(vec![
                Cell::Long(3),
                Cell::Memo(long_text.clone(), Lval::Chained),
                Cell::Ole((0u8..=9).collect(), Lval::Chained),
            ]),
        )
        .write();

    let notes = query_column(file.path(), "SELECT Notes FROM Casts", "Notes");
    assert_eq!(
        notes,
        [Some("short".to_string()), Some(long_text.clone()), Some(long_text)]
    );
    let blobs = query_column(file.path(), "SELECT Blob FROM Casts", "Blob");
    assert_eq!(
        blobs,
        ["DEAD", "BEEF01", "00010203040506070809"].map(|s| Some(s.to_string()))
    );

    let matched = query_column(
        file.path(),
        "SELECT Id FROM Casts WHERE Notes LIKE '*salinity*'",
        "Id",
    );
    assert_eq!(matched, ["2", "3"].map(|s| Some(s.to_string())));
}

#[test]
fn test_corrupt_long_value_length() {
    // Chained header claiming 1 GiB behind a null pointer
    let mut header = 0x3fff_ffffu32.to_le_bytes().to_vec();
    header.extend_from_slice(&[0u8; 8]);
    let file = Fixture::jet4()
        .table(
            Table::new("Casts", vec![Column::long("Id"), Column::memo("Notes")])
                .row(vec![Cell::Long(1), Cell::Raw(header)])
                .row(vec![Cell::Long(2), Cell::Memo("ok".into(), Lval::Inline)]),
        )
        .write();

    let notes = query_column(file.path(), "SELECT Id, Notes FROM Casts", "Id");
    assert_eq!(notes, [Some("2".to_string())]);

    let config = SessionConfig {
        decode_errors: DecodeErrorPolicy::Surface,
        ..SessionConfig::default()
    };
    let mut session = Session::with_config(config);
    session.open(file.path()).unwrap();
    session.query("SELECT Notes FROM Casts").unwrap();
    let err = session.fetch().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(session.fetch().unwrap());
    assert_eq!(session.value("Notes"), Some("ok"));
}

#[test]
fn test_value_types() {
    let guid = [
        0x78, 0x56, 0x34, 0x12, 0x34, 0x12, 0x78, 0x56, 0x9a, 0xbc, 0xde, 0xf0, 0x12, 0x34, 0x56,
        0x78,
    ];
    let file = Fixture::jet4()
        .table(
            Table::new(
                "Kinds",
                vec![
                    Column::byte("B"),
                    Column::int("I"),
                    Column::money("M"),
                    Column::float("F"),
                    Column::guid("G"),
                    Column::numeric("N", 18, 3),
                    Column::binary("Bin"),
                    Column::text("Packed"),
                ],
            )
            .row(vec![
                Cell::Byte(250),
                Cell::Int(-300),
                Cell::Money(12_345_678),
                Cell::Float(0.5),
                Cell::Guid(guid),
                Cell::Numeric {
                    negative: true,
                    magnitude: 1_234_567,
                },
                Cell::Binary(vec![0x0a, 0xff]),
                Cell::CompressedText("Maria Island".into()),
            ]),
        )
        .write();

    let mut session = Session::new();
    session.open(file.path()).unwrap();
    session.query("SELECT * FROM Kinds").unwrap();
    assert!(session.fetch().unwrap());
    assert_eq!(session.value("B"), Some("250"));
    assert_eq!(session.value("I"), Some("-300"));
    assert_eq!(session.value("M"), Some("1234.5678"));
    assert_eq!(session.value("F"), Some("0.5"));
    assert_eq!(
        session.value("G"),
        Some("{12345678-1234-5678-9ABC-DEF012345678}")
    );
    assert_eq!(session.value("N"), Some("-1234.567"));
    assert_eq!(session.value("Bin"), Some("0AFF"));
    assert_eq!(session.value("Packed"), Some("Maria Island"));
    assert!(!session.fetch().unwrap());

    session.query("SELECT B FROM Kinds WHERE M > 1000").unwrap();
    assert!(session.fetch().unwrap());
    session.query("SELECT B FROM Kinds WHERE N < -1234.6").unwrap();
    assert!(!session.fetch().unwrap());
    session.query("SELECT B FROM Kinds WHERE Packed = 'MARIA ISLAND'").unwrap();
    assert!(session.fetch().unwrap());

    let err = session.query("SELECT B FROM Kinds WHERE Bin = 'x'").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedOperator);
}

#[test]
fn test_corrupt_catalog() {
    let mut bytes = deployments(Version::Jet4).build();
    let page_size = Version::Jet4.page_size();
    bytes[SYSTEM_OBJECTS_PAGE as usize * page_size] = 0x01;
    let file = write_bytes(&bytes);

    let mut session = Session::new();
    let err = session.open(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CorruptCatalog);

    // Nothing stays open after a failed open
    let good = deployments(Version::Jet4).write();
    session.open(good.path()).unwrap();
}

#[test]
fn test_not_a_database() {
    let file = write_bytes(&vec![0u8; 8192]);
    let err = Session::new().open(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);

    let file = write_bytes(b"short");
    let err = Session::new().open(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_corrupt_data_page_skipped() {
    let fixture = deployments(Version::Jet4);
    let file = fixture.write();
    let first_page = {
        let db = Database::open(file.path()).unwrap();
        let sites = Arc::clone(db.catalog().resolve_table("Sites").unwrap());
        let map = UsageMap::load(db.reader(), sites.usage_map).unwrap();
        map.pages(db.reader()).unwrap()[0]
    };

    // A row count whose directory cannot fit in the page
    let mut bytes = fixture.build();
    let at = first_page.page_num() as usize * Version::Jet4.page_size() + 12;
    bytes[at..at + 2].copy_from_slice(&0xffffu16.to_le_bytes());
    let file = write_bytes(&bytes);

    let ids = query_column(file.path(), "SELECT SiteID FROM Sites", "SiteID");
    assert_eq!(ids, ["3", "4", "5"].map(|s| Some(s.to_string())));
}

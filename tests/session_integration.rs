//! Integration tests for the session protocol over generated database files.


use jetdb::sql::Literal;
use jetdb::{DecodeErrorPolicy, ErrorKind, Session, SessionConfig, SessionState, read_table};
use jet_test_support::{Version, deployments};

fn open(version: Version) -> (jet_test_support::FixtureFile, Session) {
    let file = deployments(version).write();
    let mut session = Session::new();
    session.open(file.path()).unwrap();
    (file, session)
}

fn fetch_all(session: &mut Session, columns: &[&str]) -> Vec<Vec<Option<String>>> {
    let mut rows = Vec::new();
    while session.fetch().unwrap() {
        rows.push(
            columns
                .iter()
                .map(|c| session.value(c).map(str::to_string))
                .collect(),
        );
    }
    rows
}

#[test]
fn test_open_close_reopen() {
    let file = deployments(Version::Jet4).write();
    let mut session = Session::new();

    session.open(file.path()).unwrap();
    assert_eq!(session.state(), SessionState::Open);
    session.close();
    assert_eq!(session.state(), SessionState::Closed);

    session.open(file.path()).unwrap();
    session.query("SELECT SiteID FROM Sites").unwrap();
    assert!(session.fetch().unwrap());
    session.close();
}

#[test]
fn test_open_while_open_is_busy() {
    let (file, mut session) = open(Version::Jet4);
    session.query("SELECT SiteID FROM Sites").unwrap();
    assert!(session.fetch().unwrap());

    let err = session.open(file.path()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Busy);

    // The first handle and its cursor are untouched
    assert_eq!(session.state(), SessionState::Queried);
    assert_eq!(session.value("SiteID"), Some("1"));
    assert!(session.fetch().unwrap());
    assert_eq!(session.value("SiteID"), Some("2"));
}

#[test]
fn test_separate_sessions_are_independent() {
    let file = deployments(Version::Jet4).write();
    let mut first = Session::new();
    let mut second = Session::new();
    first.open(file.path()).unwrap();
    second.open(file.path()).unwrap();
    assert_eq!(first.state(), SessionState::Open);
    assert_eq!(second.state(), SessionState::Open);
}

#[test]
fn test_full_scan_then_idempotent_exhaustion() {
    let (_file, mut session) = open(Version::Jet4);
    session.query("SELECT * FROM Sites").unwrap();

    let ids = fetch_all(&mut session, &["SiteID"]);
    let ids: Vec<_> = ids.into_iter().map(|r| r[0].clone().unwrap()).collect();
    // Deleted row 99 is skipped; overflowed row 4 is followed
    assert_eq!(ids, ["1", "2", "3", "4", "5"]);

    assert!(!session.fetch().unwrap());
    assert!(!session.fetch().unwrap());
    assert_eq!(session.value("SiteID"), None);
    assert_eq!(session.state(), SessionState::Queried);
}

#[test]
fn test_projection_order() {
    let (_file, mut session) = open(Version::Jet4);

    session.query("SELECT Name, SiteID FROM Sites").unwrap();
    assert_eq!(session.columns().unwrap(), ["Name", "SiteID"]);
    assert!(session.fetch().unwrap());
    let row = session.current_row().unwrap();
    assert_eq!(
        row.values(),
        [Some("Maria Island".to_string()), Some("1".to_string())]
    );

    session.query("SELECT * FROM Sites").unwrap();
    assert_eq!(
        session.columns().unwrap(),
        ["SiteID", "Name", "Depth", "Deployed", "Active", "Notes"]
    );
}

#[test]
fn test_formatted_values() {
    let (_file, mut session) = open(Version::Jet4);
    session.query("SELECT * FROM Sites").unwrap();

    assert!(session.fetch().unwrap());
    assert_eq!(session.value("Name"), Some("Maria Island"));
    assert_eq!(session.value("Depth"), Some("12.5"));
    assert_eq!(session.value("Deployed"), Some("2010-01-01 00:00:00"));
    assert_eq!(session.value("Active"), Some("1"));
    assert_eq!(session.value("Notes"), Some("first mooring"));

    assert!(session.fetch().unwrap());
    assert_eq!(session.value("Depth"), Some("20"));
    assert_eq!(session.value("Deployed"), Some("2011-01-01 06:00:00"));
    assert_eq!(session.value("Active"), Some("0"));
    assert_eq!(session.value("Notes"), None);

    assert!(session.fetch().unwrap());
    assert_eq!(session.value("Notes"), Some(""));
}

#[test]
fn test_value_for_absent_column() {
    let (_file, mut session) = open(Version::Jet4);
    session.query("SELECT Name FROM Sites").unwrap();
    assert_eq!(session.value("Name"), None);

    assert!(session.fetch().unwrap());
    assert_eq!(session.value("Name"), Some("Maria Island"));
    assert_eq!(session.value("SiteID"), None);
    assert_eq!(session.value("NoSuchColumn"), None);
    assert_eq!(session.value("name"), None);
}

#[test]
fn test_type_mismatch_fails_at_query_time() {
    let (_file, mut session) = open(Version::Jet4);
    session.query("SELECT * FROM Sites").unwrap();
    assert!(session.fetch().unwrap());

    let err = session.query("SELECT * FROM Sites WHERE SiteID = 'one'").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
    assert_eq!(session.state(), SessionState::Open);
    assert!(matches!(session.fetch(), Err(e) if e.kind() == ErrorKind::NoActiveQuery));

    let err = session.query("SELECT * FROM Sites WHERE Deployed > #someday#").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::TypeMismatch);
}

#[test]
fn test_query_errors_leave_session_open() {
    let (_file, mut session) = open(Version::Jet4);

    let cases = [
        ("SELECT FROM Sites", ErrorKind::Syntax),
        ("SELECT * FROM Nowhere", ErrorKind::UnknownTable),
        ("SELECT Missing FROM Sites", ErrorKind::UnknownColumn),
        ("SELECT * FROM Sites WHERE Active > 0", ErrorKind::UnsupportedOperator),
        ("SELECT * FROM Instruments WHERE Attachments IS NULL", ErrorKind::UnsupportedType),
        ("SELECT * FROM MSysObjects", ErrorKind::UnknownTable),
    ];
    for (sql, kind) in cases {
        let err = session.query(sql).unwrap_err();
        assert_eq!(err.kind(), kind, "{sql}: {err}");
        assert_eq!(session.state(), SessionState::Open);
    }

    session.query("SELECT SiteID FROM Sites").unwrap();
    assert!(session.fetch().unwrap());
}

#[test]
fn test_close_twice() {
    let (_file, mut session) = open(Version::Jet4);
    session.query("SELECT * FROM Sites").unwrap();
    session.close();
    session.close();
    assert_eq!(session.state(), SessionState::Closed);
    assert!(matches!(session.fetch(), Err(e) if e.kind() == ErrorKind::NotOpen));
}

#[test]
fn test_filters() {
    let (_file, mut session) = open(Version::Jet4);

    let mut ids = |sql: &str| -> Vec<String> {
        session.query(sql).unwrap();
        fetch_all(&mut session, &["SiteID"])
            .into_iter()
            .filter_map(|r| r[0].clone())
            .collect()
    };

    assert_eq!(ids("SELECT SiteID FROM Sites WHERE Depth > 10"), ["1", "2", "4"]);
    assert_eq!(ids("SELECT SiteID FROM Sites WHERE Depth <= 12.5"), ["1", "3"]);
    assert_eq!(ids("SELECT SiteID FROM Sites WHERE Name = 'bondi'"), ["2"]);
    assert_eq!(ids("SELECT SiteID FROM Sites WHERE Name LIKE '%ing%'"), ["3", "4"]);
    assert_eq!(ids("SELECT SiteID FROM Sites WHERE Name IS NULL"), ["5"]);
    assert_eq!(ids("SELECT SiteID FROM Sites WHERE Notes IS NOT NULL"), ["1", "3"]);
    assert_eq!(ids("SELECT SiteID FROM Sites WHERE Active = TRUE"), ["1", "3", "4"]);
    assert_eq!(ids("SELECT SiteID FROM Sites WHERE Active <> 1"), ["2", "5"]);
    assert_eq!(
        ids("SELECT SiteID FROM Sites WHERE Deployed >= #2012-01-01#"),
        ["3", "4"]
    );
    assert_eq!(
        ids("SELECT SiteID FROM Sites WHERE Deployed < '01/01/2011 12:00'"),
        ["1", "2"]
    );
}

#[test]
fn test_opaque_column_tolerated() {
    let (_file, mut session) = open(Version::Jet4);

    session.query("SELECT InstrumentID, Make FROM Instruments").unwrap();
    let rows = fetch_all(&mut session, &["InstrumentID", "Make"]);
    assert_eq!(
        rows,
        [
            [Some("10".to_string()), Some("Seabird".to_string())],
            [Some("11".to_string()), Some("Nortek".to_string())],
        ]
    );

    // Every row reads the opaque column, so every row is skipped
    session.query("SELECT * FROM Instruments").unwrap();
    assert!(!session.fetch().unwrap());
}

#[test]
fn test_surfaced_decode_errors() {
    let file = deployments(Version::Jet4).write();
    let config = SessionConfig {
        decode_errors: DecodeErrorPolicy::Surface,
        ..SessionConfig::default()
    };
    let mut session = Session::with_config(config);
    session.open(file.path()).unwrap();

    session.query("SELECT * FROM Instruments").unwrap();
    for _ in 0..2 {
        let err = session.fetch().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(session.value("InstrumentID"), None);
    }
    assert!(!session.fetch().unwrap());
}

#[test]
fn test_system_tables_with_config() {
    let file = deployments(Version::Jet4).write();

    let mut session = Session::new();
    session.open(file.path()).unwrap();
    assert_eq!(session.table_names().unwrap(), ["Sites", "Instruments"]);

    let config = SessionConfig {
        include_system_tables: true,
        ..SessionConfig::default()
    };
    let mut session = Session::with_config(config);
    session.open(file.path()).unwrap();
    assert_eq!(
        session.table_names().unwrap(),
        ["MSysObjects", "Sites", "Instruments", "MSysAccessStorage"]
    );

    session.query("SELECT Name FROM MSysObjects WHERE Type = 1").unwrap();
    let names: Vec<_> = fetch_all(&mut session, &["Name"])
        .into_iter()
        .filter_map(|r| r[0].clone())
        .collect();
    assert_eq!(
        names,
        ["MSysObjects", "Sites", "Instruments", "MSysAccessStorage"]
    );
}

#[test]
fn test_read_table() {
    let file = deployments(Version::Jet4).write();

    let rows = read_table(file.path(), "Sites", None, SessionConfig::default()).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[3].get("Name"), Some("Port Hacking"));

    let rows = read_table(
        file.path(),
        "Sites",
        Some(("Name", Literal::String("Kingston".into()))),
        SessionConfig::default(),
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("SiteID"), Some("3"));

    let rows = read_table(
        file.path(),
        "Sites",
        Some(("SiteID", Literal::Integer(2))),
        SessionConfig::default(),
    )
    .unwrap();
    assert_eq!(rows[0].get("Name"), Some("Bondi"));

    let err = read_table(file.path(), "Nope", None, SessionConfig::default()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownTable);
}

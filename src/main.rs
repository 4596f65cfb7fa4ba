//! Command-line front end for reading JET database files.
//!
//! ```bash
//! jetdb deployments.mdb --tables
//! jetdb deployments.mdb --columns Sites
//! jetdb deployments.mdb -c "SELECT SiteID, Name FROM Sites WHERE Depth > 10"
//! ```

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, anyhow};
use clap::{ArgGroup, Parser};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use jetdb::{DecodeErrorPolicy, Session, SessionConfig};

/// Read-only access to Microsoft Access databases
#[derive(Parser, Debug)]
#[command(name = "jetdb", version, about)]
#[command(group(ArgGroup::new("mode").required(true).args(["tables", "columns", "command"])))]
struct Args {
    /// Database file (.mdb)
    file: PathBuf,

    /// List the tables in the database
    #[arg(long)]
    tables: bool,

    /// List the columns of a table
    #[arg(long, value_name = "TABLE")]
    columns: Option<String>,

    /// Run a query and print its rows
    #[arg(short = 'c', long, value_name = "SQL")]
    command: Option<String>,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report undecodable rows instead of skipping them
    #[arg(long)]
    surface_decode_errors: bool,

    /// Enable verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = load_config(&args)?;
    let mut session = Session::with_config(config);
    session
        .open(&args.file)
        .with_context(|| format!("cannot open {}", args.file.display()))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let result = if args.tables {
        print_tables(&session, &mut out)
    } else if let Some(table) = &args.columns {
        print_columns(&session, table, &mut out)
    } else if let Some(sql) = &args.command {
        print_query(&mut session, sql, &mut out)
    } else {
        Ok(())
    };
    session.close();

    result?;
    out.flush()?;
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("jetdb=debug")
        } else {
            EnvFilter::new("jetdb=warn")
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .without_time()
        .init();
}

fn load_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };

    if args.surface_decode_errors {
        config.decode_errors = DecodeErrorPolicy::Surface;
    }

    debug!(?config, "configuration loaded");
    Ok(config)
}

fn print_tables(session: &Session, out: &mut impl Write) -> Result<()> {
    writeln!(out, "Table")?;
    for name in session.table_names()? {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

fn print_columns(session: &Session, table: &str, out: &mut impl Write) -> Result<()> {
    let def = session
        .catalog()
        .and_then(|c| c.resolve_table(table))
        .filter(|t| session.config().include_system_tables || !t.system)
        .ok_or_else(|| anyhow!("table \"{table}\" does not exist"))?;

    writeln!(out, "Column\tType\tSize\tNullable")?;
    for column in &def.columns {
        writeln!(
            out,
            "{}\t{}\t{}\t{}",
            column.name,
            column.column_type.name(),
            column.size,
            if column.is_nullable() { "yes" } else { "no" }
        )?;
    }
    Ok(())
}

fn print_query(session: &mut Session, sql: &str, out: &mut impl Write) -> Result<()> {
    session.query(sql)?;
    if let Some(columns) = session.columns() {
        writeln!(out, "{}", columns.join("\t"))?;
    }

    loop {
        match session.fetch() {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) if e.kind() == jetdb::ErrorKind::Decode => {
                eprintln!("warning: {e}");
                continue;
            }
            Err(e) => return Err(e.into()),
        }
        if let Some(row) = session.current_row() {
            let line: Vec<&str> = row.values().iter().map(|v| v.as_deref().unwrap_or("")).collect();
            writeln!(out, "{}", line.join("\t"))?;
        }
    }
    Ok(())
}

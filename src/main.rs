//! Purpose: `rowstore` CLI entry point.
//! Role: Binary crate root; parses args, runs one operation, emits JSON on stdout.
//! Invariants: Successful commands emit exactly one JSON document on stdout.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
//! Invariants: All storage access goes through `api::Service` (locks + reconciliation).
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use rowstore::api::{
    ColumnDefinition, ColumnType, Error, ErrorKind, Filter, RowValues, Service,
    default_store_dir, to_exit_code,
};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse_from(std::env::args_os().collect::<Vec<OsString>>()) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Storage)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Try `rowstore --help`."));
            }
        },
    };

    init_tracing();

    let root = cli.dir.unwrap_or_else(default_store_dir);
    let service = Service::new().with_root(root);

    command_dispatch::dispatch_command(cli.command, &service)
        .map_err(add_corrupt_hint)
        .map_err(add_io_hint)
        .map_err(add_internal_hint)
}

#[derive(Parser)]
#[command(
    name = "rowstore",
    version,
    about = "Schema-checked tables stored as plain JSON files",
    long_about = None,
    after_help = r#"EXAMPLES
  $ rowstore db create school
  $ rowstore table create school students -c id:integer:auto -c name:string -c book:complexInteger
  $ rowstore row insert school students '{"name": "Ann", "book": "101+0i"}'
  $ rowstore row list school students --page 1 --limit 20
  $ rowstore row update school students --where id=1 '{"book": "102-5i"}'
  $ rowstore row delete school students --where name=Ann
  $ rowstore project school students name book

NOTES
  - Default location: ./databases (override with --dir or ROWSTORE_DIR)
  - Column types: integer, real, char, string, complexInteger, complexReal
  - Logging goes to stderr; tune it with RUST_LOG (default: warn)"#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "ROWSTORE_DIR",
        help = "Storage root holding one directory per database (default: ./databases)",
        value_hint = ValueHint::DirPath
    )]
    dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(arg_required_else_help = true, about = "Create, drop and inspect databases")]
    Db {
        #[command(subcommand)]
        command: DbCommand,
    },
    #[command(arg_required_else_help = true, about = "Create, drop and inspect tables")]
    Table {
        #[command(subcommand)]
        command: TableCommand,
    },
    #[command(arg_required_else_help = true, about = "Insert, list, update and delete rows")]
    Row {
        #[command(subcommand)]
        command: RowCommand,
    },
    #[command(
        arg_required_else_help = true,
        about = "Print a projection of a table onto some of its columns",
        long_about = r#"Print a projection of a table onto some of its columns.

The projection is a new table named <table>_projection; it is not saved."#
    )]
    Project {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
        #[arg(required = true, help = "Columns to keep, in output order")]
        columns: Vec<String>,
    },
}

#[derive(Subcommand)]
enum DbCommand {
    #[command(about = "Create one or more databases")]
    Create {
        #[arg(required = true, help = "Database name(s)")]
        names: Vec<String>,
    },
    #[command(about = "Delete one or more databases and all their tables")]
    Drop {
        #[arg(required = true, help = "Database name(s)")]
        names: Vec<String>,
    },
    #[command(about = "List databases with their size and table count")]
    List,
    #[command(about = "Show size and table count of a database")]
    Stats {
        #[arg(help = "Database name")]
        name: String,
    },
}

#[derive(Subcommand)]
enum TableCommand {
    #[command(
        about = "Create a table",
        after_help = r#"EXAMPLES
  $ rowstore table create shop items -c id:integer:auto -c label:string -c price:real"#
    )]
    Create {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
        #[arg(
            short = 'c',
            long = "column",
            value_name = "NAME:TYPE[:auto]",
            help = "Repeatable column definition"
        )]
        columns: Vec<String>,
    },
    #[command(about = "List tables of a database with their file sizes")]
    List {
        #[arg(help = "Database name")]
        database: String,
    },
    #[command(about = "Delete a table")]
    Drop {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
    },
    #[command(about = "Show the file size of a table")]
    Stats {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
    },
}

#[derive(Subcommand)]
enum RowCommand {
    #[command(about = "Insert one row given as a JSON object")]
    Insert {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
        #[arg(help = "Row values as a JSON object")]
        data: String,
    },
    #[command(about = "List one page of rows")]
    List {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
        #[arg(long, default_value_t = 1, help = "1-based page number")]
        page: usize,
        #[arg(long, default_value_t = 10, help = "Rows per page")]
        limit: usize,
    },
    #[command(about = "Delete the first row matching every --where filter")]
    Delete {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
        #[arg(
            short = 'w',
            long = "where",
            value_name = "COLUMN=VALUE",
            help = "Repeatable filter; values match loosely (\"1\" matches 1)"
        )]
        filters: Vec<String>,
    },
    #[command(about = "Update every row matching all --where filters")]
    Update {
        #[arg(help = "Database name")]
        database: String,
        #[arg(help = "Table name")]
        table: String,
        #[arg(
            short = 'w',
            long = "where",
            value_name = "COLUMN=VALUE",
            help = "Repeatable filter; values match loosely (\"1\" matches 1)"
        )]
        filters: Vec<String>,
        #[arg(help = "New values as a JSON object")]
        data: String,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn parse_column(definition: &str) -> Result<ColumnDefinition, Error> {
    let mut parts = definition.split(':');
    let (Some(name), Some(ty)) = (parts.next(), parts.next()) else {
        return Err(column_definition_error(definition));
    };
    if name.is_empty() {
        return Err(column_definition_error(definition));
    }
    let column = ColumnDefinition::new(name, ty.parse::<ColumnType>()?);
    match (parts.next(), parts.next()) {
        (None, _) => Ok(column),
        (Some("auto"), None) => Ok(column.auto_increment()),
        _ => Err(column_definition_error(definition)),
    }
}

fn column_definition_error(definition: &str) -> Error {
    Error::new(ErrorKind::Usage)
        .with_message(format!("invalid column definition \"{definition}\""))
        .with_hint("Use NAME:TYPE or NAME:integer:auto, e.g. -c id:integer:auto.")
}

fn parse_filters(filters: &[String]) -> Result<Filter, Error> {
    let mut out = Filter::new();
    for filter in filters {
        let Some((column, value)) = filter.split_once('=') else {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!("invalid filter \"{filter}\""))
                .with_hint("Use COLUMN=VALUE, e.g. --where id=3."));
        };
        out.insert(column.to_string(), Value::String(value.to_string()));
    }
    Ok(out)
}

fn parse_row_values(data: &str) -> Result<RowValues, Error> {
    let value: Value = serde_json::from_str(data).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message("invalid json")
            .with_hint("Provide a single JSON object (e.g. '{\"name\":\"Ann\"}').")
            .with_source(err)
    })?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message("row data must be a JSON object")
            .with_hint("Wrap values in an object keyed by column name.")),
    }
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Permission => err.with_hint(
            "Permission denied. Check directory permissions or use --dir to a writable location.",
        ),
        ErrorKind::Busy => {
            err.with_hint("Database is busy (another writer holds the lock). Retry with backoff.")
        }
        ErrorKind::Storage => {
            err.with_hint("Storage error. Check the path, filesystem, and disk space.")
        }
        _ => err,
    }
}

fn add_corrupt_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Corrupt || err.hint().is_some() {
        return err;
    }
    err.with_hint("Table file is unreadable. Restore it from a backup or remove it.")
}

fn add_internal_hint(err: Error) -> Error {
    if err.kind() != ErrorKind::Internal || err.hint().is_some() {
        return err;
    }
    err.with_hint(
        "Unexpected internal failure. Retry with RUST_BACKTRACE=1 and share command/context if it persists.",
    )
}

fn emit_json(value: Value) {
    let json = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    }
    .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let json = serde_json::to_string(&error_json(err)).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::InvalidIdentifier => "invalid name",
        ErrorKind::AlreadyExists => "already exists",
        ErrorKind::NotFound => "not found",
        ErrorKind::SchemaViolation => "schema violation",
        ErrorKind::MultipleAutoIncrement => "more than one auto-increment column",
        ErrorKind::BadAutoIncrementType => "auto-increment column must be integer",
        ErrorKind::EmptyFilter => "empty filter",
        ErrorKind::ProjectionColumnMissing => "projection column not found",
        ErrorKind::Busy => "resource is busy",
        ErrorKind::Permission => "permission denied",
        ErrorKind::Corrupt => "corrupt data",
        ErrorKind::Storage => "storage error",
    }
    .to_string()
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if !err.columns().is_empty() {
        inner.insert("columns".to_string(), json!(err.columns()));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    if let Some(path) = err.path() {
        lines.push(format!("path: {}", path.display()));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!("caused by: {cause}"));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
        return trimmed.to_string();
    }
    "invalid arguments".to_string()
}

//! Purpose: Hold top-level CLI command dispatch for `rowstore`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Each command performs exactly one `Service` operation per named target.
//! Invariants: Output envelopes are JSON objects keyed by what the command produced.

use super::*;

pub(super) fn dispatch_command(command: Command, service: &Service) -> Result<RunOutcome, Error> {
    match command {
        Command::Db { command } => dispatch_db(command, service),
        Command::Table { command } => dispatch_table(command, service),
        Command::Row { command } => dispatch_row(command, service),
        Command::Project {
            database,
            table,
            columns,
        } => {
            let projected = service.project_table(&database, &table, &columns)?;
            emit_json(to_json(&projected)?);
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_db(command: DbCommand, service: &Service) -> Result<RunOutcome, Error> {
    match command {
        DbCommand::Create { names } => {
            for name in &names {
                service.create_database(name)?;
            }
            emit_json(json!({ "created": names }));
            Ok(RunOutcome::ok())
        }
        DbCommand::Drop { names } => {
            for name in &names {
                service.drop_database(name)?;
            }
            emit_json(json!({ "dropped": names }));
            Ok(RunOutcome::ok())
        }
        DbCommand::List => {
            let databases = service.list_databases()?;
            emit_json(json!({ "databases": to_json(&databases)? }));
            Ok(RunOutcome::ok())
        }
        DbCommand::Stats { name } => {
            let info = service.database_stats(&name)?;
            emit_json(to_json(&info)?);
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_table(command: TableCommand, service: &Service) -> Result<RunOutcome, Error> {
    match command {
        TableCommand::Create {
            database,
            table,
            columns,
        } => {
            let columns = columns
                .iter()
                .map(|definition| parse_column(definition))
                .collect::<Result<Vec<_>, _>>()?;
            let encoded = to_json(&columns)?;
            service.create_table(&database, &table, columns)?;
            emit_json(json!({ "database": database, "table": table, "columns": encoded }));
            Ok(RunOutcome::ok())
        }
        TableCommand::List { database } => {
            let tables = service.list_tables(&database)?;
            emit_json(json!({ "database": database, "tables": to_json(&tables)? }));
            Ok(RunOutcome::ok())
        }
        TableCommand::Drop { database, table } => {
            service.drop_table(&database, &table)?;
            emit_json(json!({ "database": database, "dropped": table }));
            Ok(RunOutcome::ok())
        }
        TableCommand::Stats { database, table } => {
            let info = service.table_stats(&database, &table)?;
            emit_json(to_json(&info)?);
            Ok(RunOutcome::ok())
        }
    }
}

fn dispatch_row(command: RowCommand, service: &Service) -> Result<RunOutcome, Error> {
    match command {
        RowCommand::Insert {
            database,
            table,
            data,
        } => {
            let values = parse_row_values(&data)?;
            let row = service.insert_row(&database, &table, values)?;
            emit_json(json!({ "row": to_json(&row)? }));
            Ok(RunOutcome::ok())
        }
        RowCommand::List {
            database,
            table,
            page,
            limit,
        } => {
            let page = service.rows_page(&database, &table, page, limit)?;
            emit_json(to_json(&page)?);
            Ok(RunOutcome::ok())
        }
        RowCommand::Delete {
            database,
            table,
            filters,
        } => {
            let filter = parse_filters(&filters)?;
            let deleted = service.delete_rows(&database, &table, &filter)?;
            emit_json(json!({ "deletedCount": deleted }));
            Ok(RunOutcome::ok())
        }
        RowCommand::Update {
            database,
            table,
            filters,
            data,
        } => {
            let filter = parse_filters(&filters)?;
            let values = parse_row_values(&data)?;
            let updated = service.update_rows(&database, &table, &filter, &values)?;
            emit_json(json!({ "updatedCount": updated }));
            Ok(RunOutcome::ok())
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Value, Error> {
    serde_json::to_value(value).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode output")
            .with_source(err)
    })
}

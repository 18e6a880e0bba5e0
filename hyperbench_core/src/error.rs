use std::error::Error;
use thiserror::Error;

use crate::schema::ColumnType;

pub fn print_error(err: &impl Error) {
    eprintln!("Encountered error: {}", err);
}

#[derive(Error, Debug)]
pub enum BenchErr {
    #[error(transparent)]
    ConnectionErr(#[from] ConnectionErr),
    #[error(transparent)]
    SchemaErr(#[from] SchemaErr),
    #[error(transparent)]
    DecodeErr(#[from] DecodeErr),
    #[error(transparent)]
    StatementErr(#[from] StatementErr),
}

#[derive(Error, Debug)]
pub enum ConnectionErr {
    #[error("Invalid connection string \"{conninfo}\".")]
    ConfigErr {
        conninfo: String,
        #[source]
        inner: postgres::Error,
    },
    #[error("Failed to open a connection to the store.")]
    ConnectErr(#[from] postgres::Error),
}

#[derive(Error, Debug)]
pub enum SchemaErr {
    #[error("Failed to check whether table {table} exists.")]
    ExistenceCheckErr {
        table: String,
        #[source]
        inner: postgres::Error,
    },
    #[error("Failed to create table {table}.")]
    TableCreationErr {
        table: String,
        #[source]
        inner: postgres::Error,
    },
    #[error("Failed to create hypertable {table}.")]
    HypertableCreationErr {
        table: String,
        #[source]
        inner: postgres::Error,
    },
}

#[derive(Error, Debug)]
pub enum DecodeErr {
    #[error("Line #{line_num} has {actual} fields; expected {expected}: \"{line}\"")]
    MalformedRow {
        line_num: usize,
        line: String,
        expected: usize,
        actual: usize,
    },
    #[error("Line #{line_num} column {column} failed to parse \"{value}\" as {column_type}.")]
    BadField {
        line_num: usize,
        column: String,
        value: String,
        column_type: ColumnType,
    },
    #[error("Failed to read from CSV.")]
    CsvErr(#[from] csv::Error),
}

impl DecodeErr {
    /// Malformed input is skipped with a diagnostic; read failures abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedRow { .. } | Self::BadField { .. })
    }
}

#[derive(Error, Debug)]
pub enum StatementErr {
    #[error("Record has {actual} fields but the statement expects {expected}.")]
    SchemaMismatch { expected: usize, actual: usize },
    #[error("Statement execution failed.")]
    ExecErr(#[from] postgres::Error),
    #[error("Column {column} could not be read from the result row.")]
    ColumnReadErr {
        column: String,
        #[source]
        inner: postgres::Error,
    },
}

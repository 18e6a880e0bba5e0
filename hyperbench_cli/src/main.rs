mod cli;
mod handlers;
mod output;

use std::path::PathBuf;

use clap::Parser;
use cli::EntryArgs;
use hyperbench_core::error::{BenchErr, ConnectionErr, SchemaErr, StatementErr};
use hyperbench_core::print_error;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CLIErr {
    #[error(transparent)]
    BenchErr(#[from] BenchErr),
    #[error(transparent)]
    ConnectionErr(#[from] ConnectionErr),
    #[error(transparent)]
    SchemaErr(#[from] SchemaErr),
    #[error(transparent)]
    StatementErr(#[from] StatementErr),
    #[error("Failed to open {path}.")]
    InputFileErr {
        path: PathBuf,
        #[source]
        inner: hyperbench_core::error::DecodeErr,
    },
    #[error("Failed to write {path}.")]
    GenerateErr {
        path: PathBuf,
        #[source]
        inner: std::io::Error,
    },
    #[error("Failed to serialize the latency report.")]
    ReportErr(#[from] serde_json::Error),
}

fn main() {
    let args = EntryArgs::parse();
    if let Err(err) = handlers::handle_command(args.command) {
        print_error(&err);
        std::process::exit(1);
    }
}

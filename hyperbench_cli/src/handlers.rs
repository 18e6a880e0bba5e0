use std::path::{Path, PathBuf};

use hyperbench_core::bench::{run_pipeline, Harness};
use hyperbench_core::decode::Decoder;
use hyperbench_core::error::print_error;
use hyperbench_core::generate::write_hash_csv;
use hyperbench_core::{Record, Schema, StoreClient};

use crate::cli::{Command, StoreArgs};
use crate::output;
use crate::CLIErr;

pub fn handle_command(command: Command) -> Result<(), CLIErr> {
    match command {
        Command::Generate { output, records } => handle_generate(&output, records),
        Command::Setup { store } => handle_setup(&store),
        Command::Load {
            store,
            csv,
            batch_size,
        } => handle_load(&store, &csv, batch_size),
        Command::Read { store, limit } => handle_read(&store, limit),
        Command::Run {
            store,
            csv,
            batch_size,
            limit,
            json,
        } => handle_run(&store, &csv, batch_size, limit, json),
    }
}

fn handle_generate(output: &Path, records: u64) -> Result<(), CLIErr> {
    write_hash_csv(output, records).map_err(|inner| CLIErr::GenerateErr {
        path: output.to_path_buf(),
        inner,
    })?;
    println!("Created {} records in {}", records, output.display());
    Ok(())
}

fn handle_setup(store: &StoreArgs) -> Result<(), CLIErr> {
    let mut client = StoreClient::connect(&store.conninfo)?;
    client.ensure_schema(&store.dataset.schema())?;
    Ok(())
}

fn handle_load(store: &StoreArgs, csv: &Path, batch_size: usize) -> Result<(), CLIErr> {
    let schema = store.dataset.schema();
    let mut client = StoreClient::connect(&store.conninfo)?;
    client.ensure_schema(&schema)?;

    let batch_size = batch_size.max(1);
    let mut batch: Vec<Record> = Vec::with_capacity(batch_size);
    let mut inserted = 0;
    let mut skipped = 0;
    println!("Loading {} into '{}'...", csv.display(), schema.table());
    for result in open_stream(&schema, csv)? {
        match result {
            Ok(record) => {
                batch.push(record);
                if batch.len() == batch_size {
                    inserted += client.insert_batch(&schema, &batch);
                    batch.clear();
                }
            }
            Err(err) if err.is_recoverable() => {
                print_error(&err);
                skipped += 1;
            }
            Err(err) => return Err(hyperbench_core::BenchErr::from(err).into()),
        }
    }
    if !batch.is_empty() {
        inserted += client.insert_batch(&schema, &batch);
    }
    println!(
        "Loaded {} records into '{}' ({} rows skipped)",
        inserted,
        schema.table(),
        skipped
    );
    Ok(())
}

fn handle_read(store: &StoreArgs, limit: i64) -> Result<(), CLIErr> {
    let schema = store.dataset.schema();
    let client = StoreClient::connect(&store.conninfo)?;
    let mut harness = Harness::new(client, schema);

    println!("Performing sequential read...");
    let rows = harness.timed_sequential_read()?;
    println!("Read back {} rows", rows.len());

    println!("\nPerforming latest read...");
    for row in harness.timed_latest_read(limit)? {
        println!("{}", row.to_csv_line());
    }

    println!("\nPerforming random read...");
    if let Some(row) = harness.timed_random_read()? {
        println!("{}", row.to_csv_line());
    }

    output::print_summaries(&harness.summaries());
    Ok(())
}

fn handle_run(
    store: &StoreArgs,
    csv: &Path,
    batch_size: usize,
    limit: i64,
    json: bool,
) -> Result<(), CLIErr> {
    let schema = store.dataset.schema();
    let report = run_pipeline(&store.conninfo, &schema, csv, batch_size, limit)?;

    println!(
        "\nDecoded {} records ({} rows skipped), inserted {}, read back {}",
        report.decoded, report.skipped_rows, report.inserted, report.rows_read
    );
    output::print_summaries(&report.summaries);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn open_stream(
    schema: &Schema,
    csv: &Path,
) -> Result<hyperbench_core::decode::RecordStream<std::fs::File>, CLIErr> {
    Decoder::new(schema)
        .open(csv)
        .map_err(|inner| CLIErr::InputFileErr {
            path: PathBuf::from(csv),
            inner,
        })
}

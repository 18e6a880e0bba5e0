use std::fmt::{self, Display};
use std::path::Path;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::decode::Decoder;
use crate::error::{print_error, BenchErr, StatementErr};
use crate::record::Record;
use crate::schema::Schema;
use crate::store::StoreClient;

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    Insert,
    SequentialRead,
    LatestRead,
    RandomRead,
}

impl OpKind {
    const ALL: [OpKind; 4] = [
        OpKind::Insert,
        OpKind::SequentialRead,
        OpKind::LatestRead,
        OpKind::RandomRead,
    ];
}

impl Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insert => f.write_str("insert"),
            Self::SequentialRead => f.write_str("sequential read"),
            Self::LatestRead => f.write_str("latest read"),
            Self::RandomRead => f.write_str("random read"),
        }
    }
}

/// One timed store operation. Append-only, reporting only.
#[derive(Clone, Copy, Debug)]
pub struct TimingSample {
    pub kind: OpKind,
    pub elapsed: Duration,
    pub records: usize,
}

/// Latency statistics over one operation kind, all integer microseconds.
#[derive(Clone, Debug, Serialize)]
pub struct LatencySummary {
    pub kind: OpKind,
    pub count: usize,
    pub min_us: u64,
    pub max_us: u64,
    pub mean_us: u64,
    pub stddev_us: u64,
    pub p99_us: u64,
}

/// Sequences store operations, timing each with a monotonic clock. Inserts
/// are timed per record even when driven from a batch, because each record
/// runs in its own transaction. Timing lines go to stdout as operations
/// complete, never buffered until the end.
pub struct Harness {
    client: StoreClient,
    schema: Schema,
    samples: Vec<TimingSample>,
}

impl Harness {
    pub fn new(client: StoreClient, schema: Schema) -> Self {
        Self {
            client,
            schema,
            samples: Vec::new(),
        }
    }

    /// Times each insert individually; a failing record is logged and
    /// skipped. Returns the number of records inserted.
    pub fn timed_inserts(&mut self, records: &[Record]) -> usize {
        let mut inserted = 0;
        for record in records {
            let start = Instant::now();
            let result = self.client.insert_one(&self.schema, record);
            let elapsed = start.elapsed();
            match result {
                Ok(()) => {
                    println!(
                        "Insert time for record: {} microseconds",
                        elapsed.as_micros()
                    );
                    self.samples.push(TimingSample {
                        kind: OpKind::Insert,
                        elapsed,
                        records: 1,
                    });
                    inserted += 1;
                }
                Err(err) => print_error(&err),
            }
        }
        inserted
    }

    pub fn timed_sequential_read(&mut self) -> Result<Vec<Record>, StatementErr> {
        let start = Instant::now();
        let rows = self.client.query_all(&self.schema)?;
        let elapsed = start.elapsed();
        println!("Sequential read time: {} microseconds", elapsed.as_micros());
        self.samples.push(TimingSample {
            kind: OpKind::SequentialRead,
            elapsed,
            records: rows.len(),
        });
        Ok(rows)
    }

    pub fn timed_latest_read(&mut self, limit: i64) -> Result<Vec<Record>, StatementErr> {
        let start = Instant::now();
        let rows = self.client.query_latest(&self.schema, limit)?;
        let elapsed = start.elapsed();
        println!("Latest read time: {} microseconds", elapsed.as_micros());
        self.samples.push(TimingSample {
            kind: OpKind::LatestRead,
            elapsed,
            records: rows.len(),
        });
        Ok(rows)
    }

    pub fn timed_random_read(&mut self) -> Result<Option<Record>, StatementErr> {
        let start = Instant::now();
        let row = self.client.query_random(&self.schema)?;
        let elapsed = start.elapsed();
        println!("Random read time: {} microseconds", elapsed.as_micros());
        self.samples.push(TimingSample {
            kind: OpKind::RandomRead,
            elapsed,
            records: row.iter().count(),
        });
        Ok(row)
    }

    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    pub fn summary(&self, kind: OpKind) -> Option<LatencySummary> {
        let latencies: Vec<u64> = self
            .samples
            .iter()
            .filter(|sample| sample.kind == kind)
            .map(|sample| sample.elapsed.as_micros() as u64)
            .collect();
        summarize(kind, &latencies)
    }

    pub fn summaries(&self) -> Vec<LatencySummary> {
        OpKind::ALL
            .iter()
            .filter_map(|kind| self.summary(*kind))
            .collect()
    }
}

fn summarize(kind: OpKind, latencies_us: &[u64]) -> Option<LatencySummary> {
    if latencies_us.is_empty() {
        return None;
    }

    let count = latencies_us.len();
    let min_us = latencies_us.iter().copied().min().unwrap_or(0);
    let max_us = latencies_us.iter().copied().max().unwrap_or(0);

    let mean = latencies_us.iter().sum::<u64>() as f64 / count as f64;
    let variance = latencies_us
        .iter()
        .map(|&us| {
            let diff = us as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / count as f64;

    let mut sorted = latencies_us.to_vec();
    sorted.sort_unstable();
    let p99_index = ((count as f64) * 0.99).ceil() as usize;
    let p99_us = sorted[p99_index.saturating_sub(1).min(count - 1)];

    Some(LatencySummary {
        kind,
        count,
        min_us,
        max_us,
        mean_us: mean.round() as u64,
        stddev_us: variance.sqrt().round() as u64,
        p99_us,
    })
}

#[derive(Clone, Debug, Serialize)]
pub struct BenchReport {
    pub decoded: usize,
    pub skipped_rows: usize,
    pub inserted: usize,
    pub rows_read: usize,
    pub summaries: Vec<LatencySummary>,
}

/// The full driver sequence as an explicit pipeline: connect, ensure schema,
/// decode in bounded batches, timed inserts, timed reads. Every stage's
/// failure funnels into the one returned error; recoverable row and
/// statement failures are diagnosed in place and skipped.
pub fn run_pipeline(
    conninfo: &str,
    schema: &Schema,
    csv: &Path,
    batch_size: usize,
    latest_limit: i64,
) -> Result<BenchReport, BenchErr> {
    let mut client = StoreClient::connect(conninfo)?;
    client.ensure_schema(schema)?;
    let mut harness = Harness::new(client, schema.clone());

    println!("Performing sequential inserts...");
    let batch_size = batch_size.max(1);
    let mut batch = Vec::with_capacity(batch_size);
    let mut decoded = 0;
    let mut skipped = 0;
    let mut inserted = 0;
    for result in Decoder::new(schema).open(csv)? {
        match result {
            Ok(record) => {
                decoded += 1;
                batch.push(record);
                if batch.len() == batch_size {
                    inserted += harness.timed_inserts(&batch);
                    batch.clear();
                }
            }
            Err(err) if err.is_recoverable() => {
                print_error(&err);
                skipped += 1;
            }
            Err(err) => return Err(err.into()),
        }
    }
    if !batch.is_empty() {
        inserted += harness.timed_inserts(&batch);
    }

    println!("\nPerforming sequential read...");
    let rows = harness.timed_sequential_read()?;
    println!("Read back {} rows", rows.len());

    println!("\nPerforming latest read...");
    for row in harness.timed_latest_read(latest_limit)? {
        println!("{}", row.to_csv_line());
    }

    println!("\nPerforming random read...");
    if let Some(row) = harness.timed_random_read()? {
        println!("{}", row.to_csv_line());
    }

    Ok(BenchReport {
        decoded,
        skipped_rows: skipped,
        inserted,
        rows_read: rows.len(),
        summaries: harness.summaries(),
    })
}
